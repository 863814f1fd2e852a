//! Terminal front end for the order list.
//!
//! Reads commands from stdin, drives the [`OrderListController`] and renders
//! the published view through Tera templates. Confirmation and reason prompts
//! share the same input stream as the command loop.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use tera::{Context, Tera};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::types::{OrderId, TypeConstraintError};
use crate::dto::orders::{OrderDetailPage, OrderListPage};
use crate::forms::FormError;
use crate::forms::orders::{
    ALL_STATUSES, OrderActionForm, OrderFilterForm, OrderFilterPayload, parse_status_filter,
};
use crate::models::config::OrderDeskConfig;
use crate::repository::errors::RepositoryError;
use crate::repository::{InMemoryOrderRepository, OrderReader, OrderWriter};
use crate::services::ServiceResult;
use crate::services::orders::{ActionOutcome, OrderListController, OrderListView};
use crate::services::prompt::UserPrompt;

pub const HELP: &str = "\
Commands:
  next | prev              move between pages
  search [text]            filter by id or customer (no text clears)
  status <Status|all>      filter by status
  ship <id>                ship a confirmed order
  cancel <id>              cancel an order
  open <id>                show order details
  refresh                  reload the current page
  help                     show this message
  quit                     leave";

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid demo data: {0}")]
    DemoData(#[from] TypeConstraintError),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Form(#[from] FormError),
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Search(Option<String>),
    Status(Option<OrderStatus>),
    Ship(String),
    Cancel(String),
    Open(String),
    Refresh,
    Help,
    Quit,
}

fn required(arg: &str, command: &'static str) -> Result<String, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(arg.to_string())
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        match name.to_lowercase().as_str() {
            "next" | "n" => Ok(Command::Next),
            "prev" | "previous" | "p" => Ok(Command::Previous),
            "search" | "s" => {
                let payload = OrderFilterPayload::try_from(OrderFilterForm {
                    search: arg.to_string(),
                    status: ALL_STATUSES.to_string(),
                })?;
                Ok(Command::Search(payload.search))
            }
            "status" => {
                if arg.is_empty() {
                    return Err(CommandError::MissingArgument("status"));
                }
                Ok(Command::Status(parse_status_filter(arg)?))
            }
            "ship" => required(arg, "ship").map(Command::Ship),
            "cancel" => required(arg, "cancel").map(Command::Cancel),
            "open" => required(arg, "open").map(Command::Open),
            "refresh" | "r" => Ok(Command::Refresh),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Shared line reader over the console input.
pub struct ConsoleInput<I> {
    lines: Arc<Mutex<Lines<I>>>,
}

impl<I> Clone for ConsoleInput<I> {
    fn clone(&self) -> Self {
        Self {
            lines: Arc::clone(&self.lines),
        }
    }
}

impl<I> ConsoleInput<I>
where
    I: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: I) -> Self {
        Self {
            lines: Arc::new(Mutex::new(reader.lines())),
        }
    }

    /// Next input line, `None` at end of input.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Prompts on stdout and reads answers from the console input.
pub struct ConsolePrompt<I> {
    input: ConsoleInput<I>,
}

impl<I> ConsolePrompt<I> {
    pub fn new(input: ConsoleInput<I>) -> Self {
        Self { input }
    }
}

#[async_trait::async_trait]
impl<I> UserPrompt for ConsolePrompt<I>
where
    I: AsyncBufRead + Unpin + Send,
{
    async fn confirm(&self, message: &str) -> bool {
        println!("{message} [y/N]");
        match self.input.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(err) => {
                log::error!("Failed to read confirmation: {err}");
                false
            }
        }
    }

    async fn ask(&self, message: &str) -> Option<String> {
        println!("{message}");
        match self.input.next_line().await {
            Ok(answer) => answer,
            Err(err) => {
                log::error!("Failed to read answer: {err}");
                None
            }
        }
    }
}

/// Renders the list view.
pub fn render_list(tera: &Tera, view: &OrderListView) -> Result<String, tera::Error> {
    let page = OrderListPage::from(view);
    tera.render("orders/list.txt", &Context::from_serialize(&page)?)
}

/// Renders a single order.
pub fn render_detail(tera: &Tera, order: &Order) -> Result<String, tera::Error> {
    let page = OrderDetailPage::from(order);
    tera.render("orders/detail.txt", &Context::from_serialize(&page)?)
}

/// Generates `count` orders spread over the last weeks, for runs without a seed file.
pub fn demo_orders(count: usize, now: NaiveDateTime) -> Result<Vec<Order>, TypeConstraintError> {
    const CUSTOMERS: [&str; 6] = [
        "Ada Lovelace",
        "Grace Hopper",
        "Alan Turing",
        "Edsger Dijkstra",
        "Barbara Liskov",
        "Donald Knuth",
    ];
    const CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

    (0..count)
        .map(|idx| {
            let status = OrderStatus::ALL[idx % OrderStatus::ALL.len()];
            let amount = Decimal::new(1_999 + (idx as i64 * 7_351) % 250_000, 2);
            Order::try_new(
                Uuid::new_v4().to_string(),
                CUSTOMERS[idx % CUSTOMERS.len()],
                amount,
                CURRENCIES[idx % CURRENCIES.len()],
                status,
                now - ChronoDuration::hours(idx as i64 * 7),
            )
        })
        .collect()
}

fn build_repository(config: &OrderDeskConfig) -> Result<InMemoryOrderRepository, ConsoleError> {
    let repo = match &config.seed_file {
        Some(path) => InMemoryOrderRepository::from_json_file(path)?,
        None => {
            log::info!("No seed file configured, generating {} demo orders", config.demo_orders);
            InMemoryOrderRepository::new(demo_orders(config.demo_orders, Utc::now().naive_utc())?)
        }
    };
    Ok(repo.with_latency(config.repository_latency()))
}

/// Command loop bound to a controller and a template set.
pub struct Console<R, I> {
    controller: OrderListController<R, ConsolePrompt<I>>,
    input: ConsoleInput<I>,
    tera: Tera,
}

impl<R, I> Console<R, I>
where
    R: OrderReader + OrderWriter + Send + Sync,
    I: AsyncBufRead + Unpin + Send,
{
    pub fn new(
        controller: OrderListController<R, ConsolePrompt<I>>,
        input: ConsoleInput<I>,
        tera: Tera,
    ) -> Self {
        Self {
            controller,
            input,
            tera,
        }
    }

    pub fn controller(&self) -> &OrderListController<R, ConsolePrompt<I>> {
        &self.controller
    }

    /// Loads the first page and processes commands until `quit` or end of input.
    pub async fn run(&self) -> Result<(), ConsoleError> {
        if let Err(err) = self.controller.load().await {
            println!("error: {err}");
        }
        self.show_list()?;

        while let Some(line) = self.input.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            self.execute(command).await?;
        }

        log::info!("Console closed");
        Ok(())
    }

    /// Runs one command; service failures are reported to the user, not returned.
    pub async fn execute(&self, command: Command) -> Result<(), ConsoleError> {
        let result = match command {
            Command::Next => self.navigate(self.controller.next_page().await, "last"),
            Command::Previous => self.navigate(self.controller.previous_page().await, "first"),
            Command::Search(term) => self
                .controller
                .set_search(term.unwrap_or_default())
                .await
                .map(|_| ()),
            Command::Status(status) => self.controller.set_status_filter(status).await.map(|_| ()),
            Command::Refresh => self.controller.refresh().await.map(|_| ()),
            Command::Ship(raw) => match self.resolve_id(&raw) {
                Some(id) => self.report(self.controller.request_ship(&id).await, "shipped"),
                None => return Ok(()),
            },
            Command::Cancel(raw) => match self.resolve_id(&raw) {
                Some(id) => self.report(self.controller.request_cancel(&id).await, "cancelled"),
                None => return Ok(()),
            },
            Command::Open(raw) => {
                if let Some(id) = self.resolve_id(&raw) {
                    match self.controller.open_order(&id).await {
                        Ok(order) => println!("{}", render_detail(&self.tera, &order)?),
                        Err(err) => println!("error: {err}"),
                    }
                }
                return Ok(());
            }
            Command::Help => {
                println!("{HELP}");
                return Ok(());
            }
            Command::Quit => return Ok(()),
        };

        if let Err(err) = result {
            println!("error: {err}");
        }
        self.show_list()
    }

    fn navigate<T>(&self, result: ServiceResult<Option<T>>, boundary: &str) -> ServiceResult<()> {
        if matches!(result, Ok(None)) {
            println!("Already on the {boundary} page.");
        }
        result.map(|_| ())
    }

    fn report(&self, result: ServiceResult<ActionOutcome>, verb: &str) -> ServiceResult<()> {
        match result? {
            ActionOutcome::Completed => println!("Order {verb}."),
            ActionOutcome::Declined => println!("Nothing changed."),
        }
        Ok(())
    }

    /// Accepts a full id, or a short id shown in the table.
    fn resolve_id(&self, raw: &str) -> Option<OrderId> {
        if let Some(order) = self.controller.snapshot().find_order(raw) {
            return Some(order.id.clone());
        }
        match OrderId::try_from(OrderActionForm {
            id: raw.to_string(),
        }) {
            Ok(id) => Some(id),
            Err(err) => {
                println!("error: {err}");
                None
            }
        }
    }

    fn show_list(&self) -> Result<(), ConsoleError> {
        println!("{}", render_list(&self.tera, &self.controller.snapshot())?);
        Ok(())
    }
}

/// Builds the repository, templates and controller from `config` and runs on stdin.
pub async fn run(config: OrderDeskConfig) -> Result<(), ConsoleError> {
    let repo = build_repository(&config)?;
    let tera = Tera::new(&config.templates_dir)?;

    let input = ConsoleInput::new(BufReader::new(tokio::io::stdin()));
    let prompt = ConsolePrompt::new(input.clone());
    let controller = OrderListController::new(repo, prompt, config.page_size);

    let mut updates = controller.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let (rows, loading, page) = {
                let view = updates.borrow_and_update();
                (view.orders.len(), view.loading, view.state.page)
            };
            log::debug!("Order view updated: page {page}, {rows} rows, loading={loading}");
        }
    });

    println!("{HELP}\n");
    Console::new(controller, input, tera).run().await
}
