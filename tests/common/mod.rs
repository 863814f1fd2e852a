#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use order_desk::domain::order::{Order, OrderStatus};
use order_desk::repository::InMemoryOrderRepository;
use rust_decimal::Decimal;

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .expect("valid date")
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
}

pub fn order(id: &str, customer: &str, status: OrderStatus, date: NaiveDateTime) -> Order {
    Order::try_new(id, customer, Decimal::new(2500, 2), "USD", status, date).expect("valid order")
}

/// `count` orders, newest first by index, cycling through every status.
pub fn numbered_orders(count: usize) -> Vec<Order> {
    (0..count)
        .map(|idx| {
            let status = OrderStatus::ALL[idx % OrderStatus::ALL.len()];
            let date = at(28, 23) - chrono::Duration::hours(idx as i64);
            order(&format!("order-{idx:03}"), &format!("Customer {idx}"), status, date)
        })
        .collect()
}

pub fn repository(count: usize) -> InMemoryOrderRepository {
    InMemoryOrderRepository::new(numbered_orders(count))
}
