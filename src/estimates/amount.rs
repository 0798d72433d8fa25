//! Line-item arithmetic and currency formatting.

use num_format::{Locale, ToFormattedString};

use crate::db::models::LineItem;

/// Anything with a unit price and a quantity.
pub trait Priced {
    fn unit_price(&self) -> f64;
    fn quantity(&self) -> i64;
}

impl Priced for LineItem {
    fn unit_price(&self) -> f64 {
        self.price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

pub fn line_total(price: f64, quantity: i64) -> f64 {
    price * quantity as f64
}

pub fn subtotal<T: Priced>(items: &[T]) -> f64 {
    items
        .iter()
        .map(|item| line_total(item.unit_price(), item.quantity()))
        .sum()
}

/// Formats `value` as `$1,234.56`, rounded to cents.
pub fn format_amount(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    format!(
        "{sign}${}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}
