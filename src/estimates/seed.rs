//! Placeholder data shown before (and alongside) user-created estimates.
//!
//! The same table seeds an empty database on first run, so a fresh install
//! lists these records from storage and the static copies are shadowed.

use std::sync::OnceLock;

use crate::db::models::{Estimate, EstimateType, LineItem};

use super::amount::{format_amount, subtotal};

pub struct SeedCustomer {
    pub name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
}

pub struct SeedItem {
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
}

pub struct SeedLine {
    pub name: &'static str,
    pub description: &'static str,
    pub quantity: i64,
    pub price: f64,
}

pub struct SeedEstimate {
    pub number: &'static str,
    pub date: &'static str,
    pub valid_until: &'static str,
    pub status: &'static str,
    pub estimate_type: EstimateType,
    pub customer: &'static str,
    pub lines: &'static [SeedLine],
}

pub const SEED_CUSTOMERS: &[SeedCustomer] = &[
    SeedCustomer { name: "Person", email: "", phone: "" },
    SeedCustomer {
        name: "Shenali Hirushika",
        email: "shenu123@gmail.com",
        phone: "0722640409",
    },
    SeedCustomer { name: "Yomal Thushara", email: "", phone: "" },
    SeedCustomer { name: "Amal Perera", email: "", phone: "" },
    SeedCustomer { name: "Nimal Silva", email: "", phone: "" },
    SeedCustomer { name: "Sunil Kasun", email: "", phone: "" },
    SeedCustomer { name: "Kamal Pathirana", email: "", phone: "" },
];

pub const SEED_ITEMS: &[SeedItem] = &[
    SeedItem { name: "HP Laptop", description: "RTX 2050", price: 450.0 },
    SeedItem { name: "Pen", description: "Blue Pen", price: 10.0 },
];

const LAPTOP: &str = "HP Laptop";
const LAPTOP_DESC: &str = "RTX 2050";
const PEN: &str = "Pen";
const PEN_DESC: &str = "Blue Pen";

pub const SEED_ESTIMATES: &[SeedEstimate] = &[
    SeedEstimate {
        number: "45303",
        date: "2026-02-26",
        valid_until: "2026-03-28",
        status: "Saved",
        estimate_type: EstimateType::Active,
        customer: "Yomal Thushara",
        lines: &[SeedLine { name: LAPTOP, description: LAPTOP_DESC, quantity: 1, price: 450.0 }],
    },
    SeedEstimate {
        number: "45304",
        date: "2026-02-25",
        valid_until: "2026-03-27",
        status: "Draft",
        estimate_type: EstimateType::Draft,
        customer: "Amal Perera",
        lines: &[
            SeedLine { name: LAPTOP, description: LAPTOP_DESC, quantity: 2, price: 450.0 },
            SeedLine { name: PEN, description: PEN_DESC, quantity: 30, price: 10.0 },
        ],
    },
    SeedEstimate {
        number: "45305",
        date: "2026-02-24",
        valid_until: "2026-03-26",
        status: "Draft",
        estimate_type: EstimateType::Draft,
        customer: "Nimal Silva",
        lines: &[
            SeedLine { name: LAPTOP, description: LAPTOP_DESC, quantity: 1, price: 450.0 },
            SeedLine { name: PEN, description: PEN_DESC, quantity: 40, price: 10.0 },
        ],
    },
    SeedEstimate {
        number: "45306",
        date: "2026-02-23",
        valid_until: "2026-03-25",
        status: "Draft",
        estimate_type: EstimateType::Draft,
        customer: "Sunil Kasun",
        lines: &[
            SeedLine { name: LAPTOP, description: LAPTOP_DESC, quantity: 4, price: 450.0 },
            SeedLine { name: PEN, description: PEN_DESC, quantity: 30, price: 10.0 },
        ],
    },
    SeedEstimate {
        number: "45307",
        date: "2026-02-22",
        valid_until: "2026-03-24",
        status: "Saved",
        estimate_type: EstimateType::Active,
        customer: "Kamal Pathirana",
        lines: &[SeedLine { name: PEN, description: PEN_DESC, quantity: 32, price: 10.0 }],
    },
];

impl SeedEstimate {
    // Placeholder ids start at 1 and may collide with persisted ids.
    fn to_estimate(&self, placeholder_id: i64) -> Estimate {
        let items: Vec<LineItem> = self
            .lines
            .iter()
            .zip(1..)
            .map(|(line, id)| LineItem {
                id,
                item_id: None,
                name: line.name.to_string(),
                description: line.description.to_string(),
                price: line.price,
                quantity: line.quantity,
            })
            .collect();

        Estimate {
            id: placeholder_id,
            number: self.number.to_string(),
            date: self.date.to_string(),
            customer: self.customer.to_string(),
            amount: format_amount(subtotal(&items)),
            status: self.status.to_string(),
            estimate_type: self.estimate_type,
            valid_until: Some(self.valid_until.to_string()),
            notes: String::new(),
            customer_id: None,
            customer_obj: None,
            items,
        }
    }
}

/// The static seed records, built once per process.
pub fn seed_estimates() -> &'static [Estimate] {
    static SEED: OnceLock<Vec<Estimate>> = OnceLock::new();
    SEED.get_or_init(|| {
        SEED_ESTIMATES
            .iter()
            .zip(1..)
            .map(|(seed, id)| seed.to_estimate(id))
            .collect()
    })
}
