//! Estimate-related data models.
//!
//! `Estimate` is the record the list reconciler operates on. Its nested
//! `customer_obj` and `items` are carried through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse lifecycle bucket used for tab membership.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum EstimateType {
    #[default]
    Draft,
    Active,
}

impl EstimateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateType::Draft => "draft",
            EstimateType::Active => "active",
        }
    }

    /// `Draft` status keeps an estimate in the draft tab; every other
    /// status moves it to active.
    pub fn for_status(status: &str) -> Self {
        if status == DRAFT_STATUS {
            EstimateType::Draft
        } else {
            EstimateType::Active
        }
    }
}

impl fmt::Display for EstimateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DRAFT_STATUS: &str = "Draft";

/// Denormalized customer snapshot attached to an estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: i64,
    pub item_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub id: i64,
    pub number: String,
    pub date: String, // YYYY-MM-DD
    pub customer: String,
    pub amount: String, // pre-formatted, e.g. "$450.00"
    pub status: String,
    #[serde(rename = "type")]
    pub estimate_type: EstimateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_obj: Option<CustomerSnapshot>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// A line item as submitted by a caller; ids are assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default)]
    pub item_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub price: f64,
}

fn default_quantity() -> i64 {
    1
}

/// Input data for creating an estimate. Absent fields get defaults on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateInput {
    pub number: Option<String>,
    pub date: Option<String>,
    pub valid_until: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub estimate_type: Option<EstimateType>,
    pub customer_id: Option<i64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
}

/// Partial update; every `Some` field overwrites. `items` replaces all
/// line items when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateUpdate {
    pub date: Option<String>,
    pub valid_until: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub estimate_type: Option<EstimateType>,
    pub customer_id: Option<i64>,
    pub notes: Option<String>,
    pub items: Option<Vec<LineItemInput>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_follows_status() {
        assert_eq!(EstimateType::for_status("Draft"), EstimateType::Draft);
        assert_eq!(EstimateType::for_status("Sent"), EstimateType::Active);
        assert_eq!(EstimateType::for_status("draft"), EstimateType::Active);
    }

    #[test]
    fn serializes_with_frontend_field_names() {
        let estimate = Estimate {
            id: 7,
            number: "45310".into(),
            date: "2026-03-01".into(),
            customer: "Amal Perera".into(),
            amount: "$10.00".into(),
            status: "Draft".into(),
            estimate_type: EstimateType::Draft,
            valid_until: Some("2026-03-31".into()),
            notes: String::new(),
            customer_id: Some(4),
            customer_obj: None,
            items: Vec::new(),
        };

        let value = serde_json::to_value(&estimate).unwrap();
        assert_eq!(value["type"], "draft");
        assert_eq!(value["validUntil"], "2026-03-31");
        assert_eq!(value["customerId"], 4);
        assert!(value.get("customerObj").is_none());
    }
}
