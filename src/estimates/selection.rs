use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

use crate::db::models::EstimateType;

/// Primary list view grouping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Active,
    Draft,
    #[default]
    All,
}

impl Tab {
    pub fn admits(&self, estimate_type: EstimateType) -> bool {
        match self {
            Tab::All => true,
            Tab::Active => estimate_type == EstimateType::Active,
            Tab::Draft => estimate_type == EstimateType::Draft,
        }
    }
}

impl FromStr for Tab {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Ok(Tab::Active),
            "draft" => Ok(Tab::Draft),
            "all" => Ok(Tab::All),
            other => Err(anyhow!("unknown tab '{other}' (expected active, draft or all)")),
        }
    }
}

/// User-selected list filters. Every `None` field places no constraint, and
/// an empty string counts as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    pub tab: Tab,
    /// Case-insensitive substring of number or customer.
    pub search_query: Option<String>,
    /// Exact customer name.
    pub customer: Option<String>,
    /// Exact status label.
    pub status: Option<String>,
    /// Inclusive lower bound, YYYY-MM-DD.
    pub date_from: Option<String>,
    /// Inclusive upper bound, YYYY-MM-DD.
    pub date_to: Option<String>,
}

impl FilterSelection {
    pub fn tab(tab: Tab) -> Self {
        Self {
            tab,
            ..Self::default()
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn date_range(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            date_from: from.map(str::to_string),
            date_to: to.map(str::to_string),
            ..Self::default()
        }
    }

    pub(crate) fn search_query(&self) -> Option<&str> {
        active(&self.search_query)
    }

    pub(crate) fn customer(&self) -> Option<&str> {
        active(&self.customer)
    }

    pub(crate) fn status(&self) -> Option<&str> {
        active(&self.status)
    }

    pub(crate) fn date_from(&self) -> Option<&str> {
        active(&self.date_from)
    }

    pub(crate) fn date_to(&self) -> Option<&str> {
        active(&self.date_to)
    }

    /// True when no criterion would reject any record.
    pub fn is_pass_through(&self) -> bool {
        self.tab == Tab::All
            && self.search_query().is_none()
            && self.customer().is_none()
            && self.status().is_none()
            && self.date_from().is_none()
            && self.date_to().is_none()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_pass_through() {
        assert!(FilterSelection::default().is_pass_through());
        assert!(!FilterSelection::tab(Tab::Draft).is_pass_through());
    }

    #[test]
    fn empty_strings_are_unset() {
        let selection = FilterSelection {
            search_query: Some(String::new()),
            customer: Some(String::new()),
            ..FilterSelection::default()
        };
        assert!(selection.is_pass_through());
        assert_eq!(selection.customer(), None);
    }

    #[test]
    fn deserializes_partial_json() {
        let selection: FilterSelection =
            serde_json::from_str(r#"{"tab":"draft","searchQuery":"yomal"}"#).unwrap();
        assert_eq!(selection.tab, Tab::Draft);
        assert_eq!(selection.search_query(), Some("yomal"));
        assert_eq!(selection.date_to, None);
    }

    #[test]
    fn parses_tab_names() {
        assert_eq!("Active".parse::<Tab>().unwrap(), Tab::Active);
        assert_eq!("all".parse::<Tab>().unwrap(), Tab::All);
        assert!("archived".parse::<Tab>().is_err());
    }
}
