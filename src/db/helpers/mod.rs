use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;

use crate::db::models::{EstimateType, LineItemInput};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_estimate_type(value: &str) -> Result<EstimateType> {
    match value {
        "draft" => Ok(EstimateType::Draft),
        "active" => Ok(EstimateType::Active),
        other => Err(anyhow!("unknown estimate type {other}")),
    }
}

/// Zero-padded `YYYY-MM-DD` naming a real calendar day. `2026-2-5` is
/// rejected even though chrono parses it.
pub fn strict_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).ok()
}

pub fn parse_iso_date(value: &str, field: &str) -> Result<NaiveDate> {
    strict_iso_date(value)
        .ok_or_else(|| anyhow!("{field} must be a YYYY-MM-DD date, got '{value}'"))
}

/// Empty strings read back from `valid_until` mean "not set".
pub fn optional_text(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// `%needle%` for a `LIKE ... ESCAPE '\'` clause, with wildcards in the
/// needle escaped.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// `None` for absent or empty search terms.
pub fn search_term(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn validate_line_items(items: &[LineItemInput]) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        if item.name.trim().is_empty() {
            bail!("line item {} is missing a name", index + 1);
        }
        if item.quantity <= 0 {
            bail!(
                "line item '{}' has invalid quantity {}",
                item.name,
                item.quantity
            );
        }
        if !item.price.is_finite() || item.price < 0.0 {
            bail!("line item '{}' has invalid price {}", item.name, item.price);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_only() {
        assert!(parse_iso_date("2026-02-26", "date").is_ok());
        assert!(parse_iso_date("02/26/2026", "date").is_err());
        assert!(parse_iso_date("2026-02-30", "date").is_err());
        assert!(parse_iso_date("2026-2-26", "date").is_err());
        assert!(parse_iso_date("2026-02-6", "date").is_err());
        assert!(parse_iso_date(" 2026-02-26", "date").is_err());
    }

    #[test]
    fn strict_dates_require_zero_padding() {
        assert_eq!(
            strict_iso_date("2026-02-05"),
            NaiveDate::from_ymd_opt(2026, 2, 5)
        );
        assert_eq!(strict_iso_date("2026-2-05"), None);
        assert_eq!(strict_iso_date("2026/02/05"), None);
        assert_eq!(strict_iso_date("２026-02-05"), None);
    }

    #[test]
    fn rejects_bad_line_items() {
        let item = |quantity, price| LineItemInput {
            item_id: None,
            name: "Pen".into(),
            description: String::new(),
            quantity,
            price,
        };

        assert!(validate_line_items(&[item(1, 10.0)]).is_ok());
        assert!(validate_line_items(&[item(0, 10.0)]).is_err());
        assert!(validate_line_items(&[item(1, -1.0)]).is_err());
        assert!(validate_line_items(&[item(1, f64::NAN)]).is_err());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("yomal"), "%yomal%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn blank_search_is_none() {
        assert_eq!(search_term(Some("  ".into())), None);
        assert_eq!(search_term(Some(" pen ".into())), Some("pen".into()));
        assert_eq!(search_term(None), None);
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert_eq!(parse_estimate_type("active").unwrap(), EstimateType::Active);
        assert!(parse_estimate_type("archived").is_err());
    }
}
