//! Printable receipt export.
//!
//! Renders a self-contained HTML page for one estimate. The page prints
//! itself when opened in a browser.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{
    db::{helpers::strict_iso_date, models::Estimate},
    estimates::amount::{format_amount, line_total},
    settings::ReceiptSettings,
};

const STYLE: &str = r#"
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
      background: #fff; color: #1a202c;
      padding: 48px; max-width: 720px; margin: 0 auto;
    }
    .header {
      display: flex; justify-content: space-between; align-items: flex-start;
      padding-bottom: 24px; border-bottom: 2px solid #e2e8f0; margin-bottom: 28px;
    }
    .logo-box {
      width: 56px; height: 56px; border-radius: 12px;
      background: linear-gradient(135deg, #3b82f6, #6366f1);
      display: flex; align-items: center; justify-content: center;
      color: white; font-size: 22px; font-weight: 900;
    }
    .company-info { text-align: right; }
    .estimate-title {
      font-size: 28px; font-weight: 900; letter-spacing: 4px;
      text-transform: uppercase; color: #374151;
    }
    .company-name { font-size: 13px; font-weight: 700; color: #3b82f6; margin-top: 4px; }
    .company-country { font-size: 12px; color: #6b7280; }
    .info-row {
      display: flex; justify-content: space-between; align-items: flex-start;
      margin-bottom: 28px; padding-bottom: 20px; border-bottom: 1px solid #e2e8f0;
    }
    .bill-to-label { font-size: 11px; color: #9ca3af; margin-bottom: 4px; }
    .bill-to-name { font-size: 14px; font-weight: 700; color: #0f1f4b; }
    .bill-to-sub { font-size: 13px; color: #4b5563; margin-top: 2px; }
    .meta-table { min-width: 250px; }
    .meta-row { display: flex; justify-content: space-between; gap: 24px; margin-bottom: 6px; }
    .meta-label { font-size: 13px; color: #6b7280; font-weight: 500; }
    .meta-value { font-size: 13px; color: #0f1f4b; font-weight: 600; }
    .meta-total-row { background: #f8fafc; border-radius: 8px; padding: 6px 10px; margin-top: 4px; }
    .meta-total-row .meta-label, .meta-total-row .meta-value { font-weight: 700; color: #0f1f4b; }
    table { width: 100%; border-collapse: collapse; }
    thead tr { background: #2d3748; }
    thead th { padding: 12px 16px; font-size: 13px; font-weight: 700; color: white; text-align: left; }
    thead th:not(:first-child) { text-align: center; }
    thead th:last-child { text-align: right; }
    tbody tr { border-bottom: 1px solid #f1f5f9; }
    tbody td { padding: 14px 16px; font-size: 13px; color: #374151; }
    tbody td:not(:first-child) { text-align: center; }
    tbody td:last-child { text-align: right; font-weight: 600; }
    .item-name { font-weight: 700; color: #3b82f6; }
    .item-desc { font-size: 11px; color: #9ca3af; margin-top: 2px; }
    .grand-total {
      display: flex; justify-content: flex-end;
      padding: 16px 16px 0; border-top: 2px solid #e2e8f0;
    }
    .grand-total-inner { display: flex; gap: 48px; }
    .grand-total-label, .grand-total-value { font-size: 14px; font-weight: 700; color: #374151; }
    .status-badge {
      display: inline-block; font-size: 10px; font-weight: 700;
      text-transform: uppercase; letter-spacing: 1px;
      padding: 2px 8px; border-radius: 4px;
      background: #fef3c7; color: #92400e; margin-top: 8px;
    }
    .footer {
      margin-top: 48px; padding-top: 20px; border-top: 1px solid #e2e8f0;
      text-align: center; color: #9ca3af; font-size: 12px;
    }
    @media print {
      body { padding: 20px; }
      @page { margin: 0.5in; }
    }
"#;

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// "2026-02-26" -> "February 26, 2026". Unparseable input is shown as-is.
pub fn long_date(value: &str) -> String {
    strict_iso_date(value)
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

fn item_row(name: &str, description: &str, quantity: i64, price: &str, amount: &str) -> String {
    let description = if description.is_empty() {
        String::new()
    } else {
        format!(
            "\n          <div class=\"item-desc\">{}</div>",
            escape_html(description)
        )
    };

    format!(
        r#"      <tr>
        <td>
          <div class="item-name">{name}</div>{description}
        </td>
        <td>{quantity}</td>
        <td>{price}</td>
        <td>{amount}</td>
      </tr>
"#,
        name = escape_html(name),
        price = escape_html(price),
        amount = escape_html(amount),
    )
}

fn bill_to(estimate: &Estimate) -> String {
    let name = if estimate.customer.is_empty() {
        "No customer"
    } else {
        estimate.customer.as_str()
    };

    let mut block = format!(
        "      <div class=\"bill-to-name\">{}</div>\n",
        escape_html(name)
    );
    if let Some(customer) = &estimate.customer_obj {
        for detail in [&customer.email, &customer.phone] {
            if !detail.is_empty() {
                block.push_str(&format!(
                    "      <div class=\"bill-to-sub\">{}</div>\n",
                    escape_html(detail)
                ));
            }
        }
    }
    block
}

pub fn render_receipt(estimate: &Estimate, settings: &ReceiptSettings) -> String {
    let rows: String = if estimate.items.is_empty() {
        item_row(
            &format!("Estimate #{}", estimate.number),
            "",
            1,
            &estimate.amount,
            &estimate.amount,
        )
    } else {
        estimate
            .items
            .iter()
            .map(|item| {
                item_row(
                    &item.name,
                    &item.description,
                    item.quantity,
                    &format_amount(item.price),
                    &format_amount(line_total(item.price, item.quantity)),
                )
            })
            .collect()
    };

    let initial = settings
        .company_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    let valid_until = estimate
        .valid_until
        .as_deref()
        .map(long_date)
        .unwrap_or_else(|| "\u{2014}".to_string());
    let currency = escape_html(&settings.currency_code);
    let amount = escape_html(&estimate.amount);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Estimate #{number}</title>
  <style>{STYLE}</style>
</head>
<body>
  <div class="header">
    <div class="logo-box">{initial}</div>
    <div class="company-info">
      <div class="estimate-title">ESTIMATE</div>
      <div class="company-name">{company}</div>
      <div class="company-country">{country}</div>
    </div>
  </div>

  <div class="info-row">
    <div>
      <div class="bill-to-label">Bill to</div>
{bill_to}      <div class="status-badge">{status}</div>
    </div>
    <div class="meta-table">
      <div class="meta-row">
        <span class="meta-label">Estimate Number:</span>
        <span class="meta-value">{number}</span>
      </div>
      <div class="meta-row">
        <span class="meta-label">Estimate Date:</span>
        <span class="meta-value">{date}</span>
      </div>
      <div class="meta-row">
        <span class="meta-label">Valid Until:</span>
        <span class="meta-value">{valid_until}</span>
      </div>
      <div class="meta-row meta-total-row">
        <span class="meta-label">Grand Total ({currency}):</span>
        <span class="meta-value">{amount}</span>
      </div>
    </div>
  </div>

  <table>
    <thead>
      <tr>
        <th>Items</th>
        <th>Quantity</th>
        <th>Price</th>
        <th>Amount</th>
      </tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>

  <div class="grand-total">
    <div class="grand-total-inner">
      <span class="grand-total-label">Grand Total ({currency}):</span>
      <span class="grand-total-value">{amount}</span>
    </div>
  </div>

  <div class="footer">{company}</div>

  <script>
    window.onload = function() {{ window.print(); }};
  </script>
</body>
</html>
"#,
        number = escape_html(&estimate.number),
        initial = escape_html(&initial),
        company = escape_html(&settings.company_name),
        country = escape_html(&settings.company_country),
        bill_to = bill_to(estimate),
        status = escape_html(&estimate.status),
        date = escape_html(&long_date(&estimate.date)),
        valid_until = escape_html(&valid_until),
    )
}

/// `estimate-<number>.html` inside `dir`, with anything but ASCII
/// alphanumerics, `-` and `_` in the number replaced by `_`.
pub fn default_receipt_path(dir: &Path, number: &str) -> PathBuf {
    let safe: String = number
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.join(format!("estimate-{safe}.html"))
}

pub fn write_receipt(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create receipt directory {}", parent.display())
            })?;
        }
    }
    fs::write(path, html).with_context(|| format!("failed to write receipt {}", path.display()))
}
