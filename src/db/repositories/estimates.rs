use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, Local};
use rusqlite::{params, Connection, OptionalExtension};

use crate::{
    db::{
        connection::Database,
        helpers::{
            optional_text, parse_estimate_type, parse_iso_date, validate_line_items,
            ISO_DATE_FORMAT,
        },
        models::{
            CustomerSnapshot, Estimate, EstimateInput, EstimateType, EstimateUpdate, LineItem,
            LineItemInput, DRAFT_STATUS,
        },
        repositories::customers::fetch_customer,
    },
    estimates::amount::{format_amount, subtotal},
    settings::NumberingSettings,
};

const SELECT_ESTIMATES: &str = "SELECT e.id, e.number, e.date, e.valid_until, e.status, e.type,
        e.notes, e.customer_id, c.name, c.email, c.phone
 FROM estimates e
 LEFT JOIN customers c ON c.id = e.customer_id";

fn load_line_items(conn: &Connection, estimate_id: i64) -> Result<Vec<LineItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, item_id, name, description, price, quantity
         FROM line_items
         WHERE estimate_id = ?1
         ORDER BY position ASC, id ASC",
    )?;

    let items = stmt
        .query_map(params![estimate_id], |row| {
            Ok(LineItem {
                id: row.get(0)?,
                item_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                price: row.get(4)?,
                quantity: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(items)
}

fn insert_line_items(conn: &Connection, estimate_id: i64, items: &[LineItemInput]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO line_items (estimate_id, item_id, name, description, quantity, price, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for (position, item) in items.iter().enumerate() {
        stmt.execute(params![
            estimate_id,
            item.item_id,
            item.name.trim(),
            item.description,
            item.quantity,
            item.price,
            position as i64,
        ])
        .with_context(|| format!("failed to insert line item '{}'", item.name))?;
    }

    Ok(())
}

/// Runs `SELECT_ESTIMATES` with `tail` appended and hydrates line items,
/// customer snapshots and the derived amount.
fn query_estimates<P: rusqlite::Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> Result<Vec<Estimate>> {
    let mut stmt = conn.prepare(&format!("{SELECT_ESTIMATES} {tail}"))?;
    let mut rows = stmt.query(params)?;

    let mut estimates = Vec::new();
    while let Some(row) = rows.next()? {
        let customer_id: Option<i64> = row.get(7)?;
        let customer_name: Option<String> = row.get(8)?;
        let customer_obj = match (customer_id, customer_name.clone()) {
            (Some(id), Some(name)) => Some(CustomerSnapshot {
                id,
                name,
                email: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                phone: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
            }),
            _ => None,
        };

        estimates.push(Estimate {
            id: row.get(0)?,
            number: row.get(1)?,
            date: row.get(2)?,
            customer: customer_name.unwrap_or_default(),
            amount: String::new(),
            status: row.get(4)?,
            estimate_type: parse_estimate_type(&row.get::<_, String>(5)?)?,
            valid_until: optional_text(row.get(3)?),
            notes: row.get(6)?,
            customer_id,
            customer_obj,
            items: Vec::new(),
        });
    }

    for estimate in &mut estimates {
        estimate.items = load_line_items(conn, estimate.id)?;
        estimate.amount = format_amount(subtotal(&estimate.items));
    }

    Ok(estimates)
}

fn load_estimate(conn: &Connection, estimate_id: i64) -> Result<Option<Estimate>> {
    Ok(query_estimates(conn, "WHERE e.id = ?1", params![estimate_id])?
        .into_iter()
        .next())
}

/// Resolves `key` as a numeric id first, then as an estimate number.
fn resolve_estimate_id(conn: &Connection, key: &str) -> Result<Option<i64>> {
    if let Ok(id) = key.parse::<i64>() {
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM estimates WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        if found.is_some() {
            return Ok(found);
        }
    }

    resolve_number(conn, key)
}

/// One past the largest numeric estimate number, or `first_number` when
/// there is none. Non-numeric numbers are ignored.
fn next_estimate_number(conn: &Connection, first_number: u64) -> Result<String> {
    let mut stmt = conn.prepare("SELECT number FROM estimates")?;
    let max = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter_map(|number| number.trim().parse::<u64>().ok())
        .max();

    let next = match max {
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| {
                anyhow!("Estimate number {max} cannot be incremented; give the number explicitly")
            })?
            .max(first_number),
        None => first_number,
    };
    Ok(next.to_string())
}

fn ensure_customer(conn: &Connection, customer_id: Option<i64>) -> Result<()> {
    if let Some(id) = customer_id {
        if fetch_customer(conn, id)?.is_none() {
            bail!("Customer {id} not found");
        }
    }
    Ok(())
}

fn validate_dates(date: Option<&str>, valid_until: Option<&str>) -> Result<()> {
    if let Some(date) = date {
        parse_iso_date(date, "date")?;
    }
    if let Some(valid_until) = valid_until {
        parse_iso_date(valid_until, "validUntil")?;
    }
    Ok(())
}

impl Database {
    /// Every estimate, newest date first.
    pub async fn list_estimates(&self) -> Result<Vec<Estimate>> {
        self.execute(|conn| query_estimates(conn, "ORDER BY e.date DESC, e.id DESC", []))
            .await
    }

    /// Look up an estimate by id or number.
    pub async fn get_estimate(&self, key: &str) -> Result<Option<Estimate>> {
        let key = key.trim().to_string();
        self.execute(move |conn| match resolve_estimate_id(conn, &key)? {
            Some(id) => load_estimate(conn, id),
            None => Ok(None),
        })
        .await
    }

    pub async fn create_estimate(
        &self,
        input: EstimateInput,
        numbering: NumberingSettings,
    ) -> Result<Estimate> {
        validate_dates(input.date.as_deref(), input.valid_until.as_deref())?;
        validate_line_items(&input.items)?;
        if let Some(number) = &input.number {
            if number.trim().is_empty() {
                bail!("Estimate number must not be blank");
            }
        }

        self.execute(move |conn| {
            let tx = conn.transaction()?;

            ensure_customer(&tx, input.customer_id)?;

            let number = match input.number {
                Some(number) => number.trim().to_string(),
                None => next_estimate_number(&tx, numbering.first_number)?,
            };
            if resolve_number(&tx, &number)?.is_some() {
                bail!("Estimate number {number} already exists");
            }

            let date = match input.date {
                Some(date) => parse_iso_date(&date, "date")?,
                None => Local::now().date_naive(),
            };
            let valid_until = match input.valid_until {
                Some(valid_until) => valid_until,
                None => (date + Duration::days(numbering.valid_days))
                    .format(ISO_DATE_FORMAT)
                    .to_string(),
            };
            let status = input
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DRAFT_STATUS.to_string());
            let estimate_type = input
                .estimate_type
                .unwrap_or_else(|| EstimateType::for_status(&status));

            tx.execute(
                "INSERT INTO estimates (number, date, valid_until, status, type, notes, customer_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    number,
                    date.format(ISO_DATE_FORMAT).to_string(),
                    valid_until,
                    status,
                    estimate_type.as_str(),
                    input.notes.unwrap_or_default(),
                    input.customer_id,
                ],
            )
            .with_context(|| format!("failed to insert estimate {number}"))?;

            let estimate_id = tx.last_insert_rowid();
            insert_line_items(&tx, estimate_id, &input.items)?;

            let estimate = load_estimate(&tx, estimate_id)?
                .ok_or_else(|| anyhow!("Estimate not found after insert"))?;
            tx.commit()?;

            Ok(estimate)
        })
        .await
    }

    /// Overwrite the fields present in `update`. `items` replaces every line
    /// item of the estimate.
    pub async fn update_estimate(&self, estimate_id: i64, update: EstimateUpdate) -> Result<Estimate> {
        validate_dates(update.date.as_deref(), update.valid_until.as_deref())?;
        if let Some(items) = &update.items {
            validate_line_items(items)?;
        }

        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM estimates WHERE id = ?1",
                    params![estimate_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                bail!("Estimate {estimate_id} not found");
            }

            ensure_customer(&tx, update.customer_id)?;

            let mut updates = Vec::new();
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(date) = update.date {
                updates.push("date = ?");
                params_vec.push(Box::new(date));
            }
            if let Some(valid_until) = update.valid_until {
                updates.push("valid_until = ?");
                params_vec.push(Box::new(valid_until));
            }
            if let Some(status) = update.status {
                updates.push("status = ?");
                params_vec.push(Box::new(status));
            }
            if let Some(estimate_type) = update.estimate_type {
                updates.push("type = ?");
                params_vec.push(Box::new(estimate_type.as_str()));
            }
            if let Some(customer_id) = update.customer_id {
                updates.push("customer_id = ?");
                params_vec.push(Box::new(customer_id));
            }
            if let Some(notes) = update.notes {
                updates.push("notes = ?");
                params_vec.push(Box::new(notes));
            }

            if !updates.is_empty() {
                let query = format!("UPDATE estimates SET {} WHERE id = ?", updates.join(", "));
                params_vec.push(Box::new(estimate_id));

                let params_refs: Vec<&dyn rusqlite::ToSql> =
                    params_vec.iter().map(|b| b.as_ref()).collect();
                tx.execute(&query, params_refs.as_slice())?;
            }

            if let Some(items) = update.items {
                tx.execute(
                    "DELETE FROM line_items WHERE estimate_id = ?1",
                    params![estimate_id],
                )?;
                insert_line_items(&tx, estimate_id, &items)?;
            }

            let estimate = load_estimate(&tx, estimate_id)?
                .ok_or_else(|| anyhow!("Estimate not found after update"))?;
            tx.commit()?;

            Ok(estimate)
        })
        .await
    }

    /// Set the status of the estimate identified by id or number. `Draft`
    /// keeps it in the draft tab; any other status makes it active.
    pub async fn update_estimate_status(&self, key: &str, status: &str) -> Result<Estimate> {
        let status = status.trim().to_string();
        if status.is_empty() {
            bail!("Status must not be blank");
        }
        let key = key.trim().to_string();

        self.execute(move |conn| {
            let estimate_id = resolve_estimate_id(conn, &key)?
                .ok_or_else(|| anyhow!("Estimate {key} not found"))?;

            conn.execute(
                "UPDATE estimates SET status = ?1, type = ?2 WHERE id = ?3",
                params![
                    status,
                    EstimateType::for_status(&status).as_str(),
                    estimate_id
                ],
            )?;

            load_estimate(conn, estimate_id)?
                .ok_or_else(|| anyhow!("Estimate not found after status update"))
        })
        .await
    }

    /// Delete an estimate together with its line items.
    pub async fn delete_estimate(&self, estimate_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let rows_affected =
                conn.execute("DELETE FROM estimates WHERE id = ?1", params![estimate_id])?;
            if rows_affected == 0 {
                bail!("Estimate {estimate_id} not found");
            }
            Ok(())
        })
        .await
    }
}

fn resolve_number(conn: &Connection, number: &str) -> Result<Option<i64>> {
    let found = conn
        .query_row(
            "SELECT id FROM estimates WHERE number = ?1",
            params![number],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found)
}
