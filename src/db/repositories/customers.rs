use anyhow::{anyhow, bail, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{like_pattern, search_term},
    models::{Customer, CustomerInput},
};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, first_name, last_name";

fn row_to_customer(row: &Row) -> Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
    })
}

pub(crate) fn fetch_customer(conn: &Connection, customer_id: i64) -> Result<Option<Customer>> {
    let customer = conn
        .query_row(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"),
            params![customer_id],
            row_to_customer,
        )
        .optional()?;
    Ok(customer)
}

pub(crate) fn insert_customer(conn: &Connection, input: &CustomerInput) -> Result<i64> {
    conn.execute(
        "INSERT INTO customers (name, email, phone, first_name, last_name)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            input.name.trim(),
            input.email,
            input.phone,
            input.first_name,
            input.last_name,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    /// All customers ordered by id, optionally narrowed to names containing
    /// `search` (case-insensitive).
    pub async fn list_customers(&self, search: Option<String>) -> Result<Vec<Customer>> {
        let search = search_term(search);
        self.execute(move |conn| {
            let customers = match search {
                Some(term) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {CUSTOMER_COLUMNS} FROM customers
                         WHERE name LIKE ?1 ESCAPE '\\'
                         ORDER BY id ASC"
                    ))?;
                    let rows = stmt
                        .query_map(params![like_pattern(&term)], row_to_customer)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id ASC"
                    ))?;
                    let rows = stmt
                        .query_map([], row_to_customer)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
            };

            Ok(customers)
        })
        .await
    }

    pub async fn get_customer(&self, customer_id: i64) -> Result<Option<Customer>> {
        self.execute(move |conn| fetch_customer(conn, customer_id))
            .await
    }

    /// Create a new customer. The name must not be blank.
    pub async fn create_customer(&self, input: CustomerInput) -> Result<Customer> {
        if input.name.trim().is_empty() {
            bail!("Customer name is required");
        }

        self.execute(move |conn| {
            let customer_id = insert_customer(conn, &input)?;
            fetch_customer(conn, customer_id)?
                .ok_or_else(|| anyhow!("Customer not found after insert"))
        })
        .await
    }

    pub async fn count_customers(&self) -> Result<i64> {
        self.execute(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }
}
