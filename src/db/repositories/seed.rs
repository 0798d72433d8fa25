use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::params;

use crate::{
    db::{
        connection::Database,
        models::{CustomerInput, ItemInput},
        repositories::{customers::insert_customer, items::insert_item},
    },
    estimates::seed::{SEED_CUSTOMERS, SEED_ESTIMATES, SEED_ITEMS},
    log_info,
};

const ENABLE_LOGS: bool = true;

impl Database {
    /// Insert the seed customers, catalog items and estimates when the
    /// database has no customers yet. Returns whether anything was seeded.
    pub async fn seed_if_empty(&self) -> Result<bool> {
        self.execute(|conn| {
            let customers: i64 =
                conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
            if customers > 0 {
                return Ok(false);
            }

            let tx = conn.transaction().context("failed to open seed transaction")?;

            let mut customer_ids = HashMap::new();
            for customer in SEED_CUSTOMERS {
                let id = insert_customer(
                    &tx,
                    &CustomerInput {
                        name: customer.name.into(),
                        email: customer.email.into(),
                        phone: customer.phone.into(),
                        ..CustomerInput::default()
                    },
                )?;
                customer_ids.insert(customer.name, id);
            }

            let mut item_ids = HashMap::new();
            for item in SEED_ITEMS {
                let id = insert_item(
                    &tx,
                    &ItemInput {
                        name: item.name.into(),
                        description: item.description.into(),
                        price: item.price,
                    },
                )?;
                item_ids.insert(item.name, id);
            }

            for estimate in SEED_ESTIMATES {
                tx.execute(
                    "INSERT INTO estimates (number, date, valid_until, status, type, customer_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        estimate.number,
                        estimate.date,
                        estimate.valid_until,
                        estimate.status,
                        estimate.estimate_type.as_str(),
                        customer_ids.get(estimate.customer),
                    ],
                )
                .with_context(|| format!("failed to seed estimate {}", estimate.number))?;
                let estimate_id = tx.last_insert_rowid();

                for (position, line) in estimate.lines.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO line_items
                             (estimate_id, item_id, name, description, quantity, price, position)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            estimate_id,
                            item_ids.get(line.name),
                            line.name,
                            line.description,
                            line.quantity,
                            line.price,
                            position as i64,
                        ],
                    )?;
                }
            }

            tx.commit().context("failed to commit seed data")?;

            log_info!(
                "Seeded {} customers, {} items and {} estimates",
                SEED_CUSTOMERS.len(),
                SEED_ITEMS.len(),
                SEED_ESTIMATES.len()
            );

            Ok(true)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimates::seed::seed_estimates;

    #[tokio::test]
    async fn seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("estimates.sqlite3")).unwrap();

        assert!(db.seed_if_empty().await.unwrap());
        assert!(!db.seed_if_empty().await.unwrap());

        assert_eq!(db.count_customers().await.unwrap(), SEED_CUSTOMERS.len() as i64);
        assert_eq!(db.list_items(None).await.unwrap().len(), SEED_ITEMS.len());
    }

    #[tokio::test]
    async fn seeded_rows_match_static_seed() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("estimates.sqlite3")).unwrap();
        db.seed_if_empty().await.unwrap();

        let stored = db.list_estimates().await.unwrap();
        let seed = seed_estimates();
        assert_eq!(stored.len(), seed.len());

        for (stored, seed) in stored.iter().zip(seed) {
            assert_eq!(stored.number, seed.number);
            assert_eq!(stored.customer, seed.customer);
            assert_eq!(stored.amount, seed.amount);
            assert_eq!(stored.estimate_type, seed.estimate_type);
            assert!(stored.customer_obj.is_some());
            assert!(stored.items.iter().all(|item| item.item_id.is_some()));
        }
    }

    #[tokio::test]
    async fn existing_customers_block_seeding() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("estimates.sqlite3")).unwrap();
        db.create_customer(CustomerInput {
            name: "Walk-in".into(),
            ..CustomerInput::default()
        })
        .await
        .unwrap();

        assert!(!db.seed_if_empty().await.unwrap());
        assert!(db.list_estimates().await.unwrap().is_empty());
    }
}
