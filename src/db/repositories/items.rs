use anyhow::{anyhow, bail, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{like_pattern, search_term},
    models::{Item, ItemInput},
};

fn row_to_item(row: &Row) -> Result<Item, rusqlite::Error> {
    Ok(Item {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price: row.get("price")?,
    })
}

pub(crate) fn fetch_item(conn: &Connection, item_id: i64) -> Result<Option<Item>> {
    let item = conn
        .query_row(
            "SELECT id, name, description, price FROM items WHERE id = ?1",
            params![item_id],
            row_to_item,
        )
        .optional()?;
    Ok(item)
}

pub(crate) fn insert_item(conn: &Connection, input: &ItemInput) -> Result<i64> {
    conn.execute(
        "INSERT INTO items (name, description, price) VALUES (?1, ?2, ?3)",
        params![input.name.trim(), input.description, input.price],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    /// Catalog items ordered by id, optionally narrowed by name.
    pub async fn list_items(&self, search: Option<String>) -> Result<Vec<Item>> {
        let pattern = search_term(search).map(|term| like_pattern(&term));
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, price
                 FROM items
                 WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\\'
                 ORDER BY id ASC",
            )?;

            let items = stmt
                .query_map(params![pattern], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(items)
        })
        .await
    }

    pub async fn get_item(&self, item_id: i64) -> Result<Option<Item>> {
        self.execute(move |conn| fetch_item(conn, item_id)).await
    }

    pub async fn create_item(&self, input: ItemInput) -> Result<Item> {
        if input.name.trim().is_empty() {
            bail!("Item name is required");
        }
        if !input.price.is_finite() || input.price < 0.0 {
            bail!("Item price must be a non-negative number");
        }

        self.execute(move |conn| {
            let item_id = insert_item(conn, &input)?;
            fetch_item(conn, item_id)?.ok_or_else(|| anyhow!("Item not found after insert"))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_list_and_search() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("estimates.sqlite3")).unwrap();

        let laptop = db
            .create_item(ItemInput {
                name: "HP Laptop".into(),
                description: "RTX 2050".into(),
                price: 450.0,
            })
            .await
            .unwrap();
        db.create_item(ItemInput {
            name: "Pen".into(),
            description: "Blue Pen".into(),
            price: 10.0,
        })
        .await
        .unwrap();

        assert_eq!(db.list_items(None).await.unwrap().len(), 2);
        assert_eq!(db.list_items(Some("laptop".into())).await.unwrap(), vec![laptop.clone()]);
        assert_eq!(db.get_item(laptop.id).await.unwrap(), Some(laptop));
    }

    #[tokio::test]
    async fn rejects_invalid_items() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("estimates.sqlite3")).unwrap();

        let nameless = ItemInput::default();
        assert!(db.create_item(nameless).await.is_err());

        let negative = ItemInput {
            name: "Refund".into(),
            price: -5.0,
            ..ItemInput::default()
        };
        assert!(db.create_item(negative).await.is_err());
    }
}
