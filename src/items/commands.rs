use crate::{
    db::models::{Item, ItemInput},
    AppState,
};

pub async fn list_items(state: &AppState, search: Option<String>) -> Result<Vec<Item>, String> {
    let db = &state.db;
    db.list_items(search).await.map_err(|e| e.to_string())
}

pub async fn get_item(state: &AppState, item_id: i64) -> Result<Item, String> {
    let db = &state.db;
    db.get_item(item_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Item {item_id} not found"))
}

pub async fn create_item(state: &AppState, input: ItemInput) -> Result<Item, String> {
    let db = &state.db;
    db.create_item(input).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_catalog_is_searchable() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path().to_path_buf()).await.unwrap();

        let pens = list_items(&state, Some("pen".into())).await.unwrap();
        assert_eq!(pens.len(), 1);
        assert_eq!(get_item(&state, pens[0].id).await.unwrap().price, 10.0);

        let created = create_item(
            &state,
            ItemInput {
                name: "Stapler".into(),
                price: 6.5,
                ..ItemInput::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(list_items(&state, None).await.unwrap().len(), 3);
        assert_eq!(get_item(&state, created.id).await.unwrap(), created);
        assert!(get_item(&state, 999).await.is_err());
    }
}
