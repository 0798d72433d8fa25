use crate::{
    db::models::{Customer, CustomerInput},
    AppState,
};

pub async fn list_customers(
    state: &AppState,
    search: Option<String>,
) -> Result<Vec<Customer>, String> {
    state
        .db
        .list_customers(search)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_customer(state: &AppState, customer_id: i64) -> Result<Customer, String> {
    state
        .db
        .get_customer(customer_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Customer {customer_id} not found"))
}

pub async fn create_customer(state: &AppState, input: CustomerInput) -> Result<Customer, String> {
    state
        .db
        .create_customer(input)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path().to_path_buf()).await.unwrap();

        let created = create_customer(
            &state,
            CustomerInput {
                name: "Ruwan Jayasuriya".into(),
                email: "ruwan@example.com".into(),
                ..CustomerInput::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(get_customer(&state, created.id).await.unwrap(), created);
        assert_eq!(
            list_customers(&state, Some("ruwan".into())).await.unwrap(),
            vec![created]
        );
        assert_eq!(
            get_customer(&state, 4242).await.unwrap_err(),
            "Customer 4242 not found"
        );
    }
}
