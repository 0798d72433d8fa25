use std::path::PathBuf;

use crate::{
    db::models::{Estimate, EstimateInput, EstimateUpdate},
    log_info, log_warn,
    receipt::{default_receipt_path, render_receipt, write_receipt},
    AppState,
};

use super::{
    reconciler::{self, EstimateListView},
    seed::seed_estimates,
    selection::FilterSelection,
};

const ENABLE_LOGS: bool = true;

/// Reload the local estimate set from storage.
pub async fn refresh_estimates(state: &AppState) -> Result<Vec<Estimate>, String> {
    let estimates = state.db.list_estimates().await.map_err(|e| e.to_string())?;
    state.estimates.replace_all(estimates.clone());
    Ok(estimates)
}

/// Local estimates merged with the seed set, filtered by `selection`.
pub async fn list_estimates(
    state: &AppState,
    selection: FilterSelection,
) -> Result<EstimateListView, String> {
    let local = state.estimates.snapshot();
    Ok(reconciler::reconcile(&local, seed_estimates(), &selection))
}

/// Finds an estimate in the reconciled list by id or number.
pub async fn get_estimate(state: &AppState, key: String) -> Result<Estimate, String> {
    let key = key.trim();
    let id = key.parse::<i64>().ok();
    let merged = reconciler::merge(&state.estimates.snapshot(), seed_estimates());

    merged
        .iter()
        .find(|e| Some(e.id) == id)
        .or_else(|| merged.iter().find(|e| e.number == key))
        .cloned()
        .ok_or_else(|| format!("Estimate {key} not found"))
}

pub async fn create_estimate(state: &AppState, input: EstimateInput) -> Result<Estimate, String> {
    let created = state
        .db
        .create_estimate(input, state.settings.numbering())
        .await
        .map_err(|e| e.to_string())?;

    log_info!("Created estimate {} (id {})", created.number, created.id);
    state.estimates.add(created.clone());
    Ok(created)
}

pub async fn update_estimate(
    state: &AppState,
    estimate_id: i64,
    update: EstimateUpdate,
) -> Result<Estimate, String> {
    let updated = state
        .db
        .update_estimate(estimate_id, update)
        .await
        .map_err(|e| e.to_string())?;

    if !state.estimates.update(estimate_id, updated.clone()) {
        log_warn!("Estimate {estimate_id} was missing from the local store; prepending");
        state.estimates.add(updated.clone());
    }
    Ok(updated)
}

pub async fn update_estimate_status(
    state: &AppState,
    key: String,
    status: String,
) -> Result<Estimate, String> {
    let updated = state
        .db
        .update_estimate_status(&key, &status)
        .await
        .map_err(|e| e.to_string())?;

    log_info!("Estimate {} is now {}", updated.number, updated.status);
    if state.estimates.update_by_key(key.trim(), updated.clone()) == 0 {
        state.estimates.add(updated.clone());
    }
    Ok(updated)
}

pub async fn delete_estimate(state: &AppState, estimate_id: i64) -> Result<(), String> {
    state
        .db
        .delete_estimate(estimate_id)
        .await
        .map_err(|e| e.to_string())?;

    state.estimates.remove(estimate_id);
    log_info!("Deleted estimate {estimate_id}");
    Ok(())
}

/// Render the receipt for `key` and write it to `output`, or to the
/// receipts directory when no path is given. Returns the written path.
pub async fn export_receipt(
    state: &AppState,
    key: String,
    output: Option<PathBuf>,
) -> Result<PathBuf, String> {
    let estimate = get_estimate(state, key).await?;
    let html = render_receipt(&estimate, &state.settings.receipt());

    let path = output
        .unwrap_or_else(|| default_receipt_path(&state.receipts_dir(), &estimate.number));
    write_receipt(&path, &html).map_err(|e| e.to_string())?;

    log_info!("Exported receipt for {} to {}", estimate.number, path.display());
    Ok(path)
}
