pub mod customers;
pub mod db;
pub mod estimates;
pub mod items;
pub mod receipt;
pub mod settings;
pub mod utils;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use db::Database;
use estimates::EstimateStore;
use settings::SettingsStore;

pub const DATABASE_FILE: &str = "estimates.sqlite3";
pub const SETTINGS_FILE: &str = "settings.json";
pub const RECEIPTS_DIR: &str = "receipts";

/// Everything a command needs: storage, the local estimate set mirrored
/// from it, and user settings.
pub struct AppState {
    pub db: Database,
    pub estimates: EstimateStore,
    pub settings: SettingsStore,
    data_dir: PathBuf,
}

impl AppState {
    /// Open (creating if needed) the data directory, seed an empty database
    /// and load the local estimate set.
    pub async fn open(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir).with_context(|| {
            format!("failed to create data directory {}", data_dir.display())
        })?;

        let database = Database::new(data_dir.join(DATABASE_FILE))?;
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;

        if database.seed_if_empty().await? {
            info!("Seeded new database at {}", database.path().display());
        }

        let estimates = database
            .list_estimates()
            .await
            .context("failed to load estimates")?;
        info!("Loaded {} estimates", estimates.len());

        Ok(Self {
            db: database,
            estimates: EstimateStore::new(estimates),
            settings,
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.data_dir.join(RECEIPTS_DIR)
    }
}
