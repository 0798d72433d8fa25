use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard},
};

/// Letterhead printed on exported receipts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptSettings {
    pub company_name: String,
    pub company_country: String,
    pub currency_code: String,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        Self {
            company_name: "Coworking Cube".into(),
            company_country: "Canada".into(),
            currency_code: "CAD".into(),
        }
    }
}

/// Defaults applied when an estimate is created without a number or
/// validity date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberingSettings {
    pub first_number: u64,
    pub valid_days: i64,
}

impl Default for NumberingSettings {
    fn default() -> Self {
        Self {
            first_number: 45303,
            valid_days: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
struct UserSettings {
    receipt: ReceiptSettings,
    numbering: NumberingSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn receipt(&self) -> ReceiptSettings {
        self.read().receipt.clone()
    }

    pub fn numbering(&self) -> NumberingSettings {
        self.read().numbering.clone()
    }

    pub fn update_receipt(&self, settings: ReceiptSettings) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.receipt = settings;
        self.persist(&guard)
    }

    pub fn update_numbering(&self, settings: NumberingSettings) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.numbering = settings;
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        assert_eq!(store.receipt(), ReceiptSettings::default());
        assert_eq!(store.numbering().first_number, 45303);
        assert_eq!(store.numbering().valid_days, 30);
    }

    #[test]
    fn updates_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_receipt(ReceiptSettings {
                company_name: "Harbour Supplies".into(),
                ..ReceiptSettings::default()
            })
            .unwrap();

        store
            .update_numbering(NumberingSettings {
                first_number: 1000,
                valid_days: 14,
            })
            .unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.receipt().company_name, "Harbour Supplies");
        assert_eq!(reopened.receipt().currency_code, "CAD");
        assert_eq!(reopened.numbering().first_number, 1000);
        assert_eq!(reopened.numbering().valid_days, 14);
    }

    #[test]
    fn partial_and_malformed_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();

        let partial = dir.path().join("partial.json");
        fs::write(&partial, r#"{"numbering":{"validDays":14}}"#).unwrap();
        let store = SettingsStore::new(partial).unwrap();
        assert_eq!(store.numbering().valid_days, 14);
        assert_eq!(store.numbering().first_number, 45303);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        let store = SettingsStore::new(broken).unwrap();
        assert_eq!(store.receipt(), ReceiptSettings::default());
    }
}
