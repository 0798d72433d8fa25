use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::models::Estimate;

/// In-memory mirror of the persisted estimates, newest additions first.
///
/// Commands mutate it after every successful write so the list view never
/// has to re-read the database.
#[derive(Default)]
pub struct EstimateStore {
    data: RwLock<Vec<Estimate>>,
}

impl EstimateStore {
    pub fn new(estimates: Vec<Estimate>) -> Self {
        Self {
            data: RwLock::new(estimates),
        }
    }

    pub fn snapshot(&self) -> Vec<Estimate> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn replace_all(&self, estimates: Vec<Estimate>) {
        *self.write() = estimates;
    }

    /// Prepends a newly created estimate.
    pub fn add(&self, estimate: Estimate) {
        self.write().insert(0, estimate);
    }

    /// Overwrites the record with `id`. Returns false when none matched.
    pub fn update(&self, id: i64, estimate: Estimate) -> bool {
        let mut guard = self.write();
        match guard.iter_mut().find(|e| e.id == id) {
            Some(slot) => {
                *slot = estimate;
                true
            }
            None => false,
        }
    }

    /// Overwrites every record whose id parses from `key` or whose number is
    /// `key`. Returns how many records were replaced.
    pub fn update_by_key(&self, key: &str, estimate: Estimate) -> usize {
        let id = key.parse::<i64>().ok();
        let mut guard = self.write();
        let mut replaced = 0;
        for slot in guard
            .iter_mut()
            .filter(|e| Some(e.id) == id || e.number == key)
        {
            *slot = estimate.clone();
            replaced += 1;
        }
        replaced
    }

    pub fn remove(&self, id: i64) -> bool {
        let mut guard = self.write();
        let before = guard.len();
        guard.retain(|e| e.id != id);
        guard.len() != before
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Estimate>> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Estimate>> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimates::seed::seed_estimates;

    fn numbers(store: &EstimateStore) -> Vec<String> {
        store.snapshot().into_iter().map(|e| e.number).collect()
    }

    #[test]
    fn add_prepends() {
        let seed = seed_estimates();
        let store = EstimateStore::new(vec![seed[0].clone()]);
        store.add(seed[1].clone());

        assert_eq!(numbers(&store), vec!["45304", "45303"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_overwrites_by_id() {
        let seed = seed_estimates();
        let store = EstimateStore::new(seed[..2].to_vec());

        let mut edited = seed[1].clone();
        edited.status = "Sent".into();
        assert!(store.update(edited.id, edited.clone()));
        assert_eq!(store.snapshot()[1], edited);

        assert!(!store.update(99, edited));
    }

    #[test]
    fn update_by_key_accepts_id_or_number() {
        let seed = seed_estimates();
        let store = EstimateStore::new(seed[..3].to_vec());

        let mut edited = seed[2].clone();
        edited.status = "Accepted".into();
        assert_eq!(store.update_by_key("45305", edited.clone()), 1);
        assert_eq!(store.snapshot()[2].status, "Accepted");

        edited.status = "Sent".into();
        assert_eq!(store.update_by_key("3", edited.clone()), 1);
        assert_eq!(store.snapshot()[2].status, "Sent");

        edited.status = "Declined".into();
        assert_eq!(store.update_by_key("+3", edited), 1);
        assert_eq!(store.snapshot()[2].status, "Declined");

        assert_eq!(store.update_by_key("nope", seed[0].clone()), 0);
    }

    #[test]
    fn remove_and_replace() {
        let seed = seed_estimates();
        let store = EstimateStore::default();
        assert!(store.is_empty());

        store.replace_all(seed.to_vec());
        assert!(store.remove(1));
        assert!(!store.remove(1));
        assert_eq!(store.len(), seed.len() - 1);
    }
}
