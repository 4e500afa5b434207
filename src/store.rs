use async_trait::async_trait;

use crate::{
    error::SyncResult,
    models::{Country, Genre, Network},
    session::StagedBatch,
};

/// Persisted-store operations the ingestion run depends on. Lookups read
/// committed data only; `commit` writes one staged batch atomically.
#[async_trait]
pub trait ShowStore: Send + Sync {
    async fn show_exists(&self, id: i32) -> SyncResult<bool>;

    async fn genre_by_name(&self, name: &str) -> SyncResult<Option<Genre>>;

    async fn network_by_id(&self, id: i32) -> SyncResult<Option<Network>>;

    async fn country_by_id(&self, id: i32) -> SyncResult<Option<Country>>;

    async fn commit(&self, batch: StagedBatch) -> SyncResult<()>;
}

#[cfg(test)]
pub mod memory {
    use std::{
        collections::{BTreeMap, HashMap},
        sync::Mutex,
    };

    use super::*;
    use crate::{error::SyncError, models::ShowAggregate};

    #[derive(Debug, Default)]
    pub struct MemoryState {
        pub shows: BTreeMap<i32, ShowAggregate>,
        pub genres: Vec<Genre>,
        pub networks: BTreeMap<i32, Network>,
        pub countries: BTreeMap<i32, Country>,
        pub existence_checks: usize,
        pub commits: usize,
        pub batches: Vec<StagedBatch>,
    }

    /// Store fake that records every call and applies commits in memory.
    #[derive(Default)]
    pub struct MemoryStore {
        state: Mutex<MemoryState>,
        reject_commits: bool,
        fail_show_checks: bool,
        fail_entity_lookups: bool,
    }

    fn unavailable() -> SyncError {
        SyncError::Store(sea_orm::DbErr::Custom("database is locked".to_string()))
    }

    impl MemoryStore {
        pub fn rejecting_commits() -> Self {
            Self { reject_commits: true, ..Self::default() }
        }

        pub fn failing_show_checks() -> Self {
            Self { fail_show_checks: true, ..Self::default() }
        }

        pub fn failing_entity_lookups() -> Self {
            Self { fail_entity_lookups: true, ..Self::default() }
        }

        pub fn state<R>(&self, f: impl FnOnce(&MemoryState) -> R) -> R {
            f(&self.state.lock().unwrap())
        }

        pub fn seed_show(&self, id: i32) {
            let show = ShowAggregate {
                id,
                name: Some(format!("seeded {id}")),
                language: None,
                externals: None,
                rating: None,
                network_id: None,
                genres: Vec::new(),
            };
            self.state.lock().unwrap().shows.insert(id, show);
        }

        pub fn seed_genre(&self, name: &str) -> i32 {
            let mut state = self.state.lock().unwrap();
            let id = state.genres.len() as i32 + 1;
            state.genres.push(Genre { id: Some(id), name: name.to_string() });
            id
        }

        pub fn seed_network(&self, network: Network) {
            self.state.lock().unwrap().networks.insert(network.id, network);
        }

        pub fn seed_country(&self, country: Country) {
            self.state.lock().unwrap().countries.insert(country.id, country);
        }
    }

    #[async_trait]
    impl ShowStore for MemoryStore {
        async fn show_exists(&self, id: i32) -> SyncResult<bool> {
            let mut state = self.state.lock().unwrap();
            state.existence_checks += 1;
            if self.fail_show_checks {
                return Err(unavailable());
            }
            Ok(state.shows.contains_key(&id))
        }

        async fn genre_by_name(&self, name: &str) -> SyncResult<Option<Genre>> {
            if self.fail_entity_lookups {
                return Err(unavailable());
            }
            let state = self.state.lock().unwrap();
            Ok(state.genres.iter().find(|g| g.name == name).cloned())
        }

        async fn network_by_id(&self, id: i32) -> SyncResult<Option<Network>> {
            if self.fail_entity_lookups {
                return Err(unavailable());
            }
            Ok(self.state.lock().unwrap().networks.get(&id).cloned())
        }

        async fn country_by_id(&self, id: i32) -> SyncResult<Option<Country>> {
            if self.fail_entity_lookups {
                return Err(unavailable());
            }
            Ok(self.state.lock().unwrap().countries.get(&id).cloned())
        }

        async fn commit(&self, batch: StagedBatch) -> SyncResult<()> {
            if self.reject_commits {
                return Err(SyncError::Store(sea_orm::DbErr::Custom(
                    "UNIQUE constraint failed: show.id".to_string(),
                )));
            }

            let mut state = self.state.lock().unwrap();
            state.commits += 1;
            state.batches.push(batch.clone());

            for country in batch.countries {
                state.countries.insert(country.id, country);
            }
            for network in batch.networks {
                state.networks.insert(network.id, network);
            }
            let mut assigned = HashMap::new();
            for genre in batch.genres {
                let id = state.genres.len() as i32 + 1;
                assigned.insert(genre.name.clone(), id);
                state.genres.push(Genre { id: Some(id), name: genre.name });
            }
            for mut show in batch.shows {
                for genre in &mut show.genres {
                    genre.id = genre.id.or_else(|| assigned.get(&genre.name).copied());
                }
                state.shows.insert(show.id, show);
            }
            Ok(())
        }
    }
}
