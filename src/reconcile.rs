use tracing::debug;

use crate::{
    error::SyncResult,
    models::{Country, CountryRecord, Genre, Network, NetworkRecord},
    session::IngestSession,
    store::ShowStore,
};

/// Maps genre, network and country references to one canonical entity per
/// natural key. Each lookup checks the run's pending cache before the store,
/// and only creates an entity when both miss.
pub struct EntityReconciler<'a, S: ?Sized> {
    store: &'a S,
    session: &'a mut IngestSession,
}

impl<'a, S: ShowStore + ?Sized> EntityReconciler<'a, S> {
    pub fn new(store: &'a S, session: &'a mut IngestSession) -> Self {
        Self { store, session }
    }

    /// Blank or missing names resolve to `None`. Names match exactly,
    /// including case.
    pub async fn resolve_genre(&mut self, name: Option<&str>) -> SyncResult<Option<Genre>> {
        let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
            return Ok(None);
        };

        if let Some(genre) = self.session.genre(name) {
            return Ok(Some(genre.clone()));
        }

        if let Some(genre) = self.store.genre_by_name(name).await? {
            self.session.remember_genre(genre.clone());
            return Ok(Some(genre));
        }

        debug!(genre = %name, "staging new genre");
        Ok(Some(self.session.create_genre(name).clone()))
    }

    /// A network found in the cache or the store is returned as is, without
    /// looking at the record's country.
    pub async fn resolve_network(&mut self, record: &NetworkRecord) -> SyncResult<Network> {
        if let Some(network) = self.session.network(record.id) {
            return Ok(network.clone());
        }

        if let Some(network) = self.store.network_by_id(record.id).await? {
            self.session.remember_network(network.clone());
            return Ok(network);
        }

        let country_id = match &record.country {
            Some(country) => Some(self.resolve_country(country).await?.id),
            None => None,
        };

        debug!(network_id = record.id, country_id = ?country_id, "staging new network");
        let network = Network { id: record.id, name: record.name.clone(), country_id };
        Ok(self.session.create_network(network).clone())
    }

    pub async fn resolve_country(&mut self, record: &CountryRecord) -> SyncResult<Country> {
        if let Some(country) = self.session.country(record.id) {
            return Ok(country.clone());
        }

        if let Some(country) = self.store.country_by_id(record.id).await? {
            self.session.remember_country(country.clone());
            return Ok(country);
        }

        debug!(country_id = record.id, code = ?record.code, "staging new country");
        Ok(self.session.create_country(Country::from(record)).clone())
    }
}
