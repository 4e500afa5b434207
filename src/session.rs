use std::{
    borrow::Borrow,
    collections::{HashMap, HashSet, hash_map::Entry},
    hash::Hash,
};

use crate::models::{Country, Genre, Network, ShowAggregate};

/// Natural key to entity map for one run. Holds entities loaded from the
/// store as well as entities created during the run; only the latter are
/// written at commit, in first-sighting order.
#[derive(Debug)]
struct PendingMap<K, V> {
    entries: HashMap<K, V>,
    created: Vec<K>,
}

impl<K, V> Default for PendingMap<K, V> {
    fn default() -> Self {
        Self { entries: HashMap::new(), created: Vec::new() }
    }
}

impl<K: Eq + Hash + Clone, V> PendingMap<K, V> {
    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key)
    }

    fn remember(&mut self, key: K, value: V) {
        self.entries.entry(key).or_insert(value);
    }

    /// Returns the existing entry for `key` if there is one, so a key is
    /// never created twice.
    fn create(&mut self, key: K, value: V) -> &V {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.created.push(entry.key().clone());
                entry.insert(value)
            },
        }
    }

    fn created_len(&self) -> usize {
        self.created.len()
    }

    fn into_created(self) -> Vec<V> {
        let Self { mut entries, created } = self;
        created.into_iter().filter_map(|key| entries.remove(&key)).collect()
    }
}

/// Unit of work for a single run: the pending cache of shared entities and
/// the shows staged for insertion. Never outlives the run that created it.
#[derive(Debug, Default)]
pub struct IngestSession {
    genres: PendingMap<String, Genre>,
    networks: PendingMap<i32, Network>,
    countries: PendingMap<i32, Country>,
    shows: Vec<ShowAggregate>,
    staged_ids: HashSet<i32>,
}

impl IngestSession {
    pub fn genre(&self, name: &str) -> Option<&Genre> {
        self.genres.get(name)
    }

    pub fn remember_genre(&mut self, genre: Genre) {
        self.genres.remember(genre.name.clone(), genre);
    }

    pub fn create_genre(&mut self, name: &str) -> &Genre {
        self.genres.create(name.to_string(), Genre { id: None, name: name.to_string() })
    }

    pub fn network(&self, id: i32) -> Option<&Network> {
        self.networks.get(&id)
    }

    pub fn remember_network(&mut self, network: Network) {
        self.networks.remember(network.id, network);
    }

    pub fn create_network(&mut self, network: Network) -> &Network {
        self.networks.create(network.id, network)
    }

    pub fn country(&self, id: i32) -> Option<&Country> {
        self.countries.get(&id)
    }

    pub fn remember_country(&mut self, country: Country) {
        self.countries.remember(country.id, country);
    }

    pub fn create_country(&mut self, country: Country) -> &Country {
        self.countries.create(country.id, country)
    }

    pub fn is_staged(&self, show_id: i32) -> bool {
        self.staged_ids.contains(&show_id)
    }

    pub fn stage(&mut self, show: ShowAggregate) {
        if self.staged_ids.insert(show.id) {
            self.shows.push(show);
        }
    }

    pub fn staged_shows(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    pub fn pending_counts(&self) -> (usize, usize, usize) {
        (self.genres.created_len(), self.networks.created_len(), self.countries.created_len())
    }

    pub fn into_batch(self) -> StagedBatch {
        StagedBatch {
            countries: self.countries.into_created(),
            networks: self.networks.into_created(),
            genres: self.genres.into_created(),
            shows: self.shows,
        }
    }
}

/// Everything one commit writes. Countries come before networks and
/// networks before shows so references always point at existing rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StagedBatch {
    pub countries: Vec<Country>,
    pub networks: Vec<Network>,
    pub genres: Vec<Genre>,
    pub shows: Vec<ShowAggregate>,
}

impl StagedBatch {
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
            && self.networks.is_empty()
            && self.genres.is_empty()
            && self.shows.is_empty()
    }
}
