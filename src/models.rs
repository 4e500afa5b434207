use serde::{Deserialize, Serialize};

// Catalog wire records. Every nullable field of the upstream payload is an
// explicit `Option`; unknown fields are ignored.

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShowRecord {
    pub id: i32,
    pub name: Option<String>,
    pub language: Option<String>,
    pub genres: Option<Vec<Option<String>>>,
    pub externals: Option<ExternalsRecord>,
    pub network: Option<NetworkRecord>,
    pub rating: Option<RatingRecord>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ExternalsRecord {
    pub imdb: Option<String>,
    pub tvrage: Option<i32>,
    pub thetvdb: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NetworkRecord {
    pub id: i32,
    pub name: Option<String>,
    pub country: Option<CountryRecord>,
}

/// The public catalog omits the country id, so a missing id decodes as 0.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CountryRecord {
    #[serde(default)]
    pub id: i32,
    pub name: Option<String>,
    pub code: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RatingRecord {
    pub average: Option<f64>,
}

/// A genre as seen by a run. `id` is `None` until the store assigns one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Genre {
    pub id: Option<i32>,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Network {
    pub id: i32,
    pub name: Option<String>,
    pub country_id: Option<i32>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Country {
    pub id: i32,
    pub name: Option<String>,
    pub code: Option<String>,
    pub timezone: Option<String>,
}

impl From<&CountryRecord> for Country {
    fn from(record: &CountryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            code: record.code.clone(),
            timezone: record.timezone.clone(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Externals {
    pub imdb: Option<String>,
    pub tvrage: Option<i32>,
    pub thetvdb: Option<i32>,
}

impl From<&ExternalsRecord> for Externals {
    fn from(record: &ExternalsRecord) -> Self {
        Self { imdb: record.imdb.clone(), tvrage: record.tvrage, thetvdb: record.thetvdb }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rating {
    pub average: Option<f64>,
}

/// A new show staged for insertion, with its owned externals and rating and
/// references to the shared genre and network entities.
#[derive(Clone, Debug, PartialEq)]
pub struct ShowAggregate {
    pub id: i32,
    pub name: Option<String>,
    pub language: Option<String>,
    pub externals: Option<Externals>,
    pub rating: Option<Rating>,
    pub network_id: Option<i32>,
    pub genres: Vec<Genre>,
}

impl ShowAggregate {
    /// Copies the scalar and owned parts of a record. Genres and network are
    /// reconciled separately.
    pub fn from_record(record: &ShowRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            language: record.language.clone(),
            externals: record.externals.as_ref().map(Externals::from),
            rating: record.rating.as_ref().map(|r| Rating { average: r.average }),
            network_id: None,
            genres: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetworkView {
    pub id: i32,
    pub name: Option<String>,
    pub country: Option<Country>,
}

/// A persisted show with everything it references, as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShowView {
    pub id: i32,
    pub name: Option<String>,
    pub language: Option<String>,
    pub genres: Vec<String>,
    pub externals: Option<Externals>,
    pub rating: Option<Rating>,
    pub network: Option<NetworkView>,
}
