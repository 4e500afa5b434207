use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    entities::{country, externals, genre, network, rating, show, show_genre},
    error::SyncResult,
    models::{Country, Externals, Genre, Network, NetworkView, Rating, ShowView},
    session::StagedBatch,
    store::ShowStore,
};

/// sea-orm backed store for shows and the entities they reference.
#[derive(Clone)]
pub struct ShowRepository {
    db: DatabaseConnection,
}

impl ShowRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_shows(&self) -> SyncResult<Vec<ShowView>> {
        let shows = show::Entity::find().order_by_asc(show::Column::Id).all(&self.db).await?;

        let mut out = Vec::with_capacity(shows.len());
        for model in shows {
            out.push(self.load_view(model).await?);
        }
        Ok(out)
    }

    pub async fn get_show(&self, id: i32) -> SyncResult<Option<ShowView>> {
        let Some(model) = show::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(Some(self.load_view(model).await?))
    }

    /// Replaces the staged shows and everything they own. Shared entities in
    /// the batch are inserted as in a commit; existing ones are left alone.
    pub async fn replace_shows(&self, batch: StagedBatch) -> SyncResult<()> {
        let txn = self.db.begin().await?;

        for staged in &batch.shows {
            delete_owned(&txn, staged.id).await?;
            show::Entity::delete_by_id(staged.id).exec(&txn).await?;
        }
        write_batch(&txn, batch).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Deletes a show with its externals, rating and genre links. Returns
    /// `false` when there was no such show.
    pub async fn delete_show(&self, id: i32) -> SyncResult<bool> {
        let txn = self.db.begin().await?;

        if show::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }
        delete_owned(&txn, id).await?;
        show::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    async fn load_view(&self, model: show::Model) -> SyncResult<ShowView> {
        let mut genres: Vec<String> = model
            .find_related(genre::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();
        genres.sort();

        let externals = externals::Entity::find_by_id(model.id).one(&self.db).await?.map(|e| {
            Externals { imdb: e.imdb, tvrage: e.tvrage, thetvdb: e.thetvdb }
        });

        let rating = rating::Entity::find_by_id(model.id)
            .one(&self.db)
            .await?
            .map(|r| Rating { average: r.average });

        let network = match model.network_id {
            Some(network_id) => self.load_network(network_id).await?,
            None => None,
        };

        Ok(ShowView {
            id: model.id,
            name: model.name,
            language: model.language,
            genres,
            externals,
            rating,
            network,
        })
    }

    async fn load_network(&self, id: i32) -> SyncResult<Option<NetworkView>> {
        let Some(model) = network::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let country = match model.country_id {
            Some(country_id) => {
                country::Entity::find_by_id(country_id).one(&self.db).await?.map(Country::from)
            },
            None => None,
        };

        Ok(Some(NetworkView { id: model.id, name: model.name, country }))
    }
}

#[async_trait]
impl ShowStore for ShowRepository {
    async fn show_exists(&self, id: i32) -> SyncResult<bool> {
        Ok(show::Entity::find_by_id(id).one(&self.db).await?.is_some())
    }

    async fn genre_by_name(&self, name: &str) -> SyncResult<Option<Genre>> {
        let found = genre::Entity::find()
            .filter(genre::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(found.map(|g| Genre { id: Some(g.id), name: g.name }))
    }

    async fn network_by_id(&self, id: i32) -> SyncResult<Option<Network>> {
        let found = network::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(|n| Network { id: n.id, name: n.name, country_id: n.country_id }))
    }

    async fn country_by_id(&self, id: i32) -> SyncResult<Option<Country>> {
        Ok(country::Entity::find_by_id(id).one(&self.db).await?.map(Country::from))
    }

    async fn commit(&self, batch: StagedBatch) -> SyncResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await?;
        write_batch(&txn, batch).await?;
        txn.commit().await?;
        Ok(())
    }
}

impl From<country::Model> for Country {
    fn from(model: country::Model) -> Self {
        Self { id: model.id, name: model.name, code: model.code, timezone: model.timezone }
    }
}

async fn write_batch<C: ConnectionTrait>(conn: &C, batch: StagedBatch) -> Result<(), DbErr> {
    for c in batch.countries {
        let model = country::ActiveModel {
            id: Set(c.id),
            name: Set(c.name),
            code: Set(c.code),
            timezone: Set(c.timezone),
        };
        country::Entity::insert(model).exec(conn).await?;
    }

    for n in batch.networks {
        let model =
            network::ActiveModel { id: Set(n.id), name: Set(n.name), country_id: Set(n.country_id) };
        network::Entity::insert(model).exec(conn).await?;
    }

    let mut genre_ids: HashMap<String, i32> = HashMap::new();
    for g in batch.genres {
        let model = genre::ActiveModel { id: NotSet, name: Set(g.name.clone()) };
        let res = genre::Entity::insert(model).exec(conn).await?;
        genre_ids.insert(g.name, res.last_insert_id);
    }

    for s in batch.shows {
        let model = show::ActiveModel {
            id: Set(s.id),
            name: Set(s.name),
            language: Set(s.language),
            network_id: Set(s.network_id),
        };
        show::Entity::insert(model).exec(conn).await?;

        if let Some(e) = s.externals {
            let model = externals::ActiveModel {
                show_id: Set(s.id),
                imdb: Set(e.imdb),
                tvrage: Set(e.tvrage),
                thetvdb: Set(e.thetvdb),
            };
            externals::Entity::insert(model).exec(conn).await?;
        }

        if let Some(r) = s.rating {
            let model = rating::ActiveModel { show_id: Set(s.id), average: Set(r.average) };
            rating::Entity::insert(model).exec(conn).await?;
        }

        for g in &s.genres {
            let Some(genre_id) = g.id.or_else(|| genre_ids.get(&g.name).copied()) else {
                return Err(DbErr::Custom(format!(
                    "show {} references genre {:?} that was never staged",
                    s.id, g.name
                )));
            };
            let model = show_genre::ActiveModel { show_id: Set(s.id), genre_id: Set(genre_id) };
            show_genre::Entity::insert(model).exec(conn).await?;
        }
    }

    Ok(())
}

async fn delete_owned<C: ConnectionTrait>(conn: &C, show_id: i32) -> Result<(), DbErr> {
    show_genre::Entity::delete_many()
        .filter(show_genre::Column::ShowId.eq(show_id))
        .exec(conn)
        .await?;
    externals::Entity::delete_by_id(show_id).exec(conn).await?;
    rating::Entity::delete_by_id(show_id).exec(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::CatalogClient,
        db,
        models::{CountryRecord, NetworkRecord, ShowAggregate},
        pipeline::IngestionPipeline,
        reconcile::EntityReconciler,
        session::IngestSession,
    };
    use sea_orm::PaginatorTrait;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn repository() -> ShowRepository {
        ShowRepository::new(db::connect_in_memory().await.unwrap())
    }

    fn aggregate(id: i32, genres: Vec<Genre>, network_id: Option<i32>) -> ShowAggregate {
        ShowAggregate {
            id,
            name: Some(format!("show {id}")),
            language: Some("English".into()),
            externals: Some(Externals { imdb: Some("tt0000001".into()), tvrage: None, thetvdb: Some(7) }),
            rating: Some(Rating { average: Some(8.5) }),
            network_id,
            genres,
        }
    }

    fn us() -> Country {
        Country {
            id: 5,
            name: Some("United States".into()),
            code: Some("US".into()),
            timezone: Some("America/New_York".into()),
        }
    }

    #[tokio::test]
    async fn committed_batch_reads_back_as_a_full_view() {
        let repo = repository().await;
        let batch = StagedBatch {
            countries: vec![us()],
            networks: vec![Network { id: 10, name: Some("N".into()), country_id: Some(5) }],
            genres: vec![Genre { id: None, name: "Drama".into() }, Genre { id: None, name: "Action".into() }],
            shows: vec![aggregate(
                1,
                vec![Genre { id: None, name: "Drama".into() }, Genre { id: None, name: "Action".into() }],
                Some(10),
            )],
        };

        repo.commit(batch).await.unwrap();

        let view = repo.get_show(1).await.unwrap().unwrap();
        assert_eq!(view.name.as_deref(), Some("show 1"));
        assert_eq!(view.genres, ["Action", "Drama"]);
        assert_eq!(view.externals.as_ref().and_then(|e| e.thetvdb), Some(7));
        assert_eq!(view.rating, Some(Rating { average: Some(8.5) }));
        let network = view.network.unwrap();
        assert_eq!(network.id, 10);
        assert_eq!(network.country, Some(us()));

        assert!(repo.show_exists(1).await.unwrap());
        assert!(!repo.show_exists(2).await.unwrap());
        assert!(repo.genre_by_name("Drama").await.unwrap().unwrap().id.is_some());
        assert!(repo.genre_by_name("drama").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_genre_is_linked_instead_of_duplicated() {
        let repo = repository().await;
        repo.commit(StagedBatch {
            genres: vec![Genre { id: None, name: "Drama".into() }],
            shows: vec![aggregate(1, vec![Genre { id: None, name: "Drama".into() }], None)],
            ..StagedBatch::default()
        })
        .await
        .unwrap();

        let mut session = IngestSession::default();
        let drama = {
            let mut reconciler = EntityReconciler::new(&repo, &mut session);
            reconciler.resolve_genre(Some("Drama")).await.unwrap().unwrap()
        };
        session.stage(aggregate(2, vec![drama], None));
        repo.commit(session.into_batch()).await.unwrap();

        assert_eq!(genre::Entity::find().count(&repo.db).await.unwrap(), 1);
        assert_eq!(repo.get_show(2).await.unwrap().unwrap().genres, ["Drama"]);
    }

    #[tokio::test]
    async fn failed_commit_writes_nothing() {
        let repo = repository().await;
        repo.commit(StagedBatch { shows: vec![aggregate(1, vec![], None)], ..StagedBatch::default() })
            .await
            .unwrap();

        let batch = StagedBatch {
            genres: vec![Genre { id: None, name: "Drama".into() }],
            shows: vec![aggregate(2, vec![], None), aggregate(1, vec![], None)],
            ..StagedBatch::default()
        };
        assert!(repo.commit(batch).await.is_err());

        assert_eq!(genre::Entity::find().count(&repo.db).await.unwrap(), 0);
        assert!(!repo.show_exists(2).await.unwrap());
        assert_eq!(show::Entity::find().count(&repo.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_removes_owned_rows_and_keeps_shared_ones() {
        let repo = repository().await;
        repo.commit(StagedBatch {
            networks: vec![Network { id: 10, name: Some("N".into()), country_id: None }],
            genres: vec![Genre { id: None, name: "Drama".into() }],
            shows: vec![aggregate(1, vec![Genre { id: None, name: "Drama".into() }], Some(10))],
            ..StagedBatch::default()
        })
        .await
        .unwrap();

        assert!(repo.delete_show(1).await.unwrap());
        assert!(!repo.delete_show(1).await.unwrap());

        assert!(repo.get_show(1).await.unwrap().is_none());
        assert_eq!(externals::Entity::find().count(&repo.db).await.unwrap(), 0);
        assert_eq!(rating::Entity::find().count(&repo.db).await.unwrap(), 0);
        assert_eq!(show_genre::Entity::find().count(&repo.db).await.unwrap(), 0);
        assert_eq!(genre::Entity::find().count(&repo.db).await.unwrap(), 1);
        assert!(repo.network_by_id(10).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn replace_rewrites_fields_and_links() {
        let repo = repository().await;
        repo.commit(StagedBatch {
            genres: vec![Genre { id: None, name: "Drama".into() }],
            shows: vec![aggregate(1, vec![Genre { id: None, name: "Drama".into() }], None)],
            ..StagedBatch::default()
        })
        .await
        .unwrap();

        let mut session = IngestSession::default();
        let network = {
            let mut reconciler = EntityReconciler::new(&repo, &mut session);
            let record = NetworkRecord {
                id: 10,
                name: Some("N".into()),
                country: Some(CountryRecord { id: 5, ..CountryRecord::default() }),
            };
            reconciler.resolve_network(&record).await.unwrap()
        };
        session.create_genre("Comedy");
        let mut updated = aggregate(1, vec![Genre { id: None, name: "Comedy".into() }], Some(network.id));
        updated.name = Some("renamed".into());
        updated.rating = None;
        session.stage(updated);

        repo.replace_shows(session.into_batch()).await.unwrap();

        let view = repo.get_show(1).await.unwrap().unwrap();
        assert_eq!(view.name.as_deref(), Some("renamed"));
        assert_eq!(view.genres, ["Comedy"]);
        assert_eq!(view.rating, None);
        assert_eq!(view.network.map(|n| n.id), Some(10));
        assert_eq!(genre::Entity::find().count(&repo.db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn pipeline_runs_against_sqlite_are_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 1, "name": "X", "genres": ["Drama", "Action"],
                    "network": { "id": 10, "name": "N", "country": { "id": 5, "code": "US", "name": "United States", "timezone": "America/New_York" } }
                },
                {
                    "id": 2, "name": "Y", "genres": ["Drama", ""],
                    "network": { "id": 10, "name": "N", "country": { "id": 5, "code": "US", "name": "United States", "timezone": "America/New_York" } }
                }
            ])))
            .expect(2)
            .mount(&server)
            .await;
        let catalog = CatalogClient::new(reqwest::Client::new(), server.uri()).unwrap();
        let repo = repository().await;

        IngestionPipeline::new(&catalog, &repo).run().await.unwrap();
        IngestionPipeline::new(&catalog, &repo).run().await.unwrap();

        assert_eq!(show::Entity::find().count(&repo.db).await.unwrap(), 2);
        assert_eq!(genre::Entity::find().count(&repo.db).await.unwrap(), 2);
        assert_eq!(network::Entity::find().count(&repo.db).await.unwrap(), 1);
        assert_eq!(country::Entity::find().count(&repo.db).await.unwrap(), 1);
        assert_eq!(show_genre::Entity::find().count(&repo.db).await.unwrap(), 3);

        let shows = repo.list_shows().await.unwrap();
        assert_eq!(shows.iter().map(|s| s.id).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(shows[1].genres, ["Drama"]);
    }
}
