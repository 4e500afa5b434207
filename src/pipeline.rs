use std::fmt;

use tracing::{debug, error, info, trace, warn};

use crate::{
    catalog::CatalogClient,
    error::{IngestError, SyncResult},
    models::{ShowAggregate, ShowRecord},
    reconcile::EntityReconciler,
    session::IngestSession,
    store::ShowStore,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunStage {
    Fetching,
    Filtering,
    Reconciling,
    Committing,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStage::Fetching => "fetching",
            RunStage::Filtering => "filtering",
            RunStage::Reconciling => "reconciling",
            RunStage::Committing => "committing",
            RunStage::Done => "done",
        })
    }
}

/// One ingestion run: fetch the catalog, keep the shows the store does not
/// have yet, reconcile their shared entities and commit everything at once.
///
/// Runs are insert-only. Shows already in the store are never touched, and
/// a run that stages nothing makes no commit call at all.
pub struct IngestionPipeline<'a, S: ?Sized> {
    catalog: &'a CatalogClient,
    store: &'a S,
}

impl<'a, S: ShowStore + ?Sized> IngestionPipeline<'a, S> {
    pub fn new(catalog: &'a CatalogClient, store: &'a S) -> Self {
        Self { catalog, store }
    }

    pub async fn run(&self) -> Result<(), IngestError> {
        let mut stage = RunStage::Fetching;
        match self.execute(&mut stage).await {
            Ok(()) => Ok(()),
            Err(source) => {
                error!(stage = %stage, error = %source, "ingestion run failed");
                Err(IngestError { stage, source })
            },
        }
    }

    async fn execute(&self, stage: &mut RunStage) -> SyncResult<()> {
        debug!("fetching catalog");
        let records = self.catalog.fetch_shows().await?;
        let fetched = records.len();

        let mut session = IngestSession::default();
        let mut skipped = 0usize;

        for record in &records {
            advance(stage, RunStage::Filtering);
            if session.is_staged(record.id) {
                warn!(show_id = record.id, "show id repeated in catalog response, skipping");
                skipped += 1;
                continue;
            }
            if self.store.show_exists(record.id).await? {
                trace!(show_id = record.id, "show already stored, skipping");
                skipped += 1;
                continue;
            }

            advance(stage, RunStage::Reconciling);
            let show = {
                let mut reconciler = EntityReconciler::new(self.store, &mut session);
                assemble_show(&mut reconciler, record).await?
            };
            session.stage(show);
        }

        if session.is_empty() {
            advance(stage, RunStage::Done);
            info!(fetched, skipped, "no new shows, nothing to commit");
            return Ok(());
        }

        advance(stage, RunStage::Committing);
        let staged = session.staged_shows();
        let (genres, networks, countries) = session.pending_counts();
        self.store.commit(session.into_batch()).await?;

        advance(stage, RunStage::Done);
        info!(fetched, skipped, staged, genres, networks, countries, "ingestion run committed");
        Ok(())
    }
}

fn advance(stage: &mut RunStage, next: RunStage) {
    if *stage != next {
        debug!(from = %stage, to = %next, "run stage");
        *stage = next;
    }
}

/// Builds the aggregate for a new show: scalar fields and owned records are
/// copied, genres and network go through the reconciler. Blank genre names
/// are dropped and a genre listed twice is linked once.
pub async fn assemble_show<S: ShowStore + ?Sized>(
    reconciler: &mut EntityReconciler<'_, S>,
    record: &ShowRecord,
) -> SyncResult<ShowAggregate> {
    let mut show = ShowAggregate::from_record(record);

    for name in record.genres.iter().flatten() {
        let Some(genre) = reconciler.resolve_genre(name.as_deref()).await? else {
            continue;
        };
        if !show.genres.iter().any(|g| g.name == genre.name) {
            show.genres.push(genre);
        }
    }

    if let Some(network) = &record.network {
        show.network_id = Some(reconciler.resolve_network(network).await?.id);
    }

    Ok(show)
}
