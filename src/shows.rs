use sea_orm::DbErr;
use tracing::info;

use crate::{
    error::{SyncError, SyncResult},
    models::{ShowRecord, ShowView},
    pipeline::assemble_show,
    reconcile::EntityReconciler,
    repository::ShowRepository,
    session::IngestSession,
    store::ShowStore,
};

#[derive(Debug)]
pub enum CreateOutcome {
    Created(ShowView),
    AlreadyExists,
}

#[derive(Debug, Eq, PartialEq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

/// Stores one show given in catalog shape. Genres, network and country are
/// reconciled the same way an ingestion run does it.
pub async fn create_show(repo: &ShowRepository, record: &ShowRecord) -> SyncResult<CreateOutcome> {
    if repo.show_exists(record.id).await? {
        return Ok(CreateOutcome::AlreadyExists);
    }

    let mut session = IngestSession::default();
    let show = {
        let mut reconciler = EntityReconciler::new(repo, &mut session);
        assemble_show(&mut reconciler, record).await?
    };
    session.stage(show);
    repo.commit(session.into_batch()).await?;
    info!(show_id = record.id, "show created");

    let view = repo.get_show(record.id).await?.ok_or_else(|| {
        SyncError::Store(DbErr::RecordNotFound(format!("show {} after insert", record.id)))
    })?;
    Ok(CreateOutcome::Created(view))
}

/// Replaces a stored show's fields, owned records and references. Existing
/// networks and countries keep their stored names.
pub async fn update_show(repo: &ShowRepository, record: &ShowRecord) -> SyncResult<UpdateOutcome> {
    if !repo.show_exists(record.id).await? {
        return Ok(UpdateOutcome::NotFound);
    }

    let mut session = IngestSession::default();
    let show = {
        let mut reconciler = EntityReconciler::new(repo, &mut session);
        assemble_show(&mut reconciler, record).await?
    };
    session.stage(show);
    repo.replace_shows(session.into_batch()).await?;
    info!(show_id = record.id, "show updated");

    Ok(UpdateOutcome::Updated)
}
