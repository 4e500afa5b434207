use std::{sync::Arc, time::Duration};

use jiff::{SignedDuration, Timestamp};
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{info, warn};

use crate::{catalog::CatalogClient, pipeline::IngestionPipeline, store::ShowStore};

/// Runs the pipeline right away and then once every `every`. Each run is
/// awaited before the next tick is taken, so scheduled runs never overlap.
pub fn spawn<S: ShowStore + 'static>(
    catalog: Arc<CatalogClient>,
    store: Arc<S>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(every = ?every, "scheduled ingestion started");

        loop {
            ticker.tick().await;

            if IngestionPipeline::new(&catalog, store.as_ref()).run().await.is_err() {
                warn!("scheduled ingestion run failed, retrying next period");
            }

            let next = SignedDuration::try_from(every)
                .ok()
                .and_then(|d| Timestamp::now().checked_add(d).ok());
            if let Some(next) = next {
                info!(next_run = %next, "next scheduled ingestion");
            }
        }
    })
}
