//! Query Service
//!
//! Serves the current snapshot. Before the first publish it refreshes on
//! demand through the same gate the scheduler uses, so concurrent cold-start
//! requests and a running scheduled cycle all collapse into one refresh.

use std::sync::Arc;

use tracing::info;

use market::SnapshotView;
use scheduler::RefreshGate;

use crate::error::ApiError;

#[derive(Clone)]
pub struct QueryService {
    gate: Arc<RefreshGate>,
}

impl QueryService {
    pub fn new(gate: Arc<RefreshGate>) -> Self {
        Self { gate }
    }

    pub async fn get_quotes(&self) -> Result<SnapshotView, ApiError> {
        if let Some(snapshot) = self.gate.store().read() {
            return Ok(snapshot.to_view());
        }

        info!("no snapshot yet; refreshing before answering");
        let snapshot = self.gate.refresh_if_cold().await?;

        Ok(snapshot.to_view())
    }

    /// Never triggers a refresh; `None` until the first publish.
    pub fn last_updated(&self) -> Option<String> {
        self.gate
            .store()
            .read()
            .map(|snapshot| snapshot.last_updated_display())
    }
}
