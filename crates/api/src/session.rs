//! In-memory list of tours resolved by this server process.

use tokio::sync::RwLock;
use tourforge_core::job::TourResult;

/// Append-only, insertion-ordered tour list.
#[derive(Default)]
pub struct TourSession {
    tours: RwLock<Vec<TourResult>>,
}

impl TourSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, tour: TourResult) {
        self.tours.write().await.push(tour);
    }

    /// Snapshot of every tour, oldest first.
    pub async fn list(&self) -> Vec<TourResult> {
        self.tours.read().await.clone()
    }
}
