//! Persists finished tours as JSON files.
//!
//! Files are named `<slug>-<yyyyMMddTHHmmss>.json` after the display
//! name and creation time; a numeric suffix is added when the name is
//! already taken.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tourforge_core::job::TourResult;

use crate::error::WorkflowError;

/// What gets written to disk for one tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTour {
    #[serde(flatten)]
    pub result: TourResult,
    pub operation_id: String,
    /// Vendor model id the tour was generated with.
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `tour` and return the path of the new file.
    pub async fn save(&self, tour: &StoredTour) -> Result<PathBuf, WorkflowError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let stem = format!(
            "{}-{}",
            slugify(&tour.result.display_name),
            tour.result.created_at.format("%Y%m%dT%H%M%S"),
        );
        let path = self.free_path(&stem).await?;

        let json = serde_json::to_vec_pretty(tour)?;
        tokio::fs::write(&path, json).await?;

        tracing::info!(path = %path.display(), world_id = %tour.result.world_id, "Tour saved");
        Ok(path)
    }

    pub async fn load(path: &Path) -> Result<StoredTour, WorkflowError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn free_path(&self, stem: &str) -> Result<PathBuf, WorkflowError> {
        let mut path = self.dir.join(format!("{stem}.json"));
        let mut n = 2;
        while tokio::fs::try_exists(&path).await? {
            path = self.dir.join(format!("{stem}-{n}.json"));
            n += 1;
        }
        Ok(path)
    }
}

/// Lower-case ASCII slug; anything else collapses to single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "tour".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tour(name: &str) -> StoredTour {
        StoredTour {
            result: TourResult {
                world_id: "abc123".into(),
                view_url: "https://marble.worldlabs.ai/worlds/abc123".into(),
                display_name: name.into(),
                created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            },
            operation_id: "op_1".into(),
            model: "Marble 0.1-plus".into(),
        }
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("12 Elm St."), "12-elm-st");
        assert_eq!(slugify("  Loft #4B  "), "loft-4b");
        assert_eq!(slugify("Île"), "le");
        assert_eq!(slugify("***"), "tour");
    }

    #[tokio::test]
    async fn save_writes_flat_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("tours"));

        let path = store.save(&tour("12 Elm St")).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "12-elm-st-20260314T092653.json");

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["world_id"], "abc123");
        assert_eq!(json["operation_id"], "op_1");
        assert_eq!(json["model"], "Marble 0.1-plus");
        assert_eq!(json["display_name"], "12 Elm St");
    }

    #[tokio::test]
    async fn same_second_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());

        let first = store.save(&tour("Den")).await.unwrap();
        let second = store.save(&tour("Den")).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "den-20260314T092653-2.json");
    }

    #[tokio::test]
    async fn load_reads_back_saved_tour() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        let saved = tour("Den");

        let path = store.save(&saved).await.unwrap();
        assert_eq!(ResultStore::load(&path).await.unwrap(), saved);
    }
}
