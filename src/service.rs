//! Profile persistence across both stores.
//!
//! A submission writes the structured store first and the row store second.
//! The two writes are not atomic: if the second fails the first stays, and
//! the stores disagree until [`ProfileService::reconcile`] rebuilds the row
//! store from the structured one. Every store access goes through one
//! async mutex, so concurrent submissions cannot lose each other's records.

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::codec::{self, ProfileRow};
use crate::config::StorageConfig;
use crate::error::{ApiError, Result, StoreKind};
use crate::profile::Profile;
use crate::store::{RowStore, StructuredStore};

/// Outcome of a [`ProfileService::reconcile`] pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reconciled {
    /// Row count already matched the valid record count.
    InSync { records: usize },
    /// The row store holds more rows than the structured store has valid
    /// records. Rows are never dropped, so nothing was touched.
    Diverged { records: usize, rows: usize },
    /// The row store was rewritten from the structured store.
    Rebuilt { records: usize, rows_before: Option<usize> },
    /// The structured store could not be read strictly; nothing was touched.
    Skipped,
}

/// Owns both store handles and the writer lock.
#[derive(Debug)]
pub struct ProfileService {
    structured: StructuredStore,
    rows: RowStore,
    lock: Mutex<()>,
}

impl ProfileService {
    /// Opens both stores, creating the data directory and any missing file,
    /// then reconciles them if `reconcile_on_start` is set.
    pub async fn open(cfg: &StorageConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&cfg.data_dir).await?;

        let service = Self {
            structured: StructuredStore::new(cfg.json_path()),
            rows: RowStore::new(cfg.csv_path()),
            lock: Mutex::new(()),
        };
        service.structured.ensure().await?;
        service.rows.ensure().await?;

        info!(
            json = %service.structured.path().display(),
            csv = %service.rows.path().display(),
            "profile stores opened"
        );

        if cfg.reconcile_on_start {
            service.reconcile().await?;
        }
        Ok(service)
    }

    /// Persists one validated profile to both stores.
    pub async fn submit(&self, profile: Profile) -> std::result::Result<(), ApiError> {
        let record = serde_json::to_value(&profile).map_err(|e| {
            error!(error = %e, "failed to serialize profile");
            ApiError::StoreWrite(StoreKind::Structured)
        })?;
        let row = codec::encode(&profile).map_err(|e| {
            error!(error = %e, "failed to encode profile row");
            ApiError::Codec
        })?;

        let _guard = self.lock.lock().await;

        let mut records = self.structured.load_or_empty().await;
        records.push(record);
        if let Err(e) = self.structured.save(&records).await {
            error!(path = %self.structured.path().display(), error = %e, "failed to save profile to JSON");
            return Err(ApiError::StoreWrite(StoreKind::Structured));
        }

        if let Err(e) = self.rows.append(&row).await {
            error!(path = %self.rows.path().display(), error = %e, "failed to save profile to CSV");
            return Err(ApiError::StoreWrite(StoreKind::Rows));
        }

        info!(name = %profile.name, count = records.len(), "profile saved");
        Ok(())
    }

    /// Every row in the row store, in file order.
    pub async fn list(&self) -> std::result::Result<Vec<ProfileRow>, ApiError> {
        let _guard = self.lock.lock().await;
        self.rows.read_all().await.map_err(|e| {
            error!(path = %self.rows.path().display(), error = %e, "failed to read profiles from CSV");
            ApiError::StoreRead
        })
    }

    /// Rebuilds the row store from the structured store when it holds fewer
    /// rows than the structured store has valid records, or cannot be read.
    ///
    /// Records that no longer validate as profiles are neither counted nor
    /// written. A row store that is ahead is reported as
    /// [`Reconciled::Diverged`] and never shrunk.
    pub async fn reconcile(&self) -> Result<Reconciled> {
        let _guard = self.lock.lock().await;

        let records = match self.structured.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "structured store unreadable, skipping reconcile");
                return Ok(Reconciled::Skipped);
            }
        };
        let profiles = valid_profiles(records);

        let rows_before = match self.rows.read_all().await {
            Ok(rows) => Some(rows.len()),
            Err(e) => {
                warn!(error = %e, "row store unreadable, rebuilding");
                None
            }
        };
        match rows_before {
            Some(rows) if rows == profiles.len() => {
                return Ok(Reconciled::InSync { records: rows });
            }
            Some(rows) if rows > profiles.len() => {
                warn!(rows, records = profiles.len(), "row store ahead of structured store, leaving it as is");
                return Ok(Reconciled::Diverged { records: profiles.len(), rows });
            }
            _ => {}
        }

        self.rows.replace(&codec::encode_rows(&profiles)?).await?;

        warn!(?rows_before, records = profiles.len(), "row store rebuilt from structured store");
        Ok(Reconciled::Rebuilt { records: profiles.len(), rows_before })
    }
}

fn valid_profiles(records: Vec<Value>) -> Vec<Profile> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match Profile::from_value(v) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(index = i, error = %e, "skipping invalid record");
                None
            }
        })
        .collect()
}
