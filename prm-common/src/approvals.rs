//! Review approval storage
//!
//! Approval flags decide which reviews appear on public property pages. Two
//! interchangeable backends implement [`ApprovalStore`]; the service picks
//! one at startup from `[approvals] backend`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ApprovalBackend;
use crate::db::ReviewRepository;
use crate::{Error, Result};

/// Approval flags keyed by review id
pub type ApprovalMap = BTreeMap<String, bool>;

#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Approval flag of a review; `false` when never set
    async fn get_approval_status(&self, review_id: &str) -> Result<bool>;

    async fn set_approval_status(&self, review_id: &str, approved: bool) -> Result<()>;

    async fn all_approvals(&self) -> Result<ApprovalMap>;

    /// Backend name for logs and diagnostics
    fn backend(&self) -> ApprovalBackend;
}

/// Approval flags kept in the reviews table
///
/// Only reviews present in the store can be approved.
#[derive(Debug, Clone)]
pub struct DatabaseApprovalStore {
    reviews: ReviewRepository,
}

impl DatabaseApprovalStore {
    pub fn new(reviews: ReviewRepository) -> Self {
        Self { reviews }
    }
}

#[async_trait]
impl ApprovalStore for DatabaseApprovalStore {
    async fn get_approval_status(&self, review_id: &str) -> Result<bool> {
        self.reviews.get_approval_status(review_id).await
    }

    async fn set_approval_status(&self, review_id: &str, approved: bool) -> Result<()> {
        match self.reviews.approve_review(review_id, approved).await? {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("Review {}", review_id))),
        }
    }

    async fn all_approvals(&self) -> Result<ApprovalMap> {
        self.reviews.get_all_approval_statuses().await
    }

    fn backend(&self) -> ApprovalBackend {
        ApprovalBackend::Database
    }
}

/// Approval flags kept in a JSON object file (`{"<review id>": true, ...}`)
///
/// Any review id may be flagged, including ids that exist only in mock data.
/// Writes are serialized through a mutex and replace the file atomically
/// (temp file + rename). A corrupt file is moved to `<name>.corrupt` before
/// the next write instead of being overwritten.
#[derive(Debug)]
pub struct FileApprovalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileApprovalStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty object if it does not exist yet
    pub async fn ensure_file(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, "{}").await?;
        info!("Created approvals file: {}", self.path.display());
        Ok(())
    }

    /// `path` with `suffix` appended to the file name
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// File contents; `None` when the file exists but cannot be read or parsed
    async fn load(&self) -> Option<ApprovalMap> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Some(ApprovalMap::new()),
            Err(e) => {
                warn!("Failed to read approvals file {}: {}", self.path.display(), e);
                return None;
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| warn!("Approvals file {} is not valid JSON: {}", self.path.display(), e))
            .ok()
    }

    /// Current contents; a missing or corrupt file reads as empty
    async fn read_map(&self) -> ApprovalMap {
        self.load().await.unwrap_or_default()
    }

    async fn write_map(&self, approvals: &ApprovalMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(approvals)?;

        let tmp_path = self.sibling(".tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Move an unreadable file aside so its contents survive the next write
    async fn quarantine(&self) -> Result<()> {
        let target = self.sibling(".corrupt");
        tokio::fs::rename(&self.path, &target).await?;
        warn!("Moved unreadable approvals file to {}", target.display());
        Ok(())
    }
}

#[async_trait]
impl ApprovalStore for FileApprovalStore {
    async fn get_approval_status(&self, review_id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await.get(review_id).copied().unwrap_or(false))
    }

    async fn set_approval_status(&self, review_id: &str, approved: bool) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut approvals = match self.load().await {
            Some(approvals) => approvals,
            None => {
                self.quarantine().await?;
                ApprovalMap::new()
            }
        };
        approvals.insert(review_id.to_string(), approved);
        self.write_map(&approvals).await?;

        debug!(review_id, approved, "Approval written to file");
        Ok(())
    }

    async fn all_approvals(&self) -> Result<ApprovalMap> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await)
    }

    fn backend(&self) -> ApprovalBackend {
        ApprovalBackend::File
    }
}

/// Build the configured approval store
pub async fn open_approval_store(
    backend: ApprovalBackend,
    reviews: ReviewRepository,
    file_path: PathBuf,
) -> Result<Arc<dyn ApprovalStore>> {
    info!("Approval storage backend: {}", backend);

    match backend {
        ApprovalBackend::Database => Ok(Arc::new(DatabaseApprovalStore::new(reviews))),
        ApprovalBackend::File => {
            let store = FileApprovalStore::new(file_path);
            store.ensure_file().await?;
            info!("Approvals file: {}", store.path().display());
            Ok(Arc::new(store))
        }
    }
}
