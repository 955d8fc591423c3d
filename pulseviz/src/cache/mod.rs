//! Pivot view cache - memoize and optionally persist pivot views
//!
//! Views are keyed by a fingerprint of the tidy table plus the pivot request,
//! so a changed dataset never hits a stale view.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CacheResult;
use crate::models::{Dimension, TidyTable};
use crate::transform::pivot::{pivot_by, Aggregation, PivotView};

/// What was asked of the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewRequest {
    pub row_key: Dimension,
    pub col_key: Dimension,
    pub aggregation: Aggregation,
}

/// A cached view with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedView {
    /// Cache key
    pub key: String,
    /// Fingerprint of the tidy table the view was computed from
    pub fingerprint: String,
    pub request: ViewRequest,
    pub view: PivotView,
    /// Creation timestamp
    pub created_at: String,
    /// Last time this view was served from the cache
    pub last_used: Option<String>,
    /// Number of cache hits
    pub hit_count: u32,
}

/// Cache of pivot views, in memory and optionally on disk
pub struct PivotCache {
    /// Directory where views are persisted, if any
    cache_dir: Option<PathBuf>,
    /// Loaded views (key -> view)
    views: HashMap<String, CachedView>,
}

impl PivotCache {
    /// Memory-only cache.
    pub fn in_memory() -> Self {
        Self {
            cache_dir: None,
            views: HashMap::new(),
        }
    }

    /// Cache persisted in `dir`, loading views already stored there.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let mut cache = Self {
            cache_dir: Some(dir.as_ref().to_path_buf()),
            views: HashMap::new(),
        };
        cache.load_all();
        cache
    }

    /// Load all views from the cache directory; unreadable files are skipped.
    fn load_all(&mut self) {
        let Some(dir) = &self.cache_dir else {
            return;
        };

        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(view) = serde_json::from_str::<CachedView>(&content) {
                        self.views.insert(view.key.clone(), view);
                    }
                }
            }
        }
    }

    /// Cached view for `tidy` and the request, computing and storing it on a miss.
    pub fn get_or_compute(
        &mut self,
        tidy: &TidyTable,
        row_key: Dimension,
        col_key: Dimension,
        aggregation: Aggregation,
    ) -> CacheResult<PivotView> {
        let request = ViewRequest {
            row_key,
            col_key,
            aggregation,
        };
        let fingerprint = fingerprint(tidy)?;
        let key = cache_key(&fingerprint, &request);

        if let Some(cached) = self.views.get_mut(&key) {
            cached.hit_count += 1;
            cached.last_used = Some(chrono::Utc::now().to_rfc3339());
            let view = cached.view.clone();
            self.persist(&key)?;
            return Ok(view);
        }

        let view = pivot_by(tidy, row_key, col_key, aggregation)?;
        self.views.insert(
            key.clone(),
            CachedView {
                key: key.clone(),
                fingerprint,
                request,
                view: view.clone(),
                created_at: chrono::Utc::now().to_rfc3339(),
                last_used: None,
                hit_count: 0,
            },
        );
        self.persist(&key)?;
        Ok(view)
    }

    /// Get a cached view by key
    pub fn get(&self, key: &str) -> Option<&CachedView> {
        self.views.get(key)
    }

    /// All cached views
    pub fn list(&self) -> Vec<&CachedView> {
        let mut views: Vec<_> = self.views.values().collect();
        views.sort_by(|a, b| a.key.cmp(&b.key));
        views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Remove every view. On disk this deletes every `.json` file in the
    /// cache directory, including ones that failed to load. Returns the number
    /// of entries removed.
    pub fn clear(&mut self) -> CacheResult<usize> {
        let mut removed = self.views.len();
        if let Some(dir) = &self.cache_dir {
            removed = 0;
            let entries = match fs::read_dir(dir) {
                Ok(e) => Some(e),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(e.into()),
            };
            for entry in entries.into_iter().flatten() {
                let path = entry?.path();
                if path.extension().is_some_and(|e| e == "json") {
                    fs::remove_file(&path)?;
                    removed += 1;
                }
            }
        }
        self.views.clear();
        Ok(removed)
    }

    fn persist(&self, key: &str) -> CacheResult<()> {
        let (Some(dir), Some(view)) = (&self.cache_dir, self.views.get(key)) else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(view)?;
        fs::write(dir.join(format!("{}.json", key)), content)?;
        Ok(())
    }
}

impl Default for PivotCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn cache_key(fingerprint: &str, request: &ViewRequest) -> String {
    format!(
        "{}-{}-{}-{}",
        fingerprint, request.row_key, request.col_key, request.aggregation
    )
}

/// SHA-256 of the tidy table's JSON form, as lowercase hex.
pub fn fingerprint(tidy: &TidyTable) -> CacheResult<String> {
    let bytes = serde_json::to_vec(tidy)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
