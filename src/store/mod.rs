//! Artifact persistence using redb
//!
//! Analyses, paths and chains are written once per analysis in a single
//! write transaction and mirrored in memory for reads. Values are stored as
//! JSON so records stay readable with generic redb tooling.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::models::{AnalysisRecord, AnalysisSummary, AttackChain, AttackPath};

/// Storage seam for analysis artifacts
pub trait ArtifactRepository: Send + Sync {
    /// Claim an analysis id for a run.
    ///
    /// Returns false when the id is already in flight or persisted.
    fn reserve_analysis_id(&self, analysis_id: &str) -> bool;

    fn release_analysis_id(&self, analysis_id: &str);

    /// Persist an analysis with all of its paths and chains atomically
    fn save_analysis(
        &self,
        record: &AnalysisRecord,
        paths: &[AttackPath],
        chains: &[AttackChain],
    ) -> StoreResult<()>;

    fn get_analysis(&self, analysis_id: &str) -> StoreResult<Option<AnalysisRecord>>;

    /// Summaries of all stored analyses, oldest first
    fn list_analyses(&self) -> StoreResult<Vec<AnalysisSummary>>;

    fn get_path(&self, path_id: &str) -> StoreResult<Option<AttackPath>>;

    /// Paths of an analysis in enumeration order
    fn list_paths(
        &self,
        analysis_id: &str,
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<AttackPath>>;

    fn get_chain(&self, chain_id: &str) -> StoreResult<Option<AttackChain>>;

    /// Chains of an analysis in aggregation order
    fn list_chains(
        &self,
        analysis_id: &str,
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<AttackChain>>;

    /// Remove an analysis and everything it owns.
    ///
    /// Returns false when the analysis does not exist.
    fn delete_analysis(&self, analysis_id: &str) -> StoreResult<bool>;
}

/// Analysis record plus the ordered ids of its artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAnalysis {
    record: AnalysisRecord,
    path_ids: Vec<String>,
    chain_ids: Vec<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    analyses: BTreeMap<String, StoredAnalysis>,
    paths: HashMap<String, AttackPath>,
    chains: HashMap<String, AttackChain>,
}

// redb table definitions
const ANALYSES_TABLE: redb::TableDefinition<&str, &[u8]> = redb::TableDefinition::new("analyses");
const PATHS_TABLE: redb::TableDefinition<&str, &[u8]> = redb::TableDefinition::new("paths");
const CHAINS_TABLE: redb::TableDefinition<&str, &[u8]> = redb::TableDefinition::new("chains");

/// File name of the database inside the store directory
pub const STORE_FILE_NAME: &str = "artifacts.redb";

/// redb-backed artifact store with an in-memory read mirror
pub struct ArtifactStore {
    state: RwLock<StoreState>,
    /// Analysis ids currently being computed
    in_flight: Mutex<HashSet<String>>,
    /// Persistence layer (None for in-memory stores)
    db: Option<redb::Database>,
}

impl ArtifactStore {
    /// Create or open a store in the given directory
    pub fn new(dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(dir)?;

        let db = redb::Database::create(dir.join(STORE_FILE_NAME))?;

        let store = Self {
            state: RwLock::new(StoreState::default()),
            in_flight: Mutex::new(HashSet::new()),
            db: Some(db),
        };

        // Load existing data
        store.load()?;

        Ok(store)
    }

    /// Create an in-memory only store (no persistence)
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            in_flight: Mutex::new(HashSet::new()),
            db: None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.db.is_some()
    }

    // ==================== Lock Helpers ====================
    //
    // A poisoned lock means a thread panicked mid-update; the mirror can no
    // longer be trusted, so these helpers panic rather than return errors.

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state
            .read()
            .expect("store lock poisoned: a thread panicked while holding this lock")
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state
            .write()
            .expect("store lock poisoned: a thread panicked while holding this lock")
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.in_flight
            .lock()
            .expect("in-flight lock poisoned: a thread panicked while holding this lock")
    }

    // ==================== Persistence ====================

    fn write_analysis(
        &self,
        stored: &StoredAnalysis,
        paths: &[AttackPath],
        chains: &[AttackChain],
    ) -> StoreResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        let analysis_id = stored.record.summary.analysis_id.as_str();
        let write_txn = db.begin_write()?;
        {
            let mut analyses = write_txn.open_table(ANALYSES_TABLE)?;
            let value = serde_json::to_vec(stored)?;
            analyses.insert(analysis_id, value.as_slice())?;

            let mut path_table = write_txn.open_table(PATHS_TABLE)?;
            for path in paths {
                let value = serde_json::to_vec(path)?;
                path_table.insert(path.id.as_str(), value.as_slice())?;
            }

            let mut chain_table = write_txn.open_table(CHAINS_TABLE)?;
            for chain in chains {
                let value = serde_json::to_vec(chain)?;
                chain_table.insert(chain.id.as_str(), value.as_slice())?;
            }
        }
        write_txn.commit()?;

        Ok(())
    }

    fn remove_analysis(&self, stored: &StoredAnalysis) -> StoreResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        let write_txn = db.begin_write()?;
        {
            let mut analyses = write_txn.open_table(ANALYSES_TABLE)?;
            analyses.remove(stored.record.summary.analysis_id.as_str())?;

            let mut path_table = write_txn.open_table(PATHS_TABLE)?;
            for id in &stored.path_ids {
                path_table.remove(id.as_str())?;
            }

            let mut chain_table = write_txn.open_table(CHAINS_TABLE)?;
            for id in &stored.chain_ids {
                chain_table.remove(id.as_str())?;
            }
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Load all tables into the memory mirror
    fn load(&self) -> StoreResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        let read_txn = db.begin_read()?;

        // Try to open tables; if they don't exist yet, this is a fresh db
        let analyses = match read_txn.open_table(ANALYSES_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut state = self.write_state();

        for item in analyses.range::<&str>(..)? {
            let (key, value) = item?;
            let stored: StoredAnalysis = serde_json::from_slice(value.value())?;
            state.analyses.insert(key.value().to_string(), stored);
        }

        match read_txn.open_table(PATHS_TABLE) {
            Ok(table) => {
                for item in table.range::<&str>(..)? {
                    let (key, value) = item?;
                    let path: AttackPath = serde_json::from_slice(value.value())?;
                    state.paths.insert(key.value().to_string(), path);
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(e.into()),
        }

        match read_txn.open_table(CHAINS_TABLE) {
            Ok(table) => {
                for item in table.range::<&str>(..)? {
                    let (key, value) = item?;
                    let chain: AttackChain = serde_json::from_slice(value.value())?;
                    state.chains.insert(key.value().to_string(), chain);
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(e.into()),
        }

        debug!(
            "Loaded artifact store: {} analyses, {} paths, {} chains",
            state.analyses.len(),
            state.paths.len(),
            state.chains.len()
        );

        Ok(())
    }
}

/// Apply `skip`/`limit` pagination to ordered ids
fn page<'a>(ids: &'a [String], skip: usize, limit: Option<usize>) -> impl Iterator<Item = &'a String> {
    ids.iter().skip(skip).take(limit.unwrap_or(usize::MAX))
}

impl ArtifactRepository for ArtifactStore {
    fn reserve_analysis_id(&self, analysis_id: &str) -> bool {
        // Held across the lookup so a run cannot save and release in between
        let mut in_flight = self.lock_in_flight();
        if self.read_state().analyses.contains_key(analysis_id) {
            return false;
        }
        in_flight.insert(analysis_id.to_string())
    }

    fn release_analysis_id(&self, analysis_id: &str) {
        self.lock_in_flight().remove(analysis_id);
    }

    fn save_analysis(
        &self,
        record: &AnalysisRecord,
        paths: &[AttackPath],
        chains: &[AttackChain],
    ) -> StoreResult<()> {
        let stored = StoredAnalysis {
            record: record.clone(),
            path_ids: paths.iter().map(|p| p.id.clone()).collect(),
            chain_ids: chains.iter().map(|c| c.id.clone()).collect(),
        };

        // Disk first so the mirror never holds unpersisted artifacts
        self.write_analysis(&stored, paths, chains)?;

        let mut state = self.write_state();
        for path in paths {
            state.paths.insert(path.id.clone(), path.clone());
        }
        for chain in chains {
            state.chains.insert(chain.id.clone(), chain.clone());
        }
        state
            .analyses
            .insert(record.summary.analysis_id.clone(), stored);

        Ok(())
    }

    fn get_analysis(&self, analysis_id: &str) -> StoreResult<Option<AnalysisRecord>> {
        Ok(self
            .read_state()
            .analyses
            .get(analysis_id)
            .map(|s| s.record.clone()))
    }

    fn list_analyses(&self) -> StoreResult<Vec<AnalysisSummary>> {
        let mut summaries: Vec<AnalysisSummary> = self
            .read_state()
            .analyses
            .values()
            .map(|s| s.record.summary.clone())
            .collect();
        summaries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.analysis_id.cmp(&b.analysis_id))
        });
        Ok(summaries)
    }

    fn get_path(&self, path_id: &str) -> StoreResult<Option<AttackPath>> {
        Ok(self.read_state().paths.get(path_id).cloned())
    }

    fn list_paths(
        &self,
        analysis_id: &str,
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<AttackPath>> {
        let state = self.read_state();
        let stored = state
            .analyses
            .get(analysis_id)
            .ok_or_else(|| StoreError::AnalysisNotFound(analysis_id.to_string()))?;
        Ok(page(&stored.path_ids, skip, limit)
            .filter_map(|id| state.paths.get(id).cloned())
            .collect())
    }

    fn get_chain(&self, chain_id: &str) -> StoreResult<Option<AttackChain>> {
        Ok(self.read_state().chains.get(chain_id).cloned())
    }

    fn list_chains(
        &self,
        analysis_id: &str,
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<AttackChain>> {
        let state = self.read_state();
        let stored = state
            .analyses
            .get(analysis_id)
            .ok_or_else(|| StoreError::AnalysisNotFound(analysis_id.to_string()))?;
        Ok(page(&stored.chain_ids, skip, limit)
            .filter_map(|id| state.chains.get(id).cloned())
            .collect())
    }

    fn delete_analysis(&self, analysis_id: &str) -> StoreResult<bool> {
        let Some(stored) = self.read_state().analyses.get(analysis_id).cloned() else {
            return Ok(false);
        };

        self.remove_analysis(&stored)?;

        let mut state = self.write_state();
        state.analyses.remove(analysis_id);
        for id in &stored.path_ids {
            state.paths.remove(id);
        }
        for id in &stored.chain_ids {
            state.chains.remove(id);
        }

        debug!(
            "Deleted analysis {} with {} paths and {} chains",
            analysis_id,
            stored.path_ids.len(),
            stored.chain_ids.len()
        );
        Ok(true)
    }
}

// redb::Database handles cleanup on Drop automatically
