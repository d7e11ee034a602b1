use super::{Topology, TopologyRecord};
use crate::parsers::ParserRegistry;
use crate::Error;

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Errors of a topology repository
#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    /// No topology with this id is stored
    #[error("Topology {0} not found")]
    NotFound(Uuid),
    /// Reading or writing the storage failed
    #[error("Cannot access {path}: {source}")]
    Io {
        /// The file or directory concerned
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// A stored record cannot be decoded or encoded
    #[error("Invalid record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads and saves topologies. Owned by the caller, the topology itself never persists
/// anything.
pub trait TopologyRepository {
    /// Load the record of the topology `id`
    fn load(&self, id: Uuid) -> Result<TopologyRecord, RepositoryError>;

    /// Store a record, replacing any record with the same id
    fn save(&mut self, record: &TopologyRecord) -> Result<(), RepositoryError>;

    /// Ids of all stored topologies, sorted
    fn list(&self) -> Result<Vec<Uuid>, RepositoryError>;

    /// Load the topology `id` and resolve its parser
    fn load_topology(&self, id: Uuid, registry: &ParserRegistry) -> Result<Topology, Error> {
        let record = self.load(id)?;
        Topology::from_record(record, registry)
    }

    /// Store a topology
    fn save_topology(&mut self, topology: &Topology) -> Result<(), RepositoryError> {
        self.save(&topology.to_record())
    }
}

/// Repository keeping all records in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    records: BTreeMap<Uuid, TopologyRecord>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

impl TopologyRepository for MemoryRepository {
    fn load(&self, id: Uuid) -> Result<TopologyRecord, RepositoryError> {
        self.records.get(&id).cloned().ok_or(RepositoryError::NotFound(id))
    }

    fn save(&mut self, record: &TopologyRecord) -> Result<(), RepositoryError> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Uuid>, RepositoryError> {
        Ok(self.records.keys().copied().collect())
    }
}

/// Repository storing every record as `<id>.json` inside one directory
#[derive(Debug, Clone)]
pub struct JsonDirRepository {
    dir: PathBuf,
}

impl JsonDirRepository {
    /// Open the repository at `dir`, creating the directory if necessary
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
        Ok(Self { dir })
    }

    /// Directory holding the records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

fn io_error(path: &Path, source: io::Error) -> RepositoryError {
    RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl TopologyRepository for JsonDirRepository {
    fn load(&self, id: Uuid) -> Result<TopologyRecord, RepositoryError> {
        let path = self.path(id);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(id))
            }
            Err(source) => return Err(RepositoryError::Io { path, source }),
        };
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&mut self, record: &TopologyRecord) -> Result<(), RepositoryError> {
        let path = self.path(record.id);
        let data = serde_json::to_string_pretty(record)?;
        fs::write(&path, data).map_err(|source| io_error(&path, source))?;
        debug!("Saved topology {} to {}", record.id, path.display());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Uuid>, RepositoryError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|source| io_error(&self.dir, source))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).map(Uuid::parse_str) {
                Some(Ok(id)) => ids.push(id),
                _ => warn!("Ignoring unexpected file {}", path.display()),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
