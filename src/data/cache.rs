//! Session Cache Module
//! Loads the dataset at most once per process and hands out the result.

use super::loader::{DataLoader, LoadError};
use super::schema::{Schema, SchemaCheck};
use polars::prelude::*;
use std::sync::OnceLock;
use tracing::{error, info};

/// Outcome of the one-time load. A failed load leaves an empty table and a notice.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub table: DataFrame,
    pub notice: Option<LoadError>,
    pub schema: SchemaCheck,
}

impl LoadedData {
    pub fn is_empty(&self) -> bool {
        self.table.height() == 0
    }
}

/// Load-once memo for the session's dataset.
pub struct SessionCache {
    loader: DataLoader,
    slot: OnceLock<LoadedData>,
}

impl SessionCache {
    pub fn new(loader: DataLoader) -> Self {
        Self {
            loader,
            slot: OnceLock::new(),
        }
    }

    /// The loaded dataset, reading the source on first access only.
    pub fn table(&self) -> &LoadedData {
        self.slot.get_or_init(|| match self.loader.load() {
            Ok(table) => {
                let schema = Schema::check(&table);
                info!(rows = table.height(), "dataset cached for session");
                LoadedData {
                    table,
                    notice: None,
                    schema,
                }
            }
            Err(err) => {
                error!("{}", err);
                LoadedData {
                    table: DataFrame::empty(),
                    notice: Some(err),
                    schema: SchemaCheck::default(),
                }
            }
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn missing_source_degrades_to_empty_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Attachment.xlsx");
        let cache = SessionCache::new(DataLoader::new(&path, "Orders"));

        let loaded = cache.table();
        assert!(loaded.is_empty());
        assert_eq!(loaded.notice, Some(LoadError::SourceNotFound(path)));
    }

    #[test]
    fn source_is_read_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, "Category,Region\nFurniture,West\n").unwrap();

        let cache = SessionCache::new(DataLoader::new(&path, "Orders"));
        assert!(!cache.is_loaded());
        assert_eq!(cache.table().table.height(), 1);

        // later edits to the file are not observed by the session
        std::fs::write(&path, "Category,Region\nFurniture,West\nOffice Supplies,East\n").unwrap();
        assert_eq!(cache.table().table.height(), 1);
        assert!(cache.is_loaded());
    }

    #[test]
    fn concurrent_readers_share_one_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, "Category,Region\nFurniture,West\n").unwrap();

        let cache = Arc::new(SessionCache::new(DataLoader::new(&path, "Orders")));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.table() as *const LoadedData as usize)
            })
            .collect();

        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }
}
