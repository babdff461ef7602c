//! History store implementations for chatrelay.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileHistoryStore;
pub use in_memory::InMemoryHistoryStore;

use chatrelay_config::HistoryConfig;
use chatrelay_core::history::HistoryStore;
use std::sync::Arc;

/// Build the configured store. Call once per process and share the handle.
pub fn build_from_config(config: &HistoryConfig) -> Arc<dyn HistoryStore> {
    match config.backend.as_str() {
        "memory" => Arc::new(InMemoryHistoryStore::new(config.max_length)),
        _ => Arc::new(FileHistoryStore::new(config.path.clone(), config.max_length)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_requested_backend() {
        let mut config = HistoryConfig::default();
        assert_eq!(build_from_config(&config).name(), "file");

        config.backend = "memory".into();
        config.max_length = 4;
        let store = build_from_config(&config);
        assert_eq!(store.name(), "memory");
        assert_eq!(store.max_length(), 4);
    }
}
