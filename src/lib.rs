// Data Visualization API - Core Library
// Exposes the stores for the HTTP server and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{ConfigError, DatabaseLocation, Settings};
pub use db::{count_rows, open_database, setup_database};
pub use entities::data_entry::{
    create_data_entry, delete_data_entry, get_data_entry, list_data_entries, update_data_entry,
};
pub use entities::data_type::{
    create_data_type, data_type_exists, delete_data_type, get_data_type, list_data_types,
    update_data_type,
};
pub use entities::{DataEntry, DataEntryInput, DataType, DataTypeInput, EntryFilter};
pub use error::{StoreError, StoreResult};
pub use logging::init_tracing;

#[cfg(feature = "server")]
pub use api::{router, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
