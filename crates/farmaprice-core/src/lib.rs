pub mod error;
pub mod records;
pub mod settings;
pub mod stores;

pub use error::ConfigError;
pub use records::{best_priced, AggregateResult, ListingRecord, StoreQueryResult};
pub use settings::{load_settings, load_settings_from_env, Settings, DEFAULT_USER_AGENT};
pub use stores::{
    load_stores, ApiConfig, ApiFieldPaths, FieldCandidate, FieldRules, StoreConfig, StoresFile,
};
