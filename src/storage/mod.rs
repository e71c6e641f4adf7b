mod loro_store;

pub use loro_store::{LoroStore, CATALOG_DB, DATA_DIR};
