//! On-disk locations for the artifact store

pub mod paths;

pub use paths::{ensure_store_dir, get_store_dir};
