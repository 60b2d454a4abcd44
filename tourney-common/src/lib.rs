pub mod blob_storage;
pub mod data;
pub mod error;
pub mod memory_store;
pub mod mongo_store;
pub mod store;
pub mod utils;
