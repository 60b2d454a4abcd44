use mongodb::bson;
use thiserror::Error;

use super::data::Collection;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Mongodb client error {0}")]
    Mongodb(#[from] mongodb::error::Error),
    #[error("Malformed {collection} record: {source}")]
    Decode {
        collection: Collection,
        #[source]
        source: bson::de::Error,
    },
    #[error("Failed to encode record: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("No {collection} record with id {id}")]
    NotFound { collection: Collection, id: String },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Blob already exists: {0}")]
    BlobExists(String),
    #[error("Blob storage io error {0}")]
    Io(#[from] std::io::Error),
}
