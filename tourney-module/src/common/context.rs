use std::sync::Arc;

use tourney_common::{
    blob_storage::{BlobStorage, FsBlobStorage},
    error::StoreError,
    mongo_store::MongoStore,
    store::DataStore,
};

use super::config::AppConfig;

/// The external collaborators every sub-application talks to.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) store: Arc<dyn DataStore>,
    pub(crate) blobs: Arc<dyn BlobStorage>,
}

impl AppContext {
    pub(crate) async fn try_new(config: AppConfig) -> Result<AppContext, StoreError> {
        let store = MongoStore::try_new(config.mongodb).await?;
        Ok(AppContext {
            store: Arc::new(store),
            blobs: Arc::new(FsBlobStorage::new(config.storage)),
        })
    }
}
