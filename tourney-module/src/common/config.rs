use config::{Config, ConfigError, Environment, File};
use log::{error, info};
use serde::Deserialize;

use tourney_common::{blob_storage::BlobStorageConfig, mongo_store::MongodbConfig};

#[derive(Debug, Deserialize)]
pub(crate) struct AppConfig {
    pub(crate) mongodb: MongodbConfig,
    pub(crate) storage: BlobStorageConfig,
}

impl AppConfig {
    pub(crate) fn try_from_path(config: &str) -> Result<AppConfig, ConfigError> {
        info!("Read config from path: {}", config);
        let config = Config::builder()
            .add_source(File::with_name(config))
            .add_source(Environment::with_prefix("TOURNEY").separator("__"))
            .build()
            .map_err(|err| {
                error!("Failed to build envs due to the error: {}", err);
                err
            })?;
        config.try_deserialize().map_err(|err| {
            error!("Failed to deserialize config: {}", err);
            err
        })
    }
}
