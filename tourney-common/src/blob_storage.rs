use async_trait::async_trait;
use log::{debug, error, info};
use serde::Deserialize;
use std::{collections::HashMap, io::ErrorKind, path::PathBuf};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};

use super::error::StoreError;

pub const PAYMENT_SCREENSHOTS_BUCKET: &str = "payment-screenshots";

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stores `bytes` as `name` inside `bucket` and returns the storage path.
    /// An existing blob with the same name is never overwritten.
    async fn upload(&self, bucket: &str, name: &str, bytes: Vec<u8>) -> Result<String, StoreError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlobStorageConfig {
    #[serde(default = "BlobStorageConfig::default_root")]
    pub root: PathBuf,
    pub public_url: String,
}

impl BlobStorageConfig {
    fn default_root() -> PathBuf {
        PathBuf::from("storage")
    }
}

fn join_url(base: &str, bucket: &str, path: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), bucket, path.trim_start_matches('/'))
}

pub struct FsBlobStorage {
    root: PathBuf,
    public_url: String,
}

impl FsBlobStorage {
    pub fn new(config: BlobStorageConfig) -> Self {
        info!("Blob storage root: {}", config.root.display());
        FsBlobStorage {
            root: config.root,
            public_url: config.public_url,
        }
    }
}

#[async_trait]
impl BlobStorage for FsBlobStorage {
    async fn upload(&self, bucket: &str, name: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir).await?;
        let file = fs::OpenOptions::new().write(true).create_new(true).open(dir.join(name)).await;
        let mut file = match file {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                error!("Blob already exists: {}/{}", bucket, name);
                return Err(StoreError::BlobExists(format!("{}/{}", bucket, name)));
            }
            Err(err) => return Err(StoreError::from(err)),
        };
        file.write_all(&bytes).await?;
        file.flush().await?;
        debug!("Uploaded blob {}/{} of {} bytes", bucket, name, bytes.len());
        Ok(name.to_owned())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        join_url(&self.public_url, bucket, path)
    }
}

pub struct MemoryBlobStorage {
    public_url: String,
    blobs: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStorage {
    pub fn new(public_url: &str) -> Self {
        MemoryBlobStorage {
            public_url: public_url.to_owned(),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().await.get(&(bucket.to_owned(), path.to_owned())).cloned()
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }
}

impl Default for MemoryBlobStorage {
    fn default() -> Self {
        Self::new("memory://storage")
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn upload(&self, bucket: &str, name: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let mut blobs = self.blobs.lock().await;
        let key = (bucket.to_owned(), name.to_owned());
        if blobs.contains_key(&key) {
            return Err(StoreError::BlobExists(format!("{}/{}", bucket, name)));
        }
        blobs.insert(key, bytes);
        Ok(name.to_owned())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        join_url(&self.public_url, bucket, path)
    }
}
