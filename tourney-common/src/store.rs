//! Contract the application expects from the hosted document store.
//!
//! Adapters speak raw [`Document`]s; [`RecordStore`] layers typed access on
//! top so every row crossing the boundary is decoded into its struct.

use async_trait::async_trait;
use log::debug;
use mongodb::bson::{self, Bson, Document};
use serde::Serialize;

use super::{
    data::{Collection, Record},
    error::StoreError,
};

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";
pub const REGISTRATION_ID_FIELD: &str = "registration_id";
pub const REGISTRATION_ID_PREFIX: &str = "REG-";

/// Equality filter on a single field.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Bson,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.filters.push(Filter {
            field: field.to_owned(),
            value: value.into(),
        });
        self
    }

    pub fn asc(mut self, field: &str) -> Self {
        self.order.push(Order {
            field: field.to_owned(),
            ascending: true,
        });
        self
    }

    pub fn desc(mut self, field: &str) -> Self {
        self.order.push(Order {
            field: field.to_owned(),
            ascending: false,
        });
        self
    }
}

#[async_trait]
pub trait DataStore: Send + Sync {
    async fn query(&self, collection: Collection, query: &Query)
        -> Result<Vec<Document>, StoreError>;

    /// Stores a new row. The store fills in `id`, the timestamps and any
    /// generated identifier, and returns the row as stored.
    async fn insert(&self, collection: Collection, record: Document)
        -> Result<Document, StoreError>;

    async fn update(&self, collection: Collection, id: &str, patch: Document)
        -> Result<(), StoreError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}

pub fn format_registration_id(seq: u64) -> String {
    format!("{}{:06}", REGISTRATION_ID_PREFIX, seq)
}

fn decode<R: Record>(document: Document) -> Result<R, StoreError> {
    bson::from_document(document).map_err(|source| StoreError::Decode {
        collection: R::COLLECTION,
        source,
    })
}

#[async_trait]
pub trait RecordStore {
    async fn fetch<R: Record>(&self, query: &Query) -> Result<Vec<R>, StoreError>;

    async fn fetch_one<R: Record>(&self, id: &str) -> Result<R, StoreError>;

    async fn create<R, N>(&self, record: &N) -> Result<R, StoreError>
    where
        R: Record,
        N: Serialize + Sync;

    async fn patch<R, P>(&self, id: &str, patch: &P) -> Result<(), StoreError>
    where
        R: Record,
        P: Serialize + Sync;

    async fn remove<R: Record>(&self, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: DataStore + ?Sized> RecordStore for S {
    async fn fetch<R: Record>(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        let rows = self.query(R::COLLECTION, query).await?;
        debug!("Fetched {} rows from {}", rows.len(), R::COLLECTION);
        rows.into_iter().map(decode::<R>).collect()
    }

    async fn fetch_one<R: Record>(&self, id: &str) -> Result<R, StoreError> {
        let query = Query::all().where_eq(ID_FIELD, id);
        let row = self.query(R::COLLECTION, &query).await?.into_iter().next().ok_or_else(|| {
            StoreError::NotFound {
                collection: R::COLLECTION,
                id: id.to_owned(),
            }
        })?;
        decode(row)
    }

    async fn create<R, N>(&self, record: &N) -> Result<R, StoreError>
    where
        R: Record,
        N: Serialize + Sync,
    {
        let document = bson::to_document(record)?;
        let stored = self.insert(R::COLLECTION, document).await?;
        decode(stored)
    }

    async fn patch<R, P>(&self, id: &str, patch: &P) -> Result<(), StoreError>
    where
        R: Record,
        P: Serialize + Sync,
    {
        let document = bson::to_document(patch)?;
        self.update(R::COLLECTION, id, document).await
    }

    async fn remove<R: Record>(&self, id: &str) -> Result<(), StoreError> {
        self.delete(R::COLLECTION, id).await
    }
}
