use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::{debug, error, info};
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{
        ClientOptions, Credential, FindOneAndUpdateOptions, FindOptions, ReturnDocument,
        ServerApi, ServerApiVersion,
    },
    Client, Database,
};
use serde::Deserialize;

use super::{
    data::Collection,
    error::StoreError,
    store::{
        format_registration_id, DataStore, Query, CREATED_AT_FIELD, ID_FIELD,
        REGISTRATION_ID_FIELD, UPDATED_AT_FIELD,
    },
    utils::now_timestamp,
};

pub const MDB_COUNTERS_COLLECTION: &str = "counters";
const REGISTRATION_SEQ_KEY: &str = "registration_id";

#[derive(Clone, Debug, Deserialize)]
pub struct MongodbConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub uri: String,
    pub db: String,
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn try_new(mongodb_config: MongodbConfig) -> Result<MongoStore, StoreError> {
        let mut client_options =
            ClientOptions::parse_async(&mongodb_config.uri).await.map_err(|err| {
                error!("Failed to parse client_options: {}", err);
                StoreError::from(err)
            })?;
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);
        if let (Some(user), Some(password)) = (mongodb_config.user, mongodb_config.password) {
            client_options.credential =
                Some(Credential::builder().username(user).password(password).build());
        }
        let client = Client::with_options(client_options).map_err(|err| {
            error!("Failed to create mongodb client");
            StoreError::from(err)
        })?;
        info!("Mongodb store ready, db: {}", mongodb_config.db);

        Ok(MongoStore {
            db: client.database(&mongodb_config.db),
        })
    }

    async fn next_registration_seq(&self) -> Result<u64, StoreError> {
        let counters = self.db.collection::<Document>(MDB_COUNTERS_COLLECTION);
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = counters
            .find_one_and_update(
                doc! { "_id": REGISTRATION_SEQ_KEY },
                doc! { "$inc": { "seq": 1i64 } },
                options,
            )
            .await?
            .ok_or_else(|| StoreError::Unavailable("registration counter missing".to_owned()))?;
        let seq = counter
            .get_i64("seq")
            .map_err(|err| StoreError::Unavailable(format!("malformed counter: {}", err)))?;
        Ok(seq.max(0) as u64)
    }
}

fn filter_document(query: &Query) -> Document {
    query
        .filters
        .iter()
        .map(|filter| (filter.field.clone(), filter.value.clone()))
        .collect()
}

fn sort_document(query: &Query) -> Option<Document> {
    if query.order.is_empty() {
        return None;
    }
    let sort: Document = query
        .order
        .iter()
        .map(|order| {
            let direction: i32 = if order.ascending { 1 } else { -1 };
            (order.field.clone(), Bson::Int32(direction))
        })
        .collect();
    Some(sort)
}

#[async_trait]
impl DataStore for MongoStore {
    async fn query(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder()
            .sort(sort_document(query))
            .projection(doc! { "_id": 0 })
            .build();
        let cursor = self
            .db
            .collection::<Document>(collection.name())
            .find(filter_document(query), options)
            .await
            .map_err(|err| {
                error!("Failed to query {}: {}", collection, err);
                StoreError::from(err)
            })?;
        let rows: Vec<Document> = cursor.try_collect().await?;
        Ok(rows)
    }

    async fn insert(
        &self,
        collection: Collection,
        mut record: Document,
    ) -> Result<Document, StoreError> {
        let now = now_timestamp();
        record.insert(ID_FIELD, ObjectId::new().to_hex());
        record.insert(CREATED_AT_FIELD, now.clone());
        record.insert(UPDATED_AT_FIELD, now);
        if collection == Collection::Registrations {
            let seq = self.next_registration_seq().await?;
            record.insert(REGISTRATION_ID_FIELD, format_registration_id(seq));
        }
        self.db
            .collection::<Document>(collection.name())
            .insert_one(&record, None)
            .await
            .map_err(|err| {
                error!("Failed to insert into {}: {}", collection, err);
                StoreError::from(err)
            })?;
        debug!("Inserted into {}: {}", collection, record);
        Ok(record)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        mut patch: Document,
    ) -> Result<(), StoreError> {
        patch.insert(UPDATED_AT_FIELD, now_timestamp());
        let result = self
            .db
            .collection::<Document>(collection.name())
            .update_one(doc! { ID_FIELD: id }, doc! { "$set": patch }, None)
            .await
            .map_err(|err| {
                error!("Failed to update {} {}: {}", collection, id, err);
                StoreError::from(err)
            })?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_owned(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let result = self
            .db
            .collection::<Document>(collection.name())
            .delete_one(doc! { ID_FIELD: id }, None)
            .await
            .map_err(|err| {
                error!("Failed to delete {} {}: {}", collection, id, err);
                StoreError::from(err)
            })?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_owned(),
            });
        }
        Ok(())
    }
}
