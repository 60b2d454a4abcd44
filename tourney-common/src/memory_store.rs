use async_trait::async_trait;
use chrono::DateTime;
use log::debug;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering as AtomicOrdering},
};
use tokio::sync::Mutex;

use super::{
    data::Collection,
    error::StoreError,
    store::{
        format_registration_id, DataStore, Query, CREATED_AT_FIELD, ID_FIELD,
        REGISTRATION_ID_FIELD, UPDATED_AT_FIELD,
    },
    utils::now_timestamp,
};

#[derive(Default)]
struct Tables {
    rows: HashMap<Collection, Vec<Document>>,
    registration_seq: u64,
}

#[derive(Default)]
struct Faults {
    failing_inserts: HashSet<Collection>,
    updates_before_failure: Option<usize>,
}

/// In-process document store with the same contract as the hosted one.
/// Rows keep insertion order, which is the tie-break for equal sort keys.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
    updates: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following insert into `collection` fail.
    pub async fn fail_inserts(&self, collection: Collection) {
        self.faults.lock().await.failing_inserts.insert(collection);
    }

    /// Lets `successful` more updates through, then fails the rest.
    pub async fn fail_updates_after(&self, successful: usize) {
        self.faults.lock().await.updates_before_failure = Some(successful);
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(AtomicOrdering::Relaxed)
    }

    pub async fn rows(&self, collection: Collection) -> Vec<Document> {
        self.tables.lock().await.rows.get(&collection).cloned().unwrap_or_default()
    }
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn values_equal(left: &Bson, right: &Bson) -> bool {
    match (numeric(left), numeric(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left == right,
    }
}

fn compare_values(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let (left, right) = match (left, right) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(l), Some(r)) => (l, r),
    };
    if let (Some(l), Some(r)) = (numeric(left), numeric(right)) {
        return l.partial_cmp(&r).unwrap_or(Ordering::Equal);
    }
    match (left, right) {
        (Bson::String(l), Bson::String(r)) => {
            match (DateTime::parse_from_rfc3339(l), DateTime::parse_from_rfc3339(r)) {
                (Ok(l), Ok(r)) => l.cmp(&r),
                _ => l.cmp(r),
            }
        }
        (Bson::Boolean(l), Bson::Boolean(r)) => l.cmp(r),
        (Bson::DateTime(l), Bson::DateTime(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

fn matches(row: &Document, query: &Query) -> bool {
    query.filters.iter().all(|filter| {
        row.get(&filter.field).is_some_and(|value| values_equal(value, &filter.value))
    })
}

fn sort_rows(rows: &mut [Document], query: &Query) {
    rows.sort_by(|a, b| {
        query
            .order
            .iter()
            .map(|order| {
                let ordering = compare_values(a.get(&order.field), b.get(&order.field));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn query(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Document> = tables
            .rows
            .get(&collection)
            .map(|rows| rows.iter().filter(|row| matches(row, query)).cloned().collect())
            .unwrap_or_default();
        sort_rows(&mut rows, query);
        Ok(rows)
    }

    async fn insert(
        &self,
        collection: Collection,
        mut record: Document,
    ) -> Result<Document, StoreError> {
        if self.faults.lock().await.failing_inserts.contains(&collection) {
            return Err(StoreError::Unavailable(format!("insert into {} rejected", collection)));
        }
        let mut tables = self.tables.lock().await;
        let now = now_timestamp();
        record.insert(ID_FIELD, ObjectId::new().to_hex());
        record.insert(CREATED_AT_FIELD, now.clone());
        record.insert(UPDATED_AT_FIELD, now);
        if collection == Collection::Registrations {
            tables.registration_seq += 1;
            record.insert(REGISTRATION_ID_FIELD, format_registration_id(tables.registration_seq));
        }
        debug!("Memory insert into {}: {}", collection, record);
        tables.rows.entry(collection).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<(), StoreError> {
        {
            let mut faults = self.faults.lock().await;
            if let Some(remaining) = faults.updates_before_failure.as_mut() {
                if *remaining == 0 {
                    return Err(StoreError::Unavailable(format!("update of {} rejected", collection)));
                }
                *remaining -= 1;
            }
        }
        let mut tables = self.tables.lock().await;
        let row = tables
            .rows
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|row| row.get_str(ID_FIELD).ok() == Some(id)))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        for (field, value) in patch {
            row.insert(field, value);
        }
        row.insert(UPDATED_AT_FIELD, now_timestamp());
        self.updates.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let rows = tables.rows.entry(collection).or_default();
        let before = rows.len();
        rows.retain(|row| row.get_str(ID_FIELD).ok() != Some(id));
        if rows.len() == before {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_owned(),
            });
        }
        Ok(())
    }
}
