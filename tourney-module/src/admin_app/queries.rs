use log::{debug, info};
use std::sync::Arc;

use tourney_common::{
    data::{ContactQuery, ContactQueryPatch, QueryStatus},
    store::{DataStore, Query, RecordStore},
};

use super::error::AdminError;

pub(crate) struct QueryInbox {
    store: Arc<dyn DataStore>,
}

impl QueryInbox {
    pub(crate) fn new(store: Arc<dyn DataStore>) -> Self {
        QueryInbox { store }
    }

    pub(crate) async fn list(
        &self,
        status: Option<QueryStatus>,
    ) -> Result<Vec<ContactQuery>, AdminError> {
        let mut query = Query::all();
        if let Some(status) = status {
            query = query.where_eq("status", status);
        }
        Ok(self.store.fetch(&query.desc("created_at")).await?)
    }

    /// Opening an unread query marks it read; other statuses are kept.
    pub(crate) async fn open(&self, id: &str) -> Result<ContactQuery, AdminError> {
        let mut query: ContactQuery = self.store.fetch_one(id).await?;
        if query.status == QueryStatus::Unread {
            let patch = ContactQueryPatch {
                status: Some(QueryStatus::Read),
                ..Default::default()
            };
            self.store.patch::<ContactQuery, _>(id, &patch).await?;
            query.status = QueryStatus::Read;
            debug!("Contact query {} marked read", id);
        }
        Ok(query)
    }

    pub(crate) async fn respond(&self, id: &str, notes: &str) -> Result<(), AdminError> {
        let patch = ContactQueryPatch {
            status: Some(QueryStatus::Responded),
            admin_notes: Some(notes.to_owned()),
        };
        self.store.patch::<ContactQuery, _>(id, &patch).await?;
        info!("Contact query {} responded", id);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tourney_common::{data::NewContactQuery, memory_store::MemoryStore};

    async fn seed(store: &MemoryStore, name: &str) -> ContactQuery {
        let new = NewContactQuery {
            name: name.to_owned(),
            email: format!("{}@example.com", name),
            phone: None,
            message: "When does it start?".to_owned(),
            status: QueryStatus::Unread,
            admin_notes: None,
        };
        store.create(&new).await.expect("Query should be stored")
    }

    #[tokio::test]
    async fn test_open_then_respond() {
        let store = Arc::new(MemoryStore::new());
        let first = seed(&store, "asha").await;
        seed(&store, "vikram").await;
        let inbox = QueryInbox::new(store.clone());

        let opened = inbox.open(&first.id).await.expect("Open should succeed");
        assert_eq!(opened.status, QueryStatus::Read);
        assert_eq!(inbox.list(Some(QueryStatus::Unread)).await.expect("List").len(), 1);

        inbox.respond(&first.id, "Starts at 6pm").await.expect("Respond should succeed");
        let writes = store.update_count();
        let reopened = inbox.open(&first.id).await.expect("Open should succeed");
        assert_eq!(reopened.status, QueryStatus::Responded);
        assert_eq!(reopened.admin_notes.as_deref(), Some("Starts at 6pm"));
        assert_eq!(store.update_count(), writes);

        assert_eq!(inbox.list(None).await.expect("List").len(), 2);
        assert!(inbox.respond("missing", "x").await.is_err());
    }
}
