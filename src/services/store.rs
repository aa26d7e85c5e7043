//! The shared persistence collaborator: named collections of JSON documents
//! keyed by their `id` field. Writes to a single document are serialized by
//! the collection lock; there is no cross-document transaction, so handlers
//! sequence multi-document mutations as independent best-effort writes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use super::query::{apply_sort, matches, project};

pub const USERS: &str = "users";
pub const TASKS: &str = "tasks";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to serialize document for '{collection}': {source}")]
    Serialize {
        collection: String,
        source: serde_json::Error,
    },

    #[error("corrupt document in '{collection}': {source}")]
    Decode {
        collection: String,
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default, Clone)]
pub struct FindOptions {
    pub filter: Option<Value>,
    pub sort: Option<Value>,
    pub select: Option<Value>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

pub struct DocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // Serialize and append a document, returning its stored form
    pub async fn insert(&self, collection: &str, doc: &impl Serialize) -> StoreResult<Value> {
        let value = serde_json::to_value(doc).map_err(|e| StoreError::Serialize {
            collection: collection.to_string(),
            source: e,
        })?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(value.clone());
        Ok(value)
    }

    // Filter, sort, page and project in that order
    pub async fn find(&self, collection: &str, options: &FindOptions) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let docs: &[Value] = collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut hits: Vec<Value> = docs
            .iter()
            .filter(|doc| {
                options
                    .filter
                    .as_ref()
                    .map_or(true, |filter| matches(doc, filter))
            })
            .cloned()
            .collect();

        if let Some(sort) = &options.sort {
            apply_sort(&mut hits, sort);
        }

        let skip = options.skip.unwrap_or(0);
        if skip > 0 {
            hits.drain(..skip.min(hits.len()));
        }
        if let Some(limit) = options.limit {
            hits.truncate(limit);
        }

        if let Some(select) = &options.select {
            hits = hits.iter().map(|doc| project(doc, select)).collect();
        }

        Ok(hits)
    }

    pub async fn count(&self, collection: &str, filter: Option<&Value>) -> StoreResult<usize> {
        let collections = self.collections.read().await;
        let docs: &[Value] = collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(docs
            .iter()
            .filter(|doc| filter.map_or(true, |f| matches(doc, f)))
            .count())
    }

    pub async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
        select: Option<&Value>,
    ) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().await;
        let doc = collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc_id(doc) == Some(id)));
        Ok(doc.map(|doc| match select {
            Some(spec) => project(doc, spec),
            None => doc.clone(),
        }))
    }

    // Typed read used by handlers that need to work on a record, not raw JSON
    pub async fn find_by_id_as<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> StoreResult<Option<T>> {
        match self.find_by_id(collection, id, None).await? {
            Some(doc) => decode(collection, doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn find_one_as<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: &Value,
    ) -> StoreResult<Option<T>> {
        let collections = self.collections.read().await;
        let doc = collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matches(doc, filter)))
            .cloned();
        drop(collections);
        match doc {
            Some(doc) => decode(collection, doc).map(Some),
            None => Ok(None),
        }
    }

    // Full replacement of the document with the given id
    pub async fn replace_by_id(
        &self,
        collection: &str,
        id: &str,
        doc: &impl Serialize,
    ) -> StoreResult<bool> {
        let value = serde_json::to_value(doc).map_err(|e| StoreError::Serialize {
            collection: collection.to_string(),
            source: e,
        })?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match docs.iter_mut().find(|doc| doc_id(doc) == Some(id)) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Merge the top-level fields of `changes` into every matching document.
    // This is the cascade primitive: the filter carries the guard (for example
    // "id is T and assignedUser is still me") and a zero-match call is a no-op.
    pub async fn update_many(
        &self,
        collection: &str,
        filter: &Value,
        changes: &Value,
    ) -> StoreResult<usize> {
        let Some(changes) = changes.as_object() else {
            return Ok(0);
        };
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let mut touched = 0;
        for doc in docs.iter_mut() {
            if !matches(doc, filter) {
                continue;
            }
            if let Some(fields) = doc.as_object_mut() {
                for (key, value) in changes {
                    fields.insert(key.clone(), value.clone());
                }
                touched += 1;
            }
        }
        Ok(touched)
    }

    pub async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc_id(doc) != Some(id));
        Ok(docs.len() < before)
    }
}

impl Clone for DocumentStore {
    fn clone(&self) -> Self {
        Self {
            collections: self.collections.clone(),
        }
    }
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

fn decode<T: DeserializeOwned>(collection: &str, doc: Value) -> StoreResult<T> {
    serde_json::from_value(doc).map_err(|e| StoreError::Decode {
        collection: collection.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded_store() -> DocumentStore {
        let store = DocumentStore::new();
        store
            .insert(TASKS, &json!({"id": "t1", "name": "alpha", "completed": false, "order": 3}))
            .await
            .unwrap();
        store
            .insert(TASKS, &json!({"id": "t2", "name": "beta", "completed": true, "order": 1}))
            .await
            .unwrap();
        store
            .insert(TASKS, &json!({"id": "t3", "name": "gamma", "completed": false, "order": 2}))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_find_with_filter_and_sort() {
        let store = seeded_store().await;
        let options = FindOptions {
            filter: Some(json!({"completed": false})),
            sort: Some(json!({"order": 1})),
            ..Default::default()
        };
        let hits = store.find(TASKS, &options).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["id"], "t3");
        assert_eq!(hits[1]["id"], "t1");
    }

    #[tokio::test]
    async fn test_find_skip_limit_and_projection() {
        let store = seeded_store().await;
        let options = FindOptions {
            sort: Some(json!({"order": 1})),
            skip: Some(1),
            limit: Some(1),
            select: Some(json!({"name": 1})),
            ..Default::default()
        };
        let hits = store.find(TASKS, &options).await.unwrap();
        assert_eq!(hits, vec![json!({"id": "t3", "name": "gamma"})]);

        // Skip past the end yields an empty page, not a panic
        let options = FindOptions {
            skip: Some(10),
            ..Default::default()
        };
        assert!(store.find(TASKS, &options).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count() {
        let store = seeded_store().await;
        assert_eq!(store.count(TASKS, None).await.unwrap(), 3);
        let filter = json!({"completed": true});
        assert_eq!(store.count(TASKS, Some(&filter)).await.unwrap(), 1);
        assert_eq!(store.count("empty", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_id_and_replace() {
        let store = seeded_store().await;
        let doc = store.find_by_id(TASKS, "t2", None).await.unwrap().unwrap();
        assert_eq!(doc["name"], "beta");

        let replaced = store
            .replace_by_id(TASKS, "t2", &json!({"id": "t2", "name": "beta2"}))
            .await
            .unwrap();
        assert!(replaced);
        let doc = store.find_by_id(TASKS, "t2", None).await.unwrap().unwrap();
        assert_eq!(doc["name"], "beta2");

        assert!(!store
            .replace_by_id(TASKS, "missing", &json!({"id": "missing"}))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_many_respects_the_guard() {
        let store = seeded_store().await;
        // Guarded filter only touches the matching document
        let touched = store
            .update_many(
                TASKS,
                &json!({"id": "t1", "completed": false}),
                &json!({"name": "renamed"}),
            )
            .await
            .unwrap();
        assert_eq!(touched, 1);

        // Same id, stale guard: nothing happens
        let touched = store
            .update_many(
                TASKS,
                &json!({"id": "t1", "completed": true}),
                &json!({"name": "clobbered"}),
            )
            .await
            .unwrap();
        assert_eq!(touched, 0);

        let doc = store.find_by_id(TASKS, "t1", None).await.unwrap().unwrap();
        assert_eq!(doc["name"], "renamed");
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let store = seeded_store().await;
        assert!(store.delete_by_id(TASKS, "t1").await.unwrap());
        assert!(!store.delete_by_id(TASKS, "t1").await.unwrap());
        assert_eq!(store.count(TASKS, None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_typed_reads() {
        #[derive(serde::Deserialize)]
        struct Row {
            id: String,
            name: String,
        }

        let store = seeded_store().await;
        let row: Row = store
            .find_one_as(TASKS, &json!({"name": "beta"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.id, "t2");
        assert_eq!(row.name, "beta");

        let row: Option<Row> = store.find_by_id_as(TASKS, "t9").await.unwrap();
        assert!(row.is_none());
    }
}
