use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value;

use super::{GitHubApi, ResourceFamily};
use crate::error::{SyncError, SyncResult};

/// In-memory GitHub that serves canned objects and collections and records writes.
#[derive(Default)]
pub struct MockGitHub {
    objects: HashMap<String, Value>,
    collections: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    pub posts: Arc<Mutex<Vec<(String, Value)>>>,
    pub requests: Arc<Mutex<Vec<(String, ResourceFamily)>>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, url: &str, value: Value) -> Self {
        self.objects.insert(url.to_string(), value);
        self
    }

    pub fn with_collection(mut self, url: &str, items: Vec<Value>) -> Self {
        self.collections.insert(url.to_string(), items);
        self
    }

    /// Any request to `url` answers 500.
    pub fn with_failure(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn posted(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap().clone()
    }

    pub fn families_for(&self, url: &str) -> Vec<ResourceFamily> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, f)| *f)
            .collect()
    }

    fn record(&self, url: &str, family: ResourceFamily) -> SyncResult<()> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), family));
        if self.failing.contains(url) {
            return Err(status(url, 500));
        }
        Ok(())
    }
}

fn status(url: &str, code: u16) -> SyncError {
    SyncError::Status {
        method: "GET",
        url: url.to_string(),
        status: code,
        body: String::new(),
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn get_one(&self, url: &str, family: ResourceFamily) -> SyncResult<Value> {
        self.record(url, family)?;
        self.objects.get(url).cloned().ok_or_else(|| status(url, 404))
    }

    fn get_many<'a>(
        &'a self,
        url: &str,
        family: ResourceFamily,
    ) -> BoxStream<'a, SyncResult<Value>> {
        if let Err(e) = self.record(url, family) {
            return stream::iter(vec![Err(e)]).boxed();
        }
        match self.collections.get(url) {
            Some(items) => stream::iter(items.clone().into_iter().map(Ok::<Value, SyncError>)).boxed(),
            None => stream::iter(vec![Err(status(url, 404))]).boxed(),
        }
    }

    async fn post_one(
        &self,
        url: &str,
        family: ResourceFamily,
        body: &Value,
    ) -> SyncResult<Value> {
        self.record(url, family)?;
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        Ok(Value::Null)
    }
}
