pub mod client;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{SyncError, SyncResult};

pub use client::HttpGitHub;

/// Issue-like and project-like resources need different accept headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFamily {
    Issues,
    Projects,
}

#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn get_one(&self, url: &str, family: ResourceFamily) -> SyncResult<Value>;

    /// Every element of a paginated collection. Pages are fetched on demand,
    /// following the `next` link until the server stops sending one.
    fn get_many<'a>(&'a self, url: &str, family: ResourceFamily)
        -> BoxStream<'a, SyncResult<Value>>;

    async fn post_one(&self, url: &str, family: ResourceFamily, body: &Value)
        -> SyncResult<Value>;
}

pub fn decode<T: DeserializeOwned>(url: &str, value: Value) -> SyncResult<T> {
    serde_json::from_value(value).map_err(|e| SyncError::decode(url, e))
}

pub async fn fetch<T: DeserializeOwned>(
    api: &dyn GitHubApi,
    url: &str,
    family: ResourceFamily,
) -> SyncResult<T> {
    let value = api.get_one(url, family).await?;
    decode(url, value)
}

/// Typed view over [`GitHubApi::get_many`].
pub fn list<'a, T: DeserializeOwned + 'a>(
    api: &'a dyn GitHubApi,
    url: &str,
    family: ResourceFamily,
) -> impl Stream<Item = SyncResult<T>> + 'a {
    let source = url.to_string();
    api.get_many(url, family)
        .map(move |item| item.and_then(|value| decode(&source, value)))
}
