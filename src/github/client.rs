use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use serde_json::Value;

use super::{GitHubApi, ResourceFamily};
use crate::error::{SyncError, SyncResult};

const ISSUES_ACCEPT: &str = "application/vnd.github.v3.full+json";
const PROJECTS_ACCEPT: &str = "application/vnd.github.inertia-preview+json";
const AGENT: &str = concat!("teamsync/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client. Each request carries the header set of its resource family.
pub struct HttpGitHub {
    client: reqwest::Client,
    issue_headers: HeaderMap,
    project_headers: HeaderMap,
}

impl HttpGitHub {
    pub fn new(token: &str) -> Result<Self> {
        let auth = HeaderValue::from_str(&format!("token {token}"))
            .context("GITHUB_TOKEN is not a valid header value")?;

        let headers_for = |accept: &'static str| {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, auth.clone());
            headers.insert(ACCEPT, HeaderValue::from_static(accept));
            headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));
            headers
        };

        Ok(Self {
            client: reqwest::Client::new(),
            issue_headers: headers_for(ISSUES_ACCEPT),
            project_headers: headers_for(PROJECTS_ACCEPT),
        })
    }

    fn headers(&self, family: ResourceFamily) -> HeaderMap {
        match family {
            ResourceFamily::Issues => self.issue_headers.clone(),
            ResourceFamily::Projects => self.project_headers.clone(),
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        method: &'static str,
        url: &str,
    ) -> SyncResult<reqwest::Response> {
        let resp = request.send().await.map_err(|source| SyncError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn fetch_page(
        &self,
        url: &str,
        family: ResourceFamily,
    ) -> SyncResult<(Vec<Value>, Option<String>)> {
        let request = self.client.get(url).headers(self.headers(family));
        let resp = self.send(request, "GET", url).await?;
        let next = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);
        let page = read_json(resp, url).await?;
        let items: Vec<Value> =
            serde_json::from_value(page).map_err(|e| SyncError::decode(url, e))?;
        tracing::debug!(url, items = items.len(), has_next = next.is_some(), "fetched page");
        Ok((items, next))
    }
}

#[async_trait]
impl GitHubApi for HttpGitHub {
    async fn get_one(&self, url: &str, family: ResourceFamily) -> SyncResult<Value> {
        let request = self.client.get(url).headers(self.headers(family));
        let resp = self.send(request, "GET", url).await?;
        read_json(resp, url).await
    }

    fn get_many<'a>(
        &'a self,
        url: &str,
        family: ResourceFamily,
    ) -> BoxStream<'a, SyncResult<Value>> {
        stream::try_unfold(Some(url.to_string()), move |next| async move {
            let Some(url) = next else {
                return Ok::<_, SyncError>(None);
            };
            let (items, next) = self.fetch_page(&url, family).await?;
            let page = stream::iter(items.into_iter().map(Ok::<Value, SyncError>));
            Ok::<_, SyncError>(Some((page, next)))
        })
        .try_flatten()
        .boxed()
    }

    async fn post_one(
        &self,
        url: &str,
        family: ResourceFamily,
        body: &Value,
    ) -> SyncResult<Value> {
        let request = self.client.post(url).headers(self.headers(family)).json(body);
        let resp = self.send(request, "POST", url).await?;
        read_json(resp, url).await
    }
}

/// An empty body (e.g. from a card move) reads as `null`.
async fn read_json(resp: reqwest::Response, url: &str) -> SyncResult<Value> {
    let text = resp.text().await.map_err(|source| SyncError::Http {
        url: url.to_string(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| SyncError::decode(url, e))
}

/// Extract the `rel="next"` target from a `Link` header.
pub(crate) fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments
            .next()?
            .trim()
            .strip_prefix('<')?
            .strip_suffix('>')?;
        segments
            .any(|s| s.trim() == r#"rel="next""#)
            .then(|| target.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_next_link() {
        let header = r#"<https://api.github.com/projects/1/columns?page=2>; rel="next", <https://api.github.com/projects/1/columns?page=5>; rel="last""#;
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://api.github.com/projects/1/columns?page=2")
        );
    }

    #[test]
    fn next_need_not_come_first() {
        let header = r#"<https://x/?page=1>; rel="prev", <https://x/?page=3>; rel="next""#;
        assert_eq!(next_link(header).as_deref(), Some("https://x/?page=3"));
    }

    #[test]
    fn last_page_has_no_next() {
        let header = r#"<https://x/?page=1>; rel="first", <https://x/?page=2>; rel="prev""#;
        assert_eq!(next_link(header), None);
        assert_eq!(next_link(""), None);
    }

    #[test]
    fn rejects_bad_token() {
        assert!(HttpGitHub::new("bad\ntoken").is_err());
    }
}
