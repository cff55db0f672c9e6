use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, warn};
use crate::ports::search::{RemoteRepository, SearchApiError, SearchPort};
use crate::shared::config::GitHubConfig;
use crate::shared::error::GitsearchError;
use crate::shared::result::Result;

const SEARCH_PATH: &str = "/search/repositories";

/// 搜索接口响应，只关心 items
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Option<Vec<Option<RemoteRepository>>>,
}

impl SearchResponse {
    /// items 缺失或为 null 时返回空列表，null 元素直接跳过
    fn into_items(self) -> Vec<RemoteRepository> {
        self.items
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect()
    }
}

/// 拼接上游查询语句，非空白语言追加 `language:` 过滤
pub fn build_query(query: &str, language: Option<&str>) -> String {
    match language.filter(|l| !l.trim().is_empty()) {
        Some(language) => format!("{} language:{}", query, language),
        None => query.to_string(),
    }
}

/// GitHub 仓库搜索客户端
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

        if let Some(token) = config.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|e| GitsearchError::Config(format!("Invalid GitHub token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http = builder
            .build()
            .map_err(|e| GitsearchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchPort for GitHubClient {
    async fn search(
        &self,
        query: &str,
        language: Option<&str>,
        sort: Option<&str>,
    ) -> std::result::Result<Vec<RemoteRepository>, SearchApiError> {
        let final_query = build_query(query, language);
        let url = format!("{}{}", self.base_url, SEARCH_PATH);

        let mut params = vec![("q", final_query.as_str())];
        if let Some(sort) = sort {
            params.push(("sort", sort));
        }

        debug!("GitHub search: q={:?} sort={:?}", final_query, sort);

        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("GitHub search request failed: {}", e);
                SearchApiError::transport("Error calling GitHub API", e)
            })?;

        let status = response.status();
        if let Some(err) = SearchApiError::from_status(status.as_u16()) {
            let detail = response.text().await.unwrap_or_default();
            warn!("GitHub search returned HTTP {}: {}", status, detail);
            return Err(err);
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            warn!("Failed to decode GitHub search response: {}", e);
            SearchApiError::transport("Malformed GitHub API response", e)
        })?;

        let items = body.into_items();
        debug!("GitHub search returned {} items", items.len());
        Ok(items)
    }
}
