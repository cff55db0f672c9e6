use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// 仓库搜索接口（上游平台）
#[async_trait]
pub trait SearchPort: Send + Sync {
    /// 搜索仓库，只取第一页结果
    ///
    /// `language` 非空白时追加 ` language:<language>` 过滤；
    /// `sort` 原样透传给上游。
    async fn search(
        &self,
        query: &str,
        language: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Vec<RemoteRepository>, SearchApiError>;
}

/// 上游返回的仓库信息，所有字段在解码时都可缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteRepository {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<RemoteOwner>,
    pub language: Option<String>,
    #[serde(rename = "stargazers_count")]
    pub stars: Option<i64>,
    #[serde(rename = "forks_count")]
    pub forks: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 上游仓库的 owner 对象
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteOwner {
    pub login: Option<String>,
}

/// 上游调用失败
#[derive(Debug, thiserror::Error)]
pub enum SearchApiError {
    /// HTTP 429
    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    /// 其他 4xx
    #[error("GitHub API client error")]
    ClientError { status: u16 },

    /// 5xx
    #[error("GitHub API server error")]
    ServerError { status: u16 },

    /// 连接失败、超时或响应体无法解析
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SearchApiError {
    pub fn transport(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: source.into(),
        }
    }

    /// 按 HTTP 状态码归类，成功状态返回 None
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            429 => Some(Self::RateLimited),
            400..=499 => Some(Self::ClientError { status }),
            500..=599 => Some(Self::ServerError { status }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(SearchApiError::from_status(429), Some(SearchApiError::RateLimited)));
        assert!(matches!(
            SearchApiError::from_status(404),
            Some(SearchApiError::ClientError { status: 404 })
        ));
        assert!(matches!(
            SearchApiError::from_status(503),
            Some(SearchApiError::ServerError { status: 503 })
        ));
        assert!(SearchApiError::from_status(200).is_none());
    }

    #[test]
    fn messages_omit_status_code() {
        let client = SearchApiError::ClientError { status: 422 };
        let server = SearchApiError::ServerError { status: 503 };
        assert_eq!(client.to_string(), "GitHub API client error");
        assert_eq!(server.to_string(), "GitHub API server error");
    }

    #[test]
    fn remote_repository_ignores_unknown_fields() {
        let json = r#"{
            "id": 7,
            "name": "x",
            "full_name": "o/x",
            "owner": {"login": "o", "type": "User"},
            "stargazers_count": 3,
            "forks_count": 1,
            "updated_at": "2024-05-01T10:00:00Z",
            "topics": ["a"]
        }"#;
        let repo: RemoteRepository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.id, Some(7));
        assert_eq!(repo.owner.and_then(|o| o.login), Some("o".to_string()));
        assert_eq!(repo.language, None);
        assert_eq!(repo.stars, Some(3));
    }
}
