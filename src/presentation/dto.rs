use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use chrono::SecondsFormat;
use serde::{de, Deserialize, Deserializer, Serialize};
use crate::domain::entities::RepositoryRecord;
use crate::domain::value_objects::{SortKey, SORT_KEYS};
use crate::services::search::SearchRequest;
use crate::shared::error::GitsearchError;

/// 仓库 DTO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
    pub language: Option<String>,
    pub stars: i64,
    pub forks: i64,
    pub last_updated: String,
}

impl From<RepositoryRecord> for RepositoryDto {
    fn from(record: RepositoryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            owner: record.owner,
            language: record.language,
            stars: record.stars,
            forks: record.forks,
            last_updated: record.last_updated.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// POST /api/github/search 请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequestDto {
    pub query: Option<String>,
    pub language: Option<String>,
    pub sort: Option<String>,
}

impl SearchRequestDto {
    /// 校验并收集所有不合法的字段
    pub fn validate(self) -> Result<SearchRequest, GitsearchError> {
        let mut errors = BTreeMap::new();

        let query = self.query.filter(|q| !q.trim().is_empty());
        if query.is_none() {
            errors.insert("query".to_string(), "Query must not be empty".to_string());
        }

        let sort = match self.sort.as_deref() {
            None => None,
            Some(value) => match value.parse::<SortKey>() {
                Ok(key) => Some(key),
                Err(_) => {
                    errors.insert(
                        "sort".to_string(),
                        format!("Sort must be one of: {}", SORT_KEYS.join(", ")),
                    );
                    None
                }
            },
        };

        match query {
            Some(query) if errors.is_empty() => Ok(SearchRequest {
                query,
                language: self.language,
                sort,
            }),
            _ => Err(GitsearchError::Validation(errors)),
        }
    }
}

/// POST /api/github/search 响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponseDto {
    pub message: String,
    pub repositories: Vec<RepositoryDto>,
}

/// GET /api/github/repositories 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRepositoriesQuery {
    pub language: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_stars: Option<i64>,
    pub sort: Option<String>,
}

/// 空白的查询参数（如 `minStars=`）视为未提供
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}
