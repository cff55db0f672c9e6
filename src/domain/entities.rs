use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 描述字段的最大存储长度（字符数）
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// 持久化的仓库记录，以 GitHub 分配的 id 为主键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
    pub language: Option<String>,
    pub stars: i64,
    pub forks: i64,
    pub last_updated: DateTime<Utc>,
}

impl RepositoryRecord {
    pub fn new(
        id: i64,
        name: String,
        owner: String,
        stars: i64,
        forks: i64,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description: None,
            owner,
            language: None,
            stars,
            forks,
            last_updated,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(truncate_description(description));
        self
    }

    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }
}

/// 按字符边界截断到 MAX_DESCRIPTION_CHARS
pub fn truncate_description(description: String) -> String {
    match description.char_indices().nth(MAX_DESCRIPTION_CHARS) {
        Some((byte_idx, _)) => description[..byte_idx].to_string(),
        None => description,
    }
}
