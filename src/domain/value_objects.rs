use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 可接受的排序字段，用于校验提示
pub const SORT_KEYS: [&str; 3] = ["stars", "forks", "updated"];

/// 排序字段，均为降序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Stars,
    Forks,
    Updated,
}

impl SortKey {
    /// 宽松解析：缺失或未知值回退为 stars
    pub fn from_param(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Stars => "stars",
            SortKey::Forks => "forks",
            SortKey::Updated => "updated",
        }
    }

    /// 对应的存储列
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Stars => "stars",
            SortKey::Forks => "forks",
            SortKey::Updated => "last_updated",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stars" => Ok(SortKey::Stars),
            "forks" => Ok(SortKey::Forks),
            "updated" => Ok(SortKey::Updated),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 单个查询条件，多个条件之间为 AND
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    LanguageEquals(String),
    MinStars(i64),
}

/// 已存仓库的过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryFilter {
    pub language: Option<String>,
    pub min_stars: Option<i64>,
}

impl RepositoryFilter {
    pub fn new(language: Option<String>, min_stars: Option<i64>) -> Self {
        Self { language, min_stars }
    }

    /// 生成生效的条件；空白语言不产生条件
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(language) = self.language.as_deref().filter(|l| !l.trim().is_empty()) {
            predicates.push(Predicate::LanguageEquals(language.to_string()));
        }
        if let Some(min_stars) = self.min_stars {
            predicates.push(Predicate::MinStars(min_stars));
        }

        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_accepts_only_known_keys() {
        assert_eq!("stars".parse::<SortKey>(), Ok(SortKey::Stars));
        assert_eq!("forks".parse::<SortKey>(), Ok(SortKey::Forks));
        assert_eq!("updated".parse::<SortKey>(), Ok(SortKey::Updated));
        assert!("Stars".parse::<SortKey>().is_err());
        assert!("".parse::<SortKey>().is_err());
    }

    #[test]
    fn lenient_parse_falls_back_to_stars() {
        assert_eq!(SortKey::from_param(None), SortKey::Stars);
        assert_eq!(SortKey::from_param(Some("invalid")), SortKey::Stars);
        assert_eq!(SortKey::from_param(Some("updated")), SortKey::Updated);
        assert_eq!(SortKey::Updated.column(), "last_updated");
    }

    #[test]
    fn predicates_skip_absent_and_blank_filters() {
        assert!(RepositoryFilter::default().predicates().is_empty());
        assert!(RepositoryFilter::new(Some("  ".into()), None).predicates().is_empty());

        let filter = RepositoryFilter::new(Some("Java".into()), Some(100));
        assert_eq!(
            filter.predicates(),
            vec![
                Predicate::LanguageEquals("Java".into()),
                Predicate::MinStars(100),
            ]
        );
    }
}
