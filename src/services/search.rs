use std::sync::Arc;
use tracing::info;
use crate::domain::entities::RepositoryRecord;
use crate::domain::value_objects::{RepositoryFilter, SortKey};
use crate::ports::repository::RepositoryPort;
use crate::ports::search::SearchPort;
use crate::services::mapper;
use crate::shared::result::Result;

pub const SAVED_MESSAGE: &str = "Repositories fetched and saved successfully";
pub const EMPTY_MESSAGE: &str = "No repositories found";

/// 已通过校验的搜索请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub language: Option<String>,
    pub sort: Option<SortKey>,
}

/// 搜索并入库的结果
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub message: &'static str,
    pub repositories: Vec<RepositoryRecord>,
}

/// 搜索服务：调用上游、映射、入库、查询
pub struct SearchService {
    search_client: Arc<dyn SearchPort>,
    repository_store: Arc<dyn RepositoryPort>,
}

impl SearchService {
    pub fn new(
        search_client: Arc<dyn SearchPort>,
        repository_store: Arc<dyn RepositoryPort>,
    ) -> Self {
        Self {
            search_client,
            repository_store,
        }
    }

    /// 调用一次上游搜索并按 id 覆盖写入
    ///
    /// 上游失败时直接返回错误，不写入任何数据。
    pub async fn search_and_persist(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let items = self
            .search_client
            .search(
                &request.query,
                request.language.as_deref(),
                request.sort.map(|s| s.as_str()),
            )
            .await?;

        let records = mapper::to_records(&items);
        if records.is_empty() {
            info!("GitHub search for {:?} returned no usable items", request.query);
            return Ok(SearchOutcome {
                message: EMPTY_MESSAGE,
                repositories: Vec::new(),
            });
        }

        let saved = self.repository_store.upsert_all(&records).await?;
        info!(
            "Saved {} repositories for query {:?} ({} items fetched)",
            saved,
            request.query,
            items.len()
        );

        Ok(SearchOutcome {
            message: SAVED_MESSAGE,
            repositories: records,
        })
    }

    /// 查询已保存的仓库
    pub async fn list_stored(
        &self,
        filter: &RepositoryFilter,
        sort: SortKey,
    ) -> Result<Vec<RepositoryRecord>> {
        self.repository_store.query(filter, sort).await
    }
}
