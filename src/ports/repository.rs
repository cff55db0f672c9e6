use async_trait::async_trait;
use crate::domain::entities::RepositoryRecord;
use crate::domain::value_objects::{RepositoryFilter, SortKey};
use crate::shared::result::Result;

/// 仓库仓储接口（Repository Pattern）
#[async_trait]
pub trait RepositoryPort: Send + Sync {
    /// 按 id 批量插入或覆盖，整体在一个事务内完成
    async fn upsert_all(&self, records: &[RepositoryRecord]) -> Result<usize>;

    /// 按过滤条件查询，按排序字段降序
    async fn query(&self, filter: &RepositoryFilter, sort: SortKey) -> Result<Vec<RepositoryRecord>>;
}
