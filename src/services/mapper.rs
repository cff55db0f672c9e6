//! 三种仓库形态之间的转换：上游响应、持久化记录、对外 DTO。

use chrono::SubsecRound;
use tracing::warn;
use crate::domain::entities::RepositoryRecord;
use crate::ports::search::RemoteRepository;
use crate::presentation::dto::RepositoryDto;

/// 上游仓库 -> 持久化记录
///
/// 缺少持久化必需字段（id、name、owner.login、stars、forks、updated_at）
/// 或计数为负时返回 None。时间戳截断到秒，与存储精度一致。
pub fn to_record(remote: &RemoteRepository) -> Option<RepositoryRecord> {
    let owner = remote.owner.as_ref()?.login.clone()?;
    let name = remote.name.clone().filter(|n| !n.is_empty())?;
    let stars = remote.stars.filter(|s| *s >= 0)?;
    let forks = remote.forks.filter(|f| *f >= 0)?;

    let mut record = RepositoryRecord::new(
        remote.id?,
        name,
        owner,
        stars,
        forks,
        remote.updated_at?.trunc_subsecs(0),
    );
    if let Some(description) = &remote.description {
        record = record.with_description(description.clone());
    }
    if let Some(language) = &remote.language {
        record = record.with_language(language.clone());
    }
    Some(record)
}

/// 批量转换，跳过无法持久化的条目
pub fn to_records(remotes: &[RemoteRepository]) -> Vec<RepositoryRecord> {
    remotes
        .iter()
        .filter_map(|remote| {
            let record = to_record(remote);
            if record.is_none() {
                warn!(
                    "Skipping GitHub item with missing required fields (id={:?}, name={:?})",
                    remote.id, remote.name
                );
            }
            record
        })
        .collect()
}

/// 持久化记录 -> 对外 DTO
pub fn to_responses(records: Vec<RepositoryRecord>) -> Vec<RepositoryDto> {
    records.into_iter().map(RepositoryDto::from).collect()
}
