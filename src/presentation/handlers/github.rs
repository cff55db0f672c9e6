use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Json,
};
use std::sync::Arc;
use crate::domain::value_objects::{RepositoryFilter, SortKey};
use crate::presentation::dto::{
    ListRepositoriesQuery, RepositoryDto, SearchRequestDto, SearchResponseDto,
};
use crate::presentation::routes::AppContext;
use crate::services::mapper;
use crate::shared::error::GitsearchError;
use crate::shared::result::Result;

/// API: 搜索 GitHub 并保存结果
pub async fn search_repositories(
    State(ctx): State<Arc<AppContext>>,
    payload: std::result::Result<Json<SearchRequestDto>, JsonRejection>,
) -> Result<Json<SearchResponseDto>> {
    let Json(body) = payload.map_err(|e| GitsearchError::BadRequest(e.body_text()))?;
    let request = body.validate()?;

    let outcome = ctx.search_service.search_and_persist(&request).await?;

    Ok(Json(SearchResponseDto {
        message: outcome.message.to_string(),
        repositories: mapper::to_responses(outcome.repositories),
    }))
}

/// API: 列出已保存的仓库
pub async fn list_repositories(
    State(ctx): State<Arc<AppContext>>,
    query: std::result::Result<Query<ListRepositoriesQuery>, QueryRejection>,
) -> Result<Json<Vec<RepositoryDto>>> {
    let Query(query) = query.map_err(|e| GitsearchError::BadRequest(e.body_text()))?;

    let filter = RepositoryFilter::new(query.language, query.min_stars);
    let sort = SortKey::from_param(query.sort.as_deref());

    let records = ctx.search_service.list_stored(&filter, sort).await?;

    Ok(Json(mapper::to_responses(records)))
}
