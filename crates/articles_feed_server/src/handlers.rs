//! Route handlers and wire DTOs.
//!
//! # Responsibility
//! - Bind and validate requests, then delegate to [`ArticleStore`].
//! - Shape store results into camelCase response payloads.
//!
//! # Invariants
//! - Binding failures are validation faults, reported in the envelope.
//! - Request text is never logged.

use crate::envelope::{ApiResponse, PageMeta};
use crate::error::ApiError;
use crate::AppState;
use articles_feed_core::{
    core_version, Article, ArticleFilter, FeedError, NewArticle, PageWindow, DEFAULT_PAGE,
    DEFAULT_PAGE_SIZE,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListArticlesParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub query: Option<String>,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub id: String,
    pub title: String,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.article_id.to_string(),
            title: article.title,
            author_name: article.author_name,
            body: article.body,
            created_at: article.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy",
        version: core_version(),
    }))
}

/// POST /articles
pub async fn create_article(
    State(state): State<AppState>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ArticleResponse>>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    let input = NewArticle::new(request.title, request.author_name, request.body);
    input.validate().map_err(FeedError::from)?;

    let article = state.articles.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ArticleResponse::from(article))),
    ))
}

/// GET /articles
pub async fn list_articles(
    State(state): State<AppState>,
    params: Result<Query<ListArticlesParams>, QueryRejection>,
) -> Result<Json<ApiResponse<ArticleListResponse>>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let filter = build_filter(params, state.max_page_size);

    let page = state.articles.list(&filter).await?;
    let meta = PageMeta {
        page: page.page,
        page_size: page.page_size,
        total_items: page.total_items,
    };
    let articles = page.articles.into_iter().map(ArticleResponse::from).collect();

    Ok(Json(ApiResponse::page(
        ArticleListResponse { articles },
        meta,
    )))
}

/// Missing window values take the defaults; `max_page_size` caps the size.
fn build_filter(params: ListArticlesParams, max_page_size: Option<i64>) -> ArticleFilter {
    let mut page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if let Some(cap) = max_page_size {
        page_size = PageWindow::normalize(DEFAULT_PAGE, page_size)
            .page_size()
            .min(cap);
    }

    let mut filter =
        ArticleFilter::default().with_window(params.page.unwrap_or(DEFAULT_PAGE), page_size);
    if let Some(query) = params.query {
        filter = filter.with_query(query);
    }
    if let Some(author_name) = params.author_name {
        filter = filter.with_author_name(author_name);
    }
    filter
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found("resource not found")
}
