use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::news::{DEFAULT_LIMIT, check_limit};
use crate::domain::{NewsFeed, SourceSelector, SourceStatus};
use crate::infrastructure::cancel::CancelSignal;

#[derive(Debug, Deserialize)]
pub(crate) struct NewsQuery {
    source: Option<String>,
    limit: Option<usize>,
}

impl NewsQuery {
    fn validate(self) -> Result<(SourceSelector, usize), AppError> {
        let selector = match self.source.as_deref() {
            Some(raw) => raw
                .parse::<SourceSelector>()
                .map_err(AppError::validation)?,
            None => SourceSelector::All,
        };
        let limit = check_limit(self.limit.unwrap_or(DEFAULT_LIMIT))
            .map_err(AppError::validation)?;
        Ok((selector, limit))
    }
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_news(
    State(state): State<AppState>,
    query: Result<Query<NewsQuery>, QueryRejection>,
) -> Result<Json<NewsFeed>, ApiError> {
    let Query(query) = query.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let (selector, limit) = query.validate()?;
    let feed = state
        .news
        .get(selector, limit, &CancelSignal::never())
        .await?;
    Ok(Json(feed))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn refresh_news(State(state): State<AppState>) -> StatusCode {
    state.news.invalidate_all();
    StatusCode::NO_CONTENT
}

#[tracing::instrument(skip(state))]
pub(crate) async fn news_sources(State(state): State<AppState>) -> Json<Vec<SourceStatus>> {
    let statuses = state
        .news
        .aggregator()
        .source_status(&CancelSignal::never())
        .await;
    Json(statuses)
}
