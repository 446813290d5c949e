use axum::{extract::State, Json};
use chrono::Local;

use crate::{
    api::state::AppState,
    domain::{Statistics, StatisticsReport},
    error::Result,
};

async fn compute(state: &AppState) -> Result<Statistics> {
    let members = state.service_context.member_repo.list().await?;
    Ok(Statistics::from_members(&members, Local::now().date_naive()))
}

pub async fn get(State(state): State<AppState>) -> Result<Json<Statistics>> {
    Ok(Json(compute(&state).await?))
}

/// Rows of the statistics spreadsheet.
pub async fn export(State(state): State<AppState>) -> Result<Json<StatisticsReport>> {
    let stats = compute(&state).await?;
    Ok(Json(StatisticsReport::from(&stats)))
}
