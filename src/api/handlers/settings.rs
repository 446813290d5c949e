use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    api::state::AppState,
    domain::{CardRangeRequest, SeasonRequest, SystemSetting, SystemSettings, UpdateSettingRequest},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    #[serde(flatten)]
    settings: SystemSettings,
    remaining_cards: i64,
}

impl From<SystemSettings> for SettingsResponse {
    fn from(settings: SystemSettings) -> Self {
        Self {
            remaining_cards: settings.remaining_cards(),
            settings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteMembersResponse {
    deleted: u64,
}

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<SettingsResponse>> {
    let settings = state.service_context.settings_service.get_system_settings().await?;
    Ok(Json(settings.into()))
}

pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpdateSettingRequest>,
) -> Result<Json<SystemSetting>> {
    let setting = state.service_context.settings_service
        .update_setting(&key, request)
        .await?;

    Ok(Json(setting))
}

pub async fn reset_member_counter(State(state): State<AppState>) -> Result<Json<SettingsResponse>> {
    let settings = state.service_context.settings_service.reset_member_id_counter().await?;
    Ok(Json(settings.into()))
}

pub async fn update_card_range(
    State(state): State<AppState>,
    Json(request): Json<CardRangeRequest>,
) -> Result<Json<SettingsResponse>> {
    let settings = state.service_context.settings_service.update_card_range(request).await?;
    Ok(Json(settings.into()))
}

pub async fn update_season(
    State(state): State<AppState>,
    Json(request): Json<SeasonRequest>,
) -> Result<Json<SettingsResponse>> {
    let settings = state.service_context.settings_service.update_season(request).await?;
    Ok(Json(settings.into()))
}

pub async fn delete_all_members(State(state): State<AppState>) -> Result<Json<DeleteMembersResponse>> {
    let deleted = state.service_context.settings_service.delete_all_members().await?;
    Ok(Json(DeleteMembersResponse { deleted }))
}
