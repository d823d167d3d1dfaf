use axum::{Json, extract::State};

use crate::{AppState, error::Result, models::SettingListResponse};

pub async fn list_settings(State(state): State<AppState>) -> Result<Json<SettingListResponse>> {
    let data = state.store.list_settings().await?;

    Ok(Json(SettingListResponse { data }))
}
