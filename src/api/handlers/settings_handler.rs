//! Store settings handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, put},
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::admin;
use crate::api::AppState;
use crate::domain::{Settings, SettingsUpdate};
use crate::errors::AppResult;

pub fn settings_routes(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_settings).merge(admin(put(update_settings), state)),
    )
}

/// Public store settings, readable during maintenance
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Current settings", body = Settings))
)]
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<Settings>> {
    Ok(Json(state.settings_service.get().await?))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Settings updated", body = Settings),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_settings(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SettingsUpdate>,
) -> AppResult<Json<Settings>> {
    Ok(Json(state.settings_service.update(payload).await?))
}
