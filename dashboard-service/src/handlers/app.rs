use crate::startup::AppState;
use axum::extract::State;
use dashboard_core::error::AppError;

pub async fn health_check(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.db.health_check().await?;
    Ok("OK")
}
