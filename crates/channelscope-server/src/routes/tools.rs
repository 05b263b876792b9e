use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::AppError, state::AppState, tools};

#[derive(Debug, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// `GET /api/tools` - Tool definitions for the assistant.
pub async fn list_tools() -> impl IntoResponse {
    Json(json!({ "data": tools::definitions() }))
}

/// `POST /api/tools/call` - Run one tool with JSON arguments.
pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Json(call): Json<ToolCall>,
) -> Result<impl IntoResponse, AppError> {
    let result = tools::dispatch(
        state.analytics.as_ref(),
        &state.config,
        &call.name,
        call.arguments,
    )
    .await?;
    Ok(Json(json!({ "data": {
        "name": call.name,
        "result": result,
    } })))
}
