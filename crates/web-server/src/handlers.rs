use crate::tools::{ToolSpec, call_tool, tool_catalog};
use crate::{AppState, error::AppError};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde_json::{Value, json};
use std::sync::Arc;

/// # GET /api/health
/// Reports whether the store has been built yet, with its size when it has.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let body = match state.store.current() {
        Ok(store) => json!({
            "status": "ok",
            "store_loaded": true,
            "symbols": store.symbol_count(),
            "bars": store.bar_count(),
        }),
        Err(_) => json!({ "status": "ok", "store_loaded": false }),
    };
    Json(body)
}

/// # GET /api/tools
pub async fn list_tools() -> Json<&'static [ToolSpec]> {
    Json(tool_catalog())
}

/// # POST /api/tools/:name
/// The body is the JSON argument object; an empty body means no arguments.
pub async fn invoke_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let args = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadArguments {
            tool: name.clone(),
            message: e.to_string(),
        })?
    };
    let result = call_tool(&state.engine, &name, args)?;
    Ok(Json(result))
}

/// # POST /api/admin/reload
/// Rebuilds the store from the database and swaps it in. In-flight calls keep
/// the store they started with.
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let store = timeseries::load_store(&state.db_repo).await?;
    let body = json!({
        "symbols": store.symbol_count(),
        "bars": store.bar_count(),
    });
    state.store.replace(store);
    Ok(Json(body))
}
