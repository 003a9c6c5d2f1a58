use std::path::PathBuf;

use serde_json::json;
use tracing::info;

use crate::api::ApiClient;
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::get_opt_str;
use crate::ipc::types::{AppState, Request};
use crate::session::SessionStore;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "apiBaseUrl": state.api.as_ref().map(|a| a.base_url().to_string()),
            "role": state.session.as_ref().map(|s| s.user.role.as_str()),
        }),
    )
}

/// Build the API client and hydrate any persisted session. The UI shell runs
/// this once per launch, before anything else.
fn connect(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let base_url =
        get_opt_str(params, "baseUrl").unwrap_or_else(|| state.config.api_base_url.clone());
    let session_file = get_opt_str(params, "sessionFile")
        .map(PathBuf::from)
        .unwrap_or_else(|| state.config.session_file.clone());

    let mut api = ApiClient::new(base_url.as_str())?;
    let store = SessionStore::new(session_file);
    let session = store.load();
    if let Some(s) = &session {
        api.set_token(&s.token);
    }

    info!(
        base_url = %api.base_url(),
        restored = session.is_some(),
        "connected to attendance API"
    );

    let restored = session.as_ref().map(|s| s.describe());
    state.api = Some(api);
    state.store = Some(store);
    state.session = session;

    Ok(json!({
        "apiBaseUrl": base_url,
        "restoredSession": restored,
    }))
}

fn handle_connect(state: &mut AppState, req: &Request) -> serde_json::Value {
    match connect(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "connect" => Some(handle_connect(state, req)),
        _ => None,
    }
}
