use serde_json::json;
use tracing::info;

use crate::api::ApiError;
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, require_api, require_session};
use crate::ipc::types::{AppState, Request};
use crate::session::{Session, UserProfile};
use crate::validate;

fn parse_login_response(resp: &serde_json::Value) -> Result<Session, HandlerErr> {
    let token = resp
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::new("bad_response", "login response missing token"))?;
    let user_value = resp
        .get("user")
        .cloned()
        .ok_or_else(|| HandlerErr::new("bad_response", "login response missing user"))?;
    let user: UserProfile = serde_json::from_value(user_value)
        .map_err(|e| HandlerErr::new("bad_response", format!("unusable user object: {e}")))?;
    Ok(Session {
        token: token.to_string(),
        refresh_token: resp
            .get("refreshToken")
            .and_then(|v| v.as_str())
            .map(String::from),
        user,
    })
}

fn login(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let email = get_required_str(params, "email")?;
    let password = get_required_str(params, "password")?;
    if !validate::valid_email(&email) {
        return Err(HandlerErr::validation("email", "email format is invalid"));
    }

    let resp = require_api(&state.api)?
        .post("/auth/login", &json!({ "email": email, "password": password }))?;
    let session = parse_login_response(&resp)?;

    if let Some(api) = state.api.as_mut() {
        api.set_token(&session.token);
    }
    if let Some(store) = &state.store {
        store.save(&session)?;
    }
    info!(role = session.user.role.as_str(), "login");

    let described = session.describe();
    state.session = Some(session);
    Ok(described)
}

fn logout(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    if let Some(api) = state.api.as_mut() {
        api.clear_token();
    }
    if let Some(store) = &state.store {
        store.clear()?;
    }
    let was_logged_in = state.session.take().is_some();
    info!(was_logged_in, "logout");
    Ok(json!({ "loggedOut": true }))
}

fn current_session(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let session = require_session(&state.session)?;
    Ok(session.describe())
}

/// Exchange the stored refresh token for a fresh bearer token. A rejected
/// refresh tears the session down, same as logout.
fn refresh(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let refresh_token = require_session(&state.session)?
        .refresh_token
        .clone()
        .ok_or_else(|| HandlerErr::new("not_authenticated", "no refresh token held"))?;

    let result = require_api(&state.api)?
        .post("/auth/refresh", &json!({ "refreshToken": refresh_token }));
    let resp = match result {
        Ok(v) => v,
        Err(e @ ApiError::Api { .. }) => {
            // Refresh token no longer honored; drop the session.
            let _ = logout(state);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let token = resp
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::new("bad_response", "refresh response missing token"))?
        .to_string();

    if let Some(session) = state.session.as_mut() {
        session.token = token.clone();
    }
    if let Some(api) = state.api.as_mut() {
        api.set_token(&token);
    }
    if let (Some(store), Some(session)) = (&state.store, &state.session) {
        store.save(session)?;
    }
    Ok(json!({ "refreshed": true }))
}

fn change_password(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(&state.session)?;
    let api = require_api(&state.api)?;
    let old_password = get_required_str(params, "oldPassword")?;
    let new_password = get_required_str(params, "newPassword")?;
    if !validate::valid_password(&new_password) {
        return Err(HandlerErr::validation(
            "newPassword",
            "password needs 8+ characters with upper, lower and digit",
        ));
    }

    let resp = api.post(
        "/auth/change-password",
        &json!({ "oldPassword": old_password, "newPassword": new_password }),
    )?;
    Ok(resp)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "auth.login" => login(state, &req.params),
        "auth.logout" => logout(state),
        "auth.session" => current_session(state),
        "auth.refresh" => refresh(state),
        "auth.changePassword" => change_password(state, &req.params),
        _ => return None,
    };
    Some(match resp {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
