use crate::api::ApiClient;
use crate::ipc::error::HandlerErr;
use crate::session::{Role, Session};

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_opt_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn get_required_bool(params: &serde_json::Value, key: &str) -> Result<bool, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_bool_or(params: &serde_json::Value, key: &str, default: bool) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

pub fn get_f64_or(params: &serde_json::Value, key: &str, default: f64) -> f64 {
    params.get(key).and_then(|v| v.as_f64()).unwrap_or(default)
}

pub fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn require_api(api: &Option<ApiClient>) -> Result<&ApiClient, HandlerErr> {
    api.as_ref()
        .ok_or_else(|| HandlerErr::new("not_connected", "run connect first"))
}

pub fn require_session(session: &Option<Session>) -> Result<&Session, HandlerErr> {
    session
        .as_ref()
        .ok_or_else(|| HandlerErr::new("not_authenticated", "log in first"))
}

/// Role gate for a method. Wrong role is `forbidden`; no session at all is
/// `not_authenticated` so the UI can tell the two apart.
pub fn require_role<'a>(
    session: &'a Option<Session>,
    allowed: &[Role],
) -> Result<&'a Session, HandlerErr> {
    let session = require_session(session)?;
    if allowed.contains(&session.user.role) {
        Ok(session)
    } else {
        Err(HandlerErr::new(
            "forbidden",
            format!("{} role may not call this method", session.user.role.as_str()),
        ))
    }
}

/// Students may only read or submit their own records.
pub fn require_own_roll(session: &Session, roll_no: &str) -> Result<(), HandlerErr> {
    if session.user.role != Role::Student {
        return Ok(());
    }
    match session.user.roll_no.as_deref() {
        Some(own) if own == roll_no => Ok(()),
        _ => Err(HandlerErr::new(
            "forbidden",
            "students may only access their own attendance",
        )),
    }
}
