use serde_json::json;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{get_required_i64, get_required_str, require_api, require_role};
use crate::ipc::types::{AppState, Request};
use crate::session::Role;
use crate::validate;

const MANAGE: &[Role] = &[Role::Admin];
const READ: &[Role] = &[Role::Admin, Role::Faculty];

/// Field checks on the pass-through payload. The payload itself is forwarded
/// verbatim; only fields the backend is known to reject get a local check.
fn check_student_payload(student: &serde_json::Value) -> Result<(), HandlerErr> {
    let Some(obj) = student.as_object() else {
        return Err(HandlerErr::bad_params("student must be an object"));
    };
    if let Some(roll) = obj.get("roll_no").and_then(|v| v.as_str()) {
        if !validate::valid_roll_no(roll) {
            return Err(HandlerErr::validation("roll_no", "roll number must be numeric"));
        }
    }
    if let Some(name) = obj.get("name").and_then(|v| v.as_str()) {
        if !validate::valid_name(name) {
            return Err(HandlerErr::validation("name", "name may use letters and spaces only"));
        }
    }
    if let Some(email) = obj.get("email").and_then(|v| v.as_str()) {
        if !validate::valid_email(email) {
            return Err(HandlerErr::validation("email", "email format is invalid"));
        }
    }
    if let Some(year) = obj.get("batch_year").and_then(|v| v.as_i64()) {
        if !validate::valid_batch_year(year as i32) {
            return Err(HandlerErr::validation("batch_year", "batch year out of range"));
        }
    }
    if let Some(phone) = obj.get("phone").and_then(|v| v.as_str()) {
        if !validate::valid_phone(phone) {
            return Err(HandlerErr::validation("phone", "phone must be 10 digits"));
        }
    }
    Ok(())
}

fn list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let students = require_api(&state.api)?.get("/students")?;
    Ok(json!({ "students": students }))
}

fn get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let roll_no = get_required_str(params, "rollNo")?;
    let student = require_api(&state.api)?.get(&format!("/students/{roll_no}"))?;
    Ok(json!({ "student": student }))
}

fn create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let student = params
        .get("student")
        .ok_or_else(|| HandlerErr::bad_params("missing student"))?;
    check_student_payload(student)?;
    let created = require_api(&state.api)?.post("/students", student)?;
    Ok(json!({ "student": created }))
}

fn update(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let roll_no = get_required_str(params, "rollNo")?;
    let student = params
        .get("student")
        .ok_or_else(|| HandlerErr::bad_params("missing student"))?;
    check_student_payload(student)?;
    let updated = require_api(&state.api)?.put(&format!("/students/{roll_no}"), student)?;
    Ok(json!({ "student": updated }))
}

fn delete(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let roll_no = get_required_str(params, "rollNo")?;
    require_api(&state.api)?.delete(&format!("/students/{roll_no}"))?;
    Ok(json!({ "deleted": true }))
}

fn list_by_batch(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let year = get_required_i64(params, "batchYear")?;
    if !validate::valid_batch_year(year as i32) {
        return Err(HandlerErr::validation("batchYear", "batch year out of range"));
    }
    let students = require_api(&state.api)?.get(&format!("/students/batch/{year}"))?;
    Ok(json!({ "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "students.list" => list(state),
        "students.get" => get(state, &req.params),
        "students.create" => create(state, &req.params),
        "students.update" => update(state, &req.params),
        "students.delete" => delete(state, &req.params),
        "students.listByBatch" => list_by_batch(state, &req.params),
        _ => return None,
    };
    Some(match resp {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
