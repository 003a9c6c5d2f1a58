use serde_json::json;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, require_api, require_role};
use crate::ipc::types::{AppState, Request};
use crate::session::Role;
use crate::validate;

const MANAGE: &[Role] = &[Role::Admin];

fn check_faculty_payload(faculty: &serde_json::Value) -> Result<(), HandlerErr> {
    let Some(obj) = faculty.as_object() else {
        return Err(HandlerErr::bad_params("faculty must be an object"));
    };
    if let Some(id) = obj.get("faculty_id").and_then(|v| v.as_str()) {
        if !validate::valid_faculty_id(id) {
            return Err(HandlerErr::validation("faculty_id", "faculty id must be numeric"));
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
    Ok(())
}

fn list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let faculty = require_api(&state.api)?.get("/faculty")?;
    Ok(json!({ "faculty": faculty }))
}

fn get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let faculty_id = get_required_str(params, "facultyId")?;
    let member = require_api(&state.api)?.get(&format!("/faculty/{faculty_id}"))?;
    Ok(json!({ "faculty": member }))
}

fn create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let faculty = params
        .get("faculty")
        .ok_or_else(|| HandlerErr::bad_params("missing faculty"))?;
    check_faculty_payload(faculty)?;
    let created = require_api(&state.api)?.post("/faculty", faculty)?;
    Ok(json!({ "faculty": created }))
}

fn update(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let faculty_id = get_required_str(params, "facultyId")?;
    let faculty = params
        .get("faculty")
        .ok_or_else(|| HandlerErr::bad_params("missing faculty"))?;
    check_faculty_payload(faculty)?;
    let updated = require_api(&state.api)?.put(&format!("/faculty/{faculty_id}"), faculty)?;
    Ok(json!({ "faculty": updated }))
}

fn delete(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let faculty_id = get_required_str(params, "facultyId")?;
    require_api(&state.api)?.delete(&format!("/faculty/{faculty_id}"))?;
    Ok(json!({ "deleted": true }))
}

/// Courses taught by one faculty member. Faculty may ask for their own set;
/// admin for anyone's.
fn courses(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session = require_role(&state.session, &[Role::Admin, Role::Faculty])?;
    let faculty_id = get_required_str(params, "facultyId")?;
    if session.user.role == Role::Faculty
        && session.user.faculty_id.as_deref() != Some(faculty_id.as_str())
    {
        return Err(HandlerErr::new(
            "forbidden",
            "faculty may only list their own courses",
        ));
    }
    let courses = require_api(&state.api)?.get(&format!("/faculty/{faculty_id}/courses"))?;
    Ok(json!({ "courses": courses }))
}

fn assign(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let faculty_id = get_required_str(params, "facultyId")?;
    let course_id = get_required_str(params, "courseId")?;
    let section_id = get_required_str(params, "sectionId")?;
    if !validate::valid_course_id(&course_id) {
        return Err(HandlerErr::validation("courseId", "course id must be alphanumeric"));
    }
    let resp = require_api(&state.api)?.post(
        &format!("/faculty/{faculty_id}/assign"),
        &json!({ "course_id": course_id, "section_id": section_id }),
    )?;
    Ok(resp)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "faculty.list" => list(state),
        "faculty.get" => get(state, &req.params),
        "faculty.create" => create(state, &req.params),
        "faculty.update" => update(state, &req.params),
        "faculty.delete" => delete(state, &req.params),
        "faculty.courses" => courses(state, &req.params),
        "faculty.assign" => assign(state, &req.params),
        _ => return None,
    };
    Some(match resp {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
