use serde_json::json;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, require_api, require_role};
use crate::ipc::types::{AppState, Request};
use crate::session::Role;
use crate::validate;

const MANAGE: &[Role] = &[Role::Admin];
const READ: &[Role] = &[Role::Admin, Role::Faculty, Role::Student];

fn check_course_payload(course: &serde_json::Value) -> Result<(), HandlerErr> {
    let Some(obj) = course.as_object() else {
        return Err(HandlerErr::bad_params("course must be an object"));
    };
    if let Some(id) = obj.get("course_id").and_then(|v| v.as_str()) {
        if !validate::valid_course_id(id) {
            return Err(HandlerErr::validation("course_id", "course id must be alphanumeric"));
        }
    }
    Ok(())
}

fn list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let courses = require_api(&state.api)?.get("/courses")?;
    Ok(json!({ "courses": courses }))
}

fn get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let course_id = get_required_str(params, "courseId")?;
    let course = require_api(&state.api)?.get(&format!("/courses/{course_id}"))?;
    Ok(json!({ "course": course }))
}

fn create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let course = params
        .get("course")
        .ok_or_else(|| HandlerErr::bad_params("missing course"))?;
    check_course_payload(course)?;
    let created = require_api(&state.api)?.post("/courses", course)?;
    Ok(json!({ "course": created }))
}

fn update(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let course_id = get_required_str(params, "courseId")?;
    let course = params
        .get("course")
        .ok_or_else(|| HandlerErr::bad_params("missing course"))?;
    check_course_payload(course)?;
    let updated = require_api(&state.api)?.put(&format!("/courses/{course_id}"), course)?;
    Ok(json!({ "course": updated }))
}

fn delete(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let course_id = get_required_str(params, "courseId")?;
    require_api(&state.api)?.delete(&format!("/courses/{course_id}"))?;
    Ok(json!({ "deleted": true }))
}

fn sections(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let course_id = get_required_str(params, "courseId")?;
    let sections = require_api(&state.api)?.get(&format!("/courses/{course_id}/sections"))?;
    Ok(json!({ "sections": sections }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "courses.list" => list(state),
        "courses.get" => get(state, &req.params),
        "courses.create" => create(state, &req.params),
        "courses.update" => update(state, &req.params),
        "courses.delete" => delete(state, &req.params),
        "courses.sections" => sections(state, &req.params),
        _ => return None,
    };
    Some(match resp {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
