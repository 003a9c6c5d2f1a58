use chrono::NaiveDate;
use serde_json::json;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, require_api, require_role};
use crate::ipc::types::{AppState, Request};
use crate::session::Role;

const MANAGE: &[Role] = &[Role::Faculty];
const READ: &[Role] = &[Role::Admin, Role::Faculty];

const LECTURE_STATUSES: &[&str] = &["scheduled", "ongoing", "finalized"];

fn check_lecture_payload(lecture: &serde_json::Value) -> Result<(), HandlerErr> {
    let Some(obj) = lecture.as_object() else {
        return Err(HandlerErr::bad_params("lecture must be an object"));
    };
    if let Some(status) = obj.get("status").and_then(|v| v.as_str()) {
        if !LECTURE_STATUSES.contains(&status) {
            return Err(HandlerErr::validation(
                "status",
                "status must be scheduled, ongoing or finalized",
            ));
        }
    }
    if let Some(date) = obj.get("date").and_then(|v| v.as_str()) {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(HandlerErr::validation("date", "date must be YYYY-MM-DD"));
        }
    }
    Ok(())
}

fn list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let lectures = require_api(&state.api)?.get("/lectures")?;
    Ok(json!({ "lectures": lectures }))
}

fn get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let lecture = require_api(&state.api)?.get(&format!("/lectures/{lecture_id}"))?;
    Ok(json!({ "lecture": lecture }))
}

fn create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let lecture = params
        .get("lecture")
        .ok_or_else(|| HandlerErr::bad_params("missing lecture"))?;
    check_lecture_payload(lecture)?;
    let created = require_api(&state.api)?.post("/lectures", lecture)?;
    Ok(json!({ "lecture": created }))
}

fn update(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let lecture = params
        .get("lecture")
        .ok_or_else(|| HandlerErr::bad_params("missing lecture"))?;
    check_lecture_payload(lecture)?;
    let updated = require_api(&state.api)?.put(&format!("/lectures/{lecture_id}"), lecture)?;
    Ok(json!({ "lecture": updated }))
}

fn delete(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let lecture_id = get_required_str(params, "lectureId")?;
    require_api(&state.api)?.delete(&format!("/lectures/{lecture_id}"))?;
    Ok(json!({ "deleted": true }))
}

fn list_by_faculty(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session = require_role(&state.session, READ)?;
    let faculty_id = get_required_str(params, "facultyId")?;
    if session.user.role == Role::Faculty
        && session.user.faculty_id.as_deref() != Some(faculty_id.as_str())
    {
        return Err(HandlerErr::new(
            "forbidden",
            "faculty may only list their own lectures",
        ));
    }
    let lectures = require_api(&state.api)?.get(&format!("/lectures/faculty/{faculty_id}"))?;
    Ok(json!({ "lectures": lectures }))
}

fn list_by_course_section(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let course_id = get_required_str(params, "courseId")?;
    let section_id = get_required_str(params, "sectionId")?;
    let lectures = require_api(&state.api)?
        .get(&format!("/lectures/course/{course_id}/section/{section_id}"))?;
    Ok(json!({ "lectures": lectures }))
}

/// Locks the lecture's attendance for good. The backend owns the lock; an
/// already-finalized lecture comes back as an api_error and is passed along.
fn finalize(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let lecture = require_api(&state.api)?
        .post(&format!("/lectures/{lecture_id}/finalize"), &json!({}))?;
    Ok(json!({ "lecture": lecture }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "lectures.list" => list(state),
        "lectures.get" => get(state, &req.params),
        "lectures.create" => create(state, &req.params),
        "lectures.update" => update(state, &req.params),
        "lectures.delete" => delete(state, &req.params),
        "lectures.listByFaculty" => list_by_faculty(state, &req.params),
        "lectures.listByCourseSection" => list_by_course_section(state, &req.params),
        "lectures.finalize" => finalize(state, &req.params),
        _ => return None,
    };
    Some(match resp {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
