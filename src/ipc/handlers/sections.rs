use serde_json::json;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, require_api, require_role};
use crate::ipc::types::{AppState, Request};
use crate::session::Role;

const MANAGE: &[Role] = &[Role::Admin];
const READ: &[Role] = &[Role::Admin, Role::Faculty];

fn list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let sections = require_api(&state.api)?.get("/sections")?;
    Ok(json!({ "sections": sections }))
}

fn get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let section_id = get_required_str(params, "sectionId")?;
    let section = require_api(&state.api)?.get(&format!("/sections/{section_id}"))?;
    Ok(json!({ "section": section }))
}

fn create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let section = params
        .get("section")
        .ok_or_else(|| HandlerErr::bad_params("missing section"))?;
    let created = require_api(&state.api)?.post("/sections", section)?;
    Ok(json!({ "section": created }))
}

fn update(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let section_id = get_required_str(params, "sectionId")?;
    let section = params
        .get("section")
        .ok_or_else(|| HandlerErr::bad_params("missing section"))?;
    let updated = require_api(&state.api)?.put(&format!("/sections/{section_id}"), section)?;
    Ok(json!({ "section": updated }))
}

fn delete(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MANAGE)?;
    let section_id = get_required_str(params, "sectionId")?;
    require_api(&state.api)?.delete(&format!("/sections/{section_id}"))?;
    Ok(json!({ "deleted": true }))
}

fn students(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, READ)?;
    let section_id = get_required_str(params, "sectionId")?;
    let students = require_api(&state.api)?.get(&format!("/sections/{section_id}/students"))?;
    Ok(json!({ "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "sections.list" => list(state),
        "sections.get" => get(state, &req.params),
        "sections.create" => create(state, &req.params),
        "sections.update" => update(state, &req.params),
        "sections.delete" => delete(state, &req.params),
        "sections.students" => students(state, &req.params),
        _ => return None,
    };
    Some(match resp {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
