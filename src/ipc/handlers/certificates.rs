use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{
    get_opt_str, get_required_bool, get_required_str, require_api, require_own_roll, require_role,
};
use crate::ipc::types::{AppState, Request};
use crate::session::Role;
use crate::validate;

const SUBMITTERS: &[Role] = &[Role::Student];
const REVIEWERS: &[Role] = &[Role::Faculty];

fn content_type_for(path: &Path, explicit: Option<String>) -> Result<String, HandlerErr> {
    if let Some(ct) = explicit {
        return Ok(ct);
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => Ok("application/pdf".to_string()),
        Some("jpg") | Some("jpeg") => Ok("image/jpeg".to_string()),
        Some("png") => Ok("image/png".to_string()),
        _ => Err(HandlerErr::validation(
            "filePath",
            "cannot infer content type; pass contentType",
        )),
    }
}

/// Reads the certificate from disk, runs the size/type checks the original
/// upload form applied, and ships it as multipart. The SHA-256 digest goes
/// back to the UI so a re-submission can be spotted.
fn upload(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session = require_role(&state.session, SUBMITTERS)?;
    let roll_no = get_required_str(params, "rollNo")?;
    require_own_roll(session, &roll_no)?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let file_path = get_required_str(params, "filePath")?;

    let path = Path::new(&file_path);
    let bytes = std::fs::read(path).map_err(|e| {
        HandlerErr::bad_params(format!("cannot read certificate file {file_path}: {e}"))
    })?;

    let content_type = content_type_for(path, get_opt_str(params, "contentType"))?;
    if !validate::valid_file_type(&content_type, &state.config.allowed_upload_types) {
        return Err(HandlerErr::validation(
            "contentType",
            format!("{content_type} uploads are not accepted"),
        ));
    }
    if !validate::valid_file_size(bytes.len() as u64, state.config.max_upload_bytes) {
        return Err(HandlerErr::validation(
            "filePath",
            format!(
                "file is {} bytes, limit is {}",
                bytes.len(),
                state.config.max_upload_bytes
            ),
        ));
    }

    let sha256 = hex::encode(Sha256::digest(&bytes));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("certificate")
        .to_string();

    let part = Part::bytes(bytes)
        .file_name(file_name.clone())
        .mime_str(&content_type)
        .map_err(|e| HandlerErr::bad_params(format!("bad content type: {e}")))?;
    let form = Form::new()
        .part("certificate", part)
        .text("roll_no", roll_no.clone())
        .text("lecture_id", lecture_id.clone());

    let resp = require_api(&state.api)?.post_multipart("/attendance/medical-certificate", form)?;

    let upload_id = Uuid::new_v4().to_string();
    info!(%roll_no, %lecture_id, %file_name, "certificate uploaded");
    Ok(json!({
        "uploadId": upload_id,
        "sha256": sha256,
        "response": resp,
    }))
}

fn pending(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session = require_role(&state.session, REVIEWERS)?;
    let faculty_id = match get_opt_str(params, "facultyId") {
        Some(id) => id,
        None => session
            .user
            .faculty_id
            .clone()
            .ok_or_else(|| HandlerErr::bad_params("missing facultyId"))?,
    };
    if session.user.faculty_id.as_deref() != Some(faculty_id.as_str()) {
        return Err(HandlerErr::new(
            "forbidden",
            "faculty may only list their own pending certificates",
        ));
    }
    let certificates = require_api(&state.api)?
        .get(&format!("/attendance/medical-certificates/pending/{faculty_id}"))?;
    Ok(json!({ "certificates": certificates }))
}

fn review(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, REVIEWERS)?;
    let roll_no = get_required_str(params, "rollNo")?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let approved = get_required_bool(params, "approved")?;
    let resp = require_api(&state.api)?.put(
        &format!("/attendance/{roll_no}/{lecture_id}/certificate"),
        &json!({ "medical_approved": approved }),
    )?;
    info!(%roll_no, %lecture_id, approved, "certificate reviewed");
    Ok(resp)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "certificates.upload" => upload(state, &req.params),
        "certificates.pending" => pending(state, &req.params),
        "certificates.review" => review(state, &req.params),
        _ => return None,
    };
    Some(match resp {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
