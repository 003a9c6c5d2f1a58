use serde_json::json;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{
    get_bool_or, get_f64_or, get_required_str, require_api, require_own_roll, require_role,
};
use crate::ipc::types::{AppState, Request};
use crate::session::Role;
use crate::summary::{
    lectures_needed_for_target, status_bg_color, status_color, status_label, summarize, trend,
    AttendanceRecord,
};

const MARKERS: &[Role] = &[Role::Faculty];
const REPORT_READERS: &[Role] = &[Role::Admin, Role::Faculty];
const RECORD_READERS: &[Role] = &[Role::Admin, Role::Faculty, Role::Student];

const DEFAULT_TARGET: f64 = 75.0;

/// The backend answers either a bare array of records or `{"records": [...]}`.
fn records_from_response(resp: serde_json::Value) -> Result<Vec<AttendanceRecord>, HandlerErr> {
    let raw = match resp {
        v @ serde_json::Value::Array(_) => v,
        serde_json::Value::Object(mut obj) => obj
            .remove("records")
            .ok_or_else(|| HandlerErr::new("bad_response", "attendance response has no records"))?,
        _ => {
            return Err(HandlerErr::new(
                "bad_response",
                "attendance response is neither array nor object",
            ))
        }
    };
    serde_json::from_value(raw)
        .map_err(|e| HandlerErr::new("bad_response", format!("unusable attendance records: {e}")))
}

fn target_from_params(params: &serde_json::Value) -> Result<f64, HandlerErr> {
    let target = get_f64_or(params, "targetPercentage", DEFAULT_TARGET);
    // The projection's closed form divides by (100 - target).
    if !(0.0..100.0).contains(&target) {
        return Err(HandlerErr::bad_params(
            "targetPercentage must be at least 0 and below 100",
        ));
    }
    Ok(target)
}

/// Summary block attached to every record fetch: counts, percentage, status
/// partition, trend arrow and the best-case catch-up projection.
fn enrich(records: &[AttendanceRecord], include_medical: bool, target: f64) -> serde_json::Value {
    let summary = summarize(records, include_medical);
    let attended = if include_medical {
        summary.present + summary.medical_approved
    } else {
        summary.present
    };
    json!({
        "summary": summary,
        "status": status_label(summary.percentage),
        "color": status_color(summary.percentage),
        "bgColor": status_bg_color(summary.percentage),
        "trend": trend(summary.percentage),
        "targetPercentage": target,
        "lecturesNeeded": lectures_needed_for_target(attended, summary.total, target),
    })
}

fn by_lecture(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MARKERS)?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let records = require_api(&state.api)?.get(&format!("/attendance/lecture/{lecture_id}"))?;
    Ok(json!({ "records": records }))
}

fn by_student(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session = require_role(&state.session, RECORD_READERS)?;
    let roll_no = get_required_str(params, "rollNo")?;
    require_own_roll(session, &roll_no)?;
    let include_medical = get_bool_or(params, "includeMedicalApproved", true);
    let target = target_from_params(params)?;

    let resp = require_api(&state.api)?.get(&format!("/attendance/student/{roll_no}"))?;
    let records = records_from_response(resp)?;
    let mut result = enrich(&records, include_medical, target);
    result["records"] = serde_json::to_value(&records)
        .map_err(|e| HandlerErr::new("internal", e.to_string()))?;
    Ok(result)
}

fn student_course_summary(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session = require_role(&state.session, RECORD_READERS)?;
    let roll_no = get_required_str(params, "rollNo")?;
    require_own_roll(session, &roll_no)?;
    let course_id = get_required_str(params, "courseId")?;
    let include_medical = get_bool_or(params, "includeMedicalApproved", true);
    let target = target_from_params(params)?;

    let resp = require_api(&state.api)?
        .get(&format!("/attendance/student/{roll_no}/course/{course_id}"))?;
    let records = records_from_response(resp)?;
    let mut result = enrich(&records, include_medical, target);
    result["courseId"] = json!(course_id);
    result["records"] = serde_json::to_value(&records)
        .map_err(|e| HandlerErr::new("internal", e.to_string()))?;
    Ok(result)
}

/// Course/section report: one row per student from the backend, each row's
/// records reduced locally so the UI renders percentages without another
/// round trip.
fn report(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, REPORT_READERS)?;
    let course_id = get_required_str(params, "courseId")?;
    let section_id = get_required_str(params, "sectionId")?;
    let include_medical = get_bool_or(params, "includeMedicalApproved", true);
    let target = target_from_params(params)?;

    let resp = require_api(&state.api)?
        .get(&format!("/attendance/report/{course_id}/{section_id}"))?;
    let rows = match resp {
        serde_json::Value::Array(rows) => rows,
        other => {
            return Err(HandlerErr::new(
                "bad_response",
                format!("report response is not an array: {other}"),
            ))
        }
    };

    let mut out = Vec::with_capacity(rows.len());
    for mut row in rows {
        let enriched = match row.get("records").cloned() {
            Some(raw) => {
                let records: Vec<AttendanceRecord> = serde_json::from_value(raw).map_err(|e| {
                    HandlerErr::new("bad_response", format!("unusable report row: {e}"))
                })?;
                Some(enrich(&records, include_medical, target))
            }
            None => None,
        };
        if let (Some(enriched), Some(obj)) = (enriched, row.as_object_mut()) {
            obj.insert("attendance".to_string(), enriched);
        }
        out.push(row);
    }

    Ok(json!({
        "courseId": course_id,
        "sectionId": section_id,
        "rows": out,
    }))
}

fn check_mark_entries(records: &serde_json::Value) -> Result<(), HandlerErr> {
    let Some(entries) = records.as_array() else {
        return Err(HandlerErr::bad_params("records must be an array"));
    };
    for entry in entries {
        let has_roll = entry.get("roll_no").and_then(|v| v.as_str()).is_some();
        let has_flag = entry.get("is_present").and_then(|v| v.as_bool()).is_some();
        if !has_roll || !has_flag {
            return Err(HandlerErr::bad_params(
                "each record needs roll_no and is_present",
            ));
        }
    }
    Ok(())
}

fn mark(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MARKERS)?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let records = params
        .get("records")
        .ok_or_else(|| HandlerErr::bad_params("missing records"))?;
    check_mark_entries(records)?;
    let resp = require_api(&state.api)?
        .post(&format!("/attendance/lecture/{lecture_id}"), records)?;
    Ok(resp)
}

fn update(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_role(&state.session, MARKERS)?;
    let roll_no = get_required_str(params, "rollNo")?;
    let lecture_id = get_required_str(params, "lectureId")?;
    let is_present = params
        .get("isPresent")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr::bad_params("missing isPresent"))?;
    let resp = require_api(&state.api)?.put(
        &format!("/attendance/{roll_no}/{lecture_id}"),
        &json!({ "is_present": is_present }),
    )?;
    Ok(resp)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "attendance.byLecture" => by_lecture(state, &req.params),
        "attendance.byStudent" => by_student(state, &req.params),
        "attendance.studentCourseSummary" => student_course_summary(state, &req.params),
        "attendance.report" => report(state, &req.params),
        "attendance.mark" => mark(state, &req.params),
        "attendance.update" => update(state, &req.params),
        _ => return None,
    };
    Some(match resp {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
