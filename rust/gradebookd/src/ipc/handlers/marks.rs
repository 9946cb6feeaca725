use crate::calc::{grade_for_percent, Percentage};
use crate::config::MarkPolicy;
use crate::gradebook::RawNumber;
use crate::ipc::error::{err, gradebook_err, ok};
use crate::ipc::helpers::{param_str, require_str, session, session_mut};
use crate::ipc::types::{AppState, Request};
use crate::roster::filter_students;
use serde_json::json;
use tracing::{debug, info, warn};

fn cell_ids(req: &Request) -> Result<(String, String), serde_json::Value> {
    let student_id = require_str(req, "studentId")?;
    let assessment_id = require_str(req, "assessmentId")?;
    Ok((student_id, assessment_id))
}

fn handle_marks_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let policy = state.mark_policy;
    let gb = match session_mut(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (student_id, assessment_id) = match cell_ids(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let raw = RawNumber::from_json(req.params.get("value"));

    match gb.set_mark(&student_id, &assessment_id, &raw) {
        Ok(mark) => {
            let percent = gb
                .percentage(&student_id, &assessment_id)
                .unwrap_or(Percentage::Unscored);
            ok(
                &req.id,
                json!({
                    "stored": true,
                    "mark": mark,
                    "percent": percent,
                    "grade": percent.grade()
                }),
            )
        }
        Err(e) if e.is_mark_input() && policy == MarkPolicy::Ignore => {
            debug!(
                student = %student_id,
                assessment = %assessment_id,
                reason = e.code(),
                "mark write ignored"
            );
            ok(
                &req.id,
                json!({
                    "stored": false,
                    "ignored": e.code(),
                    "message": e.to_string()
                }),
            )
        }
        Err(e) => {
            if e.is_mark_input() {
                warn!(
                    student = %student_id,
                    assessment = %assessment_id,
                    error = %e,
                    "mark write rejected"
                );
            }
            gradebook_err(&req.id, &e)
        }
    }
}

fn handle_marks_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (student_id, assessment_id) = match cell_ids(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match gb.percentage(&student_id, &assessment_id) {
        Ok(percent) => ok(
            &req.id,
            json!({
                "studentId": student_id,
                "assessmentId": assessment_id,
                "score": gb.mark(&student_id, &assessment_id),
                "percent": percent,
                "grade": percent.grade()
            }),
        ),
        Err(e) => gradebook_err(&req.id, &e),
    }
}

fn handle_marks_percentage(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (student_id, assessment_id) = match cell_ids(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match gb.percentage(&student_id, &assessment_id) {
        Ok(percent) => ok(&req.id, json!({ "percent": percent })),
        Err(e) => gradebook_err(&req.id, &e),
    }
}

fn handle_marks_grade(req: &Request) -> serde_json::Value {
    let Some(percent) = RawNumber::from_json(req.params.get("percent")).parse() else {
        return err(
            &req.id,
            "bad_params",
            "percent must be a number",
            req.params.get("percent").map(|v| json!({ "percent": v })),
        );
    };
    ok(
        &req.id,
        json!({ "percent": percent, "grade": grade_for_percent(percent) }),
    )
}

fn handle_marks_save_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(gb) = state.session.as_ref() else {
        return err(&req.id, "no_session", "load a roster first", None);
    };

    match state.sink.save_all(gb.marks()) {
        Ok(receipt) => {
            info!(saved = receipt.saved, "save-marks confirmed");
            ok(&req.id, json!(receipt))
        }
        Err(e) => err(&req.id, "save_failed", format!("{e:?}"), None),
    }
}

fn handle_marks_grid(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subject_id = match require_str(req, "subjectId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let query = param_str(req, "query").unwrap_or("");

    let assessments = match gb.list_assessments(&subject_id) {
        Ok(v) => v,
        Err(e) => return gradebook_err(&req.id, &e),
    };

    let rows: Vec<serde_json::Value> = filter_students(gb.students(), query)
        .into_iter()
        .map(|s| {
            let cells: Vec<serde_json::Value> = assessments
                .iter()
                .map(|a| match gb.mark(&s.id, &a.id) {
                    Some(score) => {
                        let percent = Percentage::from_score(Some(score), a.max_score);
                        json!({
                            "score": score,
                            "percent": percent,
                            "grade": percent.grade()
                        })
                    }
                    None => serde_json::Value::Null,
                })
                .collect();
            json!({
                "studentId": s.id,
                "name": s.name,
                "rollNo": s.roll_no,
                "cells": cells
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "subjectId": subject_id,
            "assessments": assessments,
            "rows": rows
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.set" | "set-mark" => Some(handle_marks_set(state, req)),
        "marks.get" => Some(handle_marks_get(state, req)),
        "marks.percentage" => Some(handle_marks_percentage(state, req)),
        "marks.grade" => Some(handle_marks_grade(req)),
        "marks.saveAll" | "save-marks" => Some(handle_marks_save_all(state, req)),
        "marks.grid" => Some(handle_marks_grid(state, req)),
        _ => None,
    }
}
