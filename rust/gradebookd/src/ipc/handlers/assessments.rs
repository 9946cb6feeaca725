use crate::gradebook::{AssessmentDraft, RawNumber};
use crate::ipc::error::{gradebook_err, ok};
use crate::ipc::helpers::{param_str, require_str, session, session_mut};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use tracing::{debug, info};

fn handle_assessments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subject_id = match require_str(req, "subjectId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match gb.list_assessments(&subject_id) {
        Ok(list) => ok(&req.id, json!({ "assessments": list })),
        Err(e) => gradebook_err(&req.id, &e),
    }
}

fn draft_from_params(req: &Request) -> AssessmentDraft {
    let opt = |key: &str| param_str(req, key).map(str::to_string);
    AssessmentDraft {
        name: opt("name").unwrap_or_default(),
        kind: opt("type"),
        max_score: req.params.get("maxScore").map(|v| RawNumber::from_json(Some(v))),
        date: opt("date"),
        description: opt("description"),
    }
}

fn handle_assessments_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session_mut(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subject_id = match require_str(req, "subjectId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match gb.add_assessment(&subject_id, draft_from_params(req)) {
        Ok(a) => {
            info!(
                subject = %subject_id,
                assessment = %a.id,
                name = %a.name,
                kind = a.kind.as_str(),
                max_score = a.max_score,
                "assessment added"
            );
            ok(&req.id, json!({ "assessment": a }))
        }
        Err(e) => {
            debug!(subject = %subject_id, error = %e, "assessment rejected");
            gradebook_err(&req.id, &e)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.list" => Some(handle_assessments_list(state, req)),
        "assessments.add" | "add-assessment" => Some(handle_assessments_add(state, req)),
        _ => None,
    }
}
