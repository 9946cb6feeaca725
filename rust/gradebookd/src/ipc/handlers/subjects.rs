use crate::ipc::error::ok;
use crate::ipc::helpers::session;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let subjects: Vec<serde_json::Value> = gb
        .subjects()
        .iter()
        .map(|s| {
            let assessment_count = gb.list_assessments(&s.id).map(|a| a.len()).unwrap_or(0);
            json!({
                "id": s.id,
                "name": s.name,
                "studentCount": s.student_count,
                "assessmentCount": assessment_count
            })
        })
        .collect();

    ok(&req.id, json!({ "subjects": subjects }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_subjects_list(state, req)),
        _ => None,
    }
}
