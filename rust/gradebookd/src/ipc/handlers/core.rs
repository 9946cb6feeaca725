use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::require_str;
use crate::ipc::types::{AppState, Request};
use crate::roster::ReferenceData;
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "sessionLoaded": state.session.is_some(),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "markPolicy": state.mark_policy.as_str(),
        }),
    )
}

fn handle_session_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data: ReferenceData = match serde_json::from_value(req.params.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };

    match state.load_session(data, None) {
        Ok((subjects, students)) => ok(
            &req.id,
            json!({ "subjectCount": subjects, "studentCount": students }),
        ),
        Err(e) => {
            warn!(error = %e, "rejected inline reference data");
            err(&req.id, "bad_reference_data", e.to_string(), None)
        }
    }
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match require_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    let conn = match db::open_roster(&path) {
        Ok(c) => c,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };
    let data = match db::load_reference(&conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    match state.load_session(data, Some(path.clone())) {
        Ok((subjects, students)) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "subjectCount": subjects,
                "studentCount": students
            }),
        ),
        Err(e) => {
            warn!(error = %e, workspace = %path.to_string_lossy(), "rejected roster database");
            err(&req.id, "bad_reference_data", e.to_string(), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.load" => Some(handle_session_load(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
