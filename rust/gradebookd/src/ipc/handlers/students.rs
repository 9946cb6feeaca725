use crate::ipc::error::ok;
use crate::ipc::helpers::{param_str, session};
use crate::ipc::types::{AppState, Request};
use crate::roster::filter_students;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    ok(&req.id, json!({ "students": gb.students() }))
}

fn handle_students_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let query = param_str(req, "query").unwrap_or("");
    let students = filter_students(gb.students(), query);
    ok(
        &req.id,
        json!({
            "query": query,
            "total": gb.students().len(),
            "students": students
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.search" | "search-students" => Some(handle_students_search(state, req)),
        _ => None,
    }
}
