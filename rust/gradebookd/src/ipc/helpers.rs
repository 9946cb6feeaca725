use crate::gradebook::Gradebook;
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};

pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

/// Required string param, or a ready-made `bad_params` response.
pub fn require_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    match param_str(req, key) {
        Some(v) => Ok(v.to_string()),
        None => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

pub fn session<'a>(state: &'a AppState, req: &Request) -> Result<&'a Gradebook, serde_json::Value> {
    state.session.as_ref().ok_or_else(no_session(req))
}

pub fn session_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut Gradebook, serde_json::Value> {
    state.session.as_mut().ok_or_else(no_session(req))
}

fn no_session(req: &Request) -> impl FnOnce() -> serde_json::Value + '_ {
    move || err(&req.id, "no_session", "load a roster first", None)
}
