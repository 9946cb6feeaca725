use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::signup::SignupForm;
use serde_json::json;
use tracing::info;

fn handle_signup_submit(req: &Request) -> serde_json::Value {
    let form: SignupForm = match serde_json::from_value(req.params.clone()) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "bad_params",
                format!("role must be one of: student, teacher, parent ({e})"),
                None,
            )
        }
    };

    match form.validate() {
        Ok(registration) => {
            info!(role = ?registration.role, "signup accepted");
            ok(&req.id, json!({ "registration": registration }))
        }
        Err(errors) => err(
            &req.id,
            "validation_failed",
            format!("{} field(s) need attention", errors.len()),
            Some(json!({ "errors": errors })),
        ),
    }
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "signup.submit" => Some(handle_signup_submit(req)),
        _ => None,
    }
}
