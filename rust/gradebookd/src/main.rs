mod calc;
mod config;
mod db;
mod gradebook;
mod ipc;
mod roster;
mod save;
mod signup;

use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Cli;
use crate::save::NoopSink;

// stdout carries the protocol, so diagnostics only ever go to stderr.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("GRADEBOOKD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_startup_roster(cli: &Cli, state: &mut ipc::AppState) -> anyhow::Result<()> {
    if let Some(path) = &cli.roster {
        let data = roster::load_json(path)?;
        state.load_session(data, None)?;
    } else if let Some(dir) = &cli.workspace {
        let conn = db::open_roster(dir)?;
        let data = db::load_reference(&conn)?;
        state.load_session(data, Some(dir.clone()))?;
    }
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        mark_policy = cli.mark_policy.as_str(),
        "gradebookd starting"
    );

    let mut state = ipc::AppState::new(cli.mark_policy, Box::new(NoopSink));
    if let Err(e) = load_startup_roster(&cli, &mut state) {
        // Keep serving; the caller can still load a roster over IPC.
        error!(error = ?e, "startup roster not loaded");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let _ = writeln!(
                    stdout,
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("stdin closed, shutting down");
}
