use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// What happens to a mark write that does not parse or is out of range.
/// Either way the matrix is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MarkPolicy {
    /// Answer `ok` with `stored: false` and the reason.
    #[default]
    Ignore,
    /// Answer with an error response.
    Reject,
}

impl MarkPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkPolicy::Ignore => "ignore",
            MarkPolicy::Reject => "reject",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "gradebookd")]
#[command(about = "Gradebook sidecar: line-delimited JSON requests on stdin, responses on stdout", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON file with `subjects` and `students` to load at startup
    #[arg(long, value_name = "FILE", conflicts_with = "workspace")]
    pub roster: Option<PathBuf>,

    /// Workspace directory holding roster.sqlite3, loaded at startup
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// How invalid mark writes are answered
    #[arg(long, value_enum, env = "GRADEBOOKD_MARK_POLICY", default_value_t = MarkPolicy::Ignore)]
    pub mark_policy: MarkPolicy,
}
