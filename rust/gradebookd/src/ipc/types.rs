use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;

use crate::config::MarkPolicy;
use crate::gradebook::Gradebook;
use crate::roster::ReferenceData;
use crate::save::MarkSink;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub mark_policy: MarkPolicy,
    pub session: Option<Gradebook>,
    pub sink: Box<dyn MarkSink>,
}

impl AppState {
    pub fn new(mark_policy: MarkPolicy, sink: Box<dyn MarkSink>) -> Self {
        Self {
            workspace: None,
            mark_policy,
            session: None,
            sink,
        }
    }

    /// Replaces the current session. On a validation failure the previous
    /// session stays loaded.
    pub fn load_session(
        &mut self,
        data: ReferenceData,
        workspace: Option<PathBuf>,
    ) -> anyhow::Result<(usize, usize)> {
        data.validate()?;
        let counts = (data.subjects.len(), data.students.len());
        self.session = Some(Gradebook::new(data));
        self.workspace = workspace;
        info!(
            subjects = counts.0,
            students = counts.1,
            workspace = ?self.workspace,
            "session loaded"
        );
        Ok(counts)
    }
}
