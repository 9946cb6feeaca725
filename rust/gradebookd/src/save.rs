use crate::gradebook::MarkMatrix;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub saved: usize,
    pub saved_at: DateTime<Utc>,
}

/// Where "save all marks" goes. A deployment with a real system of record
/// supplies its own sink and owns retry/failure semantics.
pub trait MarkSink {
    fn save_all(&mut self, marks: &MarkMatrix) -> anyhow::Result<SaveReceipt>;
}

/// Confirms without persisting anything.
#[derive(Debug, Default)]
pub struct NoopSink;

impl MarkSink for NoopSink {
    fn save_all(&mut self, marks: &MarkMatrix) -> anyhow::Result<SaveReceipt> {
        let receipt = SaveReceipt {
            saved: marks.len(),
            saved_at: Utc::now(),
        };
        for m in marks.iter() {
            debug!(student = %m.student_id, assessment = %m.assessment_id, score = m.score, "mark");
        }
        if marks.is_empty() {
            info!("save requested with no marks entered");
        } else {
            info!(saved = receipt.saved, "marks confirmed (no persistence configured)");
        }
        Ok(receipt)
    }
}
