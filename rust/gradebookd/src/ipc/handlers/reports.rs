use crate::calc::{assessment_average, grade_distribution, grade_for_percent, Percentage};
use crate::ipc::error::{gradebook_err, ok};
use crate::ipc::helpers::{require_str, session};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_subject_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let gb = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subject_id = match require_str(req, "subjectId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subject = match gb.subject(&subject_id) {
        Ok(v) => v,
        Err(e) => return gradebook_err(&req.id, &e),
    };
    let assessments = match gb.list_assessments(&subject_id) {
        Ok(v) => v,
        Err(e) => return gradebook_err(&req.id, &e),
    };

    let column = |assessment_id: &str, max_score: f64| -> Vec<Percentage> {
        gb.students()
            .iter()
            .map(|s| Percentage::from_score(gb.mark(&s.id, assessment_id), max_score))
            .collect()
    };

    let mut all_cells: Vec<Percentage> = Vec::new();
    let rows: Vec<serde_json::Value> = assessments
        .iter()
        .map(|a| {
            let cells = column(&a.id, a.max_score);
            let avg = assessment_average(cells.iter().copied());
            all_cells.extend(cells);
            json!({
                "assessmentId": a.id,
                "name": a.name,
                "type": a.kind,
                "maxScore": a.max_score,
                "scoredCount": avg.scored_count,
                "unscoredCount": avg.unscored_count,
                "avgPercent": avg.avg_percent,
                "grade": avg.avg_percent.map(grade_for_percent)
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "subject": subject,
            "rosterSize": gb.students().len(),
            "assessments": rows,
            "distribution": grade_distribution(all_cells)
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.subjectSummary" => Some(handle_subject_summary(state, req)),
        _ => None,
    }
}
