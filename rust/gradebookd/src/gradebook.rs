//! Assessments and the sparse mark matrix for one session.
//!
//! Subjects and students come in as read-only [`ReferenceData`]; everything
//! else here is created during the session and dropped with it.

use crate::calc::Percentage;
use crate::roster::{ReferenceData, Student, Subject};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradebookError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("mark is not a number: {raw:?}")]
    MarkParse { raw: String },
    #[error("mark {value} is outside 0..={max_score}")]
    MarkOutOfRange { value: f64, max_score: f64 },
}

impl GradebookError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        GradebookError::Validation {
            field,
            message: message.into(),
        }
    }

    fn not_found(entity: &'static str, id: &str) -> Self {
        GradebookError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GradebookError::Validation { .. } => "validation_failed",
            GradebookError::NotFound { .. } => "not_found",
            GradebookError::MarkParse { .. } => "mark_parse_failed",
            GradebookError::MarkOutOfRange { .. } => "mark_out_of_range",
        }
    }

    pub fn details(&self) -> serde_json::Value {
        match self {
            GradebookError::Validation { field, .. } => json!({ "field": field }),
            GradebookError::NotFound { entity, id } => json!({ "entity": entity, "id": id }),
            GradebookError::MarkParse { raw } => json!({ "value": raw }),
            GradebookError::MarkOutOfRange { value, max_score } => {
                json!({ "value": value, "maxScore": max_score })
            }
        }
    }

    /// Parse and range failures are the only ones a lenient mark policy may
    /// swallow.
    pub fn is_mark_input(&self) -> bool {
        matches!(
            self,
            GradebookError::MarkParse { .. } | GradebookError::MarkOutOfRange { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    Assignment,
    Quiz,
    Exam,
    Lab,
    Practical,
    Project,
}

impl AssessmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentType::Assignment => "assignment",
            AssessmentType::Quiz => "quiz",
            AssessmentType::Exam => "exam",
            AssessmentType::Lab => "lab",
            AssessmentType::Practical => "practical",
            AssessmentType::Project => "project",
        }
    }
}

impl FromStr for AssessmentType {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assignment" => Ok(AssessmentType::Assignment),
            "quiz" => Ok(AssessmentType::Quiz),
            "exam" => Ok(AssessmentType::Exam),
            "lab" => Ok(AssessmentType::Lab),
            "practical" => Ok(AssessmentType::Practical),
            "project" => Ok(AssessmentType::Project),
            other => Err(GradebookError::validation(
                "type",
                format!(
                    "unknown assessment type {other:?} (expected assignment, quiz, exam, lab, practical or project)"
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub subject_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub max_score: f64,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Numeric input as the UI sends it: either a JSON number or whatever the
/// user typed into a field.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn from_json(v: Option<&serde_json::Value>) -> Self {
        match v {
            Some(serde_json::Value::Number(n)) => RawNumber::Number(n.as_f64().unwrap_or(f64::NAN)),
            Some(serde_json::Value::String(s)) => RawNumber::Text(s.clone()),
            Some(serde_json::Value::Null) | None => RawNumber::Text(String::new()),
            Some(other) => RawNumber::Text(other.to_string()),
        }
    }

    /// Finite values only; NaN, infinities and blanks are rejected.
    pub fn parse(&self) -> Option<f64> {
        let v = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    fn raw_text(&self) -> String {
        match self {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

impl From<&str> for RawNumber {
    fn from(v: &str) -> Self {
        RawNumber::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssessmentDraft {
    pub name: String,
    pub kind: Option<String>,
    pub max_score: Option<RawNumber>,
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub student_id: String,
    pub assessment_id: String,
    pub score: f64,
}

/// Keyed by (student id, assessment id). A missing key means "not graded yet".
#[derive(Debug, Clone, Default)]
pub struct MarkMatrix {
    cells: BTreeMap<(String, String), f64>,
}

impl MarkMatrix {
    pub fn get(&self, student_id: &str, assessment_id: &str) -> Option<f64> {
        self.cells
            .get(&(student_id.to_string(), assessment_id.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Mark> + '_ {
        self.cells.iter().map(|((student_id, assessment_id), score)| Mark {
            student_id: student_id.clone(),
            assessment_id: assessment_id.clone(),
            score: *score,
        })
    }

    fn put(&mut self, student_id: &str, assessment_id: &str, score: f64) {
        self.cells
            .insert((student_id.to_string(), assessment_id.to_string()), score);
    }
}

pub struct Gradebook {
    subjects: Vec<Subject>,
    students: Vec<Student>,
    assessments: HashMap<String, Vec<Assessment>>,
    marks: MarkMatrix,
}

impl Gradebook {
    pub fn new(reference: ReferenceData) -> Self {
        let assessments = reference
            .subjects
            .iter()
            .map(|s| (s.id.clone(), Vec::new()))
            .collect();
        Self {
            subjects: reference.subjects,
            students: reference.students,
            assessments,
            marks: MarkMatrix::default(),
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn marks(&self) -> &MarkMatrix {
        &self.marks
    }

    pub fn subject(&self, subject_id: &str) -> Result<&Subject, GradebookError> {
        self.subjects
            .iter()
            .find(|s| s.id == subject_id)
            .ok_or_else(|| GradebookError::not_found("subject", subject_id))
    }

    pub fn student(&self, student_id: &str) -> Result<&Student, GradebookError> {
        self.students
            .iter()
            .find(|s| s.id == student_id)
            .ok_or_else(|| GradebookError::not_found("student", student_id))
    }

    pub fn assessment(&self, assessment_id: &str) -> Result<&Assessment, GradebookError> {
        self.assessments
            .values()
            .flatten()
            .find(|a| a.id == assessment_id)
            .ok_or_else(|| GradebookError::not_found("assessment", assessment_id))
    }

    /// Insertion order.
    pub fn list_assessments(&self, subject_id: &str) -> Result<&[Assessment], GradebookError> {
        self.assessments
            .get(subject_id)
            .map(Vec::as_slice)
            .ok_or_else(|| GradebookError::not_found("subject", subject_id))
    }

    pub fn add_assessment(
        &mut self,
        subject_id: &str,
        draft: AssessmentDraft,
    ) -> Result<Assessment, GradebookError> {
        let today = chrono::Local::now().date_naive();
        self.add_assessment_on(subject_id, draft, today)
    }

    /// Same as [`Gradebook::add_assessment`] with an explicit fallback date for
    /// drafts that leave the date blank.
    pub fn add_assessment_on(
        &mut self,
        subject_id: &str,
        draft: AssessmentDraft,
        today: NaiveDate,
    ) -> Result<Assessment, GradebookError> {
        if !self.assessments.contains_key(subject_id) {
            return Err(GradebookError::not_found("subject", subject_id));
        }

        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(GradebookError::validation("name", "name must not be empty"));
        }

        let max_score = match draft.max_score.as_ref().and_then(RawNumber::parse) {
            Some(v) if v > 0.0 => v,
            _ => {
                return Err(GradebookError::validation(
                    "maxScore",
                    "maxScore must be a positive number",
                ))
            }
        };

        let kind = match draft.kind.as_deref().map(str::trim) {
            None | Some("") => AssessmentType::Assignment,
            Some(s) => s.parse()?,
        };

        let date = match draft.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                GradebookError::validation("date", format!("date must be YYYY-MM-DD, got {s:?}"))
            })?,
        };

        let description = draft
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let assessment = Assessment {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            name,
            kind,
            max_score,
            date,
            description,
        };

        self.assessments
            .entry(subject_id.to_string())
            .or_default()
            .push(assessment.clone());
        Ok(assessment)
    }

    /// Stores or overwrites one cell. Nothing is written unless the value
    /// parses and lies in `0..=maxScore`.
    pub fn set_mark(
        &mut self,
        student_id: &str,
        assessment_id: &str,
        raw: &RawNumber,
    ) -> Result<Mark, GradebookError> {
        self.student(student_id)?;
        let max_score = self.assessment(assessment_id)?.max_score;

        let Some(score) = raw.parse() else {
            return Err(GradebookError::MarkParse {
                raw: raw.raw_text(),
            });
        };
        if !(0.0..=max_score).contains(&score) {
            return Err(GradebookError::MarkOutOfRange {
                value: score,
                max_score,
            });
        }

        self.marks.put(student_id, assessment_id, score);
        Ok(Mark {
            student_id: student_id.to_string(),
            assessment_id: assessment_id.to_string(),
            score,
        })
    }

    pub fn mark(&self, student_id: &str, assessment_id: &str) -> Option<f64> {
        self.marks.get(student_id, assessment_id)
    }

    pub fn percentage(
        &self,
        student_id: &str,
        assessment_id: &str,
    ) -> Result<Percentage, GradebookError> {
        self.student(student_id)?;
        let assessment = self.assessment(assessment_id)?;
        Ok(Percentage::from_score(
            self.marks.get(student_id, assessment_id),
            assessment.max_score,
        ))
    }
}
