use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub student_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roll_no: String,
    #[serde(rename = "class", default)]
    pub class_section: String,
    #[serde(default)]
    pub email: String,
}

/// Read-only catalog and roster handed to a gradebook session. Whoever owns
/// the system of record supplies this; the gradebook never writes it back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub students: Vec<Student>,
}

impl ReferenceData {
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for s in &self.subjects {
            if s.id.trim().is_empty() {
                bail!("subject with empty id: {:?}", s.name);
            }
            if !seen.insert(s.id.as_str()) {
                bail!("duplicate subject id: {}", s.id);
            }
        }

        seen.clear();
        for s in &self.students {
            if s.id.trim().is_empty() {
                bail!("student with empty id: {:?}", s.name);
            }
            if !seen.insert(s.id.as_str()) {
                bail!("duplicate student id: {}", s.id);
            }
        }
        Ok(())
    }
}

pub fn load_json(path: &Path) -> anyhow::Result<ReferenceData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file {}", path.to_string_lossy()))?;
    let data: ReferenceData = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse roster file {}", path.to_string_lossy()))?;
    Ok(data)
}

/// Case-insensitive substring match on name and roll number. A blank query
/// keeps the whole roster in its original order.
pub fn filter_students<'a>(roster: &'a [Student], query: &str) -> Vec<&'a Student> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return roster.iter().collect();
    }
    roster
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle) || s.roll_no.to_lowercase().contains(&needle)
        })
        .collect()
}
