use crate::roster::{ReferenceData, Student, Subject};
use rusqlite::Connection;
use std::path::Path;

pub const ROSTER_DB_FILE: &str = "roster.sqlite3";

/// Opens (creating if needed) the roster database in a workspace directory.
/// The gradebook only ever reads from it.
pub fn open_roster(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(ROSTER_DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            student_count INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            roll_no TEXT,
            class_section TEXT,
            email TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_sort ON students(sort_order)",
        [],
    )?;

    Ok(conn)
}

pub fn load_reference(conn: &Connection) -> anyhow::Result<ReferenceData> {
    let mut subj_stmt =
        conn.prepare("SELECT id, name, student_count FROM subjects ORDER BY rowid")?;
    let subjects = subj_stmt
        .query_map([], |row| {
            let student_count: i64 = row.get(2)?;
            Ok(Subject {
                id: row.get(0)?,
                name: row.get(1)?,
                student_count: u32::try_from(student_count).unwrap_or(0),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stud_stmt = conn.prepare(
        "SELECT id, name, roll_no, class_section, email
         FROM students
         ORDER BY sort_order, rowid",
    )?;
    let students = stud_stmt
        .query_map([], |row| {
            let roll_no: Option<String> = row.get(2)?;
            let class_section: Option<String> = row.get(3)?;
            let email: Option<String> = row.get(4)?;
            Ok(Student {
                id: row.get(0)?,
                name: row.get(1)?,
                roll_no: trimmed(roll_no),
                class_section: trimmed(class_section),
                email: trimmed(email),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReferenceData { subjects, students })
}

fn trimmed(v: Option<String>) -> String {
    v.map(|s| s.trim().to_string()).unwrap_or_default()
}
