pub mod assessments;
pub mod core;
pub mod marks;
pub mod reports;
pub mod signup;
pub mod students;
pub mod subjects;
