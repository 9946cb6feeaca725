//! Multi-role signup. Each role carries only its own fields; nothing is
//! stored, the caller just gets back a validated registration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum SignupForm {
    #[serde(rename_all = "camelCase")]
    Student {
        #[serde(flatten)]
        credentials: Credentials,
        #[serde(default)]
        roll_no: String,
        #[serde(default)]
        class_section: String,
    },
    #[serde(rename_all = "camelCase")]
    Teacher {
        #[serde(flatten)]
        credentials: Credentials,
        #[serde(default)]
        employee_id: String,
        #[serde(default)]
        subject: String,
    },
    #[serde(rename_all = "camelCase")]
    Parent {
        #[serde(flatten)]
        credentials: Credentials,
        #[serde(default)]
        child_roll_no: String,
        #[serde(default)]
        phone: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub registration_id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl SignupForm {
    pub fn role(&self) -> Role {
        match self {
            SignupForm::Student { .. } => Role::Student,
            SignupForm::Teacher { .. } => Role::Teacher,
            SignupForm::Parent { .. } => Role::Parent,
        }
    }

    fn credentials(&self) -> &Credentials {
        match self {
            SignupForm::Student { credentials, .. }
            | SignupForm::Teacher { credentials, .. }
            | SignupForm::Parent { credentials, .. } => credentials,
        }
    }

    /// Collects every field error rather than stopping at the first.
    pub fn validate(&self) -> Result<Registration, Vec<FieldError>> {
        let mut errors = Vec::new();
        let creds = self.credentials();

        require(&mut errors, "name", &creds.name);
        if require(&mut errors, "email", &creds.email) && !looks_like_email(creds.email.trim()) {
            errors.push(FieldError {
                field: "email",
                message: "email address is not valid".to_string(),
            });
        }
        if require(&mut errors, "password", &creds.password)
            && creds.password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.push(FieldError {
                field: "password",
                message: format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }

        match self {
            SignupForm::Student {
                roll_no,
                class_section,
                ..
            } => {
                require(&mut errors, "rollNo", roll_no);
                require(&mut errors, "classSection", class_section);
            }
            SignupForm::Teacher {
                employee_id,
                subject,
                ..
            } => {
                require(&mut errors, "employeeId", employee_id);
                require(&mut errors, "subject", subject);
            }
            SignupForm::Parent {
                child_roll_no,
                phone,
                ..
            } => {
                require(&mut errors, "childRollNo", child_roll_no);
                if require(&mut errors, "phone", phone) && !looks_like_phone(phone) {
                    errors.push(FieldError {
                        field: "phone",
                        message: "phone must contain 7 to 15 digits".to_string(),
                    });
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Registration {
            registration_id: Uuid::new_v4().to_string(),
            role: self.role(),
            name: creds.name.trim().to_string(),
            email: creds.email.trim().to_string(),
        })
    }
}

fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError {
            field,
            message: format!("{field} is required"),
        });
        return false;
    }
    true
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

fn looks_like_phone(s: &str) -> bool {
    let mut digits = 0;
    for c in s.trim().chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '+' | '-' => {}
            _ => return false,
        }
    }
    (7..=15).contains(&digits)
}
