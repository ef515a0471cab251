use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PhotoRules;
use crate::session::{PhotoSlots, UserData};

pub const HEIGHT_MIN_CM: i32 = 100;
pub const HEIGHT_MAX_CM: i32 = 250;
pub const WEIGHT_MIN_KG: f64 = 30.0;
pub const WEIGHT_MAX_KG: f64 = 300.0;
pub const AGE_MIN_YEARS: i32 = 13;
pub const AGE_MAX_YEARS: i32 = 120;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// A single violated rule, user-facing and actionable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Field or rule that failed (e.g. "height", "photos")
    pub field: String,
    pub message: String,
    /// Offending value as entered
    pub value: String,
}

impl Violation {
    pub fn new(field: &str, message: impl Into<String>, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Metadata of a file selected for a photo step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// One reason a selected file was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum FileIssue {
    UnsupportedType { mime_type: String, allowed: Vec<String> },
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

impl fmt::Display for FileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileIssue::UnsupportedType { mime_type, allowed } => write!(
                f,
                "Unsupported image type '{}' (allowed: {})",
                mime_type,
                allowed.join(", ")
            ),
            FileIssue::TooLarge {
                size_bytes,
                max_bytes,
            } => write!(
                f,
                "Image is {:.1} MiB, larger than the {:.1} MiB limit",
                *size_bytes as f64 / BYTES_PER_MIB,
                *max_bytes as f64 / BYTES_PER_MIB
            ),
        }
    }
}

/// Every constraint a file failed.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRejection {
    pub issues: Vec<FileIssue>,
}

impl FileRejection {
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.to_string()).collect()
    }
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

pub fn is_valid_height(height_cm: i32) -> bool {
    (HEIGHT_MIN_CM..=HEIGHT_MAX_CM).contains(&height_cm)
}

pub fn is_valid_weight(weight_kg: f64) -> bool {
    (WEIGHT_MIN_KG..=WEIGHT_MAX_KG).contains(&weight_kg)
}

pub fn is_valid_age(age: i32) -> bool {
    (AGE_MIN_YEARS..=AGE_MAX_YEARS).contains(&age)
}

pub fn is_allowed_type(mime_type: &str, rules: &PhotoRules) -> bool {
    rules.allowed_types.iter().any(|t| t == mime_type)
}

pub fn is_allowed_size(size_bytes: u64, rules: &PhotoRules) -> bool {
    size_bytes <= rules.max_size_bytes
}

/// Check a selected file against the photo rules.
pub fn check_file(metadata: &FileMetadata, rules: &PhotoRules) -> Result<(), FileRejection> {
    let mut issues = Vec::new();

    if !is_allowed_type(&metadata.mime_type, rules) {
        issues.push(FileIssue::UnsupportedType {
            mime_type: metadata.mime_type.clone(),
            allowed: rules.allowed_types.clone(),
        });
    }

    if !is_allowed_size(metadata.size_bytes, rules) {
        issues.push(FileIssue::TooLarge {
            size_bytes: metadata.size_bytes,
            max_bytes: rules.max_size_bytes,
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(FileRejection { issues })
    }
}

/// Validate the biometric fields of the collected user data.
/// Returns every violation; an empty list means the data is usable.
pub fn validate_user_data(data: &UserData) -> Vec<Violation> {
    let mut violations = Vec::new();

    match data.height {
        None => violations.push(Violation::new("height", "Height is required", "")),
        Some(h) if !is_valid_height(h) => violations.push(Violation::new(
            "height",
            format!(
                "Height must be between {} and {} cm (got {} cm)",
                HEIGHT_MIN_CM, HEIGHT_MAX_CM, h
            ),
            h,
        )),
        Some(_) => {}
    }

    match data.weight {
        None => violations.push(Violation::new("weight", "Weight is required", "")),
        Some(w) if !is_valid_weight(w) => violations.push(Violation::new(
            "weight",
            format!(
                "Weight must be between {} and {} kg (got {} kg)",
                WEIGHT_MIN_KG, WEIGHT_MAX_KG, w
            ),
            w,
        )),
        Some(_) => {}
    }

    match data.age {
        None => violations.push(Violation::new("age", "Age is required", "")),
        Some(a) if !is_valid_age(a) => violations.push(Violation::new(
            "age",
            format!(
                "Age must be between {} and {} years (got {})",
                AGE_MIN_YEARS, AGE_MAX_YEARS, a
            ),
            a,
        )),
        Some(_) => {}
    }

    // Gender is typed, so only absence can fail here; bad tokens are
    // reported while parsing the form.
    if data.gender.is_none() {
        violations.push(Violation::new(
            "gender",
            "Gender is required (male or female)",
            "",
        ));
    }

    violations
}

/// Full submission check: biometric ranges plus all four photos present.
pub fn validate_biometrics(data: &UserData, photos: &PhotoSlots) -> Vec<Violation> {
    let mut violations = validate_user_data(data);

    let missing = photos.missing();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|v| v.key()).collect();
        violations.push(Violation::new(
            "photos",
            format!(
                "All four photos are required ({} of 4 captured; missing: {})",
                4 - missing.len(),
                names.join(", ")
            ),
            names.join(","),
        ));
    }

    violations
}
