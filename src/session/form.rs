//! Synchronization of raw form input into collected user data.

use crate::validation::Violation;

use super::types::{FormInput, Gender, UserData};

impl UserData {
    /// Copy every supplied form field into this record.
    ///
    /// Fields that are absent or blank leave the current value untouched.
    /// Present values that cannot be parsed are reported as violations and
    /// also leave the current value untouched.
    pub fn apply_form(&mut self, form: &FormInput) -> Vec<Violation> {
        let mut violations = Vec::new();

        if let Some(raw) = supplied(&form.weight) {
            match parse_decimal(raw) {
                Some(weight) => self.weight = Some(weight),
                None => violations.push(Violation::new(
                    "weight",
                    format!("Weight must be a number in kg (got '{}')", raw),
                    raw,
                )),
            }
        }

        if let Some(raw) = supplied(&form.height) {
            match parse_whole(raw) {
                Some(height) => self.height = Some(height),
                None => violations.push(Violation::new(
                    "height",
                    format!("Height must be a whole number of cm (got '{}')", raw),
                    raw,
                )),
            }
        }

        if let Some(raw) = supplied(&form.age) {
            match parse_whole(raw) {
                Some(age) => self.age = Some(age),
                None => violations.push(Violation::new(
                    "age",
                    format!("Age must be a whole number of years (got '{}')", raw),
                    raw,
                )),
            }
        }

        if let Some(raw) = supplied(&form.gender) {
            match Gender::parse(raw) {
                Some(gender) => self.gender = Some(gender),
                None => violations.push(Violation::new(
                    "gender",
                    format!("Gender must be male or female (got '{}')", raw),
                    raw,
                )),
            }
        }

        if let Some(raw) = supplied(&form.activity_level) {
            self.activity_level = Some(raw.to_string());
        }
        if let Some(raw) = supplied(&form.goal) {
            self.goal = Some(raw.to_string());
        }

        violations
    }
}

/// A trimmed, non-blank form value.
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer form fields accept a decimal and keep its integer part.
/// Values that do not fit an `i32` are unparseable, not clamped.
fn parse_whole(raw: &str) -> Option<i32> {
    if let Ok(value) = raw.parse::<i32>() {
        return Some(value);
    }
    parse_decimal(raw)
        .map(f64::trunc)
        .filter(|v| (i32::MIN as f64..=i32::MAX as f64).contains(v))
        .map(|v| v as i32)
}
