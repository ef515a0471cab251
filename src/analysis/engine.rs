//! Formula-based body-composition estimates.
//!
//! Everything here is pure and deterministic. The estimates are mock
//! values for the wizard, not measurements.

use crate::error::AnalysisError;
use crate::session::{Gender, UserData};

use super::types::{AnalysisResults, BmiCategory, BodyType};

const CM_PER_INCH: f64 = 2.54;
/// Share of body weight attributed to bone and organs.
const OTHER_MASS_FRACTION: f64 = 0.15;

pub const REC_CARDIO: &str = "Focus on cardiovascular training to reduce body fat";
pub const REC_STRENGTH: &str = "Prioritize strength and hypertrophy training";
pub const REC_CALORIE_SURPLUS: &str = "Increase calorie intake with nutritious foods";
pub const REC_CALORIE_DEFICIT: &str = "Consider a moderate calorie deficit combined with exercise";
pub const REC_HYDRATION: &str = "Stay well hydrated (2-3 L of water per day)";
pub const REC_SLEEP: &str = "Sleep 7-9 hours per night for better recovery";

/// Run the full analysis on validated user data.
///
/// # Errors
/// Returns `AnalysisError::MissingInput` if a required biometric field is
/// absent or the height is not positive.
pub fn analyze(data: &UserData) -> Result<AnalysisResults, AnalysisError> {
    let weight = data.weight.ok_or(AnalysisError::MissingInput("weight"))?;
    let height = data
        .height
        .filter(|h| *h > 0)
        .ok_or(AnalysisError::MissingInput("height"))?;
    let age = data.age.ok_or(AnalysisError::MissingInput("age"))?;
    let gender = data.gender.ok_or(AnalysisError::MissingInput("gender"))?;

    let bmi = bmi(weight, height);
    let body_fat = body_fat_percent(bmi, age, gender);
    let ideal_weight = ideal_weight(height, gender);

    let muscle_mass = weight * (100.0 - body_fat) / 100.0;
    let fat_mass = weight - muscle_mass;
    let other_mass = weight * OTHER_MASS_FRACTION;

    let body_type = classify_body_type(bmi, body_fat);

    Ok(AnalysisResults {
        bmi,
        body_fat,
        ideal_weight,
        muscle_mass,
        fat_mass,
        other_mass,
        bmi_category: bmi_category(bmi),
        body_type,
        body_type_description: body_type.description().to_string(),
        recommendations: recommendations(bmi, body_fat),
    })
}

/// BMI = weight / height_m².
pub fn bmi(weight_kg: f64, height_cm: i32) -> f64 {
    let height_m = f64::from(height_cm) / 100.0;
    weight_kg / (height_m * height_m)
}

/// Linear estimate: 1.20·BMI + 0.23·age with a gender offset.
pub fn body_fat_percent(bmi: f64, age: i32, gender: Gender) -> f64 {
    let offset = match gender {
        Gender::Male => 16.2,
        Gender::Female => 5.4,
    };
    1.20 * bmi + 0.23 * f64::from(age) - offset
}

/// Devine-style ideal weight from height alone.
pub fn ideal_weight(height_cm: i32, gender: Gender) -> f64 {
    let base = match gender {
        Gender::Male => 50.0,
        Gender::Female => 45.5,
    };
    let height_in = f64::from(height_cm) / CM_PER_INCH;
    base + 2.3 * (height_in - 60.0)
}

pub fn classify_body_type(bmi: f64, body_fat: f64) -> BodyType {
    if bmi < 18.5 {
        BodyType::Ectomorph
    } else if bmi < 25.0 && body_fat < 20.0 {
        BodyType::Mesomorph
    } else {
        BodyType::Endomorph
    }
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Condition-triggered advice followed by the two general entries.
pub fn recommendations(bmi: f64, body_fat: f64) -> Vec<String> {
    let mut recs = Vec::new();

    if body_fat > 25.0 {
        recs.push(REC_CARDIO);
    }
    if body_fat < 15.0 {
        recs.push(REC_STRENGTH);
    }
    if bmi < 18.5 {
        recs.push(REC_CALORIE_SURPLUS);
    }
    if bmi > 25.0 {
        recs.push(REC_CALORIE_DEFICIT);
    }

    recs.push(REC_HYDRATION);
    recs.push(REC_SLEEP);

    recs.into_iter().map(String::from).collect()
}
