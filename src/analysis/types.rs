//! Type definitions for body-composition analysis.
//!
//! Results keep raw values; rounding happens only in `display()` so that
//! persisted snapshots restore exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Simplified somatotype derived from BMI and body fat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    Ectomorph,
    Mesomorph,
    Endomorph,
}

impl BodyType {
    pub fn name(&self) -> &'static str {
        match self {
            BodyType::Ectomorph => "Ectomorph",
            BodyType::Mesomorph => "Mesomorph",
            BodyType::Endomorph => "Endomorph",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BodyType::Ectomorph => {
                "Tends to be lean with a fast metabolism. Has difficulty gaining weight."
            }
            BodyType::Mesomorph => {
                "Athletic build that gains muscle easily. Medium bone structure."
            }
            BodyType::Endomorph => {
                "Tends to store fat more easily. Slower metabolism."
            }
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Standard BMI bands. Boundary values belong to the upper band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Output of the analysis engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    pub bmi: f64,
    /// Estimated body fat, percent of body weight
    pub body_fat: f64,
    /// Devine-style ideal weight in kg
    pub ideal_weight: f64,
    pub muscle_mass: f64,
    pub fat_mass: f64,
    /// Bone and organ estimate; muscle + fat + other need not equal weight
    pub other_mass: f64,
    pub bmi_category: BmiCategory,
    pub body_type: BodyType,
    pub body_type_description: String,
    pub recommendations: Vec<String>,
}

/// Metrics rounded to one decimal place for presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    pub bmi: f64,
    pub body_fat: f64,
    pub ideal_weight: f64,
    pub muscle_mass: f64,
    pub fat_mass: f64,
    pub other_mass: f64,
}

/// Share of each mass component in the composition chart, in percent of
/// the three components' sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionShares {
    pub muscle: f64,
    pub fat: f64,
    pub other: f64,
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl AnalysisResults {
    pub fn display(&self) -> DisplayMetrics {
        DisplayMetrics {
            bmi: round1(self.bmi),
            body_fat: round1(self.body_fat),
            ideal_weight: round1(self.ideal_weight),
            muscle_mass: round1(self.muscle_mass),
            fat_mass: round1(self.fat_mass),
            other_mass: round1(self.other_mass),
        }
    }

    pub fn composition_shares(&self) -> CompositionShares {
        let total = self.muscle_mass + self.fat_mass + self.other_mass;
        if total <= 0.0 {
            return CompositionShares {
                muscle: 0.0,
                fat: 0.0,
                other: 0.0,
            };
        }
        CompositionShares {
            muscle: self.muscle_mass / total * 100.0,
            fat: self.fat_mass / total * 100.0,
            other: self.other_mass / total * 100.0,
        }
    }
}
