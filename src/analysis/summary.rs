//! Plain-text summary for sharing results outside the app.

use crate::session::UserData;

use super::types::AnalysisResults;

/// Multi-line share text: body fat, BMI, weight and body type.
pub fn share_summary(results: &AnalysisResults, user_data: &UserData) -> String {
    let display = results.display();
    let weight = user_data
        .weight
        .map(|w| format!("{}kg", w))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "My Body Analysis\n\n\
         - Body fat: {:.1}%\n\
         - BMI: {:.1}\n\
         - Weight: {}\n\
         - Body type: {}\n\n\
         Analysis made with Body Assessment",
        display.body_fat, display.bmi, weight, results.body_type
    )
}
