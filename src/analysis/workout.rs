//! Preview workout plans chosen from the analysis results.

use serde::Serialize;

use super::types::AnalysisResults;

/// Body fat above which the fat-loss plan is suggested.
const FAT_LOSS_THRESHOLD: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanKind {
    FatLossToning,
    Hypertrophy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSession {
    pub name: &'static str,
    pub exercises: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutPlan {
    pub kind: PlanKind,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub sessions: Vec<WorkoutSession>,
    pub note: &'static str,
}

/// Pick the preview plan for these results.
pub fn workout_plan_for(results: &AnalysisResults) -> WorkoutPlan {
    if results.body_fat > FAT_LOSS_THRESHOLD {
        fat_loss_plan()
    } else {
        hypertrophy_plan()
    }
}

fn fat_loss_plan() -> WorkoutPlan {
    WorkoutPlan {
        kind: PlanKind::FatLossToning,
        title: "Fat Loss + Toning Plan",
        subtitle: "Focus on reducing body fat while preserving muscle",
        sessions: vec![
            WorkoutSession {
                name: "Workout A - Monday/Thursday",
                exercises: vec![
                    "Warm-up: 10 min treadmill (brisk walk)",
                    "Back squat: 3x12",
                    "Flat bench press: 3x12",
                    "Bent-over row: 3x12",
                    "Finisher cardio: 20 min (HIIT)",
                ],
            },
            WorkoutSession {
                name: "Workout B - Tuesday/Friday",
                exercises: vec![
                    "Warm-up: 10 min bike",
                    "Leg press: 3x15",
                    "Shoulder press: 3x12",
                    "Lat pulldown: 3x12",
                    "Finisher cardio: 20 min (moderate)",
                ],
            },
        ],
        note: "This is a preview. The full plan adds progression, periodization and personal adjustments.",
    }
}

fn hypertrophy_plan() -> WorkoutPlan {
    WorkoutPlan {
        kind: PlanKind::Hypertrophy,
        title: "Hypertrophy Plan",
        subtitle: "Focus on building muscle mass",
        sessions: vec![
            WorkoutSession {
                name: "Workout A - Chest/Triceps",
                exercises: vec![
                    "Flat bench press: 4x8-10",
                    "Incline bench press: 3x10-12",
                    "Dumbbell fly: 3x12",
                    "Skull crushers: 3x10",
                    "Rope pushdown: 3x12",
                ],
            },
            WorkoutSession {
                name: "Workout B - Back/Biceps",
                exercises: vec![
                    "Pull-ups: 4x max",
                    "Seated cable row: 4x10",
                    "Lat pulldown: 3x12",
                    "Barbell curl: 4x10",
                    "Hammer curl: 3x12",
                ],
            },
        ],
        note: "This is a preview. The full plan also covers legs, shoulders and core.",
    }
}
