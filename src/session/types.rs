//! Type definitions for the wizard session.
//!
//! These types support both JSON serialization (for persisted snapshots)
//! and in-memory use by the flow controller.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Screens of the assessment wizard, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    #[serde(rename = "welcome-screen")]
    Welcome,
    #[serde(rename = "photo-capture-screen")]
    PhotoCapture,
    #[serde(rename = "data-form-screen")]
    ComplementaryData,
    #[serde(rename = "analyzing-screen")]
    Analyzing,
    #[serde(rename = "results-screen")]
    Results,
    #[serde(rename = "workout-plan-screen")]
    WorkoutPlan,
}

impl Screen {
    /// Stable identifier used in snapshots and by the rendering layer.
    pub fn id(&self) -> &'static str {
        match self {
            Screen::Welcome => "welcome-screen",
            Screen::PhotoCapture => "photo-capture-screen",
            Screen::ComplementaryData => "data-form-screen",
            Screen::Analyzing => "analyzing-screen",
            Screen::Results => "results-screen",
            Screen::WorkoutPlan => "workout-plan-screen",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The four fixed photo views, in capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhotoView {
    Front,
    Back,
    SideLeft,
    SideRight,
}

impl PhotoView {
    pub const ALL: [PhotoView; 4] = [
        PhotoView::Front,
        PhotoView::Back,
        PhotoView::SideLeft,
        PhotoView::SideRight,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PhotoView::Front => "front",
            PhotoView::Back => "back",
            PhotoView::SideLeft => "sideLeft",
            PhotoView::SideRight => "sideRight",
        }
    }
}

impl fmt::Display for PhotoView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A decoded photo held in memory for the lifetime of the session.
/// Never persisted; snapshots only record whether a view is present.
#[derive(Clone, PartialEq)]
pub struct PhotoHandle {
    pub view: PhotoView,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    bytes: Arc<[u8]>,
}

impl PhotoHandle {
    pub fn new(view: PhotoView, mime_type: &str, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            view,
            mime_type: mime_type.to_string(),
            width,
            height,
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encode as a `data:` URL for thumbnail and preview rendering.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for PhotoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoHandle")
            .field("view", &self.view)
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One optional photo per view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoSlots {
    front: Option<PhotoHandle>,
    back: Option<PhotoHandle>,
    side_left: Option<PhotoHandle>,
    side_right: Option<PhotoHandle>,
}

impl PhotoSlots {
    pub fn get(&self, view: PhotoView) -> Option<&PhotoHandle> {
        match view {
            PhotoView::Front => self.front.as_ref(),
            PhotoView::Back => self.back.as_ref(),
            PhotoView::SideLeft => self.side_left.as_ref(),
            PhotoView::SideRight => self.side_right.as_ref(),
        }
    }

    /// Store a photo, replacing any earlier capture of the same view.
    pub fn set(&mut self, view: PhotoView, photo: PhotoHandle) {
        let slot = match view {
            PhotoView::Front => &mut self.front,
            PhotoView::Back => &mut self.back,
            PhotoView::SideLeft => &mut self.side_left,
            PhotoView::SideRight => &mut self.side_right,
        };
        *slot = Some(photo);
    }

    pub fn is_captured(&self, view: PhotoView) -> bool {
        self.get(view).is_some()
    }

    pub fn all_captured(&self) -> bool {
        PhotoView::ALL.iter().all(|v| self.is_captured(*v))
    }

    pub fn missing(&self) -> Vec<PhotoView> {
        PhotoView::ALL
            .into_iter()
            .filter(|v| !self.is_captured(*v))
            .collect()
    }

    pub fn captured_count(&self) -> usize {
        PhotoView::ALL.iter().filter(|v| self.is_captured(**v)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse a form token, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Biometric and preference inputs collected on the data form.
/// Fields stay `None` until the form supplies them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Body weight in kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Height in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Age in years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Activity level token (e.g. "sedentary", "moderate")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    /// Goal token (e.g. "lose_weight", "gain_muscle")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// Raw values as typed into the data form. `None` means the field was not
/// part of this submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub weight: Option<String>,
    pub height: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
}
