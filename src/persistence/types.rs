use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResults;
use crate::session::{PhotoSlots, PhotoView, Screen, Session, UserData};

/// Presence flags for each photo view. Photo bytes are never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotosCaptured {
    pub front: bool,
    pub back: bool,
    pub side_left: bool,
    pub side_right: bool,
}

impl PhotosCaptured {
    pub fn from_slots(slots: &PhotoSlots) -> Self {
        Self {
            front: slots.is_captured(PhotoView::Front),
            back: slots.is_captured(PhotoView::Back),
            side_left: slots.is_captured(PhotoView::SideLeft),
            side_right: slots.is_captured(PhotoView::SideRight),
        }
    }

    pub fn count(&self) -> usize {
        [self.front, self.back, self.side_left, self.side_right]
            .iter()
            .filter(|p| **p)
            .count()
    }
}

/// The persisted, serializable subset of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current_screen: Screen,
    pub current_photo_step: usize,
    pub photos_captured: PhotosCaptured,
    #[serde(default)]
    pub user_data: UserData,
    #[serde(default)]
    pub analysis_results: Option<AnalysisResults>,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn from_session(session: &Session, timestamp: DateTime<Utc>) -> Self {
        Self {
            current_screen: session.current_screen,
            current_photo_step: session.current_step_index,
            photos_captured: PhotosCaptured::from_slots(&session.photos),
            user_data: session.user_data.clone(),
            analysis_results: session.analysis_results.clone(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PhotoHandle;

    #[test]
    fn test_snapshot_layout() {
        let mut session = Session::new();
        session.current_screen = Screen::PhotoCapture;
        session.current_step_index = 1;
        session.photos.set(
            PhotoView::Front,
            PhotoHandle::new(PhotoView::Front, "image/png", 2, 2, vec![7; 32]),
        );
        session.user_data.height = Some(175);

        let snapshot = Snapshot::from_session(&session, Utc::now());
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["currentScreen"], "photo-capture-screen");
        assert_eq!(json["currentPhotoStep"], 1);
        assert_eq!(json["photosCaptured"]["front"], true);
        assert_eq!(json["photosCaptured"]["sideLeft"], false);
        assert_eq!(json["userData"]["height"], 175);
        assert!(json["analysisResults"].is_null());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_snapshot_never_contains_photo_bytes() {
        let mut session = Session::new();
        for view in PhotoView::ALL {
            session
                .photos
                .set(view, PhotoHandle::new(view, "image/png", 2, 2, b"PIXELDATA".to_vec()));
        }

        let snapshot = Snapshot::from_session(&session, Utc::now());
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(!json.contains("PIXELDATA"));
        assert!(!json.contains("base64"));
        assert_eq!(snapshot.photos_captured.count(), 4);
    }
}
