use crate::session::PhotoView;

/// One photo-capture stage with its user-facing instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoStep {
    pub view: PhotoView,
    pub title: &'static str,
    pub instructions: &'static str,
}

/// Capture order. Indexed by the session's step index.
pub static PHOTO_STEPS: [PhotoStep; 4] = [
    PhotoStep {
        view: PhotoView::Front,
        title: "Front View",
        instructions: "Face the camera with your arms slightly away from your body",
    },
    PhotoStep {
        view: PhotoView::Back,
        title: "Back View",
        instructions: "Turn your back to the camera keeping the same posture",
    },
    PhotoStep {
        view: PhotoView::SideLeft,
        title: "Left Side View",
        instructions: "Stand with your left side (left profile) facing the camera",
    },
    PhotoStep {
        view: PhotoView::SideRight,
        title: "Right Side View",
        instructions: "Stand with your right side (right profile) facing the camera",
    },
];

pub fn step_at(index: usize) -> Option<&'static PhotoStep> {
    PHOTO_STEPS.get(index)
}
