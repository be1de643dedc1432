use super::{HitTestResult, Pose};

/// Placement marker driven by the host's hit-test stream.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Reticle {
    visible: bool,
    pose: Option<Pose>,
}

impl Reticle {
    /// Follow the first hit of this tick; hide when there is none.
    pub fn update(&mut self, hits: &[HitTestResult]) {
        match hits.first() {
            Some(hit) => {
                self.visible = true;
                self.pose = Some(hit.pose);
            }
            None => {
                self.visible = false;
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Pose of the reticle while visible.
    pub fn pose(&self) -> Option<&Pose> {
        if self.visible {
            self.pose.as_ref()
        } else {
            None
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.pose = None;
    }
}
