//! Scene domain model: model rotation and camera view selection.

use std::f32::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default model spin rate in degrees per second.
pub const DEFAULT_SPIN_DEG_PER_SEC: f32 = 18.0;

/// Spin direction around the model's vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    /// Negative rotation around +Y (as seen from the side camera).
    Clockwise,
    /// Positive rotation around +Y.
    CounterClockwise,
}

impl RotationDirection {
    /// Sign applied to the spin rate.
    pub fn signum(self) -> f32 {
        match self {
            RotationDirection::Clockwise => -1.0,
            RotationDirection::CounterClockwise => 1.0,
        }
    }

    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            RotationDirection::Clockwise => RotationDirection::CounterClockwise,
            RotationDirection::CounterClockwise => RotationDirection::Clockwise,
        }
    }
}

/// Camera placement selected in the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraView {
    /// Level with the model, looking at it from the front.
    Side,
    /// Straight down onto the model.
    Top,
    /// User-controlled orbit rig.
    Free,
}

/// Mutable scene state driven by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    /// Model rotation around Y in radians, wrapped to `[0, TAU)`.
    pub rotation_y: f32,
    /// Active camera view.
    pub view: CameraView,
}

impl SceneState {
    /// Create an unrotated scene with the given view.
    pub fn new(view: CameraView) -> Self {
        Self {
            rotation_y: 0.0,
            view,
        }
    }

    /// Advance the model rotation by one frame worth of spin.
    pub fn advance_rotation(
        &mut self,
        delta: Duration,
        direction: RotationDirection,
        deg_per_sec: f32,
    ) {
        let step = deg_per_sec.to_radians() * delta.as_secs_f32() * direction.signum();
        self.rotation_y = (self.rotation_y + step).rem_euclid(TAU);
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(CameraView::Side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clockwise_decreases_angle() {
        let mut scene = SceneState::default();
        scene.rotation_y = 1.0;
        scene.advance_rotation(
            Duration::from_secs(1),
            RotationDirection::Clockwise,
            DEFAULT_SPIN_DEG_PER_SEC,
        );
        assert!(scene.rotation_y < 1.0);

        let mut scene = SceneState::default();
        scene.advance_rotation(
            Duration::from_secs(1),
            RotationDirection::CounterClockwise,
            DEFAULT_SPIN_DEG_PER_SEC,
        );
        assert!((scene.rotation_y - DEFAULT_SPIN_DEG_PER_SEC.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut scene = SceneState::default();
        // Ten full seconds of clockwise spin crosses zero several times.
        for _ in 0..600 {
            scene.advance_rotation(
                Duration::from_millis(1000),
                RotationDirection::Clockwise,
                90.0,
            );
            assert!((0.0..TAU).contains(&scene.rotation_y));
        }
    }

    #[test]
    fn test_zero_delta_is_a_no_op() {
        let mut scene = SceneState::default();
        scene.advance_rotation(
            Duration::ZERO,
            RotationDirection::CounterClockwise,
            DEFAULT_SPIN_DEG_PER_SEC,
        );
        assert_eq!(scene.rotation_y, 0.0);
    }

    #[test]
    fn test_direction_toggle() {
        assert_eq!(
            RotationDirection::Clockwise.toggled(),
            RotationDirection::CounterClockwise
        );
        assert_eq!(
            RotationDirection::CounterClockwise.toggled(),
            RotationDirection::Clockwise
        );
        assert_eq!(RotationDirection::Clockwise.signum(), -1.0);
    }
}
