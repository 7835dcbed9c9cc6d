//! Camera rigs for the three viewer perspectives.

use astroview_core::CameraView;
use glam::{Mat4, Vec3};

/// Vertical field of view in degrees.
const FOV_Y_DEG: f32 = 45.0;
/// Eye distance of the fixed side and top views.
const FIXED_DISTANCE: f32 = 1.0;
const NEAR: f32 = 0.01;
const FAR: f32 = 100.0;

/// User-steered orbit rig for the free view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitRig {
    /// Rotation around the vertical axis, degrees.
    pub yaw_deg: f32,
    /// Elevation above the horizon, degrees, clamped to avoid the poles.
    pub polar_deg: f32,
    /// Eye distance from the model.
    pub distance: f32,
}

impl OrbitRig {
    /// Closest the rig can dolly in.
    pub const MIN_DISTANCE: f32 = 0.4;
    /// Farthest the rig can dolly out.
    pub const MAX_DISTANCE: f32 = 2.0;
    /// Distance change per scroll unit.
    pub const DOLLY_SPEED: f32 = 0.002;
    const MAX_POLAR_DEG: f32 = 89.0;

    /// Rotate the rig by a drag delta, in degrees.
    pub fn orbit(&mut self, delta_yaw_deg: f32, delta_polar_deg: f32) {
        self.yaw_deg = (self.yaw_deg + delta_yaw_deg).rem_euclid(360.0);
        self.polar_deg = (self.polar_deg + delta_polar_deg)
            .clamp(-Self::MAX_POLAR_DEG, Self::MAX_POLAR_DEG);
    }

    /// Dolly in or out by a scroll delta (positive moves away).
    pub fn dolly(&mut self, scroll_delta: f32) {
        self.distance = (self.distance + scroll_delta * Self::DOLLY_SPEED)
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    fn eye(&self) -> Vec3 {
        let yaw = self.yaw_deg.to_radians();
        let polar = self.polar_deg.to_radians();
        Vec3::new(
            polar.cos() * yaw.sin(),
            polar.sin(),
            polar.cos() * yaw.cos(),
        ) * self.distance
    }
}

impl Default for OrbitRig {
    fn default() -> Self {
        Self {
            yaw_deg: 0.0,
            polar_deg: 30.0,
            distance: 1.0,
        }
    }
}

/// Perspective camera looking at the model from the selected view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    /// Orbit state, used by [`CameraView::Free`] only.
    pub orbit: OrbitRig,
}

impl Camera {
    /// Eye position for the given view.
    pub fn eye(&self, view: CameraView) -> Vec3 {
        match view {
            CameraView::Side => Vec3::new(0.0, 0.0, FIXED_DISTANCE),
            CameraView::Top => Vec3::new(0.0, FIXED_DISTANCE, 0.0),
            CameraView::Free => self.orbit.eye(),
        }
    }

    fn up(view: CameraView) -> Vec3 {
        match view {
            CameraView::Side | CameraView::Free => Vec3::Y,
            // The side rig pitched straight down; its local up now points
            // along -Z.
            CameraView::Top => Vec3::NEG_Z,
        }
    }

    /// Combined view-projection matrix for the given view and aspect ratio.
    pub fn view_proj(&self, view: CameraView, aspect: f32) -> Mat4 {
        let projection =
            Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect.max(1e-3), NEAR, FAR);
        let view_matrix = Mat4::look_at_rh(self.eye(view), Vec3::ZERO, Self::up(view));
        projection * view_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_fixed_view_eyes() {
        let camera = Camera::default();
        assert_eq!(camera.eye(CameraView::Side), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(camera.eye(CameraView::Top), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_free_view_starts_at_initial_polar_angle() {
        let camera = Camera::default();
        let eye = camera.eye(CameraView::Free);
        assert!((eye.length() - 1.0).abs() < 1e-5);
        assert!((eye.y - 30f32.to_radians().sin()).abs() < 1e-5);
    }

    #[test]
    fn test_dolly_clamps_distance() {
        let mut rig = OrbitRig::default();
        rig.dolly(-10_000.0);
        assert_eq!(rig.distance, OrbitRig::MIN_DISTANCE);
        rig.dolly(100_000.0);
        assert_eq!(rig.distance, OrbitRig::MAX_DISTANCE);
    }

    #[test]
    fn test_orbit_clamps_polar() {
        let mut rig = OrbitRig::default();
        rig.orbit(0.0, 500.0);
        assert!(rig.polar_deg <= 89.0);
        rig.orbit(720.5, 0.0);
        assert!((0.0..360.0).contains(&rig.yaw_deg));
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::default();
        for view in [CameraView::Side, CameraView::Top, CameraView::Free] {
            let clip = camera.view_proj(view, 16.0 / 9.0) * Vec4::new(0.0, 0.0, 0.0, 1.0);
            let ndc = clip / clip.w;
            assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "{:?}", view);
            assert!((0.0..=1.0).contains(&ndc.z), "{:?}", view);
        }
    }
}
