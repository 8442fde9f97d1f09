use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Drawable area in CSS pixels plus the device pixel ratio it was read with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    /// Builds a viewport from the floating point sizes the browser reports.
    /// Returns `None` for anything that would make a degenerate projection.
    pub fn from_css(width: f64, height: f64, pixel_ratio: f64) -> Option<Self> {
        if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
            return None;
        }
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Some(Self {
            width: width as u32,
            height: height as u32,
            pixel_ratio,
        })
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Device pixel ratio clamped to `[1, cap]`.
pub fn capped_pixel_ratio(ratio: f64, cap: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(1.0, cap)
    } else {
        1.0
    }
}

/// Perspective camera sitting on the +Z axis, looking at the origin.
#[derive(Debug, Clone)]
pub struct Camera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl Camera {
    pub fn new(cfg: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            fov_deg: cfg.fov_deg,
            aspect: if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 },
            near: cfg.near,
            far: cfg.far,
            position: Vec3::new(0.0, 0.0, cfg.distance),
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    /// Sets the aspect from a viewport. Degenerate viewports leave the camera
    /// untouched and return `false`.
    pub fn set_aspect(&mut self, viewport: &Viewport) -> bool {
        if viewport.is_degenerate() {
            return false;
        }
        self.aspect = viewport.aspect();
        true
    }

    /// Must follow any change to fov, aspect or clip planes.
    pub fn update_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn css_sizes_reject_degenerate_input() {
        assert!(Viewport::from_css(0.0, 600.0, 1.0).is_none());
        assert!(Viewport::from_css(800.0, -1.0, 1.0).is_none());
        assert!(Viewport::from_css(f64::NAN, 600.0, 1.0).is_none());
        let vp = Viewport::from_css(800.7, 600.2, f64::NAN).unwrap();
        assert_eq!((vp.width, vp.height, vp.pixel_ratio), (800, 600, 1.0));
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(capped_pixel_ratio(3.0, 2.0), 2.0);
        assert_eq!(capped_pixel_ratio(1.5, 2.0), 1.5);
        assert_eq!(capped_pixel_ratio(0.5, 2.0), 1.0);
        assert_eq!(capped_pixel_ratio(f64::INFINITY, 2.0), 1.0);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let cfg = SceneConfig::default();
        let mut cam = Camera::new(&cfg.camera, 2.0);
        assert!(!cam.set_aspect(&Viewport::new(0, 0)));
        cam.update_projection();
        assert_eq!(cam.aspect, 2.0);
        assert!(cam.projection().is_finite());
    }

    #[test]
    fn camera_sits_back_on_z() {
        let cfg = SceneConfig::default();
        let cam = Camera::new(&cfg.camera, 1.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 30.0));
        let origin = cam.view().transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(0.0, 0.0, -30.0));
    }
}
