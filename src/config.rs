//! Every tunable constant of the backdrop, in one place.

use glam::Vec3;

use crate::error::SceneError;

/// Linear RGB colour, each channel in `[0, 1]`.
pub type Rgb = [f32; 3];

/// Converts a `0xRRGGBB` literal into an [`Rgb`] triple.
pub fn hex(rgb: u32) -> Rgb {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Offset along +Z, looking back at the origin.
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct GlobeConfig {
    pub radius: f32,
    pub detail: u32,
    pub color: Rgb,
    pub opacity: f32,
    /// Radians per second about Y.
    pub spin_rate: f64,
}

#[derive(Debug, Clone)]
pub struct PointCloudConfig {
    pub count: usize,
    /// Side of the cube the points are scattered in, centred on the origin.
    pub spread: f32,
    pub size: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub spin_rate_y: f64,
    pub spin_rate_x: f64,
}

#[derive(Debug, Clone)]
pub struct FloaterConfig {
    pub count: usize,
    pub base_radius: f64,
    pub radius_jitter: f64,
    /// Initial heights are drawn from `[-spread/2, spread/2)`.
    pub height_spread: f64,
    pub bob_amplitude: f64,
    pub min_speed: f64,
    pub speed_range: f64,
    /// Per-frame rotation step is drawn from `[-range/2, range/2)`.
    pub rotation_step_range: f64,
    pub size: f32,
    pub color: Rgb,
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct LightConfig {
    pub point_position: Vec3,
    pub point_color: Rgb,
    pub point_intensity: f32,
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// CSS selector of the canvas hosting the effect.
    pub canvas_selector: String,
    pub max_pixel_ratio: f64,
    pub camera: CameraConfig,
    pub globe: GlobeConfig,
    pub points: PointCloudConfig,
    pub floaters: FloaterConfig,
    pub lights: LightConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas_selector: "#hero-canvas".to_string(),
            max_pixel_ratio: 2.0,
            camera: CameraConfig {
                fov_deg: 75.0,
                near: 0.1,
                far: 1000.0,
                distance: 30.0,
            },
            globe: GlobeConfig {
                radius: 10.0,
                detail: 2,
                color: hex(0x6366f1),
                opacity: 0.15,
                spin_rate: 0.05,
            },
            points: PointCloudConfig {
                count: 700,
                spread: 100.0,
                size: 0.15,
                color: hex(0xa5b4fc),
                opacity: 0.6,
                spin_rate_y: -0.02,
                spin_rate_x: 0.01,
            },
            floaters: FloaterConfig {
                count: 5,
                base_radius: 15.0,
                radius_jitter: 5.0,
                height_spread: 10.0,
                bob_amplitude: 1.5,
                min_speed: 0.5,
                speed_range: 0.5,
                rotation_step_range: 0.02,
                size: 2.0,
                color: hex(0x8b5cf6),
                opacity: 0.7,
            },
            lights: LightConfig {
                point_position: Vec3::new(10.0, 10.0, 10.0),
                point_color: hex(0xffffff),
                point_intensity: 1.0,
                ambient_color: hex(0x404040),
                ambient_intensity: 1.0,
            },
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.canvas_selector.trim().is_empty() {
            return Err(SceneError::InvalidConfig("canvas selector is empty"));
        }
        if !(self.max_pixel_ratio >= 1.0) {
            return Err(SceneError::InvalidConfig("pixel ratio cap must be at least 1"));
        }
        let cam = &self.camera;
        if !(cam.fov_deg > 0.0 && cam.fov_deg < 180.0) {
            return Err(SceneError::InvalidConfig("field of view must be within (0, 180)"));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(SceneError::InvalidConfig("clip planes must satisfy 0 < near < far"));
        }
        if !(self.points.spread > 0.0) {
            return Err(SceneError::InvalidConfig("point spread must be positive"));
        }
        if !(self.floaters.rotation_step_range >= 0.0 && self.floaters.speed_range >= 0.0) {
            return Err(SceneError::InvalidConfig("floater ranges must be non-negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn hex_splits_channels() {
        assert_eq!(hex(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex(0x00ff00), [0.0, 1.0, 0.0]);
        assert_eq!(hex(0x0000ff), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let mut cfg = SceneConfig::default();
        cfg.camera.near = 10.0;
        cfg.camera.far = 1.0;
        assert!(matches!(cfg.validate(), Err(SceneError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_empty_selector() {
        let cfg = SceneConfig {
            canvas_selector: "  ".into(),
            ..SceneConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
