//! Construction-time randomness: floater motion parameters, floater placement
//! and point cloud positions. Nothing here is touched again after the scene is
//! built.

use std::f64::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::{FloaterConfig, PointCloudConfig};

/// Per-floater motion parameters. Fixed for the floater's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    initial_y: f64,
    speed: f64,
    phase_offset: f64,
    rotation_rate: f64,
}

impl AnimationState {
    pub fn new(initial_y: f64, speed: f64, phase_offset: f64, rotation_rate: f64) -> Self {
        Self {
            initial_y,
            speed,
            phase_offset,
            rotation_rate,
        }
    }

    pub fn initial_y(&self) -> f64 {
        self.initial_y
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn phase_offset(&self) -> f64 {
        self.phase_offset
    }

    /// Radians added to the X and Y rotation on every frame.
    pub fn rotation_rate(&self) -> f64 {
        self.rotation_rate
    }

    /// Bobbing height at elapsed time `t`.
    pub fn height_at(&self, t: f64, amplitude: f64) -> f64 {
        self.initial_y + (t * self.speed + self.phase_offset).sin() * amplitude
    }
}

/// Everything drawn for one floater at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloaterSeed {
    pub state: AnimationState,
    /// Angle around the Y axis, evenly spaced by index.
    pub angle: f64,
    pub radius: f64,
}

impl FloaterSeed {
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            (self.angle.cos() * self.radius) as f32,
            self.state.initial_y as f32,
            (self.angle.sin() * self.radius) as f32,
        )
    }
}

/// Draws motion parameters and ring placement for every floater.
pub fn floater_seeds<R: Rng>(cfg: &FloaterConfig, rng: &mut R) -> Vec<FloaterSeed> {
    (0..cfg.count)
        .map(|i| {
            let speed = cfg.min_speed + rng.gen::<f64>() * cfg.speed_range;
            let phase_offset = rng.gen::<f64>() * TAU;
            let rotation_rate = (rng.gen::<f64>() - 0.5) * cfg.rotation_step_range;
            let radius = cfg.base_radius + rng.gen::<f64>() * cfg.radius_jitter;
            let initial_y = (rng.gen::<f64>() - 0.5) * cfg.height_spread;
            FloaterSeed {
                state: AnimationState::new(initial_y, speed, phase_offset, rotation_rate),
                angle: i as f64 / cfg.count as f64 * TAU,
                radius,
            }
        })
        .collect()
}

/// `count` points scattered uniformly in a cube of side `spread`, flattened to
/// `x, y, z` triples. Every coordinate lies in `[-spread/2, spread/2)`.
pub fn point_positions<R: Rng>(cfg: &PointCloudConfig, rng: &mut R) -> Vec<f32> {
    (0..cfg.count * 3)
        .map(|_| (rng.gen::<f32>() - 0.5) * cfg.spread)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn floater_parameters_stay_in_range() {
        let cfg = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            for seed in floater_seeds(&cfg.floaters, &mut rng) {
                let s = seed.state;
                assert!((0.5..1.0).contains(&s.speed()));
                assert!((0.0..TAU).contains(&s.phase_offset()));
                assert!((-0.01..0.01).contains(&s.rotation_rate()));
                assert!((15.0..20.0).contains(&seed.radius));
                assert!((-5.0..5.0).contains(&s.initial_y()));
            }
        }
    }

    #[test]
    fn floaters_are_evenly_spaced_on_the_ring() {
        let cfg = SceneConfig::default();
        let seeds = floater_seeds(&cfg.floaters, &mut StdRng::seed_from_u64(1));
        assert_eq!(seeds.len(), 5);
        for (i, seed) in seeds.iter().enumerate() {
            assert_relative_eq!(seed.angle, TAU * i as f64 / 5.0);
            let p = seed.position();
            let planar = (p.x as f64).hypot(p.z as f64);
            assert_relative_eq!(planar, seed.radius, epsilon = 1e-4);
        }
    }

    #[test]
    fn point_cloud_fills_the_cube() {
        let cfg = SceneConfig::default();
        let pts = point_positions(&cfg.points, &mut StdRng::seed_from_u64(3));
        assert_eq!(pts.len(), 2100);
        assert!(pts.iter().all(|c| (-50.0..50.0).contains(c)));
    }

    #[test]
    fn height_is_bounded_by_amplitude() {
        let s = AnimationState::new(2.0, 0.75, 1.0, 0.005);
        for step in 0..1000 {
            let y = s.height_at(step as f64 * 0.037, 1.5);
            assert!((0.5..=3.5).contains(&y));
        }
    }
}
