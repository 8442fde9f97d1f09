//! One running backdrop: the scene graph, the camera, the output surface and
//! the per-frame update.
//!
//! [`init`] builds everything once and hands a shared [`Session`] to the
//! host, which calls [`Session::frame`] on every display refresh and
//! [`Session::resize`] whenever the viewport changes. Both run on the same
//! thread, so a `RefCell` is all the coordination needed.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use glam::Vec3;
use rand::Rng;

use crate::camera::{capped_pixel_ratio, Camera, Viewport};
use crate::clock::FrameClock;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::geometry::{Geometry, ShapeKind};
use crate::params::{self, AnimationState};
use crate::scene::{
    AmbientLight, Material, NodeId, NodeKind, PointLight, Scene, Shading, Transform,
};

/// The drawing side of the platform.
pub trait RenderSurface {
    /// Fixed once at construction.
    fn set_pixel_ratio(&mut self, ratio: f64);
    /// Size in CSS pixels.
    fn set_size(&mut self, width: u32, height: u32);
    /// Called once, after the scene is fully built.
    fn upload(&mut self, scene: &Scene) -> Result<(), SceneError>;
    fn render(&mut self, scene: &Scene, camera: &Camera);
}

pub type SharedSession<S, C> = Rc<RefCell<Session<S, C>>>;

/// Everything the backdrop needs from the page it runs in.
pub trait Host {
    type Surface: RenderSurface;
    type Clock: FrameClock;

    /// `Ok(None)` means the page does not host the effect.
    fn find_surface(&self, selector: &str) -> Result<Option<Self::Surface>, SceneError>;
    fn viewport(&self) -> Viewport;
    fn clock(&self) -> Result<Self::Clock, SceneError>;
    /// Arranges for `session.frame()` to run on every display refresh, forever.
    fn start_loop(&self, session: SharedSession<Self::Surface, Self::Clock>) -> Result<(), SceneError>;
    /// Subscribes `session.resize()` to viewport changes for the page lifetime.
    fn watch_resize(&self, session: SharedSession<Self::Surface, Self::Clock>) -> Result<(), SceneError>;
}

/// A floating shape and the parameters driving it.
#[derive(Debug, Clone, Copy)]
pub struct Floater {
    pub node: NodeId,
    pub kind: ShapeKind,
    pub state: AnimationState,
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    globe_rate: f64,
    cloud_rate_y: f64,
    cloud_rate_x: f64,
    bob_amplitude: f64,
}

pub struct Session<S, C> {
    scene: Scene,
    camera: Camera,
    surface: S,
    clock: C,
    viewport: Viewport,
    group: NodeId,
    globe: NodeId,
    cloud: NodeId,
    floaters: Vec<Floater>,
    motion: Motion,
    frames: u64,
}

/// Builds the backdrop and starts it on `host`.
///
/// Returns `Ok(None)` without touching anything else when the page has no
/// surface matching the configured selector. Calling this twice for the same
/// page builds two independent sessions on the same canvas.
pub fn init<H, R>(
    host: &H,
    config: &SceneConfig,
    rng: &mut R,
) -> Result<Option<SharedSession<H::Surface, H::Clock>>, SceneError>
where
    H: Host,
    R: Rng,
{
    config.validate()?;

    let Some(surface) = host.find_surface(&config.canvas_selector)? else {
        log::debug!("no element matches {}, backdrop disabled", config.canvas_selector);
        return Ok(None);
    };

    let viewport = host.viewport();
    let mut session = Session::build(surface, host.clock()?, viewport, config, rng)?;
    session.surface.upload(&session.scene)?;
    log::info!(
        "backdrop ready: {}x{} @{}x, {} nodes",
        session.viewport.width,
        session.viewport.height,
        capped_pixel_ratio(viewport.pixel_ratio, config.max_pixel_ratio),
        session.scene.len()
    );

    let session = Rc::new(RefCell::new(session));
    host.start_loop(session.clone())?;
    host.watch_resize(session.clone())?;
    Ok(Some(session))
}

impl<S: RenderSurface, C: FrameClock> Session<S, C> {
    /// Assembles the scene graph around an already located surface.
    pub fn build<R: Rng>(
        mut surface: S,
        clock: C,
        viewport: Viewport,
        config: &SceneConfig,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        config.validate()?;

        let viewport = Viewport {
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            ..viewport
        };

        let mut scene = Scene::new();
        let camera = Camera::new(&config.camera, viewport.aspect());

        surface.set_pixel_ratio(capped_pixel_ratio(viewport.pixel_ratio, config.max_pixel_ratio));
        surface.set_size(viewport.width, viewport.height);

        let group = scene.add_node("group", NodeKind::Group, Transform::default(), None);
        let globe = add_globe(&mut scene, config, group);
        let cloud = add_point_cloud(&mut scene, config, rng);
        let floaters = add_floaters(&mut scene, config, group, rng);
        add_lights(&mut scene, config);

        Ok(Self {
            scene,
            camera,
            surface,
            clock,
            viewport,
            group,
            globe,
            cloud,
            floaters,
            motion: Motion {
                globe_rate: config.globe.spin_rate,
                cloud_rate_y: config.points.spin_rate_y,
                cloud_rate_x: config.points.spin_rate_x,
                bob_amplitude: config.floaters.bob_amplitude,
            },
            frames: 0,
        })
    }

    /// One iteration of the animation loop: read the clock once, update every
    /// animated transform from that reading, draw.
    pub fn frame(&mut self) -> f64 {
        let t = self.clock.elapsed();
        self.advance(t);
        self.surface.render(&self.scene, &self.camera);
        t
    }

    /// Updates animated transforms for elapsed time `t`.
    ///
    /// Globe and cloud angles and floater heights depend on `t` alone. Floater
    /// spin is accumulated per call, so it follows the frame count instead.
    pub fn advance(&mut self, t: f64) {
        let m = self.motion;

        self.scene.transform_mut(self.globe).rotation.y = (t * m.globe_rate) as f32;

        let cloud = self.scene.transform_mut(self.cloud);
        cloud.rotation.y = (t * m.cloud_rate_y) as f32;
        cloud.rotation.x = (t * m.cloud_rate_x) as f32;

        for floater in &self.floaters {
            let state = floater.state;
            let step = state.rotation_rate() as f32;
            let tf = self.scene.transform_mut(floater.node);
            tf.position.y = state.height_at(t, m.bob_amplitude) as f32;
            tf.rotation.x = (tf.rotation.x + step).rem_euclid(TAU);
            tf.rotation.y = (tf.rotation.y + step).rem_euclid(TAU);
        }

        self.frames += 1;
    }

    /// Applies a new viewport. Degenerate sizes are ignored and reported as
    /// `false`; the pixel ratio chosen at construction is kept.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if !self.camera.set_aspect(&viewport) {
            log::warn!("ignoring degenerate viewport {}x{}", viewport.width, viewport.height);
            return false;
        }
        self.camera.update_projection();
        self.surface.set_size(viewport.width, viewport.height);
        self.viewport = Viewport {
            pixel_ratio: self.viewport.pixel_ratio,
            ..viewport
        };
        true
    }
}

impl<S, C> Session<S, C> {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn globe(&self) -> NodeId {
        self.globe
    }

    pub fn cloud(&self) -> NodeId {
        self.cloud
    }

    pub fn floaters(&self) -> &[Floater] {
        &self.floaters
    }

    /// Number of animation updates applied so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

fn add_globe(scene: &mut Scene, config: &SceneConfig, group: NodeId) -> NodeId {
    let cfg = &config.globe;
    let geometry = scene.add_geometry(Geometry::icosahedron(cfg.radius, cfg.detail));
    let material = scene.add_material(Material {
        color: cfg.color,
        opacity: cfg.opacity,
        shading: Shading::Wireframe,
    });
    scene.add_node(
        "globe",
        NodeKind::Mesh { geometry, material },
        Transform::default(),
        Some(group),
    )
}

fn add_point_cloud<R: Rng>(scene: &mut Scene, config: &SceneConfig, rng: &mut R) -> NodeId {
    let cfg = &config.points;
    let material = scene.add_material(Material {
        color: cfg.color,
        opacity: cfg.opacity,
        shading: Shading::Points { size: cfg.size },
    });
    let positions = params::point_positions(cfg, rng);
    scene.add_node(
        "points",
        NodeKind::Points { positions, material },
        Transform::default(),
        None,
    )
}

fn add_floaters<R: Rng>(
    scene: &mut Scene,
    config: &SceneConfig,
    group: NodeId,
    rng: &mut R,
) -> Vec<Floater> {
    let cfg = &config.floaters;
    let material = scene.add_material(Material {
        color: cfg.color,
        opacity: cfg.opacity,
        shading: Shading::Lit,
    });

    // one geometry per kind, shared by every floater of that kind
    let geometries: Vec<_> = ShapeKind::CATALOG
        .iter()
        .map(|kind| scene.add_geometry(kind.build(cfg.size)))
        .collect();

    params::floater_seeds(cfg, rng)
        .into_iter()
        .enumerate()
        .map(|(i, seed)| {
            let kind = ShapeKind::for_index(i);
            let geometry = geometries[i % geometries.len()];
            let node = scene.add_node(
                "floater",
                NodeKind::Mesh { geometry, material },
                Transform::at(seed.position()),
                Some(group),
            );
            Floater {
                node,
                kind,
                state: seed.state,
            }
        })
        .collect()
}

fn add_lights(scene: &mut Scene, config: &SceneConfig) {
    let cfg = &config.lights;
    scene.lights.point = Some(PointLight {
        position: cfg.point_position,
        color: cfg.point_color,
        intensity: cfg.point_intensity,
    });
    scene.lights.ambient = Some(AmbientLight {
        color: cfg.ambient_color,
        intensity: cfg.ambient_intensity,
    });
}

impl Floater {
    /// Planar distance from the Y axis at construction.
    pub fn ring_radius(&self, scene: &Scene) -> f32 {
        let p = scene.transform(self.node).position;
        Vec3::new(p.x, 0.0, p.z).length()
    }
}
