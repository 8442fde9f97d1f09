#![allow(dead_code)]

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use hero_backdrop::scene::Scene;
use hero_backdrop::{
    Camera, Host, ManualClock, RenderSurface, SceneConfig, SceneError, Session, SharedSession,
    Viewport,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Surface that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub pixel_ratio: Option<f64>,
    pub sizes: Vec<(u32, u32)>,
    pub uploads: usize,
    pub renders: usize,
}

impl RenderSurface for RecordingSurface {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = Some(ratio);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.sizes.push((width, height));
    }

    fn upload(&mut self, _scene: &Scene) -> Result<(), SceneError> {
        self.uploads += 1;
        Ok(())
    }

    fn render(&mut self, _scene: &Scene, _camera: &Camera) {
        self.renders += 1;
    }
}

pub type TestSession = Session<RecordingSurface, Rc<ManualClock>>;

/// Page stand-in: optionally hosts a canvas and logs every call made on it.
pub struct FakeHost {
    pub has_canvas: bool,
    pub viewport: Viewport,
    pub clock: Rc<ManualClock>,
    pub calls: RefCell<Vec<&'static str>>,
}

impl FakeHost {
    pub fn new(has_canvas: bool) -> Self {
        Self {
            has_canvas,
            viewport: Viewport::new(1280, 720),
            clock: Rc::new(ManualClock::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }
}

impl Host for FakeHost {
    type Surface = RecordingSurface;
    type Clock = Rc<ManualClock>;

    fn find_surface(&self, _selector: &str) -> Result<Option<RecordingSurface>, SceneError> {
        self.record("find_surface");
        Ok(self.has_canvas.then(RecordingSurface::default))
    }

    fn viewport(&self) -> Viewport {
        self.record("viewport");
        self.viewport
    }

    fn clock(&self) -> Result<Rc<ManualClock>, SceneError> {
        self.record("clock");
        Ok(self.clock.clone())
    }

    fn start_loop(&self, _session: SharedSession<RecordingSurface, Rc<ManualClock>>) -> Result<(), SceneError> {
        self.record("start_loop");
        Ok(())
    }

    fn watch_resize(&self, _session: SharedSession<RecordingSurface, Rc<ManualClock>>) -> Result<(), SceneError> {
        self.record("watch_resize");
        Ok(())
    }
}

pub fn session(seed: u64) -> (TestSession, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let session = Session::build(
        RecordingSurface::default(),
        clock.clone(),
        Viewport::new(1280, 720),
        &SceneConfig::default(),
        &mut StdRng::seed_from_u64(seed),
    )
    .expect("default config builds");
    (session, clock)
}

/// Distance between two angles on the circle.
pub fn angle_gap(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}
