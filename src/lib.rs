#![cfg_attr(target_arch = "wasm32", allow(dead_code))]
//! Animated 3D backdrop drawn on a canvas behind page content: a translucent
//! wireframe globe, a drifting point field and a ring of floating solids.
//!
//! Scene construction and animation are platform independent and run on the
//! host for testing; the browser bindings live in the wasm32-only `wasm`
//! module.

pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod params;
pub mod scene;
pub mod session;

pub use camera::{Camera, Viewport};
pub use clock::{FrameClock, ManualClock};
pub use config::SceneConfig;
pub use error::SceneError;
pub use session::{init, Floater, Host, RenderSurface, Session, SharedSession};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub use wasm::{WebGlSurface, WebHost};

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::config::SceneConfig;

    mod host;
    mod render;
    mod shaders;

    pub use host::WebHost;
    pub use render::WebGlSurface;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        // A second init (e.g. under the test harness) is harmless.
        console_log::init_with_level(log::Level::Info).ok();

        let host = WebHost::new()?;
        crate::session::init(&host, &SceneConfig::default(), &mut rand::thread_rng())?;
        Ok(())
    }
}
