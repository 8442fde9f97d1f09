use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, HtmlCanvasElement, Window};

use super::render::WebGlSurface;
use crate::camera::Viewport;
use crate::clock::PerformanceClock;
use crate::error::SceneError;
use crate::session::{Host, SharedSession};

/// The browser window the backdrop runs in.
pub struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    pub fn new() -> Result<Self, SceneError> {
        let window = web_sys::window().ok_or(SceneError::NoWindow)?;
        let document = window.document().ok_or(SceneError::NoDocument)?;
        Ok(Self { window, document })
    }
}

fn read_viewport(window: &Window) -> Option<Viewport> {
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Viewport::from_css(w, h, window.device_pixel_ratio())
}

impl Host for WebHost {
    type Surface = WebGlSurface;
    type Clock = PerformanceClock;

    fn find_surface(&self, selector: &str) -> Result<Option<WebGlSurface>, SceneError> {
        let Some(element) = self.document.query_selector(selector)? else {
            return Ok(None);
        };
        let canvas = element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SceneError::Platform(format!("{selector} is not a canvas")))?;
        WebGlSurface::new(canvas).map(Some)
    }

    fn viewport(&self) -> Viewport {
        read_viewport(&self.window).unwrap_or_else(|| Viewport::new(1, 1))
    }

    fn clock(&self) -> Result<PerformanceClock, SceneError> {
        PerformanceClock::new(&self.window)
    }

    fn start_loop(&self, session: SharedSession<WebGlSurface, PerformanceClock>) -> Result<(), SceneError> {
        // `f` holds the animation-frame closure so that it can keep calling
        // `request_animation_frame` on itself. Storing it inside an `Option`
        // allows us to create the `Closure` first and then obtain a reference to
        // it from within itself.
        let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();
        let window = self.window.clone();
        *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            session.borrow_mut().frame();

            // schedule next
            if let Some(next) = f.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(next.as_ref().unchecked_ref()) {
                    log::error!("animation frame request failed, backdrop stopped: {e:?}");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(first) = g.borrow().as_ref() {
            self.window
                .request_animation_frame(first.as_ref().unchecked_ref())?;
        }
        Ok(())
    }

    fn watch_resize(&self, session: SharedSession<WebGlSurface, PerformanceClock>) -> Result<(), SceneError> {
        let window = self.window.clone();
        let on_resize = Closure::wrap(Box::new(move || match read_viewport(&window) {
            Some(viewport) => {
                session.borrow_mut().resize(viewport);
            }
            None => log::warn!("ignoring resize to an unusable viewport"),
        }) as Box<dyn FnMut()>);
        self.window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        // lives as long as the page
        on_resize.forget();
        Ok(())
    }
}
