use std::collections::HashMap;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use js_sys::{Float32Array, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::shaders;
use crate::camera::Camera;
use crate::error::SceneError;
use crate::geometry::FLAT_STRIDE;
use crate::scene::{GeometryId, NodeKind, Scene, Shading};
use crate::session::RenderSurface;

const FLOAT_BYTES: i32 = 4;

/// Vertex data resident on the GPU, ready for one `draw_arrays`.
struct GpuBuffer {
    vao: WebGlVertexArrayObject,
    _buffer: WebGlBuffer,
    mode: u32,
    count: i32,
}

struct MeshProgram {
    program: WebGlProgram,
    model: Option<WebGlUniformLocation>,
    view_proj: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
    lit: Option<WebGlUniformLocation>,
    light_pos: Option<WebGlUniformLocation>,
    light_color: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
}

struct PointsProgram {
    program: WebGlProgram,
    model: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    proj: Option<WebGlUniformLocation>,
    size: Option<WebGlUniformLocation>,
    scale: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
}

/// WebGL2 output on a transparent canvas.
pub struct WebGlSurface {
    canvas: HtmlCanvasElement,
    gl: GL,
    mesh: MeshProgram,
    points: PointsProgram,
    /// Indexed by node; `None` for groups.
    draws: Vec<Option<Rc<GpuBuffer>>>,
    pixel_ratio: f64,
    width: u32,
    height: u32,
}

impl WebGlSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SceneError> {
        let options = Object::new();
        Reflect::set(&options, &"alpha".into(), &JsValue::TRUE)?;
        Reflect::set(&options, &"antialias".into(), &JsValue::TRUE)?;
        Reflect::set(&options, &"premultipliedAlpha".into(), &JsValue::TRUE)?;

        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &options)?
            .ok_or_else(|| SceneError::Unsupported("WebGL2 not supported".into()))?
            .dyn_into()
            .map_err(|_| SceneError::Unsupported("unexpected context type".into()))?;

        let mesh = {
            let program = shaders::link(&gl, shaders::MESH_VS, shaders::MESH_FS)?;
            let loc = |name| gl.get_uniform_location(&program, name);
            MeshProgram {
                model: loc("u_model"),
                view_proj: loc("u_view_proj"),
                color: loc("u_color"),
                opacity: loc("u_opacity"),
                lit: loc("u_lit"),
                light_pos: loc("u_light_pos"),
                light_color: loc("u_light_color"),
                ambient: loc("u_ambient"),
                program,
            }
        };
        let points = {
            let program = shaders::link(&gl, shaders::POINTS_VS, shaders::POINTS_FS)?;
            let loc = |name| gl.get_uniform_location(&program, name);
            PointsProgram {
                model: loc("u_model"),
                view: loc("u_view"),
                proj: loc("u_proj"),
                size: loc("u_size"),
                scale: loc("u_scale"),
                color: loc("u_color"),
                opacity: loc("u_opacity"),
                program,
            }
        };

        // transparent background, page content shows through
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.enable(GL::DEPTH_TEST);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::ONE, GL::ONE_MINUS_SRC_ALPHA);

        Ok(Self {
            width: canvas.width(),
            height: canvas.height(),
            canvas,
            gl,
            mesh,
            points,
            draws: Vec::new(),
            pixel_ratio: 1.0,
        })
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f64 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }

    /// Uploads interleaved floats; attribute 0 is always the position, attribute 1
    /// the normal when `stride` has room for one.
    fn upload_buffer(&self, data: &[f32], stride: usize, mode: u32) -> Result<GpuBuffer, SceneError> {
        let gl = &self.gl;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| SceneError::Platform("unable to create vertex array".into()))?;
        let buffer = gl
            .create_buffer()
            .ok_or_else(|| SceneError::Platform("unable to create buffer".into()))?;

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), GL::STATIC_DRAW);

        let stride_bytes = stride as i32 * FLOAT_BYTES;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, GL::FLOAT, false, stride_bytes, 0);
        if stride >= 6 {
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_with_i32(1, 3, GL::FLOAT, false, stride_bytes, 3 * FLOAT_BYTES);
        } else {
            gl.disable_vertex_attrib_array(1);
        }
        gl.bind_vertex_array(None);

        Ok(GpuBuffer {
            vao,
            _buffer: buffer,
            mode,
            count: (data.len() / stride) as i32,
        })
    }

    fn draw(&self, gpu: &GpuBuffer) {
        self.gl.bind_vertex_array(Some(&gpu.vao));
        self.gl.draw_arrays(gpu.mode, 0, gpu.count);
    }
}

fn matrix(gl: &GL, loc: &Option<WebGlUniformLocation>, m: &Mat4) {
    gl.uniform_matrix4fv_with_f32_array(loc.as_ref(), false, &m.to_cols_array());
}

fn vec3(gl: &GL, loc: &Option<WebGlUniformLocation>, v: [f32; 3]) {
    gl.uniform3f(loc.as_ref(), v[0], v[1], v[2]);
}

fn scaled(rgb: [f32; 3], k: f32) -> [f32; 3] {
    rgb.map(|c| c * k)
}

impl RenderSurface for WebGlSurface {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let (dw, dh) = self.drawing_buffer_size();
        self.canvas.set_width(dw);
        self.canvas.set_height(dh);

        let style = self.canvas.style();
        for (prop, px) in [("width", width), ("height", height)] {
            if let Err(e) = style.set_property(prop, &format!("{px}px")) {
                log::warn!("could not set canvas {prop}: {e:?}");
            }
        }
        self.gl.viewport(0, 0, dw as i32, dh as i32);
    }

    fn upload(&mut self, scene: &Scene) -> Result<(), SceneError> {
        let mut shared: HashMap<(GeometryId, bool), Rc<GpuBuffer>> = HashMap::new();
        let mut draws = Vec::with_capacity(scene.len());

        for (_, node) in scene.nodes() {
            let gpu = match &node.kind {
                NodeKind::Group => None,
                NodeKind::Mesh { geometry, material } => {
                    let wireframe = scene.material(*material).shading == Shading::Wireframe;
                    let key = (*geometry, wireframe);
                    let gpu = match shared.get(&key) {
                        Some(gpu) => gpu.clone(),
                        None => {
                            let geo = scene.geometry(*geometry);
                            let gpu = Rc::new(if wireframe {
                                self.upload_buffer(&geo.wireframe_lines(), 3, GL::LINES)?
                            } else {
                                self.upload_buffer(&geo.flat_shaded(), FLAT_STRIDE, GL::TRIANGLES)?
                            });
                            shared.insert(key, gpu.clone());
                            gpu
                        }
                    };
                    Some(gpu)
                }
                NodeKind::Points { positions, .. } => {
                    Some(Rc::new(self.upload_buffer(positions, 3, GL::POINTS)?))
                }
            };
            draws.push(gpu);
        }

        self.draws = draws;
        Ok(())
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        let gl = &self.gl;
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        let view = camera.view();
        let proj = camera.projection();
        let view_proj = proj * view;
        let (_, buffer_height) = self.drawing_buffer_size();

        let (light_pos, light_color) = scene
            .lights
            .point
            .map(|l| (l.position, scaled(l.color, l.intensity)))
            .unwrap_or((Vec3::ZERO, [0.0; 3]));
        let ambient = scene
            .lights
            .ambient
            .map(|a| scaled(a.color, a.intensity))
            .unwrap_or([0.0; 3]);

        for (id, node) in scene.nodes() {
            let Some(Some(gpu)) = self.draws.get(id.index()) else {
                continue;
            };
            let material = match &node.kind {
                NodeKind::Group => continue,
                NodeKind::Mesh { material, .. } | NodeKind::Points { material, .. } => {
                    scene.material(*material)
                }
            };
            let model = scene.world_matrix(id);
            gl.depth_mask(!material.is_transparent());

            match material.shading {
                Shading::Points { size } => {
                    let p = &self.points;
                    gl.use_program(Some(&p.program));
                    matrix(gl, &p.model, &model);
                    matrix(gl, &p.view, &view);
                    matrix(gl, &p.proj, &proj);
                    gl.uniform1f(p.size.as_ref(), size);
                    gl.uniform1f(p.scale.as_ref(), buffer_height as f32 * 0.5);
                    vec3(gl, &p.color, material.color);
                    gl.uniform1f(p.opacity.as_ref(), material.opacity);
                }
                Shading::Wireframe | Shading::Lit => {
                    let m = &self.mesh;
                    gl.use_program(Some(&m.program));
                    matrix(gl, &m.model, &model);
                    matrix(gl, &m.view_proj, &view_proj);
                    vec3(gl, &m.color, material.color);
                    gl.uniform1f(m.opacity.as_ref(), material.opacity);
                    let lit = material.shading == Shading::Lit;
                    gl.uniform1f(m.lit.as_ref(), if lit { 1.0 } else { 0.0 });
                    vec3(gl, &m.light_pos, light_pos.to_array());
                    vec3(gl, &m.light_color, light_color);
                    vec3(gl, &m.ambient, ambient);
                    if !lit {
                        gl.vertex_attrib3f(1, 0.0, 0.0, 1.0);
                    }
                }
            }
            self.draw(gpu);
        }

        gl.bind_vertex_array(None);
        gl.depth_mask(true);
    }
}
