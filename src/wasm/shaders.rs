use web_sys::{WebGl2RenderingContext as GL, WebGlProgram, WebGlShader};

use crate::error::SceneError;

pub const MESH_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
uniform mat4 u_model;
uniform mat4 u_view_proj;
out vec3 v_world;
out vec3 v_normal;
void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_view_proj * world;
}
"#;

pub const MESH_FS: &str = r#"#version 300 es
precision mediump float;
in vec3 v_world;
in vec3 v_normal;
uniform vec3 u_color;
uniform float u_opacity;
uniform float u_lit;
uniform vec3 u_light_pos;
uniform vec3 u_light_color;
uniform vec3 u_ambient;
out vec4 frag;
void main() {
    vec3 color = u_color;
    if (u_lit > 0.5) {
        vec3 n = normalize(v_normal);
        vec3 l = normalize(u_light_pos - v_world);
        color *= u_ambient + u_light_color * max(dot(n, l), 0.0);
    }
    // the context expects premultiplied alpha
    frag = vec4(color * u_opacity, u_opacity);
}
"#;

pub const POINTS_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_proj;
uniform float u_size;
uniform float u_scale;
void main() {
    vec4 mv = u_view * u_model * vec4(a_position, 1.0);
    gl_PointSize = max(u_size * u_scale / -mv.z, 1.0);
    gl_Position = u_proj * mv;
}
"#;

pub const POINTS_FS: &str = r#"#version 300 es
precision mediump float;
uniform vec3 u_color;
uniform float u_opacity;
out vec4 frag;
void main() {
    if (length(gl_PointCoord - vec2(0.5)) > 0.5) {
        discard;
    }
    frag = vec4(u_color * u_opacity, u_opacity);
}
"#;

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, SceneError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| SceneError::Shader("unable to create shader object".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(SceneError::Shader(log))
    }
}

pub fn link(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram, SceneError> {
    let vs = compile(gl, GL::VERTEX_SHADER, vertex)?;
    let fs = compile(gl, GL::FRAGMENT_SHADER, fragment)?;
    let program = gl
        .create_program()
        .ok_or_else(|| SceneError::Link("unable to create program object".into()))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(SceneError::Link(log))
    }
}
