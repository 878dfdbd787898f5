//! The lit, dual-textured shader program.

use std::ffi::CStr;

use crate::factory::Factory;
use crate::gl::Context;
use crate::mesh::AttributeLocations;
use crate::program::{self, Program};
use crate::Error;

/// Per-vertex Blinn-Phong lighting in eye space.
pub const VERTEX_SOURCE: &str = "\
uniform mat4 u_projection;
uniform mat4 u_model_view;
uniform mat3 u_normal_matrix;
uniform vec3 u_light_position;
uniform vec4 u_ambient;
uniform vec4 u_diffuse;
uniform vec4 u_specular;
uniform float u_shininess;

attribute vec4 a_position;
attribute vec3 a_normal;
attribute vec2 a_texcoord;

varying vec4 v_color;
varying vec2 v_texcoord;

void main() {
    vec3 n = normalize(u_normal_matrix * a_normal);
    vec3 l = normalize(u_light_position);
    vec3 h = normalize(l + vec3(0.0, 0.0, 1.0));
    float df = max(0.0, dot(n, l));
    float sf = pow(max(0.0, dot(n, h)), u_shininess);
    v_color = u_ambient + df * u_diffuse + sf * u_specular;
    v_texcoord = a_texcoord;
    gl_Position = u_projection * u_model_view * a_position;
}
";

/// Blends the second texture over the first by its alpha.
pub const FRAGMENT_SOURCE: &str = "\
precision mediump float;

uniform sampler2D u_sampler0;
uniform sampler2D u_sampler1;

varying vec4 v_color;
varying vec2 v_texcoord;

void main() {
    vec4 base = texture2D(u_sampler0, v_texcoord);
    vec4 detail = texture2D(u_sampler1, v_texcoord);
    gl_FragColor = v_color * vec4(mix(base.rgb, detail.rgb, detail.a), 1.0);
}
";

/// Every attribute and uniform location of the program, resolved once
/// after linking.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Locations {
    pub attributes: AttributeLocations,
    pub projection: u32,
    pub model_view: u32,
    pub normal_matrix: u32,
    pub light_position: u32,
    pub ambient: u32,
    pub diffuse: u32,
    pub specular: u32,
    pub shininess: u32,
    pub samplers: [u32; program::MAX_SAMPLERS],
}

impl Locations {
    /// Query every location, failing on the first inactive one.
    pub fn resolve<C: Context>(factory: &Factory<C>, program: &Program) -> Result<Self, Error> {
        let attribute = |name: &'static CStr| {
            factory
                .query_attrib_location(program, name)
                .ok_or_else(|| missing(name))
        };
        let uniform = |name: &'static CStr| {
            factory
                .query_uniform_location(program, name)
                .ok_or_else(|| missing(name))
        };
        Ok(Self {
            attributes: AttributeLocations {
                position: attribute(c"a_position")?,
                normal: attribute(c"a_normal")?,
                texcoord: attribute(c"a_texcoord")?,
            },
            projection: uniform(c"u_projection")?,
            model_view: uniform(c"u_model_view")?,
            normal_matrix: uniform(c"u_normal_matrix")?,
            light_position: uniform(c"u_light_position")?,
            ambient: uniform(c"u_ambient")?,
            diffuse: uniform(c"u_diffuse")?,
            specular: uniform(c"u_specular")?,
            shininess: uniform(c"u_shininess")?,
            samplers: [uniform(c"u_sampler0")?, uniform(c"u_sampler1")?],
        })
    }
}

fn missing(name: &'static CStr) -> Error {
    // The names above are all ASCII.
    Error::MissingLocation(name.to_str().unwrap_or("?"))
}

/// Compile and link the program.
///
/// Shader objects are released as soon as linking finishes.
pub fn build<C: Context>(factory: &Factory<C>) -> Result<(Program, Locations), Error> {
    let vertex = factory.shader(program::Kind::Vertex, VERTEX_SOURCE)?;
    let fragment = factory.shader(program::Kind::Fragment, FRAGMENT_SOURCE)?;
    let program = factory.program(&vertex, &fragment)?;
    let locations = Locations::resolve(factory, &program)?;
    Ok((program, locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl;
    use crate::record::{Call, Failure, Recorder};

    #[test]
    fn sources_declare_every_location() {
        for name in [
            "a_position",
            "a_normal",
            "a_texcoord",
            "u_projection",
            "u_model_view",
            "u_normal_matrix",
            "u_light_position",
            "u_ambient",
            "u_diffuse",
            "u_specular",
            "u_shininess",
        ] {
            assert!(VERTEX_SOURCE.contains(name), "{}", name);
        }
        assert!(FRAGMENT_SOURCE.contains("u_sampler0"));
        assert!(FRAGMENT_SOURCE.contains("u_sampler1"));
    }

    #[test]
    fn locations_are_looked_up_once() {
        let recorder = Recorder::new();
        let factory = Factory::new(recorder.clone());
        let (_program, locations) = build(&factory).unwrap();

        let lookups = recorder
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::GetAttribLocation(_) | Call::GetUniformLocation(_)))
            .count();
        assert_eq!(lookups, 13);
        assert_ne!(locations.samplers[0], locations.samplers[1]);
    }

    #[test]
    fn inactive_uniform_is_reported_by_name() {
        let recorder = Recorder::new();
        recorder.fail(Failure::Location("u_shininess"));
        let factory = Factory::new(recorder);
        let result = build(&factory);
        assert!(matches!(result, Err(Error::MissingLocation("u_shininess"))));
    }

    #[test]
    fn compile_failure_carries_the_stage() {
        let recorder = Recorder::new();
        recorder.fail(Failure::Compile(gl::FRAGMENT_SHADER));
        let factory = Factory::new(recorder.clone());
        match build(&factory) {
            Err(Error::Compile { kind, .. }) => assert_eq!(kind, program::Kind::Fragment),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }

        // Both shader objects are deleted once collected.
        assert_eq!(factory.collect_garbage(), 2);
        let deleted = recorder
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::DeleteShader(_)))
            .count();
        assert_eq!(deleted, 2);
    }

    #[test]
    fn link_failure_deletes_program_and_objects() {
        let recorder = Recorder::new();
        recorder.fail(Failure::Link);
        let factory = Factory::new(recorder.clone());
        assert!(matches!(build(&factory), Err(Error::Link(_))));
        assert_eq!(factory.collect_garbage(), 3);
        assert!(recorder.calls().iter().any(|call| matches!(call, Call::DeleteProgram(_))));
    }
}
