use std::collections::{BTreeSet, HashMap};

use gles_surface::record::{Call, Failure};
use gles_surface::{gl, Config, Error, Filter, Layer, Lighting, Recorder, Shape, Surface, Wrap};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn surface(width: u32, height: u32) -> (Recorder, Surface<Recorder, Layer>) {
    init_logging();
    let recorder = Recorder::new();
    let layer = recorder.layer(width, height);
    let surface = Surface::new(recorder.clone(), layer, Config::default()).unwrap();
    (recorder, surface)
}

/// Names created but never deleted.
fn leaked(calls: &[Call]) -> Vec<u32> {
    let mut live = BTreeSet::new();
    for call in calls {
        match *call {
            Call::GenBuffer(id)
            | Call::GenRenderbuffer(id)
            | Call::GenFramebuffer(id)
            | Call::GenTexture(id)
            | Call::CreateProgram(id)
            | Call::CreateShader { id, .. } => {
                live.insert(id);
            }
            Call::DeleteBuffer(id)
            | Call::DeleteRenderbuffer(id)
            | Call::DeleteFramebuffer(id)
            | Call::DeleteTexture(id)
            | Call::DeleteProgram(id)
            | Call::DeleteShader(id) => {
                assert!(live.remove(&id), "{} deleted twice or never created", id);
            }
            _ => {}
        }
    }
    live.into_iter().collect()
}

fn position(calls: &[Call], predicate: impl Fn(&Call) -> bool) -> usize {
    calls
        .iter()
        .position(predicate)
        .unwrap_or_else(|| panic!("call not found in {:#?}", calls))
}

fn draws(calls: &[Call]) -> Vec<(u32, usize)> {
    calls
        .iter()
        .filter_map(|call| match *call {
            Call::DrawElements { mode, count, .. } => Some((mode, count)),
            _ => None,
        })
        .collect()
}

/// Locations handed out by the recorder, by name.
fn resolved(calls: &[Call]) -> HashMap<String, u32> {
    let mut locations = HashMap::new();
    for call in calls {
        if let Call::GetAttribLocation(name) | Call::GetUniformLocation(name) = call {
            let next = locations.len() as u32;
            locations.entry(name.clone()).or_insert(next);
        }
    }
    locations
}

/// Lighting uniform writes of one frame, between the program bind and
/// the first texture unit.
fn lighting_writes(calls: &[Call]) -> Vec<Call> {
    let start = position(calls, |call| matches!(call, Call::UseProgram(_)));
    let end = position(calls, |call| *call == Call::ActiveTexture(0));
    calls[start..end]
        .iter()
        .filter(|call| {
            matches!(call, Call::Uniform3f { .. } | Call::Uniform4f { .. } | Call::Uniform1f { .. })
        })
        .cloned()
        .collect()
}

fn tex_parameters(calls: &[Call], param: u32) -> Vec<u32> {
    calls
        .iter()
        .filter_map(|call| match *call {
            Call::TexParameteri { param: p, value, .. } if p == param => Some(value),
            _ => None,
        })
        .collect()
}

#[test]
fn setup_allocates_targets_at_layer_size() {
    let (recorder, surface) = surface(320, 480);
    let calls = recorder.calls();

    assert!(surface.is_ready());
    assert_eq!(surface.framebuffer().unwrap().dimensions(), (320, 480));
    assert!(calls.contains(&Call::ColorStorage { width: 320, height: 480 }));
    assert!(calls.contains(&Call::RenderbufferStorage {
        format: gl::DEPTH_COMPONENT16,
        width: 320,
        height: 480,
    }));

    // Depth, then color, then the framebuffer, then the shader.
    let depth = position(&calls, |call| matches!(call, Call::RenderbufferStorage { .. }));
    let color = position(&calls, |call| matches!(call, Call::ColorStorage { .. }));
    let framebuffer = position(&calls, |call| matches!(call, Call::CheckFramebufferStatus));
    let shader = position(&calls, |call| matches!(call, Call::CreateShader { .. }));
    assert!(depth < color && color < framebuffer && framebuffer < shader);

    for shape in Shape::ALL {
        let mesh = surface.mesh(shape);
        assert!(!mesh.is_released());
        assert_eq!(mesh.vertex_size(), 32);
    }
}

#[test]
fn frame_issues_calls_in_order() {
    let (recorder, mut surface) = surface(320, 480);
    recorder.take();
    surface.render();
    let calls = recorder.take();

    let clears: Vec<_> = calls.iter().filter(|call| matches!(call, Call::Clear(_))).collect();
    assert_eq!(clears, vec![&Call::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT)]);
    assert!(calls.contains(&Call::ClearColor([0.0, 0.5, 0.5, 1.0])));
    assert!(calls.contains(&Call::Viewport { x: 0, y: 0, w: 320, h: 480 }));

    let program = surface.program().unwrap().id();
    let uses: Vec<_> = calls.iter().filter(|call| matches!(call, Call::UseProgram(_))).collect();
    assert_eq!(uses, vec![&Call::UseProgram(program)]);

    let clear = position(&calls, |call| matches!(call, Call::Clear(_)));
    let use_program = position(&calls, |call| matches!(call, Call::UseProgram(_)));
    let projection = position(&calls, |call| matches!(call, Call::UniformMatrix4f { .. }));
    let unit0 = position(&calls, |call| *call == Call::ActiveTexture(0));
    let unit1 = position(&calls, |call| *call == Call::ActiveTexture(1));
    let lines = position(&calls, |call| matches!(call, Call::DrawElements { mode, .. } if *mode == gl::LINES));
    let triangles = position(&calls, |call| {
        matches!(call, Call::DrawElements { mode, .. } if *mode == gl::TRIANGLES)
    });
    let present = position(&calls, |call| *call == Call::Present);
    assert!(clear < use_program);
    assert!(use_program < projection);
    assert!(projection < unit0 && unit0 < unit1);
    assert!(unit1 < lines && lines < triangles);
    assert!(triangles < present);
    assert_eq!(present, calls.len() - 1);

    let color = surface.framebuffer().unwrap().color().id();
    assert_eq!(calls[present - 1], Call::BindRenderbuffer(color));

    let textures = surface.textures().unwrap();
    assert_eq!(calls[unit0 + 1], Call::BindTexture { target: gl::TEXTURE_2D, id: textures[0].id() });
    assert_eq!(calls[unit1 + 1], Call::BindTexture { target: gl::TEXTURE_2D, id: textures[1].id() });

    let samplers: Vec<_> = calls
        .iter()
        .filter_map(|call| match *call {
            Call::Uniform1i { value, .. } => Some(value),
            _ => None,
        })
        .collect();
    assert_eq!(samplers, vec![0, 1]);

    let strides: Vec<_> = calls
        .iter()
        .filter_map(|call| match *call {
            Call::VertexAttribPointer { stride, offset, .. } => Some((stride, offset)),
            _ => None,
        })
        .collect();
    assert_eq!(strides, vec![(32, 0), (32, 12), (32, 24)]);
}

#[test]
fn setup_deletes_linked_shader_objects() {
    let (recorder, mut surface) = surface(320, 480);
    let deleted = recorder
        .calls()
        .iter()
        .filter(|call| matches!(call, Call::DeleteShader(_)))
        .count();
    assert_eq!(deleted, 2);

    recorder.take();
    surface.render();
    let calls = recorder.take();
    assert_eq!(calls[0], Call::Viewport { x: 0, y: 0, w: 320, h: 480 });
    assert!(!calls.iter().any(|call| {
        matches!(
            call,
            Call::DeleteShader(_) | Call::DeleteProgram(_) | Call::DeleteBuffer(_) | Call::DeleteTexture(_)
        )
    }));
}

#[test]
fn frame_writes_lighting_to_resolved_locations() {
    let (recorder, mut surface) = surface(320, 480);
    let locations = resolved(&recorder.calls());
    let lighting = Lighting::default();
    assert_eq!(surface.lighting(), &lighting);

    recorder.take();
    surface.render();
    let calls = recorder.take();
    assert_eq!(
        lighting_writes(&calls),
        vec![
            Call::Uniform3f { location: locations["u_light_position"], value: lighting.position },
            Call::Uniform4f { location: locations["u_ambient"], value: lighting.ambient },
            Call::Uniform4f { location: locations["u_diffuse"], value: lighting.diffuse },
            Call::Uniform4f { location: locations["u_specular"], value: lighting.specular },
            Call::Uniform1f { location: locations["u_shininess"], value: lighting.shininess },
        ],
    );

    // The default model-view is a pure translation, so the normal matrix
    // is the identity.
    let use_program = position(&calls, |call| matches!(call, Call::UseProgram(_)));
    let normal = position(&calls, |call| matches!(call, Call::UniformMatrix3f { .. }));
    assert!(use_program < normal);
    assert_eq!(
        calls[normal],
        Call::UniformMatrix3f {
            location: locations["u_normal_matrix"],
            value: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        },
    );
}

#[test]
fn lighting_changes_apply_from_the_next_frame() {
    let (recorder, mut surface) = surface(320, 480);
    let lighting = Lighting {
        position: [0.0, 0.0, 1.0],
        ambient: [0.2, 0.1, 0.0, 1.0],
        diffuse: [0.5, 0.5, 0.5, 1.0],
        specular: [1.0, 1.0, 1.0, 1.0],
        shininess: 32.0,
    };
    surface.set_lighting(lighting);
    assert_eq!(surface.lighting(), &lighting);
    assert!(recorder.take().is_empty());

    surface.render();
    let writes = lighting_writes(&recorder.take());
    assert_eq!(writes.len(), 5);
    assert!(matches!(writes[0], Call::Uniform3f { value, .. } if value == [0.0, 0.0, 1.0]));
    assert!(matches!(writes[1], Call::Uniform4f { value, .. } if value == [0.2, 0.1, 0.0, 1.0]));
    assert!(matches!(writes[4], Call::Uniform1f { value, .. } if value == 32.0));
}

#[test]
fn non_power_of_two_textures_clamp() {
    init_logging();
    let recorder = Recorder::new();
    let config = Config {
        textures: [image::RgbaImage::new(100, 60), image::RgbaImage::new(100, 60)],
        ..Config::default()
    };
    let mut surface = Surface::new(recorder.clone(), recorder.layer(320, 480), config).unwrap();
    assert!(!recorder.calls().iter().any(|call| matches!(call, Call::GenerateMipmap(_))));
    assert!(surface.textures().unwrap().iter().all(|texture| !texture.power_of_two()));

    for wrap in [Wrap::Repeat, Wrap::MirroredRepeat] {
        surface.set_wrap_mode(wrap);
        recorder.take();
        surface.render();
        let calls = recorder.take();
        assert_eq!(tex_parameters(&calls, gl::TEXTURE_WRAP_S), vec![gl::CLAMP_TO_EDGE; 2]);
        assert_eq!(tex_parameters(&calls, gl::TEXTURE_WRAP_T), vec![gl::CLAMP_TO_EDGE; 2]);
    }
}

#[test]
fn each_shape_draws_its_own_buffers() {
    let (recorder, mut surface) = surface(320, 480);
    for shape in Shape::ALL {
        surface.set_current_surface(shape);
        assert_eq!(surface.current_surface(), shape);
        recorder.take();
        surface.render();
        let calls = recorder.take();

        let mesh = surface.mesh(shape);
        assert!(calls.contains(&Call::BindBuffer { target: gl::ARRAY_BUFFER, id: mesh.vertex_buffer() }));
        let indices: Vec<_> = calls
            .iter()
            .filter_map(|call| match *call {
                Call::BindBuffer { target, id } if target == gl::ELEMENT_ARRAY_BUFFER => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![mesh.line_index_buffer(), mesh.triangle_index_buffer()]);
        assert_eq!(
            draws(&calls),
            vec![
                (gl::LINES, mesh.line_index_count()),
                (gl::TRIANGLES, mesh.triangle_index_count()),
            ],
        );
    }

    let names: BTreeSet<_> = Shape::ALL.iter().map(|&shape| surface.mesh(shape).vertex_buffer()).collect();
    assert_eq!(names.len(), Shape::ALL.len());
}

#[test]
fn texture_index_picks_unit_zero() {
    let (recorder, mut surface) = surface(320, 480);
    let textures: Vec<_> = surface.textures().unwrap().iter().map(|texture| texture.id()).collect();

    surface.set_texture_index(1);
    recorder.take();
    surface.render();
    let calls = recorder.take();
    let unit0 = position(&calls, |call| *call == Call::ActiveTexture(0));
    let unit1 = position(&calls, |call| *call == Call::ActiveTexture(1));
    assert_eq!(calls[unit0 + 1], Call::BindTexture { target: gl::TEXTURE_2D, id: textures[1] });
    assert_eq!(calls[unit1 + 1], Call::BindTexture { target: gl::TEXTURE_2D, id: textures[0] });

    // Out of range indices wrap around.
    surface.set_texture_index(2);
    surface.render();
    let calls = recorder.take();
    let unit0 = position(&calls, |call| *call == Call::ActiveTexture(0));
    assert_eq!(calls[unit0 + 1], Call::BindTexture { target: gl::TEXTURE_2D, id: textures[0] });
}

#[test]
fn sampling_modes_apply_from_the_next_frame() {
    let (recorder, mut surface) = surface(320, 480);
    recorder.take();
    surface.render();
    let calls = recorder.take();
    assert_eq!(tex_parameters(&calls, gl::TEXTURE_WRAP_S), vec![gl::REPEAT, gl::REPEAT]);
    assert_eq!(tex_parameters(&calls, gl::TEXTURE_MAG_FILTER), vec![gl::LINEAR, gl::LINEAR]);

    surface.set_wrap_mode(Wrap::ClampToEdge);
    surface.set_filter_mode(Filter::Nearest);
    assert_eq!(surface.wrap_mode(), Wrap::ClampToEdge);
    assert_eq!(surface.filter_mode(), Filter::Nearest);
    assert!(recorder.calls().is_empty());

    surface.render();
    let calls = recorder.take();
    assert_eq!(tex_parameters(&calls, gl::TEXTURE_WRAP_S), vec![gl::CLAMP_TO_EDGE; 2]);
    assert_eq!(tex_parameters(&calls, gl::TEXTURE_WRAP_T), vec![gl::CLAMP_TO_EDGE; 2]);
    assert_eq!(tex_parameters(&calls, gl::TEXTURE_MIN_FILTER), vec![gl::NEAREST; 2]);
    assert_eq!(tex_parameters(&calls, gl::TEXTURE_MAG_FILTER), vec![gl::NEAREST; 2]);
}

#[test]
fn matrices_are_uploaded_column_major() {
    let (recorder, mut surface) = surface(320, 480);
    let model_view = cgmath::Matrix4::from_translation(cgmath::Vector3::new(1.0, 2.0, 3.0));
    surface.set_model_view(model_view);
    assert_eq!(surface.model_view(), model_view);
    recorder.take();
    surface.render();

    let matrices: Vec<_> = recorder
        .take()
        .into_iter()
        .filter_map(|call| match call {
            Call::UniformMatrix4f { value, .. } => Some(value),
            _ => None,
        })
        .collect();
    assert_eq!(matrices.len(), 2);
    assert_eq!(&matrices[1][12..15], &[1.0, 2.0, 3.0]);
}

#[test]
fn cleanup_deletes_everything_once() {
    let (recorder, mut surface) = surface(320, 480);
    surface.render();
    surface.cleanup();

    assert!(!surface.is_ready());
    assert!(surface.framebuffer().is_none());
    assert!(surface.program().is_none());
    for shape in Shape::ALL {
        let mesh = surface.mesh(shape);
        assert!(mesh.is_released());
        assert_eq!(mesh.vertex_buffer(), 0);
        assert_eq!(mesh.line_index_buffer(), 0);
        assert_eq!(mesh.triangle_index_buffer(), 0);
    }
    assert_eq!(leaked(&recorder.calls()), Vec::<u32>::new());

    recorder.take();
    surface.cleanup();
    assert!(recorder.calls().is_empty());

    surface.render();
    assert!(recorder.calls().is_empty());
}

#[test]
fn drop_cleans_up() {
    let (recorder, surface) = surface(320, 480);
    drop(surface);
    assert_eq!(leaked(&recorder.calls()), Vec::<u32>::new());
}

#[test]
fn resize_replaces_only_the_targets() {
    let (recorder, mut surface) = surface(320, 480);
    let program = surface.program().unwrap().id();
    let meshes: Vec<_> = Shape::ALL.iter().map(|&shape| surface.mesh(shape).vertex_buffer()).collect();
    let old = surface.framebuffer().unwrap().id();
    let old_color = surface.framebuffer().unwrap().color().id();
    let old_depth = surface.framebuffer().unwrap().depth().id();

    // Same aspect ratio, same projection.
    let before = surface.projection();
    surface.drawable().set_dimensions(640, 960);
    recorder.take();
    surface.resize().unwrap();
    let calls = recorder.take();

    assert!(calls.contains(&Call::DeleteFramebuffer(old)));
    assert!(calls.contains(&Call::DeleteRenderbuffer(old_color)));
    assert!(calls.contains(&Call::DeleteRenderbuffer(old_depth)));
    assert!(calls.contains(&Call::ColorStorage { width: 640, height: 960 }));
    assert!(!calls.iter().any(|call| matches!(call, Call::CreateProgram(_) | Call::GenBuffer(_))));

    let framebuffer = surface.framebuffer().unwrap();
    assert_eq!(framebuffer.dimensions(), (640, 960));
    assert_eq!(framebuffer.color().dimensions(), (640, 960));
    assert_eq!(framebuffer.depth().dimensions(), (640, 960));
    assert_eq!(surface.program().unwrap().id(), program);
    let after: Vec<_> = Shape::ALL.iter().map(|&shape| surface.mesh(shape).vertex_buffer()).collect();
    assert_eq!(after, meshes);

    surface.render();
    assert!(recorder.take().contains(&Call::Viewport { x: 0, y: 0, w: 640, h: 960 }));
    assert_eq!(surface.projection(), before);

    // Same size again: nothing to do.
    surface.resize().unwrap();
    assert!(recorder.calls().is_empty());
}

#[test]
fn resize_follows_the_new_aspect_ratio() {
    let (_recorder, mut surface) = surface(320, 480);
    let before = surface.projection();
    assert!((before.y.y / before.x.x - 320.0 / 480.0).abs() < 1e-5);

    surface.drawable().set_dimensions(640, 320);
    surface.resize().unwrap();
    let after = surface.projection();
    assert_ne!(after, before);
    assert!((after.y.y / after.x.x - 2.0).abs() < 1e-5);
    assert!((after.y.y - before.y.y).abs() < 1e-6);
}

#[test]
fn failed_resize_cleans_up() {
    let (recorder, mut surface) = surface(320, 480);
    recorder.fail(Failure::Storage);
    surface.drawable().set_dimensions(100, 100);
    assert!(matches!(surface.resize(), Err(Error::Storage(_))));
    assert!(!surface.is_ready());
    assert_eq!(leaked(&recorder.calls()), Vec::<u32>::new());
}

#[test]
fn setup_failures_leave_nothing_behind() {
    init_logging();
    let failures = [
        Failure::Storage,
        Failure::Framebuffer,
        Failure::Compile(gl::VERTEX_SHADER),
        Failure::Compile(gl::FRAGMENT_SHADER),
        Failure::Link,
        Failure::Location("u_sampler1"),
    ];
    for failure in failures {
        let recorder = Recorder::new();
        recorder.fail(failure);
        let layer = recorder.layer(320, 480);
        let result = Surface::new(recorder.clone(), layer, Config::default());
        let error = match result {
            Ok(_) => panic!("{:?} did not fail setup", failure),
            Err(error) => error,
        };
        match failure {
            Failure::Storage => assert!(matches!(error, Error::Storage(_))),
            Failure::Framebuffer => assert!(matches!(error, Error::IncompleteFramebuffer(_))),
            Failure::Compile(_) => assert!(matches!(error, Error::Compile { .. })),
            Failure::Link => assert!(matches!(error, Error::Link(_))),
            Failure::Location(name) => assert!(matches!(error, Error::MissingLocation(n) if n == name)),
        }
        assert_eq!(leaked(&recorder.calls()), Vec::<u32>::new(), "{:?}", failure);
        assert!(!recorder.calls().contains(&Call::Present));
    }
}
