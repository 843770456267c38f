use std::sync::Arc;
use std::thread;

use glam::{Mat4, Vec3};
use rstest::rstest;

use tessera_engine::attribute::{builtin, UniformValue};
use tessera_engine::backend::recording::{GpuCommand, RecordingBackend};
use tessera_engine::backend::BackendError;
use tessera_engine::camera::{screen_ortho, Camera};
use tessera_engine::render::{ForwardRenderer, Pass, PassState, RendererConfig, View, ViewKind, Viewport};
use tessera_engine::scene::{Geometry, Light, Material, Mesh, MeshFlags, Scene};
use tessera_engine::shader::PrimitiveMode;
use tessera_engine::{ConfigError, RenderError};

// ── fixtures ──────────────────────────────────────────────────────────────

const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

fn scene() -> Arc<Scene> {
    Arc::new(Scene::new(Camera::default()))
}

fn view(scene: &Scene) -> View {
    View::new(VIEWPORT, Arc::clone(scene.camera()))
}

fn triangle() -> Geometry {
    Geometry::triangles(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
}

fn flat_mesh(name: &str, pass: Pass) -> Arc<Mesh> {
    Arc::new(Mesh::new(name, Material::flat([1.0, 0.5, 0.0, 1.0]), triangle(), pass))
}

fn setup(meshes: &[Arc<Mesh>]) -> (Arc<Scene>, ForwardRenderer, RecordingBackend) {
    let scene = scene();
    for mesh in meshes {
        assert!(scene.add_mesh(Arc::clone(mesh)));
    }
    let renderer = ForwardRenderer::new(Arc::clone(&scene), RendererConfig::default());
    (scene, renderer, RecordingBackend::new())
}

fn uploads(gpu: &RecordingBackend) -> usize {
    gpu.commands()
        .iter()
        .filter(|c| matches!(c, GpuCommand::UploadVertexData { .. }))
        .count()
}

// ── pass orchestration ────────────────────────────────────────────────────

#[test]
fn passes_run_in_fixed_order() {
    let (scene, mut renderer, mut gpu) = setup(&[]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    assert_eq!(gpu.passes(), Pass::ALL.to_vec());
    assert_eq!(gpu.commands().last(), Some(&GpuCommand::RestoreDefaults));
}

#[test]
fn meshes_draw_only_in_their_pass() {
    let meshes = [
        flat_mesh("overlay", Pass::Overlay),
        flat_mesh("solid", Pass::Depth),
        flat_mesh("glass", Pass::Transparency),
        flat_mesh("hud", Pass::ScreenSpaceOverlay),
    ];
    let (scene, mut renderer, mut gpu) = setup(&meshes);
    let stats = renderer.render(&mut gpu, &view(&scene)).unwrap();

    let passes: Vec<_> = gpu.draw_calls().iter().map(|d| d.pass).collect();
    assert_eq!(
        passes,
        vec![
            Some(Pass::Depth),
            Some(Pass::Transparency),
            Some(Pass::Overlay),
            Some(Pass::ScreenSpaceOverlay)
        ]
    );
    assert_eq!(stats.total_draw_calls(), 4);
    assert_eq!(stats.draw_calls_in(Pass::DeviceSpaceOverlay), 0);
    assert_eq!(stats.vertices, 12);
}

#[test]
fn pass_states_follow_the_table() {
    let (scene, mut renderer, mut gpu) = setup(&[]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    let states: Vec<PassState> = gpu
        .commands()
        .iter()
        .filter_map(|c| match c {
            GpuCommand::ApplyPassState { state, .. } => Some(*state),
            _ => None,
        })
        .collect();

    assert!(states[0].depth_test && states[0].depth_write && !states[0].blend);
    assert!(states[0].polygon_offset.is_some());
    assert!(states[1].depth_test && !states[1].depth_write && states[1].blend);
    for state in &states[2..] {
        assert!(!state.depth_test && !state.depth_write && state.blend);
    }
}

#[test]
fn identical_frames_issue_identical_draws() {
    let colored_lines = Geometry::lines(vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0])
        .with_attribute(builtin::COLOR_ARRAY, 4, vec![1.0; 8]);
    let lit = triangle().with_attribute(builtin::NORMAL_ARRAY, 3, [0.0, 0.0, 1.0].repeat(3));
    let meshes = [
        flat_mesh("solid", Pass::Depth),
        Arc::new(Mesh::new("axis", Material::vertex_colored(), colored_lines, Pass::Overlay)),
        Arc::new(Mesh::new("glass", Material::shaded([0.2, 0.4, 0.8, 0.5]), lit, Pass::Transparency)),
        flat_mesh("hud", Pass::ScreenSpaceOverlay),
    ];
    let (scene, mut renderer, mut gpu) = setup(&meshes);
    let first_stats = renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(first_stats.rebuilt, 4);
    let first = gpu.draw_calls();
    assert_eq!(first.len(), 4);

    gpu.clear_log();
    let second_stats = renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(second_stats.rebuilt, 0);
    assert_eq!(uploads(&gpu), 0);
    assert_eq!(gpu.draw_calls(), first);
    assert_eq!(second_stats.draw_calls, first_stats.draw_calls);
}

#[test]
fn empty_viewport_renders_nothing() {
    let (scene, mut renderer, mut gpu) = setup(&[flat_mesh("a", Pass::Depth)]);
    let view = View::new(Viewport::new(0.0, 600.0), Arc::clone(scene.camera()));
    let stats = renderer.render(&mut gpu, &view).unwrap();

    assert_eq!(stats.total_draw_calls(), 0);
    assert!(gpu.commands().is_empty());
}

// ── projection spaces ─────────────────────────────────────────────────────

#[test]
fn overlays_use_identity_and_screen_projections() {
    let meshes = [
        flat_mesh("world", Pass::Depth),
        flat_mesh("device", Pass::DeviceSpaceOverlay),
        flat_mesh("screen", Pass::ScreenSpaceOverlay),
    ];
    let (scene, mut renderer, mut gpu) = setup(&meshes);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    let projections: Vec<Mat4> = gpu
        .uniform_values(&builtin::PROJ_MATRIX)
        .into_iter()
        .filter_map(UniformValue::as_mat4)
        .collect();
    assert_eq!(projections.len(), 3);

    let camera = scene.camera().matrices(VIEWPORT.aspect());
    assert_eq!(projections[0], camera.proj);
    assert_eq!(projections[1], Mat4::IDENTITY);
    assert_eq!(projections[2], screen_ortho(VIEWPORT.width, VIEWPORT.height));

    let views: Vec<Mat4> = gpu
        .uniform_values(&builtin::VIEW_MATRIX)
        .into_iter()
        .filter_map(UniformValue::as_mat4)
        .collect();
    assert_eq!(views[0], camera.view);
    assert_eq!(views[1], Mat4::IDENTITY);
    assert_eq!(views[2], Mat4::IDENTITY);
}

#[test]
fn camera_override_replaces_orbit_matrices() {
    let (scene, mut renderer, mut gpu) = setup(&[flat_mesh("world", Pass::Depth)]);
    let proj = Mat4::from_scale(Vec3::splat(2.0));
    scene.camera().set_override(Some(tessera_engine::camera::CameraMatrices {
        view: Mat4::IDENTITY,
        proj,
    }));
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    assert_eq!(
        gpu.uniform_values(&builtin::PROJ_MATRIX),
        vec![&UniformValue::Mat4(proj)]
    );
}

// ── configuration errors ──────────────────────────────────────────────────

#[test]
fn missing_vertex_array_fails_without_upload() {
    // Vertex colors required but absent.
    let mesh = Arc::new(Mesh::new(
        "uncolored",
        Material::vertex_colored(),
        triangle(),
        Pass::Depth,
    ));
    let (scene, mut renderer, mut gpu) = setup(&[mesh]);
    let err = renderer.render(&mut gpu, &view(&scene)).unwrap_err();

    assert!(matches!(
        err,
        RenderError::Config(ConfigError::MissingAttribute { ref attribute, .. }) if *attribute == builtin::COLOR_ARRAY
    ));
    assert_eq!(uploads(&gpu), 0);
    assert_eq!(gpu.live_buffers(), 0);
}

#[test]
fn mismatched_attribute_lengths_fail() {
    let geometry = triangle().with_attribute(builtin::COLOR_ARRAY, 4, vec![1.0; 8]);
    let mesh = Arc::new(Mesh::new("short", Material::vertex_colored(), geometry, Pass::Depth));
    let (scene, mut renderer, mut gpu) = setup(&[mesh]);

    assert!(matches!(
        renderer.render(&mut gpu, &view(&scene)),
        Err(RenderError::Config(ConfigError::AttributeLengthMismatch { .. }))
    ));
}

#[rstest]
#[case(Mat4::IDENTITY)]
#[case(Mat4::from_translation(Vec3::X))]
fn ragged_normals_fail_under_any_transform(#[case] transform: Mat4) {
    let geometry = triangle().with_attribute(builtin::NORMAL_ARRAY, 3, vec![0.0; 10]);
    let mesh = Arc::new(
        Mesh::new("ragged", Material::shaded([1.0; 4]), geometry, Pass::Depth).with_transform(transform),
    );
    let (scene, mut renderer, mut gpu) = setup(&[mesh]);
    scene
        .lights()
        .add(Light::directional(Vec3::new(0.0, 0.0, -1.0), [0.1; 3], [1.0; 3]));

    let err = renderer.render(&mut gpu, &view(&scene)).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Config(ConfigError::RaggedAttribute { ref attribute, len: 10, components: 3 })
            if *attribute == builtin::NORMAL_ARRAY
    ));
    assert_eq!(uploads(&gpu), 0);
    assert!(gpu.draw_calls().is_empty());
}

#[test]
fn failed_sync_keeps_existing_renderables() {
    let (scene, mut renderer, mut gpu) = setup(&[flat_mesh("solid", Pass::Depth)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(gpu.live_buffers(), 1);

    let bad = Arc::new(Mesh::new("uncolored", Material::vertex_colored(), triangle(), Pass::Overlay));
    scene.add_mesh(flat_mesh("late", Pass::Overlay));
    scene.add_mesh(Arc::clone(&bad));
    assert!(renderer.render(&mut gpu, &view(&scene)).is_err());
    assert_eq!(renderer.renderables().len(), 1);
    assert_eq!(gpu.live_buffers(), 1);

    scene.remove_mesh(bad.id());
    let stats = renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(stats.rebuilt, 1);
    assert_eq!(stats.total_draw_calls(), 2);
    assert_eq!(gpu.live_buffers(), 2);
}

#[test]
fn compile_failure_is_fatal() {
    let (scene, mut renderer, mut gpu) = setup(&[flat_mesh("a", Pass::Depth)]);
    gpu.fail_compilation("flat_color_triangles");

    let err = renderer.render(&mut gpu, &view(&scene)).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Backend(BackendError::ProgramCompilation { .. })
    ));
    assert!(gpu.draw_calls().is_empty());
}

// ── view kinds ────────────────────────────────────────────────────────────

#[rstest]
#[case(ViewKind::Interactive, 2, 0)]
#[case(ViewKind::RenderOnly, 1, 1)]
fn interactive_only_meshes(#[case] kind: ViewKind, #[case] draws: u32, #[case] skipped: u32) {
    let gizmo = Arc::new(
        Mesh::new("gizmo", Material::flat([1.0; 4]), triangle(), Pass::Overlay)
            .with_flags(MeshFlags::INTERACTIVE_VIEWS_ONLY),
    );
    let (scene, mut renderer, mut gpu) = setup(&[flat_mesh("solid", Pass::Depth), gizmo]);
    let stats = renderer.render(&mut gpu, &view(&scene).with_kind(kind)).unwrap();

    assert_eq!(stats.total_draw_calls(), draws);
    assert_eq!(stats.skipped, skipped);
}

// ── change tracking ───────────────────────────────────────────────────────

#[test]
fn transform_change_rebuilds_world_positions() {
    let mesh = flat_mesh("moving", Pass::Depth);
    let (scene, mut renderer, mut gpu) = setup(&[Arc::clone(&mesh)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    mesh.set_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)));
    let stats = renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(stats.rebuilt, 1);

    let handle = renderer.renderables()[0].buffer().handle().unwrap();
    let data = gpu.buffer_contents(handle).unwrap();
    assert_eq!(&data[..3], &[0.0, 0.0, 2.0]);
}

#[test]
fn mark_dirty_rebuilds_without_mesh_change() {
    let mesh = flat_mesh("static", Pass::Depth);
    let (scene, mut renderer, mut gpu) = setup(&[Arc::clone(&mesh)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    assert!(renderer.mark_dirty(mesh.id()));
    assert_eq!(renderer.render(&mut gpu, &view(&scene)).unwrap().rebuilt, 1);
}

#[test]
fn pass_change_moves_the_draw() {
    let mesh = flat_mesh("plane", Pass::Depth);
    let (scene, mut renderer, mut gpu) = setup(&[Arc::clone(&mesh)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    mesh.set_pass(Pass::Transparency);
    gpu.clear_log();
    let stats = renderer.render(&mut gpu, &view(&scene)).unwrap();

    assert_eq!(stats.draw_calls_in(Pass::Depth), 0);
    assert_eq!(stats.draw_calls_in(Pass::Transparency), 1);
    assert_eq!(gpu.draw_calls()[0].pass, Some(Pass::Transparency));
}

#[test]
fn material_swap_switches_shader() {
    let mesh = flat_mesh("swap", Pass::Depth);
    let (scene, mut renderer, mut gpu) = setup(&[Arc::clone(&mesh)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    mesh.set_geometry(triangle().with_attribute(builtin::NORMAL_ARRAY, 3, [0.0, 0.0, 1.0].repeat(3)));
    mesh.set_material(Material::shaded([0.2, 0.4, 0.8, 1.0]));
    gpu.clear_log();
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    assert_eq!(gpu.draw_calls()[0].shader, "shaded");
}

#[test]
fn removed_mesh_releases_its_buffer() {
    let keep = flat_mesh("keep", Pass::Depth);
    let drop = flat_mesh("drop", Pass::Overlay);
    let (scene, mut renderer, mut gpu) = setup(&[Arc::clone(&keep), Arc::clone(&drop)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(gpu.live_buffers(), 2);

    assert!(scene.remove_mesh(drop.id()).is_some());
    let stats = renderer.render(&mut gpu, &view(&scene)).unwrap();

    assert_eq!(gpu.live_buffers(), 1);
    assert_eq!(renderer.renderables().len(), 1);
    assert_eq!(stats.total_draw_calls(), 1);
}

#[test]
fn release_all_then_render_rebuilds() {
    let (scene, mut renderer, mut gpu) = setup(&[flat_mesh("a", Pass::Depth)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    renderer.release_all(&mut gpu);
    assert_eq!(gpu.live_buffers(), 0);

    let stats = renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(stats.rebuilt, 1);
    assert_eq!(gpu.live_buffers(), 1);
}

// ── lights ────────────────────────────────────────────────────────────────

#[test]
fn shaded_mesh_sees_scene_lights() {
    let geometry = triangle().with_attribute(builtin::NORMAL_ARRAY, 3, [0.0, 0.0, 1.0].repeat(3));
    let mesh = Arc::new(Mesh::new("lit", Material::shaded([1.0; 4]), geometry, Pass::Depth));
    let (scene, mut renderer, mut gpu) = setup(&[mesh]);
    scene
        .lights()
        .add(Light::directional(Vec3::new(0.0, 0.0, -1.0), [0.1; 3], [1.0; 3]));

    renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(
        gpu.uniform_values(&builtin::LIGHT_COUNT),
        vec![&UniformValue::Int(1)]
    );

    scene.lights().add(Light::point(Vec3::ONE, [0.0; 3], [1.0; 3], 10.0));
    gpu.clear_log();
    renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(
        gpu.uniform_values(&builtin::LIGHT_COUNT),
        vec![&UniformValue::Int(2)]
    );
}

// ── scratch arena ─────────────────────────────────────────────────────────

#[test]
fn large_mesh_grows_scratch_once() {
    // 600 triangles, 5400 floats.
    let positions: Vec<f32> = (0..1800).flat_map(|i| [i as f32, 0.0, 0.0]).collect();
    let mesh = Arc::new(Mesh::new(
        "big",
        Material::flat([1.0; 4]),
        Geometry::triangles(positions),
        Pass::Depth,
    ));
    let (scene, mut renderer, mut gpu) = setup(&[Arc::clone(&mesh)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(renderer.scratch().reallocations(), 1);
    assert_eq!(renderer.scratch().capacity(), 8192);

    mesh.request_update();
    renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(renderer.scratch().reallocations(), 1);
}

// ── concurrency ───────────────────────────────────────────────────────────

#[test]
fn control_thread_mutations_are_picked_up() {
    let (scene, mut renderer, mut gpu) = setup(&[flat_mesh("base", Pass::Depth)]);
    renderer.render(&mut gpu, &view(&scene)).unwrap();

    let control = {
        let scene = Arc::clone(&scene);
        thread::spawn(move || {
            for i in 0..16 {
                let mesh = Arc::new(Mesh::new(
                    format!("line{i}"),
                    Material::flat([0.0, 1.0, 0.0, 1.0]),
                    Geometry::lines(vec![0.0, 0.0, 0.0, i as f32, 1.0, 0.0]),
                    Pass::Overlay,
                ));
                scene.add_mesh(mesh);
                scene.camera().update(|cam| cam.turn_azimuth(5.0));
            }
            scene.request_redraw();
        })
    };

    // Frames rendered while the control thread runs stay consistent.
    while !control.is_finished() {
        renderer.render(&mut gpu, &view(&scene)).unwrap();
    }
    control.join().unwrap();

    assert!(scene.take_redraw_request());
    gpu.clear_log();
    let stats = renderer.render(&mut gpu, &view(&scene)).unwrap();
    assert_eq!(stats.draw_calls_in(Pass::Overlay), 16);
    assert!(gpu
        .draw_calls()
        .iter()
        .filter(|d| d.pass == Some(Pass::Overlay))
        .all(|d| d.mode == PrimitiveMode::Lines));
    assert!((scene.camera().get().azimuth - 80.0).abs() < 1e-3);
}
