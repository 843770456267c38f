//! The demo scene: one mesh per pass.

use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};

use tessera_engine::attribute::builtin;
use tessera_engine::camera::Camera;
use tessera_engine::render::Pass;
use tessera_engine::scene::{Geometry, Light, Material, Mesh, MeshFlags, Scene, Texture};
use tessera_engine::shader::PrimitiveMode;

pub struct DemoScene {
    pub scene: Arc<Scene>,
    pub cube: Arc<Mesh>,
    pub plane: Arc<Mesh>,
}

impl DemoScene {
    pub fn build() -> Result<Self> {
        let mut camera = Camera::new(45.0, 0.05, 100.0);
        camera.set_elevation(30.0);
        camera.set_azimuth(30.0);
        let scene = Arc::new(Scene::new(camera));

        let cube = Arc::new(
            Mesh::new("cube", Material::shaded([0.85, 0.45, 0.2, 1.0]), cube(1.0), Pass::Depth)
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 0.5))),
        );

        let checker = Arc::new(checker_texture(8, 200).context("checker texture")?);
        let plane = Arc::new(Mesh::new(
            "plane",
            Material::textured(checker, [1.0, 1.0, 1.0, 0.55]),
            plane(4.0),
            Pass::Transparency,
        ));

        let axes = Arc::new(
            Mesh::new("axes", Material::vertex_colored(), axes(1.5), Pass::Overlay)
                .with_flags(MeshFlags::DONT_CAST_SHADOW),
        );

        let crosshair = Arc::new(
            Mesh::new(
                "crosshair",
                Material::flat([1.0, 1.0, 1.0, 0.8]),
                Geometry::lines(vec![
                    -0.03, 0.0, 0.0, 0.03, 0.0, 0.0, //
                    0.0, -0.04, 0.0, 0.0, 0.04, 0.0,
                ]),
                Pass::DeviceSpaceOverlay,
            )
            .with_flags(MeshFlags::INTERACTIVE_VIEWS_ONLY),
        );

        let marker = Arc::new(Mesh::new(
            "frame marker",
            Material::flat([0.2, 0.8, 0.4, 0.9]),
            rect(12.0, 12.0, 28.0, 28.0),
            Pass::ScreenSpaceOverlay,
        ));

        for mesh in [&cube, &plane, &axes, &crosshair, &marker] {
            scene.add_mesh(Arc::clone(mesh));
        }

        scene
            .lights()
            .add(Light::directional(Vec3::new(-0.4, -0.6, -1.0), [0.15; 3], [0.85; 3]));
        scene
            .lights()
            .add(Light::point(Vec3::new(2.0, -2.0, 3.0), [0.0; 3], [0.4, 0.35, 0.3], 10.0));

        if let Some(bounds) = plane.geometry().bounds() {
            scene.camera().update(|cam| cam.frame(&bounds));
        }

        log::info!("demo scene: {} meshes, {} lights", scene.mesh_count(), scene.lights().len());
        Ok(Self { scene, cube, plane })
    }

    /// Moves the plane between TRANSPARENCY and DEPTH.
    pub fn toggle_plane_pass(&self) {
        let next = match self.plane.pass() {
            Pass::Transparency => Pass::Depth,
            _ => Pass::Transparency,
        };
        log::info!("plane -> {}", next.name());
        self.plane.set_pass(next);
    }
}

// ── geometry ──────────────────────────────────────────────────────────────

/// Axis-aligned cube of edge `size` centered at the origin, with face normals.
fn cube(size: f32) -> Geometry {
    // (normal, u, v) with u x v == normal so faces wind counter-clockwise.
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];

    let half = size * 0.5;
    let mut positions = Vec::with_capacity(6 * 6 * 3);
    let mut normals = Vec::with_capacity(6 * 6 * 3);

    for (n, u, v) in FACES {
        let (n, u, v) = (Vec3::from(n), Vec3::from(u) * half, Vec3::from(v) * half);
        let c = n * half;
        let corners = [c - u - v, c + u - v, c + u + v, c - u + v];
        for i in [0, 1, 2, 0, 2, 3] {
            positions.extend_from_slice(&corners[i].to_array());
            normals.extend_from_slice(&n.to_array());
        }
    }

    Geometry::triangles(positions).with_attribute(builtin::NORMAL_ARRAY, 3, normals)
}

/// Square in the z = 0 plane, texture repeated four times.
fn plane(size: f32) -> Geometry {
    let h = size * 0.5;
    let corners = [[-h, -h], [h, -h], [h, h], [-h, h]];
    let uvs = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];

    let mut positions = Vec::with_capacity(18);
    let mut texcoords = Vec::with_capacity(12);
    for i in [0, 1, 2, 0, 2, 3] {
        positions.extend_from_slice(&[corners[i][0], corners[i][1], 0.0]);
        texcoords.extend_from_slice(&uvs[i]);
    }
    Geometry::triangles(positions).with_attribute(builtin::TEXCOORD_ARRAY, 2, texcoords)
}

fn axes(length: f32) -> Geometry {
    let mut positions = Vec::with_capacity(18);
    let mut colors = Vec::with_capacity(24);
    for axis in 0..3 {
        let mut tip = [0.0; 3];
        tip[axis] = length;
        let mut color = [0.0, 0.0, 0.0, 1.0];
        color[axis] = 1.0;

        positions.extend_from_slice(&[0.0, 0.0, 0.0]);
        positions.extend_from_slice(&tip);
        colors.extend_from_slice(&color);
        colors.extend_from_slice(&color);
    }
    Geometry::new(PrimitiveMode::Lines)
        .with_attribute(builtin::POSITION_ARRAY, 3, positions)
        .with_attribute(builtin::COLOR_ARRAY, 4, colors)
}

/// Screen-space rectangle, pixels from the top-left corner.
fn rect(x: f32, y: f32, w: f32, h: f32) -> Geometry {
    let (x1, y1) = (x + w, y + h);
    Geometry::triangles(vec![
        x, y, 0.0, x1, y, 0.0, x1, y1, 0.0, //
        x, y, 0.0, x1, y1, 0.0, x, y1, 0.0,
    ])
}

fn checker_texture(cells: u32, alpha: u8) -> Result<Texture> {
    let size = cells * 8;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / 8) + (y / 8)) % 2 == 0;
            let shade = if light { 230 } else { 60 };
            rgba.extend_from_slice(&[shade, shade, shade, alpha]);
        }
    }
    Ok(Texture::from_rgba8(size, size, rgba)?)
}
