//! Programs and render pipelines.

use std::sync::Arc;

use crate::render::{CullFace, PassState};
use crate::shader::{PrimitiveMode, ShaderDesc, UniformBlockLayout};
use crate::vertex::VertexLayout;

use super::super::{BackendError, BackendResult, ProgramHandle};

/// A validated shader module plus everything needed to build pipelines for it.
pub(super) struct Program {
    pub desc: Arc<ShaderDesc>,
    pub module: wgpu::ShaderModule,
    pub block: UniformBlockLayout,
    pub layout: wgpu::PipelineLayout,
}

/// Parses and validates WGSL with naga so errors surface as
/// [`BackendError::ProgramCompilation`] instead of a device panic.
pub(super) fn validate_wgsl(desc: &ShaderDesc) -> BackendResult<()> {
    let failed = |message: String| BackendError::ProgramCompilation {
        name: desc.name.clone(),
        message,
    };

    let module = naga::front::wgsl::parse_str(&desc.wgsl).map_err(|e| failed(e.emit_to_string(&desc.wgsl)))?;
    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all())
        .validate(&module)
        .map_err(|e| failed(format!("{e:?}")))?;

    for (stage, entry) in [
        (naga::ShaderStage::Vertex, &desc.vertex_entry),
        (naga::ShaderStage::Fragment, &desc.fragment_entry),
    ] {
        if !module.entry_points.iter().any(|ep| ep.stage == stage && &ep.name == entry) {
            return Err(failed(format!("missing {stage:?} entry point `{entry}`")));
        }
    }
    Ok(())
}

// ── pipeline key ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct StateKey {
    depth_test: bool,
    depth_write: bool,
    blend: bool,
    /// (factor, units) bit patterns.
    offset: Option<(u32, u32)>,
    cull: Option<CullFace>,
}

impl From<&PassState> for StateKey {
    fn from(state: &PassState) -> Self {
        Self {
            depth_test: state.depth_test,
            depth_write: state.depth_write,
            blend: state.blend,
            offset: state
                .polygon_offset
                .map(|o| (o.factor.to_bits(), o.units.to_bits())),
            cull: state.cull,
        }
    }
}

/// Component counts in location order; offsets are cumulative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct VertexKey {
    components: Vec<u32>,
}

impl From<&VertexLayout> for VertexKey {
    fn from(layout: &VertexLayout) -> Self {
        Self {
            components: layout.entries().iter().map(|e| e.components).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub program: ProgramHandle,
    pub state: StateKey,
    pub vertex: VertexKey,
    pub mode: PrimitiveMode,
}

// ── pipeline creation ─────────────────────────────────────────────────────

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn topology(mode: PrimitiveMode) -> wgpu::PrimitiveTopology {
    match mode {
        PrimitiveMode::Points => wgpu::PrimitiveTopology::PointList,
        PrimitiveMode::Lines => wgpu::PrimitiveTopology::LineList,
        PrimitiveMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}

pub(super) struct Targets {
    pub color: wgpu::TextureFormat,
    pub depth: wgpu::TextureFormat,
}

pub(super) fn create_pipeline(
    device: &wgpu::Device,
    program: &Program,
    key: &PipelineKey,
    targets: &Targets,
) -> wgpu::RenderPipeline {
    let mut attributes = Vec::with_capacity(key.vertex.components.len());
    let mut offset = 0u64;
    for (location, &components) in key.vertex.components.iter().enumerate() {
        attributes.push(wgpu::VertexAttribute {
            format: vertex_format(components),
            offset,
            shader_location: location as u32,
        });
        offset += u64::from(components) * size_of::<f32>() as u64;
    }
    let vertex_buffer = wgpu::VertexBufferLayout {
        array_stride: offset,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &attributes,
    };

    let state = &key.state;
    // Depth bias is only valid for triangle topologies.
    let bias = match state.offset {
        Some((factor, units)) if key.mode.is_triangles() => wgpu::DepthBiasState {
            constant: f32::from_bits(units) as i32,
            slope_scale: f32::from_bits(factor),
            clamp: 0.0,
        },
        _ => wgpu::DepthBiasState::default(),
    };

    let label = format!("tessera {} pipeline", program.desc.name);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label.as_str()),
        layout: Some(&program.layout),
        vertex: wgpu::VertexState {
            module: &program.module,
            entry_point: Some(program.desc.vertex_entry.as_str()),
            compilation_options: Default::default(),
            buffers: &[vertex_buffer],
        },
        fragment: Some(wgpu::FragmentState {
            module: &program.module,
            entry_point: Some(program.desc.fragment_entry.as_str()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: targets.color,
                blend: state.blend.then_some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: topology(key.mode),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: state.cull.map(|c| match c {
                CullFace::Back => wgpu::Face::Back,
                CullFace::Front => wgpu::Face::Front,
            }),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: targets.depth,
            depth_write_enabled: state.depth_test && state.depth_write,
            depth_compare: if state.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias,
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
