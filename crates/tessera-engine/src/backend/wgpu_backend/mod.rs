//! wgpu implementation of [`GpuBackend`].
//!
//! wgpu has no immediate-mode state machine, so calls are recorded into a
//! frame-local draw list. Pass state and program select a cached pipeline,
//! uniform blocks are appended to a ring with dynamic offsets, and
//! [`WgpuBackend::encode`] replays the list into a single render pass that
//! clears color and depth.

mod pipeline;
mod resources;

use std::collections::HashMap;
use std::sync::Arc;

use crate::attribute::UniformValue;
use crate::render::{Pass, PassState, Viewport};
use crate::scene::{Texture, TextureId};
use crate::shader::{PrimitiveMode, ShaderDesc, UniformBlockLayout, UniformSpec};
use crate::vertex::VertexLayout;

use super::{BackendError, BackendResult, BufferHandle, GpuBackend, ProgramHandle};
use pipeline::{PipelineKey, Program, StateKey, Targets, VertexKey};
use resources::{GpuTexture, GpuVertexBuffer, UniformRing};

/// One recorded draw, fully resolved to GPU objects.
struct DrawCmd {
    pipeline: wgpu::RenderPipeline,
    uniform_offset: u32,
    texture: Option<wgpu::BindGroup>,
    buffer: wgpu::Buffer,
    first: u32,
    count: u32,
}

/// State set by the enable/uniform/bind calls preceding a draw.
struct Current {
    state: StateKey,
    program: Option<ProgramHandle>,
    block: Vec<u8>,
    texture: Option<TextureId>,
    vertex: Option<(BufferHandle, VertexKey)>,
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    targets: Targets,

    uniform_bgl: wgpu::BindGroupLayout,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    _white_owner: Arc<Texture>,

    programs: Vec<Program>,
    buffers: HashMap<BufferHandle, GpuVertexBuffer>,
    next_buffer: u32,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    textures: HashMap<TextureId, GpuTexture>,

    ring: UniformRing,
    draws: Vec<DrawCmd>,
    current: Current,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_bgl = resources::uniform_bind_group_layout(&device);
        let texture_bgl = resources::texture_bind_group_layout(&device);
        let sampler = resources::linear_sampler(&device);
        let white_owner = Arc::new(Texture::solid([255; 4]));
        let white = GpuTexture::upload(&device, &queue, &texture_bgl, &sampler, &white_owner);
        let ring = UniformRing::new(&device, &uniform_bgl);

        log::info!("wgpu backend ready: color {color_format:?}, depth {depth_format:?}");

        Self {
            device,
            queue,
            targets: Targets {
                color: color_format,
                depth: depth_format,
            },
            uniform_bgl,
            texture_bgl,
            sampler,
            white,
            _white_owner: white_owner,
            programs: Vec::new(),
            buffers: HashMap::new(),
            next_buffer: 0,
            pipelines: HashMap::new(),
            textures: HashMap::new(),
            ring,
            draws: Vec::new(),
            current: Current {
                state: StateKey::from(&PassState::DEFAULTS),
                program: None,
                block: Vec::new(),
                texture: None,
                vertex: None,
            },
        }
    }

    /// Draws recorded since the last [`begin_frame`](GpuBackend::begin_frame).
    #[inline]
    pub fn pending_draws(&self) -> usize {
        self.draws.len()
    }

    /// Replays the recorded frame into `encoder`.
    ///
    /// Color is cleared to `clear` and depth to 1.0 before the first draw.
    pub fn encode(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        clear: wgpu::Color,
    ) {
        self.ring.flush(&self.device, &self.queue, &self.uniform_bgl);

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera forward pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for draw in self.draws.drain(..) {
            rpass.set_pipeline(&draw.pipeline);
            rpass.set_bind_group(0, &self.ring.bind_group, &[draw.uniform_offset]);
            if let Some(texture) = &draw.texture {
                rpass.set_bind_group(1, texture, &[]);
            }
            rpass.set_vertex_buffer(0, draw.buffer.slice(..));
            rpass.draw(draw.first..draw.first + draw.count, 0..1);
        }
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn program(&self, handle: ProgramHandle) -> Option<&Program> {
        self.programs.get(handle.index() as usize)
    }

    fn texture_bind_group(&self, id: Option<TextureId>) -> wgpu::BindGroup {
        id.and_then(|id| self.textures.get(&id))
            .map_or_else(|| self.white.bind_group.clone(), |t| t.bind_group.clone())
    }

    fn pipeline(&mut self, key: PipelineKey) -> Option<wgpu::RenderPipeline> {
        if let Some(pipeline) = self.pipelines.get(&key) {
            return Some(pipeline.clone());
        }
        let program = self.programs.get(key.program.index() as usize)?;
        log::debug!("creating pipeline for `{}` ({:?})", program.desc.name, key.mode);
        let pipeline = pipeline::create_pipeline(&self.device, program, &key, &self.targets);
        self.pipelines.insert(key, pipeline.clone());
        Some(pipeline)
    }
}

impl GpuBackend for WgpuBackend {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn begin_frame(&mut self, viewport: Viewport) {
        log::trace!("begin frame {}x{}", viewport.width, viewport.height);
        self.ring.clear();
        self.draws.clear();
        self.textures.retain(|_, t| !t.is_orphaned());
    }

    fn compile_program(&mut self, desc: &Arc<ShaderDesc>) -> BackendResult<ProgramHandle> {
        if let Some(index) = self.programs.iter().position(|p| *p.desc == **desc) {
            return Ok(ProgramHandle::new(index as u32));
        }

        pipeline::validate_wgsl(desc)?;
        let block = UniformBlockLayout::new(desc)?;

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.name.as_str()),
            source: wgpu::ShaderSource::Wgsl(desc.wgsl.clone()),
        });

        let groups: Vec<&wgpu::BindGroupLayout> = if block.has_texture() {
            vec![&self.uniform_bgl, &self.texture_bgl]
        } else {
            vec![&self.uniform_bgl]
        };
        let label = format!("tessera {} pipeline layout", desc.name);
        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label.as_str()),
            bind_group_layouts: &groups,
            immediate_size: 0,
        });

        let handle = ProgramHandle::new(self.programs.len() as u32);
        log::debug!("compiled program `{}` as {handle:?}", desc.name);
        self.programs.push(Program {
            desc: Arc::clone(desc),
            module,
            block,
            layout,
        });
        Ok(handle)
    }

    fn create_vertex_buffer(&mut self, label: &str) -> BackendResult<BufferHandle> {
        let handle = BufferHandle::new(self.next_buffer);
        self.next_buffer = self
            .next_buffer
            .checked_add(1)
            .ok_or_else(|| BackendError::ResourceCreation {
                what: format!("vertex buffer `{label}`"),
                message: "buffer handles exhausted".to_string(),
            })?;
        self.buffers.insert(handle, GpuVertexBuffer::new(label));
        Ok(handle)
    }

    fn upload_vertex_data(&mut self, buffer: BufferHandle, data: &[f32]) -> BackendResult<()> {
        let storage = self
            .buffers
            .get_mut(&buffer)
            .ok_or(BackendError::UnknownBuffer(buffer))?;
        storage.upload(&self.device, &self.queue, data);
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(storage) = self.buffers.remove(&buffer) {
            log::debug!("destroyed vertex buffer `{}`", storage.label);
        }
    }

    fn apply_pass_state(&mut self, pass: Pass, state: &PassState) {
        log::trace!("pass {}", pass.name());
        self.current.state = StateKey::from(state);
    }

    fn enable_program(&mut self, program: ProgramHandle) {
        let size = self.program(program).map_or(0, |p| p.block.size() as usize);
        self.current.program = Some(program);
        self.current.block.clear();
        self.current.block.resize(size, 0);
        self.current.texture = None;
    }

    fn set_uniform(&mut self, index: usize, _spec: &UniformSpec, value: &UniformValue) {
        let Some(handle) = self.current.program else {
            return;
        };

        if let UniformValue::Texture(texture) = value {
            self.current.texture = None;
            if let Some(texture) = texture {
                if !self.textures.contains_key(&texture.id()) {
                    let gpu = GpuTexture::upload(
                        &self.device,
                        &self.queue,
                        &self.texture_bgl,
                        &self.sampler,
                        texture,
                    );
                    self.textures.insert(texture.id(), gpu);
                }
                self.current.texture = Some(texture.id());
            }
            return;
        }

        if let Some(program) = self.programs.get(handle.index() as usize) {
            program.block.write(&mut self.current.block, index, value);
        }
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle, layout: &VertexLayout) {
        self.current.vertex = Some((buffer, VertexKey::from(layout)));
    }

    fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32) -> BackendResult<()> {
        let program = self
            .current
            .program
            .ok_or(BackendError::IncompleteDraw { missing: "an enabled program" })?;
        let (buffer, vertex) = self
            .current
            .vertex
            .clone()
            .ok_or(BackendError::IncompleteDraw { missing: "a bound vertex buffer" })?;
        let gpu_buffer = self
            .buffers
            .get(&buffer)
            .ok_or(BackendError::UnknownBuffer(buffer))?
            .buffer
            .clone()
            .ok_or(BackendError::IncompleteDraw { missing: "uploaded vertex data" })?;
        let has_texture = self.program(program).is_some_and(|p| p.block.has_texture());

        let key = PipelineKey {
            program,
            state: self.current.state,
            vertex,
            mode,
        };
        let pipeline = self
            .pipeline(key)
            .ok_or(BackendError::UnknownProgram(program))?;
        let texture = has_texture.then(|| self.texture_bind_group(self.current.texture));
        let uniform_offset = self.ring.push(&self.current.block);

        self.draws.push(DrawCmd {
            pipeline,
            uniform_offset,
            texture,
            buffer: gpu_buffer,
            first,
            count,
        });
        Ok(())
    }

    fn unbind_vertex_buffer(&mut self) {
        self.current.vertex = None;
    }

    fn disable_program(&mut self) {
        self.current.program = None;
        self.current.texture = None;
    }

    fn restore_defaults(&mut self) {
        self.current.state = StateKey::from(&PassState::DEFAULTS);
    }
}
