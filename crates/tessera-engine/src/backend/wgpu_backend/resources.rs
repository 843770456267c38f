//! GPU-side storage: vertex buffers, textures and the per-frame uniform ring.

use std::num::NonZeroU64;
use std::sync::{Arc, Weak};

use crate::scene::Texture;
use crate::shader::MAX_UNIFORM_BLOCK_SIZE;

// ── vertex buffers ────────────────────────────────────────────────────────

/// Growable vertex storage. The GPU buffer is allocated on first upload.
pub(super) struct GpuVertexBuffer {
    pub label: String,
    pub buffer: Option<wgpu::Buffer>,
    capacity: u64,
    pub len: u64,
}

impl GpuVertexBuffer {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            buffer: None,
            capacity: 0,
            len: 0,
        }
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[f32]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let required = bytes.len() as u64;

        if required > self.capacity || self.buffer.is_none() {
            let capacity = required.next_power_of_two().max(256);
            log::debug!("vertex buffer `{}`: {} -> {capacity} bytes", self.label, self.capacity);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label.as_str()),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = capacity;
        }

        if let Some(buffer) = self.buffer.as_ref().filter(|_| required > 0) {
            queue.write_buffer(buffer, 0, bytes);
        }
        self.len = required;
    }
}

// ── textures ──────────────────────────────────────────────────────────────

/// GPU copy of a [`Texture`], dropped once the CPU-side owner is gone.
pub(super) struct GpuTexture {
    owner: Weak<Texture>,
    _texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

impl GpuTexture {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        texture: &Arc<Texture>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: texture.width(),
            height: texture.height(),
            depth_or_array_layers: 1,
        };
        let gpu = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessera material texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texture.rgba(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * texture.width()),
                rows_per_image: Some(texture.height()),
            },
            size,
        );

        let view = gpu.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera texture bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            owner: Arc::downgrade(texture),
            _texture: gpu,
            bind_group,
        }
    }

    #[inline]
    pub fn is_orphaned(&self) -> bool {
        self.owner.strong_count() == 0
    }
}

pub(super) fn texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("tessera texture bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub(super) fn linear_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("tessera material sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

// ── uniform ring ──────────────────────────────────────────────────────────

/// Binding window of every uniform block; the largest block always fits.
fn block_binding_size() -> Option<NonZeroU64> {
    NonZeroU64::new(u64::from(MAX_UNIFORM_BLOCK_SIZE))
}

pub(super) fn uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("tessera uniform bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Per-frame uniform staging. Every draw appends its block at an aligned
/// offset; the whole ring is uploaded once before the frame is encoded.
pub(super) struct UniformRing {
    staging: Vec<u8>,
    alignment: u32,
    buffer: wgpu::Buffer,
    capacity: u64,
    pub bind_group: wgpu::BindGroup,
}

impl UniformRing {
    const INITIAL_CAPACITY: u64 = 64 * 1024;

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment.max(16);
        let (buffer, bind_group) = Self::allocate(device, layout, Self::INITIAL_CAPACITY);
        Self {
            staging: Vec::new(),
            alignment,
            buffer,
            capacity: Self::INITIAL_CAPACITY,
            bind_group,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera uniform ring"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera uniform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: block_binding_size(),
                }),
            }],
        });
        (buffer, bind_group)
    }

    pub fn clear(&mut self) {
        self.staging.clear();
    }

    /// Appends `block` and returns its dynamic offset.
    pub fn push(&mut self, block: &[u8]) -> u32 {
        let align = self.alignment as usize;
        let offset = self.staging.len().div_ceil(align) * align;
        self.staging.resize(offset, 0);
        self.staging.extend_from_slice(block);
        offset as u32
    }

    /// Uploads the staged blocks, growing the GPU buffer if needed.
    pub fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) {
        if self.staging.is_empty() {
            return;
        }
        // The last block is bound with a full-size window.
        let needed = self.staging.len().div_ceil(self.alignment as usize) * self.alignment as usize
            + MAX_UNIFORM_BLOCK_SIZE as usize;
        self.staging.resize(needed, 0);

        if needed as u64 > self.capacity {
            let capacity = (needed as u64).next_power_of_two();
            log::debug!("uniform ring grows {} -> {capacity} bytes", self.capacity);
            let (buffer, bind_group) = Self::allocate(device, layout, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }
}
