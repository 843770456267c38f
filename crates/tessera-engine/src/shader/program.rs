use std::fmt;
use std::sync::Arc;

use crate::attribute::{AttributeRegistry, Provider, UniformKind};
use crate::backend::{BackendError, GpuBackend, ProgramHandle};
use crate::error::{ConfigError, RenderError};
use crate::vertex::VertexBuffer;

use super::{PrimitiveMode, ShaderDesc};

/// Providers resolved for each uniform a shader declares, in declaration order.
#[derive(Clone)]
pub struct BoundUniforms {
    providers: Vec<Provider>,
}

impl BoundUniforms {
    /// Looks every declared uniform up in `layers`, first match wins.
    ///
    /// Fails on the first uniform that no layer provides.
    pub fn resolve(desc: &ShaderDesc, layers: &[&AttributeRegistry]) -> Result<Self, ConfigError> {
        let providers = desc
            .uniforms
            .iter()
            .map(|spec| {
                layers
                    .iter()
                    .find_map(|reg| reg.get(&spec.id).cloned())
                    .ok_or_else(|| ConfigError::MissingUniform {
                        shader: desc.name.clone(),
                        uniform: spec.id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { providers })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for BoundUniforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundUniforms")
            .field("count", &self.providers.len())
            .finish()
    }
}

/// A shader record plus its lazily compiled program.
pub struct Shader {
    desc: Arc<ShaderDesc>,
    program: Option<ProgramHandle>,
}

impl Shader {
    pub fn new(desc: Arc<ShaderDesc>) -> Self {
        Self { desc, program: None }
    }

    #[inline]
    pub fn desc(&self) -> &Arc<ShaderDesc> {
        &self.desc
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    #[inline]
    pub fn mode(&self) -> PrimitiveMode {
        self.desc.mode
    }

    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }

    /// Compiles the program on first use.
    ///
    /// A compile or link failure is fatal: it is logged and returned, and the
    /// caller must stop rendering.
    pub fn ensure_program(&mut self, gpu: &mut dyn GpuBackend) -> Result<ProgramHandle, RenderError> {
        if let Some(program) = self.program {
            return Ok(program);
        }
        match gpu.compile_program(&self.desc) {
            Ok(program) => {
                log::debug!("compiled shader `{}` on {}", self.desc.name, gpu.name());
                self.program = Some(program);
                Ok(program)
            }
            Err(e) => {
                log::error!("cannot create program for shader `{}`: {e}", self.desc.name);
                Err(e.into())
            }
        }
    }

    /// Makes the program current and pushes every declared uniform.
    pub fn enable(&mut self, gpu: &mut dyn GpuBackend, uniforms: &BoundUniforms) -> Result<(), RenderError> {
        let program = self.ensure_program(gpu)?;
        gpu.enable_program(program);

        for (index, (spec, provider)) in self.desc.uniforms.iter().zip(&uniforms.providers).enumerate() {
            let value = provider();
            let actual = value.kind();
            let matches = match (spec.kind, actual) {
                // Light arrays may be shorter than the declared capacity.
                (UniformKind::Vec4Array(cap), UniformKind::Vec4Array(n)) => n <= cap,
                (expected, actual) => expected == actual,
            };
            if !matches {
                gpu.disable_program();
                return Err(ConfigError::UniformKindMismatch {
                    uniform: spec.id.clone(),
                    expected: spec.kind,
                    actual,
                }
                .into());
            }
            gpu.set_uniform(index, spec, &value);
        }
        Ok(())
    }

    /// Binds `buffer`, draws every vertex in it, unbinds.
    ///
    /// Returns the number of vertices drawn. Buffers with no storage or no
    /// vertices issue no draw call. A draw the backend rejects is an error.
    pub fn render(&self, gpu: &mut dyn GpuBackend, buffer: &VertexBuffer) -> Result<u32, BackendError> {
        let Some(handle) = buffer.handle() else {
            return Ok(0);
        };
        let count = buffer.vertex_count();
        if count == 0 {
            return Ok(0);
        }
        gpu.bind_vertex_buffer(handle, buffer.layout());
        let drawn = gpu.draw_arrays(self.desc.mode, 0, count);
        gpu.unbind_vertex_buffer();
        drawn.map(|()| count)
    }

    #[inline]
    pub fn disable(&self, gpu: &mut dyn GpuBackend) {
        gpu.disable_program();
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("name", &self.desc.name)
            .field("program", &self.program)
            .finish()
    }
}
