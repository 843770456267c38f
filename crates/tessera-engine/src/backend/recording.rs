//! Headless backend that records every call.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::attribute::{AttributeId, UniformValue};
use crate::render::{Pass, PassState, Viewport};
use crate::shader::{PrimitiveMode, ShaderDesc, UniformBlockLayout, UniformSpec};
use crate::vertex::VertexLayout;

use super::{BackendError, BackendResult, BufferHandle, GpuBackend, ProgramHandle};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    BeginFrame { viewport: Viewport },
    CompileProgram { program: ProgramHandle, name: String },
    CreateBuffer { buffer: BufferHandle, label: String },
    UploadVertexData { buffer: BufferHandle, floats: usize },
    DestroyBuffer { buffer: BufferHandle },
    ApplyPassState { pass: Pass, state: PassState },
    EnableProgram { program: ProgramHandle },
    SetUniform { index: usize, id: AttributeId, value: UniformValue },
    BindVertexBuffer { buffer: BufferHandle, stride: u32 },
    DrawArrays { mode: PrimitiveMode, first: u32, count: u32 },
    UnbindVertexBuffer,
    DisableProgram,
    RestoreDefaults,
}

/// A draw call with the pass and program it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub pass: Option<Pass>,
    pub program: Option<ProgramHandle>,
    pub shader: String,
    pub mode: PrimitiveMode,
    pub count: u32,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<GpuCommand>,
    programs: Vec<Arc<ShaderDesc>>,
    buffers: HashMap<BufferHandle, (String, Vec<f32>)>,
    next_buffer: u32,
    failing: HashSet<String>,
    enabled: Option<ProgramHandle>,
    bound: Option<BufferHandle>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes compilation of the shader named `name` fail.
    pub fn fail_compilation(&mut self, name: impl Into<String>) {
        self.failing.insert(name.into());
    }

    #[inline]
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn clear_log(&mut self) {
        self.commands.clear();
    }

    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[f32]> {
        self.buffers.get(&buffer).map(|(_, data)| data.as_slice())
    }

    pub fn buffer_label(&self, buffer: BufferHandle) -> Option<&str> {
        self.buffers.get(&buffer).map(|(label, _)| label.as_str())
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn program(&self, program: ProgramHandle) -> Option<&Arc<ShaderDesc>> {
        self.programs.get(program.index() as usize)
    }

    /// Passes applied, in order.
    pub fn passes(&self) -> Vec<Pass> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::ApplyPassState { pass, .. } => Some(*pass),
                _ => None,
            })
            .collect()
    }

    /// Draw calls in issue order, tagged with the active pass and program.
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        let mut pass = None;
        let mut program = None;
        let mut calls = Vec::new();
        for command in &self.commands {
            match command {
                GpuCommand::BeginFrame { .. } => {
                    pass = None;
                    program = None;
                }
                GpuCommand::ApplyPassState { pass: p, .. } => pass = Some(*p),
                GpuCommand::EnableProgram { program: p } => program = Some(*p),
                GpuCommand::DisableProgram => program = None,
                GpuCommand::DrawArrays { mode, count, .. } => calls.push(DrawCall {
                    pass,
                    program,
                    shader: program
                        .and_then(|p| self.program(p))
                        .map(|d| d.name.clone())
                        .unwrap_or_default(),
                    mode: *mode,
                    count: *count,
                }),
                _ => {}
            }
        }
        calls
    }

    /// Values set for uniform `id`, in order.
    pub fn uniform_values(&self, id: &AttributeId) -> Vec<&UniformValue> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::SetUniform { id: i, value, .. } if i == id => Some(value),
                _ => None,
            })
            .collect()
    }
}

impl GpuBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn begin_frame(&mut self, viewport: Viewport) {
        self.commands.push(GpuCommand::BeginFrame { viewport });
    }

    fn compile_program(&mut self, desc: &Arc<ShaderDesc>) -> BackendResult<ProgramHandle> {
        if self.failing.contains(&desc.name) {
            return Err(BackendError::ProgramCompilation {
                name: desc.name.clone(),
                message: "compilation disabled by test".to_string(),
            });
        }
        UniformBlockLayout::new(desc)?;

        let program = ProgramHandle::new(self.programs.len() as u32);
        self.programs.push(Arc::clone(desc));
        self.commands.push(GpuCommand::CompileProgram {
            program,
            name: desc.name.clone(),
        });
        Ok(program)
    }

    fn create_vertex_buffer(&mut self, label: &str) -> BackendResult<BufferHandle> {
        let buffer = BufferHandle::new(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(buffer, (label.to_string(), Vec::new()));
        self.commands.push(GpuCommand::CreateBuffer {
            buffer,
            label: label.to_string(),
        });
        Ok(buffer)
    }

    fn upload_vertex_data(&mut self, buffer: BufferHandle, data: &[f32]) -> BackendResult<()> {
        let (_, stored) = self
            .buffers
            .get_mut(&buffer)
            .ok_or(BackendError::UnknownBuffer(buffer))?;
        stored.clear();
        stored.extend_from_slice(data);
        self.commands.push(GpuCommand::UploadVertexData {
            buffer,
            floats: data.len(),
        });
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
        self.commands.push(GpuCommand::DestroyBuffer { buffer });
    }

    fn apply_pass_state(&mut self, pass: Pass, state: &PassState) {
        self.commands.push(GpuCommand::ApplyPassState { pass, state: *state });
    }

    fn enable_program(&mut self, program: ProgramHandle) {
        self.enabled = Some(program);
        self.commands.push(GpuCommand::EnableProgram { program });
    }

    fn set_uniform(&mut self, index: usize, spec: &UniformSpec, value: &UniformValue) {
        self.commands.push(GpuCommand::SetUniform {
            index,
            id: spec.id.clone(),
            value: value.clone(),
        });
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle, layout: &VertexLayout) {
        self.bound = Some(buffer);
        self.commands.push(GpuCommand::BindVertexBuffer {
            buffer,
            stride: layout.stride(),
        });
    }

    fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32) -> BackendResult<()> {
        let program = self
            .enabled
            .ok_or(BackendError::IncompleteDraw { missing: "an enabled program" })?;
        if self.program(program).is_none() {
            return Err(BackendError::UnknownProgram(program));
        }
        let buffer = self
            .bound
            .ok_or(BackendError::IncompleteDraw { missing: "a bound vertex buffer" })?;
        if !self.buffers.contains_key(&buffer) {
            return Err(BackendError::UnknownBuffer(buffer));
        }
        self.commands.push(GpuCommand::DrawArrays { mode, first, count });
        Ok(())
    }

    fn unbind_vertex_buffer(&mut self) {
        self.bound = None;
        self.commands.push(GpuCommand::UnbindVertexBuffer);
    }

    fn disable_program(&mut self) {
        self.enabled = None;
        self.commands.push(GpuCommand::DisableProgram);
    }

    fn restore_defaults(&mut self) {
        self.commands.push(GpuCommand::RestoreDefaults);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::builtin;
    use crate::scene::GeometryAttribute;
    use crate::shader::ShaderKind;

    #[test]
    fn unknown_buffer_upload_fails() {
        let mut gpu = RecordingBackend::new();
        assert!(matches!(
            gpu.upload_vertex_data(BufferHandle::new(7), &[0.0]),
            Err(BackendError::UnknownBuffer(_))
        ));
    }

    fn lines_layout() -> (Arc<ShaderDesc>, VertexLayout) {
        let desc = ShaderKind::FlatColor(PrimitiveMode::Lines).shared();
        let positions = GeometryAttribute {
            id: builtin::POSITION_ARRAY,
            components: 3,
            data: vec![0.0; 6],
        };
        let layout = VertexLayout::resolve(&desc, &[positions]).unwrap();
        (desc, layout)
    }

    #[test]
    fn draw_calls_carry_pass_and_program() {
        let mut gpu = RecordingBackend::new();
        let (desc, layout) = lines_layout();
        let program = gpu.compile_program(&desc).unwrap();
        let buffer = gpu.create_vertex_buffer("lines").unwrap();
        gpu.apply_pass_state(Pass::Overlay, &PassState::OVERLAY);
        gpu.enable_program(program);
        gpu.bind_vertex_buffer(buffer, &layout);
        gpu.draw_arrays(PrimitiveMode::Lines, 0, 2).unwrap();
        gpu.unbind_vertex_buffer();
        gpu.disable_program();

        let calls = gpu.draw_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].pass, Some(Pass::Overlay));
        assert_eq!(calls[0].program, Some(program));
        assert_eq!(calls[0].shader, "flat_color_lines");
        assert_eq!(calls[0].count, 2);
    }

    // ── incomplete draws ────────────────────────────────────────────────────

    #[test]
    fn draw_without_program_fails() {
        let mut gpu = RecordingBackend::new();
        let (_, layout) = lines_layout();
        let buffer = gpu.create_vertex_buffer("lines").unwrap();
        gpu.bind_vertex_buffer(buffer, &layout);

        assert!(matches!(
            gpu.draw_arrays(PrimitiveMode::Lines, 0, 2),
            Err(BackendError::IncompleteDraw { .. })
        ));
        assert!(gpu.draw_calls().is_empty());
    }

    #[test]
    fn draw_after_unbind_fails() {
        let mut gpu = RecordingBackend::new();
        let (desc, layout) = lines_layout();
        let program = gpu.compile_program(&desc).unwrap();
        let buffer = gpu.create_vertex_buffer("lines").unwrap();
        gpu.enable_program(program);
        gpu.bind_vertex_buffer(buffer, &layout);
        gpu.unbind_vertex_buffer();

        assert!(matches!(
            gpu.draw_arrays(PrimitiveMode::Lines, 0, 2),
            Err(BackendError::IncompleteDraw { .. })
        ));
    }

    #[test]
    fn draw_from_destroyed_buffer_fails() {
        let mut gpu = RecordingBackend::new();
        let (desc, layout) = lines_layout();
        let program = gpu.compile_program(&desc).unwrap();
        let buffer = gpu.create_vertex_buffer("lines").unwrap();
        gpu.enable_program(program);
        gpu.bind_vertex_buffer(buffer, &layout);
        gpu.destroy_buffer(buffer);

        assert!(matches!(
            gpu.draw_arrays(PrimitiveMode::Lines, 0, 2),
            Err(BackendError::UnknownBuffer(b)) if b == buffer
        ));
    }

    #[test]
    fn draw_with_unknown_program_fails() {
        let mut gpu = RecordingBackend::new();
        let (_, layout) = lines_layout();
        let buffer = gpu.create_vertex_buffer("lines").unwrap();
        gpu.enable_program(ProgramHandle::new(3));
        gpu.bind_vertex_buffer(buffer, &layout);

        assert!(matches!(
            gpu.draw_arrays(PrimitiveMode::Lines, 0, 2),
            Err(BackendError::UnknownProgram(_))
        ));
    }
}
