//! Frame rendering seam.
//!
//! [`FrameRenderer`] is the only surface the view state talks to; the wgpu
//! implementation lives in [`quad`].

pub mod faults;
pub mod quad;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};

use crate::processing::transform::QuadCorners;
use crate::tasks::viewer::state::ViewState;

/// Shader parameters for one frame (32 bytes to match the WGSL block).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct FilterUniforms {
    pub mode: u32,
    pub filter: u32,
    pub kernel: u32,
    pub width: u32,
    pub height: u32,
    _pad: [u32; 3],
}

impl FilterUniforms {
    pub fn new(mode: u32, filter: u32, kernel: u32, width: u32, height: u32) -> Self {
        Self {
            mode,
            filter,
            kernel,
            width,
            height,
            _pad: [0; 3],
        }
    }

    pub fn for_state(state: &ViewState) -> Self {
        let filter = state.filter();
        let image = state.active_image();
        Self::new(
            filter.mode().shader_index(),
            filter.filter(),
            filter.kernel(),
            image.width,
            image.height,
        )
    }
}

/// Whether a frame reached the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// No surface texture was available; the frame has to be retried.
    Skipped,
}

pub trait FrameRenderer {
    /// Stage this frame's quad corners for drawing.
    fn upload_vertices(&mut self, corners: &QuadCorners);
    /// Select which loaded image is sampled.
    fn bind_texture(&mut self, image_index: usize);
    fn set_uniforms(&mut self, uniforms: &FilterUniforms);
    fn draw_quad(&mut self) -> Result<FrameOutcome>;
}

/// Evaluate the transform for the current state and draw one frame.
pub fn render_frame<R: FrameRenderer + ?Sized>(
    state: &ViewState,
    renderer: &mut R,
) -> Result<FrameOutcome> {
    renderer.upload_vertices(&state.frame_corners());
    renderer.bind_texture(state.image_index());
    renderer.set_uniforms(&FilterUniforms::for_state(state));
    renderer.draw_quad()
}
