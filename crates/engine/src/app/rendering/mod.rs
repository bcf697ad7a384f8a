mod renderer;
mod transform;

pub(crate) use renderer::Renderer;
pub use transform::{LogicalView, Viewport};

/// Logical playfield size; gameplay positions live in this space (y down).
pub const LOGICAL_WIDTH: f32 = 1280.0;
pub const LOGICAL_HEIGHT: f32 = 720.0;
