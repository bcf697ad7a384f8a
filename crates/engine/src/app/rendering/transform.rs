use crate::app::Vec2;

use super::{LOGICAL_HEIGHT, LOGICAL_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Uniform scale plus letterbox offset from logical space into the window frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalView {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl LogicalView {
    pub fn fit(viewport: Viewport) -> Self {
        let scale_x = viewport.width as f32 / LOGICAL_WIDTH;
        let scale_y = viewport.height as f32 / LOGICAL_HEIGHT;
        let scale = scale_x.min(scale_y).max(0.0);
        Self {
            scale,
            offset_x: (viewport.width as f32 - LOGICAL_WIDTH * scale) * 0.5,
            offset_y: (viewport.height as f32 - LOGICAL_HEIGHT * scale) * 0.5,
        }
    }

    pub fn to_screen_px(self, logical: Vec2) -> (i32, i32) {
        let x = logical.x * self.scale + self.offset_x;
        let y = logical.y * self.scale + self.offset_y;
        (x.round() as i32, y.round() as i32)
    }

    pub fn scale_length(self, length: f32) -> u32 {
        (length * self.scale).round().max(0.0) as u32
    }
}
