use super::components::{Sprite, Vec2};

/// Center/full-size overlap test. Touching edges count as overlap.
pub fn overlaps(pos_a: Vec2, size_a: Vec2, pos_b: Vec2, size_b: Vec2) -> bool {
    (pos_a.x - pos_b.x).abs() <= (size_a.x + size_b.x) * 0.5
        && (pos_a.y - pos_b.y).abs() <= (size_a.y + size_b.y) * 0.5
}

pub fn sprites_overlap(a: &Sprite, b: &Sprite) -> bool {
    overlaps(a.position, a.size, b.position, b.size)
}

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Shrinks every edge by `amount.x` / `amount.y`.
    pub fn shrink(&self, amount: Vec2) -> Self {
        Self {
            min: Vec2::new(self.min.x + amount.x, self.min.y + amount.y),
            max: Vec2::new(self.max.x - amount.x, self.max.y - amount.y),
        }
    }

    /// Component-wise clamp. An inverted rect pins the point to `max`
    /// instead of panicking like `f32::clamp`.
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.max(self.min.x).min(self.max.x),
            point.y.max(self.min.y).min(self.max.y),
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}
