#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Selects one cell of a `columns x rows` texture atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasFrame {
    pub columns: u32,
    pub rows: u32,
    pub column: u32,
    pub row: u32,
}

impl AtlasFrame {
    pub const fn single() -> Self {
        Self::grid(1, 1)
    }

    pub const fn grid(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            column: 0,
            row: 0,
        }
    }

    /// Normalized `(u0, v0, u1, v1)` of the current cell.
    pub fn uv_rect(&self) -> (f32, f32, f32, f32) {
        let columns = self.columns.max(1) as f32;
        let rows = self.rows.max(1) as f32;
        let column = self.column.min(self.columns.saturating_sub(1)) as f32;
        let row = self.row.min(self.rows.saturating_sub(1)) as f32;
        (
            column / columns,
            row / rows,
            (column + 1.0) / columns,
            (row + 1.0) / rows,
        )
    }
}

impl Default for AtlasFrame {
    fn default() -> Self {
        Self::single()
    }
}

/// Position/extent component shared by every visual entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: String,
    pub position: Vec2,
    /// Draw depth; never read by gameplay.
    pub depth: f32,
    pub size: Vec2,
    pub rotation_radians: f32,
    pub tint: Rgba,
    pub frame: AtlasFrame,
}

impl Sprite {
    pub fn new(texture: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            texture: texture.into(),
            position,
            depth: 0.0,
            size,
            rotation_radians: 0.0,
            tint: Rgba::WHITE,
            frame: AtlasFrame::single(),
        }
    }

    pub fn with_frame(mut self, frame: AtlasFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_tint(mut self, tint: Rgba) -> Self {
        self.tint = tint;
        self
    }

    pub fn half_extent(&self) -> Vec2 {
        Vec2::new(self.size.x * 0.5, self.size.y * 0.5)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Movement {
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Top,
    Middle,
    Bottom,
}

impl Stage {
    /// Fixed evaluation order, topmost lane first.
    pub const ALL: [Stage; 3] = [Stage::Top, Stage::Middle, Stage::Bottom];

    pub const fn index(self) -> usize {
        match self {
            Stage::Top => 0,
            Stage::Middle => 1,
            Stage::Bottom => 2,
        }
    }

    /// The lane whose player is moved by panels standing in this lane.
    pub const fn controlled_lane(self) -> Option<Stage> {
        match self {
            Stage::Bottom => Some(Stage::Middle),
            Stage::Middle => Some(Stage::Top),
            Stage::Top => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Stage::Top => "top",
            Stage::Middle => "middle",
            Stage::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Panel evaluation order; later entries overwrite earlier ones on the same axis.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Screen-space unit vector (y grows downward).
    pub const fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

/// Directional gate. `stage` is the lane the panel stands in, set at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub direction: Direction,
    pub stage: Stage,
}

/// Lit/unlit timers; only the timer matching `is_lit` counts down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct House {
    pub is_lit: bool,
    pub lit_time_remaining: f32,
    pub unlit_time_remaining: f32,
}

impl House {
    pub fn active_time_remaining(&self) -> f32 {
        if self.is_lit {
            self.lit_time_remaining
        } else {
            self.unlit_time_remaining
        }
    }
}

/// Idle/moving timers; only the timer matching `is_moving` counts down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pedestrian {
    pub move_time_remaining: f32,
    pub idle_time_remaining: f32,
    pub is_moving: bool,
    pub current_velocity: Vec2,
}

impl Pedestrian {
    pub fn idle_for(seconds: f32) -> Self {
        Self {
            move_time_remaining: 0.0,
            idle_time_remaining: seconds,
            is_moving: false,
            current_velocity: Vec2::ZERO,
        }
    }
}
