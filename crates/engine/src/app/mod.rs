mod components;
mod input;
mod loop_runner;
mod metrics;
mod movement;
mod rendering;
mod rng;
mod scene;
mod spatial;
mod textures;
mod world;

pub use components::{
    AtlasFrame, Direction, House, Movement, Panel, Pedestrian, Rgba, Sprite, Stage, Vec2,
};
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use movement::{integrate_movement, reset_velocities};
pub use rendering::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
pub use rng::SimRng;
pub use scene::{
    require_textures, InputSnapshot, Scene, SceneCommand, SceneError, SceneFactory, SceneKey,
};
pub use spatial::{overlaps, sprites_overlap, Rect};
pub use textures::{TextureSet, TextureSetError};
pub use world::{ComponentMask, EntityId, SceneWorld};
