use std::cell::Cell;
use std::rc::Rc;

use engine::{
    integrate_movement, require_textures, reset_velocities, sprites_overlap, AtlasFrame,
    ComponentMask, Direction, EntityId, House, InputAction, InputSnapshot, Movement, Panel,
    Pedestrian, Rect, Rgba, Scene, SceneCommand, SceneError, SceneFactory, SceneKey, SceneWorld,
    SimRng, Sprite, Stage, Vec2, LOGICAL_HEIGHT, LOGICAL_WIDTH,
};
use tracing::{debug, info};

use super::tuning::{DurationRange, GameTuning};

const STAGE_HEIGHT: f32 = LOGICAL_HEIGHT / 3.0;
const PLAYER_SIZE: Vec2 = Vec2::new(48.0, 48.0);
const PEDESTRIAN_SIZE: Vec2 = Vec2::new(40.0, 40.0);
const PANEL_SIZE: Vec2 = Vec2::new(56.0, 56.0);
const HOUSE_SIZE: Vec2 = Vec2::new(64.0, 64.0);
const PANEL_CLUSTER_X: f32 = 200.0;
const PANEL_SPACING: f32 = 64.0;
const PLAYER_SPAWN_X: f32 = 640.0;
const PEDESTRIAN_SPAWN_XS: [f32; 2] = [420.0, 860.0];
const PEDESTRIAN_OFFSETS_Y: [f32; 2] = [-60.0, 60.0];
const HOUSE_SPAWN_XS: [f32; 2] = [980.0, 1140.0];

const TEXTURE_PLAYER: &str = "player";
const TEXTURE_PEDESTRIAN: &str = "pedestrian";
const TEXTURE_PANEL: &str = "panel";
const TEXTURE_HOUSE: &str = "dot_house_00";
const TEXTURE_GAME_BG: &str = "game_bg";
const TEXTURE_TITLE: &str = "title";
const TEXTURE_TUTORIAL: &str = "tutorial";
const TEXTURE_RESULT: &str = "result";
const GAME_TEXTURES: [&str; 5] = [
    TEXTURE_GAME_BG,
    TEXTURE_PLAYER,
    TEXTURE_PEDESTRIAN,
    TEXTURE_PANEL,
    TEXTURE_HOUSE,
];

/// Atlas column of a released panel / unlit house.
const FRAME_COLUMN_OFF: u32 = 0;
/// Atlas column of a pressed panel / lit house.
const FRAME_COLUMN_ON: u32 = 1;

/// Remaining time at or below this counts as elapsed.
const TIMER_EPSILON: f32 = 1e-4;

const ELIMINATED_TINT: Rgba = Rgba::new(0.45, 0.45, 0.45, 1.0);

include!("types.rs");
include!("systems.rs");
include!("scene_state.rs");
include!("scene_impl.rs");
include!("util.rs");

/// Builds every scene kind; the game and result scenes share one run board.
pub(crate) fn build_scene_factory(tuning: GameTuning) -> SceneFactory {
    let board = RunBoard::default();
    Box::new(move |key| -> Box<dyn Scene> {
        match key {
            SceneKey::Title => Box::new(MenuScene::new(SceneKey::Title, TEXTURE_TITLE, None)),
            SceneKey::Tutorial => {
                Box::new(MenuScene::new(SceneKey::Tutorial, TEXTURE_TUTORIAL, None))
            }
            SceneKey::Game => Box::new(GameScene::new(tuning.clone(), board.clone())),
            SceneKey::Result => Box::new(MenuScene::new(
                SceneKey::Result,
                TEXTURE_RESULT,
                Some(board.clone()),
            )),
        }
    })
}
