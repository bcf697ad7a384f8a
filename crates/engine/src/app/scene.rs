use thiserror::Error;

use super::input::{ActionStates, InputAction};
use super::world::SceneWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Title,
    Tutorial,
    Game,
    Result,
}

impl SceneKey {
    /// Fixed scene cycle: title, tutorial, game, result, back to title.
    pub const fn next(self) -> Self {
        match self {
            SceneKey::Title => SceneKey::Tutorial,
            SceneKey::Tutorial => SceneKey::Game,
            SceneKey::Game => SceneKey::Result,
            SceneKey::Result => SceneKey::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene {scene:?} needs texture '{key}' which is not in the loaded texture set")]
    MissingTexture { scene: SceneKey, key: String },
}

/// Fails scene entry when any of `keys` was not loaded at startup.
pub fn require_textures(
    world: &SceneWorld,
    scene: SceneKey,
    keys: &[&str],
) -> Result<(), SceneError> {
    match keys.iter().find(|key| !world.textures().contains(key)) {
        Some(missing) => Err(SceneError::MissingTexture {
            scene,
            key: (*missing).to_string(),
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    confirm_pressed: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, confirm_pressed: bool, actions: ActionStates) -> Self {
        Self {
            quit_requested,
            confirm_pressed,
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Edge-triggered: true only on the tick the confirm key went down.
    pub fn confirm_pressed(&self) -> bool {
        self.confirm_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_confirm_pressed(mut self, confirm_pressed: bool) -> Self {
        self.confirm_pressed = confirm_pressed;
        self
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld) -> Result<(), SceneError>;
    fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, _world: &mut SceneWorld) {}
    /// Score/time text shown by the shell; `None` hides it.
    fn hud_text(&self) -> Option<String> {
        None
    }
}

/// Builds a fresh scene for a key. Called on every scene entry.
pub type SceneFactory = Box<dyn Fn(SceneKey) -> Box<dyn Scene>>;

pub(crate) struct SceneMachine {
    factory: SceneFactory,
    active_key: SceneKey,
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneMachine {
    pub(crate) fn new(factory: SceneFactory, initial: SceneKey, world: SceneWorld) -> Self {
        let scene = factory(initial);
        Self {
            factory,
            active_key: initial,
            scene,
            world,
            is_loaded: false,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_key
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.world
    }

    #[cfg(test)]
    pub(crate) fn active_world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub(crate) fn load_active(&mut self) -> Result<(), SceneError> {
        if self.is_loaded {
            return Ok(());
        }
        self.scene.load(&mut self.world)?;
        self.is_loaded = true;
        Ok(())
    }

    pub(crate) fn update_active(&mut self, dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(dt_seconds, input, &mut self.world)
    }

    pub(crate) fn hud_text_active(&self) -> Option<String> {
        self.scene.hud_text()
    }

    /// Tears the active scene down and enters `next` with an empty store.
    pub(crate) fn switch_to(&mut self, next: SceneKey) -> Result<(), SceneError> {
        self.unload_active();
        self.scene = (self.factory)(next);
        self.active_key = next;
        self.load_active()
    }

    pub(crate) fn shutdown(&mut self) {
        self.unload_active();
    }

    fn unload_active(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
            self.is_loaded = false;
        }
        self.world.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::components::{Sprite, Vec2};
    use crate::app::textures::TextureSet;
    use crate::app::world::EntityId;

    struct CountingScene {
        texture: &'static str,
        spawn_count: usize,
        advance_on_confirm: Option<SceneKey>,
    }

    impl Scene for CountingScene {
        fn load(&mut self, world: &mut SceneWorld) -> Result<(), SceneError> {
            require_textures(world, SceneKey::Title, &[self.texture])?;
            for index in 0..self.spawn_count {
                let id = world.spawn();
                world.insert_sprite(
                    id,
                    Sprite::new(self.texture, Vec2::new(index as f32, 0.0), Vec2::ZERO),
                );
            }
            Ok(())
        }

        fn update(
            &mut self,
            _dt_seconds: f32,
            input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            match self.advance_on_confirm {
                Some(next) if input.confirm_pressed() => SceneCommand::SwitchTo(next),
                _ => SceneCommand::None,
            }
        }

        fn hud_text(&self) -> Option<String> {
            Some(format!("count {}", self.spawn_count))
        }
    }

    fn test_factory() -> SceneFactory {
        Box::new(|key| {
            let spawn_count = match key {
                SceneKey::Title => 1,
                SceneKey::Tutorial => 2,
                SceneKey::Game => 3,
                SceneKey::Result => 4,
            };
            Box::new(CountingScene {
                texture: "bg",
                spawn_count,
                advance_on_confirm: Some(key.next()),
            })
        })
    }

    fn world_with_textures(keys: &[&str]) -> SceneWorld {
        let mut world = SceneWorld::default();
        world.set_textures(TextureSet::from_keys(keys.iter().copied()).expect("keys"));
        world
    }

    #[test]
    fn scene_cycle_returns_to_title() {
        let mut key = SceneKey::Title;
        for _ in 0..4 {
            key = key.next();
        }
        assert_eq!(key, SceneKey::Title);
        assert_eq!(SceneKey::Game.next(), SceneKey::Result);
    }

    #[test]
    fn switch_rebuilds_store_and_invalidates_handles() {
        let mut machine = SceneMachine::new(
            test_factory(),
            SceneKey::Title,
            world_with_textures(&["bg"]),
        );
        machine.load_active().expect("load");
        assert_eq!(machine.active_world().entity_count(), 1);
        let stale: EntityId = machine
            .active_world()
            .query(crate::ComponentMask::SPRITE)
            .next()
            .expect("id");

        let command =
            machine.update_active(0.016, &InputSnapshot::empty().with_confirm_pressed(true));
        assert_eq!(command, SceneCommand::SwitchTo(SceneKey::Tutorial));
        machine.switch_to(SceneKey::Tutorial).expect("switch");

        assert_eq!(machine.active_scene(), SceneKey::Tutorial);
        assert_eq!(machine.active_world().entity_count(), 2);
        assert!(!machine.active_world().is_alive(stale));
        assert_eq!(machine.hud_text_active().as_deref(), Some("count 2"));
    }

    #[test]
    fn load_fails_when_texture_missing() {
        let mut machine = SceneMachine::new(
            test_factory(),
            SceneKey::Title,
            world_with_textures(&["other"]),
        );
        let err = machine.load_active().expect_err("missing texture");
        assert_eq!(
            err,
            SceneError::MissingTexture {
                scene: SceneKey::Title,
                key: "bg".to_string()
            }
        );
        assert_eq!(
            machine.update_active(0.016, &InputSnapshot::empty()),
            SceneCommand::None
        );
    }

    #[test]
    fn shutdown_clears_store_but_keeps_textures() {
        let mut machine = SceneMachine::new(
            test_factory(),
            SceneKey::Game,
            world_with_textures(&["bg"]),
        );
        machine.load_active().expect("load");
        machine.active_world_mut().spawn();
        machine.shutdown();
        assert_eq!(machine.active_world().entity_count(), 0);
        assert!(machine.active_world().textures().contains("bg"));
    }

    #[test]
    fn input_snapshot_reports_held_actions() {
        let input = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveUp, true)
            .with_action_down(InputAction::MoveUp, false);
        assert!(input.is_down(InputAction::MoveLeft));
        assert!(!input.is_down(InputAction::MoveUp));
        assert!(!input.confirm_pressed());
    }
}
