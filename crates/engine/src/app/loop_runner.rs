use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::AppPaths;

use super::metrics::MetricsAccumulator;
use super::rendering::Renderer;
use super::scene::{SceneMachine, SceneError};
use super::textures::{TextureSet, TextureSetError};
use super::world::SceneWorld;
use super::{InputAction, InputSnapshot, SceneCommand, SceneFactory, SceneKey};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Lane Shine".to_string(),
            window_width: 1280,
            window_height: 720,
            max_frame_delta: Duration::from_millis(250),
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load textures: {0}")]
    Textures(#[from] TextureSetError),
    #[error("failed to enter scene: {0}")]
    Scene(#[from] SceneError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives one simulation tick per redraw until quit.
///
/// The texture set is scanned once from `app_paths.textures_dir`; a scene
/// whose load fails (missing texture) ends the run with [`AppError::Scene`].
pub fn run_app(
    config: LoopConfig,
    app_paths: AppPaths,
    factory: SceneFactory,
    initial: SceneKey,
) -> Result<(), AppError> {
    info!(
        root = %app_paths.root.display(),
        textures_dir = %app_paths.textures_dir.display(),
        "startup"
    );
    let textures = TextureSet::scan_dir(&app_paths.textures_dir)?;
    if textures.is_empty() {
        warn!(
            textures_dir = %app_paths.textures_dir.display(),
            "no_textures_registered"
        );
    } else {
        info!(texture_count = textures.len(), "textures_registered");
    }

    let mut world = SceneWorld::default();
    world.set_textures(textures);
    let mut scenes = SceneMachine::new(factory, initial, world);
    scenes.load_active()?;
    info!(
        scene = ?scenes.active_scene(),
        entity_count = scenes.active_world().entity_count(),
        "scene_loaded"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    info!(
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;
    let mut scene_failure: Option<SceneError> = None;

    event_loop
        .run(|event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    let frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);

                    let input_snapshot = input_collector.snapshot_for_tick();
                    let command = scenes.update_active(frame_dt.as_secs_f32(), &input_snapshot);
                    if let SceneCommand::SwitchTo(next_scene) = command {
                        match scenes.switch_to(next_scene) {
                            Ok(()) => info!(
                                scene = ?scenes.active_scene(),
                                entity_count = scenes.active_world().entity_count(),
                                "scene_switched"
                            ),
                            Err(err) => {
                                error!(error = %err, scene = ?next_scene, "scene_load_failed");
                                scene_failure = Some(err);
                                window_target.exit();
                                return;
                            }
                        }
                    }

                    if let Err(error) = renderer.render_world(scenes.active_world()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }

                    let next_title = scenes.hud_text_active();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(hud) => {
                                window.set_title(&format!("{} | {hud}", config.window_title))
                            }
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }

                    metrics_accumulator
                        .record_frame(raw_frame_dt, raw_frame_dt > max_frame_delta);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            max_frame_time_ms = snapshot.max_frame_time_ms,
                            clamped_frames = snapshot.clamped_frames,
                            entity_count = scenes.active_world().entity_count(),
                            scene = ?scenes.active_scene(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    match scene_failure {
        Some(err) => Err(AppError::Scene(err)),
        None => Ok(()),
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    confirm_is_down: bool,
    confirm_pressed_edge: bool,
    action_states: super::input::ActionStates,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
        self.handle_confirm_key_state(is_confirm_key(key_event.physical_key), key_event.state);
    }

    fn handle_confirm_key_state(&mut self, is_confirm_key: bool, state: ElementState) {
        if !is_confirm_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.confirm_is_down {
                    self.confirm_pressed_edge = true;
                }
                self.confirm_is_down = true;
            }
            ElementState::Released => self.confirm_is_down = false,
        }
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            key if is_confirm_key(key) => {
                self.action_states.set(InputAction::Confirm, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.confirm_pressed_edge,
            self.action_states,
        );
        self.confirm_pressed_edge = false;
        snapshot
    }
}

fn is_confirm_key(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(KeyCode::Enter)
            | PhysicalKey::Code(KeyCode::NumpadEnter)
            | PhysicalKey::Code(KeyCode::Space)
    )
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(16), max_frame_delta),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn zero_durations_fall_back() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), Duration::from_secs(1)),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn confirm_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        input.handle_confirm_key_state(true, ElementState::Pressed);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.confirm_pressed());
        assert!(!second.confirm_pressed());
    }

    #[test]
    fn held_confirm_does_not_spam_press_edges() {
        let mut input = InputCollector::default();

        input.handle_confirm_key_state(true, ElementState::Pressed);
        let first = input.snapshot_for_tick();

        input.handle_confirm_key_state(true, ElementState::Pressed);
        let second = input.snapshot_for_tick();

        input.handle_confirm_key_state(true, ElementState::Released);
        input.handle_confirm_key_state(true, ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.confirm_pressed());
        assert!(!second.confirm_pressed());
        assert!(third.confirm_pressed());
    }

    #[test]
    fn non_confirm_keys_do_not_raise_edge() {
        let mut input = InputCollector::default();
        input.handle_confirm_key_state(false, ElementState::Pressed);
        assert!(!input.snapshot_for_tick().confirm_pressed());
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveDown));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);

        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn enter_and_space_count_as_confirm() {
        assert!(is_confirm_key(PhysicalKey::Code(KeyCode::Enter)));
        assert!(is_confirm_key(PhysicalKey::Code(KeyCode::Space)));
        assert!(!is_confirm_key(PhysicalKey::Code(KeyCode::KeyE)));
    }
}
