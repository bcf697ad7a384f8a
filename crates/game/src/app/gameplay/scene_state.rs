/// Session controller of one game scene: countdown, lane eliminations, score
/// and the one-shot request to leave for the result scene.
#[derive(Debug)]
pub(crate) struct GameSession {
    tuning: GameTuning,
    rng: SimRng,
    players: LanePlayers,
    time_remaining: f32,
    lane_game_over: LaneFlags,
    score: u32,
    end_reason: Option<EndReason>,
}

impl GameSession {
    fn new(tuning: GameTuning, rng: SimRng, players: LanePlayers) -> Self {
        let time_remaining = tuning.time_limit_seconds;
        Self {
            tuning,
            rng,
            players,
            time_remaining,
            lane_game_over: LaneFlags::default(),
            score: 0,
            end_reason: None,
        }
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// `SCORE 000300  TIME 59` while running; `None` once the scene has ended.
    pub(crate) fn hud_text(&self) -> Option<String> {
        if self.end_reason.is_some() {
            return None;
        }
        Some(format!(
            "{}  {}",
            format_score(self.score),
            format_time(self.time_remaining)
        ))
    }

    /// Runs one simulation tick. Returns `SwitchTo(Result)` on exactly one tick.
    fn tick(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if self.end_reason.is_some() {
            return SceneCommand::None;
        }
        self.time_remaining = (self.time_remaining - dt_seconds).max(0.0);

        reset_velocities(world);
        let intents = resolve_panel_gates(world, &self.players, self.lane_game_over);
        apply_player_velocities(
            world,
            &self.players,
            &intents,
            input,
            self.lane_game_over,
            &self.tuning,
        );
        update_pedestrians(world, &mut self.rng, &self.tuning, dt_seconds);
        let awarded = update_houses(
            world,
            &self.players,
            self.lane_game_over,
            &mut self.rng,
            &self.tuning,
            dt_seconds,
        );
        self.score = self.score.saturating_add(awarded);

        integrate_movement(world, self.tuning.move_speed, dt_seconds);
        clamp_to_stage_bands(world, self.tuning.stage_margin);

        for stage in detect_lane_eliminations(world, &self.players, self.lane_game_over) {
            self.lane_game_over.set(stage);
            info!(lane = stage.as_token(), score = self.score, "lane_eliminated");
        }

        let reason = if self.lane_game_over.is_set(Stage::Bottom) {
            EndReason::BottomLaneEliminated
        } else if self.time_remaining <= TIMER_EPSILON {
            EndReason::TimeUp
        } else {
            return SceneCommand::None;
        };
        self.end_reason = Some(reason);
        info!(
            reason = reason.as_token(),
            score = self.score,
            time_remaining = self.time_remaining,
            "game_scene_ended"
        );
        SceneCommand::SwitchTo(SceneKey::Game.next())
    }
}
