pub(crate) struct GameScene {
    tuning: GameTuning,
    board: RunBoard,
    seed: Option<u64>,
    session: Option<GameSession>,
}

impl GameScene {
    pub(crate) fn new(tuning: GameTuning, board: RunBoard) -> Self {
        Self {
            tuning,
            board,
            seed: None,
            session: None,
        }
    }

    #[cfg(test)]
    fn seeded(tuning: GameTuning, board: RunBoard, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(tuning, board)
        }
    }
}

impl Scene for GameScene {
    fn load(&mut self, world: &mut SceneWorld) -> Result<(), SceneError> {
        require_textures(world, SceneKey::Game, &GAME_TEXTURES)?;
        let mut rng = match self.seed {
            Some(seed) => SimRng::from_seed(seed),
            None => SimRng::from_clock(),
        };
        let players = spawn_lane_layout(world, &mut rng, &self.tuning);
        self.session = Some(GameSession::new(self.tuning.clone(), rng, players));
        info!(
            entity_count = world.entity_count(),
            time_limit_seconds = self.tuning.time_limit_seconds,
            "game_scene_loaded"
        );
        Ok(())
    }

    fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(session) = self.session.as_mut() else {
            return SceneCommand::None;
        };
        let command = session.tick(dt_seconds, input, world);
        if let (SceneCommand::SwitchTo(_), Some(reason)) = (command, session.end_reason()) {
            self.board.publish(RunSummary {
                score: session.score(),
                reason,
            });
        }
        command
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.session = None;
    }

    fn hud_text(&self) -> Option<String> {
        self.session.as_ref().and_then(GameSession::hud_text)
    }
}

/// Full-screen backdrop scene that advances on confirm.
pub(crate) struct MenuScene {
    key: SceneKey,
    background: &'static str,
    board: Option<RunBoard>,
    summary: Option<RunSummary>,
}

impl MenuScene {
    pub(crate) fn new(key: SceneKey, background: &'static str, board: Option<RunBoard>) -> Self {
        Self {
            key,
            background,
            board,
            summary: None,
        }
    }
}

impl Scene for MenuScene {
    fn load(&mut self, world: &mut SceneWorld) -> Result<(), SceneError> {
        require_textures(world, self.key, &[self.background])?;
        spawn_backdrop(world, self.background);
        self.summary = self.board.as_ref().and_then(RunBoard::latest);
        if let Some(summary) = self.summary {
            info!(
                scene = ?self.key,
                score = summary.score,
                reason = summary.reason.as_token(),
                "run_summary_shown"
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
        if input.confirm_pressed() {
            SceneCommand::SwitchTo(self.key.next())
        } else {
            SceneCommand::None
        }
    }

    fn hud_text(&self) -> Option<String> {
        self.summary
            .map(|summary| format!("RESULT {}", format_score(summary.score)))
    }
}
