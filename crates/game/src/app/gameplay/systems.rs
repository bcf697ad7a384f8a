/// Recomputes panel presses and the movement intents they raise.
///
/// A panel standing in lane `s` is pressed by the player of lane `s` and
/// moves the player of `s.controlled_lane()`. Eliminated players press nothing.
fn resolve_panel_gates(
    world: &mut SceneWorld,
    players: &LanePlayers,
    eliminated: LaneFlags,
) -> PanelIntents {
    let mut intents = PanelIntents::default();
    let panel_ids: Vec<EntityId> = world
        .query(ComponentMask::PANEL | ComponentMask::SPRITE)
        .collect();

    for direction in Direction::ALL {
        for id in &panel_ids {
            let Some(panel) = world.panel(*id) else {
                continue;
            };
            if panel.direction != direction {
                continue;
            }
            set_frame_column(world, *id, FRAME_COLUMN_OFF);

            let Some(controlled) = panel.stage.controlled_lane() else {
                continue;
            };
            if eliminated.is_set(panel.stage) {
                continue;
            }
            let Some(presser) = players.get(panel.stage) else {
                continue;
            };
            let (Some(panel_sprite), Some(presser_sprite)) =
                (world.sprite(*id), world.sprite(presser))
            else {
                continue;
            };
            if sprites_overlap(panel_sprite, presser_sprite) {
                set_frame_column(world, *id, FRAME_COLUMN_ON);
                intents.raise(controlled, direction);
            }
        }
    }
    intents
}

/// Writes this tick's velocity for each live player.
///
/// The bottom player follows held input; the middle and top players follow
/// panel intents. Directions apply in `Direction::ALL` order and each one sets
/// its axis outright, so the later of two opposite directions wins.
fn apply_player_velocities(
    world: &mut SceneWorld,
    players: &LanePlayers,
    intents: &PanelIntents,
    input: &InputSnapshot,
    eliminated: LaneFlags,
    tuning: &GameTuning,
) {
    for stage in Stage::ALL {
        if eliminated.is_set(stage) {
            continue;
        }
        let Some(id) = players.get(stage) else {
            continue;
        };
        let speed = match stage {
            Stage::Top => tuning.top_panel_speed,
            Stage::Middle => tuning.middle_panel_speed,
            Stage::Bottom => tuning.bottom_input_speed,
        };
        let mut velocity = Vec2::ZERO;
        for direction in Direction::ALL {
            let active = match stage {
                Stage::Bottom => input.is_down(input_action_for(direction)),
                Stage::Top | Stage::Middle => intents.is_raised(stage, direction),
            };
            if !active {
                continue;
            }
            let unit = direction.unit();
            match direction {
                Direction::Up | Direction::Down => velocity.y = unit.y * speed,
                Direction::Left | Direction::Right => velocity.x = unit.x * speed,
            }
        }
        if let Some(movement) = world.movement_mut(id) {
            movement.velocity = velocity;
        }
    }
}

fn input_action_for(direction: Direction) -> InputAction {
    match direction {
        Direction::Up => InputAction::MoveUp,
        Direction::Down => InputAction::MoveDown,
        Direction::Left => InputAction::MoveLeft,
        Direction::Right => InputAction::MoveRight,
    }
}

/// Idle/moving cycle for every pedestrian.
fn update_pedestrians(
    world: &mut SceneWorld,
    rng: &mut SimRng,
    tuning: &GameTuning,
    dt_seconds: f32,
) {
    let ids: Vec<EntityId> = world
        .query(ComponentMask::PEDESTRIAN | ComponentMask::MOVEMENT)
        .collect();
    for id in ids {
        let Some(pedestrian) = world.pedestrian_mut(id) else {
            continue;
        };
        advance_pedestrian(pedestrian, rng, tuning, dt_seconds);
        let velocity = if pedestrian.is_moving {
            pedestrian.current_velocity
        } else {
            Vec2::ZERO
        };
        if let Some(movement) = world.movement_mut(id) {
            movement.velocity = velocity;
        }
    }
}

fn advance_pedestrian(
    pedestrian: &mut Pedestrian,
    rng: &mut SimRng,
    tuning: &GameTuning,
    dt_seconds: f32,
) {
    if pedestrian.is_moving {
        pedestrian.move_time_remaining -= dt_seconds;
        if pedestrian.move_time_remaining <= TIMER_EPSILON {
            pedestrian.is_moving = false;
            pedestrian.move_time_remaining = 0.0;
            pedestrian.idle_time_remaining = draw_duration(rng, tuning.pedestrian_duration);
        }
    } else {
        pedestrian.idle_time_remaining -= dt_seconds;
        if pedestrian.idle_time_remaining <= TIMER_EPSILON {
            pedestrian.is_moving = true;
            pedestrian.idle_time_remaining = 0.0;
            pedestrian.move_time_remaining = draw_duration(rng, tuning.pedestrian_duration);
            pedestrian.current_velocity = draw_pedestrian_velocity(rng, tuning.pedestrian_speed);
        }
    }
}

/// Axis first, then sign, both uniform.
fn draw_pedestrian_velocity(rng: &mut SimRng, speed: f32) -> Vec2 {
    let horizontal = rng.coin_flip();
    let sign = if rng.coin_flip() { 1.0 } else { -1.0 };
    if horizontal {
        Vec2::new(sign * speed, 0.0)
    } else {
        Vec2::new(0.0, sign * speed)
    }
}

fn draw_duration(rng: &mut SimRng, range: DurationRange) -> f32 {
    rng.range(range.min, range.max)
}

/// Advances house timers, then lets players light unlit houses.
///
/// Players are checked top lane first; only the first overlapping player
/// scores for a given house in one tick. Returns the score awarded.
fn update_houses(
    world: &mut SceneWorld,
    players: &LanePlayers,
    eliminated: LaneFlags,
    rng: &mut SimRng,
    tuning: &GameTuning,
    dt_seconds: f32,
) -> u32 {
    let ids: Vec<EntityId> = world
        .query(ComponentMask::HOUSE | ComponentMask::SPRITE)
        .collect();
    let mut awarded = 0u32;
    for id in ids {
        let Some(house) = world.house_mut(id) else {
            continue;
        };
        advance_house_timers(house, rng, tuning, dt_seconds);
        let is_lit = house.is_lit;
        let column = if is_lit {
            FRAME_COLUMN_ON
        } else {
            FRAME_COLUMN_OFF
        };
        set_frame_column(world, id, column);
        if is_lit {
            continue;
        }

        let Some(visitor) = first_visiting_lane(world, id, players, eliminated) else {
            continue;
        };
        if let Some(house) = world.house_mut(id) {
            house.is_lit = true;
            house.lit_time_remaining = tuning.house_cooldown_seconds;
            house.unlit_time_remaining = 0.0;
        }
        set_frame_column(world, id, FRAME_COLUMN_ON);
        let delta = tuning.lane_score(visitor);
        awarded = awarded.saturating_add(delta);
        debug!(
            house = %id,
            lane = visitor.as_token(),
            score_delta = delta,
            "house_lit_by_player"
        );
    }
    awarded
}

fn advance_house_timers(
    house: &mut House,
    rng: &mut SimRng,
    tuning: &GameTuning,
    dt_seconds: f32,
) {
    if house.is_lit {
        house.lit_time_remaining -= dt_seconds;
        if house.lit_time_remaining <= TIMER_EPSILON {
            house.is_lit = false;
            house.lit_time_remaining = 0.0;
            house.unlit_time_remaining = draw_duration(rng, tuning.house_duration);
        }
    } else {
        house.unlit_time_remaining -= dt_seconds;
        if house.unlit_time_remaining <= TIMER_EPSILON {
            house.is_lit = true;
            house.unlit_time_remaining = 0.0;
            house.lit_time_remaining = draw_duration(rng, tuning.house_duration);
        }
    }
}

fn first_visiting_lane(
    world: &SceneWorld,
    house: EntityId,
    players: &LanePlayers,
    eliminated: LaneFlags,
) -> Option<Stage> {
    let house_sprite = world.sprite(house)?;
    Stage::ALL.into_iter().find(|stage| {
        !eliminated.is_set(*stage)
            && players
                .get(*stage)
                .and_then(|player| world.sprite(player))
                .is_some_and(|player_sprite| sprites_overlap(house_sprite, player_sprite))
    })
}

/// Clamps every staged entity into its lane band, inset by `margin` and its own half extent.
fn clamp_to_stage_bands(world: &mut SceneWorld, margin: f32) {
    let ids: Vec<EntityId> = world
        .query(ComponentMask::STAGE | ComponentMask::SPRITE)
        .collect();
    for id in ids {
        let Some(stage) = world.stage(id) else {
            continue;
        };
        let Some(sprite) = world.sprite_mut(id) else {
            continue;
        };
        let bounds = clamp_bounds(stage, sprite.half_extent(), margin);
        sprite.position = bounds.clamp_point(sprite.position);
    }
}

/// Marks lanes whose player touches any pedestrian. Returns the newly eliminated lanes.
fn detect_lane_eliminations(
    world: &mut SceneWorld,
    players: &LanePlayers,
    eliminated: LaneFlags,
) -> Vec<Stage> {
    let pedestrian_ids: Vec<EntityId> = world
        .query(ComponentMask::PEDESTRIAN | ComponentMask::SPRITE)
        .collect();
    let mut newly_eliminated = Vec::new();
    for stage in Stage::ALL {
        if eliminated.is_set(stage) {
            continue;
        }
        let Some(player) = players.get(stage) else {
            continue;
        };
        let Some(player_sprite) = world.sprite(player) else {
            continue;
        };
        let hit = pedestrian_ids.iter().any(|pedestrian| {
            world
                .sprite(*pedestrian)
                .is_some_and(|sprite| sprites_overlap(player_sprite, sprite))
        });
        if !hit {
            continue;
        }
        world.add_tags(player, ComponentMask::GAME_OVER);
        if let Some(movement) = world.movement_mut(player) {
            movement.velocity = Vec2::ZERO;
        }
        if let Some(sprite) = world.sprite_mut(player) {
            sprite.tint = ELIMINATED_TINT;
        }
        newly_eliminated.push(stage);
    }
    newly_eliminated
}

fn set_frame_column(world: &mut SceneWorld, id: EntityId, column: u32) {
    if let Some(sprite) = world.sprite_mut(id) {
        sprite.frame.column = column;
    }
}
