/// Full-width screen band of a lane; lanes stack top to bottom.
fn stage_band(stage: Stage) -> Rect {
    let top = STAGE_HEIGHT * stage.index() as f32;
    Rect::new(Vec2::new(0.0, top), Vec2::new(LOGICAL_WIDTH, top + STAGE_HEIGHT))
}

fn clamp_bounds(stage: Stage, half_extent: Vec2, margin: f32) -> Rect {
    stage_band(stage).shrink(Vec2::new(half_extent.x + margin, half_extent.y + margin))
}

fn lane_center_y(stage: Stage) -> f32 {
    let band = stage_band(stage);
    (band.min.y + band.max.y) * 0.5
}

fn lane_tint(stage: Stage) -> Rgba {
    match stage {
        Stage::Top => Rgba::new(1.0, 0.55, 0.55, 1.0),
        Stage::Middle => Rgba::new(0.55, 1.0, 0.55, 1.0),
        Stage::Bottom => Rgba::new(0.55, 0.7, 1.0, 1.0),
    }
}

fn spawn_player(world: &mut SceneWorld, stage: Stage, position: Vec2) -> EntityId {
    let id = world.spawn();
    world.insert_sprite(
        id,
        Sprite::new(TEXTURE_PLAYER, position, PLAYER_SIZE).with_tint(lane_tint(stage)),
    );
    world.insert_movement(id, Movement::default());
    world.insert_stage(id, stage);
    world.add_tags(id, ComponentMask::CHARACTER | ComponentMask::PLAYER);
    id
}

fn spawn_pedestrian(
    world: &mut SceneWorld,
    stage: Stage,
    position: Vec2,
    pedestrian: Pedestrian,
) -> EntityId {
    let id = world.spawn();
    world.insert_sprite(id, Sprite::new(TEXTURE_PEDESTRIAN, position, PEDESTRIAN_SIZE));
    world.insert_movement(id, Movement::default());
    world.insert_stage(id, stage);
    world.insert_pedestrian(id, pedestrian);
    world.add_tags(id, ComponentMask::CHARACTER);
    id
}

/// Panel atlas: column is released/pressed, row is the direction.
fn spawn_panel(world: &mut SceneWorld, panel: Panel, position: Vec2) -> EntityId {
    let id = world.spawn();
    let mut frame = AtlasFrame::grid(2, 4);
    frame.row = panel.direction.index() as u32;
    world.insert_sprite(
        id,
        Sprite::new(TEXTURE_PANEL, position, PANEL_SIZE).with_frame(frame),
    );
    world.insert_panel(id, panel);
    id
}

fn spawn_house(world: &mut SceneWorld, position: Vec2, house: House) -> EntityId {
    let id = world.spawn();
    let mut frame = AtlasFrame::grid(2, 1);
    frame.column = if house.is_lit {
        FRAME_COLUMN_ON
    } else {
        FRAME_COLUMN_OFF
    };
    world.insert_sprite(
        id,
        Sprite::new(TEXTURE_HOUSE, position, HOUSE_SIZE).with_frame(frame),
    );
    world.insert_house(id, house);
    id
}

fn spawn_backdrop(world: &mut SceneWorld, texture: &str) -> EntityId {
    let id = world.spawn();
    let mut sprite = Sprite::new(
        texture,
        Vec2::new(LOGICAL_WIDTH * 0.5, LOGICAL_HEIGHT * 0.5),
        Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT),
    );
    sprite.depth = -1.0;
    world.insert_sprite(id, sprite);
    id
}

fn panel_offset(direction: Direction) -> Vec2 {
    let unit = direction.unit();
    Vec2::new(unit.x * PANEL_SPACING, unit.y * PANEL_SPACING)
}

fn random_house(rng: &mut SimRng, range: DurationRange) -> House {
    let duration = rng.range(range.min, range.max);
    if rng.coin_flip() {
        House {
            is_lit: true,
            lit_time_remaining: duration,
            unlit_time_remaining: 0.0,
        }
    } else {
        House {
            is_lit: false,
            lit_time_remaining: 0.0,
            unlit_time_remaining: duration,
        }
    }
}

/// Spawns the fixed lane layout and returns the player handles.
///
/// Each lane gets a player, two pedestrians and two houses. The bottom and
/// middle lanes also get a cross of four panels driving the lane above.
fn spawn_lane_layout(
    world: &mut SceneWorld,
    rng: &mut SimRng,
    tuning: &GameTuning,
) -> LanePlayers {
    spawn_backdrop(world, TEXTURE_GAME_BG);
    let mut players = LanePlayers::default();
    for stage in Stage::ALL {
        let center_y = lane_center_y(stage);

        if stage.controlled_lane().is_some() {
            for direction in Direction::ALL {
                let offset = panel_offset(direction);
                spawn_panel(
                    world,
                    Panel { direction, stage },
                    Vec2::new(PANEL_CLUSTER_X + offset.x, center_y + offset.y),
                );
            }
        }

        for x in HOUSE_SPAWN_XS {
            let house = random_house(rng, tuning.house_duration);
            spawn_house(world, Vec2::new(x, center_y), house);
        }

        for (x, offset_y) in PEDESTRIAN_SPAWN_XS.into_iter().zip(PEDESTRIAN_OFFSETS_Y) {
            let idle = rng.range(tuning.pedestrian_duration.min, tuning.pedestrian_duration.max);
            let position = Vec2::new(x, center_y + offset_y);
            spawn_pedestrian(world, stage, position, Pedestrian::idle_for(idle));
        }

        let player = spawn_player(world, stage, Vec2::new(PLAYER_SPAWN_X, center_y));
        players.set(stage, player);
    }
    players
}

fn format_score(score: u32) -> String {
    format!("SCORE {score:06}")
}

fn format_time(time_remaining: f32) -> String {
    format!("TIME {}", time_remaining.max(0.0).ceil() as u32)
}
