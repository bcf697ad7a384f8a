use super::components::Vec2;
use super::world::{ComponentMask, SceneWorld};

/// Zeroes every movement component; behaviors write fresh velocities each tick.
pub fn reset_velocities(world: &mut SceneWorld) {
    let ids: Vec<_> = world.query(ComponentMask::MOVEMENT).collect();
    for id in ids {
        if let Some(movement) = world.movement_mut(id) {
            movement.velocity = Vec2::ZERO;
        }
    }
}

/// `velocity *= speed * dt; position += velocity` for every sprite with movement.
pub fn integrate_movement(world: &mut SceneWorld, speed: f32, dt_seconds: f32) {
    let scale = speed * dt_seconds;
    let ids: Vec<_> = world
        .query(ComponentMask::MOVEMENT | ComponentMask::SPRITE)
        .collect();
    for id in ids {
        let Some((sprite, movement)) = world.sprite_and_movement_mut(id) else {
            continue;
        };
        movement.velocity.x *= scale;
        movement.velocity.y *= scale;
        sprite.position.x += movement.velocity.x;
        sprite.position.y += movement.velocity.y;
    }
}
