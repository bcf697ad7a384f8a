use std::fmt;

use bitflags::bitflags;

use super::components::{House, Movement, Panel, Pedestrian, Sprite, Stage};
use super::textures::TextureSet;

/// Stable slot index plus the store epoch it was issued in.
///
/// Slots are never freed mid-scene; `SceneWorld::clear` bumps the epoch so
/// handles captured before teardown stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    index: u32,
    epoch: u32,
}

impl EntityId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn epoch(self) -> u32 {
        self.epoch
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.epoch)
    }
}

bitflags! {
    /// Presence bits, one per component table or tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ComponentMask: u16 {
        const SPRITE = 1 << 0;
        const MOVEMENT = 1 << 1;
        const STAGE = 1 << 2;
        const CHARACTER = 1 << 3;
        const PLAYER = 1 << 4;
        const PANEL = 1 << 5;
        const HOUSE = 1 << 6;
        const PEDESTRIAN = 1 << 7;
        const GAME_OVER = 1 << 8;
    }
}

impl ComponentMask {
    /// Bits that carry no table data and may be set with `add_tags`.
    pub const TAGS: Self = Self::CHARACTER.union(Self::PLAYER).union(Self::GAME_OVER);
}

/// Structure-of-arrays entity store. Every table is indexed by `EntityId::index`.
#[derive(Debug, Default)]
pub struct SceneWorld {
    epoch: u32,
    masks: Vec<ComponentMask>,
    sprites: Vec<Option<Sprite>>,
    movements: Vec<Option<Movement>>,
    stages: Vec<Option<Stage>>,
    panels: Vec<Option<Panel>>,
    houses: Vec<Option<House>>,
    pedestrians: Vec<Option<Pedestrian>>,
    textures: TextureSet,
}

impl SceneWorld {
    pub fn spawn(&mut self) -> EntityId {
        let index = u32::try_from(self.masks.len()).unwrap_or(u32::MAX);
        self.masks.push(ComponentMask::empty());
        self.sprites.push(None);
        self.movements.push(None);
        self.stages.push(None);
        self.panels.push(None);
        self.houses.push(None);
        self.pedestrians.push(None);
        EntityId {
            index,
            epoch: self.epoch,
        }
    }

    /// Drops every entity at once. Handles issued before the call become stale.
    pub fn clear(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.masks.clear();
        self.sprites.clear();
        self.movements.clear();
        self.stages.clear();
        self.panels.clear();
        self.houses.clear();
        self.pedestrians.clear();
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn entity_count(&self) -> usize {
        self.masks.len()
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.slot(id).is_some()
    }

    pub fn mask(&self, id: EntityId) -> Option<ComponentMask> {
        self.slot(id).map(|slot| self.masks[slot])
    }

    pub fn has(&self, id: EntityId, required: ComponentMask) -> bool {
        self.mask(id).is_some_and(|mask| mask.contains(required))
    }

    /// Live entities whose mask contains `required`, in spawn order.
    pub fn query(&self, required: ComponentMask) -> impl Iterator<Item = EntityId> + '_ {
        let epoch = self.epoch;
        self.masks
            .iter()
            .enumerate()
            .filter(move |(_, mask)| mask.contains(required))
            .map(move |(index, _)| EntityId {
                index: index as u32,
                epoch,
            })
    }

    pub fn add_tags(&mut self, id: EntityId, tags: ComponentMask) -> bool {
        debug_assert!(ComponentMask::TAGS.contains(tags), "non-tag bits: {tags:?}");
        let Some(slot) = self.slot(id) else {
            return false;
        };
        self.masks[slot].insert(tags & ComponentMask::TAGS);
        true
    }

    pub fn insert_sprite(&mut self, id: EntityId, sprite: Sprite) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        self.sprites[slot] = Some(sprite);
        self.masks[slot].insert(ComponentMask::SPRITE);
        true
    }

    pub fn insert_movement(&mut self, id: EntityId, movement: Movement) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        self.movements[slot] = Some(movement);
        self.masks[slot].insert(ComponentMask::MOVEMENT);
        true
    }

    pub fn insert_stage(&mut self, id: EntityId, stage: Stage) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        self.stages[slot] = Some(stage);
        self.masks[slot].insert(ComponentMask::STAGE);
        true
    }

    pub fn insert_panel(&mut self, id: EntityId, panel: Panel) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        self.panels[slot] = Some(panel);
        self.masks[slot].insert(ComponentMask::PANEL);
        true
    }

    pub fn insert_house(&mut self, id: EntityId, house: House) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        self.houses[slot] = Some(house);
        self.masks[slot].insert(ComponentMask::HOUSE);
        true
    }

    pub fn insert_pedestrian(&mut self, id: EntityId, pedestrian: Pedestrian) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        self.pedestrians[slot] = Some(pedestrian);
        self.masks[slot].insert(ComponentMask::PEDESTRIAN);
        true
    }

    pub fn sprite(&self, id: EntityId) -> Option<&Sprite> {
        self.slot(id).and_then(|slot| self.sprites[slot].as_ref())
    }

    pub fn sprite_mut(&mut self, id: EntityId) -> Option<&mut Sprite> {
        let slot = self.slot(id)?;
        self.sprites[slot].as_mut()
    }

    pub fn movement(&self, id: EntityId) -> Option<&Movement> {
        self.slot(id).and_then(|slot| self.movements[slot].as_ref())
    }

    pub fn movement_mut(&mut self, id: EntityId) -> Option<&mut Movement> {
        let slot = self.slot(id)?;
        self.movements[slot].as_mut()
    }

    pub fn stage(&self, id: EntityId) -> Option<Stage> {
        self.slot(id).and_then(|slot| self.stages[slot])
    }

    pub fn panel(&self, id: EntityId) -> Option<Panel> {
        self.slot(id).and_then(|slot| self.panels[slot])
    }

    pub fn house(&self, id: EntityId) -> Option<&House> {
        self.slot(id).and_then(|slot| self.houses[slot].as_ref())
    }

    pub fn house_mut(&mut self, id: EntityId) -> Option<&mut House> {
        let slot = self.slot(id)?;
        self.houses[slot].as_mut()
    }

    pub fn pedestrian(&self, id: EntityId) -> Option<&Pedestrian> {
        self.slot(id).and_then(|slot| self.pedestrians[slot].as_ref())
    }

    pub fn pedestrian_mut(&mut self, id: EntityId) -> Option<&mut Pedestrian> {
        let slot = self.slot(id)?;
        self.pedestrians[slot].as_mut()
    }

    /// Sprite and movement of one entity, borrowed together for integration.
    pub(crate) fn sprite_and_movement_mut(
        &mut self,
        id: EntityId,
    ) -> Option<(&mut Sprite, &mut Movement)> {
        let slot = self.slot(id)?;
        let sprite = self.sprites[slot].as_mut()?;
        let movement = self.movements[slot].as_mut()?;
        Some((sprite, movement))
    }

    /// Sprites in draw order (spawn order).
    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> + '_ {
        self.sprites.iter().flatten()
    }

    pub fn set_textures(&mut self, textures: TextureSet) {
        self.textures = textures;
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    fn slot(&self, id: EntityId) -> Option<usize> {
        let slot = id.index as usize;
        (id.epoch == self.epoch && slot < self.masks.len()).then_some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::components::{Direction, Vec2};

    fn sprite_at(x: f32, y: f32) -> Sprite {
        Sprite::new("dot", Vec2::new(x, y), Vec2::new(10.0, 10.0))
    }

    #[test]
    fn spawn_issues_sequential_slots() {
        let mut world = SceneWorld::default();
        let first = world.spawn();
        let second = world.spawn();
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.mask(first), Some(ComponentMask::empty()));
    }

    #[test]
    fn inserts_set_presence_bits() {
        let mut world = SceneWorld::default();
        let id = world.spawn();
        assert!(world.insert_sprite(id, sprite_at(1.0, 2.0)));
        assert!(world.insert_movement(id, Movement::default()));
        assert!(world.insert_stage(id, Stage::Middle));
        assert!(world.add_tags(id, ComponentMask::CHARACTER | ComponentMask::PLAYER));

        let mask = world.mask(id).expect("mask");
        assert!(mask.contains(ComponentMask::SPRITE | ComponentMask::MOVEMENT));
        assert!(mask.contains(ComponentMask::STAGE | ComponentMask::PLAYER));
        assert_eq!(world.stage(id), Some(Stage::Middle));
        assert_eq!(world.sprite(id).map(|s| s.position), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn query_filters_by_signature_in_spawn_order() {
        let mut world = SceneWorld::default();
        let panel_a = world.spawn();
        world.insert_sprite(panel_a, sprite_at(0.0, 0.0));
        world.insert_panel(
            panel_a,
            Panel {
                direction: Direction::Up,
                stage: Stage::Bottom,
            },
        );
        let plain = world.spawn();
        world.insert_sprite(plain, sprite_at(5.0, 5.0));
        let panel_b = world.spawn();
        world.insert_sprite(panel_b, sprite_at(9.0, 9.0));
        world.insert_panel(
            panel_b,
            Panel {
                direction: Direction::Left,
                stage: Stage::Middle,
            },
        );

        let panels: Vec<EntityId> = world
            .query(ComponentMask::PANEL | ComponentMask::SPRITE)
            .collect();
        assert_eq!(panels, vec![panel_a, panel_b]);
        assert_eq!(world.query(ComponentMask::SPRITE).count(), 3);
    }

    #[test]
    fn clear_invalidates_previous_handles() {
        let mut world = SceneWorld::default();
        let stale = world.spawn();
        world.insert_sprite(stale, sprite_at(3.0, 3.0));
        world.clear();

        assert_eq!(world.epoch(), stale.epoch().wrapping_add(1));
        assert!(!world.is_alive(stale));
        assert!(world.sprite(stale).is_none());
        assert!(!world.insert_movement(stale, Movement::default()));

        let fresh = world.spawn();
        assert_eq!(fresh.index(), stale.index());
        assert_eq!(fresh.epoch(), world.epoch());
        assert_ne!(fresh, stale);
        assert!(world.is_alive(fresh));
        assert!(world.sprite(fresh).is_none());
    }

    #[test]
    fn clear_keeps_texture_set() {
        let mut world = SceneWorld::default();
        world.set_textures(TextureSet::from_keys(["title"]).expect("keys"));
        world.spawn();
        world.clear();
        assert!(world.textures().contains("title"));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn sprite_and_movement_borrow_requires_both() {
        let mut world = SceneWorld::default();
        let id = world.spawn();
        world.insert_sprite(id, sprite_at(0.0, 0.0));
        assert!(world.sprite_and_movement_mut(id).is_none());
        world.insert_movement(id, Movement::default());
        assert!(world.sprite_and_movement_mut(id).is_some());
    }
}
