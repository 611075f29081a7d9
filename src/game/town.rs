use std::sync::{
    Arc,
    Mutex,
    MutexGuard
};

use crate::rendering::Canvas;

use super::{
    building::{Building, BuildingStyle},
    math::Vector2I
};

pub type SharedTown = Arc<Mutex<Town>>;

/// A panic while holding the lock cannot leave the building list half
/// written, so a poisoned lock is recovered instead of propagated.
pub fn lock_town(town: &SharedTown) -> MutexGuard<'_, Town> {
    town.lock().unwrap_or_else(|poisoned| {
        log::warn!("Town lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

#[derive(Debug, Default)]
pub struct Town {
    buildings: Vec<Building>,
}

impl Town {
    pub fn new() -> Self {
        log::info!("Town created");
        Self {
            buildings: vec![],
        }
    }

    pub fn into_shared(self) -> SharedTown {
        Arc::new(Mutex::new(self))
    }

    // Occupied cells are allowed, the buildings overlap.
    pub fn place_building(&mut self, x: f32, y: f32, style: BuildingStyle) -> Vector2I {
        let building = Building::at_touch(x, y, style);
        let position = building.position();
        log::debug!("Placing building #{} at {} (touch [{x},{y}])", self.buildings.len(), position);
        self.buildings.push(building);
        position
    }

    pub fn push(&mut self, building: Building) {
        self.buildings.push(building);
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn iter_buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    pub fn update(&mut self, delta_seconds: f32) {
        log::trace!("Town tick, delta={delta_seconds}");
        self.buildings.iter_mut().for_each(|b| b.update(delta_seconds));
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        self.buildings.iter().for_each(|b| b.draw(canvas));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_town_creation() {
        let town = Town::new();
        assert!(town.is_empty());
        assert_eq!(town.len(), 0);
    }

    #[test]
    fn test_place_building_snaps_and_keeps_order() {
        let mut town = Town::new();
        let first = town.place_building(130.0, 5.0, BuildingStyle::default());
        let second = town.place_building(10.0, 300.0, BuildingStyle::default());

        assert_eq!(first, Vector2I::new(128, 0));
        assert_eq!(second, Vector2I::new(0, 256));

        let positions: Vec<_> = town.iter_buildings().map(Building::position).collect();
        assert_eq!(positions, vec![first, second]);
    }

    #[test]
    fn test_duplicate_cells_are_kept() {
        let mut town = Town::new();
        town.place_building(140.0, 140.0, BuildingStyle::default());
        town.place_building(200.0, 250.0, BuildingStyle::default());

        assert_eq!(town.len(), 2);
        assert!(town.iter_buildings().all(|b| b.position() == Vector2I::new(128, 128)));
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let town = Town::new().into_shared();
        let town_shared = town.clone();

        let _ = std::thread::spawn(move || {
            let mut guard = town_shared.lock().unwrap();
            guard.place_building(0.0, 0.0, BuildingStyle::default());
            panic!("holding the town lock");
        }).join();

        assert!(town.is_poisoned());
        assert_eq!(lock_town(&town).len(), 1);
    }
}
