//! Platform registry
//!
//! Owns every live platform from spawn until it drifts behind the player
//! (or the run is cleared). Platforms move toward -z at a single shared speed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ring::RingPosition;
use crate::consts::TRANSIT_RADIUS_FACTOR;

/// Opaque platform id, never reused within a spawner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformHandle(u32);

impl PlatformHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Cosmetic platform tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformColor {
    #[default]
    Red,
    Blue,
    Green,
}

impl PlatformColor {
    pub const ALL: [PlatformColor; 3] = [PlatformColor::Red, PlatformColor::Blue, PlatformColor::Green];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

/// Slide from the outer anchor onto the ring placement
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transit {
    pub from: Vec2,
    pub elapsed: f32,
    pub duration: f32,
}

impl Transit {
    /// Fraction complete in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// A live platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub handle: PlatformHandle,
    pub position: RingPosition,
    /// Forward-axis position of the platform center
    pub z: f32,
    /// Length along the forward axis
    pub scale: f32,
    pub speed: f32,
    pub color: PlatformColor,
    /// Final lateral/vertical placement
    pub target: Vec2,
    /// Current lateral/vertical placement (differs from target while in transit)
    pub placement: Vec2,
    pub transit: Option<Transit>,
}

impl Platform {
    /// Whether forward position `z` lies on this platform
    pub fn covers(&self, z: f32) -> bool {
        (z - self.z).abs() <= self.scale * 0.5
    }

    pub fn in_transit(&self) -> bool {
        self.transit.is_some()
    }

    fn advance(&mut self, dt: f32) {
        self.z -= self.speed * dt;

        if let Some(transit) = self.transit.as_mut() {
            transit.elapsed += dt;
            let t = transit.progress();
            self.placement = transit.from.lerp(self.target, t);
            if t >= 1.0 {
                self.placement = self.target;
                self.transit = None;
            }
        }
    }
}

/// World layout used to place platforms
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnLayout {
    pub ring_radius: f32,
    /// Forward position of the spawn anchor (forward offset 0)
    pub spawn_z: f32,
    /// Platforms whose center falls below this are destroyed
    pub despawn_z: f32,
    pub transit_secs: f32,
}

impl Default for SpawnLayout {
    fn default() -> Self {
        Self {
            ring_radius: 2.0,
            spawn_z: 60.0,
            despawn_z: -10.0,
            transit_secs: 1.0,
        }
    }
}

/// Registry of live platforms
#[derive(Debug, Clone)]
pub struct PlatformSpawner {
    layout: SpawnLayout,
    /// Live platforms, ordered by handle
    platforms: Vec<Platform>,
    speed: f32,
    color: PlatformColor,
    next_id: u32,
}

impl PlatformSpawner {
    pub fn new(layout: SpawnLayout) -> Self {
        Self {
            layout,
            platforms: Vec::new(),
            speed: 0.0,
            color: PlatformColor::default(),
            next_id: 1,
        }
    }

    pub fn layout(&self) -> &SpawnLayout {
        &self.layout
    }

    /// Create and register a platform
    pub fn spawn(
        &mut self,
        position: RingPosition,
        speed: f32,
        forward_offset: f32,
        scale: f32,
        translates_into_view: bool,
    ) -> PlatformHandle {
        let handle = PlatformHandle(self.next_id);
        self.next_id += 1;

        let target = position.placement(self.layout.ring_radius);
        let transit = (translates_into_view && self.layout.transit_secs > 0.0).then(|| Transit {
            from: position.placement(self.layout.ring_radius * TRANSIT_RADIUS_FACTOR),
            elapsed: 0.0,
            duration: self.layout.transit_secs,
        });
        let placement = transit.map(|t| t.from).unwrap_or(target);

        self.speed = speed;
        self.platforms.push(Platform {
            handle,
            position,
            z: self.layout.spawn_z + forward_offset,
            scale,
            speed,
            color: self.color,
            target,
            placement,
            transit,
        });
        handle
    }

    /// Remove a platform; no-op if it is already gone
    pub fn destroy(&mut self, handle: PlatformHandle) -> bool {
        match self.platforms.binary_search_by_key(&handle, |p| p.handle) {
            Ok(index) => {
                self.platforms.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Drop every platform (run restart)
    pub fn clear_all(&mut self) {
        if !self.platforms.is_empty() {
            log::debug!("Clearing {} platforms", self.platforms.len());
        }
        self.platforms.clear();
    }

    /// Apply a new speed to every live platform at once
    pub fn update_speed(&mut self, speed: f32) {
        self.speed = speed;
        for platform in &mut self.platforms {
            platform.speed = speed;
        }
    }

    /// Retint every live platform (and those spawned later)
    pub fn update_color(&mut self, color: PlatformColor) {
        self.color = color;
        for platform in &mut self.platforms {
            platform.color = color;
        }
    }

    /// Move platforms by one step and destroy those behind the player.
    /// Returns the handles destroyed this step.
    pub fn advance(&mut self, dt: f32) -> Vec<PlatformHandle> {
        for platform in &mut self.platforms {
            platform.advance(dt);
        }

        let despawn_z = self.layout.despawn_z;
        let passed: Vec<PlatformHandle> = self
            .platforms
            .iter()
            .filter(|p| p.z < despawn_z)
            .map(|p| p.handle)
            .collect();
        for &handle in &passed {
            self.destroy(handle);
        }
        passed
    }

    pub fn get(&self, handle: PlatformHandle) -> Option<&Platform> {
        self.platforms
            .binary_search_by_key(&handle, |p| p.handle)
            .ok()
            .map(|i| &self.platforms[i])
    }

    /// Live platform at `position` covering forward position `z`
    pub fn platform_under(&self, z: f32, position: RingPosition) -> Option<&Platform> {
        self.platforms
            .iter()
            .find(|p| p.position == position && p.covers(z))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn color(&self) -> PlatformColor {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawner() -> PlatformSpawner {
        PlatformSpawner::new(SpawnLayout::default())
    }

    #[test]
    fn test_spawn_registers_and_places() {
        let mut s = spawner();
        let h = s.spawn(RingPosition::Right, 6.0, -5.0, 3.0, false);
        assert_eq!(s.len(), 1);

        let p = s.get(h).expect("registered");
        assert_eq!(p.position, RingPosition::Right);
        assert_eq!(p.z, 55.0);
        assert_eq!(p.speed, 6.0);
        assert!(!p.in_transit());
        assert!((p.placement.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut s = spawner();
        let a = s.spawn(RingPosition::Bot, 6.0, 0.0, 3.0, false);
        s.destroy(a);
        let b = s.spawn(RingPosition::Bot, 6.0, 0.0, 3.0, false);
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut s = spawner();
        let h = s.spawn(RingPosition::Bot, 6.0, 0.0, 3.0, false);
        assert!(s.destroy(h));
        assert!(!s.destroy(h));
        assert!(s.is_empty());
    }

    #[test]
    fn test_clear_all_twice() {
        let mut s = spawner();
        for _ in 0..4 {
            s.spawn(RingPosition::Top, 6.0, 0.0, 3.0, true);
        }
        s.clear_all();
        assert!(s.is_empty());
        s.clear_all();
        assert!(s.is_empty());
    }

    #[test]
    fn test_update_speed_applies_to_all() {
        let mut s = spawner();
        let handles: Vec<_> = (0..5)
            .map(|i| s.spawn(RingPosition::from_index(i), 6.0, -(i as f32) * 4.0, 3.0, false))
            .collect();
        s.update_speed(6.8);
        for h in handles {
            assert_eq!(s.get(h).map(|p| p.speed), Some(6.8));
        }
        assert_eq!(s.speed(), 6.8);
    }

    #[test]
    fn test_advance_moves_and_despawns() {
        let mut s = PlatformSpawner::new(SpawnLayout {
            spawn_z: 1.0,
            despawn_z: 0.0,
            ..SpawnLayout::default()
        });
        let near = s.spawn(RingPosition::Bot, 10.0, 0.0, 1.0, false);
        let far = s.spawn(RingPosition::Bot, 10.0, 5.0, 1.0, false);

        let gone = s.advance(0.05);
        assert!(gone.is_empty());
        assert!((s.get(near).map(|p| p.z).unwrap_or_default() - 0.5).abs() < 1e-5);

        let gone = s.advance(0.1);
        assert_eq!(gone, vec![near]);
        assert!(s.get(near).is_none());
        assert!(s.get(far).is_some());
    }

    #[test]
    fn test_transit_slides_onto_ring() {
        let mut s = spawner();
        let h = s.spawn(RingPosition::Bot, 0.0, 0.0, 3.0, true);
        let start = s.get(h).map(|p| p.placement).unwrap_or_default();
        assert!((start.y + 5.0).abs() < 1e-4);

        s.advance(0.5);
        let mid = s.get(h).map(|p| p.placement).unwrap_or_default();
        assert!((mid.y + 3.5).abs() < 1e-4);

        s.advance(0.6);
        let p = s.get(h).expect("still live");
        assert!(!p.in_transit());
        assert_eq!(p.placement, p.target);
    }

    #[test]
    fn test_color_applies_to_live_and_future() {
        let mut s = spawner();
        let a = s.spawn(RingPosition::Bot, 6.0, 0.0, 3.0, false);
        s.update_color(PlatformColor::Green);
        let b = s.spawn(RingPosition::Bot, 6.0, 0.0, 3.0, false);
        assert_eq!(s.get(a).map(|p| p.color), Some(PlatformColor::Green));
        assert_eq!(s.get(b).map(|p| p.color), Some(PlatformColor::Green));
    }

    #[test]
    fn test_platform_under() {
        let mut s = spawner();
        s.spawn(RingPosition::Left, 6.0, -60.0, 4.0, false);
        assert!(s.platform_under(1.5, RingPosition::Left).is_some());
        assert!(s.platform_under(2.5, RingPosition::Left).is_none());
        assert!(s.platform_under(0.0, RingPosition::Right).is_none());
    }
}
