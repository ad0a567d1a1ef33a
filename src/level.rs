//! Level description. Every field has a default, so `level.json` only needs
//! the values it changes, and the built in level is `Level::default()`.
use crate::engine::physics::{ArcadeBody, PhysicsWorld};
use crate::engine::Rect;
use crate::score::Collectible;
use crate::swing::SwingTuning;
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Level {
    pub world_size: Vec2,
    /// Canvas size in pixels
    pub viewport: Vec2,
    pub gravity: Vec2,
    pub player: PlayerSpawn,
    pub platforms: Vec<Platform>,
    pub stars: StarField,
    pub swing: SwingTuning,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerSpawn {
    pub position: Vec2,
    pub size: Vec2,
    pub drag_x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Platform {
    pub center: Vec2,
    pub size: Vec2,
}

/// A row of stars dropped from `first`, one every `step_x`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StarField {
    pub count: usize,
    pub first: Vec2,
    pub step_x: f32,
    pub size: Vec2,
    pub bounce_min: f32,
    pub bounce_max: f32,
    pub points: u32,
}

impl Default for Level {
    fn default() -> Self {
        Level {
            world_size: Vec2::new(3200.0, 600.0),
            viewport: Vec2::new(800.0, 600.0),
            gravity: Vec2::new(0.0, 300.0),
            player: PlayerSpawn::default(),
            platforms: vec![
                Platform::new(400.0, 568.0, 800.0, 32.0),
                Platform::new(1200.0, 400.0, 400.0, 32.0),
                Platform::new(1800.0, 250.0, 300.0, 32.0),
                Platform::new(2500.0, 500.0, 500.0, 32.0),
            ],
            stars: StarField::default(),
            swing: SwingTuning::default(),
        }
    }
}

impl Default for PlayerSpawn {
    fn default() -> Self {
        PlayerSpawn {
            position: Vec2::new(400.0, 300.0),
            size: Vec2::new(64.0, 64.0),
            drag_x: 100.0,
        }
    }
}

impl Default for StarField {
    fn default() -> Self {
        StarField {
            count: 31,
            first: Vec2::new(12.0, 0.0),
            step_x: 100.0,
            size: Vec2::new(32.0, 32.0),
            bounce_min: 0.4,
            bounce_max: 0.8,
            points: 10,
        }
    }
}

impl Platform {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Platform {
            center: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }
}

impl Level {
    pub fn world_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.world_size.x, self.world_size.y)
    }

    pub fn physics_world(&self) -> PhysicsWorld {
        let mut world = PhysicsWorld::new(self.world_bounds(), self.gravity);
        for platform in &self.platforms {
            world.add_platform(platform.rect());
        }
        world
    }

    pub fn spawn_player(&self) -> ArcadeBody {
        ArcadeBody::new(self.player.position, self.player.size)
            .with_drag_x(self.player.drag_x)
            .with_world_bounds_collision()
    }

    /// Each star gets its own vertical bounce in `[bounce_min, bounce_max)`
    pub fn spawn_stars(&self, rng: &mut impl Rng) -> Vec<Collectible> {
        let field = &self.stars;
        (0..field.count)
            .map(|index| {
                let position = field.first + Vec2::new(field.step_x * index as f32, 0.0);
                let bounce = if field.bounce_min < field.bounce_max {
                    rng.gen_range(field.bounce_min..field.bounce_max)
                } else {
                    field.bounce_min
                };
                Collectible::new(ArcadeBody::new(position, field.size).with_bounce_y(bounce))
            })
            .collect()
    }
}
