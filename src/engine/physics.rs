//! Arcade physics: axis aligned bodies, gravity, linear drag, static
//! platforms and world bounds.
//!
//! TABLE
//! ┌────────────── ArcadeBody::step ───────────────────────────────┐
//! │ 1. velocity += (gravity + acceleration) * dt                  │
//! │ 2. drag x, only while there is no x acceleration              │
//! │ 3. position += velocity * dt                                  │
//! │ 4. separate from platforms (shallowest axis wins)             │
//! │ 5. clamp to world bounds                                      │
//! └───────────────────────────────────────────────────────────────┘
use crate::engine::Rect;
use glam::Vec2;

/// What movement code may do to a body, so it can be driven (and tested)
/// without a physics world
pub trait Body {
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;
    /// Replaces the current acceleration
    fn set_acceleration(&mut self, acceleration: Vec2);
    fn set_velocity_x(&mut self, x: f32);
    fn set_velocity_y(&mut self, y: f32);
    /// Adds to the integrated horizontal velocity
    fn nudge_velocity_x(&mut self, delta: f32);
    /// Resting on a platform or the world floor after the last step
    fn on_floor(&self) -> bool;
}

pub struct PhysicsWorld {
    bounds: Rect,
    gravity: Vec2,
    platforms: Vec<Rect>,
}

impl PhysicsWorld {
    pub fn new(bounds: Rect, gravity: Vec2) -> Self {
        PhysicsWorld {
            bounds,
            gravity,
            platforms: Vec::new(),
        }
    }

    pub fn add_platform(&mut self, platform: Rect) {
        self.platforms.push(platform);
    }

    pub fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    // below this a bounce settles instead of jittering on the surface
    fn rest_speed(&self, dt: f32) -> f32 {
        self.gravity.y.abs() * dt * 2.0
    }
}

#[derive(Debug, Clone)]
pub struct ArcadeBody {
    // center of the body
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    size: Vec2,
    drag_x: f32,
    bounce_y: f32,
    collide_world_bounds: bool,
    blocked_down: bool,
}

impl ArcadeBody {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        ArcadeBody {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            size,
            drag_x: 0.0,
            bounce_y: 0.0,
            collide_world_bounds: false,
            blocked_down: false,
        }
    }

    pub fn with_drag_x(mut self, drag_x: f32) -> Self {
        self.drag_x = drag_x;
        self
    }

    pub fn with_bounce_y(mut self, bounce_y: f32) -> Self {
        self.bounce_y = bounce_y;
        self
    }

    pub fn with_world_bounds_collision(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    pub fn overlaps(&self, other: &ArcadeBody) -> bool {
        self.bounds().intersects(&other.bounds())
    }

    pub fn step(&mut self, dt: f32, world: &PhysicsWorld) {
        self.blocked_down = false;

        self.velocity += (world.gravity + self.acceleration) * dt;
        if self.acceleration.x == 0.0 && self.drag_x > 0.0 {
            let drag = self.drag_x * dt;
            if self.velocity.x.abs() <= drag {
                self.velocity.x = 0.0;
            } else {
                self.velocity.x -= drag * self.velocity.x.signum();
            }
        }

        self.position += self.velocity * dt;

        for platform in &world.platforms {
            self.separate_from(platform, world.rest_speed(dt));
        }
        if self.collide_world_bounds {
            self.clamp_to(&world.bounds, world.rest_speed(dt));
        }
    }

    fn separate_from(&mut self, platform: &Rect, rest_speed: f32) {
        let body = self.bounds();
        if !body.intersects(platform) {
            return;
        }
        let overlap_x = (body.right() - platform.x).min(platform.right() - body.x);
        let overlap_y = (body.bottom() - platform.y).min(platform.bottom() - body.y);

        if overlap_y <= overlap_x {
            if body.center().y < platform.center().y {
                self.position.y -= body.bottom() - platform.y;
                self.blocked_down = true;
                if self.velocity.y > 0.0 {
                    self.bounce_vertical(rest_speed);
                }
            } else {
                self.position.y += platform.bottom() - body.y;
                if self.velocity.y < 0.0 {
                    self.bounce_vertical(rest_speed);
                }
            }
        } else {
            if body.center().x < platform.center().x {
                self.position.x -= body.right() - platform.x;
            } else {
                self.position.x += platform.right() - body.x;
            }
            self.velocity.x = 0.0;
        }
    }

    fn clamp_to(&mut self, bounds: &Rect, rest_speed: f32) {
        let half = self.size * 0.5;
        if self.position.x - half.x < bounds.x {
            self.position.x = bounds.x + half.x;
            self.velocity.x = self.velocity.x.max(0.0);
        } else if self.position.x + half.x > bounds.right() {
            self.position.x = bounds.right() - half.x;
            self.velocity.x = self.velocity.x.min(0.0);
        }
        if self.position.y - half.y < bounds.y {
            self.position.y = bounds.y + half.y;
            if self.velocity.y < 0.0 {
                self.bounce_vertical(rest_speed);
            }
        } else if self.position.y + half.y >= bounds.bottom() {
            self.position.y = bounds.bottom() - half.y;
            self.blocked_down = true;
            if self.velocity.y > 0.0 {
                self.bounce_vertical(rest_speed);
            }
        }
    }

    fn bounce_vertical(&mut self, rest_speed: f32) {
        self.velocity.y = -self.velocity.y * self.bounce_y;
        if self.velocity.y.abs() < rest_speed {
            self.velocity.y = 0.0;
        }
    }
}

impl Body for ArcadeBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_acceleration(&mut self, acceleration: Vec2) {
        self.acceleration = acceleration;
    }

    fn set_velocity_x(&mut self, x: f32) {
        self.velocity.x = x;
    }

    fn set_velocity_y(&mut self, y: f32) {
        self.velocity.y = y;
    }

    fn nudge_velocity_x(&mut self, delta: f32) {
        self.velocity.x += delta;
    }

    fn on_floor(&self) -> bool {
        self.blocked_down
    }
}
