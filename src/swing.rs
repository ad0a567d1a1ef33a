//! Tentacle swing physics.
//!
//! ELI5:
//! ┌──────────────── Movement Modes ─────────────────────────────────┐
//! │  anchors == 0  →  Free      : input writes velocity directly    │
//! │  anchors  > 0  →  Tethered  : anchors write acceleration        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Mode is recomputed from the anchor count every step, there is  │
//! │  no memory of the previous mode and no blending between them.   │
//! └─────────────────────────────────────────────────────────────────┘
//!
//! Tethered pull for anchors a₁..aₙ from player P:
//!   θᵢ    = atan2(aᵢ.y - P.y, aᵢ.x - P.x)
//!   pull  = Σ (cos θᵢ, sin θᵢ) * strength / n
use crate::engine::physics::Body;
use crate::engine::CubicBezier;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One anchor per tentacle
pub const MAX_ANCHORS: usize = 8;

/// Swing and movement constants, loadable from the level file
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SwingTuning {
    /// Total pull, shared equally between active anchors
    pub pull_strength: f32,
    pub run_speed: f32,
    /// Upward speed of a jump, applied as negative y
    pub jump_speed: f32,
    /// Horizontal velocity added per step while tethered
    pub air_nudge: f32,
    /// How far the drawn tentacle trails behind the velocity
    pub slack_factor: f32,
}

impl Default for SwingTuning {
    fn default() -> Self {
        SwingTuning {
            pull_strength: 400.0,
            run_speed: 160.0,
            jump_speed: 330.0,
            air_nudge: 10.0,
            slack_factor: 0.2,
        }
    }
}

/// Control flags for one step, keyboard and on-screen buttons combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub release: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingMode {
    Free,
    Tethered,
}

impl SwingMode {
    pub fn for_anchor_count(count: usize) -> Self {
        if count == 0 {
            SwingMode::Free
        } else {
            SwingMode::Tethered
        }
    }
}

/// Bounded list of world positions the player is tethered to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Anchors {
    points: Vec<Vec2>,
}

impl Anchors {
    pub fn new() -> Self {
        Anchors {
            points: Vec::with_capacity(MAX_ANCHORS),
        }
    }

    /// Returns false and leaves the list untouched once every tentacle is
    /// already attached
    pub fn try_attach(&mut self, point: Vec2) -> bool {
        if self.points.len() >= MAX_ANCHORS {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn release(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }
}

/// Result of one controller step
#[derive(Debug, Clone, PartialEq)]
pub struct SwingFrame {
    pub mode: SwingMode,
    /// Acceleration written to the body, zero in free mode
    pub pull: Vec2,
    /// One curve per anchor, drawing only
    pub tentacles: Vec<CubicBezier>,
}

/// Direction from `from` to `to`, 0 when both are the same point
pub fn pull_angle(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    if delta.x == 0.0 && delta.y == 0.0 {
        return 0.0;
    }
    delta.y.atan2(delta.x)
}

pub fn pull_vector(from: Vec2, to: Vec2, magnitude: f32) -> Vec2 {
    let angle = pull_angle(from, to);
    Vec2::new(angle.cos(), angle.sin()) * magnitude
}

/// Tentacle sagging against the direction of travel. The first control
/// point is the midpoint pushed back by `velocity * slack_factor`, the
/// second sits on the anchor.
pub fn slack_curve(from: Vec2, to: Vec2, velocity: Vec2, slack_factor: f32) -> CubicBezier {
    let midpoint = (from + to) * 0.5;
    CubicBezier {
        start: from,
        control1: midpoint - velocity * slack_factor,
        control2: to,
        end: to,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SwingController {
    tuning: SwingTuning,
}

impl SwingController {
    pub fn new(tuning: SwingTuning) -> Self {
        SwingController { tuning }
    }

    /// One step of player movement. Writes acceleration (tethered) or
    /// velocity (free) to `body`, then drops every anchor when
    /// `controls.release` is set.
    pub fn step<B: Body>(
        &self,
        body: &mut B,
        anchors: &mut Anchors,
        controls: &Controls,
    ) -> SwingFrame {
        let frame = match SwingMode::for_anchor_count(anchors.len()) {
            SwingMode::Free => self.free_step(body, controls),
            SwingMode::Tethered => self.tethered_step(body, anchors, controls),
        };
        if controls.release {
            anchors.release();
        }
        frame
    }

    fn free_step<B: Body>(&self, body: &mut B, controls: &Controls) -> SwingFrame {
        body.set_acceleration(Vec2::ZERO);

        if controls.left {
            body.set_velocity_x(-self.tuning.run_speed);
        } else if controls.right {
            body.set_velocity_x(self.tuning.run_speed);
        }

        if controls.jump && body.on_floor() {
            body.set_velocity_y(-self.tuning.jump_speed);
        }

        SwingFrame {
            mode: SwingMode::Free,
            pull: Vec2::ZERO,
            tentacles: Vec::new(),
        }
    }

    fn tethered_step<B: Body>(
        &self,
        body: &mut B,
        anchors: &Anchors,
        controls: &Controls,
    ) -> SwingFrame {
        let position = body.position();
        let velocity = body.velocity();
        // non-empty in this branch
        let magnitude = self.tuning.pull_strength / anchors.len() as f32;

        let mut pull = Vec2::ZERO;
        let mut tentacles = Vec::with_capacity(anchors.len());
        for anchor in anchors.iter() {
            tentacles.push(slack_curve(
                position,
                *anchor,
                velocity,
                self.tuning.slack_factor,
            ));
            pull += pull_vector(position, *anchor, magnitude);
        }
        body.set_acceleration(pull);

        if controls.left {
            body.nudge_velocity_x(-self.tuning.air_nudge);
        } else if controls.right {
            body.nudge_velocity_x(self.tuning.air_nudge);
        }

        SwingFrame {
            mode: SwingMode::Tethered,
            pull,
            tentacles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[derive(Debug, Default)]
    struct StubBody {
        position: Vec2,
        velocity: Vec2,
        acceleration: Vec2,
        grounded: bool,
    }

    impl StubBody {
        fn at(x: f32, y: f32) -> Self {
            StubBody {
                position: Vec2::new(x, y),
                ..Default::default()
            }
        }
    }

    impl Body for StubBody {
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
            self.grounded
        }
    }

    fn anchors(points: &[(f32, f32)]) -> Anchors {
        let mut anchors = Anchors::new();
        for (x, y) in points {
            assert!(anchors.try_attach(Vec2::new(*x, *y)));
        }
        anchors
    }

    #[test]
    fn single_anchor_to_the_right() {
        let controller = SwingController::default();
        let mut body = StubBody::at(400.0, 300.0);
        let mut anchors = anchors(&[(500.0, 300.0)]);

        let frame = controller.step(&mut body, &mut anchors, &Controls::default());

        assert_eq!(pull_angle(body.position, Vec2::new(500.0, 300.0)), 0.0);
        assert_eq!(frame.mode, SwingMode::Tethered);
        assert_abs_diff_eq!(body.acceleration.x, 400.0, epsilon = 1e-3);
        assert_abs_diff_eq!(body.acceleration.y, 0.0, epsilon = 1e-3);
        assert_eq!(frame.pull, body.acceleration);
        assert_eq!(frame.tentacles.len(), 1);
        let curve = frame.tentacles[0];
        assert_eq!(curve.start, Vec2::new(400.0, 300.0));
        assert_eq!(curve.control1, Vec2::new(450.0, 300.0));
        assert_eq!(curve.control2, Vec2::new(500.0, 300.0));
        assert_eq!(curve.end, Vec2::new(500.0, 300.0));
    }

    #[test]
    fn anchor_on_the_player_pulls_along_positive_x() {
        let player = Vec2::new(120.0, 80.0);
        assert_eq!(pull_angle(player, player), 0.0);
        assert_eq!(pull_angle(Vec2::ZERO, Vec2::new(-0.0, 0.0)), 0.0);

        for count in 1..=MAX_ANCHORS {
            let controller = SwingController::default();
            let mut body = StubBody::at(player.x, player.y);
            let mut anchors = anchors(&vec![(player.x, player.y); count]);
            controller.step(&mut body, &mut anchors, &Controls::default());
            assert_abs_diff_eq!(body.acceleration.x, 400.0, epsilon = 1e-3);
            assert_abs_diff_eq!(body.acceleration.y, 0.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn strength_is_split_between_anchors() {
        let controller = SwingController::default();
        let mut body = StubBody::at(0.0, 0.0);
        // up, down, left, right cancel out
        let mut anchors = anchors(&[(0.0, -50.0), (0.0, 50.0), (-50.0, 0.0), (50.0, 0.0)]);

        let frame = controller.step(&mut body, &mut anchors, &Controls::default());

        let per_anchor = pull_vector(Vec2::ZERO, Vec2::new(0.0, 50.0), 400.0 / 4.0);
        assert_abs_diff_eq!(per_anchor.length(), 100.0, epsilon = 1e-4);
        assert_abs_diff_eq!(frame.pull.length(), 0.0, epsilon = 1e-3);
        assert_eq!(frame.tentacles.len(), 4);
    }

    #[test]
    fn pull_never_exceeds_total_strength() {
        let controller = SwingController::default();
        let mut body = StubBody::at(300.0, 300.0);
        let mut anchors = anchors(&[
            (310.0, 0.0),
            (320.0, 10.0),
            (290.0, 5.0),
            (900.0, 100.0),
            (0.0, 0.0),
            (305.0, 299.0),
            (1200.0, 250.0),
            (600.0, 20.0),
        ]);
        let frame = controller.step(&mut body, &mut anchors, &Controls::default());
        assert!(frame.pull.length() <= 400.0 + 1e-3);
        assert!(frame.pull.y < 0.0);
    }

    #[test]
    fn ninth_anchor_is_refused() {
        let mut anchors = anchors(&[(1.0, 1.0); MAX_ANCHORS]);
        let before = anchors.clone();
        assert!(!anchors.try_attach(Vec2::new(9.0, 9.0)));
        assert_eq!(anchors.len(), MAX_ANCHORS);
        assert_eq!(anchors, before);
    }

    #[test]
    fn release_empties_anchors_every_time() {
        let controller = SwingController::default();
        let mut body = StubBody::at(0.0, 0.0);
        let mut anchors = anchors(&[(10.0, 0.0), (0.0, 10.0), (5.0, 5.0)]);
        let release = Controls {
            release: true,
            ..Default::default()
        };

        let frame = controller.step(&mut body, &mut anchors, &release);
        // pull still applies on the frame the release is observed
        assert_eq!(frame.mode, SwingMode::Tethered);
        assert!(anchors.is_empty());

        let frame = controller.step(&mut body, &mut anchors, &release);
        assert_eq!(frame.mode, SwingMode::Free);
        assert!(anchors.is_empty());
    }

    #[test]
    fn leaving_tethered_mode_zeroes_acceleration() {
        let controller = SwingController::default();
        let mut body = StubBody::at(400.0, 300.0);
        body.velocity = Vec2::new(75.0, -20.0);
        let mut anchors = anchors(&[(400.0, 100.0)]);

        controller.step(&mut body, &mut anchors, &Controls::default());
        assert_abs_diff_eq!(body.acceleration.y, -400.0, epsilon = 1e-3);

        anchors.release();
        let frame = controller.step(&mut body, &mut anchors, &Controls::default());
        assert_eq!(frame.mode, SwingMode::Free);
        assert_eq!(body.acceleration, Vec2::ZERO);
        // no horizontal input: velocity left to drag
        assert_eq!(body.velocity.x, 75.0);

        let right = Controls {
            right: true,
            ..Default::default()
        };
        controller.step(&mut body, &mut anchors, &right);
        assert_eq!(body.velocity.x, 160.0);
    }

    #[test]
    fn free_mode_left_wins_over_right() {
        let controller = SwingController::default();
        let mut body = StubBody::at(0.0, 0.0);
        let both = Controls {
            left: true,
            right: true,
            ..Default::default()
        };
        controller.step(&mut body, &mut Anchors::new(), &both);
        assert_eq!(body.velocity.x, -160.0);
    }

    #[test]
    fn jump_requires_ground() {
        let controller = SwingController::default();
        let jump = Controls {
            jump: true,
            ..Default::default()
        };

        let mut airborne = StubBody::at(0.0, 0.0);
        airborne.velocity.y = 42.0;
        controller.step(&mut airborne, &mut Anchors::new(), &jump);
        assert_eq!(airborne.velocity.y, 42.0);

        let mut grounded = StubBody::at(0.0, 0.0);
        grounded.grounded = true;
        controller.step(&mut grounded, &mut Anchors::new(), &jump);
        assert_eq!(grounded.velocity.y, -330.0);
    }

    #[test]
    fn tethered_input_nudges_instead_of_setting() {
        let controller = SwingController::default();
        let mut body = StubBody::at(0.0, 0.0);
        body.velocity = Vec2::new(50.0, 0.0);
        body.grounded = true;
        let mut anchors = anchors(&[(0.0, -100.0)]);
        let controls = Controls {
            left: true,
            jump: true,
            ..Default::default()
        };

        controller.step(&mut body, &mut anchors, &controls);

        assert_eq!(body.velocity.x, 40.0);
        // jumping is a free mode action
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn slack_trails_behind_velocity() {
        let curve = slack_curve(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, -100.0),
            Vec2::new(50.0, 100.0),
            0.2,
        );
        assert_eq!(curve.control1, Vec2::new(40.0, -70.0));
        assert_eq!(curve.control2, curve.end);
    }

    #[test]
    fn mode_follows_anchor_count_only() {
        assert_eq!(SwingMode::for_anchor_count(0), SwingMode::Free);
        for count in 1..=MAX_ANCHORS {
            assert_eq!(SwingMode::for_anchor_count(count), SwingMode::Tethered);
        }
    }

    #[test]
    fn tuning_fields_default_when_missing() {
        let tuning: SwingTuning = serde_json::from_str(r#"{ "pull_strength": 800.0 }"#).unwrap();
        assert_eq!(tuning.pull_strength, 800.0);
        assert_eq!(tuning.run_speed, 160.0);
        assert_eq!(tuning.slack_factor, 0.2);
    }
}
