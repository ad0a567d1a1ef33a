// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Procedural Sprites                                  │
// ├────────────────┬─────────────────────────────────────────────────────────┤
// │ creature.rs    │ player: body circle + 8 radial tentacles                │
// │ button.rs      │ on-screen controls, screen space, held by pointer       │
// │ mod.rs         │ palette + star / platform / tentacle drawing            │
// └────────────────┴─────────────────────────────────────────────────────────┘
// Nothing is loaded from disk, every shape is drawn with canvas primitives.
use crate::engine::{CubicBezier, Rect, Renderer};
use glam::Vec2;

pub mod button;
pub mod creature;

pub mod palette {
    pub const BACKGROUND: &str = "#000000";
    pub const WHITE: &str = "#FFFFFF";
    pub const STAR: &str = "#FFFF00";
    pub const BUTTON: &str = "rgba(255, 255, 255, 0.5)";
    pub const RELEASE_BUTTON: &str = "rgba(255, 0, 0, 0.5)";
}

const TENTACLE_WIDTH: f32 = 2.0;

pub fn draw_platform(renderer: &Renderer, platform: &Rect) {
    renderer.fill_rect(platform, palette::WHITE);
}

/// Stars are drawn as circles filling their body
pub fn draw_star(renderer: &Renderer, bounds: &Rect) {
    renderer.fill_circle(bounds.center(), bounds.width.min(bounds.height) * 0.5, palette::STAR);
}

pub fn draw_tentacle(renderer: &Renderer, curve: &CubicBezier) {
    renderer.stroke_curve(curve, TENTACLE_WIDTH, palette::WHITE);
}

pub fn draw_score(renderer: &Renderer, label: &str) {
    renderer.fill_text(label, Vec2::new(16.0, 16.0), "32px sans-serif", palette::WHITE);
}
