use crate::engine::Renderer;
use crate::sprite::palette;
use glam::Vec2;
use std::f32::consts::TAU;

/// The player: a round body with tentacles spread evenly around it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Creature {
    pub body_radius: f32,
    pub tentacle_length: f32,
    pub tentacle_count: usize,
}

impl Default for Creature {
    fn default() -> Self {
        Creature {
            body_radius: 8.0,
            tentacle_length: 16.0,
            tentacle_count: crate::swing::MAX_ANCHORS,
        }
    }
}

impl Creature {
    /// (root, tip) of each resting tentacle, the first one points along +x
    pub fn tentacles(&self, center: Vec2) -> Vec<(Vec2, Vec2)> {
        let reach = self.body_radius + self.tentacle_length;
        (0..self.tentacle_count)
            .map(|index| {
                let angle = TAU / self.tentacle_count as f32 * index as f32;
                let direction = Vec2::new(angle.cos(), angle.sin());
                (center + direction * self.body_radius, center + direction * reach)
            })
            .collect()
    }

    pub fn draw(&self, renderer: &Renderer, center: Vec2) {
        renderer.fill_circle(center, self.body_radius, palette::WHITE);
        for (root, tip) in self.tentacles(center) {
            renderer.stroke_line(root, tip, 2.0, palette::WHITE);
        }
    }
}
