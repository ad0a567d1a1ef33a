use crate::engine::physics::ArcadeBody;

/// A star. Once collected (or lost off the bottom of the world) it is neither
/// simulated nor drawn again.
#[derive(Debug, Clone)]
pub struct Collectible {
    pub body: ArcadeBody,
    active: bool,
}

impl Collectible {
    pub fn new(body: ArcadeBody) -> Self {
        Collectible { body, active: true }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    score: u32,
    points_per_item: u32,
}

impl Scoreboard {
    pub fn new(points_per_item: u32) -> Self {
        Scoreboard {
            score: 0,
            points_per_item,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Overlap callback between player and `item`. Returns whether it
    /// scored, an inactive item never does.
    pub fn collect(&mut self, item: &mut Collectible) -> bool {
        if !item.is_active() {
            return false;
        }
        item.deactivate();
        self.score = self.score.saturating_add(self.points_per_item);
        true
    }

    pub fn label(&self) -> String {
        format!("Score: {}", self.score)
    }
}
