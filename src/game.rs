use crate::browser;
use crate::engine::input::{Input, InputEvent, PointerButton};
use crate::engine::physics::{ArcadeBody, Body, PhysicsWorld};
#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{Camera, Game, Rect, Renderer, STEP_SECONDS};
use crate::level::Level;
use crate::score::{Collectible, Scoreboard};
use crate::sprite::button::{ButtonAction, TouchButtons};
use crate::sprite::creature::Creature;
use crate::sprite::{self, palette};
use crate::swing::{Anchors, Controls, SwingController, SwingFrame, SwingMode};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use glam::Vec2;
use rand::Rng;

/// TABLE
/// ┌──────────────────────── Session::update ────────────────────────────────┐
/// │                                                                         │
/// │  1. Pointer events   primary press  ──► Anchors::try_attach (world pos) │
/// │                      secondary up   ──► Anchors::release                │
/// │  2. Controls         keyboard ∪ on-screen buttons                       │
/// │  3. SwingController  acceleration / velocity ──► player body            │
/// │                      release flag ──► Anchors::release                  │
/// │  4. Physics          player + active stars step, platforms, bounds      │
/// │  5. Scoring          player ∩ star ──► Scoreboard::collect              │
/// │  6. Camera           follow player                                      │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum TentacleSwing {
    /// Level file is being fetched
    Loading,

    /// Running scene
    Loaded(Box<Session>),
}

mod keys {
    pub const LEFT: &str = "ArrowLeft";
    pub const RIGHT: &str = "ArrowRight";
    pub const JUMP: &str = "ArrowUp";
    pub const RELEASE: &str = "KeyR";
}

// stars this far below the world are gone for good
const LOST_STAR_MARGIN: f32 = 100.0;

impl TentacleSwing {
    const LEVEL_PATH: &'static str = "level.json";

    pub fn new() -> Self {
        TentacleSwing::Loading
    }

    /// A missing or broken level file is not fatal, the built in level is
    /// the same layout
    async fn load_level() -> Level {
        match browser::fetch_json::<Level>(Self::LEVEL_PATH)
            .await
            .with_context(|| format!("Failed to load level from : {}", Self::LEVEL_PATH))
        {
            Ok(level) => {
                log::info!("Loaded level from {}", Self::LEVEL_PATH);
                level
            }
            Err(err) => {
                log::warn!("{:#}, using the built in level", err);
                Level::default()
            }
        }
    }
}

impl Default for TentacleSwing {
    fn default() -> Self {
        TentacleSwing::new()
    }
}

#[async_trait(?Send)]
impl Game for TentacleSwing {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            TentacleSwing::Loading => {
                let level = Self::load_level().await;
                let session = Session::new(level, &mut rand::thread_rng());
                Ok(Box::new(TentacleSwing::Loaded(Box::new(session))))
            }
            TentacleSwing::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, input: &Input) {
        if let TentacleSwing::Loaded(session) = self {
            session.update(input);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let TentacleSwing::Loaded(session) = self {
            session.draw(renderer);
        }
    }
}

/// Everything one play session owns, handed to the loop through `Game`
pub struct Session {
    viewport: Rect,
    world: PhysicsWorld,
    player: ArcadeBody,
    creature: Creature,
    anchors: Anchors,
    controller: SwingController,
    swing: SwingFrame,
    stars: Vec<Collectible>,
    scoreboard: Scoreboard,
    score_label: String,
    camera: Camera,
    buttons: TouchButtons,
}

impl Session {
    pub fn new(level: Level, rng: &mut impl Rng) -> Self {
        let player = level.spawn_player();
        let mut camera = Camera::new(level.viewport);
        camera.follow(player.position());
        let scoreboard = Scoreboard::new(level.stars.points);
        log::info!(
            "Session started : {} platforms, {} stars",
            level.platforms.len(),
            level.stars.count
        );
        Session {
            viewport: Rect::new(0.0, 0.0, level.viewport.x, level.viewport.y),
            world: level.physics_world(),
            stars: level.spawn_stars(rng),
            player,
            creature: Creature::default(),
            anchors: Anchors::new(),
            controller: SwingController::new(level.swing),
            swing: SwingFrame {
                mode: SwingMode::Free,
                pull: Vec2::ZERO,
                tentacles: Vec::new(),
            },
            score_label: scoreboard.label(),
            scoreboard,
            camera,
            buttons: TouchButtons::default(),
        }
    }

    pub fn update(&mut self, input: &Input) {
        for event in input.events() {
            match event {
                InputEvent::PointerDown {
                    button: PointerButton::Primary,
                    position,
                    ..
                } => {
                    let anchor = self.camera.screen_to_world(*position);
                    if !self.anchors.try_attach(anchor) {
                        log::debug!("Every tentacle is attached, ignoring {}", anchor);
                    }
                }
                InputEvent::PointerUp {
                    button: PointerButton::Secondary,
                    ..
                } => self.anchors.release(),
                _ => {}
            }
        }

        let controls = self.controls(input);
        self.swing = self
            .controller
            .step(&mut self.player, &mut self.anchors, &controls);

        self.player.step(STEP_SECONDS, &self.world);
        self.update_stars();
        self.camera.follow(self.player.position());
    }

    fn controls(&self, input: &Input) -> Controls {
        let keys = input.keys();
        let pointers = input.pointers();
        let held = |key: &str, action: ButtonAction| {
            keys.is_pressed(key) || self.buttons.is_held(action, pointers)
        };
        Controls {
            left: held(keys::LEFT, ButtonAction::Left),
            right: held(keys::RIGHT, ButtonAction::Right),
            jump: held(keys::JUMP, ButtonAction::Jump),
            release: held(keys::RELEASE, ButtonAction::Release),
        }
    }

    fn update_stars(&mut self) {
        let lost_below = self.world.bounds().bottom() + LOST_STAR_MARGIN;
        for star in self.stars.iter_mut().filter(|star| star.is_active()) {
            star.body.step(STEP_SECONDS, &self.world);
            if self.player.overlaps(&star.body) {
                if self.scoreboard.collect(star) {
                    self.score_label = self.scoreboard.label();
                }
            } else if star.body.position().y > lost_below {
                log::debug!("Star lost at {}", star.body.position());
                star.deactivate();
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        renderer.clear(&self.viewport, palette::BACKGROUND);
        renderer.with_camera(&self.camera, |renderer| {
            for platform in self.world.platforms() {
                sprite::draw_platform(renderer, platform);
            }
            for star in self.stars.iter().filter(|star| star.is_active()) {
                sprite::draw_star(renderer, &star.body.bounds());
            }
            for tentacle in &self.swing.tentacles {
                sprite::draw_tentacle(renderer, tentacle);
            }
            self.creature.draw(renderer, self.player.position());

            #[cfg(debug_assertions)]
            self.player.bounds().draw_debug(renderer);
        });
        // screen fixed
        sprite::draw_score(renderer, &self.score_label);
        self.buttons.draw(renderer);
    }

    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }

    pub fn player(&self) -> &ArcadeBody {
        &self.player
    }

    pub fn swing(&self) -> &SwingFrame {
        &self.swing
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    pub fn score_label(&self) -> &str {
        &self.score_label
    }

    pub fn active_stars(&self) -> usize {
        self.stars.iter().filter(|star| star.is_active()).count()
    }
}
