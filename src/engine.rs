use crate::browser;
use anyhow::{anyhow, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::CanvasRenderingContext2d;

pub mod input;
pub mod physics;

use self::input::Input;

/// Lifecycle seam between the loop and a scene
/// - initialize : asset setup + scene construction, runs once
/// - update     : one fixed step, input already drained for this step
/// - draw       : once per animation frame
#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, input: &Input);
    fn draw(&self, renderer: &Renderer);
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;
/// Length of a fixed update step in seconds
pub const STEP_SECONDS: f32 = FRAME_SIZE / 1000.0;
// a backgrounded tab comes back with seconds of delta, don't replay them all
const MAX_STEPS_PER_FRAME: f32 = 8.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut input = Input::prepare()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            game_loop.accumulated_delta += (perf - game_loop.last_frame) as f32;
            game_loop.accumulated_delta = game_loop
                .accumulated_delta
                .min(FRAME_SIZE * MAX_STEPS_PER_FRAME);
            while game_loop.accumulated_delta > FRAME_SIZE {
                // drain queued browser events before the step reads them
                input.poll();
                game.update(&input);
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);
            if let Some(callback) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(callback) {
                    log::error!("GameLoop stopped : {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

/// Axis aligned rectangle, `x`/`y` is the top left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Rect::new(
            center.x - size.x * 0.5,
            center.y - size.y * 0.5,
            size.x,
            size.y,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Edges count as inside
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Touching edges do not count as an intersection
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Cubic Bezier curve from `start` to `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

/// Viewport into the world, `scroll` is the world position of the top left
/// corner of the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scroll: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Camera {
            scroll: Vec2::ZERO,
            viewport,
        }
    }

    /// Center the viewport on `target`, no bounds clamping
    pub fn follow(&mut self, target: Vec2) {
        self.scroll = target - self.viewport * 0.5;
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.scroll
    }
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect, color: &str) {
        self.context.clear_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
        self.fill_rect(rect, color);
    }

    pub fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.fill_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn stroke_rect(&self, rect: &Rect, width: f32, color: &str) {
        self.context.set_stroke_style_str(color);
        self.context.set_line_width(width.into());
        self.context.stroke_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn fill_circle(&self, center: Vec2, radius: f32, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.begin_path();
        if let Err(err) = self.context.arc(
            center.x.into(),
            center.y.into(),
            radius.into(),
            0.0,
            std::f64::consts::TAU,
        ) {
            log::warn!("Renderer::fill_circle failed : {:#?}", err);
            return;
        }
        self.context.fill();
    }

    pub fn fill_triangle(&self, points: [Vec2; 3], color: &str) {
        self.context.set_fill_style_str(color);
        self.context.begin_path();
        self.context.move_to(points[0].x.into(), points[0].y.into());
        self.context.line_to(points[1].x.into(), points[1].y.into());
        self.context.line_to(points[2].x.into(), points[2].y.into());
        self.context.close_path();
        self.context.fill();
    }

    pub fn stroke_line(&self, from: Vec2, to: Vec2, width: f32, color: &str) {
        self.context.set_stroke_style_str(color);
        self.context.set_line_width(width.into());
        self.context.begin_path();
        self.context.move_to(from.x.into(), from.y.into());
        self.context.line_to(to.x.into(), to.y.into());
        self.context.stroke();
    }

    pub fn stroke_curve(&self, curve: &CubicBezier, width: f32, color: &str) {
        self.context.set_stroke_style_str(color);
        self.context.set_line_width(width.into());
        self.context.begin_path();
        self.context.move_to(curve.start.x.into(), curve.start.y.into());
        self.context.bezier_curve_to(
            curve.control1.x.into(),
            curve.control1.y.into(),
            curve.control2.x.into(),
            curve.control2.y.into(),
            curve.end.x.into(),
            curve.end.y.into(),
        );
        self.context.stroke();
    }

    pub fn fill_text(&self, text: &str, position: Vec2, font: &str, color: &str) {
        self.context.set_font(font);
        self.context.set_text_baseline("top");
        self.context.set_fill_style_str(color);
        if let Err(err) = self
            .context
            .fill_text(text, position.x.into(), position.y.into())
        {
            log::warn!("Renderer::fill_text failed : {:#?}", err);
        }
    }

    /// Run `draw` with the context shifted so world coordinates land on
    /// screen relative to `camera`
    pub fn with_camera(&self, camera: &Camera, draw: impl FnOnce(&Renderer)) {
        self.context.save();
        match self
            .context
            .translate((-camera.scroll.x).into(), (-camera.scroll.y).into())
        {
            Ok(()) => draw(self),
            Err(err) => log::warn!("Renderer::with_camera failed : {:#?}", err),
        }
        self.context.restore();
    }
}

#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.stroke_rect(self, 1.0, "#FF0000");
    }
}
