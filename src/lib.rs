// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

mod browser;
pub mod engine;
pub mod game;
pub mod level;
pub mod score;
pub mod sprite;
pub mod swing;

use engine::GameLoop;
use game::TentacleSwing;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - panic hook + console logger
/// - starts the game loop on the canvas
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set : {}", err).into());
    }
    log::info!("Tentacle Swing starting...");

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(TentacleSwing::new()).await {
            log::error!("Could not start game : {:#}", err);
        }
    });

    Ok(())
}
