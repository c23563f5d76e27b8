//! Phosphor Arcade entry point
//!
//! On the web this only installs the panic hook and logger; the host page
//! drives everything through `ArcadeHandle`. Natively it runs a short
//! headless demo of each game.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
    }
    log::info!("Phosphor Arcade loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Phosphor Arcade (native) starting...");
    log::info!("Native mode is a headless demo - build for wasm32 to play");

    for kind in phosphor_arcade::GameKind::ALL {
        demo::run(kind);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use phosphor_arcade::consts::REFERENCE_FRAME_MS;
    use phosphor_arcade::platform::MemoryStore;
    use phosphor_arcade::{Arcade, GameKind, Settings};

    const DEMO_SECONDS: f64 = 6.0;

    /// Scripted key presses, by frame number
    fn script(kind: GameKind, frame: u32) -> &'static [&'static str] {
        match kind {
            GameKind::Pong => match frame {
                60 => &["ArrowUp"],
                90 => &["ArrowDown"],
                _ => &[],
            },
            // A slow clockwise square
            GameKind::Snake => match frame % 120 {
                0 => &["ArrowDown"],
                30 => &["ArrowLeft"],
                60 => &["ArrowUp"],
                90 => &["ArrowRight"],
                _ => &[],
            },
            // Pulse the engine to slow the fall
            GameKind::Lander => match frame % 40 {
                0 => &["ArrowUp"],
                _ => &[],
            },
        }
    }

    pub fn run(kind: GameKind) {
        let mut arcade = Arcade::new(Settings::default(), Box::new(MemoryStore::new()), 7);
        arcade.set_active_callback(move |active| {
            log::info!("[{}] active: {}", kind.as_str(), active);
        });
        arcade.mount(kind);
        match kind {
            GameKind::Pong => {
                arcade.click();
            }
            GameKind::Snake | GameKind::Lander => {
                arcade.key_down("Enter");
                arcade.key_up("Enter");
            }
        }

        let frames = (DEMO_SECONDS * 1000.0 / REFERENCE_FRAME_MS) as u32;
        let mut now = 0.0;
        let mut held: Vec<&str> = Vec::new();
        for frame in 0..frames {
            for key in held.drain(..) {
                arcade.key_up(key);
            }
            for &key in script(kind, frame) {
                arcade.key_down(key);
                held.push(key);
            }
            now += REFERENCE_FRAME_MS;
            arcade.frame(now);
        }

        match arcade.hud().map(|hud| serde_json::to_string(&hud)) {
            Some(Ok(json)) => log::info!("[{}] {}", kind.as_str(), json),
            Some(Err(e)) => log::warn!("[{}] HUD not serializable: {}", kind.as_str(), e),
            None => log::warn!("[{}] nothing mounted", kind.as_str()),
        }
        if let Some(list) = arcade.render() {
            log::info!("[{}] last frame: {} draw commands", kind.as_str(), list.len());
        }
        arcade.unmount();
    }
}
