//! Chilli Dash entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use chilli_dash::audio::AudioManager;
    use chilli_dash::sim::{Autopilot, FrameSnapshot, GamePhase, GameSession};
    use chilli_dash::{AudioSink, Intent, Tuning, classify_swipe};

    /// Game instance holding all state
    struct Game {
        window: web_sys::Window,
        session: GameSession,
        audio: AudioManager,
        pilot: Autopilot,
        demo_mode: bool,
        // Where the current touch began
        touch_start: Option<Vec2>,
        // Last values written to the HUD, to skip redundant DOM writes
        last_hud: Option<(u64, u8, GamePhase, bool, String)>,
    }

    impl Game {
        fn new(window: web_sys::Window, session: GameSession) -> Self {
            let pilot = Autopilot::new(session.tuning());
            Self {
                window,
                session,
                audio: AudioManager::new(),
                pilot,
                demo_mode: false,
                touch_start: None,
                last_hud: None,
            }
        }

        fn frame(&mut self, time: f64) {
            if self.demo_mode {
                if let Some(intent) = self.pilot.decide(&self.session.snapshot()) {
                    self.session.push_intent(intent);
                }
            }

            self.session.frame(time);

            self.audio.set_muted(self.session.muted());
            for sound in self.session.drain_sounds() {
                self.audio.play(sound);
            }

            let snapshot = self.session.snapshot();
            self.update_hud(&snapshot);
            self.publish(&snapshot);
        }

        /// Expose the frame to page scripts as `window.chilliSnapshot`
        fn publish(&self, snapshot: &FrameSnapshot) {
            match serde_json::to_string(snapshot) {
                Ok(json) => {
                    let _ = js_sys::Reflect::set(
                        self.window.as_ref(),
                        &JsValue::from_str("chilliSnapshot"),
                        &JsValue::from_str(&json),
                    );
                }
                Err(e) => log::warn!("Failed to serialize snapshot: {}", e),
            }
        }

        fn update_hud(&mut self, snapshot: &FrameSnapshot) {
            let powerups = snapshot
                .powerups
                .iter()
                .map(|p| format!("{} {:.0}s", p.kind.name(), (p.remaining_ms / 1000.0).ceil()))
                .collect::<Vec<_>>()
                .join(" · ");
            let hud = (
                snapshot.score,
                snapshot.lives,
                snapshot.phase,
                snapshot.muted,
                powerups,
            );
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }

            let Some(document) = self.window.document() else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&snapshot.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-lives .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{}/{}", snapshot.lives, snapshot.max_lives)));
            }
            if let Some(el) = document.query_selector("#hud-powerups .hud-value").ok().flatten() {
                el.set_text_content(Some(&hud.4));
            }
            if let Some(el) = document.get_element_by_id("mute-btn") {
                el.set_text_content(Some(if snapshot.muted { "🔇" } else { "🔊" }));
            }

            // Overlays
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };
            show("start-screen", snapshot.phase == GamePhase::Start);
            show("game-over", snapshot.phase == GamePhase::GameOver);
            if snapshot.phase == GamePhase::GameOver {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&snapshot.score.to_string()));
                }
            }

            self.last_hud = Some(hud);
        }

        fn key_intent(&self, key: &str) -> Option<Intent> {
            match key {
                "ArrowLeft" | "a" | "A" => Some(Intent::MoveLeft),
                "ArrowRight" | "d" | "D" => Some(Intent::MoveRight),
                "ArrowUp" | "w" | "W" | " " => Some(Intent::Jump),
                "m" | "M" => Some(Intent::ToggleMute),
                "Enter" => match self.session.phase() {
                    GamePhase::Start => Some(Intent::Start),
                    GamePhase::GameOver => Some(Intent::Restart),
                    GamePhase::Playing => None,
                },
                _ => None,
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Chilli Dash starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window available");
            return;
        };

        if let Some(loading) = window.document().and_then(|d| d.get_element_by_id("loading")) {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let session = match GameSession::new(Tuning::default(), seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Invalid tuning: {}", e);
                return;
            }
        };
        let game = Rc::new(RefCell::new(Game::new(window, session)));

        setup_input_handlers(game.clone());
        setup_touch_handlers(game.clone());
        setup_control_buttons(game.clone());
        request_animation_frame(game);

        log::info!("Chilli Dash running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            // Key presses count as the user gesture browsers need for audio
            g.audio.resume();

            let key = event.key();
            if key == "i" || key == "I" {
                g.demo_mode = !g.demo_mode;
                log::info!("Demo mode: {}", g.demo_mode);
                return;
            }
            if let Some(intent) = g.key_intent(&key) {
                event.prevent_default();
                g.session.push_intent(intent);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn touch_point(event: &web_sys::TouchEvent) -> Option<Vec2> {
        let touch = event.changed_touches().get(0)?;
        Some(Vec2::new(touch.client_x() as f32, touch.client_y() as f32))
    }

    /// Touches on the on-screen buttons are handled by their click listeners
    fn on_control_button(event: &web_sys::Event) -> bool {
        event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .is_some_and(|el| el.class_name().contains("control-btn"))
    }

    fn setup_touch_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Swipe start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                if on_control_button(&event) {
                    return;
                }
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.touch_start = touch_point(&event);
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Swipe end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                if on_control_button(&event) {
                    return;
                }
                let mut g = game.borrow_mut();
                let (Some(start), Some(end)) = (g.touch_start.take(), touch_point(&event)) else {
                    return;
                };
                if let Some(intent) = classify_swipe(start, end) {
                    g.session.push_intent(intent);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_control_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let buttons = [
            ("left-btn", Intent::MoveLeft),
            ("right-btn", Intent::MoveRight),
            ("jump-btn", Intent::Jump),
            ("mute-btn", Intent::ToggleMute),
            // Tapping an overlay starts or restarts
            ("start-screen", Intent::Start),
            ("game-over", Intent::Restart),
        ];
        for (id, intent) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.session.push_intent(intent);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Simulated frames for the headless run (5 minutes at 60 fps)
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_FRAMES: u32 = 60 * 60 * 5;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use chilli_dash::platform::LogAudio;
    use chilli_dash::sim::{Autopilot, GamePhase, GameSession};
    use chilli_dash::{AudioSink, Tuning};

    env_logger::init();
    log::info!("Chilli Dash (native) starting headless autopilot run...");

    let mut args = std::env::args().skip(1);
    let tuning = match load_tuning(args.next()) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xC4111);

    let pilot = Autopilot::new(&tuning);
    let mut session = match GameSession::new(tuning, seed) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Invalid tuning: {}", e);
            std::process::exit(1);
        }
    };
    let mut audio = LogAudio::default();

    let frame_ms = 1000.0 / 60.0;
    let mut now = 0.0;
    for frame in 0..HEADLESS_FRAMES {
        if let Some(intent) = pilot.decide(&session.snapshot()) {
            session.push_intent(intent);
        }
        session.frame(now);
        for sound in session.drain_sounds() {
            audio.play(sound);
        }

        if session.phase() == GamePhase::GameOver {
            break;
        }
        if frame > 0 && frame % 600 == 0 {
            log::info!(
                "t={:.0}s score={} lives={} speed={:.0}",
                now / 1000.0,
                session.score(),
                session.lives(),
                session.speed()
            );
        }
        now += frame_ms;
    }

    log::info!(
        "Finished at t={:.1}s with score {} ({} sounds)",
        now / 1000.0,
        session.score(),
        audio.played
    );
    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}

/// Defaults unless a JSON tuning file is given
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: Option<String>) -> anyhow::Result<chilli_dash::Tuning> {
    use anyhow::Context;

    let Some(path) = path else {
        return Ok(chilli_dash::Tuning::default());
    };
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read tuning file {}", path))?;
    let tuning = chilli_dash::Tuning::from_json(&json)
        .with_context(|| format!("Invalid tuning in {}", path))?;
    log::info!("Loaded tuning from {}", path);
    Ok(tuning)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
