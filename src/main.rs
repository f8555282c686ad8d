//! Duet entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use duet::audio::AudioManager;
    use duet::consts::*;
    use duet::persistence::default_storage;
    use duet::platform::{InputSnapshot, Key, TouchPhase, TouchPoint};
    use duet::renderer::{RenderState, build_scene};
    use duet::sim::{GameEvent, GameState, TickInput, World, tick};
    use duet::ui::{UiAction, high_score_text, score_text};
    use duet::{Resources, Settings};

    /// Game instance holding all state
    struct Game {
        world: World,
        render_state: Option<RenderState>,
        audio: AudioManager,
        settings: Settings,
        accumulator: f32,
        last_time: f64,
        input: InputSnapshot,
        /// One-shot, consumed by the next tick
        pause_toggle: bool,
        autopilot: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, screen_width: f32, size: (u32, u32)) -> Self {
            let resources = Resources::Builtin;
            let mut config = resources.game_config();
            config.set_viewport(size.0, size.1);
            let world = World::new(
                config,
                resources.obstacle_configs(),
                default_storage(),
                seed,
            );
            let settings = Settings::load(world.storage());
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);

            let mut game = Self {
                world,
                render_state: None,
                audio,
                settings,
                accumulator: 0.0,
                last_time: 0.0,
                input: InputSnapshot::new(screen_width),
                pause_toggle: false,
                autopilot: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            };
            game.world.background.enabled = game.settings.background_cycling();
            game
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = TickInput {
                    direction: self.input.rotation_direction(),
                    pause_toggle: self.pause_toggle,
                    autopilot: self.autopilot,
                };
                tick(&mut self.world, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.pause_toggle = false;
            }
            self.input.prune_touches();

            for event in self.world.drain_events() {
                match event {
                    GameEvent::Sound(sound) => self.audio.play(sound),
                    GameEvent::NewHighScore(score) => {
                        log::debug!("New high score: {}", score)
                    }
                    _ => {}
                }
            }

            if self.world.quit_requested {
                // Browsers cannot close the tab; stay on the menu
                log::info!("Quit is not available in the browser");
                self.world.quit_requested = false;
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = build_scene(&self.world);
                match render_state.render(&vertices, self.world.background.color) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Mirror panel visibility and HUD values into the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let ui = &self.world.ui;

            set_visible(&document, "menu", ui.menu);
            set_visible(&document, "hud", ui.hud);
            set_visible(&document, "game-over", ui.game_over);
            set_visible(&document, "continue-btn", ui.show_continue);
            set_visible(&document, "hud-fps", self.settings.show_fps);

            if let Some(el) = document.get_element_by_id("game-over-text") {
                el.set_text_content(Some(&ui.game_over_text));
            }
            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&score_text(self.world.score.score)));
            }
            if let Some(el) = document.query_selector("#hud-high .hud-value").ok().flatten() {
                el.set_text_content(Some(&high_score_text(self.world.high_score.high_score)));
            }
            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.fps.to_string()));
            }
        }

        /// Follow a canvas resize: GPU surface, camera aspect and input halves
        fn resize(&mut self, width: u32, height: u32, client_width: f32) {
            self.world.config.set_viewport(width, height);
            self.input.screen_width = client_width;
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }

        fn toggle_fps(&mut self) {
            self.settings.show_fps = !self.settings.show_fps;
            self.settings.save(self.world.storage_mut());
        }

        fn dispatch(&mut self, action: UiAction) {
            self.audio.resume();
            if self.world.dispatch(action).is_ok() && action == UiAction::Start {
                self.audio.start_music();
            }
        }
    }

    fn set_visible(document: &web_sys::Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Duet starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No canvas element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(
            seed,
            client_w as f32,
            (width, height),
        )));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match create_renderer(&instance, &canvas, width, height, &game).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Rendering disabled: {}", e),
        }

        // Set up input handlers
        setup_input_handlers(&canvas, game.clone());

        // Keep the surface and camera in step with the window
        setup_resize(&canvas, game.clone());

        // Set up menu, pause and game over buttons
        setup_buttons(game.clone());

        // Set up auto-pause on visibility change
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Duet running!");
    }

    async fn create_renderer(
        instance: &wgpu::Instance,
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
        game: &Rc<RefCell<Game>>,
    ) -> Result<RenderState, String> {
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| format!("Failed to create surface: {}", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| format!("Failed to get adapter: {}", e))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let half_height = game.borrow().world.config.camera_half_height;
        RenderState::new(surface, &adapter, width, height, half_height)
            .await
            .map_err(|e| format!("Failed to create device: {}", e))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Mouse button - half of the canvas decides the direction
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() != 0 {
                    return;
                }
                let mut g = game.borrow_mut();
                g.input.screen_width = canvas_clone.client_width() as f32;
                g.input.mouse_down_x = Some(event.offset_x() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse drag keeps tracking the held button
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.input.mouse_down_x.is_some() {
                    g.input.mouse_down_x = Some(event.offset_x() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse release / leave
        for name in ["mouseup", "mouseleave"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.mouse_down_x = None;
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touches
        for (name, phase) in [
            ("touchstart", TouchPhase::Began),
            ("touchmove", TouchPhase::Moved),
            ("touchend", TouchPhase::Ended),
            ("touchcancel", TouchPhase::Canceled),
        ] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.input.screen_width = canvas_clone.client_width() as f32;
                let rect = canvas_clone.get_bounding_client_rect();
                let changed = event.changed_touches();
                for i in 0..changed.length() {
                    if let Some(touch) = changed.get(i) {
                        g.input.touch(TouchPoint {
                            id: touch.identifier(),
                            x: touch.client_x() as f32 - rect.left() as f32,
                            phase,
                        });
                    }
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "i" | "I" => {
                        g.autopilot = !g.autopilot;
                        log::info!("Autopilot: {}", g.autopilot);
                    }
                    "f" | "F" if !event.repeat() => g.toggle_fps(),
                    key => {
                        if let Some(key) = Key::from_dom(key) {
                            if key == Key::Escape && !event.repeat() {
                                g.pause_toggle = true;
                            }
                            g.input.press(key);
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom(&event.key()) {
                    game.borrow_mut().input.release(key);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
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
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let dpr = window_clone.device_pixel_ratio();
            let client_w = canvas.client_width();
            let width = (client_w as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            game.borrow_mut().resize(width, height, client_w as f32);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// One delegated click listener; the clicked button's id names the action
    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for action in UiAction::ALL {
            if document.get_element_by_id(action.button_id()).is_none() {
                log::warn!("Button '{}' not found", action.button_id());
            }
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(button) = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.closest("button").ok().flatten())
            else {
                return;
            };
            if let Some(action) = UiAction::from_button_id(&button.id()) {
                game.borrow_mut().dispatch(action);
            }
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.world.state == GameState::Playing {
                        g.pause_toggle = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.world.state == GameState::Playing {
                    g.pause_toggle = true;
                    log::info!("Auto-paused (window blur)");
                }
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window focus - unmute
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.audio.is_muted() {
                    g.audio.set_muted(false);
                    if g.world.state != GameState::Menu {
                        g.audio.start_music();
                    }
                }
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless Duet run: the autopilot plays until it is hit or time runs out
#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser, Debug)]
#[command(name = "duet", version, about)]
struct Args {
    /// Simulated seconds to play before stopping
    #[arg(long, default_value_t = 120.0, value_parser = parse_seconds)]
    seconds: f32,

    /// RNG seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding GameConfig.json and Obstacles/
    #[arg(long, default_value = "assets")]
    assets: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_seconds(s: &str) -> Result<f32, String> {
    let secs: f32 = s.parse().map_err(|e| format!("{}", e))?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err("must be a positive number of seconds".to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use duet::consts::SIM_DT;
    use duet::persistence::default_storage;
    use duet::sim::{GameState, TickInput, World, tick};
    use duet::ui::UiAction;
    use duet::{Resources, Settings};

    let args = Args::parse();
    env_logger::init();
    log::info!("Duet (native) starting...");

    let resources = if args.assets.is_dir() {
        Resources::Dir(args.assets.clone())
    } else {
        log::warn!("{} is not a directory, using built-in assets", args.assets.display());
        Resources::Builtin
    };
    let seed = args.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    log::info!("Seed: {}", seed);

    let mut world = World::new(
        resources.game_config(),
        resources.obstacle_configs(),
        default_storage(),
        seed,
    );
    let settings = Settings::load(world.storage());
    world.background.enabled = settings.background_cycling();

    if let Err(e) = world.dispatch(UiAction::Start) {
        log::error!("Could not start: {}", e);
        return;
    }

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let max_ticks = (args.seconds / SIM_DT) as u64;
    while world.ticks < max_ticks && world.state != GameState::GameOver {
        tick(&mut world, &input, SIM_DT);
        for event in world.drain_events() {
            log::debug!("{:?}", event);
        }
    }

    println!(
        "Run finished after {:.1}s: score {}, best {}",
        world.time, world.score.score, world.high_score.high_score
    );
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["duet"]).unwrap();
        assert_eq!(args.seconds, 120.0);
        assert_eq!(args.seed, None);
        assert_eq!(args.assets, std::path::PathBuf::from("assets"));
    }

    #[test]
    fn test_args_reject_bad_seconds() {
        assert!(Args::try_parse_from(["duet", "--seconds", "3x"]).is_err());
        assert!(Args::try_parse_from(["duet", "--seconds", "-1"]).is_err());
        let args = Args::try_parse_from(["duet", "--seconds", "2.5", "--seed", "7"]).unwrap();
        assert_eq!((args.seconds, args.seed), (2.5, Some(7)));
    }
}
