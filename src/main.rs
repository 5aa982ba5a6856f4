//! Fetch & Feast entry point
//!
//! On the web this binds the controller to the page (DOM, LocalStorage,
//! Web Audio) and drives it from requestAnimationFrame. Natively it runs a
//! headless seeded session and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

    use fetch_feast::audio::WebAudio;
    use fetch_feast::glam::Vec2;
    use fetch_feast::persistence::LocalStorage;
    use fetch_feast::{GameController, GameEvent, Settings};

    type Controller = GameController<WebAudio, LocalStorage>;

    /// Page bindings plus the controller
    struct Game {
        controller: Controller,
        document: Document,
        container: HtmlElement,
        object: Option<HtmlElement>,
    }

    impl Game {
        fn container_size(&self) -> Vec2 {
            Vec2::new(
                self.container.client_width() as f32,
                self.container.client_height() as f32,
            )
        }

        /// Client coordinates to container space
        fn to_container(&self, client_x: i32, client_y: i32) -> Vec2 {
            let rect = self.container.get_bounding_client_rect();
            Vec2::new(
                client_x as f32 - rect.left() as f32,
                client_y as f32 - rect.top() as f32,
            )
        }

        fn frame(&mut self, time: f64) {
            let size = self.container_size();
            let half = self.controller.animator().object_size() / 2.0;
            let object = self.object.clone();
            let mut place = move |position: Vec2| {
                if let Some(el) = &object {
                    set_transform(el, position, half);
                }
            };
            let events = self.controller.frame(time, size, &mut place);
            self.apply(events);
        }

        /// Drain events produced by input handlers
        fn flush(&mut self) {
            let events = self.controller.take_events();
            self.apply(events);
        }

        /// Mirror controller events onto the page
        fn apply(&self, events: Vec<GameEvent>) {
            let half = self.controller.animator().object_size() / 2.0;
            for event in events {
                match event {
                    GameEvent::ObjectSpawned { position, variant } => {
                        if let Some(el) = &self.object {
                            set_transform(el, position, half);
                            let _ = el.set_attribute("data-variant", &variant.to_string());
                        }
                    }
                    GameEvent::PositionObserved(_) => {}
                    GameEvent::ScoreChanged(score) => {
                        self.set_text("#hud-score .hud-value", &score.to_string());
                    }
                    GameEvent::LivesChanged(lives) => {
                        self.set_text("#hud-lives .hud-value", &lives.to_string());
                    }
                    GameEvent::CelebrationStarted(at) => self.show_effect("celebration", at),
                    GameEvent::CelebrationEnded => self.hide("celebration"),
                    GameEvent::FailShown(at) => self.show_effect("fail-effect", at),
                    GameEvent::FailHidden => self.hide("fail-effect"),
                    GameEvent::GameOver { score, new_record } => {
                        let stats = self.controller.stats();
                        if let Some(el) = self.document.get_element_by_id("final-score") {
                            el.set_text_content(Some(&score.to_string()));
                        }
                        if let Some(el) = self.document.get_element_by_id("high-score") {
                            el.set_text_content(Some(&stats.high_score.to_string()));
                            let class = if new_record { "new-record" } else { "" };
                            let _ = el.set_attribute("class", class);
                        }
                        self.show("game-over");
                    }
                    GameEvent::Announce(message) => {
                        if let Some(el) = self.document.get_element_by_id("screen-reader-announcer")
                        {
                            el.set_text_content(Some(&message));
                        }
                    }
                }
            }

            if let Some(el) = &self.object {
                let class = if self.controller.object_visible() {
                    "game-object"
                } else {
                    "game-object hidden"
                };
                let _ = el.set_attribute("class", class);
            }
        }

        fn set_text(&self, selector: &str, text: &str) {
            if let Some(el) = self.document.query_selector(selector).ok().flatten() {
                el.set_text_content(Some(text));
            }
        }

        fn show(&self, id: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute("class", "");
            }
        }

        fn hide(&self, id: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute("class", "hidden");
            }
        }

        fn show_effect(&self, id: &str, at: Vec2) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute(
                    "style",
                    &format!("left: {:.1}px; top: {:.1}px", at.x, at.y),
                );
                let _ = el.set_attribute("class", "");
            }
        }

        fn update_mute_button(&self) {
            if let Some(el) = self.document.get_element_by_id("mute-btn") {
                let muted = self.controller.is_muted();
                let label = if muted { "Unmute sound" } else { "Mute sound" };
                let _ = el.set_attribute("aria-label", label);
                let _ = el.set_attribute("aria-pressed", if muted { "true" } else { "false" });
            }
        }

        /// Tap or click somewhere in the play area
        fn pointer_down(&mut self, target: Option<Element>, client_x: i32, client_y: i32) {
            self.controller.unlock_audio();
            if let Some(target) = target {
                if target.closest("[data-game-ui]").ok().flatten().is_some() {
                    return;
                }
                if target.closest("#game-object").ok().flatten().is_some() {
                    self.controller.hit_object();
                    self.flush();
                    return;
                }
            }
            let at = self.to_container(client_x, client_y);
            self.controller.misclick(at);
            self.flush();
        }
    }

    /// Center the object element on `position`
    fn set_transform(el: &HtmlElement, position: Vec2, half: f32) {
        let _ = el.style().set_property(
            "transform",
            &format!(
                "translate3d({:.1}px, {:.1}px, 0)",
                position.x - half,
                position.y - half
            ),
        );
    }

    fn event_element(event: &web_sys::Event) -> Option<Element> {
        event.target().and_then(|t| t.dyn_into::<Element>().ok())
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Fetch & Feast starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(container) = document
            .get_element_by_id("game-container")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            log::error!("Missing #game-container");
            return;
        };
        let object = document
            .get_element_by_id("game-object")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let store = LocalStorage::new();
        let settings = Settings::load(&store);
        let seed = js_sys::Date::now() as u64;
        let controller = GameController::new(settings, seed, WebAudio::new(), store);

        let game = Rc::new(RefCell::new(Game {
            controller,
            document: document.clone(),
            container,
            object,
        }));

        {
            let mut g = game.borrow_mut();
            let size = g.container_size();
            g.controller.set_container(size);
            g.controller.start();
            g.flush();
            g.update_mute_button();
        }
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&game);
        setup_buttons(&document, &game);

        request_animation_frame(game);

        log::info!("Fetch & Feast running!");
    }

    fn setup_input_handlers(game: &Rc<RefCell<Game>>) {
        let container = game.borrow().container.clone();

        // Mouse
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let target = event_element(&event);
                game.borrow_mut()
                    .pointer_down(target, event.client_x(), event.client_y());
            });
            let _ = container
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let target = event_element(&event);
                    game.borrow_mut()
                        .pointer_down(target, touch.client_x(), touch.client_y());
                }
            });
            let _ = container
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: Enter/Space on the focused object counts as a tap
        let object = game.borrow().object.clone();
        if let Some(object) = object {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.key().as_str(), "Enter" | " ") {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    g.controller.unlock_audio();
                    g.controller.hit_object();
                    g.flush();
                }
            });
            let _ = object
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: &Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("replay-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.hide("game-over");
                g.hide("fail-effect");
                g.hide("celebration");
                g.controller.replay();
                g.flush();
                log::info!("Game restarted");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("quit-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().controller.quit();
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href("/");
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let muted = g.controller.toggle_mute();
                g.update_mute_button();
                log::info!("Sound {}", if muted { "muted" } else { "unmuted" });
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

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fetch_feast::audio::NullAudio;
    use fetch_feast::glam::Vec2;
    use fetch_feast::highscores::format_playtime;
    use fetch_feast::persistence::MemoryStore;
    use fetch_feast::{GameController, GameEvent, Settings};

    env_logger::init();
    log::info!("Fetch & Feast (native) starting...");
    log::info!("Native mode runs a headless session - serve the wasm build for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let container = Vec2::new(1024.0, 768.0);

    let mut game = GameController::new(Settings::default(), seed, NullAudio, MemoryStore::new());
    game.set_container(container);
    game.start();

    // Tap every object shortly after it shows up, except every third one
    let mut sink = |_: Vec2| {};
    let mut time = 0.0;
    let mut spawns = 0u32;
    let mut spawned_at = Some(0.0);
    while !game.session().is_game_over && time < 10.0 * 60.0 * 1000.0 {
        for event in game.frame(time, container, &mut sink) {
            match &event {
                GameEvent::ObjectSpawned { .. } => spawned_at = Some(time),
                GameEvent::Announce(text) => log::info!("{}", text),
                _ => log::debug!("{:?}", event),
            }
        }

        let due = spawned_at.is_some_and(|at| time - at >= 600.0);
        if due && game.object_visible() {
            spawned_at = None;
            spawns += 1;
            if spawns % 3 != 0 {
                let center = game.animator().position();
                game.tap(center);
            }
            for event in game.take_events() {
                if let GameEvent::Announce(text) = event {
                    log::info!("{}", text);
                }
            }
        }

        time += 1000.0 / 60.0;
    }

    let stats = game.stats();
    println!(
        "Final score {} | high score {} | games {} | playtime {}",
        game.session().score,
        stats.high_score,
        stats.total_games,
        format_playtime(stats.total_playtime)
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
