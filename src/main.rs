//! Brickfall entry point
//!
//! Native builds run a headless session (autopilot paddle) and print a summary.
//! WASM builds bind the game to a canvas, the DOM HUD and requestAnimationFrame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent,
        MouseEvent, Window,
    };

    use brickfall::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
    use brickfall::renderer::palette::css;
    use brickfall::renderer::{DrawCmd, Fill, build_frame};
    use brickfall::{FrameDriver, FrameHandle, FrameHost, Hud, Presenter, Settings, Snapshot};

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    /// requestAnimationFrame-backed host
    struct RafHost {
        window: Window,
        callback: FrameCallback,
    }

    impl FrameHost for RafHost {
        fn request_frame(&mut self) -> FrameHandle {
            let callback = self.callback.borrow();
            let Some(closure) = callback.as_ref() else {
                log::error!("Frame requested before the callback was installed");
                return FrameHandle(0);
            };
            match self
                .window
                .request_animation_frame(closure.as_ref().unchecked_ref())
            {
                Ok(id) => FrameHandle(id as u64),
                Err(e) => {
                    log::error!("requestAnimationFrame failed: {:?}", e);
                    FrameHandle(0)
                }
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            let _ = self.window.cancel_animation_frame(handle.0 as i32);
        }
    }

    /// Draws on a 2D canvas and mirrors the HUD into the DOM
    struct CanvasPresenter {
        ctx: CanvasRenderingContext2d,
        document: Document,
        settings: Settings,
        last_hud: Option<Hud>,
    }

    impl Presenter for CanvasPresenter {
        fn present(&mut self, snapshot: &Snapshot<'_>, hud: &Hud) {
            let list = build_frame(snapshot, &self.settings);
            for cmd in &list.commands {
                self.draw(cmd);
            }
            if self.last_hud.as_ref() != Some(hud) {
                self.update_hud(hud);
                self.last_hud = Some(hud.clone());
            }
        }
    }

    impl CanvasPresenter {
        fn apply_fill(&self, fill: &Fill) {
            match *fill {
                Fill::Solid(color) => self.ctx.set_fill_style_str(&css(color)),
                Fill::Linear { from, to, start, end } => {
                    let gradient = self.ctx.create_linear_gradient(
                        from.x as f64,
                        from.y as f64,
                        to.x as f64,
                        to.y as f64,
                    );
                    let _ = gradient.add_color_stop(0.0, &css(start));
                    let _ = gradient.add_color_stop(1.0, &css(end));
                    self.ctx.set_fill_style_canvas_gradient(&gradient);
                }
                Fill::Radial {
                    inner,
                    inner_radius,
                    outer,
                    outer_radius,
                    start,
                    end,
                } => match self.ctx.create_radial_gradient(
                    inner.x as f64,
                    inner.y as f64,
                    inner_radius as f64,
                    outer.x as f64,
                    outer.y as f64,
                    outer_radius as f64,
                ) {
                    Ok(gradient) => {
                        let _ = gradient.add_color_stop(0.0, &css(start));
                        let _ = gradient.add_color_stop(1.0, &css(end));
                        self.ctx.set_fill_style_canvas_gradient(&gradient);
                    }
                    Err(_) => self.ctx.set_fill_style_str(&css(end)),
                },
            }
        }

        fn draw(&self, cmd: &DrawCmd) {
            let ctx = &self.ctx;
            let canvas_w = PLAYFIELD_WIDTH as f64;
            let canvas_h = PLAYFIELD_HEIGHT as f64;
            match *cmd {
                DrawCmd::Clear(color) => {
                    ctx.clear_rect(0.0, 0.0, canvas_w, canvas_h);
                    ctx.set_fill_style_str(&css(color));
                    ctx.fill_rect(0.0, 0.0, canvas_w, canvas_h);
                }
                DrawCmd::Line { from, to, color, width } => {
                    ctx.set_stroke_style_str(&css(color));
                    ctx.set_line_width(width as f64);
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.line_to(to.x as f64, to.y as f64);
                    ctx.stroke();
                }
                DrawCmd::RoundedRect { rect, radius, fill } => {
                    self.apply_fill(&fill);
                    let (x, y, w, h, r) = (
                        rect.x as f64,
                        rect.y as f64,
                        rect.w as f64,
                        rect.h as f64,
                        radius as f64,
                    );
                    ctx.begin_path();
                    ctx.move_to(x + r, y);
                    let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
                    let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
                    let _ = ctx.arc_to(x, y + h, x, y, r);
                    let _ = ctx.arc_to(x, y, x + w, y, r);
                    ctx.close_path();
                    ctx.fill();
                }
                DrawCmd::Circle { center, radius, fill } => {
                    self.apply_fill(&fill);
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.fill();
                }
                DrawCmd::Tint(color) => {
                    ctx.set_fill_style_str(&css(color));
                    ctx.fill_rect(0.0, 0.0, canvas_w, canvas_h);
                }
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let display = if visible { "inline-block" } else { "none" };
                let _ = el.style().set_property("display", display);
            }
        }

        fn update_hud(&self, hud: &Hud) {
            self.set_text("score", &hud.score.to_string());
            self.set_text("lives", &hud.lives.to_string());
            self.set_text("level", &hud.level.to_string());
            self.set_text("message", &hud.message);
            self.set_visible("restartBtn", hud.restart_visible);
            self.set_visible("fps", self.settings.show_fps);
            if self.settings.show_fps {
                self.set_text("fps", &format!("{} fps", hud.fps));
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        driver: FrameDriver<RafHost>,
        presenter: CanvasPresenter,
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
        }

        log::info!("Brickfall starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id("gameCanvas")
            .ok_or_else(|| JsValue::from_str("no #gameCanvas"))?
            .dyn_into::<HtmlCanvasElement>()?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let host = RafHost {
            window: window.clone(),
            callback: callback.clone(),
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game {
            driver: FrameDriver::new(seed, host),
            presenter: CanvasPresenter {
                ctx,
                document: document.clone(),
                settings: Settings::load(),
                last_hud: None,
            },
        }));
        log::info!("Game initialized with seed: {}", seed);

        {
            let game = game.clone();
            *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
                let mut g = game.borrow_mut();
                let Game { driver, presenter } = &mut *g;
                driver.on_frame(time, presenter);
            }));
        }

        setup_input_handlers(&window, &canvas, game.clone())?;
        setup_restart_button(&document, game.clone())?;

        game.borrow_mut().driver.start();
        log::info!("Brickfall running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if key == "f" || key == "F" {
                    let settings = &mut g.presenter.settings;
                    settings.show_fps = !settings.show_fps;
                    settings.save();
                    g.presenter.last_hud = None;
                    return;
                }
                if g.driver.input_mut().key_down(&key) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().driver.input_mut().key_up(&event.key());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer position, scaled from CSS pixels to playfield pixels
        {
            let game = game.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = target.get_bounding_client_rect();
                if rect.width() <= 0.0 {
                    return;
                }
                let scale = PLAYFIELD_WIDTH as f64 / rect.width();
                let x = (event.client_x() as f64 - rect.left()) * scale;
                game.borrow_mut().driver.input_mut().pointer_moved(x as f32);
            });
            canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Click to launch
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().driver.input_mut().click();
            });
            canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let Some(btn) = document.get_element_by_id("restartBtn") else {
            log::warn!("No #restartBtn, restart disabled");
            return Ok(());
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            if game.borrow_mut().driver.restart() {
                log::info!("Game restarted");
            }
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use brickfall::consts::FRAME_MS;
    use brickfall::driver::{ManualHost, Presenter};
    use brickfall::renderer::build_frame;
    use brickfall::{FrameDriver, Hud, Settings, Snapshot};

    /// Run a headless brickfall session with the autopilot paddle
    #[derive(Parser, Debug)]
    #[command(name = "brickfall", version, about)]
    struct Args {
        /// Number of display frames to simulate
        #[arg(long, default_value_t = 36_000)]
        frames: u64,

        /// Session RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Presentation settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// How many times to press restart after a game over
        #[arg(long, default_value_t = 0)]
        restarts: u32,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    }

    /// Builds every frame's draw list and logs HUD changes
    struct LogPresenter {
        settings: Settings,
        draw_commands: usize,
        last_hud: Option<Hud>,
    }

    impl Presenter for LogPresenter {
        fn present(&mut self, snapshot: &Snapshot<'_>, hud: &Hud) {
            self.draw_commands += build_frame(snapshot, &self.settings).len();

            if self.last_hud.as_ref() != Some(hud) {
                let message_changed = self
                    .last_hud
                    .as_ref()
                    .is_none_or(|last| last.message != hud.message);
                if message_changed && !hud.message.is_empty() {
                    log::info!("{}", hud.message);
                }
                log::debug!(
                    "score {} lives {} level {}",
                    hud.score,
                    hud.lives,
                    hud.level
                );
                self.last_hud = Some(hud.clone());
            }
        }
    }

    fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Settings::from_json(&json).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();
        log::info!("Brickfall (native) starting...");

        let settings = load_settings(args.settings.as_ref())?;
        let mut presenter = LogPresenter {
            settings,
            draw_commands: 0,
            last_hud: None,
        };

        let mut driver = FrameDriver::new(args.seed, ManualHost::default());
        driver.input_mut().autopilot = true;
        driver.start();

        let mut now = 0.0;
        let mut restarts_left = args.restarts;
        for _ in 0..args.frames {
            if driver.host_mut().next_frame().is_none() {
                if restarts_left == 0 || !driver.restart() {
                    break;
                }
                restarts_left -= 1;
                continue;
            }
            driver.on_frame(now, &mut presenter);
            now += FRAME_MS;
        }

        let hud = driver.hud();
        println!(
            "frames {} | score {} | lives {} | level {} | phase {:?} | {} draw commands",
            driver.frames(),
            hud.score,
            hud.lives,
            hud.level,
            driver.state().phase,
            presenter.draw_commands
        );

        if args.json {
            let snapshot = Snapshot::of(driver.state());
            let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
            println!("{}", json);
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}
