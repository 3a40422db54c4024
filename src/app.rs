use std::cell::RefCell;
use std::rc::{Rc, Weak};

use camjigsaw_core::{
    BoardRect, FrameSource, GameConfig, GameEvent, GeometricResolver, GridRng,
    InteractionController, MaskResolver, PointerAction, PuzzleError, PuzzleSession, Rect,
    RenderPipeline, ScoreSubmission, Surface,
};
use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use js_sys::Date;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, HtmlVideoElement, Window};

use crate::audio::AudioCues;
use crate::camera::open_camera;
use crate::canvas::CanvasSurface;
use crate::input;
use crate::menu::Menu;
use crate::score_client::{fetch_leaderboard, submit_score};
use crate::settings::load_config;

const BOARD_CANVAS_ID: &str = "puzzleCanvas";
const MASK_CANVAS_ID: &str = "maskCanvas";

fn viewport(window: &Window) -> (f32, f32) {
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (width as f32, height as f32)
}

fn canvas_by_id(window: &Window, id: &str) -> Result<HtmlCanvasElement, JsValue> {
    window
        .document()
        .and_then(|document| document.get_element_by_id(id))
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not a canvas")))
}

pub(crate) struct App {
    window: Window,
    config: GameConfig,
    session: RefCell<PuzzleSession>,
    controller: InteractionController,
    pipeline: RenderPipeline,
    visible: RefCell<CanvasSurface>,
    mask: Option<RefCell<CanvasSurface>>,
    video: HtmlVideoElement,
    menu: Menu,
    audio: AudioCues,
    frame: RefCell<Option<AnimationFrame>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl App {
    fn start(config: GameConfig, video: HtmlVideoElement) -> Result<Rc<Self>, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let menu = Menu::from_document(&document)?;

        let mut visible =
            CanvasSurface::new(canvas_by_id(&window, BOARD_CANVAS_ID)?, false, config.stroke_width)?;
        let mut mask = if config.hit_strategy.uses_mask() {
            match canvas_by_id(&window, MASK_CANVAS_ID)
                .and_then(|canvas| CanvasSurface::new(canvas, true, config.stroke_width))
            {
                Ok(surface) => Some(surface),
                Err(err) => {
                    gloo::console::warn!("mask canvas unavailable, using rectangle hits", err);
                    None
                }
            }
        } else {
            None
        };

        let (view_width, view_height) = viewport(&window);
        visible.resize(view_width, view_height);
        if let Some(mask) = mask.as_mut() {
            mask.resize(view_width, view_height);
        }
        let board = fit_board(&config, &video, view_width, view_height)?;
        let session = PuzzleSession::new(config.difficulty, board, GridRng::from_time_ms(Date::now()))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        menu.select_difficulty(config.difficulty);

        let app = Rc::new(Self {
            window,
            controller: InteractionController::from_config(&config),
            pipeline: RenderPipeline::from_config(&config),
            audio: AudioCues::new(config.pop_volume),
            config,
            session: RefCell::new(session),
            visible: RefCell::new(visible),
            mask: mask.map(RefCell::new),
            video,
            menu,
            frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        app.install_listeners();
        gloo::console::log!("puzzle ready", app.config.difficulty.name());
        Ok(app)
    }

    fn install_listeners(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let dispatch: input::Dispatch = Rc::new(move |action| {
            if let Some(app) = weak.upgrade() {
                app.on_pointer(action);
            }
        });
        let mut listeners = input::install(self.visible.borrow().canvas(), dispatch);

        listeners.push(self.on_click(&self.menu.start_button, |app| app.start_puzzle()));
        listeners.push(self.on_click(&self.menu.save_button, |app| app.save_score()));
        listeners.push(self.on_click(&self.menu.scores_button, |app| app.show_scores()));
        listeners.push(self.on_click(&self.menu.close_scores_button, |app| app.menu.close_scores()));
        listeners.push(self.on_click(&self.menu.menu_button, |app| app.menu.show_menu()));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.window, "resize", move |_| {
            if let Some(app) = weak.upgrade() {
                app.relayout();
            }
        }));
        *self.listeners.borrow_mut() = listeners;
    }

    fn on_click(
        self: &Rc<Self>,
        target: &web_sys::EventTarget,
        action: fn(&Rc<App>),
    ) -> EventListener {
        let weak: Weak<App> = Rc::downgrade(self);
        EventListener::new(target, "click", move |_| {
            if let Some(app) = weak.upgrade() {
                action(&app);
            }
        })
    }

    fn on_pointer(&self, action: PointerAction) {
        let now = Date::now();
        let events = {
            let mut session = self.session.borrow_mut();
            match &self.mask {
                Some(mask) => {
                    let mask = mask.borrow();
                    let resolver = MaskResolver::new(&*mask);
                    self.controller.handle(&mut session, &resolver, action, now)
                }
                None => self
                    .controller
                    .handle(&mut session, &GeometricResolver, action, now),
            }
        };
        for event in events {
            match event {
                GameEvent::PieceSnapped(_) => self.audio.pop(),
                GameEvent::PuzzleSolved { elapsed_ms } => {
                    gloo::console::log!("puzzle solved", elapsed_ms);
                    self.audio.play_melody(self.config.melody_delay_ms);
                    self.menu.show_end_screen(elapsed_ms);
                }
            }
        }
    }

    fn start_puzzle(&self) {
        let difficulty = self.menu.selected_difficulty();
        let (width, height) = {
            let visible = self.visible.borrow();
            (visible.width(), visible.height())
        };
        let started = self
            .session
            .borrow_mut()
            .start(difficulty, Date::now(), width, height);
        match started {
            Ok(regenerated) => {
                if regenerated {
                    gloo::console::log!("new grid", difficulty.name());
                }
                self.menu.hide_menu();
            }
            Err(err) => gloo::console::error!("start failed", err.to_string()),
        }
    }

    fn save_score(self: &Rc<Self>) {
        let (elapsed, difficulty) = {
            let session = self.session.borrow();
            let elapsed = match (session.start_ms(), session.end_ms()) {
                (Some(start), Some(end)) => end - start,
                _ => return,
            };
            (elapsed, session.difficulty())
        };
        let submission = match ScoreSubmission::new(&self.menu.player_name(), elapsed, difficulty) {
            Ok(submission) => submission,
            Err(PuzzleError::EmptyPlayerName) => {
                gloo::dialogs::alert("Enter your name!");
                return;
            }
            Err(err) => {
                gloo::console::error!("score rejected", err.to_string());
                return;
            }
        };
        self.menu.mark_saving();
        let app = Rc::clone(self);
        spawn_local(async move {
            match submit_score(&submission, &app.config.score_endpoint).await {
                Ok(()) => app.menu.mark_saved(),
                Err(err) => gloo::console::error!("score submission failed", err.to_string()),
            }
        });
    }

    fn show_scores(self: &Rc<Self>) {
        self.menu.show_scores_loading();
        let app = Rc::clone(self);
        spawn_local(async move {
            let result = fetch_leaderboard(&app.config.score_endpoint).await;
            match result {
                Ok(board) => {
                    if let Err(err) = app.menu.render_leaderboard(&board) {
                        gloo::console::error!("leaderboard render failed", err);
                    }
                }
                Err(err) => {
                    gloo::console::error!("leaderboard unavailable", err.to_string());
                    app.menu.show_scores_error("Scores unavailable");
                }
            }
        });
    }

    fn relayout(&self) {
        let (view_width, view_height) = viewport(&self.window);
        self.visible.borrow_mut().resize(view_width, view_height);
        if let Some(mask) = &self.mask {
            mask.borrow_mut().resize(view_width, view_height);
        }
        let result = fit_board(&self.config, &self.video, view_width, view_height).and_then(|board| {
            self.session
                .borrow_mut()
                .relayout(board)
                .map_err(|err| JsValue::from_str(&err.to_string()))
        });
        if let Err(err) = result {
            gloo::console::warn!("relayout skipped", err);
        }
    }

    fn render_frame(&self) {
        let now = Date::now();
        let session = self.session.borrow();
        let mut visible = self.visible.borrow_mut();
        let source = FrameSource {
            image: &self.video,
            width: self.video.video_width() as f32,
            height: self.video.video_height() as f32,
        };
        let clock = match &self.mask {
            Some(mask) => {
                let mut mask = mask.borrow_mut();
                self.pipeline
                    .frame(&session, &mut *visible, Some(&mut *mask), source, now)
            }
            None => self
                .pipeline
                .frame::<_, CanvasSurface>(&session, &mut *visible, None, source, now),
        };
        if let Some(text) = clock {
            self.menu.set_time(&text);
        }
    }

    fn schedule_frame(self: &Rc<Self>) {
        let app = Rc::clone(self);
        let handle = request_animation_frame(move |_| {
            app.frame.borrow_mut().take();
            app.render_frame();
            app.schedule_frame();
        });
        *self.frame.borrow_mut() = Some(handle);
    }
}

fn fit_board(
    config: &GameConfig,
    video: &HtmlVideoElement,
    view_width: f32,
    view_height: f32,
) -> Result<Rect, JsValue> {
    BoardRect::fit(
        view_width,
        view_height,
        video.video_width() as f32,
        video.video_height() as f32,
        config.board_scale,
    )
    .map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Waits for the camera, then builds the board and starts the frame loop.
/// A camera failure is reported and leaves the page idle.
pub(crate) fn run() {
    let config = load_config();
    spawn_local(async move {
        let video = match open_camera().await {
            Ok(video) => video,
            Err(err) => {
                gloo::console::error!("camera failed", err.to_string());
                gloo::dialogs::alert(&format!("Camera error: {err}"));
                return;
            }
        };
        match App::start(config, video) {
            Ok(app) => app.schedule_frame(),
            Err(err) => gloo::console::error!("startup failed", err),
        }
    });
}
