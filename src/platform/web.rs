//! Browser bindings
//!
//! LocalStorage backend, the playable [`Game`] and the progress dashboard
//! exposed to JavaScript.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::storage::KeyValueStore;
use crate::error::{CatalogError, StorageError};
use crate::game::{
    DropTarget, Feedback, GameController, InputEvent, Phase, Piece, PieceId, PieceMark, Timer,
    TimerKind, TimerQueue, ViewPort,
};
use crate::grid::Rect;
use crate::pattern::{Catalog, Cell, Pattern, Shape};
use crate::progress::ProgressTracker;
use crate::settings::PlayMode;

/// `window.localStorage`
#[derive(Debug, Clone)]
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    /// `None` when the page has no window or storage is disabled
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

fn rejected(e: JsValue) -> StorageError {
    StorageError::Rejected(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(rejected)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(rejected)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(rejected)
    }
}

/// Storage that always fails, for pages without LocalStorage
struct NoStore;

impl KeyValueStore for NoStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Best available browser storage
pub fn browser_storage() -> Box<dyn KeyValueStore> {
    match LocalStore::open() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("LocalStorage unavailable, progress will not persist");
            Box::new(NoStore)
        }
    }
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Tangram Memory starting...");
}

/// Progress dashboard backed by LocalStorage
#[wasm_bindgen]
pub struct Dashboard {
    tracker: ProgressTracker,
}

#[wasm_bindgen]
impl Dashboard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Dashboard {
        Dashboard {
            tracker: ProgressTracker::new(browser_storage()),
        }
    }

    #[wasm_bindgen(js_name = totalPlays)]
    pub fn total_plays(&self) -> f64 {
        self.tracker.summary().total_plays as f64
    }

    #[wasm_bindgen(js_name = totalStars)]
    pub fn total_stars(&self) -> f64 {
        self.tracker.summary().total_stars as f64
    }

    #[wasm_bindgen(js_name = patternsCompleted)]
    pub fn patterns_completed(&self) -> u32 {
        self.tracker.summary().patterns_completed as u32
    }

    pub fn attempts(&self) -> u32 {
        self.tracker.summary().attempts
    }

    /// Two decimals, or "0" without data
    #[wasm_bindgen(js_name = averageStars)]
    pub fn average_stars(&self) -> String {
        self.tracker.summary().average_label()
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.tracker
            .export_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = exportCsv)]
    pub fn export_csv(&self) -> String {
        self.tracker.export_csv()
    }

    /// Merge an exported file; rejects with the error text on invalid input
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.tracker
            .import_json(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn clear(&mut self) {
        self.tracker.clear();
    }

    #[wasm_bindgen(js_name = clearLevels)]
    pub fn clear_levels(&mut self) {
        self.tracker.clear_levels();
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
extern "C" {
    /// Page object that draws the game and runs its timers
    pub type JsView;

    #[wasm_bindgen(method)]
    fn status(this: &JsView, text: &str);
    #[wasm_bindgen(method, js_name = showMenu)]
    fn show_menu(this: &JsView);
    #[wasm_bindgen(method, js_name = showPattern)]
    fn show_pattern(this: &JsView, pattern_json: &str);
    #[wasm_bindgen(method, js_name = showCountdown)]
    fn show_countdown(this: &JsView, remaining: u32);
    #[wasm_bindgen(method, js_name = clearTargets)]
    fn clear_targets(this: &JsView, grid: u32);
    #[wasm_bindgen(method, js_name = addTarget)]
    fn add_target(
        this: &JsView,
        row: u32,
        col: u32,
        kind: &str,
        outline: Option<String>,
        opacity: f32,
    );
    #[wasm_bindgen(method, js_name = clearPalette)]
    fn clear_palette(this: &JsView);
    #[wasm_bindgen(method, js_name = addPiece)]
    fn add_piece(this: &JsView, id: u32, kind: &str, glyph: &str, color: &str);
    /// `[x, y, width, height]`
    #[wasm_bindgen(method, js_name = puzzleArea)]
    fn puzzle_area(this: &JsView) -> Box<[f32]>;
    #[wasm_bindgen(method, js_name = moveDrag)]
    fn move_drag(this: &JsView, id: u32, x: f32, y: f32);
    #[wasm_bindgen(method, js_name = cancelDrag)]
    fn cancel_drag(this: &JsView, id: u32);
    #[wasm_bindgen(method, js_name = markPiece)]
    fn mark_piece(this: &JsView, id: u32, correct: bool);
    #[wasm_bindgen(method, js_name = snapPiece)]
    fn snap_piece(this: &JsView, id: u32, row: u32, col: u32, x: f32, y: f32, w: f32, h: f32);
    #[wasm_bindgen(method, js_name = discardPiece)]
    fn discard_piece(this: &JsView, id: u32);
    #[wasm_bindgen(method, js_name = highlightHint)]
    fn highlight_hint(this: &JsView, row: u32, col: u32, kind: &str);
    #[wasm_bindgen(method, js_name = showSolution)]
    fn show_solution(this: &JsView, pattern_json: &str);
    #[wasm_bindgen(method, js_name = showComplete)]
    fn show_complete(this: &JsView, stars: u8);
    #[wasm_bindgen(method)]
    fn feedback(this: &JsView, kind: &str, tone_hz: f32, audible: bool);
    /// JS calls `game.timer(epoch, kind, piece)` after `delay_ms`
    #[wasm_bindgen(method)]
    fn schedule(this: &JsView, epoch: f64, kind: &str, piece: u32, delay_ms: f64);
    #[wasm_bindgen(method, js_name = cancelTimers)]
    fn cancel_timers(this: &JsView);
}

fn pattern_json(pattern: &Pattern) -> String {
    serde_json::to_string(pattern).unwrap_or_else(|e| {
        log::error!("Failed to encode pattern {}: {e}", pattern.id);
        String::new()
    })
}

struct JsViewPort<'a>(&'a JsView);

impl ViewPort for JsViewPort<'_> {
    fn status(&mut self, text: &str) {
        self.0.status(text);
    }

    fn show_menu(&mut self) {
        self.0.show_menu();
    }

    fn show_pattern(&mut self, pattern: &Pattern) {
        self.0.show_pattern(&pattern_json(pattern));
    }

    fn show_countdown(&mut self, remaining: u32) {
        self.0.show_countdown(remaining);
    }

    fn create_drop_targets(&mut self, grid: u32, targets: &[DropTarget]) {
        self.0.clear_targets(grid);
        for t in targets {
            let (outline, opacity) = match t.outline {
                Some(o) => (Some(o.color.to_string()), o.opacity),
                None => (None, 0.0),
            };
            self.0
                .add_target(t.cell.row, t.cell.col, t.kind.as_str(), outline, opacity);
        }
    }

    fn render_palette(&mut self, pieces: &[Piece]) {
        self.0.clear_palette();
        for p in pieces {
            self.0.add_piece(
                p.id.0,
                p.kind.as_str(),
                &p.kind.glyph().to_string(),
                p.kind.color(),
            );
        }
    }

    fn puzzle_area(&self) -> Rect {
        match *self.0.puzzle_area() {
            [x, y, w, h, ..] => Rect::new(x, y, w, h),
            _ => {
                log::warn!("puzzleArea() did not return [x, y, width, height]");
                Rect::new(0.0, 0.0, 0.0, 0.0)
            }
        }
    }

    fn move_drag(&mut self, piece: PieceId, pos: Vec2) {
        self.0.move_drag(piece.0, pos.x, pos.y);
    }

    fn cancel_drag(&mut self, piece: PieceId) {
        self.0.cancel_drag(piece.0);
    }

    fn mark_piece(&mut self, piece: PieceId, mark: PieceMark) {
        self.0.mark_piece(piece.0, mark == PieceMark::Correct);
    }

    fn snap_piece(&mut self, piece: PieceId, cell: Cell, bounds: Rect) {
        self.0.snap_piece(
            piece.0,
            cell.row,
            cell.col,
            bounds.min.x,
            bounds.min.y,
            bounds.size.x,
            bounds.size.y,
        );
    }

    fn discard_piece(&mut self, piece: PieceId) {
        self.0.discard_piece(piece.0);
    }

    fn highlight_hint(&mut self, shape: &Shape) {
        self.0.highlight_hint(shape.row, shape.col, shape.kind.as_str());
    }

    fn show_solution(&mut self, pattern: &Pattern) {
        self.0.show_solution(&pattern_json(pattern));
    }

    fn show_complete(&mut self, stars: u8) {
        self.0.show_complete(stars);
    }

    fn feedback(&mut self, feedback: Feedback, audible: bool) {
        self.0.feedback(feedback.as_str(), feedback.tone_hz(), audible);
    }
}

struct JsTimers<'a>(&'a JsView);

impl TimerQueue for JsTimers<'_> {
    fn schedule(&mut self, timer: Timer, after: std::time::Duration) {
        let piece = timer.kind.piece().map_or(0, |p| p.0);
        self.0.schedule(
            timer.epoch as f64,
            timer.kind.name(),
            piece,
            after.as_secs_f64() * 1000.0,
        );
    }

    fn cancel_all(&mut self) {
        self.0.cancel_timers();
    }
}

/// One player's game, driven by page events
#[wasm_bindgen]
pub struct Game {
    controller: GameController,
    view: JsView,
}

impl Game {
    fn send(&mut self, event: InputEvent) {
        let mut port = JsViewPort(&self.view);
        let mut timers = JsTimers(&self.view);
        self.controller.handle(event, &mut port, &mut timers);
    }
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new(view: JsView) -> Game {
        let seed = js_sys::Date::now() as u64;
        let progress = ProgressTracker::new(browser_storage());
        let controller = GameController::new(Catalog::default(), browser_storage(), progress, seed);
        log::info!("Game initialized with seed: {seed}");
        Game { controller, view }
    }

    /// Install the fetched `patterns.json`
    #[wasm_bindgen(js_name = loadPatterns)]
    pub fn load_patterns(&mut self, json: &str) {
        let mut port = JsViewPort(&self.view);
        self.controller.load_catalog(Catalog::from_json(json), &mut port);
    }

    /// The catalog fetch itself failed
    #[wasm_bindgen(js_name = patternsUnavailable)]
    pub fn patterns_unavailable(&mut self, reason: &str) {
        let error = CatalogError::Io(std::io::Error::other(reason.to_string()));
        let mut port = JsViewPort(&self.view);
        self.controller.load_catalog(Err(error), &mut port);
    }

    pub fn phase(&self) -> String {
        match self.controller.phase() {
            Phase::Menu => "menu",
            Phase::Reveal => "reveal",
            Phase::Placement => "placement",
            Phase::Complete => "complete",
        }
        .to_string()
    }

    pub fn grid(&self) -> u32 {
        self.controller.settings().grid
    }

    pub fn mode(&self) -> String {
        self.controller.settings().mode.as_str().to_string()
    }

    #[wasm_bindgen(js_name = viewSeconds)]
    pub fn view_seconds(&self) -> u32 {
        self.controller.settings().view_seconds
    }

    #[wasm_bindgen(js_name = soundOn)]
    pub fn sound_on(&self) -> bool {
        self.controller.settings().sound_on
    }

    pub fn start(&mut self) {
        self.send(InputEvent::Start);
    }

    pub fn next(&mut self) {
        self.send(InputEvent::Next);
    }

    pub fn hint(&mut self) {
        self.send(InputEvent::Hint);
    }

    pub fn skip(&mut self) {
        self.send(InputEvent::Skip);
    }

    #[wasm_bindgen(js_name = backToMenu)]
    pub fn back_to_menu(&mut self) {
        self.send(InputEvent::BackToMenu);
    }

    #[wasm_bindgen(js_name = selectGrid)]
    pub fn select_grid(&mut self, grid: u32) {
        self.send(InputEvent::SelectGrid(grid));
    }

    #[wasm_bindgen(js_name = selectMode)]
    pub fn select_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = PlayMode::from_str(mode)
            .ok_or_else(|| JsValue::from_str(&format!("unknown mode: {mode}")))?;
        self.send(InputEvent::SelectMode(mode));
        Ok(())
    }

    #[wasm_bindgen(js_name = setViewSeconds)]
    pub fn set_view_seconds(&mut self, secs: u32) {
        self.send(InputEvent::SetViewSeconds(secs));
    }

    #[wasm_bindgen(js_name = setSound)]
    pub fn set_sound(&mut self, on: bool) {
        self.send(InputEvent::SetSound(on));
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, pointer: u32, piece: u32, x: f32, y: f32) {
        self.send(InputEvent::PointerDown {
            pointer,
            piece: PieceId(piece),
            pos: Vec2::new(x, y),
        });
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, pointer: u32, x: f32, y: f32) {
        self.send(InputEvent::PointerMove {
            pointer,
            pos: Vec2::new(x, y),
        });
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, pointer: u32, x: f32, y: f32) {
        self.send(InputEvent::PointerUp {
            pointer,
            pos: Vec2::new(x, y),
        });
    }

    /// Deliver a timer scheduled through `JsView.schedule`
    pub fn timer(&mut self, epoch: f64, kind: &str, piece: u32) -> Result<(), JsValue> {
        let kind = TimerKind::from_name(kind, piece)
            .ok_or_else(|| JsValue::from_str(&format!("unknown timer: {kind}")))?;
        self.send(InputEvent::Timer(Timer {
            epoch: epoch as u64,
            kind,
        }));
        Ok(())
    }
}
