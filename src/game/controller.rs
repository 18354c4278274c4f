//! Session controller
//!
//! Phase machine `Menu → Reveal → Placement → Complete`, driven one event at
//! a time. Owns the catalog, settings, progress and the live session; the
//! view and timer queue are lent for each event.
//!
//! Every scheduled timer carries the controller's epoch. Leaving a session
//! bumps the epoch, so a timer that fires for a torn-down session is dropped.

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::InputEvent;
use super::board::DropOutcome;
use super::session::{PieceId, Session};
use super::view::{Feedback, PieceMark, Timer, TimerKind, TimerQueue, ViewPort};
use crate::consts::{COUNTDOWN_TICK, REJECT_SETTLE, REVEAL_GRACE, SOLUTION_DWELL};
use crate::error::CatalogError;
use crate::grid::GridLayout;
use crate::pattern::Catalog;
use crate::platform::storage::KeyValueStore;
use crate::progress::{ProgressKey, ProgressTracker};
use crate::settings::{PlayMode, Settings};

/// Current screen of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Choosing grid size and mode
    Menu,
    /// Pattern on screen, countdown running
    Reveal,
    /// Dragging pieces onto the grid
    Placement,
    /// Pattern rebuilt, stars shown
    Complete,
}

/// The single drag gesture allowed at a time
#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    pointer: u32,
    piece: PieceId,
}

pub struct GameController {
    catalog: Catalog,
    settings: Settings,
    settings_storage: Box<dyn KeyValueStore>,
    progress: ProgressTracker,
    rng: Pcg32,
    phase: Phase,
    session: Option<Session>,
    /// Pattern whose hint counter resets on advance; outlives the session
    current_key: Option<ProgressKey>,
    drag: Option<ActiveDrag>,
    epoch: u64,
    countdown: u32,
    last_stars: Option<u8>,
}

impl GameController {
    pub fn new(
        catalog: Catalog,
        settings_storage: Box<dyn KeyValueStore>,
        progress: ProgressTracker,
        seed: u64,
    ) -> Self {
        let settings = Settings::load(settings_storage.as_ref());
        Self {
            catalog,
            settings,
            settings_storage,
            progress,
            rng: Pcg32::seed_from_u64(seed),
            phase: Phase::Menu,
            session: None,
            current_key: None,
            drag: None,
            epoch: 0,
            countdown: 0,
            last_stars: None,
        }
    }

    /// Install the result of loading the catalog and announce it
    pub fn load_catalog(&mut self, result: Result<Catalog, CatalogError>, view: &mut dyn ViewPort) {
        match result {
            Ok(catalog) => {
                self.catalog = catalog;
                view.status("Patterns loaded. Ready to play.");
            }
            Err(e) => {
                log::error!("Failed to load patterns: {e}");
                self.catalog = Catalog::default();
                view.status("Unable to load patterns. Try refreshing.");
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Seconds left on the reveal countdown
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Stars earned by the last completion
    pub fn last_stars(&self) -> Option<u8> {
        self.last_stars
    }

    pub fn handle(
        &mut self,
        event: InputEvent,
        view: &mut dyn ViewPort,
        timers: &mut dyn TimerQueue,
    ) {
        match event {
            InputEvent::Start => match self.phase {
                Phase::Menu => self.start(view, timers),
                // Same as Next: the finished pattern's hints reset
                Phase::Complete => self.next_pattern(view, timers),
                phase => log::debug!("Start ignored during {phase:?}"),
            },
            InputEvent::Next => {
                if self.phase == Phase::Complete {
                    self.next_pattern(view, timers);
                }
            }
            InputEvent::Hint => self.hint(view),
            InputEvent::Skip => self.skip(view, timers),
            InputEvent::BackToMenu => self.back_to_menu(view, timers),
            InputEvent::SelectGrid(grid) => self.select_grid(grid),
            InputEvent::SelectMode(mode) => self.select_mode(mode),
            InputEvent::SetViewSeconds(secs) => {
                self.settings.view_seconds = secs;
                self.save_settings();
            }
            InputEvent::SetSound(on) => {
                self.settings.sound_on = on;
                self.save_settings();
            }
            InputEvent::PointerDown { pointer, piece, pos } => {
                self.pointer_down(pointer, piece, pos, view)
            }
            InputEvent::PointerMove { pointer, pos } => {
                if let Some(drag) = self.drag {
                    if drag.pointer == pointer {
                        view.move_drag(drag.piece, pos);
                    }
                }
            }
            InputEvent::PointerUp { pointer, pos } => self.pointer_up(pointer, pos, view, timers),
            InputEvent::Timer(timer) => self.on_timer(timer, view, timers),
        }
    }

    fn timer(&self, kind: TimerKind) -> Timer {
        Timer {
            epoch: self.epoch,
            kind,
        }
    }

    /// Return a piece that is mid-drag to the palette
    fn release_drag(&mut self, view: &mut dyn ViewPort) {
        if let Some(drag) = self.drag.take() {
            view.cancel_drag(drag.piece);
        }
    }

    /// Cancel timers and any drag, invalidating in-flight timer events
    fn reset_transient(&mut self, timers: &mut dyn TimerQueue) {
        timers.cancel_all();
        self.epoch += 1;
        self.drag = None;
    }

    fn save_settings(&mut self) {
        self.settings.save(self.settings_storage.as_mut());
    }

    fn select_grid(&mut self, grid: u32) {
        if self.phase != Phase::Menu {
            log::debug!("Grid change ignored outside the menu");
            return;
        }
        self.settings.grid = grid.max(1);
        self.save_settings();
    }

    fn select_mode(&mut self, mode: PlayMode) {
        if self.phase != Phase::Menu {
            log::debug!("Mode change ignored outside the menu");
            return;
        }
        self.settings.mode = mode;
        self.save_settings();
    }

    fn start(&mut self, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        if self.catalog.is_empty() {
            self.unavailable("No patterns available yet.", view, timers);
            return;
        }
        let Some(pattern) = self.catalog.pick(self.settings.grid, &mut self.rng) else {
            self.unavailable("No patterns available for this difficulty.", view, timers);
            return;
        };

        self.reset_transient(timers);
        let session = Session::new(pattern, self.settings.mode, &mut self.rng);
        log::info!(
            "Starting {} ({} shapes, {} mode)",
            session.key(),
            session.pattern().required(),
            session.mode().as_str()
        );

        self.current_key = Some(session.key().clone());
        self.countdown = self.settings.view_seconds;
        self.last_stars = None;
        self.phase = Phase::Reveal;
        view.status("");
        view.show_pattern(session.pattern());
        view.show_countdown(self.countdown);
        self.session = Some(session);
        self.schedule_countdown(timers);
    }

    fn unavailable(&mut self, message: &str, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        if self.phase != Phase::Menu {
            self.back_to_menu(view, timers);
        }
        view.status(message);
    }

    fn schedule_countdown(&self, timers: &mut dyn TimerQueue) {
        if self.countdown == 0 {
            timers.schedule(self.timer(TimerKind::RevealDone), REVEAL_GRACE);
        } else {
            timers.schedule(self.timer(TimerKind::CountdownTick), COUNTDOWN_TICK);
        }
    }

    fn on_timer(&mut self, timer: Timer, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        if timer.epoch != self.epoch {
            log::debug!("Dropping stale timer {:?}", timer.kind);
            return;
        }
        match timer.kind {
            TimerKind::CountdownTick => {
                if self.phase == Phase::Reveal {
                    self.countdown = self.countdown.saturating_sub(1);
                    view.show_countdown(self.countdown);
                    self.schedule_countdown(timers);
                }
            }
            TimerKind::RevealDone => {
                if self.phase == Phase::Reveal {
                    self.enter_placement(view, timers);
                }
            }
            TimerKind::SettleReject(piece) => {
                if let Some(session) = self.session.as_mut() {
                    if session.discard(piece) {
                        view.discard_piece(piece);
                    }
                }
            }
            TimerKind::SolutionDone => self.finish_skip(view, timers),
        }
    }

    fn enter_placement(&mut self, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.phase = Phase::Placement;
        view.create_drop_targets(session.pattern().grid, &session.drop_targets());
        view.render_palette(session.pieces());
        view.status("Place the pieces to recreate the pattern.");

        // A pattern without shapes has nothing to place
        if session.is_complete() {
            self.complete(view, timers);
        }
    }

    fn pointer_down(&mut self, pointer: u32, piece: PieceId, pos: Vec2, view: &mut dyn ViewPort) {
        if self.phase != Phase::Placement {
            return;
        }
        if let Some(active) = self.drag {
            log::debug!(
                "Ignoring pointer {pointer}: pointer {} is dragging {:?}",
                active.pointer,
                active.piece
            );
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !session.can_drag(piece) {
            log::debug!("Piece {piece:?} cannot be dragged");
            return;
        }
        self.drag = Some(ActiveDrag { pointer, piece });
        view.move_drag(piece, pos);
    }

    fn pointer_up(
        &mut self,
        pointer: u32,
        pos: Vec2,
        view: &mut dyn ViewPort,
        timers: &mut dyn TimerQueue,
    ) {
        let Some(drag) = self.drag else {
            return;
        };
        if drag.pointer != pointer {
            return;
        }
        self.drag = None;

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let layout = GridLayout::new(view.puzzle_area(), session.pattern().grid);
        let cell = layout.resolve(pos);
        let outcome = session.drop_piece(drag.piece, cell);
        log::debug!("Drop {:?} at {cell:?}: {outcome:?}", drag.piece);

        let audible = self.settings.sound_on;
        match outcome {
            DropOutcome::Outside | DropOutcome::Ignored => view.cancel_drag(drag.piece),
            DropOutcome::Placed { cell, complete } => {
                view.snap_piece(drag.piece, cell, layout.cell_rect(cell));
                view.mark_piece(drag.piece, PieceMark::Correct);
                view.feedback(Feedback::Place, audible);
                if complete {
                    self.complete(view, timers);
                }
            }
            DropOutcome::Rejected { .. } => {
                view.mark_piece(drag.piece, PieceMark::Incorrect);
                view.feedback(Feedback::Reject, audible);
                view.status("Try again!");
                timers.schedule(self.timer(TimerKind::SettleReject(drag.piece)), REJECT_SETTLE);
            }
        }
    }

    fn complete(&mut self, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        let Some(session) = self.session.take() else {
            return;
        };
        let earned = session.stars();
        let best = self.progress.record_completion(session.key(), earned);
        log::info!(
            "Completed {} with {} hints: {earned} stars (best {best})",
            session.key(),
            session.hints_used()
        );

        self.reset_transient(timers);
        self.phase = Phase::Complete;
        self.last_stars = Some(earned);
        view.show_complete(earned);
        view.feedback(Feedback::Success, self.settings.sound_on);
        view.status("Great job! You completed the pattern.");
    }

    fn hint(&mut self, view: &mut dyn ViewPort) {
        if self.phase != Phase::Placement {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.solution_shown() {
            return;
        }
        let target = session.use_hint();
        let key = session.key().clone();
        let stored = self.progress.record_hint(&key);
        log::debug!("Hint for {key} ({stored} stored)");

        match target {
            None => view.status("All pieces already placed."),
            Some(shape) => {
                view.highlight_hint(&shape);
                view.feedback(Feedback::Hint, self.settings.sound_on);
                view.status("Here's a hint.");
            }
        }
    }

    fn skip(&mut self, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        if !matches!(self.phase, Phase::Reveal | Phase::Placement) {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.solution_shown() {
            return;
        }
        session.show_solution();
        let pattern = Arc::clone(session.pattern());

        self.release_drag(view);
        self.reset_transient(timers);
        view.show_solution(&pattern);
        timers.schedule(self.timer(TimerKind::SolutionDone), SOLUTION_DWELL);
    }

    fn finish_skip(&mut self, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.progress.record_skip(session.key());
        log::info!("Skipped {}", session.key());
        self.next_pattern(view, timers);
    }

    fn next_pattern(&mut self, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        if let Some(key) = self.current_key.take() {
            self.progress.reset_hints(&key);
        }
        self.start(view, timers);
    }

    fn back_to_menu(&mut self, view: &mut dyn ViewPort, timers: &mut dyn TimerQueue) {
        self.release_drag(view);
        self.reset_transient(timers);
        self.session = None;
        self.phase = Phase::Menu;
        view.show_menu();
    }
}
