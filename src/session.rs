use crate::config::LifeConfig;
use crate::error::{LifeError, Result};
use crate::grid::Grid;
use crate::pattern;
use crate::playback::Playback;
use crate::rules::{self, patterns::Pattern};
use crate::schedule::Deferred;
use crate::viewport::{PointerGesture, Viewport};
use std::time::Instant;

/// Render callback. The session calls it after every completed generation,
/// after every change to what is on screen (grid edits, pan, zoom, grid lines)
/// and once more when a burst of wheel events has settled.
pub trait Redraw {
    fn request_redraw(&self);
}

/// One simulator: grid, viewport, playback and pointer state, driven by the
/// host's event loop. Every control-surface command is a method here.
pub struct Session<R: Redraw> {
    grid: Grid,
    back: Grid,
    grid_version: u64,
    viewport: Viewport,
    playback: Playback,
    gesture: PointerGesture,
    zoom_settle: Deferred<()>,
    show_grid_lines: bool,
    redraw: R,
}

impl<R: Redraw> Session<R> {
    pub fn new(config: &LifeConfig, redraw: R) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.grid_width, config.grid_height)?;
        log::info!(
            "session created: {}x{} cells, {} generation(s)/s",
            config.grid_width,
            config.grid_height,
            config.rate
        );
        Ok(Self {
            back: grid.clone(),
            grid,
            grid_version: 0,
            viewport: Viewport::new(config.cell_size, config.zoom_sensitivity),
            playback: Playback::new(config.rate)?,
            gesture: PointerGesture::new(config.click_delay, config.drag_threshold),
            zoom_settle: Deferred::new(config.wheel_debounce),
            show_grid_lines: config.show_grid_lines,
            redraw,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Bumped on every grid change, so a renderer can skip re-uploading.
    pub fn grid_version(&self) -> u64 {
        self.grid_version
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn show_grid_lines(&self) -> bool {
        self.show_grid_lines
    }

    fn grid_changed(&mut self) {
        self.grid_version = self.grid_version.wrapping_add(1);
        self.redraw.request_redraw();
    }

    pub fn start(&mut self, now: Instant) {
        self.playback.start(now);
    }

    pub fn stop(&mut self) {
        self.playback.stop();
    }

    pub fn toggle_running(&mut self, now: Instant) {
        self.playback.toggle(now);
    }

    /// Kill every cell. Playback keeps its running state.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.playback.reset_generation();
        log::info!("grid reset");
        self.grid_changed();
    }

    pub fn set_rate(&mut self, rate: i64) -> Result<()> {
        self.playback.set_rate(rate).inspect_err(|err| {
            log::warn!("{err}; keeping {} generation(s)/s", self.playback.rate());
        })
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if self.viewport.set_zoom(zoom) {
            self.redraw.request_redraw();
        }
    }

    pub fn set_grid_lines(&mut self, visible: bool) {
        if self.show_grid_lines != visible {
            self.show_grid_lines = visible;
            self.redraw.request_redraw();
        }
    }

    /// Replace the grid contents with a pattern document.
    ///
    /// A [`LifeError::PartialLoad`] still leaves the well-formed part applied.
    pub fn load_pattern(&mut self, text: &str) -> Result<usize> {
        let result = pattern::decode_into(&mut self.grid, text);
        self.playback.reset_generation();
        self.grid_changed();
        match &result {
            Ok(live) => log::info!("pattern loaded: {live} live cell(s)"),
            Err(err) => {
                log::warn!("{err}");
                if let LifeError::PartialLoad { errors, .. } = err {
                    for malformed in errors {
                        log::warn!("  {malformed}");
                    }
                }
            }
        }
        result
    }

    pub fn load_pattern_file(&mut self, path: &std::path::Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)?;
        log::info!("loading pattern from {}", path.display());
        self.load_pattern(&text)
    }

    pub fn stamp(&mut self, pattern: Pattern, x: i64, y: i64) {
        pattern.stamp(&mut self.grid, x, y);
        log::debug!("stamped {} at ({x}, {y})", pattern.name());
        self.grid_changed();
    }

    /// Toggle the cell under a screen point. Points off the grid are ignored.
    pub fn toggle_at(&mut self, px: f64, py: f64) -> bool {
        let Some((cx, cy)) =
            self.viewport
                .visible_cell(px, py, self.grid.width(), self.grid.height())
        else {
            return false;
        };
        self.grid.toggle(cx, cy);
        self.grid_changed();
        true
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, now: Instant) {
        self.gesture.press(x, y, now);
    }

    /// `pan_held` is whether the pan button is down during this move.
    pub fn pointer_move(&mut self, x: f64, y: f64, pan_held: bool) {
        if let Some((dx, dy)) = self.gesture.moved(x, y, pan_held) {
            self.viewport.pan(dx, dy);
            self.redraw.request_redraw();
        }
    }

    pub fn pointer_up(&mut self) {
        self.gesture.release();
    }

    pub fn wheel(&mut self, delta: f64, now: Instant) {
        if self.viewport.zoom_by_wheel(delta) {
            self.zoom_settle.schedule(now, ());
            self.redraw.request_redraw();
        }
    }

    /// Run whatever has fallen due by `now`: every pending click, the settled
    /// zoom redraw, then at most one generation. Returns whether a generation
    /// was applied.
    pub fn advance(&mut self, now: Instant) -> bool {
        while let Some((x, y)) = self.gesture.poll_click(now) {
            self.toggle_at(x, y);
        }
        if self.zoom_settle.poll(now).is_some() {
            log::debug!("zoom settled at {:.2}", self.viewport.zoom());
            self.redraw.request_redraw();
        }
        if !self.playback.tick(now) {
            return false;
        }
        rules::step_into(&self.grid, &mut self.back);
        std::mem::swap(&mut self.grid, &mut self.back);
        self.grid_changed();
        true
    }

    /// Earliest instant at which [`Session::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.playback.next_deadline(),
            self.gesture.deadline(),
            self.zoom_settle.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }
}
