use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
/// Zoom changes by this factor per unit of scaled wheel delta.
pub const ZOOM_BASE: f64 = 1.1;

// Relative tolerance for treating a transformed coordinate as sitting exactly on a cell edge.
const SNAP_EPSILON: f64 = 1e-9;

fn snapped_floor(v: f64) -> i64 {
    let nearest = v.round();
    if (v - nearest).abs() <= SNAP_EPSILON * nearest.abs().max(1.0) {
        nearest as i64
    } else {
        v.floor() as i64
    }
}

/// Pan offset and zoom, and the mapping between screen pixels and grid cells.
///
/// `offset` is a translation in unzoomed world pixels (cell `c` starts at
/// world pixel `c * cell_size`).
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    offset: [f64; 2],
    zoom: f64,
    cell_size: f64,
    wheel_sensitivity: f64,
}

impl Viewport {
    pub fn new(cell_size: f64, wheel_sensitivity: f64) -> Self {
        Self {
            offset: [0.0, 0.0],
            zoom: 1.0,
            cell_size,
            wheel_sensitivity,
        }
    }

    pub fn offset(&self) -> [f64; 2] {
        self.offset
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Grid cell under a screen pixel.
    pub fn screen_to_cell(&self, px: f64, py: f64) -> (i64, i64) {
        let wx = px / self.zoom + self.offset[0];
        let wy = py / self.zoom + self.offset[1];
        (snapped_floor(wx / self.cell_size), snapped_floor(wy / self.cell_size))
    }

    /// Screen position of a cell's top-left corner.
    pub fn cell_to_screen(&self, cx: i64, cy: i64) -> (f64, f64) {
        (
            (cx as f64 * self.cell_size - self.offset[0]) * self.zoom,
            (cy as f64 * self.cell_size - self.offset[1]) * self.zoom,
        )
    }

    /// The cell under a screen pixel, if it lies on a `width` x `height` grid.
    /// Points off the grid give `None` rather than wrapping.
    pub fn visible_cell(&self, px: f64, py: f64, width: u32, height: u32) -> Option<(i64, i64)> {
        let (cx, cy) = self.screen_to_cell(px, py);
        let inside = (0..width as i64).contains(&cx) && (0..height as i64).contains(&cy);
        inside.then_some((cx, cy))
    }

    /// Drag the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset[0] -= dx / self.zoom;
        self.offset[1] -= dy / self.zoom;
    }

    /// Apply a wheel delta (positive scrolls down and zooms out). Returns whether zoom changed.
    pub fn zoom_by_wheel(&mut self, delta: f64) -> bool {
        if !delta.is_finite() {
            return false;
        }
        let factor = ZOOM_BASE.powf(-delta * self.wheel_sensitivity);
        // An overflowing factor still saturates at the limit
        self.set_zoom((self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM))
    }

    /// Set zoom directly, clamped to [`MIN_ZOOM`, `MAX_ZOOM`]. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (clamped - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = clamped;
        true
    }
}

/// Tells a click from a drag on the pan button.
///
/// Every press schedules its own toggle at the press position after the
/// click delay, so quick successive clicks each land. Moving further than the
/// drag threshold with the button held first turns the gesture into a pan and
/// cancels every toggle still pending.
#[derive(Debug, Clone)]
pub struct PointerGesture {
    click_delay: Duration,
    // Due instants are non-decreasing front to back
    clicks: VecDeque<(Instant, (f64, f64))>,
    last_pos: Option<(f64, f64)>,
    dragging: bool,
    drag_threshold: f64,
}

impl PointerGesture {
    pub fn new(click_delay: Duration, drag_threshold: f64) -> Self {
        Self {
            click_delay,
            clicks: VecDeque::new(),
            last_pos: None,
            dragging: false,
            drag_threshold,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn press(&mut self, x: f64, y: f64, now: Instant) {
        self.dragging = false;
        self.last_pos = Some((x, y));
        let due = now + self.click_delay;
        // Keep the queue ordered even if the host hands us an older timestamp
        let at = self.clicks.partition_point(|(d, _)| *d <= due);
        self.clicks.insert(at, (due, (x, y)));
    }

    /// Pointer moved. Returns the screen delta to pan by, if this is a drag.
    pub fn moved(&mut self, x: f64, y: f64, held: bool) -> Option<(f64, f64)> {
        if !held {
            self.last_pos = None;
            return None;
        }
        let Some((lx, ly)) = self.last_pos else {
            self.last_pos = Some((x, y));
            return None;
        };
        let (dx, dy) = (x - lx, y - ly);
        if !self.dragging && dx.hypot(dy) <= self.drag_threshold {
            return None;
        }
        if !self.dragging {
            log::debug!("pointer drag started, {} pending toggle(s) cancelled", self.clicks.len());
            self.clicks.clear();
        }
        self.dragging = true;
        self.last_pos = Some((x, y));
        Some((dx, dy))
    }

    pub fn release(&mut self) {
        self.last_pos = None;
        self.dragging = false;
    }

    /// Screen position of the oldest click whose delay has elapsed without a
    /// drag. Call until `None` to drain every click that is due.
    pub fn poll_click(&mut self, now: Instant) -> Option<(f64, f64)> {
        match self.clicks.front() {
            Some((due, _)) if *due <= now => self.clicks.pop_front().map(|(_, pos)| pos),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.clicks.front().map(|(due, _)| *due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(10.0, 0.01)
    }

    #[test]
    fn identity_mapping() {
        let vp = viewport();
        assert_eq!(vp.screen_to_cell(0.0, 0.0), (0, 0));
        assert_eq!(vp.screen_to_cell(9.99, 10.0), (0, 1));
        assert_eq!(vp.screen_to_cell(-0.5, 25.0), (-1, 2));
        assert_eq!(vp.cell_to_screen(3, 4), (30.0, 40.0));
    }

    #[test]
    fn cell_round_trip_is_exact() {
        let mut vp = viewport();
        let offsets = [(0.0, 0.0), (0.1, -3.7), (123.456, 987.654), (-50.25, 12.5)];
        let zooms = [MIN_ZOOM, 0.3, 1.0, 1.7, 3.3, MAX_ZOOM];
        for &(ox, oy) in &offsets {
            for &z in &zooms {
                vp.offset = [ox, oy];
                vp.zoom = z;
                for cy in -20..20 {
                    for cx in -20..20 {
                        let (sx, sy) = vp.cell_to_screen(cx, cy);
                        assert_eq!(
                            vp.screen_to_cell(sx, sy),
                            (cx, cy),
                            "cell ({cx}, {cy}) offset ({ox}, {oy}) zoom {z}"
                        );
                        // A point inside the cell maps back too
                        let inner = vp.cell_size() * z * 0.5;
                        assert_eq!(vp.screen_to_cell(sx + inner, sy + inner), (cx, cy));
                    }
                }
            }
        }
    }

    #[test]
    fn pan_moves_against_drag_scaled_by_zoom() {
        let mut vp = viewport();
        vp.set_zoom(2.0);
        vp.pan(20.0, -10.0);
        assert_relative_eq!(vp.offset()[0], -10.0);
        assert_relative_eq!(vp.offset()[1], 5.0);
        // Content under the pointer follows it
        assert_eq!(vp.screen_to_cell(20.0, 0.0), (0, 0));
    }

    #[test]
    fn wheel_zoom_follows_power_law() {
        let mut vp = viewport();
        assert!(vp.zoom_by_wheel(-100.0));
        assert_relative_eq!(vp.zoom(), 1.1, epsilon = 1e-12);
        assert!(vp.zoom_by_wheel(200.0));
        assert_relative_eq!(vp.zoom(), 1.0 / 1.1, epsilon = 1e-12);
    }

    #[test]
    fn zoom_stays_clamped() {
        let mut vp = viewport();
        let deltas = [-5000.0, -5000.0, 120.0, 90000.0, -3.0, 1e300, -1e300, f64::NAN];
        for d in deltas {
            vp.zoom_by_wheel(d);
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&vp.zoom()), "zoom {}", vp.zoom());
        }
        vp.set_zoom(9.0);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        vp.set_zoom(0.0);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        assert!(!vp.set_zoom(f64::NAN));
        assert!(!vp.set_zoom(f64::INFINITY));
        assert!(!vp.set_zoom(f64::NEG_INFINITY));
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn off_grid_points_are_not_visible() {
        let vp = viewport();
        assert_eq!(vp.visible_cell(15.0, 5.0, 4, 4), Some((1, 0)));
        assert_eq!(vp.visible_cell(-1.0, 5.0, 4, 4), None);
        assert_eq!(vp.visible_cell(40.0, 5.0, 4, 4), None);
        assert_eq!(vp.visible_cell(5.0, 41.0, 4, 4), None);
    }

    #[test]
    fn still_press_becomes_click() {
        let t0 = Instant::now();
        let mut gesture = PointerGesture::new(Duration::from_millis(200), 0.0);
        gesture.press(12.0, 34.0, t0);
        assert_eq!(gesture.moved(12.0, 34.0, true), None);
        assert_eq!(gesture.poll_click(t0 + Duration::from_millis(100)), None);
        assert_eq!(gesture.poll_click(t0 + Duration::from_millis(200)), Some((12.0, 34.0)));
        assert_eq!(gesture.poll_click(t0 + Duration::from_millis(400)), None);
    }

    #[test]
    fn quick_presses_each_click() {
        let t0 = Instant::now();
        let mut gesture = PointerGesture::new(Duration::from_millis(200), 0.0);
        gesture.press(1.0, 1.0, t0);
        gesture.release();
        gesture.press(2.0, 2.0, t0 + Duration::from_millis(50));
        gesture.release();
        assert_eq!(gesture.deadline(), Some(t0 + Duration::from_millis(200)));
        assert_eq!(gesture.poll_click(t0 + Duration::from_millis(200)), Some((1.0, 1.0)));
        assert_eq!(gesture.poll_click(t0 + Duration::from_millis(200)), None);
        assert_eq!(gesture.poll_click(t0 + Duration::from_millis(250)), Some((2.0, 2.0)));
        assert_eq!(gesture.deadline(), None);
    }

    #[test]
    fn drag_cancels_every_pending_click() {
        let t0 = Instant::now();
        let mut gesture = PointerGesture::new(Duration::from_millis(200), 0.0);
        gesture.press(1.0, 1.0, t0);
        gesture.release();
        gesture.press(2.0, 2.0, t0 + Duration::from_millis(50));
        assert_eq!(gesture.moved(8.0, 2.0, true), Some((6.0, 0.0)));
        gesture.release();
        assert_eq!(gesture.deadline(), None);
        assert_eq!(gesture.poll_click(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn drag_cancels_click_and_reports_deltas() {
        let t0 = Instant::now();
        let mut gesture = PointerGesture::new(Duration::from_millis(200), 3.0);
        gesture.press(0.0, 0.0, t0);
        assert_eq!(gesture.moved(1.0, 1.0, true), None);
        assert!(!gesture.is_dragging());
        assert_eq!(gesture.moved(5.0, 0.0, true), Some((5.0, 0.0)));
        assert_eq!(gesture.moved(6.0, 2.0, true), Some((1.0, 2.0)));
        assert!(gesture.is_dragging());
        gesture.release();
        assert_eq!(gesture.poll_click(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn moves_without_button_do_nothing() {
        let mut gesture = PointerGesture::new(Duration::from_millis(200), 0.0);
        assert_eq!(gesture.moved(5.0, 5.0, false), None);
        assert_eq!(gesture.moved(9.0, 9.0, true), None);
        assert_eq!(gesture.moved(10.0, 9.0, true), Some((1.0, 0.0)));
    }
}
