/// Pan/zoom state for the infinite board, with inertial scrolling
///
/// All input handling is expressed as methods on [`Viewport`] so that the
/// per-frame decay loop can be driven (and tested) without a browser. The UI
/// layer only forwards events and schedules animation frames.
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 2.5;
pub const SCALE_STEP: f64 = 0.08;

/// Velocity multiplier applied once per frame while coasting
pub const FRICTION: f64 = 0.92;
/// Coasting stops once both velocity components are at or below this (px/frame)
pub const MIN_VELOCITY: f64 = 0.5;
/// Release velocity (px/event) above which coasting starts
pub const INERTIA_THRESHOLD: f64 = 1.0;
/// Quiet period after the last wheel event before wheel inertia is armed
pub const WHEEL_SETTLE_MS: u32 = 40;

pub const BASE_GRID_SIZE: f64 = 40.0;

/// A 2D vector in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// True if either component's magnitude is strictly above `threshold`
    pub fn exceeds(self, threshold: f64) -> bool {
        self.x.abs() > threshold || self.y.abs() > threshold
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Clamp a scale into `[MIN_SCALE, MAX_SCALE]`. NaN maps to `MIN_SCALE`.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Handle for one run of the inertial decay loop.
///
/// A token is only honoured while it matches the viewport's current
/// generation; any cancellation bumps the generation and orphans it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InertiaToken(u64);

/// Result of advancing the decay loop by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Still moving, schedule another frame
    Continue,
    /// Velocity fell below `MIN_VELOCITY`; the loop is finished
    Settled,
    /// The token is stale; nothing was applied
    Cancelled,
}

/// Background grid geometry for the current transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub size: f64,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    scale: f64,
    offset: Vec2,
    dragging: bool,
    anchor: Option<Vec2>,
    velocity: Vec2,
    generation: u64,
    coasting: bool,
    gesture_base: Option<f64>,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            scale: 1.0,
            offset: Vec2::ZERO,
            dragging: false,
            anchor: None,
            velocity: Vec2::ZERO,
            generation: 0,
            coasting: false,
            gesture_base: None,
        }
    }
}

impl Viewport {
    pub fn new(scale: f64, offset: Vec2) -> Self {
        Viewport {
            scale: clamp_scale(scale),
            offset,
            ..Viewport::default()
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// True while a decay loop holds a live token
    pub fn is_coasting(&self) -> bool {
        self.coasting
    }

    /// Stop any running decay loop and zero the velocity
    pub fn cancel_inertia(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.coasting = false;
        self.velocity = Vec2::ZERO;
    }

    pub fn begin_drag(&mut self, pointer: Vec2) {
        self.cancel_inertia();
        self.dragging = true;
        self.anchor = Some(pointer);
    }

    /// Any button stops a running decay loop; only the primary one drags
    pub fn pointer_down(&mut self, pointer: Vec2, primary: bool) {
        if primary {
            self.begin_drag(pointer);
        } else {
            self.cancel_inertia();
        }
    }

    /// Apply pointer movement. Returns false when no drag is in progress.
    pub fn drag_move(&mut self, pointer: Vec2) -> bool {
        let Some(anchor) = self.anchor.filter(|_| self.dragging) else {
            return false;
        };
        let delta = pointer - anchor;
        self.offset += delta;
        self.velocity = delta;
        self.anchor = Some(pointer);
        true
    }

    /// Finish a drag (pointer-up or pointer-leave), possibly starting inertia
    pub fn end_drag(&mut self) -> Option<InertiaToken> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        self.anchor = None;
        self.start_inertia()
    }

    /// Start a decay loop if the current velocity is above the release
    /// threshold. Any previously issued token becomes stale.
    pub fn start_inertia(&mut self) -> Option<InertiaToken> {
        if !self.velocity.exceeds(INERTIA_THRESHOLD) {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.coasting = true;
        Some(InertiaToken(self.generation))
    }

    /// Advance the decay loop by one display frame
    pub fn step_inertia(&mut self, token: InertiaToken) -> Frame {
        if !self.coasting || token.0 != self.generation {
            return Frame::Cancelled;
        }
        self.velocity = self.velocity * FRICTION;
        self.offset += self.velocity;
        if self.velocity.exceeds(MIN_VELOCITY) {
            Frame::Continue
        } else {
            self.coasting = false;
            self.velocity = Vec2::ZERO;
            Frame::Settled
        }
    }

    /// Two-finger scroll or plain mouse wheel. Scroll deltas move content the
    /// opposite way, so the offset moves by `-delta`.
    pub fn wheel_pan(&mut self, delta: Vec2) -> bool {
        if !delta.is_finite() {
            return false;
        }
        self.cancel_inertia();
        self.offset -= delta;
        self.velocity = -delta;
        true
    }

    /// Called once the wheel has been quiet for `WHEEL_SETTLE_MS`
    pub fn wheel_settled(&mut self) -> Option<InertiaToken> {
        if self.dragging {
            return None;
        }
        self.start_inertia()
    }

    /// Ctrl/meta + wheel. `cursor` is relative to the viewport center; the
    /// content point under it stays put on screen.
    pub fn wheel_zoom(&mut self, delta_y: f64, cursor: Vec2) -> bool {
        if !delta_y.is_finite() || !cursor.is_finite() {
            return false;
        }
        self.cancel_inertia();
        let new_scale = clamp_scale(self.scale - delta_y * SCALE_STEP * 0.01);
        let rel = (cursor - self.offset) / self.scale;
        self.offset -= rel * (new_scale - self.scale);
        self.scale = new_scale;
        true
    }

    pub fn gesture_start(&mut self) {
        self.cancel_inertia();
        self.gesture_base = Some(self.scale);
    }

    /// Pinch update with the platform's cumulative scale factor.
    ///
    /// Unlike `wheel_zoom` this scales around the viewport center; the
    /// point under the fingers drifts.
    pub fn gesture_change(&mut self, factor: f64) -> bool {
        if !factor.is_finite() {
            return false;
        }
        let base = self.gesture_base.unwrap_or(self.scale);
        self.scale = clamp_scale(base * factor);
        true
    }

    pub fn gesture_end(&mut self) {
        self.gesture_base = None;
    }

    /// Map a point relative to the viewport center into content coordinates
    pub fn screen_to_content(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.scale
    }

    pub fn content_to_screen(&self, content: Vec2) -> Vec2 {
        content * self.scale + self.offset
    }

    /// CSS transform for the content layer (centered in the viewport)
    pub fn transform(&self) -> String {
        format!(
            "translate(-50%, -50%) translate({}px, {}px) scale({})",
            self.offset.x, self.offset.y, self.scale
        )
    }

    pub fn grid(&self) -> Grid {
        let size = BASE_GRID_SIZE * self.scale;
        Grid {
            size,
            position: Vec2::new(self.offset.x % size, self.offset.y % size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    fn coast_to_rest(viewport: &mut Viewport, token: InertiaToken) -> usize {
        let mut frames = 0;
        while viewport.step_inertia(token) == Frame::Continue {
            frames += 1;
            assert!(frames < 10_000, "decay loop did not terminate");
        }
        frames + 1
    }

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::default();
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.offset(), Vec2::ZERO);
        assert!(!viewport.is_dragging());
        assert!(!viewport.is_coasting());
    }

    #[test]
    fn test_clamp_scale() {
        assert_eq!(clamp_scale(0.01), MIN_SCALE);
        assert_eq!(clamp_scale(100.0), MAX_SCALE);
        assert_eq!(clamp_scale(f64::INFINITY), MAX_SCALE);
        assert_eq!(clamp_scale(f64::NEG_INFINITY), MIN_SCALE);
        assert_eq!(clamp_scale(f64::NAN), MIN_SCALE);
        assert_eq!(clamp_scale(1.3), 1.3);
    }

    #[test]
    fn test_drag_moves_offset_and_tracks_velocity() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(Vec2::new(10.0, 10.0));
        assert!(viewport.drag_move(Vec2::new(15.0, 7.0)));
        assert_eq!(viewport.offset(), Vec2::new(5.0, -3.0));
        assert_eq!(viewport.velocity(), Vec2::new(5.0, -3.0));

        assert!(viewport.drag_move(Vec2::new(16.0, 7.0)));
        assert_eq!(viewport.offset(), Vec2::new(6.0, -3.0));
        assert_eq!(viewport.velocity(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_drag_move_without_drag_is_ignored() {
        let mut viewport = Viewport::default();
        assert!(!viewport.drag_move(Vec2::new(50.0, 50.0)));
        assert_eq!(viewport.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_slow_release_does_not_coast() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(Vec2::ZERO);
        viewport.drag_move(Vec2::new(1.0, -1.0));
        assert_eq!(viewport.end_drag(), None);
        assert!(!viewport.is_dragging());
        assert!(!viewport.is_coasting());
    }

    #[test]
    fn test_fast_release_coasts_and_settles() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(Vec2::ZERO);
        viewport.drag_move(Vec2::new(20.0, 0.0));
        let token = viewport.end_drag().expect("release above threshold");

        assert_eq!(viewport.step_inertia(token), Frame::Continue);
        assert!(approx_eq(viewport.offset().x, 20.0 + 20.0 * FRICTION));

        coast_to_rest(&mut viewport, token);
        assert!(!viewport.is_coasting());
        assert_eq!(viewport.velocity(), Vec2::ZERO);
        assert_eq!(viewport.step_inertia(token), Frame::Cancelled);
    }

    #[test]
    fn test_decay_terminates_for_large_velocity() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(Vec2::ZERO);
        viewport.drag_move(Vec2::new(1.0e6, -1.0e6));
        let token = viewport.end_drag().unwrap();

        // 1e6 * 0.92^n first drops to 0.5 or below at n = 175
        let frames = coast_to_rest(&mut viewport, token);
        assert_eq!(frames, 175);
    }

    #[test]
    fn test_new_drag_cancels_inertia() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(Vec2::ZERO);
        viewport.drag_move(Vec2::new(30.0, 30.0));
        let token = viewport.end_drag().unwrap();
        viewport.step_inertia(token);

        viewport.begin_drag(Vec2::new(100.0, 100.0));
        assert_eq!(viewport.velocity(), Vec2::ZERO);
        assert!(!viewport.is_coasting());

        let before = viewport.offset();
        assert_eq!(viewport.step_inertia(token), Frame::Cancelled);
        assert_eq!(viewport.offset(), before);

        viewport.drag_move(Vec2::new(102.0, 100.0));
        assert_eq!(viewport.velocity(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_secondary_button_cancels_inertia_without_dragging() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(Vec2::ZERO);
        viewport.drag_move(Vec2::new(30.0, 0.0));
        let token = viewport.end_drag().unwrap();
        assert_eq!(viewport.step_inertia(token), Frame::Continue);

        viewport.pointer_down(Vec2::new(50.0, 50.0), false);
        assert!(!viewport.is_dragging());
        assert!(!viewport.is_coasting());
        assert_eq!(viewport.velocity(), Vec2::ZERO);

        let before = viewport.offset();
        assert_eq!(viewport.step_inertia(token), Frame::Cancelled);
        assert_eq!(viewport.offset(), before);
        assert!(!viewport.drag_move(Vec2::new(80.0, 50.0)));
    }

    #[test]
    fn test_primary_button_starts_drag() {
        let mut viewport = Viewport::default();
        viewport.pointer_down(Vec2::new(10.0, 10.0), true);
        assert!(viewport.is_dragging());
        assert!(viewport.drag_move(Vec2::new(15.0, 10.0)));
        assert_eq!(viewport.offset(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_wheel_cancels_inertia() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(Vec2::ZERO);
        viewport.drag_move(Vec2::new(30.0, 0.0));
        let token = viewport.end_drag().unwrap();

        viewport.wheel_pan(Vec2::new(0.0, 4.0));
        assert_eq!(viewport.step_inertia(token), Frame::Cancelled);

        let token = viewport.wheel_settled().unwrap();
        viewport.wheel_zoom(10.0, Vec2::ZERO);
        assert_eq!(viewport.step_inertia(token), Frame::Cancelled);
    }

    #[test]
    fn test_only_latest_token_is_live() {
        let mut viewport = Viewport::default();
        viewport.wheel_pan(Vec2::new(-10.0, 0.0));
        let first = viewport.wheel_settled().unwrap();
        let second = viewport.start_inertia().unwrap();

        assert_ne!(first, second);
        assert_eq!(viewport.step_inertia(first), Frame::Cancelled);
        assert_eq!(viewport.step_inertia(second), Frame::Continue);
    }

    #[test]
    fn test_wheel_pan_inverts_delta() {
        let mut viewport = Viewport::default();
        assert!(viewport.wheel_pan(Vec2::new(3.0, -8.0)));
        assert_eq!(viewport.offset(), Vec2::new(-3.0, 8.0));
        assert_eq!(viewport.velocity(), Vec2::new(-3.0, 8.0));
    }

    #[test]
    fn test_wheel_settled_below_threshold() {
        let mut viewport = Viewport::default();
        viewport.wheel_pan(Vec2::new(0.5, 1.0));
        assert_eq!(viewport.wheel_settled(), None);
    }

    #[test]
    fn test_wheel_settled_during_drag() {
        let mut viewport = Viewport::default();
        viewport.wheel_pan(Vec2::new(0.0, 20.0));
        viewport.begin_drag(Vec2::ZERO);
        viewport.drag_move(Vec2::new(10.0, 0.0));
        assert_eq!(viewport.wheel_settled(), None);
    }

    #[test]
    fn test_non_finite_wheel_is_ignored() {
        let mut viewport = Viewport::default();
        assert!(!viewport.wheel_pan(Vec2::new(f64::NAN, 0.0)));
        assert!(!viewport.wheel_zoom(f64::INFINITY, Vec2::ZERO));
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_wheel_zoom_scenario() {
        let mut viewport = Viewport::default();
        let cursor = Vec2::new(100.0, 100.0);
        let content = viewport.screen_to_content(cursor);

        viewport.wheel_zoom(-50.0, cursor);

        assert!(approx_eq(viewport.scale(), 1.0 + 50.0 * 0.0008));
        // rel = (100, 100), scale delta = 0.04
        assert!(vec_approx_eq(viewport.offset(), Vec2::new(-4.0, -4.0)));
        assert!(vec_approx_eq(viewport.content_to_screen(content), cursor));
    }

    #[test]
    fn test_wheel_zoom_keeps_cursor_point_fixed() {
        let starts = [
            (1.0, Vec2::ZERO),
            (0.35, Vec2::new(-420.0, 77.5)),
            (2.2, Vec2::new(1300.0, -950.0)),
            (MIN_SCALE, Vec2::new(5.0, 5.0)),
            (MAX_SCALE, Vec2::new(-5.0, 12.0)),
        ];
        let cursors = [
            Vec2::new(100.0, 100.0),
            Vec2::new(-640.0, 310.0),
            Vec2::ZERO,
        ];
        let deltas = [-300.0, -40.0, -1.0, 1.0, 53.0, 400.0];

        for &(scale, offset) in &starts {
            for &cursor in &cursors {
                for &delta in &deltas {
                    let mut viewport = Viewport::new(scale, offset);
                    let content = viewport.screen_to_content(cursor);
                    viewport.wheel_zoom(delta, cursor);
                    let after = viewport.content_to_screen(content);
                    assert!(
                        (after.x - cursor.x).abs() < 1e-6 && (after.y - cursor.y).abs() < 1e-6,
                        "scale {scale} offset {offset:?} cursor {cursor:?} delta {delta}: {after:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_wheel_zoom_clamps() {
        let mut viewport = Viewport::default();
        viewport.wheel_zoom(-1.0e9, Vec2::new(10.0, 10.0));
        assert_eq!(viewport.scale(), MAX_SCALE);
        viewport.wheel_zoom(1.0e9, Vec2::new(10.0, 10.0));
        assert_eq!(viewport.scale(), MIN_SCALE);
    }

    #[test]
    fn test_pinch_scales_from_snapshot() {
        let mut viewport = Viewport::new(1.5, Vec2::new(40.0, 40.0));
        viewport.gesture_start();
        viewport.gesture_change(1.2);
        assert!(approx_eq(viewport.scale(), 1.8));
        // cumulative factor, not compounding
        viewport.gesture_change(0.5);
        assert!(approx_eq(viewport.scale(), 0.75));
        viewport.gesture_change(100.0);
        assert_eq!(viewport.scale(), MAX_SCALE);
        // no cursor-centering on this path
        assert_eq!(viewport.offset(), Vec2::new(40.0, 40.0));
        viewport.gesture_end();
    }

    #[test]
    fn test_pinch_without_start_uses_current_scale() {
        let mut viewport = Viewport::default();
        viewport.gesture_change(0.1);
        assert_eq!(viewport.scale(), MIN_SCALE);
        assert!(!viewport.gesture_change(f64::NAN));
    }

    #[test]
    fn test_transform_string() {
        let viewport = Viewport::new(1.5, Vec2::new(12.0, -3.5));
        assert_eq!(
            viewport.transform(),
            "translate(-50%, -50%) translate(12px, -3.5px) scale(1.5)"
        );
    }

    #[test]
    fn test_grid_follows_offset() {
        let viewport = Viewport::new(0.5, Vec2::new(45.0, -30.0));
        let grid = viewport.grid();
        assert_eq!(grid.size, 20.0);
        assert_eq!(grid.position, Vec2::new(5.0, -10.0));
    }
}
