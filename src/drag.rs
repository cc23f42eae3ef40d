use std::time::{Duration, Instant};

use crate::state::{Corner, Position, WidgetState, CORNER_PADDING};
use crate::util::ease_out_cubic;

/// Pointer travel before a press turns into a drag rather than a click.
pub const DRAG_THRESHOLD: f32 = 5.0;
/// How close a drop must land to a corner anchor to stick to the corner.
pub const SNAP_THRESHOLD: f32 = 24.0;
/// Glide animation toward a snap target.
pub const GLIDE_DURATION: Duration = Duration::from_millis(200);
/// Minimum spacing between mid-drag position commits to storage.
pub const COMMIT_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    Idle,
    /// Pressed but not yet past the drag threshold.
    Armed {
        cursor_start: Position,
        widget_start: Position,
    },
    /// Past the threshold; the widget tracks the cursor minus the grab
    /// offset.
    Dragging { grab_offset: Position },
    /// Animating toward a snap target.
    Gliding {
        from: Position,
        to: Position,
        started: Instant,
    },
}

/// Result of a pointer release.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    None,
    /// Press and release without meaningful travel.
    Click,
    /// Drag finished. `position` is where the widget comes to rest;
    /// `corner` is set when the drop stuck to a corner anchor. When
    /// `gliding`, the controller animates there while the caller commits
    /// the target immediately.
    Dropped {
        position: Position,
        corner: Option<Corner>,
        gliding: bool,
    },
}

/// What a pointer-move produced while a drag is live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionUpdate {
    pub position: Position,
    /// True when enough time passed since the last mid-drag commit that
    /// the caller should persist this position.
    pub commit: bool,
}

/// Tracks one pointer interaction with the mascot from press to rest.
/// Purely geometric; the caller feeds it cursor positions and commits
/// positions to storage when told to.
pub struct DragController {
    phase: DragPhase,
    last_commit: Option<Instant>,
}

impl DragController {
    pub fn new() -> Self {
        Self {
            phase: DragPhase::Idle,
            last_commit: None,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    pub fn is_gliding(&self) -> bool {
        matches!(self.phase, DragPhase::Gliding { .. })
    }

    /// Pointer pressed on the mascot. A second press while an interaction
    /// is live (extra touch points) is ignored.
    pub fn press(&mut self, cursor: Position, widget_pos: Position) {
        if self.phase == DragPhase::Idle {
            self.phase = DragPhase::Armed {
                cursor_start: cursor,
                widget_start: widget_pos,
            };
            self.last_commit = None;
        }
    }

    /// Pointer moved. Returns the new widget position while dragging:
    /// clamped to the viewport, and constrained to the nearest edge when
    /// `snap_to_edge` is on.
    pub fn motion(
        &mut self,
        cursor: Position,
        viewport: (f32, f32),
        size: f32,
        snap_to_edge: bool,
        now: Instant,
    ) -> Option<MotionUpdate> {
        if let DragPhase::Armed {
            cursor_start,
            widget_start,
        } = self.phase
        {
            let dx = cursor.x - cursor_start.x;
            let dy = cursor.y - cursor_start.y;
            if (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD {
                return None;
            }
            self.phase = DragPhase::Dragging {
                grab_offset: Position {
                    x: cursor_start.x - widget_start.x,
                    y: cursor_start.y - widget_start.y,
                },
            };
        }
        if !self.is_dragging() {
            return None;
        }
        let position = self.tracked_position(cursor, viewport, size, snap_to_edge);
        let commit = match self.last_commit {
            Some(last) => now.duration_since(last) >= COMMIT_DEBOUNCE,
            None => true,
        };
        if commit {
            self.last_commit = Some(now);
        }
        Some(MotionUpdate { position, commit })
    }

    /// Pointer released. A drop near a corner anchor sticks to the corner
    /// whatever the edge-snap setting; the corner snap glides.
    pub fn release(
        &mut self,
        cursor: Position,
        viewport: (f32, f32),
        size: f32,
        snap_to_edge: bool,
        now: Instant,
    ) -> ReleaseOutcome {
        match self.phase {
            DragPhase::Idle | DragPhase::Gliding { .. } => ReleaseOutcome::None,
            DragPhase::Armed { .. } => {
                self.phase = DragPhase::Idle;
                ReleaseOutcome::Click
            }
            DragPhase::Dragging { .. } => {
                let dropped = self.tracked_position(cursor, viewport, size, snap_to_edge);
                if let Some(corner) = corner_near(dropped, viewport, size) {
                    let target = corner.anchor(viewport, size);
                    self.phase = DragPhase::Gliding {
                        from: dropped,
                        to: target,
                        started: now,
                    };
                    ReleaseOutcome::Dropped {
                        position: target,
                        corner: Some(corner),
                        gliding: true,
                    }
                } else {
                    self.phase = DragPhase::Idle;
                    ReleaseOutcome::Dropped {
                        position: dropped,
                        corner: None,
                        gliding: false,
                    }
                }
            }
        }
    }

    fn tracked_position(
        &self,
        cursor: Position,
        viewport: (f32, f32),
        size: f32,
        snap_to_edge: bool,
    ) -> Position {
        let DragPhase::Dragging { grab_offset } = self.phase else {
            return cursor;
        };
        let clamped = WidgetState::clamp_position(
            Position {
                x: cursor.x - grab_offset.x,
                y: cursor.y - grab_offset.y,
            },
            viewport,
            size,
        );
        if snap_to_edge {
            edge_project(clamped, viewport, size)
        } else {
            clamped
        }
    }

    /// Advance a running glide. Returns the position to render this frame;
    /// `None` when no glide is active. Ends the glide once the easing
    /// reaches the target.
    pub fn glide_tick(&mut self, now: Instant) -> Option<Position> {
        let DragPhase::Gliding { from, to, started } = self.phase else {
            return None;
        };
        let t = now.duration_since(started).as_secs_f32() / GLIDE_DURATION.as_secs_f32();
        if t >= 1.0 {
            self.phase = DragPhase::Idle;
            return Some(to);
        }
        let eased = ease_out_cubic(t);
        Some(Position {
            x: from.x + (to.x - from.x) * eased,
            y: from.y + (to.y - from.y) * eased,
        })
    }

    /// Begin a glide outside the press/release cycle, e.g. when snapping
    /// is switched on for a widget already at rest. No-op mid-interaction.
    pub fn start_glide(&mut self, from: Position, to: Position, now: Instant) {
        if self.phase == DragPhase::Idle {
            self.phase = DragPhase::Gliding { from, to, started: now };
        }
    }

    /// Abandon whatever interaction is in flight (surface lost, widget
    /// hidden mid-drag).
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
        self.last_commit = None;
    }
}

/// Project a position onto the nearest screen edge at the standard
/// padding, keeping the along-edge coordinate (clamped inside the corner
/// padding).
pub fn edge_project(pos: Position, viewport: (f32, f32), size: f32) -> Position {
    let (vw, vh) = viewport;
    let dist_left = pos.x;
    let dist_right = vw - size - pos.x;
    let dist_top = pos.y;
    let dist_bottom = vh - size - pos.y;

    let min_h = dist_left.min(dist_right);
    let min_v = dist_top.min(dist_bottom);

    if min_h <= min_v {
        let x = if dist_left <= dist_right {
            CORNER_PADDING
        } else {
            vw - size - CORNER_PADDING
        };
        Position {
            x,
            y: pos
                .y
                .clamp(CORNER_PADDING, (vh - size - CORNER_PADDING).max(CORNER_PADDING)),
        }
    } else {
        let y = if dist_top <= dist_bottom {
            CORNER_PADDING
        } else {
            vh - size - CORNER_PADDING
        };
        Position {
            x: pos
                .x
                .clamp(CORNER_PADDING, (vw - size - CORNER_PADDING).max(CORNER_PADDING)),
            y,
        }
    }
}

/// The corner whose anchor lies within the snap threshold of `pos`, if any.
pub fn corner_near(pos: Position, viewport: (f32, f32), size: f32) -> Option<Corner> {
    for corner in [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ] {
        let anchor = corner.anchor(viewport, size);
        let dx = pos.x - anchor.x;
        let dy = pos.y - anchor.y;
        if (dx * dx + dy * dy).sqrt() <= SNAP_THRESHOLD {
            return Some(corner);
        }
    }
    None
}

/// Where a widget at rest settles when edge snapping is switched on:
/// nearest edge, upgraded to the corner anchor when close enough.
pub fn snap_target(pos: Position, viewport: (f32, f32), size: f32) -> (Position, Option<Corner>) {
    let projected = edge_project(pos, viewport, size);
    match corner_near(projected, viewport, size) {
        Some(corner) => (corner.anchor(viewport, size), Some(corner)),
        None => (projected, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: (f32, f32) = (1200.0, 800.0);
    const SIZE: f32 = 80.0;

    fn p(x: f32, y: f32) -> Position {
        Position { x, y }
    }

    #[test]
    fn small_travel_is_a_click() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(100.0, 100.0), p(90.0, 90.0));
        assert!(drag.motion(p(103.0, 102.0), VP, SIZE, false, now).is_none());
        assert_eq!(
            drag.release(p(103.0, 102.0), VP, SIZE, false, now),
            ReleaseOutcome::Click
        );
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn travel_past_threshold_starts_drag() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(100.0, 100.0), p(90.0, 90.0));
        let update = drag.motion(p(110.0, 100.0), VP, SIZE, false, now).unwrap();
        assert!(drag.is_dragging());
        // Grab offset (10, 10) preserved.
        assert_eq!(update.position, p(100.0, 90.0));
    }

    #[test]
    fn drag_positions_are_clamped() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(50.0, 50.0), p(40.0, 40.0));
        let update = drag.motion(p(-200.0, 2000.0), VP, SIZE, false, now).unwrap();
        assert_eq!(update.position, p(0.0, 800.0 - SIZE));
    }

    #[test]
    fn edge_snap_constrains_motion_to_nearest_edge() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(300.0, 300.0), p(300.0, 300.0));
        let update = drag.motion(p(3.0, 400.0), VP, SIZE, true, now).unwrap();
        assert_eq!(update.position, p(CORNER_PADDING, 400.0));
    }

    #[test]
    fn mid_drag_commits_are_debounced() {
        let t0 = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(100.0, 100.0), p(100.0, 100.0));
        let first = drag.motion(p(120.0, 100.0), VP, SIZE, false, t0).unwrap();
        assert!(first.commit);
        let soon = drag
            .motion(p(130.0, 100.0), VP, SIZE, false, t0 + Duration::from_millis(50))
            .unwrap();
        assert!(!soon.commit);
        let later = drag
            .motion(p(140.0, 100.0), VP, SIZE, false, t0 + COMMIT_DEBOUNCE)
            .unwrap();
        assert!(later.commit);
    }

    #[test]
    fn release_away_from_corners_rests_where_dropped() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(100.0, 100.0), p(100.0, 100.0));
        drag.motion(p(400.0, 300.0), VP, SIZE, false, now);
        let outcome = drag.release(p(400.0, 300.0), VP, SIZE, false, now);
        assert_eq!(
            outcome,
            ReleaseOutcome::Dropped {
                position: p(400.0, 300.0),
                corner: None,
                gliding: false,
            }
        );
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn drop_near_origin_sticks_to_top_left_even_without_edge_snap() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(300.0, 300.0), p(300.0, 300.0));
        drag.motion(p(5.0, 5.0), VP, SIZE, false, now);
        let outcome = drag.release(p(5.0, 5.0), VP, SIZE, false, now);
        assert_eq!(
            outcome,
            ReleaseOutcome::Dropped {
                position: p(20.0, 20.0),
                corner: Some(Corner::TopLeft),
                gliding: true,
            }
        );
        assert!(drag.is_gliding());
    }

    #[test]
    fn edge_snapped_release_keeps_projection_without_corner() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(300.0, 300.0), p(300.0, 300.0));
        drag.motion(p(3.0, 400.0), VP, SIZE, true, now);
        let outcome = drag.release(p(3.0, 400.0), VP, SIZE, true, now);
        assert_eq!(
            outcome,
            ReleaseOutcome::Dropped {
                position: p(CORNER_PADDING, 400.0),
                corner: None,
                gliding: false,
            }
        );
    }

    #[test]
    fn edge_project_prefers_nearest_edge() {
        // Closer to the bottom than any other edge.
        let target = edge_project(p(600.0, 700.0), VP, SIZE);
        assert_eq!(target, p(600.0, 800.0 - SIZE - CORNER_PADDING));
    }

    #[test]
    fn snap_target_bottom_right_corner() {
        let (target, corner) = snap_target(p(1110.0, 690.0), VP, SIZE);
        assert_eq!(corner, Some(Corner::BottomRight));
        assert_eq!(target, p(1100.0, 700.0));
    }

    #[test]
    fn corner_near_threshold() {
        assert_eq!(corner_near(p(30.0, 30.0), VP, SIZE), Some(Corner::TopLeft));
        assert_eq!(corner_near(p(60.0, 60.0), VP, SIZE), None);
    }

    #[test]
    fn glide_eases_toward_target_and_ends() {
        let t0 = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(300.0, 300.0), p(300.0, 300.0));
        drag.motion(p(5.0, 5.0), VP, SIZE, false, t0);
        drag.release(p(5.0, 5.0), VP, SIZE, false, t0);

        let mid = drag.glide_tick(t0 + GLIDE_DURATION / 2).unwrap();
        // Ease-out covers most of the distance in the first half:
        // past the linear midpoint (12.5) but not yet at 20.
        assert!(mid.x > 12.5 && mid.x < 20.0);
        assert!(mid.y > 12.5 && mid.y < 20.0);
        let done = drag.glide_tick(t0 + GLIDE_DURATION).unwrap();
        assert_eq!(done, p(20.0, 20.0));
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert!(drag.glide_tick(t0 + GLIDE_DURATION).is_none());
    }

    #[test]
    fn enabling_edge_snap_glides_resting_widget_to_target() {
        let t0 = Instant::now();
        let mut drag = DragController::new();
        let from = p(400.0, 300.0);

        // At rest, mid-screen: nearest edge is the top, no corner upgrade.
        let (target, corner) = snap_target(from, VP, SIZE);
        assert_eq!(corner, None);
        assert_eq!(target, p(400.0, CORNER_PADDING));

        drag.start_glide(from, target, t0);
        assert!(drag.is_gliding());

        let mid = drag.glide_tick(t0 + GLIDE_DURATION / 2).unwrap();
        assert_eq!(mid.x, 400.0);
        assert!(mid.y < from.y && mid.y > target.y);

        let done = drag.glide_tick(t0 + GLIDE_DURATION).unwrap();
        assert_eq!(done, target);
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn start_glide_ignored_mid_interaction() {
        let t0 = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(100.0, 100.0), p(100.0, 100.0));
        drag.motion(p(200.0, 200.0), VP, SIZE, false, t0);

        drag.start_glide(p(200.0, 200.0), p(20.0, 20.0), t0);
        assert!(drag.is_dragging());
        assert!(drag.glide_tick(t0 + GLIDE_DURATION).is_none());
    }

    #[test]
    fn second_press_during_interaction_ignored() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(100.0, 100.0), p(100.0, 100.0));
        drag.motion(p(200.0, 200.0), VP, SIZE, false, now);
        // Extra touch point; the live drag keeps its grab offset.
        drag.press(p(500.0, 500.0), p(100.0, 100.0));
        assert!(drag.is_dragging());
        let update = drag.motion(p(210.0, 210.0), VP, SIZE, false, now).unwrap();
        assert_eq!(update.position, p(210.0, 210.0));
    }

    #[test]
    fn cancel_resets() {
        let now = Instant::now();
        let mut drag = DragController::new();
        drag.press(p(100.0, 100.0), p(100.0, 100.0));
        drag.motion(p(200.0, 200.0), VP, SIZE, false, now);
        drag.cancel();
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert_eq!(
            drag.release(p(200.0, 200.0), VP, SIZE, false, now),
            ReleaseOutcome::None
        );
    }
}
