use serde::{Deserialize, Serialize};

use crate::util::unix_millis;

/// Mascot edge length bounds, pixels.
pub const SIZE_MIN: f32 = 64.0;
pub const SIZE_MAX: f32 = 128.0;

/// Padding between a snapped mascot and the screen edges, pixels.
pub const CORNER_PADDING: f32 = 20.0;

/// Viewport assumed before the compositor reports a real size.
pub const FALLBACK_VIEWPORT: (f32, f32) = (1200.0, 800.0);

/// One of the four canonical resting corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Canonical resting position for this corner, given the viewport and
    /// mascot size.
    pub fn anchor(self, viewport: (f32, f32), size: f32) -> Position {
        let (vw, vh) = viewport;
        let pad = CORNER_PADDING;
        match self {
            Corner::TopLeft => Position { x: pad, y: pad },
            Corner::TopRight => Position {
                x: vw - size - pad,
                y: pad,
            },
            Corner::BottomLeft => Position {
                x: pad,
                y: vh - size - pad,
            },
            Corner::BottomRight => Position {
                x: vw - size - pad,
                y: vh - size - pad,
            },
        }
    }
}

/// Idle decoration played while nothing else is going on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    Idle,
    Blink,
    Bounce,
    Sip,
}

/// Top-left pixel coordinate of the mascot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// The persisted, cross-instance widget record. The storage file is the
/// source of truth; in-process copies are read-through caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetState {
    pub enabled: bool,
    pub domain_enabled: bool,
    pub visible: bool,
    pub position: Position,
    pub size: f32,
    pub corner: Corner,
    pub snap_to_edge: bool,
    pub enable_animations: bool,
    pub animation_state: AnimationState,
    pub is_dragging: bool,
    pub last_interaction: u64,
}

impl Default for WidgetState {
    fn default() -> Self {
        let (vw, vh) = FALLBACK_VIEWPORT;
        Self {
            enabled: true,
            domain_enabled: true,
            visible: true,
            position: Position {
                x: vw - 100.0,
                y: vh - 100.0,
            },
            size: 80.0,
            corner: Corner::BottomRight,
            snap_to_edge: false,
            enable_animations: true,
            animation_state: AnimationState::Idle,
            is_dragging: false,
            last_interaction: unix_millis(),
        }
    }
}

impl WidgetState {
    /// Clamp `size` into the supported range.
    pub fn clamp_size(size: f32) -> f32 {
        size.clamp(SIZE_MIN, SIZE_MAX)
    }

    /// Clamp a position so the mascot stays fully inside the viewport.
    pub fn clamp_position(pos: Position, viewport: (f32, f32), size: f32) -> Position {
        let (vw, vh) = viewport;
        Position {
            x: pos.x.clamp(0.0, (vw - size).max(0.0)),
            y: pos.y.clamp(0.0, (vh - size).max(0.0)),
        }
    }
}

/// An externally observable transition between two cached states. Diffing is
/// what keeps repeated identical writes idempotent at the UI layer: two
/// `set_visibility(true)` calls in a row produce a single `Shown`.
#[derive(Debug, Clone, PartialEq)]
pub enum StateDelta {
    Shown,
    Hidden,
    Moved(Position),
    Resized(f32),
    SnapToEdge(bool),
    DecorationChanged,
    DraggingElsewhere(bool),
}

/// Compute the minimal transitions to apply when a change notification
/// invalidates the local cache. `last_interaction` alone never counts.
pub fn diff(old: &WidgetState, new: &WidgetState) -> Vec<StateDelta> {
    let mut deltas = Vec::new();
    if old.visible != new.visible {
        deltas.push(if new.visible {
            StateDelta::Shown
        } else {
            StateDelta::Hidden
        });
    }
    if old.position != new.position {
        deltas.push(StateDelta::Moved(new.position));
    }
    if old.size != new.size {
        deltas.push(StateDelta::Resized(new.size));
    }
    if old.snap_to_edge != new.snap_to_edge {
        deltas.push(StateDelta::SnapToEdge(new.snap_to_edge));
    }
    if old.enable_animations != new.enable_animations
        || old.animation_state != new.animation_state
    {
        deltas.push(StateDelta::DecorationChanged);
    }
    if old.is_dragging != new.is_dragging {
        deltas.push(StateDelta::DraggingElsewhere(new.is_dragging));
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let state = WidgetState::default();
        assert!(state.enabled);
        assert!(state.visible);
        assert_eq!(state.size, 80.0);
        assert_eq!(state.corner, Corner::BottomRight);
        assert!(!state.snap_to_edge);
        assert!(!state.is_dragging);
    }

    #[test]
    fn size_clamped_to_range() {
        assert_eq!(WidgetState::clamp_size(10.0), SIZE_MIN);
        assert_eq!(WidgetState::clamp_size(500.0), SIZE_MAX);
        assert_eq!(WidgetState::clamp_size(96.0), 96.0);
    }

    #[test]
    fn position_clamped_to_viewport() {
        let pos = WidgetState::clamp_position(
            Position { x: -50.0, y: 900.0 },
            (1200.0, 800.0),
            80.0,
        );
        assert_eq!(pos, Position { x: 0.0, y: 720.0 });
    }

    #[test]
    fn corner_anchors() {
        let vp = (1200.0, 800.0);
        assert_eq!(
            Corner::TopLeft.anchor(vp, 80.0),
            Position { x: 20.0, y: 20.0 }
        );
        assert_eq!(
            Corner::TopRight.anchor(vp, 80.0),
            Position { x: 1100.0, y: 20.0 }
        );
        assert_eq!(
            Corner::BottomLeft.anchor(vp, 80.0),
            Position { x: 20.0, y: 700.0 }
        );
        assert_eq!(
            Corner::BottomRight.anchor(vp, 80.0),
            Position {
                x: 1100.0,
                y: 700.0
            }
        );
    }

    #[test]
    fn serde_round_trip() {
        let state = WidgetState::default();
        let json = serde_json::to_string(&state).unwrap();
        let back: WidgetState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let back: WidgetState = serde_json::from_str(r#"{"visible": false}"#).unwrap();
        assert!(!back.visible);
        assert!(back.enabled);
        assert_eq!(back.size, 80.0);
    }

    #[test]
    fn corner_serializes_kebab_case() {
        let json = serde_json::to_string(&Corner::BottomRight).unwrap();
        assert_eq!(json, r#""bottom-right""#);
    }

    #[test]
    fn diff_identical_states_is_empty() {
        let state = WidgetState::default();
        assert!(diff(&state, &state).is_empty());
    }

    #[test]
    fn diff_last_interaction_only_is_empty() {
        let old = WidgetState::default();
        let mut new = old.clone();
        new.last_interaction += 1000;
        assert!(diff(&old, &new).is_empty());
    }

    #[test]
    fn diff_visibility_single_transition() {
        let mut old = WidgetState::default();
        old.visible = false;
        let mut new = old.clone();
        new.visible = true;
        assert_eq!(diff(&old, &new), vec![StateDelta::Shown]);
        // Applying the same write again is a no-op.
        assert!(diff(&new, &new).is_empty());
    }

    #[test]
    fn diff_move_and_hide() {
        let old = WidgetState::default();
        let mut new = old.clone();
        new.visible = false;
        new.position = Position { x: 1.0, y: 2.0 };
        let deltas = diff(&old, &new);
        assert!(deltas.contains(&StateDelta::Hidden));
        assert!(deltas.contains(&StateDelta::Moved(Position { x: 1.0, y: 2.0 })));
        assert_eq!(deltas.len(), 2);
    }
}
