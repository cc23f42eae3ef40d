use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::state::{AnimationState, Corner, Position, WidgetState};
use crate::util::unix_millis;

/// File-backed widget state store, shared between pet-hud instances.
///
/// The file is the source of truth; every mutation goes through
/// read-merge-write. There is no locking: concurrent instances race and the
/// last write wins, which is fine for a mascot. Write failures are logged
/// and the in-memory state the caller derived is left alone (best effort).
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `$PET_HUD_STATE` or `~/.config/pet-hud/state.json`.
    pub fn at_default_path() -> Self {
        let path = std::env::var("PET_HUD_STATE")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".config/pet-hud/state.json")
            });
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current record. A missing or corrupt file yields defaults;
    /// partial records are filled in field by field via serde defaults.
    pub fn get(&self) -> WidgetState {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(state) => state,
                Err(e) => {
                    eprintln!(
                        "[pet-hud] corrupt state file {:?}, using defaults: {e}",
                        self.path
                    );
                    WidgetState::default()
                }
            },
            Err(_) => WidgetState::default(),
        }
    }

    /// Write the full record atomically (temp file + rename).
    pub fn set(&self, state: &WidgetState) {
        let json = match serde_json::to_string_pretty(state) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("[pet-hud] failed to serialize state: {e}");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("[pet-hud] cannot create {parent:?}: {e}");
                return;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let result = std::fs::write(&tmp, json).and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            eprintln!("[pet-hud] failed to persist state to {:?}: {e}", self.path);
        }
    }

    /// Read-merge-write. Stamps `last_interaction` and returns the state
    /// that was written, so callers can refresh their cache without a
    /// second read.
    pub fn set_with(&self, update: impl FnOnce(&mut WidgetState)) -> WidgetState {
        let mut state = self.get();
        update(&mut state);
        state.last_interaction = unix_millis();
        self.set(&state);
        state
    }

    /// Modification time of the backing file, for change polling.
    pub fn mtime(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    // --- Typed convenience wrappers ---

    pub fn update_position(&self, x: f32, y: f32) -> WidgetState {
        self.set_with(|s| s.position = Position { x, y })
    }

    pub fn update_size(&self, size: f32) -> WidgetState {
        self.set_with(|s| s.size = WidgetState::clamp_size(size))
    }

    /// Hiding also clears the dragging mirror: a hidden mascot cannot be
    /// mid-drag, and the flag must not outlive the interaction in the file.
    pub fn set_visibility(&self, visible: bool) -> WidgetState {
        self.set_with(|s| {
            s.visible = visible;
            if !visible {
                s.is_dragging = false;
            }
        })
    }

    pub fn toggle_visibility(&self) -> WidgetState {
        self.set_with(|s| {
            s.visible = !s.visible;
            if !s.visible {
                s.is_dragging = false;
            }
        })
    }

    /// Move to a corner's canonical resting position and remember the corner.
    pub fn snap_to_corner(&self, corner: Corner, viewport: (f32, f32)) -> WidgetState {
        self.set_with(|s| {
            s.position = corner.anchor(viewport, s.size);
            s.corner = corner;
        })
    }

    pub fn toggle_snap_to_edge(&self) -> WidgetState {
        self.set_with(|s| s.snap_to_edge = !s.snap_to_edge)
    }

    pub fn toggle_animations(&self) -> WidgetState {
        self.set_with(|s| s.enable_animations = !s.enable_animations)
    }

    pub fn set_animation_state(&self, animation: AnimationState) -> WidgetState {
        self.set_with(|s| s.animation_state = animation)
    }

    pub fn set_dragging(&self, dragging: bool) -> WidgetState {
        self.set_with(|s| s.is_dragging = dragging)
    }

    pub fn reset_position(&self, viewport: (f32, f32)) -> WidgetState {
        let (vw, vh) = viewport;
        self.set_with(|s| {
            s.position = Position {
                x: vw - 100.0,
                y: vh - 100.0,
            };
            s.corner = Corner::BottomRight;
        })
    }

    pub fn reset_all(&self) -> WidgetState {
        let state = WidgetState::default();
        self.set(&state);
        state
    }
}
