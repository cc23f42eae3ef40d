use std::time::Instant;

use iced::{Color, Element, Subscription, Task};
use iced_layershell::build_pattern::daemon;
use iced_layershell::settings::{LayerShellSettings, StartMode};
use iced_layershell::to_layer_message;

use crate::assets::AssetSet;
use crate::bubble::{BubbleController, BubbleSource};
use crate::drag::{snap_target, DragController, ReleaseOutcome};
use crate::ipc;
use crate::mood::{MoodController, INFO_LINES};
use crate::state::{
    diff, AnimationState, Corner, Position, StateDelta, WidgetState, FALLBACK_VIEWPORT,
};
use crate::storage::Storage;
use crate::surface::{focused_settings, visible_settings};
use crate::theme::{self, ThemeColors, ThemeMode};
use crate::watcher::parser::PageSignal;

pub(crate) type IcedId = iced::window::Id;

const TICK_MS: u64 = 80;

/// How the layer surface takes input. `Visible` draws but lets every event
/// fall through; `Focused` captures input so dragging and shortcuts work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SurfaceMode {
    Visible,
    Focused,
}

pub(crate) struct Mascot {
    pub(crate) mode: SurfaceMode,
    pub(crate) surface_id: Option<IcedId>,
    pub(crate) storage: Storage,
    /// Read-through cache of the persisted record.
    pub(crate) state: WidgetState,
    /// Where the mascot is drawn this frame. Tracks the cursor during a
    /// drag and the easing curve during a glide; otherwise the committed
    /// position.
    pub(crate) render_pos: Position,
    pub(crate) mood: MoodController,
    pub(crate) bubble: BubbleController,
    pub(crate) drag: DragController,
    pub(crate) assets: AssetSet,
    pub(crate) viewport: (f32, f32),
    pub(crate) cursor: Position,
    pub(crate) tick: usize,
    pub(crate) colors: ThemeColors,
}

#[to_layer_message(multi)]
#[derive(Debug, Clone)]
pub(crate) enum Message {
    ToggleVisibility,
    SetVisibility(bool),
    ToggleFocus,
    ToggleSnapToEdge,
    ToggleAnimations,
    ResetPosition,
    ResetAll,
    SetSize(f32),
    SetDecoration(AnimationState),
    SnapCorner(Corner),
    Say(String),
    Info(usize),
    DismissBubble,
    Tick,
    StorageChanged,
    PageSignal(PageSignal),
    CursorMoved(Position),
    PointerReleased,
    ViewportResized(f32, f32),
    MascotPressed,
    MascotReleased,
    BubblePressed,
    RestorePressed,
    Activity,
}

pub(crate) fn run() -> Result<(), iced_layershell::Error> {
    eprintln!(
        "[pet-hud] v{} ({}) starting in background mode",
        env!("PET_HUD_VERSION"),
        env!("PET_HUD_COMMIT")
    );

    let settings = LayerShellSettings {
        start_mode: StartMode::Background,
        ..Default::default()
    };

    daemon(Mascot::new, Mascot::namespace, Mascot::update, Mascot::view)
        .style(Mascot::style)
        .subscription(Mascot::subscription)
        .layer_settings(settings)
        .run()
}

fn map_event(event: iced::Event, _status: iced::event::Status, _id: IcedId) -> Option<Message> {
    match event {
        iced::Event::Mouse(iced::mouse::Event::CursorMoved { position }) => {
            Some(Message::CursorMoved(Position {
                x: position.x,
                y: position.y,
            }))
        }
        iced::Event::Mouse(iced::mouse::Event::ButtonReleased(iced::mouse::Button::Left)) => {
            Some(Message::PointerReleased)
        }
        iced::Event::Touch(iced::touch::Event::FingerPressed { position, .. })
        | iced::Event::Touch(iced::touch::Event::FingerMoved { position, .. }) => {
            Some(Message::CursorMoved(Position {
                x: position.x,
                y: position.y,
            }))
        }
        iced::Event::Touch(iced::touch::Event::FingerLifted { .. })
        | iced::Event::Touch(iced::touch::Event::FingerLost { .. }) => {
            Some(Message::PointerReleased)
        }
        iced::Event::Window(iced::window::Event::Resized(size)) => {
            Some(Message::ViewportResized(size.width, size.height))
        }
        _ => None,
    }
}

fn handle_key(
    key: iced::keyboard::Key,
    modifiers: iced::keyboard::Modifiers,
) -> Option<Message> {
    use iced::keyboard::key::Named;

    if modifiers.control() && modifiers.shift() {
        return match key.as_ref() {
            iced::keyboard::Key::Character(".") | iced::keyboard::Key::Character(">") => {
                Some(Message::ToggleVisibility)
            }
            iced::keyboard::Key::Character("1") | iced::keyboard::Key::Character("!") => {
                Some(Message::Info(0))
            }
            iced::keyboard::Key::Character("2") | iced::keyboard::Key::Character("@") => {
                Some(Message::Info(1))
            }
            iced::keyboard::Key::Character("3") | iced::keyboard::Key::Character("#") => {
                Some(Message::Info(2))
            }
            // Unbound chords are still user activity.
            _ => Some(Message::Activity),
        };
    }
    match key.as_ref() {
        iced::keyboard::Key::Named(Named::Escape) => Some(Message::DismissBubble),
        _ => Some(Message::Activity),
    }
}

impl Mascot {
    fn new() -> (Self, Task<Message>) {
        let theme_mode = match std::env::var("PET_HUD_THEME").as_deref() {
            Ok("dark") => ThemeMode::Dark,
            Ok("light") => ThemeMode::Light,
            _ => ThemeMode::Auto,
        };
        let colors = theme::resolve(theme_mode);
        eprintln!(
            "[pet-hud] theme: {}",
            if colors.is_dark { "dark" } else { "light" }
        );
        let storage = Storage::at_default_path();
        let state = storage.get();
        let now = Instant::now();

        let viewport = FALLBACK_VIEWPORT;
        let render_pos = WidgetState::clamp_position(state.position, viewport, state.size);

        let (id, task) = Message::layershell_open(visible_settings());
        eprintln!("[pet-hud] booting -> Visible (surface {id})");
        (
            Self {
                mode: SurfaceMode::Visible,
                surface_id: Some(id),
                storage,
                state,
                render_pos,
                mood: MoodController::new(now),
                bubble: BubbleController::new(),
                drag: DragController::new(),
                assets: AssetSet::load(),
                viewport,
                cursor: Position { x: 0.0, y: 0.0 },
                tick: 0,
                colors,
            },
            task,
        )
    }

    fn namespace() -> String {
        String::from("pet-hud")
    }

    /// Ask for an automatic bubble, honoring the shared cooldown.
    fn say_auto(&mut self, line: &str, now: Instant) {
        self.bubble.request(line, BubbleSource::Auto, now);
    }

    /// Apply a freshly read record written by another instance.
    fn apply_external(&mut self, new_state: WidgetState, now: Instant) {
        let mut new_state = new_state;
        for delta in diff(&self.state, &new_state) {
            match delta {
                StateDelta::Hidden => {
                    // The record may still carry our dragging mirror if the
                    // writer bypassed the visibility wrappers.
                    if self.drag.is_dragging() {
                        new_state = self.storage.set_dragging(false);
                    }
                    self.drag.cancel();
                    self.bubble.dismiss(now);
                }
                StateDelta::Moved(pos) => {
                    if !self.drag.is_dragging() && !self.drag.is_gliding() {
                        self.render_pos =
                            WidgetState::clamp_position(pos, self.viewport, new_state.size);
                    }
                }
                StateDelta::Resized(size) => {
                    self.render_pos =
                        WidgetState::clamp_position(self.render_pos, self.viewport, size);
                }
                _ => {}
            }
        }
        self.state = new_state;
    }

    /// Replace the cache with a record this instance just wrote.
    fn commit(&mut self, new_state: WidgetState) {
        if !self.drag.is_dragging() && !self.drag.is_gliding() {
            self.render_pos =
                WidgetState::clamp_position(new_state.position, self.viewport, new_state.size);
        }
        self.state = new_state;
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let now = Instant::now();
        match message {
            Message::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.bubble.tick(now);
                if let Some(pos) = self.drag.glide_tick(now) {
                    self.render_pos = pos;
                }
                let actions =
                    self.mood
                        .tick(now, self.drag.is_dragging(), self.bubble.is_active());
                for crate::mood::MoodAction::Say(line) in actions {
                    self.say_auto(&line, now);
                }
                Task::none()
            }
            Message::CursorMoved(pos) => {
                self.cursor = pos;
                self.mood.note_activity(now);
                let was_dragging = self.drag.is_dragging();
                if let Some(update) = self.drag.motion(
                    pos,
                    self.viewport,
                    self.state.size,
                    self.state.snap_to_edge,
                    now,
                ) {
                    self.render_pos = update.position;
                    if !was_dragging {
                        let state = self.storage.set_dragging(true);
                        self.state = state;
                    }
                    if update.commit {
                        self.state = self
                            .storage
                            .update_position(update.position.x, update.position.y);
                    }
                }
                Task::none()
            }
            Message::MascotPressed => {
                self.mood.note_activity(now);
                self.drag.press(self.cursor, self.render_pos);
                Task::none()
            }
            Message::MascotReleased | Message::PointerReleased => {
                let outcome = self.drag.release(
                    self.cursor,
                    self.viewport,
                    self.state.size,
                    self.state.snap_to_edge,
                    now,
                );
                match outcome {
                    ReleaseOutcome::Click => {
                        self.mood.note_activity(now);
                        if self.bubble.is_active() {
                            self.bubble.click(now);
                        } else {
                            let line = self.mood.greeting();
                            self.bubble.request(&line, BubbleSource::Manual, now);
                        }
                    }
                    ReleaseOutcome::Dropped {
                        position,
                        corner,
                        gliding,
                    } => {
                        let state = self.storage.set_with(|s| {
                            s.position = position;
                            if let Some(c) = corner {
                                s.corner = c;
                            }
                            s.is_dragging = false;
                        });
                        self.state = state;
                        if !gliding {
                            self.render_pos = position;
                        }
                        eprintln!(
                            "[pet-hud] dropped at ({:.0}, {:.0}){}",
                            position.x,
                            position.y,
                            corner.map(|c| format!(" ({c:?})")).unwrap_or_default()
                        );
                    }
                    ReleaseOutcome::None => {}
                }
                Task::none()
            }
            Message::BubblePressed => {
                self.mood.note_activity(now);
                self.bubble.click(now);
                Task::none()
            }
            Message::RestorePressed => {
                self.mood.note_activity(now);
                let state = self.storage.set_visibility(true);
                self.commit(state);
                eprintln!("[pet-hud] restored from tab");
                Task::none()
            }
            Message::ToggleVisibility => {
                let state = self.storage.toggle_visibility();
                if !state.visible {
                    self.drag.cancel();
                    self.bubble.dismiss(now);
                }
                eprintln!(
                    "[pet-hud] widget -> {}",
                    if state.visible { "shown" } else { "hidden" }
                );
                self.commit(state);
                Task::none()
            }
            Message::SetVisibility(visible) => {
                let state = self.storage.set_visibility(visible);
                if !state.visible {
                    self.drag.cancel();
                    self.bubble.dismiss(now);
                }
                self.commit(state);
                Task::none()
            }
            Message::ToggleFocus => match self.mode {
                SurfaceMode::Visible => {
                    let remove_task = if let Some(id) = self.surface_id.take() {
                        Task::done(Message::RemoveWindow(id))
                    } else {
                        Task::none()
                    };
                    let (id, open_task) = Message::layershell_open(focused_settings());
                    self.surface_id = Some(id);
                    self.mode = SurfaceMode::Focused;
                    eprintln!("[pet-hud] Visible -> Focused");
                    Task::batch([remove_task, open_task])
                }
                SurfaceMode::Focused => {
                    if self.drag.is_dragging() {
                        self.state = self.storage.set_dragging(false);
                    }
                    self.drag.cancel();
                    let remove_task = if let Some(id) = self.surface_id.take() {
                        Task::done(Message::RemoveWindow(id))
                    } else {
                        Task::none()
                    };
                    let (id, open_task) = Message::layershell_open(visible_settings());
                    self.surface_id = Some(id);
                    self.mode = SurfaceMode::Visible;
                    eprintln!("[pet-hud] Focused -> Visible");
                    Task::batch([remove_task, open_task])
                }
            },
            Message::ToggleSnapToEdge => {
                let state = self.storage.toggle_snap_to_edge();
                eprintln!("[pet-hud] snap-to-edge -> {}", state.snap_to_edge);
                if state.snap_to_edge {
                    // Tuck the resting widget in right away.
                    let (target, corner) =
                        snap_target(state.position, self.viewport, state.size);
                    let state = self.storage.set_with(|s| {
                        s.position = target;
                        if let Some(c) = corner {
                            s.corner = c;
                        }
                    });
                    self.drag.start_glide(self.render_pos, target, now);
                    self.state = state;
                } else {
                    self.commit(state);
                }
                Task::none()
            }
            Message::ToggleAnimations => {
                let state = self.storage.toggle_animations();
                eprintln!("[pet-hud] animations -> {}", state.enable_animations);
                self.commit(state);
                Task::none()
            }
            Message::ResetPosition => {
                let state = self.storage.reset_position(self.viewport);
                self.commit(state);
                Task::none()
            }
            Message::ResetAll => {
                let state = self.storage.reset_all();
                self.drag.cancel();
                self.bubble.dismiss(now);
                eprintln!("[pet-hud] reset to defaults");
                self.commit(state);
                Task::none()
            }
            Message::SetSize(size) => {
                let state = self.storage.update_size(size);
                eprintln!("[pet-hud] size -> {}", state.size);
                self.commit(state);
                Task::none()
            }
            Message::SetDecoration(animation) => {
                let state = self.storage.set_animation_state(animation);
                eprintln!("[pet-hud] decoration -> {animation:?}");
                self.commit(state);
                Task::none()
            }
            Message::SnapCorner(corner) => {
                let state = self.storage.snap_to_corner(corner, self.viewport);
                self.drag.start_glide(self.render_pos, state.position, now);
                eprintln!("[pet-hud] snapped to {corner:?}");
                self.state = state;
                Task::none()
            }
            Message::Say(ref text) => {
                if !self.bubble.request(text, BubbleSource::Manual, now) {
                    eprintln!("[pet-hud] say dropped, bubble busy");
                }
                Task::none()
            }
            Message::Info(idx) => {
                self.mood.note_activity(now);
                if let Some(line) = INFO_LINES.get(idx) {
                    self.bubble.request(line, BubbleSource::Manual, now);
                }
                Task::none()
            }
            Message::DismissBubble => {
                self.bubble.dismiss(now);
                Task::none()
            }
            Message::PageSignal(ref signal) => {
                let actions = self.mood.handle_signal(signal, now);
                for crate::mood::MoodAction::Say(line) in actions {
                    self.say_auto(&line, now);
                }
                Task::none()
            }
            Message::StorageChanged => {
                let new_state = self.storage.get();
                self.apply_external(new_state, now);
                Task::none()
            }
            Message::ViewportResized(w, h) => {
                if w < 1.0 || h < 1.0 {
                    return Task::none();
                }
                self.viewport = (w, h);
                let state = if self.state.snap_to_edge {
                    // Snapped widgets keep their corner across resizes.
                    self.storage
                        .snap_to_corner(self.state.corner, self.viewport)
                } else {
                    let clamped = WidgetState::clamp_position(
                        self.state.position,
                        self.viewport,
                        self.state.size,
                    );
                    if clamped == self.state.position {
                        self.state.clone()
                    } else {
                        self.storage.update_position(clamped.x, clamped.y)
                    }
                };
                self.commit(state);
                Task::none()
            }
            Message::Activity => {
                self.mood.note_activity(now);
                Task::none()
            }
            _ => Task::none(),
        }
    }

    fn view(&self, _window_id: IcedId) -> Element<'_, Message> {
        self.view_widget()
    }

    fn subscription(state: &Self) -> Subscription<Message> {
        let mut subs = vec![
            Subscription::run(ipc::socket_listener),
            Subscription::run_with(TICK_MS, ipc::tick_stream),
            Subscription::run(ipc::storage_change_stream),
            Subscription::run(ipc::watcher_stream),
            iced::event::listen_with(map_event),
        ];
        if state.mode == SurfaceMode::Focused {
            subs.push(iced::keyboard::listen().filter_map(|event| match event {
                iced::keyboard::Event::KeyPressed { key, modifiers, .. } => {
                    handle_key(key, modifiers)
                }
                _ => None,
            }));
        }
        Subscription::batch(subs)
    }

    fn style(&self, _theme: &iced::Theme) -> iced::theme::Style {
        iced::theme::Style {
            background_color: Color::TRANSPARENT,
            text_color: self.colors.bubble_text,
        }
    }
}
