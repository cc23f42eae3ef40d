use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::MascotFrame;
use crate::watcher::parser::PageSignal;

/// Inactivity window before the mascot dozes off.
pub const SLEEP_AFTER: Duration = Duration::from_secs(10);
/// How long a panic lasts unless re-triggered.
pub const PANIC_DURATION: Duration = Duration::from_secs(6);
/// How long a celebration lasts.
pub const CELEBRATE_DURATION: Duration = Duration::from_secs(3);
/// How long the thinking pose lasts unless the page signal clears earlier.
pub const THINKING_DURATION: Duration = Duration::from_secs(5);
/// Delay between waking up and the "welcome back" line.
pub const WAKE_MESSAGE_DELAY: Duration = Duration::from_millis(600);
/// Eyes stay closed this long per blink.
pub const BLINK_CLOSED: Duration = Duration::from_millis(200);

const BLINK_INTERVAL_SECS: std::ops::Range<f32> = 3.0..8.0;
const VOICE_INTERVAL_SECS: std::ops::Range<f32> = 15.0..45.0;

pub const WELCOME_BACK_LINE: &str = "Oh! Welcome back. I was just resting my eyes.";
pub const PANIC_LINE: &str = "New errors just came in! Want to take a look?";
pub const CELEBRATE_LINE: &str = "Issue resolved! Nice work.";
pub const THINKING_LINE: &str = "Hmm, let me study this one...";

const VOICE_LINES: &[&str] = &[
    "Zzz...",
    "*yawn*",
    "Mm... five more minutes...",
    "Still quiet out there...",
];

const GREETING_LINES: &[&str] = &[
    "Hi! Need anything?",
    "Hello again!",
    "I'm keeping an eye on things.",
    "All quiet on my end.",
];

/// The three fixed informational messages bound to keyboard shortcuts.
pub const INFO_LINES: [&str; 3] = [
    "pet-hud: a little mascot that watches your issue feed.",
    "Shortcuts: Ctrl+Shift+. toggles me, Ctrl+Shift+1/2/3 for these tips.",
    "Drag me anywhere, or drop me near a corner and I'll tuck myself in.",
];

/// Bubble line for a page section scrolling into view, if we have one.
pub fn section_line(name: &str) -> Option<&'static str> {
    match name {
        "breadcrumbs" => Some("Breadcrumbs! Follow the trail."),
        "stacktrace" | "stack-trace" => Some("Stack traces don't lie."),
        "tags" => Some("Tags tell you where it hurts."),
        _ => None,
    }
}

/// Exclusive high-level display state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Idle,
    Sleepy,
    Thinking,
    Celebrating,
    Panicked,
}

impl Mood {
    /// Pre-emption order when moods conflict, highest wins.
    pub fn priority(self) -> u8 {
        match self {
            Mood::Idle => 0,
            Mood::Sleepy => 1,
            Mood::Thinking => 2,
            Mood::Celebrating => 3,
            Mood::Panicked => 4,
        }
    }
}

/// Side effects the controller asks the app to perform. Bubbles are owned
/// elsewhere; the controller only requests them.
#[derive(Debug, Clone, PartialEq)]
pub enum MoodAction {
    /// Show an automatic bubble (subject to the shared auto cooldown).
    Say(String),
}

/// Owns the mood state machine: inactivity dozing, panic/celebrate/think
/// reactions to page signals, and the sleepy blink / voice-line schedulers.
///
/// All time flows in through the caller (`now`), so tests drive it with
/// plain `Instant` arithmetic.
pub struct MoodController {
    mood: Mood,
    entered_at: Instant,
    last_activity: Instant,
    revert_at: Option<Instant>,
    // Sleepy sub-animation state.
    eyes_closed: bool,
    next_blink_at: Option<Instant>,
    blink_open_at: Option<Instant>,
    next_voice_at: Option<Instant>,
    // One-shot "welcome back" scheduled on wake.
    wake_message_at: Option<Instant>,
    // Whether the watched page currently shows an issue detail view.
    on_issue_detail: bool,
    rng: StdRng,
}

impl MoodController {
    pub fn new(now: Instant) -> Self {
        Self::with_rng(StdRng::from_os_rng(), now)
    }

    pub fn with_rng(rng: StdRng, now: Instant) -> Self {
        Self {
            mood: Mood::Idle,
            entered_at: now,
            last_activity: now,
            revert_at: None,
            eyes_closed: false,
            next_blink_at: None,
            blink_open_at: None,
            next_voice_at: None,
            wake_message_at: None,
            on_issue_detail: false,
            rng,
        }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn entered_at(&self) -> Instant {
        self.entered_at
    }

    pub fn eyes_closed(&self) -> bool {
        self.eyes_closed
    }

    /// A random greeting for a manual click on the mascot.
    pub fn greeting(&mut self) -> String {
        let idx = self.rng.random_range(0..GREETING_LINES.len());
        GREETING_LINES[idx].to_string()
    }

    /// Record a user-activity event (pointer move/press, key, touch).
    /// Waking from sleepy schedules the one-shot welcome-back line.
    pub fn note_activity(&mut self, now: Instant) {
        self.last_activity = now;
        if self.mood == Mood::Sleepy {
            self.transition(Mood::Idle, now);
            self.wake_message_at = Some(now + WAKE_MESSAGE_DELAY);
        }
    }

    /// React to a signal from the page watcher.
    pub fn handle_signal(&mut self, signal: &PageSignal, now: Instant) -> Vec<MoodAction> {
        let mut actions = Vec::new();
        match signal {
            PageSignal::ErrorsIncreased { .. } => {
                // Panic always pre-empts; a re-trigger re-arms the revert.
                if self.mood != Mood::Panicked {
                    self.transition(Mood::Panicked, now);
                    actions.push(MoodAction::Say(PANIC_LINE.to_string()));
                } else {
                    self.revert_at = Some(now + PANIC_DURATION);
                }
            }
            PageSignal::ResolveClicked => {
                // Resolving explicitly clears a panic, so celebration is
                // allowed in from any mood.
                if self.mood != Mood::Celebrating {
                    self.transition(Mood::Celebrating, now);
                    actions.push(MoodAction::Say(CELEBRATE_LINE.to_string()));
                } else {
                    self.revert_at = Some(now + CELEBRATE_DURATION);
                }
            }
            PageSignal::EnteredIssueDetail => {
                self.on_issue_detail = true;
                // Thinking never pre-empts the higher-priority moods.
                if self.mood.priority() < Mood::Thinking.priority() {
                    self.transition(Mood::Thinking, now);
                    actions.push(MoodAction::Say(THINKING_LINE.to_string()));
                }
            }
            PageSignal::LeftIssueDetail => {
                self.on_issue_detail = false;
                if self.mood == Mood::Thinking {
                    self.transition(Mood::Idle, now);
                }
            }
            PageSignal::SectionShown(name) => {
                if let Some(line) = section_line(name) {
                    actions.push(MoodAction::Say(line.to_string()));
                }
            }
        }
        actions
    }

    /// Advance timers. Called from the app's tick stream.
    pub fn tick(&mut self, now: Instant, dragging: bool, bubble_active: bool) -> Vec<MoodAction> {
        let mut actions = Vec::new();

        // One-shot welcome-back, dropped if another mood got there first.
        if let Some(at) = self.wake_message_at {
            if now >= at {
                self.wake_message_at = None;
                if self.mood == Mood::Idle {
                    actions.push(MoodAction::Say(WELCOME_BACK_LINE.to_string()));
                }
            }
        }

        // Timed auto-revert for panicked / celebrating / thinking.
        if let Some(at) = self.revert_at {
            if now >= at {
                self.transition(Mood::Idle, now);
            }
        }

        // Doze off after sustained inactivity.
        if self.mood == Mood::Idle
            && !dragging
            && !bubble_active
            && now.duration_since(self.last_activity) >= SLEEP_AFTER
        {
            self.transition(Mood::Sleepy, now);
        }

        if self.mood == Mood::Sleepy {
            if let Some(at) = self.blink_open_at {
                if now >= at {
                    self.blink_open_at = None;
                    self.eyes_closed = false;
                }
            }
            if let Some(at) = self.next_blink_at {
                if now >= at {
                    self.eyes_closed = true;
                    self.blink_open_at = Some(now + BLINK_CLOSED);
                    self.next_blink_at = Some(now + self.random_interval(BLINK_INTERVAL_SECS));
                }
            }
            if let Some(at) = self.next_voice_at {
                if now >= at {
                    // Voice lines are not user activity and must not wake.
                    let idx = self.rng.random_range(0..VOICE_LINES.len());
                    actions.push(MoodAction::Say(VOICE_LINES[idx].to_string()));
                    self.next_voice_at = Some(now + self.random_interval(VOICE_INTERVAL_SECS));
                }
            }
        }

        actions
    }

    /// Which frame the mood layer wants, if it overrides the idle base.
    ///
    /// While speaking, mouth frames alternate on tick parity; the reactive
    /// moods suspend mouth frames entirely, and sleepy alternates its eye
    /// frames instead.
    pub fn frame(&self, speaking: bool, tick: usize) -> Option<MascotFrame> {
        match self.mood {
            Mood::Panicked => Some(MascotFrame::Panicked),
            Mood::Celebrating => Some(MascotFrame::Celebrating),
            Mood::Thinking => Some(MascotFrame::Thinking),
            Mood::Sleepy => {
                if speaking {
                    Some(if tick % 2 == 0 {
                        MascotFrame::SleepyEyesOpen
                    } else {
                        MascotFrame::SleepyEyesClosed
                    })
                } else if self.eyes_closed {
                    Some(MascotFrame::SleepyEyesClosed)
                } else {
                    Some(MascotFrame::SleepyEyesOpen)
                }
            }
            Mood::Idle => {
                if speaking {
                    Some(if tick % 2 == 0 {
                        MascotFrame::SpeakOpen
                    } else {
                        MascotFrame::SpeakClosed
                    })
                } else {
                    None
                }
            }
        }
    }

    fn random_interval(&mut self, range: std::ops::Range<f32>) -> Duration {
        Duration::from_secs_f32(self.rng.random_range(range))
    }

    /// Exit the current mood completely, then enter `target`. The exit hook
    /// runs to completion before any enter hook.
    fn transition(&mut self, target: Mood, now: Instant) {
        if self.mood == target {
            return;
        }
        let old = self.mood;

        // Exit hooks.
        match old {
            Mood::Sleepy => {
                self.next_blink_at = None;
                self.blink_open_at = None;
                self.next_voice_at = None;
                self.eyes_closed = false;
            }
            _ => {}
        }
        self.revert_at = None;

        // Enter hooks.
        self.mood = target;
        self.entered_at = now;
        match target {
            Mood::Sleepy => {
                self.next_blink_at = Some(now + self.random_interval(BLINK_INTERVAL_SECS));
                self.next_voice_at = Some(now + self.random_interval(VOICE_INTERVAL_SECS));
            }
            Mood::Panicked => self.revert_at = Some(now + PANIC_DURATION),
            Mood::Celebrating => self.revert_at = Some(now + CELEBRATE_DURATION),
            Mood::Thinking => self.revert_at = Some(now + THINKING_DURATION),
            Mood::Idle => {}
        }

        eprintln!("[pet-hud] mood {old:?} -> {target:?}");
    }
}
