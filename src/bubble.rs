use std::time::{Duration, Instant};

use crate::state::Position;
use crate::util::truncate_str;

/// Base reveal rate while typing.
pub const TYPE_INTERVAL: Duration = Duration::from_millis(40);
/// Extra pause after sentence-ending punctuation.
pub const SENTENCE_PAUSE: Duration = Duration::from_millis(320);
/// Extra pause after clause punctuation.
pub const CLAUSE_PAUSE: Duration = Duration::from_millis(160);
/// Pop-in duration before typing starts.
pub const APPEAR_DURATION: Duration = Duration::from_millis(150);
/// Fade-out duration when dismissing.
pub const DISMISS_FADE: Duration = Duration::from_millis(200);
/// How long a completed bubble lingers before auto-dismissing.
pub const COMPLETE_HOLD: Duration = Duration::from_secs(5);
/// Shared cooldown between any two automatic bubbles.
pub const AUTO_COOLDOWN: Duration = Duration::from_secs(10);

/// Longest message we will display; `say` input is truncated to this.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Bubble footprint used for placement, pixels.
pub const BUBBLE_WIDTH: f32 = 220.0;
pub const BUBBLE_HEIGHT: f32 = 84.0;
/// Gap between the mascot and the bubble.
pub const BUBBLE_MARGIN: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleSource {
    /// Mood transitions, section visibility, sleepy voice lines. Rate
    /// limited by the shared cooldown.
    Auto,
    /// Clicking the mascot, `say` commands, info shortcuts. Bypasses the
    /// cooldown but still one-at-a-time.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubblePhase {
    Idle,
    Appearing { until: Instant },
    Typing { next_char_at: Instant },
    Complete { dismiss_at: Instant },
    Dismissing { until: Instant },
}

/// Which side of the mascot the bubble sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleAnchor {
    Above,
    Right,
    Left,
    Below,
    /// Nothing fits; park in the default corner of the viewport.
    Fallback,
}

/// Typewriter bubble. Strictly sequential phases, one bubble at a time,
/// no queue: a request while a bubble is active is dropped.
pub struct BubbleController {
    phase: BubblePhase,
    text: Vec<char>,
    shown: usize,
    last_auto: Option<Instant>,
}

impl BubbleController {
    pub fn new() -> Self {
        Self {
            phase: BubblePhase::Idle,
            text: Vec::new(),
            shown: 0,
            last_auto: None,
        }
    }

    pub fn phase(&self) -> BubblePhase {
        self.phase
    }

    /// True from request until the dismiss fade finishes.
    pub fn is_active(&self) -> bool {
        self.phase != BubblePhase::Idle
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.phase, BubblePhase::Typing { .. })
    }

    /// The currently revealed prefix of the message.
    pub fn visible_text(&self) -> String {
        self.text[..self.shown].iter().collect()
    }

    /// Opacity for the current phase: ramps in while appearing, out while
    /// dismissing, solid otherwise (1.0 when idle; the view doesn't draw).
    pub fn fade_alpha(&self, now: Instant) -> f32 {
        match self.phase {
            BubblePhase::Appearing { until } => {
                1.0 - remaining_fraction(now, until, APPEAR_DURATION)
            }
            BubblePhase::Dismissing { until } => remaining_fraction(now, until, DISMISS_FADE),
            _ => 1.0,
        }
    }

    /// Try to show a message. Returns false when dropped (already active,
    /// or an automatic request inside the cooldown window).
    pub fn request(&mut self, text: &str, source: BubbleSource, now: Instant) -> bool {
        if self.is_active() {
            return false;
        }
        if source == BubbleSource::Auto {
            if let Some(last) = self.last_auto {
                if now.duration_since(last) < AUTO_COOLDOWN {
                    return false;
                }
            }
            self.last_auto = Some(now);
        }
        self.text = truncate_str(text, MAX_MESSAGE_CHARS).chars().collect();
        self.shown = 0;
        self.phase = BubblePhase::Appearing {
            until: now + APPEAR_DURATION,
        };
        true
    }

    /// A click on the bubble or mascot while a bubble is up: skip typing,
    /// or close a completed bubble early.
    pub fn click(&mut self, now: Instant) {
        match self.phase {
            BubblePhase::Appearing { .. } | BubblePhase::Typing { .. } => {
                self.shown = self.text.len();
                self.phase = BubblePhase::Complete {
                    dismiss_at: now + COMPLETE_HOLD,
                };
            }
            BubblePhase::Complete { .. } => self.dismiss(now),
            _ => {}
        }
    }

    /// Begin the fade-out, if anything is showing.
    pub fn dismiss(&mut self, now: Instant) {
        if matches!(self.phase, BubblePhase::Idle | BubblePhase::Dismissing { .. }) {
            return;
        }
        self.phase = BubblePhase::Dismissing {
            until: now + DISMISS_FADE,
        };
    }

    /// Advance the phase machine. Called from the app tick stream.
    pub fn tick(&mut self, now: Instant) {
        match self.phase {
            BubblePhase::Idle => {}
            BubblePhase::Appearing { until } => {
                if now >= until {
                    if self.text.is_empty() {
                        self.phase = BubblePhase::Complete {
                            dismiss_at: now + COMPLETE_HOLD,
                        };
                    } else {
                        self.phase = BubblePhase::Typing {
                            next_char_at: now + TYPE_INTERVAL,
                        };
                    }
                }
            }
            BubblePhase::Typing { mut next_char_at } => {
                while now >= next_char_at && self.shown < self.text.len() {
                    self.shown += 1;
                    let revealed = self.text[self.shown - 1];
                    next_char_at += TYPE_INTERVAL + punctuation_pause(revealed);
                }
                if self.shown == self.text.len() {
                    self.phase = BubblePhase::Complete {
                        dismiss_at: now + COMPLETE_HOLD,
                    };
                } else {
                    self.phase = BubblePhase::Typing { next_char_at };
                }
            }
            BubblePhase::Complete { dismiss_at } => {
                if now >= dismiss_at {
                    self.dismiss(now);
                }
            }
            BubblePhase::Dismissing { until } => {
                if now >= until {
                    self.phase = BubblePhase::Idle;
                    self.text.clear();
                    self.shown = 0;
                }
            }
        }
    }
}

fn remaining_fraction(now: Instant, until: Instant, total: Duration) -> f32 {
    if now >= until {
        return 0.0;
    }
    let remaining = until.duration_since(now);
    (remaining.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

/// Extra delay the typewriter inserts after revealing `c`.
pub fn punctuation_pause(c: char) -> Duration {
    match c {
        '.' | '!' | '?' => SENTENCE_PAUSE,
        ',' | ';' | ':' => CLAUSE_PAUSE,
        _ => Duration::ZERO,
    }
}

/// Pick a side for the bubble: check available space against the bubble
/// footprint plus margin in a fixed preference order (above, right, left,
/// below), falling back to the viewport's top-left corner.
///
/// Returns the chosen anchor and the bubble's top-left position.
pub fn placement(
    widget_pos: Position,
    widget_size: f32,
    viewport: (f32, f32),
) -> (BubbleAnchor, Position) {
    let (vw, vh) = viewport;
    let need_w = BUBBLE_WIDTH + BUBBLE_MARGIN;
    let need_h = BUBBLE_HEIGHT + BUBBLE_MARGIN;

    // Horizontal center when stacked above/below, clamped on-screen.
    let centered_x =
        (widget_pos.x + widget_size / 2.0 - BUBBLE_WIDTH / 2.0).clamp(0.0, (vw - BUBBLE_WIDTH).max(0.0));
    // Vertical center when beside, clamped on-screen.
    let centered_y = (widget_pos.y + widget_size / 2.0 - BUBBLE_HEIGHT / 2.0)
        .clamp(0.0, (vh - BUBBLE_HEIGHT).max(0.0));

    if widget_pos.y >= need_h {
        return (
            BubbleAnchor::Above,
            Position {
                x: centered_x,
                y: widget_pos.y - need_h,
            },
        );
    }
    if vw - (widget_pos.x + widget_size) >= need_w {
        return (
            BubbleAnchor::Right,
            Position {
                x: widget_pos.x + widget_size + BUBBLE_MARGIN,
                y: centered_y,
            },
        );
    }
    if widget_pos.x >= need_w {
        return (
            BubbleAnchor::Left,
            Position {
                x: widget_pos.x - need_w,
                y: centered_y,
            },
        );
    }
    if vh - (widget_pos.y + widget_size) >= need_h {
        return (
            BubbleAnchor::Below,
            Position {
                x: centered_x,
                y: widget_pos.y + widget_size + BUBBLE_MARGIN,
            },
        );
    }
    (
        BubbleAnchor::Fallback,
        Position {
            x: crate::state::CORNER_PADDING,
            y: crate::state::CORNER_PADDING,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Drive a fresh bubble through appearing into typing and return the
    // instant typing began.
    fn start(bubble: &mut BubbleController, text: &str, source: BubbleSource, t0: Instant) -> Instant {
        assert!(bubble.request(text, source, t0));
        let typing_at = t0 + APPEAR_DURATION;
        bubble.tick(typing_at);
        assert!(bubble.is_typing());
        typing_at
    }

    #[test]
    fn hi_completes_after_three_intervals_then_dismisses() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        let typing = start(&mut bubble, "Hi!", BubbleSource::Manual, t0);

        bubble.tick(typing + Duration::from_millis(80));
        assert_eq!(bubble.visible_text(), "Hi");

        // All 3 characters revealed ~120ms after typing began.
        let done = typing + Duration::from_millis(120);
        bubble.tick(done);
        assert_eq!(bubble.visible_text(), "Hi!");
        assert!(matches!(bubble.phase(), BubblePhase::Complete { .. }));

        // Auto-dismiss after the fixed hold, then fade to idle.
        bubble.tick(done + COMPLETE_HOLD);
        assert!(matches!(bubble.phase(), BubblePhase::Dismissing { .. }));
        bubble.tick(done + COMPLETE_HOLD + DISMISS_FADE);
        assert_eq!(bubble.phase(), BubblePhase::Idle);
        assert_eq!(bubble.visible_text(), "");
    }

    #[test]
    fn sentence_punctuation_pauses_typing() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        let typing = start(&mut bubble, "a.b", BubbleSource::Manual, t0);

        // 'a' at +40ms, '.' at +80ms; 'b' only after the sentence pause.
        bubble.tick(typing + Duration::from_millis(80));
        assert_eq!(bubble.visible_text(), "a.");
        bubble.tick(typing + Duration::from_millis(80) + TYPE_INTERVAL);
        assert_eq!(bubble.visible_text(), "a.");
        bubble.tick(typing + Duration::from_millis(80) + TYPE_INTERVAL + SENTENCE_PAUSE);
        assert_eq!(bubble.visible_text(), "a.b");
    }

    #[test]
    fn clause_pause_is_shorter_than_sentence_pause() {
        assert!(punctuation_pause(',') < punctuation_pause('.'));
        assert!(punctuation_pause(',') > Duration::ZERO);
        assert_eq!(punctuation_pause('x'), Duration::ZERO);
    }

    #[test]
    fn click_skips_to_complete() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        let typing = start(&mut bubble, "a long message here", BubbleSource::Manual, t0);

        let mid = typing + Duration::from_millis(80);
        bubble.tick(mid);
        assert!(bubble.visible_text().len() < 19);

        bubble.click(mid);
        assert_eq!(bubble.visible_text(), "a long message here");
        assert!(matches!(bubble.phase(), BubblePhase::Complete { .. }));
    }

    #[test]
    fn click_on_complete_closes_early() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        let typing = start(&mut bubble, "Hi", BubbleSource::Manual, t0);
        bubble.tick(typing + Duration::from_millis(80));
        assert!(matches!(bubble.phase(), BubblePhase::Complete { .. }));

        bubble.click(typing + Duration::from_millis(100));
        assert!(matches!(bubble.phase(), BubblePhase::Dismissing { .. }));
    }

    #[test]
    fn one_bubble_at_a_time() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        assert!(bubble.request("first", BubbleSource::Manual, t0));
        // Dropped, not queued.
        assert!(!bubble.request("second", BubbleSource::Manual, t0 + Duration::from_millis(10)));
        bubble.tick(t0 + APPEAR_DURATION);
        assert!(bubble.is_typing());
    }

    #[test]
    fn auto_cooldown_drops_second_trigger() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        assert!(bubble.request("first", BubbleSource::Auto, t0));

        // Run the first bubble fully out.
        let typing = t0 + APPEAR_DURATION;
        bubble.tick(typing);
        bubble.click(typing);
        bubble.dismiss(typing);
        bubble.tick(typing + DISMISS_FADE);
        assert_eq!(bubble.phase(), BubblePhase::Idle);

        // Second automatic trigger 2s later, inside the 10s window.
        assert!(!bubble.request("second", BubbleSource::Auto, t0 + Duration::from_secs(2)));
        // Manual bypasses the cooldown.
        assert!(bubble.request("manual", BubbleSource::Manual, t0 + Duration::from_secs(2)));
    }

    #[test]
    fn auto_allowed_after_cooldown() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        assert!(bubble.request("first", BubbleSource::Auto, t0));
        bubble.click(t0);
        bubble.dismiss(t0);
        bubble.tick(t0 + DISMISS_FADE);
        assert!(bubble.request("second", BubbleSource::Auto, t0 + AUTO_COOLDOWN));
    }

    #[test]
    fn long_messages_truncated() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        let long = "x".repeat(500);
        assert!(bubble.request(&long, BubbleSource::Manual, t0));
        bubble.click(t0);
        assert_eq!(bubble.visible_text().chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn fade_alpha_ramps() {
        let t0 = Instant::now();
        let mut bubble = BubbleController::new();
        bubble.request("Hi", BubbleSource::Manual, t0);
        assert!(bubble.fade_alpha(t0) < 0.1);
        assert_eq!(bubble.fade_alpha(t0 + APPEAR_DURATION), 1.0);

        bubble.tick(t0 + APPEAR_DURATION);
        bubble.click(t0 + APPEAR_DURATION);
        bubble.dismiss(t0 + APPEAR_DURATION);
        let mid = t0 + APPEAR_DURATION + DISMISS_FADE / 2;
        let alpha = bubble.fade_alpha(mid);
        assert!(alpha > 0.0 && alpha < 1.0);
    }

    // --- placement ---

    #[test]
    fn placement_prefers_above() {
        let (anchor, pos) = placement(
            Position { x: 500.0, y: 400.0 },
            80.0,
            (1200.0, 800.0),
        );
        assert_eq!(anchor, BubbleAnchor::Above);
        assert!(pos.y < 400.0);
    }

    #[test]
    fn placement_falls_to_right_near_top() {
        let (anchor, pos) = placement(Position { x: 100.0, y: 10.0 }, 80.0, (1200.0, 800.0));
        assert_eq!(anchor, BubbleAnchor::Right);
        assert_eq!(pos.x, 100.0 + 80.0 + BUBBLE_MARGIN);
    }

    #[test]
    fn placement_left_in_top_right_corner() {
        let (anchor, pos) = placement(Position { x: 1110.0, y: 10.0 }, 80.0, (1200.0, 800.0));
        assert_eq!(anchor, BubbleAnchor::Left);
        assert!(pos.x < 1110.0);
    }

    #[test]
    fn placement_below_when_top_row_is_tight() {
        // Narrow viewport: neither above nor beside fits.
        let (anchor, _pos) = placement(Position { x: 10.0, y: 10.0 }, 80.0, (300.0, 800.0));
        assert_eq!(anchor, BubbleAnchor::Below);
    }

    #[test]
    fn placement_fallback_when_nothing_fits() {
        let (anchor, pos) = placement(Position { x: 10.0, y: 10.0 }, 80.0, (300.0, 150.0));
        assert_eq!(anchor, BubbleAnchor::Fallback);
        assert_eq!(pos.x, crate::state::CORNER_PADDING);
    }

    #[test]
    fn placement_stays_on_screen() {
        // Mascot hugging the left edge: the centered bubble is clamped.
        let (_, pos) = placement(Position { x: 0.0, y: 400.0 }, 80.0, (1200.0, 800.0));
        assert!(pos.x >= 0.0);
    }
}
