use iced::widget::{container, image as iced_image, mouse_area, space, stack, svg, text};
use iced::{Element, Length, Padding};

use crate::app::{Mascot, Message, SurfaceMode};
use crate::assets::{MascotFrame, MascotImage};
use crate::bubble::{self, BUBBLE_WIDTH};
use crate::state::{AnimationState, WidgetState};

// Idle decoration cadences, in 80ms ticks.
const BLINK_PERIOD_TICKS: usize = 45;
const BLINK_FLASH_TICKS: usize = 3;
const SIP_PERIOD_TICKS: usize = 24;
const BOUNCE_AMPLITUDE: f32 = 4.0;

const RESTORE_TAB_WIDTH: f32 = 56.0;
const RESTORE_TAB_HEIGHT: f32 = 22.0;

impl Mascot {
    pub(crate) fn view_widget(&self) -> Element<'_, Message> {
        // Kill switches render nothing at all, not even the restore tab.
        if !self.state.enabled || !self.state.domain_enabled {
            return space::horizontal().into();
        }
        if !self.state.visible {
            return self.restore_tab_layer();
        }

        let mut layers: Vec<Element<'_, Message>> = vec![self.mascot_layer()];
        if self.bubble.is_active() {
            layers.push(self.bubble_layer());
        }
        stack(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Which pose to draw this frame. Grabbing wins while the pointer has
    /// hold of the mascot; then the mood layer; then the idle decoration.
    fn current_frame(&self) -> MascotFrame {
        if self.drag.is_dragging() {
            return MascotFrame::Grabbing;
        }
        if let Some(frame) = self.mood.frame(self.bubble.is_typing(), self.tick) {
            return frame;
        }
        if !self.state.enable_animations {
            return MascotFrame::Idle;
        }
        match self.state.animation_state {
            AnimationState::Blink => {
                if self.tick % BLINK_PERIOD_TICKS < BLINK_FLASH_TICKS {
                    MascotFrame::Blink
                } else {
                    MascotFrame::Idle
                }
            }
            AnimationState::Sip => {
                if (self.tick / SIP_PERIOD_TICKS) % 2 == 0 {
                    MascotFrame::Idle
                } else {
                    MascotFrame::Sip
                }
            }
            AnimationState::Idle | AnimationState::Bounce => MascotFrame::Idle,
        }
    }

    /// Vertical offset for the bounce decoration.
    fn bounce_offset(&self) -> f32 {
        let decorating = self.state.enable_animations
            && self.state.animation_state == AnimationState::Bounce
            && !self.drag.is_dragging()
            && self.mood.frame(false, self.tick).is_none();
        if decorating {
            (self.tick as f32 * 0.25).sin() * BOUNCE_AMPLITUDE
        } else {
            0.0
        }
    }

    fn mascot_image(&self) -> Element<'_, Message> {
        let size = self.state.size;
        match self.assets.image_for(self.current_frame()) {
            MascotImage::Svg(handle) => svg(handle).width(size).height(size).into(),
            MascotImage::Raster(handle) => iced_image(handle).width(size).height(size).into(),
        }
    }

    fn mascot_layer(&self) -> Element<'_, Message> {
        let dy = self.bounce_offset();
        let pos = WidgetState::clamp_position(
            crate::state::Position {
                x: self.render_pos.x,
                y: self.render_pos.y + dy,
            },
            self.viewport,
            self.state.size,
        );

        let body: Element<'_, Message> = if self.mode == SurfaceMode::Focused {
            mouse_area(self.mascot_image())
                .on_press(Message::MascotPressed)
                .on_release(Message::MascotReleased)
                .into()
        } else {
            self.mascot_image()
        };

        container(body)
            .padding(Padding {
                top: pos.y,
                left: pos.x,
                right: 0.0,
                bottom: 0.0,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn bubble_layer(&self) -> Element<'_, Message> {
        let now = std::time::Instant::now();
        let alpha = self.bubble.fade_alpha(now);
        let (_, pos) = bubble::placement(self.render_pos, self.state.size, self.viewport);

        let mut fg = self.colors.bubble_text;
        fg.a *= alpha;

        let content = text(self.bubble.visible_text())
            .size(self.colors.bubble_text_size)
            .color(fg);

        let boxed = container(content)
            .padding(10)
            .max_width(BUBBLE_WIDTH)
            .style(self.colors.bubble_style(alpha));

        let body: Element<'_, Message> = if self.mode == SurfaceMode::Focused {
            mouse_area(boxed).on_press(Message::BubblePressed).into()
        } else {
            boxed.into()
        };

        container(body)
            .padding(Padding {
                top: pos.y,
                left: pos.x,
                right: 0.0,
                bottom: 0.0,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Small handle shown while the mascot is hidden, sitting at the bottom
    /// edge under its last position.
    fn restore_tab_layer(&self) -> Element<'_, Message> {
        let (vw, vh) = self.viewport;
        let x = (self.state.position.x + self.state.size / 2.0 - RESTORE_TAB_WIDTH / 2.0)
            .clamp(0.0, (vw - RESTORE_TAB_WIDTH).max(0.0));
        let y = vh - RESTORE_TAB_HEIGHT;

        let label = text("pet ^")
            .size(self.colors.tab_text_size)
            .color(self.colors.tab_text);
        let tab = container(label)
            .padding(4)
            .width(RESTORE_TAB_WIDTH)
            .align_x(iced::alignment::Horizontal::Center)
            .style(self.colors.tab_style());

        let body: Element<'_, Message> = if self.mode == SurfaceMode::Focused {
            mouse_area(tab).on_press(Message::RestorePressed).into()
        } else {
            tab.into()
        };

        container(body)
            .padding(Padding {
                top: y,
                left: x,
                right: 0.0,
                bottom: 0.0,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}
