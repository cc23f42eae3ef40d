use iced_layershell::reexport::{Anchor, KeyboardInteractivity, Layer, NewLayerShellSettings};

fn full_screen_anchor() -> Anchor {
    Anchor::Top | Anchor::Bottom | Anchor::Left | Anchor::Right
}

/// Display-only surface: the mascot is drawn but every pointer and key
/// event falls through to whatever is underneath.
pub(crate) fn visible_settings() -> NewLayerShellSettings {
    NewLayerShellSettings {
        layer: Layer::Overlay,
        anchor: full_screen_anchor(),
        keyboard_interactivity: KeyboardInteractivity::None,
        exclusive_zone: Some(-1),
        size: Some((0, 0)),
        events_transparent: true,
        ..Default::default()
    }
}

/// Interactive surface: dragging, clicking and keyboard shortcuts work,
/// at the cost of capturing input over the whole screen.
pub(crate) fn focused_settings() -> NewLayerShellSettings {
    NewLayerShellSettings {
        layer: Layer::Overlay,
        anchor: full_screen_anchor(),
        keyboard_interactivity: KeyboardInteractivity::OnDemand,
        exclusive_zone: Some(-1),
        size: Some((0, 0)),
        events_transparent: false,
        ..Default::default()
    }
}
