use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use iced::widget::{image as iced_image, svg};

/// How long startup waits for the override scan before proceeding with
/// built-in art only.
pub const OVERRIDE_LOAD_TIMEOUT: Duration = Duration::from_millis(1500);

/// Every distinct pose the mascot can display. One image per frame;
/// animation is the app swapping frames over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MascotFrame {
    Idle,
    Blink,
    SleepyEyesOpen,
    SleepyEyesClosed,
    Panicked,
    Celebrating,
    Thinking,
    Grabbing,
    SpeakOpen,
    SpeakClosed,
    Sip,
}

impl MascotFrame {
    pub const ALL: [MascotFrame; 11] = [
        MascotFrame::Idle,
        MascotFrame::Blink,
        MascotFrame::SleepyEyesOpen,
        MascotFrame::SleepyEyesClosed,
        MascotFrame::Panicked,
        MascotFrame::Celebrating,
        MascotFrame::Thinking,
        MascotFrame::Grabbing,
        MascotFrame::SpeakOpen,
        MascotFrame::SpeakClosed,
        MascotFrame::Sip,
    ];

    /// File stem a user override must carry under the assets directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            MascotFrame::Idle => "idle",
            MascotFrame::Blink => "blink",
            MascotFrame::SleepyEyesOpen => "sleepy-eyes-open",
            MascotFrame::SleepyEyesClosed => "sleepy-eyes-closed",
            MascotFrame::Panicked => "panicked",
            MascotFrame::Celebrating => "celebrating",
            MascotFrame::Thinking => "thinking",
            MascotFrame::Grabbing => "grabbing",
            MascotFrame::SpeakOpen => "speak-open",
            MascotFrame::SpeakClosed => "speak-closed",
            MascotFrame::Sip => "sip",
        }
    }
}

/// Renderable image for one frame: built-in vector art, or a user-supplied
/// raster override.
#[derive(Debug, Clone)]
pub enum MascotImage {
    Svg(svg::Handle),
    Raster(iced_image::Handle),
}

/// The full frame set the views draw from. Built-ins always exist, so
/// lookups never fail.
pub struct AssetSet {
    builtin: HashMap<MascotFrame, svg::Handle>,
    overrides: HashMap<MascotFrame, iced_image::Handle>,
}

impl AssetSet {
    /// Built-in art only.
    pub fn builtin() -> Self {
        let builtin = MascotFrame::ALL
            .iter()
            .map(|&f| (f, svg::Handle::from_memory(frame_svg(f).into_bytes())))
            .collect();
        Self {
            builtin,
            overrides: HashMap::new(),
        }
    }

    /// Built-in art plus user overrides from the standard assets directory
    /// (`~/.config/pet-hud/assets/<stem>.png`). The scan runs on a worker
    /// thread; if it hasn't finished within the timeout we start without
    /// overrides rather than delay the surface.
    pub fn load() -> Self {
        let mut set = Self::builtin();
        let dir = override_dir();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(load_overrides(&dir));
        });
        match rx.recv_timeout(OVERRIDE_LOAD_TIMEOUT) {
            Ok(overrides) => {
                if !overrides.is_empty() {
                    eprintln!("[pet-hud] loaded {} asset overrides", overrides.len());
                }
                set.overrides = overrides.into_iter().collect();
            }
            Err(_) => {
                eprintln!("[pet-hud] asset override scan timed out, using built-in art");
            }
        }
        set
    }

    pub fn image_for(&self, frame: MascotFrame) -> MascotImage {
        if let Some(handle) = self.overrides.get(&frame) {
            return MascotImage::Raster(handle.clone());
        }
        match self.builtin.get(&frame) {
            Some(handle) => MascotImage::Svg(handle.clone()),
            // The built-in map is total by construction; render a plain
            // placeholder rather than panic if that ever changes.
            None => MascotImage::Svg(svg::Handle::from_memory(placeholder_svg().into_bytes())),
        }
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

fn override_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".config/pet-hud/assets")
}

/// Scan the override directory for `<stem>.png` files and decode them.
/// Files that fail to decode are logged and skipped, leaving the built-in
/// frame in place.
pub fn load_overrides(dir: &Path) -> Vec<(MascotFrame, iced_image::Handle)> {
    let mut found = Vec::new();
    for frame in MascotFrame::ALL {
        let path = dir.join(format!("{}.png", frame.file_stem()));
        if !path.exists() {
            continue;
        }
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("[pet-hud] cannot read {path:?}: {e}");
                continue;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (w, h) = (rgba.width(), rgba.height());
                found.push((frame, iced_image::Handle::from_rgba(w, h, rgba.into_raw())));
            }
            Err(e) => {
                eprintln!("[pet-hud] cannot decode {path:?}, keeping built-in: {e}");
            }
        }
    }
    found
}

fn placeholder_svg() -> String {
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="128" height="128" viewBox="0 0 128 128">
  <rect x="24" y="24" width="80" height="80" rx="12" fill="none" stroke="#8c7ae6" stroke-width="4"/>
  <text x="64" y="76" font-size="40" text-anchor="middle" fill="#8c7ae6">?</text>
</svg>"##
        .to_string()
}

/// Built-in vector art: a round creature whose eyes, mouth and props vary
/// per frame. Deliberately simple shapes so overrides are the path to
/// fancier art.
pub fn frame_svg(frame: MascotFrame) -> String {
    let body = r##"<circle cx="64" cy="68" r="46" fill="#8c7ae6" stroke="#5f4bb6" stroke-width="4"/>
  <circle cx="44" cy="36" r="10" fill="#8c7ae6" stroke="#5f4bb6" stroke-width="4"/>
  <circle cx="84" cy="36" r="10" fill="#8c7ae6" stroke="#5f4bb6" stroke-width="4"/>"##;

    let eyes_open = r##"<circle cx="48" cy="62" r="6" fill="#2f2f3a"/>
  <circle cx="80" cy="62" r="6" fill="#2f2f3a"/>"##;
    let eyes_closed = r##"<path d="M42 62 q6 5 12 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>
  <path d="M74 62 q6 5 12 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>"##;

    let (eyes, mouth, extra) = match frame {
        MascotFrame::Idle => (
            eyes_open,
            r##"<path d="M56 84 q8 6 16 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>"##,
            String::new(),
        ),
        MascotFrame::Blink => (
            eyes_closed,
            r##"<path d="M56 84 q8 6 16 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>"##,
            String::new(),
        ),
        MascotFrame::SleepyEyesOpen => (
            r##"<path d="M42 62 h12" stroke="#2f2f3a" stroke-width="3"/>
  <path d="M74 62 h12" stroke="#2f2f3a" stroke-width="3"/>"##,
            r##"<circle cx="64" cy="86" r="4" fill="#2f2f3a"/>"##,
            r##"<text x="96" y="34" font-size="18" fill="#5f4bb6">z</text>"##.to_string(),
        ),
        MascotFrame::SleepyEyesClosed => (
            eyes_closed,
            r##"<circle cx="64" cy="86" r="4" fill="#2f2f3a"/>"##,
            r##"<text x="96" y="34" font-size="18" fill="#5f4bb6">z</text>
  <text x="106" y="22" font-size="13" fill="#5f4bb6">z</text>"##
                .to_string(),
        ),
        MascotFrame::Panicked => (
            r##"<circle cx="48" cy="62" r="8" fill="#ffffff" stroke="#2f2f3a" stroke-width="2"/>
  <circle cx="80" cy="62" r="8" fill="#ffffff" stroke="#2f2f3a" stroke-width="2"/>
  <circle cx="48" cy="62" r="3" fill="#2f2f3a"/>
  <circle cx="80" cy="62" r="3" fill="#2f2f3a"/>"##,
            r##"<ellipse cx="64" cy="86" rx="7" ry="9" fill="#2f2f3a"/>"##,
            r##"<path d="M20 30 l8 14 M28 26 l2 16" stroke="#e84118" stroke-width="3"/>"##
                .to_string(),
        ),
        MascotFrame::Celebrating => (
            r##"<path d="M42 64 q6 -8 12 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>
  <path d="M74 64 q6 -8 12 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>"##,
            r##"<path d="M52 82 q12 12 24 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>"##,
            r##"<path d="M16 24 l6 6 M112 24 l-6 6 M24 12 l2 8 M104 12 l-2 8" stroke="#fbc531" stroke-width="3"/>"##
                .to_string(),
        ),
        MascotFrame::Thinking => (
            r##"<circle cx="48" cy="60" r="5" fill="#2f2f3a"/>
  <circle cx="80" cy="60" r="5" fill="#2f2f3a"/>"##,
            r##"<path d="M58 86 h12" stroke="#2f2f3a" stroke-width="3"/>"##,
            r##"<circle cx="100" cy="30" r="4" fill="#5f4bb6"/>
  <circle cx="108" cy="20" r="6" fill="#5f4bb6"/>"##
                .to_string(),
        ),
        MascotFrame::Grabbing => (
            r##"<path d="M42 60 q6 6 12 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>
  <path d="M74 60 q6 6 12 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>"##,
            r##"<ellipse cx="64" cy="86" rx="5" ry="6" fill="#2f2f3a"/>"##,
            String::new(),
        ),
        MascotFrame::SpeakOpen => (
            eyes_open,
            r##"<ellipse cx="64" cy="86" rx="6" ry="8" fill="#2f2f3a"/>"##,
            String::new(),
        ),
        MascotFrame::SpeakClosed => (
            eyes_open,
            r##"<path d="M56 86 h16" stroke="#2f2f3a" stroke-width="3"/>"##,
            String::new(),
        ),
        MascotFrame::Sip => (
            eyes_closed,
            r##"<path d="M58 84 q6 4 12 0" stroke="#2f2f3a" stroke-width="3" fill="none"/>"##,
            r##"<rect x="92" y="74" width="14" height="18" rx="2" fill="#ffffff" stroke="#5f4bb6" stroke-width="3"/>
  <path d="M106 78 q8 4 0 10" stroke="#5f4bb6" stroke-width="3" fill="none"/>"##
                .to_string(),
        ),
    };

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="128" height="128" viewBox="0 0 128 128">
  {body}
  {eyes}
  {mouth}
  {extra}
</svg>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_frame_has_svg() {
        for frame in MascotFrame::ALL {
            let svg = frame_svg(frame);
            assert!(svg.starts_with("<svg"));
            assert!(svg.ends_with("</svg>"));
        }
    }

    #[test]
    fn frames_are_visually_distinct() {
        let mut seen = std::collections::HashSet::new();
        for frame in MascotFrame::ALL {
            assert!(seen.insert(frame_svg(frame)), "{frame:?} duplicates another frame");
        }
    }

    #[test]
    fn file_stems_unique() {
        let mut seen = std::collections::HashSet::new();
        for frame in MascotFrame::ALL {
            assert!(seen.insert(frame.file_stem()));
        }
    }

    #[test]
    fn builtin_set_covers_all_frames() {
        let set = AssetSet::builtin();
        for frame in MascotFrame::ALL {
            match set.image_for(frame) {
                MascotImage::Svg(_) => {}
                MascotImage::Raster(_) => panic!("unexpected override"),
            }
        }
        assert_eq!(set.override_count(), 0);
    }

    #[test]
    fn load_overrides_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_overrides(dir.path()).is_empty());
    }

    #[test]
    fn load_overrides_picks_up_png() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        img.save(dir.path().join("idle.png")).unwrap();
        let found = load_overrides(dir.path());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, MascotFrame::Idle);
    }

    #[test]
    fn load_overrides_skips_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blink.png"), b"not a png").unwrap();
        assert!(load_overrides(dir.path()).is_empty());
    }
}
