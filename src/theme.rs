use iced::{Background, Color};

/// How the palette is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
    /// Follow the desktop environment / system theme.
    Auto,
}

/// All colors and font sizes used by the mascot views.
pub struct ThemeColors {
    pub is_dark: bool,
    pub bubble_text: Color,
    pub bubble_bg: Color,
    pub bubble_border: Color,
    pub tab_text: Color,
    pub tab_bg: Color,
    pub bubble_text_size: f32,
    pub tab_text_size: f32,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            is_dark: true,
            bubble_text: Color {
                r: 0.95,
                g: 0.95,
                b: 0.97,
                a: 1.0,
            },
            bubble_bg: Color {
                r: 0.08,
                g: 0.08,
                b: 0.12,
                a: 0.92,
            },
            bubble_border: Color {
                r: 0.55,
                g: 0.48,
                b: 0.90,
                a: 1.0,
            },
            tab_text: Color {
                r: 0.95,
                g: 0.95,
                b: 0.97,
                a: 0.9,
            },
            tab_bg: Color {
                r: 0.15,
                g: 0.15,
                b: 0.22,
                a: 0.85,
            },
            bubble_text_size: 13.0,
            tab_text_size: 11.0,
        }
    }

    pub fn light() -> Self {
        Self {
            is_dark: false,
            bubble_text: Color {
                r: 0.1,
                g: 0.1,
                b: 0.12,
                a: 1.0,
            },
            bubble_bg: Color {
                r: 0.97,
                g: 0.97,
                b: 0.99,
                a: 0.95,
            },
            bubble_border: Color {
                r: 0.37,
                g: 0.30,
                b: 0.71,
                a: 1.0,
            },
            tab_text: Color {
                r: 0.1,
                g: 0.1,
                b: 0.12,
                a: 0.9,
            },
            tab_bg: Color {
                r: 0.88,
                g: 0.88,
                b: 0.93,
                a: 0.9,
            },
            bubble_text_size: 13.0,
            tab_text_size: 11.0,
        }
    }

    pub fn bubble_style(&self, alpha: f32) -> impl Fn(&iced::Theme) -> iced::widget::container::Style {
        let mut bg = self.bubble_bg;
        bg.a *= alpha;
        let mut border = self.bubble_border;
        border.a *= alpha;
        move |_theme: &iced::Theme| iced::widget::container::Style {
            background: Some(Background::Color(bg)),
            border: iced::Border {
                color: border,
                width: 2.0,
                radius: 10.0.into(),
            },
            ..Default::default()
        }
    }

    pub fn tab_style(&self) -> impl Fn(&iced::Theme) -> iced::widget::container::Style {
        let color = self.tab_bg;
        move |_theme: &iced::Theme| iced::widget::container::Style {
            background: Some(Background::Color(color)),
            border: iced::Border {
                radius: 6.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Detect system dark mode. Checks the COSMIC theme file, the XDG portal,
/// then gsettings; defaults to dark when everything fails.
pub fn detect_system_dark() -> bool {
    if let Some(home) = dirs::home_dir() {
        let cosmic_path = home.join(".config/cosmic/com.system76.CosmicTheme.Mode/v1/is_dark");
        if let Ok(contents) = std::fs::read_to_string(&cosmic_path) {
            match contents.trim() {
                "true" => return true,
                "false" => return false,
                _ => {}
            }
        }
    }

    if let Ok(output) = std::process::Command::new("dbus-send")
        .args([
            "--session",
            "--print-reply=literal",
            "--dest=org.freedesktop.portal.Desktop",
            "/org/freedesktop/portal/desktop",
            "org.freedesktop.portal.Settings.ReadOne",
            "string:org.freedesktop.appearance",
            "string:color-scheme",
        ])
        .output()
    {
        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.contains("uint32 1") {
                return true;
            }
            if stdout.contains("uint32 2") {
                return false;
            }
        }
    }

    if let Ok(output) = std::process::Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
    {
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.contains("prefer-dark") {
            return true;
        }
        if stdout.contains("prefer-light") || stdout.contains("default") {
            return false;
        }
    }

    true
}

/// Resolve the initial ThemeColors for a given mode.
pub fn resolve(mode: ThemeMode) -> ThemeColors {
    match mode {
        ThemeMode::Dark => ThemeColors::dark(),
        ThemeMode::Light => ThemeColors::light(),
        ThemeMode::Auto => {
            if detect_system_dark() {
                ThemeColors::dark()
            } else {
                ThemeColors::light()
            }
        }
    }
}
