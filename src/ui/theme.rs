use ratatui::style::{Color, Modifier, Style};

/// Stored theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    pub fn tag(&self) -> &'static str {
        match self {
            ThemeMode::System => "system",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Unknown or missing tags read as `System`.
    pub fn from_tag(tag: Option<&str>) -> ThemeMode {
        match tag.map(str::trim) {
            Some("light") => ThemeMode::Light,
            Some("dark") => ThemeMode::Dark,
            _ => ThemeMode::System,
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            ThemeMode::System => "theme.system",
            ThemeMode::Light => "theme.light",
            ThemeMode::Dark => "theme.dark",
        }
    }

    #[must_use]
    pub fn next(&self) -> ThemeMode {
        match self {
            ThemeMode::System => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
        }
    }

    pub fn resolve(&self, system_prefers_dark: bool) -> Theme {
        match self {
            ThemeMode::System if system_prefers_dark => Theme::Dark,
            ThemeMode::System => Theme::Light,
            ThemeMode::Light => Theme::Light,
            ThemeMode::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Whether the terminal reports a dark background.
///
/// Terminals that export `COLORFGBG` ("fg;bg") use ANSI indices where 7 and
/// 15 are light backgrounds. Without the variable, dark is assumed.
pub fn system_prefers_dark() -> bool {
    prefers_dark_from(std::env::var("COLORFGBG").ok().as_deref())
}

fn prefers_dark_from(colorfgbg: Option<&str>) -> bool {
    match colorfgbg.and_then(|v| v.rsplit(';').next()).map(str::trim) {
        Some("7") | Some("15") => false,
        _ => true,
    }
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub bg: Color,
    pub fg: Color,
    pub border: Color,
    pub border_focused: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl ThemeColors {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Rgb(30, 30, 30),
                fg: Color::Rgb(212, 212, 212),
                border: Color::Rgb(90, 90, 90),
                border_focused: Color::Rgb(0, 122, 204),
                selected_bg: Color::Rgb(38, 79, 120),
                selected_fg: Color::White,
                success: Color::Rgb(78, 201, 176),
                warning: Color::Rgb(206, 145, 120),
                error: Color::Rgb(244, 135, 113),
                muted: Color::Rgb(128, 128, 128),
            },
            Theme::Light => Self {
                bg: Color::Rgb(250, 250, 250),
                fg: Color::Rgb(51, 51, 51),
                border: Color::Rgb(180, 180, 180),
                border_focused: Color::Rgb(0, 102, 204),
                selected_bg: Color::Rgb(204, 232, 255),
                selected_fg: Color::Black,
                success: Color::Rgb(34, 134, 58),
                warning: Color::Rgb(176, 136, 0),
                error: Color::Rgb(215, 58, 73),
                muted: Color::Rgb(128, 128, 128),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.border_focused } else { self.border })
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn disabled(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::DIM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_tags_round_trip_and_default_to_system() {
        for mode in [ThemeMode::System, ThemeMode::Light, ThemeMode::Dark] {
            assert_eq!(ThemeMode::from_tag(Some(mode.tag())), mode);
        }
        assert_eq!(ThemeMode::from_tag(None), ThemeMode::System);
        assert_eq!(ThemeMode::from_tag(Some("solarized")), ThemeMode::System);
    }

    #[test]
    fn system_mode_follows_terminal_background() {
        assert!(prefers_dark_from(Some("15;0")));
        assert!(!prefers_dark_from(Some("0;15")));
        assert!(!prefers_dark_from(Some("0;default;7")));
        assert!(prefers_dark_from(None));
        assert_eq!(ThemeMode::System.resolve(false), Theme::Light);
        assert_eq!(ThemeMode::Dark.resolve(false), Theme::Dark);
    }
}
