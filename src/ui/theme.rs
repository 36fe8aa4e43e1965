use parsha_tracker::config::Config;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub dimmed: Color,
    pub book_header: Color,
    pub complete: Color,
    pub progress_fill: Color,
    pub progress_empty: Color,
    pub highlight_bg: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_info_bg: Color,
    pub status_error_bg: Color,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::White,
            dimmed: Color::DarkGray,
            book_header: Color::Cyan,
            complete: Color::Green,
            progress_fill: Color::Rgb(90, 170, 110),
            progress_empty: Color::Rgb(60, 60, 60),
            highlight_bg: Color::Rgb(50, 50, 70),
            status_bar_bg: Color::Rgb(40, 40, 40),
            status_bar_fg: Color::White,
            status_info_bg: Color::Rgb(0, 100, 0),
            status_error_bg: Color::Rgb(150, 30, 30),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Black,
            ..Self::default_theme()
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::White,
            foreground: Color::Black,
            dimmed: Color::Gray,
            book_header: Color::Blue,
            complete: Color::Rgb(0, 120, 40),
            progress_fill: Color::Rgb(40, 140, 70),
            progress_empty: Color::Rgb(210, 210, 210),
            highlight_bg: Color::Rgb(220, 225, 245),
            status_bar_bg: Color::LightBlue,
            status_bar_fg: Color::Black,
            status_info_bg: Color::Rgb(0, 130, 0),
            status_error_bg: Color::Rgb(190, 40, 40),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match config.theme.as_str() {
            "dark" => Self::dark(),
            "light" => Self::light(),
            _ => Self::default_theme(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}
