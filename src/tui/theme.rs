//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::config::ThemeMode;

/// Terminal background luma above which the light palette is used
const LIGHT_LUMA_THRESHOLD: f32 = 0.6;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Contribution bar colors
    pub bar_positive: Color,
    pub bar_negative: Color,
    pub bar_axis: Color,

    // Decision colors
    pub approved: Color,
    pub rejected: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub kind_color: Color,

    // Styles
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,
    pub flash_info: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            bar_positive: Color::Green,
            bar_negative: Color::Red,
            bar_axis: Color::DarkGray,
            approved: Color::Green,
            rejected: Color::Red,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            kind_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            flash_info: Color::White,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
        }
    }

    pub fn light() -> Self {
        Self {
            bar_positive: Color::Rgb(0, 120, 0),
            bar_negative: Color::Rgb(170, 0, 0),
            bar_axis: Color::Indexed(245),
            approved: Color::Rgb(0, 120, 0),
            rejected: Color::Rgb(170, 0, 0),
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Indexed(244),
            kind_color: Color::Indexed(244),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Indexed(240),
            title_color: Color::Blue,
            tab_active_style: Style::new().fg(Color::Blue).bold(),
            tab_inactive_style: Style::new().fg(Color::Indexed(244)),
            status_bar_bg: Color::Indexed(252),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 120, 0),
            flash_error: Color::Rgb(170, 0, 0),
            flash_info: Color::Black,
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            popup_bg: Color::Indexed(255),
        }
    }

    /// Bar color for a contribution's sign
    pub fn bar_color(&self, score: f64) -> Color {
        if score < 0.0 {
            self.bar_negative
        } else {
            self.bar_positive
        }
    }
}

/// Pick the palette. `Auto` asks the terminal for its background; must run
/// before raw mode is enabled.
pub fn resolve_theme(mode: ThemeMode) -> ThemeColors {
    match mode {
        ThemeMode::Dark => ThemeColors::dark(),
        ThemeMode::Light => ThemeColors::light(),
        ThemeMode::Auto => match terminal_light::luma() {
            Ok(luma) if luma > LIGHT_LUMA_THRESHOLD => ThemeColors::light(),
            Ok(_) => ThemeColors::dark(),
            Err(e) => {
                tracing::debug!("could not detect terminal background: {}", e);
                ThemeColors::dark()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_modes_skip_detection() {
        assert_eq!(resolve_theme(ThemeMode::Light).flash_info, Color::Black);
        assert_eq!(resolve_theme(ThemeMode::Dark).flash_info, Color::White);
    }

    #[test]
    fn test_bar_color_follows_sign() {
        let theme = ThemeColors::dark();
        assert_eq!(theme.bar_color(-0.5), theme.bar_negative);
        assert_eq!(theme.bar_color(0.5), theme.bar_positive);
        assert_eq!(theme.bar_color(0.0), theme.bar_positive);
    }
}
