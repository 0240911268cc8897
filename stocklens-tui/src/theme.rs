//! Color tokens and styles: neon accents on a dark background.

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn heading() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        heading()
    } else {
        muted()
    }
}

/// Green for gains, pink for losses.
pub fn signed(value: f64) -> Style {
    if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

/// Correlation strength: strong positive, strong negative, or weak.
pub fn correlation(value: Option<f64>) -> Style {
    match value {
        Some(c) if c >= 0.7 => positive(),
        Some(c) if c <= -0.7 => negative(),
        Some(_) => neutral(),
        None => muted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_colors() {
        assert_eq!(signed(1.0), positive());
        assert_eq!(signed(0.0), positive());
        assert_eq!(signed(-0.1), negative());
    }

    #[test]
    fn correlation_colors() {
        assert_eq!(correlation(Some(0.95)), positive());
        assert_eq!(correlation(Some(-0.8)), negative());
        assert_eq!(correlation(Some(0.1)), neutral());
        assert_eq!(correlation(None), muted());
    }
}
