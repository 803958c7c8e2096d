use crate::data::config::Config;
use ratatui::style::Color;

const DEFAULT_BACKGROUND: (u8, u8, u8) = (0x1b, 0x18, 0x25);
const DEFAULT_BAR: (u8, u8, u8) = (0xff, 0xff, 0xff);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCapability {
    TrueColor,
    Ansi256,
    NoColor,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: (u8, u8, u8),
    pub bar: (u8, u8, u8),
    pub capability: ColorCapability,
}

impl Theme {
    pub fn from_config(config: &Config) -> Self {
        let background = parse_hex(&config.background).unwrap_or_else(|| {
            log::warn!("bad background color {:?}; using default", config.background);
            DEFAULT_BACKGROUND
        });
        let bar = parse_hex(&config.bar_color).unwrap_or_else(|| {
            log::warn!("bad bar color {:?}; using default", config.bar_color);
            DEFAULT_BAR
        });
        Self {
            background,
            bar,
            capability: detect_color_capability(),
        }
    }

    pub fn color_background(&self) -> Color {
        map_color(self.capability, self.background)
    }

    pub fn color_bar(&self) -> Color {
        map_color(self.capability, self.bar)
    }
}

pub fn detect_color_capability() -> ColorCapability {
    let colorterm = std::env::var("COLORTERM").unwrap_or_default().to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorCapability::TrueColor;
    }

    let term = std::env::var("TERM").unwrap_or_default().to_lowercase();
    if term.contains("256color") {
        return ColorCapability::Ansi256;
    }

    ColorCapability::NoColor
}

/// Parses `#rrggbb` (leading `#` optional).
pub fn parse_hex(s: &str) -> Option<(u8, u8, u8)> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some((r, g, b))
}

fn map_color(cap: ColorCapability, t: (u8, u8, u8)) -> Color {
    match cap {
        ColorCapability::TrueColor => Color::Rgb(t.0, t.1, t.2),
        ColorCapability::Ansi256 => Color::Indexed(rgb_to_ansi256(t.0, t.1, t.2)),
        ColorCapability::NoColor => Color::Reset,
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    // 6x6x6 color cube, 16..231
    let r6 = (r as u16 * 5 / 255) as u8;
    let g6 = (g as u16 * 5 / 255) as u8;
    let b6 = (b as u16 * 5 / 255) as u8;
    16 + 36 * r6 + 6 * g6 + b6
}
