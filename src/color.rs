use anyhow::{ensure, Context, Result};
use ratatui::style::Color;

pub const WHITE: &str = "#FFFFFF";

/// Default canvas background
pub const BACKGROUND: &str = "#353535";

/// Palette used when rainbow mode is on
pub const RAINBOW: [&str; 7] = [
    "#FF6347", "#FF8C00", "#EDFF2F", "#008000", "#ADD8E6", "#1E90FF", "#BE52BE",
];

/// Swatches offered by the Color / Line color parameters (Up/Down cycles them)
pub const SWATCHES: [&str; 10] = [
    "#FFFFFF", "#FF6347", "#FF8C00", "#EDFF2F", "#008000", "#ADD8E6", "#1E90FF", "#BE52BE",
    "#00FFFF", "#FF69B4",
];

/// 24-bit color parsed from a `#RRGGBB` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` hex string (case-insensitive)
    pub fn parse_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        ensure!(is_hex_color(s), "invalid hex color {:?}, expected #RRGGBB", s);
        let channel = |i: usize| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .with_context(|| format!("invalid hex channel in {:?}", s))
        };
        Ok(Self::new(channel(1)?, channel(3)?, channel(5)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear blend towards `other`; t=0 is self, t=1 is other
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

/// True for exactly `#` followed by six hex digits
pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Next swatch after `current`, or the first one if `current` is not a swatch
pub fn next_swatch(current: &str) -> &'static str {
    match swatch_index(current) {
        Some(i) => SWATCHES[(i + 1) % SWATCHES.len()],
        None => SWATCHES[0],
    }
}

pub fn prev_swatch(current: &str) -> &'static str {
    match swatch_index(current) {
        Some(i) => SWATCHES[(i + SWATCHES.len() - 1) % SWATCHES.len()],
        None => SWATCHES[SWATCHES.len() - 1],
    }
}

fn swatch_index(current: &str) -> Option<usize> {
    SWATCHES.iter().position(|s| s.eq_ignore_ascii_case(current))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse_hex("#FF8C00").unwrap(), Rgb::new(255, 140, 0));
        assert_eq!(Rgb::parse_hex("#be52be").unwrap(), Rgb::new(190, 82, 190));
        assert_eq!(Rgb::parse_hex(" #000000 ").unwrap(), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(Rgb::parse_hex("FFFFFF").is_err());
        assert!(Rgb::parse_hex("#FFF").is_err());
        assert!(Rgb::parse_hex("#GGGGGG").is_err());
        assert!(Rgb::parse_hex("#FFFFFFF").is_err());
        assert!(Rgb::parse_hex("").is_err());
    }

    #[test]
    fn test_to_hex_uppercases() {
        assert_eq!(Rgb::parse_hex("#1e90ff").unwrap().to_hex(), "#1E90FF");
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(100, 50, 25));
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn test_palettes_are_valid() {
        for hex in RAINBOW.iter().chain(SWATCHES.iter()) {
            assert!(is_hex_color(hex), "{} should be valid", hex);
        }
        assert!(is_hex_color(WHITE));
        assert!(is_hex_color(BACKGROUND));
    }

    #[test]
    fn test_swatch_cycling_wraps() {
        assert_eq!(next_swatch("#FFFFFF"), SWATCHES[1]);
        assert_eq!(prev_swatch("#ffffff"), SWATCHES[SWATCHES.len() - 1]);
        assert_eq!(next_swatch(SWATCHES[SWATCHES.len() - 1]), SWATCHES[0]);
        assert_eq!(next_swatch("#123456"), SWATCHES[0]);
    }
}
