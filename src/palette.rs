// Color and shape tokens from the style table

use plotters::style::RGBColor;

/// R's default palette, indexed 1..=8 by numeric color tokens
const R_PALETTE: [RGBColor; 8] = [
    RGBColor(0, 0, 0),
    RGBColor(223, 83, 107),
    RGBColor(97, 208, 79),
    RGBColor(34, 151, 230),
    RGBColor(40, 226, 229),
    RGBColor(205, 11, 188),
    RGBColor(245, 199, 16),
    RGBColor(158, 158, 158),
];

/// Parse a color token: hex (#RRGGBB, #RGB), a named color, or a palette index 1..8
pub fn parse_color(token: &str) -> Option<RGBColor> {
    let token = token.trim();

    if token.starts_with('#') {
        return parse_hex_color(token);
    }

    if let Ok(index) = token.parse::<usize>() {
        // Indices past the palette wrap around, as R does
        return match index {
            0 => None,
            n => Some(R_PALETTE[(n - 1) % R_PALETTE.len()]),
        };
    }

    match token.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "cyan" => Some(RGBColor(0, 255, 255)),
        "magenta" => Some(RGBColor(255, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "pink" => Some(RGBColor(255, 192, 203)),
        "brown" => Some(RGBColor(139, 69, 19)),
        "darkgreen" => Some(RGBColor(0, 100, 0)),
        "darkblue" => Some(RGBColor(0, 0, 139)),
        "darkred" => Some(RGBColor(139, 0, 0)),
        "navy" => Some(RGBColor(0, 0, 128)),
        "gold" => Some(RGBColor(255, 215, 0)),
        "gray" | "grey" => Some(RGBColor(190, 190, 190)),
        "darkgray" | "darkgrey" => Some(RGBColor(169, 169, 169)),
        "lightgray" | "lightgrey" => Some(RGBColor(211, 211, 211)),
        // gray0 (black) to gray100 (white)
        s if s.starts_with("gray") || s.starts_with("grey") => {
            let n = s[4..].parse::<u8>().ok().filter(|n| *n <= 100)?;
            let v = (n as f64 * 2.55).round() as u8;
            Some(RGBColor(v, v, v))
        }
        _ => None,
    }
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Square,
    Circle,
    TriangleUp,
    Plus,
    Cross,
    Diamond,
    TriangleDown,
    Asterisk,
}

/// Plotting symbol resolved from an R `pch` code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub shape: MarkerShape,
    pub filled: bool,
}

impl Marker {
    const fn open(shape: MarkerShape) -> Self {
        Self { shape, filled: false }
    }

    const fn solid(shape: MarkerShape) -> Self {
        Self { shape, filled: true }
    }

    /// Map a `pch` code (0..=25) to a marker
    ///
    /// Composite symbols (7 to 14) collapse to their outer outline. Codes 21
    /// to 25 are filled with the point color, since the style table carries a
    /// single color per population.
    pub fn from_pch(code: u8) -> Option<Self> {
        use MarkerShape::*;
        let marker = match code {
            0 | 7 | 12 | 14 => Self::open(Square),
            1 | 10 | 13 => Self::open(Circle),
            2 => Self::open(TriangleUp),
            3 => Self::open(Plus),
            4 => Self::open(Cross),
            5 | 9 => Self::open(Diamond),
            6 => Self::open(TriangleDown),
            8 | 11 => Self::open(Asterisk),
            15 | 22 => Self::solid(Square),
            16 | 19 | 20 | 21 => Self::solid(Circle),
            17 | 24 => Self::solid(TriangleUp),
            18 | 23 => Self::solid(Diamond),
            25 => Self::solid(TriangleDown),
            _ => return None,
        };
        Some(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_color("#DF536B"), Some(RGBColor(223, 83, 107)));
        assert_eq!(parse_color("#fff"), Some(RGBColor(255, 255, 255)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn test_parse_palette_index() {
        assert_eq!(parse_color("1"), Some(RGBColor(0, 0, 0)));
        assert_eq!(parse_color("4"), Some(RGBColor(34, 151, 230)));
        assert_eq!(parse_color("9"), parse_color("1"));
        assert_eq!(parse_color("0"), None);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse_color(" Red "), Some(RGBColor(255, 0, 0)));
        assert_eq!(parse_color("gray0"), Some(RGBColor(0, 0, 0)));
        assert_eq!(parse_color("grey100"), Some(RGBColor(255, 255, 255)));
        assert_eq!(parse_color("gray101"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_marker_from_pch() {
        assert_eq!(Marker::from_pch(1), Some(Marker { shape: MarkerShape::Circle, filled: false }));
        assert_eq!(Marker::from_pch(16), Some(Marker { shape: MarkerShape::Circle, filled: true }));
        assert_eq!(Marker::from_pch(25).map(|m| m.shape), Some(MarkerShape::TriangleDown));
        assert_eq!(Marker::from_pch(26), None);
    }
}
