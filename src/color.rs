//! Colour string parsing.
//!
//! Accepts `#RRGGBB`, `#RGB`, CSS-style named colours, and `grayN`
//! (`gray0` black to `gray100` white).

use plotters::style::RGBColor;

/// Default categorical palette (d3 category10, first entries)
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// CSS colour keywords accepted in configuration, lowercase
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("orange", (255, 165, 0)),
    ("purple", (128, 0, 128)),
    ("pink", (255, 192, 203)),
    ("brown", (165, 42, 42)),
    ("lightblue", (173, 216, 230)),
    ("steelblue", (70, 130, 180)),
    ("navy", (0, 0, 128)),
    ("teal", (0, 128, 128)),
    ("gray", (128, 128, 128)),
    ("darkgray", (169, 169, 169)),
    ("lightgray", (211, 211, 211)),
    ("whitesmoke", (245, 245, 245)),
];

/// Parse `#rrggbb`, `#rgb`, a CSS keyword or `grayN` (N in 0..=100)
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let name = color_str.trim().to_ascii_lowercase();
    if let Some(hex) = name.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    // British spelling is accepted everywhere
    let name = name.replace("grey", "gray");
    if let Some(&(_, (r, g, b))) = NAMED_COLORS.iter().find(|(n, _)| *n == name) {
        return Some(RGBColor(r, g, b));
    }

    let level: u8 = name.strip_prefix("gray")?.parse().ok()?;
    if level > 100 {
        return None;
    }
    let v = (f64::from(level) * 255.0 / 100.0).round() as u8;
    Some(RGBColor(v, v, v))
}

fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        6 => Some(RGBColor((value >> 16) as u8, (value >> 8) as u8, value as u8)),
        // #rgb doubles each digit: 0xf -> 0xff
        3 => {
            let digit = |shift: u32| ((value >> shift) & 0xf) as u8 * 17;
            Some(RGBColor(digit(8), digit(4), digit(0)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_color("#1f77b4"), Some(RGBColor(31, 119, 180)));
        assert_eq!(parse_color("#fff"), Some(RGBColor(255, 255, 255)));
        assert_eq!(parse_color("#ABC"), Some(RGBColor(170, 187, 204)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#+12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse_color("LightBlue"), Some(RGBColor(173, 216, 230)));
        assert_eq!(parse_color(" black "), Some(RGBColor(0, 0, 0)));
        assert_eq!(parse_color("gray0"), Some(RGBColor(0, 0, 0)));
        assert_eq!(parse_color("grey100"), Some(RGBColor(255, 255, 255)));
        assert_eq!(parse_color("gray101"), None);
        assert_eq!(parse_color("LightGrey"), Some(RGBColor(211, 211, 211)));
        assert_eq!(parse_color("gray"), Some(RGBColor(128, 128, 128)));
        assert_eq!(parse_color("grayish"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_category10_entries_parse() {
        for c in CATEGORY10 {
            assert!(parse_color(c).is_some(), "{} should parse", c);
        }
    }
}
