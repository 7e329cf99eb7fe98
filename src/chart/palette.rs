use std::fmt;

/// Alpha applied to de-emphasised slices (about 30% opacity).
pub const DIM_ALPHA: u8 = 0x4D;

pub const DEFAULT_COLORS: [&str; 10] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#84CC16", "#F472B6",
    "#F97316", "#22C55E",
];

pub const BAR_CREATED_COLOR: &str = "#3B82F6";
pub const BAR_ACTIVE_COLOR: &str = "#10B981";
pub const BAR_WAIT_COLOR: &str = "#F59E0B";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Accepts `#RGB`, `#RRGGBB` and `#RRGGBBAA`, with or without `#`.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        let byte = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
        };
        match hex.len() {
            3 => {
                let nibble = |index: usize| {
                    hex.get(index..index + 1)
                        .and_then(|part| u8::from_str_radix(part, 16).ok())
                        .map(|value| value * 0x11)
                };
                Some(Self::opaque(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Some(Self::opaque(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            8 => Some(Self {
                r: byte(0..2)?,
                g: byte(2..4)?,
                b: byte(4..6)?,
                a: byte(6..8)?,
            }),
            _ => None,
        }
    }

    /// Same hue, different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_hex(self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Composite over an opaque background; terminals have no alpha channel.
    pub fn blend(self, background: Rgba) -> Rgba {
        let mix = |fg: u8, bg: u8| {
            let alpha = u16::from(self.a);
            let value = (u16::from(fg) * alpha + u16::from(bg) * (255 - alpha) + 127) / 255;
            value as u8
        };
        Rgba::opaque(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .filter_map(|hex| Rgba::parse_hex(hex))
                .collect(),
        }
    }
}

impl Palette {
    /// Caller colors when any parse, else the default palette.
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Self {
        let parsed = colors
            .iter()
            .filter_map(|hex| {
                let color = Rgba::parse_hex(hex.as_ref());
                if color.is_none() {
                    tracing::warn!(color = hex.as_ref(), "ignoring unparseable color");
                }
                color
            })
            .collect::<Vec<_>>();
        if parsed.is_empty() {
            Self::default()
        } else {
            Self { colors: parsed }
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for slice `index`, cycling through the palette.
    pub fn color(&self, index: usize) -> Rgba {
        if self.colors.is_empty() {
            return Rgba::opaque(0x80, 0x80, 0x80);
        }
        self.colors[index % self.colors.len()]
    }

    pub fn assign(&self, count: usize) -> Vec<Rgba> {
        (0..count).map(|index| self.color(index)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Rgba::parse_hex("#3B82F6"), Some(Rgba::opaque(0x3B, 0x82, 0xF6)));
        assert_eq!(Rgba::parse_hex("fff"), Some(Rgba::opaque(0xFF, 0xFF, 0xFF)));
        assert_eq!(
            Rgba::parse_hex("#3B82F64D").map(|c| c.a),
            Some(DIM_ALPHA)
        );
        assert_eq!(Rgba::parse_hex("#3B82"), None);
        assert_eq!(Rgba::parse_hex("#GGGGGG"), None);
    }

    #[test]
    fn dimming_keeps_hue() {
        let base = Rgba::parse_hex("#10B981").unwrap();
        let dimmed = base.with_alpha(DIM_ALPHA);
        assert_eq!(dimmed.to_hex(), "#10B9814D");
        assert_eq!((dimmed.r, dimmed.g, dimmed.b), (base.r, base.g, base.b));
    }

    #[test]
    fn palette_cycles_and_falls_back() {
        let palette = Palette::from_hex::<&str>(&[]);
        assert_eq!(palette.len(), 10);
        assert_eq!(palette.color(10), palette.color(0));
        let custom = Palette::from_hex(&["#000000", "nope"]);
        assert_eq!(custom.assign(2), vec![Rgba::opaque(0, 0, 0); 2]);
    }

    #[test]
    fn blending_fully_opaque_is_identity() {
        let color = Rgba::opaque(10, 20, 30);
        assert_eq!(color.blend(Rgba::opaque(255, 255, 255)), color);
    }
}
