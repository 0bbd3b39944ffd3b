use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The RGB value treated as transparent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyColor(pub [u8; 3]);

impl KeyColor {
    /// Default key color
    pub const MAGENTA: KeyColor = KeyColor([255, 0, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    /// Pack as 0x00RRGGBB, the layout the window buffer uses
    pub fn to_u32(self) -> u32 {
        ((self.r() as u32) << 16) | ((self.g() as u32) << 8) | self.b() as u32
    }

    pub fn from_u32(packed: u32) -> Self {
        Self([
            ((packed >> 16) & 0xFF) as u8,
            ((packed >> 8) & 0xFF) as u8,
            (packed & 0xFF) as u8,
        ])
    }

    /// Squared Euclidean distance to another RGB value
    #[inline]
    pub fn distance_squared(&self, other: [u8; 3]) -> u32 {
        let dr = self.0[0] as i32 - other[0] as i32;
        let dg = self.0[1] as i32 - other[1] as i32;
        let db = self.0[2] as i32 - other[2] as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl Default for KeyColor {
    fn default() -> Self {
        Self::MAGENTA
    }
}

impl fmt::Display for KeyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r(), self.g(), self.b())
    }
}

impl FromStr for KeyColor {
    type Err = String;

    /// Accepts `r,g,b` or `#rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 {
                return Err(format!("expected #RRGGBB, got '{}'", s));
            }
            let packed = u32::from_str_radix(hex, 16)
                .map_err(|e| format!("invalid hex color '{}': {}", s, e))?;
            return Ok(Self::from_u32(packed));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected R,G,B, got '{}'", s));
        }
        let mut rgb = [0u8; 3];
        for (channel, part) in rgb.iter_mut().zip(parts) {
            *channel = part
                .parse()
                .map_err(|_| format!("channel '{}' is not in 0-255", part))?;
        }
        Ok(Self(rgb))
    }
}

/// Maximum Euclidean RGB distance from the key color still treated as transparent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tolerance(pub u8);

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance(30);

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Threshold compared against squared distances
    #[inline]
    pub fn squared(&self) -> u32 {
        let t = self.0 as u32;
        t * t
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
