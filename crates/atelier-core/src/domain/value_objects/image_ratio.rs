//! Aspect ratios supported by image generation.

use crate::record_enum;

record_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ImageRatio: text {
        Square = "1:1",
        Landscape = "16:9",
        Portrait = "9:16",
    }
}

impl ImageRatio {
    /// Pixel size as `(width, height)`.
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Square => (1024, 1024),
            Self::Landscape => (1440, 800),
            Self::Portrait => (800, 1440),
        }
    }

    /// Size in `WIDTHxHEIGHT` form, as image providers expect it.
    pub fn size(self) -> String {
        let (width, height) = self.dimensions();
        format!("{width}x{height}")
    }
}
