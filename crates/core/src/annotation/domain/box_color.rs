use std::fmt;

/// Bounding-box colours selectable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxColor {
    Red,
    Green,
    Blue,
}

impl BoxColor {
    pub const FALLBACK: BoxColor = BoxColor::Red;

    /// Map a colour name to a variant, case-insensitively.
    ///
    /// Unrecognized names resolve to [`BoxColor::FALLBACK`] rather than
    /// failing.
    pub fn from_name(name: &str) -> BoxColor {
        match name.trim().to_ascii_uppercase().as_str() {
            "RED" => BoxColor::Red,
            "GREEN" => BoxColor::Green,
            "BLUE" => BoxColor::Blue,
            _ => {
                log::warn!(
                    "Unrecognized box color '{name}', falling back to {}",
                    Self::FALLBACK
                );
                Self::FALLBACK
            }
        }
    }

    /// Pixel value in the frame's BGR channel order.
    pub fn bgr(&self) -> [u8; 3] {
        match self {
            BoxColor::Red => [0, 0, 255],
            BoxColor::Green => [0, 255, 0],
            BoxColor::Blue => [255, 0, 0],
        }
    }
}

impl fmt::Display for BoxColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoxColor::Red => "RED",
            BoxColor::Green => "GREEN",
            BoxColor::Blue => "BLUE",
        };
        f.write_str(name)
    }
}
