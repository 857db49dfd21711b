//! Signal and port shapes: plain bit vectors or 2-D memories.

use serde::{Deserialize, Serialize};

/// The shape of a port or signal.
///
/// Most declarations are a plain bit vector of some width. A declaration of
/// the form `bit[WIDTH][DEPTH]` is a memory: `DEPTH` words of `WIDTH` bits
/// each, emitted as `logic [WIDTH-1:0] name [0:DEPTH-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// A plain bit vector of the given width (width ≥ 1).
    Bits(u32),
    /// A memory: `depth` words of `width` bits each.
    Memory {
        /// Bits per word.
        width: u32,
        /// Number of words.
        depth: u32,
    },
}

impl Shape {
    /// The bit width of a single element (the word width for a memory).
    pub fn width(self) -> u32 {
        match self {
            Shape::Bits(w) => w,
            Shape::Memory { width, .. } => width,
        }
    }

    /// Returns `true` if this shape is a plain bit vector (not a memory).
    pub fn is_scalar(self) -> bool {
        matches!(self, Shape::Bits(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_width() {
        assert_eq!(Shape::Bits(8).width(), 8);
        assert!(Shape::Bits(8).is_scalar());
    }

    #[test]
    fn memory_width() {
        let mem = Shape::Memory {
            width: 8,
            depth: 256,
        };
        assert_eq!(mem.width(), 8);
        assert!(!mem.is_scalar());
    }
}
