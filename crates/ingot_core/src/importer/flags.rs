//! Post-process request flags.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitmask selecting which post-process steps run.
///
/// Each bit maps to exactly one registered step. The constants below are
/// the bits of the built-in steps; custom steps may claim any other bit.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PostProcess(u32);

impl PostProcess {
    pub const TRIANGULATE: PostProcess = PostProcess(1 << 0);
    pub const FLIP_WINDING_ORDER: PostProcess = PostProcess(1 << 1);
    pub const GEN_NORMALS: PostProcess = PostProcess(1 << 2);
    pub const TRANSFORM_UV_COORDS: PostProcess = PostProcess(1 << 3);
    pub const FLIP_UVS: PostProcess = PostProcess(1 << 4);
    pub const REMOVE_REDUNDANT_MATERIALS: PostProcess = PostProcess(1 << 5);
    pub const EMBED_TEXTURES: PostProcess = PostProcess(1 << 6);
    pub const GEN_BOUNDING_BOXES: PostProcess = PostProcess(1 << 7);

    pub const fn empty() -> Self {
        PostProcess(0)
    }

    /// Wrap raw bits without checking them against any registry.
    pub const fn from_bits_retain(bits: u32) -> Self {
        PostProcess(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set (and `other` is non-empty).
    pub const fn contains(self, other: PostProcess) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// True when `self` is exactly one bit.
    pub const fn is_single_bit(self) -> bool {
        self.0.count_ones() == 1
    }

    pub fn insert(&mut self, other: PostProcess) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: PostProcess) {
        self.0 &= !other.0;
    }

    /// Bits of `self` that are not in `known`.
    pub const fn difference(self, known: PostProcess) -> PostProcess {
        PostProcess(self.0 & !known.0)
    }
}

impl BitOr for PostProcess {
    type Output = PostProcess;

    fn bitor(self, rhs: PostProcess) -> PostProcess {
        PostProcess(self.0 | rhs.0)
    }
}

impl BitOrAssign for PostProcess {
    fn bitor_assign(&mut self, rhs: PostProcess) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PostProcess {
    type Output = PostProcess;

    fn bitand(self, rhs: PostProcess) -> PostProcess {
        PostProcess(self.0 & rhs.0)
    }
}

impl From<u32> for PostProcess {
    fn from(bits: u32) -> Self {
        PostProcess(bits)
    }
}

impl fmt::Debug for PostProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostProcess({:#x})", self.0)
    }
}

impl fmt::Display for PostProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
