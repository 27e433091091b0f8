// src/region.rs

//! Boundary types towards the region-algebra collaborator.
//!
//! The scheduling core does not implement region algebra (union, splitting,
//! multi-box regions); it only needs the two representations that cross the
//! interface:
//!
//! - [`Subrange`] — the iteration-space chunk a kernel executes, as declared
//!   by the application (offset + extent per dimension);
//! - [`GridBox`] — the canonical axis-aligned box in the fixed 3-dimensional
//!   grid space that commands store for later intersection tests.
//!
//! Everything is normalized to three dimensions; unused dimensions have
//! offset 0 and extent 1.

use std::fmt;

/// Number of dimensions of the canonical grid space.
pub const DIMS: usize = 3;

/// A contiguous chunk of an iteration space: per-dimension offset + extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subrange {
    pub offset: [u64; DIMS],
    pub range: [u64; DIMS],
}

impl Subrange {
    /// Build a subrange from 1 to 3 declared dimensions.
    ///
    /// Returns `None` if the slices are empty, longer than [`DIMS`], or of
    /// mismatched length.
    pub fn from_dims(offset: &[u64], range: &[u64]) -> Option<Self> {
        if offset.is_empty() || offset.len() > DIMS || offset.len() != range.len() {
            return None;
        }
        let mut sr = Subrange {
            offset: [0; DIMS],
            range: [1; DIMS],
        };
        sr.offset[..offset.len()].copy_from_slice(offset);
        sr.range[..range.len()].copy_from_slice(range);
        Some(sr)
    }

    /// One-dimensional convenience constructor.
    pub fn d1(offset: u64, len: u64) -> Self {
        Subrange {
            offset: [offset, 0, 0],
            range: [len, 1, 1],
        }
    }

    /// True if any dimension has extent zero.
    pub fn is_empty(&self) -> bool {
        self.range.iter().any(|&r| r == 0)
    }

    /// Canonical grid-space box covered by this subrange.
    pub fn to_box(&self) -> GridBox {
        let mut min = [0; DIMS];
        let mut max = [0; DIMS];
        for d in 0..DIMS {
            min[d] = self.offset[d];
            max[d] = self.offset[d] + self.range[d];
        }
        GridBox { min, max }
    }
}

/// Half-open axis-aligned box `[min, max)` in the canonical grid space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBox {
    pub min: [u64; DIMS],
    pub max: [u64; DIMS],
}

impl GridBox {
    /// Convert back to the offset + extent form.
    pub fn to_subrange(&self) -> Subrange {
        let mut offset = [0; DIMS];
        let mut range = [0; DIMS];
        for d in 0..DIMS {
            offset[d] = self.min[d];
            range[d] = self.max[d].saturating_sub(self.min[d]);
        }
        Subrange { offset, range }
    }

    pub fn is_empty(&self) -> bool {
        (0..DIMS).any(|d| self.max[d] <= self.min[d])
    }

    /// True if the two boxes share at least one grid point.
    pub fn intersects(&self, other: &GridBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && (0..DIMS).all(|d| self.min[d] < other.max[d] && other.min[d] < self.max[d])
    }
}

impl fmt::Display for GridBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{},{} .. {},{},{})",
            self.min[0], self.min[1], self.min[2], self.max[0], self.max[1], self.max[2]
        )
    }
}
