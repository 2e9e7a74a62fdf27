//! Wire ranges and control masks over basis indices.
//!
//! Bit `i` of a basis index is the value of wire `i`.

use std::fmt;

/// A contiguous run of wires `offset..offset + span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireRange {
    /// First (least significant) wire.
    pub offset: usize,
    /// Number of wires.
    pub span: usize,
}

impl WireRange {
    /// Create a range.
    #[inline]
    pub const fn new(offset: usize, span: usize) -> Self {
        Self { offset, span }
    }

    /// A range covering exactly one wire.
    #[inline]
    pub const fn single(wire: usize) -> Self {
        Self { offset: wire, span: 1 }
    }

    /// One past the last wire.
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.span
    }

    /// Number of basis values the range can hold (`2^span`).
    #[inline]
    pub const fn dim(&self) -> usize {
        1 << self.span
    }

    /// Mask selecting the range's bits in a basis index.
    #[inline]
    pub const fn mask(&self) -> usize {
        (self.dim() - 1) << self.offset
    }

    /// Extract the range's value from a basis index.
    #[inline]
    pub const fn read(&self, index: usize) -> usize {
        (index >> self.offset) & (self.dim() - 1)
    }

    /// Replace the range's bits in `index` with `value`.
    #[inline]
    pub const fn write(&self, index: usize, value: usize) -> usize {
        (index & !self.mask()) | ((value & (self.dim() - 1)) << self.offset)
    }

    /// Whether `wire` lies in the range.
    #[inline]
    pub const fn contains(&self, wire: usize) -> bool {
        wire >= self.offset && wire < self.end()
    }

    /// First wire shared with `other`, if any.
    pub fn overlap(&self, other: &Self) -> Option<usize> {
        let lo = self.offset.max(other.offset);
        let hi = self.end().min(other.end());
        (lo < hi).then_some(lo)
    }

    /// Iterate over the wires in the range.
    pub fn wires(&self) -> std::ops::Range<usize> {
        self.offset..self.end()
    }
}

impl fmt::Display for WireRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span == 1 {
            write!(f, "w{}", self.offset)
        } else {
            write!(f, "w{}..w{}", self.offset, self.end() - 1)
        }
    }
}

/// Which wires condition an operation, and on which values.
///
/// An index passes when `index & inclusion == desired`. Wires in
/// `inclusion` with a zero bit in `desired` are anti-controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ControlMask {
    /// Wires that participate in the condition.
    pub inclusion: usize,
    /// Required values of the participating wires.
    pub desired: usize,
}

impl ControlMask {
    /// No conditions: every index passes.
    pub const NONE: Self = Self {
        inclusion: 0,
        desired: 0,
    };

    /// Add a condition that `wire` has value `desired`.
    #[must_use]
    pub const fn with(self, wire: usize, desired: bool) -> Self {
        let bit = 1 << wire;
        Self {
            inclusion: self.inclusion | bit,
            desired: if desired {
                self.desired | bit
            } else {
                self.desired & !bit
            },
        }
    }

    /// Whether `index` satisfies the condition.
    #[inline]
    pub const fn allows(&self, index: usize) -> bool {
        index & self.inclusion == self.desired
    }

    /// Whether no wire participates.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.inclusion == 0
    }

    /// Whether `wire` participates.
    #[inline]
    pub const fn includes(&self, wire: usize) -> bool {
        self.inclusion & (1 << wire) != 0
    }

    /// First controlled wire inside `range`, if any.
    pub fn overlap(&self, range: &WireRange) -> Option<usize> {
        let shared = self.inclusion & range.mask();
        (shared != 0).then(|| shared.trailing_zeros() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_roundtrip() {
        let r = WireRange::new(2, 3);
        assert_eq!(r.mask(), 0b11100);
        let index = 0b1_0110_11;
        assert_eq!(r.read(index), 0b110);
        let rewritten = r.write(index, 0b011);
        assert_eq!(r.read(rewritten), 0b011);
        // Bits outside the range are untouched.
        assert_eq!(rewritten & !r.mask(), index & !r.mask());
    }

    #[test]
    fn test_overlap() {
        let a = WireRange::new(0, 3);
        let b = WireRange::new(2, 2);
        let c = WireRange::new(3, 1);
        assert_eq!(a.overlap(&b), Some(2));
        assert_eq!(a.overlap(&c), None);
        assert_eq!(b.overlap(&c), Some(3));
    }

    #[test]
    fn test_control_and_anti_control() {
        let mask = ControlMask::NONE.with(0, true).with(2, false);
        assert!(mask.allows(0b001));
        assert!(mask.allows(0b011));
        assert!(!mask.allows(0b101));
        assert!(!mask.allows(0b000));
        assert!(mask.includes(2));
        assert!(!mask.includes(1));
    }

    #[test]
    fn test_control_overlap() {
        let mask = ControlMask::NONE.with(4, true);
        assert_eq!(mask.overlap(&WireRange::new(3, 2)), Some(4));
        assert_eq!(mask.overlap(&WireRange::new(0, 4)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(WireRange::single(3).to_string(), "w3");
        assert_eq!(WireRange::new(1, 3).to_string(), "w1..w3");
    }
}
