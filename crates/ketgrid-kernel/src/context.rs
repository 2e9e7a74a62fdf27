//! Runtime placement context handed to kernel providers.

use crate::error::{KernelError, KernelResult};
use crate::wires::{ControlMask, WireRange};

/// An auxiliary input register visible to a gate, e.g. input A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputRange {
    /// Register key, as written on the input gate (`'A'`, `'B'`, ...).
    pub key: char,
    /// Wires holding the register, least significant first.
    pub range: WireRange,
}

/// Everything a kernel provider needs to know about one placement.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelContext {
    /// Number of wires in the register being simulated.
    pub num_wires: usize,
    /// Wires the gate body covers.
    pub target: WireRange,
    /// Conditions contributed by control gates in the same column.
    pub controls: ControlMask,
    /// Input registers declared in the same column.
    pub inputs: Vec<InputRange>,
    /// Position within the animation cycle, in `[0, 1)`.
    pub time: f64,
}

impl KernelContext {
    /// Create a context for a gate body on `target`.
    pub fn new(num_wires: usize, target: WireRange) -> KernelResult<Self> {
        check_range(num_wires, target)?;
        Ok(Self {
            num_wires,
            target,
            controls: ControlMask::NONE,
            inputs: Vec::new(),
            time: 0.0,
        })
    }

    /// Attach the column's control mask.
    #[must_use]
    pub fn with_controls(mut self, controls: ControlMask) -> Self {
        self.controls = controls;
        self
    }

    /// Attach an input register.
    ///
    /// The register must fit in the wire count and must not overlap the
    /// target.
    pub fn with_input(mut self, key: char, range: WireRange) -> KernelResult<Self> {
        check_range(self.num_wires, range)?;
        if let Some(wire) = range.overlap(&self.target) {
            return Err(KernelError::Overlap { wire });
        }
        self.inputs.retain(|input| input.key != key);
        self.inputs.push(InputRange { key, range });
        self.inputs.sort();
        Ok(self)
    }

    /// Set the cycle position for time-dependent gates.
    #[must_use]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// The wires of input register `key`, if present.
    pub fn input(&self, key: char) -> Option<WireRange> {
        self.inputs
            .iter()
            .find(|input| input.key == key)
            .map(|input| input.range)
    }

    /// The wires of input register `key`, or an error naming it.
    pub fn require_input(&self, key: char) -> KernelResult<WireRange> {
        self.input(key).ok_or(KernelError::MissingInput(key))
    }

    /// Size of the amplitude buffer for this register.
    #[inline]
    pub fn state_len(&self) -> usize {
        1 << self.num_wires
    }
}

fn check_range(num_wires: usize, range: WireRange) -> KernelResult<()> {
    if range.span == 0 {
        return Err(KernelError::EmptyRange(range.offset));
    }
    if range.end() > num_wires {
        return Err(KernelError::RangeOutOfBounds {
            offset: range.offset,
            span: range.span,
            num_wires,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_must_fit() {
        assert!(KernelContext::new(3, WireRange::new(1, 2)).is_ok());
        assert!(matches!(
            KernelContext::new(3, WireRange::new(2, 2)),
            Err(KernelError::RangeOutOfBounds { num_wires: 3, .. })
        ));
        assert!(matches!(
            KernelContext::new(3, WireRange::new(0, 0)),
            Err(KernelError::EmptyRange(0))
        ));
    }

    #[test]
    fn test_input_may_not_overlap_target() {
        let ctx = KernelContext::new(4, WireRange::new(0, 2)).unwrap();
        assert!(matches!(
            ctx.clone().with_input('A', WireRange::new(1, 2)),
            Err(KernelError::Overlap { wire: 1 })
        ));
        let ctx = ctx.with_input('A', WireRange::new(2, 2)).unwrap();
        assert_eq!(ctx.input('A'), Some(WireRange::new(2, 2)));
        assert!(matches!(
            ctx.require_input('B'),
            Err(KernelError::MissingInput('B'))
        ));
    }

    #[test]
    fn test_input_replaces_same_key() {
        let ctx = KernelContext::new(6, WireRange::single(0))
            .unwrap()
            .with_input('A', WireRange::new(1, 2))
            .unwrap()
            .with_input('A', WireRange::new(3, 3))
            .unwrap();
        assert_eq!(ctx.inputs.len(), 1);
        assert_eq!(ctx.input('A'), Some(WireRange::new(3, 3)));
    }
}
