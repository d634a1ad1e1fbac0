//! The fundamental unit of time in the emulator.

/// A count of master clock ticks.
///
/// CPU cycles and video dots are both whole multiples of a tick, so the
/// machine converts between them through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Ticks covered by `cycles` of a component clocked at crystal/`divider`.
    #[must_use]
    pub const fn from_cycles(cycles: u64, divider: u64) -> Self {
        Self(cycles * divider)
    }

    /// Whole cycles of a component clocked at crystal/`divider`.
    #[must_use]
    pub const fn to_cycles(self, divider: u64) -> u64 {
        self.0 / divider
    }
}

impl core::ops::Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::ops::Sub for Ticks {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_conversion() {
        let ticks = Ticks::from_cycles(3, 8);
        assert_eq!(ticks, Ticks::new(24));
        assert_eq!(ticks.to_cycles(4), 6);
        assert_eq!((ticks - Ticks::new(30)), Ticks::ZERO);
    }
}
