//! Master clock configuration.

use crate::Ticks;

/// Master clock configuration for a system.
///
/// Each system has a master crystal that drives all timing. The CPU and the
/// video dot clock run at divided rates of this frequency.
#[derive(Debug, Clone, Copy)]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g., `21_477_272` for NTSC).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Emulated wall time covered by `ticks`, in seconds.
    #[must_use]
    pub fn seconds(&self, ticks: Ticks) -> f64 {
        ticks.get() as f64 / self.frequency_hz as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_of_ticks() {
        let clock = MasterClock::new(21_477_272);
        assert!((clock.seconds(Ticks::new(21_477_272)) - 1.0).abs() < f64::EPSILON);
    }
}
