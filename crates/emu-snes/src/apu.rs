//! APU communication ports ($2140–$2143).
//!
//! Each port is two latches: one written by the CPU and read by the audio
//! CPU, one written by the audio CPU and read by the CPU. The audio CPU is
//! not emulated; [`ApuPorts::apu_write`] and [`ApuPorts::apu_read`] are the
//! seam it would attach to.

/// Number of ports.
pub const PORTS: usize = 4;

#[derive(Debug, Default, Clone)]
pub struct ApuPorts {
    to_apu: [u8; PORTS],
    to_cpu: [u8; PORTS],
}

impl ApuPorts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU write to port `index`.
    pub fn cpu_write(&mut self, index: usize, value: u8) {
        self.to_apu[index] = value;
    }

    /// CPU read from port `index`.
    #[must_use]
    pub fn cpu_read(&self, index: usize) -> u8 {
        self.to_cpu[index]
    }

    /// Audio-CPU write to port `index`.
    pub fn apu_write(&mut self, index: usize, value: u8) {
        self.to_cpu[index] = value;
    }

    /// Audio-CPU read from port `index`.
    #[must_use]
    pub fn apu_read(&self, index: usize) -> u8 {
        self.to_apu[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latches_are_directional() {
        let mut ports = ApuPorts::new();
        ports.cpu_write(0, 0xCC);
        assert_eq!(ports.apu_read(0), 0xCC);
        assert_eq!(ports.cpu_read(0), 0x00);

        ports.apu_write(0, 0xAA);
        ports.apu_write(1, 0xBB);
        assert_eq!(ports.cpu_read(0), 0xAA);
        assert_eq!(ports.cpu_read(1), 0xBB);
        assert_eq!(ports.apu_read(0), 0xCC);
    }
}
