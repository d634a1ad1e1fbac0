//! 24-bit memory and I/O bus interface.

use crate::Fault;

/// Size of the full 24-bit address space.
const ADDRESS_SPACE: usize = 1 << 24;

/// Address of the byte following `address` within the same 64 KiB bank.
#[must_use]
const fn next_in_bank(address: u32) -> u32 {
    (address & 0x00FF_0000) | (address.wrapping_add(1) & 0xFFFF)
}

/// Memory and I/O bus interface.
///
/// Addresses are 24-bit: bank in bits 16–23, offset in bits 0–15. Every
/// access can fault; a fault is never retried. The bus handles address
/// decoding and routing to the appropriate device.
pub trait Bus {
    /// Read a byte.
    fn read8(&mut self, address: u32) -> Result<u8, Fault>;

    /// Write a byte.
    fn write8(&mut self, address: u32, value: u8) -> Result<(), Fault>;

    /// Read a little-endian word. The high byte comes from the next offset
    /// in the same bank.
    fn read16(&mut self, address: u32) -> Result<u16, Fault> {
        let lo = self.read8(address)?;
        let hi = self.read8(next_in_bank(address))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Write a little-endian word, low byte first.
    fn write16(&mut self, address: u32, value: u16) -> Result<(), Fault> {
        let [lo, hi] = value.to_le_bytes();
        self.write8(address, lo)?;
        self.write8(next_in_bank(address), hi)
    }
}

/// Flat 16 MiB RAM bus for tests. Every address is readable and writable.
pub struct SimpleBus {
    memory: Vec<u8>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; ADDRESS_SPACE],
        }
    }

    /// Copy `data` into memory starting at `address`.
    pub fn load(&mut self, address: u32, data: &[u8]) {
        let start = address as usize & (ADDRESS_SPACE - 1);
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    /// Read a byte without going through the bus.
    #[must_use]
    pub fn peek(&self, address: u32) -> u8 {
        self.memory[address as usize & (ADDRESS_SPACE - 1)]
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read8(&mut self, address: u32) -> Result<u8, Fault> {
        Ok(self.peek(address))
    }

    fn write8(&mut self, address: u32, value: u8) -> Result<(), Fault> {
        self.memory[address as usize & (ADDRESS_SPACE - 1)] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_access_is_little_endian() {
        let mut bus = SimpleBus::new();
        bus.write16(0x7E_0010, 0xBEEF).expect("write");
        assert_eq!(bus.peek(0x7E_0010), 0xEF);
        assert_eq!(bus.peek(0x7E_0011), 0xBE);
        assert_eq!(bus.read16(0x7E_0010).expect("read"), 0xBEEF);
    }

    #[test]
    fn word_access_wraps_within_bank() {
        let mut bus = SimpleBus::new();
        bus.load(0x01_FFFF, &[0x34]);
        bus.load(0x01_0000, &[0x12]);
        assert_eq!(bus.read16(0x01_FFFF).expect("read"), 0x1234);
    }
}
