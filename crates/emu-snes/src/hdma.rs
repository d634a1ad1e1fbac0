//! DMA/HDMA channel descriptors and the block-transfer engine.
//!
//! Channels are programmed through the $43x0–$43x6 register blocks and
//! started by a write to MDMAEN ($420B). A transfer runs to completion
//! before the enabling write returns: each 16-bit unit is read from the
//! source address and written to `$2100 + BBAD`.

use emu_core::{Bus, Fault};

/// Number of channels in the $43xx register space.
pub const CHANNELS: usize = 8;

/// Base of the B-bus register page that BBAD offsets into.
const B_BUS_BASE: u32 = 0x2100;

/// How the source address moves after each unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increment,
    Fixed,
    Decrement,
}

/// How each 16-bit unit lands on the destination register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// One 16-bit write (low byte to the register, high byte to the next).
    Word,
    /// Two 8-bit writes to the same register, low byte then high byte.
    ByteTwice,
}

/// One channel's transfer descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Channel {
    /// DMAPx: step in bits 3–4, transfer type in bits 0–2.
    pub dmap: u8,
    /// BBADx: destination register offset from $2100.
    pub bbad: u8,
    /// A1Tx/A1Bx: 24-bit source address.
    pub source: u32,
    /// DASx: remaining byte count.
    pub byte_count: u16,
}

impl Channel {
    /// Step mode from DMAP bits 3–4: 0 increments, 2 decrements, anything
    /// else holds the address.
    #[must_use]
    pub fn step(&self) -> Step {
        match (self.dmap >> 3) & 0x03 {
            0 => Step::Increment,
            2 => Step::Decrement,
            _ => Step::Fixed,
        }
    }

    /// Write pattern from DMAP bits 0–2.
    pub fn pattern(&self) -> Result<Pattern, Fault> {
        match self.dmap & 0x07 {
            1 => Ok(Pattern::Word),
            0 | 2 => Ok(Pattern::ByteTwice),
            other => Err(Fault::Unimplemented(format!(
                "DMA transfer type {other} (DMAP ${:02X})",
                self.dmap
            ))),
        }
    }

    /// Advance the source offset by one unit, keeping the bank.
    fn advance(&mut self, step: Step) {
        let bank = self.source & 0x00FF_0000;
        let offset = self.source as u16;
        let offset = match step {
            Step::Increment => offset.wrapping_add(2),
            Step::Decrement => offset.wrapping_sub(2),
            Step::Fixed => offset,
        };
        self.source = bank | u32::from(offset);
    }

    /// Copy the whole block to the destination register.
    pub fn transfer(&mut self, bus: &mut impl Bus) -> Result<(), Fault> {
        if self.byte_count % 2 != 0 {
            return Err(Fault::Unimplemented(format!(
                "odd DMA byte count {:#06X}",
                self.byte_count
            )));
        }
        let step = self.step();
        let pattern = self.pattern()?;
        let destination = B_BUS_BASE + u32::from(self.bbad);

        while self.byte_count > 0 {
            let unit = bus.read16(self.source)?;
            log::trace!(
                "DMA ${:06X} -> ${destination:04X}: {unit:#06X}",
                self.source
            );
            self.advance(step);
            match pattern {
                Pattern::Word => bus.write16(destination, unit)?,
                Pattern::ByteTwice => {
                    let [lo, hi] = unit.to_le_bytes();
                    bus.write8(destination, lo)?;
                    bus.write8(destination, hi)?;
                }
            }
            self.byte_count -= 2;
        }
        Ok(())
    }
}

/// The eight channel descriptors.
#[derive(Debug, Clone, Default)]
pub struct Hdma {
    channels: [Channel; CHANNELS],
}

impl Hdma {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index]
    }

    pub fn write_dmap(&mut self, channel: usize, value: u8) {
        self.channels[channel].dmap = value;
    }

    pub fn write_bbad(&mut self, channel: usize, value: u8) {
        self.channels[channel].bbad = value;
    }

    /// A1Bx: source bank.
    pub fn write_table_bank(&mut self, channel: usize, bank: u8) {
        let source = &mut self.channels[channel].source;
        *source = (*source & 0x0000_FFFF) | (u32::from(bank) << 16);
    }

    /// A1Tx as a single 16-bit write.
    pub fn write_table_start(&mut self, channel: usize, offset: u16) {
        let source = &mut self.channels[channel].source;
        *source = (*source & 0x00FF_0000) | u32::from(offset);
    }

    /// A1TxL.
    pub fn write_table_start_low(&mut self, channel: usize, value: u8) {
        let offset = self.channels[channel].source as u16;
        self.write_table_start(channel, (offset & 0xFF00) | u16::from(value));
    }

    /// A1TxH.
    pub fn write_table_start_high(&mut self, channel: usize, value: u8) {
        let offset = self.channels[channel].source as u16;
        self.write_table_start(channel, (offset & 0x00FF) | (u16::from(value) << 8));
    }

    pub fn write_das_low(&mut self, channel: usize, value: u8) {
        let count = &mut self.channels[channel].byte_count;
        *count = (*count & 0xFF00) | u16::from(value);
    }

    pub fn write_das_high(&mut self, channel: usize, value: u8) {
        let count = &mut self.channels[channel].byte_count;
        *count = (*count & 0x00FF) | (u16::from(value) << 8);
    }

    /// MDMAEN: run the enabled channels. Only channel 0 is supported.
    pub fn write_mdmaen(&mut self, mask: u8, bus: &mut impl Bus) -> Result<(), Fault> {
        match mask {
            0x00 => Ok(()),
            0x01 => {
                log::debug!("MDMAEN: channel 0 {:?}", self.channels[0]);
                self.channels[0].transfer(bus)
            }
            _ => Err(Fault::Unimplemented(format!("MDMAEN mask ${mask:02X}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    /// Records register-page writes and serves everything else from RAM.
    struct RecordingBus {
        memory: SimpleBus,
        writes: Vec<(u32, Unit)>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Unit {
        Byte(u8),
        Word(u16),
    }

    impl RecordingBus {
        fn with_source(address: u32, data: &[u8]) -> Self {
            let mut memory = SimpleBus::new();
            memory.load(address, data);
            Self {
                memory,
                writes: Vec::new(),
            }
        }
    }

    impl Bus for RecordingBus {
        fn read8(&mut self, address: u32) -> Result<u8, Fault> {
            self.memory.read8(address)
        }

        fn write8(&mut self, address: u32, value: u8) -> Result<(), Fault> {
            self.writes.push((address, Unit::Byte(value)));
            Ok(())
        }

        fn write16(&mut self, address: u32, value: u16) -> Result<(), Fault> {
            self.writes.push((address, Unit::Word(value)));
            Ok(())
        }
    }

    fn program(hdma: &mut Hdma, dmap: u8, bbad: u8, source: u32, count: u16) {
        hdma.write_dmap(0, dmap);
        hdma.write_bbad(0, bbad);
        hdma.write_table_bank(0, (source >> 16) as u8);
        hdma.write_table_start(0, source as u16);
        hdma.write_das_low(0, count as u8);
        hdma.write_das_high(0, (count >> 8) as u8);
    }

    #[test]
    fn word_transfer_increments_source() {
        let mut bus = RecordingBus::with_source(0x7F_0000, &[0x11, 0x22, 0x33, 0x44]);
        let mut hdma = Hdma::new();
        program(&mut hdma, 0x01, 0x18, 0x7F_0000, 4);

        hdma.write_mdmaen(0x01, &mut bus).expect("transfer");

        assert_eq!(
            bus.writes,
            vec![(0x2118, Unit::Word(0x2211)), (0x2118, Unit::Word(0x4433))]
        );
        assert_eq!(hdma.channel(0).byte_count, 0);
        assert_eq!(hdma.channel(0).source, 0x7F_0004);
    }

    #[test]
    fn decrement_step_walks_backwards() {
        let mut bus = RecordingBus::with_source(0x00_1000, &[0xAA, 0xBB, 0xCC, 0xDD]);
        let mut hdma = Hdma::new();
        program(&mut hdma, 0x11, 0x18, 0x00_1002, 4);

        hdma.write_mdmaen(0x01, &mut bus).expect("transfer");

        assert_eq!(
            bus.writes,
            vec![(0x2118, Unit::Word(0xDDCC)), (0x2118, Unit::Word(0xBBAA))]
        );
    }

    #[test]
    fn fixed_step_rereads_source_and_keeps_bank() {
        let mut bus = RecordingBus::with_source(0x7F_FFFE, &[0x01, 0x02]);
        let mut hdma = Hdma::new();
        program(&mut hdma, 0x09, 0x18, 0x7F_FFFE, 4);

        hdma.write_mdmaen(0x01, &mut bus).expect("transfer");

        assert_eq!(bus.writes.len(), 2);
        assert!(bus.writes.iter().all(|w| *w == (0x2118, Unit::Word(0x0201))));
        assert_eq!(hdma.channel(0).source, 0x7F_FFFE);
    }

    #[test]
    fn increment_wraps_within_bank() {
        let mut channel = Channel {
            source: 0x7F_FFFE,
            ..Channel::default()
        };
        channel.advance(Step::Increment);
        assert_eq!(channel.source, 0x7F_0000);
    }

    #[test]
    fn byte_pattern_writes_low_then_high() {
        let mut bus = RecordingBus::with_source(0x00_0100, &[0x34, 0x12]);
        let mut hdma = Hdma::new();
        program(&mut hdma, 0x02, 0x22, 0x00_0100, 2);

        hdma.write_mdmaen(0x01, &mut bus).expect("transfer");

        assert_eq!(
            bus.writes,
            vec![(0x2122, Unit::Byte(0x34)), (0x2122, Unit::Byte(0x12))]
        );
    }

    #[test]
    fn zero_mask_is_a_no_op() {
        let mut bus = RecordingBus::with_source(0, &[]);
        let mut hdma = Hdma::new();
        program(&mut hdma, 0x01, 0x18, 0, 4);

        hdma.write_mdmaen(0x00, &mut bus).expect("no-op");

        assert!(bus.writes.is_empty());
        assert_eq!(hdma.channel(0).byte_count, 4);
    }

    #[test]
    fn other_channels_are_unimplemented() {
        let mut bus = RecordingBus::with_source(0, &[]);
        let mut hdma = Hdma::new();
        let result = hdma.write_mdmaen(0x02, &mut bus);
        assert!(matches!(result, Err(Fault::Unimplemented(_))));
    }

    #[test]
    fn odd_byte_count_is_rejected() {
        let mut bus = RecordingBus::with_source(0, &[]);
        let mut hdma = Hdma::new();
        program(&mut hdma, 0x01, 0x18, 0, 3);

        let result = hdma.write_mdmaen(0x01, &mut bus);

        assert!(matches!(result, Err(Fault::Unimplemented(_))));
        assert!(bus.writes.is_empty());
    }

    #[test]
    fn unsupported_transfer_type() {
        let mut bus = RecordingBus::with_source(0, &[]);
        let mut hdma = Hdma::new();
        program(&mut hdma, 0x04, 0x18, 0, 2);
        assert!(hdma.write_mdmaen(0x01, &mut bus).is_err());
    }

    #[test]
    fn table_start_halves() {
        let mut hdma = Hdma::new();
        hdma.write_table_bank(3, 0x7F);
        hdma.write_table_start_low(3, 0x34);
        hdma.write_table_start_high(3, 0x12);
        assert_eq!(hdma.channel(3).source, 0x7F_1234);
    }
}
