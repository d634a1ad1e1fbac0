//! SNES memory bus.
//!
//! Decodes the 24-bit address space (LoROM layout) and routes register
//! accesses to the PPU, DMA channels, APU ports and the multiply/divide
//! unit. Anything the machine doesn't model is a [`Fault`].
//!
//! | Banks   | Offsets       | Target                                  |
//! |---------|---------------|-----------------------------------------|
//! | $00–$3F | $0000–$1FFF   | WRAM (first 8 KiB)                      |
//! | $00–$3F | $2100–$43FF   | I/O registers                           |
//! | $00–$3F | $8000–$FFFF   | ROM, 32 KiB per bank                    |
//! | $40–$5F | $0000–$FFFF   | ROM, 64 KiB per bank                    |
//! | $7F     | $0000–$FFFF   | WRAM (upper 64 KiB)                     |
//!
//! ROM indices wrap against `len - 1`, so a ROM whose size is not a power
//! of two aliases irregularly. That matches how the image is mapped.

#![allow(clippy::cast_possible_truncation)]

use emu_core::{Access, Bus, Fault};

use crate::apu::ApuPorts;
use crate::hdma::Hdma;
use crate::math::MathUnit;
use crate::ppu::Ppu;

/// WRAM size: 8 KiB low window plus the 64 KiB bank $7F window share one
/// 128 KiB array.
pub const WRAM_SIZE: usize = 128 * 1024;

const LOW_RAM_SIZE: usize = 0x2000;
const HIGH_RAM_BASE: usize = 0x1_0000;

/// Where a decoded address lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Rom(usize),
    LowRam(usize),
    HighRam(usize),
    Register(u16),
}

/// The SNES system bus.
pub struct SnesBus {
    rom: Vec<u8>,
    pub wram: Vec<u8>,
    pub ppu: Ppu,
    pub hdma: Hdma,
    pub apu: ApuPorts,
    pub math: MathUnit,

    nmitimen: u8,
    /// RDNMI bit 7: latched on the vblank rising edge.
    nmi_flag: bool,
    vblank: bool,
}

const fn split(address: u32) -> (u8, u16) {
    ((address >> 16) as u8, address as u16)
}

impl SnesBus {
    #[must_use]
    pub fn new(rom: Vec<u8>, scanlines_per_frame: u16) -> Self {
        Self {
            rom,
            wram: vec![0; WRAM_SIZE],
            ppu: Ppu::new(scanlines_per_frame),
            hdma: Hdma::new(),
            apu: ApuPorts::new(),
            math: MathUnit::new(),
            nmitimen: 0,
            nmi_flag: false,
            vblank: false,
        }
    }

    #[must_use]
    pub fn nmitimen(&self) -> u8 {
        self.nmitimen
    }

    #[must_use]
    pub fn vblank(&self) -> bool {
        self.vblank
    }

    /// Set or clear the vblank status.
    ///
    /// Returns `true` when this call is a rising edge and NMITIMEN has NMIs
    /// enabled; the caller must then enter the CPU's NMI handler before
    /// anything else runs.
    pub fn set_vblank(&mut self, active: bool) -> bool {
        if !active {
            if self.vblank {
                log::debug!("vblank end");
            }
            self.vblank = false;
            self.nmi_flag = false;
            return false;
        }
        if self.vblank {
            return false;
        }
        self.vblank = true;
        self.nmi_flag = true;
        let fire = self.nmitimen & 0x80 != 0;
        log::debug!("vblank start (NMI {})", if fire { "fired" } else { "masked" });
        fire
    }

    /// Read memory without side effects. Registers read as `None`.
    #[must_use]
    pub fn peek(&self, address: u32) -> Option<u8> {
        match self.decode(Access::Read8, address).ok()? {
            Target::Rom(index) => self.rom.get(index).copied(),
            Target::LowRam(index) | Target::HighRam(index) => Some(self.wram[index]),
            Target::Register(_) => None,
        }
    }

    fn rom_index(&self, index: usize) -> usize {
        index & self.rom.len().saturating_sub(1)
    }

    fn decode(&self, access: Access, address: u32) -> Result<Target, Fault> {
        let (bank, offset) = split(address);
        match bank {
            0x00..=0x3F => match offset {
                0x8000..=0xFFFF => {
                    let index = (usize::from(bank & 0x3F) << 15) | usize::from(offset & 0x7FFF);
                    Ok(Target::Rom(self.rom_index(index)))
                }
                0x0000..=0x1FFF => Ok(Target::LowRam(usize::from(offset))),
                0x2100..=0x43FF => Ok(Target::Register(offset)),
                _ => Err(Fault::UnmappedAddress {
                    access,
                    bank,
                    offset,
                }),
            },
            0x40..=0x5F => {
                let index = (usize::from(bank & 0x3F) << 16) | usize::from(offset);
                Ok(Target::Rom(self.rom_index(index)))
            }
            0x7F => Ok(Target::HighRam(HIGH_RAM_BASE + usize::from(offset))),
            _ => Err(Fault::UnmappedBank {
                access,
                bank,
                offset,
            }),
        }
    }

    /// The byte after `target`, staying inside the same region.
    fn next(&self, target: Target) -> Target {
        match target {
            Target::Rom(index) => Target::Rom(self.rom_index(index + 1)),
            Target::LowRam(index) => Target::LowRam((index + 1) % LOW_RAM_SIZE),
            Target::HighRam(index) => {
                Target::HighRam(HIGH_RAM_BASE + ((index + 1 - HIGH_RAM_BASE) & 0xFFFF))
            }
            Target::Register(offset) => Target::Register(offset.wrapping_add(1)),
        }
    }

    fn rom_byte(&self, access: Access, address: u32, index: usize) -> Result<u8, Fault> {
        let (bank, offset) = split(address);
        self.rom.get(index).copied().ok_or(Fault::UnmappedAddress {
            access,
            bank,
            offset,
        })
    }

    fn read_target(&mut self, access: Access, address: u32, target: Target) -> Result<u8, Fault> {
        match target {
            Target::Rom(index) => self.rom_byte(access, address, index),
            Target::LowRam(index) | Target::HighRam(index) => Ok(self.wram[index]),
            Target::Register(offset) => self.read_register(access, address, offset),
        }
    }

    fn write_target(
        &mut self,
        access: Access,
        address: u32,
        target: Target,
        value: u8,
    ) -> Result<(), Fault> {
        match target {
            Target::Rom(_) => {
                let (bank, offset) = split(address);
                Err(Fault::UnmappedAddress {
                    access,
                    bank,
                    offset,
                })
            }
            Target::LowRam(index) | Target::HighRam(index) => {
                self.wram[index] = value;
                Ok(())
            }
            Target::Register(offset) => self.write_register(access, address, offset, value),
        }
    }

    fn read_register(&mut self, access: Access, address: u32, offset: u16) -> Result<u8, Fault> {
        let value = match offset {
            0x2140..=0x2143 => self.apu.cpu_read(usize::from(offset - 0x2140)),
            // Joypads are not connected.
            0x4016 | 0x4017 | 0x4218..=0x421F => 0,
            0x4210 => {
                let value = if self.nmi_flag { 0x82 } else { 0x02 };
                self.nmi_flag = false;
                value
            }
            // H/V timer IRQs are not modelled, so TIMEUP never latches.
            0x4211 => 0,
            0x4212 => {
                if self.vblank {
                    0x80
                } else {
                    0x00
                }
            }
            0x4214 => self.math.rddiv() as u8,
            0x4215 => (self.math.rddiv() >> 8) as u8,
            0x4216 => self.math.rdmpy() as u8,
            0x4217 => (self.math.rdmpy() >> 8) as u8,
            _ => {
                let (bank, _) = split(address);
                return Err(Fault::UnmappedAddress {
                    access,
                    bank,
                    offset,
                });
            }
        };
        Ok(value)
    }

    fn write_register(
        &mut self,
        access: Access,
        address: u32,
        offset: u16,
        value: u8,
    ) -> Result<(), Fault> {
        match offset {
            0x2100 => self.ppu.write_inidisp(value),
            0x2105 => self.ppu.write_bgmode(value),
            0x2107..=0x210A => self.ppu.write_bg_sc(usize::from(offset - 0x2107), value),
            0x210D | 0x210E | 0x212C | 0x212D | 0x2130 | 0x2131 | 0x2133 => {
                log::trace!("ignored write ${value:02X} to ${offset:04X}");
            }
            0x2115 => self.ppu.write_vmain(value),
            0x2116 => self.ppu.write_vmadd_low(value),
            0x2117 => self.ppu.write_vmadd_high(value),
            0x2118 => self.ppu.write_vmdata_low(value),
            0x2119 => self.ppu.write_vmdata_high(value),
            0x2121 => self.ppu.write_cgadd(value),
            0x2122 => self.ppu.write_cgdata(value),
            0x2132 => self.ppu.write_coldata(value),
            0x2140..=0x2143 => self.apu.cpu_write(usize::from(offset - 0x2140), value),
            0x4200 => {
                log::debug!("NMITIMEN = ${value:02X}");
                self.nmitimen = value;
            }
            0x4202 => self.math.write_wrmpya(value),
            0x4203 => self.math.write_wrmpyb(value),
            0x4204 => self.math.write_wrdiv_low(value),
            0x4205 => self.math.write_wrdiv_high(value),
            0x4206 => self.math.write_wrdivb(value),
            0x420B => return self.start_dma(value),
            0x4300..=0x437F if offset & 0x0F <= 0x06 => {
                let channel = usize::from((offset >> 4) & 0x07);
                match offset & 0x0F {
                    0x0 => self.hdma.write_dmap(channel, value),
                    0x1 => self.hdma.write_bbad(channel, value),
                    0x2 => self.hdma.write_table_start_low(channel, value),
                    0x3 => self.hdma.write_table_start_high(channel, value),
                    0x4 => self.hdma.write_table_bank(channel, value),
                    0x5 => self.hdma.write_das_low(channel, value),
                    _ => self.hdma.write_das_high(channel, value),
                }
            }
            _ if matches!(offset & 0xFF00, 0x2100 | 0x4200 | 0x4300) => {
                if value != 0 {
                    return Err(Fault::UnhandledRegister { offset, value });
                }
            }
            _ => {
                let (bank, _) = split(address);
                return Err(Fault::UnmappedAddress {
                    access,
                    bank,
                    offset,
                });
            }
        }
        Ok(())
    }

    /// MDMAEN. The channels read their source through this bus, so they
    /// are moved out for the duration of the transfer.
    fn start_dma(&mut self, mask: u8) -> Result<(), Fault> {
        log::debug!("MDMAEN = ${mask:02X}");
        let mut hdma = std::mem::take(&mut self.hdma);
        let result = hdma.write_mdmaen(mask, self);
        self.hdma = hdma;
        result
    }

    /// 16-bit register write. Registers with a native word form take the
    /// value in one piece; the rest see two byte writes.
    fn write_register16(&mut self, address: u32, offset: u16, value: u16) -> Result<(), Fault> {
        match offset {
            0x2116 => self.ppu.write_vmadd(value),
            0x2118 => self.ppu.write_vmdata(value),
            0x4300..=0x437F if matches!(offset & 0x0F, 0x2 | 0x5) => {
                let channel = usize::from((offset >> 4) & 0x07);
                let [lo, hi] = value.to_le_bytes();
                if offset & 0x0F == 0x2 {
                    self.hdma.write_table_start(channel, value);
                } else {
                    self.hdma.write_das_low(channel, lo);
                    self.hdma.write_das_high(channel, hi);
                }
            }
            _ => {
                let [lo, hi] = value.to_le_bytes();
                self.write_register(Access::Write16, address, offset, lo)?;
                self.write_register(Access::Write16, address, offset.wrapping_add(1), hi)?;
            }
        }
        Ok(())
    }
}

impl Bus for SnesBus {
    fn read8(&mut self, address: u32) -> Result<u8, Fault> {
        let target = self.decode(Access::Read8, address)?;
        self.read_target(Access::Read8, address, target)
    }

    fn write8(&mut self, address: u32, value: u8) -> Result<(), Fault> {
        let target = self.decode(Access::Write8, address)?;
        self.write_target(Access::Write8, address, target, value)
    }

    fn read16(&mut self, address: u32) -> Result<u16, Fault> {
        let target = self.decode(Access::Read16, address)?;
        let lo = self.read_target(Access::Read16, address, target)?;
        let hi = self.read_target(Access::Read16, address, self.next(target))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn write16(&mut self, address: u32, value: u16) -> Result<(), Fault> {
        let target = self.decode(Access::Write16, address)?;
        if let Target::Register(offset) = target {
            return self.write_register16(address, offset, value);
        }
        let [lo, hi] = value.to_le_bytes();
        self.write_target(Access::Write16, address, target, lo)?;
        self.write_target(Access::Write16, address, self.next(target), hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 64 KiB ROM where each byte holds the low byte of its own index.
    fn make_bus() -> SnesBus {
        let rom = (0..0x1_0000).map(|i| i as u8).collect();
        SnesBus::new(rom, 262)
    }

    #[test]
    fn lorom_mapping() {
        let mut bus = make_bus();
        bus.rom[0x0000] = 0xAA;
        bus.rom[0x8000] = 0xBB;
        assert_eq!(bus.read8(0x00_8000).unwrap(), 0xAA);
        assert_eq!(bus.read8(0x01_8000).unwrap(), 0xBB);
        // Bank $02 wraps back to the start of a 64 KiB image.
        assert_eq!(bus.read8(0x02_8000).unwrap(), 0xAA);
    }

    #[test]
    fn hirom_window_uses_64k_banks() {
        let mut bus = make_bus();
        bus.rom[0x1234] = 0x5A;
        assert_eq!(bus.read8(0x40_1234).unwrap(), 0x5A);
        assert_eq!(bus.read8(0x41_1234).unwrap(), 0x5A);
    }

    #[test]
    fn non_power_of_two_rom_stays_in_bounds() {
        let mut bus = SnesBus::new(vec![0x11; 0x6000], 262);
        assert_eq!(bus.read8(0x00_FFFF).unwrap(), 0x11);
        assert_eq!(bus.read16(0x5F_FFFF).unwrap(), 0x1111);
    }

    #[test]
    fn wram_windows() {
        let mut bus = make_bus();
        bus.write8(0x00_0100, 0x42).unwrap();
        assert_eq!(bus.read8(0x3F_0100).unwrap(), 0x42);
        assert_eq!(bus.wram[0x0100], 0x42);

        bus.write8(0x7F_0100, 0x99).unwrap();
        assert_eq!(bus.wram[0x1_0100], 0x99);
        assert_eq!(bus.read8(0x00_0100).unwrap(), 0x42);
    }

    #[test]
    fn word_access_is_little_endian() {
        let mut bus = make_bus();
        bus.write16(0x7F_2000, 0xBEEF).unwrap();
        assert_eq!(bus.wram[0x1_2000], 0xEF);
        assert_eq!(bus.wram[0x1_2001], 0xBE);
        assert_eq!(bus.read16(0x7F_2000).unwrap(), 0xBEEF);
    }

    #[test]
    fn word_access_stays_in_region() {
        let mut bus = make_bus();
        bus.write16(0x00_1FFF, 0x1234).unwrap();
        assert_eq!(bus.wram[0x1FFF], 0x34);
        assert_eq!(bus.wram[0x0000], 0x12);

        bus.write16(0x7F_FFFF, 0x5678).unwrap();
        assert_eq!(bus.wram[0x1_FFFF], 0x78);
        assert_eq!(bus.wram[0x1_0000], 0x56);

        // Last ROM byte pairs with the first.
        assert_eq!(bus.read16(0x01_FFFF).unwrap(), 0x00FF);
    }

    #[test]
    fn unmapped_bank_faults() {
        let mut bus = make_bus();
        assert_eq!(
            bus.read8(0xFF_0000),
            Err(Fault::UnmappedBank {
                access: Access::Read8,
                bank: 0xFF,
                offset: 0x0000,
            })
        );
        assert!(matches!(
            bus.write16(0x80_1234, 0),
            Err(Fault::UnmappedBank { bank: 0x80, .. })
        ));
    }

    #[test]
    fn unmapped_offsets_fault() {
        let mut bus = make_bus();
        assert!(matches!(
            bus.read8(0x00_5000),
            Err(Fault::UnmappedAddress { offset: 0x5000, .. })
        ));
        assert!(matches!(
            bus.read8(0x00_2100),
            Err(Fault::UnmappedAddress { offset: 0x2100, .. })
        ));
        assert!(bus.write8(0x00_8000, 0x12).is_err());
    }

    #[test]
    fn zero_writes_to_unknown_registers_are_accepted() {
        let mut bus = make_bus();
        assert_eq!(bus.write8(0x00_2101, 0x00), Ok(()));
        assert_eq!(bus.write8(0x00_420C, 0x00), Ok(()));
        assert_eq!(
            bus.write8(0x00_2101, 0x03),
            Err(Fault::UnhandledRegister {
                offset: 0x2101,
                value: 0x03,
            })
        );
        assert!(matches!(
            bus.write8(0x00_4000, 0x00),
            Err(Fault::UnmappedAddress { .. })
        ));
    }

    #[test]
    fn ignored_registers_accept_any_value() {
        let mut bus = make_bus();
        for offset in [0x210D, 0x210E, 0x212C, 0x212D, 0x2130, 0x2131, 0x2133] {
            assert_eq!(bus.write8(offset, 0xFF), Ok(()));
        }
    }

    #[test]
    fn ppu_registers_route() {
        let mut bus = make_bus();
        bus.write8(0x00_2100, 0x0F).unwrap();
        bus.write8(0x00_2105, 0x01).unwrap();
        bus.write8(0x00_2107, 0x40).unwrap();
        bus.write8(0x00_210A, 0x7C).unwrap();
        bus.write16(0x00_2116, 0x1000).unwrap();
        bus.write16(0x00_2118, 0xABCD).unwrap();
        bus.write8(0x00_2121, 0x01).unwrap();
        bus.write8(0x00_2122, 0x1F).unwrap();

        assert_eq!(bus.ppu.inidisp(), 0x0F);
        assert_eq!(bus.ppu.bgmode(), 0x01);
        assert_eq!(bus.ppu.bg_sc(0), 0x40);
        assert_eq!(bus.ppu.bg_sc(3), 0x7C);
        assert_eq!(bus.ppu.vram_addr(), 0x1001);
        assert_eq!(&bus.ppu.vram()[0x2000..0x2002], &[0xCD, 0xAB]);
        assert_eq!(bus.ppu.cgram()[2], 0x1F);
    }

    #[test]
    fn dma_registers_for_every_channel() {
        let mut bus = make_bus();
        bus.write8(0x00_4370, 0x01).unwrap();
        bus.write8(0x00_4371, 0x18).unwrap();
        bus.write16(0x00_4372, 0x2000).unwrap();
        bus.write8(0x00_4374, 0x7F).unwrap();
        bus.write16(0x00_4375, 0x0800).unwrap();

        let channel = bus.hdma.channel(7);
        assert_eq!(channel.dmap, 0x01);
        assert_eq!(channel.bbad, 0x18);
        assert_eq!(channel.source, 0x7F_2000);
        assert_eq!(channel.byte_count, 0x0800);

        assert!(matches!(
            bus.write8(0x00_4307, 0x01),
            Err(Fault::UnhandledRegister {
                offset: 0x4307,
                value: 0x01
            })
        ));
    }

    #[test]
    fn dma_page_accepts_zero_in_unused_slots() {
        let mut bus = make_bus();
        bus.write16(0x00_4306, 0x0000).unwrap();
        bus.write8(0x00_430F, 0x00).unwrap();
        bus.write16(0x00_4305, 0x0010).unwrap();
        assert_eq!(bus.hdma.channel(0).byte_count, 0x0010);

        assert!(matches!(
            bus.write16(0x00_4306, 0x0100),
            Err(Fault::UnhandledRegister {
                offset: 0x4307,
                value: 0x01
            })
        ));
    }

    #[test]
    fn mdmaen_copies_wram_to_vram() {
        let mut bus = make_bus();
        bus.wram[0x1_0000..0x1_0004].copy_from_slice(&[0x11, 0x22, 0x33, 0x44]);
        bus.write8(0x00_2115, 0x80).unwrap();
        bus.write16(0x00_2116, 0x0000).unwrap();
        bus.write8(0x00_4300, 0x01).unwrap();
        bus.write8(0x00_4301, 0x18).unwrap();
        bus.write16(0x00_4302, 0x0000).unwrap();
        bus.write8(0x00_4304, 0x7F).unwrap();
        bus.write16(0x00_4305, 0x0004).unwrap();

        bus.write8(0x00_420B, 0x01).unwrap();

        assert_eq!(&bus.ppu.vram()[0..4], &[0x11, 0x22, 0x33, 0x44]);
        assert_eq!(bus.ppu.vram_addr(), 2);
        assert_eq!(bus.hdma.channel(0).byte_count, 0);
    }

    #[test]
    fn mdmaen_fault_propagates() {
        let mut bus = make_bus();
        assert!(matches!(
            bus.write8(0x00_420B, 0x80),
            Err(Fault::Unimplemented(_))
        ));
    }

    #[test]
    fn vblank_edge_and_nmi_enable() {
        let mut bus = make_bus();
        assert!(!bus.set_vblank(true));
        assert_eq!(bus.read8(0x00_4212).unwrap(), 0x80);
        assert!(!bus.set_vblank(false));
        assert_eq!(bus.read8(0x00_4212).unwrap(), 0x00);

        bus.write8(0x00_4200, 0x80).unwrap();
        assert!(bus.set_vblank(true));
        assert!(!bus.set_vblank(true));
    }

    #[test]
    fn rdnmi_clears_on_read() {
        let mut bus = make_bus();
        bus.set_vblank(true);
        assert_eq!(bus.read8(0x00_4210).unwrap(), 0x82);
        assert_eq!(bus.read8(0x00_4210).unwrap(), 0x02);
        assert_eq!(bus.read8(0x00_4211).unwrap(), 0x00);
    }

    #[test]
    fn math_registers() {
        let mut bus = make_bus();
        bus.write8(0x00_4202, 12).unwrap();
        bus.write8(0x00_4203, 11).unwrap();
        assert_eq!(bus.read16(0x00_4216).unwrap(), 132);

        bus.write16(0x00_4204, 1000).unwrap();
        bus.write8(0x00_4206, 7).unwrap();
        assert_eq!(bus.read16(0x00_4214).unwrap(), 142);
        assert_eq!(bus.read16(0x00_4216).unwrap(), 6);
    }

    #[test]
    fn apu_ports() {
        let mut bus = make_bus();
        bus.apu.apu_write(2, 0xBB);
        assert_eq!(bus.read8(0x00_2142).unwrap(), 0xBB);
        bus.write8(0x00_2143, 0x01).unwrap();
        assert_eq!(bus.apu.apu_read(3), 0x01);
    }

    #[test]
    fn joypads_read_zero() {
        let mut bus = make_bus();
        assert_eq!(bus.read8(0x00_4016).unwrap(), 0);
        assert_eq!(bus.read16(0x00_4218).unwrap(), 0);
    }

    #[test]
    fn peek_has_no_side_effects() {
        let mut bus = make_bus();
        bus.set_vblank(true);
        assert_eq!(bus.peek(0x00_4210), None);
        assert_eq!(bus.read8(0x00_4210).unwrap(), 0x82);
        assert_eq!(bus.peek(0x00_8001), Some(0x01));
        assert_eq!(bus.peek(0xFF_0000), None);
    }
}
