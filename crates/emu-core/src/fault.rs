//! Fatal emulation faults.

use std::fmt;

use thiserror::Error;

/// The kind of bus access that faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read8,
    Read16,
    Write8,
    Write16,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read8 => "read8",
            Self::Read16 => "read16",
            Self::Write8 => "write8",
            Self::Write16 => "write16",
        };
        f.write_str(name)
    }
}

/// An unrecoverable emulation error.
///
/// Real software never performs any of these operations, so each one means
/// either an emulator bug or a ROM feature the machine does not model.
/// Callers propagate faults to the top level and stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Access to a bank with nothing mapped in it.
    #[error("{access} from unmapped bank ${bank:02X} (address ${bank:02X}:{offset:04X})")]
    UnmappedBank { access: Access, bank: u8, offset: u16 },

    /// Access to an unmapped offset inside a mapped bank.
    #[error("{access} at unmapped address ${bank:02X}:{offset:04X}")]
    UnmappedAddress { access: Access, bank: u8, offset: u16 },

    /// Non-zero write to an unknown register in the $21xx/$42xx pages.
    #[error("write of ${value:02X} to unhandled register ${offset:04X}")]
    UnhandledRegister { offset: u16, value: u8 },

    /// Fetched an opcode with no handler.
    #[error("unknown opcode ${opcode:02X} at ${bank:02X}:{pc:04X}")]
    UnknownOpcode { opcode: u8, bank: u8, pc: u16 },

    /// A recognised but unsupported hardware feature.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// The emulated program broke an assumption the machine relies on.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_bank_message_names_the_bank() {
        let fault = Fault::UnmappedBank {
            access: Access::Read8,
            bank: 0xFF,
            offset: 0x1234,
        };
        assert_eq!(
            fault.to_string(),
            "read8 from unmapped bank $FF (address $FF:1234)"
        );
    }

    #[test]
    fn unknown_opcode_message() {
        let fault = Fault::UnknownOpcode {
            opcode: 0x42,
            bank: 0x00,
            pc: 0x8003,
        };
        assert_eq!(fault.to_string(), "unknown opcode $42 at $00:8003");
    }
}
