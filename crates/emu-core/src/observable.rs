//! Observability trait for inspecting component state.
//!
//! Debuggers and dump tools read machine state through dotted query paths.
//! Queries never affect emulation state: reading a register through a query
//! does not trigger the read side effects a bus access would.

use std::fmt;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value, used for single flags.
    Bool(bool),
    /// 8-bit register or memory byte.
    U8(u8),
    /// 16-bit register.
    U16(u16),
    /// 24-bit bus address (bank in bits 16–23).
    Address(u32),
    /// Counter such as a cycle or frame total.
    U64(u64),
    /// Free-form text.
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "${v:02X}"),
            Value::U16(v) => write!(f, "${v:04X}"),
            Value::Address(v) => write!(f, "${:02X}:{:04X}", (v >> 16) & 0xFF, v & 0xFFFF),
            Value::U64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a specific property by path.
    ///
    /// Paths are hierarchical, separated by dots:
    /// - `pc` - Program counter with bank
    /// - `a` - Accumulator (full 16 bits)
    /// - `flags.m` - Accumulator width flag
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// List all available query paths.
    ///
    /// Parameterised paths such as `memory.<addr>` are listed with a
    /// placeholder.
    fn query_paths(&self) -> &'static [&'static str];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(Value::U8(0x0F).to_string(), "$0F");
        assert_eq!(Value::U16(0x1F00).to_string(), "$1F00");
        assert_eq!(Value::Address(0x7E_8000).to_string(), "$7E:8000");
        assert_eq!(Value::from(true).to_string(), "true");
    }
}
