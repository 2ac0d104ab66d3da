//! Fault records handed to the processor's trap handler.

use std::fmt;

/// What kind of operation violated its invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaultSource {
    /// A write whose destination range leaves the address space.
    MemoryAccessOutOfBounds,
    /// A push on a full call stack (raised by processors that escalate it).
    StackOverflow,
    /// A pop on an empty call stack (raised by processors that escalate it).
    StackUnderflow,
}

impl fmt::Display for FaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MemoryAccessOutOfBounds => "memory access out of bounds",
            Self::StackOverflow => "stack overflow",
            Self::StackUnderflow => "stack underflow",
        };
        f.write_str(name)
    }
}

/// A single fault notification.
///
/// Built at the moment of the violation and moved into the trap handler;
/// the memory subsystem keeps no copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fault {
    pub source: FaultSource,
    /// Program counter at the time of the fault.
    pub instruction_address: u16,
}

impl Fault {
    #[must_use]
    pub const fn new(source: FaultSource, instruction_address: u16) -> Self {
        Self {
            source,
            instruction_address,
        }
    }

    #[must_use]
    pub const fn out_of_bounds(instruction_address: u16) -> Self {
        Self::new(FaultSource::MemoryAccessOutOfBounds, instruction_address)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at ${:04X}", self.source, self.instruction_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_source_and_address() {
        let fault = Fault::out_of_bounds(0x0204);
        assert_eq!(fault.to_string(), "memory access out of bounds at $0204");
        assert_eq!(
            Fault::new(FaultSource::StackUnderflow, 0x0ABE).to_string(),
            "stack underflow at $0ABE"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_tagged_record() {
        let json = serde_json::to_string(&Fault::out_of_bounds(0x0200)).expect("serialize");
        assert_eq!(
            json,
            r#"{"source":"MemoryAccessOutOfBounds","instruction_address":512}"#
        );
    }
}
