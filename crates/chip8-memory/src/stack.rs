//! Fixed-depth return-address stack.
//!
//! The stack owns the slots; the processor owns the stack pointer. Every
//! pointer move goes through the processor's increment/decrement so the two
//! can never disagree about depth.

use emu_core::{Observable, Processor, STACK_EMPTY, Value};

use crate::StackError;

/// Return-address storage for subroutine call/return.
pub struct CallStack {
    slots: Box<[u16]>,
}

/// Outcome of a pop.
///
/// `address` is `None` when the pointer was already at the empty sentinel
/// and no slot was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Pop {
    pub address: Option<u16>,
    pub underflow: bool,
}

impl Pop {
    /// Store the popped address into `target`, leaving it untouched when
    /// nothing was read. Returns the underflow flag.
    pub fn write_into(self, target: &mut u16) -> bool {
        if let Some(address) = self.address {
            *target = address;
        }
        self.underflow
    }

    pub fn into_result(self) -> Result<u16, StackError> {
        match self.address {
            Some(address) if !self.underflow => Ok(address),
            _ => Err(StackError::Underflow),
        }
    }
}

impl CallStack {
    /// # Panics
    ///
    /// Panics if `capacity` is zero or would reach the empty sentinel.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 0 && capacity < STACK_EMPTY as usize,
            "call stack capacity must be 1..{STACK_EMPTY}, got {capacity}"
        );
        Self {
            slots: vec![0; capacity].into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Push a return address.
    ///
    /// The pointer is incremented first. On overflow nothing is written and
    /// the top slot keeps its value.
    pub fn push<P: Processor>(&mut self, cpu: &mut P, address: u16) -> Result<(), StackError> {
        if cpu.increment_stack_pointer() {
            return Err(StackError::Overflow { address });
        }
        let sp = cpu.stack_pointer();
        match self.slots.get_mut(sp as usize) {
            Some(slot) => {
                *slot = address;
                Ok(())
            }
            None => {
                // Processor allows a deeper stack than we hold: step back so
                // the pointer still names the top occupied slot.
                tracing::warn!(sp, capacity = self.capacity(), "stack pointer past last slot");
                cpu.decrement_stack_pointer();
                Err(StackError::Overflow { address })
            }
        }
    }

    /// Pop a return address.
    ///
    /// The slot is read at the current pointer before the decrement; the
    /// decrement is attempted even when the stack is empty, and its
    /// underflow report is passed back unchanged.
    ///
    /// A pointer past the last slot names nothing this stack wrote. It is
    /// pulled back to the top slot and the pop proceeds from there.
    pub fn pop<P: Processor>(&self, cpu: &mut P) -> Pop {
        let mut sp = cpu.stack_pointer();
        if sp != STACK_EMPTY && sp as usize >= self.slots.len() {
            tracing::warn!(sp, capacity = self.capacity(), "stack pointer past last slot");
            while sp != STACK_EMPTY && sp as usize >= self.slots.len() {
                if cpu.decrement_stack_pointer() {
                    break;
                }
                sp = cpu.stack_pointer();
            }
        }
        let address = if sp == STACK_EMPTY {
            None
        } else {
            self.slots.get(sp as usize).copied()
        };
        let underflow = cpu.decrement_stack_pointer();
        Pop { address, underflow }
    }

    /// Slot contents, whether or not the slot is currently in use.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<u16> {
        self.slots.get(index).copied()
    }

    /// Occupied slots for the given stack pointer, bottom first.
    #[must_use]
    pub fn entries(&self, stack_pointer: u16) -> &[u16] {
        if stack_pointer == STACK_EMPTY {
            return &[];
        }
        let top = (stack_pointer as usize + 1).min(self.slots.len());
        &self.slots[..top]
    }

    /// Zero every slot (machine reset).
    pub fn clear(&mut self) {
        self.slots.fill(0);
    }
}

impl Observable for CallStack {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "capacity" => Some(Value::U32(self.capacity() as u32)),
            _ => {
                let index: usize = path.parse().ok()?;
                self.slot(index).map(Value::U16)
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["capacity", "<slot>"]
    }
}
