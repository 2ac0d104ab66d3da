//! Processor register file.
//!
//! Only the state the memory subsystem talks to: program counter, stack
//! pointer and a latch for the last trap. Instruction decode lives with the
//! processor core, not here.

use emu_core::{Fault, Processor, STACK_EMPTY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub pc: u16,
    /// Stack slot index of the top entry, or `STACK_EMPTY`.
    pub sp: u16,
    /// Number of stack slots the pointer may index.
    stack_depth: u16,
    trap: Option<Fault>,
    trap_count: u32,
}

impl Registers {
    #[must_use]
    pub fn new(entry: u16, stack_depth: u16) -> Self {
        Self {
            pc: entry,
            sp: STACK_EMPTY,
            stack_depth,
            trap: None,
            trap_count: 0,
        }
    }

    /// Back to power-on state at `entry`.
    pub fn reset(&mut self, entry: u16) {
        *self = Self::new(entry, self.stack_depth);
    }

    /// The most recent trap, if one has not been handled yet.
    #[must_use]
    pub fn pending_trap(&self) -> Option<Fault> {
        self.trap
    }

    /// Hand the pending trap to the caller's handler.
    pub fn take_trap(&mut self) -> Option<Fault> {
        self.trap.take()
    }

    /// Traps entered since reset.
    #[must_use]
    pub fn trap_count(&self) -> u32 {
        self.trap_count
    }

    /// Occupied stack slots.
    #[must_use]
    pub fn stack_len(&self) -> u16 {
        if self.sp == STACK_EMPTY { 0 } else { self.sp + 1 }
    }
}

impl Processor for Registers {
    fn program_counter(&self) -> u16 {
        self.pc
    }

    fn stack_pointer(&self) -> u16 {
        self.sp
    }

    fn increment_stack_pointer(&mut self) -> bool {
        let next = if self.sp == STACK_EMPTY { 0 } else { self.sp + 1 };
        if next >= self.stack_depth {
            return true;
        }
        self.sp = next;
        false
    }

    fn decrement_stack_pointer(&mut self) -> bool {
        match self.sp {
            STACK_EMPTY => true,
            0 => {
                self.sp = STACK_EMPTY;
                false
            }
            sp => {
                self.sp = sp - 1;
                false
            }
        }
    }

    fn enter_trap(&mut self, fault: Fault) {
        tracing::debug!(%fault, "trap entered");
        self.trap = Some(fault);
        self.trap_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_walks_from_sentinel_to_top_and_back() {
        let mut regs = Registers::new(0x200, 2);
        assert!(!regs.increment_stack_pointer());
        assert_eq!(regs.sp, 0);
        assert!(!regs.increment_stack_pointer());
        assert_eq!(regs.sp, 1);
        assert!(regs.increment_stack_pointer());
        assert_eq!(regs.sp, 1);
        assert_eq!(regs.stack_len(), 2);

        assert!(!regs.decrement_stack_pointer());
        assert!(!regs.decrement_stack_pointer());
        assert_eq!(regs.sp, STACK_EMPTY);
        assert!(regs.decrement_stack_pointer());
        assert_eq!(regs.sp, STACK_EMPTY);
        assert_eq!(regs.stack_len(), 0);
    }

    #[test]
    fn trap_latch_counts_and_clears() {
        let mut regs = Registers::new(0x200, 16);
        regs.enter_trap(Fault::out_of_bounds(0x0204));
        regs.enter_trap(Fault::out_of_bounds(0x0206));
        assert_eq!(regs.trap_count(), 2);
        assert_eq!(regs.take_trap(), Some(Fault::out_of_bounds(0x0206)));
        assert_eq!(regs.pending_trap(), None);

        regs.reset(0x600);
        assert_eq!(regs.pc, 0x600);
        assert_eq!(regs.trap_count(), 0);
    }
}
