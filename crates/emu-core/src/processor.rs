//! Processor capability trait.

use crate::Fault;

/// Stack pointer value meaning "nothing pushed yet".
///
/// Valid slot indices are `0..capacity`; the sentinel sits outside any
/// supported capacity so it can never alias a slot.
pub const STACK_EMPTY: u16 = 0xFFFF;

/// The slice of processor state the memory subsystem is allowed to touch.
///
/// The processor owns the program counter and the stack pointer. Memory
/// reads them, asks the processor to move the stack pointer, and reports
/// faults through `enter_trap`. It is handed in per call, the same way a
/// CPU is handed a bus per tick, so memory never holds a reference to it.
pub trait Processor {
    /// Address of the instruction currently in flight.
    fn program_counter(&self) -> u16;

    /// Current stack pointer: a slot index, or [`STACK_EMPTY`].
    fn stack_pointer(&self) -> u16;

    /// Move the stack pointer up one slot.
    ///
    /// Returns `true` on overflow, in which case the pointer is unchanged.
    fn increment_stack_pointer(&mut self) -> bool;

    /// Move the stack pointer down one slot.
    ///
    /// Returns `true` on underflow, in which case the pointer is unchanged.
    fn decrement_stack_pointer(&mut self) -> bool;

    /// Trap entry point. Called synchronously, once per violation, before
    /// the violating operation returns.
    fn enter_trap(&mut self, fault: Fault);
}
