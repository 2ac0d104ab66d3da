//! CHIP-8 machine.
//!
//! Wires one address space, one call stack and one processor register file
//! together. The instruction decoder, timers and display are separate
//! collaborators; this crate gives them the memory contract they run on.

mod chip8;
mod registers;

pub use chip8::Chip8;
pub use chip8_memory::{BootImage, Chip8Model, MemoryConfig};
pub use registers::Registers;
