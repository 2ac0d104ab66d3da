//! Core traits and types for the CHIP-8 machine crates.
//!
//! Memory never owns the processor. Every operation that needs processor
//! state (stack pointer, trap entry) takes it as a `&mut impl Processor`
//! argument for the duration of the call.

mod fault;
mod observable;
mod processor;

pub use fault::{Fault, FaultSource};
pub use observable::{Observable, Value, parse_address};
pub use processor::{Processor, STACK_EMPTY};
