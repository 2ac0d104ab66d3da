//! CHIP-8 memory subsystem.
//!
//! A flat byte store addressed by 16-bit offsets, the loader that places the
//! boot image and program into it at machine start, and the fixed-depth
//! return-address stack. All bounds checks live here; the processor only
//! sees validated block operations and a trap when a write goes wrong.

mod address_space;
mod config;
mod error;
pub mod font;
mod loader;
mod stack;

pub use address_space::AddressSpace;
pub use config::{BootImage, Chip8Model, MemoryConfig};
pub use error::{AccessError, LoadError, StackError};
pub use loader::{load_boot_image, load_program, load_program_file};
pub use stack::{CallStack, Pop};
