use std::path::PathBuf;

use thiserror::Error;

/// A block operation whose range does not fit inside the address space.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("range ${start:04X}+{len} exceeds {size}-byte address space")]
    OutOfBounds { start: u16, len: usize, size: usize },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    #[error("call stack overflow pushing ${address:04X}")]
    Overflow { address: u16 },

    #[error("call stack underflow")]
    Underflow,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program image is {len} bytes, must be smaller than the {available} bytes above the entry point")]
    ImageTooLarge { len: usize, available: usize },

    #[error("boot image is {len} bytes, must fit in the {limit} bytes below the entry point")]
    BootImageTooLarge { len: usize, limit: usize },

    #[error("cannot read program image {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
