//! Top-level CHIP-8 machine.
//!
//! Owns exactly one address space, one call stack and one register file.
//! Memory operations borrow the registers for the duration of each call,
//! so several machines can live side by side without shared state.

use std::path::Path;

use chip8_memory::{
    AccessError, AddressSpace, CallStack, Chip8Model, LoadError, MemoryConfig, Pop, StackError,
    load_boot_image, load_program, load_program_file,
};
use emu_core::{Fault, Observable, Value};

use crate::registers::Registers;

/// CHIP-8 machine.
pub struct Chip8 {
    regs: Registers,
    memory: AddressSpace,
    stack: CallStack,
    config: MemoryConfig,
    /// Last program image loaded, replayed on reset.
    program: Option<Vec<u8>>,
}

impl Chip8 {
    /// Create a machine with zeroed memory and the boot image in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the boot image does not fit below the entry point.
    pub fn new(config: MemoryConfig) -> Result<Self, LoadError> {
        config.validate()?;
        let model = config.model;
        let mut chip8 = Self {
            regs: Registers::new(model.entry_point(), model.stack_capacity() as u16),
            memory: AddressSpace::new(model.memory_size()),
            stack: CallStack::new(model.stack_capacity()),
            config,
            program: None,
        };
        chip8.write_boot_image()?;
        Ok(chip8)
    }

    /// Machine start: clear memory, write the boot image and load the
    /// program image at `path`.
    ///
    /// Returns whether the program loaded. On failure the boot image is
    /// still in place and the reason has been logged; the caller decides
    /// whether to keep going.
    pub fn init(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.memory.zero();
        self.program = None;
        if let Err(err) = self.write_boot_image() {
            tracing::error!("boot image: {err}");
            return false;
        }

        let entry = self.entry_point();
        match load_program_file(&mut self.memory, entry, path) {
            Ok(len) => {
                self.program = self
                    .memory
                    .read_block(entry, len as u16)
                    .ok()
                    .map(<[u8]>::to_vec);
                tracing::info!(path = %path.display(), len, "program loaded");
                true
            }
            Err(err) => {
                tracing::error!("{err}");
                false
            }
        }
    }

    /// Load a program image held in memory (no file) at the entry point.
    pub fn load_program(&mut self, image: &[u8]) -> Result<usize, LoadError> {
        let entry = self.entry_point();
        let len = load_program(&mut self.memory, entry, image)?;
        self.program = Some(image.to_vec());
        Ok(len)
    }

    /// Power-cycle: zero memory and stack, reset registers, rewrite the boot
    /// image and reload the last program.
    pub fn reset(&mut self) {
        let entry = self.entry_point();
        self.memory.zero();
        self.stack.clear();
        self.regs.reset(entry);
        // Both images were accepted before, so they still fit.
        if let Err(err) = self.write_boot_image() {
            tracing::error!("boot image: {err}");
        }
        if let Some(program) = &self.program {
            if let Err(err) = load_program(&mut self.memory, entry, program) {
                tracing::error!("program reload: {err}");
            }
        }
    }

    fn write_boot_image(&mut self) -> Result<(), LoadError> {
        let boot = self.config.boot_bytes();
        let entry = self.entry_point();
        load_boot_image(&mut self.memory, &boot, entry)
    }

    // Bus operations

    pub fn read_block(&self, src: u16, len: u16) -> Result<&[u8], AccessError> {
        self.memory.read_block(src, len)
    }

    /// Write `bytes` at `dst`; an out-of-range write traps (see
    /// [`Registers::take_trap`]) and leaves memory unchanged.
    pub fn write_block(&mut self, dst: u16, bytes: &[u8]) {
        self.memory.write_block(&mut self.regs, dst, bytes);
    }

    pub fn copy_block(&mut self, src: u16, dst: u16, len: u16) -> Result<(), AccessError> {
        self.memory.copy_block(src, dst, len)
    }

    pub fn clear_block(&mut self, dst: u16, len: u16) -> Result<(), AccessError> {
        self.memory.clear_block(dst, len)
    }

    /// Fetch the instruction word at the program counter (unchecked).
    #[must_use]
    pub fn fetch_instruction_word(&self) -> u16 {
        self.memory.fetch_instruction_word(self.regs.pc)
    }

    // Call stack

    pub fn push(&mut self, address: u16) -> Result<(), StackError> {
        self.stack.push(&mut self.regs, address)
    }

    pub fn pop(&mut self) -> Pop {
        self.stack.pop(&mut self.regs)
    }

    // Accessors

    #[must_use]
    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[must_use]
    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    #[must_use]
    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    #[must_use]
    pub fn model(&self) -> Chip8Model {
        self.config.model
    }

    #[must_use]
    pub fn entry_point(&self) -> u16 {
        self.config.model.entry_point()
    }

    /// Length of the loaded program image, if any.
    #[must_use]
    pub fn program_len(&self) -> Option<usize> {
        self.program.as_ref().map(Vec::len)
    }

    /// Hand the pending trap to the caller's handler.
    pub fn take_trap(&mut self) -> Option<Fault> {
        self.regs.take_trap()
    }
}

impl Observable for Chip8 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            match rest {
                "pc" => Some(self.regs.pc.into()),
                "sp" => Some(self.regs.sp.into()),
                "trap" => Some(
                    self.regs
                        .pending_trap()
                        .map_or_else(|| "none".into(), |fault| fault.to_string().into()),
                ),
                "trap_pending" => Some(self.regs.pending_trap().is_some().into()),
                "trap_count" => Some(self.regs.trap_count().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            match rest {
                "entry" => Some(self.entry_point().into()),
                _ => self.memory.query(rest),
            }
        } else if let Some(rest) = path.strip_prefix("stack.") {
            match rest {
                "depth" => Some(self.regs.stack_len().into()),
                "entries" => Some(Value::Array(
                    self.stack
                        .entries(self.regs.sp)
                        .iter()
                        .map(|&addr| addr.into())
                        .collect(),
                )),
                _ => self.stack.query(rest),
            }
        } else {
            match path {
                "model" => Some(self.model().name().into()),
                "program.len" => Some(self.program_len().map_or(0, |len| len as u32).into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "model",
            "program.len",
            "cpu.pc",
            "cpu.sp",
            "cpu.trap",
            "cpu.trap_pending",
            "cpu.trap_count",
            "memory.size",
            "memory.entry",
            "memory.<address>",
            "memory.<address>:<len>",
            "stack.capacity",
            "stack.depth",
            "stack.entries",
            "stack.<slot>",
        ]
    }
}
