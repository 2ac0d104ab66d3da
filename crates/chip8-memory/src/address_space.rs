//! Flat byte-addressable memory and the bus operations over it.
//!
//! Data movement is validated: reads, copies and clears report a soft
//! `AccessError`, writes trap into the processor. Instruction fetch trusts
//! the program counter and does no validation of its own; a processor that
//! wants the stricter behaviour calls `checked_fetch_instruction_word`.
//!
//! Range checks are done in `usize` and by subtraction (`len <= size - start`)
//! so a 16-bit `start + len` can never wrap past the comparison.

use std::ops::Range;

use emu_core::{Fault, Observable, Processor, Value, parse_address};

use crate::AccessError;

/// Largest supported address space: every value of a 16-bit address.
const MAX_SIZE: usize = 0x1_0000;

/// The machine's entire RAM/ROM range.
///
/// Allocated once, zero-filled, never resized.
pub struct AddressSpace {
    bytes: Box<[u8]>,
}

impl AddressSpace {
    /// Create a zero-filled address space of `size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or larger than 64K.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(
            size > 0 && size <= MAX_SIZE,
            "address space must be 1..=65536 bytes, got {size}"
        );
        Self {
            bytes: vec![0; size].into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Validate `[start, start + len)` and return it as an index range.
    ///
    /// Zero-length ranges always succeed, wherever they start.
    fn range(&self, start: u16, len: usize) -> Result<Range<usize>, AccessError> {
        if len == 0 {
            return Ok(0..0);
        }
        let size = self.size();
        let first = start as usize;
        if first >= size || len > size - first {
            return Err(AccessError::OutOfBounds { start, len, size });
        }
        Ok(first..first + len)
    }

    /// Borrow `len` bytes starting at `src`.
    pub fn read_block(&self, src: u16, len: u16) -> Result<&[u8], AccessError> {
        let range = self.range(src, len as usize)?;
        Ok(&self.bytes[range])
    }

    /// Copy `bytes` into memory at `dst`.
    ///
    /// An out-of-range destination writes nothing and raises exactly one
    /// `MemoryAccessOutOfBounds` fault carrying the processor's program
    /// counter. The caller gets no status back; the trap is the report.
    pub fn write_block<P: Processor>(&mut self, cpu: &mut P, dst: u16, bytes: &[u8]) {
        match self.range(dst, bytes.len()) {
            Ok(range) => self.bytes[range].copy_from_slice(bytes),
            Err(err) => {
                let pc = cpu.program_counter();
                tracing::warn!(pc, dst, len = bytes.len(), "write faulted: {err}");
                cpu.enter_trap(Fault::out_of_bounds(pc));
            }
        }
    }

    /// Copy `len` bytes from `src` to `dst` within the address space.
    ///
    /// Both ranges are validated before anything moves. The copy runs
    /// forward one byte at a time, so an overlap with `dst < src` moves the
    /// block intact, while `dst > src` repeats the first `dst - src` bytes
    /// across the destination (a fill pattern, not a move).
    pub fn copy_block(&mut self, src: u16, dst: u16, len: u16) -> Result<(), AccessError> {
        let from = self.range(src, len as usize)?;
        let to = self.range(dst, len as usize)?;
        for (s, d) in from.zip(to) {
            let byte = self.bytes[s];
            self.bytes[d] = byte;
        }
        Ok(())
    }

    /// Zero `len` bytes starting at `dst`.
    pub fn clear_block(&mut self, dst: u16, len: u16) -> Result<(), AccessError> {
        let range = self.range(dst, len as usize)?;
        self.bytes[range].fill(0);
        Ok(())
    }

    /// Read the big-endian instruction word at `pc`.
    ///
    /// No range check: the processor guarantees `pc + 1 < size`.
    ///
    /// # Panics
    ///
    /// Panics if `pc + 1` is outside the address space. A broken program
    /// counter stops the host here instead of reading a foreign word.
    #[must_use]
    pub fn fetch_instruction_word(&self, pc: u16) -> u16 {
        let pc = pc as usize;
        u16::from_be_bytes([self.bytes[pc], self.bytes[pc + 1]])
    }

    /// Read the big-endian instruction word at `pc`, validating both bytes.
    pub fn checked_fetch_instruction_word(&self, pc: u16) -> Result<u16, AccessError> {
        let word = self.range(pc, 2)?;
        Ok(u16::from_be_bytes([
            self.bytes[word.start],
            self.bytes[word.start + 1],
        ]))
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8, AccessError> {
        self.read_block(addr, 1).map(|b| b[0])
    }

    /// Single-byte `write_block`: traps on an out-of-range address.
    pub fn write_byte<P: Processor>(&mut self, cpu: &mut P, addr: u16, value: u8) {
        self.write_block(cpu, addr, &[value]);
    }

    /// Copy of the whole address space, for consumers on other threads.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Read-only view of the whole address space.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Zero every byte.
    pub fn zero(&mut self) {
        self.bytes.fill(0);
    }

    /// Loader-only write. The caller has already checked that `data` fits
    /// at `offset`; there is no processor to trap into at load time.
    pub(crate) fn place(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }
}

impl Observable for AddressSpace {
    fn query(&self, path: &str) -> Option<Value> {
        if path == "size" {
            return Some(Value::U32(self.size() as u32));
        }
        if let Some((addr, len)) = path.split_once(':') {
            let addr = parse_address(addr)?;
            let len = len.parse().ok()?;
            return self.read_block(addr, len).ok().map(Value::from);
        }
        let addr = parse_address(path)?;
        self.read_byte(addr).ok().map(Value::U8)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["size", "<address>", "<address>:<len>"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::FaultSource;

    /// Processor stand-in that only records traps.
    #[derive(Default)]
    struct TrapLog {
        pc: u16,
        traps: Vec<Fault>,
    }

    impl Processor for TrapLog {
        fn program_counter(&self) -> u16 {
            self.pc
        }
        fn stack_pointer(&self) -> u16 {
            emu_core::STACK_EMPTY
        }
        fn increment_stack_pointer(&mut self) -> bool {
            true
        }
        fn decrement_stack_pointer(&mut self) -> bool {
            true
        }
        fn enter_trap(&mut self, fault: Fault) {
            self.traps.push(fault);
        }
    }

    #[test]
    fn new_space_is_zeroed() {
        let mem = AddressSpace::new(4096);
        assert_eq!(mem.size(), 4096);
        assert!(mem.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    #[should_panic(expected = "address space must be")]
    fn oversized_space_rejected() {
        let _ = AddressSpace::new(0x1_0001);
    }

    #[test]
    fn write_then_read_round_trip() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_block(&mut cpu, 0x0300, &[1, 2, 3, 4]);
        assert_eq!(mem.read_block(0x0300, 4), Ok(&[1u8, 2, 3, 4][..]));
        assert!(cpu.traps.is_empty());
    }

    #[test]
    fn read_up_to_last_byte() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_byte(&mut cpu, 0x0FFF, 0xEE);
        assert_eq!(mem.read_block(0x0FFE, 2), Ok(&[0x00, 0xEE][..]));
        assert_eq!(
            mem.read_block(0x0FFF, 2),
            Err(AccessError::OutOfBounds {
                start: 0x0FFF,
                len: 2,
                size: 4096
            })
        );
    }

    #[test]
    fn wrapping_range_is_rejected() {
        // 0xFFF0 + 0x20 wraps to 0x0010 in 16 bits.
        let mem = AddressSpace::new(0x1_0000);
        assert!(mem.read_block(0xFFF0, 0x20).is_err());
        assert!(mem.read_block(0xFFF0, 0x10).is_ok());
    }

    #[test]
    fn out_of_bounds_write_traps_once_and_writes_nothing() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog {
            pc: 0x0234,
            ..TrapLog::default()
        };
        mem.write_block(&mut cpu, 0x0FFE, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(cpu.traps.len(), 1);
        assert_eq!(cpu.traps[0].source, FaultSource::MemoryAccessOutOfBounds);
        assert_eq!(cpu.traps[0].instruction_address, 0x0234);
        assert!(mem.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_length_operations_succeed_anywhere() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        assert_eq!(mem.read_block(0xFFFF, 0), Ok(&[][..]));
        assert_eq!(mem.clear_block(0x2000, 0), Ok(()));
        assert_eq!(mem.copy_block(0x5000, 0x6000, 0), Ok(()));
        mem.write_block(&mut cpu, 0x8000, &[]);
        assert!(cpu.traps.is_empty());
    }

    #[test]
    fn clear_touches_only_its_range() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_block(&mut cpu, 0x0100, &[0xFF; 16]);
        mem.clear_block(0x0104, 8).expect("in range");
        let block = mem.read_block(0x0100, 16).expect("in range");
        assert_eq!(&block[..4], &[0xFF; 4]);
        assert_eq!(&block[4..12], &[0x00; 8]);
        assert_eq!(&block[12..], &[0xFF; 4]);
    }

    #[test]
    fn clear_out_of_range_is_soft() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_byte(&mut cpu, 0x0FFF, 0x11);
        assert!(mem.clear_block(0x0FF0, 0x20).is_err());
        assert_eq!(mem.read_byte(0x0FFF), Ok(0x11));
    }

    #[test]
    fn copy_down_over_overlap_moves_block() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_block(&mut cpu, 0x0402, &[1, 2, 3, 4]);
        mem.copy_block(0x0402, 0x0400, 4).expect("in range");
        assert_eq!(mem.read_block(0x0400, 4), Ok(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn copy_up_over_overlap_repeats_pattern() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_block(&mut cpu, 0x0400, &[1, 2, 3, 4]);
        mem.copy_block(0x0400, 0x0402, 4).expect("in range");
        assert_eq!(mem.read_block(0x0400, 6), Ok(&[1u8, 2, 1, 2, 1, 2][..]));
    }

    #[test]
    fn copy_with_bad_destination_moves_nothing() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_block(&mut cpu, 0x0200, &[9; 8]);
        let before = mem.snapshot();
        assert!(mem.copy_block(0x0200, 0x0FFC, 8).is_err());
        assert!(mem.copy_block(0x0FFC, 0x0200, 8).is_err());
        assert_eq!(mem.snapshot(), before);
    }

    #[test]
    fn fetch_composes_big_endian() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_block(&mut cpu, 0x01FE, &[0xA2, 0x34]);
        assert_eq!(mem.fetch_instruction_word(0x01FE), 0xA234);
        assert_eq!(mem.checked_fetch_instruction_word(0x01FE), Ok(0xA234));
    }

    #[test]
    fn checked_fetch_rejects_last_byte() {
        let mem = AddressSpace::new(4096);
        assert!(mem.checked_fetch_instruction_word(0x0FFF).is_err());
        assert_eq!(mem.checked_fetch_instruction_word(0x0FFE), Ok(0));
    }

    #[test]
    #[should_panic]
    fn unchecked_fetch_past_end_panics() {
        let mem = AddressSpace::new(4096);
        let _ = mem.fetch_instruction_word(0x0FFF);
    }

    #[test]
    fn query_paths_resolve() {
        let mut mem = AddressSpace::new(4096);
        let mut cpu = TrapLog::default();
        mem.write_block(&mut cpu, 0x0200, &[0x12, 0x34]);
        assert_eq!(mem.query("size"), Some(Value::U32(4096)));
        assert_eq!(mem.query("$0201"), Some(Value::U8(0x34)));
        assert_eq!(mem.query("0x200:2"), Some(Value::Bytes(vec![0x12, 0x34])));
        assert_eq!(mem.query("$1000"), None);
        assert_eq!(mem.query("bogus"), None);
    }
}
