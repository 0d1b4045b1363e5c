use crate::{bit_counter::BitCounter, constants::MTU_SIZE_BITS};

/// Sink for bit-level output. Implemented by [`BitWriter`], which stores the
/// bits, and by [`BitCounter`], which only measures them.
pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);
    fn write_byte(&mut self, byte: u8);
    fn is_counter(&self) -> bool;
    fn count_bits(&mut self, bits: u32);

    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }
}

/// Growable bit buffer. Bits are packed least-significant first into each
/// byte, so the first bit written becomes bit 0 of byte 0.
pub struct BitWriter {
    buffer: Vec<u8>,
    bits_written: u32,
    max_bits: u32,
}

impl BitWriter {
    /// A writer whose budget is one MTU-sized packet
    pub fn new() -> Self {
        Self::with_max_bits(MTU_SIZE_BITS)
    }

    /// A writer with no practical budget, used for per-entity payloads and
    /// migration hand-offs which are framed separately
    pub fn unbounded() -> Self {
        Self::with_max_bits(u32::MAX)
    }

    pub fn with_max_bytes(max_bytes: usize) -> Self {
        let max_bits = u32::try_from(max_bytes.saturating_mul(8)).unwrap_or(u32::MAX);
        Self::with_max_bits(max_bits)
    }

    fn with_max_bits(max_bits: u32) -> Self {
        Self {
            buffer: Vec::with_capacity(64),
            bits_written: 0,
            max_bits,
        }
    }

    pub fn bits_written(&self) -> u32 {
        self.bits_written
    }

    /// Whole bytes occupied by the bits written so far
    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    /// Bits that may still be written before the budget is exhausted
    pub fn bits_free(&self) -> u32 {
        self.max_bits.saturating_sub(self.bits_written)
    }

    /// A counter primed with this writer's remaining budget. Serialize into
    /// it first to learn whether a value fits without touching the buffer.
    pub fn counter(&self) -> BitCounter {
        BitCounter::new(self.bits_free())
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        let offset = self.bits_written % 8;
        if offset == 0 {
            self.buffer.push(0);
        }
        if bit {
            if let Some(last) = self.buffer.last_mut() {
                *last |= 1 << offset;
            }
        }
        self.bits_written += 1;
    }

    fn write_byte(&mut self, byte: u8) {
        let mut temp = byte;
        for _ in 0..8 {
            self.write_bit(temp & 1 != 0);
            temp >>= 1;
        }
    }

    fn is_counter(&self) -> bool {
        false
    }

    fn count_bits(&mut self, _bits: u32) {
        // only meaningful for counters
    }
}
