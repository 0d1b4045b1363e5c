use crate::bit_writer::BitWrite;

/// Measures how many bits a value would take without storing them
pub struct BitCounter {
    bits_needed: u32,
    bits_free: u32,
}

impl BitCounter {
    pub fn new(bits_free: u32) -> Self {
        Self {
            bits_needed: 0,
            bits_free,
        }
    }

    /// A counter with no budget, used only for measuring
    pub fn unbounded() -> Self {
        Self::new(u32::MAX)
    }

    pub fn bits_needed(&self) -> u32 {
        self.bits_needed
    }

    pub fn bits_free(&self) -> u32 {
        self.bits_free
    }

    pub fn overflowed(&self) -> bool {
        self.bits_needed > self.bits_free
    }
}

impl BitWrite for BitCounter {
    fn write_bit(&mut self, _bit: bool) {
        self.bits_needed = self.bits_needed.saturating_add(1);
    }

    fn write_byte(&mut self, _byte: u8) {
        self.bits_needed = self.bits_needed.saturating_add(8);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let bits = u32::try_from(bytes.len()).unwrap_or(u32::MAX).saturating_mul(8);
        self.bits_needed = self.bits_needed.saturating_add(bits);
    }

    fn is_counter(&self) -> bool {
        true
    }

    fn count_bits(&mut self, bits: u32) {
        self.bits_needed = self.bits_needed.saturating_add(bits);
    }
}
