use crate::error::SerdeErr;

/// Cursor over a received bit stream, the mirror of
/// [`BitWriter`](crate::BitWriter)
pub struct BitReader<'b> {
    buffer: &'b [u8],
    position: u32,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn bits_read(&self) -> u32 {
        self.position
    }

    /// Whole bytes touched by the bits read so far
    pub fn bytes_read(&self) -> usize {
        self.position.div_ceil(8) as usize
    }

    pub fn bits_remaining(&self) -> u32 {
        let total = u32::try_from(self.buffer.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(8);
        total.saturating_sub(self.position)
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let byte_index = (self.position / 8) as usize;
        let Some(byte) = self.buffer.get(byte_index) else {
            return Err(SerdeErr::UnexpectedEnd {
                bit_offset: self.position,
                bits_needed: 1,
            });
        };
        let bit = (byte >> (self.position % 8)) & 1 != 0;
        self.position += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        if self.bits_remaining() < 8 {
            return Err(SerdeErr::UnexpectedEnd {
                bit_offset: self.position,
                bits_needed: 8 - self.bits_remaining(),
            });
        }
        let mut output = 0u8;
        for index in 0..8 {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        let bits_needed = u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(8);
        if self.bits_remaining() < bits_needed {
            return Err(SerdeErr::UnexpectedEnd {
                bit_offset: self.position,
                bits_needed: bits_needed - self.bits_remaining(),
            });
        }
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_byte()?);
        }
        Ok(output)
    }
}
