use netbind_serde::{BitReader, BitWrite, SerdeErr};

use crate::PropertyIndex;

/// Fixed-width set of dirty bits, one per declared property of a component
/// type. Bit `n` set means property `n` has changes not yet consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffMask {
    mask: Vec<u8>,
    bit_count: u8,
}

impl DiffMask {
    pub fn new(bit_count: u8) -> Self {
        Self {
            mask: vec![0; (bit_count as usize).div_ceil(8)],
            bit_count,
        }
    }

    pub fn bit_count(&self) -> u8 {
        self.bit_count
    }

    /// Returns false for indices outside the mask
    pub fn bit(&self, index: PropertyIndex) -> bool {
        if index >= self.bit_count {
            return false;
        }
        let byte = self.mask[(index / 8) as usize];
        byte & (1 << (index % 8)) != 0
    }

    /// Sets or lowers one bit. Returns false, changing nothing, when the
    /// index is outside the mask.
    pub fn set_bit(&mut self, index: PropertyIndex, value: bool) -> bool {
        if index >= self.bit_count {
            return false;
        }
        let byte = &mut self.mask[(index / 8) as usize];
        if value {
            *byte |= 1 << (index % 8);
        } else {
            *byte &= !(1 << (index % 8));
        }
        true
    }

    pub fn clear(&mut self) {
        self.mask.iter_mut().for_each(|byte| *byte = 0);
    }

    pub fn set_all(&mut self) {
        for index in 0..self.bit_count {
            self.set_bit(index, true);
        }
    }

    pub fn is_clear(&self) -> bool {
        self.mask.iter().all(|byte| *byte == 0)
    }

    pub fn count_ones(&self) -> u32 {
        self.mask.iter().map(|byte| byte.count_ones()).sum()
    }

    /// Raises every bit raised in `other`
    pub fn or(&mut self, other: &DiffMask) {
        for (byte, other_byte) in self.mask.iter_mut().zip(other.mask.iter()) {
            *byte |= *other_byte;
        }
    }

    /// Lowers every bit raised in `other`
    pub fn subtract(&mut self, other: &DiffMask) {
        for (byte, other_byte) in self.mask.iter_mut().zip(other.mask.iter()) {
            *byte &= !*other_byte;
        }
    }

    /// Indices of raised bits, ascending
    pub fn set_indices(&self) -> impl Iterator<Item = PropertyIndex> + '_ {
        (0..self.bit_count).filter(move |index| self.bit(*index))
    }

    /// Writes exactly `bit_count` bits, index 0 first
    pub fn write_bits(&self, writer: &mut dyn BitWrite) {
        for index in 0..self.bit_count {
            writer.write_bit(self.bit(index));
        }
    }

    /// Reads a mask whose width the receiver already knows
    pub fn read_bits(reader: &mut BitReader, bit_count: u8) -> Result<Self, SerdeErr> {
        let mut mask = Self::new(bit_count);
        for index in 0..bit_count {
            mask.set_bit(index, reader.read_bit()?);
        }
        Ok(mask)
    }
}
