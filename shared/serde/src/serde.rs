use crate::{bit_counter::BitCounter, bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// A type that can be written to and read from a bit stream.
///
/// `PartialEq` is required so a receiver can tell whether an incoming value
/// actually differs from the one it already holds.
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the stream
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Reads a value from the stream
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits [`Serde::ser`] would write
    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::unbounded();
        self.ser(&mut counter);
        counter.bits_needed()
    }
}

/// Implemented by types whose encoding always takes the same number of bits
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
