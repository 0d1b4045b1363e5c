use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, integer::SerdeInteger,
    serde::Serde,
};

pub type UnsignedFloat<const BITS: u8, const FRACTION_DIGITS: u8> =
    SerdeFloat<false, false, BITS, FRACTION_DIGITS>;
pub type SignedFloat<const BITS: u8, const FRACTION_DIGITS: u8> =
    SerdeFloat<true, false, BITS, FRACTION_DIGITS>;
pub type SignedVariableFloat<const BITS: u8, const FRACTION_DIGITS: u8> =
    SerdeFloat<true, true, BITS, FRACTION_DIGITS>;

/// Fixed-point float, stored as an integer scaled by `10^FRACTION_DIGITS`.
///
/// Two inputs that round to the same scaled integer are equal and encode to
/// identical bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerdeFloat<const SIGNED: bool, const VARIABLE: bool, const BITS: u8, const FRACTION_DIGITS: u8> {
    inner: SerdeInteger<SIGNED, VARIABLE, BITS>,
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8, const FRACTION_DIGITS: u8>
    SerdeFloat<SIGNED, VARIABLE, BITS, FRACTION_DIGITS>
{
    /// Create a new quantized float
    ///
    /// # Panics
    ///
    /// Panics if the scaled value does not fit in `BITS` bits, or is not finite.
    /// Consider using `try_new` for non-panicking error handling.
    pub fn new(value: f32) -> Self {
        match Self::try_new(value) {
            Ok(float) => float,
            Err(error) => panic!("{}", error),
        }
    }

    pub fn try_new(value: f32) -> Result<Self, SerdeErr> {
        if !value.is_finite() {
            return Err(SerdeErr::InvalidValue {
                type_name: "SerdeFloat",
                reason: "value is not finite",
            });
        }
        let scaled = (value * Self::scale()).round() as i128;
        Ok(Self {
            inner: SerdeInteger::try_new(scaled)?,
        })
    }

    pub fn get(&self) -> f32 {
        self.inner.get() as f32 / Self::scale()
    }

    /// Replace the value
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`SerdeFloat::new`].
    pub fn set(&mut self, value: f32) {
        *self = Self::new(value);
    }

    fn scale() -> f32 {
        10f32.powi(FRACTION_DIGITS as i32)
    }
}

impl<const S: bool, const V: bool, const B: u8, const F: u8> Serde for SerdeFloat<S, V, B, F> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.inner.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            inner: SerdeInteger::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.inner.bit_length()
    }
}
