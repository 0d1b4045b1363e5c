use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde, ConstBitLength,
};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, false, BITS>;
pub type SignedInteger<const BITS: u8> = SerdeInteger<true, false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<false, true, BITS>;
pub type SignedVariableInteger<const BITS: u8> = SerdeInteger<true, true, BITS>;

/// Integer with a configurable wire width.
///
/// Fixed integers always occupy `BITS` bits (plus a sign bit when signed).
/// Variable integers are written in groups of `BITS` bits, each group
/// preceded by a bit that says whether another group follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerdeInteger<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> {
    value: i128,
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8>
    SerdeInteger<SIGNED, VARIABLE, BITS>
{
    /// Create a new integer
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be represented with this width.
    /// Consider using `try_new` for non-panicking error handling.
    pub fn new<T: Into<i128>>(value: T) -> Self {
        match Self::try_new(value) {
            Ok(integer) => integer,
            Err(error) => panic!("{}", error),
        }
    }

    /// Create a new integer, returning an error if the value does not fit
    pub fn try_new<T: Into<i128>>(value: T) -> Result<Self, SerdeErr> {
        let value = value.into();
        Self::check(value)?;
        Ok(Self { value })
    }

    pub fn get(&self) -> i128 {
        self.value
    }

    /// Replace the value
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be represented with this width.
    pub fn set<T: Into<i128>>(&mut self, value: T) {
        *self = Self::new(value);
    }

    fn check(value: i128) -> Result<(), SerdeErr> {
        let out_of_range = SerdeErr::OutOfRange {
            type_name: "SerdeInteger",
            value,
            bits: BITS,
        };
        if BITS == 0 || BITS > 64 {
            return Err(out_of_range);
        }
        if !SIGNED && value < 0 {
            return Err(out_of_range);
        }
        if !VARIABLE && value.unsigned_abs() >= (1u128 << BITS) {
            return Err(out_of_range);
        }
        if VARIABLE && value.unsigned_abs() > u64::MAX as u128 {
            return Err(out_of_range);
        }
        Ok(())
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> Serde
    for SerdeInteger<SIGNED, VARIABLE, BITS>
{
    fn ser(&self, writer: &mut dyn BitWrite) {
        if SIGNED {
            writer.write_bit(self.value < 0);
        }

        let mut magnitude = self.value.unsigned_abs();

        if VARIABLE {
            loop {
                let proceed = magnitude >= (1u128 << BITS);
                writer.write_bit(proceed);
                for _ in 0..BITS {
                    writer.write_bit(magnitude & 1 != 0);
                    magnitude >>= 1;
                }
                if !proceed {
                    return;
                }
            }
        } else {
            for _ in 0..BITS {
                writer.write_bit(magnitude & 1 != 0);
                magnitude >>= 1;
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let negative = SIGNED && reader.read_bit()?;

        let mut magnitude: u128 = 0;
        let mut shift: u32 = 0;

        loop {
            let proceed = VARIABLE && reader.read_bit()?;
            if shift + BITS as u32 > 128 {
                return Err(SerdeErr::InvalidValue {
                    type_name: "SerdeInteger",
                    reason: "variable integer continues past 128 bits",
                });
            }
            for _ in 0..BITS {
                if reader.read_bit()? {
                    magnitude |= 1u128 << shift;
                }
                shift += 1;
            }
            if !proceed {
                break;
            }
        }

        if magnitude > u64::MAX as u128 {
            return Err(SerdeErr::InvalidValue {
                type_name: "SerdeInteger",
                reason: "magnitude exceeds 64 bits",
            });
        }
        let value = magnitude as i128;
        let value = if negative { -value } else { value };
        Ok(Self { value })
    }
}

impl<const SIGNED: bool, const BITS: u8> ConstBitLength for SerdeInteger<SIGNED, false, BITS> {
    fn const_bit_length() -> u32 {
        BITS as u32 + u32::from(SIGNED)
    }
}
