use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, integer::UnsignedVariableInteger,
    serde::{ConstBitLength, Serde},
};

// Unit

impl Serde for () {
    fn ser(&self, _writer: &mut dyn BitWrite) {}

    fn de(_reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(())
    }

    fn bit_length(&self) -> u32 {
        0
    }
}

impl ConstBitLength for () {
    fn const_bit_length() -> u32 {
        0
    }
}

// Boolean

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// Fixed-width primitives, little-endian byte order

macro_rules! impl_serde_for_primitive {
    ($($ty:ty),*) => {$(
        impl Serde for $ty {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$ty>::from_le_bytes(bytes))
            }

            fn bit_length(&self) -> u32 {
                <Self as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $ty {
            fn const_bit_length() -> u32 {
                (std::mem::size_of::<$ty>() * 8) as u32
            }
        }
    )*};
}

impl_serde_for_primitive!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

// Lengths

pub(crate) fn write_length(writer: &mut dyn BitWrite, length: usize) {
    UnsignedVariableInteger::<7>::new(length as u64).ser(writer);
}

pub(crate) fn read_length(reader: &mut BitReader) -> Result<usize, SerdeErr> {
    let length = UnsignedVariableInteger::<7>::de(reader)?.get();
    usize::try_from(length).map_err(|_| SerdeErr::InvalidValue {
        type_name: "length",
        reason: "length exceeds addressable memory",
    })
}

// Containers

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_length(writer, self.len());
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = read_length(reader)?;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidValue {
            type_name: "String",
            reason: "bytes are not valid UTF-8",
        })
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_length(writer, self.len());
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = read_length(reader)?;
        // at most one element per remaining bit, which also bounds
        // elements that take no bits at all
        if length > reader.bits_remaining() as usize {
            return Err(SerdeErr::InvalidValue {
                type_name: "Vec",
                reason: "length exceeds the bits left in the buffer",
            });
        }
        // never trust the wire with a pre-allocation
        let mut output = Vec::with_capacity(length.min(64));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

impl<A: Serde, B: Serde> Serde for (A, B) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?))
    }
}

impl<A: Serde, B: Serde, C: Serde> Serde for (A, B, C) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
        self.2.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?, C::de(reader)?))
    }
}
