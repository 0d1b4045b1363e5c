use thiserror::Error;

/// Errors produced while reading or validating serialized data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran out of bits before the value was complete
    #[error("Unexpected end of buffer: needed {bits_needed} more bit(s) at bit offset {bit_offset}")]
    UnexpectedEnd { bit_offset: u32, bits_needed: u32 },

    /// The decoded bits do not form a valid value of the expected type
    #[error("Invalid {type_name} value on the wire: {reason}")]
    InvalidValue {
        type_name: &'static str,
        reason: &'static str,
    },

    /// A value could not be represented with the configured bit width
    #[error("Value {value} does not fit in {bits} bit(s) for {type_name}")]
    OutOfRange {
        type_name: &'static str,
        value: i128,
        bits: u8,
    },
}
