//! # Netbind Serde
//! Bit-level serialization for replicated properties, RPC arguments and
//! delta payloads. Values are written least-significant bit first.

mod bit_counter;
mod bit_reader;
mod bit_writer;
mod constants;
mod error;
mod impls;
mod integer;
mod number;
mod serde;

pub use bit_counter::BitCounter;
pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use constants::{MTU_SIZE_BITS, MTU_SIZE_BYTES};
pub use error::SerdeErr;
pub use integer::{
    SerdeInteger, SignedInteger, SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};
pub use number::{SerdeFloat, SignedFloat, SignedVariableFloat, UnsignedFloat};
pub use serde::{ConstBitLength, Serde};
