/// Largest payload, in bytes, that fits in one unfragmented packet
pub const MTU_SIZE_BYTES: usize = 430;
/// [`MTU_SIZE_BYTES`] expressed in bits
pub const MTU_SIZE_BITS: u32 = (MTU_SIZE_BYTES * 8) as u32;
