use log::trace;

use netbind_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::Strictness;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializerMode {
    Write,
    Read,
}

/// Object-safe view of a [`Serde`] value, so serializers can be used
/// behind `dyn` by component implementations.
pub trait SerdeValue {
    fn write_value(&self, writer: &mut dyn BitWrite);

    /// Replaces the value with the one read from the stream. Returns whether
    /// the value actually changed, meaning its wire encoding differs from the
    /// one already held.
    fn read_value(&mut self, reader: &mut BitReader) -> Result<bool, SerdeErr>;
}

impl<T: Serde> SerdeValue for T {
    fn write_value(&self, writer: &mut dyn BitWrite) {
        self.ser(writer);
    }

    fn read_value(&mut self, reader: &mut BitReader) -> Result<bool, SerdeErr> {
        let incoming = T::de(reader)?;
        // NaN and signed zero make PartialEq disagree with the wire
        if encoding(&incoming) == encoding(self) {
            return Ok(false);
        }
        *self = incoming;
        Ok(true)
    }
}

fn encoding<T: Serde>(value: &T) -> (u32, Vec<u8>) {
    let mut writer = BitWriter::unbounded();
    value.ser(&mut writer);
    (writer.bits_written(), writer.to_bytes())
}

/// Bidirectional serializer handed to components during a delta pass.
///
/// Whether it encodes or decodes is fixed when it is constructed, so the
/// same component code drives both directions.
pub trait Serializer {
    fn mode(&self) -> SerializerMode;

    /// Bits written or consumed since the serializer was created
    fn bit_position(&self) -> u32;

    /// Cumulative size in whole bytes
    fn size(&self) -> u32 {
        self.bit_position().div_ceil(8)
    }

    /// Lower the "value actually changed" flag
    fn clear_tracked_changes(&mut self);

    /// Whether any value changed since the flag was last lowered
    fn tracked_changes(&self) -> bool;

    fn strictness(&self) -> Strictness {
        Strictness::default()
    }

    /// Encode or decode one named value
    fn serialize(&mut self, value: &mut dyn SerdeValue, name: &'static str) -> Result<(), SerdeErr>;
}

/// Encodes values into a [`BitWriter`]. Every write counts as a change.
pub struct WriteSerializer<'w> {
    writer: &'w mut BitWriter,
    tracked_changes: bool,
    strictness: Strictness,
}

impl<'w> WriteSerializer<'w> {
    pub fn new(writer: &'w mut BitWriter, strictness: Strictness) -> Self {
        Self {
            writer,
            tracked_changes: false,
            strictness,
        }
    }
}

impl Serializer for WriteSerializer<'_> {
    fn mode(&self) -> SerializerMode {
        SerializerMode::Write
    }

    fn bit_position(&self) -> u32 {
        self.writer.bits_written()
    }

    fn clear_tracked_changes(&mut self) {
        self.tracked_changes = false;
    }

    fn tracked_changes(&self) -> bool {
        self.tracked_changes
    }

    fn strictness(&self) -> Strictness {
        self.strictness
    }

    fn serialize(&mut self, value: &mut dyn SerdeValue, name: &'static str) -> Result<(), SerdeErr> {
        value.write_value(self.writer);
        self.tracked_changes = true;
        trace!("wrote {} (now at bit {})", name, self.writer.bits_written());
        Ok(())
    }
}

/// Decodes values from a [`BitReader`], raising the change flag only when
/// the decoded value differs from the one already held.
pub struct ReadSerializer<'r, 'b> {
    reader: &'r mut BitReader<'b>,
    tracked_changes: bool,
    strictness: Strictness,
}

impl<'r, 'b> ReadSerializer<'r, 'b> {
    pub fn new(reader: &'r mut BitReader<'b>, strictness: Strictness) -> Self {
        Self {
            reader,
            tracked_changes: false,
            strictness,
        }
    }
}

impl Serializer for ReadSerializer<'_, '_> {
    fn mode(&self) -> SerializerMode {
        SerializerMode::Read
    }

    fn bit_position(&self) -> u32 {
        self.reader.bits_read()
    }

    fn clear_tracked_changes(&mut self) {
        self.tracked_changes = false;
    }

    fn tracked_changes(&self) -> bool {
        self.tracked_changes
    }

    fn strictness(&self) -> Strictness {
        self.strictness
    }

    fn serialize(&mut self, value: &mut dyn SerdeValue, name: &'static str) -> Result<(), SerdeErr> {
        if value.read_value(self.reader)? {
            self.tracked_changes = true;
        }
        trace!("read {} (now at bit {})", name, self.reader.bits_read());
        Ok(())
    }
}
