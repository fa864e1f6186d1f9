use std::io::{self, Write};

/// Write a u32 in little-endian format
pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Write a length or count that must fit in a u32 field
pub fn write_len_le<W: Write>(writer: &mut W, len: usize) -> io::Result<()> {
    let value = u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("length {len} does not fit in 32 bits"),
        )
    })?;
    write_u32_le(writer, value)
}

/// Bounds-checked cursor over an in-memory buffer
///
/// Every read reports a short buffer as an error message instead of
/// panicking, so decoders can turn it into a malformed-data error.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a u32 in little-endian format
    pub fn read_u32_le(&mut self) -> Result<u32, String> {
        let bytes = self.read_bytes(4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(word))
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], String> {
        if len > self.remaining() {
            return Err(format!(
                "unexpected end of data at offset {}: need {len} bytes, {} left",
                self.pos,
                self.remaining()
            ));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a count of items that each occupy at least `min_item_size` bytes,
    /// rejecting counts the rest of the buffer cannot possibly hold
    pub fn read_count(&mut self, min_item_size: usize) -> Result<usize, String> {
        let at = self.pos;
        let count = self.read_u32_le()? as usize;
        if count.saturating_mul(min_item_size) > self.remaining() {
            return Err(format!(
                "count {count} at offset {at} exceeds the {} bytes left",
                self.remaining()
            ));
        }
        Ok(count)
    }
}
