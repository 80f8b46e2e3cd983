//! Checked big-endian readers over raw font bytes.
//!
//! Font files are untrusted input, so every read is bounds checked and reports
//! [`ReadError::OutOfBounds`] instead of panicking.

use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("Read past the end of the font data")]
    OutOfBounds,
    #[error("Malformed font data: {0}")]
    Malformed(&'static str),
}

/// A borrowed view of font bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct FontData<'a> {
    bytes: &'a [u8],
}

impl<'a> FontData<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// A sub-view of `range`, or `None` if any part of it lies outside the data.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Option<FontData<'a>> {
        self.bytes.get(range).map(FontData::new)
    }

    /// Everything from `pos` to the end.
    pub fn split_off(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(pos..).map(FontData::new)
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], ReadError> {
        let end = offset.checked_add(N).ok_or(ReadError::OutOfBounds)?;
        self.bytes
            .get(offset..end)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(ReadError::OutOfBounds)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ReadError> {
        self.bytes.get(offset).copied().ok_or(ReadError::OutOfBounds)
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8, ReadError> {
        self.read_array::<1>(offset).map(i8::from_be_bytes)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, ReadError> {
        self.read_array(offset).map(u16::from_be_bytes)
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16, ReadError> {
        self.read_array(offset).map(i16::from_be_bytes)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, ReadError> {
        self.read_array(offset).map(u32::from_be_bytes)
    }

    pub fn cursor(&self) -> Cursor<'a> {
        Cursor { pos: 0, data: *self }
    }
}

/// A sequential reader over [`FontData`].
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> Cursor<'a> {
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ReadError> {
        let pos = self.pos.checked_add(n).ok_or(ReadError::OutOfBounds)?;
        if pos > self.data.len() {
            return Err(ReadError::OutOfBounds);
        }
        self.pos = pos;
        Ok(())
    }

    fn advance<T>(&mut self, value: Result<T, ReadError>, size: usize) -> Result<T, ReadError> {
        let value = value?;
        self.pos += size;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        let value = self.data.read_u8(self.pos);
        self.advance(value, 1)
    }

    pub fn read_i8(&mut self) -> Result<i8, ReadError> {
        let value = self.data.read_i8(self.pos);
        self.advance(value, 1)
    }

    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        let value = self.data.read_u16(self.pos);
        self.advance(value, 2)
    }

    pub fn read_i16(&mut self) -> Result<i16, ReadError> {
        let value = self.data.read_i16(self.pos);
        self.advance(value, 2)
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let value = self.data.read_u32(self.pos);
        self.advance(value, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::{FontData, ReadError};

    #[test]
    fn test_big_endian_reads() {
        let data = FontData::new(&[0x12, 0x34, 0xFF, 0xFE, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(data.read_u16(0), Ok(0x1234));
        assert_eq!(data.read_i16(2), Ok(-2));
        assert_eq!(data.read_u32(4), Ok(0x0001_0000));
        assert_eq!(data.read_i8(2), Ok(-1));
        assert_eq!(data.read_u32(6), Err(ReadError::OutOfBounds));
        assert_eq!(data.read_u8(8), Err(ReadError::OutOfBounds));
        assert_eq!(data.read_u16(usize::MAX), Err(ReadError::OutOfBounds));
    }

    #[test]
    fn test_slices() {
        let data = FontData::new(&[1, 2, 3, 4]);
        assert_eq!(data.slice(1..3).map(|d| d.as_bytes()), Some(&[2u8, 3][..]));
        assert!(data.slice(2..5).is_none());
        assert_eq!(data.split_off(4).map(|d| d.len()), Some(0));
        assert!(data.split_off(5).is_none());
    }

    #[test]
    fn test_cursor() {
        let data = FontData::new(&[0x00, 0x02, 0xAA, 0xBB, 0x80]);
        let mut cursor = data.cursor();
        assert_eq!(cursor.read_u16(), Ok(2));
        cursor.skip(2).unwrap();
        assert_eq!(cursor.read_i8(), Ok(-128));
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.read_u8(), Err(ReadError::OutOfBounds));
        // A failed read does not move the cursor
        assert_eq!(cursor.position(), 5);
        assert!(cursor.skip(1).is_err());
    }
}
