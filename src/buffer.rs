use crate::error::{Result, WzError};
use scroll::{ctx, Endian, Pread, LE};

/// Little-endian cursor over an archive image.
///
/// Seeking is never checked, the next read is. Many cursors may share the
/// same backing bytes.
#[derive(Debug, Clone)]
pub struct WzBuffer<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WzBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_offset(data, 0)
    }

    pub fn with_offset(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn add_offset(&mut self, value: usize) {
        self.offset = self.offset.saturating_add(value);
    }

    /// Moves to `base + delta`. A position below zero can never be read.
    pub fn seek_relative(&mut self, base: usize, delta: i32) {
        self.offset = if delta >= 0 {
            base.saturating_add(delta as usize)
        } else {
            base.checked_sub(delta.unsigned_abs() as usize)
                .unwrap_or(usize::MAX)
        };
    }

    fn read<T>(&mut self) -> Result<T>
    where
        T: ctx::TryFromCtx<'a, Endian, Error = scroll::Error>,
    {
        let offset = self.offset;
        self.data
            .gread_with::<T>(&mut self.offset, LE)
            .map_err(|_| WzError::OutOfBounds {
                offset,
                size: std::mem::size_of::<T>(),
                len: self.data.len(),
            })
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.read()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read()
    }

    /// Copies `len` bytes out of the buffer and advances past them.
    pub fn read_array(&mut self, len: usize) -> Result<Vec<u8>> {
        let slice = self.slice(self.offset, len)?;
        self.offset += len;
        Ok(slice.to_vec())
    }

    /// Borrows `len` bytes starting at `offset` without moving the cursor.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(WzError::OutOfBounds {
                offset,
                size: len,
                len: self.data.len(),
            })
    }

    /// Reads the variable width integer used for counts and sizes.
    ///
    /// A single signed byte, or `-128` followed by a full `i32`.
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        match self.read_i8()? {
            -128 => self.read_i32(),
            value => Ok(i32::from(value)),
        }
    }
}
