//! Binary reading and writing utilities for the frame and input codecs.
//!
//! All values are little-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// A reader for parsing binary messages.
#[derive(Debug)]
pub struct BinaryReader {
    buf: Bytes,
}

impl BinaryReader {
    /// Create a new reader from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    /// Returns remaining bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    pub fn get_u8(&mut self) -> u8 {
        self.buf.get_u8()
    }

    /// Safe version that returns None if not enough data
    #[inline]
    pub fn try_get_u8(&mut self) -> Option<u8> {
        if self.buf.remaining() >= 1 {
            Some(self.buf.get_u8())
        } else {
            None
        }
    }

    /// Safe version that returns None if not enough data
    #[inline]
    pub fn try_get_u32(&mut self) -> Option<u32> {
        if self.buf.remaining() >= 4 {
            Some(self.buf.get_u32_le())
        } else {
            None
        }
    }

    /// Safe version that returns None if not enough data
    #[inline]
    pub fn try_get_u64(&mut self) -> Option<u64> {
        if self.buf.remaining() >= 8 {
            Some(self.buf.get_u64_le())
        } else {
            None
        }
    }

    /// Safe version that returns None if not enough data
    #[inline]
    pub fn try_get_f32(&mut self) -> Option<f32> {
        if self.buf.remaining() >= 4 {
            Some(self.buf.get_f32_le())
        } else {
            None
        }
    }
}

/// A writer for building binary messages.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    /// Create a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the current length.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    #[inline]
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    #[inline]
    pub fn put_u64(&mut self, v: u64) {
        self.buf.put_u64_le(v);
    }

    #[inline]
    pub fn put_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    /// Consume the writer and return the built buffer.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Get current buffer as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_u64() {
        let mut w = BinaryWriter::new();
        w.put_u64(0xDEAD_BEEF_CAFE_F00D);
        let data = w.finish();
        let mut r = BinaryReader::new(data);
        assert_eq!(r.try_get_u64(), Some(0xDEAD_BEEF_CAFE_F00D));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_short_read_returns_none() {
        let mut w = BinaryWriter::new();
        w.put_u8(7);
        w.put_u8(1);
        let mut r = BinaryReader::new(w.finish());
        assert_eq!(r.get_u8(), 7);
        assert_eq!(r.try_get_f32(), None);
        assert_eq!(r.try_get_u8(), Some(1));
    }
}
