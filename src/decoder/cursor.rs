//! Forward-only read cursor over a packet buffer

use crate::{Result, TelemetryError};

/// Explicit byte offset into a borrowed buffer.
///
/// Every read is bounds-checked; a window that would run past the end of the
/// buffer is a [`TelemetryError::Truncated`] error, never a short slice.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Take the next `width` bytes and advance past them.
    pub fn take(&mut self, width: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(width).ok_or(TelemetryError::Truncated {
            needed: usize::MAX,
            actual: self.buf.len(),
        })?;

        let window = self
            .buf
            .get(self.offset..end)
            .ok_or(TelemetryError::Truncated { needed: end, actual: self.buf.len() })?;

        self.offset = end;
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn offsets_accumulate(widths in prop::collection::vec(0usize..8, 0..20)) {
            let total: usize = widths.iter().sum();
            let buf = vec![0u8; total];
            let mut cursor = Cursor::new(&buf);

            for width in &widths {
                let before = cursor.offset();
                prop_assert_eq!(cursor.take(*width).unwrap().len(), *width);
                prop_assert_eq!(cursor.offset(), before + width);
            }
            prop_assert_eq!(cursor.remaining(), 0);
        }
    }

    #[test]
    fn windows_follow_buffer_order() {
        let buf = [1u8, 2, 3, 4, 5];
        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.take(2).unwrap(), &[1, 2]);
        assert_eq!(cursor.take(0).unwrap(), &[] as &[u8]);
        assert_eq!(cursor.take(3).unwrap(), &[3, 4, 5]);
    }

    #[test]
    fn reading_past_the_end_fails_without_advancing() {
        let buf = [0u8; 6];
        let mut cursor = Cursor::new(&buf);
        cursor.take(4).unwrap();

        let err = cursor.take(4).unwrap_err();
        assert!(matches!(err, TelemetryError::Truncated { needed: 8, actual: 6 }));
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn overflowing_width_is_truncation() {
        let buf = [0u8; 2];
        let mut cursor = Cursor::new(&buf);
        cursor.take(1).unwrap();
        assert!(cursor.take(usize::MAX).is_err());
    }
}
