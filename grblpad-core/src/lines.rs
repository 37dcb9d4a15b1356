use crate::Error;

/// Line terminator used by GRBL for every response.
pub const DELIMITER: &[u8; 2] = b"\r\n";

/// Default capacity of the reassembly buffer, comfortably above GRBL's longest report.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Fixed-capacity byte ring holding serial input that hasn't been consumed yet.
///
/// Reading is split in two phases: [`RingBuffer::find`] and [`RingBuffer::peek`]
/// look at the pending bytes without touching them, and only [`RingBuffer::advance`]
/// commits a consumed length.
#[derive(Debug)]
pub struct RingBuffer {
    storage: Box<[u8]>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            storage: vec![0; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of pending (unconsumed) bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn get(&self, index: usize) -> u8 {
        self.storage[(self.head + index) % self.capacity()]
    }

    /// Append bytes behind the pending region.
    ///
    /// Nothing is written if the bytes don't fit.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let capacity = self.capacity();
        if self.len + bytes.len() > capacity {
            return Err(Error::RingBufferOverflow(capacity));
        }
        let mut tail = (self.head + self.len) % capacity;
        for byte in bytes {
            self.storage[tail] = *byte;
            tail = (tail + 1) % capacity;
        }
        self.len += bytes.len();
        Ok(())
    }

    /// Offset of the first occurrence of `needle` in the pending bytes
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.len {
            return None;
        }
        (0..=self.len - needle.len()).find(|start| {
            needle
                .iter()
                .enumerate()
                .all(|(i, byte)| self.get(start + i) == *byte)
        })
    }

    /// Copy out the first `count` pending bytes without consuming them
    pub fn peek(&self, count: usize) -> Vec<u8> {
        (0..count.min(self.len)).map(|i| self.get(i)).collect()
    }

    /// Commit `count` bytes as consumed
    pub fn advance(&mut self, count: usize) {
        let count = count.min(self.len);
        self.head = (self.head + count) % self.capacity();
        self.len -= count;
    }
}

/// Turns arbitrarily chunked serial reads into `\r\n` terminated protocol lines.
///
/// Each call to [`LineReassembler::push`] is one read event and yields at most one line,
/// further complete lines stay buffered until the next read.
#[derive(Debug)]
pub struct LineReassembler {
    buffer: RingBuffer,
}

impl Default for LineReassembler {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LineReassembler {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: RingBuffer::with_capacity(capacity),
        }
    }

    /// Append a chunk and emit the oldest complete line, if there is one.
    ///
    /// Overflowing the buffer is fatal, the reassembler should not be fed again afterwards.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<String>, Error> {
        self.buffer.write(chunk)?;
        Ok(self.next_line())
    }

    /// Emit the oldest complete line without reading anything new
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.buffer.find(DELIMITER)?;
        let line = self.buffer.peek(end);
        self.buffer.advance(end + DELIMITER.len());
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Bytes received but not yet emitted as a line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn separate_chunks() {
        let mut lines = LineReassembler::default();
        assert_eq!(lines.push(b"ok\r\n").unwrap().as_deref(), Some("ok"));
        assert_eq!(
            lines.push(b"<Idle|MPos:1,2,3>\r\n").unwrap().as_deref(),
            Some("<Idle|MPos:1,2,3>")
        );
        assert_eq!(lines.pending(), 0);
    }

    #[test]
    fn one_line_per_read() {
        let mut lines = LineReassembler::default();
        let first = lines.push(b"ok\r\n<Idle|MPos:1,2,3>\r\n").unwrap();
        assert_eq!(first.as_deref(), Some("ok"));
        assert_eq!(lines.pending(), "<Idle|MPos:1,2,3>\r\n".len());
        let second = lines.push(b"").unwrap();
        assert_eq!(second.as_deref(), Some("<Idle|MPos:1,2,3>"));
        assert_eq!(lines.pending(), 0);
    }

    #[test]
    fn partial_line_is_kept() {
        let mut lines = LineReassembler::default();
        assert_eq!(lines.push(b"<Idle|MP").unwrap(), None);
        assert_eq!(lines.push(b"os:0,0,0>\r").unwrap(), None);
        assert_eq!(
            lines.push(b"\nok").unwrap().as_deref(),
            Some("<Idle|MPos:0,0,0>")
        );
        assert_eq!(lines.pending(), 2);
        assert_eq!(lines.push(b"\r\n").unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn overflow_is_fatal() {
        let mut lines = LineReassembler::with_capacity(8);
        assert!(lines.push(b"12345").unwrap().is_none());
        assert!(matches!(
            lines.push(b"6789"),
            Err(Error::RingBufferOverflow(8))
        ));
        assert_eq!(lines.pending(), 5);
    }

    #[test]
    fn wraps_around() {
        let mut ring = RingBuffer::with_capacity(6);
        ring.write(b"abcd").unwrap();
        ring.advance(3);
        ring.write(b"e\r\nf").unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.find(DELIMITER), Some(2));
        assert_eq!(ring.peek(2), b"de");
        ring.advance(4);
        assert_eq!(ring.peek(8), b"f");
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn zero_capacity() {
        RingBuffer::with_capacity(0);
    }
}
