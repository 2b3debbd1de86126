use std::cell::RefCell;
use std::io::{Cursor, Read, Result as IoResult, Write};
use std::process::Stdio;
use std::rc::Rc;

/// Memory-backed reader usable as a command's standard input.
pub struct MemReader {
    cursor: Cursor<Vec<u8>>,
}

impl MemReader {
    pub fn new(buf: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }
}

impl Read for MemReader {
    fn read(&mut self, out: &mut [u8]) -> IoResult<usize> {
        self.cursor.read(out)
    }
}

impl crate::command::Stdin for MemReader {
    /// In-memory input has no OS handle to pass along; a child spawned with
    /// it reads from the null device.
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::null()
    }
}

/// Memory-backed writer for capturing a command's standard output.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self {
            buf: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Create a writer and a handle to its buffer, so the collected bytes
    /// can be read after the writer has been consumed by a command.
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let writer = MemWriter::new();
        let handle = writer.buf.clone();
        (writer, handle)
    }
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl crate::command::Stdout for MemWriter {
    /// A child spawned with an in-memory sink has its output discarded.
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::null()
    }
}
