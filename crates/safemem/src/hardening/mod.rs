//! Integrity checking: the block header protocol and the diagnostic stream
//! misuse is reported on.

pub mod header;

use crate::config;
use crate::error::ReleaseError;
use core::fmt::{self, Write};

/// Diagnostic lines longer than this are truncated.
const REPORT_BUF_LEN: usize = 160;

/// Fixed-capacity line buffer; formatting into it never allocates.
struct StackLine {
    buf: [u8; REPORT_BUF_LEN],
    len: usize,
}

impl StackLine {
    const fn new() -> Self {
        StackLine {
            buf: [0; REPORT_BUF_LEN],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Write for StackLine {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        // Keep one byte for the trailing newline.
        let room = REPORT_BUF_LEN - 1 - self.len;
        let n = s.len().min(room);
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

fn format_report(err: &ReleaseError) -> StackLine {
    let mut line = StackLine::new();
    let _ = write!(line, "safemem: {}", err);
    line.buf[line.len] = b'\n';
    line.len += 1;
    line
}

/// Write one diagnostic line for a refused release to stderr.
///
/// Goes straight to fd 2: this may run inside the global allocator, where
/// anything that allocates would re-enter it.
#[cold]
#[inline(never)]
pub fn report(err: &ReleaseError) {
    if !config::report_corruption() {
        return;
    }
    let line = format_report(err);
    let bytes = line.as_bytes();
    unsafe {
        libc::write(2, bytes.as_ptr() as *const libc::c_void, bytes.len());
    }
}
