//! Bounded frame decoder
//!
//! [`Decoder`] wraps a byte source with a remaining-byte budget and a sticky
//! error. Reads never cross the budget, so a mis-declared field can at worst
//! consume the rest of its own frame, never the next frame's bytes. The first
//! failure is recorded once, drains whatever is left of the budget, and turns
//! every later read into a no-op returning defaults. Either way the frame's
//! bytes are fully consumed by the time [`Decoder::finish`] returns, which is
//! what keeps the underlying stream synchronized frame after frame.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::ByteSource;
use crate::varint::{unzigzag, MAX_VARINT_LEN};

/// Budget-bounded reader over one frame of a byte source.
#[derive(Debug)]
pub struct Decoder<'a, S> {
    source: &'a mut S,
    remain: usize,
    scratch: [u8; 8],
    err: Option<Error>,
}

impl<'a, S: ByteSource> Decoder<'a, S> {
    /// Create a decoder for one frame of `remain` bytes over `source`.
    pub fn new(source: &'a mut S, remain: usize) -> Self {
        Self {
            source,
            remain,
            scratch: [0u8; 8],
            err: None,
        }
    }

    /// Bytes left in the frame budget.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remain
    }

    /// The sticky error, if any decode step has failed.
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Record a terminal error and drain the rest of the frame.
    ///
    /// The first error wins; later calls are no-ops. Draining here is what
    /// guarantees the budget is fully consumed no matter where the decode
    /// failed.
    pub fn set_error(&mut self, err: Error) {
        if self.err.is_some() {
            return;
        }
        debug!(error = %err, remaining = self.remain, "decode failed, draining frame");
        self.err = Some(err);
        self.discard_all();
    }

    /// Raw access to the underlying source, bypassing the budget.
    ///
    /// Used by self-decoding record types; bytes consumed this way must be
    /// reported back through [`Decoder::consume`].
    pub fn source_mut(&mut self) -> &mut S {
        &mut *self.source
    }

    /// Debit `n` bytes read directly from the raw source against the budget.
    ///
    /// Clamped at zero: an overrun past the frame boundary cannot be un-read.
    pub fn consume(&mut self, n: usize) {
        self.remain = self.remain.saturating_sub(n);
    }

    /// Skip up to `n` bytes, clamped to the budget.
    pub fn discard(&mut self, n: usize) {
        let n = n.min(self.remain);
        if n == 0 {
            return;
        }
        match self.source.skip_bytes(n) {
            Ok(skipped) => self.remain -= skipped,
            Err(err) => self.set_error(Error::Io(err)),
        }
    }

    /// Skip everything left in the frame budget.
    pub fn discard_all(&mut self) {
        self.discard(self.remain);
    }

    /// Stream exactly `n` bytes into `sink` without materializing them.
    ///
    /// Fails with [`Error::UnexpectedEof`] if `n` exceeds the budget or the
    /// source dries up mid-copy.
    pub fn copy_to<W: Write + ?Sized>(&mut self, sink: &mut W, n: usize) {
        if self.err.is_some() {
            return;
        }
        if n > self.remain {
            self.set_error(Error::UnexpectedEof);
            return;
        }
        let mut scratch = [0u8; 512];
        let mut left = n;
        while left > 0 {
            let want = left.min(scratch.len());
            match self.source.read(&mut scratch[..want]) {
                Ok(0) => {
                    self.set_error(Error::UnexpectedEof);
                    return;
                }
                Ok(read) => {
                    self.remain -= read;
                    left -= read;
                    if let Err(err) = sink.write_all(&scratch[..read]) {
                        self.set_error(Error::Io(err));
                        return;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.set_error(Error::Io(err));
                    return;
                }
            }
        }
    }

    /// Drain any leftover budget and return the sticky error, if one fired.
    pub fn finish(mut self) -> Result<()> {
        self.discard_all();
        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Fill `self.scratch[..len]` exactly, or set a truncation error.
    ///
    /// All fixed-width primitive reads route through here.
    fn read_full(&mut self, len: usize) -> bool {
        if self.err.is_some() {
            return false;
        }
        if len > self.remain {
            let available = self.remain;
            self.set_error(Error::Truncated {
                needed: len,
                available,
            });
            return false;
        }
        let mut filled = 0;
        while filled < len {
            match self.source.read(&mut self.scratch[filled..len]) {
                Ok(0) => {
                    self.set_error(Error::Truncated {
                        needed: len,
                        available: filled,
                    });
                    return false;
                }
                Ok(read) => {
                    self.remain -= read;
                    filled += read;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.set_error(Error::Io(err));
                    return false;
                }
            }
        }
        true
    }

    /// Read a length-prefixed payload of exactly `len` bytes.
    ///
    /// Returns an empty buffer (and sets the sticky error) on any failure,
    /// so destinations are left at defaults rather than partial data. The
    /// budget check runs before the allocation: a corrupt length prefix
    /// cannot force a giant buffer into existence.
    fn read_payload(&mut self, len: usize) -> Vec<u8> {
        if self.err.is_some() || len == 0 {
            return Vec::new();
        }
        if len > self.remain {
            let available = self.remain;
            self.set_error(Error::Truncated {
                needed: len,
                available,
            });
            return Vec::new();
        }
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.set_error(Error::Truncated {
                        needed: len,
                        available: filled,
                    });
                    return Vec::new();
                }
                Ok(read) => {
                    self.remain -= read;
                    filled += read;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.set_error(Error::Io(err));
                    return Vec::new();
                }
            }
        }
        buf
    }

    fn read_u8(&mut self) -> u8 {
        if self.read_full(1) {
            self.scratch[0]
        } else {
            0
        }
    }

    /// Read one byte as a boolean; any nonzero value is `true`.
    #[inline]
    pub fn read_bool(&mut self) -> bool {
        self.read_u8() != 0
    }

    /// Read a signed 8-bit integer.
    #[inline]
    pub fn read_i8(&mut self) -> i8 {
        self.read_u8() as i8
    }

    /// Read a big-endian signed 16-bit integer.
    #[inline]
    pub fn read_i16(&mut self) -> i16 {
        if self.read_full(2) {
            BigEndian::read_i16(&self.scratch[..2])
        } else {
            0
        }
    }

    /// Read a big-endian signed 32-bit integer.
    #[inline]
    pub fn read_i32(&mut self) -> i32 {
        if self.read_full(4) {
            BigEndian::read_i32(&self.scratch[..4])
        } else {
            0
        }
    }

    /// Read a big-endian signed 64-bit integer.
    #[inline]
    pub fn read_i64(&mut self) -> i64 {
        if self.read_full(8) {
            BigEndian::read_i64(&self.scratch[..8])
        } else {
            0
        }
    }

    /// Read a zigzag varint as a signed 64-bit integer.
    ///
    /// Scans at most [`MAX_VARINT_LEN`] bytes, never past the frame budget;
    /// a missing terminator within that window is [`Error::Varint`].
    pub fn read_varlong(&mut self) -> i64 {
        let mut window = MAX_VARINT_LEN.min(self.remain);
        let mut x: u64 = 0;
        let mut shift: u32 = 0;

        while window > 0 {
            let byte = self.read_u8();

            if byte & 0x80 == 0 {
                if shift < 64 {
                    x |= u64::from(byte) << shift;
                }
                return unzigzag(x);
            }

            if shift < 64 {
                x |= u64::from(byte & 0x7f) << shift;
            }
            shift += 7;
            window -= 1;
        }

        self.set_error(Error::Varint);
        0
    }

    /// Read a fixed-form string: 16-bit signed length prefix, then bytes.
    ///
    /// A negative length decodes to an empty string; there is no distinct
    /// "absent" state for strings on this path (unlike byte arrays).
    pub fn read_string(&mut self) -> String {
        let len = self.read_i16();
        if len < 0 {
            return String::new();
        }
        self.read_string_payload(len as usize)
    }

    /// Read a compact-form string: zigzag varint length prefix, then bytes.
    pub fn read_compact_string(&mut self) -> String {
        let len = self.read_varlong();
        if len < 0 {
            return String::new();
        }
        self.read_string_payload(len as usize)
    }

    fn read_string_payload(&mut self, len: usize) -> String {
        let buf = self.read_payload(len);
        if self.err.is_some() {
            return String::new();
        }
        // The wire admits arbitrary bytes; decode lossily rather than reject.
        match String::from_utf8(buf) {
            Ok(s) => s,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }

    /// Read a fixed-form byte array: 32-bit signed length prefix, then bytes.
    ///
    /// A negative length decodes to `None` (absent), distinct from a
    /// zero-length `Some(vec![])` (present but empty).
    pub fn read_bytes(&mut self) -> Option<Vec<u8>> {
        let len = self.read_i32();
        if len < 0 {
            return None;
        }
        self.read_bytes_payload(len as usize)
    }

    /// Read a compact-form byte array: zigzag varint length prefix, then bytes.
    pub fn read_compact_bytes(&mut self) -> Option<Vec<u8>> {
        let len = self.read_varlong();
        if len < 0 {
            return None;
        }
        self.read_bytes_payload(len as usize)
    }

    fn read_bytes_payload(&mut self, len: usize) -> Option<Vec<u8>> {
        let buf = self.read_payload(len);
        if self.err.is_some() {
            None
        } else {
            Some(buf)
        }
    }

    /// Stream a fixed-form byte array into `sink` instead of buffering it.
    ///
    /// Returns whether a payload was fully copied; `false` when the length
    /// prefix signaled "absent" or the copy failed.
    pub fn read_bytes_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> bool {
        let len = self.read_i32();
        if len < 0 {
            return false;
        }
        self.copy_to(sink, len as usize);
        self.err.is_none()
    }

    /// Stream a compact-form byte array into `sink` instead of buffering it.
    pub fn read_compact_bytes_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> bool {
        let len = self.read_varlong();
        if len < 0 {
            return false;
        }
        self.copy_to(sink, len as usize);
        self.err.is_none()
    }
}

impl<S: ByteSource> Read for Decoder<'_, S> {
    /// Budget-bounded read: sticky error if one fired, `Ok(0)` once the
    /// frame is exhausted, otherwise at most `remaining()` bytes.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = &self.err {
            return Err(io::Error::new(io::ErrorKind::Other, err.to_string()));
        }
        if self.remain == 0 || buf.is_empty() {
            return Ok(0);
        }
        let cap = buf.len().min(self.remain);
        let read = self.source.read(&mut buf[..cap])?;
        self.remain -= read;
        Ok(read)
    }
}
