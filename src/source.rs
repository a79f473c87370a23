//! Byte source abstraction consumed by the frame decoder

use std::io::{self, BufRead, BufReader, Cursor, Read};

/// A blocking byte source frames are decoded from.
///
/// Any [`Read`] type qualifies with an empty impl:
///
/// ```rust
/// use std::io::Read;
/// use wirebound::ByteSource;
///
/// struct Tap<R>(R);
///
/// impl<R: Read> Read for Tap<R> {
///     fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
///         self.0.read(buf)
///     }
/// }
///
/// impl<R: Read> ByteSource for Tap<R> {}
/// ```
///
/// [`skip_bytes`](ByteSource::skip_bytes) has a copy-discard fallback that is
/// always correct; sources that can drop bytes without touching them (slices,
/// cursors, buffered readers) override it.
pub trait ByteSource: Read {
    /// Skip up to `n` bytes, returning how many were actually skipped.
    ///
    /// Returns fewer than `n` only when the source is exhausted.
    fn skip_bytes(&mut self, n: usize) -> io::Result<usize> {
        let mut scratch = [0u8; 512];
        let mut skipped = 0;
        while skipped < n {
            let want = (n - skipped).min(scratch.len());
            match self.read(&mut scratch[..want]) {
                Ok(0) => break,
                Ok(read) => skipped += read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(skipped)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn skip_bytes(&mut self, n: usize) -> io::Result<usize> {
        (**self).skip_bytes(n)
    }
}

impl ByteSource for &[u8] {
    fn skip_bytes(&mut self, n: usize) -> io::Result<usize> {
        let n = n.min(self.len());
        *self = &self[n..];
        Ok(n)
    }
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    fn skip_bytes(&mut self, n: usize) -> io::Result<usize> {
        let len = self.get_ref().as_ref().len() as u64;
        let pos = self.position().min(len);
        let n = (n as u64).min(len - pos);
        self.set_position(pos + n);
        Ok(n as usize)
    }
}

impl<R: Read> ByteSource for BufReader<R> {
    fn skip_bytes(&mut self, n: usize) -> io::Result<usize> {
        let mut skipped = 0;
        while skipped < n {
            let available = match self.fill_buf() {
                Ok(buf) if buf.is_empty() => break,
                Ok(buf) => buf.len(),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            let take = available.min(n - skipped);
            self.consume(take);
            skipped += take;
        }
        Ok(skipped)
    }
}
