use std::io::{self, Read, Write};

use super::{CancelCheck, ChannelError};

/// Reading half of a byte channel
pub struct ByteReader<R> {
    input: R,
    cancel: Option<CancelCheck>,
}

impl<R> ByteReader<R>
where
    R: Read,
{
    pub fn new(input: R) -> Self {
        Self {
            input,
            cancel: None,
        }
    }

    pub fn with_cancel(input: R, cancel: impl Fn() -> bool + Send + 'static) -> Self {
        Self {
            input,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Fill `buf` completely
    ///
    /// Short reads are retried until the buffer is full. Reaching EOF first is
    /// reported as [`ChannelError::Closed`]. On any error the contents of
    /// `buf` are unspecified and must not be used.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ChannelError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.input.read(&mut buf[filled..]) {
                Ok(0) => return Err(ChannelError::Closed),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => {
                    if self.is_cancelled() {
                        return Err(ChannelError::Cancelled);
                    }
                }
                Err(e) => return Err(ChannelError::Io(e)),
            }
        }
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|cancel| cancel())
    }
}

/// Writing half of a byte channel
pub struct ByteWriter<W> {
    output: W,
}

impl<W> ByteWriter<W>
where
    W: Write,
{
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn get_ref(&self) -> &W {
        &self.output
    }

    /// Write all of `buf` and flush
    ///
    /// A write that accepts zero bytes means the peer is gone and is reported
    /// as [`ChannelError::Closed`].
    pub fn write_exact(&mut self, buf: &[u8]) -> Result<(), ChannelError> {
        let mut written = 0;
        while written < buf.len() {
            match self.output.write(&buf[written..]) {
                Ok(0) => return Err(ChannelError::Closed),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ChannelError::Io(e)),
            }
        }
        self.output.flush()?;
        Ok(())
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// Hands out at most one byte per read
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    /// Times out on every read
    struct Silent;

    impl Read for Silent {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "no data"))
        }
    }

    /// Accepts at most two bytes per write
    #[derive(Default)]
    struct Narrow(Vec<u8>);

    impl Write for Narrow {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let len = buf.len().min(2);
            self.0.extend_from_slice(&buf[..len]);
            Ok(len)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Full;

    impl Write for Full {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_reads_are_retried() {
        let mut reader = ByteReader::new(Trickle(Cursor::new(b"hello".to_vec())));
        let mut buf = [0u8; 5];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn eof_before_full_buffer_is_closed() {
        let mut reader = ByteReader::new(Cursor::new(b"hel".to_vec()));
        let mut buf = [0u8; 5];
        let err = reader.read_exact(&mut buf).unwrap_err();
        assert!(matches!(err, ChannelError::Closed), "got {err:?}");
    }

    #[test]
    fn timeouts_consult_cancel_check() {
        let checks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&checks);
        let mut reader = ByteReader::with_cancel(Silent, move || {
            counter.fetch_add(1, Ordering::SeqCst) >= 2
        });

        let mut buf = [0u8; 1];
        let err = reader.read_exact(&mut buf).unwrap_err();

        assert!(matches!(err, ChannelError::Cancelled), "got {err:?}");
        assert_eq!(checks.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn cancel_check_is_ignored_while_data_flows() {
        let cancelled = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&cancelled);
        let mut reader = ByteReader::with_cancel(Cursor::new(b"ok".to_vec()), move || {
            flag.load(Ordering::SeqCst)
        });

        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ok");
    }

    #[test]
    fn short_writes_are_retried() {
        let mut writer = ByteWriter::new(Narrow::default());
        writer.write_exact(b"continue\n").unwrap();
        assert_eq!(writer.get_ref().0, b"continue\n");
    }

    #[test]
    fn zero_length_write_is_closed() {
        let mut writer = ByteWriter::new(Full);
        let err = writer.write_exact(b"x").unwrap_err();
        assert!(matches!(err, ChannelError::Closed), "got {err:?}");
    }
}
