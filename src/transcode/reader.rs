// Background drain of the transcoder's standard output

use std::io::{self, Read};
use std::thread::{self, JoinHandle};

use log::{debug, trace};

const CHUNK_SIZE: usize = 64 * 1024;

/// Reads a pipe to end-of-stream on its own thread
///
/// The bytes only become visible to the caller through [`PipeReader::join`],
/// after the thread has finished writing them.
pub struct PipeReader {
    handle: JoinHandle<io::Result<Vec<u8>>>,
}

impl PipeReader {
    /// Start draining `pipe`
    pub fn spawn<R>(mut pipe: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("transcoder-stdout".to_string())
            .spawn(move || {
                let mut buffer = Vec::new();
                let mut chunk = vec![0u8; CHUNK_SIZE];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => {
                            trace!("read {} bytes from transcoder", n);
                            buffer.extend_from_slice(&chunk[..n]);
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(e),
                    }
                }
                debug!("transcoder stdout closed after {} bytes", buffer.len());
                Ok(buffer)
            })?;

        Ok(PipeReader { handle })
    }

    /// Wait for end-of-stream and take the accumulated bytes
    pub fn join(self) -> io::Result<Vec<u8>> {
        self.handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("transcoder reader thread panicked")))
    }
}
