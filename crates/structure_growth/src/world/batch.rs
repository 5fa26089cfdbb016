//! Batching writer over a pluggable transport.
use tracing::warn;

use crate::error::{Error, Result};
use crate::world::{VoxelWrite, VoxelWriter};

/// Queued writes that trigger an automatic send.
pub const DEFAULT_BATCH_LIMIT: usize = 50;
/// Extra attempts for a failed batch before it is dropped.
pub const DEFAULT_SEND_RETRIES: usize = 5;

/// Delivers a batch of writes to the world.
pub trait BlockTransport {
    fn send(&mut self, batch: &[VoxelWrite]) -> Result<()>;
}

impl<F> BlockTransport for F
where
    F: FnMut(&[VoxelWrite]) -> Result<()>,
{
    fn send(&mut self, batch: &[VoxelWrite]) -> Result<()> {
        self(batch)
    }
}

/// Buffers writes and sends them in batches of at most `limit`.
///
/// A batch that still fails after `retries` extra attempts is dropped; the first such
/// failure is reported by the next [`VoxelWriter::flush`].
pub struct BatchedWriter<T: BlockTransport> {
    transport: T,
    buffer: Vec<VoxelWrite>,
    limit: usize,
    retries: usize,
    sent: usize,
    failure: Option<Error>,
}

impl<T: BlockTransport> BatchedWriter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: Vec::with_capacity(DEFAULT_BATCH_LIMIT),
            limit: DEFAULT_BATCH_LIMIT,
            retries: DEFAULT_SEND_RETRIES,
            sent: 0,
            failure: None,
        }
    }

    /// Sets the batch size; clamped to at least one.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Writes queued but not yet sent.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Writes delivered so far.
    pub fn sent(&self) -> usize {
        self.sent
    }

    fn send_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut attempt = 0;
        loop {
            match self.transport.send(&self.buffer) {
                Ok(()) => {
                    self.sent += self.buffer.len();
                    self.buffer.clear();
                    return Ok(());
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "Sending {} voxels failed: {}. Retrying ({} left).",
                        self.buffer.len(),
                        e,
                        self.retries + 1 - attempt
                    );
                }
                Err(e) => {
                    let dropped = self.buffer.len();
                    self.buffer.clear();
                    return Err(Error::World(format!(
                        "dropped batch of {dropped} voxels after {} retries: {e}",
                        self.retries
                    )));
                }
            }
        }
    }
}

impl<T: BlockTransport> VoxelWriter for BatchedWriter<T> {
    fn write_voxel(&mut self, write: VoxelWrite) {
        self.buffer.push(write);
        if self.buffer.len() >= self.limit {
            if let Err(e) = self.send_buffer() {
                self.failure.get_or_insert(e);
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        let sent = self.send_buffer();
        match self.failure.take() {
            Some(e) => Err(e),
            None => sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;

    #[derive(Default)]
    struct Flaky {
        failures_left: usize,
        batches: Vec<usize>,
        calls: usize,
    }

    impl BlockTransport for Flaky {
        fn send(&mut self, batch: &[VoxelWrite]) -> Result<()> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(Error::World("connection refused".into()));
            }
            self.batches.push(batch.len());
            Ok(())
        }
    }

    fn write(i: i32) -> VoxelWrite {
        VoxelWrite::new(IVec3::new(i, 0, 0), "minecraft:stone")
    }

    #[test]
    fn sends_full_batches_and_remainder_on_flush() {
        let mut writer = BatchedWriter::new(Flaky::default()).with_limit(4);
        for i in 0..10 {
            writer.write_voxel(write(i));
        }
        assert_eq!(writer.pending(), 2);
        writer.flush().unwrap();
        assert_eq!(writer.transport().batches, vec![4, 4, 2]);
        assert_eq!(writer.sent(), 10);
        assert_eq!(writer.pending(), 0);
    }

    #[test]
    fn default_limit_is_fifty() {
        let mut writer = BatchedWriter::new(Flaky::default());
        for i in 0..120 {
            writer.write_voxel(write(i));
        }
        assert_eq!(writer.transport().batches, vec![50, 50]);
    }

    #[test]
    fn retries_transient_failures() {
        let transport = Flaky {
            failures_left: DEFAULT_SEND_RETRIES,
            ..Default::default()
        };
        let mut writer = BatchedWriter::new(transport);
        writer.write_voxel(write(0));
        writer.flush().unwrap();
        assert_eq!(writer.transport().calls, DEFAULT_SEND_RETRIES + 1);
        assert_eq!(writer.sent(), 1);
    }

    #[test]
    fn persistent_failure_surfaces_on_flush() {
        let transport = Flaky {
            failures_left: usize::MAX,
            ..Default::default()
        };
        let mut writer = BatchedWriter::new(transport).with_limit(2).with_retries(1);
        writer.write_voxel(write(0));
        writer.write_voxel(write(1));
        assert_eq!(writer.pending(), 0);

        let err = writer.flush().unwrap_err();
        assert!(matches!(err, Error::World(_)));
        assert_eq!(writer.transport().calls, 2);
        // The failure is reported once.
        assert!(writer.flush().is_ok());
    }

    #[test]
    fn closures_are_transports() {
        let mut lines = Vec::new();
        {
            let mut writer = BatchedWriter::new(|batch: &[VoxelWrite]| -> Result<()> {
                lines.extend(batch.iter().map(|w| w.to_string()));
                Ok(())
            });
            writer.write_voxel(write(3));
            writer.flush().unwrap();
        }
        assert_eq!(lines, vec!["3 0 0 minecraft:stone"]);
    }
}
