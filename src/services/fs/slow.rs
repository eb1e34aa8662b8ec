//! Slow storage backend for testing
//!
//! This module provides a decorator around any FsBackend that adds
//! configurable delays to simulate slow I/O (network shares, browser storage
//! permission prompts) and counts every call, so tests can assert exactly how
//! often the explorer touched storage.

use super::backend::{EntryHandle, FsBackend, FsEntry};
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Configuration for slow storage simulation
#[derive(Debug, Clone)]
pub struct SlowFsConfig {
    /// Delay for read_dir operations
    pub read_dir_delay: Duration,
    /// Delay for read_file operations
    pub read_file_delay: Duration,
    /// Delay for write_file operations
    pub write_file_delay: Duration,
}

impl SlowFsConfig {
    /// Create a config with uniform delay for all operations
    pub fn uniform(delay: Duration) -> Self {
        Self {
            read_dir_delay: delay,
            read_file_delay: delay,
            write_file_delay: delay,
        }
    }

    /// Create a config with no delays (counting only)
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }
}

impl Default for SlowFsConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Metrics tracking for storage operations
#[derive(Debug, Clone, Default)]
pub struct BackendMetrics {
    /// Number of read_dir calls
    pub read_dir_calls: usize,
    /// Number of read_file calls
    pub read_file_calls: usize,
    /// Number of write_file calls
    pub write_file_calls: usize,
    /// Total time spent in artificial delays
    pub total_delay_time: Duration,
}

impl BackendMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Get total number of storage calls
    pub fn total_calls(&self) -> usize {
        self.read_dir_calls + self.read_file_calls + self.write_file_calls
    }
}

/// Slow storage backend wrapper for testing
///
/// Wraps any FsBackend implementation and adds configurable delays to each
/// operation. Also tracks metrics about operation counts and timing.
pub struct SlowFsBackend {
    inner: Arc<dyn FsBackend>,
    config: SlowFsConfig,
    metrics: Arc<Mutex<BackendMetrics>>,
}

impl SlowFsBackend {
    pub fn new(inner: Arc<dyn FsBackend>, config: SlowFsConfig) -> Self {
        Self {
            inner,
            config,
            metrics: Arc::new(Mutex::new(BackendMetrics::new())),
        }
    }

    /// Create with uniform delay for all operations
    pub fn with_uniform_delay(inner: Arc<dyn FsBackend>, delay: Duration) -> Self {
        Self::new(inner, SlowFsConfig::uniform(delay))
    }

    /// Wrap without delays, only counting calls
    pub fn counting(inner: Arc<dyn FsBackend>) -> Self {
        Self::new(inner, SlowFsConfig::none())
    }

    /// Get a snapshot of current metrics
    pub async fn metrics(&self) -> BackendMetrics {
        self.metrics.lock().await.clone()
    }

    pub async fn reset_metrics(&self) {
        self.metrics.lock().await.reset();
    }

    async fn add_delay(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            self.metrics.lock().await.total_delay_time += delay;
        }
    }
}

#[async_trait]
impl FsBackend for SlowFsBackend {
    async fn read_dir(&self, dir: &EntryHandle) -> io::Result<Vec<FsEntry>> {
        self.metrics.lock().await.read_dir_calls += 1;
        self.add_delay(self.config.read_dir_delay).await;
        self.inner.read_dir(dir).await
    }

    async fn read_file(&self, file: &EntryHandle) -> io::Result<String> {
        self.metrics.lock().await.read_file_calls += 1;
        self.add_delay(self.config.read_file_delay).await;
        self.inner.read_file(file).await
    }

    async fn write_file(&self, file: &EntryHandle, contents: &str) -> io::Result<()> {
        self.metrics.lock().await.write_file_calls += 1;
        self.add_delay(self.config.write_file_delay).await;
        self.inner.write_file(file, contents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fs::MemoryFsBackend;
    use std::time::Instant;

    fn memory_with_file() -> Arc<MemoryFsBackend> {
        let memory = Arc::new(MemoryFsBackend::new());
        memory.add_file("/p/a.txt", "a");
        memory
    }

    #[tokio::test]
    async fn test_counts_calls() {
        let slow = SlowFsBackend::counting(memory_with_file());

        slow.read_dir(&EntryHandle::new("/p")).await.unwrap();
        slow.read_file(&EntryHandle::new("/p/a.txt")).await.unwrap();
        slow.write_file(&EntryHandle::new("/p/a.txt"), "b")
            .await
            .unwrap();

        let metrics = slow.metrics().await;
        assert_eq!(metrics.read_dir_calls, 1);
        assert_eq!(metrics.read_file_calls, 1);
        assert_eq!(metrics.write_file_calls, 1);
        assert_eq!(metrics.total_calls(), 3);
        assert_eq!(metrics.total_delay_time, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_failed_calls_are_counted() {
        let memory = memory_with_file();
        memory.set_fail_writes(true);
        let slow = SlowFsBackend::counting(memory);

        assert!(slow
            .write_file(&EntryHandle::new("/p/a.txt"), "b")
            .await
            .is_err());
        assert_eq!(slow.metrics().await.write_file_calls, 1);
    }

    #[tokio::test]
    async fn test_delay_is_applied() {
        let delay = Duration::from_millis(30);
        let slow = SlowFsBackend::with_uniform_delay(memory_with_file(), delay);

        let start = Instant::now();
        slow.read_dir(&EntryHandle::new("/p")).await.unwrap();
        assert!(start.elapsed() >= delay);
        assert_eq!(slow.metrics().await.total_delay_time, delay);
    }

    #[tokio::test]
    async fn test_reset_metrics() {
        let slow = SlowFsBackend::counting(memory_with_file());
        slow.read_dir(&EntryHandle::new("/p")).await.unwrap();
        slow.reset_metrics().await;
        assert_eq!(slow.metrics().await.total_calls(), 0);
    }
}
