//! In-memory `Runtime` double. Always compiled (not test-gated) so both
//! this crate's unit tests and the `tests/gate.rs` integration suite can
//! drive the Gate Controller without a real container runtime on PATH.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::Runtime;

#[derive(Default)]
pub struct FakeRuntime {
    pub running: Mutex<HashSet<String>>,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
}

impl Runtime for FakeRuntime {
    fn is_running<'a>(&'a self, name: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        let running = self.running.lock().unwrap().contains(name);
        Box::pin(async move { running })
    }

    fn start<'a>(
        &'a self,
        name: &'a str,
        _image: &'a str,
        _port: u16,
        _volumes: &'a [String],
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.running.lock().unwrap().insert(name.to_string());
        Box::pin(async move {})
    }

    fn stop<'a>(&'a self, name: &'a str) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.running.lock().unwrap().remove(name);
        Box::pin(async move {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_runtime_tracks_running_state() {
        let runtime = FakeRuntime::default();
        assert!(!runtime.is_running("wake_media-asr").await);
        runtime.start("wake_media-asr", "img:latest", 9090, &[]).await;
        assert!(runtime.is_running("wake_media-asr").await);
        runtime.stop("wake_media-asr").await;
        assert!(!runtime.is_running("wake_media-asr").await);
    }

    #[tokio::test]
    async fn fake_runtime_counts_calls() {
        let runtime = FakeRuntime::default();
        runtime.start("a", "img", 1, &[]).await;
        runtime.start("a", "img", 1, &[]).await;
        assert_eq!(runtime.start_calls.load(Ordering::SeqCst), 2);
    }
}
