//! Task spawning on the shared tokio runtime
//!
//! `run_native` enters a multi-threaded runtime before the UI starts, so code running on the
//! UI thread can spawn network work here and poll for its results each frame.

/// Spawn an async task on the current runtime
///
/// Panics when called outside a runtime; check [`in_runtime_context`] first when unsure.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    // Tag spawned tasks so they can be told apart in profiling traces
    #[cfg(feature = "profiling")]
    {
        tokio::spawn(async move {
            profiling::scope!(
                "async_runtime::spawn",
                format!("task_type={}", std::any::type_name::<F>()).as_str()
            );
            future.await
        })
    }
    #[cfg(not(feature = "profiling"))]
    {
        tokio::spawn(future)
    }
}

/// Check if we're running inside a tokio runtime context
pub fn in_runtime_context() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_runtime() {
        assert!(!in_runtime_context());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spawn_returns_output() {
        assert!(in_runtime_context());
        let handle = spawn(async { 21 * 2 });
        assert_eq!(handle.await.unwrap(), 42);
    }
}
