//! Deferred completion of asset loads
//!
//! Load futures are driven by a single-threaded [`LocalPool`] between frames.
//! The futures themselves only wait on results produced elsewhere (see
//! [`FsAssetLoader`](super::FsAssetLoader)), so driving them never blocks.
//! Each submitted load hands back a [`PendingLoad`] that can be polled
//! without blocking.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{
    channel::oneshot,
    executor::{LocalPool, LocalSpawner},
    task::LocalSpawnExt,
};
use log::warn;

use super::error::AssetError;

/// Receiving end of a submitted load
pub struct PendingLoad<T> {
    receiver: oneshot::Receiver<Result<T, AssetError>>,
}

impl<T> PendingLoad<T> {
    /// Returns the outcome once the load has finished, without blocking
    pub fn try_resolve(&mut self) -> Option<Result<T, AssetError>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(AssetError::Cancelled)),
        }
    }
}

impl<T> Future for PendingLoad<T> {
    type Output = Result<T, AssetError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(AssetError::Cancelled)))
    }
}

/// Single-threaded executor for asset loads
pub struct LoadQueue {
    pool: LocalPool,
    spawner: LocalSpawner,
}

impl Default for LoadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadQueue {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self { pool, spawner }
    }

    /// Schedules `load`; it makes progress only inside [`LoadQueue::run_until_stalled`]
    pub fn submit<T, F>(&mut self, load: F) -> PendingLoad<T>
    where
        T: 'static,
        F: Future<Output = Result<T, AssetError>> + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let task = async move {
            let _ = sender.send(load.await);
        };
        if let Err(e) = self.spawner.spawn_local(task) {
            // The dropped sender resolves the receiver as cancelled
            warn!("Failed to schedule asset load: {}", e);
        }
        PendingLoad { receiver }
    }

    /// Drives every scheduled load as far as it can go without blocking
    pub fn run_until_stalled(&mut self) {
        self.pool.run_until_stalled();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_completes_only_when_driven() {
        let mut queue = LoadQueue::new();
        let mut pending = queue.submit(async { Ok::<_, AssetError>(7) });

        assert!(pending.try_resolve().is_none());
        queue.run_until_stalled();
        assert_eq!(pending.try_resolve(), Some(Ok(7)));
    }

    #[test]
    fn test_failed_load_carries_error() {
        let mut queue = LoadQueue::new();
        let mut pending =
            queue.submit(async { Err::<u8, _>(AssetError::NotFound("x.png".to_string())) });
        queue.run_until_stalled();
        assert_eq!(
            pending.try_resolve(),
            Some(Err(AssetError::NotFound("x.png".to_string())))
        );
    }

    #[test]
    fn test_dropped_queue_cancels_pending() {
        let mut queue = LoadQueue::new();
        let mut pending = queue.submit(async { Ok::<_, AssetError>(1) });
        drop(queue);
        assert_eq!(pending.try_resolve(), Some(Err(AssetError::Cancelled)));
    }
}
