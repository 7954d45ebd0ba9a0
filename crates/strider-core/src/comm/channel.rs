//! Channels for inter-thread communication
//!
//! Wrapper around crossbeam-channel, shaped for the sensor-to-control path:
//! a producer pushes samples without blocking, and the consumer either waits
//! with a deadline or skips straight to the newest value.

use crossbeam_channel::{self as cc, RecvTimeoutError, TryRecvError, TrySendError};
use std::time::Duration;

use crate::{Error, Result};

/// Sender half of a channel
#[derive(Debug)]
pub struct Sender<T> {
    inner: cc::Sender<T>,
}

impl<T> Sender<T> {
    /// Send a value, blocking until space is available
    #[inline]
    pub fn send(&self, value: T) -> Result<()> {
        self.inner.send(value).map_err(|_| Error::ChannelClosed)
    }

    /// Try to send without blocking
    #[inline]
    pub fn try_send(&self, value: T) -> Result<()> {
        match self.inner.try_send(value) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(Error::ChannelFull),
            Err(TrySendError::Disconnected(_)) => Err(Error::ChannelClosed),
        }
    }

    /// Check if the channel is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the number of queued messages
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Receiver half of a channel
#[derive(Debug)]
pub struct Receiver<T> {
    pub(crate) inner: cc::Receiver<T>,
}

impl<T> Receiver<T> {
    /// Receive a value, blocking until one is available
    #[inline]
    pub fn recv(&self) -> Result<T> {
        self.inner.recv().map_err(|_| Error::ChannelClosed)
    }

    /// Try to receive without blocking
    #[inline]
    pub fn try_recv(&self) -> Result<Option<T>> {
        match self.inner.try_recv() {
            Ok(v) => Ok(Some(v)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Receive with a deadline; `None` means the deadline passed
    #[inline]
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<T>> {
        match self.inner.recv_timeout(timeout) {
            Ok(v) => Ok(Some(v)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Drain all queued messages, oldest first
    #[inline]
    pub fn drain(&self) -> Vec<T> {
        let mut v = Vec::with_capacity(self.inner.len());
        while let Ok(msg) = self.inner.try_recv() {
            v.push(msg);
        }
        v
    }

    /// Get the newest queued message, discarding older ones
    #[inline]
    pub fn latest(&self) -> Result<Option<T>> {
        let mut latest = match self.inner.try_recv() {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        while let Ok(v) = self.inner.try_recv() {
            latest = v;
        }
        Ok(Some(latest))
    }

    /// Check if the channel is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the number of queued messages
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Create a bounded channel with the specified capacity
pub fn bounded_channel<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = cc::bounded(capacity);
    (Sender { inner: tx }, Receiver { inner: rx })
}

/// Create an unbounded channel
pub fn unbounded_channel<T>() -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = cc::unbounded();
    (Sender { inner: tx }, Receiver { inner: rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_channel() {
        let (tx, rx) = bounded_channel::<i32>(4);
        tx.send(42).unwrap();
        assert_eq!(rx.recv().unwrap(), 42);
    }

    #[test]
    fn test_bounded_channel_full() {
        let (tx, _rx) = bounded_channel::<i32>(1);
        tx.try_send(1).unwrap();
        assert!(matches!(tx.try_send(2), Err(Error::ChannelFull)));
    }

    #[test]
    fn test_closed_channel() {
        let (tx, rx) = bounded_channel::<i32>(4);
        drop(rx);
        assert!(matches!(tx.send(1), Err(Error::ChannelClosed)));

        let (tx, rx) = bounded_channel::<i32>(4);
        drop(tx);
        assert!(matches!(rx.recv(), Err(Error::ChannelClosed)));
    }

    #[test]
    fn test_try_recv() {
        let (tx, rx) = bounded_channel::<i32>(4);
        assert!(rx.try_recv().unwrap().is_none());
        tx.send(42).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Some(42));
    }

    #[test]
    fn test_recv_timeout_deadline() {
        let (_tx, rx) = bounded_channel::<i32>(4);
        let got = rx.recv_timeout(Duration::from_millis(5)).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_drain() {
        let (tx, rx) = bounded_channel::<i32>(4);
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        tx.send(3).unwrap();
        assert_eq!(rx.drain(), vec![1, 2, 3]);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_latest_skips_stale() {
        let (tx, rx) = bounded_channel::<i32>(8);
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        tx.send(3).unwrap();
        assert_eq!(rx.latest().unwrap(), Some(3));
        assert_eq!(rx.latest().unwrap(), None);
    }
}
