//! Mock transport for testing.
//!
//! Allows queueing inbound frames and capturing sent frames for verification.

use super::{Transport, TransportError};
use async_trait::async_trait;
use logos_types::Frame;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Mock transport for testing.
///
/// By default `recv()` on an empty queue reports the connection as closed.
/// With [`MockTransport::hold_open`] it waits for the next queued frame
/// instead, which is what a live server looks like to the run loop.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
    arrivals: Arc<Notify>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    connected: bool,
    connected_address: Option<String>,
    connect_count: usize,
    hold_open: bool,
    sent_frames: Vec<Frame>,
    receive_queue: VecDeque<Frame>,
    fail_next_connect: Option<String>,
    fail_next_send: Option<String>,
    fail_next_recv: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `recv()` wait on an empty queue instead of reporting a close.
    pub fn hold_open(self) -> Self {
        self.inner.lock().unwrap().hold_open = true;
        self
    }

    /// Queue a frame to be returned by a later `recv()` call.
    pub fn queue_response(&self, frame: Frame) {
        let mut inner = self.inner.lock().unwrap();
        inner.receive_queue.push_back(frame);
        drop(inner);
        self.arrivals.notify_waiters();
    }

    /// Queue a text frame.
    pub fn queue_text(&self, json: &str) {
        self.queue_response(Frame::Text(json.to_string()));
    }

    /// Get all frames that were sent.
    pub fn sent_frames(&self) -> Vec<Frame> {
        let inner = self.inner.lock().unwrap();
        inner.sent_frames.clone()
    }

    /// Get the text of every sent text frame.
    pub fn sent_texts(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .sent_frames
            .iter()
            .filter_map(|f| match f {
                Frame::Text(text) => Some(text.clone()),
                Frame::Binary(_) => None,
            })
            .collect()
    }

    /// Get the last frame that was sent.
    pub fn last_sent(&self) -> Option<Frame> {
        let inner = self.inner.lock().unwrap();
        inner.sent_frames.last().cloned()
    }

    /// Get the address that was connected to.
    pub fn connected_address(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.connected_address.clone()
    }

    /// Number of `connect()` calls so far, failed ones included.
    pub fn connect_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.connect_count
    }

    /// Cause the next connect() to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_connect = Some(error.to_string());
    }

    /// Cause the next send() to fail with the given error.
    pub fn fail_next_send(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_send = Some(error.to_string());
    }

    /// Cause the next recv() to fail with the given error.
    ///
    /// Wakes a `recv()` that is waiting on an empty queue.
    pub fn fail_next_recv(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_recv = Some(error.to_string());
        drop(inner);
        self.arrivals.notify_waiters();
    }

    /// Clear all state (frames, queue, connection).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockTransportInner::default();
        drop(inner);
        self.arrivals.notify_waiters();
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            arrivals: Arc::clone(&self.arrivals),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, address: &str) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.connect_count += 1;

        // Check for forced failure
        if let Some(error) = inner.fail_next_connect.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        inner.connected = true;
        inner.connected_address = Some(address.to_string());
        Ok(())
    }

    async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.connected {
            return Err(TransportError::NotConnected);
        }

        // Check for forced failure
        if let Some(error) = inner.fail_next_send.take() {
            return Err(TransportError::SendFailed(error));
        }

        inner.sent_frames.push(frame);
        Ok(())
    }

    async fn recv(&self) -> Result<Frame, TransportError> {
        loop {
            // Register before checking so a frame queued in between still wakes us
            let arrival = self.arrivals.notified();
            {
                let mut inner = self.inner.lock().unwrap();

                if !inner.connected {
                    return Err(TransportError::NotConnected);
                }

                // Check for forced failure
                if let Some(error) = inner.fail_next_recv.take() {
                    return Err(TransportError::ReceiveFailed(error));
                }

                if let Some(frame) = inner.receive_queue.pop_front() {
                    return Ok(frame);
                }

                if !inner.hold_open {
                    return Err(TransportError::ConnectionClosed);
                }
            }
            arrival.await;
        }
    }

    fn is_connected(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.connected
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.connected = false;
        drop(inner);
        self.arrivals.notify_waiters();
        Ok(())
    }
}
