/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for long-running operations.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for long-running index operations.

use std::fmt::Debug;
use std::sync::{Arc, mpsc};
use std::thread;

/// Progress events emitted during index construction and query batches.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// Event indicating a packed tree build finished.
    TreePacked { num_points: usize },

    /// Event indicating incremental insertion finished.
    PointsInserted { num_points: usize },

    /// Event indicating a query/interpolation batch finished.
    BatchCompleted { num_positions: usize },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_sink_delivers_messages() {
        let (counter_tx, counter_rx) = mpsc::channel();
        let (sink, handle) = closure_sink(8, move |msg| {
            if let ProgressMsg::TreePacked { num_points } = msg {
                let _ = counter_tx.send(num_points);
            }
        });

        sink.emit(ProgressMsg::TreePacked { num_points: 42 });
        assert_eq!(counter_rx.recv().unwrap(), 42);

        drop(sink);
        handle.join().unwrap();
    }
}
