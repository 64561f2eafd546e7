//! Debounce primitive: forwards a value only after it stayed unchanged for
//! a full quiet period.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

enum Input<T> {
    Value(T),
    Cancel,
}

/// Handle feeding values into a debounce timer task.
///
/// Only the most recent value survives; each push restarts the timer.
/// Dropping the handle stops the task without emitting the pending value.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<Input<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the timer task. Settled values arrive on the returned receiver.
    pub fn new(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, input_rx) = mpsc::unbounded_channel();
        let (output, output_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(quiet, input_rx, output));
        (Self { input, task }, output_rx)
    }

    /// Replace the pending value and restart the quiet period
    pub fn push(&self, value: T) {
        let _ = self.input.send(Input::Value(value));
    }

    /// Drop the pending value, if any
    pub fn cancel(&self) {
        let _ = self.input.send(Input::Cancel);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T>(
    quiet: Duration,
    mut input: mpsc::UnboundedReceiver<Input<T>>,
    output: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;
    loop {
        match pending.take() {
            None => match input.recv().await {
                Some(Input::Value(v)) => pending = Some(v),
                Some(Input::Cancel) => {}
                None => return,
            },
            Some(value) => {
                tokio::select! {
                    next = input.recv() => match next {
                        Some(Input::Value(v)) => pending = Some(v),
                        Some(Input::Cancel) => {}
                        None => return,
                    },
                    _ = time::sleep(quiet) => {
                        if output.send(value).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}
