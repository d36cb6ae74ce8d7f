//! Test doubles for the process seam.

use std::io;
use parking_lot::Mutex;

use crate::process::{CommandOutcome, CommandRunner, Invocation};

type Handler = Box<dyn Fn(&Invocation) -> io::Result<CommandOutcome> + Send + Sync>;

/// Records every invocation instead of spawning it.
///
/// The handler decides the outcome and may touch the filesystem to simulate
/// what the real tool would have installed.
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    handler: Handler,
}

impl RecordingRunner {
    /// Every invocation succeeds
    pub fn succeeding() -> Self {
        Self::with_handler(|_| Ok(CommandOutcome::success()))
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&Invocation) -> io::Result<CommandOutcome> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Snapshot of the recorded invocations, in call order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    /// Recorded invocations whose arguments start with `prefix`
    pub fn invocations_with_args(&self, prefix: &[&str]) -> Vec<Invocation> {
        self.calls
            .lock()
            .iter()
            .filter(|inv| {
                inv.args.len() >= prefix.len()
                    && inv.args.iter().zip(prefix).all(|(arg, want)| arg == want)
            })
            .cloned()
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutcome> {
        self.calls.lock().push(invocation.clone());
        (self.handler)(invocation)
    }
}
