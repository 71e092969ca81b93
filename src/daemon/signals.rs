//! Shutdown signalling between the OS signal thread and the poll loop.
//!
//! The loop only looks at the signal while it sleeps, so a cycle that has
//! started always runs to completion.

#![allow(missing_docs)]

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};

/// Sending half; cloneable, usable from any thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Sender<()>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        // A full buffer means shutdown is already pending.
        let _ = self.tx.try_send(());
    }
}

/// Receiving half, owned by the loop.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: Receiver<()>,
    // Keeps the channel connected so waits time out instead of returning
    // immediately once every external handle is gone.
    _keepalive: Sender<()>,
}

impl ShutdownSignal {
    #[must_use]
    pub fn channel() -> (ShutdownHandle, Self) {
        let (tx, rx) = bounded(1);
        (
            ShutdownHandle { tx: tx.clone() },
            Self { rx, _keepalive: tx },
        )
    }

    /// A signal nobody can trigger.
    #[must_use]
    pub fn never() -> Self {
        Self::channel().1
    }

    /// Sleep for up to `timeout`. Returns `true` if shutdown was requested.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

/// Route SIGINT, SIGTERM and SIGHUP to a fresh [`ShutdownSignal`].
#[cfg(feature = "daemon")]
pub fn install() -> crate::core::errors::Result<ShutdownSignal> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    use crate::core::errors::HsbError;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP]).map_err(|err| HsbError::Runtime {
        details: format!("cannot install signal handlers: {err}"),
    })?;
    let (handle, signal) = ShutdownSignal::channel();

    std::thread::Builder::new()
        .name("hsb-signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                tracing::info!(signal = sig, "shutdown requested, stopping after current cycle");
                handle.trigger();
            }
        })
        .map_err(|err| HsbError::Runtime {
            details: format!("cannot spawn signal thread: {err}"),
        })?;

    Ok(signal)
}
