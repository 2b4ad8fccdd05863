//! # Messaging layer seam.
//!
//! The supervisor talks to the rest of the platform through named topics:
//! it polls the upgrade topic for control commands and publishes module paths
//! on the downgrade topic. The transport itself (shared memory, sockets, ...)
//! is not this crate's concern; it is consumed behind the [`MessageBus`]
//! trait.
//!
//! ## Contents
//! - [`MessageBus`] — `publish` / `try_receive` contract
//! - [`LocalBus`] — in-process FIFO topic queues (tests, single-process runs)
//!
//! ## Rules
//! - `try_receive` never blocks waiting for a message; the supervisor loop
//!   polls it once per tick.
//! - Messages are plain strings (module executable paths on both control
//!   topics).

mod local;

pub use local::LocalBus;

use async_trait::async_trait;

/// Publish/subscribe seam to the platform messaging layer.
///
/// Implementations must be cheap to call from the supervisor loop: `publish`
/// may await internal locking but must not wait for consumers, and
/// `try_receive` returns immediately with `None` when no message is pending.
#[async_trait]
pub trait MessageBus: Send + Sync + 'static {
    /// Publishes `message` on `topic`.
    ///
    /// Delivery is fire-and-forget; the supervisor never waits for an
    /// acknowledgement.
    async fn publish(&self, topic: &str, message: &str);

    /// Takes the oldest pending message on `topic`, if any.
    ///
    /// Returns `None` both for an empty topic and for a topic nothing has
    /// published to yet.
    async fn try_receive(&self, topic: &str) -> Option<String>;
}
