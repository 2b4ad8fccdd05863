//! # In-process message bus.
//!
//! [`LocalBus`] keeps one FIFO queue per topic behind a single async mutex.
//! It backs the test suite and single-process deployments where the
//! supervisor and the upgrade authority live in the same binary.
//!
//! ## Rules
//! - Topics are created lazily on first publish.
//! - `try_receive` pops the oldest message (insertion order preserved).
//! - No capacity limit; control topics carry a handful of short paths, not
//!   telemetry volume.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::MessageBus;

/// FIFO topic queues shared within one process.
#[derive(Default)]
pub struct LocalBus {
    topics: Mutex<HashMap<String, VecDeque<String>>>,
}

impl LocalBus {
    /// Creates an empty bus with no topics.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageBus for LocalBus {
    async fn publish(&self, topic: &str, message: &str) {
        let mut topics = self.topics.lock().await;
        topics
            .entry(topic.to_string())
            .or_default()
            .push_back(message.to_string());
    }

    async fn try_receive(&self, topic: &str) -> Option<String> {
        let mut topics = self.topics.lock().await;
        topics.get_mut(topic)?.pop_front()
    }
}
