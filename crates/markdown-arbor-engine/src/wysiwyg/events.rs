use std::time::Duration;

use thiserror::Error;

/// Contract misuse signaled by the live pipeline. The call still returns a
/// clamped best-effort result; the error is published so the host can fix
/// its call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("cursor position {cursor} is past the end of the content ({len} bytes)")]
    CursorOutOfBounds { cursor: usize, len: usize },
}

/// Events published to subscribers of one processor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorEvent {
    Processed {
        generation: u64,
        processing_time: Duration,
        warning_count: usize,
    },
    Error {
        generation: u64,
        error: ProcessError,
    },
}

/// Live counters readable between calls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessorMetrics {
    pub last_processing_time: Option<Duration>,
    pub is_processing: bool,
    pub processed_count: u64,
}

pub type SubscriberId = u64;

/// Per-instance observer list. Each editor surface owns its processor and
/// therefore its subscribers; there is no process-wide event bus.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: SubscriberId,
    entries: Vec<(SubscriberId, Box<dyn Fn(&ProcessorEvent)>)>,
}

impl Subscribers {
    pub(crate) fn subscribe(
        &mut self,
        subscriber: impl Fn(&ProcessorEvent) + 'static,
    ) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(subscriber)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&self, event: &ProcessorEvent) {
        for (_, subscriber) in &self.entries {
            subscriber(event);
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}
