//! Session event types and broadcasting.
//!
//! The session controller publishes an event for every observable change so a
//! front end can redraw without polling.
//!
//! # Event Types
//!
//! - `phase_changed` - The session moved between phases
//! - `tick` - One second of a practice test countdown elapsed
//! - `time_expired` - The countdown reached zero and the test was submitted
//! - `answer_recorded` - An answer was stored or overwritten
//! - `navigated` - The item cursor moved or a card was flipped
//! - `stale_result_discarded` - A generation finished after the session moved on
//! - `error` - A failure was surfaced to the user
//!
//! # Example
//!
//! ```no_run
//! use studyai_core::events::{EventBroadcaster, SessionEvent};
//! use studyai_core::Phase;
//!
//! # async fn example() {
//! let broadcaster = EventBroadcaster::new(100);
//! let mut receiver = broadcaster.subscribe();
//!
//! broadcaster.send(SessionEvent::phase_changed(Phase::Idle, Phase::Pending));
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::Phase;

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload for the `phase_changed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChangedPayload {
    /// Phase before the transition.
    pub from: Phase,
    /// Phase after the transition.
    pub to: Phase,
}

/// Payload for the `tick` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickPayload {
    /// Seconds left on the countdown.
    pub remaining_secs: u64,
}

/// Payload for the `answer_recorded` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecordedPayload {
    /// Question the answer belongs to.
    pub question_id: u32,
    /// Number of questions answered so far.
    pub answered: usize,
}

/// Payload for the `navigated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatedPayload {
    /// New cursor position.
    pub index: usize,
    /// Whether the current card shows its back.
    pub flipped: bool,
}

/// Payload for the `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Event Enum
// ============================================================================

/// Session events.
///
/// All events are serialized as JSON objects with "event" and "payload" fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Sent on every phase transition.
    PhaseChanged(PhaseChangedPayload),
    /// Sent once per countdown second.
    Tick(TickPayload),
    /// Sent when a countdown expires.
    TimeExpired,
    /// Sent when an answer is stored.
    AnswerRecorded(AnswerRecordedPayload),
    /// Sent when the cursor or flip state changes.
    Navigated(NavigatedPayload),
    /// Sent when a late generation result is dropped.
    StaleResultDiscarded,
    /// Sent when an error is surfaced.
    Error(ErrorPayload),
}

impl SessionEvent {
    /// Creates a `PhaseChanged` event.
    #[must_use]
    pub const fn phase_changed(from: Phase, to: Phase) -> Self {
        Self::PhaseChanged(PhaseChangedPayload { from, to })
    }

    /// Creates a `Tick` event.
    #[must_use]
    pub const fn tick(remaining_secs: u64) -> Self {
        Self::Tick(TickPayload { remaining_secs })
    }

    /// Creates an `AnswerRecorded` event.
    #[must_use]
    pub const fn answer_recorded(question_id: u32, answered: usize) -> Self {
        Self::AnswerRecorded(AnswerRecordedPayload {
            question_id,
            answered,
        })
    }

    /// Creates a `Navigated` event.
    #[must_use]
    pub const fn navigated(index: usize, flipped: bool) -> Self {
        Self::Navigated(NavigatedPayload { index, flipped })
    }

    /// Creates an `Error` event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::PhaseChanged(_) => "phase_changed",
            Self::Tick(_) => "tick",
            Self::TimeExpired => "time_expired",
            Self::AnswerRecorded(_) => "answer_recorded",
            Self::Navigated(_) => "navigated",
            Self::StaleResultDiscarded => "stale_result_discarded",
            Self::Error(_) => "error",
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Broadcasts session events to every subscriber.
///
/// Uses a tokio broadcast channel. Events are not kept for late subscribers.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBroadcaster {
    /// Creates a new `EventBroadcaster` with the specified buffer capacity.
    ///
    /// The buffer determines how many events can be queued per subscriber
    /// before old events are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new subscriber for receiving events.
    ///
    /// A subscriber that falls behind receives a `Lagged` error and misses
    /// some events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Broadcasts an event to all subscribers.
    ///
    /// Returns the number of receivers that will see the event.
    pub fn send(&self, event: SessionEvent) -> usize {
        // Err only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
