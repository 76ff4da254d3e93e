use tracing::debug;

use crate::{
    error::{FetchError, ValidationError},
    model::Payload,
};

/// Where a unit's request currently stands. Exactly one holds at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(Payload),
    Failure(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestState::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            RequestState::Success(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Identifies one submission. Only the most recent ticket may resolve the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Per-unit reducer: the request state plus the submission counter that fences
/// out-of-order responses.
#[derive(Debug, Default)]
pub struct UnitState {
    state: RequestState,
    issued: u64,
}

impl UnitState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Enter `Loading` for a new submission and hand out its ticket.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.state = RequestState::Loading;
        Ticket(self.issued)
    }

    /// Rejected input never reaches the network. It also supersedes any
    /// request still in flight, so a late response cannot overwrite the message.
    pub fn fail_validation(&mut self, err: &ValidationError) {
        self.issued += 1;
        self.state = RequestState::Failure(err.to_string());
    }

    /// Apply the outcome of `ticket`'s request. Returns `false` and leaves the
    /// state untouched when a newer submission has been issued since.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<Payload, FetchError>) -> bool {
        if ticket.0 != self.issued {
            debug!(ticket = ticket.0, latest = self.issued, "discarding stale response");
            return false;
        }

        self.state = match outcome {
            Ok(payload) => RequestState::Success(payload),
            Err(err) => RequestState::Failure(err.user_message()),
        };
        true
    }
}
