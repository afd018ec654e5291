//! Debounced query controller
//!
//! Converts live-typed input into settled queries and decides which fetch
//! responses may reach the display. The controller is a pure state machine:
//! it never sleeps or spawns, callers pass the current instant in and poll
//! it when its deadline passes. Tokens are a generation counter minted on
//! every settled-query change; a response commits only if it carries the
//! newest token.

use std::fmt;
use std::time::Duration;

use cinetrend_core::config::MAX_DEBOUNCE_WINDOW;
use tokio::time::Instant;

/// Generation number identifying one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchToken(u64);

impl FetchToken {
    /// Raw generation number.
    pub fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FetchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Timer state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncePhase {
    /// No input received since mount.
    Idle,
    /// Input changed; the window closes at `deadline` unless more input arrives.
    Pending {
        /// Instant at which the current input settles
        deadline: Instant,
    },
    /// The window elapsed and the input was promoted to the settled query.
    Settled,
}

/// A fetch the caller must issue for a newly settled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Token the response must carry to be committed
    pub token: FetchToken,
    /// Settled query; empty means browse popular
    pub query: String,
}

/// Snapshot of the controller's query bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Latest input exactly as typed
    pub raw_input: String,
    /// Last value promoted after a quiet window
    pub settled_query: String,
    /// Token of the newest issued fetch
    pub in_flight_token: Option<FetchToken>,
    /// Token of the last response allowed onto the display
    pub last_committed_token: Option<FetchToken>,
}

/// Debounce and response-ordering state machine.
#[derive(Debug, Clone)]
pub struct QueryController {
    window: Duration,
    raw_input: String,
    settled_query: String,
    phase: DebouncePhase,
    mounted: bool,
    next_generation: u64,
    in_flight: Option<FetchToken>,
    last_committed: Option<FetchToken>,
}

impl QueryController {
    /// Creates a controller that settles input after `window` of quiet.
    ///
    /// Windows longer than `MAX_DEBOUNCE_WINDOW` are clamped.
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.min(MAX_DEBOUNCE_WINDOW),
            raw_input: String::new(),
            settled_query: String::new(),
            phase: DebouncePhase::Idle,
            mounted: false,
            next_generation: 0,
            in_flight: None,
            last_committed: None,
        }
    }

    /// Issues the initial fetch for the empty query.
    ///
    /// Returns `None` when already mounted.
    pub fn mount(&mut self) -> Option<FetchRequest> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        Some(self.issue())
    }

    /// Accepts a keystroke and restarts the debounce window.
    pub fn on_input(&mut self, text: impl Into<String>, now: Instant) {
        self.raw_input = text.into();
        let deadline = now.checked_add(self.window).unwrap_or(now);
        self.phase = DebouncePhase::Pending { deadline };
    }

    /// Deadline of the running window, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            DebouncePhase::Pending { deadline } => Some(deadline),
            DebouncePhase::Idle | DebouncePhase::Settled => None,
        }
    }

    /// Settles the input if the window has elapsed at `now`.
    ///
    /// Yields a fetch request only when the settled query actually changes.
    /// Input is trimmed on settle, so whitespace-only input settles to the
    /// empty query.
    pub fn poll_settle(&mut self, now: Instant) -> Option<FetchRequest> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }

        self.phase = DebouncePhase::Settled;
        let candidate = self.raw_input.trim();
        if candidate == self.settled_query {
            tracing::debug!("Input settled unchanged on '{}'", self.settled_query);
            return None;
        }

        self.settled_query = candidate.to_string();
        Some(self.issue())
    }

    /// Decides whether the response for `token` may reach the display.
    ///
    /// A token commits at most once and only while it is the newest issued.
    pub fn commit(&mut self, token: FetchToken) -> bool {
        if !self.is_current(token) || self.last_committed == Some(token) {
            tracing::debug!("Discarding response {token}");
            return false;
        }
        self.last_committed = Some(token);
        true
    }

    /// Checks if `token` belongs to the newest issued fetch.
    pub fn is_current(&self, token: FetchToken) -> bool {
        self.in_flight == Some(token)
    }

    /// Current debounce phase.
    pub fn phase(&self) -> DebouncePhase {
        self.phase
    }

    /// Latest input exactly as typed.
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// Last settled query.
    pub fn settled_query(&self) -> &str {
        &self.settled_query
    }

    /// Debounce window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Snapshot of query bookkeeping.
    pub fn state(&self) -> QueryState {
        QueryState {
            raw_input: self.raw_input.clone(),
            settled_query: self.settled_query.clone(),
            in_flight_token: self.in_flight,
            last_committed_token: self.last_committed,
        }
    }

    fn issue(&mut self) -> FetchRequest {
        self.next_generation += 1;
        let token = FetchToken(self.next_generation);
        self.in_flight = Some(token);
        tracing::debug!("Issuing fetch {token} for '{}'", self.settled_query);
        FetchRequest {
            token,
            query: self.settled_query.clone(),
        }
    }
}
