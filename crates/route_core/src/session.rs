//! Route form state and the submission state machine.
//!
//! [`SessionState`] holds everything the form renders and changes only
//! through synchronous calls. [`RouteSession`] pairs it with a
//! [`CompletionService`] and drives `Idle -> Submitting -> Idle`.

use std::time::Duration;

use shared::{
    domain::{AddressEntry, ChatMessage},
    error::SessionError,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    completion::{CompletionRequest, CompletionService},
    error::ServiceError,
    prompt::{
        completion_prompt, user_message_text, SERVICE_UNAVAILABLE_MESSAGE,
        VALIDATION_FAILED_MESSAGE, WELCOME_MESSAGE,
    },
    validator,
};

/// How long a validation error stays visible.
pub const VALIDATION_ERROR_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Some row was blank or flagged; nothing was sent.
    Rejected,
    /// A submission was already in flight; the call was ignored.
    Busy,
    /// The assistant reply was appended to the transcript.
    Answered,
    /// The completion call failed; a service error is set.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// The row was not the last one.
    Ignored,
    AddedEntry,
    Submitted(SubmitOutcome),
}

#[derive(Debug, Clone)]
struct ActiveError {
    error: SessionError,
    expires_at: Option<Instant>,
}

impl ActiveError {
    fn is_live_at(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    entries: Vec<AddressEntry>,
    transcript: Vec<ChatMessage>,
    is_loading: bool,
    last_error: Option<ActiveError>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// One empty row and the welcome message.
    pub fn new() -> Self {
        Self {
            entries: vec![AddressEntry::default()],
            transcript: vec![ChatMessage::system(WELCOME_MESSAGE)],
            is_loading: false,
            last_error: None,
        }
    }

    pub fn entries(&self) -> &[AddressEntry] {
        &self.entries
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error_at(Instant::now())
    }

    pub fn last_error_at(&self, now: Instant) -> Option<&SessionError> {
        self.last_error
            .as_ref()
            .filter(|active| active.is_live_at(now))
            .map(|active| &active.error)
    }

    /// Drops a validation error whose display time has passed.
    pub fn clear_expired_error(&mut self) {
        let now = Instant::now();
        if self
            .last_error
            .as_ref()
            .is_some_and(|active| !active.is_live_at(now))
        {
            self.last_error = None;
        }
    }

    /// Replaces row `index` and recomputes its flag. Out-of-range indices are
    /// ignored and reported as `false`.
    pub fn edit_entry(&mut self, index: usize, value: impl Into<String>) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            debug!(index, rows = self.entries.len(), "edit for missing row ignored");
            return false;
        };
        let value = value.into();
        entry.is_invalid = validator::is_flagged(&value);
        entry.value = value;
        true
    }

    pub fn add_entry(&mut self) {
        self.entries.push(AddressEntry::default());
    }

    /// Removes row `index` unless it is the only row left.
    pub fn remove_entry(&mut self, index: usize) -> bool {
        if self.entries.len() <= 1 || index >= self.entries.len() {
            debug!(index, rows = self.entries.len(), "row removal ignored");
            return false;
        }
        self.entries.remove(index);
        true
    }

    /// Every row is filled and none is flagged.
    pub fn is_ready(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| !entry.is_blank() && !entry.is_invalid)
    }

    /// What a submit button should reflect.
    pub fn can_submit(&self) -> bool {
        !self.is_loading && self.is_ready()
    }

    /// Validates the rows and, when they pass, records the user message, marks
    /// the session as loading and returns the request to send.
    pub fn begin_submission(&mut self) -> Result<CompletionRequest, SubmitOutcome> {
        if self.is_loading {
            debug!("submission already in flight");
            return Err(SubmitOutcome::Busy);
        }

        if !self.is_ready() {
            warn!(rows = self.entries.len(), "submission rejected by validation");
            self.last_error = Some(ActiveError {
                error: SessionError::validation(VALIDATION_FAILED_MESSAGE),
                expires_at: Some(Instant::now() + VALIDATION_ERROR_TTL),
            });
            return Err(SubmitOutcome::Rejected);
        }

        self.transcript
            .push(ChatMessage::user(user_message_text(&self.entries)));
        self.is_loading = true;
        self.last_error = None;
        info!(rows = self.entries.len(), "route submitted");

        Ok(CompletionRequest::new(completion_prompt(&self.entries)))
    }

    /// Folds the completion result into the transcript or the error slot and
    /// leaves the session idle.
    pub fn finish_submission(&mut self, result: Result<String, ServiceError>) -> SubmitOutcome {
        self.is_loading = false;
        match result {
            Ok(reply) => {
                self.transcript.push(ChatMessage::assistant(reply));
                SubmitOutcome::Answered
            }
            Err(err) => {
                warn!(%err, "route optimization request failed");
                self.last_error = Some(ActiveError {
                    error: SessionError::service(SERVICE_UNAVAILABLE_MESSAGE),
                    expires_at: None,
                });
                SubmitOutcome::Failed
            }
        }
    }
}

/// Holds the loading flag for one in-flight call and releases it on drop,
/// including when the submit future is dropped before the reply arrives.
struct InFlight<'a> {
    state: &'a mut SessionState,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a mut SessionState) -> Self {
        Self { state }
    }

    fn finish(self, result: Result<String, ServiceError>) -> SubmitOutcome {
        self.state.finish_submission(result)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.state.is_loading {
            debug!("submission abandoned before completion");
            self.state.is_loading = false;
        }
    }
}

pub struct RouteSession<S: CompletionService> {
    state: SessionState,
    service: S,
}

impl<S: CompletionService> RouteSession<S> {
    pub fn new(service: S) -> Self {
        Self {
            state: SessionState::new(),
            service,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn edit_entry(&mut self, index: usize, value: impl Into<String>) -> bool {
        self.state.edit_entry(index, value)
    }

    pub fn add_entry(&mut self) {
        self.state.add_entry();
    }

    pub fn remove_entry(&mut self, index: usize) -> bool {
        self.state.remove_entry(index)
    }

    pub fn clear_expired_error(&mut self) {
        self.state.clear_expired_error();
    }

    /// Never fails: every outcome is written into the session state and
    /// summarised by the returned [`SubmitOutcome`].
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request = match self.state.begin_submission() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        let in_flight = InFlight::new(&mut self.state);
        let result = self.service.complete(&request).await;
        in_flight.finish(result)
    }

    /// Enter on a row: the last row submits when it holds a valid address,
    /// otherwise a new row is opened.
    pub async fn handle_editing_shortcut(&mut self, index: usize) -> ShortcutAction {
        let last = self.state.entries.len() - 1;
        if index != last {
            return ShortcutAction::Ignored;
        }

        if validator::is_valid(&self.state.entries[last].value) {
            ShortcutAction::Submitted(self.submit().await)
        } else {
            self.add_entry();
            ShortcutAction::AddedEntry
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/session_proptests.rs"]
mod proptests;
