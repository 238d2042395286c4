//! Round correlation: grouping streamed output into user turns.
//!
//! A round is one user turn and the agent output it produced. One round is
//! *current* (receives new output) and one is *selected* (shown to the
//! caller). Selection follows the latest round until the caller manually
//! picks an older one; that pin holds until a new round starts or the session
//! is cleared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sse::A2aEvent;

/// One user turn and its accumulated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<String>,
}

impl Round {
    fn new(id: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            messages: Vec::new(),
        }
    }

    /// Output text of this round, one message per line.
    pub fn output_text(&self) -> String {
        self.messages.join("\n")
    }
}

/// Output extracted from one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutput {
    pub text: String,
    /// Extend the last message instead of adding a new one
    pub append: bool,
}

/// Extract displayable output from an event.
///
/// - `message`: text parts, unless the role is `user` (the prompt echo)
/// - `artifactUpdate`: concatenated text parts of the artifact
/// - `statusUpdate`: text of an attached non-user status message
/// - `task` and unknown payloads: nothing, they carry identity/progress only
pub fn extract_output(event: &A2aEvent) -> Option<RoundOutput> {
    let (text, append) = match event {
        A2aEvent::Message(message) if !message.is_from_user() => (message.text(), false),
        A2aEvent::ArtifactUpdate(update) => (update.artifact.text(), update.append),
        A2aEvent::StatusUpdate(update) => {
            let message = update.status.as_ref()?.message.as_ref()?;
            if message.is_from_user() {
                return None;
            }
            (message.text(), false)
        }
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Some(RoundOutput { text, append })
}

/// Ordered rounds plus current/selected tracking.
#[derive(Debug, Clone)]
pub struct RoundCorrelator {
    rounds: Vec<Round>,
    next_id: u64,
    current: Option<u64>,
    selected: Option<u64>,
    pinned: bool,
}

impl Default for RoundCorrelator {
    fn default() -> Self {
        Self {
            rounds: Vec::new(),
            next_id: 1,
            current: None,
            selected: None,
            pinned: false,
        }
    }
}

impl RoundCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new round for a send-type call.
    ///
    /// The new round becomes current and selected, and any manual pin is
    /// released.
    pub fn start_round(&mut self, now: DateTime<Utc>) -> &Round {
        let id = self.next_id;
        self.next_id += 1;
        self.rounds.push(Round::new(id, now));
        self.current = Some(id);
        self.selected = Some(id);
        self.pinned = false;
        &self.rounds[self.rounds.len() - 1]
    }

    /// Return the current round, creating one if none exists yet.
    pub fn ensure_current_round(&mut self, now: DateTime<Utc>) -> &Round {
        match self.current.and_then(|id| self.index_of(id)) {
            Some(index) => &self.rounds[index],
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.rounds.push(Round::new(id, now));
                self.current = Some(id);
                if !self.pinned {
                    self.selected = Some(id);
                }
                &self.rounds[self.rounds.len() - 1]
            }
        }
    }

    /// Append output to a round. Returns false if the round does not exist.
    ///
    /// A round receiving its first output is auto-selected unless pinned.
    pub fn append_output(&mut self, round_id: u64, output: RoundOutput) -> bool {
        let Some(index) = self.index_of(round_id) else {
            return false;
        };
        let round = &mut self.rounds[index];
        let first_output = round.messages.is_empty();
        match round.messages.last_mut() {
            Some(last) if output.append => last.push_str(&output.text),
            _ => round.messages.push(output.text),
        }
        if first_output && !self.pinned {
            self.selected = Some(round_id);
        }
        true
    }

    /// Replace a round's output with a single message.
    pub fn set_output_text(&mut self, round_id: u64, text: impl Into<String>) -> bool {
        let Some(index) = self.index_of(round_id) else {
            return false;
        };
        let text = text.into();
        self.rounds[index].messages = if text.is_empty() { Vec::new() } else { vec![text] };
        true
    }

    /// Select a round for display.
    ///
    /// A manual selection of anything but the latest round pins the selector
    /// to it; manually selecting the latest round releases the pin.
    pub fn select_round(&mut self, round_id: u64, manual: bool) -> bool {
        if self.index_of(round_id).is_none() {
            return false;
        }
        self.selected = Some(round_id);
        if manual {
            self.pinned = self.latest_id() != Some(round_id);
        }
        true
    }

    /// Text of the selected round, or empty when nothing is selected.
    pub fn current_output_text(&self) -> String {
        self.selected_round()
            .map(Round::output_text)
            .unwrap_or_default()
    }

    /// Drop every round and restart numbering at 1.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, round_id: u64) -> Option<&Round> {
        self.index_of(round_id).map(|index| &self.rounds[index])
    }

    pub fn current_round_id(&self) -> Option<u64> {
        self.current
    }

    pub fn selected_round_id(&self) -> Option<u64> {
        self.selected
    }

    pub fn selected_round(&self) -> Option<&Round> {
        self.selected.and_then(|id| self.round(id))
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn latest_id(&self) -> Option<u64> {
        self.rounds.last().map(|round| round.id)
    }

    // Ids are assigned in push order, so the list is sorted by id.
    fn index_of(&self, round_id: u64) -> Option<usize> {
        self.rounds.binary_search_by_key(&round_id, |round| round.id).ok()
    }
}
