//! The transcript and the persisted history behind it.

use crate::message::Message;
use crate::storage::HistoryStorage;

/// Holds the displayed transcript and the durable history.
///
/// Every finalized message appended to the transcript is mirrored into
/// the history, in the same order, and the history is flushed to its
/// storage on each change. Flush failures are logged and otherwise
/// ignored: the in-memory history stays authoritative for this run.
pub struct TranscriptStore {
    transcript: Vec<Message>,
    history: Vec<Message>,
    storage: Box<dyn HistoryStorage>,
}

impl TranscriptStore {
    /// Opens the store, reading the history from `storage` once.
    ///
    /// Unreadable history is treated as empty.
    pub fn open<S: HistoryStorage>(storage: S) -> Self {
        let history = match storage.load() {
            Ok(history) => {
                debug!("loaded {} history messages", history.len());
                // A placeholder never belongs in the history, drop any
                // that a foreign writer may have left behind.
                history.into_iter().filter(|m| !m.is_pending()).collect()
            }
            Err(err) => {
                warn!("failed to load history, starting empty: {err}");
                vec![]
            }
        };
        Self {
            transcript: vec![],
            history,
            storage: Box::new(storage),
        }
    }

    /// Messages currently displayed, in order.
    #[inline]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// All finalized messages ever appended, in order.
    #[inline]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Returns `true` if the reply placeholder is displayed.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.transcript.iter().any(Message::is_pending)
    }

    /// Appends a message to the transcript, and to the history unless it
    /// is a placeholder.
    pub fn append(&mut self, message: Message) {
        if message.is_pending() {
            self.append_pending();
            return;
        }
        self.history.push(message.clone());
        self.transcript.push(message);
        self.flush_history();
    }

    /// Appends the reply placeholder.
    ///
    /// Only one placeholder may exist at a time, a second call is
    /// ignored.
    pub fn append_pending(&mut self) {
        if self.has_pending() {
            warn!("a reply placeholder is already displayed");
            return;
        }
        self.transcript.push(Message::pending());
    }

    /// Removes the reply placeholder if there is one.
    #[inline]
    pub fn remove_pending(&mut self) {
        self.transcript.retain(|m| !m.is_pending());
    }

    /// Replaces the transcript with the whole history.
    #[inline]
    pub fn replace_with_history(&mut self) {
        self.transcript = self.history.clone();
    }

    /// Empties the transcript. The history is kept.
    #[inline]
    pub fn reset(&mut self) {
        self.transcript.clear();
    }

    /// Empties the history and removes its durable copy. The transcript is
    /// kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
        if let Err(err) = self.storage.remove() {
            warn!("failed to remove stored history: {err}");
        }
    }

    fn flush_history(&mut self) {
        if let Err(err) = self.storage.save(&self.history) {
            warn!("failed to save history: {err}");
        }
    }
}
