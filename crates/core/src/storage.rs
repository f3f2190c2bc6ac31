//! Durable storage for the conversation history.

mod error;

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub use error::{Error, ErrorKind};

use crate::message::Message;

/// The fixed identifier of the history slot.
pub const HISTORY_KEY: &str = "chat_history";

/// A durable slot holding the serialized history.
///
/// The widget reads the slot once when it starts, rewrites it entirely
/// whenever the history changes, and removes it when the user clears the
/// history. There is only one writer, so implementations don't need any
/// conflict resolution.
pub trait HistoryStorage: Send + 'static {
    /// Reads the stored history. An absent slot is an empty history.
    fn load(&self) -> Result<Vec<Message>, Error>;

    /// Replaces the stored history with `messages`.
    fn save(&mut self, messages: &[Message]) -> Result<(), Error>;

    /// Removes the slot. Removing an absent slot succeeds.
    fn remove(&mut self) -> Result<(), Error>;
}

impl<S: HistoryStorage + ?Sized> HistoryStorage for Box<S> {
    #[inline]
    fn load(&self) -> Result<Vec<Message>, Error> {
        (**self).load()
    }

    #[inline]
    fn save(&mut self, messages: &[Message]) -> Result<(), Error> {
        (**self).save(messages)
    }

    #[inline]
    fn remove(&mut self) -> Result<(), Error> {
        (**self).remove()
    }
}

/// An in-process history slot.
///
/// Clones share the same slot, which lets tests observe what the widget
/// has written.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    /// Creates a slot pre-filled with `messages`.
    pub fn with_messages(messages: &[Message]) -> Self {
        let storage = Self::default();
        // Serializing plain messages to a string cannot fail.
        *storage.lock() = serde_json::to_string(messages).ok();
        storage
    }

    /// Creates a slot holding raw, possibly malformed, contents.
    pub fn with_raw<S: Into<String>>(raw: S) -> Self {
        let storage = Self::default();
        *storage.lock() = Some(raw.into());
        storage
    }

    /// Returns `true` if the slot currently holds anything.
    pub fn is_present(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Message>, Error> {
        match self.lock().as_deref() {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(vec![]),
        }
    }

    fn save(&mut self, messages: &[Message]) -> Result<(), Error> {
        let raw = serde_json::to_string(messages)?;
        *self.lock() = Some(raw);
        Ok(())
    }

    fn remove(&mut self) -> Result<(), Error> {
        self.lock().take();
        Ok(())
    }
}

/// A history slot backed by a JSON file in a directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates a storage that keeps the history in `dir`.
    ///
    /// The directory is created on the first write.
    #[inline]
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let path = dir.as_ref().join(format!("{HISTORY_KEY}.json"));
        Self { path }
    }

    /// The per-user data directory for the widget, if the platform has
    /// one.
    #[inline]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("chat-widget"))
    }

    /// Returns the path of the history file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStorage for FileStorage {
    fn load(&self) -> Result<Vec<Message>, Error> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                return Ok(vec![]);
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&mut self, messages: &[Message]) -> Result<(), Error> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_vec_pretty(messages)?;

        // Write aside and rename, so a crash never leaves half a file.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, raw)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn remove(&mut self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
