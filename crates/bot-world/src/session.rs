use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inventory::{SlotIndex, WindowId};
use crate::position::{Face, Position};

/// Something the agent asks the server to do. The effect, if any, only shows
/// up later through the shared tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Dig {
        position: Position,
        face: Face,
    },
    /// Place the held item into the cell at `position`, clicking `face` of its anchor.
    PlaceBlock {
        position: Position,
        face: Face,
    },
    UseBlock {
        position: Position,
        face: Face,
    },
    ClickSwap {
        window: WindowId,
        source: SlotIndex,
        destination: SlotIndex,
    },
    CloseWindow {
        window: WindowId,
    },
    SelectHotbar {
        index: u8,
    },
    Chat {
        message: String,
    },
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session is disconnected")]
    Disconnected,
}

/// Outbound half of a connection. Sending is fire-and-forget: `Ok` only means
/// the intent was queued.
pub trait NetworkSession: Send + Sync {
    fn send_intent(&self, intent: Intent) -> Result<(), SessionError>;

    fn is_connected(&self) -> bool;

    fn name(&self) -> &str {
        "session"
    }
}

/// Session that stores every intent and never answers. Useful when the test
/// drives the shared tables itself.
#[derive(Debug)]
pub struct RecordingSession {
    sent: Mutex<Vec<Intent>>,
    connected: AtomicBool,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
        }
    }
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disconnected() -> Self {
        let session = Self::default();
        session.disconnect();
        session
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Intent> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl NetworkSession for RecordingSession {
    fn send_intent(&self, intent: Intent) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::Disconnected);
        }
        self.sent.lock().push(intent);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "recording"
    }
}
