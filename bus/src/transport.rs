//! Interface to the external bus library.
//!
//! The bus library owns the wire protocol and the connection to the bus
//! daemon; this layer only sees it through [`BusTransport`]. Instead of
//! the library's callback-with-user-data style, watch and timeout
//! lifecycle changes are drained as [`WatchEvent`]s and looked up by
//! handle in the bridge's own registry.

use std::os::fd::RawFd;

use thiserror::Error;

use crate::error::ServiceError;
use crate::message::Message;

/// Handle of one watch owned by the bus library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    pub fn new(id: u64) -> Self {
        WatchId(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Handle of one timeout owned by the bus library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutId(u64);

impl TimeoutId {
    pub fn new(id: u64) -> Self {
        TimeoutId(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// I/O conditions a watch is interested in, or that a descriptor
/// reported. Read, write, error and hangup each map one-to-one onto the
/// host loop's interest bits.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchFlags(u8);

impl WatchFlags {
    pub const READABLE: WatchFlags = WatchFlags(1 << 0);
    pub const WRITABLE: WatchFlags = WatchFlags(1 << 1);
    pub const ERROR: WatchFlags = WatchFlags(1 << 2);
    pub const HANGUP: WatchFlags = WatchFlags(1 << 3);

    pub fn empty() -> Self {
        WatchFlags(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: WatchFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: WatchFlags) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for WatchFlags {
    type Output = WatchFlags;

    fn bitor(self, rhs: WatchFlags) -> WatchFlags {
        WatchFlags(self.0 | rhs.0)
    }
}

impl std::fmt::Debug for WatchFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let mut sep = "";
        for (bit, name) in [
            (WatchFlags::READABLE, "READABLE"),
            (WatchFlags::WRITABLE, "WRITABLE"),
            (WatchFlags::ERROR, "ERROR"),
            (WatchFlags::HANGUP, "HANGUP"),
        ] {
            if self.contains(bit) {
                write!(f, "{sep}{name}")?;
                sep = "|";
            }
        }
        Ok(())
    }
}

/// Watch and timeout lifecycle notifications from the bus library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    WatchAdded(WatchId),
    WatchRemoved(WatchId),
    WatchToggled(WatchId),
    TimeoutAdded(TimeoutId),
    TimeoutRemoved(TimeoutId),
    TimeoutToggled(TimeoutId),
}

/// Peer credentials could not be resolved. Non-fatal: the caller is
/// treated as unprivileged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot resolve peer credentials: {0}")]
pub struct CredentialError(pub String);

/// What this layer consumes from the bus library.
pub trait BusTransport {
    /// Watch/timeout changes accumulated since the last drain. The
    /// library may report new changes while handling I/O, so callers
    /// pump this after every [`handle_watch`](Self::handle_watch) or
    /// [`dispatch`](Self::dispatch) cycle.
    fn drain_events(&mut self) -> Vec<WatchEvent>;

    /// Descriptor behind a watch.
    fn watch_fd(&self, watch: WatchId) -> RawFd;

    /// Conditions the watch wants monitored.
    fn watch_interest(&self, watch: WatchId) -> WatchFlags;

    /// Current enablement of the watch.
    fn watch_enabled(&self, watch: WatchId) -> bool;

    /// Feed readiness for a previously added watch back to the library.
    fn handle_watch(&mut self, watch: WatchId, ready: WatchFlags);

    /// Pop the next fully decoded inbound message, if any is buffered.
    fn dispatch(&mut self) -> Option<Message>;

    /// Send a message and flush it to the bus before returning.
    fn send(&mut self, message: Message) -> Result<(), ServiceError>;

    /// Resolve a peer identity to its numeric unix user.
    fn unix_user_of(&self, sender: &str) -> Result<u32, CredentialError>;

    /// Register the object path inbound calls are addressed to.
    fn register_object_path(&mut self, path: &str) -> Result<(), ServiceError>;

    /// Claim a well-known name on the bus.
    fn request_name(&mut self, name: &str) -> Result<(), ServiceError>;
}
