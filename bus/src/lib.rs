//! Bus-facing service layer for the crashd daemon.
//!
//! Inbound method calls arrive through a [`BusTransport`], get routed by
//! the [`DispatchTable`] to the business-logic [`DaemonOps`] boundary,
//! and are answered with exactly one return or error message. Signals go
//! out through the [`SignalEmitter`]. The [`EventBridge`] ties the
//! transport's watch/timeout callback model to the host event loop
//! ([`HostLoop`], implemented over mio by [`Reactor`]), and
//! [`BusService`] assembles the whole layer.
//!
//! Everything here runs on the single event-loop thread; the only
//! concurrency lives behind `DaemonOps` implementations that spawn their
//! own workers.

pub mod bridge;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod ops;
pub mod reactor;
pub mod service;
pub mod signals;
pub mod transport;

pub use bridge::{EventBridge, HostLoop, LoopHandle};
pub use dispatch::{DispatchTable, UNPRIVILEGED_UID};
pub use error::{OpsError, ServiceError};
pub use message::{ErrorReply, Message, MethodCall, MethodReturn, SignalMessage, ERROR_FAILED};
pub use ops::{
    CrashInfo, CrashReport, DaemonOps, DaemonSettings, PluginInfo, PluginSettings, ReportStatus,
};
pub use reactor::Reactor;
pub use service::BusService;
pub use signals::SignalEmitter;
pub use transport::{
    BusTransport, CredentialError, TimeoutId, WatchEvent, WatchFlags, WatchId,
};
