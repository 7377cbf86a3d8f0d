//! The four message kinds of the consumed bus protocol.
//!
//! A method call is answered by exactly one method return or one error
//! reply, correlated by serial. Signals are standalone notifications,
//! broadcast unless a destination peer is set. Messages are plain owned
//! values; whatever path a call takes, its reply is released when it
//! goes out of scope.

use crashd_wire::Body;

/// Error name used for rejected calls and domain failures.
pub const ERROR_FAILED: &str = "org.crashd.Error.Failed";

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Call(MethodCall),
    Return(MethodReturn),
    Signal(SignalMessage),
    Error(ErrorReply),
}

/// An inbound method call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// Serial the reply must carry to correlate
    pub serial: u32,
    /// Unique bus identity of the caller
    pub sender: String,
    /// Method member name
    pub member: String,
    pub body: Body,
}

/// The successful reply to a method call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReturn {
    pub reply_serial: u32,
    pub body: Body,
}

impl MethodReturn {
    /// Empty reply correlated to `call`.
    pub fn for_call(call: &MethodCall) -> Self {
        Self {
            reply_serial: call.serial,
            body: Body::new(),
        }
    }
}

/// An asynchronous notification, broadcast or addressed to one peer.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMessage {
    pub path: String,
    pub interface: String,
    pub member: String,
    /// `None` broadcasts to all subscribers
    pub destination: Option<String>,
    pub body: Body,
}

/// The failure reply to a method call.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReply {
    pub reply_serial: u32,
    pub name: String,
    pub text: String,
}

impl ErrorReply {
    /// Generic failure reply correlated to `call`.
    pub fn for_call(call: &MethodCall, text: impl Into<String>) -> Self {
        Self {
            reply_serial: call.serial,
            name: ERROR_FAILED.to_owned(),
            text: text.into(),
        }
    }
}
