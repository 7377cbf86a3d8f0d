//! Outbound signal emission.
//!
//! Signals are fire-and-forget: build the message, append the
//! arguments, send and forget. No acknowledgement exists and no retry
//! is attempted - delivery is as good as the transport's. Job progress
//! signals are unicast to the peer that started the job; everything
//! else is broadcast.

use tracing::debug;

use crate::error::ServiceError;
use crate::message::{Message, SignalMessage};
use crate::transport::BusTransport;

/// Builds and sends signals stamped with the service's object path and
/// interface.
pub struct SignalEmitter {
    path: String,
    interface: String,
}

impl SignalEmitter {
    pub fn new(path: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            interface: interface.into(),
        }
    }

    fn signal(&self, member: &str, destination: Option<&str>) -> SignalMessage {
        SignalMessage {
            path: self.path.clone(),
            interface: self.interface.clone(),
            member: member.to_owned(),
            destination: destination.map(str::to_owned),
            body: Default::default(),
        }
    }

    /// Notify subscribers (UI) about a new crash.
    pub fn crash<B: BusTransport>(
        &self,
        bus: &mut B,
        progname: &str,
        uid: &str,
    ) -> Result<(), ServiceError> {
        let mut msg = self.signal("Crash", None);
        msg.body.push(progname).push(uid);
        debug!("sending signal Crash('{progname}','{uid}')");
        bus.send(Message::Signal(msg))
    }

    /// Tell the peer that started a report job that it is running.
    pub fn job_started<B: BusTransport>(
        &self,
        bus: &mut B,
        dest: &str,
        job_id: u64,
    ) -> Result<(), ServiceError> {
        let mut msg = self.signal("JobStarted", Some(dest));
        // Destination repeats in the body for wire compatibility.
        msg.body.push(dest).push(&job_id);
        debug!("sending signal JobStarted('{dest}',{job_id:x})");
        bus.send(Message::Signal(msg))
    }

    /// Tell the peer that started a report job that its report is ready.
    pub fn job_done<B: BusTransport>(
        &self,
        bus: &mut B,
        dest: &str,
        uuid: &str,
    ) -> Result<(), ServiceError> {
        let mut msg = self.signal("JobDone", Some(dest));
        // Destination repeats in the body for wire compatibility.
        msg.body.push(dest).push(uuid);
        debug!("sending signal JobDone('{dest}','{uuid}')");
        bus.send(Message::Signal(msg))
    }

    pub fn error<B: BusTransport>(&self, bus: &mut B, text: &str) -> Result<(), ServiceError> {
        let mut msg = self.signal("Error", None);
        msg.body.push(text);
        bus.send(Message::Signal(msg))
    }

    pub fn update<B: BusTransport>(
        &self,
        bus: &mut B,
        text: &str,
        job_id: u64,
    ) -> Result<(), ServiceError> {
        let mut msg = self.signal("Update", None);
        msg.body.push(text).push(&job_id);
        bus.send(Message::Signal(msg))
    }

    pub fn warning<B: BusTransport>(&self, bus: &mut B, text: &str) -> Result<(), ServiceError> {
        let mut msg = self.signal("Warning", None);
        msg.body.push(text);
        bus.send(Message::Signal(msg))
    }

    /// `Warning` variant carrying the job it belongs to.
    pub fn warning_for_job<B: BusTransport>(
        &self,
        bus: &mut B,
        text: &str,
        job_id: u64,
    ) -> Result<(), ServiceError> {
        let mut msg = self.signal("Warning", None);
        msg.body.push(text).push(&job_id);
        bus.send(Message::Signal(msg))
    }
}
