//! Bridge between the bus library's watch model and the host event
//! loop.
//!
//! The bus library announces which descriptors it wants monitored and
//! under which conditions; the host loop reports readiness back. The
//! bridge owns the registry mapping watch handles to their host-loop
//! registrations, so enablement state never rides on opaque user-data
//! attached to foreign objects.
//!
//! Initialization works as follows: the library announces its watches
//! before the connection is usable, and a fresh watch may well start
//! disabled - so adding a watch never registers with the host loop
//! directly, it only evaluates enablement. The library's timeout
//! feature is unused here: add/remove are accepted silently and a
//! toggle is logged loudly because it should never fire.

use std::collections::HashMap;
use std::io;
use std::os::fd::RawFd;

use tracing::{debug, trace, warn};

use crate::error::ServiceError;
use crate::message::Message;
use crate::transport::{BusTransport, TimeoutId, WatchEvent, WatchFlags, WatchId};

/// Handle of one host-loop registration, deregistered by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(pub u64);

/// Host event loop as consumed by the bridge: interest registration
/// keyed for readiness delivery, nothing more.
pub trait HostLoop {
    /// Monitor `fd` for `interest`; readiness is reported against `key`.
    fn register(&mut self, fd: RawFd, interest: WatchFlags, key: WatchId)
        -> io::Result<LoopHandle>;

    fn deregister(&mut self, handle: LoopHandle) -> io::Result<()>;
}

/// Host-loop side of one watch.
#[derive(Debug)]
struct WatchRegistration {
    fd: RawFd,
    enabled: bool,
    handle: Option<LoopHandle>,
}

/// Registry of live watches and the toggling logic around them.
#[derive(Default)]
pub struct EventBridge {
    watches: HashMap<WatchId, WatchRegistration>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one lifecycle notification from the bus library.
    pub fn handle_event<B, L>(
        &mut self,
        bus: &B,
        host: &mut L,
        event: WatchEvent,
    ) -> Result<(), ServiceError>
    where
        B: BusTransport,
        L: HostLoop,
    {
        match event {
            WatchEvent::WatchAdded(id) => self.add_watch(bus, host, id)?,
            WatchEvent::WatchRemoved(id) => self.remove_watch(host, id)?,
            WatchEvent::WatchToggled(id) => self.toggled_watch(bus, host, id)?,
            WatchEvent::TimeoutAdded(id) | WatchEvent::TimeoutRemoved(id) => {
                trace!("ignoring timeout lifecycle for {id:?}: timeouts are unused");
            }
            WatchEvent::TimeoutToggled(id) => {
                // Never observed in practice; make it noisy.
                warn!("timeout {id:?} toggled - this should not happen, timeouts are unused");
            }
        }
        Ok(())
    }

    fn add_watch<B, L>(&mut self, bus: &B, host: &mut L, id: WatchId) -> Result<(), ServiceError>
    where
        B: BusTransport,
        L: HostLoop,
    {
        let fd = bus.watch_fd(id);
        trace!("add_watch {id:?} fd {fd}");
        self.watches.insert(
            id,
            WatchRegistration {
                fd,
                enabled: false,
                handle: None,
            },
        );
        // Unconditionally registering here would be wrong: the watch may
        // start disabled.
        self.toggled_watch(bus, host, id)
    }

    fn toggled_watch<B, L>(
        &mut self,
        bus: &B,
        host: &mut L,
        id: WatchId,
    ) -> Result<(), ServiceError>
    where
        B: BusTransport,
        L: HostLoop,
    {
        let Some(reg) = self.watches.get_mut(&id) else {
            warn!("toggle for unknown watch {id:?}");
            return Ok(());
        };

        if bus.watch_enabled(id) {
            if !reg.enabled {
                let interest = bus.watch_interest(id);
                trace!("adding watch {id:?} to the host loop, interest {interest:?}");
                reg.handle = Some(host.register(reg.fd, interest, id)?);
                reg.enabled = true;
            }
            // else: it was already enabled
        } else if reg.enabled {
            trace!("removing watch {id:?} from the host loop");
            if let Some(handle) = reg.handle.take() {
                host.deregister(handle)?;
            }
            reg.enabled = false;
        }
        // else: it was already disabled
        Ok(())
    }

    fn remove_watch<L: HostLoop>(&mut self, host: &mut L, id: WatchId) -> Result<(), ServiceError> {
        trace!("remove_watch {id:?}");
        let Some(mut reg) = self.watches.remove(&id) else {
            warn!("remove for unknown watch {id:?}");
            return Ok(());
        };
        if reg.enabled {
            if let Some(handle) = reg.handle.take() {
                host.deregister(handle)?;
            }
        }
        Ok(())
    }

    /// Feed readiness into the bus library, then drain every message it
    /// buffered. Draining fully here keeps one readiness notification
    /// from starving requests that arrived in the same read.
    pub fn handle_ready<B, F>(
        &mut self,
        bus: &mut B,
        id: WatchId,
        ready: WatchFlags,
        mut deliver: F,
    ) -> Result<(), ServiceError>
    where
        B: BusTransport,
        F: FnMut(&mut B, Message) -> Result<(), ServiceError>,
    {
        if !self.watches.contains_key(&id) {
            debug!("readiness for removed watch {id:?}, dropping");
            return Ok(());
        }

        trace!("watch {id:?} ready: {ready:?}");
        bus.handle_watch(id, ready);

        while let Some(message) = bus.dispatch() {
            trace!("more data to process, looping");
            deliver(bus, message)?;
        }
        Ok(())
    }

    /// Number of live registrations (enabled or not).
    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }
}
