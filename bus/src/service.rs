//! Service assembly: one connection, one dispatch table, one bridge.
//!
//! `BusService` owns the transport, the business-logic boundary and the
//! per-call routing. Startup follows the connection's own order: the
//! library announces its watches first, then the object path is
//! registered and the well-known name requested (both fatal on
//! failure), with a final event pump because name acquisition is when
//! the library briefly adds and removes its timeout.

use tracing::{debug, info, trace};

use crashd_config::{BusSettings, ServiceConfig};

use crate::bridge::{EventBridge, HostLoop};
use crate::dispatch::DispatchTable;
use crate::error::ServiceError;
use crate::message::Message;
use crate::ops::DaemonOps;
use crate::reactor::Reactor;
use crate::signals::SignalEmitter;
use crate::transport::{BusTransport, WatchFlags, WatchId};

pub struct BusService<B: BusTransport, O: DaemonOps> {
    bus: B,
    ops: O,
    settings: BusSettings,
    table: DispatchTable<O>,
    bridge: EventBridge,
    emitter: SignalEmitter,
}

impl<B: BusTransport, O: DaemonOps> BusService<B, O> {
    /// Wire up the layer around an established connection. No host-loop
    /// interaction happens until [`start`](Self::start).
    pub fn new(config: &ServiceConfig, bus: B, ops: O) -> Self {
        Self {
            bus,
            ops,
            settings: config.bus.clone(),
            table: DispatchTable::new(),
            bridge: EventBridge::new(),
            emitter: SignalEmitter::new(&config.bus.object_path, &config.bus.interface),
        }
    }

    /// Run the startup sequence. Any failure here is fatal - a daemon
    /// that cannot claim its name has nothing to serve.
    pub fn start<L: HostLoop>(&mut self, host: &mut L) -> Result<(), ServiceError> {
        trace!("pumping initial watch registrations");
        self.pump_bus_events(host)?;

        trace!("registering object path {}", self.settings.object_path);
        self.bus.register_object_path(&self.settings.object_path)?;

        trace!("requesting bus name {}", self.settings.name);
        self.bus.request_name(&self.settings.name)?;

        // Name acquisition adds and removes a timeout; drain it.
        self.pump_bus_events(host)?;

        info!("bus init done, serving as {}", self.settings.name);
        Ok(())
    }

    /// Apply every watch/timeout change the library has queued.
    pub fn pump_bus_events<L: HostLoop>(&mut self, host: &mut L) -> Result<(), ServiceError> {
        loop {
            let events = self.bus.drain_events();
            if events.is_empty() {
                return Ok(());
            }
            for event in events {
                self.bridge.handle_event(&self.bus, host, event)?;
            }
        }
    }

    /// Feed one readiness notification through the bridge, routing every
    /// buffered call to its handler, then pick up watch changes the
    /// library made while handling I/O.
    pub fn handle_ready<L: HostLoop>(
        &mut self,
        host: &mut L,
        watch: WatchId,
        ready: WatchFlags,
    ) -> Result<(), ServiceError> {
        let table = &self.table;
        let ops = &mut self.ops;
        self.bridge.handle_ready(&mut self.bus, watch, ready, |bus, message| {
            match message {
                Message::Call(call) => table.dispatch(bus, ops, &call),
                other => {
                    debug!("ignoring non-call inbound message: {other:?}");
                    Ok(())
                }
            }
        })?;
        self.pump_bus_events(host)
    }

    /// Drive the reactor until it fails. Runs every marshaling, dispatch
    /// and bridge operation on the calling thread.
    pub fn run(&mut self, reactor: &mut Reactor) -> Result<(), ServiceError> {
        loop {
            let batch = reactor.poll_ready(None)?;
            for (watch, flags) in batch {
                self.handle_ready(reactor, watch, flags)?;
            }
        }
    }

    // Signal emitters, invoked by business logic.

    pub fn emit_crash(&mut self, progname: &str, uid: &str) -> Result<(), ServiceError> {
        self.emitter.crash(&mut self.bus, progname, uid)
    }

    pub fn emit_job_started(&mut self, dest: &str, job_id: u64) -> Result<(), ServiceError> {
        self.emitter.job_started(&mut self.bus, dest, job_id)
    }

    pub fn emit_job_done(&mut self, dest: &str, uuid: &str) -> Result<(), ServiceError> {
        self.emitter.job_done(&mut self.bus, dest, uuid)
    }

    pub fn emit_error(&mut self, text: &str) -> Result<(), ServiceError> {
        self.emitter.error(&mut self.bus, text)
    }

    pub fn emit_update(&mut self, text: &str, job_id: u64) -> Result<(), ServiceError> {
        self.emitter.update(&mut self.bus, text, job_id)
    }

    pub fn emit_warning(&mut self, text: &str) -> Result<(), ServiceError> {
        self.emitter.warning(&mut self.bus, text)
    }

    pub fn emit_warning_for_job(&mut self, text: &str, job_id: u64) -> Result<(), ServiceError> {
        self.emitter.warning_for_job(&mut self.bus, text, job_id)
    }

    /// The transport, for tests and for business logic that needs to
    /// inspect connection state.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }
}
