//! Shared doubles for the service-layer tests: an in-memory transport,
//! a recording host loop and a scripted business-logic stub.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::os::fd::RawFd;

use crashd_bus::{
    BusTransport, CrashInfo, CrashReport, CredentialError, DaemonOps, DaemonSettings, ErrorReply,
    HostLoop, LoopHandle, Message, MethodCall, MethodReturn, OpsError, PluginInfo, PluginSettings,
    ReportStatus, ServiceError, TimeoutId, WatchEvent, WatchFlags, WatchId,
};
use crashd_wire::Body;

/// Route test logs through the usual subscriber so `RUST_LOG` works
/// when a test needs inspecting.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct FakeWatch {
    pub fd: RawFd,
    pub interest: WatchFlags,
    pub enabled: bool,
}

/// In-memory stand-in for the bus library: watches and messages are
/// scripted by the test, sends are recorded.
#[derive(Default)]
pub struct LoopbackBus {
    pub watches: HashMap<WatchId, FakeWatch>,
    pub pending_events: VecDeque<WatchEvent>,
    pub inbound: VecDeque<Message>,
    pub sent: Vec<Message>,
    pub users: HashMap<String, u32>,
    pub handled: Vec<(WatchId, WatchFlags)>,
    pub object_paths: Vec<String>,
    pub requested_names: Vec<String>,
    pub fail_request_name: bool,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announce_watch(&mut self, id: WatchId, fd: RawFd, interest: WatchFlags, enabled: bool) {
        self.watches.insert(
            id,
            FakeWatch {
                fd,
                interest,
                enabled,
            },
        );
        self.pending_events.push_back(WatchEvent::WatchAdded(id));
    }

    pub fn toggle_watch(&mut self, id: WatchId, enabled: bool) {
        self.watches
            .get_mut(&id)
            .expect("toggling a watch that was never announced")
            .enabled = enabled;
        self.pending_events.push_back(WatchEvent::WatchToggled(id));
    }

    pub fn retire_watch(&mut self, id: WatchId) {
        self.watches.remove(&id);
        self.pending_events.push_back(WatchEvent::WatchRemoved(id));
    }

    pub fn announce_timeout_toggle(&mut self, id: TimeoutId) {
        self.pending_events
            .push_back(WatchEvent::TimeoutToggled(id));
    }

    pub fn queue_call(&mut self, serial: u32, sender: &str, member: &str, body: Body) {
        self.inbound.push_back(Message::Call(MethodCall {
            serial,
            sender: sender.to_owned(),
            member: member.to_owned(),
            body,
        }));
    }

    pub fn known_user(&mut self, sender: &str, uid: u32) {
        self.users.insert(sender.to_owned(), uid);
    }

    pub fn sent_returns(&self) -> Vec<&MethodReturn> {
        self.sent
            .iter()
            .filter_map(|m| match m {
                Message::Return(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn sent_errors(&self) -> Vec<&ErrorReply> {
        self.sent
            .iter()
            .filter_map(|m| match m {
                Message::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }
}

impl BusTransport for LoopbackBus {
    fn drain_events(&mut self) -> Vec<WatchEvent> {
        self.pending_events.drain(..).collect()
    }

    fn watch_fd(&self, watch: WatchId) -> RawFd {
        self.watches[&watch].fd
    }

    fn watch_interest(&self, watch: WatchId) -> WatchFlags {
        self.watches[&watch].interest
    }

    fn watch_enabled(&self, watch: WatchId) -> bool {
        self.watches.get(&watch).is_some_and(|w| w.enabled)
    }

    fn handle_watch(&mut self, watch: WatchId, ready: WatchFlags) {
        self.handled.push((watch, ready));
    }

    fn dispatch(&mut self) -> Option<Message> {
        self.inbound.pop_front()
    }

    fn send(&mut self, message: Message) -> Result<(), ServiceError> {
        self.sent.push(message);
        Ok(())
    }

    fn unix_user_of(&self, sender: &str) -> Result<u32, CredentialError> {
        self.users
            .get(sender)
            .copied()
            .ok_or_else(|| CredentialError(format!("unknown peer {sender}")))
    }

    fn register_object_path(&mut self, path: &str) -> Result<(), ServiceError> {
        self.object_paths.push(path.to_owned());
        Ok(())
    }

    fn request_name(&mut self, name: &str) -> Result<(), ServiceError> {
        if self.fail_request_name {
            return Err(ServiceError::NameAcquisition {
                name: name.to_owned(),
                detail: "name already taken".to_owned(),
            });
        }
        self.requested_names.push(name.to_owned());
        Ok(())
    }
}

/// Host loop that records registrations instead of polling anything.
#[derive(Default)]
pub struct FakeLoop {
    next_handle: u64,
    pub registrations: HashMap<u64, (RawFd, WatchFlags, WatchId)>,
    pub register_calls: usize,
    pub deregister_calls: usize,
}

impl FakeLoop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostLoop for FakeLoop {
    fn register(
        &mut self,
        fd: RawFd,
        interest: WatchFlags,
        key: WatchId,
    ) -> io::Result<LoopHandle> {
        self.register_calls += 1;
        let handle = self.next_handle;
        self.next_handle += 1;
        self.registrations.insert(handle, (fd, interest, key));
        Ok(LoopHandle(handle))
    }

    fn deregister(&mut self, handle: LoopHandle) -> io::Result<()> {
        self.deregister_calls += 1;
        self.registrations.remove(&handle.0);
        Ok(())
    }
}

/// Scripted business logic that records every invocation.
pub struct StubOps {
    pub crash_infos: Vec<CrashInfo>,
    pub job_result: CrashReport,
    pub report_result: Result<ReportStatus, OpsError>,
    pub create_job_result: Result<(), OpsError>,
    pub delete_result: bool,
    pub plugins: Vec<PluginInfo>,
    pub plugin_settings: PluginSettings,
    pub daemon_settings: DaemonSettings,
    pub calls: Vec<String>,
    pub stored_plugin_settings: Vec<(String, u32, PluginSettings)>,
    pub stored_settings: Vec<DaemonSettings>,
}

impl Default for StubOps {
    fn default() -> Self {
        Self {
            crash_infos: Vec::new(),
            job_result: CrashReport::new(),
            report_result: Ok(ReportStatus::new()),
            create_job_result: Ok(()),
            delete_result: true,
            plugins: Vec::new(),
            plugin_settings: PluginSettings::new(),
            daemon_settings: DaemonSettings::new(),
            calls: Vec::new(),
            stored_plugin_settings: Vec::new(),
            stored_settings: Vec::new(),
        }
    }
}

impl StubOps {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DaemonOps for StubOps {
    fn crash_infos(&mut self, uid: u32) -> Vec<CrashInfo> {
        self.calls.push(format!("crash_infos({uid})"));
        self.crash_infos.clone()
    }

    fn create_report_job(&mut self, uuid: &str, uid: u32, sender: &str) -> Result<(), OpsError> {
        self.calls
            .push(format!("create_report_job({uuid},{uid},{sender})"));
        self.create_job_result.clone()
    }

    fn job_result(&mut self, uuid: &str, uid: u32) -> CrashReport {
        self.calls.push(format!("job_result({uuid},{uid})"));
        self.job_result.clone()
    }

    fn report(&mut self, report: CrashReport, uid: u32) -> Result<ReportStatus, OpsError> {
        self.calls.push(format!("report({},{uid})", report.len()));
        self.report_result.clone()
    }

    fn delete_debug_dump(&mut self, path: &str, uid: u32) -> bool {
        self.calls.push(format!("delete_debug_dump({path},{uid})"));
        self.delete_result
    }

    fn plugins_info(&mut self) -> Vec<PluginInfo> {
        self.calls.push("plugins_info".to_owned());
        self.plugins.clone()
    }

    fn plugin_settings(&mut self, name: &str, uid: u32) -> PluginSettings {
        self.calls.push(format!("plugin_settings({name},{uid})"));
        self.plugin_settings.clone()
    }

    fn set_plugin_settings(&mut self, name: &str, uid: u32, settings: PluginSettings) {
        self.calls.push(format!("set_plugin_settings({name},{uid})"));
        self.stored_plugin_settings
            .push((name.to_owned(), uid, settings));
    }

    fn register_plugin(&mut self, name: &str) {
        self.calls.push(format!("register_plugin({name})"));
    }

    fn unregister_plugin(&mut self, name: &str) {
        self.calls.push(format!("unregister_plugin({name})"));
    }

    fn settings(&mut self) -> DaemonSettings {
        self.calls.push("settings".to_owned());
        self.daemon_settings.clone()
    }

    fn set_settings(&mut self, settings: DaemonSettings) {
        self.calls.push("set_settings".to_owned());
        self.stored_settings.push(settings);
    }
}
