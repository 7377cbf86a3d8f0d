//! Boundary to the daemon's business logic.
//!
//! Crash scanning, report generation, the plugin manager and the
//! settings store all live behind [`DaemonOps`]; this layer only
//! decodes arguments for them and encodes what they return. Long-running
//! work (report generation) is expected to spawn its own worker inside
//! the implementation - calls here must not block the event-loop thread
//! beyond initiating the job.

use std::collections::BTreeMap;

use crate::error::OpsError;

/// One detected crash, as attribute key/value pairs.
pub type CrashInfo = BTreeMap<String, String>;

/// A generated crash report, as field key/value pairs.
pub type CrashReport = BTreeMap<String, String>;

/// Description of one loaded plugin.
pub type PluginInfo = BTreeMap<String, String>;

/// Settings of one plugin.
pub type PluginSettings = BTreeMap<String, String>;

/// Daemon settings, one key/value table per section.
pub type DaemonSettings = BTreeMap<String, BTreeMap<String, String>>;

/// Per-plugin status lines produced by reporting a crash.
pub type ReportStatus = BTreeMap<String, Vec<String>>;

/// Business-logic operations reachable over the bus, one per exposed
/// method. `uid` is the caller identity resolved from the message
/// sender; implementations enforce per-user visibility with it.
pub trait DaemonOps {
    fn crash_infos(&mut self, uid: u32) -> Vec<CrashInfo>;

    /// Start generating a report for `uuid` in the background. `sender`
    /// is the caller's bus identity, used to address the job's unicast
    /// completion signals.
    fn create_report_job(&mut self, uuid: &str, uid: u32, sender: &str) -> Result<(), OpsError>;

    fn job_result(&mut self, uuid: &str, uid: u32) -> CrashReport;

    fn report(&mut self, report: CrashReport, uid: u32) -> Result<ReportStatus, OpsError>;

    fn delete_debug_dump(&mut self, path: &str, uid: u32) -> bool;

    fn plugins_info(&mut self) -> Vec<PluginInfo>;

    fn plugin_settings(&mut self, name: &str, uid: u32) -> PluginSettings;

    fn set_plugin_settings(&mut self, name: &str, uid: u32, settings: PluginSettings);

    fn register_plugin(&mut self, name: &str);

    fn unregister_plugin(&mut self, name: &str);

    fn settings(&mut self) -> DaemonSettings;

    fn set_settings(&mut self, settings: DaemonSettings);
}
