//! Table-driven method dispatch.
//!
//! A call moves through decode, invoke, encode; any decode failure
//! discards the half-built reply and answers with a generic failure,
//! and a domain failure from business logic is answered with the
//! failure's own text. Either way the caller gets exactly one reply and
//! the connection stays usable.

use std::collections::HashMap;

use tracing::{debug, error, warn};

use crashd_wire::{ArgCursor, Body, Decode, Fields};

use crate::error::{OpsError, ServiceError};
use crate::message::{ErrorReply, Message, MethodCall, MethodReturn};
use crate::ops::DaemonOps;
use crate::transport::BusTransport;

/// Fallback caller identity when credential resolution fails (uid of
/// nobody).
pub const UNPRIVILEGED_UID: u32 = 65534;

/// How a handler failed; decides the error reply's text.
enum CallError {
    /// Protocol-level rejection, already logged. Answered generically.
    Rejected,
    /// Named business failure. Answered with its text.
    Domain(OpsError),
}

impl From<OpsError> for CallError {
    fn from(err: OpsError) -> Self {
        CallError::Domain(err)
    }
}

/// One call as seen by a handler: decoded envelope plus the resolved
/// caller identity.
struct CallView<'a> {
    member: &'a str,
    sender: &'a str,
    uid: u32,
    args: &'a [crashd_wire::Arg],
}

type Handler<O> = fn(&mut O, &CallView<'_>) -> Result<Body, CallError>;

/// Immutable method-name → handler table, built once at startup.
pub struct DispatchTable<O: DaemonOps> {
    handlers: HashMap<&'static str, Handler<O>>,
}

impl<O: DaemonOps> Default for DispatchTable<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: DaemonOps> DispatchTable<O> {
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Handler<O>> = HashMap::new();
        handlers.insert("GetCrashInfos", handle_get_crash_infos);
        handlers.insert("CreateReport", handle_create_report);
        handlers.insert("GetJobResult", handle_get_job_result);
        handlers.insert("Report", handle_report);
        handlers.insert("DeleteDebugDump", handle_delete_debug_dump);
        handlers.insert("GetPluginsInfo", handle_get_plugins_info);
        handlers.insert("GetPluginSettings", handle_get_plugin_settings);
        handlers.insert("SetPluginSettings", handle_set_plugin_settings);
        handlers.insert("RegisterPlugin", handle_register_plugin);
        handlers.insert("UnRegisterPlugin", handle_unregister_plugin);
        handlers.insert("GetSettings", handle_get_settings);
        handlers.insert("SetSettings", handle_set_settings);
        Self { handlers }
    }

    /// Route one inbound call: look up the handler, run it, send the
    /// reply or error reply. Only transport failures propagate.
    pub fn dispatch<B: BusTransport>(
        &self,
        bus: &mut B,
        ops: &mut O,
        call: &MethodCall,
    ) -> Result<(), ServiceError> {
        let member = call.member.as_str();
        let Some(handler) = self.handlers.get(member) else {
            warn!("bus call {member}: not supported");
            return bus.send(Message::Error(ErrorReply::for_call(call, "not supported")));
        };

        let uid = caller_uid(bus, &call.sender);
        debug!("got {member} call from sender '{}' uid {uid}", call.sender);

        let view = CallView {
            member,
            sender: &call.sender,
            uid,
            args: call.body.args(),
        };

        let reply = match handler(ops, &view) {
            Ok(body) => Message::Return(MethodReturn {
                reply_serial: call.serial,
                body,
            }),
            Err(CallError::Rejected) => {
                Message::Error(ErrorReply::for_call(call, "not supported"))
            }
            Err(CallError::Domain(err)) => {
                Message::Error(ErrorReply::for_call(call, err.to_string()))
            }
        };
        bus.send(reply)
    }
}

/// Resolve the caller's unix user from the message sender. Failure is
/// never fatal: log and treat the caller as unprivileged.
fn caller_uid<B: BusTransport>(bus: &B, sender: &str) -> u32 {
    match bus.unix_user_of(sender) {
        Ok(uid) => uid,
        Err(err) => {
            warn!("can't determine caller uid ({err}), assuming unprivileged");
            UNPRIVILEGED_UID
        }
    }
}

/// Cursor over the call's arguments, rejecting an empty list up front.
fn require_args<'a>(view: &CallView<'a>) -> Result<ArgCursor<'a>, CallError> {
    if view.args.is_empty() {
        let member = view.member;
        error!("bus call {member}: no parameters");
        return Err(CallError::Rejected);
    }
    Ok(ArgCursor::new(view.args))
}

/// Read the final expected argument; anything after it is an "extra
/// parameters" protocol error.
fn decode_last<T: Decode>(cur: &mut ArgCursor<'_>, member: &str) -> Result<T, CallError> {
    match T::load(cur) {
        Ok((value, Fields::Last)) => Ok(value),
        Ok((_, Fields::More)) => {
            error!("bus call {member}: extra parameters");
            Err(CallError::Rejected)
        }
        Err(_) => Err(CallError::Rejected),
    }
}

/// Read an argument that must be followed by more; a list ending here is
/// a "too few parameters" protocol error.
fn decode_more<T: Decode>(cur: &mut ArgCursor<'_>, member: &str) -> Result<T, CallError> {
    match T::load(cur) {
        Ok((value, Fields::More)) => Ok(value),
        Ok((_, Fields::Last)) => {
            error!("bus call {member}: too few parameters");
            Err(CallError::Rejected)
        }
        Err(_) => Err(CallError::Rejected),
    }
}

fn handle_get_crash_infos<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let infos = ops.crash_infos(view.uid);

    let mut body = Body::new();
    body.push(&infos);
    Ok(body)
}

fn handle_create_report<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let uuid: String = decode_last(&mut cur, view.member)?;

    if let Err(err) = ops.create_report_job(&uuid, view.uid, view.sender) {
        // The job never started; the business layer already knows why.
        error!("bus call CreateReport('{uuid}'): {err}");
        return Err(CallError::Rejected);
    }

    let mut body = Body::new();
    body.push(&uuid);
    Ok(body)
}

fn handle_get_job_result<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let uuid: String = decode_last(&mut cur, view.member)?;

    let report = ops.job_result(&uuid, view.uid);

    let mut body = Body::new();
    body.push(&report);
    Ok(body)
}

fn handle_report<O: DaemonOps>(ops: &mut O, view: &CallView<'_>) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let report = decode_last(&mut cur, view.member)?;

    let status = ops.report(report, view.uid)?;

    let mut body = Body::new();
    body.push(&status);
    Ok(body)
}

fn handle_delete_debug_dump<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let path: String = decode_last(&mut cur, view.member)?;

    let deleted = ops.delete_debug_dump(&path, view.uid);

    let mut body = Body::new();
    body.push(&deleted);
    Ok(body)
}

fn handle_get_plugins_info<O: DaemonOps>(
    ops: &mut O,
    _view: &CallView<'_>,
) -> Result<Body, CallError> {
    let infos = ops.plugins_info();

    let mut body = Body::new();
    body.push(&infos);
    Ok(body)
}

fn handle_get_plugin_settings<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let name: String = decode_last(&mut cur, view.member)?;

    let settings = ops.plugin_settings(&name, view.uid);

    let mut body = Body::new();
    body.push(&settings);
    Ok(body)
}

fn handle_set_plugin_settings<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let name: String = decode_more(&mut cur, view.member)?;
    let settings = decode_last(&mut cur, view.member)?;

    ops.set_plugin_settings(&name, view.uid, settings);
    Ok(Body::new())
}

fn handle_register_plugin<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let name: String = decode_last(&mut cur, view.member)?;

    ops.register_plugin(&name);
    Ok(Body::new())
}

fn handle_unregister_plugin<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let name: String = decode_last(&mut cur, view.member)?;

    ops.unregister_plugin(&name);
    Ok(Body::new())
}

fn handle_get_settings<O: DaemonOps>(
    ops: &mut O,
    _view: &CallView<'_>,
) -> Result<Body, CallError> {
    let settings = ops.settings();

    let mut body = Body::new();
    body.push(&settings);
    Ok(body)
}

fn handle_set_settings<O: DaemonOps>(
    ops: &mut O,
    view: &CallView<'_>,
) -> Result<Body, CallError> {
    let mut cur = require_args(view)?;
    let settings = decode_last(&mut cur, view.member)?;

    ops.set_settings(settings);
    Ok(Body::new())
}
