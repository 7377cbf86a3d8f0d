//! mio-backed host event loop.
//!
//! One `Poll` instance, tokens handed out from a counter, and a
//! token → watch map so readiness can be reported against the watch
//! handles the bridge knows. Only readable/writable interest is
//! registered with the OS; error and hangup conditions are always
//! reported by the poller and translate to the corresponding watch
//! flags on delivery.

use std::collections::HashMap;
use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use tracing::trace;

use crate::bridge::{HostLoop, LoopHandle};
use crate::transport::{WatchFlags, WatchId};

const EVENT_CAPACITY: usize = 64;

pub struct Reactor {
    poll: Poll,
    events: Events,
    next_token: usize,
    active: HashMap<u64, (RawFd, WatchId)>,
}

impl Reactor {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(EVENT_CAPACITY),
            next_token: 0,
            active: HashMap::new(),
        })
    }

    /// Wait for readiness and report it per watch. Returns an empty
    /// batch on timeout or interruption.
    pub fn poll_ready(
        &mut self,
        timeout: Option<Duration>,
    ) -> io::Result<Vec<(WatchId, WatchFlags)>> {
        if let Err(err) = self.poll.poll(&mut self.events, timeout) {
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(err);
        }

        let mut ready = Vec::new();
        for event in self.events.iter() {
            let Some(&(_, watch)) = self.active.get(&(event.token().0 as u64)) else {
                continue;
            };

            let mut flags = WatchFlags::empty();
            if event.is_readable() {
                flags.insert(WatchFlags::READABLE);
            }
            if event.is_writable() {
                flags.insert(WatchFlags::WRITABLE);
            }
            if event.is_error() {
                flags.insert(WatchFlags::ERROR);
            }
            if event.is_read_closed() || event.is_write_closed() {
                flags.insert(WatchFlags::HANGUP);
            }

            if !flags.is_empty() {
                ready.push((watch, flags));
            }
        }
        Ok(ready)
    }
}

impl HostLoop for Reactor {
    fn register(
        &mut self,
        fd: RawFd,
        interest: WatchFlags,
        key: WatchId,
    ) -> io::Result<LoopHandle> {
        let mut wanted = None;
        if interest.contains(WatchFlags::READABLE) {
            wanted = Some(Interest::READABLE);
        }
        if interest.contains(WatchFlags::WRITABLE) {
            wanted = Some(wanted.map_or(Interest::WRITABLE, |w| w | Interest::WRITABLE));
        }
        // Error and hangup need no explicit interest; readable keeps a
        // watch with neither I/O bit pollable for them.
        let wanted = wanted.unwrap_or(Interest::READABLE);

        let token = Token(self.next_token);
        self.next_token += 1;

        trace!("registering fd {fd} with token {} for {interest:?}", token.0);
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), token, wanted)?;
        self.active.insert(token.0 as u64, (fd, key));
        Ok(LoopHandle(token.0 as u64))
    }

    fn deregister(&mut self, handle: LoopHandle) -> io::Result<()> {
        let Some((fd, _)) = self.active.remove(&handle.0) else {
            return Ok(());
        };
        trace!("deregistering fd {fd} (token {})", handle.0);
        self.poll.registry().deregister(&mut SourceFd(&fd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::fd::AsRawFd;
    use std::os::unix::net::UnixStream;

    #[test]
    fn readable_fd_reports_readiness_for_its_watch() {
        let (mut tx, rx) = UnixStream::pair().unwrap();
        rx.set_nonblocking(true).unwrap();

        let mut reactor = Reactor::new().unwrap();
        let watch = WatchId::new(7);
        reactor
            .register(rx.as_raw_fd(), WatchFlags::READABLE, watch)
            .unwrap();

        tx.write_all(b"ping").unwrap();

        let ready = reactor
            .poll_ready(Some(Duration::from_secs(5)))
            .unwrap();
        assert!(ready
            .iter()
            .any(|(id, flags)| *id == watch && flags.contains(WatchFlags::READABLE)));
    }

    #[test]
    fn deregistered_fd_reports_nothing() {
        let (mut tx, rx) = UnixStream::pair().unwrap();
        rx.set_nonblocking(true).unwrap();

        let mut reactor = Reactor::new().unwrap();
        let handle = reactor
            .register(rx.as_raw_fd(), WatchFlags::READABLE, WatchId::new(1))
            .unwrap();
        reactor.deregister(handle).unwrap();

        tx.write_all(b"ping").unwrap();

        let ready = reactor
            .poll_ready(Some(Duration::from_millis(50)))
            .unwrap();
        assert!(ready.is_empty());
    }
}
