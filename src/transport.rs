//! Report I/O over a blocking transport.
//!
//! [`ReportDevice`] implements [`Device`] for any [`Transport`]: a handle that can
//! write an output report and read an input report with a timeout. Until the read
//! loop starts, writes go straight to the transport.
//!
//! [`Device::read_channel`] moves the transport onto a worker thread. From then on
//! the worker is its only user. It alternates between one timed read and draining
//! queued write requests, so a write waits at most one read timeout and never
//! competes with the reader for a lock. While the report channel is full the
//! worker keeps serving writes until the consumer catches up.
//!
//! After a read error the worker records it, closes the report channel and stays
//! alive to serve writes until the device is closed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{
    channel, sync_channel, Receiver, RecvTimeoutError, Sender, SyncSender, TryRecvError,
    TrySendError,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::HidConfig;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::info::DeviceInfo;

/// A blocking report transport, such as an open `hidapi` device.
pub trait Transport: Send + 'static {
    /// Write one output report and return the number of bytes accepted.
    fn write_report(&self, data: &[u8]) -> Result<usize>;

    /// Read one input report into `buf`. Returns `Ok(0)` when nothing arrived
    /// within `timeout_ms`.
    fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;
}

struct WriteRequest {
    data: Vec<u8>,
    reply: SyncSender<Result<usize>>,
}

struct Worker<T> {
    reports: Receiver<Vec<u8>>,
    writes: Sender<WriteRequest>,
    thread: JoinHandle<T>,
}

enum Io<T> {
    Direct(T),
    Worker(Worker<T>),
    Closed,
}

/// An open device exchanging reports over `T`.
pub struct ReportDevice<T: Transport> {
    info: DeviceInfo,
    io: Io<T>,
    shutdown: Arc<AtomicBool>,
    read_error: Arc<Mutex<Option<Error>>>,
    channel_capacity: usize,
    read_timeout_ms: u32,
}

impl<T: Transport> ReportDevice<T> {
    /// Wrap an already open transport.
    pub fn new(transport: T, info: DeviceInfo, config: &HidConfig) -> Self {
        Self {
            info,
            io: Io::Direct(transport),
            shutdown: Arc::new(AtomicBool::new(false)),
            read_error: Arc::new(Mutex::new(None)),
            channel_capacity: config.read_channel_capacity.max(1),
            read_timeout_ms: config.read_timeout_ms.max(1),
        }
    }

    fn spawn_worker(&self, transport: T) -> Result<Worker<T>> {
        let (report_tx, reports) = sync_channel(self.channel_capacity);
        let (writes, write_rx) = channel();
        let worker = ReadWorker {
            transport,
            reports: Some(report_tx),
            writes: write_rx,
            shutdown: Arc::clone(&self.shutdown),
            read_error: Arc::clone(&self.read_error),
            report_len: self.info.input_report_length.max(1),
            timeout_ms: i32::try_from(self.read_timeout_ms).unwrap_or(i32::MAX),
            idle: Duration::from_millis(u64::from(self.read_timeout_ms)),
            path: self.info.path.clone(),
        };
        let thread = std::thread::Builder::new()
            .name(format!("hid-read {}", self.info.path))
            .spawn(move || worker.run())?;
        debug!(path = %self.info.path, "read loop started");
        Ok(Worker {
            reports,
            writes,
            thread,
        })
    }
}

struct ReadWorker<T> {
    transport: T,
    reports: Option<SyncSender<Vec<u8>>>,
    writes: Receiver<WriteRequest>,
    shutdown: Arc<AtomicBool>,
    read_error: Arc<Mutex<Option<Error>>>,
    report_len: usize,
    timeout_ms: i32,
    idle: Duration,
    path: String,
}

impl<T: Transport> ReadWorker<T> {
    fn run(mut self) -> T {
        let mut buf = vec![0u8; self.report_len];
        while !self.stopping() && self.serve_pending_writes() {
            match self.transport.read_report(&mut buf, self.timeout_ms) {
                Ok(0) => continue, // timeout
                Ok(n) => {
                    trace!(path = %self.path, n, "input report");
                    if !self.deliver(buf[..n].to_vec()) {
                        break;
                    }
                }
                Err(e) => {
                    warn!(path = %self.path, error = %e, "read loop stopped");
                    *self
                        .read_error
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(Error::ReadLoop(e.to_string()));
                    self.reports = None;
                    // Writes still work until the device is closed.
                    while let Ok(req) = self.writes.recv() {
                        self.serve(req);
                    }
                    break;
                }
            }
        }
        self.transport
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn serve(&self, req: WriteRequest) {
        let _ = req.reply.send(self.transport.write_report(&req.data));
    }

    /// Drain queued writes. `false` once the device side is gone.
    fn serve_pending_writes(&self) -> bool {
        loop {
            match self.writes.try_recv() {
                Ok(req) => self.serve(req),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// Push one report, serving writes while the channel is full. `false` once the
    /// receiver is gone or shutdown was requested.
    fn deliver(&self, mut report: Vec<u8>) -> bool {
        let Some(reports) = &self.reports else {
            return false;
        };
        loop {
            match reports.try_send(report) {
                Ok(()) => return true,
                Err(TrySendError::Disconnected(_)) => return false,
                Err(TrySendError::Full(back)) => report = back,
            }
            match self.writes.recv_timeout(self.idle) {
                Ok(req) => self.serve(req),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return false,
            }
            if self.stopping() {
                return false;
            }
        }
    }
}

impl<T: Transport> Device for ReportDevice<T> {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        let written = match &self.io {
            Io::Direct(transport) => transport.write_report(data)?,
            Io::Worker(worker) => {
                let (reply, answer) = sync_channel(1);
                worker
                    .writes
                    .send(WriteRequest {
                        data: data.to_vec(),
                        reply,
                    })
                    .map_err(|_| Error::Closed)?;
                answer.recv().map_err(|_| Error::Closed)??
            }
            Io::Closed => return Err(Error::Closed),
        };
        if written != data.len() {
            return Err(Error::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(())
    }

    fn read_channel(&mut self) -> Result<&Receiver<Vec<u8>>> {
        if let Io::Direct(_) = self.io {
            if let Io::Direct(transport) = std::mem::replace(&mut self.io, Io::Closed) {
                // A failed spawn drops the transport with the closure.
                self.io = Io::Worker(self.spawn_worker(transport)?);
            }
        }
        match &self.io {
            Io::Worker(worker) => Ok(&worker.reports),
            _ => Err(Error::Closed),
        }
    }

    fn take_read_error(&self) -> Option<Error> {
        self.read_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn close(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        match std::mem::replace(&mut self.io, Io::Closed) {
            Io::Direct(transport) => drop(transport),
            Io::Worker(Worker {
                reports,
                writes,
                thread,
            }) => {
                // Unblocks a worker waiting on a full channel or on writes.
                drop(reports);
                drop(writes);
                match thread.join() {
                    Ok(transport) => drop(transport),
                    Err(_) => warn!(path = %self.info.path, "read thread panicked"),
                }
            }
            Io::Closed => return,
        }
        debug!(path = %self.info.path, "closed HID device");
    }
}

impl<T: Transport> Drop for ReportDevice<T> {
    fn drop(&mut self) {
        self.close();
    }
}
