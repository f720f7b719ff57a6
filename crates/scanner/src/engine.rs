#![forbid(unsafe_code)]

use crate::domain::{Pid, ProcessEvent};
use crate::error::Error;
use crate::extract::Extractor;
use crate::filter::{FilterChain, Verdict};
use crate::index::ProcessIndex;
use crate::source::ProcSource;
use config::Scan;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Capacity of the error stream. Errors beyond it are logged and dropped.
pub const ERROR_CAPACITY: usize = 16;

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub scan_id: u64,
    /// The index was seeded without reporting anything.
    pub silent: bool,
    pub new: usize,
    pub exited: usize,
    pub suppressed: usize,
    pub events: Vec<ProcessEvent>,
}

/// Streams returned by [`Scanner::run`].
#[derive(Debug)]
pub struct ScannerHandle {
    pub events: mpsc::Receiver<ProcessEvent>,
    pub errors: mpsc::Receiver<Error>,
    pub task: JoinHandle<()>,
}

pub struct Scanner {
    source: Box<dyn ProcSource>,
    extractor: Extractor,
    filters: FilterChain,
    index: ProcessIndex,
    report_existing: bool,
    event_capacity: usize,
    scan_id: u64,
}

impl Scanner {
    pub fn new(scan: &Scan, source: Box<dyn ProcSource>) -> Result<Self, Error> {
        scan.validate()?;
        Ok(Self {
            source,
            extractor: Extractor::new(scan),
            filters: FilterChain::new(scan),
            index: ProcessIndex::new(),
            report_existing: scan.report_existing,
            event_capacity: scan.event_capacity,
            scan_id: 0,
        })
    }

    pub fn index(&self) -> &ProcessIndex {
        &self.index
    }

    /// Extract and filter a single process.
    pub fn inspect(&self, pid: Pid) -> Verdict<ProcessEvent> {
        let source = self.source.as_ref();

        if let Some(reason) = self.filters.check_cgroup(source, pid) {
            return Verdict::Suppress(reason);
        }

        let uid = self.extractor.owner(source, pid);
        if let Some(reason) = self.filters.check_user(source, &uid) {
            return Verdict::Suppress(reason);
        }

        let cmd = self.extractor.command(source, pid);
        if let Some(reason) = self.filters.check_command(&cmd) {
            return Verdict::Suppress(reason);
        }

        let ppid = self.extractor.parent(source, pid);
        Verdict::Emit(ProcessEvent {
            pid,
            uid,
            ppid,
            cmd,
        })
    }

    /// Run one full scan cycle.
    ///
    /// The index is only updated once every new process has been inspected.
    /// If the process table cannot be listed the index is left untouched.
    #[tracing::instrument(skip(self), fields(scan_id = self.scan_id + 1))]
    pub fn scan_once(&mut self) -> Result<ScanReport, Error> {
        self.scan_id = self.scan_id.saturating_add(1);
        let current: HashSet<Pid> = self.source.pids()?.into_iter().collect();
        let diff = self.index.diff(&current);

        let mut report = ScanReport {
            scan_id: self.scan_id,
            silent: !self.index.is_seeded() && !self.report_existing,
            new: diff.new.len(),
            exited: diff.exited.len(),
            ..Default::default()
        };

        if !report.silent {
            for pid in diff.new {
                match self.inspect(pid) {
                    Verdict::Emit(event) => report.events.push(event),
                    Verdict::Suppress(reason) => {
                        trace!(pid, ?reason, "process suppressed");
                        report.suppressed += 1;
                    }
                }
            }
        }

        self.index.commit(current);
        debug!(
            new = report.new,
            exited = report.exited,
            emitted = report.events.len(),
            suppressed = report.suppressed,
            silent = report.silent,
            "scan finished"
        );
        Ok(report)
    }

    /// Scan once per trigger until `cancel` fires or the trigger channel
    /// closes.
    ///
    /// A full event channel pauses the loop until the consumer catches up.
    /// A failed scan is reported on the error stream and retried on the next
    /// trigger.
    pub fn run(self, triggers: mpsc::Receiver<()>, cancel: CancellationToken) -> ScannerHandle {
        let (events_tx, events) = mpsc::channel(self.event_capacity);
        let (errors_tx, errors) = mpsc::channel(ERROR_CAPACITY);
        let task = tokio::spawn(self.run_loop(triggers, events_tx, errors_tx, cancel));
        ScannerHandle {
            events,
            errors,
            task,
        }
    }

    async fn run_loop(
        self,
        mut triggers: mpsc::Receiver<()>,
        events_tx: mpsc::Sender<ProcessEvent>,
        errors_tx: mpsc::Sender<Error>,
        cancel: CancellationToken,
    ) {
        let mut scanner = self;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("scanner stopped");
                    return;
                }
                trigger = triggers.recv() => {
                    if trigger.is_none() {
                        debug!("trigger source closed");
                        return;
                    }
                }
            }

            let cycle = tokio::task::spawn_blocking(move || {
                let result = scanner.scan_once();
                (scanner, result)
            });
            let result = match cycle.await {
                Ok((returned, result)) => {
                    scanner = returned;
                    result
                }
                Err(err) => {
                    error!(%err, "scan task aborted");
                    report_error(&errors_tx, Error::Join(err));
                    return;
                }
            };

            let report = match result {
                Ok(report) => report,
                Err(err) => {
                    warn!(%err, "scan failed");
                    report_error(&errors_tx, err);
                    continue;
                }
            };

            for event in report.events {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("scanner stopped");
                        return;
                    }
                    sent = events_tx.send(event) => {
                        if sent.is_err() {
                            debug!("event receiver dropped");
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn report_error(errors_tx: &mpsc::Sender<Error>, err: Error) {
    match errors_tx.try_send(err) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(err)) => warn!(%err, "error stream full, dropping error"),
    }
}
