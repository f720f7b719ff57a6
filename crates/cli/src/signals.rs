use std::io;
use tokio::signal::unix::{Signal, SignalKind, signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// Run one scan right away (`SIGUSR1`).
    Scan,
    /// Stop scanning and exit (`SIGINT`, `SIGTERM`).
    Shutdown,
}

pub struct Signals {
    usr1: Signal,
    int: Signal,
    term: Signal,
}

impl Signals {
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            usr1: signal(SignalKind::user_defined1())?,
            int: signal(SignalKind::interrupt())?,
            term: signal(SignalKind::terminate())?,
        })
    }

    pub async fn recv(&mut self) -> SignalEvent {
        tokio::select! {
            _ = self.usr1.recv() => SignalEvent::Scan,
            _ = self.int.recv() => SignalEvent::Shutdown,
            _ = self.term.recv() => SignalEvent::Shutdown,
        }
    }
}
