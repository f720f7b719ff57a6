use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Trigger {
    /// Period of the built-in scan trigger. **Measured in milliseconds**.
    ///
    /// Zero disables the periodic trigger; scans then only happen when
    /// requested manually (e.g. `SIGUSR1`).
    ///
    /// ## Note
    ///
    /// Processes that start and exit between two scans are never seen.
    /// Lower values catch more short-lived processes at the cost of CPU.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub interval: Duration,
}

impl Default for Trigger {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
        }
    }
}

impl Trigger {
    /// The periodic interval, or `None` if periodic scanning is disabled.
    pub fn period(&self) -> Option<Duration> {
        (!self.interval.is_zero()).then_some(self.interval)
    }
}
