use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use config::Config;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// procwatch: report processes as they appear
///
/// procwatch periodically scans the process table and prints every process
/// that was not there during the previous scan, together with its owner,
/// parent and command line. No special privileges are required, but
/// processes of other users may show up with `UID=???` or `CMD=???` when
/// they exit before they can be inspected.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// If not provided, the default locations are checked. They are
    /// `/etc/procwatch/config.toml` and `/etc/procwatch/config.d/*.toml`,
    /// where the latter being a glob pattern. If they don't exist, the default
    /// configuration is used.
    #[arg(short, long, value_parser = validate_file)]
    pub config: Option<PathBuf>,

    /// Resolve and print the parent pid of every process.
    #[arg(short, long)]
    pub ppid: bool,

    /// Scan interval in milliseconds. 0 disables periodic scans; send
    /// SIGUSR1 to scan manually.
    #[arg(short, long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Maximum number of command line bytes to read.
    #[arg(long, value_parser = validate_cmd_length)]
    pub max_cmd_length: Option<usize>,

    /// Do not report processes whose cgroup contains this string.
    #[arg(long, value_name = "SUBSTRING")]
    pub cgroup_exclude: Option<String>,

    /// Do not report processes owned by this user. May be repeated.
    #[arg(long, value_name = "USER")]
    pub user_exclude: Vec<String>,

    /// Do not report commands containing this string. May be repeated.
    ///
    /// Note that while any command filter is set, processes whose command
    /// line cannot be read are not reported either.
    #[arg(long, value_name = "SUBSTRING")]
    pub cmd_exclude: Vec<String>,

    /// Do not report the processes already running at startup.
    #[arg(long)]
    pub skip_existing: bool,

    /// Print one JSON object per process instead of text lines.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

impl Cli {
    /// Override configuration values with the ones given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if self.ppid {
            config.scan.ppid = true;
        }
        if let Some(interval) = self.interval {
            config.trigger.interval = Duration::from_millis(interval);
        }
        if let Some(len) = self.max_cmd_length {
            config.scan.max_cmd_length = len;
        }
        if let Some(cgroup) = &self.cgroup_exclude {
            config.scan.cgroup_exclude = cgroup.clone();
        }
        config.scan.user_exclude.extend(self.user_exclude.iter().cloned());
        config.scan.cmd_exclude.extend(self.cmd_exclude.iter().cloned());
        if self.skip_existing {
            config.scan.report_existing = false;
        }
        config.apply_defaults();
    }
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Validate the command line read limit.
#[inline(always)]
fn validate_cmd_length(len: &str) -> Result<usize, String> {
    let len: usize = len
        .parse()
        .map_err(|_| format!("`{len}` is not a valid length"))?;
    if len > 0 {
        Ok(len)
    } else {
        Err("Command length must be greater than zero".to_string())
    }
}
