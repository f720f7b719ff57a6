#![forbid(unsafe_code)]

#[cfg(unix)]
mod unix {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::process::{Child, Command, Output, Stdio};
    use std::thread::sleep;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    #[test]
    fn sigusr1_scans_and_sigint_exits() -> io::Result<()> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.toml");
        write_config(&config_path)?;

        let child = Command::new(env!("CARGO_BIN_EXE_procwatch"))
            .arg("--config")
            .arg(&config_path)
            .arg("--skip-existing")
            .arg("-v")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let pid = Pid::from_raw(child.id() as i32);
        sleep(Duration::from_millis(500));

        // seeds the index
        kill(pid, Signal::SIGUSR1).ok();
        sleep(Duration::from_millis(400));

        let mut sleeper = Command::new("sleep").arg("3").spawn()?;
        let sleeper_pid = sleeper.id();
        sleep(Duration::from_millis(100));

        kill(pid, Signal::SIGUSR1).ok();
        sleep(Duration::from_millis(400));

        kill(pid, Signal::SIGINT).ok();
        let output = wait_for_output(child)?;
        let _ = sleeper.kill();
        let _ = sleeper.wait();

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        assert!(output.status.success(), "stderr: {stderr}");
        let line = stdout
            .lines()
            .find(|line| line.contains(&format!("PID={sleeper_pid} ")))
            .unwrap_or_else(|| panic!("sleeper not reported, stdout: {stdout}"));
        assert!(line.contains(&format!("PPID={} ", std::process::id())));
        assert!(line.ends_with("CMD=sleep 3"));
        assert!(stderr.contains("shutdown requested"));

        Ok(())
    }

    fn write_config(path: &Path) -> io::Result<()> {
        let contents = "[scan]\nppid = true\n\n[trigger]\ninterval = 0\n";
        fs::write(path, contents)
    }

    fn wait_for_output(mut child: Child) -> io::Result<Output> {
        let start = Instant::now();
        loop {
            if child.try_wait()?.is_some() {
                break;
            }
            if start.elapsed() > Duration::from_secs(10) {
                let _ = child.kill();
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "procwatch did not exit",
                ));
            }
            sleep(Duration::from_millis(50));
        }
        child.wait_with_output()
    }
}
