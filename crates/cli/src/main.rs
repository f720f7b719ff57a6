use clap::Parser;
use config::Config;
use procwatch::{
    cli::Cli,
    output::{Format, write_event},
    signals::{SignalEvent, Signals},
};
use scanner::{LinuxProcSource, Scanner, ScannerHandle, trigger};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // NOTE: The verbosity flag takes precedence over the environment variable
    // for log control. For example, `PROCWATCH_LOG=warn procwatch -vvv` will
    // still log at the trace level. The environment variable (`PROCWATCH_LOG`)
    // can only set the log level per crate, not override the verbosity flag.
    // Eg. `PROCWATCH_LOG=scanner=warn procwatch -vvv` will log at the trace
    // level for all crates except `scanner` which will log at the warn level.
    let env_filter = EnvFilter::builder()
        .with_env_var("PROCWATCH_LOG")
        .from_env()?
        .add_directive(cli.verbosity.log_level_filter().as_str().parse()?);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();

    // load config
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        _ => {
            let mut candidates = glob::glob("/etc/procwatch/config.d/*.toml")?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            candidates.sort();
            candidates.insert(0, "/etc/procwatch/config.toml".into());
            trace!(?candidates, "config file candidates");
            Config::load_multiple(candidates)?
        }
    };
    cli.apply(&mut config);
    config.scan.validate()?;
    debug!(?config, ?cli);

    let format = if cli.json { Format::Json } else { Format::Text };
    let cancel = CancellationToken::new();
    let mut signals = Signals::install()?;

    let (handle, triggers) = trigger::channel();
    let scanner = Scanner::new(&config.scan, Box::new(LinuxProcSource::default()))?;
    let ScannerHandle {
        mut events,
        mut errors,
        mut task,
    } = scanner.run(triggers, cancel.clone());

    match config.trigger.period() {
        Some(period) => {
            info!(?period, "periodic scanning enabled");
            trigger::spawn_interval(period, handle.clone(), cancel.clone());
        }
        None => info!("periodic scanning disabled, waiting for SIGUSR1"),
    }

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                write_event(&mut stdout.lock(), &event, format)?;
            }

            Some(err) = errors.recv() => {
                error!("error happened during scanning: {}", err);
            }

            signal = signals.recv() => {
                debug!(?signal, "Received signal event");
                match signal {
                    SignalEvent::Scan => {
                        handle.pulse();
                    }
                    SignalEvent::Shutdown => {
                        info!("shutdown requested");
                        cancel.cancel();
                    }
                }
            }

            // bubble up any errors from the scanner task
            res = &mut task => {
                res?;
                break;
            }
        }
    }

    // flush whatever the scanner produced before stopping
    while let Ok(event) = events.try_recv() {
        write_event(&mut stdout, &event, format)?;
    }
    info!(coalesced = handle.coalesced(), "exiting");
    Ok(())
}
