use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tailf::config::{self, ConfigError, FlushPolicy, TailConfig};
use tailf::follow::{follow_stream, FollowDriver};
use tailf::signal::setup_shutdown_handlers;
use tailf::tailer::static_tail;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "tailf")]
#[command(
    version,
    about = "Print the last lines of a file or stdin, optionally following it as it grows",
    long_about = None
)]
struct Args {
    /// File to read (omit or use - for stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output the last NUM lines (default 10)
    #[arg(short = 'n', long = "lines", value_name = "NUM", value_parser = parse_line_count)]
    lines: Option<usize>,

    /// With -f, sleep for approximately SECONDS between reads (default 1)
    #[arg(short = 's', long = "sleep-interval", value_name = "SECONDS", value_parser = parse_seconds)]
    sleep_interval: Option<Duration>,

    /// Output appended data as the input grows
    #[arg(short = 'f', long = "follow")]
    follow: bool,

    /// Flush on every quiescence tick, even while lines keep arriving
    #[arg(long = "flush-every-tick")]
    flush_every_tick: bool,

    /// Idle time in milliseconds after which buffered lines are flushed (default 1000)
    #[arg(long = "quiescence-ms", value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    quiescence_ms: Option<u64>,

    /// Config file (default: ~/.config/tailf/config.yaml if present)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug diagnostics on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Args {
    /// Overlay command-line flags on the loaded configuration
    fn apply(&self, config: &mut TailConfig) {
        if let Some(lines) = self.lines {
            config.lines = lines;
        }
        if let Some(interval) = self.sleep_interval {
            config.poll_interval = interval;
        }
        if let Some(ms) = self.quiescence_ms {
            config.quiescence = Duration::from_millis(ms);
        }
        if self.flush_every_tick {
            config.flush_policy = FlushPolicy::EveryTick;
        }
        config.follow = self.follow;
    }

    /// Input file, `None` for stdin
    fn input(&self) -> Option<PathBuf> {
        self.file.clone().filter(|path| path.as_os_str() != "-")
    }
}

fn parse_line_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let seconds: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err("must be a positive number of seconds".to_string());
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("{}", e))
}

fn main() {
    let args = Args::parse();
    tailf::logging::init(args.verbose);

    if let Err(err) = run(&args) {
        // Config errors carry their own Cargo-style "error:" rendering
        match err.downcast_ref::<ConfigError>() {
            Some(config_err) => eprint!("{}", config_err),
            None => eprintln!("error: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config_path = config::discover(args.config.as_deref());
    let mut tail_config = config::load(config_path.as_deref())?;
    args.apply(&mut tail_config);
    tail_config.validate()?;
    debug!(?config_path, ?tail_config, "configuration resolved");

    let mut out = io::stdout().lock();

    match (args.input(), tail_config.follow) {
        (Some(path), true) => {
            let shutdown = setup_shutdown_handlers().context("Failed to set signal handlers")?;
            let mut err = io::stderr();
            FollowDriver::new(path, tail_config)
                .with_shutdown(shutdown)
                .run(&mut out, &mut err)
        }
        (Some(path), false) => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            static_tail(file, &mut out, tail_config.lines)?;
            Ok(())
        }
        (None, true) => {
            let shutdown = setup_shutdown_handlers().context("Failed to set signal handlers")?;
            follow_stream(io::stdin(), &mut out, &tail_config, Some(&shutdown))?;
            Ok(())
        }
        (None, false) => {
            static_tail(io::stdin(), &mut out, tail_config.lines)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tailf").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = parse(&[]);
        let mut config = TailConfig::default();
        args.apply(&mut config);

        assert_eq!(config, TailConfig::default());
        assert!(args.input().is_none());
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "-n",
            "3",
            "-s",
            "0.25",
            "-f",
            "--flush-every-tick",
            "--quiescence-ms",
            "200",
            "app.log",
        ]);
        let mut config = TailConfig::default();
        args.apply(&mut config);

        assert_eq!(config.lines, 3);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.quiescence, Duration::from_millis(200));
        assert_eq!(config.flush_policy, FlushPolicy::EveryTick);
        assert!(config.follow);
        assert_eq!(args.input(), Some(PathBuf::from("app.log")));
    }

    #[test]
    fn test_flags_override_config_file_values() {
        let args = parse(&["-n", "7"]);
        let mut config = TailConfig {
            lines: 50,
            poll_interval: Duration::from_secs(5),
            ..TailConfig::default()
        };
        args.apply(&mut config);

        assert_eq!(config.lines, 7);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_dash_means_stdin() {
        assert!(parse(&["-"]).input().is_none());
    }

    #[test]
    fn test_rejects_zero_lines() {
        assert!(Args::try_parse_from(["tailf", "-n", "0"]).is_err());
    }

    #[test]
    fn test_rejects_bad_sleep_interval() {
        assert!(Args::try_parse_from(["tailf", "-s", "0"]).is_err());
        assert!(Args::try_parse_from(["tailf", "-s", "-1"]).is_err());
        assert!(Args::try_parse_from(["tailf", "-s", "soon"]).is_err());
    }

    #[test]
    fn test_rejects_sleep_interval_too_large_for_duration() {
        assert!(Args::try_parse_from(["tailf", "-s", "1e20"]).is_err());
        assert!(parse_seconds("1e20").is_err());
    }
}
