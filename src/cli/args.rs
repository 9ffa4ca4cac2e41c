//! Command-line arguments shared by the CLI tools.

use std::time::Duration;

use clap::{ArgAction, Args, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::listener::{
    DEFAULT_MAX_DATAGRAM_SIZE, DecodeFailurePolicy, DispatchMode, ListenerConfig, ReadErrorPolicy,
};

/// Output format for received traps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One readable block per trap.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Listener options.
#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Address to listen on (`host:port`, or `:port` for all IPv4 interfaces).
    #[arg(short, long, default_value = "0.0.0.0:162", value_name = "ADDR")]
    pub listen: String,

    /// Retry immediately after a socket read error instead of backing off.
    #[arg(long)]
    pub no_backoff: bool,

    /// Exit after this many consecutive socket read errors.
    #[arg(long, value_name = "N", conflicts_with = "no_backoff")]
    pub max_read_errors: Option<u32>,

    /// Drop datagrams that cannot be fully decoded instead of printing them.
    #[arg(long)]
    pub drop_undecodable: bool,

    /// Print traps from a bounded queue of this capacity, on worker threads.
    #[arg(long, value_name = "CAPACITY")]
    pub queue: Option<usize>,

    /// Number of worker threads when --queue is set.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub workers: usize,

    /// Receive buffer size per datagram; larger datagrams are truncated.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_DATAGRAM_SIZE)]
    pub buffer_size: usize,

    /// Kernel socket receive buffer size (SO_RCVBUF).
    #[arg(long, value_name = "BYTES")]
    pub recv_buffer: Option<usize>,

    /// Do not log read and decode errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl ListenArgs {
    /// Build the listener configuration these arguments describe.
    pub fn listener_config(&self) -> ListenerConfig {
        let read_errors = if self.no_backoff {
            ReadErrorPolicy::Continue
        } else {
            ReadErrorPolicy::Backoff {
                base_delay: Duration::from_millis(10),
                max_delay: Duration::from_secs(1),
                max_consecutive: self.max_read_errors,
            }
        };

        let decode_failure = if self.drop_undecodable {
            DecodeFailurePolicy::Suppress
        } else {
            DecodeFailurePolicy::FailOpen
        };

        let dispatch = match self.queue {
            Some(capacity) => DispatchMode::Queued {
                capacity,
                workers: self.workers,
            },
            None => DispatchMode::Inline,
        };

        ListenerConfig {
            log_errors: !self.quiet,
            max_datagram_size: self.buffer_size,
            recv_buffer_size: self.recv_buffer,
            read_errors,
            decode_failure,
            dispatch,
            ..ListenerConfig::default()
        }
    }
}

/// Output options.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl OutputArgs {
    /// Install a stderr tracing subscriber.
    pub fn init_tracing(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        listen: ListenArgs,
        #[command(flatten)]
        output: OutputArgs,
    }

    fn parse(args: &[&str]) -> TestCli {
        TestCli::try_parse_from(std::iter::once("asnmp-trapd").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults_match_listener_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.listen.listen, "0.0.0.0:162");
        assert_eq!(cli.listen.listener_config(), ListenerConfig::default());
        assert_eq!(cli.output.format, OutputFormat::Human);
    }

    #[test]
    fn test_policy_flags() {
        let cli = parse(&[
            "--listen",
            ":1162",
            "--max-read-errors",
            "5",
            "--drop-undecodable",
            "--queue",
            "100",
            "--workers",
            "4",
            "--buffer-size",
            "65535",
            "--quiet",
            "--format",
            "json",
        ]);
        let config = cli.listen.listener_config();
        assert!(!config.log_errors);
        assert_eq!(config.max_datagram_size, 65535);
        assert_eq!(config.decode_failure, DecodeFailurePolicy::Suppress);
        assert_eq!(
            config.dispatch,
            DispatchMode::Queued {
                capacity: 100,
                workers: 4
            }
        );
        assert!(config.read_errors.exhausted(5));
        assert_eq!(cli.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_no_backoff_conflicts_with_threshold() {
        let result = TestCli::try_parse_from(["asnmp-trapd", "--no-backoff", "--max-read-errors", "3"]);
        assert!(result.is_err());
        let cli = parse(&["--no-backoff"]);
        assert_eq!(cli.listen.listener_config().read_errors, ReadErrorPolicy::Continue);
    }
}
