//! asnmp-trapd: Receive and print SNMP traps.
//!
//! Part of the async-snmp-trap CLI utilities.

use async_snmp_trap::cli::args::{ListenArgs, OutputArgs};
use async_snmp_trap::cli::output::{TrapPrinter, write_error};
use async_snmp_trap::{TrapListener, TrapPacket};
use clap::Parser;
use std::net::SocketAddr;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Receive SNMP traps and print them to stdout.
#[derive(Debug, Parser)]
#[command(name = "asnmp-trapd", version, about)]
struct Args {
    #[command(flatten)]
    listen: ListenArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    args.output.init_tracing();

    let printer = TrapPrinter::new(args.output.format);
    let listener = TrapListener::builder()
        .config(args.listen.listener_config())
        .handler(move |packet: TrapPacket, source: SocketAddr| {
            if let Err(e) = printer.print(&packet, source) {
                tracing::warn!(error = %e, "failed to write trap");
            }
        })
        .build();

    let bound = match listener.bind(&args.listen.listen).await {
        Ok(bound) => bound,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };
    eprintln!("Listening on {}", bound.local_addr());

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received, shutting down");
                shutdown.cancel();
            }
            Err(e) => tracing::error!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    match bound.run(token).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}
