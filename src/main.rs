use avwx_decoder::cli::{args::Args, commands};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
            cancellation_token.cancel();
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(avwx_decoder::Error::processing_interrupted(
                    "Decoding interrupted by user",
                ))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("AVWX Decoder - METAR and TAF Report Decoder");
    println!("===========================================");
    println!();
    println!("Decode aviation weather observations (METAR) and terminal aerodrome");
    println!("forecasts (TAF) into structured records with VFR/MVFR/IFR/LIFR categories.");
    println!();
    println!("USAGE:");
    println!("    avwx-decoder <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    metar       Decode METAR reports given on the command line");
    println!("    taf         Decode TAF reports given on the command line");
    println!("    batch       Decode reports from files, directories or stdin");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Decode a single observation:");
    println!("    avwx-decoder metar \"KATL 052253Z 12008KT 10SM FEW250 24/12 A3008\"");
    println!();
    println!("    # Decode a forecast against a fixed reference time, as JSON:");
    println!("    avwx-decoder taf --now 2024-03-05T23:00:00Z --format json \\");
    println!("                 \"KJFK 051730Z 0518/0624 33015KT P6SM FM052000 34010KT 2SM OVC008\"");
    println!();
    println!("    # Decode every *.txt file under a directory with 8 workers:");
    println!("    avwx-decoder batch reports/ --kind auto -j 8 -o decoded.json --format json");
    println!();
    println!("    # Decode reports piped on stdin:");
    println!("    cat metars.txt | avwx-decoder batch --kind metar");
    println!();
    println!("For detailed help on any command, use:");
    println!("    avwx-decoder <COMMAND> --help");
}
