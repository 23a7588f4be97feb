//! cldr2json - CLDR keyboard to on-screen keyboard layout converter
//!
//! Converts CLDR keyboard XML documents into desktop, mobile and
//! extended-mobile JSON layouts named after their keyboard identifier.

use clap::Parser;
use cldr2json::cli::ConvertArgs;
use cldr2json::constants::APP_BINARY_NAME;
use cldr2json::logging;

/// cldr2json - CLDR keyboard to on-screen keyboard layout converter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: ConvertArgs,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.args.verbose);

    if let Err(err) = cli.args.execute() {
        eprintln!("Error: {err}");
        if err.kind == cldr2json::cli::ExitCode::Usage {
            eprintln!();
            eprintln!("Usage: {APP_BINARY_NAME} [OPTIONS] <SOURCE> <DESTINATION>");
            eprintln!("For more options, run:");
            eprintln!("  {APP_BINARY_NAME} --help");
        }
        std::process::exit(err.exit_code());
    }
}
