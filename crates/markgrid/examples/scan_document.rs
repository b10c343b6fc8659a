//! Scan every page of an already-rasterized document and print one JSON
//! array with exactly one entry per page, result or error.

use markgrid::{pages_from_paths, DecisionPolicy, ScanConfig, SheetLayout, SheetScanner};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <page_1.png> [page_2.png ...]", args[0]);
        std::process::exit(2);
    }

    let mut config = ScanConfig::from_layout(SheetLayout::default());
    // Batch runs favor explicit unknowns over guesses: gate the winner on
    // an absolute floor and a lead over the runner-up.
    config.decision = DecisionPolicy::margin_gated();
    let scanner = SheetScanner::with_config(config);

    let entries = scanner.scan_batch(pages_from_paths(&args[1..]));
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
