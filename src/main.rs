//! # roster-sort CLI
//!
//! Command-line interface for the roster photo sorter.
//!
//! ## Usage
//! ```bash
//! roster-sort group detection_results.json participants.json
//! roster-sort run job.json --output json
//! ```

mod cli;

use roster_sort::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    roster_sort::init_tracing();
    cli::run()
}
