//! Crash command - reports whether a new crash report exists.

use waypost::AppContext;

use crate::cli::CrashArgs;
use crate::output::{OutputFormat, print_json};

/// Run the crash command
///
/// Without `--ack` this has the same effect as the check on application
/// start: a new report is reported once and then counts as seen.
pub fn run(
    context: &AppContext,
    args: &CrashArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = context.crash_log();
    let report = if args.show { log.read_report()? } else { None };
    let unseen = if args.ack {
        let pending = log.pending_report_len()?.is_some();
        log.acknowledge()?;
        pending
    } else {
        log.has_unseen_crash()?
    };

    match format {
        OutputFormat::Human => {
            println!("Report:   {}", log.path().display());
            println!("Unseen:   {}", if unseen { "yes" } else { "no" });
            if args.ack {
                println!("Acknowledged");
            }
            if let Some(report) = &report {
                println!();
                print!("{report}");
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "path": log.path(),
            "unseen": unseen,
            "acknowledged": args.ack,
            "report": report,
        }))?,
    }

    Ok(())
}
