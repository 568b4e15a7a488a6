//! UID command - allocates identifiers from the persisted counter.

use waypost::AppContext;

use crate::cli::UidArgs;
use crate::output::{OutputFormat, print_json};

/// Run the uid command
pub fn run(
    context: &AppContext,
    args: &UidArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let uids = (0..args.count)
        .map(|_| context.uids().next())
        .collect::<waypost::Result<Vec<_>>>()?;

    match format {
        OutputFormat::Human => {
            for uid in &uids {
                println!("{uid}");
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "uids": uids }))?,
    }

    Ok(())
}
