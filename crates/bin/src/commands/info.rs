//! Context info command - shows directories, UID counter and resource state.

use waypost::AppContext;

use crate::output::{OutputFormat, print_json};

/// Run the info command
pub fn run(context: &AppContext, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let config = context.config();
    let last_uid = context.uids().peek()?;
    let pending_crash = context.crash_log().pending_report_len()?;
    let resources = context.resources();
    let database_state = format!("{:?}", resources.database_state());
    let index_state = format!("{:?}", resources.index_state());

    match format {
        OutputFormat::Human => {
            println!("Version:      {}", config.version.as_deref().unwrap_or("unknown"));
            println!("Data dir:     {}", config.data_dir.display());
            println!("Map database: {}", resources.database_path().display());
            println!("Crash report: {}", config.crash_report_path().display());
            println!("Last UID:     {last_uid}");
            println!("Database:     {database_state}");
            println!("Map index:    {index_state}");
            match pending_crash {
                Some(bytes) => println!("Unseen crash: yes ({bytes} bytes)"),
                None => println!("Unseen crash: no"),
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "version": config.version,
            "data_dir": config.data_dir,
            "map_database": resources.database_path(),
            "crash_report": config.crash_report_path(),
            "last_uid": last_uid,
            "database": database_state,
            "map_index": index_state,
            "unseen_crash_bytes": pending_crash,
        }))?,
    }

    Ok(())
}
