//! Index command - lists downloaded maps from the map database.

use chrono::DateTime;
use waypost::AppContext;

use crate::output::{OutputFormat, print_json, print_table};

/// Run the index command
pub fn run(context: &AppContext, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let index = context.resources().map_index();
    let detached = index.database().is_detached();

    match format {
        OutputFormat::Human => {
            if detached {
                eprintln!("Map database unavailable");
            }
            if index.is_empty() {
                println!("No downloaded maps");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = index
                .maps()
                .map(|tile| {
                    vec![
                        tile.x.to_string(),
                        tile.y.to_string(),
                        tile.version.to_string(),
                        DateTime::from_timestamp(tile.date, 0)
                            .map(|date| date.format("%Y-%m-%d").to_string())
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(&["X", "Y", "VERSION", "DATE"], &rows);
        }
        OutputFormat::Json => {
            let maps: Vec<_> = index
                .maps()
                .map(|tile| {
                    serde_json::json!({
                        "x": tile.x,
                        "y": tile.y,
                        "version": tile.version,
                        "date": tile.date,
                    })
                })
                .collect();
            print_json(&serde_json::json!({ "detached": detached, "maps": maps }))?;
        }
    }

    Ok(())
}
