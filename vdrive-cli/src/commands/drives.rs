use tabled::{Table, Tabled};

use crate::commands::{ensure_setup, open_session};
use crate::error::Result;
use crate::utils;

#[derive(Tabled)]
struct DriveInfo {
    #[tabled(rename = "Drive")]
    name: String,
    #[tabled(rename = "Used (MB)")]
    used: u64,
    #[tabled(rename = "Total (MB)")]
    total: u64,
    #[tabled(rename = "Free (MB)")]
    free: u64,
}

pub async fn execute() -> Result<()> {
    utils::print_header("Drives");
    let session = open_session()?;
    if !ensure_setup(&session) {
        return Ok(());
    }

    let drives = session.vfs().drives()?;
    let overcommitted: Vec<String> = drives
        .iter()
        .filter(|(_, drive)| drive.is_overcommitted())
        .map(|(_, drive)| drive.name.clone())
        .collect();

    let rows: Vec<DriveInfo> = drives
        .into_iter()
        .map(|(_, drive)| DriveInfo {
            free: drive.free_memory(),
            name: drive.name,
            used: drive.used_memory,
            total: drive.total_memory,
        })
        .collect();

    println!("{}", Table::new(rows));
    for name in overcommitted {
        utils::print_warning(&format!("Drive {name} holds more than its capacity"));
    }

    Ok(())
}
