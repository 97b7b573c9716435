use tabled::{Table, Tabled};
use vdrive::library::{MediaRecord, Shelf};

use crate::commands::open_session;
use crate::error::Result;
use crate::utils;

#[derive(Tabled)]
struct RecordInfo {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Stored as")]
    filename: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Uploaded")]
    uploaded: String,
}

impl From<MediaRecord> for RecordInfo {
    fn from(record: MediaRecord) -> Self {
        Self {
            id: record.id(),
            kind: record.kind().as_str(),
            name: record.original_name().to_string(),
            filename: record.filename().to_string(),
            size: utils::format_size(record.size()),
            uploaded: record.upload_date().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub async fn execute(shelf: Option<Shelf>) -> Result<()> {
    let session = open_session()?;
    let (title, records) = match shelf {
        Some(shelf) => (format!("Media Library: {shelf}"), session.list_library(shelf)),
        None => (
            "Media Library".to_string(),
            session.library().list_files(),
        ),
    };
    utils::print_header(&title);

    if records.is_empty() {
        utils::print_info("No uploads in the library.");
        utils::print_info("Use 'vdrive upload <file>' to add one.");
        return Ok(());
    }

    let len = records.len();
    let rows: Vec<RecordInfo> = records.into_iter().map(RecordInfo::from).collect();
    println!("{}", Table::new(rows));
    println!();
    utils::print_info(&format!("Found {len} record(s)"));
    Ok(())
}
