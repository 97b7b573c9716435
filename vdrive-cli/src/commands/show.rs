use console::style;
use vdrive::Session;
use vdrive::library::{MediaRecord, Shelf};

use crate::commands::open_session;
use crate::error::{Result, VdriveCliError};
use crate::utils;

fn find_record(session: &Session, shelf: Shelf, id: u64) -> Result<MediaRecord> {
    session
        .get_by_id(shelf, id)
        .ok_or_else(|| VdriveCliError::NotFound(format!("record #{id} in {shelf}")))
}

pub async fn execute(shelf: Shelf, id: u64) -> Result<()> {
    let record = find_record(&open_session()?, shelf, id)?;

    utils::print_header(&format!("{} #{}", record.kind().as_str(), record.id()));
    println!("{:<14}{}", style("Name:").bold(), record.original_name());
    println!("{:<14}{}", style("Stored as:").bold(), record.filename());
    println!("{:<14}{}", style("Type:").bold(), record.mime_type());
    println!("{:<14}{}", style("Size:").bold(), utils::format_size(record.size()));
    println!("{:<14}{}", style("Uploaded:").bold(), record.upload_date().to_rfc3339());

    match &record {
        MediaRecord::Image(image) => {
            println!("{:<14}{}", style("Description:").bold(), image.description);
            utils::print_info("Image data is kept as a data URL and not printed.");
        }
        MediaRecord::Text(text) => {
            if let Some(language) = text.language() {
                println!("{:<14}{}", style("Language:").bold(), language);
            }
            utils::print_separator();
            println!("{}", text.data);
        }
    }
    Ok(())
}
