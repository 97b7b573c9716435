use inquire::Confirm;

use crate::commands::open_session;
use crate::error::Result;
use crate::utils;

pub async fn execute(yes: bool) -> Result<()> {
    let confirm = yes
        || Confirm::new("Delete every drive, folder and file entry?")
            .with_default(false)
            .with_help_message("The media library and saved payloads are kept")
            .prompt()?;

    if confirm {
        open_session()?.reset()?;
        utils::print_success("File system removed. Run 'vdrive setup' to create new drives.");
    } else {
        utils::print_info("Reset cancelled.");
    }

    Ok(())
}
