use std::sync::Arc;

use tracing::debug;
use vdrive::Session;
use vdrive::store::FileStore;

use crate::config;
use crate::error::Result;

pub mod cat;
pub mod drives;
pub mod library;
pub mod ls;
pub mod mkdir;
pub mod reset;
pub mod save;
pub mod setup;
pub mod show;
pub mod tree;
pub mod upload;

/// Opens the session backed by the configured data directory.
pub fn open_session() -> Result<Session> {
    let dir = config::get_vdrive_dir();
    let quota = config::get_store_quota();
    debug!(dir = %dir.display(), quota, "opening store");
    let store = FileStore::open(dir)?.with_quota(quota);
    Ok(Session::new(Arc::new(store)))
}

/// Read-only commands print a hint instead of failing when no drives exist.
pub(crate) fn ensure_setup(session: &Session) -> bool {
    if session.needs_setup() {
        crate::utils::print_error("No drives have been set up yet");
        crate::utils::print_info("Use 'vdrive setup' to create them first.");
        return false;
    }
    true
}
