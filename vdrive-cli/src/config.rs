use std::env;
use std::path::PathBuf;

use dirs;

const DEFAULT_VDRIVE_DIR: &str = "~/.vdrive";
/// Roughly what a browser grants one origin for local storage.
const DEFAULT_STORE_QUOTA: &str = "5242880";

pub fn get_vdrive_dir() -> PathBuf {
    let vdrive_dir = env::var("VDRIVE_DIR").unwrap_or(DEFAULT_VDRIVE_DIR.to_string());
    if vdrive_dir.starts_with("~") {
        let home_dir = dirs::home_dir();
        if let Some(home_dir) = home_dir {
            return home_dir.join(vdrive_dir[1..].trim_start_matches('/'));
        }
    }

    vdrive_dir.into()
}

/// Byte limit of the backing store, `0` for none.
pub fn get_store_quota() -> usize {
    let quota = env::var("VDRIVE_STORE_QUOTA").unwrap_or(DEFAULT_STORE_QUOTA.to_string());
    quota.parse().unwrap_or(5 * 1024 * 1024)
}
