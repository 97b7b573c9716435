use vdrive::Session;
use vdrive::vfs::{DriveLetter, MAX_DRIVES};

use crate::commands::{drives, open_session};
use crate::error::{Result, VdriveCliError};
use crate::utils;

pub const MIN_CAPACITY_MB: u64 = 100;
pub const MAX_CAPACITY_MB: u64 = 10_000;

/// 1024 MB for the system drive, 512 MB for the rest.
pub fn default_capacity(index: usize) -> u64 {
    if index == 0 { 1024 } else { 512 }
}

pub fn clamp_capacity(capacity: u64) -> u64 {
    capacity.clamp(MIN_CAPACITY_MB, MAX_CAPACITY_MB)
}

/// Pads missing capacities with defaults and clamps every value.
pub fn resolve_capacities(count: usize, given: &[u64]) -> Vec<u64> {
    (0..count)
        .map(|i| clamp_capacity(given.get(i).copied().unwrap_or_else(|| default_capacity(i))))
        .collect()
}

fn ensure_fresh(session: &Session) -> Result<()> {
    if session.needs_setup() {
        Ok(())
    } else {
        Err(VdriveCliError::RuntimeError(
            "Drives are already set up. Use 'vdrive reset' to start over.".to_string(),
        ))
    }
}

pub async fn execute(count: usize, capacities: &[u64]) -> Result<()> {
    if !(1..=MAX_DRIVES).contains(&count) {
        return Err(VdriveCliError::Input(format!(
            "Number of drives must be between 1 and {MAX_DRIVES}"
        )));
    }
    if capacities.len() > count {
        return Err(VdriveCliError::Input(format!(
            "{} capacities given for {count} drive(s)",
            capacities.len()
        )));
    }

    let session = open_session()?;
    ensure_fresh(&session)?;

    let capacities = resolve_capacities(count, capacities);
    session.setup_drives(count, &capacities)?;

    let letters: Vec<String> = DriveLetter::ALL[..count]
        .iter()
        .map(|l| l.display_name())
        .collect();
    utils::print_success(&format!("Created drive(s) {}", letters.join(", ")));
    drives::execute().await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vdrive::store::MemoryStore;

    use super::*;

    #[test]
    fn test_resolve_capacities() {
        assert_eq!(resolve_capacities(1, &[]), [1024]);
        assert_eq!(resolve_capacities(3, &[2048]), [2048, 512, 512]);
        assert_eq!(resolve_capacities(2, &[5, 50_000]), [100, 10_000]);
    }

    #[test]
    fn test_second_setup_is_refused_with_a_hint() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        assert!(ensure_fresh(&session).is_ok());

        session.setup_drives(1, &[1024]).unwrap();
        let err = ensure_fresh(&session).unwrap_err();
        assert!(err.to_string().contains("vdrive reset"));
    }
}
