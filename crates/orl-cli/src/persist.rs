use std::fs;
use std::path::Path;

use anyhow::Context;

use orl_sdk::Orl;

/// Load a ledger by restoring its serialized audit log.
pub fn load(path: &Path) -> anyhow::Result<Orl> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("cannot read ledger file {}", path.display()))?;
    let orl = Orl::from_json(&json)
        .with_context(|| format!("cannot restore ledger from {}", path.display()))?;
    Ok(orl)
}

/// Write the full audit log back to disk.
pub fn save(orl: &Orl, path: &Path) -> anyhow::Result<()> {
    let json = orl.to_json()?;
    fs::write(path, json).with_context(|| format!("cannot write ledger file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use orl_sdk::{Mutability, OwnerId};

    use super::*;

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let orl = Orl::init();
        orl.session(OwnerId::from_label("alice"))
            .add_record(&[0xaa], Mutability::Mutable)
            .unwrap();
        save(&orl, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.record_count().unwrap(), 1);
        assert_eq!(loaded.head().unwrap(), orl.head().unwrap());
        assert!(loaded.verify().unwrap().is_valid());
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "not an audit log").unwrap();
        assert!(load(&path).is_err());
    }
}
