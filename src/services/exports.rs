use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::AuditEntry;
use crate::utils::addresses::{decode_import, ImportFormat};
use crate::utils::errors::{AppError, Result};

/// Write the rendered ban list of `jail` as pretty JSON.
pub fn export_ban_list(dir: &Path, jail: &str, ips: &[String]) -> Result<PathBuf> {
    let name = if jail.is_empty() { "list" } else { jail };
    write_pretty_json(dir, &format!("banned-{}.json", sanitize(name)), &ips)
}

pub fn export_audit(dir: &Path, entries: &[AuditEntry]) -> Result<PathBuf> {
    let stamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
    write_pretty_json(dir, &format!("audit-{}.json", stamp), &entries)
}

/// Read an import file and decode it by extension.
pub fn read_import(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    decode_import(&text, ImportFormat::for_path(path))
}

fn write_pretty_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    let body = serde_json::to_string_pretty(value).map_err(|e| AppError::Parse(e.to_string()))?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, body)?;
    log::info!("Exported {}", path.display());
    Ok(path)
}

// Jail names end up in file names.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ban_list_export_reads_back_as_import() {
        let dir = tempfile::tempdir().unwrap();
        let ips = vec!["1.2.3.4".to_string(), "10.0.0.0/8".to_string()];
        let path = export_ban_list(dir.path(), "sshd", &ips).unwrap();
        assert_eq!(path.file_name().unwrap(), "banned-sshd.json");
        assert_eq!(read_import(&path).unwrap(), ips);
    }

    #[test]
    fn hostile_jail_names_stay_in_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_ban_list(dir.path(), "../etc/x", &[]).unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
    }

    #[test]
    fn missing_import_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_import(&dir.path().join("nope.txt")),
            Err(AppError::FileSystem(_))
        ));
    }
}
