use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

pub fn generate_scan_id() -> String {
    format!(
        "{}_{}",
        Utc::now().format("%Y%m%d"),
        &Uuid::new_v4().to_string()[..8]
    )
}

pub fn ensure_dirs(upload_folder: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_ids_are_unique_and_date_prefixed() {
        let a = generate_scan_id();
        let b = generate_scan_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), "YYYYMMDD".len() + 1 + 8);
        assert!(a.starts_with(&Utc::now().format("%Y%m%d").to_string()));
    }
}
