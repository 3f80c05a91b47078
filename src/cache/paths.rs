//! Default artifact store location: `<user cache dir>/attackpath/<project-key>/store`

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Store directory for a project, keyed by its canonical path
pub fn get_store_dir(project_path: &Path) -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
    base.join("attackpath")
        .join(project_key(project_path))
        .join("store")
}

/// Create the default store directory if needed
pub fn ensure_store_dir(project_path: &Path) -> std::io::Result<PathBuf> {
    let dir = get_store_dir(project_path);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `<dir name>-<sha256 prefix>`, stable for a given project directory
fn project_key(project_path: &Path) -> String {
    let canonical = project_path
        .canonicalize()
        .unwrap_or_else(|_| project_path.to_path_buf());
    let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
    let prefix: String = digest.iter().take(6).map(|b| format!("{:02x}", b)).collect();

    let name: String = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .take(20)
        .collect();

    format!("{}-{}", name, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_key_is_stable_and_distinct() {
        let a = Path::new("/tmp/vehicle-model");
        let b = Path::new("/tmp/other/vehicle-model");
        assert_eq!(project_key(a), project_key(a));
        assert_ne!(project_key(a), project_key(b));
        assert!(project_key(a).starts_with("vehicle-model-"));
    }

    #[test]
    fn test_store_dir_layout() {
        let store = get_store_dir(Path::new("/home/user/ev-platform"));
        let rendered = store.to_string_lossy();
        assert!(rendered.contains("attackpath"));
        assert!(rendered.contains("ev-platform-"));
        assert!(store.ends_with("store"));
    }
}
