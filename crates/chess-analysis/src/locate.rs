//! Finding an engine executable on this machine.

use std::env;
use std::path::{Path, PathBuf};

/// Executable names tried in every search directory.
pub const ENGINE_NAMES: [&str; 2] = ["stockfish", "stockfish.exe"];

/// Directories searched for an engine: `PATH` first, then common install
/// locations.
#[must_use]
pub fn engine_search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect())
        .unwrap_or_default();

    dirs.push(PathBuf::from("./stockfish"));
    if let Some(home) = home_dir() {
        dirs.push(home.join("Stockfish"));
        dirs.push(home.join("Downloads").join("Stockfish"));
    }
    dirs.push(PathBuf::from("C:/Program Files/Stockfish"));
    dirs.push(PathBuf::from("C:/Program Files (x86)/Stockfish"));
    dirs
}

/// Resolves the engine to use.
///
/// An explicit path that names an existing file wins. A bare name (no
/// directory part) is looked up in the search directories. Without an
/// explicit choice, [`ENGINE_NAMES`] are tried.
#[must_use]
pub fn locate_engine(explicit: Option<&Path>) -> Option<PathBuf> {
    let dirs = engine_search_dirs();
    match explicit {
        Some(path) if path.is_file() => Some(path.to_path_buf()),
        Some(path) if path.parent().map_or(true, |p| p.as_os_str().is_empty()) => {
            let name = path.to_string_lossy();
            locate_in(&dirs, &[name.as_ref()])
        }
        Some(_) => None,
        None => locate_in(&dirs, &ENGINE_NAMES),
    }
}

/// First `dir/name` that is a file, trying every name in each directory
/// before moving to the next.
#[must_use]
pub fn locate_in(dirs: &[PathBuf], names: &[&str]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_locate_in_prefers_earlier_dirs() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("stockfish"), b"").unwrap();
        fs::write(first.path().join("stockfish.exe"), b"").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let found = locate_in(&dirs, &ENGINE_NAMES).unwrap();
        assert_eq!(found, first.path().join("stockfish.exe"));
    }

    #[test]
    fn test_locate_in_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("stockfish")).unwrap();
        assert!(locate_in(&[dir.path().to_path_buf()], &["stockfish"]).is_none());
    }

    #[test]
    fn test_explicit_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let engine = dir.path().join("my-engine");
        fs::write(&engine, b"").unwrap();
        assert_eq!(locate_engine(Some(&engine)), Some(engine));
    }

    #[test]
    fn test_missing_explicit_path_is_not_replaced() {
        let missing = Path::new("/nonexistent/dir/stockfish");
        assert_eq!(locate_engine(Some(missing)), None);
    }

    #[test]
    fn test_search_dirs_include_install_locations() {
        let dirs = engine_search_dirs();
        assert!(dirs.contains(&PathBuf::from("./stockfish")));
        assert!(dirs.contains(&PathBuf::from("C:/Program Files/Stockfish")));
    }
}
