//! Platform paths for user presets.
//!
//! - Linux: `~/.config/efflux/presets/`
//! - macOS: `~/Library/Application Support/efflux/presets/`
//! - Windows: `%APPDATA%\efflux\presets\`

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::factory_presets::get_factory_preset;
use crate::preset::InstrumentPreset;

const APP_NAME: &str = "efflux";
const PRESETS_SUBDIR: &str = "presets";

/// Returns the user presets directory, or a path under `.` if the platform
/// config directory cannot be determined.
pub fn user_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PRESETS_SUBDIR)
}

/// Creates the user presets directory if needed and returns it.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Find a preset file by path or name.
///
/// `name` is tried as a file path first, then as a file name (with or
/// without `.toml`) in `dir`.
pub fn find_preset_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Find a preset file by path or name, searching the user presets directory.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    find_preset_in(&user_presets_dir(), name)
}

/// Resolves a preset argument: a file path, a user preset name, or a
/// factory preset name, in that order.
pub fn resolve_preset(name: &str) -> Result<InstrumentPreset, ConfigError> {
    resolve_preset_in(&user_presets_dir(), name)
}

/// [`resolve_preset`] against an explicit user directory.
pub fn resolve_preset_in(dir: &Path, name: &str) -> Result<InstrumentPreset, ConfigError> {
    if let Some(path) = find_preset_in(dir, name) {
        return InstrumentPreset::load(path);
    }
    get_factory_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

/// Lists `.toml` files in `dir`, sorted. Missing or unreadable directories
/// yield an empty list.
pub fn list_presets_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Lists preset files in the user presets directory.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in(&user_presets_dir())
}

/// Preset name from a file path (the file stem).
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_user_presets_dir() {
        let dir = user_presets_dir();
        assert!(dir.ends_with("efflux/presets"));
    }

    #[test]
    fn test_find_by_path_and_name() {
        let temp_dir = TempDir::new().unwrap();
        let preset_path = temp_dir.path().join("pad.toml");
        fs::write(&preset_path, "name = \"Pad\"").unwrap();

        assert_eq!(
            find_preset_in(temp_dir.path(), preset_path.to_str().unwrap()),
            Some(preset_path.clone())
        );
        assert_eq!(find_preset_in(temp_dir.path(), "pad"), Some(preset_path.clone()));
        assert_eq!(find_preset_in(temp_dir.path(), "pad.toml"), Some(preset_path));
        assert!(find_preset_in(temp_dir.path(), "lead").is_none());
    }

    #[test]
    fn test_resolve_prefers_user_file_over_factory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("slapback.toml"),
            "name = \"My Slapback\"",
        )
        .unwrap();

        let preset = resolve_preset_in(temp_dir.path(), "slapback").unwrap();
        assert_eq!(preset.name, "My Slapback");

        let preset = resolve_preset_in(temp_dir.path(), "dub_echo").unwrap();
        assert_eq!(preset.name, "Dub Echo");
    }

    #[test]
    fn test_resolve_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let result = resolve_preset_in(temp_dir.path(), "nonexistent_preset_12345");
        assert!(matches!(result, Err(ConfigError::PresetNotFound(name)) if name == "nonexistent_preset_12345"));
    }

    #[test]
    fn test_list_presets_in() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.toml"), "").unwrap();
        fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let presets = list_presets_in(temp_dir.path());
        let names: Vec<_> = presets
            .iter()
            .filter_map(|p| preset_name_from_path(p))
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_list_missing_dir() {
        assert!(list_presets_in(Path::new("/nonexistent/path/12345")).is_empty());
    }
}
