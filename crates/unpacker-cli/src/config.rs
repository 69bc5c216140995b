//! Configuration file parsing for unpacker.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file names searched for, in order
const CONFIG_NAMES: &[&str] = &["unpacker.toml", ".unpackerrc.toml"];

/// Defaults for the command line; flags override every key.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Movie to unpack: path, URL or `-`
    pub input: Option<String>,

    /// Index of the packed class in the frame1 block
    pub class_index: Option<usize>,

    /// Call literal that precedes each resource name
    pub target: Option<String>,

    /// Fail instead of degrading on a missing keymap or unmapped accessor
    #[serde(default)]
    pub strict: bool,
}

/// Load configuration from a file or search for default config files.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = path.map(PathBuf::from).or_else(|| {
        let cwd = std::env::current_dir().ok()?;
        find_config_file(&cwd)
    });

    match config_path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        _ => Ok(Config::default()),
    }
}

/// Search for a configuration file in `start` and its parent directories.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.input.is_none());
        assert!(config.class_index.is_none());
        assert!(!config.strict);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
input = "https://example.com/Game.swf"
class_index = 2
target = "loadBytes"
strict = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.input.as_deref(), Some("https://example.com/Game.swf"));
        assert_eq!(config.class_index, Some(2));
        assert_eq!(config.target.as_deref(), Some("loadBytes"));
        assert!(config.strict);
    }

    #[test]
    fn test_find_in_parent() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(".unpackerrc.toml"), "strict = true\n").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, root.path().join(".unpackerrc.toml"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "class_index = 1\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.class_index, Some(1));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unpacker.toml");
        std::fs::write(&path, "class_index = \"zero\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }
}
