#![forbid(unsafe_code)]

mod error;
mod scan;
mod trigger;

pub use error::Error;
pub use scan::{DEFAULT_EVENT_CAPACITY, DEFAULT_MAX_CMD_LENGTH, Scan};
pub use trigger::Trigger;

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub scan: Scan,
    pub trigger: Trigger,
}

impl Config {
    /// Load configuration from a TOML file. Missing fields are filled with defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Config = toml_edit::de::from_str(&text)?;
        config.apply_defaults();
        config.scan.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let toml = toml_edit::ser::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from multiple TOML files. Later files override earlier ones.
    pub fn load_multiple<T, U>(paths: U) -> Result<Self, Error>
    where
        T: AsRef<Path>,
        U: IntoIterator<Item = T>,
    {
        let mut merged = toml_edit::DocumentMut::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(path)?;
            let doc: toml_edit::DocumentMut = text.parse()?;
            merge_document(&mut merged, doc);
        }
        let mut config: Config = toml_edit::de::from_str(&merged.to_string())?;
        config.apply_defaults();
        config.scan.validate()?;
        Ok(config)
    }

    /// Normalize the exclusion lists: empty entries would match every
    /// process, duplicates are noise.
    pub fn apply_defaults(&mut self) {
        for list in [&mut self.scan.user_exclude, &mut self.scan.cmd_exclude] {
            list.retain(|item| !item.is_empty());
            list.sort();
            list.dedup();
        }
    }
}

fn merge_document(target: &mut toml_edit::DocumentMut, source: toml_edit::DocumentMut) {
    for (key, item) in source.iter() {
        merge_item(
            target.entry(key).or_insert(toml_edit::Item::None),
            item.clone(),
        );
    }
}

fn merge_item(target: &mut toml_edit::Item, source: toml_edit::Item) {
    use toml_edit::Item;
    match (target, source) {
        (Item::Table(target_table), Item::Table(source_table)) => {
            for (key, item) in source_table.iter() {
                merge_item(target_table.entry(key).or_insert(Item::None), item.clone());
            }
        }
        (Item::ArrayOfTables(target_array), Item::ArrayOfTables(source_array)) => {
            for table in source_array.iter() {
                target_array.push(table.clone());
            }
        }
        (target_item, source_item) => {
            *target_item = source_item;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.scan.ppid = true;
        config.scan.user_exclude = vec!["root".into(), "nobody".into()];
        config.apply_defaults();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn load_multiple_merges() {
        let dir = tempdir().unwrap();
        let path1 = dir.path().join("a.toml");
        let path2 = dir.path().join("b.toml");
        let missing = dir.path().join("missing.toml");

        std::fs::write(
            &path1,
            "[scan]\nppid = true\ncmd_exclude = [\"cron\"]\n[trigger]\ninterval = 500\n",
        )
        .unwrap();
        std::fs::write(&path2, "[trigger]\ninterval = 250\n").unwrap();

        let cfg = Config::load_multiple([path1, missing, path2]).unwrap();
        assert!(cfg.scan.ppid);
        assert_eq!(cfg.scan.cmd_exclude, vec!["cron".to_string()]);
        assert_eq!(cfg.trigger.interval, Duration::from_millis(250));
        assert_eq!(cfg.scan.max_cmd_length, DEFAULT_MAX_CMD_LENGTH);
    }

    #[test]
    fn empty_exclusions_are_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[scan]\nuser_exclude = [\"\", \"www\", \"www\"]\ncmd_exclude = [\"\"]\n",
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.scan.user_exclude, vec!["www".to_string()]);
        assert!(cfg.scan.cmd_exclude.is_empty());
    }

    #[test]
    fn zero_cmd_length_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scan]\nmax_cmd_length = 0\n").unwrap();

        assert!(matches!(Config::load(&path), Err(Error::Invalid(_))));
    }

    #[test]
    fn zero_interval_disables_periodic_trigger() {
        let trigger = Trigger {
            interval: Duration::ZERO,
        };
        assert_eq!(trigger.period(), None);
        assert_eq!(
            Trigger::default().period(),
            Some(Duration::from_millis(100))
        );
    }
}
