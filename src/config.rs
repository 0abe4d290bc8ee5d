use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::str::FromStr;
use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Serialize, Deserialize};
use crate::packet::Family;

pub const PATH: &str = "ipscoutconfig.json";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub ipv4:    Section,
    pub ipv6:    Section,
    pub logging: Logging,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    /// Written by `init` only; `start` selects the family from its flags.
    pub enabled: bool,
    pub prefix:  String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level:  String,
    /// Written by `init` only; records are always plain text.
    pub format: String,
}

impl File {
    /// Reads the file at `path`; a missing file means defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        let data = match fs::read(path) {
            Ok(data)                                    => data,
            Err(e) if e.kind() == ErrorKind::NotFound   => return Ok(None),
            Err(e)                                      => Err(e).with_context(|| {
                format!("error reading {}", path.display())
            })?,
        };

        let file = serde_json::from_slice(&data).with_context(|| {
            format!("error parsing {}", path.display())
        })?;

        Ok(Some(file))
    }

    /// Settings for `command`. Only `start` reads the file, so `init` and
    /// `version` work next to an unreadable one.
    pub fn command<P: AsRef<Path>>(command: Option<&str>, path: P) -> Result<Self> {
        match command {
            Some("start") => Ok(Self::load(path)?.unwrap_or_default()),
            _             => Ok(Self::default()),
        }
    }

    pub fn level(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.logging.level).with_context(|| {
            format!("invalid logging level '{}'", self.logging.level)
        })
    }

    pub fn prefix(&self, family: Family) -> Option<String> {
        let section = match family {
            Family::V4 => &self.ipv4,
            Family::V6 => &self.ipv6,
        };
        Some(section.prefix.clone()).filter(|p| !p.is_empty())
    }
}

/// Writes a default configuration to `path`. Returns false when a file is
/// already there.
pub fn init<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file)                                        => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists  => return Ok(false),
        Err(e)                                          => Err(e).with_context(|| {
            format!("error creating {}", path.display())
        })?,
    };

    let data = serde_json::to_vec_pretty(&File::default())?;
    file.write_all(&data)?;
    file.write_all(b"\n")?;

    Ok(true)
}

impl Default for File {
    fn default() -> Self {
        Self {
            ipv4: Section {
                enabled: true,
                prefix:  "// IPv4 Address".to_owned(),
            },
            ipv6: Section {
                enabled: false,
                prefix:  "// IPv6 Address".to_owned(),
            },
            logging: Logging::default(),
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix:  String::new(),
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level:  "info".to_owned(),
            format: "json".to_owned(),
        }
    }
}
