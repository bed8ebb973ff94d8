//! Traits for reading and writing serde types as JSON strings and files.
//!
//! Blanket implemented, so tracks, cars, configs, racing lines and lap profiles all load and
//! save the same way.

use crate::error::Result;
use std::{fs, path::Path};

pub trait ToFile {
    fn to_json(&self) -> Result<String>;

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

pub trait FromFile: Sized {
    fn from_json(s: &str) -> Result<Self>;

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl<T> ToFile for T
where
    T: serde::Serialize,
{
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<T> FromFile for T
where
    T: for<'de> serde::Deserialize<'de>,
{
    fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
