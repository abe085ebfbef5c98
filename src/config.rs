// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Run configuration assembled from the command line.

use crate::names::WindowConfig;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

pub const DEFAULT_SKELETON_TABLE: &str = "person.json";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const OUTPUT_PREFIX: &str = "output-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymiserConfig {
    pub input: PathBuf,
    pub skeleton_table: PathBuf,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    pub force: bool,
    pub windows: WindowConfig,
}

impl AnonymiserConfig {
    /// Defaults for everything but the input document.
    pub fn for_input(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            skeleton_table: PathBuf::from(DEFAULT_SKELETON_TABLE),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_prefix: OUTPUT_PREFIX.to_string(),
            force: false,
            windows: WindowConfig::default(),
        }
    }

    /// `<output_dir>/<prefix><input file name>`.
    pub fn output_path(&self) -> Result<PathBuf> {
        let name = self
            .input
            .file_name()
            .ok_or_else(|| anyhow!("input path {} has no file name", self.input.display()))?;
        Ok(self.output_dir.join(format!(
            "{}{}",
            self.output_prefix,
            Path::new(name).display()
        )))
    }
}
