//! Save options for the CF writer.

use std::collections::BTreeMap;

use labeled_array::AttrMap;

use crate::encoding::EncodingTable;
use crate::error::{CfWriterError, Result};

/// Default reference time for encoding time coordinates.
pub const EPOCH: &str = "seconds since 1970-01-01 00:00:00";

/// The CF conventions version this writer targets.
pub const CF_VERSION: &str = "CF-1.7";

/// Default prefix for variable names that start with a digit.
pub const NUMERIC_NAME_PREFIX: &str = "CHANNEL_";

/// Assignment of dataset names to named output groups.
pub type GroupAssignment = BTreeMap<String, Vec<String>>;

/// Deprecated whole-file compression shorthand.
///
/// Superseded by per-variable entries in [`SaveOptions::encoding`]; supplying
/// it records a deprecation warning and applies these settings to every
/// variable's encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub zlib: bool,
    pub complevel: u8,
}

impl Default for Compression {
    fn default() -> Self {
        Self {
            zlib: true,
            complevel: 4,
        }
    }
}

/// Options for one save call.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Reference time for encoding time coordinates,
    /// e.g. `"seconds since 1970-01-01 00:00:00"`.
    pub epoch: String,
    /// Flatten nested-mapping attributes into underscore-joined flat keys.
    pub flatten_attrs: bool,
    /// Attribute names to drop from every variable.
    pub exclude_attrs: Vec<String>,
    /// Always attach longitude/latitude coordinates, even for gridded areas.
    pub include_lonlats: bool,
    /// Keep shared non-dimensional coordinate names unprefixed when their
    /// data agrees across all datasets. Prettier, possibly less consistent.
    pub pretty: bool,
    /// Record the pre-sanitization name as an `original_name` attribute.
    pub include_orig_name: bool,
    /// Prefix for variable names starting with a digit; `None` or empty
    /// disables prefixing (and makes such names non-conformant).
    pub numeric_name_prefix: Option<String>,
    /// Partition datasets into named groups; `None` writes one flat file.
    /// Grouped output is not fully CF compliant.
    pub groups: Option<GroupAssignment>,
    /// Per-variable encoding overrides; these win over derived defaults.
    pub encoding: EncodingTable,
    /// Global attributes for the output container.
    pub header_attrs: AttrMap,
    /// Backend selector, passed through to the serialization sink verbatim.
    pub engine: Option<String>,
    /// Deprecated compression shorthand; see [`Compression`].
    pub compression: Option<Compression>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            epoch: EPOCH.to_string(),
            flatten_attrs: false,
            exclude_attrs: Vec::new(),
            include_lonlats: true,
            pretty: false,
            include_orig_name: true,
            numeric_name_prefix: Some(NUMERIC_NAME_PREFIX.to_string()),
            groups: None,
            encoding: EncodingTable::new(),
            header_attrs: AttrMap::new(),
            engine: None,
            compression: None,
        }
    }
}

impl SaveOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if !self.epoch.contains(" since ") {
            return Err(CfWriterError::Config(format!(
                "epoch must be a reference-time string like '{EPOCH}', got '{}'",
                self.epoch
            )));
        }
        if let Some(prefix) = &self.numeric_name_prefix {
            if prefix.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return Err(CfWriterError::Config(format!(
                    "numeric_name_prefix must not itself start with a digit, got '{prefix}'"
                )));
            }
        }
        if let Some(groups) = &self.groups {
            if groups.keys().any(|name| name.is_empty()) {
                return Err(CfWriterError::Config(
                    "group names must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The effective numeric prefix: configured, non-empty.
    pub fn effective_prefix(&self) -> Option<&str> {
        self.numeric_name_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SaveOptions::default();
        assert_eq!(options.epoch, EPOCH);
        assert!(options.include_lonlats);
        assert!(options.include_orig_name);
        assert!(!options.pretty);
        assert_eq!(options.effective_prefix(), Some("CHANNEL_"));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_empty_prefix_is_disabled() {
        let options = SaveOptions {
            numeric_name_prefix: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(options.effective_prefix(), None);
    }

    #[test]
    fn test_validation() {
        let options = SaveOptions {
            epoch: "yesterday".to_string(),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = SaveOptions {
            numeric_name_prefix: Some("1BAD_".to_string()),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }
}
