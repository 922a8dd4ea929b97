//! Option types that parse delimited flag values into collections.
//!
//! Each type is filled by a single [`FlagValue::set`] call per flag
//! occurrence and renders back through [`std::fmt::Display`]. `FromStr` and
//! serde `Deserialize` are built on top of `set`, so the same grammar applies
//! to the command line and to the config file.

mod types;

pub use types::{LabelsAllowList, MetricSet, NamespaceList, ResourceSet, ALL_NAMESPACES};

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::{fmt, str::FromStr};

/// A value that can be set from the raw text of a command-line flag.
pub trait FlagValue: fmt::Display + Default {
    /// Replaces the current value with the one parsed from `value`.
    fn set(&mut self, value: &str) -> Result<()>;

    /// Short type name shown in help output.
    fn type_name(&self) -> &'static str {
        "string"
    }
}

macro_rules! impl_parse {
    ($($ty:ty),+ $(,)?) => {$(
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(value: &str) -> Result<Self> {
                let mut parsed = Self::default();
                parsed.set(value)?;
                Ok(parsed)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    )+};
}

impl_parse!(ResourceSet, NamespaceList, MetricSet, LabelsAllowList);
