use super::FlagValue;
use crate::error::{Error, Result};

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Namespace value that selects every namespace.
pub const ALL_NAMESPACES: &str = "";

// One `metric=[labels]` entry anchored at the scan position.
static LABELS_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^=\[\],]+)=\[([^\[\]=]*)\]").unwrap());

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    // "" must not produce a single empty token
    value.split(',').filter(move |_| !value.is_empty())
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = &'a String>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        f.write_str(item)?;
    }
    Ok(())
}

/// Set of resource names, e.g. `configmaps,cronjobs`.
///
/// Tokens are kept verbatim: unlike [`MetricSet`] no whitespace is trimmed,
/// and empty tokens (as in `pods,,nodes`) become an empty member. A set
/// holding only the empty member displays as `""`, which parses back to an
/// empty set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceSet(BTreeSet<String>);

impl ResourceSet {
    pub fn contains(&self, resource: &str) -> bool {
        self.0.contains(resource)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in sorted order.
    pub fn as_slice(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

impl FlagValue for ResourceSet {
    fn set(&mut self, value: &str) -> Result<()> {
        self.0 = split_list(value).map(str::to_owned).collect();
        debug!(resources = self.0.len(), "parsed resource set");
        Ok(())
    }
}

impl fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.0)
    }
}

impl<S: Into<String>> FromIterator<S> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Ordered list of namespaces. Duplicates are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceList(Vec<String>);

impl NamespaceList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_all_namespaces(&self) -> bool {
        match self.0.as_slice() {
            [] => true,
            [only] => only == ALL_NAMESPACES,
            _ => false,
        }
    }

    /// Namespaces to watch. An empty list means all of them.
    pub fn namespaces(&self) -> Vec<String> {
        if self.0.is_empty() {
            vec![ALL_NAMESPACES.to_owned()]
        } else {
            self.0.clone()
        }
    }

    /// Field selector excluding every namespace in `denylist`.
    ///
    /// Only applies when this list selects all namespaces; an explicit
    /// namespace list already limits the scope, so the selector is empty.
    pub fn exclude_field_selector(&self, denylist: &NamespaceList) -> String {
        if !self.is_all_namespaces() {
            return String::new();
        }
        denylist
            .0
            .iter()
            .map(|ns| format!("metadata.namespace!={ns}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FlagValue for NamespaceList {
    fn set(&mut self, value: &str) -> Result<()> {
        self.0 = split_list(value).map(|ns| ns.trim().to_owned()).collect();
        debug!(namespaces = self.0.len(), "parsed namespace list");
        Ok(())
    }
}

impl fmt::Display for NamespaceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.0)
    }
}

impl<S: Into<String>> FromIterator<S> for NamespaceList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Set of metric names. Tokens are trimmed before insertion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricSet(BTreeSet<String>);

impl MetricSet {
    pub fn contains(&self, metric: &str) -> bool {
        self.0.contains(metric)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in sorted order.
    pub fn as_slice(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

impl FlagValue for MetricSet {
    fn set(&mut self, value: &str) -> Result<()> {
        self.0 = split_list(value)
            .map(|metric| metric.trim().to_owned())
            .collect();
        debug!(metrics = self.0.len(), "parsed metric set");
        Ok(())
    }
}

impl fmt::Display for MetricSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.0)
    }
}

impl<S: Into<String>> FromIterator<S> for MetricSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Labels allowed per metric, written as `metric=[label,...],metric2=[...]`.
///
/// Whitespace around the whole value and around names is ignored; blanks
/// between `]` and the next `,` are not. An empty list (`metric=[]`) is kept and means no label is allowed for
/// that metric. When a metric name repeats, the last entry wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelsAllowList(BTreeMap<String, Vec<String>>);

impl LabelsAllowList {
    pub fn labels_for(&self, metric: &str) -> Option<&[String]> {
        self.0.get(metric).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn parse(value: &str) -> Result<BTreeMap<String, Vec<String>>> {
        let mut entries = BTreeMap::new();
        let body = value.trim();
        if body.is_empty() {
            return Ok(entries);
        }

        // positions stay relative to the untrimmed input
        let offset = value.len() - value.trim_start().len();
        let mut rest = body;
        loop {
            let position = offset + body.len() - rest.len();
            let caps = LABELS_ENTRY.captures(rest).ok_or(Error::LabelsAllowList {
                position,
                reason: "expected `metric=[label,...]`",
            })?;

            let metric = caps[1].trim();
            if metric.is_empty() {
                return Err(Error::LabelsAllowList {
                    position,
                    reason: "empty metric name",
                });
            }
            let labels = parse_labels(&caps[2]).ok_or(Error::LabelsAllowList {
                position,
                reason: "empty label name",
            })?;
            if entries.insert(metric.to_owned(), labels).is_some() {
                warn!(
                    metric,
                    "metric listed twice in labels allow list, keeping the last entry"
                );
            }

            rest = &rest[caps[0].len()..];
            let position = offset + body.len() - rest.len();
            rest = match rest.strip_prefix(',') {
                None if rest.is_empty() => return Ok(entries),
                None => {
                    return Err(Error::LabelsAllowList {
                        position,
                        reason: "expected `,` after `]`",
                    })
                }
                Some("") => {
                    return Err(Error::LabelsAllowList {
                        position,
                        reason: "trailing `,`",
                    })
                }
                Some(next) => next,
            };
        }
    }
}

// `None` when a label between commas is blank.
fn parse_labels(list: &str) -> Option<Vec<String>> {
    if list.trim().is_empty() {
        return Some(Vec::new());
    }
    list.split(',')
        .map(|label| {
            let label = label.trim();
            (!label.is_empty()).then(|| label.to_owned())
        })
        .collect()
}

impl FlagValue for LabelsAllowList {
    fn set(&mut self, value: &str) -> Result<()> {
        match Self::parse(value) {
            Ok(entries) => {
                self.0 = entries;
                debug!(metrics = self.0.len(), "parsed labels allow list");
                Ok(())
            }
            Err(err) => {
                self.0.clear();
                Err(err)
            }
        }
    }
}

impl fmt::Display for LabelsAllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (metric, labels)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{metric}=[")?;
            write_joined(f, labels)?;
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl<M, L, S> FromIterator<(M, L)> for LabelsAllowList
where
    M: Into<String>,
    L: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (M, L)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(metric, labels)| {
                    (metric.into(), labels.into_iter().map(Into::into).collect())
                })
                .collect(),
        )
    }
}
