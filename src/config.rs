use crate::error::{Error, Result};
use crate::options::{LabelsAllowList, MetricSet, NamespaceList, ResourceSet};

use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

/// Collection options, shared by the command line and the config file.
///
/// Fields left unset fall back to the other source, or to an empty value.
#[derive(clap::Args, Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Comma-separated list of resources to expose metrics for
    #[arg(long, value_name = "RESOURCES")]
    pub resources: Option<ResourceSet>,

    /// Comma-separated list of namespaces to watch, all when empty
    #[arg(long, value_name = "NAMESPACES")]
    pub namespaces: Option<NamespaceList>,

    /// Comma-separated list of namespaces not to watch
    #[arg(long, value_name = "NAMESPACES")]
    pub namespaces_denylist: Option<NamespaceList>,

    /// Comma-separated list of metrics to expose
    #[arg(long, value_name = "METRICS")]
    pub metric_allowlist: Option<MetricSet>,

    /// Comma-separated list of metrics not to expose
    #[arg(long, value_name = "METRICS")]
    pub metric_denylist: Option<MetricSet>,

    /// Labels allowed per metric, e.g. `kube_pod_labels=[app,team],kube_node_labels=[]`
    #[arg(long, value_name = "LABELS")]
    pub metric_labels_allowlist: Option<LabelsAllowList>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_owned(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| Error::DecodeConfig {
            path: path.to_owned(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Values set in `overrides` replace the ones in `self`.
    pub fn merge(self, overrides: Config) -> Config {
        Config {
            resources: overrides.resources.or(self.resources),
            namespaces: overrides.namespaces.or(self.namespaces),
            namespaces_denylist: overrides.namespaces_denylist.or(self.namespaces_denylist),
            metric_allowlist: overrides.metric_allowlist.or(self.metric_allowlist),
            metric_denylist: overrides.metric_denylist.or(self.metric_denylist),
            metric_labels_allowlist: overrides
                .metric_labels_allowlist
                .or(self.metric_labels_allowlist),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let is_set = |set: &Option<MetricSet>| set.as_ref().is_some_and(|s| !s.is_empty());
        if is_set(&self.metric_allowlist) && is_set(&self.metric_denylist) {
            return Err(Error::Conflict("--metric-allowlist", "--metric-denylist"));
        }

        let watches_some = self
            .namespaces
            .as_ref()
            .is_some_and(|ns| !ns.is_all_namespaces());
        let denies_some = self
            .namespaces_denylist
            .as_ref()
            .is_some_and(|ns| !ns.is_empty());
        if watches_some && denies_some {
            return Err(Error::Conflict("--namespaces", "--namespaces-denylist"));
        }
        Ok(())
    }

    /// Field selector for the namespaces excluded from watching.
    pub fn namespace_field_selector(&self) -> String {
        let namespaces = self.namespaces.clone().unwrap_or_default();
        let denylist = self.namespaces_denylist.clone().unwrap_or_default();
        namespaces.exclude_field_selector(&denylist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_toml() {
        let config: Config = toml::from_str(
            r#"
            resources = "pods,nodes"
            namespaces = "default, monitoring"
            metric-labels-allowlist = "kube_pod_labels=[app],kube_node_labels=[]"
            "#,
        )
        .unwrap();

        assert_eq!(config.resources, Some(ResourceSet::from_iter(["pods", "nodes"])));
        assert_eq!(
            config.namespaces,
            Some(NamespaceList::from_iter(["default", "monitoring"]))
        );
        assert_eq!(
            config.metric_labels_allowlist,
            Some(LabelsAllowList::from_iter([
                ("kube_pod_labels", vec!["app"]),
                ("kube_node_labels", vec![]),
            ]))
        );
        assert_eq!(config.metric_allowlist, None);
    }

    #[test]
    fn rejects_bad_labels_allow_list() {
        let result = toml::from_str::<Config>(r#"metric-labels-allowlist = "a=[x] b=[y]""#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<Config>(r#"resource = "pods""#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/options.toml")).unwrap_err();
        assert!(matches!(err, Error::ReadConfig { .. }), "{err}");
    }

    #[test]
    fn merge_prefers_overrides() {
        let file = Config {
            resources: Some("pods".parse().unwrap()),
            metric_denylist: Some("kube_pod_info".parse().unwrap()),
            ..Default::default()
        };
        let cli = Config {
            resources: Some("nodes".parse().unwrap()),
            ..Default::default()
        };

        let merged = file.merge(cli);
        assert_eq!(merged.resources, Some(ResourceSet::from_iter(["nodes"])));
        assert_eq!(merged.metric_denylist, Some(MetricSet::from_iter(["kube_pod_info"])));
    }

    #[test]
    fn validate_conflicts() {
        let both_metric_lists = Config {
            metric_allowlist: Some("a".parse().unwrap()),
            metric_denylist: Some("b".parse().unwrap()),
            ..Default::default()
        };
        assert!(matches!(
            both_metric_lists.validate(),
            Err(Error::Conflict("--metric-allowlist", "--metric-denylist"))
        ));

        let empty_denylist = Config {
            metric_allowlist: Some("a".parse().unwrap()),
            metric_denylist: Some(MetricSet::default()),
            ..Default::default()
        };
        assert!(empty_denylist.validate().is_ok());

        let both_namespace_lists = Config {
            namespaces: Some("default".parse().unwrap()),
            namespaces_denylist: Some("kube-system".parse().unwrap()),
            ..Default::default()
        };
        assert!(both_namespace_lists.validate().is_err());

        let all_but_system = Config {
            namespaces_denylist: Some("kube-system".parse().unwrap()),
            ..Default::default()
        };
        assert!(all_but_system.validate().is_ok());
        assert_eq!(
            all_but_system.namespace_field_selector(),
            "metadata.namespace!=kube-system"
        );
    }
}
