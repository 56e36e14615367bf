//! Compliance tag extraction
//!
//! Policy monitoring alerts carry their control references inline, e.g.
//! `{PCI_DSS: 10.6.1}` or `{CIS: 4.1}`. Values are kept verbatim.

mod extractor;

pub use extractor::{TagExtractor, CIS_MARKER, PCI_DSS_MARKER};

use crate::config::TagsConfig;
use serde::{Deserialize, Serialize};

/// Compliance references found in a single log line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceTags {
    pub pci_dss: Option<String>,
    pub cis: Option<String>,
}

impl ComplianceTags {
    pub fn is_empty(&self) -> bool {
        self.pci_dss.is_none() && self.cis.is_none()
    }
}

/// Runs the PCI-DSS and CIS extractors over a log line
#[derive(Debug, Clone)]
pub struct ComplianceTagger {
    pci_dss: TagExtractor,
    cis: TagExtractor,
}

impl ComplianceTagger {
    pub fn new(pci_dss: TagExtractor, cis: TagExtractor) -> Self {
        Self { pci_dss, cis }
    }

    /// Build a tagger from the `[tags]` configuration section
    pub fn from_config(config: &TagsConfig) -> Self {
        Self::new(
            TagExtractor::new(config.pci_dss_marker.clone()),
            TagExtractor::new(config.cis_marker.clone()),
        )
    }

    pub fn tag(&self, log: &str) -> ComplianceTags {
        ComplianceTags {
            pci_dss: self.pci_dss.extract(log),
            cis: self.cis.extract(log),
        }
    }
}

impl Default for ComplianceTagger {
    fn default() -> Self {
        Self::new(TagExtractor::pci_dss(), TagExtractor::cis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_tags() {
        let tags = ComplianceTagger::default()
            .tag("rule triggered {PCI_DSS: 10.6.1} other text {CIS: 4.1}");
        assert_eq!(tags.pci_dss.as_deref(), Some("10.6.1"));
        assert_eq!(tags.cis.as_deref(), Some("4.1"));
        assert!(!tags.is_empty());
    }

    #[test]
    fn test_tags_are_independent() {
        let tags = ComplianceTagger::default().tag("rule triggered {PCI_DSS: 10.6.1 {CIS: 4.1}");
        // The CIS closing brace also terminates the PCI-DSS value
        assert_eq!(tags.pci_dss.as_deref(), Some("10.6.1 {CIS: 4.1"));
        assert_eq!(tags.cis.as_deref(), Some("4.1"));

        let tags = ComplianceTagger::default().tag("plain line");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = TagsConfig {
            pci_dss_marker: "[pci ".to_string(),
            cis_marker: "{CIS: ".to_string(),
        };
        let tags = ComplianceTagger::from_config(&config).tag("[pci 3.4} {CIS: 1}");
        assert_eq!(tags.pci_dss.as_deref(), Some("3.4"));
        assert_eq!(tags.cis.as_deref(), Some("1"));
    }
}
