//! Inline marker extraction
//!
//! Pulls values such as `{PCI_DSS: 10.6.1}` out of free-text log lines

/// Marker introducing a PCI-DSS requirement
pub const PCI_DSS_MARKER: &str = "{PCI_DSS: ";

/// Marker introducing a CIS benchmark control
pub const CIS_MARKER: &str = "{CIS: ";

const CLOSING: char = '}';

/// Extracts the value that follows a literal marker
///
/// The value runs up to the next `}`. An unterminated marker yields nothing,
/// never the dangling tail of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagExtractor {
    marker: String,
}

impl TagExtractor {
    /// Create an extractor for an arbitrary marker
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Extractor for `{PCI_DSS: ...}`
    pub fn pci_dss() -> Self {
        Self::new(PCI_DSS_MARKER)
    }

    /// Extractor for `{CIS: ...}`
    pub fn cis() -> Self {
        Self::new(CIS_MARKER)
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Extract the value following the first occurrence of the marker
    pub fn extract(&self, text: &str) -> Option<String> {
        let start = text.find(self.marker.as_str())? + self.marker.len();
        let rest = &text[start..];
        let end = rest.find(CLOSING)?;
        Some(rest[..end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminated_value() {
        let pci = TagExtractor::pci_dss();
        assert_eq!(
            pci.extract("rule triggered {PCI_DSS: 10.6.1} other text"),
            Some("10.6.1".to_string())
        );
    }

    #[test]
    fn test_unterminated_value() {
        let pci = TagExtractor::pci_dss();
        assert_eq!(pci.extract("rule triggered {PCI_DSS: 10.6.1"), None);
        assert_eq!(pci.extract("{PCI_DSS: 1.1"), None);
    }

    #[test]
    fn test_missing_marker() {
        let pci = TagExtractor::pci_dss();
        assert_eq!(pci.extract("nothing to see {CIS: 4.1}"), None);
        assert_eq!(pci.extract(""), None);
        // Marker needs the trailing space
        assert_eq!(pci.extract("{PCI_DSS:10.6.1}"), None);
    }

    #[test]
    fn test_empty_value() {
        let cis = TagExtractor::cis();
        assert_eq!(cis.extract("{CIS: }"), Some(String::new()));
    }

    #[test]
    fn test_first_marker_wins() {
        let cis = TagExtractor::cis();
        assert_eq!(
            cis.extract("{CIS: 1.1} and again {CIS: 2.2}"),
            Some("1.1".to_string())
        );
    }

    #[test]
    fn test_value_is_opaque() {
        let pci = TagExtractor::pci_dss();
        assert_eq!(
            pci.extract("x {PCI_DSS: 2.2.4, 11.5 {nested} tail"),
            Some("2.2.4, 11.5 {nested".to_string())
        );
    }

    #[test]
    fn test_multibyte_text() {
        let cis = TagExtractor::cis();
        assert_eq!(
            cis.extract("contraseña débil {CIS: 5.3 – núcleo} fin"),
            Some("5.3 – núcleo".to_string())
        );
    }

    #[test]
    fn test_custom_marker() {
        let hipaa = TagExtractor::new("{HIPAA: ");
        assert_eq!(hipaa.marker(), "{HIPAA: ");
        assert_eq!(
            hipaa.extract("audit {HIPAA: 164.312.b}"),
            Some("164.312.b".to_string())
        );
    }
}
