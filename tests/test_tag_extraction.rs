use pmstore::tags::{ComplianceTagger, TagExtractor};

#[test]
fn test_terminated_values_are_returned_verbatim() {
    let pci = TagExtractor::pci_dss();
    let values = ["10.6.1", "2.2.4, 11.5", "", " spaced ", "A{B"];

    for value in values {
        let log = format!("System audit: check failed {{PCI_DSS: {}}} trailing", value);
        assert_eq!(pci.extract(&log).as_deref(), Some(value), "log: {}", log);
    }
}

#[test]
fn test_unterminated_values_yield_nothing() {
    let pci = TagExtractor::pci_dss();
    let values = ["10.6.1", "", "1.1 and more text {CIS: 4.1"];

    for value in values {
        let log = format!("rule triggered {{PCI_DSS: {}", value);
        assert_eq!(pci.extract(&log), None, "log: {}", log);
    }
}

#[test]
fn test_missing_marker_ignores_other_tags() {
    let pci = TagExtractor::pci_dss();
    assert_eq!(pci.extract("rule triggered {CIS: 4.1}"), None);
    assert_eq!(pci.extract("rule triggered {pci_dss: 4.1}"), None);
    assert_eq!(pci.extract("rule triggered PCI_DSS: 4.1}"), None);
}

#[test]
fn test_example_lines() {
    let tagger = ComplianceTagger::default();

    let tags = tagger.tag("rule triggered {PCI_DSS: 10.6.1} other text {CIS: 4.1}");
    assert_eq!(tags.pci_dss.as_deref(), Some("10.6.1"));
    assert_eq!(tags.cis.as_deref(), Some("4.1"));

    let tags = tagger.tag("rule triggered {PCI_DSS: 10.6.1");
    assert_eq!(tags.pci_dss, None);
    assert_eq!(tags.cis, None);
}

#[test]
fn test_rootcheck_style_alert() {
    let tagger = ComplianceTagger::default();
    let log = "System Audit: CIS - RHEL7 - 1.1.2 - Build considerations - Ensure separate \
               partition for /tmp {CIS: 1.1.2 RHEL7} {PCI_DSS: 2.2.4}. File: /etc/fstab. \
               Reference: https://www.cisecurity.org/cis-benchmarks/ .";

    let tags = tagger.tag(log);
    assert_eq!(tags.cis.as_deref(), Some("1.1.2 RHEL7"));
    assert_eq!(tags.pci_dss.as_deref(), Some("2.2.4"));
}
