//! Header auto-mapping and the mapping editor

use serde::{Deserialize, Serialize};

use crate::domain::schema::{ImportSpec, TargetField};

/// A proposed or confirmed source-to-target column assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Column header as it appears in the uploaded file
    pub source: String,
    /// Canonical target field key
    pub target: String,
}

/// Proposes source-to-target mappings from parsed headers
///
/// A trait so the matching heuristic can be replaced (say, by a scoring
/// matcher) without touching the rest of the pipeline.
pub trait HeaderMatcher {
    fn propose(&self, headers: &[String], spec: &ImportSpec) -> Vec<FieldMapping>;
}

/// The compatibility matcher: normalized equality or substring containment
///
/// Each header binds to the first target field, in declaration order, whose
/// key, label, or alias equals the normalized header or contains it or is
/// contained by it. First match wins; there is no similarity scoring, so an
/// ambiguous header binds to whichever field is declared first. A header
/// matching nothing stays unmapped. Two headers may bind the same target;
/// the mapping editor keeps the last one when seeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstringMatcher;

impl HeaderMatcher for SubstringMatcher {
    fn propose(&self, headers: &[String], spec: &ImportSpec) -> Vec<FieldMapping> {
        let mut proposals = Vec::new();

        for header in headers {
            let normalized = normalize_header(header);
            if normalized.is_empty() {
                continue;
            }

            for field in spec.fields {
                let matched = candidates(spec, field)
                    .any(|candidate| header_matches(&normalized, &candidate));
                if matched {
                    proposals.push(FieldMapping {
                        source: header.clone(),
                        target: field.field.to_string(),
                    });
                    break;
                }
            }
        }

        proposals
    }
}

/// Lowercase and strip underscores, hyphens, whitespace, and any BOM
pub fn normalize_header(s: &str) -> String {
    s.trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect()
}

/// Candidate spellings for a target field: key, label, then aliases
fn candidates<'a>(
    spec: &'a ImportSpec,
    field: &'a TargetField,
) -> impl Iterator<Item = String> + 'a {
    [field.field, field.label]
        .into_iter()
        .chain(spec.aliases_for(field.field).iter().copied())
        .map(normalize_header)
}

fn header_matches(header: &str, candidate: &str) -> bool {
    !candidate.is_empty() && (header.contains(candidate) || candidate.contains(header))
}

/// The editable mapping state between auto-map and preview
///
/// Holds at most one source per target field: `set` removes any existing
/// entry for the target before inserting.
#[derive(Debug, Default, Clone)]
pub struct MappingSet {
    entries: Vec<FieldMapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay auto-map proposals in order, so a target proposed twice
    /// keeps the last proposal
    pub fn seed(proposals: Vec<FieldMapping>) -> Self {
        let mut set = Self::new();
        for mapping in proposals {
            set.set(&mapping.target, Some(mapping.source));
        }
        set
    }

    /// Point `target` at `source`, dropping any previous assignment.
    /// `None` clears the target.
    pub fn set(&mut self, target: &str, source: Option<String>) {
        self.entries.retain(|m| m.target != target);
        if let Some(source) = source {
            self.entries.push(FieldMapping {
                source,
                target: target.to_string(),
            });
        }
    }

    pub fn source_for(&self, target: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|m| m.target == target)
            .map(|m| m.source.as_str())
    }

    pub fn is_mapped(&self, target: &str) -> bool {
        self.source_for(target).is_some()
    }

    /// Required fields with no mapping, in declaration order
    pub fn missing_required(&self, spec: &ImportSpec) -> Vec<&'static TargetField> {
        spec.fields
            .iter()
            .filter(|f| f.required && !self.is_mapped(f.field))
            .collect()
    }

    /// True once every required field has a source column
    pub fn all_required_mapped(&self, spec: &ImportSpec) -> bool {
        self.missing_required(spec).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{AliasEntry, Entity, Transform};

    const TEST_FIELDS: &[TargetField] = &[
        TargetField { field: "name", label: "name", required: true },
        TargetField { field: "email", label: "email", required: false },
        TargetField { field: "gstin", label: "gstin", required: false },
    ];

    const TEST_ALIASES: &[AliasEntry] = &[AliasEntry {
        target_field: "gstin",
        aliases: &["GST", "GSTIN"],
        transform: Some(Transform::Uppercase),
    }];

    fn test_spec() -> ImportSpec {
        ImportSpec {
            collection: "customers",
            fields: TEST_FIELDS,
            aliases: TEST_ALIASES,
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Customer_Name"), "customername");
        assert_eq!(normalize_header("  Billing-Address "), "billingaddress");
        assert_eq!(normalize_header("\u{feff}Invoice No"), "invoiceno");
        assert_eq!(normalize_header("GST %"), "gst%");
    }

    #[test]
    fn test_propose_matches_key_label_and_alias() {
        let spec = test_spec();
        let proposals =
            SubstringMatcher.propose(&headers(&["Customer Name", "Email", "GST"]), &spec);

        assert_eq!(proposals.len(), 3);
        assert_eq!(proposals[0].source, "Customer Name");
        assert_eq!(proposals[0].target, "name");
        assert_eq!(proposals[1].target, "email");
        assert_eq!(proposals[2].target, "gstin");
    }

    #[test]
    fn test_propose_skips_unmatched_headers() {
        let spec = test_spec();
        let proposals = SubstringMatcher.propose(&headers(&["Favourite Colour"]), &spec);
        assert!(proposals.is_empty());
    }

    #[test]
    fn test_propose_is_deterministic() {
        let spec = test_spec();
        let hs = headers(&["Customer Name", "Email", "GST", "Phone"]);
        let first = SubstringMatcher.propose(&hs, &spec);
        let second = SubstringMatcher.propose(&hs, &spec);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ambiguous_header_binds_first_declared_field() {
        // "Due Date" contains the candidate "date", and the date field is
        // declared before due_date, so the header binds to date.
        let spec = Entity::Invoices.spec();
        let proposals = SubstringMatcher.propose(&headers(&["Due Date"]), spec);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].target, "date");
    }

    #[test]
    fn test_propose_allows_duplicate_targets() {
        let spec = test_spec();
        let proposals =
            SubstringMatcher.propose(&headers(&["Name", "Customer Name"]), &spec);

        assert_eq!(proposals.len(), 2);
        assert!(proposals.iter().all(|m| m.target == "name"));

        // Seeding keeps the later proposal
        let set = MappingSet::seed(proposals);
        assert_eq!(set.len(), 1);
        assert_eq!(set.source_for("name"), Some("Customer Name"));
    }

    #[test]
    fn test_blank_header_is_ignored() {
        let spec = test_spec();
        let proposals = SubstringMatcher.propose(&headers(&["  ", "Email"]), &spec);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].target, "email");
    }

    #[test]
    fn test_set_mapping_replaces_previous_source() {
        let mut set = MappingSet::new();
        set.set("gstin", Some("ColA".to_string()));
        set.set("gstin", Some("ColB".to_string()));

        let entries: Vec<_> = set.iter().filter(|m| m.target == "gstin").collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "ColB");
    }

    #[test]
    fn test_set_mapping_none_clears_target() {
        let mut set = MappingSet::new();
        set.set("name", Some("Customer Name".to_string()));
        assert!(set.is_mapped("name"));

        set.set("name", None);
        assert!(!set.is_mapped("name"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_no_two_entries_share_a_target() {
        let mut set = MappingSet::new();
        set.set("name", Some("A".to_string()));
        set.set("email", Some("B".to_string()));
        set.set("name", Some("C".to_string()));
        set.set("email", None);
        set.set("email", Some("D".to_string()));

        let mut targets: Vec<_> = set.iter().map(|m| m.target.clone()).collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), set.len());
    }

    #[test]
    fn test_required_mapping_guard() {
        let spec = test_spec();
        let mut set = MappingSet::new();
        assert!(!set.all_required_mapped(&spec));
        assert_eq!(set.missing_required(&spec)[0].field, "name");

        set.set("name", Some("Customer Name".to_string()));
        assert!(set.all_required_mapped(&spec));
    }
}
