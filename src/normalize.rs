//! Lookup construction over the raw payload maps
//!
//! The payload arrives as order-preserving maps (see [`crate::model`]); this
//! module derives the lookup structures the chart builders hit repeatedly:
//!
//! - [`LabelIndex`]: id → label with the label → id inverse built up front,
//!   so click/tooltip resolution is a map lookup instead of a linear scan.
//! - [`FrequencyIndex`]: term label → (frequency → disease labels), the
//!   grouping behind the "Frequency of X in A; B" tooltip lines.

use crate::model::{CatalogMap, CountMap, FrequencyRecord};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Forward and reverse views of an id → label catalog.
///
/// Iteration order matches the catalog. When two ids share a label, the
/// reverse lookup keeps the first id in catalog order.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    forward: CatalogMap,
    reverse: HashMap<String, String>,
}

impl LabelIndex {
    pub fn new(catalog: &CatalogMap) -> Self {
        let mut reverse = HashMap::with_capacity(catalog.len());
        for (id, label) in catalog {
            reverse
                .entry(label.clone())
                .or_insert_with(|| id.clone());
        }
        Self {
            forward: catalog.clone(),
            reverse,
        }
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.forward.get(id).map(String::as_str)
    }

    /// Display label for an id, falling back to the id itself when the
    /// catalog has no entry.
    pub fn label_or_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.label(id).unwrap_or(id)
    }

    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.reverse.get(label).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Frequency records with a null frequency carry no displayable fact.
pub fn non_null_frequencies(records: &[FrequencyRecord]) -> Vec<&FrequencyRecord> {
    records.iter().filter(|r| r.frequency.is_some()).collect()
}

/// Disease labels sharing one frequency value for a term.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyGroup {
    pub frequency: f64,
    pub diseases: Vec<String>,
}

/// term label → frequency groups, in term catalog order.
///
/// Diseases sharing a frequency value for the same term are collected into
/// one group so the tooltip renders one line per distinct frequency.
#[derive(Debug, Clone, Default)]
pub struct FrequencyIndex {
    groups: IndexMap<String, Vec<FrequencyGroup>>,
}

impl FrequencyIndex {
    /// Walks terms × diseases in catalog order; a disease contributes to a
    /// term's groups only when the count map actually has an entry for the
    /// pair and a non-null frequency record matches it.
    pub fn build(
        terms: &LabelIndex,
        diseases: &LabelIndex,
        counts: &CountMap,
        records: &[FrequencyRecord],
    ) -> Self {
        let records = non_null_frequencies(records);
        let mut groups: IndexMap<String, Vec<FrequencyGroup>> = IndexMap::new();

        for (term_id, term_label) in terms.iter() {
            let mut term_groups: Vec<FrequencyGroup> = Vec::new();
            for (disease_id, disease_label) in diseases.iter() {
                let has_count = counts
                    .get(disease_id)
                    .map(|m| m.contains_key(term_id))
                    .unwrap_or(false);
                if !has_count {
                    continue;
                }
                for record in &records {
                    if record.disease_id != disease_id || record.term_id != term_id {
                        continue;
                    }
                    let frequency = record.frequency.unwrap_or_default();
                    match term_groups.iter_mut().find(|g| g.frequency == frequency) {
                        Some(group) => group.diseases.push(disease_label.to_string()),
                        None => term_groups.push(FrequencyGroup {
                            frequency,
                            diseases: vec![disease_label.to_string()],
                        }),
                    }
                }
            }
            if !term_groups.is_empty() {
                groups.insert(term_label.to_string(), term_groups);
            }
        }

        Self { groups }
    }

    pub fn groups_for(&self, term_label: &str) -> &[FrequencyGroup] {
        self.groups
            .get(term_label)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
