//! Ordered, reference-unique collection of clauses

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::clause::Clause;
use super::error::ClauseError;
use crate::data_cube::DataCube;

/// The user's filter.
///
/// Order is kept for display only; query semantics are a conjunction of
/// the clauses. No two clauses share a reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a filter, keeping the position of the first clause per
    /// reference and the value of the last
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        clauses
            .into_iter()
            .fold(Filter::empty(), |filter, clause| filter.set_clause(clause))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Position of the clause on a dimension
    pub fn index_of(&self, reference: &str) -> Option<usize> {
        self.clauses.iter().position(|c| c.reference() == reference)
    }

    pub fn clause_for_reference(&self, reference: &str) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.reference() == reference)
    }

    pub fn has_clause(&self, reference: &str) -> bool {
        self.index_of(reference).is_some()
    }

    /// Check if any clause still needs a time source
    pub fn is_relative(&self) -> bool {
        self.clauses.iter().any(Clause::is_relative)
    }

    /// Append a clause on a dimension that is not filtered yet
    pub fn add_clause(&self, clause: Clause) -> Filter {
        debug_assert!(
            !self.has_clause(clause.reference()),
            "clause on '{}' already present",
            clause.reference()
        );
        self.set_clause(clause)
    }

    pub fn remove_clause(&self, reference: &str) -> Filter {
        Filter {
            clauses: self
                .clauses
                .iter()
                .filter(|c| c.reference() != reference)
                .cloned()
                .collect(),
        }
    }

    /// Replace the clause on the same dimension in place, or append
    pub fn set_clause(&self, clause: Clause) -> Filter {
        let mut clauses = self.clauses.clone();
        match self.index_of(clause.reference()) {
            Some(index) => clauses[index] = clause,
            None => clauses.push(clause),
        }
        Filter { clauses }
    }

    /// Put `clause` at `index`, dropping any clause on the same dimension
    /// at another position. Replacing one past the end appends.
    pub fn replace_by_index(&self, index: usize, clause: Clause) -> Filter {
        if index >= self.clauses.len() {
            return self.insert_by_index(index, clause);
        }
        let existing = self.index_of(clause.reference());
        let mut clauses = self.clauses.clone();
        clauses[index] = clause;
        if let Some(existing) = existing.filter(|&i| i != index) {
            clauses.remove(existing);
        }
        Filter { clauses }
    }

    /// Insert `clause` before `index`, removing a duplicate found elsewhere
    pub fn insert_by_index(&self, index: usize, clause: Clause) -> Filter {
        let mut clauses = self.clauses.clone();
        let existing = self.index_of(clause.reference());
        let index = index.min(clauses.len());
        clauses.insert(index, clause);
        if let Some(existing) = existing {
            // the old clause moved one slot right if it sat at or after the insertion point
            let stale = if existing >= index { existing + 1 } else { existing };
            clauses.remove(stale);
        }
        Filter { clauses }
    }

    /// Drop clauses on dimensions the cube no longer has
    pub fn constrain_to_dimensions(&self, data_cube: &DataCube) -> Filter {
        Filter {
            clauses: self
                .clauses
                .iter()
                .filter(|c| {
                    let known = data_cube.get_dimension(c.reference()).is_some();
                    if !known {
                        tracing::debug!(
                            reference = c.reference(),
                            data_cube = %data_cube.name,
                            "dropping filter clause on unknown dimension"
                        );
                    }
                    known
                })
                .cloned()
                .collect(),
        }
    }

    /// Evaluate every clause against the time source.
    ///
    /// The result contains no relative clauses; it is the only filter form a
    /// query backend accepts.
    pub fn get_specific_filter(
        &self,
        now: DateTime<Utc>,
        max_time: Option<DateTime<Utc>>,
        tz: Tz,
    ) -> Filter {
        Filter {
            clauses: self
                .clauses
                .iter()
                .map(|c| c.evaluate(now, max_time, tz))
                .collect(),
        }
    }

    /// References whose clause was added, removed or changed between `self`
    /// and `other`
    pub fn changed_references(&self, other: &Filter) -> Vec<String> {
        let mut changed: Vec<String> = Vec::new();
        for clause in &self.clauses {
            if other.clause_for_reference(clause.reference()) != Some(clause) {
                changed.push(clause.reference().to_string());
            }
        }
        for clause in &other.clauses {
            if !self.has_clause(clause.reference()) {
                changed.push(clause.reference().to_string());
            }
        }
        changed
    }

    /// Validate every clause, collecting all failures
    pub fn validate(&self) -> Result<(), Vec<ClauseError>> {
        let errors: Vec<ClauseError> = self
            .clauses
            .iter()
            .filter_map(|c| c.validate().err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_cube::fixtures::labels_cube;
    use crate::filter::{
        DateRange, FixedTimeClause, RelativeTimeClause, StringAction, StringClause, TimePeriod,
    };

    fn string(reference: &str, value: &str) -> Clause {
        Clause::String(StringClause {
            reference: reference.to_string(),
            action: StringAction::In,
            values: [value.to_string()].into_iter().collect(),
            not: false,
        })
    }

    fn references(filter: &Filter) -> Vec<&str> {
        filter.iter().map(Clause::reference).collect()
    }

    #[test]
    fn test_set_clause_replaces_in_place() {
        let filter = Filter::from_clauses(vec![string("a", "1"), string("b", "1")]);
        let updated = filter.set_clause(string("a", "2"));
        assert_eq!(references(&updated), vec!["a", "b"]);
        assert_eq!(updated.clause_for_reference("a"), Some(&string("a", "2")));
        // original untouched
        assert_eq!(filter.clause_for_reference("a"), Some(&string("a", "1")));
    }

    #[test]
    fn test_from_clauses_deduplicates() {
        let filter = Filter::from_clauses(vec![string("a", "1"), string("b", "1"), string("a", "2")]);
        assert_eq!(references(&filter), vec!["a", "b"]);
        assert_eq!(filter.clause_for_reference("a"), Some(&string("a", "2")));
    }

    #[test]
    fn test_remove_clause() {
        let filter = Filter::from_clauses(vec![string("a", "1"), string("b", "1")]);
        assert_eq!(references(&filter.remove_clause("a")), vec!["b"]);
        assert_eq!(filter.remove_clause("zzz"), filter);
    }

    #[test]
    fn test_replace_by_index_removes_duplicate() {
        let filter = Filter::from_clauses(vec![string("a", "1"), string("b", "1"), string("c", "1")]);
        let updated = filter.replace_by_index(0, string("c", "2"));
        assert_eq!(references(&updated), vec!["c", "b"]);
        assert_eq!(updated.clause_for_reference("c"), Some(&string("c", "2")));
    }

    #[test]
    fn test_replace_by_index_past_end_appends() {
        let filter = Filter::from_clauses(vec![string("a", "1")]);
        assert_eq!(references(&filter.replace_by_index(1, string("b", "1"))), vec!["a", "b"]);
    }

    #[test]
    fn test_insert_by_index_moves_existing() {
        let filter = Filter::from_clauses(vec![string("a", "1"), string("b", "1"), string("c", "1")]);
        let moved_left = filter.insert_by_index(0, string("c", "1"));
        assert_eq!(references(&moved_left), vec!["c", "a", "b"]);

        let moved_right = filter.insert_by_index(3, string("a", "1"));
        assert_eq!(references(&moved_right), vec!["b", "c", "a"]);

        let fresh = filter.insert_by_index(1, string("d", "1"));
        assert_eq!(references(&fresh), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_constrain_to_dimensions() {
        let cube = labels_cube();
        let filter = Filter::from_clauses(vec![string("channel", "en"), string("gone", "x")]);
        assert_eq!(references(&filter.constrain_to_dimensions(&cube)), vec!["channel"]);
    }

    #[test]
    fn test_specific_filter_has_no_relative_clauses() {
        let filter = Filter::from_clauses(vec![
            string("channel", "en"),
            Clause::RelativeTime(RelativeTimeClause {
                reference: "time".to_string(),
                period: TimePeriod::Latest,
                duration: "P1D".parse().unwrap(),
            }),
        ]);
        assert!(filter.is_relative());

        let max_time: DateTime<Utc> = "2016-01-15T08:22:00Z".parse().unwrap();
        let specific = filter.get_specific_filter(max_time, Some(max_time), Tz::UTC);
        assert!(!specific.is_relative());
        assert_eq!(
            specific.clause_for_reference("time"),
            Some(&Clause::FixedTime(FixedTimeClause {
                reference: "time".to_string(),
                ranges: vec![DateRange::new(
                    "2016-01-14T08:23:00Z".parse().unwrap(),
                    "2016-01-15T08:23:00Z".parse().unwrap(),
                )],
            }))
        );
        assert_eq!(specific.clause_for_reference("channel"), Some(&string("channel", "en")));
    }

    #[test]
    fn test_changed_references() {
        let before = Filter::from_clauses(vec![string("a", "1"), string("b", "1")]);
        let after = Filter::from_clauses(vec![string("a", "1"), string("b", "2"), string("c", "1")]);
        let mut changed = after.changed_references(&before);
        changed.sort();
        assert_eq!(changed, vec!["b", "c"]);

        let removed = before.changed_references(&Filter::from_clauses(vec![string("a", "1")]));
        assert_eq!(removed, vec!["b"]);
    }

    #[test]
    fn test_validate_collects_errors() {
        let empty_in = Clause::String(StringClause {
            reference: "a".to_string(),
            action: StringAction::In,
            values: Default::default(),
            not: false,
        });
        let bad_regex = Clause::String(StringClause {
            reference: "b".to_string(),
            action: StringAction::Match,
            values: ["[".to_string()].into_iter().collect(),
            not: false,
        });
        let filter = Filter::from_clauses(vec![empty_in, string("c", "ok"), bad_regex]);
        let errors = filter.validate().unwrap_err();
        let refs: Vec<&str> = errors.iter().map(ClauseError::reference).collect();
        assert_eq!(refs, vec!["a", "b"]);
    }
}
