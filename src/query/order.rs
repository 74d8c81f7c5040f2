//! Sort key parsing.
//!
//! A sort key is either a bare image column (`processed_at`) or a composite
//! `relation;field` reference (`post;post_date`, `Luminance;mean_luminance`).
//! Only fields from the catalog resolve, so the resolved target can be
//! rendered into SQL without quoting concerns.

use crate::filter::catalog::{IMAGE_SORT_FIELDS, POST_SORT_FIELDS, POST_TAG};
use crate::filter::{Metric, Relation, SortOrder, DEFAULT_SORT_KEY};

const RELATION_SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTarget {
    Image(&'static str),
    Post(&'static str),
    Metric(Metric),
}

impl SortTarget {
    /// Resolve a sort key against the catalog.
    pub fn resolve(sort_key: &str) -> Option<Self> {
        match sort_key.split_once(RELATION_SEPARATOR) {
            Some((relation, field)) => {
                let (relation, field) = (relation.trim(), field.trim());
                if relation.eq_ignore_ascii_case(POST_TAG) {
                    return POST_SORT_FIELDS
                        .iter()
                        .copied()
                        .find(|f| *f == field)
                        .map(SortTarget::Post);
                }
                let relation = Relation::from_tag(relation)?;
                Metric::lookup(field)
                    .filter(|m| m.relation() == relation)
                    .map(SortTarget::Metric)
            }
            None => IMAGE_SORT_FIELDS
                .iter()
                .copied()
                .find(|f| *f == sort_key.trim())
                .map(SortTarget::Image),
        }
    }

    fn default_target() -> Self {
        SortTarget::Post("post_date")
    }
}

/// Single-key ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    pub target: SortTarget,
    pub direction: SortOrder,
}

impl OrderSpec {
    /// Parse a sort key, falling back to the default key (keeping the
    /// requested direction) when it does not resolve.
    pub fn parse(sort_key: &str, direction: SortOrder) -> Self {
        let target = SortTarget::resolve(sort_key).unwrap_or_else(|| {
            tracing::warn!(sort_key, fallback = DEFAULT_SORT_KEY, "Unresolvable sort key");
            SortTarget::default_target()
        });
        Self { target, direction }
    }
}

impl Default for OrderSpec {
    fn default() -> Self {
        Self {
            target: SortTarget::default_target(),
            direction: SortOrder::default(),
        }
    }
}
