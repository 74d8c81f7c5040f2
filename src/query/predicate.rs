//! Structured predicate handed to the image store.

use std::collections::BTreeMap;

use crate::db::{Cluster, ImageRecord};
use crate::filter::{Metric, Range, Relation};

/// `gte`/`lte` bounds on one numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}

impl Bounds {
    pub fn within(range: Range) -> Self {
        Self {
            gte: Some(range.min),
            lte: Some(range.max),
        }
    }

    /// Intersect with another set of bounds; the tighter side wins.
    pub fn merge(&mut self, other: Bounds) {
        self.gte = match (self.gte, other.gte) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.lte = match (self.lte, other.lte) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    pub fn contains(&self, value: f64) -> bool {
        self.gte.map_or(true, |min| value >= min) && self.lte.map_or(true, |max| value <= max)
    }
}

/// Field conditions accumulated for one relation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationCondition {
    fields: BTreeMap<Metric, Bounds>,
}

impl RelationCondition {
    /// Add a field condition, merging with any existing condition on the
    /// same field rather than replacing it.
    pub fn constrain(&mut self, metric: Metric, bounds: Bounds) {
        self.fields
            .entry(metric)
            .and_modify(|existing| existing.merge(bounds))
            .or_insert(bounds);
    }

    pub fn get(&self, metric: Metric) -> Option<&Bounds> {
        self.fields.get(&metric)
    }

    pub fn fields(&self) -> impl Iterator<Item = (Metric, &Bounds)> {
        self.fields.iter().map(|(m, b)| (*m, b))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Accepted hue values. Hue lives on a circle of 360 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HueSet {
    /// `[min, max]`
    Interval { min: f64, max: f64 },
    /// `[from, 360) ∪ [0, to]`
    Wrapped { from: f64, to: f64 },
}

impl HueSet {
    pub fn from_range(range: Range) -> Self {
        if range.min <= range.max {
            HueSet::Interval {
                min: range.min,
                max: range.max,
            }
        } else {
            HueSet::Wrapped {
                from: range.min,
                to: range.max,
            }
        }
    }

    pub fn contains(&self, hue: f64) -> bool {
        match *self {
            HueSet::Interval { min, max } => hue >= min && hue <= max,
            HueSet::Wrapped { from, to } => (hue >= from && hue < 360.0) || (hue >= 0.0 && hue <= to),
        }
    }
}

/// "At least one cluster satisfies all four constraints."
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterCondition {
    pub lightness: Bounds,
    pub chroma: Bounds,
    pub hue: HueSet,
    pub percentage: Bounds,
}

impl ClusterCondition {
    pub fn matches(&self, cluster: &Cluster) -> bool {
        self.lightness.contains(cluster.l)
            && self.chroma.contains(cluster.c)
            && self.hue.contains(cluster.h)
            && self.percentage.contains(cluster.percentage)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImagePredicate {
    pub artist: Option<String>,
    pub post_id: Option<i64>,
    pub clusters: Option<ClusterCondition>,
    relations: BTreeMap<Relation, RelationCondition>,
}

impl ImagePredicate {
    pub fn relation_mut(&mut self, relation: Relation) -> &mut RelationCondition {
        self.relations.entry(relation).or_default()
    }

    pub fn relation(&self, relation: Relation) -> Option<&RelationCondition> {
        self.relations.get(&relation)
    }

    pub fn relations(&self) -> impl Iterator<Item = (Relation, &RelationCondition)> {
        self.relations
            .iter()
            .filter(|(_, c)| !c.is_empty())
            .map(|(r, c)| (*r, c))
    }

    pub fn is_empty(&self) -> bool {
        self.artist.is_none()
            && self.post_id.is_none()
            && self.clusters.is_none()
            && self.relations().next().is_none()
    }

    /// Evaluate against an already-loaded record with the same semantics
    /// the store applies. A missing relation fails any condition on it.
    pub fn matches(&self, image: &ImageRecord) -> bool {
        if let Some(artist) = &self.artist {
            if image.post.username != *artist {
                return false;
            }
        }
        if let Some(post_id) = self.post_id {
            if image.post_id != post_id {
                return false;
            }
        }
        if let Some(condition) = &self.clusters {
            let any = image
                .kmeans_clustering
                .iter()
                .flat_map(|k| k.clusters.iter())
                .any(|c| condition.matches(c));
            if !any {
                return false;
            }
        }
        self.relations().all(|(_, condition)| {
            condition
                .fields()
                .all(|(metric, bounds)| image.metric(metric).is_some_and(|v| bounds.contains(v)))
        })
    }
}
