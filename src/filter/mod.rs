//! In-memory model of what the user wants to see.
//!
//! A [`FilterModel`] is rebuilt from the URL on every page load, mutated by
//! user interaction and thrown away on navigation. It is never persisted.

pub mod catalog;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use catalog::{sort_options, ColorChannel, Metric, MetricDef, Relation, SortOption, METRICS};

pub const DEFAULT_SORT_KEY: &str = "post;post_date";

/// Inclusive `[min, max]` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Constraint on the color clusters of an image. Hue is circular: a range
/// with `min > max` wraps through zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lightness: Range,
    pub chroma: Range,
    pub hue: Range,
    pub cluster_percentage: Range,
}

impl Default for ColorRange {
    fn default() -> Self {
        Self {
            lightness: ColorChannel::Lightness.default_range(),
            chroma: ColorChannel::Chroma.default_range(),
            hue: ColorChannel::Hue.default_range(),
            cluster_percentage: ColorChannel::Percentage.default_range(),
        }
    }
}

impl ColorRange {
    pub fn channel(&self, channel: ColorChannel) -> Range {
        match channel {
            ColorChannel::Lightness => self.lightness,
            ColorChannel::Chroma => self.chroma,
            ColorChannel::Hue => self.hue,
            ColorChannel::Percentage => self.cluster_percentage,
        }
    }

    pub fn set_channel(&mut self, channel: ColorChannel, range: Range) {
        match channel {
            ColorChannel::Lightness => self.lightness = range,
            ColorChannel::Chroma => self.chroma = range,
            ColorChannel::Hue => self.hue = range,
            ColorChannel::Percentage => self.cluster_percentage = range,
        }
    }

    /// True when all eight bounds sit at their defaults.
    pub fn is_default(&self) -> bool {
        ColorChannel::ALL
            .into_iter()
            .all(|c| self.channel(c) == c.default_range())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }

    /// Parse `asc`/`desc` (case-insensitive). Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Ascending),
            "desc" | "descending" => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user-facing constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Artist(String),
    PostId(i64),
    ColorRange(ColorRange),
    MetricRange(Metric, Range),
}

impl Filter {
    /// Build a metric filter, routing the name through the catalog.
    /// Names the catalog does not know yield `None`.
    pub fn metric(name: &str, range: Range) -> Option<Self> {
        Metric::lookup(name).map(|m| Filter::MetricRange(m, range))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterModel {
    pub artist: Option<String>,
    pub post_id: Option<i64>,
    color_range: Option<ColorRange>,
    metric_ranges: BTreeMap<Metric, Range>,
    pub sort_key: String,
    pub sort_order: SortOrder,
    pub page: u32,
    pub page_size: Option<u32>,
}

impl Default for FilterModel {
    fn default() -> Self {
        Self {
            artist: None,
            post_id: None,
            color_range: None,
            metric_ranges: BTreeMap::new(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
            sort_order: SortOrder::default(),
            page: 1,
            page_size: None,
        }
    }
}

impl FilterModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one constraint. Default ranges clear the constraint instead of
    /// storing a no-op.
    pub fn apply(&mut self, filter: Filter) {
        match filter {
            Filter::Artist(artist) => {
                self.artist = Some(artist).filter(|a| !a.is_empty());
            }
            Filter::PostId(id) => self.post_id = Some(id),
            Filter::ColorRange(range) => self.set_color_range(range),
            Filter::MetricRange(metric, range) => self.set_metric(metric, range),
        }
    }

    pub fn with(mut self, filter: Filter) -> Self {
        self.apply(filter);
        self
    }

    pub fn color_range(&self) -> Option<&ColorRange> {
        self.color_range.as_ref()
    }

    pub fn set_color_range(&mut self, range: ColorRange) {
        self.color_range = Some(range).filter(|r| !r.is_default());
    }

    pub fn clear_color_range(&mut self) {
        self.color_range = None;
    }

    pub fn set_metric(&mut self, metric: Metric, range: Range) {
        if range == metric.default_range() {
            self.metric_ranges.remove(&metric);
        } else {
            self.metric_ranges.insert(metric, range);
        }
    }

    /// Set a metric range by name. Returns `false` when the name is not
    /// routable, in which case the model is unchanged.
    pub fn set_metric_range(&mut self, name: &str, range: Range) -> bool {
        match Metric::lookup(name) {
            Some(metric) => {
                self.set_metric(metric, range);
                true
            }
            None => false,
        }
    }

    pub fn clear_metric(&mut self, metric: Metric) {
        self.metric_ranges.remove(&metric);
    }

    pub fn metric_range(&self, metric: Metric) -> Option<Range> {
        self.metric_ranges.get(&metric).copied()
    }

    /// Constrained metrics in catalog order.
    pub fn metric_ranges(&self) -> impl Iterator<Item = (Metric, Range)> + '_ {
        self.metric_ranges.iter().map(|(m, r)| (*m, *r))
    }

    /// The model's constraints as a flat list of tagged filters.
    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(artist) = &self.artist {
            filters.push(Filter::Artist(artist.clone()));
        }
        if let Some(id) = self.post_id {
            filters.push(Filter::PostId(id));
        }
        if let Some(range) = self.color_range {
            filters.push(Filter::ColorRange(range));
        }
        filters.extend(self.metric_ranges().map(|(m, r)| Filter::MetricRange(m, r)));
        filters
    }

    /// True when nothing narrows the listing.
    pub fn is_unfiltered(&self) -> bool {
        self.artist.is_none()
            && self.post_id.is_none()
            && self.color_range.is_none()
            && self.metric_ranges.is_empty()
    }
}
