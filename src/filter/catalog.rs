//! Metric catalog: which relation owns each metric and its default range.
//!
//! This is the one table consulted by decoding, encoding and compiling, so a
//! default range or an owning relation is declared exactly once.

use serde::Serialize;
use std::fmt;

use super::Range;

/// A one-to-one metrics relation hanging off an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Relation {
    Luminance,
    Saturation,
    Glcm,
    Laplacian,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::Luminance,
        Relation::Saturation,
        Relation::Glcm,
        Relation::Laplacian,
    ];

    /// Tag used in composite sort keys (`Luminance;mean_luminance`).
    pub fn tag(&self) -> &'static str {
        match self {
            Relation::Luminance => "Luminance",
            Relation::Saturation => "Saturation",
            Relation::Glcm => "GLCM",
            Relation::Laplacian => "Laplacian",
        }
    }

    /// Case-insensitive lookup by sort-key tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.tag().eq_ignore_ascii_case(tag.trim()))
    }

    pub fn table(&self) -> &'static str {
        match self {
            Relation::Luminance => "luminance",
            Relation::Saturation => "saturation",
            Relation::Glcm => "glcm",
            Relation::Laplacian => "laplacian",
        }
    }

    /// Alias under which the relation is joined in listing queries.
    pub fn alias(&self) -> &'static str {
        match self {
            Relation::Luminance => "lum",
            Relation::Saturation => "sat",
            Relation::Glcm => "glcm",
            Relation::Laplacian => "lap",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Relation::Luminance => "Luminance",
            Relation::Saturation => "Saturation",
            Relation::Glcm => "GLCM (texture)",
            Relation::Laplacian => "Laplacian (sharpness)",
        }
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        Metric::all().filter(move |m| m.relation() == *self)
    }
}

/// Catalog entry for one numeric metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDef {
    pub name: &'static str,
    pub label: &'static str,
    pub relation: Relation,
    pub default_min: f64,
    pub default_max: f64,
}

const fn def(
    name: &'static str,
    label: &'static str,
    relation: Relation,
    default_min: f64,
    default_max: f64,
) -> MetricDef {
    MetricDef {
        name,
        label,
        relation,
        default_min,
        default_max,
    }
}

pub const METRICS: &[MetricDef] = &[
    def("mean_luminance", "Mean Luminance", Relation::Luminance, 0.0, 100.0),
    def("median_luminance", "Median Luminance", Relation::Luminance, 0.0, 100.0),
    def("std_luminance", "Standard Deviation of Luminance", Relation::Luminance, 0.0, 50.0),
    def("dynamic_range", "Dynamic Range", Relation::Luminance, 0.0, 100.0),
    def("rms_contrast", "RMS Contrast", Relation::Luminance, 0.0, 100.0),
    def("michelson_contrast", "Michelson Contrast", Relation::Luminance, 0.0, 1.0),
    def("luminance_skewness", "Luminance Skewness", Relation::Luminance, -5.0, 15.0),
    def("luminance_kurtosis", "Luminance Kurtosis", Relation::Luminance, -2.0, 200.0),
    def("min_luminance", "Min Luminance", Relation::Luminance, 0.0, 100.0),
    def("max_luminance", "Max Luminance", Relation::Luminance, 0.0, 100.0),
    def("mean_saturation", "Mean Saturation", Relation::Saturation, 0.0, 1.0),
    def("median_saturation", "Median Saturation", Relation::Saturation, 0.0, 1.0),
    def("std_saturation", "Standard Deviation of Saturation", Relation::Saturation, 0.0, 0.5),
    def("contrast", "GLCM Contrast", Relation::Glcm, 0.0, 1500.0),
    def("correlation", "GLCM Correlation", Relation::Glcm, 0.0, 1.0),
    def("variance", "Laplacian Variance", Relation::Laplacian, 0.0, 2500.0),
];

/// Handle to a routable metric. Ordered by catalog position, which is also
/// the order metrics are written to query strings.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Metric(usize);

impl Metric {
    /// Route a metric name through the catalog. Unknown names yield `None`.
    pub fn lookup(name: &str) -> Option<Self> {
        METRICS.iter().position(|d| d.name == name).map(Metric)
    }

    pub fn all() -> impl Iterator<Item = Metric> {
        (0..METRICS.len()).map(Metric)
    }

    pub fn def(&self) -> &'static MetricDef {
        &METRICS[self.0]
    }

    pub fn name(&self) -> &'static str {
        self.def().name
    }

    pub fn label(&self) -> &'static str {
        self.def().label
    }

    pub fn relation(&self) -> Relation {
        self.def().relation
    }

    pub fn default_range(&self) -> Range {
        Range::new(self.def().default_min, self.def().default_max)
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metric({})", self.name())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the four per-cluster color fields constrained by a color range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChannel {
    Lightness,
    Chroma,
    Hue,
    Percentage,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 4] = [
        ColorChannel::Lightness,
        ColorChannel::Chroma,
        ColorChannel::Hue,
        ColorChannel::Percentage,
    ];

    /// Query-string prefix, e.g. `l` for `l_min`/`l_max`.
    pub fn key(&self) -> &'static str {
        match self {
            ColorChannel::Lightness => "l",
            ColorChannel::Chroma => "c",
            ColorChannel::Hue => "h",
            ColorChannel::Percentage => "percentage",
        }
    }

    /// Column on the clusters table.
    pub fn column(&self) -> &'static str {
        self.key()
    }

    pub fn default_range(&self) -> Range {
        match self {
            ColorChannel::Lightness => Range::new(0.0, 100.0),
            ColorChannel::Chroma => Range::new(0.0, 100.0),
            ColorChannel::Hue => Range::new(0.0, 360.0),
            ColorChannel::Percentage => Range::new(0.0, 100.0),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// Sortable fields of the image row itself.
pub const IMAGE_SORT_FIELDS: &[&str] = &["id", "filename", "width", "height", "processed_at", "post_id"];

/// Sortable fields of the owning post, addressed as `post;<field>`.
pub const POST_SORT_FIELDS: &[&str] = &["username", "post_date", "shortcode"];

pub const POST_TAG: &str = "post";

/// A selectable composite sort key with its display metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortOption {
    pub group: &'static str,
    pub label: &'static str,
    pub key: String,
}

/// Every composite sort key the listing understands, grouped for display.
pub fn sort_options() -> Vec<SortOption> {
    let mut options = vec![
        SortOption {
            group: "Post",
            label: "Artist",
            key: format!("{POST_TAG};username"),
        },
        SortOption {
            group: "Post",
            label: "Date Posted",
            key: format!("{POST_TAG};post_date"),
        },
    ];
    for relation in Relation::ALL {
        for metric in relation.metrics() {
            options.push(SortOption {
                group: relation.display_name(),
                label: metric.label(),
                key: format!("{};{}", relation.tag(), metric.name()),
            });
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_metric_routes_to_its_relation() {
        assert_eq!(Metric::lookup("std_luminance").unwrap().relation(), Relation::Luminance);
        assert_eq!(Metric::lookup("median_saturation").unwrap().relation(), Relation::Saturation);
        assert_eq!(Metric::lookup("correlation").unwrap().relation(), Relation::Glcm);
        assert_eq!(Metric::lookup("variance").unwrap().relation(), Relation::Laplacian);
        assert!(Metric::lookup("foo").is_none());
        assert!(Metric::lookup("glcm_contrast").is_none());
    }

    #[test]
    fn test_relation_sizes() {
        assert_eq!(Relation::Luminance.metrics().count(), 10);
        assert_eq!(Relation::Saturation.metrics().count(), 3);
        assert_eq!(Relation::Glcm.metrics().count(), 2);
        assert_eq!(Relation::Laplacian.metrics().count(), 1);
    }

    #[test]
    fn test_defaults() {
        let skew = Metric::lookup("luminance_skewness").unwrap();
        assert_eq!(skew.default_range(), Range::new(-5.0, 15.0));
        assert_eq!(ColorChannel::Hue.default_range(), Range::new(0.0, 360.0));
    }

    #[test]
    fn test_relation_tag_is_case_insensitive() {
        assert_eq!(Relation::from_tag("glcm"), Some(Relation::Glcm));
        assert_eq!(Relation::from_tag("LUMINANCE"), Some(Relation::Luminance));
        assert_eq!(Relation::from_tag("post"), None);
    }

    #[test]
    fn test_sort_options_cover_catalog() {
        let options = sort_options();
        assert_eq!(options.len(), 2 + METRICS.len());
        assert!(options.iter().any(|o| o.key == "Luminance;mean_luminance"));
        assert!(options.iter().any(|o| o.key == "GLCM;contrast"));
        let variance = options.iter().find(|o| o.key == "Laplacian;variance").unwrap();
        assert_eq!(variance.group, "Laplacian (sharpness)");
        assert_eq!(options[1].key, "post;post_date");
    }
}
