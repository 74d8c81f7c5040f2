//! Image records as returned by listings, with every relation embedded.

use serde::{Deserialize, Serialize};

use crate::filter::{Metric, Relation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub shortcode: String,
    pub username: String,
    pub caption: Option<String>,
    pub post_date: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LuminanceMetrics {
    pub mean_luminance: f64,
    pub median_luminance: f64,
    pub std_luminance: f64,
    pub dynamic_range: f64,
    pub rms_contrast: f64,
    pub michelson_contrast: f64,
    pub luminance_skewness: f64,
    pub luminance_kurtosis: f64,
    pub min_luminance: f64,
    pub max_luminance: f64,
    /// Luminance histogram as stored by the ingestion pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<serde_json::Value>,
}

impl LuminanceMetrics {
    pub fn value(&self, name: &str) -> Option<f64> {
        Some(match name {
            "mean_luminance" => self.mean_luminance,
            "median_luminance" => self.median_luminance,
            "std_luminance" => self.std_luminance,
            "dynamic_range" => self.dynamic_range,
            "rms_contrast" => self.rms_contrast,
            "michelson_contrast" => self.michelson_contrast,
            "luminance_skewness" => self.luminance_skewness,
            "luminance_kurtosis" => self.luminance_kurtosis,
            "min_luminance" => self.min_luminance,
            "max_luminance" => self.max_luminance,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaturationMetrics {
    pub mean_saturation: f64,
    pub median_saturation: f64,
    pub std_saturation: f64,
}

impl SaturationMetrics {
    pub fn value(&self, name: &str) -> Option<f64> {
        Some(match name {
            "mean_saturation" => self.mean_saturation,
            "median_saturation" => self.median_saturation,
            "std_saturation" => self.std_saturation,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlcmMetrics {
    pub contrast: f64,
    pub correlation: f64,
}

impl GlcmMetrics {
    pub fn value(&self, name: &str) -> Option<f64> {
        match name {
            "contrast" => Some(self.contrast),
            "correlation" => Some(self.correlation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaplacianMetrics {
    pub variance: f64,
}

/// One weighted color cluster. `l`, `a`, `b_channel` are CIELAB; `c`, `h`
/// the matching LCH chroma and hue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cluster {
    pub clustering_id: i64,
    pub cluster_index: i64,
    pub r: i64,
    pub g: i64,
    pub b: i64,
    pub l: f64,
    pub a: f64,
    pub b_channel: f64,
    pub c: f64,
    pub h: f64,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KMeansClustering {
    pub id: i64,
    pub image_id: i64,
    pub num_clusters: i64,
    #[serde(rename = "Clusters")]
    pub clusters: Vec<Cluster>,
}

impl KMeansClustering {
    /// Clusters ordered by share of the image, largest first.
    pub fn swatches(&self) -> Vec<&Cluster> {
        let mut clusters: Vec<&Cluster> = self.clusters.iter().collect();
        clusters.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        clusters
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub absolute_file_path: String,
    pub relative_file_path: String,
    pub filename: String,
    pub post_id: i64,
    pub post: Post,
    pub processed_at: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    #[serde(rename = "Luminance")]
    pub luminance: Option<LuminanceMetrics>,
    #[serde(rename = "Saturation")]
    pub saturation: Option<SaturationMetrics>,
    #[serde(rename = "GLCM")]
    pub glcm: Option<GlcmMetrics>,
    #[serde(rename = "Laplacian")]
    pub laplacian: Option<LaplacianMetrics>,
    #[serde(rename = "KMeansClustering", default)]
    pub kmeans_clustering: Vec<KMeansClustering>,
}

impl ImageRecord {
    /// Read a catalog metric from its embedded relation.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric.relation() {
            Relation::Luminance => self.luminance.as_ref()?.value(metric.name()),
            Relation::Saturation => self.saturation.as_ref()?.value(metric.name()),
            Relation::Glcm => self.glcm.as_ref()?.value(metric.name()),
            Relation::Laplacian => self.laplacian.as_ref().map(|l| l.variance),
        }
    }
}
