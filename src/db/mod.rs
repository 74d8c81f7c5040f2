mod schema;
mod sql;
pub mod records;
pub mod sqlite;

use anyhow::Result;

pub use records::{
    Cluster, GlcmMetrics, ImageRecord, KMeansClustering, LaplacianMetrics, LuminanceMetrics, Post,
    SaturationMetrics,
};
pub use schema::SCHEMA;
pub use sqlite::SqliteDb;

use crate::config::Config;
use crate::query::{ImagePredicate, OrderSpec};

/// The persistence engine as seen by the listing service.
pub trait ImageStore {
    /// Fetch one ordered page and the unbounded count for the same
    /// predicate. Implementations must evaluate both against one consistent
    /// view of the data.
    fn list_page(
        &self,
        predicate: &ImagePredicate,
        order: &OrderSpec,
        skip: u64,
        take: u64,
    ) -> Result<(Vec<ImageRecord>, u64)>;

    /// Sorted distinct usernames of posts that have at least one image.
    fn distinct_artists(&self) -> Result<Vec<String>>;

    /// One image with every relation embedded.
    fn get_image(&self, id: i64) -> Result<Option<ImageRecord>>;
}

/// Open and initialize the configured database.
pub fn open(config: &Config) -> Result<SqliteDb> {
    let db = SqliteDb::open(&config.db_path)?;
    db.initialize()?;
    tracing::debug!(path = ?config.db_path, "Database opened");
    Ok(db)
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    pub fn post(id: i64, username: &str) -> Post {
        Post {
            id,
            shortcode: format!("sc{id}"),
            username: username.to_string(),
            caption: Some(format!("post {id}")),
            post_date: format!("2024-01-{:02}T12:00:00Z", id.clamp(1, 28)),
        }
    }

    /// An image with every relation present and two color clusters
    /// (a red at hue 5 and a blue at hue 250).
    pub fn image(id: i64, post_id: i64, username: &str) -> ImageRecord {
        ImageRecord {
            id,
            absolute_file_path: format!("/srv/gallery/{id}.jpg"),
            relative_file_path: format!("{id}.jpg"),
            filename: format!("{id}.jpg"),
            post_id,
            post: post(post_id, username),
            processed_at: Some("2024-02-01T00:00:00Z".to_string()),
            width: Some(1080),
            height: Some(1350),
            luminance: Some(LuminanceMetrics {
                mean_luminance: 50.0,
                median_luminance: 48.0,
                std_luminance: 20.0,
                dynamic_range: 90.0,
                rms_contrast: 30.0,
                michelson_contrast: 0.9,
                luminance_skewness: 0.5,
                luminance_kurtosis: 3.0,
                min_luminance: 2.0,
                max_luminance: 98.0,
                histogram: None,
            }),
            saturation: Some(SaturationMetrics {
                mean_saturation: 0.4,
                median_saturation: 0.35,
                std_saturation: 0.1,
            }),
            glcm: Some(GlcmMetrics {
                contrast: 300.0,
                correlation: 0.7,
            }),
            laplacian: Some(LaplacianMetrics { variance: 800.0 }),
            kmeans_clustering: vec![KMeansClustering {
                id: 0,
                image_id: id,
                num_clusters: 2,
                clusters: vec![
                    Cluster {
                        cluster_index: 0,
                        r: 200,
                        g: 30,
                        b: 40,
                        l: 45.0,
                        a: 65.0,
                        b_channel: 5.7,
                        c: 65.0,
                        h: 5.0,
                        count: 600,
                        percentage: 60.0,
                        ..Default::default()
                    },
                    Cluster {
                        cluster_index: 1,
                        r: 30,
                        g: 60,
                        b: 200,
                        l: 30.0,
                        a: 20.0,
                        b_channel: -60.0,
                        c: 63.0,
                        h: 250.0,
                        count: 400,
                        percentage: 40.0,
                        ..Default::default()
                    },
                ],
            }],
        }
    }
}
