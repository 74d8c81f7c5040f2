//! SQLite backend implementation.

use anyhow::Result;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;

use super::records::{
    Cluster, GlcmMetrics, ImageRecord, KMeansClustering, LaplacianMetrics, LuminanceMetrics, Post,
    SaturationMetrics,
};
use super::schema::SCHEMA;
use super::sql::{from_clause, order_clause, select_columns, where_clause};
use super::ImageStore;
use crate::query::{ImagePredicate, OrderSpec};

pub struct SqliteDb {
    pub(crate) conn: Connection,
}

impl SqliteDb {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ========================================================================
    // Listing
    // ========================================================================

    pub fn fetch_images(
        &self,
        predicate: &ImagePredicate,
        order: &OrderSpec,
        skip: u64,
        take: u64,
    ) -> Result<Vec<ImageRecord>> {
        fetch_images(&self.conn, predicate, order, skip, take)
    }

    pub fn count_images(&self, predicate: &ImagePredicate) -> Result<u64> {
        count_images(&self.conn, predicate)
    }

    pub fn get_image(&self, id: i64) -> Result<Option<ImageRecord>> {
        let sql = format!("SELECT {} {} WHERE i.id = ?", select_columns(), from_clause());
        let image = self
            .conn
            .query_row(&sql, [id], read_image)
            .optional()?;
        match image {
            Some(mut image) => {
                image.kmeans_clustering = load_clusterings(&self.conn, image.id)?;
                Ok(Some(image))
            }
            None => Ok(None),
        }
    }

    pub fn distinct_artists(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT p.username
            FROM posts p
            JOIN images i ON i.post_id = p.id
            ORDER BY p.username
            "#,
        )?;
        let artists = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(artists)
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    pub fn insert_post(&self, post: &Post) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO posts (id, shortcode, username, caption, post_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![post.id, post.shortcode, post.username, post.caption, post.post_date],
        )?;
        Ok(())
    }

    /// Store an image with every embedded relation. The owning post must
    /// already exist. Clustering ids are assigned by the database.
    pub fn insert_image(&self, image: &ImageRecord) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        let processed_at = image
            .processed_at
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
        tx.execute(
            r#"
            INSERT INTO images (id, absolute_file_path, relative_file_path, filename, post_id, processed_at, width, height)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                image.id,
                image.absolute_file_path,
                image.relative_file_path,
                image.filename,
                image.post_id,
                processed_at,
                image.width,
                image.height,
            ],
        )?;

        if let Some(l) = &image.luminance {
            let histogram = l.histogram.as_ref().map(serde_json::to_string).transpose()?;
            tx.execute(
                r#"
                INSERT INTO luminance (image_id, mean_luminance, median_luminance, std_luminance,
                    dynamic_range, rms_contrast, michelson_contrast, luminance_skewness,
                    luminance_kurtosis, min_luminance, max_luminance, histogram)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    image.id,
                    l.mean_luminance,
                    l.median_luminance,
                    l.std_luminance,
                    l.dynamic_range,
                    l.rms_contrast,
                    l.michelson_contrast,
                    l.luminance_skewness,
                    l.luminance_kurtosis,
                    l.min_luminance,
                    l.max_luminance,
                    histogram,
                ],
            )?;
        }
        if let Some(s) = &image.saturation {
            tx.execute(
                "INSERT INTO saturation (image_id, mean_saturation, median_saturation, std_saturation) VALUES (?, ?, ?, ?)",
                params![image.id, s.mean_saturation, s.median_saturation, s.std_saturation],
            )?;
        }
        if let Some(g) = &image.glcm {
            tx.execute(
                "INSERT INTO glcm (image_id, contrast, correlation) VALUES (?, ?, ?)",
                params![image.id, g.contrast, g.correlation],
            )?;
        }
        if let Some(lap) = &image.laplacian {
            tx.execute(
                "INSERT INTO laplacian (image_id, variance) VALUES (?, ?)",
                params![image.id, lap.variance],
            )?;
        }

        for clustering in &image.kmeans_clustering {
            tx.execute(
                "INSERT INTO kmeans_clustering (image_id, num_clusters) VALUES (?, ?)",
                params![image.id, clustering.num_clusters],
            )?;
            let clustering_id = tx.last_insert_rowid();
            for c in &clustering.clusters {
                tx.execute(
                    r#"
                    INSERT INTO clusters (clustering_id, cluster_index, r, g, b, l, a, b_channel, c, h, count, percentage)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                    params![
                        clustering_id,
                        c.cluster_index,
                        c.r,
                        c.g,
                        c.b,
                        c.l,
                        c.a,
                        c.b_channel,
                        c.c,
                        c.h,
                        c.count,
                        c.percentage,
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

impl ImageStore for SqliteDb {
    fn list_page(
        &self,
        predicate: &ImagePredicate,
        order: &OrderSpec,
        skip: u64,
        take: u64,
    ) -> Result<(Vec<ImageRecord>, u64)> {
        // One read transaction so the page and the count see the same snapshot
        let tx = self.conn.unchecked_transaction()?;
        let items = fetch_images(&tx, predicate, order, skip, take)?;
        let total = count_images(&tx, predicate)?;
        tx.commit()?;
        Ok((items, total))
    }

    fn distinct_artists(&self) -> Result<Vec<String>> {
        SqliteDb::distinct_artists(self)
    }

    fn get_image(&self, id: i64) -> Result<Option<ImageRecord>> {
        SqliteDb::get_image(self, id)
    }
}

fn fetch_images(
    conn: &Connection,
    predicate: &ImagePredicate,
    order: &OrderSpec,
    skip: u64,
    take: u64,
) -> Result<Vec<ImageRecord>> {
    let filter = where_clause(predicate);
    let sql = format!(
        "SELECT {}\n{}\n{}\n{}\nLIMIT {} OFFSET {}",
        select_columns(),
        from_clause(),
        filter.clause,
        order_clause(order),
        take.min(i64::MAX as u64),
        skip.min(i64::MAX as u64),
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut images = stmt
        .query_map(params_from_iter(filter.params.iter()), read_image)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for image in &mut images {
        image.kmeans_clustering = load_clusterings(conn, image.id)?;
    }
    Ok(images)
}

fn count_images(conn: &Connection, predicate: &ImagePredicate) -> Result<u64> {
    let filter = where_clause(predicate);
    let sql = format!("SELECT COUNT(*) {}\n{}", from_clause(), filter.clause);
    let count: i64 = conn.query_row(&sql, params_from_iter(filter.params.iter()), |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

fn load_clusterings(conn: &Connection, image_id: i64) -> Result<Vec<KMeansClustering>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, image_id, num_clusters FROM kmeans_clustering WHERE image_id = ? ORDER BY id",
    )?;
    let mut clusterings = stmt
        .query_map([image_id], |row| {
            Ok(KMeansClustering {
                id: row.get(0)?,
                image_id: row.get(1)?,
                num_clusters: row.get(2)?,
                clusters: Vec::new(),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare_cached(
        r#"
        SELECT clustering_id, cluster_index, r, g, b, l, a, b_channel, c, h, count, percentage
        FROM clusters
        WHERE clustering_id = ?
        ORDER BY cluster_index
        "#,
    )?;
    for clustering in &mut clusterings {
        clustering.clusters = stmt
            .query_map([clustering.id], |row| {
                Ok(Cluster {
                    clustering_id: row.get(0)?,
                    cluster_index: row.get(1)?,
                    r: row.get(2)?,
                    g: row.get(3)?,
                    b: row.get(4)?,
                    l: row.get(5)?,
                    a: row.get(6)?,
                    b_channel: row.get(7)?,
                    c: row.get(8)?,
                    h: row.get(9)?,
                    count: row.get(10)?,
                    percentage: row.get(11)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
    }
    Ok(clusterings)
}

/// Map one listing row (see `select_columns`). Clusterings are loaded
/// separately.
fn read_image(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    let post_id: i64 = row.get("post_id")?;

    let luminance = if row.get::<_, Option<i64>>("lum_image_id")?.is_some() {
        let histogram: Option<String> = row.get("lum_histogram")?;
        Some(LuminanceMetrics {
            mean_luminance: row.get("lum_mean_luminance")?,
            median_luminance: row.get("lum_median_luminance")?,
            std_luminance: row.get("lum_std_luminance")?,
            dynamic_range: row.get("lum_dynamic_range")?,
            rms_contrast: row.get("lum_rms_contrast")?,
            michelson_contrast: row.get("lum_michelson_contrast")?,
            luminance_skewness: row.get("lum_luminance_skewness")?,
            luminance_kurtosis: row.get("lum_luminance_kurtosis")?,
            min_luminance: row.get("lum_min_luminance")?,
            max_luminance: row.get("lum_max_luminance")?,
            // A corrupt histogram should not hide the image
            histogram: histogram.and_then(|h| serde_json::from_str(&h).ok()),
        })
    } else {
        None
    };

    let saturation = if row.get::<_, Option<i64>>("sat_image_id")?.is_some() {
        Some(SaturationMetrics {
            mean_saturation: row.get("sat_mean_saturation")?,
            median_saturation: row.get("sat_median_saturation")?,
            std_saturation: row.get("sat_std_saturation")?,
        })
    } else {
        None
    };

    let glcm = if row.get::<_, Option<i64>>("glcm_image_id")?.is_some() {
        Some(GlcmMetrics {
            contrast: row.get("glcm_contrast")?,
            correlation: row.get("glcm_correlation")?,
        })
    } else {
        None
    };

    let laplacian = if row.get::<_, Option<i64>>("lap_image_id")?.is_some() {
        Some(LaplacianMetrics {
            variance: row.get("lap_variance")?,
        })
    } else {
        None
    };

    Ok(ImageRecord {
        id: row.get("image_id")?,
        absolute_file_path: row.get("absolute_file_path")?,
        relative_file_path: row.get("relative_file_path")?,
        filename: row.get("filename")?,
        post_id,
        post: Post {
            id: post_id,
            shortcode: row.get("post_shortcode")?,
            username: row.get("post_username")?,
            caption: row.get("post_caption")?,
            post_date: row.get("post_post_date")?,
        },
        processed_at: row.get("processed_at")?,
        width: row.get("width")?,
        height: row.get("height")?,
        luminance,
        saturation,
        glcm,
        laplacian,
        kmeans_clustering: Vec::new(),
    })
}
