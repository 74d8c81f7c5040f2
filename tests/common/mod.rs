#![allow(dead_code)]

use gallerist::config::ListingConfig;
use gallerist::db::{
    Cluster, GlcmMetrics, ImageRecord, KMeansClustering, LaplacianMetrics, LuminanceMetrics, Post,
    SaturationMetrics,
};
use gallerist::{ListingService, SqliteDb};

pub const ARTISTS: [&str; 3] = ["ansel", "dorothea", "vivian"];

pub fn post(id: i64) -> Post {
    Post {
        id,
        shortcode: format!("p{id}"),
        username: ARTISTS[(id as usize) % ARTISTS.len()].to_string(),
        caption: None,
        post_date: format!("2023-{:02}-{:02}T09:00:00Z", (id % 12) + 1, (id % 28) + 1),
    }
}

/// Image `id` with metrics derived from the id so every filter dimension
/// spreads across the fixture set. Hue cycles through 355, 5, 180, 90.
pub fn image(id: i64, post_id: i64) -> ImageRecord {
    let hue = [355.0, 5.0, 180.0, 90.0][(id as usize) % 4];
    ImageRecord {
        id,
        absolute_file_path: format!("/srv/gallery/{id}.jpg"),
        relative_file_path: format!("{id}.jpg"),
        filename: format!("{id}.jpg"),
        post_id,
        post: post(post_id),
        processed_at: Some(format!("2024-03-01T00:00:{:02}Z", id % 60)),
        width: Some(1000 + id),
        height: Some(800),
        luminance: Some(LuminanceMetrics {
            mean_luminance: (id * 7 % 100) as f64,
            median_luminance: (id * 5 % 100) as f64,
            std_luminance: (id * 3 % 50) as f64,
            dynamic_range: 80.0,
            rms_contrast: 25.0,
            michelson_contrast: 0.8,
            luminance_skewness: 0.0,
            luminance_kurtosis: 2.0,
            min_luminance: 1.0,
            max_luminance: 99.0,
            histogram: None,
        }),
        saturation: Some(SaturationMetrics {
            mean_saturation: (id % 10) as f64 / 10.0,
            median_saturation: 0.3,
            std_saturation: 0.1,
        }),
        glcm: Some(GlcmMetrics {
            contrast: (id * 30) as f64,
            correlation: 0.5,
        }),
        laplacian: (id % 5 != 0).then(|| LaplacianMetrics {
            variance: (id * 40) as f64,
        }),
        kmeans_clustering: vec![KMeansClustering {
            id: 0,
            image_id: id,
            num_clusters: 1,
            clusters: vec![Cluster {
                cluster_index: 0,
                r: 120,
                g: 80,
                b: 60,
                l: 50.0,
                a: 10.0,
                b_channel: 10.0,
                c: 40.0,
                h: hue,
                count: 1000,
                percentage: 70.0,
                ..Default::default()
            }],
        }],
    }
}

/// A database with `count` images spread over `count / 2` posts.
pub fn seeded_db(count: i64) -> SqliteDb {
    let db = SqliteDb::open_in_memory().unwrap();
    db.initialize().unwrap();
    let posts = (count / 2).max(1);
    for id in 1..=posts {
        db.insert_post(&post(id)).unwrap();
    }
    for id in 1..=count {
        db.insert_image(&image(id, (id - 1) % posts + 1)).unwrap();
    }
    db
}

pub fn service(count: i64) -> ListingService<SqliteDb> {
    ListingService::new(seeded_db(count), ListingConfig::default())
}
