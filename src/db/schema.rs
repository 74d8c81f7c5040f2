pub const SCHEMA: &str = r#"
-- Posts: the social post an image was published in
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY,
    shortcode TEXT NOT NULL,
    username TEXT NOT NULL,
    caption TEXT,
    post_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_username ON posts(username);
CREATE INDEX IF NOT EXISTS idx_posts_post_date ON posts(post_date);

-- Images: one row per photograph
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY,
    absolute_file_path TEXT NOT NULL,
    relative_file_path TEXT NOT NULL,
    filename TEXT NOT NULL,
    post_id INTEGER NOT NULL,
    processed_at TEXT,
    width INTEGER,
    height INTEGER,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_images_post ON images(post_id);

-- One-to-one metric relations
CREATE TABLE IF NOT EXISTS luminance (
    image_id INTEGER PRIMARY KEY,
    mean_luminance REAL NOT NULL,
    median_luminance REAL NOT NULL,
    std_luminance REAL NOT NULL,
    dynamic_range REAL NOT NULL,
    rms_contrast REAL NOT NULL,
    michelson_contrast REAL NOT NULL,
    luminance_skewness REAL NOT NULL,
    luminance_kurtosis REAL NOT NULL,
    min_luminance REAL NOT NULL,
    max_luminance REAL NOT NULL,
    histogram TEXT,  -- JSON
    FOREIGN KEY (image_id) REFERENCES images(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS saturation (
    image_id INTEGER PRIMARY KEY,
    mean_saturation REAL NOT NULL,
    median_saturation REAL NOT NULL,
    std_saturation REAL NOT NULL,
    FOREIGN KEY (image_id) REFERENCES images(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS glcm (
    image_id INTEGER PRIMARY KEY,
    contrast REAL NOT NULL,
    correlation REAL NOT NULL,
    FOREIGN KEY (image_id) REFERENCES images(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS laplacian (
    image_id INTEGER PRIMARY KEY,
    variance REAL NOT NULL,
    FOREIGN KEY (image_id) REFERENCES images(id) ON DELETE CASCADE
);

-- Color clustering: one result per image, many weighted clusters per result
CREATE TABLE IF NOT EXISTS kmeans_clustering (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL,
    num_clusters INTEGER NOT NULL,
    FOREIGN KEY (image_id) REFERENCES images(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_kmeans_image ON kmeans_clustering(image_id);

CREATE TABLE IF NOT EXISTS clusters (
    clustering_id INTEGER NOT NULL,
    cluster_index INTEGER NOT NULL,
    r INTEGER NOT NULL,
    g INTEGER NOT NULL,
    b INTEGER NOT NULL,
    l REAL NOT NULL,
    a REAL NOT NULL,
    b_channel REAL NOT NULL,
    c REAL NOT NULL,
    h REAL NOT NULL,
    count INTEGER NOT NULL,
    percentage REAL NOT NULL,
    PRIMARY KEY (clustering_id, cluster_index),
    FOREIGN KEY (clustering_id) REFERENCES kmeans_clustering(id) ON DELETE CASCADE
);
"#;
