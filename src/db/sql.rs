//! Render compiled predicates and orderings as parameterised SQLite.
//!
//! Column and table names only ever come from the metric catalog and the
//! sort whitelist; every user-supplied value is bound as a parameter.

use rusqlite::types::Value;

use crate::filter::{ColorChannel, Relation, SortOrder};
use crate::query::{Bounds, ClusterCondition, HueSet, ImagePredicate, OrderSpec, SortTarget};

/// Joins shared by the page query and the count query, so both see the
/// same rows.
pub(crate) fn from_clause() -> String {
    let mut sql = String::from("FROM images i\nJOIN posts p ON p.id = i.post_id");
    for relation in Relation::ALL {
        sql.push_str(&format!(
            "\nLEFT JOIN {table} {alias} ON {alias}.image_id = i.id",
            table = relation.table(),
            alias = relation.alias(),
        ));
    }
    sql
}

/// Column list for listing rows. Relation columns are aliased
/// `<alias>_<column>` so rows can be read by name.
pub(crate) fn select_columns() -> String {
    let mut columns = vec![
        "i.id AS image_id".to_string(),
        "i.absolute_file_path".to_string(),
        "i.relative_file_path".to_string(),
        "i.filename".to_string(),
        "i.post_id".to_string(),
        "i.processed_at".to_string(),
        "i.width".to_string(),
        "i.height".to_string(),
        "p.shortcode AS post_shortcode".to_string(),
        "p.username AS post_username".to_string(),
        "p.caption AS post_caption".to_string(),
        "p.post_date AS post_post_date".to_string(),
    ];
    for relation in Relation::ALL {
        let alias = relation.alias();
        columns.push(format!("{alias}.image_id AS {alias}_image_id"));
        for metric in relation.metrics() {
            columns.push(format!("{alias}.{name} AS {alias}_{name}", name = metric.name()));
        }
    }
    columns.push(format!("{a}.histogram AS {a}_histogram", a = Relation::Luminance.alias()));
    columns.join(", ")
}

/// A `WHERE` clause (empty when unconstrained) and its bound values.
#[derive(Debug, Default)]
pub(crate) struct SqlFilter {
    pub clause: String,
    pub params: Vec<Value>,
}

pub(crate) fn where_clause(predicate: &ImagePredicate) -> SqlFilter {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(artist) = &predicate.artist {
        conditions.push("p.username = ?".to_string());
        params.push(Value::Text(artist.clone()));
    }
    if let Some(post_id) = predicate.post_id {
        conditions.push("i.post_id = ?".to_string());
        params.push(Value::Integer(post_id));
    }
    if let Some(clusters) = &predicate.clusters {
        conditions.push(cluster_exists(clusters, &mut params));
    }
    for (relation, condition) in predicate.relations() {
        // LEFT JOINed relation: a missing row yields NULL and fails the comparison
        for (metric, bounds) in condition.fields() {
            let column = format!("{}.{}", relation.alias(), metric.name());
            push_bounds(&column, bounds, &mut conditions, &mut params);
        }
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join("\n  AND "))
    };
    SqlFilter { clause, params }
}

fn push_bounds(column: &str, bounds: &Bounds, conditions: &mut Vec<String>, params: &mut Vec<Value>) {
    if let Some(min) = bounds.gte {
        conditions.push(format!("{column} >= ?"));
        params.push(Value::Real(min));
    }
    if let Some(max) = bounds.lte {
        conditions.push(format!("{column} <= ?"));
        params.push(Value::Real(max));
    }
}

fn cluster_exists(condition: &ClusterCondition, params: &mut Vec<Value>) -> String {
    let mut conditions = vec!["k.image_id = i.id".to_string()];
    push_bounds(&cluster_column(ColorChannel::Lightness), &condition.lightness, &mut conditions, params);
    push_bounds(&cluster_column(ColorChannel::Chroma), &condition.chroma, &mut conditions, params);

    let hue = cluster_column(ColorChannel::Hue);
    match condition.hue {
        HueSet::Interval { min, max } => {
            conditions.push(format!("{hue} >= ? AND {hue} <= ?"));
            params.push(Value::Real(min));
            params.push(Value::Real(max));
        }
        HueSet::Wrapped { from, to } => {
            conditions.push(format!("(({hue} >= ? AND {hue} < 360) OR ({hue} >= 0 AND {hue} <= ?))"));
            params.push(Value::Real(from));
            params.push(Value::Real(to));
        }
    }

    push_bounds(&cluster_column(ColorChannel::Percentage), &condition.percentage, &mut conditions, params);

    format!(
        "EXISTS (SELECT 1 FROM kmeans_clustering k JOIN clusters c ON c.clustering_id = k.id WHERE {})",
        conditions.join(" AND ")
    )
}

fn cluster_column(channel: ColorChannel) -> String {
    format!("c.{}", channel.column())
}

/// `ORDER BY` for a single sort key. Ties fall back to image id so that
/// consecutive pages never overlap.
pub(crate) fn order_clause(order: &OrderSpec) -> String {
    let column = match order.target {
        SortTarget::Image(field) => format!("i.{field}"),
        SortTarget::Post(field) => format!("p.{field}"),
        SortTarget::Metric(metric) => format!("{}.{}", metric.relation().alias(), metric.name()),
    };
    let direction = match order.direction {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    };
    format!("ORDER BY {column} {direction}, i.id ASC")
}
