//! URL query string <-> [`FilterModel`].
//!
//! Decoding never fails: malformed numbers fall back to defaults and
//! unknown `_min`/`_max` keys are dropped. Encoding is canonical, so the
//! same model always produces the same string regardless of the order keys
//! arrived in.

use std::collections::HashMap;

use crate::filter::{
    ColorChannel, ColorRange, Filter, FilterModel, Metric, Range, SortOrder, DEFAULT_SORT_KEY,
};

const MIN_SUFFIX: &str = "_min";
const MAX_SUFFIX: &str = "_max";

/// Decode a raw query string (with or without the leading `?`).
pub fn decode(query: &str) -> FilterModel {
    let query = query.strip_prefix('?').unwrap_or(query);
    decode_pairs(form_urlencoded::parse(query.as_bytes()))
}

/// Decode already-split key/value pairs. The first occurrence of a key wins.
pub fn decode_pairs<I, K, V>(pairs: I) -> FilterModel
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in pairs {
        params
            .entry(key.as_ref().to_string())
            .or_insert_with(|| value.as_ref().to_string());
    }

    let mut model = FilterModel::new();

    model.page = params
        .get("page")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    model.page_size = params
        .get("pageSize")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|s| *s > 0);
    model.sort_key = params
        .get("sortKey")
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SORT_KEY)
        .to_string();
    model.sort_order = params
        .get("sortOrder")
        .and_then(|v| SortOrder::parse(v))
        .unwrap_or_default();

    if let Some(artist) = params.get("artist").filter(|a| !a.is_empty()) {
        model.apply(Filter::Artist(artist.clone()));
    }
    if let Some(id) = params.get("postId").and_then(|v| v.trim().parse::<i64>().ok()) {
        model.apply(Filter::PostId(id));
    }

    let mut color = ColorRange::default();
    for channel in ColorChannel::ALL {
        color.set_channel(channel, read_range(&params, channel.key(), channel.default_range()));
    }
    // Default color ranges are dropped by the model itself
    model.apply(Filter::ColorRange(color));

    for metric in Metric::all() {
        let has_min = params.contains_key(&min_key(metric.name()));
        let has_max = params.contains_key(&max_key(metric.name()));
        if has_min || has_max {
            let range = read_range(&params, metric.name(), metric.default_range());
            model.apply(Filter::MetricRange(metric, range));
        }
    }

    for key in params.keys() {
        if let Some(base) = range_base(key) {
            if ColorChannel::from_key(base).is_none() && Metric::lookup(base).is_none() {
                tracing::debug!(param = %key, "Dropping unroutable metric filter");
            }
        }
    }

    model
}

/// Encode a model as a canonical query string.
pub fn encode(model: &FilterModel) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in encode_pairs(model) {
        serializer.append_pair(&key, &value);
    }
    serializer.finish()
}

/// Encode a model as ordered key/value pairs.
///
/// Order: paging, sorting, artist, post, the full color block, then metric
/// ranges in catalog order.
pub fn encode_pairs(model: &FilterModel) -> Vec<(String, String)> {
    let mut pairs = vec![("page".to_string(), model.page.to_string())];
    if let Some(size) = model.page_size {
        pairs.push(("pageSize".to_string(), size.to_string()));
    }
    pairs.push(("sortKey".to_string(), model.sort_key.clone()));
    pairs.push(("sortOrder".to_string(), model.sort_order.as_str().to_string()));

    for filter in model.filters() {
        match filter {
            Filter::Artist(artist) => pairs.push(("artist".to_string(), artist)),
            Filter::PostId(id) => pairs.push(("postId".to_string(), id.to_string())),
            Filter::ColorRange(color) => {
                for channel in ColorChannel::ALL {
                    push_range(&mut pairs, channel.key(), color.channel(channel));
                }
            }
            Filter::MetricRange(metric, range) => push_range(&mut pairs, metric.name(), range),
        }
    }
    pairs
}

fn push_range(pairs: &mut Vec<(String, String)>, base: &str, range: Range) {
    pairs.push((min_key(base), format_number(range.min)));
    pairs.push((max_key(base), format_number(range.max)));
}

fn read_range(params: &HashMap<String, String>, base: &str, default: Range) -> Range {
    Range::new(
        read_number(params, &min_key(base)).unwrap_or(default.min),
        read_number(params, &max_key(base)).unwrap_or(default.max),
    )
}

fn read_number(params: &HashMap<String, String>, key: &str) -> Option<f64> {
    params
        .get(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Shortest decimal form that parses back to the same value.
fn format_number(value: f64) -> String {
    value.to_string()
}

fn min_key(base: &str) -> String {
    format!("{base}{MIN_SUFFIX}")
}

fn max_key(base: &str) -> String {
    format!("{base}{MAX_SUFFIX}")
}

fn range_base(key: &str) -> Option<&str> {
    key.strip_suffix(MIN_SUFFIX)
        .or_else(|| key.strip_suffix(MAX_SUFFIX))
        .filter(|base| !base.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(name: &str) -> Metric {
        Metric::lookup(name).unwrap()
    }

    #[test]
    fn test_decode_defaults() {
        let model = decode("");
        assert_eq!(model, FilterModel::new());
        assert_eq!(model.page, 1);
        assert_eq!(model.sort_key, "post;post_date");
        assert_eq!(model.sort_order, SortOrder::Descending);
        assert!(model.is_unfiltered());
    }

    #[test]
    fn test_decode_full_query() {
        let model = decode(
            "?page=3&pageSize=20&sortKey=Luminance%3Bmean_luminance&sortOrder=asc\
             &artist=jane%20doe&postId=42&h_min=350&h_max=10\
             &mean_luminance_min=20&mean_luminance_max=80",
        );
        assert_eq!(model.page, 3);
        assert_eq!(model.page_size, Some(20));
        assert_eq!(model.sort_key, "Luminance;mean_luminance");
        assert_eq!(model.sort_order, SortOrder::Ascending);
        assert_eq!(model.artist.as_deref(), Some("jane doe"));
        assert_eq!(model.post_id, Some(42));

        let color = model.color_range().unwrap();
        assert_eq!(color.hue, Range::new(350.0, 10.0));
        assert_eq!(color.lightness, Range::new(0.0, 100.0));

        assert_eq!(model.metric_range(metric("mean_luminance")), Some(Range::new(20.0, 80.0)));
    }

    #[test]
    fn test_color_block_needs_one_non_default_value() {
        let model = decode("l_min=0&l_max=100&c_min=0&c_max=100&h_min=0&h_max=360&percentage_min=0&percentage_max=100");
        assert!(model.color_range().is_none());

        let model = decode("percentage_min=5");
        assert_eq!(model.color_range().unwrap().cluster_percentage, Range::new(5.0, 100.0));
    }

    #[test]
    fn test_malformed_numbers_fall_back_to_defaults() {
        let model = decode("page=abc&pageSize=0&l_min=dark&mean_luminance_min=bright&mean_luminance_max=60");
        assert_eq!(model.page, 1);
        assert_eq!(model.page_size, None);
        assert!(model.color_range().is_none());
        assert_eq!(model.metric_range(metric("mean_luminance")), Some(Range::new(0.0, 60.0)));

        let model = decode("std_luminance_min=NaN");
        assert!(model.is_unfiltered());
    }

    #[test]
    fn test_lone_bound_is_completed_with_default() {
        let model = decode("variance_min=300");
        assert_eq!(model.metric_range(metric("variance")), Some(Range::new(300.0, 2500.0)));
    }

    #[test]
    fn test_unroutable_metric_is_dropped() {
        let model = decode("foo_min=5&foo_max=9");
        assert!(model.is_unfiltered());
        assert_eq!(encode(&model), "page=1&sortKey=post%3Bpost_date&sortOrder=desc");
    }

    #[test]
    fn test_unknown_sort_order_uses_default() {
        assert_eq!(decode("sortOrder=up").sort_order, SortOrder::Descending);
    }

    #[test]
    fn test_default_range_is_not_encoded() {
        let mut model = FilterModel::new();
        model.set_metric_range("mean_luminance", Range::new(0.0, 100.0));
        let query = encode(&model);
        assert!(!query.contains("mean_luminance_min"));
        assert!(!query.contains("mean_luminance_max"));
    }

    #[test]
    fn test_color_range_emits_all_eight_keys() {
        let mut color = ColorRange::default();
        color.chroma = Range::new(20.0, 100.0);
        let model = FilterModel::new().with(Filter::ColorRange(color));

        let keys: Vec<String> = encode_pairs(&model).into_iter().map(|(k, _)| k).collect();
        for key in [
            "l_min", "l_max", "c_min", "c_max", "h_min", "h_max", "percentage_min", "percentage_max",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
    }

    #[test]
    fn test_round_trip() {
        let mut color = ColorRange::default();
        color.hue = Range::new(350.0, 10.0);
        color.lightness = Range::new(12.5, 90.0);
        let mut base = FilterModel::new();
        base.sort_key = "GLCM;contrast".to_string();
        base.sort_order = SortOrder::Ascending;
        base.page = 4;
        base.page_size = Some(25);
        let model = base
            .with(Filter::Artist("Søren & Co".into()))
            .with(Filter::PostId(9))
            .with(Filter::ColorRange(color))
            .with(Filter::metric("mean_luminance", Range::new(20.0, 80.0)).unwrap())
            .with(Filter::metric("std_luminance", Range::new(0.1, 12.0)).unwrap())
            .with(Filter::metric("luminance_skewness", Range::new(-3.25, 15.0)).unwrap())
            .with(Filter::metric("correlation", Range::new(0.3, 0.9)).unwrap());

        assert_eq!(decode(&encode(&model)), model);
    }

    #[test]
    fn test_encoding_is_canonical() {
        let a = decode("std_luminance_min=3&artist=x&mean_luminance_max=70&page=2&h_max=20");
        let b = decode("page=2&h_max=20&mean_luminance_max=70&artist=x&std_luminance_min=3");
        assert_eq!(encode(&a), encode(&b));
        assert_eq!(
            encode(&a),
            "page=2&sortKey=post%3Bpost_date&sortOrder=desc&artist=x\
             &l_min=0&l_max=100&c_min=0&c_max=100&h_min=0&h_max=20&percentage_min=0&percentage_max=100\
             &mean_luminance_min=0&mean_luminance_max=70&std_luminance_min=3&std_luminance_max=50"
        );
    }
}
