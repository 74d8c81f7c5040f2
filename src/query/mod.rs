//! Compile a [`FilterModel`] and sort specification into a store query.

pub mod order;
pub mod predicate;

pub use order::{OrderSpec, SortTarget};
pub use predicate::{Bounds, ClusterCondition, HueSet, ImagePredicate, RelationCondition};

use crate::filter::{ColorRange, Filter, FilterModel, SortOrder};

/// Predicate plus ordering, ready for an [`ImageStore`](crate::db::ImageStore).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub predicate: ImagePredicate,
    pub order: OrderSpec,
}

/// Compile filters and an explicit sort specification. Never fails:
/// unknown metrics were already dropped by the model, and an unresolvable
/// sort key falls back to the default order.
pub fn compile(model: &FilterModel, sort_key: &str, sort_order: SortOrder) -> CompiledQuery {
    CompiledQuery {
        predicate: compile_predicate(model),
        order: OrderSpec::parse(sort_key, sort_order),
    }
}

/// Compile using the sort key and order carried by the model.
pub fn compile_model(model: &FilterModel) -> CompiledQuery {
    compile(model, &model.sort_key, model.sort_order)
}

pub fn compile_predicate(model: &FilterModel) -> ImagePredicate {
    let mut predicate = ImagePredicate::default();

    for filter in model.filters() {
        match filter {
            Filter::Artist(artist) => predicate.artist = Some(artist),
            Filter::PostId(id) => predicate.post_id = Some(id),
            Filter::ColorRange(color) => predicate.clusters = Some(cluster_condition(&color)),
            Filter::MetricRange(metric, range) => {
                if range == metric.default_range() {
                    continue;
                }
                // Several metrics can share a relation; merge, never replace
                predicate
                    .relation_mut(metric.relation())
                    .constrain(metric, Bounds::within(range));
            }
        }
    }

    tracing::debug!(?predicate, "Compiled image predicate");
    predicate
}

fn cluster_condition(color: &ColorRange) -> ClusterCondition {
    ClusterCondition {
        lightness: Bounds::within(color.lightness),
        chroma: Bounds::within(color.chroma),
        hue: HueSet::from_range(color.hue),
        percentage: Bounds::within(color.cluster_percentage),
    }
}
