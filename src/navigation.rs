//! Navigation history across collections (used when following DBRefs).

use crate::models::{CollectionRef, QueryOptions};

/// One visited collection together with the query that was run on it.
#[derive(Debug, Clone, PartialEq)]
pub struct WayPoint {
    pub collection: CollectionRef,
    pub query_options: QueryOptions,
}

impl WayPoint {
    pub fn label(&self) -> &str {
        &self.collection.collection
    }
}

/// A history stack that always keeps the collection the panel was opened on.
#[derive(Debug, Clone)]
pub struct Navigation {
    way_points: Vec<WayPoint>,
}

impl Navigation {
    pub fn new(collection: CollectionRef, query_options: QueryOptions) -> Self {
        Self { way_points: vec![WayPoint { collection, query_options }] }
    }

    pub fn current(&self) -> &WayPoint {
        // never empty: `move_backward` keeps the first way point
        &self.way_points[self.way_points.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut WayPoint {
        let last = self.way_points.len() - 1;
        &mut self.way_points[last]
    }

    pub fn add_way_point(&mut self, collection: CollectionRef, query_options: QueryOptions) {
        self.way_points.push(WayPoint { collection, query_options });
    }

    /// Go back one step. Returns false when already at the first way point.
    pub fn move_backward(&mut self) -> bool {
        if self.way_points.len() <= 1 {
            return false;
        }
        self.way_points.pop();
        true
    }

    pub fn has_history(&self) -> bool {
        self.way_points.len() > 1
    }

    pub fn way_points(&self) -> &[WayPoint] {
        &self.way_points
    }
}
