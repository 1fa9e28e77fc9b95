//! Decimation options

use serde::{Deserialize, Serialize};

/// Tuning knobs shared by every decimation algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimationOptions {
    /// Never collapse edges lying on an open border
    pub preserve_borders: bool,
    /// Never collapse vertices on a UV seam
    pub preserve_seams: bool,
    /// Never collapse vertices on a UV foldover
    pub preserve_foldovers: bool,
    /// Link coincident border vertices before decimating
    pub enable_smart_link: bool,
    /// Iteration cap for targeted decimation
    pub max_iteration_count: usize,
    /// Exponent of the error threshold schedule. Higher values remove
    /// triangles faster at the cost of quality.
    pub aggressiveness: f64,
    /// Squared distance under which border vertices are linked
    pub vertex_link_distance_sqr: f64,
    /// Keep decimating until at most this many vertices remain, in addition
    /// to reaching the triangle target
    pub max_vertex_count: Option<usize>,
}

impl Default for DecimationOptions {
    fn default() -> Self {
        Self {
            preserve_borders: false,
            preserve_seams: false,
            preserve_foldovers: false,
            enable_smart_link: true,
            max_iteration_count: 100,
            aggressiveness: 7.0,
            vertex_link_distance_sqr: f64::MIN_POSITIVE,
            max_vertex_count: None,
        }
    }
}

impl DecimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_preserve_borders(mut self, preserve: bool) -> Self {
        self.preserve_borders = preserve;
        self
    }

    #[must_use]
    pub fn with_preserve_seams(mut self, preserve: bool) -> Self {
        self.preserve_seams = preserve;
        self
    }

    #[must_use]
    pub fn with_preserve_foldovers(mut self, preserve: bool) -> Self {
        self.preserve_foldovers = preserve;
        self
    }

    #[must_use]
    pub fn with_smart_link(mut self, enable: bool) -> Self {
        self.enable_smart_link = enable;
        self
    }

    #[must_use]
    pub fn with_max_iteration_count(mut self, count: usize) -> Self {
        self.max_iteration_count = count;
        self
    }

    #[must_use]
    pub fn with_aggressiveness(mut self, aggressiveness: f64) -> Self {
        self.aggressiveness = aggressiveness;
        self
    }

    #[must_use]
    pub fn with_vertex_link_distance(mut self, distance: f64) -> Self {
        self.vertex_link_distance_sqr = distance * distance;
        self
    }

    /// Set a vertex budget. `0` means no budget.
    #[must_use]
    pub fn with_max_vertex_count(mut self, count: usize) -> Self {
        self.max_vertex_count = (count > 0).then_some(count);
        self
    }
}
