//! Light environment seen by individuals within a patch.
//!
//! A patch rebuilds its [`Canopy`] from every resident's height and
//! leaf area whenever the state vector is unpacked, then hands the
//! resulting [`Environment`] to each individual so that derived
//! physiological quantities can be recomputed against the current
//! shading.

/// Cumulative leaf area profile of a patch, tallest first.
#[derive(Clone, Debug, PartialEq)]
pub struct Canopy {
    /// Heights in descending order.
    heights: Vec<f64>,
    /// `cumulative[k]` is the leaf area of the `k` tallest layers.
    cumulative: Vec<f64>,
    /// Sort buffer for `rebuild`.
    scratch: Vec<(f64, f64)>,
}

impl Canopy {
    /// An empty canopy (full light everywhere).
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            cumulative: vec![0.0],
            scratch: Vec::new(),
        }
    }

    /// Rebuild the profile from `(height, leaf_area)` pairs.
    ///
    /// Reuses the existing allocations; input order does not matter.
    pub fn rebuild<I>(&mut self, layers: I)
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        self.scratch.clear();
        self.scratch.extend(layers);
        self.scratch.sort_by(|a, b| b.0.total_cmp(&a.0));

        self.heights.clear();
        self.cumulative.clear();
        self.cumulative.push(0.0);
        let mut total = 0.0;
        for &(height, leaf_area) in &self.scratch {
            total += leaf_area;
            self.heights.push(height);
            self.cumulative.push(total);
        }
    }

    /// Leaf area held strictly above `height`.
    pub fn leaf_area_above(&self, height: f64) -> f64 {
        let taller = self.heights.partition_point(|&h| h > height);
        self.cumulative[taller]
    }

    /// Total leaf area in the patch.
    pub fn total_leaf_area(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Number of layers (individuals) in the profile.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Whether the canopy holds no layers.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

impl Default for Canopy {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything an individual may read when recomputing its rates.
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    /// Time since the patch was last disturbed.
    pub patch_age: f64,
    /// Light extinction coefficient applied to leaf area above a height.
    pub light_extinction: f64,
    /// Leaf area profile of the patch.
    pub canopy: Canopy,
}

impl Environment {
    /// An empty, freshly disturbed environment.
    pub fn new(light_extinction: f64) -> Self {
        Self {
            patch_age: 0.0,
            light_extinction,
            canopy: Canopy::new(),
        }
    }

    /// Fraction of full light reaching `height`, in `(0, 1]`.
    pub fn canopy_openness(&self, height: f64) -> f64 {
        (-self.light_extinction * self.canopy.leaf_area_above(height)).exp()
    }
}
