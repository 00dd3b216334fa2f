//! # Distribute Module
//!
//! Repositions existing objects instead of creating new ones.
//!
//! - Even distribution along one axis: objects are sorted by their leading
//!   edge and each is placed a fixed gap after its predecessor, edge to edge
//!   or center to center.
//! - Random distribution inside a region or container outline, with a
//!   bounded number of attempts per object. Objects that find no free spot
//!   stay where they are and are reported back.

use crate::host::{BatchScope, ContainmentChecker, ContainmentTest, FallbackPolicy, HostSession, ShapeHandle, ShapeOutline};
use crate::random::{rng_from_seed, uniform};
use crate::spatial_hash::SpatialHash;
use serde::{Deserialize, Serialize};
use stonepath_core::{Bounds, Point, Result};

const DISTRIBUTE_GROUP: &str = "Distribute";
const RANDOM_DISTRIBUTE_GROUP: &str = "Random Distribute";

/// Default attempts per object for random distribution
pub const DEFAULT_MAX_TRIES: usize = 500;

/// Axis for even distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistributeAxis {
    #[default]
    Horizontal,
    Vertical,
}

impl DistributeAxis {
    fn leading_edge(&self, b: &Bounds) -> f64 {
        match self {
            DistributeAxis::Horizontal => b.left,
            DistributeAxis::Vertical => b.bottom,
        }
    }

    fn trailing_edge(&self, b: &Bounds) -> f64 {
        match self {
            DistributeAxis::Horizontal => b.right,
            DistributeAxis::Vertical => b.top,
        }
    }

    fn center(&self, b: &Bounds) -> f64 {
        let c = b.center();
        match self {
            DistributeAxis::Horizontal => c.x,
            DistributeAxis::Vertical => c.y,
        }
    }

    fn shift(&self, delta: f64) -> (f64, f64) {
        match self {
            DistributeAxis::Horizontal => (delta, 0.0),
            DistributeAxis::Vertical => (0.0, delta),
        }
    }
}

/// Per-object offsets along `axis`, indexed like `bounds`.
///
/// The object with the smallest leading edge stays put. With `use_size`,
/// `gap` separates trailing and leading edges; otherwise it separates
/// centers.
pub fn even_distribution(bounds: &[Bounds], axis: DistributeAxis, gap: f64, use_size: bool) -> Vec<f64> {
    let mut order: Vec<usize> = (0..bounds.len()).collect();
    order.sort_by(|&a, &b| axis.leading_edge(&bounds[a]).total_cmp(&axis.leading_edge(&bounds[b])));

    let mut deltas = vec![0.0; bounds.len()];
    let mut previous: Option<Bounds> = None;
    for idx in order {
        let current = bounds[idx];
        let Some(prev) = previous else {
            previous = Some(current);
            continue;
        };
        let delta = if use_size {
            axis.trailing_edge(&prev) + gap - axis.leading_edge(&current)
        } else {
            axis.center(&prev) + gap - axis.center(&current)
        };
        deltas[idx] = delta;
        let (dx, dy) = axis.shift(delta);
        previous = Some(current.translated(dx, dy));
    }
    deltas
}

/// Evenly distribute `shapes` along `axis`. Returns the number of shapes
/// moved; shapes that cannot be read or moved are skipped.
pub fn distribute_evenly<S, H>(
    shapes: &mut [S],
    host: &mut H,
    axis: DistributeAxis,
    gap: f64,
    use_size: bool,
) -> Result<usize>
where
    S: ShapeHandle,
    H: HostSession + ?Sized,
{
    if shapes.len() < 2 {
        return Ok(0);
    }
    let bounds = shapes.iter().map(|s| s.bounds()).collect::<std::result::Result<Vec<_>, _>>()?;
    let deltas = even_distribution(&bounds, axis, gap, use_size);

    let _scope = BatchScope::enter(host, DISTRIBUTE_GROUP);
    let mut moved = 0;
    for (shape, delta) in shapes.iter_mut().zip(deltas) {
        if delta == 0.0 {
            continue;
        }
        let (dx, dy) = axis.shift(delta);
        match shape.move_by(dx, dy) {
            Ok(()) => moved += 1,
            Err(err) => tracing::warn!("Could not move shape: {}", err),
        }
    }
    tracing::info!("Distributed {} shapes {:?}", shapes.len(), axis);
    Ok(moved)
}

/// Random distribution options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomDistributeParams {
    /// Minimum separation: between box edges with `use_element_size`,
    /// otherwise between centers
    pub gap: f64,
    pub use_element_size: bool,
    pub seed: Option<u64>,
    pub max_tries: usize,
    pub fallback: FallbackPolicy,
}

impl Default for RandomDistributeParams {
    fn default() -> Self {
        Self {
            gap: 0.0,
            use_element_size: true,
            seed: None,
            max_tries: DEFAULT_MAX_TRIES,
            fallback: FallbackPolicy::default(),
        }
    }
}

/// Result of a random distribution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomDistribution {
    /// New center per object; `None` for unplaced objects
    pub targets: Vec<Option<Point>>,
    /// Containment failures resolved by the fallback policy
    pub containment_fallbacks: usize,
}

impl RandomDistribution {
    /// Indices of objects that found no free spot
    pub fn unplaced(&self) -> Vec<usize> {
        self.targets
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.is_none().then_some(i))
            .collect()
    }

    pub fn placed_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_some()).count()
    }
}

fn boxes_conflict(a: &Bounds, b: &Bounds, gap: f64) -> bool {
    let (ca, cb) = (a.center(), b.center());
    (ca.x - cb.x).abs() < (a.width() + b.width()) / 2.0 + gap
        && (ca.y - cb.y).abs() < (a.height() + b.height()) / 2.0 + gap
}

/// New centers for objects of the given `sizes` inside `region`.
///
/// Candidate centers keep each box within the region bounds where it fits,
/// must pass `container` when given, and keep `params.gap` from every object
/// placed before.
pub fn random_distribution(
    sizes: &[Bounds],
    region: &Bounds,
    container: Option<&dyn ContainmentTest>,
    params: &RandomDistributeParams,
) -> RandomDistribution {
    let mut rng = rng_from_seed(params.seed);
    let checker = ContainmentChecker::new(container, params.fallback);
    let gap = params.gap.max(0.0);

    let max_dim = sizes.iter().map(Bounds::max_dimension).fold(0.0_f64, f64::max);
    let reach = if params.use_element_size { max_dim + gap } else { gap };
    let mut hash = SpatialHash::new(reach.max(1.0));
    let mut placed: Vec<Bounds> = Vec::with_capacity(sizes.len());

    let mut targets = Vec::with_capacity(sizes.len());
    for size in sizes {
        let (hw, hh) = (size.width() / 2.0, size.height() / 2.0);
        let mut target = None;

        for _ in 0..params.max_tries {
            let x = uniform(&mut rng, region.left + hw, region.right - hw);
            let y = uniform(&mut rng, region.bottom + hh, region.top - hh);
            if !checker.contains(x, y) {
                continue;
            }
            let candidate = Bounds::new(x - hw, y - hh, x + hw, y + hh);
            let blocked = hash.neighbors(x, y).any(|k| {
                let other = &placed[k];
                if params.use_element_size {
                    boxes_conflict(&candidate, other, gap)
                } else {
                    candidate.center().distance_to(&other.center()) < gap
                }
            });
            if blocked {
                continue;
            }
            hash.insert(x, y, placed.len());
            placed.push(candidate);
            target = Some(Point::new(x, y));
            break;
        }
        targets.push(target);
    }

    let result = RandomDistribution {
        targets,
        containment_fallbacks: checker.fallback_count(),
    };
    let unplaced = result.unplaced();
    if !unplaced.is_empty() {
        tracing::warn!(
            "Random distribute could not place {} of {} objects after {} tries each",
            unplaced.len(),
            sizes.len(),
            params.max_tries
        );
    }
    result
}

/// Randomly distribute `shapes` inside `container`'s outline, or inside the
/// union of their own bounds when no container is given.
pub fn distribute_randomly<S, H>(
    shapes: &mut [S],
    host: &mut H,
    container: Option<&S>,
    params: &RandomDistributeParams,
) -> Result<RandomDistribution>
where
    S: ShapeHandle,
    H: HostSession + ?Sized,
{
    let bounds = shapes.iter().map(|s| s.bounds()).collect::<std::result::Result<Vec<_>, _>>()?;
    let outline = container.map(ShapeOutline);
    let region = match container {
        Some(c) => c.bounds()?,
        None => match bounds.iter().copied().reduce(|a, b| a.union(&b)) {
            Some(region) => region,
            None => return Ok(RandomDistribution::default()),
        },
    };

    let result = random_distribution(
        &bounds,
        &region,
        outline.as_ref().map(|o| o as &dyn ContainmentTest),
        params,
    );

    let _scope = BatchScope::enter(host, RANDOM_DISTRIBUTE_GROUP);
    for ((shape, b), target) in shapes.iter_mut().zip(&bounds).zip(&result.targets) {
        let Some(target) = target else { continue };
        let c = b.center();
        if let Err(err) = shape.move_by(target.x - c.x, target.y - c.y) {
            tracing::warn!("Could not move shape: {}", err);
        }
    }
    tracing::info!("Randomly distributed {} of {} shapes", result.placed_count(), shapes.len());
    Ok(result)
}
