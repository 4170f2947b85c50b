use crate::core::float::KFloat;
use ndarray::ArrayView1;
use ndarray_stats::DeviationExt;

/// Trait defining the interface for distance metrics
pub trait DistanceMetric<F: KFloat>: Send + Sync {
    /// Computes the distance between two points. Panics if the points have different dimensions.
    fn compute(&self, point1: &ArrayView1<F>, point2: &ArrayView1<F>) -> F;
}

/// [Euclidean Distance](https://en.wikipedia.org/wiki/Euclidean_distance)
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl<F: KFloat> DistanceMetric<F> for EuclideanDistance {
    #[inline]
    fn compute(&self, point1: &ArrayView1<F>, point2: &ArrayView1<F>) -> F {
        SquaredEuclideanDistance.compute(point1, point2).sqrt()
    }
}

/// Squared Euclidean distance, the per-record term of the sum of squared error.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclideanDistance;

impl<F: KFloat> DistanceMetric<F> for SquaredEuclideanDistance {
    #[inline]
    fn compute(&self, point1: &ArrayView1<F>, point2: &ArrayView1<F>) -> F {
        point1
            .sq_l2_dist(point2)
            .expect("points must share the same dimensionality")
    }
}
