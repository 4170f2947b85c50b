use crate::clustering::params::{
    ClusteringParams, ConvergencePolicy, EmptyClusterPolicy, InitializationMethod,
};
use crate::clustering::result::{ClusteringResult, NonConvergenceWarning, Termination};
use crate::clustering::utils::compute_mean;
use crate::core::error::{KClusterError, KClusterResult};
use crate::core::float::KFloat;
use crate::dataset::Dataset;
use crate::distances::{DistanceMetric, EuclideanDistance};
use log::{debug, info, warn};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::SmallRng;
use rand::seq::IteratorRandom;
use rand::{rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Phase of a clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterState {
    /// No centroids yet.
    Initializing,
    /// Centroids are current; records must be (re)assigned.
    Assigning,
    /// Membership is current; centroids must be recomputed.
    Updating,
    /// The convergence criterion was met by the last assignment pass.
    Converged,
}

/// Totals accumulated by one assignment pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentStats<F> {
    pub points_changed: usize,
    pub sse: F,
}

/// Lloyd-style k-means over a normalized feature matrix.
///
/// Each iteration recomputes every centroid as the mean of its members and
/// then reassigns every record to its nearest centroid. Both passes run on the
/// rayon pool; per-record results are collected in record order and each
/// centroid sums its members in ascending index order, so the outcome does
/// not depend on the number of threads.
pub struct KMeansClustering<'a, F: KFloat> {
    data: ArrayView2<'a, F>,
    params: ClusteringParams,
    centroids: Array2<F>,
    membership: Vec<Option<usize>>,
    points_changed: usize,
    sse: F,
    iteration: usize,
    state: ClusterState,
}

impl<'a, F: KFloat> KMeansClustering<'a, F> {
    /// Creates a run over `data` (rows are records, already normalized).
    ///
    /// Fails with [`KClusterError::InvalidK`] when `k` is zero or larger than
    /// the number of records.
    pub fn new(params: ClusteringParams, data: ArrayView2<'a, F>) -> KClusterResult<Self> {
        params.validate()?;
        let n_points = data.nrows();
        if params.k == 0 || params.k > n_points {
            return Err(KClusterError::InvalidK {
                k: params.k,
                records: n_points,
            });
        }
        if data.ncols() == 0 {
            return Err(KClusterError::MalformedInput(
                "records have no numeric features".to_string(),
            ));
        }

        Ok(Self {
            data,
            centroids: Array2::zeros((params.k, data.ncols())),
            membership: vec![None; n_points],
            points_changed: 0,
            sse: F::zero(),
            iteration: 0,
            state: ClusterState::Initializing,
            params,
        })
    }

    /// Creates a run over the normalized features of `dataset`.
    pub fn for_dataset(params: ClusteringParams, dataset: &'a Dataset<F>) -> KClusterResult<Self> {
        Self::new(params, dataset.normalized())
    }

    pub fn params(&self) -> &ClusteringParams {
        &self.params
    }

    pub fn state(&self) -> ClusterState {
        self.state
    }

    pub fn centroids(&self) -> ArrayView2<'_, F> {
        self.centroids.view()
    }

    /// Cluster of each record; `None` until the first assignment pass.
    pub fn membership(&self) -> &[Option<usize>] {
        &self.membership
    }

    pub fn points_changed(&self) -> usize {
        self.points_changed
    }

    pub fn sse(&self) -> F {
        self.sse
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Runs until the convergence criterion, the iteration cap or the timeout
    /// stops the loop.
    ///
    /// Hitting the cap or the timeout is not an error: the result carries a
    /// [`NonConvergenceWarning`] and the last fully completed state.
    pub fn fit(&mut self) -> KClusterResult<ClusteringResult<F>> {
        let started = Instant::now();
        info!(
            "Clustering {} records into {} clusters ({:?} initialization, {}, max {} iterations)",
            self.data.nrows(),
            self.params.k,
            self.params.initialization_method,
            self.params.convergence,
            self.params.max_iterations
        );

        self.initialize();
        let termination = loop {
            if self.step()? {
                break Termination::Converged;
            }
            if self.iteration >= self.params.max_iterations {
                break Termination::MaxIterations;
            }
            if let Some(timeout) = self.params.timeout {
                if started.elapsed() >= timeout {
                    break Termination::TimedOut;
                }
            }
        };

        let warning = if termination == Termination::Converged {
            info!(
                "Converged after {} iterations with sse {}",
                self.iteration, self.sse
            );
            None
        } else {
            let warning = NonConvergenceWarning {
                termination,
                iterations: self.iteration,
                points_changed: self.points_changed,
                records: self.data.nrows(),
            };
            warn!("{}", warning);
            Some(warning)
        };

        Ok(self.result(termination, warning))
    }

    /// Picks the initial centroids and performs the first assignment pass.
    /// Does nothing once the run has left the initializing state.
    pub fn initialize(&mut self) {
        if self.state != ClusterState::Initializing {
            return;
        }
        let indices = self.initial_centroid_indices();
        debug!("Initial centroids taken from records {:?}", indices);

        self.centroids = self.data.select(Axis(0), &indices);
        self.state = ClusterState::Assigning;
        let stats = self.assign_points();
        debug!("Initial assignment: sse {}", stats.sse);
    }

    /// One iteration: update every centroid, reassign every record and
    /// evaluate the convergence criterion. Returns whether it was met.
    pub fn step(&mut self) -> KClusterResult<bool> {
        self.initialize();
        self.iteration += 1;

        let previous = self.centroids.clone();
        self.update_centroids()?;
        let shift = max_relative_shift(&previous.view(), &self.centroids.view());
        let stats = self.assign_points();

        let converged = match self.params.convergence {
            ConvergencePolicy::MembershipDelta { threshold } => {
                (stats.points_changed as f64 / self.data.nrows() as f64) < threshold
            }
            ConvergencePolicy::CentroidShift { tolerance } => shift < tolerance,
        };
        debug!(
            "Iteration {}: {} points changed, sse {}, max centroid shift {:.6}%",
            self.iteration, stats.points_changed, stats.sse, shift
        );

        if converged {
            self.state = ClusterState::Converged;
        }
        Ok(converged)
    }

    /// Assigns each record to its nearest centroid, lowest index on ties.
    pub fn assign_points(&mut self) -> AssignmentStats<F> {
        assert_ne!(
            self.state,
            ClusterState::Initializing,
            "centroids must be initialized before assigning points"
        );
        let data = self.data;
        let centroids = self.centroids.view();

        let nearest: Vec<(usize, F)> = (0..data.nrows())
            .into_par_iter()
            .map(|i| nearest_centroid(&EuclideanDistance, &data.row(i), &centroids))
            .collect();

        let mut points_changed = 0;
        let mut sse = F::zero();
        let mut membership = Vec::with_capacity(nearest.len());
        for (&(cluster, distance), previous) in nearest.iter().zip(&self.membership) {
            if *previous != Some(cluster) {
                points_changed += 1;
            }
            sse += distance * distance;
            membership.push(Some(cluster));
        }

        self.membership = membership;
        self.points_changed = points_changed;
        self.sse = sse;
        self.state = ClusterState::Updating;
        AssignmentStats { points_changed, sse }
    }

    /// Moves every centroid to the mean of its members.
    ///
    /// A centroid without members is handled per the configured
    /// [`EmptyClusterPolicy`]. On error no centroid is changed.
    pub fn update_centroids(&mut self) -> KClusterResult<()> {
        assert_ne!(
            self.state,
            ClusterState::Initializing,
            "centroids must be initialized before updating them"
        );
        let data = self.data;
        let members = self.members_by_cluster();

        let means: Vec<_> = members
            .par_iter()
            .map(|indices| compute_mean(&data, indices))
            .collect();

        let mut centroids = self.centroids.clone();
        let mut reseeded = Vec::new();
        for (cluster, mean) in means.into_iter().enumerate() {
            match mean {
                Some(mean) => centroids.row_mut(cluster).assign(&mean),
                None => {
                    let candidate = match self.params.empty_cluster_policy {
                        EmptyClusterPolicy::Fail => None,
                        EmptyClusterPolicy::Reseed => self.reseed_candidate(&members, &reseeded),
                    };
                    let idx = candidate.ok_or(KClusterError::EmptyCluster {
                        cluster,
                        iteration: self.iteration,
                    })?;
                    warn!(
                        "Cluster {} lost all members at iteration {}; reseeding from record {}",
                        cluster, self.iteration, idx
                    );
                    centroids.row_mut(cluster).assign(&data.row(idx));
                    reseeded.push(idx);
                }
            }
        }

        self.centroids = centroids;
        self.state = ClusterState::Assigning;
        Ok(())
    }

    /// Returns a random number generator based on the seed (or entropy).
    fn get_rng(&self) -> SmallRng {
        match self.params.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rng()),
        }
    }

    fn initial_centroid_indices(&self) -> Vec<usize> {
        let k = self.params.k;
        match self.params.initialization_method {
            InitializationMethod::FirstK => (0..k).collect(),
            InitializationMethod::Random => {
                let mut rng = self.get_rng();
                (0..self.data.nrows()).choose_multiple(&mut rng, k)
            }
        }
    }

    /// Member indices of every cluster, ascending.
    fn members_by_cluster(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.params.k];
        for (idx, cluster) in self.membership.iter().enumerate() {
            if let Some(cluster) = cluster {
                members[*cluster].push(idx);
            }
        }
        members
    }

    /// The record furthest from its current centroid, skipping records whose
    /// cluster would be left empty and records already taken in this pass.
    /// Ties go to the lowest record index.
    fn reseed_candidate(&self, members: &[Vec<usize>], taken: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, F)> = None;
        for (idx, cluster) in self.membership.iter().enumerate() {
            let Some(cluster) = *cluster else { continue };
            if taken.contains(&idx) {
                continue;
            }
            let taken_from_cluster = taken
                .iter()
                .filter(|&&t| self.membership[t] == Some(cluster))
                .count();
            if members[cluster].len() < taken_from_cluster + 2 {
                continue;
            }

            let distance =
                EuclideanDistance.compute(&self.data.row(idx), &self.centroids.row(cluster));
            if best.map_or(true, |(_, best_distance)| distance > best_distance) {
                best = Some((idx, distance));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn result(
        &self,
        termination: Termination,
        warning: Option<NonConvergenceWarning>,
    ) -> ClusteringResult<F> {
        let membership: Vec<usize> = self.membership.iter().flatten().copied().collect();
        debug_assert_eq!(membership.len(), self.data.nrows());

        ClusteringResult {
            membership,
            centroids: self.centroids.clone(),
            sse: self.sse,
            iterations: self.iteration,
            termination,
            warning,
        }
    }
}

/// Index of and distance to the closest centroid. Strict comparison keeps the
/// lowest index on exact ties.
fn nearest_centroid<F: KFloat, M: DistanceMetric<F>>(
    metric: &M,
    point: &ArrayView1<F>,
    centroids: &ArrayView2<F>,
) -> (usize, F) {
    centroids
        .rows()
        .into_iter()
        .enumerate()
        .fold((0, F::infinity()), |(best_idx, best_dist), (idx, centroid)| {
            let dist = metric.compute(point, &centroid);
            if dist < best_dist {
                (idx, dist)
            } else {
                (best_idx, best_dist)
            }
        })
}

/// Largest relative change, in percent, of any centroid coordinate. A
/// coordinate that moves away from exactly zero counts as an infinite change.
fn max_relative_shift<F: KFloat>(previous: &ArrayView2<F>, current: &ArrayView2<F>) -> f64 {
    previous
        .iter()
        .zip(current.iter())
        .map(|(&old, &new)| {
            if old == new {
                0.0
            } else if old == F::zero() {
                f64::INFINITY
            } else {
                ((new - old) / old)
                    .to_f64()
                    .map_or(f64::INFINITY, |ratio| ratio.abs() * 100.0)
            }
        })
        .fold(0.0, f64::max)
}

/// Final sse for every k in `1..=max_k` (capped at the number of records),
/// using `params` for everything but k. Useful for picking k by the elbow of
/// the curve.
pub fn sse_by_k<F: KFloat>(
    data: ArrayView2<F>,
    params: &ClusteringParams,
    max_k: usize,
) -> KClusterResult<Vec<F>> {
    (1..=max_k.min(data.nrows()))
        .map(|k| {
            let params = ClusteringParams {
                k,
                ..params.clone()
            };
            let mut clustering = KMeansClustering::new(params, data)?;
            Ok(clustering.fit()?.sse)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::time::Duration;

    fn create_test_data() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 0.0],
            [10.0, 10.0],
            [10.0, 11.0],
            [11.0, 10.0]
        ]
    }

    fn first_k(k: usize) -> ClusteringParams {
        ClusteringParams::new(k).with_initialization(InitializationMethod::FirstK)
    }

    #[test]
    fn test_initialize_first_k() {
        let data = create_test_data();
        let mut clustering = KMeansClustering::new(first_k(2), data.view()).unwrap();
        assert_eq!(clustering.state(), ClusterState::Initializing);
        assert!(clustering.membership().iter().all(Option::is_none));

        clustering.initialize();

        assert_eq!(clustering.centroids(), data.slice(ndarray::s![0..2, ..]));
        assert_eq!(clustering.state(), ClusterState::Updating);
        assert_eq!(
            clustering.membership(),
            &[Some(0), Some(1), Some(0), Some(1), Some(1), Some(1)]
        );
        // every record moved out of "unassigned"
        assert_eq!(clustering.points_changed(), 6);
    }

    #[test]
    fn test_initialize_random_is_seeded() {
        let data = create_test_data();
        let params = ClusteringParams::new(3).with_seed(42);

        let mut a = KMeansClustering::new(params.clone(), data.view()).unwrap();
        let mut b = KMeansClustering::new(params, data.view()).unwrap();
        a.initialize();
        b.initialize();
        assert_eq!(a.centroids(), b.centroids());

        let indices = a.initial_centroid_indices();
        assert_eq!(indices.len(), 3);
        let mut distinct = indices.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), 3, "initial centroids must be distinct records");
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let data = array![[0.0, 0.0], [2.0, 0.0], [1.0, 0.0]];
        for _ in 0..10 {
            let mut clustering = KMeansClustering::new(first_k(2), data.view()).unwrap();
            clustering.initialize();
            assert_eq!(clustering.membership()[2], Some(0));
        }
    }

    #[test]
    fn test_assign_points_accumulates_sse() {
        let data = create_test_data();
        let mut clustering = KMeansClustering::new(first_k(2), data.view()).unwrap();
        clustering.initialize();

        // record 2 is 1 from centroid 0; the far group measures against (0, 1)
        let expected = 1.0 + (100.0 + 81.0) + (100.0 + 100.0) + (121.0 + 81.0);
        assert_relative_eq!(clustering.sse(), expected);

        let stats = clustering.assign_points();
        assert_eq!(stats.points_changed, 0);
        assert_relative_eq!(stats.sse, expected);
    }

    #[test]
    fn test_update_centroids_takes_member_means() {
        let data = create_test_data();
        let mut clustering = KMeansClustering::new(first_k(2), data.view()).unwrap();
        clustering.initialize();
        clustering.update_centroids().unwrap();

        let centroids = clustering.centroids();
        assert_relative_eq!(centroids[[0, 0]], 0.5);
        assert_relative_eq!(centroids[[0, 1]], 0.0);
        assert_relative_eq!(centroids[[1, 0]], 7.75);
        assert_relative_eq!(centroids[[1, 1]], 8.0);
        assert_eq!(clustering.state(), ClusterState::Assigning);
    }

    #[test]
    fn test_fit_separates_groups() {
        let data = create_test_data();
        let mut clustering = KMeansClustering::new(first_k(2), data.view()).unwrap();
        let result = clustering.fit().unwrap();

        assert_eq!(result.membership, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(result.termination, Termination::Converged);
        assert!(result.warning.is_none());
        assert_eq!(result.iterations, 2);
        assert_relative_eq!(result.centroids[[0, 0]], 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(result.centroids[[1, 1]], 31.0 / 3.0, epsilon = 1e-12);
        assert_eq!(clustering.state(), ClusterState::Converged);
    }

    #[test]
    fn test_step_after_convergence_changes_nothing() {
        let data = create_test_data();
        let mut clustering = KMeansClustering::new(first_k(2), data.view()).unwrap();
        let result = clustering.fit().unwrap();

        assert!(clustering.step().unwrap());
        assert_eq!(clustering.points_changed(), 0);
        assert_eq!(clustering.centroids(), result.centroids.view());
    }

    #[test]
    fn test_centroid_shift_sse_never_increases() {
        let data = create_test_data();
        let params = first_k(2).with_convergence(ConvergencePolicy::centroid_shift());
        let mut clustering = KMeansClustering::new(params, data.view()).unwrap();
        clustering.initialize();

        loop {
            let before = clustering.sse();
            let converged = clustering.step().unwrap();
            assert!(
                clustering.sse() <= before + 1e-12,
                "sse rose from {} to {}",
                before,
                clustering.sse()
            );
            if converged {
                break;
            }
            assert!(clustering.iteration() < 100);
        }
        // centroids have stopped moving only once a full update leaves them in place
        assert_eq!(clustering.iteration(), 3);
    }

    #[test]
    fn test_iteration_cap_is_a_warning() {
        let data = create_test_data();
        let mut clustering =
            KMeansClustering::new(first_k(2).with_max_iterations(1), data.view()).unwrap();
        let result = clustering.fit().unwrap();

        assert_eq!(result.termination, Termination::MaxIterations);
        assert_eq!(result.iterations, 1);
        let warning = result.warning.expect("expected a non-convergence warning");
        assert_eq!(warning.points_changed, 1);
        assert_eq!(warning.records, 6);
        assert_eq!(result.membership.len(), 6);
    }

    #[test]
    fn test_timeout_returns_last_state() {
        let data = create_test_data();
        let params = first_k(2).with_timeout(Duration::ZERO);
        let mut clustering = KMeansClustering::new(params, data.view()).unwrap();
        let result = clustering.fit().unwrap();

        assert_eq!(result.termination, Termination::TimedOut);
        assert_eq!(result.iterations, 1);
        assert!(result.warning.is_some());
    }

    #[test]
    fn test_invalid_k() {
        let data = create_test_data();
        let err = KMeansClustering::new(first_k(0), data.view()).err().unwrap();
        assert!(matches!(err, KClusterError::InvalidK { k: 0, records: 6 }));

        let err = KMeansClustering::new(first_k(7), data.view()).err().unwrap();
        assert!(matches!(err, KClusterError::InvalidK { k: 7, records: 6 }));
    }

    #[test]
    fn test_empty_cluster_fails_by_default() {
        // duplicate seeds: every record ties and lands in cluster 0
        let data = array![[0.0, 0.0], [0.0, 0.0], [5.0, 5.0], [6.0, 6.0]];
        let mut clustering = KMeansClustering::new(first_k(2), data.view()).unwrap();
        let err = clustering.fit().unwrap_err();
        assert!(matches!(
            err,
            KClusterError::EmptyCluster {
                cluster: 1,
                iteration: 1
            }
        ));
    }

    #[test]
    fn test_empty_cluster_reseed_recovers() {
        let data = array![[0.0, 0.0], [0.0, 0.0], [5.0, 5.0], [6.0, 6.0]];
        let params = first_k(2).with_empty_cluster_policy(EmptyClusterPolicy::Reseed);
        let mut clustering = KMeansClustering::new(params, data.view()).unwrap();
        let result = clustering.fit().unwrap();

        assert_eq!(result.membership, vec![0, 0, 1, 1]);
        assert_relative_eq!(result.centroids[[1, 0]], 5.5);
        assert!(result.converged());
    }

    #[test]
    fn test_max_relative_shift() {
        let previous = array![[1.0, 0.0], [2.0, 4.0]];
        let same = previous.clone();
        assert_eq!(max_relative_shift(&previous.view(), &same.view()), 0.0);

        let moved = array![[1.1, 0.0], [2.0, 4.0]];
        assert_relative_eq!(
            max_relative_shift(&previous.view(), &moved.view()),
            10.0,
            epsilon = 1e-9
        );

        let off_zero = array![[1.0, 0.5], [2.0, 4.0]];
        assert!(max_relative_shift(&previous.view(), &off_zero.view()).is_infinite());
    }

    #[test]
    fn test_sse_by_k_is_non_increasing() {
        let data = create_test_data();
        // first-k seeding leaves a cluster empty for some k on this data
        let params = first_k(1).with_empty_cluster_policy(EmptyClusterPolicy::Reseed);
        let sse = sse_by_k(data.view(), &params, 10).unwrap();

        assert_eq!(sse.len(), 6);
        assert_relative_eq!(sse[5], 0.0);
        assert!(sse[1] < sse[0]);
    }
}
