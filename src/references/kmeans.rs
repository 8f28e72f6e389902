//! K-means over feature vectors with caller-chosen initial centroids.

use crate::error::{Error, Result};
use crate::features::{DistanceMetric, EuclideanMetric, FeatureVector};

/// Result of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index of every instance, in instance order
    pub assignments: Vec<usize>,
    /// Final centroids
    pub centroids: Vec<FeatureVector>,
    /// Number of assignment rounds performed
    pub iterations: usize,
    /// Whether the last round left every assignment unchanged
    pub converged: bool,
}

impl Clustering {
    /// Indices of the instances assigned to `cluster`.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| (c == cluster).then_some(i))
            .collect()
    }
}

/// Deterministic k-means: no random seeding, ties go to the lower cluster.
#[derive(Debug, Clone)]
pub struct KMeans<M = EuclideanMetric> {
    metric: M,
    max_iterations: usize,
}

impl KMeans<EuclideanMetric> {
    /// Euclidean k-means with the given iteration bound.
    pub fn new(max_iterations: usize) -> Self {
        Self::with_metric(EuclideanMetric, max_iterations)
    }
}

impl<M: DistanceMetric> KMeans<M> {
    /// K-means under a custom metric.
    pub fn with_metric(metric: M, max_iterations: usize) -> Self {
        Self {
            metric,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Cluster `instances` starting from `centroids` (one per cluster).
    ///
    /// Alternates nearest-centroid assignment and centroid recomputation
    /// until an assignment round changes nothing or the iteration bound is
    /// hit. A cluster that loses all its members keeps its centroid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFeatureSet`] if any instance or centroid has a
    /// different feature set, and [`Error::Classification`] if no centroid
    /// is given.
    pub fn cluster(
        &self,
        instances: &[FeatureVector],
        mut centroids: Vec<FeatureVector>,
    ) -> Result<Clustering> {
        if centroids.is_empty() {
            return Err(Error::Classification(
                "k-means needs at least one initial centroid".to_string(),
            ));
        }

        let mut assignments = vec![usize::MAX; instances.len()];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            let mut changed = false;
            for (instance, assigned) in instances.iter().zip(assignments.iter_mut()) {
                let nearest = self.nearest(instance, &centroids)?;
                if *assigned != nearest {
                    *assigned = nearest;
                    changed = true;
                }
            }

            if !changed {
                converged = true;
                break;
            }

            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                if let Some(mean) = mean_of(instances, &assignments, cluster) {
                    *centroid = mean;
                }
            }
        }

        if !converged {
            log::warn!(
                "k-means stopped after {} iterations without converging",
                iterations
            );
        } else {
            log::debug!("k-means converged after {} iterations", iterations);
        }

        Ok(Clustering {
            assignments,
            centroids,
            iterations,
            converged,
        })
    }

    fn nearest(&self, instance: &FeatureVector, centroids: &[FeatureVector]) -> Result<usize> {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, centroid) in centroids.iter().enumerate() {
            let d = self.metric.distance(instance, centroid)?;
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        Ok(best)
    }
}

/// Feature-wise mean of the instances assigned to `cluster`.
fn mean_of(
    instances: &[FeatureVector],
    assignments: &[usize],
    cluster: usize,
) -> Option<FeatureVector> {
    let mut members = instances
        .iter()
        .zip(assignments)
        .filter(|(_, c)| **c == cluster)
        .map(|(v, _)| v);

    let first = members.next()?;
    let mut sums: Vec<f64> = first.values().collect();
    let mut count = 1usize;
    for member in members {
        for (sum, value) in sums.iter_mut().zip(member.values()) {
            *sum += value;
        }
        count += 1;
    }

    Some(
        first
            .names()
            .zip(sums)
            .map(|(name, sum)| (name.to_string(), sum / count as f64))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> FeatureVector {
        [("x".to_string(), x), ("y".to_string(), y)].into_iter().collect()
    }

    #[test]
    fn test_two_separated_groups() {
        let data = vec![v(0.0, 0.0), v(10.0, 10.0), v(0.5, 0.0), v(9.5, 10.0), v(0.0, 0.5)];
        let result = KMeans::new(100)
            .cluster(&data, vec![data[0].clone(), data[1].clone()])
            .unwrap();
        assert!(result.converged);
        assert_eq!(result.assignments, vec![0, 1, 0, 1, 0]);
        assert_eq!(result.members(1), vec![1, 3]);
        assert_eq!(result.centroids[1], v(9.75, 10.0));
    }

    #[test]
    fn test_ties_go_to_lower_cluster() {
        let data = vec![v(0.0, 0.0), v(2.0, 0.0), v(1.0, 0.0)];
        let result = KMeans::new(1)
            .cluster(&data, vec![data[0].clone(), data[1].clone()])
            .unwrap();
        assert_eq!(result.assignments, vec![0, 1, 0]);
    }

    #[test]
    fn test_iteration_bound() {
        let data = vec![v(0.0, 0.0), v(10.0, 0.0)];
        let result = KMeans::new(1)
            .cluster(&data, vec![data[0].clone(), data[1].clone()])
            .unwrap();
        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
    }

    #[test]
    fn test_mismatched_features_fail() {
        let other: FeatureVector = [("z".to_string(), 1.0)].into_iter().collect();
        let result = KMeans::new(10).cluster(&[v(0.0, 0.0)], vec![other]);
        assert!(matches!(result, Err(Error::InvalidFeatureSet { .. })));
    }

    #[test]
    fn test_no_centroids() {
        assert!(KMeans::new(10).cluster(&[v(0.0, 0.0)], Vec::new()).is_err());
    }
}
