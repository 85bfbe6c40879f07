//! K-means partitioning of projected points.

use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Lloyd's k-means with k-means++ initialization.
///
/// Centroid initialization draws from a `ChaCha8Rng` seeded with the
/// caller-supplied seed, so identical input and seed always produce
/// identical labels. Cluster ids are arbitrary integers in `[0, k)` with no
/// ordering guarantee across datasets.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    max_iter: usize,
    tol: f64,
    seed: u64,
}

impl KMeans {
    /// Partitions the rows of `x` into at most `k` clusters.
    ///
    /// When `x` has fewer rows than `k`, the effective cluster count
    /// degrades to the row count; duplicate points may share a centroid.
    /// Labels always lie in `[0, k)`.
    pub fn fit_predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>> {
        let (n, d) = x.dim();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }

        let k = self.k.min(n);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut centroids = self.init_centroids(x, k, &mut rng);
        let mut labels = vec![0usize; n];

        for iter in 0..self.max_iter {
            // Assignment step
            let centroids_ref = &centroids;
            labels.par_iter_mut().enumerate().for_each(|(i, label)| {
                let point = x.row(i);
                let mut best_cluster = 0;
                let mut best_dist = f64::MAX;
                for c in 0..k {
                    let dist = squared_distance(point, centroids_ref.row(c));
                    if dist < best_dist {
                        best_dist = dist;
                        best_cluster = c;
                    }
                }
                *label = best_cluster;
            });

            // Update step
            let mut new_centroids = Array2::zeros((k, d));
            let mut counts = vec![0usize; k];
            for i in 0..n {
                let c = labels[i];
                counts[c] += 1;
                for j in 0..d {
                    new_centroids[[c, j]] += x[[i, j]];
                }
            }
            for c in 0..k {
                if counts[c] > 0 {
                    for j in 0..d {
                        new_centroids[[c, j]] /= counts[c] as f64;
                    }
                } else {
                    // Empty cluster: re-seed from a data point
                    let idx = rng.random_range(0..n);
                    new_centroids.row_mut(c).assign(&x.row(idx));
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();
            centroids = new_centroids;

            if shift < self.tol {
                debug!("k-means converged after {} iterations", iter + 1);
                break;
            }
        }

        Ok(labels)
    }

    /// k-means++ seeding: first centroid uniform, the rest sampled
    /// proportional to squared distance from the nearest chosen centroid.
    fn init_centroids(&self, x: ArrayView2<f64>, k: usize, rng: &mut ChaCha8Rng) -> Array2<f64> {
        let (n, d) = x.dim();
        let mut centroids = Array2::zeros((k, d));

        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&x.row(first));

        for c in 1..k {
            let distances: Vec<f64> = (0..n)
                .map(|i| {
                    (0..c)
                        .map(|j| squared_distance(x.row(i), centroids.row(j)))
                        .fold(f64::MAX, f64::min)
                })
                .collect();

            let total: f64 = distances.iter().sum();
            if total == 0.0 {
                // All points coincide with chosen centroids
                let idx = rng.random_range(0..n);
                centroids.row_mut(c).assign(&x.row(idx));
                continue;
            }

            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = 0;
            for (i, &dist) in distances.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold {
                    selected = i;
                    break;
                }
            }
            centroids.row_mut(c).assign(&x.row(selected));
        }

        centroids
    }

    pub fn n_clusters(&self) -> usize {
        self.k
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

#[derive(Debug, Clone)]
pub struct KMeansBuilder {
    k: usize,
    max_iter: usize,
    tol: f64,
    seed: u64,
}

impl Default for KMeansBuilder {
    fn default() -> Self {
        Self {
            k: 5,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }
}

impl KMeansBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Seed for centroid initialization; identical seeds keep cluster ids
    /// stable for identical input.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> KMeans {
        KMeans {
            k: self.k,
            max_iter: self.max_iter,
            tol: self.tol,
            seed: self.seed,
        }
    }
}
