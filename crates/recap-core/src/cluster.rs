//! Embedding-based topic clustering.
//!
//! Segment texts are embedded by the sentence-embedding backend and
//! partitioned with k-means over Euclidean distance. The PRNG used for
//! centroid seeding is a fixed-seed xorshift, so identical inputs always
//! produce identical cluster assignments. Cluster ids are reassigned to
//! dense integers in order of first appearance; the algorithm's internal
//! labels never leak.

use crate::backends::EmbeddingBackend;
use crate::error::{Error, Result};
use crate::types::ClusterSet;
use std::sync::Arc;
use tracing::debug;

const KMEANS_SEED: u64 = 42;
const KMEANS_MAX_ITERATIONS: usize = 50;

/// Deterministic xorshift64* generator for centroid seeding.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform float in [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum()
}

/// k-means++ style seeding: first centroid from the PRNG, later ones
/// weighted by squared distance to the nearest chosen centroid. When all
/// remaining weights are zero (duplicate points) the next unused point is
/// taken instead.
fn seed_centroids(points: &[Vec<f32>], k: usize, rng: &mut Xorshift64) -> Vec<Vec<f32>> {
    let mut chosen: Vec<usize> = vec![(rng.next_u64() as usize) % points.len()];

    while chosen.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if chosen.contains(&i) {
                    0.0
                } else {
                    chosen
                        .iter()
                        .map(|&c| squared_distance(p, &points[c]))
                        .fold(f64::INFINITY, f64::min)
                }
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let next = if total > 0.0 {
            let mut target = rng.next_f64() * total;
            let mut pick = 0;
            for (i, w) in weights.iter().enumerate() {
                target -= w;
                if target <= 0.0 && *w > 0.0 {
                    pick = i;
                    break;
                }
            }
            pick
        } else {
            // All points coincide with a centroid; take the next unused.
            (0..points.len())
                .find(|i| !chosen.contains(i))
                .unwrap_or(0)
        };
        chosen.push(next);
    }

    chosen.into_iter().map(|i| points[i].clone()).collect()
}

fn nearest_centroid(point: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Lloyd iterations minimizing the sum of squared point-to-centroid
/// distances. Every cluster ends non-empty: an emptied cluster is reseeded
/// with the point farthest from its current centroid.
fn kmeans(points: &[Vec<f32>], k: usize) -> Vec<usize> {
    let mut rng = Xorshift64::new(KMEANS_SEED);
    let mut centroids = seed_centroids(points, k, &mut rng);
    let mut assignments = vec![0usize; points.len()];

    for _ in 0..KMEANS_MAX_ITERATIONS {
        let new_assignments: Vec<usize> = points
            .iter()
            .map(|p| nearest_centroid(p, &centroids))
            .collect();

        let converged = new_assignments == assignments;
        assignments = new_assignments;

        let dim = points[0].len();
        for (cluster, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&Vec<f32>> = points
                .iter()
                .zip(&assignments)
                .filter(|(_, &a)| a == cluster)
                .map(|(p, _)| p)
                .collect();

            if members.is_empty() {
                // Reseed from the globally farthest point so k clusters
                // survive to the output.
                let farthest = points
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        squared_distance(a, centroid)
                            .partial_cmp(&squared_distance(b, centroid))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                *centroid = points[farthest].clone();
                continue;
            }

            let mut mean = vec![0.0f32; dim];
            for m in &members {
                for (acc, v) in mean.iter_mut().zip(m.iter()) {
                    *acc += v;
                }
            }
            for v in &mut mean {
                *v /= members.len() as f32;
            }
            *centroid = mean;
        }

        if converged {
            break;
        }
    }

    // Final assignment pass against the settled centroids.
    points
        .iter()
        .map(|p| nearest_centroid(p, &centroids))
        .collect()
}

pub struct TopicClusterer {
    backend: Arc<dyn EmbeddingBackend>,
}

impl TopicClusterer {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { backend }
    }

    /// Partition `texts` into at most `k` topic clusters.
    ///
    /// The effective cluster count is `min(k, texts.len())`, at least 1 for
    /// non-empty input; `effective_k == texts.len()` degenerates to one
    /// text per cluster. Empty input returns an empty set without calling
    /// the embedding backend.
    pub async fn cluster(&self, texts: &[String], k: usize) -> Result<ClusterSet> {
        if texts.is_empty() {
            return Ok(ClusterSet::default());
        }
        let effective_k = k.max(1).min(texts.len());

        let embeddings = self.backend.embed(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(Error::MalformedOutput(format!(
                "embedding backend returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        let dim = embeddings.first().map(|e| e.len()).unwrap_or(0);
        if dim == 0 || embeddings.iter().any(|e| e.len() != dim) {
            return Err(Error::MalformedOutput(
                "embedding backend returned ragged or empty vectors".to_string(),
            ));
        }

        debug!(texts = texts.len(), effective_k, "clustering segment texts");
        let raw_labels = kmeans(&embeddings, effective_k);

        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); effective_k];
        for (idx, &label) in raw_labels.iter().enumerate() {
            groups[label].push(idx);
        }

        // Coincident embeddings (duplicate texts) can collapse clusters;
        // move members out of the largest groups so all effective_k
        // clusters stay populated.
        while let Some(empty) = groups.iter().position(Vec::is_empty) {
            let donor = groups
                .iter()
                .enumerate()
                .max_by_key(|(_, g)| g.len())
                .map(|(i, _)| i)
                .unwrap_or(0);
            match groups[donor].pop() {
                Some(idx) => groups[empty].push(idx),
                None => break,
            }
        }

        // Members in input order, clusters in order of first appearance.
        for group in &mut groups {
            group.sort_unstable();
        }
        groups.sort_by_key(|g| g.first().copied().unwrap_or(usize::MAX));

        let clusters = groups
            .iter()
            .map(|g| g.iter().map(|&i| texts[i].clone()).collect())
            .collect();

        Ok(ClusterSet { clusters })
    }
}
