//! Matrix Factorization using Alternating Least Squares (ALS)
//!
//! Decomposes the user x movie preference matrix into user and item latent
//! factors. Each observed entry is weighted by a confidence of
//! `1 + alpha * preference`; both factor sets carry an L2 penalty.

use crate::error::ModelTrainingError;
use crate::types::{MovieId, UserId};
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// ALS configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ALSConfig {
    /// Number of latent factors (embedding dimension)
    pub latent_factors: usize,
    /// Regularization parameter (lambda)
    pub regularization: f32,
    /// Number of iterations
    pub iterations: usize,
    /// Confidence scaling
    pub alpha: f32,
    /// Seed for factor initialisation
    pub seed: u64,
}

impl Default for ALSConfig {
    fn default() -> Self {
        Self {
            latent_factors: 32,
            regularization: 0.1,
            iterations: 10,
            alpha: 10.0,
            seed: 42,
        }
    }
}

impl ALSConfig {
    pub fn validate(&self) -> Result<(), ModelTrainingError> {
        if self.latent_factors == 0 {
            return Err(ModelTrainingError::InvalidConfig(
                "latent_factors must be positive".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(ModelTrainingError::InvalidConfig(
                "iterations must be positive".to_string(),
            ));
        }
        if !(self.regularization.is_finite() && self.regularization > 0.0) {
            return Err(ModelTrainingError::InvalidConfig(format!(
                "regularization must be positive, got {}",
                self.regularization
            )));
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(ModelTrainingError::InvalidConfig(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Sparse user-item preference matrix
#[derive(Debug, Clone, Default)]
pub struct SparseMatrix {
    /// (user_index, item_index) -> preference, ordered for reproducible sweeps
    pub entries: BTreeMap<(usize, usize), f32>,
    pub num_users: usize,
    pub num_items: usize,
}

impl SparseMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; a later value for the same cell replaces the earlier one
    pub fn insert(&mut self, user_idx: usize, item_idx: usize, value: f32) {
        self.entries.insert((user_idx, item_idx), value);
        self.num_users = self.num_users.max(user_idx + 1);
        self.num_items = self.num_items.max(item_idx + 1);
    }

    pub fn get(&self, user_idx: usize, item_idx: usize) -> f32 {
        self.entries
            .get(&(user_idx, item_idx))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observed (item, value) pairs per user
    fn user_rows(&self) -> Vec<Vec<(usize, f32)>> {
        let mut rows = vec![Vec::new(); self.num_users];
        for (&(u, i), &value) in &self.entries {
            rows[u].push((i, value));
        }
        rows
    }

    /// Observed (user, value) pairs per item
    fn item_rows(&self) -> Vec<Vec<(usize, f32)>> {
        let mut rows = vec![Vec::new(); self.num_items];
        for (&(u, i), &value) in &self.entries {
            rows[i].push((u, value));
        }
        rows
    }
}

/// ALS-based matrix factorization
#[derive(Debug, Clone)]
pub struct MatrixFactorization {
    config: ALSConfig,
    /// User latent factors: [num_users x latent_factors]
    pub user_factors: Option<Array2<f32>>,
    /// Item latent factors: [num_items x latent_factors]
    pub item_factors: Option<Array2<f32>>,
    pub user_id_map: HashMap<UserId, usize>,
    pub item_id_map: HashMap<MovieId, usize>,
    /// Item index to movie id
    pub item_index_map: Vec<MovieId>,
}

impl MatrixFactorization {
    pub fn new(config: ALSConfig) -> Self {
        Self {
            config,
            user_factors: None,
            item_factors: None,
            user_id_map: HashMap::new(),
            item_id_map: HashMap::new(),
            item_index_map: Vec::new(),
        }
    }

    pub fn config(&self) -> &ALSConfig {
        &self.config
    }

    /// Build the sparse matrix, assigning indices in first-seen order
    pub fn build_matrix(
        &mut self,
        interactions: impl IntoIterator<Item = (UserId, MovieId, f32)>,
    ) -> SparseMatrix {
        let mut matrix = SparseMatrix::new();
        self.user_id_map.clear();
        self.item_id_map.clear();
        self.item_index_map.clear();

        for (user_id, movie_id, preference) in interactions {
            let next_user = self.user_id_map.len();
            let user_idx = *self.user_id_map.entry(user_id).or_insert(next_user);

            let next_item = self.item_id_map.len();
            let item_idx = *self.item_id_map.entry(movie_id).or_insert_with(|| {
                self.item_index_map.push(movie_id);
                next_item
            });

            matrix.insert(user_idx, item_idx, preference);
        }

        matrix
    }

    /// Train on a matrix produced by [`Self::build_matrix`]
    pub fn fit(&mut self, matrix: &SparseMatrix) -> Result<(), ModelTrainingError> {
        self.config.validate()?;
        if matrix.is_empty() {
            return Err(ModelTrainingError::EmptyRatings);
        }

        let k = self.config.latent_factors;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut user_factors =
            Array2::from_shape_fn((matrix.num_users, k), |_| rng.gen_range(-0.1f32..0.1));
        let mut item_factors =
            Array2::from_shape_fn((matrix.num_items, k), |_| rng.gen_range(-0.1f32..0.1));

        let user_rows = matrix.user_rows();
        let item_rows = matrix.item_rows();

        for iteration in 0..self.config.iterations {
            self.update_factors(&user_rows, &item_factors, &mut user_factors, "user")?;
            self.update_factors(&item_rows, &user_factors, &mut item_factors, "item")?;

            if iteration % 2 == 0 {
                let loss = Self::compute_loss(matrix, &user_factors, &item_factors);
                debug!(iteration, loss, "ALS iteration");
            }
        }

        self.user_factors = Some(user_factors);
        self.item_factors = Some(item_factors);

        Ok(())
    }

    pub fn is_trained(&self) -> bool {
        self.user_factors.is_some() && self.item_factors.is_some()
    }

    /// Recompute every observed row of `target` against the fixed factor set
    fn update_factors(
        &self,
        rows: &[Vec<(usize, f32)>],
        fixed: &Array2<f32>,
        target: &mut Array2<f32>,
        factor: &'static str,
    ) -> Result<(), ModelTrainingError> {
        let solved = rows
            .par_iter()
            .enumerate()
            .filter(|(_, observed)| !observed.is_empty())
            .map(|(index, observed)| {
                self.solve_row(observed, fixed)
                    .map(|row| (index, row))
                    .ok_or(ModelTrainingError::NotPositiveDefinite { factor, index })
            })
            .collect::<Result<Vec<(usize, Array1<f32>)>, _>>()?;

        for (index, row) in solved {
            target.row_mut(index).assign(&row);
        }
        Ok(())
    }

    /// Regularised weighted least squares for one row
    ///
    /// A = sum(c * y * y^T) + lambda * I, b = sum(c * p * y), c = 1 + alpha * p
    fn solve_row(&self, observed: &[(usize, f32)], fixed: &Array2<f32>) -> Option<Array1<f32>> {
        let k = fixed.ncols();
        let lambda = self.config.regularization as f64;
        let alpha = self.config.alpha as f64;
        let mut a = Array2::<f64>::zeros((k, k));
        let mut b = Array1::<f64>::zeros(k);

        for &(other, preference) in observed {
            let vector = fixed.row(other);
            let preference = preference as f64;
            let confidence = 1.0 + alpha * preference;

            for i in 0..k {
                let yi = vector[i] as f64;
                for j in 0..k {
                    a[[i, j]] += confidence * yi * vector[j] as f64;
                }
                b[i] += confidence * preference * yi;
            }
        }

        for i in 0..k {
            a[[i, i]] += lambda;
        }

        Self::solve_least_squares(&a, &b).map(|x| x.mapv(|v| v as f32))
    }

    /// Solve A * x = b by Cholesky decomposition; `None` if A is not positive definite
    pub(crate) fn solve_least_squares(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
        let n = a.nrows();

        // A = L * L^T
        let mut l = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in 0..j {
                    sum += l[[i, k]] * l[[j, k]];
                }

                if i == j {
                    let diag = a[[i, i]] - sum;
                    if diag <= 0.0 || !diag.is_finite() {
                        return None;
                    }
                    l[[i, j]] = diag.sqrt();
                } else {
                    l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
                }
            }
        }

        // L * y = b
        let mut y = Array1::<f64>::zeros(n);
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..i {
                sum += l[[i, j]] * y[j];
            }
            y[i] = (b[i] - sum) / l[[i, i]];
        }

        // L^T * x = y
        let mut x = Array1::<f64>::zeros(n);
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in (i + 1)..n {
                sum += l[[j, i]] * x[j];
            }
            x[i] = (y[i] - sum) / l[[i, i]];
        }

        Some(x)
    }

    /// Mean squared reconstruction error over observed entries
    fn compute_loss(
        matrix: &SparseMatrix,
        user_factors: &Array2<f32>,
        item_factors: &Array2<f32>,
    ) -> f32 {
        if matrix.is_empty() {
            return 0.0;
        }
        let total: f32 = matrix
            .entries
            .iter()
            .map(|(&(u, i), &preference)| {
                let prediction = user_factors.row(u).dot(&item_factors.row(i));
                (preference - prediction).powi(2)
            })
            .sum();
        total / matrix.nnz() as f32
    }

    /// Latent vector of a user who is not in the training set
    ///
    /// Item factors stay fixed. Movies without item factors are ignored; if
    /// none remain the result is the zero vector.
    pub fn fold_in(&self, preferences: &[(MovieId, f32)]) -> Result<Array1<f32>, ModelTrainingError> {
        let item_factors = self
            .item_factors
            .as_ref()
            .ok_or(ModelTrainingError::NotTrained)?;

        let observed: Vec<(usize, f32)> = preferences
            .iter()
            .filter_map(|(movie_id, preference)| {
                self.item_id_map.get(movie_id).map(|&idx| (idx, *preference))
            })
            .collect();

        if observed.is_empty() {
            return Ok(Array1::zeros(item_factors.ncols()));
        }

        self.solve_row(&observed, item_factors)
            .ok_or(ModelTrainingError::NotPositiveDefinite {
                factor: "folded-in user",
                index: 0,
            })
    }

    /// Affinity of a latent user vector to every trained item
    pub fn score_items(
        &self,
        user_vector: ArrayView1<'_, f32>,
    ) -> Result<Vec<(MovieId, f32)>, ModelTrainingError> {
        let item_factors = self
            .item_factors
            .as_ref()
            .ok_or(ModelTrainingError::NotTrained)?;

        let scores = item_factors.dot(&user_vector);
        Ok(self
            .item_index_map
            .iter()
            .copied()
            .zip(scores.iter().copied())
            .collect())
    }

    /// Predicted preference of a training user for a trained item
    pub fn predict(&self, user_id: UserId, movie_id: MovieId) -> Option<f32> {
        let user_idx = *self.user_id_map.get(&user_id)?;
        let item_idx = *self.item_id_map.get(&movie_id)?;
        let user_factors = self.user_factors.as_ref()?;
        let item_factors = self.item_factors.as_ref()?;

        Some(user_factors.row(user_idx).dot(&item_factors.row(item_idx)))
    }

    pub fn user_embedding(&self, user_id: UserId) -> Option<Vec<f32>> {
        let user_idx = *self.user_id_map.get(&user_id)?;
        Some(self.user_factors.as_ref()?.row(user_idx).to_vec())
    }

    pub fn item_embedding(&self, movie_id: MovieId) -> Option<Vec<f32>> {
        let item_idx = *self.item_id_map.get(&movie_id)?;
        Some(self.item_factors.as_ref()?.row(item_idx).to_vec())
    }

    /// Movies with item factors, in index order
    pub fn item_ids(&self) -> &[MovieId] {
        &self.item_index_map
    }
}
