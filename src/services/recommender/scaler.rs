use super::error::{RecommenderError, RecommenderResult};
use super::matrix::InteractionMatrix;

/// Population mean and standard deviation of one item column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

impl ColumnStats {
    /// A zero-variance column carries no information about users.
    pub fn is_degenerate(&self) -> bool {
        self.std <= f64::EPSILON
    }

    fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

/// Per-column statistics produced by [`FeatureScaler::fit`]
///
/// Any vector that must live in the same scaled space as the training rows
/// goes through [`FitStatistics::transform`] with these statistics; nothing
/// is refitted at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct FitStatistics {
    columns: Vec<ColumnStats>,
}

impl FitStatistics {
    pub fn columns(&self) -> &[ColumnStats] {
        &self.columns
    }

    /// Number of zero-variance columns, scaled to a constant 0
    pub fn degenerate_columns(&self) -> usize {
        self.columns.iter().filter(|c| c.is_degenerate()).count()
    }

    /// Projects a raw count vector into the fitted space
    pub fn transform(&self, raw: &[f64]) -> RecommenderResult<Vec<f64>> {
        if raw.len() != self.columns.len() {
            return Err(RecommenderError::SchemaMismatch {
                expected: self.columns.len(),
                actual: raw.len(),
            });
        }

        Ok(raw
            .iter()
            .zip(&self.columns)
            .map(|(value, stats)| stats.scale(*value))
            .collect())
    }
}

/// Interaction matrix with every column standardized
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledMatrix {
    n_rows: usize,
    n_cols: usize,
    values: Vec<f64>,
}

impl ScaledMatrix {
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.n_cols..(row + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.n_cols.max(1)).take(self.n_rows)
    }
}

/// Standardizes matrix columns to zero mean and unit variance
pub struct FeatureScaler;

impl FeatureScaler {
    /// Fits column statistics over the whole matrix and scales it.
    pub fn fit(matrix: &InteractionMatrix) -> (ScaledMatrix, FitStatistics) {
        let n_rows = matrix.n_users();
        let n_cols = matrix.n_items();
        let n = n_rows.max(1) as f64;

        let mut columns = Vec::with_capacity(n_cols);
        for column in 0..n_cols {
            let mean = (0..n_rows).map(|row| matrix.get(row, column)).sum::<f64>() / n;
            let variance = (0..n_rows)
                .map(|row| (matrix.get(row, column) - mean).powi(2))
                .sum::<f64>()
                / n;
            columns.push(ColumnStats {
                mean,
                std: variance.sqrt(),
            });
        }

        let mut values = Vec::with_capacity(n_rows * n_cols);
        for row in 0..n_rows {
            values.extend(
                matrix
                    .row(row)
                    .iter()
                    .zip(&columns)
                    .map(|(value, stats)| stats.scale(*value)),
            );
        }

        (
            ScaledMatrix {
                n_rows,
                n_cols,
                values,
            },
            FitStatistics { columns },
        )
    }
}
