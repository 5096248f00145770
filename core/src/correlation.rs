//! Pairwise Pearson correlation over labelled columns.

use crate::{
    error::{ChartError, ChartResult},
    synth::MetricTable,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub a: String,
    pub b: String,
    pub r: f64,
}

/// Square, symmetric matrix with an exact unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn from_table(table: &MetricTable) -> ChartResult<Self> {
        let columns: Vec<(&str, &[f64])> = table
            .columns()
            .iter()
            .map(|c| (c.metric.label(), c.values.as_slice()))
            .collect();
        Self::from_columns(&columns)
    }

    /// Build from labelled columns of equal length.
    ///
    /// Only the upper triangle is computed; the lower triangle is mirrored
    /// from it so symmetry is exact rather than approximate.
    pub fn from_columns<S: AsRef<str>>(columns: &[(S, &[f64])]) -> ChartResult<Self> {
        let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (name, values) in columns {
            if values.len() != rows {
                return Err(ChartError::RaggedColumns {
                    name: name.as_ref().to_string(),
                    expected: rows,
                    actual: values.len(),
                });
            }
        }
        if !columns.is_empty() && rows < 2 {
            return Err(ChartError::InsufficientRows { rows });
        }

        let centered: Vec<Centered> = columns
            .iter()
            .map(|(name, values)| Centered::new(name.as_ref(), values))
            .collect::<ChartResult<_>>()?;

        let n = columns.len();
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let r = centered[i].correlate(&centered[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        log::debug!("computed {n}x{n} correlation matrix over {rows} rows");

        Ok(Self {
            labels: columns.iter().map(|(name, _)| name.as_ref().to_string()).collect(),
            values,
        })
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i]
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.size();
        (0..n).all(|i| (0..n).all(|j| self.values[i][j] == self.values[j][i]))
    }

    /// Off-diagonal pairs ordered by |r|, strongest first.
    /// Ties keep row-major order.
    pub fn strongest_pairs(&self, k: usize) -> Vec<CorrelationPair> {
        let n = self.size();
        let mut pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        pairs.sort_by(|&(ai, aj), &(bi, bj)| {
            self.values[bi][bj]
                .abs()
                .total_cmp(&self.values[ai][aj].abs())
        });
        pairs
            .into_iter()
            .take(k)
            .map(|(i, j)| CorrelationPair {
                a: self.labels[i].clone(),
                b: self.labels[j].clone(),
                r: self.values[i][j],
            })
            .collect()
    }

    pub fn to_json(&self) -> ChartResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A column with its mean removed, plus its sum of squares.
struct Centered {
    deviations: Vec<f64>,
    sum_sq: f64,
}

impl Centered {
    fn new(name: &str, values: &[f64]) -> ChartResult<Self> {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let deviations: Vec<f64> = values.iter().map(|v| v - mean).collect();
        let sum_sq: f64 = deviations.iter().map(|d| d * d).sum();
        if !(sum_sq > 0.0 && sum_sq.is_finite()) {
            return Err(ChartError::DegenerateColumn {
                name: name.to_string(),
            });
        }
        Ok(Self { deviations, sum_sq })
    }

    fn correlate(&self, other: &Centered) -> f64 {
        let cross: f64 = self
            .deviations
            .iter()
            .zip(other.deviations.iter())
            .map(|(a, b)| a * b)
            .sum();
        (cross / (self.sum_sq * other.sum_sq).sqrt()).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
        CorrelationMatrix::from_columns(&[("x", x), ("y", y)])
            .ok()
            .map(|m| m.get(0, 1))
    }

    #[test]
    fn pearson_known_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let r = pearson(&x, &y).unwrap();
        assert!((r - 0.774_596_669_241_483_4).abs() < 1e-12, "got {r}");
    }

    #[test]
    fn pearson_perfect_lines() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up: Vec<f64> = x.iter().map(|v| 3.0 * v + 1.0).collect();
        let down: Vec<f64> = x.iter().map(|v| -0.5 * v + 7.0).collect();
        assert!((pearson(&x, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_rejects_constant_input() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }

    #[test]
    fn strongest_pairs_sorted_by_magnitude() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [5.0, 4.0, 3.0, 2.0, 1.0]; // -1 with a
        let c = [1.0, 3.0, 2.0, 5.0, 4.0]; // 0.8 with a
        let m = CorrelationMatrix::from_columns(&[("a", &a[..]), ("b", &b[..]), ("c", &c[..])])
            .unwrap();

        let top = m.strongest_pairs(2);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].a.as_str(), top[0].b.as_str()), ("a", "b"));
        assert!((top[0].r + 1.0).abs() < 1e-12);
        assert!(top[0].r.abs() >= top[1].r.abs());
        assert_eq!(m.strongest_pairs(10).len(), 3);
    }
}
