//! Problem instance and its symmetric coupling matrix.

use crate::error::FormatError;

/// A single weighted coupling between two nodes (0-indexed).
///
/// `i == j` declares a self-coupling, stored on the matrix diagonal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coupling {
    pub i: usize,
    pub j: usize,
    pub weight: f64,
}

/// Symmetric sparse coupling matrix `J`.
///
/// Off-diagonal entries are stored in compressed rows, both `(i, j)` and
/// `(j, i)`. Duplicate couplings accumulate. The diagonal is kept apart
/// because only some objectives give it meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingMatrix {
    n: usize,
    row_ptr: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
    diag: Vec<f64>,
    degree: Vec<f64>,
}

impl CouplingMatrix {
    /// Builds the matrix from validated couplings.
    ///
    /// Per-node storage is reserved fallibly so an absurd `n` is reported
    /// instead of aborting the process.
    fn build(n: usize, couplings: &[Coupling]) -> Result<Self, FormatError> {
        let too_many = |_| FormatError::TooManyNodes { nodes: n };
        let mut rows: Vec<Vec<(usize, f64)>> = Vec::new();
        rows.try_reserve_exact(n).map_err(too_many)?;
        rows.resize_with(n, Vec::new);
        let mut diag = Vec::new();
        diag.try_reserve_exact(n).map_err(too_many)?;
        diag.resize(n, 0.0);
        let mut degree = Vec::new();
        degree.try_reserve_exact(n).map_err(too_many)?;
        degree.resize(n, 0.0);
        let mut row_ptr = Vec::new();
        row_ptr.try_reserve_exact(n + 1).map_err(too_many)?;

        for c in couplings {
            if c.i == c.j {
                diag[c.i] += c.weight;
            } else {
                rows[c.i].push((c.j, c.weight));
                rows[c.j].push((c.i, c.weight));
            }
        }

        let mut cols = Vec::new();
        let mut vals = Vec::new();
        row_ptr.push(0);

        for (i, row) in rows.iter_mut().enumerate() {
            row.sort_by_key(|&(j, _)| j);
            let mut k = 0;
            while k < row.len() {
                let (j, mut w) = row[k];
                k += 1;
                while k < row.len() && row[k].0 == j {
                    w += row[k].1;
                    k += 1;
                }
                cols.push(j);
                vals.push(w);
                degree[i] += w;
            }
            row_ptr.push(cols.len());
        }

        Ok(Self {
            n,
            row_ptr,
            cols,
            vals,
            diag,
            degree,
        })
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Number of stored off-diagonal entries (each undirected coupling counts twice).
    pub fn nnz(&self) -> usize {
        self.cols.len()
    }

    /// Entry `J[i][j]`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return self.diag[i];
        }
        let cols = &self.cols[self.row_ptr[i]..self.row_ptr[i + 1]];
        match cols.binary_search(&j) {
            Ok(k) => self.vals[self.row_ptr[i] + k],
            Err(_) => 0.0,
        }
    }

    /// Off-diagonal entries of row `i` as `(column, weight)`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.cols[range.clone()]
            .iter()
            .copied()
            .zip(self.vals[range].iter().copied())
    }

    /// Nodes coupled to `i` (off-diagonal).
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.cols[self.row_ptr[i]..self.row_ptr[i + 1]]
    }

    /// Diagonal entry `J[i][i]`.
    pub fn diagonal(&self, i: usize) -> f64 {
        self.diag[i]
    }

    /// Weighted degree `Σ_j J[i][j]`, diagonal excluded.
    pub fn degree(&self, i: usize) -> f64 {
        self.degree[i]
    }

    /// Off-diagonal product `out = J x` (diagonal ignored).
    pub fn mul_vec(&self, x: &[f64], out: &mut [f64]) {
        debug_assert_eq!(x.len(), self.n);
        debug_assert_eq!(out.len(), self.n);
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.row(i).map(|(j, w)| w * x[j]).sum();
        }
    }

    /// Dense `n × n` copy, diagonal included.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.n]; self.n];
        for (i, row) in dense.iter_mut().enumerate() {
            row[i] = self.diag[i];
            for (j, w) in self.row(i) {
                row[j] = w;
            }
        }
        dense
    }
}

/// A weighted-graph problem instance.
///
/// Immutable once constructed. Two instances built from the same data
/// compare equal.
///
/// # Examples
///
/// ```
/// use u_fem::instance::ProblemInstance;
///
/// let square = ProblemInstance::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
/// assert_eq!(square.num_nodes(), 4);
/// assert_eq!(square.matrix().get(1, 0), 1.0);
/// assert_eq!(square.matrix().get(0, 2), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInstance {
    n: usize,
    couplings: Vec<Coupling>,
    matrix: CouplingMatrix,
}

impl ProblemInstance {
    /// Creates an instance from 0-indexed `(i, j, weight)` triples.
    pub fn from_couplings(n: usize, couplings: &[(usize, usize, f64)]) -> Result<Self, FormatError> {
        let couplings: Vec<Coupling> = couplings
            .iter()
            .map(|&(i, j, weight)| Coupling { i, j, weight })
            .collect();
        Self::new(n, couplings)
    }

    /// Creates an instance from unweighted 0-indexed edges (weight 1).
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self, FormatError> {
        let couplings: Vec<Coupling> = edges
            .iter()
            .map(|&(i, j)| Coupling { i, j, weight: 1.0 })
            .collect();
        Self::new(n, couplings)
    }

    /// Validates the couplings and builds the matrix.
    ///
    /// # Errors
    ///
    /// [`FormatError::TooManyNodes`] if storage for `n` nodes cannot be
    /// allocated, besides the coupling range and weight checks.
    pub fn new(n: usize, couplings: Vec<Coupling>) -> Result<Self, FormatError> {
        for c in &couplings {
            if c.i >= n || c.j >= n {
                return Err(FormatError::CouplingOutOfRange {
                    i: c.i,
                    j: c.j,
                    nodes: n,
                });
            }
            if !c.weight.is_finite() {
                return Err(FormatError::NonFiniteWeight {
                    i: c.i,
                    j: c.j,
                    weight: c.weight,
                });
            }
        }
        let matrix = CouplingMatrix::build(n, &couplings)?;
        Ok(Self {
            n,
            couplings,
            matrix,
        })
    }

    /// Number of nodes (binary variables).
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Number of couplings as declared (duplicates counted separately).
    pub fn num_couplings(&self) -> usize {
        self.couplings.len()
    }

    /// The coupling list in load order.
    pub fn couplings(&self) -> &[Coupling] {
        &self.couplings
    }

    /// The symmetric coupling matrix.
    pub fn matrix(&self) -> &CouplingMatrix {
        &self.matrix
    }

    /// Sum of all off-diagonal coupling weights.
    pub fn total_weight(&self) -> f64 {
        self.couplings
            .iter()
            .filter(|c| c.i != c.j)
            .map(|c| c.weight)
            .sum()
    }
}
