//! Line-based instance reader.
//!
//! ```text
//! n_nodes n_edges
//! i j [weight]
//! ...
//! ```
//!
//! Blank lines and lines starting with `#`, `%` or `c ` are skipped.
//! A missing weight defaults to `1.0`.

use super::types::{Coupling, ProblemInstance};
use crate::error::{FormatError, Result};
use std::path::Path;

/// Index base used by node indices in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexBase {
    /// Nodes are numbered `0..n`.
    Zero,
    /// Nodes are numbered `1..=n` (G-set convention).
    #[default]
    One,
}

impl IndexBase {
    fn offset(self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// Largest node count [`InstanceLoader`] accepts by default.
pub const DEFAULT_MAX_NODES: usize = 1 << 26;

/// Reads [`ProblemInstance`]s from text.
///
/// Headers declaring more than [`max_nodes`](Self::with_max_nodes) nodes
/// (default [`DEFAULT_MAX_NODES`]) are rejected before any per-node
/// storage is allocated.
///
/// # Examples
///
/// ```
/// use u_fem::instance::{IndexBase, InstanceLoader};
///
/// let text = "3 2\n0 1 1.5\n1 2\n";
/// let inst = InstanceLoader::new()
///     .with_index_base(IndexBase::Zero)
///     .parse(text)
///     .unwrap();
/// assert_eq!(inst.num_nodes(), 3);
/// assert_eq!(inst.matrix().get(1, 2), 1.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InstanceLoader {
    index_base: IndexBase,
    max_nodes: usize,
}

impl Default for InstanceLoader {
    fn default() -> Self {
        Self {
            index_base: IndexBase::default(),
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl InstanceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_base(mut self, base: IndexBase) -> Self {
        self.index_base = base;
        self
    }

    /// Sets the largest node count a header may declare.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Reads and parses the file at `path`.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ProblemInstance> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.parse(&text)?)
    }

    /// Parses an instance from in-memory text.
    pub fn parse(&self, text: &str) -> Result<ProblemInstance, FormatError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !is_skipped(line));

        let (header_line, header) = lines.next().ok_or(FormatError::MissingHeader)?;
        let (n, declared) = parse_header(header_line, header)?;
        if n > self.max_nodes {
            return Err(FormatError::NodeLimit {
                line: header_line,
                nodes: n,
                max: self.max_nodes,
            });
        }

        let mut couplings = Vec::with_capacity(declared.min(1 << 20));
        for (line_no, line) in lines {
            couplings.push(self.parse_coupling(line_no, line, n)?);
        }

        if couplings.len() != declared {
            return Err(FormatError::EdgeCountMismatch {
                declared,
                found: couplings.len(),
            });
        }

        ProblemInstance::new(n, couplings)
    }

    fn parse_coupling(&self, line: usize, content: &str, n: usize) -> Result<Coupling, FormatError> {
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() < 2 || fields.len() > 3 {
            return Err(FormatError::FieldCount {
                line,
                found: fields.len(),
            });
        }

        let i = self.parse_index(line, fields[0], n)?;
        let j = self.parse_index(line, fields[1], n)?;
        let weight = match fields.get(2) {
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite())
                .ok_or_else(|| FormatError::InvalidField {
                    line,
                    field: "weight",
                    value: raw.to_string(),
                })?,
            None => 1.0,
        };

        Ok(Coupling { i, j, weight })
    }

    fn parse_index(&self, line: usize, raw: &str, n: usize) -> Result<usize, FormatError> {
        let index = raw.parse::<usize>().map_err(|_| FormatError::InvalidField {
            line,
            field: "node index",
            value: raw.to_string(),
        })?;
        let offset = self.index_base.offset();
        if index < offset || index - offset >= n {
            return Err(FormatError::NodeOutOfRange {
                line,
                index,
                nodes: n,
            });
        }
        Ok(index - offset)
    }
}

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with('%') || line.starts_with("c ")
}

fn parse_header(line: usize, content: &str) -> Result<(usize, usize), FormatError> {
    let malformed = || FormatError::MalformedHeader {
        line,
        content: content.to_string(),
    };
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(malformed());
    }
    let n = fields[0].parse::<usize>().map_err(|_| malformed())?;
    let m = fields[1].parse::<usize>().map_err(|_| malformed())?;
    Ok((n, m))
}
