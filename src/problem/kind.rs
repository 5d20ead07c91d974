//! Selecting a built-in problem by name.

use super::{MaxCut, MaximumIndependentSet, Problem, Qubo};
use std::fmt;
use std::str::FromStr;

/// The built-in problem families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProblemKind {
    #[default]
    MaxCut,
    Mis,
    Qubo,
}

impl ProblemKind {
    /// Builds the problem with default parameters.
    pub fn build(self) -> Box<dyn Problem> {
        match self {
            ProblemKind::MaxCut => Box::new(MaxCut),
            ProblemKind::Mis => Box::new(MaximumIndependentSet::default()),
            ProblemKind::Qubo => Box::new(Qubo::default()),
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProblemKind::MaxCut => "maxcut",
            ProblemKind::Mis => "mis",
            ProblemKind::Qubo => "qubo",
        };
        f.write_str(name)
    }
}

impl FromStr for ProblemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maxcut" | "max-cut" | "max_cut" => Ok(ProblemKind::MaxCut),
            "mis" | "max-independent-set" => Ok(ProblemKind::Mis),
            "qubo" => Ok(ProblemKind::Qubo),
            other => Err(format!("unknown problem `{other}` (expected maxcut, mis or qubo)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Sense;

    #[test]
    fn test_parse_and_display() {
        for kind in [ProblemKind::MaxCut, ProblemKind::Mis, ProblemKind::Qubo] {
            assert_eq!(kind.to_string().parse::<ProblemKind>(), Ok(kind));
        }
        assert_eq!("Max-Cut".parse::<ProblemKind>(), Ok(ProblemKind::MaxCut));
        assert!("tsp".parse::<ProblemKind>().is_err());
    }

    #[test]
    fn test_build() {
        assert_eq!(ProblemKind::MaxCut.build().name(), "maxcut");
        assert_eq!(ProblemKind::Mis.build().sense(), Sense::Maximize);
        assert_eq!(ProblemKind::Qubo.build().sense(), Sense::Minimize);
    }
}
