//! Data-driven boundary predicate
//!
//! In production the predicate is compiled in; this description lets a build
//! script feed the generator from a JSON file instead.
//!
//! ```json
//! { "lsize": 3, "rsize": 4, "default": false, "exceptions": [[0, 1], [2, 3]] }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::segmenter_bitarray::validate_dimensions;
use crate::error::{GenError, Result};

/// Grid dimensions plus the cells that differ from `default`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryRules {
    pub lsize: usize,
    pub rsize: usize,
    /// Value of every cell not listed in `exceptions`
    #[serde(default)]
    pub default: bool,
    /// `[l, r]` cells whose value is `!default`
    #[serde(default)]
    pub exceptions: Vec<[usize; 2]>,
}

impl BoundaryRules {
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self =
            serde_json::from_str(json).map_err(|e| GenError::Configuration(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Dimensions must be valid and every exception must lie inside the grid
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.lsize, self.rsize)?;
        if let Some([l, r]) = self
            .exceptions
            .iter()
            .find(|[l, r]| *l >= self.lsize || *r >= self.rsize)
        {
            return Err(GenError::Configuration(format!(
                "exception ({}, {}) outside {}x{} grid",
                l, r, self.lsize, self.rsize
            )));
        }
        Ok(())
    }

    /// Build the predicate closure
    pub fn predicate(&self) -> impl Fn(usize, usize) -> bool {
        let exceptions: HashSet<(usize, usize)> =
            self.exceptions.iter().map(|&[l, r]| (l, r)).collect();
        let default = self.default;
        move |l, r| exceptions.contains(&(l, r)) != default
    }
}
