//! Minimal physical-unit collaborator.
//!
//! Arrays carry an optional [`Unit`]; the core only asks units three questions:
//! are two units compatible, what factor converts one into the other, and what
//! unit results from multiplying, dividing or raising to a power. A missing
//! unit is equivalent to [`Unit::dimensionless`].

use crate::error::{NamedArrayError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// A physical unit: a symbol, a scale relative to the base units, and the
/// exponents of each base dimension.
///
/// # Examples
///
/// ```
/// use naxis_core::Unit;
///
/// let m = Unit::meter();
/// let km = Unit::scaled("km", 1000.0, &m);
/// assert_eq!(km.conversion_factor(&m).unwrap(), 1000.0);
/// assert!(km.conversion_factor(&Unit::second()).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    symbol: String,
    scale: f64,
    dims: BTreeMap<String, i32>,
}

impl Unit {
    /// The unit of plain numbers.
    pub fn dimensionless() -> Self {
        Self {
            symbol: String::new(),
            scale: 1.0,
            dims: BTreeMap::new(),
        }
    }

    /// A base unit measuring one base dimension.
    pub fn base(symbol: impl Into<String>, dimension: impl Into<String>) -> Self {
        let mut dims = BTreeMap::new();
        dims.insert(dimension.into(), 1);
        Self {
            symbol: symbol.into(),
            scale: 1.0,
            dims,
        }
    }

    /// A unit equal to `scale` times `of`.
    pub fn scaled(symbol: impl Into<String>, scale: f64, of: &Unit) -> Self {
        Self {
            symbol: symbol.into(),
            scale: scale * of.scale,
            dims: of.dims.clone(),
        }
    }

    pub fn meter() -> Self {
        Self::base("m", "length")
    }

    pub fn second() -> Self {
        Self::base("s", "time")
    }

    pub fn kilogram() -> Self {
        Self::base("kg", "mass")
    }

    pub fn kelvin() -> Self {
        Self::base("K", "temperature")
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Whether this unit has no base dimensions.
    pub fn is_dimensionless(&self) -> bool {
        self.dims.is_empty()
    }

    /// Whether values in `self` can be expressed in `other`.
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dims == other.dims
    }

    /// Factor that converts a value in `self` to a value in `to`.
    ///
    /// # Errors
    ///
    /// [`NamedArrayError::IncompatibleUnits`] when the base dimensions differ.
    pub fn conversion_factor(&self, to: &Unit) -> Result<f64> {
        if !self.is_compatible(to) {
            return Err(NamedArrayError::IncompatibleUnits {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        Ok(self.scale / to.scale)
    }

    /// Product of two units.
    pub fn mul(&self, other: &Unit) -> Unit {
        let mut dims = self.dims.clone();
        for (dim, exp) in &other.dims {
            *dims.entry(dim.clone()).or_insert(0) += exp;
        }
        dims.retain(|_, exp| *exp != 0);
        Unit {
            symbol: join_symbols(&self.symbol, " ", &other.symbol),
            scale: self.scale * other.scale,
            dims,
        }
    }

    /// Quotient of two units.
    pub fn div(&self, other: &Unit) -> Unit {
        let mut dims = self.dims.clone();
        for (dim, exp) in &other.dims {
            *dims.entry(dim.clone()).or_insert(0) -= exp;
        }
        dims.retain(|_, exp| *exp != 0);
        let denominator = if other.symbol.is_empty() {
            String::new()
        } else {
            format!("/ {}", other.symbol)
        };
        Unit {
            symbol: join_symbols(&self.symbol, " ", &denominator),
            scale: self.scale / other.scale,
            dims,
        }
    }

    /// Integer power of this unit.
    pub fn powi(&self, n: i32) -> Unit {
        if n == 0 {
            return Unit::dimensionless();
        }
        let dims = self
            .dims
            .iter()
            .map(|(dim, exp)| (dim.clone(), exp * n))
            .collect();
        Unit {
            symbol: if self.symbol.is_empty() || n == 1 {
                self.symbol.clone()
            } else {
                format!("{}^{}", self.symbol, n)
            },
            scale: self.scale.powi(n),
            dims,
        }
    }

    /// Integer root of this unit, failing when an exponent is not divisible by `n`.
    pub fn root(&self, n: i32) -> Result<Unit> {
        if n <= 0 || self.dims.values().any(|exp| exp % n != 0) {
            return Err(NamedArrayError::IncompatibleUnits {
                from: self.to_string(),
                to: format!("root {}", n),
            });
        }
        Ok(Unit {
            symbol: if self.symbol.is_empty() {
                String::new()
            } else {
                format!("{}^(1/{})", self.symbol, n)
            },
            scale: self.scale.powf(1.0 / n as f64),
            dims: self
                .dims
                .iter()
                .map(|(dim, exp)| (dim.clone(), exp / n))
                .collect(),
        })
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbol.is_empty() {
            f.write_str("dimensionless")
        } else {
            f.write_str(&self.symbol)
        }
    }
}

fn join_symbols(a: &str, sep: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{}{}{}", a, sep, b),
    }
}

/// Normalize an optional unit, treating `None` as dimensionless.
pub fn unit_normalized(unit: Option<&Unit>) -> Unit {
    unit.cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_cancel() {
        let speed = Unit::meter().div(&Unit::second());
        let distance = speed.mul(&Unit::second());
        assert!(distance.is_compatible(&Unit::meter()));
        assert!(speed.div(&speed).is_dimensionless());
    }

    #[test]
    fn test_powi_and_root() {
        let area = Unit::meter().powi(2);
        let side = area.root(2).unwrap();
        assert!(side.is_compatible(&Unit::meter()));
        assert!(Unit::meter().root(2).is_err());
    }

    #[test]
    fn test_unit_normalized_default() {
        assert!(unit_normalized(None).is_dimensionless());
        assert_eq!(Unit::dimensionless().to_string(), "dimensionless");
    }
}
