//! Pip specifications — per-symbol price increment and monetary value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pip definition for one instrument.
///
/// `pip_size` is the price increment counted as one pip; `pip_value` is the
/// money moved by a one-pip change per standard lot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipSpec {
    pub pip_size: f64,
    pub pip_value: f64,
}

impl PipSpec {
    pub fn new(pip_size: f64, pip_value: f64) -> Self {
        Self {
            pip_size,
            pip_value,
        }
    }

    /// Converts an absolute price distance into pips.
    pub fn pips(&self, price_distance: f64) -> f64 {
        price_distance / self.pip_size
    }
}

impl Default for PipSpec {
    /// Fallback for symbols without an explicit entry: standard 4-decimal FX.
    fn default() -> Self {
        Self {
            pip_size: 0.0001,
            pip_value: 10.0,
        }
    }
}

/// Static per-symbol pip table with a default fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipTable {
    specs: BTreeMap<String, PipSpec>,
    fallback: PipSpec,
}

impl PipTable {
    /// The broker-corrected instrument set the engine ships with.
    pub fn builtin() -> Self {
        let mut specs = BTreeMap::new();
        specs.insert("XAUUSDm".to_string(), PipSpec::new(0.01, 1.0));
        specs.insert("US500m".to_string(), PipSpec::new(1.0, 1.0));
        specs.insert("USDJPYm".to_string(), PipSpec::new(0.01, 9.5));
        specs.insert("GBPUSDm".to_string(), PipSpec::new(0.0001, 10.0));
        specs.insert("GBPJPYm".to_string(), PipSpec::new(0.01, 9.5));
        specs.insert("USDCHFm".to_string(), PipSpec::new(0.0001, 10.0));
        specs.insert("AUDUSDm".to_string(), PipSpec::new(0.0001, 10.0));
        specs.insert("EURJPYm".to_string(), PipSpec::new(0.01, 9.5));
        specs.insert("BTCUSDm".to_string(), PipSpec::new(0.01, 1.0));
        Self {
            specs,
            fallback: PipSpec::default(),
        }
    }

    pub fn empty() -> Self {
        Self {
            specs: BTreeMap::new(),
            fallback: PipSpec::default(),
        }
    }

    /// Merges configured overrides on top of the existing entries.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, PipSpec>) -> Self {
        for (symbol, spec) in overrides {
            self.specs.insert(symbol.clone(), *spec);
        }
        self
    }

    /// Looks up the spec for a symbol, falling back to the default for
    /// unknown instruments.
    pub fn spec_for(&self, symbol: &str) -> PipSpec {
        self.specs.get(symbol).copied().unwrap_or(self.fallback)
    }
}

impl Default for PipTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_gold_and_indices() {
        let table = PipTable::builtin();
        assert_eq!(table.spec_for("XAUUSDm"), PipSpec::new(0.01, 1.0));
        assert_eq!(table.spec_for("US500m"), PipSpec::new(1.0, 1.0));
        assert_eq!(table.spec_for("GBPUSDm"), PipSpec::new(0.0001, 10.0));
    }

    #[test]
    fn unknown_symbol_falls_back_to_default() {
        let table = PipTable::builtin();
        assert_eq!(table.spec_for("EURUSDm"), PipSpec::default());
    }

    #[test]
    fn overrides_replace_builtin_entries() {
        let mut overrides = BTreeMap::new();
        overrides.insert("XAUUSDm".to_string(), PipSpec::new(0.1, 1.0));
        overrides.insert("ETHUSDm".to_string(), PipSpec::new(0.01, 1.0));
        let table = PipTable::builtin().with_overrides(&overrides);
        assert_eq!(table.spec_for("XAUUSDm"), PipSpec::new(0.1, 1.0));
        assert_eq!(table.spec_for("ETHUSDm"), PipSpec::new(0.01, 1.0));
        // untouched entries survive
        assert_eq!(table.spec_for("USDJPYm"), PipSpec::new(0.01, 9.5));
    }

    #[test]
    fn pip_distance_conversion() {
        let spec = PipSpec::new(0.01, 1.0);
        assert_eq!(spec.pips(1.0), 100.0);
    }
}
