//! Support/resistance zones from a coarser timeframe.
//!
//! Raw extremes are bars strictly dominating the `window` bars on each
//! side. They are clustered greedily in scan order: a level within the
//! cluster tolerance of an existing zone is considered already represented,
//! so the first level seen wins. The surviving zones are kept sorted by
//! price.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Support,
    Resistance,
}

impl ZoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Support => "support",
            ZoneKind::Resistance => "resistance",
        }
    }
}

impl std::fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clustered price level. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub level: f64,
}

/// Scan for raw extremes: a bar is a support point if its low is strictly
/// below the minimum low of the `window` bars before and after it, and a
/// resistance point if its high strictly dominates both sides. A bar can
/// be both; the support point is recorded first.
pub fn raw_extremes(candles: &[Candle], window: usize) -> Vec<(ZoneKind, f64)> {
    let n = candles.len();
    let mut points = Vec::new();
    if window == 0 || n < 2 * window + 1 {
        return points;
    }
    for i in window..(n - window) {
        let low = candles[i].low;
        let high = candles[i].high;
        let before = &candles[i - window..i];
        let after = &candles[i + 1..i + 1 + window];

        let min_before = before.iter().fold(f64::INFINITY, |a, c| a.min(c.low));
        let min_after = after.iter().fold(f64::INFINITY, |a, c| a.min(c.low));
        if low < min_before && low < min_after {
            points.push((ZoneKind::Support, low));
        }

        let max_before = before.iter().fold(f64::NEG_INFINITY, |a, c| a.max(c.high));
        let max_after = after.iter().fold(f64::NEG_INFINITY, |a, c| a.max(c.high));
        if high > max_before && high > max_after {
            points.push((ZoneKind::Resistance, high));
        }
    }
    points
}

/// Clustered zone collection, sorted by level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    /// Detect and cluster zones from a candle sequence.
    pub fn detect(candles: &[Candle], window: usize, cluster_tolerance: f64) -> Self {
        let mut set = ZoneSet::default();
        for (kind, level) in raw_extremes(candles, window) {
            set.insert_clustered(kind, level, cluster_tolerance);
        }
        set
    }

    /// Add a level unless an existing zone already represents it. The
    /// tolerance is measured relative to the existing zone's level, and
    /// membership ignores zone kind.
    pub fn insert_clustered(&mut self, kind: ZoneKind, level: f64, tolerance: f64) {
        let represented = self
            .zones
            .iter()
            .any(|z| (level - z.level).abs() / z.level < tolerance);
        if represented {
            return;
        }
        let at = self.zones.partition_point(|z| z.level < level);
        self.zones.insert(at, Zone { kind, level });
    }

    /// Kind-blind proximity: any zone within `tolerance` (relative to the
    /// queried price).
    pub fn is_near(&self, price: f64, tolerance: f64) -> bool {
        self.zones
            .iter()
            .any(|z| (price - z.level).abs() / price < tolerance)
    }

    /// Proximity restricted to one zone kind.
    pub fn is_near_kind(&self, price: f64, kind: ZoneKind, tolerance: f64) -> bool {
        self.zones
            .iter()
            .filter(|z| z.kind == kind)
            .any(|z| (price - z.level).abs() / price < tolerance)
    }

    /// The level of the given kind closest to `price`, if any exists.
    pub fn nearest(&self, price: f64, kind: ZoneKind) -> Option<f64> {
        let mut best: Option<f64> = None;
        for zone in self.zones.iter().filter(|z| z.kind == kind) {
            match best {
                Some(level) if (price - level).abs() <= (price - zone.level).abs() => {}
                _ => best = Some(zone.level),
            }
        }
        best
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
