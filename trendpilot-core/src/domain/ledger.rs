//! Position ledger: held shares, weighted-average cost, realized PnL.

use serde::{Deserialize, Serialize};

/// Holdings below this are treated as flat and reset to exactly zero.
pub const LEDGER_EPSILON: f64 = 1e-12;

/// Running account of one instrument's open lot.
///
/// `cost_basis` is the total cost of the shares currently held at
/// weighted-average cost. `max_held_shares` is a high-water mark and never
/// decreases during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLedger {
    pub held_shares: f64,
    pub cost_basis: f64,
    pub realized_pnl: f64,
    pub max_held_shares: f64,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Average cost per held share, 0 when flat.
    pub fn avg_cost(&self) -> f64 {
        if self.held_shares > 0.0 {
            self.cost_basis / self.held_shares
        } else {
            0.0
        }
    }

    pub fn is_flat(&self) -> bool {
        self.held_shares <= 0.0
    }

    /// Apply a confirmed fill of signed `size` (positive = bought) at `price`.
    ///
    /// Returns the realized PnL produced by this fill (always 0 for buys).
    pub fn apply_fill(&mut self, size: f64, price: f64) -> f64 {
        let avg_cost = self.avg_cost();

        let realized = if size < 0.0 {
            -size * (price - avg_cost)
        } else {
            0.0
        };
        self.realized_pnl += realized;

        // `size * price + realized` equals `size * avg_cost` on sells and
        // `size * price` on buys, so the open lot stays at weighted-average cost.
        // A plain `size * price` on sells would move the average cost of the
        // remaining shares and can drive the basis negative after a gain.
        self.held_shares += size;
        self.cost_basis += size * price + realized;

        if self.held_shares < LEDGER_EPSILON {
            self.held_shares = 0.0;
            self.cost_basis = 0.0;
        }
        if self.cost_basis < 0.0 {
            self.cost_basis = 0.0;
        }

        self.max_held_shares = self.max_held_shares.max(self.held_shares);
        realized
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.held_shares * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.market_value(price) - self.cost_basis
    }

    /// Return on the open lot only, `None` when nothing is held at cost.
    pub fn hold_roi(&self, price: f64) -> Option<f64> {
        (self.cost_basis > 0.0).then(|| self.unrealized_pnl(price) / self.cost_basis)
    }

    /// Shares that may be sold without breaching the bottom-ratio floor.
    pub fn reducible_shares(&self, bottom_ratio: f64) -> f64 {
        let floor = self.max_held_shares * bottom_ratio;
        (self.held_shares - floor).max(0.0)
    }
}
