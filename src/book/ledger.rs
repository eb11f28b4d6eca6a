use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::Side;

/// One side of a symbol's book: a sorted price-to-quantity mapping.
///
/// Invariants: prices are unique and no level carries zero quantity.
/// Applying a zero quantity removes the level.
#[derive(Debug, Clone)]
pub struct PriceLevelLedger {
    side: Side,
    levels: BTreeMap<Decimal, Decimal>,
}

impl PriceLevelLedger {
    pub fn new(side: Side) -> Self {
        PriceLevelLedger {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Upsert or delete one level. A zero quantity removes the price
    /// (no-op when absent); anything else replaces the quantity.
    pub fn apply(&mut self, price: Decimal, quantity: Decimal) {
        if quantity.is_zero() {
            self.levels.remove(&price);
        } else {
            self.levels.insert(price, quantity);
        }
    }

    /// The touch: lowest ask or highest bid.
    pub fn best(&self) -> Option<Decimal> {
        match self.side {
            Side::Ask => self.levels.keys().next().copied(),
            Side::Bid => self.levels.keys().next_back().copied(),
        }
    }

    /// The k-th price out from the touch, 1-indexed. Returns zero when
    /// fewer than k levels are present; callers must treat that as
    /// insufficient depth, never as a real price.
    pub fn nth(&self, k: usize) -> Decimal {
        if k == 0 {
            return Decimal::ZERO;
        }
        let price = match self.side {
            Side::Ask => self.levels.keys().nth(k - 1),
            Side::Bid => self.levels.keys().rev().nth(k - 1),
        };
        price.copied().unwrap_or(Decimal::ZERO)
    }

    /// Approximate fill price for `target` units: walk levels out from the
    /// touch until the cumulative quantity first reaches the target and
    /// return the plain mean of the prices visited (not quantity-weighted).
    /// When total depth is below the target, the mean covers every level.
    pub fn unit_volume_weighted_price(&self, target: Decimal) -> Decimal {
        let mut cumulative = Decimal::ZERO;
        let mut price_sum = Decimal::ZERO;
        let mut visited = 0i64;

        for (price, quantity) in self.iter_from_best() {
            price_sum += price;
            cumulative += quantity;
            visited += 1;
            if cumulative >= target {
                break;
            }
        }

        if visited == 0 {
            Decimal::ZERO
        } else {
            price_sum / Decimal::from(visited)
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn iter_from_best(&self) -> Box<dyn Iterator<Item = (Decimal, Decimal)> + '_> {
        match self.side {
            Side::Ask => Box::new(self.levels.iter().map(|(p, q)| (*p, *q))),
            Side::Bid => Box::new(self.levels.iter().rev().map(|(p, q)| (*p, *q))),
        }
    }
}
