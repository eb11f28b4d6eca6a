use rust_decimal::Decimal;
use thiserror::Error;

use super::{PriceLevelLedger, Side};

/// Depth level reported alongside the touch in the derived tuple.
const PROBE_LEVEL: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("invalid price {0:?}")]
    InvalidPrice(String),
    #[error("invalid quantity {0:?}")]
    InvalidQuantity(String),
}

/// Prices derived from the book after one applied event.
///
/// `tenth_bid`/`tenth_ask` carry the zero sentinel when the side holds
/// fewer than ten levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookTouch {
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub tenth_bid: Decimal,
    pub tenth_ask: Decimal,
    pub bid_unit_price: Decimal,
    pub ask_unit_price: Decimal,
}

/// Both sides of one symbol's book.
///
/// Best bid below best ask holds while the replica is synchronized; it is
/// not enforced here, since a desynchronized book may transiently cross.
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: PriceLevelLedger,
    asks: PriceLevelLedger,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook {
            bids: PriceLevelLedger::new(Side::Bid),
            asks: PriceLevelLedger::new(Side::Ask),
        }
    }

    /// Apply one event's level updates to both sides, in wire order within
    /// a side, and return the derived touch tuple.
    ///
    /// Every level is parsed before any is applied, so an unparsable price
    /// or quantity fails the whole batch without mutating the book.
    pub fn apply(
        &mut self,
        bids: &[[String; 2]],
        asks: &[[String; 2]],
    ) -> Result<BookTouch, BookError> {
        let bid_levels = parse_levels(bids)?;
        let ask_levels = parse_levels(asks)?;

        for (price, quantity) in bid_levels {
            self.bids.apply(price, quantity);
        }
        for (price, quantity) in ask_levels {
            self.asks.apply(price, quantity);
        }

        Ok(self.touch())
    }

    /// The current derived tuple without mutating the book.
    pub fn touch(&self) -> BookTouch {
        BookTouch {
            best_bid: self.bids.best(),
            best_ask: self.asks.best(),
            tenth_bid: self.bids.nth(PROBE_LEVEL),
            tenth_ask: self.asks.nth(PROBE_LEVEL),
            bid_unit_price: self.bids.unit_volume_weighted_price(Decimal::ONE),
            ask_unit_price: self.asks.unit_volume_weighted_price(Decimal::ONE),
        }
    }

    pub fn bids(&self) -> &PriceLevelLedger {
        &self.bids
    }

    pub fn asks(&self) -> &PriceLevelLedger {
        &self.asks
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_levels(levels: &[[String; 2]]) -> Result<Vec<(Decimal, Decimal)>, BookError> {
    levels
        .iter()
        .map(|[price, quantity]| {
            let p = price
                .parse::<Decimal>()
                .map_err(|_| BookError::InvalidPrice(price.clone()))?;
            let q = quantity
                .parse::<Decimal>()
                .map_err(|_| BookError::InvalidQuantity(quantity.clone()))?;
            Ok((p, q))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: &str, quantity: &str) -> [String; 2] {
        [price.to_string(), quantity.to_string()]
    }

    #[test]
    fn test_apply_both_sides() {
        let mut book = OrderBook::new();
        let touch = book
            .apply(
                &[level("50000.00", "1.000"), level("49999.00", "2.000")],
                &[level("50001.00", "0.500")],
            )
            .unwrap();

        assert_eq!(touch.best_bid, Some(dec!(50000.00)));
        assert_eq!(touch.best_ask, Some(dec!(50001.00)));
        assert_eq!(touch.tenth_bid, Decimal::ZERO);
        assert_eq!(touch.tenth_ask, Decimal::ZERO);
    }

    #[test]
    fn test_repeated_price_last_write_wins() {
        let mut book = OrderBook::new();
        book.apply(
            &[level("100", "5"), level("100", "3")],
            &[],
        )
        .unwrap();
        assert_eq!(book.bids().depth(), 1);
        assert_eq!(book.bids().best(), Some(dec!(100)));
    }

    #[test]
    fn test_differently_formatted_zero_removes() {
        let mut book = OrderBook::new();
        book.apply(&[], &[level("101", "1.5")]).unwrap();
        // "0" and "0.000" both parse to numeric zero.
        let touch = book.apply(&[], &[level("101", "0")]).unwrap();
        assert_eq!(touch.best_ask, None);
    }

    #[test]
    fn test_tenth_level_reported() {
        let mut book = OrderBook::new();
        let asks: Vec<[String; 2]> = (1..=12)
            .map(|i| level(&format!("{}", 100 + i), "1"))
            .collect();
        let touch = book.apply(&[], &asks).unwrap();
        assert_eq!(touch.best_ask, Some(dec!(101)));
        assert_eq!(touch.tenth_ask, dec!(110));
    }

    #[test]
    fn test_bad_quantity_leaves_book_untouched() {
        let mut book = OrderBook::new();
        book.apply(&[level("100", "1")], &[]).unwrap();

        let err = book
            .apply(&[level("101", "2"), level("102", "not-a-number")], &[])
            .unwrap_err();
        assert_eq!(err, BookError::InvalidQuantity("not-a-number".to_string()));
        // The parsable first level must not have been applied either.
        assert_eq!(book.bids().depth(), 1);
        assert_eq!(book.bids().best(), Some(dec!(100)));
    }

    #[test]
    fn test_unit_prices_in_touch() {
        let mut book = OrderBook::new();
        let touch = book
            .apply(&[], &[level("100", "0.4"), level("101", "0.7")])
            .unwrap();
        assert_eq!(touch.ask_unit_price, dec!(100.5));
        assert_eq!(touch.bid_unit_price, Decimal::ZERO);
    }
}
