mod ledger;
mod order_book;

pub use ledger::PriceLevelLedger;
pub use order_book::{BookError, BookTouch, OrderBook};

/// Side of the book a ledger holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}
