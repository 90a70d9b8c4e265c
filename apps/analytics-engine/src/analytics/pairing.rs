//! FIFO pairing of OPEN and CLOSE executions into realized round trips.
//!
//! Each instrument keeps one FIFO queue of open legs. A CLOSE consumes the
//! oldest leg regardless of the CLOSE's own stated direction — the realized
//! PnL follows the direction recorded on the popped leg. Input is
//! defensively re-sorted by timestamp with a stable sort, so ties keep the
//! engine's original sequence order.

use std::collections::{HashMap, VecDeque};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Direction, Offset, Trade};

/// One completed round trip produced by FIFO matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePair {
    /// Instrument symbol.
    pub symbol: String,
    /// Direction of the opening leg.
    pub direction: Direction,
    /// Opening execution timestamp.
    pub entry_time: NaiveDateTime,
    /// Closing execution timestamp.
    pub exit_time: NaiveDateTime,
    /// Opening price.
    pub entry_price: Decimal,
    /// Closing price.
    pub exit_price: Decimal,
    /// Matched volume: the smaller of the two legs.
    pub volume: i64,
    /// Realized PnL over the matched volume.
    pub pnl: Decimal,
}

impl TradePair {
    /// Whether this round trip was profitable.
    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}

struct OpenLeg {
    direction: Direction,
    price: Decimal,
    volume: i64,
    timestamp: NaiveDateTime,
}

/// Pair OPEN trades with subsequent CLOSE trades per instrument.
///
/// A CLOSE with no open leg on its instrument's queue is a data-quality
/// case, not an error: it is dropped with a logged warning and produces no
/// pair. When a CLOSE is smaller than the oldest open leg, the unconsumed
/// remainder stays at the front of the queue for the next CLOSE; when it
/// is larger, only the oldest leg is consumed and the excess close volume
/// is dropped.
#[must_use]
pub fn pair_trades(trades: &[Trade]) -> Vec<TradePair> {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.timestamp);

    let mut open_legs: HashMap<&str, VecDeque<OpenLeg>> = HashMap::new();
    let mut pairs = Vec::new();

    for trade in ordered {
        match trade.offset {
            Offset::Open => {
                open_legs
                    .entry(trade.symbol.as_str())
                    .or_default()
                    .push_back(OpenLeg {
                        direction: trade.direction,
                        price: trade.price,
                        volume: trade.volume,
                        timestamp: trade.timestamp,
                    });
            }
            Offset::Close => {
                let Some(leg) = open_legs
                    .get_mut(trade.symbol.as_str())
                    .and_then(VecDeque::pop_front)
                else {
                    warn!(
                        symbol = %trade.symbol,
                        timestamp = %trade.timestamp,
                        "unmatched CLOSE with no prior OPEN, dropping"
                    );
                    continue;
                };

                let matched = leg.volume.min(trade.volume);
                let quantity = Decimal::from(matched);
                let pnl = match leg.direction {
                    Direction::Long => (trade.price - leg.price) * quantity,
                    Direction::Short => (leg.price - trade.price) * quantity,
                };

                pairs.push(TradePair {
                    symbol: trade.symbol.clone(),
                    direction: leg.direction,
                    entry_time: leg.timestamp,
                    exit_time: trade.timestamp,
                    entry_price: leg.price,
                    exit_price: trade.price,
                    volume: matched,
                    pnl,
                });

                if leg.volume > trade.volume {
                    // The oldest open volume is only partially closed;
                    // the remainder stays first in line.
                    let remainder = leg.volume - trade.volume;
                    if let Some(queue) = open_legs.get_mut(trade.symbol.as_str()) {
                        queue.push_front(OpenLeg {
                            direction: leg.direction,
                            price: leg.price,
                            volume: remainder,
                            timestamp: leg.timestamp,
                        });
                    }
                } else if trade.volume > leg.volume {
                    debug!(
                        symbol = %trade.symbol,
                        excess = trade.volume - leg.volume,
                        "close volume exceeds oldest open leg, excess dropped"
                    );
                }
            }
        }
    }

    pairs
}
