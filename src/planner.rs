//! Trade planning: the buy/sell list that restores target allocations.
//!
//! The planner sizes trades in USD from percentage deltas. It knows nothing
//! about fees, slippage, or partial execution — those belong to the
//! execution collaborator consuming the plan.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::Symbol;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A single trade instruction. Produced fresh per planning run, never
/// mutated; `usd_amount` is always positive.
#[derive(Debug, Clone, Serialize)]
pub struct TradeInstruction {
    pub symbol: Symbol,
    pub side: Side,
    pub usd_amount: f64,
}

/// Deltas below one cent are noise, never actionable.
const CENT_EPSILON_USD: f64 = 0.01;

/// Compute the trade list that moves the portfolio back to target.
///
/// For each asset in the union of current weights and targets:
/// `delta_usd = (target_pct − current_pct) / 100 * total_value_usd`.
/// Assets within the skip threshold (`min_trade_usd`, floored at one cent)
/// produce no instruction. Output ordering is sells before buys, larger
/// amounts first within each side; sell proceeds fund the buys, so a
/// downstream executor can run sells to completion before buying.
///
/// Fails with [`Error::InvalidPortfolioValue`] if `total_value_usd <= 0`;
/// planning is meaningless without a value basis.
pub fn plan(
    current_pct: &FxHashMap<Symbol, f64>,
    targets: &[(Symbol, f64)],
    total_value_usd: f64,
    min_trade_usd: f64,
) -> Result<Vec<TradeInstruction>> {
    if !(total_value_usd > 0.0) {
        return Err(Error::InvalidPortfolioValue(total_value_usd));
    }

    let skip_below = min_trade_usd.max(CENT_EPSILON_USD);
    let target_map: FxHashMap<Symbol, f64> = targets.iter().copied().collect();

    let mut all_symbols: Vec<Symbol> = current_pct.keys().copied().collect();
    for &(sym, _) in targets {
        if !current_pct.contains_key(&sym) {
            all_symbols.push(sym);
        }
    }
    all_symbols.sort();
    all_symbols.dedup();

    let mut sells = Vec::new();
    let mut buys = Vec::new();

    for sym in all_symbols {
        let current = current_pct.get(&sym).copied().unwrap_or(0.0);
        let target = target_map.get(&sym).copied().unwrap_or(0.0);
        let delta_usd = (target - current) / 100.0 * total_value_usd;

        if delta_usd >= skip_below {
            buys.push(TradeInstruction {
                symbol: sym,
                side: Side::Buy,
                usd_amount: delta_usd,
            });
        } else if delta_usd <= -skip_below {
            sells.push(TradeInstruction {
                symbol: sym,
                side: Side::Sell,
                usd_amount: -delta_usd,
            });
        }
    }

    // Largest amounts first; symbol as tie-break keeps the order stable
    let by_amount_desc = |a: &TradeInstruction, b: &TradeInstruction| {
        b.usd_amount
            .partial_cmp(&a.usd_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    };
    sells.sort_by(by_amount_desc);
    buys.sort_by(by_amount_desc);

    sells.extend(buys);
    Ok(sells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc() -> Symbol {
        Symbol::new("BTC")
    }
    fn eth() -> Symbol {
        Symbol::new("ETH")
    }
    fn usdc() -> Symbol {
        Symbol::new("USDC")
    }

    fn current(entries: &[(Symbol, f64)]) -> FxHashMap<Symbol, f64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn basic_rebalance() {
        // {BTC:68, ETH:22, USDC:10} vs {60, 30, 10} on $10,000
        let current = current(&[(btc(), 68.0), (eth(), 22.0), (usdc(), 10.0)]);
        let targets = vec![(btc(), 60.0), (eth(), 30.0), (usdc(), 10.0)];

        let trades = plan(&current, &targets, 10_000.0, 0.0).unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].symbol, btc());
        assert_eq!(trades[0].side, Side::Sell);
        assert!((trades[0].usd_amount - 800.0).abs() < 1e-6);
        assert_eq!(trades[1].symbol, eth());
        assert_eq!(trades[1].side, Side::Buy);
        assert!((trades[1].usd_amount - 800.0).abs() < 1e-6);
    }

    #[test]
    fn at_target_returns_empty_plan() {
        let current = current(&[(btc(), 60.0), (eth(), 30.0), (usdc(), 10.0)]);
        let targets = vec![(btc(), 60.0), (eth(), 30.0), (usdc(), 10.0)];

        let trades = plan(&current, &targets, 10_000.0, 0.0).unwrap();
        assert!(trades.is_empty());
    }

    #[test]
    fn zero_portfolio_value_rejected() {
        let current = current(&[(btc(), 100.0)]);
        let targets = vec![(btc(), 100.0)];
        assert!(matches!(
            plan(&current, &targets, 0.0, 0.0),
            Err(Error::InvalidPortfolioValue(_))
        ));
    }

    #[test]
    fn negative_portfolio_value_rejected() {
        let current = FxHashMap::default();
        assert!(matches!(
            plan(&current, &[], -10.0, 0.0),
            Err(Error::InvalidPortfolioValue(_))
        ));
    }

    #[test]
    fn sells_before_buys_descending_amounts() {
        // BTC -20%, ETH -5%, SOL +10%, USDC +15% on $1,000
        let sol = Symbol::new("SOL");
        let current = current(&[(btc(), 50.0), (eth(), 25.0), (sol, 10.0), (usdc(), 15.0)]);
        let targets = vec![(btc(), 30.0), (eth(), 20.0), (sol, 20.0), (usdc(), 30.0)];

        let trades = plan(&current, &targets, 1_000.0, 0.0).unwrap();

        assert_eq!(trades.len(), 4);
        // Sells first, by descending amount
        assert_eq!(trades[0].side, Side::Sell);
        assert_eq!(trades[0].symbol, btc());
        assert!((trades[0].usd_amount - 200.0).abs() < 1e-6);
        assert_eq!(trades[1].side, Side::Sell);
        assert_eq!(trades[1].symbol, eth());
        assert!((trades[1].usd_amount - 50.0).abs() < 1e-6);
        // Then buys, by descending amount
        assert_eq!(trades[2].side, Side::Buy);
        assert_eq!(trades[2].symbol, usdc());
        assert!((trades[2].usd_amount - 150.0).abs() < 1e-6);
        assert_eq!(trades[3].side, Side::Buy);
        assert_eq!(trades[3].symbol, sol);
        assert!((trades[3].usd_amount - 100.0).abs() < 1e-6);
    }

    #[test]
    fn sell_and_buy_totals_balance() {
        let current = current(&[(btc(), 68.0), (eth(), 22.0), (usdc(), 10.0)]);
        let targets = vec![(btc(), 60.0), (eth(), 30.0), (usdc(), 10.0)];

        let trades = plan(&current, &targets, 10_000.0, 0.0).unwrap();

        let sell_total: f64 = trades
            .iter()
            .filter(|t| t.side == Side::Sell)
            .map(|t| t.usd_amount)
            .sum();
        let buy_total: f64 = trades
            .iter()
            .filter(|t| t.side == Side::Buy)
            .map(|t| t.usd_amount)
            .sum();
        assert!((sell_total - buy_total).abs() < 0.01);
    }

    #[test]
    fn untargeted_holding_fully_liquidated() {
        let doge = Symbol::new("DOGE");
        let current = current(&[(btc(), 90.0), (doge, 10.0)]);
        let targets = vec![(btc(), 100.0)];

        let trades = plan(&current, &targets, 5_000.0, 0.0).unwrap();

        let sell = trades.iter().find(|t| t.symbol == doge).unwrap();
        assert_eq!(sell.side, Side::Sell);
        assert!((sell.usd_amount - 500.0).abs() < 1e-6);
    }

    #[test]
    fn unheld_target_bought_in() {
        let current = current(&[(btc(), 100.0)]);
        let targets = vec![(btc(), 90.0), (eth(), 10.0)];

        let trades = plan(&current, &targets, 2_000.0, 0.0).unwrap();

        let buy = trades.iter().find(|t| t.symbol == eth()).unwrap();
        assert_eq!(buy.side, Side::Buy);
        assert!((buy.usd_amount - 200.0).abs() < 1e-6);
    }

    #[test]
    fn min_trade_filters_dust() {
        // ETH delta is $5, below the $50 floor; BTC delta is $100
        let current = current(&[(btc(), 60.0), (eth(), 39.5), (usdc(), 0.5)]);
        let targets = vec![(btc(), 50.0), (eth(), 40.0), (usdc(), 10.0)];

        let trades = plan(&current, &targets, 1_000.0, 50.0).unwrap();

        assert!(trades.iter().all(|t| t.usd_amount >= 50.0));
        assert!(trades.iter().any(|t| t.symbol == btc()));
        assert!(!trades.iter().any(|t| t.symbol == eth()));
    }

    #[test]
    fn no_non_positive_amounts() {
        let current = current(&[(btc(), 68.0), (eth(), 22.0), (usdc(), 10.0)]);
        let targets = vec![(btc(), 60.0), (eth(), 30.0), (usdc(), 10.0)];

        let trades = plan(&current, &targets, 10_000.0, 0.0).unwrap();
        assert!(trades.iter().all(|t| t.usd_amount > 0.0));
    }
}
