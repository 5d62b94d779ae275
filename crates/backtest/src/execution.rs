//! Paper portfolio: remembers which instruments are targeted, nothing more.
//!
//! There are no fills, prices, or cash here. A non-zero target weight marks
//! the instrument as invested until it is liquidated or re-targeted at zero;
//! flat instruments stay listed as not invested.

use put_overlay_core::types::{Holding, InstrumentKind, PortfolioTarget};
use rust_decimal::Decimal;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PaperPosition {
    id: String,
    kind: InstrumentKind,
    weight: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct PaperPortfolio {
    positions: Vec<PaperPosition>,
}

impl PaperPortfolio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current holdings in the order they were first targeted.
    #[must_use]
    pub fn holdings(&self) -> Vec<Holding> {
        self.positions
            .iter()
            .map(|p| Holding {
                id: p.id.clone(),
                kind: p.kind,
                invested: !p.weight.is_zero(),
            })
            .collect()
    }

    #[must_use]
    pub fn weight(&self, id: &str) -> Decimal {
        self.positions
            .iter()
            .find(|p| p.id == id)
            .map_or(Decimal::ZERO, |p| p.weight)
    }

    /// Zeroes the weight of `id`. Liquidating something not held is a no-op.
    pub fn liquidate(&mut self, id: &str) {
        match self.positions.iter_mut().find(|p| p.id == id) {
            Some(position) => {
                debug!(id, previous = %position.weight, "Liquidated");
                position.weight = Decimal::ZERO;
            }
            None => warn!(id, "Liquidation requested for instrument not held"),
        }
    }

    /// Applies target weights. Instruments missing from `targets` keep their
    /// current weight.
    pub fn apply_targets<F>(&mut self, targets: &[PortfolioTarget], kind_of: F)
    where
        F: Fn(&str) -> InstrumentKind,
    {
        for target in targets {
            match self.positions.iter_mut().find(|p| p.id == target.instrument) {
                Some(position) => position.weight = target.weight,
                None => self.positions.push(PaperPosition {
                    id: target.instrument.clone(),
                    kind: kind_of(&target.instrument),
                    weight: target.weight,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kind_of(id: &str) -> InstrumentKind {
        if id.starts_with('P') {
            InstrumentKind::Option
        } else {
            InstrumentKind::Equity
        }
    }

    #[test]
    fn targets_mark_instruments_invested() {
        let mut portfolio = PaperPortfolio::new();
        portfolio.apply_targets(
            &[
                PortfolioTarget::new("SPY", dec!(0.95)),
                PortfolioTarget::new("P85", dec!(0.05)),
            ],
            kind_of,
        );

        assert_eq!(
            portfolio.holdings(),
            vec![
                Holding {
                    id: "SPY".to_string(),
                    kind: InstrumentKind::Equity,
                    invested: true,
                },
                Holding {
                    id: "P85".to_string(),
                    kind: InstrumentKind::Option,
                    invested: true,
                },
            ]
        );
        assert_eq!(portfolio.weight("P85"), dec!(0.05));
    }

    #[test]
    fn liquidated_option_is_no_longer_invested() {
        let mut portfolio = PaperPortfolio::new();
        portfolio.apply_targets(&[PortfolioTarget::new("P85", dec!(0.05))], kind_of);
        portfolio.liquidate("P85");
        portfolio.liquidate("P80");

        assert!(portfolio.holdings().iter().all(|h| !h.invested));
        assert_eq!(portfolio.weight("P85"), Decimal::ZERO);
    }

    #[test]
    fn untargeted_positions_keep_weight() {
        let mut portfolio = PaperPortfolio::new();
        portfolio.apply_targets(
            &[
                PortfolioTarget::new("SPY", dec!(0.95)),
                PortfolioTarget::new("P85", dec!(0.05)),
            ],
            kind_of,
        );
        portfolio.apply_targets(&[PortfolioTarget::new("SPY", Decimal::ONE)], kind_of);

        assert_eq!(portfolio.weight("SPY"), Decimal::ONE);
        assert_eq!(portfolio.weight("P85"), dec!(0.05));
    }

    #[test]
    fn zero_weight_target_is_not_invested() {
        let mut portfolio = PaperPortfolio::new();
        portfolio.apply_targets(&[PortfolioTarget::new("P85", dec!(0.05))], kind_of);
        portfolio.apply_targets(&[PortfolioTarget::new("P85", Decimal::ZERO)], kind_of);

        let holdings = portfolio.holdings();
        assert_eq!(holdings.len(), 1);
        assert!(!holdings[0].invested);
    }
}
