use rpg_common::Money;

use crate::db_types::TaxBreakdown;

/// 18%, the rate for spectacles and most optical goods in the reference deployment.
pub const DEFAULT_GST_RATE_BPS: i64 = 1800;

/// Splits tax-inclusive totals into their GST components.
///
/// The rate and the seller's registered state are injected rather than hard-coded. State comparison is
/// case- and whitespace-insensitive; an absent or blank buyer state is treated as the seller's own state
/// (intra-state), matching the checkout flow which defaults the buyer state the same way.
#[derive(Debug, Clone)]
pub struct TaxCalculator {
    rate_bps: i64,
    seller_state: String,
}

impl TaxCalculator {
    pub fn new<S: AsRef<str>>(rate_bps: i64, seller_state: S) -> Self {
        Self { rate_bps, seller_state: normalize_state(seller_state.as_ref()) }
    }

    pub fn rate_bps(&self) -> i64 {
        self.rate_bps
    }

    /// Computes the GST breakdown for a tax-inclusive `total`. `taxable = total / (1 + rate)` with half-up
    /// rounding to whole paise; the remainder is GST, assigned wholly to IGST for inter-state sales or split
    /// evenly into CGST and SGST otherwise. `taxable + cgst + sgst + igst == total` always holds exactly.
    pub fn calculate(&self, total: Money, buyer_state: Option<&str>) -> TaxBreakdown {
        let buyer = buyer_state.map(normalize_state).filter(|s| !s.is_empty());
        let inter_state = match buyer {
            Some(state) => state != self.seller_state,
            None => false,
        };
        let taxable = total.scale_div_half_up(10_000, 10_000 + self.rate_bps);
        let gst = total - taxable;
        let (cgst, sgst, igst) = if inter_state {
            (Money::default(), Money::default(), gst)
        } else {
            let (cgst, sgst) = gst.split_half_up();
            (cgst, sgst, Money::default())
        };
        TaxBreakdown { taxable, cgst, sgst, igst, rate_bps: self.rate_bps, inter_state }
    }
}

fn normalize_state(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    fn calc() -> TaxCalculator {
        TaxCalculator::new(DEFAULT_GST_RATE_BPS, "Maharashtra")
    }

    #[test]
    fn intra_state_splits_cgst_sgst() {
        let tax = calc().calculate(Money::from_rupees(1180), Some("maharashtra "));
        assert_eq!(tax.taxable, Money::from_rupees(1000));
        assert_eq!(tax.cgst, Money::from_rupees(90));
        assert_eq!(tax.sgst, Money::from_rupees(90));
        assert_eq!(tax.igst, Money::default());
        assert!(!tax.inter_state);
    }

    #[test]
    fn inter_state_uses_igst() {
        let tax = calc().calculate(Money::from_rupees(1180), Some("Karnataka"));
        assert_eq!(tax.igst, Money::from_rupees(180));
        assert_eq!(tax.cgst, Money::default());
        assert_eq!(tax.sgst, Money::default());
        assert!(tax.inter_state);
    }

    #[test]
    fn missing_state_is_intra_state() {
        for buyer in [None, Some(""), Some("   ")] {
            let tax = calc().calculate(Money::from_rupees(118), buyer);
            assert!(!tax.inter_state, "buyer state {buyer:?} should default to intra-state");
        }
    }

    #[test]
    fn breakdown_conserves_total() {
        // awkward totals that do not divide evenly
        for paise in [1i64, 33, 99, 101, 9_999, 123_457, 99_999_999] {
            let total = Money::from_paise(paise);
            for buyer in [Some("maharashtra"), Some("kerala")] {
                let tax = calc().calculate(total, buyer);
                assert_eq!(tax.total(), total, "conservation failed for {paise} paise, buyer {buyer:?}");
                let igst_set = tax.igst.is_positive();
                let split_set = tax.cgst.is_positive() || tax.sgst.is_positive();
                assert!(!(igst_set && split_set), "both IGST and CGST/SGST set for {paise} paise");
            }
        }
    }
}
