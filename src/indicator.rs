use rust_decimal::Decimal;

/// Default number of 1 Hz samples per rollup window.
pub const DEFAULT_WINDOW: u32 = 60;

/// Rollup emitted when a window closes. `ewma` is `None` when no sample
/// arrived during the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorRollup {
    pub sma: Decimal,
    pub ewma: Option<Decimal>,
    pub samples: u32,
}

/// Rolling SMA/EWMA over mid-price samples.
///
/// The mid is the half-spread `(best_ask - best_bid) / 2`, and the EWMA
/// smoothing factor is `2/window + 1`; both formulas are kept exactly as
/// the service has always computed them.
#[derive(Debug, Clone)]
pub struct IndicatorSampler {
    window: u32,
    alpha: Decimal,
    sum: Decimal,
    samples: u32,
    ewma: Option<Decimal>,
}

impl IndicatorSampler {
    pub fn new(window: u32) -> Self {
        IndicatorSampler {
            window,
            alpha: Decimal::TWO / Decimal::from(window) + Decimal::ONE,
            sum: Decimal::ZERO,
            samples: 0,
            ewma: None,
        }
    }

    /// Record one touch sample. Called at most once per second; a tick
    /// without a touch price is simply not counted.
    pub fn on_sample(&mut self, best_bid: Decimal, best_ask: Decimal) {
        let mid = (best_ask - best_bid) / Decimal::TWO;
        self.sum += mid;
        self.samples += 1;
        self.ewma = Some(match self.ewma {
            Some(previous) => self.alpha * mid + (Decimal::ONE - self.alpha) * previous,
            None => mid,
        });
    }

    /// Close the window: emit the rollup and reset both accumulators.
    /// The SMA always divides by the window length, not the sample count.
    pub fn on_window_elapsed(&mut self) -> IndicatorRollup {
        let rollup = IndicatorRollup {
            sma: self.sum / Decimal::from(self.window),
            ewma: self.ewma,
            samples: self.samples,
        };
        self.sum = Decimal::ZERO;
        self.samples = 0;
        self.ewma = None;
        rollup
    }

    pub fn window(&self) -> u32 {
        self.window
    }
}

impl Default for IndicatorSampler {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mid_is_half_spread() {
        let mut sampler = IndicatorSampler::new(60);
        sampler.on_sample(dec!(99), dec!(101));
        let rollup = sampler.on_window_elapsed();
        // (101 - 99) / 2 = 1.0, not the 100.0 midpoint average.
        assert_eq!(rollup.ewma, Some(dec!(1.0)));
        assert_eq!(rollup.sma, dec!(1.0) / dec!(60));
    }

    #[test]
    fn test_sma_divides_by_window() {
        let mut sampler = IndicatorSampler::new(60);
        for _ in 0..60 {
            sampler.on_sample(dec!(100), dec!(104));
        }
        let rollup = sampler.on_window_elapsed();
        assert_eq!(rollup.sma, dec!(2));
        assert_eq!(rollup.samples, 60);
    }

    #[test]
    fn test_ewma_uses_literal_alpha() {
        let mut sampler = IndicatorSampler::new(60);
        // mids 1 then 2; alpha = 2/60 + 1 = 31/30.
        sampler.on_sample(dec!(0), dec!(2));
        sampler.on_sample(dec!(0), dec!(4));
        let alpha = Decimal::TWO / dec!(60) + Decimal::ONE;
        let expected = alpha * dec!(2) + (Decimal::ONE - alpha) * dec!(1);
        assert_eq!(sampler.on_window_elapsed().ewma, Some(expected));
    }

    #[test]
    fn test_window_resets_accumulators() {
        let mut sampler = IndicatorSampler::new(60);
        sampler.on_sample(dec!(10), dec!(14));
        sampler.on_window_elapsed();

        let rollup = sampler.on_window_elapsed();
        assert_eq!(rollup.sma, Decimal::ZERO);
        assert_eq!(rollup.ewma, None);
        assert_eq!(rollup.samples, 0);
    }

    #[test]
    fn test_missed_ticks_not_counted() {
        let mut sampler = IndicatorSampler::new(60);
        sampler.on_sample(dec!(100), dec!(102));
        sampler.on_sample(dec!(100), dec!(102));
        assert_eq!(sampler.on_window_elapsed().samples, 2);
    }
}
