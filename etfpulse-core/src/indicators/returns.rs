//! Return Series Builder.
//!
//! Percentage change between consecutive samples:
//! RET[t] = (price[t] - price[t-1]) / price[t-1] * 100
//! RET[0] is undefined. A non-positive or non-finite price on either side of a
//! step makes that step's return undefined; the series is never aborted.

use crate::domain::{PriceSeries, ReturnSeries};

/// Build the return series for `prices`. Output length equals input length.
pub fn build_returns(prices: &PriceSeries) -> ReturnSeries {
    let samples = prices.samples();
    let timestamps = samples.iter().map(|s| s.timestamp).collect();

    let mut values = Vec::with_capacity(samples.len());
    if !samples.is_empty() {
        values.push(None);
    }
    for pair in samples.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let ret = if prev.is_valid() && curr.is_valid() {
            Some((curr.price - prev.price) / prev.price * 100.0)
        } else {
            None
        };
        values.push(ret);
    }

    ReturnSeries::from_parts(timestamps, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_prices, DEFAULT_EPSILON};

    #[test]
    fn returns_basic() {
        let returns = build_returns(&make_prices(&[100.0, 110.0, 99.0]));
        assert_eq!(returns.len(), 3);
        assert_eq!(returns.get(0), None);
        assert_approx(returns.get(1).unwrap(), 10.0, DEFAULT_EPSILON);
        assert_approx(returns.get(2).unwrap(), -10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn single_sample_has_one_undefined_return() {
        let returns = build_returns(&make_prices(&[42.0]));
        assert_eq!(returns.values(), &[None]);
    }

    #[test]
    fn empty_prices_give_empty_returns() {
        let returns = build_returns(&PriceSeries::empty());
        assert!(returns.is_empty());
    }

    #[test]
    fn invalid_price_undefines_both_adjacent_returns() {
        let returns = build_returns(&make_prices(&[100.0, 0.0, 105.0, 110.0]));
        assert_eq!(returns.get(1), None); // into the bad sample
        assert_eq!(returns.get(2), None); // out of the bad sample
        assert_approx(returns.get(3).unwrap(), 4.761904761904762, DEFAULT_EPSILON);
    }

    #[test]
    fn non_finite_prices_are_skipped() {
        let returns = build_returns(&make_prices(&[100.0, f64::NAN, f64::INFINITY, 50.0, 25.0]));
        assert_eq!(returns.defined_count(), 1);
        assert_approx(returns.get(4).unwrap(), -50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_change_is_a_defined_zero() {
        let returns = build_returns(&make_prices(&[100.0, 100.0]));
        assert_eq!(returns.get(1), Some(0.0));
    }

    #[test]
    fn timestamps_follow_prices() {
        let prices = make_prices(&[1.0, 2.0, 3.0]);
        let returns = build_returns(&prices);
        let expected: Vec<_> = prices.timestamps().collect();
        assert_eq!(returns.timestamps(), expected.as_slice());
    }
}
