//! Next-session price bands from annualized volatility

use serde::{Deserialize, Serialize};
use trade_math::volatility::deannualize;

/// Price ranges one and two daily standard deviations around the last close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityBands {
    pub lower_1std: f64,
    pub upper_1std: f64,
    pub lower_2std: f64,
    pub upper_2std: f64,
}

impl VolatilityBands {
    /// Build bands from `price` and an annualized volatility.
    ///
    /// The volatility is converted back to a daily figure with
    /// `annual / sqrt(252)`. Bounds are not clamped, so a daily volatility
    /// above 50% yields a negative `lower_2std`.
    pub fn from_price(price: f64, annual_volatility: f64) -> Self {
        let daily = deannualize(annual_volatility);

        Self {
            lower_1std: price * (1.0 - daily),
            upper_1std: price * (1.0 + daily),
            lower_2std: price * (1.0 - 2.0 * daily),
            upper_2std: price * (1.0 + 2.0 * daily),
        }
    }

    /// Whether `price` lies inside the 1σ band
    pub fn contains_1std(&self, price: f64) -> bool {
        self.lower_1std <= price && price <= self.upper_1std
    }
}
