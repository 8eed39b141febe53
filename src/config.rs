//! Book sizing.
//!
//! Every pool and index is sized once from a [`BookConfig`]; nothing grows
//! afterwards. Config can come from [`Default`], JSON ([`BookConfig::from_json`]),
//! or `BOOK_*` environment variables ([`BookConfig::from_env`]).

use log::warn;

use crate::error::BookError;

/// Capacities for one [`crate::OrderBook`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Order records live at once (resting plus pending).
    pub order_capacity: usize,
    /// Price-level records live at once, both sides together.
    pub level_capacity: usize,
    /// Distinct price levels per side.
    pub max_levels_per_side: usize,
    /// Order index slots. Power of two, larger than `order_capacity`.
    pub order_index_capacity: usize,
    /// Fractional digits of one tick, for display only.
    pub price_scale: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            order_capacity: 1_200_000,
            level_capacity: 4_096,
            max_levels_per_side: 2_048,
            order_index_capacity: 1 << 21,
            price_scale: 2,
        }
    }
}

impl BookConfig {
    /// Config for `order_capacity` orders with the index sized to match.
    ///
    /// ```rust
    /// use limit_book::BookConfig;
    /// let config = BookConfig::with_order_capacity(1000);
    /// assert_eq!(config.order_index_capacity, 2048);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn with_order_capacity(order_capacity: usize) -> Self {
        Self {
            order_capacity,
            order_index_capacity: Self::index_capacity_for(order_capacity),
            ..Default::default()
        }
    }

    /// Smallest power of two holding `order_capacity` at a load factor of at most one half.
    pub fn index_capacity_for(order_capacity: usize) -> usize {
        (order_capacity.max(1) * 2).next_power_of_two()
    }

    pub fn validate(&self) -> Result<(), BookError> {
        if self.order_capacity == 0 {
            return Err(BookError::InvalidConfig("order_capacity must be > 0".into()));
        }
        if self.level_capacity == 0 || self.max_levels_per_side == 0 {
            return Err(BookError::InvalidConfig(
                "level_capacity and max_levels_per_side must be > 0".into(),
            ));
        }
        if !self.order_index_capacity.is_power_of_two() {
            return Err(BookError::InvalidConfig(format!(
                "order_index_capacity {} is not a power of two",
                self.order_index_capacity
            )));
        }
        if self.order_index_capacity <= self.order_capacity {
            return Err(BookError::InvalidConfig(format!(
                "order_index_capacity {} must exceed order_capacity {}",
                self.order_index_capacity, self.order_capacity
            )));
        }
        if self.order_capacity > u32::MAX as usize || self.level_capacity > u32::MAX as usize {
            return Err(BookError::InvalidConfig("pool capacity exceeds u32 handles".into()));
        }
        if self.price_scale > 28 {
            return Err(BookError::InvalidConfig(format!(
                "price_scale {} exceeds 28",
                self.price_scale
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, BookError> {
        let config: BookConfig =
            serde_json::from_str(json).map_err(|e| BookError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `BOOK_ORDER_CAPACITY`, `BOOK_LEVEL_CAPACITY`,
    /// `BOOK_MAX_LEVELS_PER_SIDE`, `BOOK_ORDER_INDEX_CAPACITY` and `BOOK_PRICE_SCALE`.
    ///
    /// When only the order capacity is set, the index is sized to match it.
    pub fn from_env() -> Result<Self, BookError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BookError> {
        fn parse<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            name: &str,
        ) -> Result<Option<T>, BookError> {
            match lookup(name) {
                None => Ok(None),
                Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                    warn!("invalid config value name={} value={}", name, raw);
                    BookError::InvalidConfig(format!("{} is not a valid number: {:?}", name, raw))
                }),
            }
        }

        let mut config = BookConfig::default();
        if let Some(n) = parse(&lookup, "BOOK_ORDER_CAPACITY")? {
            config = BookConfig::with_order_capacity(n);
        }
        if let Some(n) = parse(&lookup, "BOOK_LEVEL_CAPACITY")? {
            config.level_capacity = n;
        }
        if let Some(n) = parse(&lookup, "BOOK_MAX_LEVELS_PER_SIDE")? {
            config.max_levels_per_side = n;
        }
        if let Some(n) = parse(&lookup, "BOOK_ORDER_INDEX_CAPACITY")? {
            config.order_index_capacity = n;
        }
        if let Some(n) = parse(&lookup, "BOOK_PRICE_SCALE")? {
            config.price_scale = n;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn default_is_valid() {
        assert!(BookConfig::default().validate().is_ok());
    }

    #[test]
    fn index_must_be_power_of_two_and_larger_than_pool() {
        let mut config = BookConfig::with_order_capacity(100);
        config.order_index_capacity = 100;
        assert!(config.validate().is_err());
        config.order_index_capacity = 64;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must exceed"));
    }

    #[test]
    fn from_json_fills_missing_fields_with_defaults() {
        let config =
            BookConfig::from_json(r#"{"order_capacity": 1000, "order_index_capacity": 2048}"#)
                .unwrap();
        assert_eq!(config.order_capacity, 1000);
        assert_eq!(config.max_levels_per_side, BookConfig::default().max_levels_per_side);
    }

    #[test]
    fn from_json_rejects_invalid() {
        assert!(BookConfig::from_json("not json").is_err());
        assert!(BookConfig::from_json(r#"{"order_capacity": 0}"#).is_err());
    }

    #[test]
    fn env_order_capacity_resizes_index() {
        let config = BookConfig::from_lookup(lookup(&[
            ("BOOK_ORDER_CAPACITY", "5000"),
            ("BOOK_MAX_LEVELS_PER_SIDE", "64"),
        ]))
        .unwrap();
        assert_eq!(config.order_capacity, 5000);
        assert_eq!(config.order_index_capacity, 16384);
        assert_eq!(config.max_levels_per_side, 64);
    }

    #[test]
    fn env_rejects_garbage() {
        let err = BookConfig::from_lookup(lookup(&[("BOOK_PRICE_SCALE", "two")])).unwrap_err();
        assert!(matches!(err, BookError::InvalidConfig(_)));
    }
}
