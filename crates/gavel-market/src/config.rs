//! Market configuration.

/// Tunables for the market layer.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Command buffer of each auction desk. When it fills up, callers
    /// wait for the desk to catch up.
    pub desk_channel_size: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            desk_channel_size: 64,
        }
    }
}
