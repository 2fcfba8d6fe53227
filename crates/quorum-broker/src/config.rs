/// Queue capacities for broker subscriptions.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Queue depth for per-room room/vote subscriptions. Small on
    /// purpose: a subscriber this far behind is better served by the
    /// snapshot it gets on resubscribe.
    pub room_queue_capacity: usize,

    /// Queue depth for app-wide subscriptions, which see the traffic
    /// of every room at once.
    pub app_queue_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            room_queue_capacity: 10,
            app_queue_capacity: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_config_default() {
        let config = BrokerConfig::default();
        assert_eq!(config.room_queue_capacity, 10);
        assert_eq!(config.app_queue_capacity, 100);
    }
}
