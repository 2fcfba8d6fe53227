//! In-process pub/sub for Quorum.
//!
//! Two brokers exist: [`EventBroker`] fans room and vote events out to
//! per-room subscribers, [`AppEventBroker`] fans application-wide
//! events out to global subscribers (analytics, admin dashboards).
//!
//! Delivery is intentionally lossy: each subscriber gets a bounded
//! queue, publishing never blocks, and events for a full queue are
//! dropped. Subscribers recover from gaps by resubscribing — every
//! fresh watch stream starts with a full snapshot.
//!
//! # Key types
//!
//! - [`EventBroker`] / [`AppEventBroker`] — the concrete brokers
//! - [`EventPublisher`] / [`AppEventPublisher`] — the ports services
//!   are generic over
//! - [`Subscription`] — RAII guard; dropping it unsubscribes
//! - [`BrokerConfig`] — queue capacities

mod app_events;
mod config;
mod ports;
mod room_events;
mod subscription;

pub use app_events::AppEventBroker;
pub use config::BrokerConfig;
pub use ports::{AppEventPublisher, EventPublisher};
pub use room_events::EventBroker;
pub use subscription::Subscription;
