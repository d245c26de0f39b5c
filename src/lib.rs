pub mod app;
pub mod broker;
pub mod capture;
pub mod cli;
pub mod config;
pub mod replay;
pub mod store;
pub mod util;

pub use app::App;
pub use broker::{
    BrokerError, BrokerEvent, BrokerSettings, MemoryBroker, MqttSession, Protocol, Publisher,
    SubscribeMode,
};
pub use capture::{CaptureError, CapturePipeline, CaptureSummary};
pub use config::Config;
pub use replay::{replay_connected, replay_store, ReplayError, ReplayScheduler, ReplaySummary};
pub use store::{CapturedMessage, MessageStore, StoreError, StoredRecord};
