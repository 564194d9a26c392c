pub mod config;
mod event_queue;
pub mod repository;
mod service_provider;
mod sweeper;

#[rustfmt::skip]
pub use {
    event_queue::InternalEventQueue,
    service_provider::ServiceProvider,
    sweeper::ExpirySweeper,
};
