pub mod engine;
pub mod message;
pub mod subscriber;

pub use engine::Broker;
pub use subscriber::Subscriber;
