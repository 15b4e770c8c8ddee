//! # HookBus
//!
//! `hookbus` is a webhook-based pub/sub notification layer: internal domain
//! events published on an in-process message bus are fanned out to externally
//! registered HTTP callback endpoints, after a challenge/response handshake
//! proves the registrant controls the endpoint. Deliveries are optionally
//! signed with HMAC-SHA256.
//!
//! ## Core Modules
//!
//! - `broker`: the in-process message bus routing published messages to topic
//!   subscribers.
//! - `notify`: the webhook pipeline — subscription manager, per-topic fan-out
//!   handlers and the outbound HTTP transport.
//! - `config`: loading and merging of server and pipeline configuration.
//! - `server`: the HTTP surface for registering subscriptions.
//! - `utils`: shared error types and logging setup.

pub mod broker;
pub mod config;
pub mod notify;
pub mod server;
pub mod utils;
