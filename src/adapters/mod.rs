//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements  | Connects to                     |
//! |----------------|-------------|---------------------------------|
//! | `log_sink`     | EventSink   | The `log` facade                |
//! | `memory_store` | StoragePort | In-process map (simulation)     |
//!
//! Device builds supply their own adapters for the transport, position,
//! and timer ports; the simulation binary wires script-driven ones.

pub mod log_sink;
pub mod memory_store;

pub use log_sink::LogEventSink;
pub use memory_store::MemoryStore;
