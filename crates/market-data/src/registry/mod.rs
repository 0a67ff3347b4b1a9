//! Instrument registry: the static table of tracked assets and their provider identifiers.

mod instrument_registry;

pub use instrument_registry::InstrumentRegistry;
