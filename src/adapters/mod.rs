// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod http_adjudicator;

pub use http_adjudicator::{DisabledAdjudicator, HttpAdjudicator};
