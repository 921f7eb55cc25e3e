// Services layer

pub mod collector;

pub use collector::{CollectionOutcome, CollectorService};
