pub mod app;

pub use app::{PlacementDecision, PlacementPass, PlacementReport, PlacementSummary};
