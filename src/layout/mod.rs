//! Page layout: flowing styled text blocks into fixed-capacity pages.

mod estimator;
mod paginator;

pub use estimator::{FixedHeightEstimator, HeightEstimator, HeuristicEstimator};
pub use paginator::Paginator;
