//! Report modules
//!
//! This module contains the two reports:
//! - Relative imbalance per client
//! - Max instability (excess) per allocation

pub mod constants;
pub mod excess;
pub mod relative_imbalance;

// Re-export report functions for convenience
pub use excess::plot_excess;
pub use relative_imbalance::plot_relative_imbalance;
