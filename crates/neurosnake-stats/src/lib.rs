//! Statistical helpers shared by the training pipeline.
//!
//! - [`descriptive`]: min/max/mean/standard deviation plus rank quartiles
//! - [`percentiles`]: nearest-rank lookup on sorted data
//! - [`weighted`]: fitness-proportional random index selection
//!
//! # Examples
//!
//! ```
//! use neurosnake_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
//! assert_eq!(stats.mean, 2.5);
//! assert_eq!(stats.median, 3.0);
//! assert_eq!(stats.lower_quartile, 2.0);
//! ```

pub mod descriptive;
pub mod percentiles;
pub mod weighted;
