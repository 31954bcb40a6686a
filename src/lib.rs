//! Dense feed-forward classifiers over IDX image datasets.
//! Tiny. Few dependencies. CPU only.
//!
//! # Features
//!
//! - **IDX decoding**: big-endian image and label files parse into
//! normalized samples, validated against their headers on any host
//! byte order.
//!
//! - **Per-sample training**: plain stochastic gradient descent with an
//! immediate in-place parameter update after every sample. No batching.
//!
//! - **Explicit forward caches**: forward passes return their
//! intermediate values instead of stashing them on the network, so
//! nothing couples two passes on the same instance.
//!
//! - **Generic precision**: every component works over any scalar
//! satisfying [scalar::Real], typically `f32` or `f64`.
//!
//! # Examples
//!
//! Training a small classifier on synthetic samples:
//! ```
//! use microdense::{ Network, Result, one_hot_encode };
//!
//! fn main() -> Result<()> {
//!   // Two classes: bright left half vs. bright right half
//!   let samples = vec![
//!     vec![1.0, 0.9, 0.0, 0.1],
//!     vec![0.1, 0.0, 0.9, 1.0],
//!   ];
//!   let targets = vec![
//!     one_hot_encode(0, 2)?,
//!     one_hot_encode(1, 2)?,
//!   ];
//!
//!   let mut network = Network::seeded(&[4, 8, 2], 0.05, 42)?;
//!   let losses = network.train(&samples, &targets, 25)?;
//!   assert_eq!(losses.len(), 25);
//!
//!   let _accuracy = network.evaluate(&samples, &[0, 1])?;
//!   let _class = network.predict(&samples[0])?;
//!   Ok(())
//! }
//! ```
//!
//! Decoding a dataset from disk:
//! ```no_run
//! use microdense::{ Dataset, Result };
//!
//! fn main() -> Result<()> {
//!   let dataset: Dataset<f64> = Dataset::load(
//!     "data/train-images-idx3-ubyte",
//!     "data/train-labels-idx1-ubyte",
//!     "data/t10k-images-idx3-ubyte",
//!     "data/t10k-labels-idx1-ubyte",
//!   )?;
//!   assert_eq!(dataset.training.samples.len(), dataset.training_labels.len());
//!   Ok(())
//! }
//! ```

mod internal;
mod matrix;
mod dataset;
mod network;

pub mod activation;
pub mod error;
pub mod scalar;

pub use matrix::{ dot, Matrix };
pub use dataset::{
  decode_images, decode_images_from, decode_labels, decode_labels_from,
  one_hot_encode, Dataset, ImageSet,
};
pub use network::{ DenseLayer, ForwardCache, Network };
pub use error::{ Error, Result };
