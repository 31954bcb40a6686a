use itertools::izip;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::{
  activation::{relu, relu_derivative, softmax},
  error::{Error, Result},
  internal::argmax,
  matrix::Matrix,
  scalar::Real,
};


/// Offset added inside the loss logarithm so log(0) stays finite.
const EPSILON: f64 = 1e-6;

/// Both ends of the uniform weight initialization range.
const INIT_SPREAD: f64 = 0.5;


/// Weights and bias of one fully-connected layer.
///
/// The weight matrix has one row per output neuron, so its shape is
/// (outputs, inputs) and the bias length equals the row count.

#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer<T: Real> {
  pub weights: Matrix<T>,
  pub bias: Vec<T>,
}

impl<T: Real> DenseLayer<T> {
  fn random(inputs: usize, outputs: usize, rng: &mut impl Rng) -> Self {
    let spread = T::from(INIT_SPREAD).unwrap();
    Self {
      weights: Matrix::uniform(outputs, inputs, -spread, spread, rng),
      bias: vec![T::zero(); outputs],
    }
  }
}


/// Intermediate values of one forward pass: the pre-activation and
/// activation vectors of every layer, in layer order.
///
/// The cache belongs to a single (input, forward) pair. Backward
/// propagation consumes it together with the same input; nothing is
/// retained on the network between calls.

#[derive(Debug, Clone)]
pub struct ForwardCache<T: Real> {
  z_values: Vec<Vec<T>>,
  activations: Vec<Vec<T>>,
}

impl<T: Real> ForwardCache<T> {
  /// Activation of the final layer, the network's output distribution.

  pub fn output(&self) -> &[T] {
    self.activations.last().map(Vec::as_slice).unwrap_or(&[])
  }
}


/// A linear stack of fully-connected layers trained with per-sample
/// gradient descent.
///
/// Hidden layers activate with ReLU; the final layer applies softmax,
/// so outputs form a probability distribution over classes. Training
/// updates parameters in place after every sample, with no batching.

#[derive(Debug, Clone)]
pub struct Network<T: Real> {
  layers: Vec<DenseLayer<T>>,
  learning_rate: T,
}

impl<T: Real> Network<T> {
  /// Build a network from consecutive layer sizes, e.g. `[784, 128, 10]`.
  ///
  /// Weights draw independently and uniformly from [-0.5, 0.5]; biases
  /// start at zero. The architecture needs at least an input and an
  /// output size.

  pub fn new(architecture: &[usize], learning_rate: T) -> Result<Self> {
    Self::with_rng(architecture, learning_rate, &mut StdRng::from_entropy())
  }

  /// Like [new](Network::new), but with a deterministic generator, so
  /// two networks built from the same seed start identical.

  pub fn seeded(architecture: &[usize], learning_rate: T, seed: u64) -> Result<Self> {
    Self::with_rng(architecture, learning_rate, &mut StdRng::seed_from_u64(seed))
  }

  fn with_rng(architecture: &[usize], learning_rate: T, rng: &mut impl Rng) -> Result<Self> {
    if architecture.len() < 2 {
      return Err(Error::domain(format!(
        "network architecture needs input and output sizes, got {} entries",
        architecture.len())));
    }
    let layers = architecture.windows(2)
      .map(|pair| DenseLayer::random(pair[0], pair[1], rng) )
      .collect();
    Ok(Self { layers, learning_rate })
  }

  /// Build a network from explicit parameters.
  ///
  /// Each layer's bias length must equal its weight row count, and each
  /// layer's column count must equal the previous layer's row count.

  pub fn from_layers(layers: Vec<DenseLayer<T>>, learning_rate: T) -> Result<Self> {
    if layers.is_empty() {
      return Err(Error::domain("network needs at least one layer"));
    }
    for (l, layer) in layers.iter().enumerate() {
      if layer.weights.rows() != layer.bias.len() {
        return Err(Error::domain(format!(
          "layer {}: {} weight rows against bias of length {}",
          l, layer.weights.rows(), layer.bias.len())));
      }
    }
    for (l, pair) in layers.windows(2).enumerate() {
      if pair[1].weights.cols() != pair[0].weights.rows() {
        return Err(Error::domain(format!(
          "layer {} expects {} inputs but layer {} produces {}",
          l + 1, pair[1].weights.cols(), l, pair[0].weights.rows())));
      }
    }
    Ok(Self { layers, learning_rate })
  }

  pub fn layers(&self) -> &[DenseLayer<T>] {
    &self.layers
  }

  pub fn learning_rate(&self) -> T {
    self.learning_rate
  }

  /// Run the input through every layer and return the output
  /// distribution together with the pass's cache.
  ///
  /// The input length must equal the first layer's column count; a
  /// mismatch surfaces as the matrix product's dimension error.

  pub fn forward_propagation(&self, input: &[T]) -> Result<(Vec<T>, ForwardCache<T>)> {
    let mut cache = ForwardCache {
      z_values: Vec::with_capacity(self.layers.len()),
      activations: Vec::with_capacity(self.layers.len()),
    };
    let last = self.layers.len() - 1;
    let mut activation = input.to_vec();

    for (l, layer) in self.layers.iter().enumerate() {
      let z: Vec<T> = layer.weights.matvec(&activation)?
        .into_iter()
        .zip(&layer.bias)
        .map(|(wx, &b)| wx + b )
        .collect();
      activation = if l == last {
        softmax(&z)?
      } else {
        z.iter().map(|&x| relu(x) ).collect()
      };
      cache.z_values.push(z);
      cache.activations.push(activation.clone());
    }

    Ok((activation, cache))
  }

  /// Walk the layers in reverse, applying gradient descent in place.
  ///
  /// `cache` must come from a forward pass over the same `input` on the
  /// current parameters. The output-layer error is the closed-form
  /// gradient of softmax combined with cross-entropy loss.

  pub fn backward_propagation(&mut self, input: &[T], target: &[T], cache: &ForwardCache<T>) -> Result<()> {
    let output = cache.output();
    if target.len() != output.len() {
      return Err(Error::domain(format!(
        "target of length {} against output of length {}",
        target.len(), output.len())));
    }
    if input.len() != self.layers[0].weights.cols() {
      return Err(Error::domain(format!(
        "input of length {} against first layer of {} columns",
        input.len(), self.layers[0].weights.cols())));
    }

    let rate = self.learning_rate;
    let mut error: Vec<T> = output.iter()
      .zip(target)
      .map(|(&y, &t)| y - t )
      .collect();

    for l in (0..self.layers.len()).rev() {
      {
        let previous: &[T] = if l == 0 { input } else { &cache.activations[l - 1] };
        let layer = &mut self.layers[l];
        for i in 0..layer.weights.rows() {
          for j in 0..layer.weights.cols() {
            layer.weights[(i, j)] -= rate * error[i] * previous[j];
          }
          layer.bias[i] -= rate * error[i];
        }
      }

      // The error for the layer below flows through the already-updated
      // weights, gated by the ReLU derivative at the cached z values
      if l > 0 {
        error = self.layers[l].weights.transposed().matvec(&error)?
          .into_iter()
          .zip(&cache.z_values[l - 1])
          .map(|(e, &z)| e * relu_derivative(z) )
          .collect();
      }
    }

    Ok(())
  }

  /// Run forward and backward propagation over every sample, in input
  /// order, for the given number of epochs.
  ///
  /// Targets are one-hot vectors. Returns the mean cross-entropy loss
  /// of every epoch.

  pub fn train(&mut self, samples: &[Vec<T>], targets: &[Vec<T>], epochs: usize) -> Result<Vec<T>> {
    if samples.is_empty() {
      return Err(Error::domain("training over an empty sample set"));
    }
    if samples.len() != targets.len() {
      return Err(Error::domain(format!(
        "{} samples against {} targets", samples.len(), targets.len())));
    }

    let epsilon = T::from(EPSILON).unwrap();
    let count = T::from(samples.len()).unwrap();
    let mut mean_losses = Vec::with_capacity(epochs);

    for epoch in 0..epochs {
      let mut total_loss = T::zero();
      for (sample, target) in izip!(samples, targets) {
        let (output, cache) = self.forward_propagation(sample)?;
        self.backward_propagation(sample, target, &cache)?;

        for (&t, &y) in izip!(target, &output) {
          total_loss = total_loss - t * (y + epsilon).ln();
        }
      }
      let mean = total_loss / count;
      info!(epoch = epoch + 1, loss = ?mean, "epoch complete");
      mean_losses.push(mean);
    }

    Ok(mean_losses)
  }

  /// Percentage of samples whose prediction matches the raw label.

  pub fn evaluate(&self, samples: &[Vec<T>], labels: &[usize]) -> Result<T> {
    if samples.is_empty() {
      return Err(Error::domain("evaluation over an empty sample set"));
    }
    if samples.len() != labels.len() {
      return Err(Error::domain(format!(
        "{} samples against {} labels", samples.len(), labels.len())));
    }

    let mut correct = 0usize;
    for (sample, &label) in izip!(samples, labels) {
      if self.predict(sample)? == label {
        correct += 1;
      }
    }
    Ok(T::from(correct).unwrap() / T::from(samples.len()).unwrap()
      * T::from(100.0).unwrap())
  }

  /// Class index of the strongest output. Ties resolve to the lowest
  /// index.

  pub fn predict(&self, sample: &[T]) -> Result<usize> {
    let (output, _) = self.forward_propagation(sample)?;
    argmax(&output).ok_or_else(|| Error::domain("prediction over an empty output layer") )
  }
}
