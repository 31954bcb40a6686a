use crate::scalar::Numeric;


/// Index of the greatest value, scanning left to right.
///
/// Ties resolve to the lowest index. Returns [None] for empty input.

pub fn argmax<T: Numeric>(values: &[T]) -> Option<usize> {
  let mut best: Option<(usize, T)> = None;
  for (i, &value) in values.iter().enumerate() {
    // Strict comparison keeps the first of equal maxima
    if best.map_or(true, |(_, max)| value > max ) {
      best = Some((i, value));
    }
  }
  best.map(|(i, _)| i )
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_max_wins() {
    assert_eq!(argmax(&[0.5, 0.5]), Some(0));
    assert_eq!(argmax(&[1, 3, 3, 2]), Some(1));
  }

  #[test]
  fn scans_whole_slice() {
    assert_eq!(argmax(&[-4.0, -2.0, -3.0]), Some(1));
    assert_eq!(argmax::<f32>(&[]), None);
  }
}
