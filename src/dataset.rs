use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use tracing::debug;

use crate::{
  error::{Error, Result},
  scalar::{Numeric, Real},
};


/// Magic number every label file must carry in its header.
const LABEL_MAGIC: u32 = 2049;


/// A decoded image file: flattened samples plus the per-image dimensions.
///
/// Every sample has length `rows * columns` with pixel values normalized
/// into `[0, 1]`. The set is read-only after decoding.

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSet<T: Numeric> {
  pub samples: Vec<Vec<T>>,
  pub rows: usize,
  pub columns: usize,
}


/// Decode a big-endian IDX image file from disk.

pub fn decode_images<T: Real, P: AsRef<Path>>(path: P) -> Result<ImageSet<T>> {
  let mut file = File::open(path)?;
  decode_images_from(&mut file)
}

/// Decode a big-endian IDX image file from any reader.
///
/// The 16-byte header holds four big-endian u32 fields: magic, item
/// count, rows and columns. The magic field is read but not checked;
/// zero counts or dimensions and short pixel data are format errors.

pub fn decode_images_from<T: Real, R: Read>(reader: &mut R) -> Result<ImageSet<T>> {
  let _magic = read_u32_be(reader, "image header")?;
  let count = read_u32_be(reader, "image header")?;
  let rows = read_u32_be(reader, "image header")?;
  let columns = read_u32_be(reader, "image header")?;

  if count == 0 || rows == 0 || columns == 0 {
    return Err(Error::format(format!(
      "image file declares zero dimensions: {} items of {}x{} pixels",
      count, rows, columns)));
  }

  let scale = T::from(255.0).unwrap();
  let mut buffer = vec![0u8; rows as usize * columns as usize];
  let mut samples = Vec::with_capacity(count as usize);
  for _ in 0..count {
    read_exact_or_format(reader, &mut buffer, "image data")?;
    samples.push(buffer.iter()
      .map(|&pixel| T::from(pixel).unwrap() / scale )
      .collect());
  }

  debug!(images = count, rows, columns, "decoded image file");
  Ok(ImageSet { samples, rows: rows as usize, columns: columns as usize })
}

/// Decode a big-endian IDX label file from disk.

pub fn decode_labels<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
  let mut file = File::open(path)?;
  decode_labels_from(&mut file)
}

/// Decode a big-endian IDX label file from any reader.
///
/// The 8-byte header holds two big-endian u32 fields: magic, which must
/// equal 2049, and the item count. Each label byte widens to `usize`.

pub fn decode_labels_from<R: Read>(reader: &mut R) -> Result<Vec<usize>> {
  let magic = read_u32_be(reader, "label header")?;
  if magic != LABEL_MAGIC {
    return Err(Error::format(format!(
      "label file magic {} is not {}", magic, LABEL_MAGIC)));
  }
  let count = read_u32_be(reader, "label header")?;

  let mut bytes = vec![0u8; count as usize];
  read_exact_or_format(reader, &mut bytes, "label data")?;

  debug!(labels = count, "decoded label file");
  Ok(bytes.into_iter().map(usize::from).collect())
}

/// Encode a class label as a vector with 1 at the label's index.

pub fn one_hot_encode<T: Numeric>(label: usize, num_classes: usize) -> Result<Vec<T>> {
  if label >= num_classes {
    return Err(Error::domain(format!(
      "label {} does not fit {} classes", label, num_classes)));
  }
  let mut encoded = vec![T::zero(); num_classes];
  encoded[label] = T::one();
  Ok(encoded)
}

fn read_u32_be<R: Read>(reader: &mut R, what: &str) -> Result<u32> {
  let mut buf = [0u8; 4];
  read_exact_or_format(reader, &mut buf, what)?;
  Ok(u32::from_be_bytes(buf))
}

// Short reads mean the file lies about its contents; real I/O failures
// stay I/O errors.
fn read_exact_or_format<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
  reader.read_exact(buf).map_err(|err| match err.kind() {
    ErrorKind::UnexpectedEof => Error::format(format!("truncated {}", what)),
    _ => Error::Io(err),
  })
}


/// Training and test splits decoded from two image/label file pairs.

#[derive(Debug, Clone)]
pub struct Dataset<T: Numeric> {
  pub training: ImageSet<T>,
  pub training_labels: Vec<usize>,
  pub test: ImageSet<T>,
  pub test_labels: Vec<usize>,
}

impl<T: Real> Dataset<T> {
  /// Decode all four dataset files. Within each split the image and
  /// label counts must agree.

  pub fn load<P: AsRef<Path>>(
    train_images: P,
    train_labels: P,
    test_images: P,
    test_labels: P,
  ) -> Result<Self> {
    let training = decode_images(train_images)?;
    let training_labels = decode_labels(train_labels)?;
    check_split("training", training.samples.len(), training_labels.len())?;

    let test = decode_images(test_images)?;
    let test_labels = decode_labels(test_labels)?;
    check_split("test", test.samples.len(), test_labels.len())?;

    Ok(Self { training, training_labels, test, test_labels })
  }
}

fn check_split(split: &str, images: usize, labels: usize) -> Result<()> {
  if images != labels {
    return Err(Error::format(format!(
      "{} split holds {} images but {} labels", split, images, labels)));
  }
  Ok(())
}


#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  fn image_bytes(magic: u32, count: u32, rows: u32, columns: u32, pixels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for field in [magic, count, rows, columns] {
      bytes.extend_from_slice(&field.to_be_bytes());
    }
    bytes.extend_from_slice(pixels);
    bytes
  }

  fn label_bytes(magic: u32, count: u32, labels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&magic.to_be_bytes());
    bytes.extend_from_slice(&count.to_be_bytes());
    bytes.extend_from_slice(labels);
    bytes
  }

  #[test]
  fn decodes_normalized_images() {
    let bytes = image_bytes(2051, 2, 2, 2, &[0, 255, 128, 64, 255, 0, 0, 255]);
    let set: ImageSet<f64> = decode_images_from(&mut &bytes[..]).unwrap();

    assert_eq!(set.samples.len(), 2);
    assert_eq!(set.rows, 2);
    assert_eq!(set.columns, 2);
    assert_eq!(set.samples[0][0], 0.0);
    assert_eq!(set.samples[0][1], 1.0);
    assert_eq!(set.samples[0][2], 128.0 / 255.0);
    for sample in &set.samples {
      assert!(sample.iter().all(|&p| (0.0..=1.0).contains(&p) ));
    }
  }

  #[test]
  fn image_magic_is_not_checked() {
    let bytes = image_bytes(0xdeadbeef, 1, 1, 1, &[7]);
    assert!(decode_images_from::<f32, _>(&mut &bytes[..]).is_ok());
  }

  #[test]
  fn rejects_zero_image_dimensions() {
    for (count, rows, columns) in [(0, 2, 2), (2, 0, 2), (2, 2, 0)] {
      let bytes = image_bytes(2051, count, rows, columns, &[]);
      let err = decode_images_from::<f64, _>(&mut &bytes[..]).unwrap_err();
      assert!(matches!(err, Error::Format(_)));
    }
  }

  #[test]
  fn rejects_truncated_image_data() {
    // Header declares two 2x2 images, data holds one and a half
    let bytes = image_bytes(2051, 2, 2, 2, &[1, 2, 3, 4, 5, 6]);
    let err = decode_images_from::<f64, _>(&mut &bytes[..]).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
  }

  #[test]
  fn rejects_truncated_image_header() {
    let bytes = [0u8; 10];
    let err = decode_images_from::<f64, _>(&mut &bytes[..]).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
  }

  #[test]
  fn decodes_widened_labels() {
    let bytes = label_bytes(2049, 4, &[0, 9, 255, 3]);
    let labels = decode_labels_from(&mut &bytes[..]).unwrap();
    assert_eq!(labels, vec![0, 9, 255, 3]);
    assert!(labels.iter().all(|&l| l < 256 ));
  }

  #[test]
  fn rejects_bad_label_magic() {
    let bytes = label_bytes(2051, 1, &[1]);
    let err = decode_labels_from(&mut &bytes[..]).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
  }

  #[test]
  fn rejects_truncated_label_data() {
    let bytes = label_bytes(2049, 5, &[1, 2]);
    let err = decode_labels_from(&mut &bytes[..]).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
  }

  #[test]
  fn missing_file_is_io_error() {
    let err = decode_images::<f64, _>("/no/such/images-idx3-ubyte").unwrap_err();
    assert!(matches!(err, Error::Io(_)));

    let err = decode_labels("/no/such/labels-idx1-ubyte").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
  }

  #[test]
  fn decodes_images_from_disk() {
    let bytes = image_bytes(2051, 1, 2, 3, &[10, 20, 30, 40, 50, 60]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let set: ImageSet<f32> = decode_images(file.path()).unwrap();
    assert_eq!(set.samples.len(), 1);
    assert_eq!(set.samples[0].len(), 6);
  }

  #[test]
  fn one_hot_sets_single_index() {
    let encoded: Vec<f64> = one_hot_encode(3, 10).unwrap();
    assert_eq!(encoded.len(), 10);
    for (i, &value) in encoded.iter().enumerate() {
      assert_eq!(value, if i == 3 { 1.0 } else { 0.0 });
    }
  }

  #[test]
  fn one_hot_rejects_out_of_range_label() {
    let err = one_hot_encode::<f64>(10, 10).unwrap_err();
    assert!(matches!(err, Error::Domain(_)));
  }

  #[test]
  fn load_rejects_split_count_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, bytes: &[u8]| {
      let path = dir.path().join(name);
      std::fs::write(&path, bytes).unwrap();
      path
    };

    // Two training images against three training labels
    let train_images = write("train-images", &image_bytes(2051, 2, 1, 1, &[1, 2]));
    let train_labels = write("train-labels", &label_bytes(2049, 3, &[0, 1, 0]));
    let test_images = write("test-images", &image_bytes(2051, 1, 1, 1, &[3]));
    let test_labels = write("test-labels", &label_bytes(2049, 1, &[1]));

    let err = Dataset::<f64>::load(&train_images, &train_labels, &test_images, &test_labels)
      .unwrap_err();
    assert!(matches!(err, Error::Format(_)));
  }

  #[test]
  fn load_pairs_both_splits() {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, bytes: &[u8]| {
      let path = dir.path().join(name);
      std::fs::write(&path, bytes).unwrap();
      path
    };

    let train_images = write("train-images", &image_bytes(2051, 2, 1, 2, &[0, 255, 128, 7]));
    let train_labels = write("train-labels", &label_bytes(2049, 2, &[4, 1]));
    let test_images = write("test-images", &image_bytes(2051, 1, 1, 2, &[9, 200]));
    let test_labels = write("test-labels", &label_bytes(2049, 1, &[2]));

    let dataset = Dataset::<f64>::load(&train_images, &train_labels, &test_images, &test_labels)
      .unwrap();
    assert_eq!(dataset.training.samples.len(), 2);
    assert_eq!(dataset.training_labels, vec![4, 1]);
    assert_eq!(dataset.test.samples.len(), 1);
    assert_eq!(dataset.test_labels, vec![2]);
  }
}
