/// Fixed output dimensionality shared by image and text encoders, so both
/// modalities are comparable in the same index.
pub const EMBEDDING_DIM: usize = 512;

/// A unit-norm vector representation of an image or text.
///
/// Normalization happens at encode time; the index stores values as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Build an embedding normalized to unit L2 length. A zero vector is
    /// returned unchanged rather than divided by zero.
    pub fn normalized(mut values: Vec<f32>) -> Self {
        l2_normalize(&mut values);
        Self { values }
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    pub fn l2_norm(&self) -> f32 {
        self.values.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Squared Euclidean distance. Monotonic with cosine similarity for
    /// unit vectors, which is why the index ranks by it.
    pub fn squared_distance(&self, other: &Self) -> f32 {
        if self.values.len() != other.values.len() {
            return f32::INFINITY;
        }

        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

pub fn l2_normalize(values: &mut [f32]) {
    let length: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if length > 0.0 {
        values.iter_mut().for_each(|x| *x /= length);
    }
}
