use crate::types::Pixel;

#[cfg(feature = "array")]
use ndarray::Array2;

/// A 2-D tile of sample values backed by its `size` (cols, rows) and a
/// row-major `Vec<T>`.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct Buffer<T> {
    pub size: (usize, usize),
    pub data: Vec<T>,
}

impl<T: Pixel> Buffer<T> {
    /// Construct a new buffer from `size` (`(cols, rows)`) and `Vec<T>`.
    ///
    /// # Panic
    /// Will panic if `size.0 * size.1 != data.len()`.
    pub fn new(size: (usize, usize), data: Vec<T>) -> Self {
        assert_eq!(
            size.0 * size.1,
            data.len(),
            "size {:?} does not match length {}",
            size,
            data.len()
        );
        Buffer { size, data }
    }

    /// A buffer of the given size with every sample set to `value`.
    pub fn filled(size: (usize, usize), value: T) -> Self {
        Buffer {
            size,
            data: vec![value; size.0 * size.1],
        }
    }

    pub fn width(&self) -> usize {
        self.size.0
    }

    pub fn height(&self) -> usize {
        self.size.1
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(col, row)`, or `None` when out of range.
    pub fn get(&self, col: usize, row: usize) -> Option<T> {
        if col < self.size.0 && row < self.size.1 {
            Some(self.data[row * self.size.0 + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, col: usize, row: usize, value: T) {
        assert!(col < self.size.0 && row < self.size.1);
        self.data[row * self.size.0 + col] = value;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    #[cfg(feature = "array")]
    /// Convert `self` into an [`ndarray::Array2`].
    pub fn to_array(self) -> crate::errors::Result<Array2<T>> {
        // Array2 shape is (rows, cols) and Buffer shape is (cols in x-axis, rows in y-axis)
        Ok(Array2::from_shape_vec(
            (self.size.1, self.size.0),
            self.data,
        )?)
    }
}

pub type ByteBuffer = Buffer<u8>;

#[cfg(feature = "array")]
impl<T: Pixel> TryFrom<Buffer<T>> for Array2<T> {
    type Error = crate::errors::RasterError;

    fn try_from(value: Buffer<T>) -> Result<Self, Self::Error> {
        value.to_array()
    }
}

#[cfg(feature = "array")]
impl<T: Pixel> From<Array2<T>> for Buffer<T> {
    fn from(value: Array2<T>) -> Self {
        // Array2 shape is (rows, cols) and Buffer shape is (cols in x-axis, rows in y-axis)
        let shape = value.shape();
        let (rows, cols) = (shape[0], shape[1]);
        let data = value
            .as_standard_layout()
            .iter()
            .copied()
            .collect::<Vec<T>>();
        Buffer::new((cols, rows), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled() {
        let b = Buffer::filled((3, 2), 7u8);
        assert_eq!(b.len(), 6);
        assert_eq!(b.get(2, 1), Some(7));
        assert_eq!(b.get(3, 1), None);
        assert_eq!(b.get(2, 2), None);
    }

    #[test]
    fn test_set_get() {
        let mut b = Buffer::filled((4, 4), 0i32);
        b.set(1, 2, 42);
        assert_eq!(b.get(1, 2), Some(42));
        assert_eq!(b.data[2 * 4 + 1], 42);
    }

    #[test]
    #[should_panic]
    fn test_size_mismatch() {
        let _ = Buffer::new((2, 3), vec![0u8; 5]);
    }

    #[cfg(feature = "array")]
    #[test]
    fn test_array_round_trip() {
        let b = Buffer::new((5, 10), (0..5 * 10).collect::<Vec<i32>>());
        let a = b.clone().to_array().unwrap();
        let b2: Buffer<_> = a.into();
        assert_eq!(b, b2);
    }
}
