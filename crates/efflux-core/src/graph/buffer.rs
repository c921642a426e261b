//! Per-node stereo block buffers.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// A stereo audio block, one `Vec` per channel.
#[derive(Debug, Clone, Default)]
pub struct StereoBuffer {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoBuffer {
    /// Creates a zeroed buffer with the given block size.
    pub fn new(block_size: usize) -> Self {
        Self {
            left: vec![0.0; block_size],
            right: vec![0.0; block_size],
        }
    }

    /// Fills both channels with zeros.
    pub fn clear(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Resizes both channels, zeroing new samples.
    pub fn resize(&mut self, block_size: usize) {
        self.left.resize(block_size, 0.0);
        self.right.resize(block_size, 0.0);
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True if the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Adds the first `len` samples of `other` into this buffer.
    pub fn accumulate_from(&mut self, other: &StereoBuffer, len: usize) {
        for (dst, src) in self.left[..len].iter_mut().zip(&other.left[..len]) {
            *dst += *src;
        }
        for (dst, src) in self.right[..len].iter_mut().zip(&other.right[..len]) {
            *dst += *src;
        }
    }

    /// Mono sum of sample `i`, used when a stereo output drives a parameter.
    #[inline]
    pub fn mono(&self, i: usize) -> f32 {
        (self.left[i] + self.right[i]) * 0.5
    }
}
