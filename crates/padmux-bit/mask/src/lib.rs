mod bitmask;

pub use bitmask::{Bitmask, Iter};

/// A value that owns exactly one bit of a 64-bit mask.
pub trait Bitable: Sized {
    /// The single bit this value occupies.
    fn bit(&self) -> u64;
    /// Position of [`Bitable::bit`] within the mask.
    fn index(&self) -> u32;
    /// Inverse of [`Bitable::index`].
    fn from_index(index: u32) -> Option<Self>;
}
