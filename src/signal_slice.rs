// SPDX-License-Identifier: Apache-2.0

use crate::Signal;

/// Represents a slice of a signal.
///
/// A slice is a defined as a contiguous range of bits from `msb` down to `lsb`,
/// inclusive. A slice can be a single bit on the signal (`msb` equal to
/// `lsb`), the entire signal, or any range in between.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignalSlice {
    pub(crate) signal: Signal,
    pub(crate) msb: usize,
    pub(crate) lsb: usize,
}

impl SignalSlice {
    /// Divides a slice into `n` parts of equal bit width, returning a vector
    /// of `n` slices, least significant first. For example, if a signal is 8
    /// bits wide and `n` is 2, the result is `sig[3:0]` and `sig[7:4]`. This
    /// method panics if the width is not divisible by `n`.
    pub fn subdivide(&self, n: usize) -> Vec<Self> {
        let width = self.width();
        if n == 0 || width % n != 0 {
            panic!(
                "Cannot subdivide {} into {} equal parts.",
                self.debug_string(),
                n
            );
        }
        (0..n)
            .map(move |i| {
                let sub_width = width / n;
                SignalSlice {
                    signal: self.signal.clone(),
                    msb: ((i + 1) * sub_width) - 1 + self.lsb,
                    lsb: (i * sub_width) + self.lsb,
                }
            })
            .collect()
    }

    /// Returns the slice `width` bits wide starting `offset` bits above this
    /// slice's `lsb`.
    pub fn slice_relative(&self, offset: usize, width: usize) -> Self {
        assert!(
            width > 0 && offset + width <= self.width(),
            "Relative slice ({}, {}) does not fit in {}",
            offset,
            width,
            self.debug_string()
        );

        SignalSlice {
            signal: self.signal.clone(),
            msb: self.lsb + offset + width - 1,
            lsb: self.lsb + offset,
        }
    }

    pub fn width(&self) -> usize {
        self.msb - self.lsb + 1
    }

    pub fn msb(&self) -> usize {
        self.msb
    }

    pub fn lsb(&self) -> usize {
        self.lsb
    }

    /// Returns the signal this slice is taken from.
    pub fn get_signal(&self) -> &Signal {
        &self.signal
    }

    /// Returns `true` if this slice covers every bit of its signal.
    pub fn is_whole(&self) -> bool {
        self.lsb == 0 && self.msb + 1 == self.signal.width()
    }

    pub(crate) fn debug_string(&self) -> String {
        format!("{}[{}:{}]", self.signal.debug_string(), self.msb, self.lsb)
    }

    pub(crate) fn check_validity(&self) {
        if self.msb >= self.signal.width() {
            panic!(
                "Signal slice {} is invalid: msb must be less than the width of the signal.",
                self.debug_string()
            );
        } else if self.lsb > self.msb {
            panic!(
                "Signal slice {} is invalid: lsb must be less than or equal to msb.",
                self.debug_string()
            );
        }
    }
}

/// Indicates that a type can be converted to a `SignalSlice`. `Signal` and
/// `SignalSlice` both implement this trait, which makes it easier to perform
/// the same operations on both.
pub trait ConvertibleToSignalSlice {
    fn to_signal_slice(&self) -> SignalSlice;
}

impl ConvertibleToSignalSlice for SignalSlice {
    fn to_signal_slice(&self) -> SignalSlice {
        self.clone()
    }
}

impl<T: ConvertibleToSignalSlice + ?Sized> ConvertibleToSignalSlice for &T {
    fn to_signal_slice(&self) -> SignalSlice {
        (**self).to_signal_slice()
    }
}
