// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Not, Range, Shl, Shr, Sub};

use num_bigint::BigUint;

/// A fixed-width unsigned bit vector.
///
/// The value is always masked to `width` bits. Assigning a wider value into a
/// narrower destination keeps the low-order bits; widening only happens when
/// asked for with [`Bits::zext`] or [`Bits::sext`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Bits {
    width: usize,
    value: BigUint,
}

fn mask(width: usize) -> BigUint {
    (BigUint::from(1u32) << width) - BigUint::from(1u32)
}

impl Bits {
    /// Creates a bit vector of the given width, keeping only the low-order
    /// `width` bits of `value`.
    pub fn new(width: usize, value: impl Into<BigUint>) -> Bits {
        Bits {
            width,
            value: value.into() & mask(width),
        }
    }

    pub fn zero(width: usize) -> Bits {
        Bits {
            width,
            value: BigUint::ZERO,
        }
    }

    pub fn ones(width: usize) -> Bits {
        Bits {
            width,
            value: mask(width),
        }
    }

    pub fn from_bool(bit: bool) -> Bits {
        Bits::new(1, bit as u32)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Returns the low 64 bits of the value.
    pub fn to_u64(&self) -> u64 {
        self.value.iter_u64_digits().next().unwrap_or(0)
    }

    /// Returns `true` if any bit is set.
    pub fn to_bool(&self) -> bool {
        !self.is_zero()
    }

    pub fn is_zero(&self) -> bool {
        self.value == BigUint::ZERO
    }

    pub fn count_ones(&self) -> u64 {
        self.value.count_ones()
    }

    /// Returns bit `i`; panics if `i` is out of range.
    pub fn bit(&self, i: usize) -> bool {
        assert!(
            i < self.width,
            "Bit {} out of range for a {}-bit value",
            i,
            self.width
        );
        self.value.bit(i as u64)
    }

    pub fn set_bit(&mut self, i: usize, bit: bool) {
        assert!(
            i < self.width,
            "Bit {} out of range for a {}-bit value",
            i,
            self.width
        );
        self.value.set_bit(i as u64, bit);
    }

    /// Returns bits `msb` down to `lsb`, inclusive.
    pub fn slice(&self, msb: usize, lsb: usize) -> Bits {
        assert!(
            lsb <= msb && msb < self.width,
            "Slice [{}:{}] is invalid for a {}-bit value",
            msb,
            lsb,
            self.width
        );
        Bits::new(msb - lsb + 1, &self.value >> lsb)
    }

    /// Returns bits `[lo, hi)`; the result is `hi - lo` bits wide.
    pub fn range(&self, bits: Range<usize>) -> Bits {
        assert!(
            bits.start < bits.end,
            "Range {:?} is empty for a {}-bit value",
            bits,
            self.width
        );
        self.slice(bits.end - 1, bits.start)
    }

    /// Overwrites bits `msb` down to `lsb` with `value`, leaving every other
    /// bit untouched. `value` is resized to the slice width first.
    pub fn set_slice(&mut self, msb: usize, lsb: usize, value: &Bits) {
        assert!(
            lsb <= msb && msb < self.width,
            "Slice [{}:{}] is invalid for a {}-bit value",
            msb,
            lsb,
            self.width
        );
        let slice_width = msb - lsb + 1;
        let hole = mask(self.width) ^ (mask(slice_width) << lsb);
        let incoming = (&value.value & mask(slice_width)) << lsb;
        self.value = (&self.value & hole) | incoming;
    }

    /// Keeps the low-order `width` bits.
    pub fn trunc(&self, width: usize) -> Bits {
        assert!(
            width <= self.width,
            "Cannot truncate a {}-bit value to {} bits",
            self.width,
            width
        );
        Bits::new(width, self.value.clone())
    }

    pub fn zext(&self, width: usize) -> Bits {
        assert!(
            width >= self.width,
            "Cannot zero-extend a {}-bit value to {} bits",
            self.width,
            width
        );
        Bits {
            width,
            value: self.value.clone(),
        }
    }

    pub fn sext(&self, width: usize) -> Bits {
        assert!(
            width >= self.width,
            "Cannot sign-extend a {}-bit value to {} bits",
            self.width,
            width
        );
        if self.width > 0 && self.bit(self.width - 1) {
            let fill = mask(width) ^ mask(self.width);
            Bits {
                width,
                value: &self.value | fill,
            }
        } else {
            self.zext(width)
        }
    }

    /// Assignment semantics: the destination width governs.
    pub fn resize(&self, width: usize) -> Bits {
        if width >= self.width {
            self.zext(width)
        } else {
            self.trunc(width)
        }
    }

    /// Concatenates `parts`, the first element ending up most significant.
    pub fn concat(parts: &[Bits]) -> Bits {
        let mut result = Bits::zero(0);
        for part in parts {
            result = Bits {
                width: result.width + part.width,
                value: (result.value << part.width) | &part.value,
            };
        }
        result
    }
}

impl Default for Bits {
    fn default() -> Self {
        Bits::zero(1)
    }
}

impl From<bool> for Bits {
    fn from(bit: bool) -> Self {
        Bits::from_bool(bit)
    }
}

macro_rules! bits_from_uint {
    ($($ty:ty => $width:expr),*) => {
        $(
            impl From<$ty> for Bits {
                fn from(value: $ty) -> Self {
                    Bits::new($width, value)
                }
            }
        )*
    };
}

bits_from_uint!(
    u8 => 8,
    u16 => 16,
    u32 => 32,
    u64 => 64,
    u128 => 128,
    usize => usize::BITS as usize
);

/// Two's complement at 32 bits, so that unsuffixed literals such as `-1`
/// fill any destination of up to 32 bits.
impl From<i32> for Bits {
    fn from(value: i32) -> Self {
        Bits::new(32, value as u32)
    }
}

impl PartialEq<u64> for Bits {
    fn eq(&self, other: &u64) -> bool {
        self.value == BigUint::from(*other)
    }
}

macro_rules! bits_bitwise_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Bits> for &Bits {
            type Output = Bits;

            fn $method(self, rhs: &Bits) -> Bits {
                let width = self.width.max(rhs.width);
                Bits::new(width, &self.value $op &rhs.value)
            }
        }

        impl $trait<Bits> for Bits {
            type Output = Bits;

            fn $method(self, rhs: Bits) -> Bits {
                (&self).$method(&rhs)
            }
        }
    };
}

bits_bitwise_op!(BitAnd, bitand, &);
bits_bitwise_op!(BitOr, bitor, |);
bits_bitwise_op!(BitXor, bitxor, ^);
bits_bitwise_op!(Add, add, +);

impl Sub<&Bits> for &Bits {
    type Output = Bits;

    fn sub(self, rhs: &Bits) -> Bits {
        let width = self.width.max(rhs.width);
        // Borrow from 2^width so the result wraps instead of underflowing.
        let modulus = BigUint::from(1u32) << width;
        Bits::new(width, (&self.value + &modulus) - (&rhs.value & mask(width)))
    }
}

impl Sub<Bits> for Bits {
    type Output = Bits;

    fn sub(self, rhs: Bits) -> Bits {
        &self - &rhs
    }
}

impl Not for &Bits {
    type Output = Bits;

    fn not(self) -> Bits {
        Bits::new(self.width, &self.value ^ mask(self.width))
    }
}

impl Not for Bits {
    type Output = Bits;

    fn not(self) -> Bits {
        !&self
    }
}

impl Shl<usize> for &Bits {
    type Output = Bits;

    fn shl(self, amount: usize) -> Bits {
        Bits::new(self.width, &self.value << amount)
    }
}

impl Shr<usize> for &Bits {
    type Output = Bits;

    fn shr(self, amount: usize) -> Bits {
        Bits::new(self.width, &self.value >> amount)
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.width.div_ceil(4).max(1);
        write!(f, "{:0digits$x}", self.value, digits = digits)
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'h{}", self.width, self)
    }
}

impl fmt::LowerHex for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}

impl fmt::Binary for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.value, width = self.width.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_masks_to_width() {
        let b = Bits::new(4, 0x1fu32);
        assert_eq!(b.width(), 4);
        assert_eq!(b.to_u64(), 0xf);
    }

    #[test]
    fn resize_keeps_low_order_bits() {
        let wide = Bits::new(16, 0xabcdu32);
        assert_eq!(wide.resize(8).to_u64(), 0xcd);
        assert_eq!(wide.resize(20).width(), 20);
        assert_eq!(wide.resize(20).to_u64(), 0xabcd);
    }

    #[test]
    fn sext_replicates_sign() {
        assert_eq!(Bits::new(4, 0b1010u32).sext(8).to_u64(), 0xfa);
        assert_eq!(Bits::new(4, 0b0110u32).sext(8).to_u64(), 0x06);
    }

    #[test]
    fn range_and_slice_agree() {
        let b = Bits::new(8, 0b1011_0110u32);
        assert_eq!(b.range(2..6), b.slice(5, 2));
        assert_eq!(b.range(2..6).to_u64(), 0b1101);
        assert_eq!(b.range(2..6).width(), 4);
    }

    #[test]
    fn set_slice_leaves_other_bits() {
        let mut b = Bits::new(8, 0xffu32);
        b.set_slice(5, 2, &Bits::new(4, 0u32));
        assert_eq!(b.to_u64(), 0b1100_0011);
        b.set_slice(1, 0, &Bits::new(8, 0xfeu32));
        assert_eq!(b.to_u64(), 0b1100_0010);
    }

    #[test]
    fn arithmetic_wraps() {
        let a = Bits::new(4, 0xeu32);
        let b = Bits::new(4, 0x3u32);
        assert_eq!((&a + &b).to_u64(), 0x1);
        assert_eq!((&b - &a).to_u64(), 0x5);
        assert_eq!((!&a).to_u64(), 0x1);
    }

    #[test]
    fn concat_orders_msb_first() {
        let c = Bits::concat(&[Bits::new(4, 0xau32), Bits::new(8, 0x5cu32)]);
        assert_eq!(c.width(), 12);
        assert_eq!(c.to_u64(), 0xa5c);
    }

    #[test]
    fn display_pads_hex() {
        assert_eq!(Bits::new(16, 1u32).to_string(), "0001");
        assert_eq!(Bits::new(1, 1u32).to_string(), "1");
        assert_eq!(Bits::new(9, 0x10u32).to_string(), "010");
    }
}
