// SPDX-License-Identifier: Apache-2.0

use num_bigint::BigUint;

/// Tracks which bits of one signal have a driver, and who drives them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DrivenBits {
    driven: BigUint,
    width: usize,
    drivers: Vec<(usize, usize, String)>,
}

impl DrivenBits {
    pub(crate) fn new(width: usize) -> Self {
        DrivenBits {
            driven: BigUint::ZERO,
            width,
            drivers: Vec::new(),
        }
    }

    /// Marks bits `msb` down to `lsb` as driven by `driver`. On overlap,
    /// returns the description of a driver that already owns one of the bits.
    pub(crate) fn driven(&mut self, msb: usize, lsb: usize, driver: String) -> Result<(), String> {
        let mask = ((BigUint::from(1u32) << (msb - lsb + 1)) - BigUint::from(1u32)) << lsb;

        if &self.driven & &mask != BigUint::ZERO {
            let first = self
                .drivers
                .iter()
                .find(|(other_msb, other_lsb, _)| *other_lsb <= msb && lsb <= *other_msb)
                .map(|(_, _, description)| description.clone())
                .unwrap_or_default();
            return Err(first);
        }

        self.driven |= mask;
        self.drivers.push((msb, lsb, driver));
        Ok(())
    }

    pub(crate) fn all_driven(&self) -> bool {
        self.driven == (BigUint::from(1u32) << self.width) - BigUint::from(1u32)
    }

    /// Describes the lowest run of undriven bits: `""` if no bit is driven,
    /// otherwise `[i]` or `[msb:lsb]`. `None` if every bit is driven.
    pub(crate) fn example_undriven_bits(&self) -> Option<String> {
        let is_driven = |i: usize| self.driven.bit(i as u64);
        let lsb = (0..self.width).find(|i| !is_driven(*i))?;
        let msb = (lsb..self.width)
            .take_while(|i| !is_driven(*i))
            .last()
            .unwrap_or(lsb);
        if msb - lsb + 1 == self.width {
            Some(String::new())
        } else if msb == lsb {
            Some(format!("[{lsb}]"))
        } else {
            Some(format!("[{msb}:{lsb}]"))
        }
    }
}
