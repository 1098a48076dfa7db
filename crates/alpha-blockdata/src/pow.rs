//! Proof-of-work target arithmetic.
//!
//! A [`Target`] is the 256-bit threshold a block's proof-of-work hash must not
//! exceed. Headers carry it in the 32-bit compact form ([`CompactTarget`],
//! the `bits` field); this module converts between the two and derives the
//! difficulty relative to a network's maximum attainable target. Checking a
//! hash against the target is left to the proof-of-work verifier.

pub use bitcoin::CompactTarget;
use primitive_types::U256;

/// Represents a target value expressed as an unsigned 256-bit integer.
///
/// # Example
///
/// ```
/// use alpha_blockdata::pow::{CompactTarget, Target};
///
/// let target = Target::from_compact(CompactTarget::from_consensus(0x1d0fffff)).unwrap();
/// assert_eq!(target, Target::mainnet_max_target());
/// assert_eq!(target.to_compact().map(|c| c.to_consensus()), Some(0x1d0fffff));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target(U256);

impl Target {
    /// Creates a new Target instance with the specified U256 value.
    pub(crate) const fn new(target: U256) -> Self {
        Target(target)
    }

    /// Creates a new `Target` from a big-endian hexadecimal string.
    ///
    /// # Returns
    ///
    /// The parsed target, or `None` if the string is not valid hex or does not
    /// fit in 256 bits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        U256::from_str_radix(hex, 16).ok().map(Target)
    }

    /// Creates a Target from bytes (big-endian).
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }

    /// Returns the big-endian byte representation of the target.
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        bytes
    }

    /// A zero target, which no hash can satisfy.
    pub const fn zero() -> Self {
        Target(U256::zero())
    }

    /// The maximum attainable target of mainnet and testnet (`bits` = `0x1d0fffff`).
    pub const fn mainnet_max_target() -> Self {
        Target::new(U256([0, 0, 0, 0x0000_000f_ffff_0000]))
    }

    /// The maximum attainable target of regtest (`bits` = `0x207fffff`).
    pub const fn regtest_max_target() -> Self {
        Target::new(U256([0, 0, 0, 0x7fff_ff00_0000_0000]))
    }

    /// Returns true if the target is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Calculates the difficulty of this target relative to a maximum
    /// attainable target.
    ///
    /// # Returns
    ///
    /// * `Some(u128)` - `max_attainable_target / self`, capped at `u128::MAX`
    /// * `None` - When this target is zero
    pub fn difficulty(self, max_attainable_target: Target) -> Option<u128> {
        let diff = max_attainable_target.0.checked_div(self.0)?;
        if diff > U256::from(u128::MAX) {
            Some(u128::MAX)
        } else {
            Some(diff.as_u128())
        }
    }

    /// Same as [`Target::difficulty`], as a floating-point value.
    #[allow(clippy::cast_precision_loss, reason = "Display-only precision")]
    pub fn difficulty_float(self, max_attainable_target: Target) -> Option<f64> {
        let diff = self.difficulty(max_attainable_target)?;
        Some(diff as f64)
    }

    /// Converts a compact target representation into a Target instance.
    ///
    /// The compact format stores a 1-byte exponent and a 3-byte mantissa; the
    /// target is `mantissa * 256^(exponent - 3)`. Bit 23 of the mantissa is a
    /// sign bit.
    ///
    /// # Returns
    ///
    /// * `Some(Target)` - The expanded target
    /// * `None` - If the value is negative, has a zero mantissa, or does not
    ///   fit in 256 bits
    pub fn from_compact(compact: CompactTarget) -> Option<Self> {
        let n = compact.to_consensus();
        let exponent = n >> 24;
        let mantissa = n & 0x007f_ffff;

        if n & 0x0080_0000 != 0 {
            return None;
        }

        if mantissa == 0 {
            return None;
        }

        if exponent > 32 {
            return None;
        }

        let base = U256::from(mantissa);

        #[allow(
            clippy::arithmetic_side_effects,
            reason = "Shift amounts are bounded below 256"
        )]
        let target = if exponent <= 3 {
            let shift_bits = 3u32.checked_sub(exponent)?.checked_mul(8)?;
            base >> shift_bits
        } else {
            let shift_bits = exponent.checked_sub(3)?.checked_mul(8)?;
            // The mantissa must survive the shift intact.
            if base.bits().checked_add(usize::try_from(shift_bits).ok()?)? > 256 {
                return None;
            }
            base << shift_bits
        };

        Some(Target(target))
    }

    /// Converts the target into its compact representation.
    ///
    /// Precision below the 3-byte mantissa is discarded, so the round trip
    /// through [`Target::from_compact`] is only exact for targets that were
    /// themselves expanded from a compact value.
    pub fn to_compact(self) -> Option<CompactTarget> {
        if self.0.is_zero() {
            return Some(CompactTarget::from_consensus(0));
        }

        let bit_length = u32::try_from(self.0.bits()).ok()?;
        let size = bit_length.checked_add(7)?.checked_div(8)?;

        let mantissa = if size <= 3 {
            let shift_bits = 3u32.checked_sub(size)?.checked_mul(8)?;
            self.0.low_u32().checked_shl(shift_bits)? & 0x00ff_ffff
        } else {
            let shift_bits = size.checked_sub(3)?.checked_mul(8)?;
            #[allow(
                clippy::arithmetic_side_effects,
                reason = "Shift amount is below 256 for a 256-bit value"
            )]
            let shifted = self.0 >> shift_bits;
            shifted.low_u32() & 0x00ff_ffff
        };

        // Keep the sign bit clear by moving one byte into the exponent.
        let (mantissa, size) = if mantissa & 0x0080_0000 != 0 {
            (mantissa.checked_shr(8)?, size.checked_add(1)?)
        } else {
            (mantissa, size)
        };

        let compact = size.checked_shl(24)?.checked_add(mantissa)?;
        Some(CompactTarget::from_consensus(compact))
    }
}

impl From<Target> for U256 {
    fn from(target: Target) -> Self {
        target.0
    }
}
