// Path: crates/types/src/primitives.rs

//! Primitive identifiers and the 256-bit monetary amount.
//!
//! Principals are 20-byte `Address`es. Every kernel object (authorization,
//! intent, channel, policy, domain) is keyed by an opaque 32-byte
//! identifier; each gets its own newtype so an `AuthHash` can never be
//! handed to an operation expecting a `ChannelId`.

use alloy_primitives::U256;
use parity_scale_codec::{Decode, Encode, Error as CodecError, Input, Output};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte account address. Identifies grantors, grantees, executors,
/// receivers, tokens, and kernel component instances alike.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address. Used as the "absent" sentinel in a handful of
    /// wire positions; never a valid principal.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Whether this is the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(raw: [u8; 20]) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A 256-bit unsigned monetary amount.
///
/// SCALE-encoded as exactly 32 big-endian bytes so the canonical state
/// encoding is independent of the host's limb layout. Arithmetic is
/// explicit: overflow never wraps and never saturates silently.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub U256);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(U256::ZERO);

    /// The largest representable amount.
    pub const MAX: Amount = Amount(U256::MAX);

    /// Whether this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition; `None` on 256-bit overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction; `None` on underflow.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Addition clamped to `Amount::MAX`.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// Subtraction clamped to zero.
    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Checked multiplication by a seconds counter; `None` on overflow.
    pub fn checked_mul_u64(self, factor: u64) -> Option<Amount> {
        self.0.checked_mul(U256::from(factor)).map(Amount)
    }

    /// Checked division by a small divisor; `None` when it is zero.
    pub fn checked_div_u64(self, divisor: u64) -> Option<Amount> {
        self.0.checked_div(U256::from(divisor)).map(Amount)
    }

    /// The smaller of two amounts.
    pub fn min(self, other: Amount) -> Amount {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Big-endian 32-byte representation, as used by the canonical codec
    /// and by typed-payload hashing.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }
}

impl From<u64> for Amount {
    fn from(raw: u64) -> Self {
        Amount(U256::from(raw))
    }
}

impl From<U256> for Amount {
    fn from(raw: U256) -> Self {
        Amount(raw)
    }
}

impl Encode for Amount {
    fn size_hint(&self) -> usize {
        32
    }

    fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
        dest.write(&self.to_be_bytes());
    }
}

impl Decode for Amount {
    fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
        let mut raw = [0u8; 32];
        input.read(&mut raw)?;
        Ok(Amount(U256::from_be_bytes(raw)))
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical identifier of a per-call pull authorization: the typed struct
/// hash over its seven consent fields, signature excluded. Wallets and
/// indexers derive the same value independently.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Debug,
)]
pub struct AuthHash(pub [u8; 32]);

impl AsRef<[u8]> for AuthHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for AuthHash {
    fn from(raw: [u8; 32]) -> Self {
        Self(raw)
    }
}

impl fmt::Display for AuthHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Canonical identifier of a cross-domain flow intent; derived exactly like
/// [`AuthHash`] but over the intent's ten consent fields.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Debug,
)]
pub struct IntentHash(pub [u8; 32]);

impl AsRef<[u8]> for IntentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for IntentHash {
    fn from(raw: [u8; 32]) -> Self {
        Self(raw)
    }
}

impl fmt::Display for IntentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Opaque 32-byte id of a streaming flow channel.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Debug,
)]
pub struct ChannelId(pub [u8; 32]);

impl ChannelId {
    /// Whether this is the all-zero id, which no live channel may use.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl AsRef<[u8]> for ChannelId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ChannelId {
    fn from(raw: [u8; 32]) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Opaque 32-byte id of a spend policy.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Debug,
)]
pub struct PolicyId(pub [u8; 32]);

impl PolicyId {
    /// Whether this is the all-zero id, which no live policy may use.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl AsRef<[u8]> for PolicyId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for PolicyId {
    fn from(raw: [u8; 32]) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Opaque 32-byte id of a value domain (an account, venue, or chain
/// partition known to the domain directory).
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Debug,
)]
pub struct DomainId(pub [u8; 32]);

impl AsRef<[u8]> for DomainId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for DomainId {
    fn from(raw: [u8; 32]) -> Self {
        Self(raw)
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parity_scale_codec::{Decode, Encode};

    #[test]
    fn amount_scale_encoding_is_32_big_endian_bytes() {
        let amount = Amount::from(0x0102_0304u64);
        let encoded = amount.encode();
        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[28..], &[0x01, 0x02, 0x03, 0x04]);
        let decoded = Amount::decode(&mut encoded.as_slice()).expect("decode amount");
        assert_eq!(decoded, amount);
    }

    #[test]
    fn amount_checked_arithmetic_refuses_overflow() {
        assert_eq!(Amount::MAX.checked_add(Amount::from(1u64)), None);
        assert_eq!(Amount::ZERO.checked_sub(Amount::from(1u64)), None);
        assert_eq!(
            Amount::from(6u64).checked_mul_u64(7),
            Some(Amount::from(42u64))
        );
    }

    #[test]
    fn zero_address_is_flagged() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address([1u8; 20]).is_zero());
    }
}
