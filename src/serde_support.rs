//! Hex-encoding `serde::with` adapters for curve/Field-bearing DTOs, the
//! same pattern the teacher's `crypto_serde` module used for ciphertexts and
//! shuffle proofs: canonical (`ark-serialize`) bytes in, hex string out, so
//! JSON-facing output is human-readable instead of a raw byte array.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod canonical_hex {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: CanonicalSerialize,
        S: Serializer,
    {
        let mut bytes = Vec::new();
        value
            .serialize_compressed(&mut bytes)
            .map_err(serde::ser::Error::custom)?;
        hex::encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: CanonicalDeserialize,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        T::deserialize_compressed(&bytes[..]).map_err(serde::de::Error::custom)
    }
}

pub mod canonical_hex_vec {
    use super::*;

    pub fn serialize<T, S>(values: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        T: CanonicalSerialize,
        S: Serializer,
    {
        let encoded: Result<Vec<String>, _> = values
            .iter()
            .map(|v| {
                let mut bytes = Vec::new();
                v.serialize_compressed(&mut bytes).map(|_| hex::encode(bytes))
            })
            .collect();
        encoded
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        T: CanonicalDeserialize,
        D: Deserializer<'de>,
    {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .into_iter()
            .map(|s| {
                let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
                T::deserialize_compressed(&bytes[..]).map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{fixed_base_mul, Curve, Scalar};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wrapper(#[serde(with = "canonical_hex")] Curve);

    #[test]
    fn hex_roundtrip_preserves_point() {
        let p = fixed_base_mul(Scalar::from(17u64));
        let wrapped = Wrapper(p);
        let json = serde_json::to_string(&wrapped).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(wrapped, back);
    }
}
