use crate::sha256::{Hash, Hasher, Sha256};
use crate::types::TransactionOutput;
use crate::util::Saveable;
use ecdsa::signature::{Signer, Verifier};
use ecdsa::{Signature as ECDSASignature, SigningKey, VerifyingKey};
use k256::pkcs8::EncodePublicKey;
use k256::Secp256k1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Signature(pub ECDSASignature<Secp256k1>);

impl Signature {
    // sign a crate::types::TransactionOutput from its Sha256 hash
    pub fn sign_output(output_hash: &Hash, private_key: &PrivateKey) -> Self {
        let signature: ECDSASignature<Secp256k1> = private_key.0.sign(&output_hash.as_bytes());
        Signature(signature)
    }

    // verify a signature
    pub fn verify(&self, output_hash: &Hash, public_key: &PublicKey) -> bool {
        public_key
            .0
            .verify(&output_hash.as_bytes(), &self.0)
            .is_ok()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PublicKey(VerifyingKey<Secp256k1>);

impl Saveable for PublicKey {
    fn load<I: std::io::Read>(mut reader: I) -> std::io::Result<Self> {
        // read PEM-encoded public key into string
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        // decode the public key from PEM
        let public_key = buf
            .trim()
            .parse()
            .map_err(|_| IoError::new(IoErrorKind::InvalidData, "Failed to parse PublicKey"))?;
        Ok(PublicKey(public_key))
    }
    fn save<O: std::io::Write>(&self, mut writer: O) -> std::io::Result<()> {
        let s = self
            .0
            .to_public_key_pem(Default::default())
            .map_err(|_| IoError::new(IoErrorKind::InvalidData, "Failed to serialize PublicKey"))?;
        writer.write_all(s.as_bytes())?;
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PrivateKey(#[serde(with = "signkey_serde")] pub SigningKey<Secp256k1>);

impl PrivateKey {
    pub fn new_key() -> Self {
        Self(SigningKey::random(&mut rand::thread_rng()))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key().clone())
    }
}

impl Saveable for PrivateKey {
    fn load<I: std::io::Read>(reader: I) -> std::io::Result<Self> {
        ciborium::de::from_reader(reader)
            .map_err(|_| IoError::new(IoErrorKind::InvalidData, "Failed to deserialize PrivateKey"))
    }
    fn save<O: std::io::Write>(&self, writer: O) -> std::io::Result<()> {
        ciborium::ser::into_writer(self, writer).map_err(|_| {
            IoError::new(IoErrorKind::InvalidData, "Failed to serialize PrivateKey")
        })?;
        Ok(())
    }
}

mod signkey_serde {
    use serde::de::Error;
    use serde::Deserialize;

    pub fn serialize<S>(
        key: &super::SigningKey<super::Secp256k1>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&key.to_bytes())
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<super::SigningKey<super::Secp256k1>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::<u8>::deserialize(deserializer)?;
        super::SigningKey::from_slice(&bytes).map_err(D::Error::custom)
    }
}

/// The spending target of an output: a digest of the owner's public key.
/// An address never carries the key itself.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address(pub Hash);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Spend-authorization capability consumed by transaction validation.
///
/// Kept behind a trait so the validator can run against deterministic
/// fakes as well as real secp256k1 keys.
pub trait Authenticator {
    /// Derive the address a public key spends from.
    fn calc_address(&self, public_key: &PublicKey) -> Address;

    /// Check that `signature` authenticates exactly `output` under `public_key`.
    fn verify_signature(
        &self,
        public_key: &PublicKey,
        output: &TransactionOutput,
        signature: &Signature,
    ) -> bool;
}

/// ECDSA over secp256k1, addresses are SHA-256 of the encoded key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Authenticator;

impl Authenticator for Secp256k1Authenticator {
    fn calc_address(&self, public_key: &PublicKey) -> Address {
        Address(Hash::hash_with(&Sha256, public_key))
    }

    fn verify_signature(
        &self,
        public_key: &PublicKey,
        output: &TransactionOutput,
        signature: &Signature,
    ) -> bool {
        signature.verify(&output.hash(), public_key)
    }
}

impl PublicKey {
    pub fn address(&self) -> Address {
        Secp256k1Authenticator.calc_address(self)
    }
}

// derive an address through an injected digest
pub fn address_with<H: Hasher + ?Sized>(hasher: &H, public_key: &PublicKey) -> Address {
    Address(Hash::hash_with(hasher, public_key))
}
