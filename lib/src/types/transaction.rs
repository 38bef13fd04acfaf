use std::collections::HashSet;

use crate::crypto::{Address, Authenticator, PublicKey, Secp256k1Authenticator, Signature};
use crate::error::{BtcError, Result};
use crate::sha256::{Hash, Hasher, Sha256};
use crate::types::utxo::UtxoView;
use crate::util::Saveable;
use serde::{Deserialize, Serialize};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use tracing::{debug, trace, warn};

/// A transfer of value from previously unspent outputs to new outputs.
///
/// `id` is fixed when the transaction is built: it is the digest of the
/// inputs and outputs as they were at that moment and is never
/// recomputed. [`Transaction::add_fee`] changes the outputs of a coinbase
/// transaction after the fact, which leaves `id` describing the pre-fee
/// content. Nothing may rely on re-hashing a transaction to get its id.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Transaction {
    id: Hash,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

// the part of a transaction its id commits to
#[derive(Serialize)]
struct TransactionContent<'a> {
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        Self::new_with(&Sha256, inputs, outputs)
    }

    pub fn new_with<H: Hasher + ?Sized>(
        hasher: &H,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Self {
        let id = Hash::hash_with(
            hasher,
            &TransactionContent {
                inputs: &inputs,
                outputs: &outputs,
            },
        );
        Self {
            id,
            inputs,
            outputs,
        }
    }

    // reward-only transaction, spends nothing
    pub fn coinbase(outputs: Vec<TransactionOutput>) -> Self {
        Self::new(vec![], outputs)
    }

    pub fn id(&self) -> Hash {
        self.id
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Sum of all output values. Saturates at `u64::MAX`; validation uses
    /// a checked sum instead.
    pub fn total_output(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0u64, |total, output| total.saturating_add(output.value))
    }

    fn checked_total_output(&self) -> Result<u64> {
        self.outputs.iter().try_fold(0u64, |total, output| {
            total
                .checked_add(output.value)
                .ok_or(BtcError::AmountOverflow)
        })
    }

    /// Credit the block producer's fees to the first output.
    ///
    /// Only meant for coinbase assembly. The id is left as it was, so the
    /// transaction no longer hashes to its own id afterwards.
    pub fn add_fee(&mut self, amount: u64) -> Result<()> {
        let Some(output) = self.outputs.get_mut(crate::COINBASE_FEE_OUTPUT) else {
            warn!(tx = %self.id, amount, "cannot add fee to a transaction without outputs");
            return Err(BtcError::NoOutputs);
        };
        output.value = output
            .value
            .checked_add(amount)
            .ok_or(BtcError::AmountOverflow)?;
        Ok(())
    }

    /// Authorize spending one of this transaction's own outputs, returning
    /// its value.
    pub fn spend_output(&self, input: &TransactionInput) -> Result<u64> {
        self.spend_output_with(&Secp256k1Authenticator, input)
    }

    pub fn spend_output_with<A: Authenticator + ?Sized>(
        &self,
        auth: &A,
        input: &TransactionInput,
    ) -> Result<u64> {
        if input.prev_transaction_hash != self.id {
            return Err(BtcError::ReferenceMismatch {
                expected: self.id,
                input: input.prev_transaction_hash,
            });
        }
        let output = self
            .outputs
            .get(input.output_index)
            .ok_or(BtcError::IndexOutOfRange {
                txid: self.id,
                index: input.output_index,
                len: self.outputs.len(),
            })?;
        authorize(auth, input, output)?;
        Ok(output.value)
    }

    pub fn is_valid<U: UtxoView + ?Sized>(&self, utxos: &U) -> bool {
        self.is_valid_with(utxos, &Secp256k1Authenticator)
    }

    /// Whether this non-coinbase transaction spends only outputs it is
    /// authorized to spend and covers its outputs. Every failure, lookup
    /// errors included, is a plain `false`.
    pub fn is_valid_with<U, A>(&self, utxos: &U, auth: &A) -> bool
    where
        U: UtxoView + ?Sized,
        A: Authenticator + ?Sized,
    {
        match self.validate_with(utxos, auth) {
            Ok(fee) => {
                trace!(tx = %self.id, fee, "transaction is valid");
                true
            }
            Err(e) => {
                debug!(tx = %self.id, error = %e, "rejecting transaction");
                false
            }
        }
    }

    /// Validate against `utxos` and return the fee.
    pub fn validate<U: UtxoView + ?Sized>(&self, utxos: &U) -> Result<u64> {
        self.validate_with(utxos, &Secp256k1Authenticator)
    }

    pub fn validate_with<U, A>(&self, utxos: &U, auth: &A) -> Result<u64>
    where
        U: UtxoView + ?Sized,
        A: Authenticator + ?Sized,
    {
        // coinbase transactions never come through here
        if self.inputs.is_empty() {
            return Err(BtcError::NoInputs);
        }

        let mut spent: HashSet<(Hash, usize)> = HashSet::with_capacity(self.inputs.len());
        let mut total_input = 0u64;
        for input in &self.inputs {
            let txid = input.prev_transaction_hash;
            let index = input.output_index;
            if spent.contains(&(txid, index)) {
                return Err(BtcError::DuplicateInput { txid, index });
            }
            let outputs = utxos
                .outputs(&txid)
                .ok_or(BtcError::UnknownTransaction(txid))?;
            let output = outputs.get(index).ok_or(BtcError::IndexOutOfRange {
                txid,
                index,
                len: outputs.len(),
            })?;
            authorize(auth, input, output)?;

            total_input = total_input
                .checked_add(output.value)
                .ok_or(BtcError::AmountOverflow)?;
            spent.insert((txid, index));
            trace!(%txid, index, value = output.value, "input authorized");
        }

        let total_output = self.checked_total_output()?;
        if total_input < total_output {
            return Err(BtcError::InsufficientFunds {
                inputs: total_input,
                outputs: total_output,
            });
        }
        Ok(total_input - total_output)
    }

    /// Fee paid by this transaction. Fails exactly when validation does.
    pub fn fee<U: UtxoView + ?Sized>(&self, utxos: &U) -> Result<u64> {
        self.validate(utxos)
    }
}

// the input's key must own the output and must have signed it
fn authorize<A: Authenticator + ?Sized>(
    auth: &A,
    input: &TransactionInput,
    output: &TransactionOutput,
) -> Result<()> {
    if auth.calc_address(&input.public_key) != output.address {
        return Err(BtcError::AddressMismatch);
    }
    if !auth.verify_signature(&input.public_key, output, &input.signature) {
        return Err(BtcError::InvalidSignature);
    }
    Ok(())
}

impl Saveable for Transaction {
    fn load<I: std::io::Read>(reader: I) -> std::io::Result<Self> {
        ciborium::de::from_reader(reader).map_err(|_| {
            IoError::new(IoErrorKind::InvalidData, "Failed to deserialize Transaction")
        })
    }

    fn save<O: std::io::Write>(&self, writer: O) -> std::io::Result<()> {
        ciborium::ser::into_writer(self, writer)
            .map_err(|_| IoError::new(IoErrorKind::InvalidData, "Failed to serialize Transaction"))
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TransactionInput {
    pub prev_transaction_hash: Hash,
    pub output_index: usize,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl TransactionInput {
    pub fn new(
        prev_transaction_hash: Hash,
        output_index: usize,
        public_key: PublicKey,
        signature: Signature,
    ) -> Self {
        Self {
            prev_transaction_hash,
            output_index,
            public_key,
            signature,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TransactionOutput {
    pub value: u64,
    pub address: Address,
}

impl TransactionOutput {
    pub fn new(value: u64, address: Address) -> Self {
        Self { value, address }
    }

    // digest that spending signatures cover
    pub fn hash(&self) -> Hash {
        Hash::hash(self)
    }
}
