use std::collections::HashMap;

use crate::sha256::Hash;
use crate::types::transaction::{Transaction, TransactionOutput};
use serde::{Deserialize, Serialize};

/// Read-only lookup of unspent outputs, keyed by the id of the
/// transaction that created them.
///
/// Validation only ever reads through this trait. Keeping the view
/// consistent while a batch is validated is the caller's job.
pub trait UtxoView {
    fn outputs(&self, txid: &Hash) -> Option<&[TransactionOutput]>;
}

impl UtxoView for HashMap<Hash, Vec<TransactionOutput>> {
    fn outputs(&self, txid: &Hash) -> Option<&[TransactionOutput]> {
        self.get(txid).map(Vec::as_slice)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UtxoIndex {
    utxos: HashMap<Hash, Vec<TransactionOutput>>,
}

impl UtxoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, txid: Hash, outputs: Vec<TransactionOutput>) {
        self.utxos.insert(txid, outputs);
    }

    // register every output of a transaction under its id
    pub fn insert_transaction(&mut self, transaction: &Transaction) {
        self.insert(transaction.id(), transaction.outputs().to_vec());
    }

    pub fn get(&self, txid: &Hash) -> Option<&[TransactionOutput]> {
        self.utxos.get(txid).map(Vec::as_slice)
    }

    pub fn contains(&self, txid: &Hash) -> bool {
        self.utxos.contains_key(txid)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

impl UtxoView for UtxoIndex {
    fn outputs(&self, txid: &Hash) -> Option<&[TransactionOutput]> {
        self.get(txid)
    }
}

impl FromIterator<(Hash, Vec<TransactionOutput>)> for UtxoIndex {
    fn from_iter<I: IntoIterator<Item = (Hash, Vec<TransactionOutput>)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}
