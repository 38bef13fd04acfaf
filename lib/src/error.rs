use crate::sha256::Hash;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BtcError {
    #[error("Transaction has no inputs")]
    NoInputs,
    #[error("Transaction has no outputs")]
    NoOutputs,
    #[error("Input references transaction {input} but this transaction is {expected}")]
    ReferenceMismatch { expected: Hash, input: Hash },
    #[error("Unknown transaction {0}")]
    UnknownTransaction(Hash),
    #[error("Output index {index} out of range for transaction {txid} ({len} outputs)")]
    IndexOutOfRange { txid: Hash, index: usize, len: usize },
    #[error("Output {index} of {txid} is spent twice in the same transaction")]
    DuplicateInput { txid: Hash, index: usize },
    #[error("Public key does not hash to the output address")]
    AddressMismatch,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Insufficient funds: inputs {inputs}, outputs {outputs}")]
    InsufficientFunds { inputs: u64, outputs: u64 },
    #[error("Amount overflow")]
    AmountOverflow,
}

pub type Result<T> = std::result::Result<T, BtcError>;
