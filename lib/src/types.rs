mod transaction;
mod utxo;

pub use transaction::{Transaction, TransactionInput, TransactionOutput};
pub use utxo::{UtxoIndex, UtxoView};
