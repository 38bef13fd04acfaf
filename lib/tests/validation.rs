//! End-to-end transaction validation against a UTXO index, using real
//! secp256k1 keys.

use coinlib::crypto::{PrivateKey, Signature};
use coinlib::error::BtcError;
use coinlib::sha256::Hash;
use coinlib::types::{Transaction, TransactionInput, TransactionOutput, UtxoIndex};

struct Wallet {
    key: PrivateKey,
}

impl Wallet {
    fn new() -> Self {
        Self {
            key: PrivateKey::new_key(),
        }
    }

    fn receive(&self, value: u64) -> TransactionOutput {
        TransactionOutput::new(value, self.key.public_key().address())
    }

    fn spend(&self, prev: Hash, index: usize, output: &TransactionOutput) -> TransactionInput {
        TransactionInput::new(
            prev,
            index,
            self.key.public_key(),
            Signature::sign_output(&output.hash(), &self.key),
        )
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn ledger(funding: &[&Transaction]) -> UtxoIndex {
    init_tracing();
    let mut utxos = UtxoIndex::new();
    for tx in funding {
        utxos.insert_transaction(tx);
    }
    utxos
}

#[test]
fn accepts_fully_authorized_spend_and_reports_fee() {
    let alice = Wallet::new();
    let bob = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(30)]);
    let utxos = ledger(&[&t1]);

    let tx = Transaction::new(
        vec![alice.spend(t1.id(), 0, &t1.outputs()[0])],
        vec![bob.receive(20), alice.receive(5)],
    );
    assert_eq!(tx.total_output(), 25);
    assert!(tx.is_valid(&utxos));
    assert_eq!(tx.fee(&utxos), Ok(5));
}

#[test]
fn identical_content_gives_identical_ids() {
    let alice = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(30)]);
    let input = alice.spend(t1.id(), 0, &t1.outputs()[0]);

    let a = Transaction::new(vec![input.clone()], vec![alice.receive(30)]);
    let b = Transaction::new(vec![input], vec![alice.receive(30)]);
    assert_eq!(a.id(), b.id());

    let c = Transaction::new(a.inputs().to_vec(), vec![alice.receive(29)]);
    assert_ne!(a.id(), c.id());
}

#[test]
fn rejects_unknown_previous_transaction() {
    let alice = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(30)]);
    let tx = Transaction::new(
        vec![alice.spend(t1.id(), 0, &t1.outputs()[0])],
        vec![alice.receive(1)],
    );

    let utxos = UtxoIndex::new();
    assert!(!tx.is_valid(&utxos));
    assert_eq!(
        tx.validate(&utxos),
        Err(BtcError::UnknownTransaction(t1.id()))
    );
}

#[test]
fn rejects_out_of_range_output_index() {
    let alice = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(30)]);
    let utxos = ledger(&[&t1]);
    let tx = Transaction::new(
        vec![alice.spend(t1.id(), 1, &t1.outputs()[0])],
        vec![alice.receive(1)],
    );
    assert!(!tx.is_valid(&utxos));
    assert_eq!(
        tx.validate(&utxos),
        Err(BtcError::IndexOutOfRange {
            txid: t1.id(),
            index: 1,
            len: 1,
        })
    );
}

#[test]
fn rejects_key_that_does_not_own_the_output() {
    let alice = Wallet::new();
    let mallory = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(30)]);
    let utxos = ledger(&[&t1]);

    // mallory's signature over the output verifies under mallory's key,
    // but that key is not the one the output pays to
    let input = mallory.spend(t1.id(), 0, &t1.outputs()[0]);
    assert!(input
        .signature
        .verify(&t1.outputs()[0].hash(), &mallory.key.public_key()));

    let tx = Transaction::new(vec![input], vec![mallory.receive(30)]);
    assert!(!tx.is_valid(&utxos));
    assert_eq!(tx.validate(&utxos), Err(BtcError::AddressMismatch));
}

#[test]
fn rejects_signature_over_a_different_output() {
    let alice = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(30), alice.receive(1)]);
    let utxos = ledger(&[&t1]);

    // claims output 0 with the signature made for output 1
    let mut input = alice.spend(t1.id(), 1, &t1.outputs()[1]);
    input.output_index = 0;
    let tx = Transaction::new(vec![input], vec![alice.receive(30)]);
    assert_eq!(tx.validate(&utxos), Err(BtcError::InvalidSignature));
}

#[test]
fn rejects_insufficient_funds() {
    let alice = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(10)]);
    let utxos = ledger(&[&t1]);
    let tx = Transaction::new(
        vec![alice.spend(t1.id(), 0, &t1.outputs()[0])],
        vec![alice.receive(20)],
    );
    assert!(!tx.is_valid(&utxos));
    assert_eq!(
        tx.validate(&utxos),
        Err(BtcError::InsufficientFunds {
            inputs: 10,
            outputs: 20,
        })
    );
}

#[test]
fn rejects_the_same_output_spent_twice() {
    let alice = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(30)]);
    let utxos = ledger(&[&t1]);
    let input = alice.spend(t1.id(), 0, &t1.outputs()[0]);

    // 30 alone covers the 25 of outputs, counting it twice must not help
    let tx = Transaction::new(vec![input.clone(), input], vec![alice.receive(25)]);
    assert!(!tx.is_valid(&utxos));
    assert_eq!(
        tx.validate(&utxos),
        Err(BtcError::DuplicateInput {
            txid: t1.id(),
            index: 0,
        })
    );
}

#[test]
fn spends_across_several_previous_transactions() {
    let alice = Wallet::new();
    let bob = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(10), bob.receive(4)]);
    let t2 = Transaction::coinbase(vec![bob.receive(8)]);
    let utxos = ledger(&[&t1, &t2]);

    let tx = Transaction::new(
        vec![
            alice.spend(t1.id(), 0, &t1.outputs()[0]),
            bob.spend(t1.id(), 1, &t1.outputs()[1]),
            bob.spend(t2.id(), 0, &t2.outputs()[0]),
        ],
        vec![alice.receive(22)],
    );
    assert_eq!(tx.validate(&utxos), Ok(0));
}

#[test]
fn coinbase_is_never_valid_here() {
    let alice = Wallet::new();
    let mut coinbase = Transaction::coinbase(vec![alice.receive(50)]);
    let id = coinbase.id();
    coinbase.add_fee(5).unwrap();

    assert_eq!(coinbase.id(), id);
    assert_eq!(coinbase.total_output(), 55);
    assert!(!coinbase.is_valid(&UtxoIndex::new()));
}

#[test]
fn spend_output_checks_reference_first() {
    let alice = Wallet::new();
    let t1 = Transaction::coinbase(vec![alice.receive(30)]);
    let t2 = Transaction::coinbase(vec![alice.receive(31)]);

    // well signed, wrong transaction
    let input = alice.spend(t2.id(), 0, &t1.outputs()[0]);
    assert_eq!(
        t1.spend_output(&input),
        Err(BtcError::ReferenceMismatch {
            expected: t1.id(),
            input: t2.id(),
        })
    );
    let input = alice.spend(t1.id(), 0, &t1.outputs()[0]);
    assert_eq!(t1.spend_output(&input), Ok(30));
}
