//! Extension seam for contract-aware transactions
//!
//! A deposit to a hash lock, an HTLC redemption and a slave-address sweep
//! all run the same engine; what varies is expressed through these four
//! capabilities. Pre- and post-conditions are async because they usually
//! consult the indexer; the two script hooks run inline while signing.

use async_trait::async_trait;

use zec_tx_builder::{ScriptBuilder, TxIn, ZecTx};

/// Checked before funding; may add outputs to the transaction skeleton.
/// Returning `false` aborts the operation.
#[async_trait]
pub trait PreCondition: Send + Sync {
    async fn check(&self, tx: &mut ZecTx) -> bool;
}

/// Polled after publishing until it reports `true`
#[async_trait]
pub trait PostCondition: Send + Sync {
    async fn check(&self, tx: &ZecTx) -> bool;
}

/// Applied to every input before the signature hashes are computed
pub trait TxInUpdate: Send + Sync {
    fn update(&self, txin: &mut TxIn);
}

/// Appends extra push data to a signature script, between the public key
/// push and the contract push (e.g. the preimage of a hash lock)
pub trait SigData: Send + Sync {
    fn extend(&self, builder: &mut ScriptBuilder);
}

impl<F> TxInUpdate for F
where
    F: Fn(&mut TxIn) + Send + Sync,
{
    fn update(&self, txin: &mut TxIn) {
        self(txin)
    }
}

impl<F> SigData for F
where
    F: Fn(&mut ScriptBuilder) + Send + Sync,
{
    fn extend(&self, builder: &mut ScriptBuilder) {
        self(builder)
    }
}
