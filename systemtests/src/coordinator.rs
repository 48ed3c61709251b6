use {
    crate::error::Result,
    log::*,
    shardnet_sdk::{NetworkProvider, SignedTransaction, TransactionAwaiter, TransactionOnNetwork},
    std::rc::Rc,
};

/// A transaction the network accepted, under the hash the network assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted<'a> {
    pub transaction: &'a SignedTransaction,
    pub hash: String,
}

impl<'a> Submitted<'a> {
    pub fn new(transaction: &'a SignedTransaction, hash: String) -> Self {
        Self { transaction, hash }
    }
}

/// Submits signed transactions and waits for their outcome.
pub struct Coordinator<P: ?Sized> {
    provider: Rc<P>,
    explorer_url: String,
    awaiter: TransactionAwaiter,
}

impl<P: NetworkProvider + ?Sized> Coordinator<P> {
    pub fn new(provider: Rc<P>, explorer_url: &str, awaiter: TransactionAwaiter) -> Self {
        Self {
            provider,
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
            awaiter,
        }
    }

    pub fn explorer_link(&self, hash: &str) -> String {
        format!("{}/transactions/{hash}", self.explorer_url)
    }

    pub fn send(&self, transaction: &SignedTransaction) -> Result<String> {
        let hash = self.provider.send_transaction(transaction)?;
        info!("{}", self.explorer_link(&hash));
        Ok(hash)
    }

    /// Submit a batch and return the accepted transactions in submission
    /// order. Rejected ones are logged and left out.
    pub fn send_many<'a>(
        &self,
        transactions: &'a [SignedTransaction],
    ) -> Result<Vec<Submitted<'a>>> {
        let hashes = self.provider.send_transactions(transactions)?;

        let mut accepted = Vec::with_capacity(transactions.len());
        for (transaction, hash) in transactions.iter().zip(hashes) {
            match hash {
                Some(hash) => accepted.push(Submitted::new(transaction, hash)),
                None => warn!(
                    "rejected: transaction of {} with nonce {}",
                    transaction.sender(),
                    transaction.nonce()
                ),
            }
        }
        info!("sent {} of {} transactions", accepted.len(), transactions.len());
        Ok(accepted)
    }

    /// Wait for each submitted transaction in turn; outcomes come back in
    /// input order.
    pub fn await_completed(&self, submitted: &[Submitted]) -> Result<Vec<TransactionOnNetwork>> {
        info!("Awaiting completion of {} transactions...", submitted.len());

        let mut completed = Vec::with_capacity(submitted.len());
        for Submitted { transaction, hash } in submitted {
            let outcome = self.awaiter.await_completed(self.provider.as_ref(), hash)?;
            debug!(
                "{} nonce {}: {}",
                transaction.sender(),
                transaction.nonce(),
                outcome.status
            );
            info!("Completed: {}", self.explorer_link(hash));
            completed.push(outcome);
        }
        Ok(completed)
    }
}
