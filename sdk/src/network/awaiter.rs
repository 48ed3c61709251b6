use {
    super::{NetworkProvider, NetworkResult, TransactionOnNetwork},
    crate::error::NetworkError,
    log::*,
    std::{
        thread,
        time::{Duration, Instant},
    },
};

pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(6);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Polls a transaction until it reaches a terminal status.
#[derive(Debug, Clone, Copy)]
pub struct TransactionAwaiter {
    polling_interval: Duration,
    timeout: Duration,
}

impl Default for TransactionAwaiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLLING_INTERVAL, DEFAULT_TIMEOUT)
    }
}

impl TransactionAwaiter {
    pub fn new(polling_interval: Duration, timeout: Duration) -> Self {
        Self {
            polling_interval,
            timeout,
        }
    }

    /// Block until `hash` is completed, asking the provider for the process status.
    pub fn await_completed<P: NetworkProvider + ?Sized>(
        &self,
        provider: &P,
        hash: &str,
    ) -> NetworkResult<TransactionOnNetwork> {
        let started = Instant::now();
        loop {
            let transaction = provider.get_transaction(hash, true)?;
            if transaction.status.is_completed() {
                return Ok(transaction);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                return Err(NetworkError::Timeout {
                    hash: hash.to_string(),
                    elapsed_secs: elapsed.as_secs(),
                });
            }
            trace!("{hash} is {}, polling again", transaction.status);
            thread::sleep(self.polling_interval);
        }
    }
}
