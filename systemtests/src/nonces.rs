use {
    crate::error::{Error, Result},
    log::*,
    shardnet_sdk::{Address, NetworkProvider},
    std::{
        collections::{hash_map::Entry, HashMap},
        rc::Rc,
    },
};

/// Hands out per-address nonces.
///
/// The first reservation for an address fetches its nonce from the network;
/// every later one is served locally and advances the cached value by one.
/// The cache is never reconciled with the network, so this process must be
/// the only one submitting transactions for the addresses it tracks.
pub struct NonceTracker<P: ?Sized> {
    provider: Rc<P>,
    nonces_by_address: HashMap<Address, u64>,
}

impl<P: NetworkProvider + ?Sized> NonceTracker<P> {
    pub fn new(provider: Rc<P>) -> Self {
        Self {
            provider,
            nonces_by_address: HashMap::new(),
        }
    }

    /// Reserve the next nonce of `address`. Fails without reserving anything
    /// once the value after the nonce is not representable.
    pub fn get_then_increment(&mut self, address: &Address) -> Result<u64> {
        let next = match self.nonces_by_address.entry(*address) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let account = self.provider.get_account(address)?;
                debug!("fetched nonce {} for {address}", account.nonce);
                entry.insert(account.nonce)
            }
        };
        let nonce = *next;
        *next = nonce
            .checked_add(1)
            .ok_or(Error::NonceOverflow(*address))?;
        debug!("reserved nonce {nonce} for {address}");
        Ok(nonce)
    }

    /// Next nonce that would be handed out for `address`, if already known.
    pub fn cached(&self, address: &Address) -> Option<u64> {
        self.nonces_by_address.get(address).copied()
    }
}
