use {
    crate::{
        accounts::AccountRegistry,
        assembler::TransactionAssembler,
        config::{Configuration, CustomCurrencies},
        coordinator::Coordinator,
        error::Result,
        nonces::NonceTracker,
    },
    log::*,
    shardnet_sdk::{NetworkProvider, ProxyNetworkProvider, TransactionAwaiter},
    std::rc::Rc,
};

/// Everything a command needs to talk to one network.
pub struct Session<P: ?Sized> {
    pub assembler: TransactionAssembler<P>,
    pub coordinator: Coordinator<P>,
}

impl Session<ProxyNetworkProvider> {
    /// Connect to the proxy of `config`.
    ///
    /// The custom currency is only needed by token scenarios. When it is not
    /// `required`, an unreadable currencies file is reported and ignored, so a
    /// network can be set up before its token exists.
    pub fn connect(config: &Configuration, custom_currency_required: bool) -> Result<Self> {
        let provider = Rc::new(ProxyNetworkProvider::new(&config.proxy_url)?);
        info!("network {} via {}", config.network_id, provider.url());
        Self::with_provider(config, provider, custom_currency_required)
    }
}

impl<P: NetworkProvider + ?Sized> Session<P> {
    pub fn with_provider(
        config: &Configuration,
        provider: Rc<P>,
        custom_currency_required: bool,
    ) -> Result<Self> {
        let registry = Rc::new(AccountRegistry::build(config)?);
        let mut assembler = TransactionAssembler::new(
            registry,
            NonceTracker::new(provider.clone()),
            config.factory_config(),
            config.contracts_dir.clone(),
        );

        match CustomCurrencies::load(&config.config_file_custom_currencies) {
            Ok(currencies) => {
                info!("custom currency: {}", currencies.currency);
                assembler = assembler.with_custom_currency(currencies.currency);
            }
            Err(err) if !custom_currency_required => warn!("no custom currency: {err}"),
            Err(err) => return Err(err.into()),
        }

        let coordinator =
            Coordinator::new(provider, &config.explorer_url, TransactionAwaiter::default());
        Ok(Self {
            assembler,
            coordinator,
        })
    }
}
