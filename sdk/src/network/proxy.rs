//! Blocking client for the proxy's REST API.

use {
    super::{
        AccountOnNetwork, NetworkProvider, NetworkResult, TransactionEvent, TransactionOnNetwork,
        TransactionStatus,
    },
    crate::{
        address::Address,
        error::NetworkError,
        transaction::{SignedTransaction, TransactionWire},
    },
    base64::{engine::general_purpose::STANDARD as BASE64, Engine as _},
    log::*,
    reqwest::blocking::Client,
    serde::{de::DeserializeOwned, Deserialize},
    std::{collections::BTreeMap, time::Duration},
};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Envelope wrapping every proxy reply.
#[derive(Debug, Deserialize)]
struct ProxyResponse<T> {
    data: Option<T>,
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    account: AccountPayload,
}

#[derive(Debug, Deserialize)]
struct AccountPayload {
    address: String,
    nonce: u64,
    balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendData {
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMultipleData {
    #[serde(default)]
    num_of_sent_txs: usize,
    #[serde(default)]
    txs_hashes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    transaction: TransactionPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionPayload {
    #[serde(default)]
    hash: Option<String>,
    status: String,
    #[serde(default)]
    logs: Option<LogsPayload>,
    #[serde(default)]
    smart_contract_results: Vec<ContractResultPayload>,
}

#[derive(Debug, Deserialize)]
struct ContractResultPayload {
    #[serde(default)]
    logs: Option<LogsPayload>,
}

#[derive(Debug, Deserialize)]
struct LogsPayload {
    #[serde(default)]
    events: Vec<EventPayload>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    address: Option<String>,
    identifier: String,
    #[serde(default)]
    topics: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ProcessStatusData {
    status: String,
}

/// [`NetworkProvider`] backed by a proxy URL.
#[derive(Debug, Clone)]
pub struct ProxyNetworkProvider {
    url: String,
    client: Client,
}

impl ProxyNetworkProvider {
    pub fn new(url: &str) -> NetworkResult<Self> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> NetworkResult<T> {
        let url = format!("{}/{path}", self.url);
        debug!("GET {url}");
        let response: ProxyResponse<T> = self.client.get(&url).send()?.json()?;
        unwrap_response(&url, response)
    }

    fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> NetworkResult<T> {
        let url = format!("{}/{path}", self.url);
        debug!("POST {url}");
        let response: ProxyResponse<T> = self.client.post(&url).json(body).send()?.json()?;
        unwrap_response(&url, response)
    }
}

impl NetworkProvider for ProxyNetworkProvider {
    fn get_account(&self, address: &Address) -> NetworkResult<AccountOnNetwork> {
        let path = format!("address/{address}");
        let data: AccountData = self.get(&path)?;
        account_from_payload(&path, data.account)
    }

    fn send_transaction(&self, transaction: &SignedTransaction) -> NetworkResult<String> {
        let data: SendData = self.post("transaction/send", &transaction.to_wire())?;
        Ok(data.tx_hash)
    }

    fn send_transactions(
        &self,
        transactions: &[SignedTransaction],
    ) -> NetworkResult<Vec<Option<String>>> {
        let body: Vec<TransactionWire> = transactions.iter().map(SignedTransaction::to_wire).collect();
        let data: SendMultipleData = self.post("transaction/send-multiple", &body)?;
        debug!(
            "proxy accepted {} of {} transactions",
            data.num_of_sent_txs,
            transactions.len()
        );
        Ok(hashes_by_index(data.txs_hashes, transactions.len()))
    }

    fn get_transaction(
        &self,
        hash: &str,
        with_process_status: bool,
    ) -> NetworkResult<TransactionOnNetwork> {
        let data: TransactionData = self.get(&format!("transaction/{hash}?withResults=true"))?;
        let mut transaction = transaction_from_payload(hash, data.transaction);

        if with_process_status {
            let status: ProcessStatusData =
                self.get(&format!("transaction/{hash}/process-status"))?;
            transaction.status = TransactionStatus::new(&status.status);
        }
        Ok(transaction)
    }
}

fn unwrap_response<T>(url: &str, response: ProxyResponse<T>) -> NetworkResult<T> {
    let succeeded = response.code.is_empty() || response.code == "successful";
    match response.data {
        Some(data) if succeeded && response.error.is_empty() => Ok(data),
        _ => Err(NetworkError::Api {
            url: url.to_string(),
            code: response.code,
            message: response.error,
        }),
    }
}

fn account_from_payload(path: &str, payload: AccountPayload) -> NetworkResult<AccountOnNetwork> {
    let unexpected = |reason: String| NetworkError::UnexpectedResponse {
        url: path.to_string(),
        reason,
    };
    let address = payload
        .address
        .parse()
        .map_err(|err| unexpected(format!("{err}")))?;
    let balance = payload
        .balance
        .parse()
        .map_err(|err| unexpected(format!("bad balance {:?}: {err}", payload.balance)))?;
    Ok(AccountOnNetwork {
        address,
        nonce: payload.nonce,
        balance,
    })
}

/// Spread hashes keyed by submission index over `count` slots. Indices the
/// proxy left out were rejected.
fn hashes_by_index(hashes: BTreeMap<String, String>, count: usize) -> Vec<Option<String>> {
    let mut slots = vec![None; count];
    for (index, hash) in hashes {
        match index.parse::<usize>() {
            Ok(index) if index < count => slots[index] = Some(hash),
            _ => warn!("ignoring hash {hash} under unexpected index {index:?}"),
        }
    }
    slots
}

fn transaction_from_payload(hash: &str, payload: TransactionPayload) -> TransactionOnNetwork {
    let events = payload
        .logs
        .into_iter()
        .chain(payload.smart_contract_results.into_iter().filter_map(|scr| scr.logs))
        .flat_map(|logs| logs.events)
        .map(|event| TransactionEvent {
            address: event.address.and_then(|address| address.parse().ok()),
            identifier: event.identifier,
            topics: event
                .topics
                .unwrap_or_default()
                .iter()
                .map(|topic| BASE64.decode(topic).unwrap_or_default())
                .collect(),
        })
        .collect();

    TransactionOnNetwork {
        hash: payload.hash.unwrap_or_else(|| hash.to_string()),
        status: TransactionStatus::new(&payload.status),
        events,
    }
}
