use std::{collections::HashMap, fmt, time::Duration};

use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize};

use crate::signer::{Chain, ServiceNodeKey};

const RPC_SUFFIXES: &[&str] = &["_HOSTIP", "_PORT", "_USER", "_PASS", "_VER", "_METHOD"];
const URL_SUFFIXES: &[&str] = &["_HOSTIP", "_PORT"];

/// Connection record for an RPC-backed token, read from `RPC_<TOKEN>_*`.
#[derive(Clone, Default, Deserialize)]
pub struct RpcConfig {
    #[serde(default)]
    pub hostip: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default = "default_rpc_version")]
    pub ver: String,
    pub method: Option<String>,
}

impl RpcConfig {
    /// Host, port and both credentials must be present before any native call is made.
    pub fn is_complete(&self) -> bool {
        !self.hostip.is_empty()
            && !self.port.is_empty()
            && !self.user.is_empty()
            && !self.pass.is_empty()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.hostip, self.port)
    }
}

impl fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConfig")
            .field("hostip", &self.hostip)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("ver", &self.ver)
            .field("method", &self.method)
            .finish()
    }
}

/// Raw HTTP forwarding target for a service, read from `URL_<TOKEN>_*`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlConfig {
    #[serde(default)]
    pub hostip: String,
    #[serde(default)]
    pub port: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub enabled: bool,
    pub enforce_default: bool,
    /// `HANDLE_PAYMENTS_<TOKEN>` overrides.
    pub enforce_tokens: HashMap<String, bool>,
    pub rpc: RpcConfig,
}

impl PaymentConfig {
    pub fn is_enforced(&self, token: &str) -> bool {
        self.enforce_tokens
            .get(token)
            .copied()
            .unwrap_or(self.enforce_default)
    }
}

#[derive(Deserialize)]
struct ServerVars {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_chain")]
    blocknet_chain: String,
    servicenode_privkey: Option<String>,
    #[serde(default = "default_rpc_timeout")]
    rpc_timeout_secs: u64,
    #[serde(default = "default_payment_timeout")]
    payment_timeout_secs: u64,
    handle_payments: Option<String>,
    handle_payments_enforce: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub chain: Chain,
    pub snode_key: Option<ServiceNodeKey>,
    pub rpc_timeout: Duration,
    pub payment_timeout: Duration,
    pub rpc: HashMap<String, RpcConfig>,
    pub url: HashMap<String, UrlConfig>,
    pub payments: PaymentConfig,
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let server: ServerVars = envy::from_iter(vars.clone())?;

        let chain = server.blocknet_chain.trim().parse().unwrap_or_else(|_| {
            tracing::error!(
                "Failed to parse BLOCKNET_CHAIN parameter [{}], defaulting to [mainnet]",
                server.blocknet_chain
            );
            Chain::Mainnet
        });

        let snode_key = match server.servicenode_privkey.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(ServiceNodeKey::from_wif(raw, chain)?),
            _ => {
                tracing::warn!("SERVICENODE_PRIVKEY is not set, responses will not be signed");
                None
            }
        };

        let mut rpc = HashMap::new();
        for token in tokens(&vars, "RPC_", RPC_SUFFIXES) {
            let record = prefixed_config(&format!("RPC_{token}"), &vars)?;
            rpc.insert(token, record);
        }

        let mut url = HashMap::new();
        for token in tokens(&vars, "URL_", URL_SUFFIXES) {
            let record = prefixed_config(&format!("URL_{token}"), &vars)?;
            url.insert(token, record);
        }

        let enforce_tokens = vars
            .iter()
            .filter_map(|(key, value)| {
                let token = key.strip_prefix("HANDLE_PAYMENTS_")?;
                if token == "ENFORCE" || token.starts_with("RPC_") || token.is_empty() {
                    return None;
                }
                Some((token.to_owned(), is_flag_set(value)))
            })
            .collect();

        let payments = PaymentConfig {
            enabled: server
                .handle_payments
                .as_deref()
                .map(is_flag_set)
                .unwrap_or(true),
            enforce_default: server
                .handle_payments_enforce
                .as_deref()
                .map(is_flag_set)
                .unwrap_or(false),
            enforce_tokens,
            rpc: prefixed_config("HANDLE_PAYMENTS_RPC", &vars)?,
        };

        Ok(Config {
            port: server.port,
            chain,
            snode_key,
            rpc_timeout: Duration::from_secs(server.rpc_timeout_secs),
            payment_timeout: Duration::from_secs(server.payment_timeout_secs),
            rpc,
            url,
            payments,
        })
    }
}

/// Collects the token names that appear as `<prefix><TOKEN><suffix>` keys.
fn tokens(vars: &[(String, String)], prefix: &str, suffixes: &[&str]) -> Vec<String> {
    let mut found: Vec<String> = vars
        .iter()
        .filter_map(|(key, _)| {
            let rest = key.strip_prefix(prefix)?;
            suffixes
                .iter()
                .find_map(|suffix| rest.strip_suffix(suffix))
                .filter(|token| !token.is_empty())
                .map(str::to_owned)
        })
        .collect();
    found.sort();
    found.dedup();
    found
}

fn prefixed_config<T: DeserializeOwned>(prefix: &str, vars: &[(String, String)]) -> Result<T> {
    Ok(envy::prefixed(format!("{prefix}_")).from_iter(vars.iter().cloned())?)
}

fn is_flag_set(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1"
}

fn default_port() -> u16 {
    8080
}

fn default_chain() -> String {
    "mainnet".to_owned()
}

fn default_rpc_version() -> String {
    "1.0".to_owned()
}

fn default_rpc_timeout() -> u64 {
    15
}

fn default_payment_timeout() -> u64 {
    300
}
