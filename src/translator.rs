use std::str::FromStr;

use crate::{backend::BackendFamily, error::XrError};

/// Abstract XRouter operations with a native RPC translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrMethod {
    DecodeRawTransaction,
    GetBlockCount,
    GetBlockHash,
    GetBlock,
    GetBlocks,
    GetTransaction,
    GetTransactions,
    SendTransaction,
}

impl FromStr for XrMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s.to_lowercase().as_str() {
            "xrdecoderawtransaction" => XrMethod::DecodeRawTransaction,
            "xrgetblockcount" => XrMethod::GetBlockCount,
            "xrgetblockhash" => XrMethod::GetBlockHash,
            "xrgetblock" => XrMethod::GetBlock,
            "xrgetblocks" => XrMethod::GetBlocks,
            "xrgettransaction" => XrMethod::GetTransaction,
            "xrgettransactions" => XrMethod::GetTransactions,
            "xrsendtransaction" => XrMethod::SendTransaction,
            _ => return Err(()),
        };
        Ok(method)
    }
}

/// Native RPC method for `method` on `family`, `None` when the family has no equivalent.
pub fn native_method(family: BackendFamily, method: XrMethod) -> Option<&'static str> {
    use BackendFamily::*;
    use XrMethod::*;

    let name = match (family, method) {
        (Evm | Neo | Monero, DecodeRawTransaction) => return None,
        (Utxo, DecodeRawTransaction) => "decoderawtransaction",

        (Evm, GetBlockCount) => "eth_blockNumber",
        (Evm, GetBlockHash) => "eth_getBlockByNumber",
        (Evm, GetBlock | GetBlocks) => "eth_getBlockByHash",
        (Evm, GetTransaction | GetTransactions) => "eth_getTransactionByHash",
        (Evm, SendTransaction) => "eth_sendRawTransaction",

        (Monero, GetBlockCount) => "get_block_count",
        (Monero, GetBlockHash) => "on_get_block_hash",
        (Monero, GetBlock | GetBlocks) => "get_block",
        (Monero, GetTransaction | GetTransactions) => "get_transactions",
        (Monero, SendTransaction) => "send_raw_transaction",

        (Neo | Utxo, GetBlockCount) => "getblockcount",
        (Neo | Utxo, GetBlockHash) => "getblockhash",
        (Neo | Utxo, GetBlock | GetBlocks) => "getblock",
        (Neo | Utxo, GetTransaction | GetTransactions) => "getrawtransaction",
        (Neo | Utxo, SendTransaction) => "sendrawtransaction",
    };

    Some(name)
}

/// A method-style call resolved against the translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub family: BackendFamily,
    pub method: XrMethod,
    pub native: &'static str,
}

pub fn resolve(token: &str, xr_method: &str) -> Result<Resolved, XrError> {
    let unsupported = || XrError::Unsupported {
        method: xr_method.to_owned(),
        token: token.to_owned(),
    };

    let family = BackendFamily::from_token(token);
    let method: XrMethod = xr_method.parse().map_err(|_| unsupported())?;
    let native = native_method(family, method).ok_or_else(unsupported)?;

    Ok(Resolved {
        family,
        method,
        native,
    })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("ETH", "xrGetBlockCount", "eth_blockNumber")]
    #[test_case("ETH", "xrGetBlockHash", "eth_getBlockByNumber")]
    #[test_case("ETH", "xrGetBlock", "eth_getBlockByHash")]
    #[test_case("ETH", "xrGetBlocks", "eth_getBlockByHash")]
    #[test_case("ETH", "xrGetTransaction", "eth_getTransactionByHash")]
    #[test_case("ETH", "xrGetTransactions", "eth_getTransactionByHash")]
    #[test_case("etc", "xrSendTransaction", "eth_sendRawTransaction")]
    #[test_case("NEO", "xrGetBlockCount", "getblockcount")]
    #[test_case("NEO", "xrGetBlockHash", "getblockhash")]
    #[test_case("NEO", "xrGetBlock", "getblock")]
    #[test_case("NEO", "xrGetBlocks", "getblock")]
    #[test_case("NEO", "xrGetTransaction", "getrawtransaction")]
    #[test_case("NEO", "xrGetTransactions", "getrawtransaction")]
    #[test_case("NEO", "xrSendTransaction", "sendrawtransaction")]
    #[test_case("XMR", "xrGetBlockCount", "get_block_count")]
    #[test_case("XMR", "xrGetBlockHash", "on_get_block_hash")]
    #[test_case("XMR", "xrGetBlock", "get_block")]
    #[test_case("XMR", "xrGetBlocks", "get_block")]
    #[test_case("XMR", "xrGetTransaction", "get_transactions")]
    #[test_case("XMR", "xrGetTransactions", "get_transactions")]
    #[test_case("xmr", "xrSendTransaction", "send_raw_transaction")]
    #[test_case("BLOCK", "xrDecodeRawTransaction", "decoderawtransaction")]
    #[test_case("BLOCK", "xrGetBlockCount", "getblockcount")]
    #[test_case("BLOCK", "xrGetBlockHash", "getblockhash")]
    #[test_case("BLOCK", "xrGetBlock", "getblock")]
    #[test_case("LTC", "xrGetBlocks", "getblock")]
    #[test_case("LTC", "xrGetTransaction", "getrawtransaction")]
    #[test_case("LTC", "xrGetTransactions", "getrawtransaction")]
    #[test_case("BTC", "xrsendtransaction", "sendrawtransaction")]
    fn test_resolve_native_method(token: &str, xr_method: &str, native: &str) {
        assert_eq!(resolve(token, xr_method).unwrap().native, native);
    }

    #[test_case("ETH")]
    #[test_case("ETC")]
    #[test_case("NEO")]
    #[test_case("XMR")]
    fn test_decode_raw_transaction_unsupported(token: &str) {
        let err = resolve(token, "xrDecodeRawTransaction").unwrap_err();
        assert_eq!(err.code(), 1031);
        assert_eq!(
            err.to_string(),
            format!("Unsupported call xrDecodeRawTransaction for token {token}")
        );
    }

    #[test]
    fn test_unknown_method_unsupported() {
        let err = resolve("BLOCK", "xrGetBalance").unwrap_err();
        assert_eq!(err.code(), 1031);
    }

    #[test]
    fn test_family_resolution() {
        assert_eq!(resolve("Eth", "xrGetBlock").unwrap().family, BackendFamily::Evm);
        assert_eq!(resolve("neo", "xrGetBlock").unwrap().family, BackendFamily::Neo);
        assert_eq!(resolve("XMR", "xrGetBlock").unwrap().family, BackendFamily::Monero);
        assert_eq!(resolve("SYS", "xrGetBlock").unwrap().family, BackendFamily::Utxo);
    }
}
