use crate::crypto::{PrivateKey, PublicKey};
use crate::error::ValidationError;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name {
            pub shard: u64,
            pub realm: u64,
            pub num: u64,
        }

        impl $name {
            pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
                Self { shard, realm, num }
            }

            /// Shorthand for an entity in shard 0, realm 0.
            pub const fn from_num(num: u64) -> Self {
                Self::new(0, 0, num)
            }

            /// Long-zero EVM address: 4 bytes shard, 8 bytes realm, 8 bytes num.
            pub fn to_solidity_address(&self) -> Result<Address, ValidationError> {
                let shard = u32::try_from(self.shard).map_err(|_| {
                    ValidationError::invalid(
                        "shard",
                        format!("shard {} does not fit in an EVM address", self.shard),
                    )
                })?;
                let mut bytes = [0u8; 20];
                bytes[..4].copy_from_slice(&shard.to_be_bytes());
                bytes[4..12].copy_from_slice(&self.realm.to_be_bytes());
                bytes[12..].copy_from_slice(&self.num.to_be_bytes());
                Ok(Address::from(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_entity_id(s, $label).map(|(shard, realm, num)| Self::new(shard, realm, num))
            }
        }
    };
}

fn parse_entity_id(s: &str, field: &'static str) -> Result<(u64, u64, u64), ValidationError> {
    let parts: Vec<&str> = s.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(ValidationError::invalid(
            field,
            format!("expected <shard>.<realm>.<num>, got '{s}'"),
        ));
    }
    let mut out = [0u64; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u64>()
            .map_err(|e| ValidationError::invalid(field, format!("'{s}': {e}")))?;
    }
    Ok((out[0], out[1], out[2]))
}

entity_id!(
    /// Identifier of an account on the network
    AccountId,
    "account id"
);
entity_id!(
    /// Identifier of a file stored on the network
    FileId,
    "file id"
);
entity_id!(
    /// Identifier of a deployed smart contract
    ContractId,
    "contract id"
);
entity_id!(
    /// Identifier of a token type
    TokenId,
    "token id"
);

/// Network-assigned identifier of a transaction: payer account plus valid-start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId {
    pub account_id: AccountId,
    pub valid_start_seconds: i64,
    pub valid_start_nanos: u32,
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}.{:09}",
            self.account_id, self.valid_start_seconds, self.valid_start_nanos
        )
    }
}

impl FromStr for TransactionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (account, start) = s
            .split_once('@')
            .ok_or_else(|| ValidationError::invalid("transaction id", "missing '@'"))?;
        let (seconds, nanos) = start
            .split_once('.')
            .ok_or_else(|| ValidationError::invalid("transaction id", "missing nanos"))?;
        Ok(Self {
            account_id: account.parse()?,
            valid_start_seconds: seconds
                .parse()
                .map_err(|e| ValidationError::invalid("transaction id", format!("{e}")))?,
            valid_start_nanos: nanos
                .parse()
                .map_err(|e| ValidationError::invalid("transaction id", format!("{e}")))?,
        })
    }
}

/// Amount of the native currency, stored in tinybars (1 hbar = 100_000_000 tinybars).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Hbar(i64);

impl Hbar {
    pub const ZERO: Hbar = Hbar(0);
    pub const TINYBARS_PER_HBAR: i64 = 100_000_000;

    pub const fn from_tinybars(tinybars: i64) -> Self {
        Self(tinybars)
    }

    pub const fn from_hbars(hbars: i64) -> Self {
        Self(hbars * Self::TINYBARS_PER_HBAR)
    }

    pub const fn to_tinybars(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Hbar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::TINYBARS_PER_HBAR;
        let frac = (self.0 % Self::TINYBARS_PER_HBAR).abs();
        if frac == 0 {
            write!(f, "{whole} ℏ")
        } else {
            write!(f, "{whole}.{frac:08} ℏ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    FungibleCommon,
    NonFungibleUnique,
}

/// Terminal outcome of a transaction or query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,

    // Business rejections
    InvalidSignature,
    InsufficientPayerBalance,
    InsufficientAccountBalance,
    InsufficientTxFee,
    InsufficientGas,
    InvalidAccountId,
    AccountDeleted,
    InvalidFileId,
    FileDeleted,
    InvalidContractId,
    ContractDeleted,
    ContractRevertExecuted,
    InvalidTokenId,
    TokenNotAssociatedToAccount,
    TokenAlreadyAssociatedToAccount,
    InvalidNftId,
    InvalidTokenNftSerialNumber,
    SenderDoesNotOwnNftSerialNo,
    TokenHasNoSupplyKey,
    InvalidTreasuryAccountForToken,
    DuplicateTransaction,
    TransactionExpired,
    MaxFileSizeExceeded,

    // Network failures
    Busy,
    PlatformNotActive,
    PlatformTransactionNotCreated,
    ReceiptNotFound,
    Unknown,
    /// Assigned by this client when a submitted transaction never produced a receipt.
    TransportFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Success,
    Rejected,
    NetworkFailure,
}

impl Status {
    pub fn category(self) -> StatusCategory {
        use Status::*;
        match self {
            Success => StatusCategory::Success,
            Busy
            | PlatformNotActive
            | PlatformTransactionNotCreated
            | ReceiptNotFound
            | Unknown
            | TransportFailure => StatusCategory::NetworkFailure,
            _ => StatusCategory::Rejected,
        }
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(name)) => f.write_str(&name),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// Identity used to pay for and sign transactions.
///
/// Owned by the caller; the protocol client only borrows the private key for
/// signing.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl Account {
    pub fn new(account_id: AccountId, private_key: PrivateKey) -> Self {
        Self {
            account_id,
            public_key: private_key.public_key(),
            private_key,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_round_trip() {
        let id: AccountId = "0.0.12345".parse().unwrap();
        assert_eq!(id, AccountId::from_num(12345));
        assert_eq!(id.to_string(), "0.0.12345");
    }

    #[test]
    fn test_entity_id_rejects_garbage() {
        assert!("0.0".parse::<TokenId>().is_err());
        assert!("a.b.c".parse::<FileId>().is_err());
        assert!("".parse::<ContractId>().is_err());
    }

    #[test]
    fn test_contract_id_solidity_address() {
        let id = ContractId::new(0, 0, 1001);
        assert_eq!(
            id.to_solidity_address().unwrap().to_string().to_lowercase(),
            "0x00000000000000000000000000000000000003e9"
        );
        assert_eq!(
            ContractId::new(u32::MAX as u64, 1, 2)
                .to_solidity_address()
                .unwrap()
                .to_string()
                .to_lowercase(),
            "0xffffffff00000000000000010000000000000002"
        );
    }

    #[test]
    fn test_solidity_address_rejects_oversize_shard() {
        let id = ContractId::new(1 << 32, 0, 1001);
        assert!(matches!(
            id.to_solidity_address(),
            Err(ValidationError::Invalid { field: "shard", .. })
        ));
    }

    #[test]
    fn test_transaction_id_display_and_parse() {
        let tx_id = TransactionId {
            account_id: AccountId::from_num(2),
            valid_start_seconds: 1_700_000_000,
            valid_start_nanos: 42,
        };
        let s = tx_id.to_string();
        assert_eq!(s, "0.0.2@1700000000.000000042");
        assert_eq!(s.parse::<TransactionId>().unwrap(), tx_id);
    }

    #[test]
    fn test_hbar_display() {
        assert_eq!(Hbar::from_hbars(5).to_string(), "5 ℏ");
        assert_eq!(Hbar::from_tinybars(150_000_000).to_string(), "1.50000000 ℏ");
    }

    #[test]
    fn test_status_categories() {
        assert_eq!(Status::Success.category(), StatusCategory::Success);
        assert_eq!(
            Status::InsufficientPayerBalance.category(),
            StatusCategory::Rejected
        );
        assert_eq!(
            Status::TransportFailure.category(),
            StatusCategory::NetworkFailure
        );
        assert_eq!(Status::InvalidSignature.to_string(), "INVALID_SIGNATURE");
    }
}
