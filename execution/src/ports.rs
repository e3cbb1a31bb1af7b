//! Host services the fee market consumes.
//!
//! Every port is synchronous and injected by the host. Each one reports failures with its own
//! error type that the settlement layer maps into [`Error`].

use {
    feemarket_shared::{
        error::{Error, InvalidTransactionCause, InvariantViolation},
        primitives::{Address, Coin, DecCoin},
    },
    thiserror::Error,
};

pub trait AccountPort {
    /// Resolves the address of a module account by its name.
    fn module_address(&self, name: &str) -> Option<Address>;

    fn account_exists(&self, address: &Address) -> bool;

    fn create_account(&mut self, address: Address);
}

pub trait BankPort {
    fn send(&mut self, from: &Address, to: &Address, coins: &[Coin]) -> Result<(), BankError>;

    fn send_from_account_to_module(
        &mut self,
        from: &Address,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), BankError>;

    fn is_send_enabled(&self, coins: &[Coin]) -> Result<(), BankError>;
}

pub trait FeeGrantPort {
    /// Spends `fee` from the allowance `granter` gave to `grantee` for transactions made of
    /// `msgs`.
    fn use_granted_fees(
        &mut self,
        granter: &Address,
        grantee: &Address,
        fee: &[Coin],
        msgs: &[String],
    ) -> Result<(), FeeGrantError>;
}

pub trait DenomResolver {
    /// Converts a price into the equivalent price in `denom`.
    fn convert(&self, price: &DecCoin, denom: &str) -> Result<DecCoin, ResolverError>;
}

pub trait ConsensusPort {
    /// Gas cap of a block enforced by consensus. `None` stands for no cap.
    fn max_gas_per_block(&self) -> Option<u64>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("{address} has insufficient funds for {amount}")]
    InsufficientFunds { address: Address, amount: Coin },
    #[error("Transfers of {0} are disabled")]
    SendDisabled(String),
    #[error("Unknown module account {0}")]
    UnknownModule(String),
}

impl From<BankError> for Error {
    fn from(value: BankError) -> Self {
        match value {
            BankError::InsufficientFunds { address, amount } => {
                InvalidTransactionCause::InsufficientFunds { address, amount }.into()
            }
            BankError::SendDisabled(denom) => InvalidTransactionCause::SendDisabled(denom).into(),
            BankError::UnknownModule(name) => InvariantViolation::MissingModuleAccount(name).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FeeGrantError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("No conversion into {0}")]
    UnknownDenom(String),
}

impl From<ResolverError> for Error {
    fn from(value: ResolverError) -> Self {
        match value {
            ResolverError::UnknownDenom(denom) => InvalidTransactionCause::UnknownDenom(denom).into(),
        }
    }
}

#[cfg(any(feature = "test-doubles", test))]
mod test_doubles {
    use {
        super::*,
        feemarket_shared::primitives::{Decimal, U256},
        std::collections::{HashMap, HashSet},
    };

    /// Accounts held in memory, module accounts included.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryAccounts {
        pub modules: HashMap<String, Address>,
        pub accounts: HashSet<Address>,
    }

    impl InMemoryAccounts {
        pub fn with_module(mut self, name: impl Into<String>, address: Address) -> Self {
            self.modules.insert(name.into(), address);
            self.accounts.insert(address);
            self
        }

        pub fn with_account(mut self, address: Address) -> Self {
            self.accounts.insert(address);
            self
        }
    }

    impl AccountPort for InMemoryAccounts {
        fn module_address(&self, name: &str) -> Option<Address> {
            self.modules.get(name).copied()
        }

        fn account_exists(&self, address: &Address) -> bool {
            self.accounts.contains(address)
        }

        fn create_account(&mut self, address: Address) {
            self.accounts.insert(address);
        }
    }

    /// Balances held in memory. Module transfers resolve the module address with `modules`.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryBank {
        pub balances: HashMap<(Address, String), U256>,
        pub modules: HashMap<String, Address>,
        pub disabled: HashSet<String>,
    }

    impl InMemoryBank {
        pub fn with_module(mut self, name: impl Into<String>, address: Address) -> Self {
            self.modules.insert(name.into(), address);
            self
        }

        pub fn with_balance(mut self, address: Address, coin: Coin) -> Self {
            self.balances.insert((address, coin.denom), coin.amount);
            self
        }

        pub fn balance(&self, address: &Address, denom: &str) -> U256 {
            self.balances
                .get(&(*address, denom.to_owned()))
                .copied()
                .unwrap_or_default()
        }
    }

    impl BankPort for InMemoryBank {
        fn send(&mut self, from: &Address, to: &Address, coins: &[Coin]) -> Result<(), BankError> {
            self.is_send_enabled(coins)?;

            for coin in coins {
                if self.balance(from, &coin.denom) < coin.amount {
                    return Err(BankError::InsufficientFunds {
                        address: *from,
                        amount: coin.clone(),
                    });
                }
            }
            for coin in coins {
                let from_balance = self.balance(from, &coin.denom) - coin.amount;
                self.balances
                    .insert((*from, coin.denom.clone()), from_balance);
                let to_balance = self.balance(to, &coin.denom) + coin.amount;
                self.balances.insert((*to, coin.denom.clone()), to_balance);
            }

            Ok(())
        }

        fn send_from_account_to_module(
            &mut self,
            from: &Address,
            module: &str,
            coins: &[Coin],
        ) -> Result<(), BankError> {
            let to = self
                .modules
                .get(module)
                .copied()
                .ok_or_else(|| BankError::UnknownModule(module.to_owned()))?;

            self.send(from, &to, coins)
        }

        fn is_send_enabled(&self, coins: &[Coin]) -> Result<(), BankError> {
            match coins.iter().find(|coin| self.disabled.contains(&coin.denom)) {
                Some(coin) => Err(BankError::SendDisabled(coin.denom.clone())),
                None => Ok(()),
            }
        }
    }

    /// Fee allowances keyed by `(granter, grantee)`, spent down by every use.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryFeeGrants {
        pub allowances: HashMap<(Address, Address), Coin>,
    }

    impl InMemoryFeeGrants {
        pub fn with_allowance(mut self, granter: Address, grantee: Address, limit: Coin) -> Self {
            self.allowances.insert((granter, grantee), limit);
            self
        }
    }

    impl FeeGrantPort for InMemoryFeeGrants {
        fn use_granted_fees(
            &mut self,
            granter: &Address,
            grantee: &Address,
            fee: &[Coin],
            _msgs: &[String],
        ) -> Result<(), FeeGrantError> {
            let allowance = self
                .allowances
                .get_mut(&(*granter, *grantee))
                .ok_or_else(|| FeeGrantError("fee allowance not found".into()))?;

            let mut remaining = allowance.clone();
            for coin in fee {
                remaining = remaining
                    .checked_sub(coin)
                    .map_err(|_| FeeGrantError("basic allowance limit exceeded".into()))?;
            }
            *allowance = remaining;

            Ok(())
        }
    }

    /// Fixed conversion rates from one denomination into another.
    #[derive(Debug, Clone, Default)]
    pub struct StaticResolver {
        pub rates: HashMap<(String, String), Decimal>,
    }

    impl StaticResolver {
        pub fn with_rate(
            mut self,
            from: impl Into<String>,
            to: impl Into<String>,
            rate: Decimal,
        ) -> Self {
            self.rates.insert((from.into(), to.into()), rate);
            self
        }
    }

    impl DenomResolver for StaticResolver {
        fn convert(&self, price: &DecCoin, denom: &str) -> Result<DecCoin, ResolverError> {
            if price.denom == denom {
                return Ok(price.clone());
            }

            let rate = self
                .rates
                .get(&(price.denom.clone(), denom.to_owned()))
                .ok_or_else(|| ResolverError::UnknownDenom(denom.to_owned()))?;
            let amount = price
                .amount
                .checked_mul(*rate)
                .map_err(|_| ResolverError::UnknownDenom(denom.to_owned()))?;

            Ok(DecCoin::new(denom, amount))
        }
    }

    /// Consensus params with an optional block gas cap.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct StaticConsensus(pub Option<u64>);

    impl ConsensusPort for StaticConsensus {
        fn max_gas_per_block(&self) -> Option<u64> {
            self.0
        }
    }
}

#[cfg(any(feature = "test-doubles", test))]
pub use test_doubles::*;
