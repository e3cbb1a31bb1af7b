#[cfg(any(feature = "test-doubles", test))]
pub use test_doubles::{DISTRIBUTION_ADDRESS, FEE_COLLECTOR_ADDRESS, TestDependencies};

use {
    feemarket_execution::{FeeMarketEvent, FeeTokenAccounts, ports},
    feemarket_genesis::{GenesisState, config::GenesisConfig},
    feemarket_shared::error::{Error, Result},
    feemarket_state::{Params, State},
};

/// Read-only view of the fee market that admission checks may run on concurrently with block
/// execution.
///
/// It reads the last state published to storage by the [`Application`], never a partially
/// updated one.
pub struct ApplicationReader<D: Dependencies> {
    pub genesis_config: GenesisConfig,
    pub resolver: D::Resolver,
    pub fee_market_queries: D::FeeMarketQueries,
    pub storage: D::StorageReader,
}

impl<D: Dependencies> Clone for ApplicationReader<D> {
    fn clone(&self) -> Self {
        Self {
            genesis_config: self.genesis_config.clone(),
            resolver: self.resolver.clone(),
            fee_market_queries: self.fee_market_queries.clone(),
            storage: self.storage.clone(),
        }
    }
}

pub struct Application<D: Dependencies> {
    pub genesis_config: GenesisConfig,
    pub params: Params,
    pub state: State,
    /// Height of the block being processed.
    pub height: u64,
    /// Events emitted since they were last drained.
    pub events: Vec<FeeMarketEvent>,
    /// Module accounts fees move through, resolved once at startup.
    pub fee_token: FeeTokenAccounts,
    pub accounts: D::Accounts,
    pub bank: D::Bank,
    pub fee_grant: D::FeeGrant,
    pub resolver: D::Resolver,
    pub consensus: D::Consensus,
    pub fee_market_queries: D::FeeMarketQueries,
    pub fee_market_repository: D::FeeMarketRepository,
    pub storage: D::Storage,
    pub storage_reader: D::StorageReader,
}

impl<D: Dependencies> Application<D> {
    /// Creates the application and loads the fee market from storage.
    ///
    /// When storage lacks either slot, the genesis state implied by `genesis_config` is applied.
    /// Fails when the fee collector or distribution module account is unknown.
    pub fn new(_: D, genesis_config: &GenesisConfig) -> Result<Self> {
        let (storage_reader, storage) = D::storage();
        let genesis = feemarket_genesis::build(genesis_config);
        let accounts = D::accounts(genesis_config);
        let fee_token = FeeTokenAccounts::resolve(
            &accounts,
            &genesis_config.fee_collector,
            &genesis_config.distribution,
        )?;
        let mut app = Self {
            genesis_config: genesis_config.clone(),
            params: genesis.params,
            state: genesis.state,
            height: 0,
            events: Vec::new(),
            fee_token,
            accounts,
            bank: D::bank(genesis_config),
            fee_grant: D::fee_grant(),
            resolver: D::resolver(),
            consensus: D::consensus(),
            fee_market_queries: D::fee_market_queries(),
            fee_market_repository: D::fee_market_repository(),
            storage,
            storage_reader,
        };
        app.load()?;

        Ok(app)
    }

    /// Adopts the params and state found in storage, or applies the default genesis when any of
    /// them is missing.
    pub fn load(&mut self) -> Result<()> {
        use feemarket_blockchain::FeeMarketQueries;

        let snapshot = self
            .fee_market_queries
            .snapshot(&self.storage_reader)
            .map_err(Error::storage)?;

        let genesis = match snapshot {
            Some((params, state)) => GenesisState { params, state },
            None => feemarket_genesis::build(&self.genesis_config),
        };

        self.init_genesis(genesis)
    }

    pub fn reader(&self) -> ApplicationReader<D> {
        ApplicationReader {
            genesis_config: self.genesis_config.clone(),
            resolver: self.resolver.clone(),
            fee_market_queries: self.fee_market_queries.clone(),
            storage: self.storage_reader.clone(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<FeeMarketEvent> {
        std::mem::take(&mut self.events)
    }
}

pub trait Dependencies {
    type Accounts: ports::AccountPort;
    type Bank: ports::BankPort;
    type FeeGrant: ports::FeeGrantPort;
    type Resolver: ports::DenomResolver + Clone;
    type Consensus: ports::ConsensusPort;
    type FeeMarketQueries: feemarket_blockchain::FeeMarketQueries<Storage = Self::StorageReader>
        + Clone;
    type FeeMarketRepository: feemarket_blockchain::FeeMarketRepository<Storage = Self::Storage>;
    type Storage;
    type StorageReader: Clone;

    fn accounts(genesis_config: &GenesisConfig) -> Self::Accounts;

    fn bank(genesis_config: &GenesisConfig) -> Self::Bank;

    fn fee_grant() -> Self::FeeGrant;

    fn resolver() -> Self::Resolver;

    fn consensus() -> Self::Consensus;

    fn fee_market_queries() -> Self::FeeMarketQueries;

    fn fee_market_repository() -> Self::FeeMarketRepository;

    /// Creates the backing storage along with a reader of it.
    fn storage() -> (Self::StorageReader, Self::Storage);
}

#[cfg(any(feature = "test-doubles", test))]
mod test_doubles {
    use {
        crate::Dependencies,
        feemarket_blockchain::{
            FeeMarketMemory, FeeMarketMemoryReader, InMemoryFeeMarketQueries,
            InMemoryFeeMarketRepository, shared_memory,
        },
        feemarket_execution::ports::{
            InMemoryAccounts, InMemoryBank, InMemoryFeeGrants, StaticConsensus, StaticResolver,
        },
        feemarket_genesis::config::GenesisConfig,
        feemarket_shared::primitives::{Address, address},
    };

    pub const FEE_COLLECTOR_ADDRESS: Address = address!("000000000000000000000000000000000000fee1");
    pub const DISTRIBUTION_ADDRESS: Address = address!("000000000000000000000000000000000000d157");

    /// Dependencies backed entirely by memory, with the module accounts of the config registered.
    pub struct TestDependencies;

    impl Dependencies for TestDependencies {
        type Accounts = InMemoryAccounts;
        type Bank = InMemoryBank;
        type FeeGrant = InMemoryFeeGrants;
        type Resolver = StaticResolver;
        type Consensus = StaticConsensus;
        type FeeMarketQueries = InMemoryFeeMarketQueries;
        type FeeMarketRepository = InMemoryFeeMarketRepository;
        type Storage = FeeMarketMemory;
        type StorageReader = FeeMarketMemoryReader;

        fn accounts(genesis_config: &GenesisConfig) -> Self::Accounts {
            InMemoryAccounts::default()
                .with_module(genesis_config.fee_collector.clone(), FEE_COLLECTOR_ADDRESS)
                .with_module(genesis_config.distribution.clone(), DISTRIBUTION_ADDRESS)
        }

        fn bank(genesis_config: &GenesisConfig) -> Self::Bank {
            InMemoryBank::default()
                .with_module(genesis_config.fee_collector.clone(), FEE_COLLECTOR_ADDRESS)
                .with_module(genesis_config.distribution.clone(), DISTRIBUTION_ADDRESS)
        }

        fn fee_grant() -> Self::FeeGrant {
            InMemoryFeeGrants::default()
        }

        fn resolver() -> Self::Resolver {
            StaticResolver::default()
        }

        fn consensus() -> Self::Consensus {
            StaticConsensus::default()
        }

        fn fee_market_queries() -> Self::FeeMarketQueries {
            InMemoryFeeMarketQueries::new()
        }

        fn fee_market_repository() -> Self::FeeMarketRepository {
            InMemoryFeeMarketRepository::new()
        }

        fn storage() -> (Self::StorageReader, Self::Storage) {
            shared_memory::new()
        }
    }
}
