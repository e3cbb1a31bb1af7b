use {
    feemarket_state::{Params, State},
    std::fmt::Debug,
};

pub trait FeeMarketQueries: Debug {
    /// The associated error type for the backing storage access operation.
    type Err: Debug;
    /// The backing storage access handle type.
    type Storage;

    fn params(&self, storage: &Self::Storage) -> Result<Option<Params>, Self::Err>;

    fn state(&self, storage: &Self::Storage) -> Result<Option<State>, Self::Err>;

    /// Params and state as published together, or `None` when either slot is missing.
    fn snapshot(&self, storage: &Self::Storage) -> Result<Option<(Params, State)>, Self::Err>;
}

pub mod in_memory {
    use {
        crate::fee_market::{
            FeeMarketMemoryReader, PARAMS_KEY, STATE_KEY, in_memory::ReadFeeMarketMemory,
            read::FeeMarketQueries,
        },
        feemarket_state::{Params, State},
        serde::de::DeserializeOwned,
        std::sync::Arc,
    };

    /// Fee market queries that work with in memory backing store [`FeeMarketMemory`].
    ///
    /// [`FeeMarketMemory`]: crate::fee_market::FeeMarketMemory
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryFeeMarketQueries;

    impl InMemoryFeeMarketQueries {
        pub fn new() -> Self {
            Self
        }
    }

    fn decode<T: DeserializeOwned>(
        bytes: Option<Arc<Vec<u8>>>,
    ) -> Result<Option<T>, serde_json::Error> {
        bytes
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
    }

    impl FeeMarketQueries for InMemoryFeeMarketQueries {
        type Err = serde_json::Error;
        type Storage = FeeMarketMemoryReader;

        fn params(&self, storage: &Self::Storage) -> Result<Option<Params>, Self::Err> {
            decode(storage.get(PARAMS_KEY))
        }

        fn state(&self, storage: &Self::Storage) -> Result<Option<State>, Self::Err> {
            decode(storage.get(STATE_KEY))
        }

        fn snapshot(&self, storage: &Self::Storage) -> Result<Option<(Params, State)>, Self::Err> {
            let [params, state] = storage.get_all([PARAMS_KEY, STATE_KEY]);

            Ok(decode(params)?.zip(decode(state)?))
        }
    }
}
