use {
    feemarket_state::{Params, State},
    std::fmt::Debug,
};

pub trait FeeMarketRepository: Debug {
    /// The associated error type for the backing storage access operation.
    type Err: Debug;
    /// The backing storage access handle type.
    type Storage;

    fn save_params(&mut self, storage: &mut Self::Storage, params: &Params)
    -> Result<(), Self::Err>;

    fn save_state(&mut self, storage: &mut Self::Storage, state: &State) -> Result<(), Self::Err>;

    /// Saves `params` and `state` so that readers observe both or neither.
    fn save(
        &mut self,
        storage: &mut Self::Storage,
        params: &Params,
        state: &State,
    ) -> Result<(), Self::Err>;
}

pub mod in_memory {
    use {
        crate::fee_market::{FeeMarketMemory, PARAMS_KEY, STATE_KEY, write::FeeMarketRepository},
        feemarket_state::{Params, State},
    };

    /// Fee market repository that works with in memory backing store [`FeeMarketMemory`].
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryFeeMarketRepository;

    impl InMemoryFeeMarketRepository {
        pub fn new() -> Self {
            Self
        }
    }

    impl FeeMarketRepository for InMemoryFeeMarketRepository {
        type Err = serde_json::Error;
        type Storage = FeeMarketMemory;

        fn save_params(
            &mut self,
            storage: &mut Self::Storage,
            params: &Params,
        ) -> Result<(), Self::Err> {
            storage.put(PARAMS_KEY, serde_json::to_vec(params)?);
            storage.publish();
            Ok(())
        }

        fn save_state(&mut self, storage: &mut Self::Storage, state: &State) -> Result<(), Self::Err> {
            storage.put(STATE_KEY, serde_json::to_vec(state)?);
            storage.publish();
            Ok(())
        }

        fn save(
            &mut self,
            storage: &mut Self::Storage,
            params: &Params,
            state: &State,
        ) -> Result<(), Self::Err> {
            let params = serde_json::to_vec(params)?;
            let state = serde_json::to_vec(state)?;

            storage.put(PARAMS_KEY, params);
            storage.put(STATE_KEY, state);
            storage.publish();
            Ok(())
        }
    }
}
