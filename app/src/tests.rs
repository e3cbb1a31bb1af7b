use {
    crate::{
        Application, Command, CommandActor, DISTRIBUTION_ADDRESS, FEE_COLLECTOR_ADDRESS,
        TestDependencies,
    },
    feemarket_execution::{
        Charge, CheckContext, FeeMarketEvent, FeeTx,
        ports::{StaticConsensus, StaticResolver},
    },
    feemarket_genesis::{
        GenesisState,
        config::{DEFAULT_AUTHORITY, GenesisConfig},
    },
    feemarket_shared::{
        error::{Error, ErrorKind, InvalidTransactionCause},
        primitives::{Address, Coin, DecCoin, Decimal, U256, address},
    },
    feemarket_state::{Calibration, Params, State, default_aimd_params, default_params},
    std::{
        sync::atomic::{AtomicBool, Ordering},
        thread,
    },
    test_case::test_case,
};

const PAYER: Address = address!("8fd379246834eac74b8419ffda202cf8051f7a03");
const GRANTER: Address = address!("44223f1ee8a3b6b3bba1a1e5b0a9b4e9c83bf30c");
const STRANGER: Address = address!("2a9f1ac1a2e6b9b2a5a5d1b4c3b5b39e0d2bca37");

const BASE_FEE: u64 = 1_000_000_000;

fn stake(amount: u128) -> Coin {
    Coin::new("stake", U256::from(amount))
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn create_app() -> Application<TestDependencies> {
    create_app_with(GenesisConfig::default())
}

fn create_app_with(genesis_config: GenesisConfig) -> Application<TestDependencies> {
    let mut app = Application::new(TestDependencies, &genesis_config).unwrap();
    fund(&mut app, PAYER, u128::MAX);
    app
}

fn fund(app: &mut Application<TestDependencies>, address: Address, amount: u128) {
    app.accounts.accounts.insert(address);
    app.bank
        .balances
        .insert((address, "stake".to_owned()), U256::from(amount));
}

fn balance(app: &Application<TestDependencies>, address: Address) -> U256 {
    app.bank.balance(&address, "stake")
}

/// Admits, charges and settles a transaction offering twice the base fee for `gas`.
fn execute(app: &mut Application<TestDependencies>, gas: u64) {
    let fee = u128::from(gas.max(1)) * u128::from(BASE_FEE) * 2;
    let tx = FeeTx::new(PAYER, stake(fee), gas.max(1));
    let (required, tip) = app.check_fee(&tx, CheckContext::at_height(1)).unwrap();
    let charge = app.deduct(&tx, required, tip).unwrap();
    app.refund(&tx, &charge, gas, true).unwrap();
}

#[test]
fn test_new_applies_genesis_of_config() {
    let app = create_app();

    assert_eq!(app.params(), &default_params());
    assert_eq!(app.state(), &State::new(&default_params()));
    assert_eq!(app.reader().params().unwrap(), default_params());
    assert_eq!(app.reader().state().unwrap(), State::new(&default_params()));
}

#[test]
fn test_new_resolves_module_accounts_once() {
    let mut app = create_app();

    assert_eq!(app.fee_token.fee_collector(), FEE_COLLECTOR_ADDRESS);
    assert_eq!(app.fee_token.distribution(), DISTRIBUTION_ADDRESS);

    app.accounts.modules.clear();
    execute(&mut app, 21_000);

    assert_eq!(app.state.current_gas(), 21_000);
}

#[test]
fn test_new_applies_aimd_calibration_of_config() {
    let app = create_app_with(GenesisConfig {
        calibration: Calibration::Aimd,
        ..Default::default()
    });

    assert_eq!(app.params(), &default_aimd_params());
    assert_eq!(app.state().window.len(), 8);
}

#[test_case(0, "1000000000"; "Empty block clamps at floor")]
#[test_case(30_000_000, "1125000000"; "Full block")]
#[test_case(15_000_000, "1000000000"; "Target block")]
fn test_end_block_moves_base_fee(gas: u64, expected: &str) {
    let mut app = create_app();
    app.begin_block(1);
    if gas > 0 {
        execute(&mut app, gas);
    }

    let update = app.end_block(1).unwrap().unwrap();

    assert_eq!(update.block_gas, gas);
    assert_eq!(update.base_fee, dec(expected));
    assert_eq!(app.state().base_fee, dec(expected));
    assert_eq!(app.state().current_gas(), 0);
}

#[test]
fn test_end_block_publishes_state_to_reader() {
    let mut app = create_app();
    let reader = app.reader();
    execute(&mut app, 30_000_000);

    assert_eq!(
        reader.base_gas_price().unwrap(),
        DecCoin::new("stake", Decimal::from(BASE_FEE))
    );

    app.end_block(1).unwrap();

    assert_eq!(
        reader.base_gas_price().unwrap(),
        DecCoin::new("stake", dec("1125000000"))
    );
    assert_eq!(reader.state().unwrap(), app.state);
}

#[test]
fn test_end_block_emits_update_event() {
    let mut app = create_app();
    app.end_block(5).unwrap();

    let events = app.drain_events();

    assert_eq!(
        events,
        vec![FeeMarketEvent::FeeMarketUpdate {
            base_fee: Decimal::from(BASE_FEE),
            learning_rate: dec("0.125"),
            height: 5,
        }]
    );
    assert!(app.drain_events().is_empty());
}

#[test]
fn test_end_block_failure_leaves_state_untouched() {
    let mut app = create_app();
    app.state.target_block_utilization = 0;
    let before = app.state.clone();

    let error = app.end_block(1).unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(error.kind(), ErrorKind::DivisionByZero);
    assert_eq!(app.state, before);
    assert!(app.events.is_empty());
}

#[test]
fn test_aimd_learning_rate_trajectory() {
    let mut app = create_app();
    let params = Params {
        window: 4,
        alpha: dec("0.1"),
        beta: dec("0.9"),
        theta: dec("0.2"),
        delta: Decimal::ZERO,
        min_learning_rate: dec("0.01"),
        max_learning_rate: dec("0.5"),
        ..default_params()
    };
    app.update_params(DEFAULT_AUTHORITY, params).unwrap();
    app.state.learning_rate = dec("0.1");

    let trajectory: Vec<_> = (1..=5)
        .map(|height| app.end_block(height).unwrap().unwrap().learning_rate)
        .collect();

    assert_eq!(
        trajectory,
        vec![dec("0.2"), dec("0.3"), dec("0.4"), dec("0.5"), dec("0.5")]
    );
}

#[test]
fn test_learning_rate_is_constant_with_default_calibration() {
    let mut app = create_app();

    for (height, gas) in [0, 30_000_000, 15_000_000, 1, 29_999_999].into_iter().enumerate() {
        if gas > 0 {
            execute(&mut app, gas);
        }
        app.end_block(height as u64 + 1).unwrap();

        assert_eq!(app.state().learning_rate, dec("0.125"));
    }
}

#[test_case(200_000, Ok((200_000, 0)); "Exact fee")]
#[test_case(250_000, Ok((200_000, 50_000)); "Fee with tip")]
#[test_case(199_999, Err(ErrorKind::InsufficientFee); "Fee below base fee")]
fn test_check_fee(fee: u128, expected: Result<(u128, u128), ErrorKind>) {
    let mut app = create_app();
    app.state.base_fee = Decimal::from(100);
    let tx = FeeTx::new(PAYER, stake(fee), 2000);

    let actual = app.check_fee(&tx, CheckContext::at_height(1));

    assert_eq!(
        actual.map_err(|e| e.kind()),
        expected.map(|(required, tip)| (stake(required), stake(tip)))
    );
}

#[test]
fn test_reader_checks_fee_against_published_state() {
    let app = create_app();
    let reader = app.reader();
    let tx = FeeTx::new(PAYER, stake(u128::from(BASE_FEE) * 21_000 - 1), 21_000);

    let error = reader
        .check_fee(&tx, CheckContext::at_height(1))
        .unwrap_err();

    assert_eq!(
        error,
        Error::InvalidTransaction(InvalidTransactionCause::InsufficientFee {
            required: stake(u128::from(BASE_FEE) * 21_000),
            got: stake(u128::from(BASE_FEE) * 21_000 - 1),
        })
    );
}

#[test_case(true, false, 40, 0, 110; "Success keeps tip in collector")]
#[test_case(true, true, 40, 50, 60; "Success distributes tip")]
#[test_case(false, false, 90, 0, 60; "Failure refunds tip")]
#[test_case(false, true, 90, 0, 60; "Failure refunds tip despite distribution")]
fn test_fee_settlement(
    success: bool,
    distribute_fees: bool,
    expected_refund: u128,
    expected_distributed: u128,
    expected_collected: u128,
) {
    // Amounts below are in units of the base fee.
    let unit = u128::from(BASE_FEE);
    let mut app = create_app();
    app.update_params(
        DEFAULT_AUTHORITY,
        Params {
            distribute_fees,
            ..default_params()
        },
    )
    .unwrap();
    let initial = balance(&app, PAYER);
    let tx = FeeTx::new(PAYER, stake(150 * unit), 100);

    let (required, tip) = app.check_fee(&tx, CheckContext::at_height(1)).unwrap();
    let charge = app.deduct(&tx, required, tip).unwrap();

    assert_eq!(balance(&app, PAYER), initial - U256::from(150 * unit));

    let refund = app.refund(&tx, &charge, 60, success).unwrap();

    assert_eq!(refund.refund, stake(expected_refund * unit));
    assert_eq!(refund.distributed, stake(expected_distributed * unit));
    assert_eq!(
        balance(&app, PAYER),
        initial - U256::from((150 - expected_refund) * unit)
    );
    assert_eq!(
        balance(&app, FEE_COLLECTOR_ADDRESS),
        U256::from(expected_collected * unit)
    );
    assert_eq!(
        balance(&app, DISTRIBUTION_ADDRESS),
        U256::from(expected_distributed * unit)
    );
    assert_eq!(app.state().current_gas(), 60);
    assert_eq!(
        app.drain_events(),
        vec![
            FeeMarketEvent::TxFee {
                payer: PAYER,
                required: stake(100 * unit),
                tip: stake(50 * unit),
            },
            FeeMarketEvent::TxRefund {
                payee: PAYER,
                refund: stake(expected_refund * unit),
            },
        ]
    );
}

#[test]
fn test_refund_persists_recorded_gas() {
    let mut app = create_app();
    let reader = app.reader();

    execute(&mut app, 21_000);

    assert_eq!(reader.state().unwrap().current_gas(), 21_000);
}

#[test]
fn test_failed_payout_keeps_recorded_gas_published() {
    let mut app = create_app();
    let reader = app.reader();
    let tx = FeeTx::new(PAYER, stake(0), 21_000);
    let charge = Charge {
        payer: PAYER,
        required: stake(u128::from(BASE_FEE) * 1_000_000),
        tip: stake(0),
    };

    let error = app.refund(&tx, &charge, 21_000, true).unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(app.state.current_gas(), 21_000);
    assert_eq!(reader.state().unwrap(), app.state);
}

#[test]
fn test_fee_grant_pays_on_behalf_of_grantee() {
    let unit = u128::from(BASE_FEE);
    let mut app = create_app();
    fund(&mut app, GRANTER, 1_000 * unit);
    app.fee_grant = app
        .fee_grant
        .clone()
        .with_allowance(GRANTER, PAYER, stake(500 * unit));
    let payer_balance = balance(&app, PAYER);
    let tx = FeeTx::new(PAYER, stake(100 * unit), 100).with_fee_granter(GRANTER);

    let (required, tip) = app.check_fee(&tx, CheckContext::at_height(1)).unwrap();
    let charge = app.deduct(&tx, required, tip).unwrap();
    let refund = app.refund(&tx, &charge, 40, true).unwrap();

    assert_eq!(charge.payer, GRANTER);
    assert_eq!(refund.payee, GRANTER);
    assert_eq!(balance(&app, GRANTER), U256::from(960 * unit));
    assert_eq!(balance(&app, PAYER), payer_balance);
}

#[test]
fn test_fee_grant_without_allowance_is_denied() {
    let unit = u128::from(BASE_FEE);
    let mut app = create_app();
    fund(&mut app, GRANTER, 1_000 * unit);
    let tx = FeeTx::new(PAYER, stake(100 * unit), 100).with_fee_granter(GRANTER);

    let error = app
        .deduct(&tx, stake(100 * unit), stake(0))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::FeeGrantDenied);
    assert_eq!(balance(&app, GRANTER), U256::from(1_000 * unit));
    assert!(app.events.is_empty());
}

#[test]
fn test_deduct_from_unknown_account_fails() {
    let mut app = create_app();
    let tx = FeeTx::new(STRANGER, stake(100), 1);

    let error = app.deduct(&tx, stake(100), stake(0)).unwrap_err();

    assert_eq!(
        error,
        Error::InvalidTransaction(InvalidTransactionCause::UnknownAccount(STRANGER))
    );
}

#[test]
fn test_deduct_with_insufficient_funds_fails() {
    let mut app = create_app();
    fund(&mut app, STRANGER, 99);
    let tx = FeeTx::new(STRANGER, stake(100), 1);

    let error = app.deduct(&tx, stake(100), stake(0)).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(balance(&app, STRANGER), U256::from(99u64));
}

#[test]
fn test_refund_rejects_gas_above_block_max() {
    let mut app = create_app();
    execute(&mut app, 30_000_000);
    let tx = FeeTx::new(PAYER, stake(u128::from(BASE_FEE)), 1);
    let charge = app.deduct(&tx, stake(u128::from(BASE_FEE)), stake(0)).unwrap();
    let collected = balance(&app, FEE_COLLECTOR_ADDRESS);
    let state = app.state.clone();

    let error = app.refund(&tx, &charge, 1, true).unwrap_err();

    assert_eq!(
        error,
        Error::InvalidTransaction(InvalidTransactionCause::BlockGasOverflow {
            used: 30_000_000,
            additional: 1,
            max: 30_000_000,
        })
    );
    assert_eq!(app.state, state);
    assert_eq!(balance(&app, FEE_COLLECTOR_ADDRESS), collected);
}

#[test]
fn test_refund_rejects_gas_above_limit() {
    let mut app = create_app();
    let tx = FeeTx::new(PAYER, stake(100 * u128::from(BASE_FEE)), 100);
    let charge = app
        .deduct(&tx, stake(100 * u128::from(BASE_FEE)), stake(0))
        .unwrap();

    let error = app.refund(&tx, &charge, 101, true).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::GasUsedExceedsLimit);
    assert_eq!(app.state().current_gas(), 0);
}

#[test]
fn test_disabled_market_charges_nothing_and_stands_still() {
    let mut app = create_app();
    app.update_params(
        DEFAULT_AUTHORITY,
        Params {
            enabled: false,
            ..default_params()
        },
    )
    .unwrap();
    let state = app.state.clone();
    let tx = FeeTx::new(PAYER, stake(7), 30_000_000);

    let (required, tip) = app.check_fee(&tx, CheckContext::at_height(1)).unwrap();
    let charge = app.deduct(&tx, required, tip).unwrap();
    let refund = app.refund(&tx, &charge, 30_000_000, true).unwrap();

    assert_eq!(charge.required, stake(0));
    assert_eq!(charge.tip, stake(7));
    assert_eq!(refund.refund, stake(0));
    assert_eq!(app.end_block(1).unwrap(), None);
    assert_eq!(app.state, state);
}

#[test]
fn test_update_params_resets_state() {
    let mut app = create_app();
    execute(&mut app, 30_000_000);
    app.end_block(1).unwrap();
    let params = default_params().with_target_block_utilization(10_000_000);

    app.update_params(DEFAULT_AUTHORITY, params.clone()).unwrap();

    assert_eq!(app.params(), &params);
    assert_eq!(app.state(), &State::new(&params));
    assert_eq!(app.reader().params().unwrap(), params);
    assert_eq!(app.reader().state().unwrap(), State::new(&params));
}

#[test]
fn test_reader_never_pairs_params_with_state_of_other_update() {
    let mut app = create_app();
    let reader = app.reader();
    let done = AtomicBool::new(false);

    let mismatched = thread::scope(|scope| {
        let done = &done;
        let checker = scope.spawn(move || {
            let mut mismatched = 0;
            while !done.load(Ordering::Acquire) {
                let (params, state) = reader.snapshot().unwrap();
                if state.validate(&params).is_err() {
                    mismatched += 1;
                }
            }
            mismatched
        });

        for i in 0..2_000 {
            let params = if i % 2 == 0 {
                default_aimd_params()
            } else {
                default_params()
            };
            app.update_params(DEFAULT_AUTHORITY, params).unwrap();
        }
        done.store(true, Ordering::Release);

        checker.join().unwrap()
    });

    assert_eq!(mismatched, 0);
}

#[test]
fn test_update_params_by_unauthorized_account_fails() {
    let mut app = create_app();

    let error = app
        .update_params(STRANGER, default_aimd_params())
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Unauthorized);
    assert_eq!(app.params(), &default_params());
}

#[test_case(Params { window: 0, ..default_params() }; "Empty window")]
#[test_case(Params { window: u64::MAX, ..default_params() }; "Unbounded window")]
#[test_case(Params { target_block_utilization: 0, ..default_params() }; "Zero target")]
#[test_case(Params { min_learning_rate: dec("0.6"), ..default_aimd_params() }; "Inverted learning rate bounds")]
fn test_update_params_rejects_invalid_params(params: Params) {
    let mut app = create_app();

    let error = app.update_params(DEFAULT_AUTHORITY, params).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidParams);
    assert_eq!(app.params(), &default_params());
}

#[test]
fn test_update_params_respects_consensus_gas_cap() {
    let mut app = create_app();
    app.consensus = StaticConsensus(Some(20_000_000));

    let error = app
        .update_params(DEFAULT_AUTHORITY, default_params())
        .unwrap_err();
    app.update_params(
        DEFAULT_AUTHORITY,
        default_params().with_target_block_utilization(10_000_000),
    )
    .unwrap();

    assert_eq!(error.kind(), ErrorKind::InvalidParams);
    assert_eq!(app.params().max_block_utilization, 20_000_000);
}

#[test]
fn test_export_then_init_genesis_round_trips() {
    let mut app = create_app();
    execute(&mut app, 30_000_000);
    app.end_block(1).unwrap();
    execute(&mut app, 21_000);
    let exported = app.export_genesis();

    let mut other = create_app();
    other.init_genesis(exported.clone()).unwrap();

    assert_eq!(other.export_genesis(), exported);
    assert_eq!(other.reader().state().unwrap(), exported.state);
}

#[test]
fn test_init_genesis_rejects_inconsistent_state() {
    let mut app = create_app();
    let mut genesis = GenesisState::new(default_aimd_params());
    genesis.state.window.pop();

    let error = app.init_genesis(genesis).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidState);
    assert_eq!(app.params(), &default_params());
}

#[test]
fn test_load_restores_published_state() {
    let mut app = create_app();
    execute(&mut app, 30_000_000);
    app.end_block(1).unwrap();
    let published = app.state.clone();
    app.state.base_fee = Decimal::from(7);

    app.load().unwrap();

    assert_eq!(app.state, published);
}

#[test]
fn test_gas_price_in_other_denom() {
    let mut app = create_app();
    app.resolver = StaticResolver::default().with_rate("stake", "atom", dec("0.5"));

    assert_eq!(
        app.gas_price("atom").unwrap(),
        DecCoin::new("atom", dec("500000000"))
    );
    assert_eq!(app.gas_price("stake").unwrap(), app.base_gas_price());
    assert_eq!(
        app.gas_price("eth").unwrap_err().kind(),
        ErrorKind::UnknownDenom
    );
    assert_eq!(app.gas_prices(), vec![app.base_gas_price()]);
}

#[test_case(stake(42_000), 21_000, 2; "Fee per gas")]
#[test_case(stake(1), 21_000, 0; "Truncated")]
fn test_priority(fee: Coin, gas_limit: u64, expected: i64) {
    let app = create_app();
    let tx = FeeTx::new(PAYER, fee, gas_limit);

    assert_eq!(app.priority(&tx), expected);
}

#[tokio::test]
async fn test_actor_drives_block_lifecycle() {
    let mut app = create_app();
    execute(&mut app, 30_000_000);
    let (tx, rx) = tokio::sync::mpsc::channel(8);

    tx.send(Command::BeginBlock { height: 1 }).await.unwrap();
    tx.send(Command::EndBlock { height: 1 }).await.unwrap();
    tx.send(Command::UpdateParams {
        authority: STRANGER,
        params: default_aimd_params(),
    })
    .await
    .unwrap();
    tx.send(Command::BeginBlock { height: 2 }).await.unwrap();
    drop(tx);

    CommandActor::new(rx, &mut app).run().await.unwrap();

    assert_eq!(app.height, 2);
    assert_eq!(app.params(), &default_params());
    assert_eq!(app.state().base_fee, dec("1125000000"));
}

#[tokio::test]
async fn test_actor_stops_on_fatal_error() {
    let mut app = create_app();
    app.state.target_block_utilization = 0;
    let (tx, rx) = tokio::sync::mpsc::channel(8);

    tx.send(Command::EndBlock { height: 1 }).await.unwrap();
    tx.send(Command::BeginBlock { height: 2 }).await.unwrap();
    drop(tx);

    let error = CommandActor::new(rx, &mut app).run().await.unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(app.height, 1);
}
