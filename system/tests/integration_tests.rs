//! End-to-end tests driving the system contract through its action surface
//! against the nullable host.

use goc_governance::StartMode;
use goc_host::{DeferredAction, DeferredKey, TokenLedger};
use goc_nullables::{NullClock, NullHost};
use goc_system::accounts::{
    AUXILIARY_ACCOUNTS, BPAY_ACCOUNT, GOC_ACCOUNT, NAMES_ACCOUNT, RAM_ACCOUNT, RAM_FEE_ACCOUNT,
    STAKE_ACCOUNT,
};
use goc_system::{Action, SystemConfig, SystemContract, SystemError};
use goc_types::{
    AccountName, Asset, BlockTimestamp, ChainParameters, ErrorKind, GocParams, PublicKey, Symbol,
    Timestamp, SECONDS_PER_DAY,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SYS: Symbol = Symbol::from_static(4, "SYS");
const EOSIO: AccountName = AccountName::from_static("eosio");
const ALICE: AccountName = AccountName::from_static("alice");
const BOB: AccountName = AccountName::from_static("bob");
const PRODA: AccountName = AccountName::from_static("proda");
const T0: Timestamp = Timestamp::new(1_600_000_000);

fn sys(amount: i64) -> Asset {
    Asset::new(amount, SYS)
}

fn key(b: u8) -> PublicKey {
    let mut bytes = [b; 33];
    bytes[0] = 2;
    PublicKey(bytes)
}

fn test_config() -> SystemConfig {
    SystemConfig {
        min_activated_stake: 1_000_0000,
        allow_debug_start_modes: true,
        ..SystemConfig::default()
    }
}

fn setup(config: SystemConfig) -> (NullHost, SystemContract) {
    let null = NullHost::new();
    for account in AUXILIARY_ACCOUNTS.iter().chain([EOSIO, ALICE, BOB, PRODA].iter()) {
        null.accounts.add(*account);
    }
    null.tokens.credit(ALICE, sys(10_000_000_0000));
    null.tokens.credit(BOB, sys(1_000_000_0000));
    let contract = SystemContract::new(config, null.host()).unwrap();
    (null, contract)
}

fn balance(null: &NullHost, owner: AccountName) -> i64 {
    null.tokens.balance(owner, SYS).amount
}

fn delegate(from: AccountName, receiver: AccountName, each: i64) -> Action {
    Action::DelegateBw {
        from,
        receiver,
        stake_net_quantity: sys(each),
        stake_cpu_quantity: sys(each),
        transfer: false,
    }
}

fn undelegate(from: AccountName, receiver: AccountName, each: i64) -> Action {
    Action::UndelegateBw {
        from,
        receiver,
        unstake_net_quantity: sys(each),
        unstake_cpu_quantity: sys(each),
    }
}

fn onblock(contract: &mut SystemContract, at: Timestamp, producer: AccountName) {
    let action = Action::OnBlock {
        timestamp: BlockTimestamp::from_timestamp(at),
        producer,
    };
    contract.apply(EOSIO, action, at).unwrap();
}

/// Register `proda`, stake for alice and vote, which activates the chain.
fn activate(contract: &mut SystemContract) {
    contract
        .apply(
            PRODA,
            Action::RegProducer {
                producer: PRODA,
                producer_key: key(1),
                url: "https://proda.example".into(),
                location: 0,
            },
            T0,
        )
        .unwrap();
    contract.apply(ALICE, delegate(ALICE, ALICE, 5_000_0000), T0).unwrap();
    contract
        .apply(
            ALICE,
            Action::VoteProducer {
                voter: ALICE,
                proxy: AccountName::EMPTY,
                producers: vec![PRODA],
            },
            T0,
        )
        .unwrap();
    assert!(contract.state().global.is_activated());
}

// ---------------------------------------------------------------------------
// 1. Staking and transactional rollback
// ---------------------------------------------------------------------------

#[test]
fn delegation_moves_tokens_and_sets_limits() {
    let (null, mut contract) = setup(test_config());
    let before = balance(&null, ALICE);

    contract.apply(ALICE, delegate(ALICE, BOB, 100_0000), T0).unwrap();

    assert_eq!(balance(&null, ALICE), before - 200_0000);
    assert_eq!(balance(&null, STAKE_ACCOUNT), 200_0000);
    let (_, net, cpu) = null.accounts.limits(BOB).unwrap();
    assert_eq!((net, cpu), (100_0000, 100_0000));
    assert_eq!(contract.state().voters.get(&BOB).unwrap().staked, 200_0000);
    assert!(contract.state().voters.get(&ALICE).is_none());
}

#[test]
fn wrong_symbol_changes_nothing() {
    let (null, mut contract) = setup(test_config());
    let eos = Symbol::from_static(4, "EOS");
    let action = Action::DelegateBw {
        from: ALICE,
        receiver: ALICE,
        stake_net_quantity: Asset::new(10, eos),
        stake_cpu_quantity: Asset::new(10, eos),
        transfer: false,
    };
    let err = contract.apply(ALICE, action, T0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    assert!(null.tokens.applied().is_empty());
    assert!(contract.state().ledger.delegation(ALICE, ALICE).is_none());
}

#[test]
fn ledger_failure_rolls_the_action_back() {
    let (null, mut contract) = setup(test_config());
    null.tokens.fail_next_batch("ledger offline");

    let err = contract.apply(ALICE, delegate(ALICE, ALICE, 100_0000), T0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Host);
    assert!(contract.state().ledger.delegation(ALICE, ALICE).is_none());
    assert!(contract.state().voters.get(&ALICE).is_none());
    assert_eq!(null.accounts.limits(ALICE).unwrap_or_default(), (0, 0, 0));

    contract.apply(ALICE, delegate(ALICE, ALICE, 100_0000), T0).unwrap();
    assert_eq!(contract.state().voters.get(&ALICE).unwrap().staked, 200_0000);
}

#[test]
fn insufficient_funds_leave_state_untouched() {
    let (null, mut contract) = setup(test_config());
    let err = contract
        .apply(BOB, delegate(BOB, BOB, 1_000_000_0000), T0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(balance(&null, BOB), 1_000_000_0000);
    assert!(contract.state().ledger.resources(BOB).is_none());
}

#[test]
fn unstaking_waits_for_activation() {
    let (_null, mut contract) = setup(test_config());
    contract.apply(ALICE, delegate(ALICE, ALICE, 100_0000), T0).unwrap();
    let err = contract
        .apply(ALICE, undelegate(ALICE, ALICE, 10_0000), T0)
        .unwrap_err();
    assert!(matches!(err, SystemError::NotActivated(_)));
    assert_eq!(err.kind(), ErrorKind::OutOfWindow);
}

#[test]
fn refunds_are_paid_by_the_deferred_runner() {
    let (null, mut contract) = setup(test_config());
    activate(&mut contract);
    let before = balance(&null, ALICE);
    let clock = NullClock::new(T0.as_secs());

    contract.apply(ALICE, undelegate(ALICE, ALICE, 10_0000), clock.now()).unwrap();
    let task = null.deferred.get(DeferredKey::Refund(ALICE)).unwrap();
    assert_eq!(task.execute_at, T0.plus(3 * SECONDS_PER_DAY));
    clock.advance(SECONDS_PER_DAY);
    assert!(contract.run_deferred(clock.now()).is_empty());

    // A second unstake merges and restarts the timer.
    contract.apply(ALICE, undelegate(ALICE, ALICE, 5_0000), clock.now()).unwrap();
    let task = null.deferred.get(DeferredKey::Refund(ALICE)).unwrap();
    assert_eq!(task.execute_at, clock.now().plus(3 * SECONDS_PER_DAY));

    clock.advance(3 * SECONDS_PER_DAY);
    let ran = contract.run_deferred(clock.now());
    assert_eq!(ran.len(), 1);
    assert_eq!(ran[0].0.action, DeferredAction::Refund { owner: ALICE });
    assert!(ran[0].1.is_ok());
    assert_eq!(balance(&null, ALICE), before + 30_0000);
    assert!(contract.state().ledger.refund(ALICE).is_none());
    assert!(null.deferred.pending().is_empty());
}

#[test]
fn refund_before_release_is_rejected() {
    let (_null, mut contract) = setup(test_config());
    activate(&mut contract);
    contract.apply(ALICE, undelegate(ALICE, ALICE, 10_0000), T0).unwrap();
    let err = contract
        .apply(ALICE, Action::Refund { owner: ALICE }, T0.plus(60))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfWindow);
}

// ---------------------------------------------------------------------------
// 2. Authority
// ---------------------------------------------------------------------------

#[test]
fn actions_require_the_right_signer() {
    let (_null, mut contract) = setup(test_config());
    let err = contract
        .apply(BOB, delegate(ALICE, ALICE, 1), T0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = contract
        .apply(ALICE, Action::SetRam { max_ram_size: 1 << 40 }, T0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    contract
        .apply(EOSIO, Action::SetRam { max_ram_size: 1 << 40 }, T0)
        .unwrap();
    assert_eq!(contract.state().global.max_ram_size, 1 << 40);
}

#[test]
fn setpriv_reaches_the_account_registry() {
    let (null, mut contract) = setup(test_config());
    contract
        .apply(
            EOSIO,
            Action::SetPriv {
                account: ALICE,
                is_priv: true,
            },
            T0,
        )
        .unwrap();
    assert!(null.accounts.get(ALICE).unwrap().privileged);

    let ghost = AccountName::from_static("ghost");
    let err = contract
        .apply(
            EOSIO,
            Action::SetPriv {
                account: ghost,
                is_priv: true,
            },
            T0,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn parameter_updates_reach_state_and_host() {
    let (null, mut contract) = setup(test_config());
    let params = ChainParameters {
        max_block_cpu_usage: 400_000,
        ..ChainParameters::default()
    };
    contract
        .apply(EOSIO, Action::SetParams { params: params.clone() }, T0)
        .unwrap();
    assert_eq!(contract.state().global.chain, params);
    assert_eq!(null.schedule.chain_parameters(), Some(params));

    let bad = ChainParameters {
        min_transaction_cpu_usage: 200_000,
        ..ChainParameters::default()
    };
    let err = contract
        .apply(EOSIO, Action::SetParams { params: bad }, T0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let goc = GocParams {
        action_fee: 0,
        ..GocParams::default()
    };
    contract
        .apply(EOSIO, Action::SetGocParams { params: goc.clone() }, T0)
        .unwrap();
    assert_eq!(contract.state().global.goc_params(), goc);
}

// ---------------------------------------------------------------------------
// 3. RAM
// ---------------------------------------------------------------------------

#[test]
fn buying_ram_pays_cost_and_fee() {
    let (null, mut contract) = setup(test_config());
    contract
        .apply(
            ALICE,
            Action::BuyRam {
                payer: ALICE,
                receiver: BOB,
                quant: sys(100_0000),
            },
            T0,
        )
        .unwrap();

    let fee = balance(&null, RAM_FEE_ACCOUNT);
    assert_eq!(fee, 5_000);
    assert_eq!(balance(&null, RAM_ACCOUNT) + fee, 100_0000);
    let bytes = contract.state().ledger.ram_bytes(BOB);
    assert!(bytes > 0);
    assert_eq!(contract.state().global.total_ram_bytes_reserved, bytes as u64);
    assert_eq!(null.accounts.limits(BOB).unwrap().0, bytes);
}

#[test]
fn selling_ram_returns_tokens() {
    let (null, mut contract) = setup(test_config());
    contract
        .apply(
            ALICE,
            Action::BuyRamBytes {
                payer: ALICE,
                receiver: ALICE,
                bytes: 8_192,
            },
            T0,
        )
        .unwrap();
    let bought = contract.state().ledger.ram_bytes(ALICE);
    assert!(bought > 8_000);
    let before = balance(&null, ALICE);

    contract
        .apply(
            ALICE,
            Action::SellRam {
                account: ALICE,
                bytes: 4_096,
            },
            T0,
        )
        .unwrap();
    assert_eq!(contract.state().ledger.ram_bytes(ALICE), bought - 4_096);
    assert!(balance(&null, ALICE) > before);

    null.accounts.set_ram_usage(ALICE, (bought - 4_096) as u64);
    let err = contract
        .apply(
            ALICE,
            Action::SellRam {
                account: ALICE,
                bytes: 1,
            },
            T0,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
}

// ---------------------------------------------------------------------------
// 4. Producers, block hook and rewards
// ---------------------------------------------------------------------------

#[test]
fn onblock_does_nothing_before_activation() {
    let (null, mut contract) = setup(test_config());
    onblock(&mut contract, T0, PRODA);
    assert!(null.schedule.proposed().is_empty());
    assert!(contract.state().global.last_pervote_bucket_fill.is_epoch());
}

#[test]
fn onblock_elects_and_counts_blocks() {
    let (null, mut contract) = setup(test_config());
    activate(&mut contract);

    onblock(&mut contract, T0.plus(1), PRODA);
    let schedule = null.schedule.last_schedule().unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].producer_name, PRODA);
    assert_eq!(contract.state().global.last_pervote_bucket_fill, T0.plus(1));

    onblock(&mut contract, T0.plus(2), PRODA);
    assert_eq!(null.schedule.proposed().len(), 1);
    assert_eq!(contract.state().producers.get(&PRODA).unwrap().unpaid_blocks, 2);
    assert_eq!(contract.state().global.total_unpaid_blocks, 2);
}

#[test]
fn claimrewards_pays_block_and_vote_share() {
    let (null, mut contract) = setup(test_config());
    activate(&mut contract);
    onblock(&mut contract, T0.plus(1), PRODA);
    onblock(&mut contract, T0.plus(2), PRODA);

    let err = contract
        .apply(PRODA, Action::ClaimRewards { owner: PRODA }, T0.plus(60))
        .unwrap_err();
    assert!(matches!(err, SystemError::ClaimTooSoon { .. }));

    let supply = null.tokens.supply(SYS).amount;
    let at = T0.plus(2 * SECONDS_PER_DAY);
    contract
        .apply(PRODA, Action::ClaimRewards { owner: PRODA }, at)
        .unwrap();

    assert!(null.tokens.supply(SYS).amount > supply);
    let block_pay: i64 = null
        .tokens
        .transfers_to(PRODA)
        .iter()
        .filter(|(from, _, _)| *from == BPAY_ACCOUNT)
        .map(|(_, q, _)| q.amount)
        .sum();
    assert!(block_pay > 0);

    let global = &contract.state().global;
    assert_eq!(global.perblock_bucket, 0);
    assert!(global.pervote_bucket >= 0);
    assert_eq!(global.total_unpaid_blocks, 0);
    assert_eq!(global.last_pervote_bucket_fill, at);
    let producer = contract.state().producers.get(&PRODA).unwrap();
    assert_eq!(producer.unpaid_blocks, 0);
    assert_eq!(producer.last_claim_time, at);
    assert!(balance(&null, PRODA) > block_pay);
}

#[test]
fn unregistered_producers_cannot_claim() {
    let (_null, mut contract) = setup(test_config());
    activate(&mut contract);
    contract
        .apply(PRODA, Action::UnregProd { producer: PRODA }, T0)
        .unwrap();
    let err = contract
        .apply(
            PRODA,
            Action::ClaimRewards { owner: PRODA },
            T0.plus(2 * SECONDS_PER_DAY),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ---------------------------------------------------------------------------
// 5. Governance
// ---------------------------------------------------------------------------

fn new_proposal(owner: AccountName, start_mode: StartMode) -> Action {
    Action::GocNewProp {
        owner,
        fee: sys(1_000_0000),
        proposal_name: "raise the ram fee".into(),
        proposal_content: "from 0.5% to 1%".into(),
        url: "https://example.org/p/1".into(),
        start_mode,
    }
}

#[test]
fn debug_start_modes_are_gated_by_config() {
    let (_null, mut contract) = setup(SystemConfig {
        allow_debug_start_modes: false,
        ..test_config()
    });
    contract.apply(ALICE, Action::GocStake { payer: ALICE }, T0).unwrap();
    let err = contract
        .apply(ALICE, new_proposal(ALICE, StartMode::SkipWait), T0)
        .unwrap_err();
    assert!(matches!(err, SystemError::DebugStartMode(StartMode::SkipWait)));
    contract
        .apply(ALICE, new_proposal(ALICE, StartMode::Normal), T0)
        .unwrap();
}

#[test]
fn governance_stake_is_locked() {
    let (_null, mut contract) = setup(test_config());
    contract.apply(ALICE, Action::GocStake { payer: ALICE }, T0).unwrap();
    let locked = contract.state().voters.get(&ALICE).unwrap().goc_staked;
    assert_eq!(locked, contract.state().global.goc_stake_limit);

    let err = contract
        .apply(ALICE, Action::GocStake { payer: ALICE }, T0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    activate(&mut contract);
    let err = contract
        .apply(ALICE, undelegate(ALICE, ALICE, 5_000_0000 + 1), T0)
        .unwrap_err();
    assert!(matches!(err, SystemError::GovernanceStakeLocked { .. }));
    contract
        .apply(ALICE, undelegate(ALICE, ALICE, 5_000_0000), T0)
        .unwrap();
}

#[test]
fn proposal_lifecycle_pays_reward_and_refunds_fee() {
    let (null, mut contract) = setup(test_config());
    contract.apply(ALICE, Action::GocStake { payer: ALICE }, T0).unwrap();
    activate(&mut contract);
    contract.apply(BOB, delegate(BOB, BOB, 1_000_0000), T0).unwrap();
    onblock(&mut contract, T0.plus(1), PRODA);

    contract
        .apply(ALICE, new_proposal(ALICE, StartMode::SkipWait), T0.plus(2))
        .unwrap();
    let id = contract.state().goc.proposals().next().unwrap().id;
    assert_eq!(balance(&null, GOC_ACCOUNT), 1_000_0000);

    let err = contract
        .apply(ALICE, Action::GocUnstake { receiver: ALICE }, T0.plus(3))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    contract
        .apply(BOB, Action::GocVote { voter: BOB, id, yea: true }, T0.plus(10))
        .unwrap();
    let action_fee = contract.state().global.goc_action_fee;
    assert_eq!(balance(&null, GOC_ACCOUNT), 1_000_0000 + action_fee);

    let bp_window = T0.plus(2 + 7 * SECONDS_PER_DAY);
    let err = contract
        .apply(BOB, Action::GocBpVote { bp: BOB, id, yea: true }, bp_window)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    contract
        .apply(PRODA, Action::GocBpVote { bp: PRODA, id, yea: true }, bp_window)
        .unwrap();

    let err = contract
        .apply(BOB, Action::GocSettle { caller: BOB, id }, bp_window.plus(7 * SECONDS_PER_DAY))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    onblock(&mut contract, bp_window.plus(7 * SECONDS_PER_DAY), PRODA);
    let proposal = contract.state().goc.proposal(id).unwrap();
    assert!(proposal.passed);
    assert!(proposal.is_settled());
    assert_eq!(proposal.reward, sys(action_fee));
    assert!(null
        .tokens
        .transfers_to(ALICE)
        .iter()
        .any(|(from, q, _)| *from == GOC_ACCOUNT && *q == sys(1_000_0000)));

    let before = balance(&null, ALICE);
    contract.apply(ALICE, Action::GocClaim { owner: ALICE }, bp_window.plus(8 * SECONDS_PER_DAY)).unwrap();
    assert_eq!(balance(&null, ALICE), before + action_fee);
    assert_eq!(balance(&null, GOC_ACCOUNT), 0);

    contract
        .apply(ALICE, Action::GocUnstake { receiver: ALICE }, bp_window.plus(8 * SECONDS_PER_DAY))
        .unwrap();
    assert_eq!(contract.state().voters.get(&ALICE).unwrap().goc_staked, 0);
    assert!(null.deferred.get(DeferredKey::Refund(ALICE)).is_some());
}

#[test]
fn failed_proposal_forfeits_its_fee() {
    let (null, mut contract) = setup(test_config());
    contract.apply(ALICE, Action::GocStake { payer: ALICE }, T0).unwrap();
    activate(&mut contract);
    contract.apply(BOB, delegate(BOB, BOB, 1_000_0000), T0).unwrap();

    contract
        .apply(ALICE, new_proposal(ALICE, StartMode::SkipWait), T0)
        .unwrap();
    let id = contract.state().goc.proposals().next().unwrap().id;
    contract
        .apply(BOB, Action::GocVote { voter: BOB, id, yea: false }, T0.plus(10))
        .unwrap();

    let end = T0.plus(14 * SECONDS_PER_DAY);
    contract
        .apply(ALICE, Action::GocSettle { caller: ALICE, id }, end)
        .unwrap();
    let proposal = contract.state().goc.proposal(id).unwrap();
    assert!(!proposal.passed);
    let global = &contract.state().global;
    assert_eq!(global.goc_voter_bucket, 1_000_0000 + global.goc_action_fee);
    assert!(null.tokens.transfers_to(ALICE).is_empty());

    let err = contract
        .apply(ALICE, Action::GocClaim { owner: ALICE }, end)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ---------------------------------------------------------------------------
// 6. Name auction
// ---------------------------------------------------------------------------

#[test]
fn auction_refunds_outbid_and_creates_the_account() {
    let (null, mut contract) = setup(test_config());
    activate(&mut contract);
    let goc = AccountName::from_static("goc");
    let alice_before = balance(&null, ALICE);

    let bid = |bidder, amount| Action::BidName {
        bidder,
        newname: goc,
        bid: sys(amount),
    };
    contract.apply(ALICE, bid(ALICE, 10_0000), T0).unwrap();
    contract.apply(BOB, bid(BOB, 20_0000), T0.plus(5)).unwrap();
    assert_eq!(balance(&null, NAMES_ACCOUNT), 30_0000);

    let ran = contract.run_deferred(T0.plus(5));
    assert_eq!(ran.len(), 1);
    assert!(ran[0].1.is_ok());
    assert_eq!(balance(&null, ALICE), alice_before);
    assert_eq!(balance(&null, NAMES_ACCOUNT), 20_0000);

    let err = contract
        .apply(BOB, Action::ClaimName { claimer: BOB, newname: goc, key: key(9) }, T0.plus(10))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfWindow);

    onblock(&mut contract, T0.plus(15 * SECONDS_PER_DAY), PRODA);
    assert!(contract.state().auction.bid_for(goc).unwrap().is_closed());

    let err = contract
        .apply(ALICE, bid(ALICE, 50_0000), T0.plus(15 * SECONDS_PER_DAY))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyClaimed);

    contract
        .apply(
            BOB,
            Action::ClaimName { claimer: BOB, newname: goc, key: key(9) },
            T0.plus(15 * SECONDS_PER_DAY),
        )
        .unwrap();
    let record = null.accounts.get(goc).unwrap();
    assert_eq!(record.creator, EOSIO);
    assert_eq!(record.key, key(9));
}

#[test]
fn outbid_fails_whole_when_refund_cannot_be_scheduled() {
    let (null, mut contract) = setup(test_config());
    let goc = AccountName::from_static("goc");
    let bid = |bidder, amount| Action::BidName {
        bidder,
        newname: goc,
        bid: sys(amount),
    };
    contract.apply(ALICE, bid(ALICE, 10_0000), T0).unwrap();
    let bob_before = balance(&null, BOB);
    let before = contract.state().save_state().unwrap();

    null.deferred.reject_tasks("deferred queue full");
    let err = contract.apply(BOB, bid(BOB, 20_0000), T0.plus(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Host);
    assert_eq!(balance(&null, BOB), bob_before);
    assert_eq!(balance(&null, NAMES_ACCOUNT), 10_0000);
    assert_eq!(contract.state().save_state().unwrap(), before);
    assert!(null.deferred.pending().is_empty());

    null.deferred.accept_tasks();
    contract.apply(BOB, bid(BOB, 20_0000), T0.plus(6)).unwrap();
    assert_eq!(balance(&null, NAMES_ACCOUNT), 30_0000);
}

#[test]
fn existing_accounts_cannot_be_bid_on() {
    let (null, mut contract) = setup(test_config());
    let err = contract
        .apply(
            BOB,
            Action::BidName {
                bidder: BOB,
                newname: ALICE,
                bid: sys(1_0000),
            },
            T0,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(null.tokens.applied().is_empty());
}

// ---------------------------------------------------------------------------
// 7. Persistence
// ---------------------------------------------------------------------------

#[test]
fn state_survives_save_and_load() {
    let (null, mut contract) = setup(test_config());
    activate(&mut contract);
    onblock(&mut contract, T0.plus(1), PRODA);

    let bytes = contract.state().save_state().unwrap();
    let restored = goc_system::SystemState::load_state(&bytes).unwrap();
    let mut resumed = SystemContract::from_state(test_config(), null.host(), restored).unwrap();

    assert_eq!(resumed.state().global, contract.state().global);
    assert_eq!(resumed.state().producers.get(&PRODA).unwrap().unpaid_blocks, 1);
    resumed.apply(BOB, delegate(BOB, BOB, 1_0000), T0.plus(5)).unwrap();
    assert_eq!(resumed.state().voters.get(&BOB).unwrap().staked, 2_0000);
}
