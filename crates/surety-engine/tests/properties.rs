//! Property tests over arbitrary transaction sequences.

use proptest::prelude::*;
use surety_core::{AccountId, Amount, FlightKey, FlightStatus, SuretyError};
use surety_engine::test_utils::{
    airline, engine_with_funded_airlines, oracle, passenger, register_fixture_flight,
    register_oracles, FLIGHT_TIMESTAMP,
};
use surety_engine::{NominationOutcome, SuretyEngine, Transaction};

fn actor() -> impl Strategy<Value = AccountId> {
    prop_oneof![
        (1usize..=6).prop_map(airline),
        (0usize..4).prop_map(passenger),
        (0usize..12).prop_map(oracle),
    ]
}

fn flight_key() -> impl Strategy<Value = FlightKey> {
    prop_oneof![
        Just(FlightKey::new(airline(2), "5678", FLIGHT_TIMESTAMP)),
        Just(FlightKey::new(airline(3), "9999", 1)),
    ]
}

fn status() -> impl Strategy<Value = FlightStatus> {
    proptest::sample::select(FlightStatus::ALL.to_vec())
}

fn amount() -> impl Strategy<Value = Amount> {
    prop_oneof![
        Just(Amount::ZERO),
        Just(Amount::units(1)),
        Just(Amount::units(10)),
        (0u128..3_000_000_000_000_000_000).prop_map(Amount::from_base_units),
    ]
}

fn transaction() -> impl Strategy<Value = Transaction> {
    prop_oneof![
        (actor(), amount()).prop_map(|(caller, value)| Transaction::FundAirline { caller, value }),
        (actor(), 1usize..=6).prop_map(|(caller, n)| Transaction::NominateAirline {
            caller,
            name: format!("Airline {n}"),
            candidate: airline(n),
            timestamp: 0,
        }),
        (actor(), prop_oneof![Just("5678"), Just("9999")], 0u64..3).prop_map(
            |(caller, designator, timestamp)| Transaction::RegisterFlight {
                caller,
                designator: designator.to_string(),
                from: "AAA".to_string(),
                to: "BBB".to_string(),
                timestamp,
            }
        ),
        (actor(), flight_key(), amount()).prop_map(|(caller, flight, premium)| {
            Transaction::PurchaseInsurance {
                caller,
                flight,
                premium,
            }
        }),
        actor().prop_map(|caller| Transaction::Withdraw { caller }),
        (actor(), amount()).prop_map(|(caller, fee)| Transaction::RegisterOracle { caller, fee }),
        (actor(), flight_key(), 0u64..10_000).prop_map(|(caller, flight, timestamp)| {
            Transaction::RequestFlightStatus {
                caller,
                flight,
                timestamp,
            }
        }),
        (actor(), flight_key(), 0u8..12, status()).prop_map(|(caller, flight, index, status)| {
            Transaction::SubmitOracleResponse {
                caller,
                flight,
                index,
                status,
            }
        }),
        (actor(), flight_key(), 0u64..10_000).prop_map(|(caller, flight, timestamp)| {
            Transaction::ExpireStatusRequest {
                caller,
                flight,
                timestamp,
            }
        }),
    ]
}

/// Engine with funded airlines, ten oracles and one insured flight.
fn seeded_engine() -> SuretyEngine {
    let mut engine = engine_with_funded_airlines();
    let flight = register_fixture_flight(&mut engine);
    register_oracles(&mut engine, 10);
    for n in 0..2 {
        engine
            .purchase_insurance(passenger(n), &flight, Amount::units(1))
            .unwrap();
    }
    engine.drain_events();
    engine
}

fn outstanding_balances(engine: &SuretyEngine) -> Amount {
    let accounts = (1..=6)
        .map(airline)
        .chain((0..4).map(passenger))
        .chain((0..12).map(oracle));
    accounts
        .map(|key| engine.balance_of(&key))
        .fold(Amount::ZERO, |acc, b| acc.checked_add(b).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn failed_transactions_leave_no_trace(txs in proptest::collection::vec(transaction(), 1..40)) {
        let mut engine = seeded_engine();
        for tx in txs {
            let snapshot = engine.clone();
            if engine.apply(tx).is_err() {
                prop_assert_eq!(&engine, &snapshot);
            }
        }
    }

    #[test]
    fn credited_balances_match_treasury(txs in proptest::collection::vec(transaction(), 1..60)) {
        let mut engine = seeded_engine();
        for tx in txs {
            let _ = engine.apply(tx);
            prop_assert_eq!(engine.treasury().outstanding(), outstanding_balances(&engine));
            prop_assert!(engine.treasury().withdrawn <= engine.treasury().credited);
        }
    }

    #[test]
    fn paused_engine_rejects_every_mutation(tx in transaction()) {
        let mut engine = seeded_engine();
        let owner = engine.owner();
        engine.set_operational(owner, false).unwrap();
        let snapshot = engine.clone();
        prop_assert_eq!(engine.apply(tx), Err(SuretyError::NotOperational));
        prop_assert_eq!(&engine, &snapshot);
    }

    #[test]
    fn registration_iff_strict_majority(voters in proptest::collection::vec(1usize..=4, 1..12)) {
        let mut engine = engine_with_funded_airlines();
        let mut distinct = std::collections::BTreeSet::new();
        for voter in voters {
            let outcome = engine
                .nominate_airline(airline(voter), "Airline 5", airline(5), 0);
            match outcome {
                Ok(NominationOutcome::Registered { votes, .. }) => {
                    distinct.insert(voter);
                    prop_assert_eq!(votes, distinct.len());
                    prop_assert!(votes * 2 > 4);
                    break;
                }
                Ok(NominationOutcome::VoteRecorded { votes, .. }) => {
                    distinct.insert(voter);
                    prop_assert_eq!(votes, distinct.len());
                    prop_assert!(votes * 2 <= 4);
                }
                Ok(NominationOutcome::DuplicateVote { votes, .. }) => {
                    prop_assert!(distinct.contains(&voter));
                    prop_assert_eq!(votes, distinct.len());
                }
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
        }
        prop_assert_eq!(engine.is_airline_registered(&airline(5)), distinct.len() >= 3);
    }
}
