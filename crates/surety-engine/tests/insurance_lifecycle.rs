//! End-to-end insurance flow: admission, flight registration, purchase, consensus,
//! crediting and withdrawal.

use assert_matches::assert_matches;
use surety_core::{Amount, FlightKey, FlightStatus, SuretyError, SuretyEvent};
use surety_engine::test_utils::{
    airline, engine_with_funded_airlines, holders, passenger, register_fixture_flight,
    register_oracles, report_status, test_engine, FLIGHT_TIMESTAMP,
};
use surety_engine::{NominationOutcome, ResponseOutcome};

fn one_and_a_half() -> Amount {
    "1.5".parse().unwrap()
}

#[test]
fn delayed_flight_pays_one_and_a_half_premium() {
    let mut engine = test_engine();
    let fee = Amount::units(10);

    // A1 funds and admits A2..A4 directly.
    engine.fund_airline(airline(1), fee).unwrap();
    for n in 2..=4 {
        engine
            .nominate_airline(airline(1), &format!("Airline {n}"), airline(n), 0)
            .unwrap();
    }

    // A5 now needs a strict majority of the four registered airlines.
    assert_matches!(
        engine
            .nominate_airline(airline(1), "Airline 5", airline(5), 0)
            .unwrap(),
        NominationOutcome::VoteRecorded { votes: 1, .. }
    );
    engine.fund_airline(airline(2), fee).unwrap();
    engine
        .nominate_airline(airline(2), "Airline 5", airline(5), 0)
        .unwrap();
    assert!(!engine.is_airline_registered(&airline(5)));
    engine.fund_airline(airline(3), fee).unwrap();
    engine
        .nominate_airline(airline(3), "Airline 5", airline(5), 0)
        .unwrap();
    assert!(engine.is_airline_registered(&airline(5)));

    // A2 registers flight 5678 and P1 insures it for one unit.
    let flight = engine
        .register_flight(airline(2), "5678", "ZRH", "JFK", FLIGHT_TIMESTAMP)
        .unwrap();
    assert_eq!(flight, FlightKey::new(airline(2), "5678", FLIGHT_TIMESTAMP));
    engine
        .purchase_insurance(passenger(1), &flight, Amount::units(1))
        .unwrap();
    assert!(engine.is_insured(&passenger(1), &flight));

    // Three oracles holding the request index report LateAirline.
    register_oracles(&mut engine, 10);
    let index = engine
        .request_flight_status(passenger(1), &flight, FLIGHT_TIMESTAMP + 7_200)
        .unwrap();
    let reporters = holders(&engine, index);
    assert_eq!(reporters.len(), 3);
    let outcomes: Vec<ResponseOutcome> = reporters
        .iter()
        .map(|oracle| {
            engine
                .submit_oracle_response(*oracle, &flight, index, FlightStatus::LateAirline)
                .unwrap()
        })
        .collect();
    assert_eq!(
        outcomes.last(),
        Some(&ResponseOutcome::Finalized {
            status: FlightStatus::LateAirline
        })
    );
    assert_eq!(
        engine.flight(&flight).map(|f| f.status),
        Some(FlightStatus::LateAirline)
    );

    assert_eq!(engine.balance_of(&passenger(1)), one_and_a_half());
    assert_eq!(engine.withdraw(passenger(1)).unwrap(), one_and_a_half());
    assert_eq!(engine.balance_of(&passenger(1)), Amount::ZERO);
    assert_matches!(
        engine.withdraw(passenger(1)),
        Err(SuretyError::NothingToWithdraw { .. })
    );
}

#[test]
fn finalization_notifications_follow_credits() {
    let mut engine = engine_with_funded_airlines();
    let flight = register_fixture_flight(&mut engine);
    engine
        .purchase_insurance(passenger(1), &flight, Amount::units(1))
        .unwrap();
    engine
        .purchase_insurance(passenger(2), &flight, "0.5".parse().unwrap())
        .unwrap();
    register_oracles(&mut engine, 10);
    engine.drain_events();

    report_status(&mut engine, &flight, FlightStatus::LateAirline, 3);

    let events = engine.drain_events();
    let names: Vec<&str> = events.iter().map(SuretyEvent::name).collect();
    assert_eq!(
        names,
        vec![
            "oracle_request_opened",
            "oracle_report_accepted",
            "oracle_report_accepted",
            "oracle_report_accepted",
            "payout_credited",
            "payout_credited",
            "flight_status_finalized",
        ]
    );
    assert_eq!(engine.balance_of(&passenger(2)), "0.75".parse().unwrap());
    assert_eq!(engine.treasury().credited, "2.25".parse().unwrap());
}

#[test]
fn on_time_flight_credits_nothing() {
    let mut engine = engine_with_funded_airlines();
    let flight = register_fixture_flight(&mut engine);
    engine
        .purchase_insurance(passenger(1), &flight, Amount::units(1))
        .unwrap();
    register_oracles(&mut engine, 10);

    report_status(&mut engine, &flight, FlightStatus::OnTime, 3);

    assert_eq!(
        engine.flight(&flight).map(|f| f.status),
        Some(FlightStatus::OnTime)
    );
    assert_eq!(engine.balance_of(&passenger(1)), Amount::ZERO);
    assert!(!engine.policy(&passenger(1), &flight).unwrap().payout_credited);
}

#[test]
fn late_responses_do_not_credit_twice() {
    let mut engine = engine_with_funded_airlines();
    let flight = register_fixture_flight(&mut engine);
    engine
        .purchase_insurance(passenger(1), &flight, Amount::units(1))
        .unwrap();
    register_oracles(&mut engine, 10);
    let index = report_status(&mut engine, &flight, FlightStatus::LateAirline, 3);
    let before = engine.clone();

    // Any further report against the finalized request is a no-op.
    let late = holders(&engine, index)[0];
    let outcome = engine
        .submit_oracle_response(late, &flight, index, FlightStatus::LateAirline)
        .unwrap();
    assert_matches!(outcome, ResponseOutcome::Ignored { .. });
    assert_eq!(engine, before);
    assert_eq!(engine.balance_of(&passenger(1)), one_and_a_half());
}

#[test]
fn purchase_rules() {
    let mut engine = engine_with_funded_airlines();
    let flight = register_fixture_flight(&mut engine);
    let unknown = FlightKey::new(airline(2), "0000", FLIGHT_TIMESTAMP);

    assert_matches!(
        engine.purchase_insurance(passenger(1), &unknown, Amount::units(1)),
        Err(SuretyError::FlightNotRegistered { .. })
    );
    assert_matches!(
        engine.purchase_insurance(passenger(1), &flight, Amount::ZERO),
        Err(SuretyError::PremiumRequired)
    );
    assert_matches!(
        engine.purchase_insurance(passenger(1), &flight, "1.000000000000000001".parse().unwrap()),
        Err(SuretyError::PremiumExceedsCap { .. })
    );
    engine
        .purchase_insurance(passenger(1), &flight, Amount::units(1))
        .unwrap();
    assert_matches!(
        engine.purchase_insurance(passenger(1), &flight, Amount::units(1)),
        Err(SuretyError::AlreadyInsured { .. })
    );
    assert_eq!(engine.treasury().premiums_escrowed, Amount::units(1));
}

#[test]
fn purchase_after_finalization_rejected() {
    let mut engine = engine_with_funded_airlines();
    let flight = register_fixture_flight(&mut engine);
    register_oracles(&mut engine, 10);
    report_status(&mut engine, &flight, FlightStatus::LateWeather, 3);

    assert_matches!(
        engine.purchase_insurance(passenger(1), &flight, Amount::units(1)),
        Err(SuretyError::FlightStatusFinalized { .. })
    );
}

#[test]
fn flights_require_funded_airline_and_unique_key() {
    let mut engine = test_engine();
    assert_matches!(
        engine.register_flight(airline(1), "1234", "AAA", "BBB", 1),
        Err(SuretyError::NotFunded { .. })
    );
    engine.fund_airline(airline(1), Amount::units(10)).unwrap();
    engine
        .register_flight(airline(1), "1234", "AAA", "BBB", 1)
        .unwrap();
    assert_matches!(
        engine.register_flight(airline(1), "1234", "AAA", "BBB", 1),
        Err(SuretyError::DuplicateFlight { .. })
    );
    assert_eq!(engine.flights_of(&airline(1)).len(), 1);
}
