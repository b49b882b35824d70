//! End-to-end runs through the public API against `MockProvider`.

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use std::collections::HashMap;

use transferwisely::alerts::{Mailer, REMINDER_SUBJECT};
use transferwisely::config::{AppConfig, Environment, FileSettings};
use transferwisely::engine::cycle::{check_and_process, run_once, CycleReport};
use transferwisely::engine::expiry::ExpiryOutcome;
use transferwisely::engine::rebooker::RebookOutcome;
use transferwisely::types::WiselyError;

use crate::mock_provider::{pending_transfer, Call, MockProvider, RecordingMailer};

fn config(margin: &str) -> AppConfig {
    let vars: HashMap<&str, String> = [
        ("ENV", "sandbox".to_string()),
        ("API_TOKEN", "token-123".to_string()),
        ("MARGIN", margin.to_string()),
    ]
    .into_iter()
    .collect();
    AppConfig::from_lookup(FileSettings::default(), |k| vars.get(k).cloned()).unwrap()
}

#[tokio::test]
async fn test_empty_transfer_list_stops_the_run() {
    let provider = MockProvider::new(vec![], dec!(1.20));
    let mailer = RecordingMailer::default();

    let report = run_once(&provider, Some(&mailer as &dyn Mailer), &config("0"), Utc::now()).await;

    assert!(report.rebooking.is_none());
    match report.expiry {
        ExpiryOutcome::Failed { reason } => assert!(reason.contains("no current transfer")),
        other => panic!("expected failure, got {other:?}"),
    }
    // One listing per half of the run, nothing else.
    assert_eq!(provider.calls(), vec![Call::ListTransfers, Call::ListTransfers]);
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_best_rate_transfer_is_rebooked_with_its_amount() {
    let provider = MockProvider::new(
        vec![
            pending_transfer(1, dec!(1.08)),
            pending_transfer(2, dec!(1.10)),
            pending_transfer(3, dec!(1.09)),
        ],
        dec!(1.12),
    );

    let report = check_and_process(&provider, dec!(0.01)).await.unwrap();

    let outcome = match report {
        CycleReport::Rebooked(outcome) => outcome,
        other => panic!("expected rebooking, got {other:?}"),
    };
    assert!(outcome.is_complete());
    assert_eq!(outcome.new_transfer().source_amount, dec!(1004.5));
    assert_eq!(provider.cancelled(), vec![2]);

    let quote = &provider.quote_requests()[0];
    assert_eq!(quote.source_amount, dec!(1004.5));
    assert_eq!(quote.profile, 42);
    assert_eq!(quote.source_currency, "EUR");
    assert_eq!(quote.target_currency, "USD");

    let created = &provider.transfer_requests()[0];
    assert_eq!(created.quote_uuid, "quote-new");
    assert_eq!(created.target_account, 9001);
    assert_eq!(created.details.reference, "invoice 17");

    assert_eq!(
        provider.calls(),
        vec![
            Call::ListTransfers,
            Call::Quote,
            Call::LiveRates,
            Call::CreateQuote,
            Call::CreateTransfer,
            Call::CancelTransfer,
        ]
    );
}

#[tokio::test]
async fn test_rate_below_margin_books_nothing() {
    let provider = MockProvider::new(vec![pending_transfer(1, dec!(1.10))], dec!(1.105));

    let report = check_and_process(&provider, dec!(0.01)).await.unwrap();

    assert!(matches!(report, CycleReport::NoAction { .. }));
    assert_eq!(provider.count(Call::CreateQuote), 0);
    assert_eq!(provider.count(Call::CreateTransfer), 0);
    assert_eq!(provider.count(Call::CancelTransfer), 0);
}

#[tokio::test]
async fn test_failed_cancel_leaves_both_transfers_open() {
    let provider = MockProvider::new(vec![pending_transfer(5, dec!(1.10))], dec!(1.15));
    provider.fail(Call::CancelTransfer, 422);

    let report = check_and_process(&provider, dec!(0)).await.unwrap();

    match report {
        CycleReport::Rebooked(RebookOutcome::OldTransferStillOpen {
            new_transfer,
            old_transfer_id,
            cancel_error,
        }) => {
            assert_eq!(new_transfer.id, 777);
            assert_eq!(old_transfer_id, 5);
            assert!(cancel_error.contains("422"));
        }
        other => panic!("expected partial rebooking, got {other:?}"),
    }
    assert_eq!(provider.cancelled(), vec![5]);
}

#[tokio::test]
async fn test_create_failure_never_cancels() {
    let provider = MockProvider::new(vec![pending_transfer(5, dec!(1.10))], dec!(1.15));
    provider.fail(Call::CreateTransfer, 500);

    let err = check_and_process(&provider, dec!(0)).await.unwrap_err();

    assert!(matches!(err, WiselyError::Status { status: 500, .. }));
    assert!(provider.cancelled().is_empty());
}

#[tokio::test]
async fn test_reminder_sent_when_quote_expires_within_36_hours() {
    let now = Utc::now();
    let provider = MockProvider::new(vec![pending_transfer(8, dec!(1.10))], dec!(1.10))
        .expiring_at(now + Duration::hours(35));
    let mailer = RecordingMailer::default();

    let report = run_once(&provider, Some(&mailer as &dyn Mailer), &config("0"), now).await;

    assert!(matches!(report.expiry, ExpiryOutcome::Sent { transfer_id: 8, .. }));
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, REMINDER_SUBJECT);
    assert!(sent[0].1.contains("Transfer ID: 8"));
    assert!(sent[0].1.contains("{EUR} --> {USD}"));
    assert!(sent[0].1.contains("Booked Rate: 1.10"));
    assert!(sent[0].1.contains("Amount: EUR 1004.5"));
}

#[tokio::test]
async fn test_no_reminder_when_quote_expires_in_40_hours() {
    let now = Utc::now();
    let provider = MockProvider::new(vec![pending_transfer(8, dec!(1.10))], dec!(1.10))
        .expiring_at(now + Duration::hours(40));
    let mailer = RecordingMailer::default();

    let report = run_once(&provider, Some(&mailer as &dyn Mailer), &config("0"), now).await;

    assert!(matches!(report.expiry, ExpiryOutcome::NotDue { .. }));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_unreadable_expiry_still_rebooks() {
    let provider = MockProvider::new(vec![pending_transfer(8, dec!(1.10))], dec!(1.20))
        .with_raw_expiry("2026-10-18 12:00:00");
    let mailer = RecordingMailer::default();

    let report = run_once(&provider, Some(&mailer as &dyn Mailer), &config("0"), Utc::now()).await;

    match report.rebooking {
        Some(CycleReport::Rebooked(outcome)) => assert!(outcome.is_complete()),
        other => panic!("expected rebooking, got {other:?}"),
    }
    match report.expiry {
        ExpiryOutcome::Failed { reason } => assert!(reason.contains("rateExpirationTime")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(provider.cancelled(), vec![8]);
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_expiry_check_fetches_quote_once() {
    let now = Utc::now();
    let provider = MockProvider::new(vec![pending_transfer(8, dec!(1.10))], dec!(1.10))
        .expiring_at(now + Duration::hours(40));

    run_once(&provider, None, &config("0"), now).await;

    // Rebooking pass and expiry check each list once and fetch one quote.
    assert_eq!(provider.count(Call::ListTransfers), 2);
    assert_eq!(provider.count(Call::Quote), 2);
}

#[tokio::test]
async fn test_mail_failure_does_not_affect_rebooking() {
    let now = Utc::now();
    let provider = MockProvider::new(vec![pending_transfer(8, dec!(1.10))], dec!(1.20))
        .expiring_at(now + Duration::hours(1));
    let mailer = RecordingMailer::failing();

    let report = run_once(&provider, Some(&mailer as &dyn Mailer), &config("0.05"), now).await;

    assert!(matches!(report.rebooking, Some(CycleReport::Rebooked(_))));
    assert!(matches!(report.expiry, ExpiryOutcome::Failed { .. }));
}

#[test]
fn test_missing_credentials_rejected_before_any_call() {
    let only_env: HashMap<&str, String> = [("ENV", "production".to_string())].into_iter().collect();
    let err = AppConfig::from_lookup(FileSettings::default(), |k| only_env.get(k).cloned())
        .unwrap_err();
    assert!(matches!(err, WiselyError::MissingCredentials));

    let only_token: HashMap<&str, String> =
        [("API_TOKEN", "abc".to_string())].into_iter().collect();
    let err = AppConfig::from_lookup(FileSettings::default(), |k| only_token.get(k).cloned())
        .unwrap_err();
    assert!(matches!(err, WiselyError::MissingCredentials));
}

#[test]
fn test_sandbox_config_from_environment() {
    let cfg = config("0.02");
    assert_eq!(cfg.environment, Environment::Sandbox);
    assert_eq!(cfg.margin, dec!(0.02));
    assert!(cfg.mail.is_none());
}
