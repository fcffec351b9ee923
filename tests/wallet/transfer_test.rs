// =============================================================================
// INTEGRATION TESTS - TRANSFER ENGINE
// validate -> derive -> balance -> fee -> submit -> confirm
// =============================================================================

use crate::common::{ConfirmBehavior, StubLedger, ONE_ETHER, ONE_GWEI, TEST_JUNK, TEST_JUNK_ADDRESS_0};
use hd_transfer::config::WalletConfig;
use hd_transfer::services::wallet::{KeyDeriver, TransferEngine, TransferRequest, WalletError};
use sha3::{Digest, Keccak256};
use std::sync::Arc;
use std::time::Duration;

const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// 21,000 work units at 1 gwei
const TRANSFER_FEE: u128 = 21_000 * ONE_GWEI;

fn engine(ledger: &Arc<StubLedger>) -> TransferEngine {
    TransferEngine::new(KeyDeriver::new(), ledger.clone(), WalletConfig::default())
}

fn request(recipient: &str, amount: &str) -> TransferRequest {
    TransferRequest {
        signer_seed_phrase: TEST_JUNK.to_string(),
        signer_index: 0,
        recipient_address: recipient.to_string(),
        amount_display: amount.to_string(),
    }
}

// =============================================================================
// TEST 1: Happy Path
// One call per step, exactly one submission, result carries the block
// =============================================================================

#[tokio::test]
async fn test_successful_transfer() {
    let ledger = Arc::new(
        StubLedger::new()
            .with_balance(TEST_JUNK_ADDRESS_0, 10 * ONE_ETHER)
            .with_nonce(3),
    );

    let result = engine(&ledger).transfer(&request(RECIPIENT, "1.5")).await.unwrap();

    assert_eq!(result.confirmed_block, 42);
    assert!(result.transaction_hash.starts_with("0x"));
    assert_eq!(result.transaction_hash.len(), 66);

    assert_eq!(StubLedger::count(&ledger.balance_calls), 1);
    assert_eq!(StubLedger::count(&ledger.fee_calls), 1);
    assert_eq!(StubLedger::count(&ledger.nonce_calls), 1);
    assert_eq!(StubLedger::count(&ledger.submit_calls), 1);
    assert_eq!(StubLedger::count(&ledger.confirm_calls), 1);

    let submitted = ledger.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert!(submitted[0].starts_with("0xf8"));
    // recipient bytes are embedded in the signed payload
    assert!(submitted[0].contains("70997970c51812dc3a010c7d01b50e0d17dc79c8"));
}

#[tokio::test]
async fn test_exact_balance_covers_amount_and_fee() {
    let ledger = Arc::new(StubLedger::new().with_balance(TEST_JUNK_ADDRESS_0, ONE_ETHER + TRANSFER_FEE));
    let result = engine(&ledger).transfer(&request(RECIPIENT, "1")).await;
    assert!(result.is_ok());
}

// =============================================================================
// TEST 2: Affordability
// amount > balance fails before the fee lookup;
// amount <= balance < amount + fee fails after it
// =============================================================================

#[tokio::test]
async fn test_amount_exceeds_balance() {
    let ledger = Arc::new(StubLedger::new().with_balance(TEST_JUNK_ADDRESS_0, ONE_ETHER));

    let result = engine(&ledger).transfer(&request(RECIPIENT, "2")).await;

    match result {
        Err(WalletError::InsufficientFunds { needed, available }) => {
            assert_eq!(needed, 2 * ONE_ETHER);
            assert_eq!(available, ONE_ETHER);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }
    assert_eq!(StubLedger::count(&ledger.fee_calls), 0);
    assert_eq!(StubLedger::count(&ledger.submit_calls), 0);
}

#[tokio::test]
async fn test_amount_plus_fee_exceeds_balance() {
    let ledger = Arc::new(StubLedger::new().with_balance(TEST_JUNK_ADDRESS_0, ONE_ETHER));

    let result = engine(&ledger).transfer(&request(RECIPIENT, "1")).await;

    match result {
        Err(WalletError::InsufficientFunds { needed, available }) => {
            assert_eq!(needed, ONE_ETHER + TRANSFER_FEE);
            assert_eq!(available, ONE_ETHER);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }
    assert_eq!(StubLedger::count(&ledger.fee_calls), 1);
    assert_eq!(StubLedger::count(&ledger.nonce_calls), 0);
    assert_eq!(StubLedger::count(&ledger.submit_calls), 0);
}

// =============================================================================
// TEST 3: Validation Precedes Network Calls
// =============================================================================

#[tokio::test]
async fn test_malformed_recipient_makes_no_calls() {
    let ledger = Arc::new(StubLedger::new().with_default_balance(10 * ONE_ETHER));

    for recipient in ["", "0x1234", "742d35Cc6634C0532925a3b844Bc9e7595f5bE12", "0x70997970c51812dc3A010C7d01b50e0d17dc79C8"] {
        let result = engine(&ledger).transfer(&request(recipient, "1")).await;
        assert!(
            matches!(result, Err(WalletError::InvalidInput(_))),
            "recipient {:?} gave {:?}",
            recipient,
            result
        );
    }
    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn test_malformed_amount_makes_no_calls() {
    let ledger = Arc::new(StubLedger::new().with_default_balance(10 * ONE_ETHER));

    for amount in ["-1", "abc", "", "1.0000000000000000001"] {
        let result = engine(&ledger).transfer(&request(RECIPIENT, amount)).await;
        assert!(matches!(result, Err(WalletError::InvalidInput(_))), "amount {:?}", amount);
    }
    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn test_invalid_signer_phrase_makes_no_calls() {
    let ledger = Arc::new(StubLedger::new().with_default_balance(10 * ONE_ETHER));
    let mut req = request(RECIPIENT, "1");
    req.signer_seed_phrase = "test test test".to_string();

    let result = engine(&ledger).transfer(&req).await;

    assert!(matches!(result, Err(WalletError::InvalidSeedPhrase(_))));
    assert_eq!(ledger.total_calls(), 0);
}

// =============================================================================
// TEST 4: Remote Failures
// Read failures stop before submission; rejection and timeout stay distinct
// =============================================================================

#[tokio::test]
async fn test_balance_network_error_is_hard_stop() {
    let ledger = Arc::new(StubLedger::new().failing_for(TEST_JUNK_ADDRESS_0));

    let result = engine(&ledger).transfer(&request(RECIPIENT, "1")).await;

    assert!(matches!(result, Err(WalletError::Network(_))));
    assert_eq!(StubLedger::count(&ledger.submit_calls), 0);
}

#[tokio::test]
async fn test_rejected_transaction() {
    let ledger = Arc::new(
        StubLedger::new()
            .with_balance(TEST_JUNK_ADDRESS_0, 10 * ONE_ETHER)
            .rejecting("nonce too low"),
    );

    let result = engine(&ledger).transfer(&request(RECIPIENT, "1")).await;

    match result {
        Err(WalletError::RejectedTransaction(reason)) => assert_eq!(reason, "nonce too low"),
        other => panic!("expected RejectedTransaction, got {:?}", other),
    }
    assert_eq!(StubLedger::count(&ledger.submit_calls), 1);
    assert_eq!(StubLedger::count(&ledger.confirm_calls), 0);
}

#[tokio::test]
async fn test_confirmation_timeout_is_not_rejection() {
    let ledger = Arc::new(
        StubLedger::new()
            .with_balance(TEST_JUNK_ADDRESS_0, 10 * ONE_ETHER)
            .confirming(ConfirmBehavior::Timeout),
    );

    let result = engine(&ledger).transfer(&request(RECIPIENT, "1")).await;

    let err = result.unwrap_err();
    assert!(matches!(err, WalletError::Timeout(_)), "got {:?}", err);
    assert!(!matches!(err, WalletError::RejectedTransaction(_)));
    assert!(err.is_ambiguous());
    assert_eq!(StubLedger::count(&ledger.submit_calls), 1);
}

#[tokio::test]
async fn test_lost_submit_response_is_ambiguous() {
    let ledger = Arc::new(
        StubLedger::new()
            .with_balance(TEST_JUNK_ADDRESS_0, 10 * ONE_ETHER)
            .losing_submit_response("connection reset after request sent"),
    );

    let err = engine(&ledger).transfer(&request(RECIPIENT, "1")).await.unwrap_err();

    assert!(matches!(err, WalletError::Timeout(_)), "got {:?}", err);
    assert!(err.is_ambiguous());
    assert_eq!(StubLedger::count(&ledger.submit_calls), 1);
    assert_eq!(StubLedger::count(&ledger.confirm_calls), 0);

    // the locally computed hash is reported so the caller can look it up
    let submitted = ledger.submitted.lock().unwrap()[0].clone();
    let raw = hex::decode(submitted.trim_start_matches("0x")).unwrap();
    let local_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw)));
    assert!(err.to_string().contains(&local_hash));
}

#[tokio::test]
async fn test_receipt_poll_error_is_ambiguous() {
    let ledger = Arc::new(
        StubLedger::new()
            .with_balance(TEST_JUNK_ADDRESS_0, 10 * ONE_ETHER)
            .confirming(ConfirmBehavior::RpcError("upstream 502 while polling receipt".to_string())),
    );

    let err = engine(&ledger).transfer(&request(RECIPIENT, "1")).await.unwrap_err();

    assert!(matches!(err, WalletError::Timeout(_)), "got {:?}", err);
    assert!(err.is_ambiguous());
    assert!(!matches!(err, WalletError::Network(_)));
    assert_eq!(StubLedger::count(&ledger.submit_calls), 1);
}

#[tokio::test]
async fn test_read_errors_before_submit_are_not_ambiguous() {
    let ledger = Arc::new(StubLedger::new().failing_for(TEST_JUNK_ADDRESS_0));

    let err = engine(&ledger).transfer(&request(RECIPIENT, "1")).await.unwrap_err();

    assert!(!err.is_ambiguous());
    assert_eq!(StubLedger::count(&ledger.submit_calls), 0);
}

#[tokio::test]
async fn test_caller_deadline_bounds_confirmation_wait() {
    let ledger = Arc::new(
        StubLedger::new()
            .with_balance(TEST_JUNK_ADDRESS_0, 10 * ONE_ETHER)
            .confirming(ConfirmBehavior::Hang),
    );
    let config = WalletConfig {
        confirmation_timeout: Duration::from_millis(50),
        ..WalletConfig::default()
    };
    let engine = TransferEngine::new(KeyDeriver::new(), ledger.clone(), config);

    let result = engine.transfer(&request(RECIPIENT, "1")).await;

    assert!(matches!(result, Err(WalletError::Timeout(_))));
    assert_eq!(StubLedger::count(&ledger.submit_calls), 1);
    assert_eq!(StubLedger::count(&ledger.confirm_calls), 1);
}
