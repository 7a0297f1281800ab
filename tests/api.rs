//! End-to-end tests of the HTTP API against an in-memory chain.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use treasury_engine::blockchain::mock::{MockChain, TEST_TREASURY};
use treasury_engine::claims::targets::TARGET_CONTRACTS;

mod common;
use common::{eth, start_service, start_service_with};

const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

fn funded_chain(treasury_eth: f64) -> Arc<MockChain> {
    let chain = Arc::new(MockChain::new(1));
    chain.set_balance(TEST_TREASURY, eth(treasury_eth));
    chain
}

#[tokio::test]
async fn test_health_is_a_pure_read() {
    let chain = funded_chain(1.0);
    chain.set_balance(TARGET_CONTRACTS[0], eth(0.5));
    let service = start_service(Some(chain.clone())).await;

    let mut bodies = Vec::new();
    for path in ["/health", "/api/health"] {
        let res = service.client.get(service.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200);
        assert!(res.headers().contains_key("x-request-id"));
        bodies.push(res.json::<Value>().await.unwrap());
    }

    let (a, b) = (&bodies[0], &bodies[1]);
    assert_eq!(a["status"], "online");
    assert_eq!(a["network"], "MAINNET");
    assert_eq!(a["chain_id"], 1);
    assert_eq!(a["treasury_eth_balance"], 1.0);
    assert_eq!(a["can_withdraw"], true);
    for key in ["treasury_eth_balance", "total_earned_eth", "contract_balances", "block_number"] {
        assert_eq!(a[key], b[key], "{key} changed between reads");
    }
    assert!(chain.sent_calls().is_empty());
}

#[tokio::test]
async fn test_degraded_service_answers_503() {
    let service = start_service(None).await;

    let res = service.client.get(service.url("/status")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Treasury service not initialized");

    let res = service
        .client
        .post(service.url("/withdraw"))
        .json(&json!({ "userWallet": RECIPIENT, "amountETH": 0.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
}

#[tokio::test]
async fn test_withdraw_to_invalid_address_sends_nothing() {
    let chain = funded_chain(5.0);
    let service = start_service(Some(chain.clone())).await;

    let res = service
        .client
        .post(service.url("/api/withdraw"))
        .json(&json!({ "userWallet": "0x1234", "amountETH": 0.5 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Invalid address"));
    assert!(chain.sent_calls().is_empty());
}

#[tokio::test]
async fn test_withdraw_rejects_out_of_range_amounts() {
    let chain = funded_chain(50.0);
    let service = start_service(Some(chain.clone())).await;

    for amount in [0.0, -1.0, 10.5] {
        let res = service
            .client
            .post(service.url("/api/claim/earnings"))
            .json(&json!({ "userWallet": RECIPIENT, "amountETH": amount }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "amount {amount} should be rejected");
    }
    assert!(chain.sent_calls().is_empty());
}

#[tokio::test]
async fn test_withdraw_requires_gas_reserve() {
    let chain = funded_chain(0.5005);
    let service = start_service(Some(chain.clone())).await;

    let res = service
        .client
        .post(service.url("/withdraw"))
        .json(&json!({ "userWallet": RECIPIENT, "amountETH": 0.5 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Insufficient"));
    assert!(chain.sent_calls().is_empty());
}

#[tokio::test]
async fn test_withdraw_and_fund_contract() {
    let chain = funded_chain(2.0);
    let service = start_service(Some(chain.clone())).await;

    let res = service
        .client
        .post(service.url("/api/withdraw"))
        .json(&json!({ "userWallet": RECIPIENT, "amountETH": 0.5, "backupId": "b-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["amountETH"], 0.5);
    assert_eq!(body["gasUsed"], 21000);
    assert_eq!(body["oldBalance"], 2.0);
    assert_eq!(body["txHash"], body["transactionHash"]);
    let tx_hash = body["txHash"].as_str().unwrap();
    assert_eq!(body["etherscanUrl"], format!("https://etherscan.io/tx/{tx_hash}"));

    let res = service
        .client
        .post(service.url("/api/fund/contract"))
        .json(&json!({ "contractAddress": TARGET_CONTRACTS[1].to_string(), "amountETH": 0.25 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["amount"], 0.25);
    assert_eq!(chain.balance_of(TARGET_CONTRACTS[1]), eth(0.25));

    // Two transfers, two distinct nonces
    let nonces: Vec<u64> = chain.sent_calls().iter().map(|c| c.nonce).collect();
    assert_eq!(nonces, vec![0, 1]);
}

#[tokio::test]
async fn test_earn_scenario_credits_observed_delta() {
    let chain = funded_chain(1.0);
    chain.set_balance(TARGET_CONTRACTS[0], eth(0.5));
    chain.set_balance(TARGET_CONTRACTS[1], eth(0.0));
    chain.set_balance(TARGET_CONTRACTS[2], eth(0.2));
    chain.set_payout(TARGET_CONTRACTS[0], eth(0.01));
    chain.set_payout(TARGET_CONTRACTS[2], eth(0.01));
    let service = start_service(Some(chain.clone())).await;

    let res = service
        .client
        .post(service.url("/api/earn"))
        .json(&json!({ "amountUSD": 3.0 * 3450.0, "userId": "u-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["requested_eth"], 3.0);
    assert_eq!(body["contracts_attempted"], 3);
    assert_eq!(body["contracts_succeeded"], 2);

    let claims = body["successful_claims"].as_array().unwrap();
    assert_eq!(claims.len(), 2);
    for claim in claims {
        assert_eq!(claim["amount"], 0.01);
        assert_eq!(claim["variant"], "withdrawTo");
    }
    assert_eq!(body["reports"][1]["outcome"], "skipped");

    // 0.02 paid out minus two calls of 100k gas at 1 gwei
    assert_eq!(body["actual_gained_wei"], "19800000000000000");
    assert_eq!(body["total_earned_eth"], body["actual_gained_eth"]);

    let health: Value = service
        .client
        .get(service.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["total_earned_eth"], body["total_earned_eth"]);
}

#[tokio::test]
async fn test_earn_without_amount_is_a_client_error() {
    let chain = funded_chain(1.0);
    let service = start_service(Some(chain.clone())).await;

    let res = service
        .client
        .post(service.url("/api/fund/treasury"))
        .json(&json!({ "source": "site_activity" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(chain.balance_reads(), 0);

    let res = service
        .client
        .post(service.url("/api/earn"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_router_timeout_answers_json_and_run_still_settles() {
    let chain = funded_chain(1.0);
    chain.set_balance(TARGET_CONTRACTS[0], eth(0.5));
    chain.set_payout(TARGET_CONTRACTS[0], eth(0.01));
    chain.withhold_receipts(true);
    let service = start_service_with(Some(chain.clone()), |config| {
        config.listener.request_timeout_secs = 1;
    })
    .await;

    let res = service
        .client
        .post(service.url("/api/earn"))
        .json(&json!({ "amountUSD": 3.0 * 3450.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 504);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("timed out"));

    // The spawned run is still waiting for its receipt
    chain.withhold_receipts(false);

    let mut total = 0.0;
    for _ in 0..50 {
        let health: Value = service
            .client
            .get(service.url("/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        total = health["total_earned_eth"].as_f64().unwrap();
        if total != 0.0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(total > 0.0, "run did not settle after the router timeout");
}
