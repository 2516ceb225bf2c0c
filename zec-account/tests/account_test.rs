//! End-to-end account scenarios against the in-memory chain double

mod common;

use async_trait::async_trait;
use env_logger::Env;
use sha2::Digest;

use common::MockChain;
use zec_account::{
    Account, AccountError, Cancel, Client, ClientCore, PostCondition, PreCondition,
    TxBuilder, TxExecutionSpeed,
};
use zec_tx_builder::script::{self, pushed_data, ScriptBuilder};
use zec_tx_builder::secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use zec_tx_builder::{contract_address, Address, Error as BuilderError, Network, ZecTx};

fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}

fn account(chain: &MockChain, seed: u8) -> Account<MockChain> {
    let secret = SecretKey::from_slice(&[seed; 32]).expect("static test key");
    Account::new(chain.clone(), secret)
}

fn hash_lock_contract(secret_hash: &[u8; 32], spender: &Address) -> Vec<u8> {
    let mut builder = ScriptBuilder::new();
    builder
        .push_op(script::OP_SIZE)
        .push_data(&[32])
        .push_op(script::OP_EQUALVERIFY)
        .push_op(script::OP_SHA256)
        .push_data(secret_hash)
        .push_op(script::OP_EQUALVERIFY)
        .push_op(script::OP_DUP)
        .push_op(script::OP_HASH160)
        .push_data(spender.hash160())
        .push_op(script::OP_EQUALVERIFY)
        .push_op(script::OP_CHECKSIG);
    builder.script()
}

struct AddOutput {
    value: i64,
    script_pubkey: Vec<u8>,
}

#[async_trait]
impl PreCondition for AddOutput {
    async fn check(&self, tx: &mut ZecTx) -> bool {
        tx.add_output(self.value, self.script_pubkey.clone());
        true
    }
}

/// Deposit guard: abort when the contract already received the target,
/// otherwise declare the missing amount
struct DepositOutput {
    chain: MockChain,
    contract_address: String,
    target: i64,
    pay_script: Vec<u8>,
}

#[async_trait]
impl PreCondition for DepositOutput {
    async fn check(&self, tx: &mut ZecTx) -> bool {
        match self
            .chain
            .script_funded(&self.contract_address, self.target)
            .await
        {
            Ok((funded, value)) => {
                if !funded {
                    tx.add_output(self.target - value, self.pay_script.clone());
                }
                !funded
            }
            Err(_) => false,
        }
    }
}

struct Funded {
    chain: MockChain,
    contract_address: String,
    target: i64,
}

#[async_trait]
impl PostCondition for Funded {
    async fn check(&self, _tx: &ZecTx) -> bool {
        matches!(
            self.chain
                .script_funded(&self.contract_address, self.target)
                .await,
            Ok((true, _))
        )
    }
}

/// Redemption guard: abort when already redeemed, otherwise pay the
/// remaining contract balance to the spender
struct RedeemOutput {
    chain: MockChain,
    contract_address: String,
    target: i64,
    pay_script: Vec<u8>,
}

#[async_trait]
impl PreCondition for RedeemOutput {
    async fn check(&self, tx: &mut ZecTx) -> bool {
        match self
            .chain
            .script_redeemed(&self.contract_address, self.target)
            .await
        {
            Ok((redeemed, remaining)) => {
                if !redeemed {
                    tx.add_output(remaining, self.pay_script.clone());
                }
                !redeemed
            }
            Err(_) => false,
        }
    }
}

struct Spent {
    chain: MockChain,
    contract_address: String,
    spender: String,
}

#[async_trait]
impl PostCondition for Spent {
    async fn check(&self, _tx: &ZecTx) -> bool {
        matches!(
            self.chain
                .script_spent(&self.contract_address, &self.spender)
                .await,
            Ok((true, _))
        )
    }
}

#[tokio::test]
async fn transfer_moves_the_exact_value() {
    init_logging();
    let chain = MockChain::new(Network::Testnet);
    let main = account(&chain, 0x11);
    let secondary = account(&chain, 0x22);

    let main_addr = main.address().unwrap();
    chain.mint(&main_addr, 15_000);
    chain.mint(&main_addr, 15_000);

    let secondary_addr = secondary.address().unwrap().encode();
    let initial = secondary.balance(&secondary_addr, 0).await.unwrap();

    let (tx_hash, fee) = main
        .transfer(
            &secondary_addr,
            10_000,
            TxExecutionSpeed::Fast,
            false,
            &Cancel::new(),
        )
        .await
        .unwrap();

    assert_eq!(fee, 10_000);
    assert_eq!(tx_hash.len(), 64);

    let fin = secondary.balance(&secondary_addr, 0).await.unwrap();
    assert_eq!(fin - initial, 10_000);
    // the sender paid the value plus the flat fee
    assert_eq!(main.balance(&main_addr.encode(), 0).await.unwrap(), 10_000);
}

#[tokio::test]
async fn sweeping_a_slave_address() {
    init_logging();
    let chain = MockChain::new(Network::Testnet);
    let main = account(&chain, 0x11);
    let main_addr = main.address().unwrap();

    let slave_script = chain.slave_script(main_addr.hash160(), b"deposit-7");
    let slave_addr = chain.slave_address(main_addr.hash160(), b"deposit-7");
    chain.mint(&slave_addr, 30_000);

    let drain = AddOutput { value: 30_000, script_pubkey: main_addr.script_pubkey() };
    main.send_transaction(
        Some(&slave_script[..]),
        TxExecutionSpeed::Standard,
        None,
        Some(&drain),
        None,
        None,
        true,
        &Cancel::new(),
    )
    .await
    .unwrap();

    assert_eq!(main.balance(&main_addr.encode(), 0).await.unwrap(), 20_000);
    assert_eq!(main.balance(&slave_addr.encode(), 0).await.unwrap(), 0);
}

#[tokio::test]
async fn hash_lock_deposit_and_redeem() {
    init_logging();
    let chain = MockChain::new(Network::Testnet);
    let main = account(&chain, 0x11);
    let secondary = account(&chain, 0x22);

    let secret = [0xA5u8; 32];
    let secret_hash: [u8; 32] = sha2::Sha256::digest(secret).into();
    let spender_addr = secondary.address().unwrap();
    let contract = hash_lock_contract(&secret_hash, &spender_addr);
    let contract_addr = contract_address(&contract, Network::Testnet);

    chain.mint(&main.address().unwrap(), 100_000);

    // deposit 50_000 into the contract
    let deposit = DepositOutput {
        chain: chain.clone(),
        contract_address: contract_addr.encode(),
        target: 50_000,
        pay_script: contract_addr.script_pubkey(),
    };
    let funded = Funded {
        chain: chain.clone(),
        contract_address: contract_addr.encode(),
        target: 50_000,
    };
    main.send_transaction(
        None,
        TxExecutionSpeed::Fast,
        None,
        Some(&deposit),
        None,
        Some(&funded),
        false,
        &Cancel::new(),
    )
    .await
    .unwrap();

    assert_eq!(
        main.balance(&contract_addr.encode(), 0).await.unwrap(),
        50_000
    );

    // a second deposit must abort before touching the chain
    let again = DepositOutput {
        chain: chain.clone(),
        contract_address: contract_addr.encode(),
        target: 50_000,
        pay_script: contract_addr.script_pubkey(),
    };
    let err = main
        .send_transaction(
            None,
            TxExecutionSpeed::Fast,
            None,
            Some(&again),
            None,
            None,
            false,
            &Cancel::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::PreConditionFailed));

    // redeem, revealing the secret in the signature script
    let redeem = RedeemOutput {
        chain: chain.clone(),
        contract_address: contract_addr.encode(),
        target: 50_000,
        pay_script: spender_addr.script_pubkey(),
    };
    let spent = Spent {
        chain: chain.clone(),
        contract_address: contract_addr.encode(),
        spender: spender_addr.encode(),
    };
    let reveal = move |builder: &mut ScriptBuilder| {
        builder.push_data(&secret);
    };
    secondary
        .send_transaction(
            Some(&contract[..]),
            TxExecutionSpeed::Fast,
            None,
            Some(&redeem),
            Some(&reveal),
            Some(&spent),
            true,
            &Cancel::new(),
        )
        .await
        .unwrap();

    assert_eq!(main.balance(&contract_addr.encode(), 0).await.unwrap(), 0);
    assert_eq!(
        secondary
            .balance(&spender_addr.encode(), 0)
            .await
            .unwrap(),
        40_000
    );

    // the counterparty recovers the secret from the spending input
    let (was_spent, sig_script_hex) = chain
        .script_spent(&contract_addr.encode(), &spender_addr.encode())
        .await
        .unwrap();
    assert!(was_spent);
    let pushes = pushed_data(&hex::decode(sig_script_hex).unwrap()).unwrap();
    assert_eq!(pushes.len(), 4);
    assert_eq!(*pushes[0].last().unwrap(), 0x01); // sig || SIGHASH_ALL
    assert_eq!(pushes[1].len(), 65); // uncompressed key on testnet
    assert_eq!(pushes[2], secret.to_vec());
    assert_eq!(pushes[3], contract);
}

#[tokio::test]
async fn insufficient_balance_reports_requirements() {
    init_logging();
    let chain = MockChain::new(Network::Testnet);
    let main = account(&chain, 0x11);
    let secondary = account(&chain, 0x22);

    let main_addr = main.address().unwrap().encode();
    chain.mint(&main.address().unwrap(), 30_000);

    let err = main
        .transfer(
            &secondary.address().unwrap().encode(),
            30_001,
            TxExecutionSpeed::Slow,
            false,
            &Cancel::new(),
        )
        .await
        .unwrap_err();

    match err {
        AccountError::Builder(BuilderError::InsufficientBalance {
            address,
            required,
            current,
        }) => {
            assert_eq!(address, main_addr);
            assert_eq!(required, 40_001);
            assert_eq!(current, 30_000);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn cancelling_before_publish_has_no_chain_effect() {
    init_logging();
    let chain = MockChain::new(Network::Testnet);
    let main = account(&chain, 0x11);
    let secondary = account(&chain, 0x22);

    let main_addr = main.address().unwrap();
    chain.mint(&main_addr, 50_000);

    let cancel = Cancel::new();
    cancel.cancel();

    let err = main
        .transfer(
            &secondary.address().unwrap().encode(),
            20_000,
            TxExecutionSpeed::Standard,
            false,
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Cancelled));

    // nothing moved
    assert_eq!(main.balance(&main_addr.encode(), 0).await.unwrap(), 50_000);
}

#[tokio::test]
async fn detached_signing_round_trip() {
    init_logging();
    let chain = MockChain::new(Network::Testnet);

    // the key never meets the builder, only its public half
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[0x44; 32]).unwrap();
    let public = PublicKey::from_secret_key(&secp, &secret);

    let serialized = chain.serialize_public_key(&public).unwrap();
    let from = chain.public_key_to_address(&serialized);
    chain.mint(&from, 40_000);

    let destination = Address::pub_key_hash([0x77; 20], Network::Testnet);

    let builder = TxBuilder::new(chain.clone());
    let mut tx = builder
        .build(&public, &destination.encode(), None, 25_000, 1, 0)
        .await
        .unwrap();

    let signatures: Vec<_> = tx
        .digests()
        .iter()
        .map(|digest| secp.sign_ecdsa(&Message::from_digest(*digest), &secret))
        .collect();
    tx.inject_signatures(&signatures).unwrap();

    let tx_hash = tx.submit().await.unwrap();
    assert_eq!(tx_hash.len(), 32);

    assert_eq!(
        chain.balance(&destination.encode(), 0).await.unwrap(),
        25_000
    );
    // change went back to the key holder, less the flat fee
    assert_eq!(chain.balance(&from.encode(), 0).await.unwrap(), 5_000);
}

#[tokio::test]
async fn facade_defaults() {
    init_logging();
    let chain = MockChain::new(Network::Testnet);
    let main = account(&chain, 0x11);

    let addr = main.address().unwrap();
    assert!(chain.validate_address(&addr.encode()).is_ok());
    assert_eq!(
        chain.validate_address("not-an-address").unwrap_err(),
        BuilderError::InvalidAddress
    );

    // distinct nonce, distinct deposit address, same network
    let a = chain.slave_address(addr.hash160(), b"n-1");
    let b = chain.slave_address(addr.hash160(), b"n-2");
    assert_ne!(a, b);
    assert_eq!(a.network(), Network::Testnet);

    chain.mint(&addr, 1_200);
    chain.mint(&addr, 2_300);
    assert_eq!(chain.balance(&addr.encode(), 0).await.unwrap(), 3_500);

    let view = chain.format_transaction_view("sent", "deadbeef");
    assert!(view.contains("deadbeef"));
}
