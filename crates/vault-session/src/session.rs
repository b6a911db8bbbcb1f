//! Lock and unlock flows
//!
//! A flow checks the gate and enters `locking`/`unlocking` in one step under
//! the session write lock, builds the transaction, has the wallet sign and
//! submit it, then waits for confirmation. A failure before the wallet
//! returns a transaction hash leaves the state where it is and is recorded in
//! the snapshot. A confirmation that times out or is cancelled restores the
//! state the flow started from. A submitted flow overtaken by `reset` ends
//! with `FlowError::Detached`, which carries the transaction hash.

use std::sync::Arc;

use cardano_tx::{payment_key_hash, ChainProvider, WalletProvider};
use hello_validator::{
    build_lock_tx, build_unlock_tx, check_unlock, find_locked_utxo, HelloContract, LockRequest,
    UnlockRequest,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use vault_core::{
    Address, AppConfig, Error, FlowError, KeyHash, Lovelace, Network, TxError, TxHash,
};

use crate::state::{Action, SessionState};
use crate::watcher::{CancelHandle, ConfirmationWatcher, WatchOutcome, WatchSettings};

/// Flow parameters
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub lock_amount: Lovelace,
    pub watch: WatchSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            lock_amount: hello_validator::DEFAULT_LOCK_LOVELACE,
            watch: WatchSettings::default(),
        }
    }
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            lock_amount: config.contract.lock_amount,
            watch: WatchSettings::from(&config.watch),
        }
    }
}

/// Connected wallet as seen by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub name: String,
    pub address: Address,
    pub key_hash: KeyHash,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub status: Option<String>,
    pub network: Network,
    pub last_tx_hash: Option<TxHash>,
    pub last_error: Option<String>,
    pub wallet: Option<WalletInfo>,
}

struct SessionInner {
    state: SessionState,
    /// Bumped by `reset`; flows started earlier stop writing
    generation: u64,
    last_tx_hash: Option<TxHash>,
    last_error: Option<String>,
    wallet: Option<WalletInfo>,
    pending_watch: Option<CancelHandle>,
}

pub struct Session {
    wallet: Arc<dyn WalletProvider>,
    chain: Arc<dyn ChainProvider>,
    contract: Arc<HelloContract>,
    settings: SessionSettings,
    watcher: ConfirmationWatcher,
    inner: RwLock<SessionInner>,
}

impl Session {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        chain: Arc<dyn ChainProvider>,
        contract: Arc<HelloContract>,
        settings: SessionSettings,
    ) -> Self {
        let watcher = ConfirmationWatcher::new(chain.clone(), settings.watch);
        Self {
            wallet,
            chain,
            contract,
            settings,
            watcher,
            inner: RwLock::new(SessionInner {
                state: SessionState::Init,
                generation: 0,
                last_tx_hash: None,
                last_error: None,
                wallet: None,
                pending_watch: None,
            }),
        }
    }

    pub fn contract(&self) -> &HelloContract {
        &self.contract
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().await;
        SessionSnapshot {
            state: inner.state,
            status: inner.state.status_text().map(str::to_string),
            network: self.contract.network(),
            last_tx_hash: inner.last_tx_hash.clone(),
            last_error: inner.last_error.clone(),
            wallet: inner.wallet.clone(),
        }
    }

    /// Enable the wallet and resolve its first used address and key hash
    pub async fn connect_wallet(&self) -> Result<WalletInfo, Error> {
        let name = self.wallet.connect().await?;
        let address = self.wallet.first_used_address().await?;
        let key_hash = payment_key_hash(&address)?;
        let info = WalletInfo {
            name,
            address,
            key_hash,
        };
        tracing::info!(
            wallet = %info.name,
            address = %info.address,
            "Wallet connected"
        );
        self.inner.write().await.wallet = Some(info.clone());
        Ok(info)
    }

    pub async fn wallet_info(&self) -> Option<WalletInfo> {
        self.inner.read().await.wallet.clone()
    }

    /// Lock the configured amount under the wallet's key hash.
    pub async fn lock(&self) -> Result<TxHash, Error> {
        self.run_flow(Action::Lock, self.submit_lock()).await
    }

    /// Spend the wallet's locked output back to the wallet.
    pub async fn unlock(&self) -> Result<TxHash, Error> {
        self.run_flow(Action::Unlock, self.submit_unlock()).await
    }

    /// Cancel a pending confirmation watch. Returns false when nothing is pending.
    pub async fn cancel_confirmation(&self) -> bool {
        match self.inner.write().await.pending_watch.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Back to `init` with no wallet, as after a page reload. A running flow
    /// keeps running but no longer updates this session.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        if let Some(handle) = inner.pending_watch.take() {
            handle.cancel();
        }
        inner.generation += 1;
        inner.state = SessionState::Init;
        inner.last_tx_hash = None;
        inner.last_error = None;
        inner.wallet = None;
        tracing::info!("Session reset");
    }

    /// Gate check and transition in one step. Returns the state before the
    /// flow and the generation it belongs to.
    async fn begin(&self, action: Action) -> Result<(SessionState, u64), Error> {
        if !self.wallet.is_connected().await {
            return Err(FlowError::WalletNotConnected.into());
        }
        let mut inner = self.inner.write().await;
        let previous = inner.state;
        inner.state = previous.start(action)?;
        inner.last_error = None;
        tracing::info!("{} started from {}", action, previous);
        Ok((previous, inner.generation))
    }

    async fn run_flow<F>(&self, action: Action, submit: F) -> Result<TxHash, Error>
    where
        F: std::future::Future<Output = Result<TxHash, Error>>,
    {
        let ticket = self.begin(action).await?;
        self.finish(action, ticket, submit).await
    }

    /// Gate `action` now and run the rest of the flow on a spawned task.
    /// Gate failures (`Busy`, `WalletNotConnected`) are returned directly.
    pub async fn spawn_flow(
        self: &Arc<Self>,
        action: Action,
    ) -> Result<JoinHandle<Result<TxHash, Error>>, Error> {
        let ticket = self.begin(action).await?;
        let session = self.clone();
        Ok(tokio::spawn(async move {
            match action {
                Action::Lock => session.finish(action, ticket, session.submit_lock()).await,
                Action::Unlock => session.finish(action, ticket, session.submit_unlock()).await,
            }
        }))
    }

    async fn finish<F>(
        &self,
        action: Action,
        (previous, generation): (SessionState, u64),
        submit: F,
    ) -> Result<TxHash, Error>
    where
        F: std::future::Future<Output = Result<TxHash, Error>>,
    {
        let tx_hash = match submit.await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                tracing::warn!("{} failed before submission: {}", action, e);
                let mut inner = self.inner.write().await;
                if inner.generation == generation {
                    inner.last_error = Some(e.to_string());
                }
                return Err(e);
            }
        };

        tracing::info!(tx_hash = %tx_hash, "{} submitted", action);

        let subscription = {
            let mut inner = self.inner.write().await;
            if inner.generation != generation {
                tracing::warn!(tx_hash = %tx_hash, "{} detached by session reset", action);
                return Err(FlowError::Detached {
                    tx_hash: tx_hash.to_string(),
                }
                .into());
            }
            let subscription = self.watcher.watch(tx_hash.clone());
            inner.state = inner.state.submitted();
            inner.last_tx_hash = Some(tx_hash.clone());
            inner.pending_watch = Some(subscription.cancel_handle());
            subscription
        };
        tracing::debug!(tx_hash = %tx_hash, "Awaiting confirmation");

        let outcome = subscription.outcome().await;
        let mut inner = self.inner.write().await;
        let current = inner.generation == generation;
        if current {
            inner.pending_watch = None;
        }

        let err: Error = match outcome {
            WatchOutcome::Confirmed { confirmations } => {
                if current {
                    inner.state = inner.state.confirmed();
                }
                tracing::info!(tx_hash = %tx_hash, confirmations, "{} confirmed", action);
                return Ok(tx_hash);
            }
            WatchOutcome::TimedOut => FlowError::ConfirmationTimedOut {
                tx_hash: tx_hash.to_string(),
                secs: self.settings.watch.timeout.as_secs(),
            }
            .into(),
            WatchOutcome::Cancelled if !current => FlowError::Detached {
                tx_hash: tx_hash.to_string(),
            }
            .into(),
            WatchOutcome::Cancelled => FlowError::ConfirmationCancelled {
                tx_hash: tx_hash.to_string(),
            }
            .into(),
        };

        tracing::warn!(tx_hash = %tx_hash, "{}: {}", action, err);
        if current {
            inner.state = previous;
            inner.last_error = Some(err.to_string());
        }
        Err(err)
    }

    async fn submit_lock(&self) -> Result<TxHash, Error> {
        let address = self.wallet.first_used_address().await?;
        let owner = payment_key_hash(&address)?;

        let tx = build_lock_tx(&LockRequest {
            network: self.contract.network(),
            script_address: self.contract.address().clone(),
            owner,
            lovelace: self.settings.lock_amount,
            change_address: Some(address),
        })?;

        let signed = self.wallet.sign_tx(&tx, false).await?;
        let raw = self.wallet.submit_tx(&signed).await?;
        parse_submitted_hash(&raw)
    }

    async fn submit_unlock(&self) -> Result<TxHash, Error> {
        let address = self.wallet.first_used_address().await?;
        let owner = payment_key_hash(&address)?;

        let locked = find_locked_utxo(self.chain.as_ref(), self.contract.address(), &owner)
            .await?
            .ok_or_else(|| FlowError::NoLockedUtxo {
                datum_hash: HelloContract::owner_datum_hash(&owner).to_string(),
            })?;
        tracing::debug!(utxo = %locked.out_ref(), lovelace = locked.lovelace, "Unlocking");

        let tx = build_unlock_tx(UnlockRequest {
            network: self.contract.network(),
            locked,
            script: self.contract.script().clone(),
            recipient: address,
        })?;

        check_unlock(&tx, &owner).map_err(|r| FlowError::PreflightRejected {
            reason: r.to_string(),
        })?;

        let signed = self.wallet.sign_tx(&tx, true).await?;
        let raw = self.wallet.submit_tx(&signed).await?;
        parse_submitted_hash(&raw)
    }
}

fn parse_submitted_hash(raw: &str) -> Result<TxHash, Error> {
    if raw.trim().is_empty() {
        return Err(TxError::MissingTxHash.into());
    }
    TxHash::parse(raw).map_err(|e| {
        Error::Serialization(format!("wallet returned malformed tx hash '{}': {}", raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use cardano_tx::plutus_data::wrap_cbor_bytes;
    use tokio::sync::Notify;
    use cardano_tx::{
        Asset, PlutusScript, PlutusVersion, SignedTx, TxIn, TxOut, UnsignedTx, Utxo,
    };
    use vault_core::{ProviderError, WalletError};

    const WALLET_ADDRESS: &str = "addr_test1vz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzerspjrlsz";
    const OWNER: &str = "9493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e";
    const SUBMITTED: &str = "aa00000000000000000000000000000000000000000000000000000000000001";

    struct MockWallet {
        connected: AtomicBool,
        submit_result: Mutex<String>,
        signed: Mutex<Vec<(UnsignedTx, bool)>>,
        /// When set, `sign_tx` waits for `release` before returning
        hold_signing: AtomicBool,
        release: Notify,
    }

    impl MockWallet {
        fn new(connected: bool) -> Arc<Self> {
            Arc::new(Self {
                connected: AtomicBool::new(connected),
                submit_result: Mutex::new(SUBMITTED.to_string()),
                signed: Mutex::new(vec![]),
                hold_signing: AtomicBool::new(false),
                release: Notify::new(),
            })
        }
    }

    #[async_trait]
    impl WalletProvider for MockWallet {
        async fn connect(&self) -> Result<String, WalletError> {
            self.connected.store(true, Ordering::SeqCst);
            Ok("mock".to_string())
        }

        async fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn used_addresses(&self) -> Result<Vec<Address>, WalletError> {
            if !self.connected.load(Ordering::SeqCst) {
                return Err(WalletError::NotConnected);
            }
            Ok(vec![Address::new(WALLET_ADDRESS)])
        }

        async fn sign_tx(
            &self,
            tx: &UnsignedTx,
            partial_sign: bool,
        ) -> Result<SignedTx, WalletError> {
            self.signed.lock().unwrap().push((tx.clone(), partial_sign));
            if self.hold_signing.load(Ordering::SeqCst) {
                self.release.notified().await;
            }
            Ok(SignedTx {
                cbor: "84a0".to_string(),
            })
        }

        async fn submit_tx(&self, _tx: &SignedTx) -> Result<String, WalletError> {
            Ok(self.submit_result.lock().unwrap().clone())
        }
    }

    /// Confirms every transaction on the second poll unless `never_confirm`
    struct MockChain {
        utxos: Mutex<Vec<Utxo>>,
        polls: AtomicU64,
        never_confirm: bool,
    }

    impl MockChain {
        fn new(utxos: Vec<Utxo>, never_confirm: bool) -> Arc<Self> {
            Arc::new(Self {
                utxos: Mutex::new(utxos),
                polls: AtomicU64::new(0),
                never_confirm,
            })
        }
    }

    #[async_trait]
    impl ChainProvider for MockChain {
        async fn fetch_address_utxos(
            &self,
            _address: &Address,
            _asset: Option<&str>,
        ) -> Result<Vec<Utxo>, ProviderError> {
            Ok(self.utxos.lock().unwrap().clone())
        }

        async fn tx_confirmations(&self, _tx_hash: &TxHash) -> Result<Option<u64>, ProviderError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.never_confirm || n < 2 {
                Ok(None)
            } else {
                Ok(Some(1))
            }
        }
    }

    fn contract() -> Arc<HelloContract> {
        let code = hex::encode(wrap_cbor_bytes(&[0x01, 0x00, 0x00, 0x32, 0x22]));
        let script = PlutusScript::new(&code, PlutusVersion::V2).unwrap();
        Arc::new(HelloContract::new(script, Network::Preprod).unwrap())
    }

    fn locked_utxo(contract: &HelloContract) -> Utxo {
        let owner = KeyHash::parse(OWNER).unwrap();
        let datum = HelloContract::owner_datum(&owner);
        Utxo {
            input: TxIn {
                tx_hash: TxHash::from_array([5u8; 32]),
                output_index: 0,
            },
            output: TxOut {
                address: contract.address().clone(),
                amount: vec![Asset::lovelace(2_000_000)],
                data_hash: Some(datum.hash()),
                plutus_data: Some(datum.to_cbor_hex()),
                script_ref: None,
            },
        }
    }

    fn session(wallet: &Arc<MockWallet>, chain: &Arc<MockChain>) -> Arc<Session> {
        Arc::new(Session::new(
            wallet.clone(),
            chain.clone(),
            contract(),
            SessionSettings::default(),
        ))
    }

    async fn wait_for(session: &Session, state: SessionState) {
        while session.state().await != state {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_flow() {
        let wallet = MockWallet::new(true);
        let chain = MockChain::new(vec![], false);
        let session = session(&wallet, &chain);

        let tx_hash = session.lock().await.unwrap();

        assert_eq!(tx_hash.as_str(), SUBMITTED);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Locked);
        assert_eq!(snapshot.status.as_deref(), Some("Transaction confirmed"));
        assert_eq!(snapshot.last_tx_hash, Some(tx_hash));
        assert!(snapshot.last_error.is_none());

        let signed = wallet.signed.lock().unwrap();
        assert_eq!(signed.len(), 1);
        let (tx, partial) = &signed[0];
        assert!(!partial);
        assert_eq!(&tx.outputs[0].address, session.contract().address());
        assert_eq!(tx.outputs[0].lovelace(), 2_000_000);
        assert_eq!(
            tx.outputs[0].datum.as_ref().unwrap().value.to_cbor_hex(),
            format!("581c{}", OWNER)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_without_tx_hash_stays_locking() {
        let wallet = MockWallet::new(true);
        *wallet.submit_result.lock().unwrap() = String::new();
        let chain = MockChain::new(vec![], false);
        let session = session(&wallet, &chain);

        let err = session.lock().await.unwrap_err();
        assert!(matches!(err, Error::Transaction(TxError::MissingTxHash)));

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Locking);
        assert_eq!(snapshot.status.as_deref(), Some("Creating transaction..."));
        assert!(snapshot.last_error.is_some());
        assert!(snapshot.last_tx_hash.is_none());
        assert_eq!(chain.polls.load(Ordering::SeqCst), 0);

        // Stuck until reset
        assert!(matches!(
            session.lock().await,
            Err(Error::Flow(FlowError::Busy { .. }))
        ));
        session.reset().await;
        assert_eq!(session.state().await, SessionState::Init);
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_require_wallet() {
        let wallet = MockWallet::new(false);
        let chain = MockChain::new(vec![], false);
        let session = session(&wallet, &chain);

        assert!(matches!(
            session.lock().await,
            Err(Error::Flow(FlowError::WalletNotConnected))
        ));
        assert!(matches!(
            session.unlock().await,
            Err(Error::Flow(FlowError::WalletNotConnected))
        ));
        assert_eq!(session.state().await, SessionState::Init);

        let info = session.connect_wallet().await.unwrap();
        assert_eq!(info.name, "mock");
        assert_eq!(info.key_hash.as_str(), OWNER);
        assert_eq!(session.snapshot().await.wallet, Some(info));
        assert!(session.lock().await.is_ok());

        session.reset().await;
        assert!(session.wallet_info().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlock_without_locked_utxo() {
        let wallet = MockWallet::new(true);
        let chain = MockChain::new(vec![], false);
        let session = session(&wallet, &chain);

        let err = session.unlock().await.unwrap_err();
        match err {
            Error::Flow(FlowError::NoLockedUtxo { datum_hash }) => {
                let owner = KeyHash::parse(OWNER).unwrap();
                assert_eq!(
                    datum_hash,
                    HelloContract::owner_datum_hash(&owner).to_string()
                );
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(session.state().await, SessionState::Unlocking);
        assert!(wallet.signed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_then_unlock() {
        let wallet = MockWallet::new(true);
        let contract = contract();
        let chain = MockChain::new(vec![locked_utxo(&contract)], false);
        let session = Session::new(
            wallet.clone(),
            chain.clone(),
            contract,
            SessionSettings::default(),
        );

        session.lock().await.unwrap();
        assert_eq!(session.state().await, SessionState::Locked);
        session.unlock().await.unwrap();
        assert_eq!(session.state().await, SessionState::Unlocked);

        let signed = wallet.signed.lock().unwrap();
        let (tx, partial) = &signed[1];
        assert!(partial);
        assert_eq!(tx.script_inputs.len(), 1);
        assert_eq!(tx.required_signers[0].as_str(), OWNER);
        assert_eq!(tx.outputs[0].address, Address::new(WALLET_ADDRESS));

        drop(signed);
        // Lock is available again after an unlock
        session.lock().await.unwrap();
        assert_eq!(session.state().await, SessionState::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_while_confirming() {
        let wallet = MockWallet::new(true);
        let chain = MockChain::new(vec![], false);
        let session = session(&wallet, &chain);

        let flow = tokio::spawn({
            let session = session.clone();
            async move { session.lock().await }
        });
        wait_for(&session, SessionState::LockingConfirming).await;
        assert_eq!(
            session.snapshot().await.status.as_deref(),
            Some("Awaiting transaction confirm...")
        );

        for result in [session.lock().await, session.unlock().await] {
            assert!(matches!(result, Err(Error::Flow(FlowError::Busy { .. }))));
        }

        flow.await.unwrap().unwrap();
        assert_eq!(session.state().await, SessionState::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_flow_gates_before_returning() {
        let wallet = MockWallet::new(true);
        let chain = MockChain::new(vec![], false);
        let session = session(&wallet, &chain);

        let handle = session.spawn_flow(Action::Lock).await.unwrap();
        assert_eq!(session.state().await, SessionState::Locking);
        assert!(matches!(
            session.spawn_flow(Action::Unlock).await,
            Err(Error::Flow(FlowError::Busy { .. }))
        ));

        let tx_hash = handle.await.unwrap().unwrap();
        assert_eq!(tx_hash.as_str(), SUBMITTED);
        assert_eq!(session.state().await, SessionState::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_timeout_restores_state() {
        let wallet = MockWallet::new(true);
        let chain = MockChain::new(vec![], true);
        let session = session(&wallet, &chain);

        let err = session.lock().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Flow(FlowError::ConfirmationTimedOut { secs: 500, .. })
        ));
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Init);
        assert!(snapshot.last_error.is_some());
        assert_eq!(snapshot.last_tx_hash.map(String::from).as_deref(), Some(SUBMITTED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_confirmation() {
        let wallet = MockWallet::new(true);
        let chain = MockChain::new(vec![], true);
        let session = session(&wallet, &chain);
        assert!(!session.cancel_confirmation().await);

        let flow = tokio::spawn({
            let session = session.clone();
            async move { session.lock().await }
        });
        wait_for(&session, SessionState::LockingConfirming).await;
        assert!(session.cancel_confirmation().await);

        let err = flow.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::Flow(FlowError::ConfirmationCancelled { .. })
        ));
        assert_eq!(session.state().await, SessionState::Init);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_detaches_running_flow() {
        let wallet = MockWallet::new(true);
        let chain = MockChain::new(vec![], true);
        let session = session(&wallet, &chain);

        let flow = tokio::spawn({
            let session = session.clone();
            async move { session.lock().await }
        });
        wait_for(&session, SessionState::LockingConfirming).await;
        session.reset().await;

        match flow.await.unwrap() {
            Err(Error::Flow(FlowError::Detached { tx_hash })) => assert_eq!(tx_hash, SUBMITTED),
            other => panic!("unexpected result: {:?}", other),
        }
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Init);
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.last_tx_hash.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_submission() {
        let wallet = MockWallet::new(true);
        wallet.hold_signing.store(true, Ordering::SeqCst);
        let chain = MockChain::new(vec![], false);
        let session = session(&wallet, &chain);

        let handle = session.spawn_flow(Action::Lock).await.unwrap();
        while wallet.signed.lock().unwrap().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        session.reset().await;
        wallet.release.notify_one();

        match handle.await.unwrap() {
            Err(Error::Flow(FlowError::Detached { tx_hash })) => assert_eq!(tx_hash, SUBMITTED),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(chain.polls.load(Ordering::SeqCst), 0);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Init);
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.last_tx_hash.is_none());

        // The reset session accepts a new flow
        wallet.hold_signing.store(false, Ordering::SeqCst);
        session.lock().await.unwrap();
        assert_eq!(session.state().await, SessionState::Locked);
    }

    #[test]
    fn test_parse_submitted_hash() {
        assert!(matches!(
            parse_submitted_hash("  "),
            Err(Error::Transaction(TxError::MissingTxHash))
        ));
        assert!(matches!(
            parse_submitted_hash("xyz"),
            Err(Error::Serialization(_))
        ));
        assert_eq!(parse_submitted_hash(SUBMITTED).unwrap().as_str(), SUBMITTED);
    }
}
