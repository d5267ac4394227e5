// Store, effects and realtime middleware wired together against in-memory fakes

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::oneshot;

    use crate::config::RealtimeConfig;
    use crate::domain::{
        Account, Debt, Entity, EntityPatch, ErrorKind, FinanceError, FinanceResult, FinanceSnapshot,
        Loan, PaidDebts, PaidKey, Transaction, TransactionKind,
    };
    use crate::effects::{FinanceApi, FinanceEffects};
    use crate::realtime::{
        Connection, ConnectionStatus, DisconnectReason, EventSink, RealtimeSync, Scheduler,
        Transport, TransportEvent, PRESENCE_EVENT,
    };
    use crate::store::{
        AuthAction, EntityOp, FinanceAction, FinanceState, Normalized, RootState, Session, Severity,
        Store,
    };

    // ========================
    // Fake remote API
    // ========================

    #[derive(Default)]
    struct ApiState {
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        debts: Vec<Debt>,
        loans: Vec<Loan>,
        snapshot: FinanceSnapshot,
        failure: Option<FinanceError>,
        account_gates: VecDeque<oneshot::Receiver<Vec<Account>>>,
        write_gates: VecDeque<oneshot::Receiver<()>>,
        calls: Vec<String>,
        next_id: u32,
    }

    #[derive(Clone, Default)]
    struct MockApi {
        state: Rc<RefCell<ApiState>>,
    }

    impl MockApi {
        fn record(&self, call: impl Into<String>) -> FinanceResult<()> {
            let mut state = self.state.borrow_mut();
            state.calls.push(call.into());
            match &state.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn fail_with(&self, err: FinanceError) {
            self.state.borrow_mut().failure = Some(err);
        }

        /// Hold the next write until the sender fires
        fn gate_write(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.state.borrow_mut().write_gates.push_back(rx);
            tx
        }

        async fn pass_write_gate(&self) {
            let gate = self.state.borrow_mut().write_gates.pop_front();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
        }

        fn calls(&self) -> Vec<String> {
            self.state.borrow().calls.clone()
        }

        fn next_id(&self) -> u32 {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            100 + state.next_id
        }
    }

    fn patched<T: Entity>(items: &[T], patch: &EntityPatch) -> FinanceResult<T> {
        let current = items
            .iter()
            .find(|item| item.id() == patch.id)
            .ok_or_else(|| FinanceError::NotFound(format!("{} {}", T::LABEL, patch.id)))?;
        patch.apply(current)
    }

    #[async_trait(?Send)]
    impl FinanceApi for MockApi {
        async fn get_accounts(&self, user_id: u32) -> FinanceResult<Vec<Account>> {
            self.record(format!("get_accounts:{}", user_id))?;
            let gate = self.state.borrow_mut().account_gates.pop_front();
            match gate {
                Some(rx) => rx.await.map_err(|_| FinanceError::Network("gate dropped".to_string())),
                None => Ok(self.state.borrow().accounts.clone()),
            }
        }

        async fn add_account(&self, draft: &Account) -> FinanceResult<Account> {
            self.record("add_account")?;
            Ok(Account {
                id: self.next_id(),
                ..draft.clone()
            })
        }

        async fn update_account(&self, patch: &EntityPatch) -> FinanceResult<Account> {
            self.record(format!("update_account:{}", patch.id))?;
            patched(&self.state.borrow().accounts, patch)
        }

        async fn delete_account(&self, id: u32) -> FinanceResult<()> {
            self.record(format!("delete_account:{}", id))
        }

        async fn get_transactions(&self, user_id: u32) -> FinanceResult<Vec<Transaction>> {
            self.record(format!("get_transactions:{}", user_id))?;
            Ok(self.state.borrow().transactions.clone())
        }

        async fn add_transaction(&self, draft: &Transaction) -> FinanceResult<Transaction> {
            self.record("add_transaction")?;
            Ok(Transaction {
                id: self.next_id(),
                ..draft.clone()
            })
        }

        async fn update_transaction(&self, patch: &EntityPatch) -> FinanceResult<Transaction> {
            self.record(format!("update_transaction:{}", patch.id))?;
            patched(&self.state.borrow().transactions, patch)
        }

        async fn delete_transaction(&self, id: u32) -> FinanceResult<()> {
            self.record(format!("delete_transaction:{}", id))
        }

        async fn get_debts(&self, user_id: u32) -> FinanceResult<Vec<Debt>> {
            self.record(format!("get_debts:{}", user_id))?;
            Ok(self.state.borrow().debts.clone())
        }

        async fn add_debt(&self, draft: &Debt) -> FinanceResult<Debt> {
            self.record("add_debt")?;
            Ok(Debt {
                id: self.next_id(),
                ..draft.clone()
            })
        }

        async fn update_debt(&self, patch: &EntityPatch) -> FinanceResult<Debt> {
            self.record(format!("update_debt:{}", patch.id))?;
            patched(&self.state.borrow().debts, patch)
        }

        async fn delete_debt(&self, id: u32) -> FinanceResult<()> {
            self.record(format!("delete_debt:{}", id))
        }

        async fn get_loans(&self, user_id: u32) -> FinanceResult<Vec<Loan>> {
            self.record(format!("get_loans:{}", user_id))?;
            Ok(self.state.borrow().loans.clone())
        }

        async fn add_loan(&self, draft: &Loan) -> FinanceResult<Loan> {
            self.record("add_loan")?;
            Ok(Loan {
                id: self.next_id(),
                ..draft.clone()
            })
        }

        async fn update_loan(&self, patch: &EntityPatch) -> FinanceResult<Loan> {
            self.record(format!("update_loan:{}", patch.id))?;
            self.pass_write_gate().await;
            patched(&self.state.borrow().loans, patch)
        }

        async fn delete_loan(&self, id: u32) -> FinanceResult<()> {
            self.record(format!("delete_loan:{}", id))
        }

        async fn get_all_finance_data(&self, user_id: u32) -> FinanceResult<FinanceSnapshot> {
            self.record(format!("get_all_finance_data:{}", user_id))?;
            Ok(self.state.borrow().snapshot.clone())
        }

        async fn toggle_debt_paid(&self, id: u32, paid: bool) -> FinanceResult<Debt> {
            self.record(format!("toggle_debt_paid:{}:{}", id, paid))?;
            self.pass_write_gate().await;
            let patch = EntityPatch::new(id).set("is_paid", paid);
            patched(&self.state.borrow().debts, &patch)
        }

        async fn toggle_credit_card_paid(&self, id: u32, paid: bool) -> FinanceResult<Account> {
            self.record(format!("toggle_credit_card_paid:{}:{}", id, paid))?;
            let patch = EntityPatch::new(id).set("is_paid", paid);
            patched(&self.state.borrow().accounts, &patch)
        }

        async fn toggle_loan_paid(&self, id: u32, paid: bool) -> FinanceResult<Loan> {
            self.record(format!("toggle_loan_paid:{}:{}", id, paid))?;
            let patch = EntityPatch::new(id).set("is_paid", paid);
            patched(&self.state.borrow().loans, &patch)
        }
    }

    // ========================
    // Fake transport and timers
    // ========================

    #[derive(Clone)]
    struct Opened {
        token: String,
        sink: EventSink,
        closed: Rc<Cell<bool>>,
        emitted: Rc<RefCell<Vec<(String, Value)>>>,
    }

    struct FakeConn {
        id: String,
        closed: Rc<Cell<bool>>,
        emitted: Rc<RefCell<Vec<(String, Value)>>>,
    }

    impl Connection for FakeConn {
        fn emit(&self, event: &str, payload: Value) {
            self.emitted.borrow_mut().push((event.to_string(), payload));
        }

        fn is_connected(&self) -> bool {
            !self.closed.get()
        }

        fn id(&self) -> Option<String> {
            Some(self.id.clone())
        }

        fn close(&self) {
            self.closed.set(true);
        }
    }

    #[derive(Clone, Default)]
    struct FakeTransport {
        opened: Rc<RefCell<Vec<Opened>>>,
    }

    impl FakeTransport {
        fn open_count(&self) -> usize {
            self.opened.borrow().len()
        }

        fn connection(&self, index: usize) -> Opened {
            self.opened.borrow()[index].clone()
        }

        /// Deliver an event; the sink is cloned out so it may reopen
        fn fire(&self, index: usize, event: TransportEvent) {
            let sink = self.connection(index).sink;
            sink(event);
        }

        fn live_connections(&self) -> usize {
            self.opened.borrow().iter().filter(|c| !c.closed.get()).count()
        }
    }

    impl Transport for FakeTransport {
        type Conn = FakeConn;

        fn open(&self, _url: &str, token: &str, sink: EventSink) -> FinanceResult<FakeConn> {
            let closed = Rc::new(Cell::new(false));
            let emitted = Rc::new(RefCell::new(Vec::new()));
            let id = format!("conn-{}", self.open_count());
            self.opened.borrow_mut().push(Opened {
                token: token.to_string(),
                sink,
                closed: closed.clone(),
                emitted: emitted.clone(),
            });
            Ok(FakeConn { id, closed, emitted })
        }
    }

    type Task = (Duration, Box<dyn FnOnce()>);

    #[derive(Clone, Default)]
    struct ManualScheduler {
        queue: Rc<RefCell<VecDeque<Task>>>,
    }

    impl ManualScheduler {
        fn pending(&self) -> usize {
            self.queue.borrow().len()
        }

        fn next_delay(&self) -> Option<Duration> {
            self.queue.borrow().front().map(|(delay, _)| *delay)
        }

        fn run_next(&self) -> bool {
            let task = self.queue.borrow_mut().pop_front();
            match task {
                Some((_, task)) => {
                    task();
                    true
                }
                None => false,
            }
        }
    }

    impl Scheduler for ManualScheduler {
        fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
            self.queue.borrow_mut().push_back((delay, task));
        }
    }

    // ========================
    // Fixtures
    // ========================

    fn session() -> Session {
        Session {
            token: "tok-7".to_string(),
            user_id: 7,
            username: Some("ann".to_string()),
        }
    }

    fn realtime_config(max_attempts: u32) -> RealtimeConfig {
        RealtimeConfig {
            url: "ws://test/ws".to_string(),
            max_reconnect_attempts: max_attempts,
            reconnect_delay_ms: 2000,
        }
    }

    fn store_with_finance(finance: FinanceState) -> Store {
        Store::with_state(RootState {
            finance,
            ..RootState::default()
        })
    }

    fn realtime(
        max_attempts: u32,
    ) -> (Store, FakeTransport, ManualScheduler, RealtimeSync<FakeTransport>) {
        let store = Store::new();
        let transport = FakeTransport::default();
        let scheduler = ManualScheduler::default();
        let config = realtime_config(max_attempts);
        let sync = RealtimeSync::install(&store, transport.clone(), scheduler.clone(), config);
        (store, transport, scheduler, sync)
    }

    fn snackbar(store: &Store) -> Option<(String, Severity)> {
        store.select(|s| s.ui.snackbar.as_ref().map(|bar| (bar.message.clone(), bar.severity)))
    }

    // ========================
    // Effects
    // ========================

    #[tokio::test]
    async fn test_toggle_paid_debt_success() {
        let store = store_with_finance(FinanceState {
            debts: Normalized::from_items(vec![Debt::new(5, "Rent", 300.0, "2024-02-01", 7)]),
            ..FinanceState::default()
        });
        let api = MockApi::default();
        api.state.borrow_mut().debts = vec![Debt::new(5, "Rent", 300.0, "2024-02-01", 7)];
        let effects = FinanceEffects::new(api.clone(), store.clone());

        let paid = effects.toggle_paid_debt(PaidKey::debt(5)).await.unwrap();

        assert!(paid);
        assert_eq!(api.calls(), vec!["toggle_debt_paid:5:true".to_string()]);
        let finance = store.select(|s| s.finance.clone());
        assert_eq!(finance.paid_debts.get(&PaidKey::debt(5)), Some(&true));
        assert!(finance.debts.get(5).unwrap().is_paid);
        assert!(!finance.loading);
        assert_eq!(snackbar(&store), Some(("Marked as paid".to_string(), Severity::Success)));
    }

    #[tokio::test]
    async fn test_toggle_paid_debt_failure_restores_previous_map() {
        let mut paid = PaidDebts::new();
        paid.insert(PaidKey::debt(5), false);
        paid.insert(PaidKey::loan(2), true);
        let store = store_with_finance(FinanceState {
            debts: Normalized::from_items(vec![Debt::new(5, "Rent", 300.0, "2024-02-01", 7)]),
            paid_debts: paid.clone(),
            ..FinanceState::default()
        });
        let api = MockApi::default();
        api.fail_with(FinanceError::Network("server unreachable".to_string()));
        let effects = FinanceEffects::new(api.clone(), store.clone());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in_listener = seen.clone();
        store.subscribe(move |state: &RootState| {
            let entry = state.finance.paid_debts.get(&PaidKey::debt(5)).copied();
            seen_in_listener.borrow_mut().push(entry);
        });

        let err = effects.toggle_paid_debt(PaidKey::debt(5)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        let finance = store.select(|s| s.finance.clone());
        assert_eq!(finance.paid_debts, paid);
        assert!(!finance.debts.get(5).unwrap().is_paid);
        assert_eq!(finance.error, Some(err));
        assert!(!finance.loading);
        // Optimistic flip was visible before the rollback
        assert_eq!(seen.borrow().first(), Some(&Some(true)));
        assert_eq!(snackbar(&store).map(|(_, severity)| severity), Some(Severity::Error));
    }

    #[tokio::test]
    async fn test_toggle_paid_unknown_key_never_calls_api() {
        let store = Store::new();
        let api = MockApi::default();
        let effects = FinanceEffects::new(api.clone(), store.clone());

        let err = effects.toggle_paid_debt(PaidKey::loan(9)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(api.calls().is_empty());
        assert!(store.select(|s| s.finance.paid_debts.is_empty()));
    }

    #[tokio::test]
    async fn test_toggle_for_record_deleted_in_flight() {
        let rent = Debt::new(5, "Rent", 300.0, "2024-02-01", 7);
        let store = store_with_finance(FinanceState {
            debts: Normalized::from_items(vec![rent.clone()]),
            ..FinanceState::default()
        });
        let api = MockApi::default();
        api.state.borrow_mut().debts = vec![rent];
        let release = api.gate_write();
        let effects = FinanceEffects::new(api, store.clone());

        let local = tokio::task::LocalSet::new();
        let result = local
            .run_until(async {
                let toggling = effects.clone();
                let toggle = tokio::task::spawn_local(async move {
                    toggling.toggle_paid_debt(PaidKey::debt(5)).await
                });
                tokio::task::yield_now().await;

                // Realtime delete lands while the call is in flight
                store.dispatch(FinanceAction::Debts(EntityOp::Delete(5)));
                release.send(()).unwrap();
                toggle.await.unwrap()
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        let finance = store.select(|s| s.finance.clone());
        assert!(finance.debts.is_empty());
        assert_eq!(finance.paid_debts.get(&PaidKey::debt(5)), None);
        assert!(finance.error.is_none());
        assert!(!finance.loading);
        assert_eq!(snackbar(&store), None);
    }

    #[tokio::test]
    async fn test_update_for_record_deleted_in_flight() {
        let loan = Loan::new(2, "Car", 10000.0, 12.0, 12, 7);
        let store = store_with_finance(FinanceState {
            loans: Normalized::from_items(vec![loan.clone()]),
            ..FinanceState::default()
        });
        let api = MockApi::default();
        api.state.borrow_mut().loans = vec![loan];
        let release = api.gate_write();
        let effects = FinanceEffects::new(api, store.clone());

        let local = tokio::task::LocalSet::new();
        let result = local
            .run_until(async {
                let updating = effects.clone();
                let update = tokio::task::spawn_local(async move {
                    updating.update_loan(&EntityPatch::new(2).set("name", "Truck")).await
                });
                tokio::task::yield_now().await;

                store.dispatch(FinanceAction::Loans(EntityOp::Delete(2)));
                release.send(()).unwrap();
                update.await.unwrap()
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        let finance = store.select(|s| s.finance.clone());
        assert!(finance.loans.is_empty());
        assert_eq!(finance.paid_debts.get(&PaidKey::loan(2)), None);
        assert!(finance.error.is_none());
        assert!(!finance.loading);
        assert_eq!(snackbar(&store), None);
    }

    #[tokio::test]
    async fn test_toggle_credit_card_paid() {
        let card = Account::credit(3, "Visa", 1000.0, 7);
        let store = store_with_finance(FinanceState {
            accounts: Normalized::from_items(vec![card.clone()]),
            ..FinanceState::default()
        });
        let api = MockApi::default();
        api.state.borrow_mut().accounts = vec![card];
        let effects = FinanceEffects::new(api.clone(), store.clone());

        assert!(effects.toggle_paid_debt(PaidKey::credit_card(3)).await.unwrap());
        let finance = store.select(|s| s.finance.clone());
        assert_eq!(finance.paid_debts.get(&PaidKey::credit_card(3)), Some(&true));
        assert_eq!(finance.accounts.get(3).unwrap().is_paid, Some(true));
    }

    #[tokio::test]
    async fn test_fetch_initial_data_replaces_slices() {
        let store = store_with_finance(FinanceState {
            accounts: Normalized::from_items(vec![Account::debit(9, "Old", 1.0, 7)]),
            ..FinanceState::default()
        });
        let api = MockApi::default();
        let mut server_paid = PaidDebts::new();
        server_paid.insert(PaidKey::debt(5), true);
        api.state.borrow_mut().snapshot = FinanceSnapshot {
            accounts: vec![Account::debit(1, "Card", 100.0, 7)],
            transactions: vec![Transaction::new(1, TransactionKind::Income, 50.0, "2024-01-01", 7)],
            debts: vec![Debt::new(5, "Rent", 300.0, "2024-02-01", 7)],
            loans: vec![],
            paid_debts: server_paid,
        };
        let effects = FinanceEffects::new(api, store.clone());

        let snapshot = effects.fetch_initial_data(7).await.unwrap();

        assert_eq!(snapshot.accounts.len(), 1);
        let finance = store.select(|s| s.finance.clone());
        assert_eq!(finance.accounts.all_ids, vec![1]);
        assert_eq!(finance.transactions.len(), 1);
        // Entity flag overrides the server map
        assert_eq!(finance.paid_debts.get(&PaidKey::debt(5)), Some(&false));
        assert!(finance.last_updated.is_some());
        assert!(!finance.loading);
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_and_returns_err() {
        let store = Store::new();
        let api = MockApi::default();
        api.fail_with(FinanceError::Network(String::new()));
        let effects = FinanceEffects::new(api, store.clone());

        let err = effects.fetch_debts(7).await.unwrap_err();

        assert_eq!(err, FinanceError::Network("Failed to fetch debts".to_string()));
        let finance = store.select(|s| s.finance.clone());
        assert_eq!(finance.error, Some(err));
        assert!(!finance.loading);
        assert_eq!(
            snackbar(&store),
            Some(("Failed to fetch debts".to_string(), Severity::Error))
        );
    }

    #[tokio::test]
    async fn test_stale_fetch_response_is_dropped() {
        let store = Store::new();
        let api = MockApi::default();
        let (old_tx, old_rx) = oneshot::channel();
        let (new_tx, new_rx) = oneshot::channel();
        api.state.borrow_mut().account_gates.extend([old_rx, new_rx]);
        let effects = FinanceEffects::new(api, store.clone());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let first = effects.clone();
                let older = tokio::task::spawn_local(async move { first.fetch_accounts(7).await });
                tokio::task::yield_now().await;
                let second = effects.clone();
                let newer = tokio::task::spawn_local(async move { second.fetch_accounts(7).await });
                tokio::task::yield_now().await;

                new_tx.send(vec![Account::debit(2, "Fresh", 20.0, 7)]).unwrap();
                newer.await.unwrap().unwrap();
                old_tx.send(vec![Account::debit(1, "Stale", 10.0, 7)]).unwrap();
                let stale = older.await.unwrap().unwrap();
                assert_eq!(stale[0].name, "Stale");
            })
            .await;

        assert_eq!(store.select(|s| s.finance.accounts.all_ids.clone()), vec![2]);
    }

    #[tokio::test]
    async fn test_fetch_from_previous_session_is_dropped() {
        let store = Store::new();
        store.dispatch(AuthAction::LoginFulfilled(session()));
        let api = MockApi::default();
        let (old_tx, old_rx) = oneshot::channel();
        api.state.borrow_mut().account_gates.push_back(old_rx);
        api.state.borrow_mut().snapshot = FinanceSnapshot {
            accounts: vec![Account::debit(2, "Mine", 20.0, 8)],
            ..FinanceSnapshot::default()
        };
        let effects = FinanceEffects::new(api, store.clone());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let first = effects.clone();
                let older = tokio::task::spawn_local(async move { first.fetch_accounts(7).await });
                tokio::task::yield_now().await;

                store.dispatch(AuthAction::LogoutFulfilled);
                store.dispatch(AuthAction::LoginFulfilled(Session {
                    token: "tok-8".to_string(),
                    user_id: 8,
                    username: None,
                }));
                effects.fetch_initial_data(8).await.unwrap();

                old_tx.send(vec![Account::debit(1, "Theirs", 10.0, 7)]).unwrap();
                older.await.unwrap().unwrap();
            })
            .await;

        let state = store.state();
        assert_eq!(state.auth.user_id, Some(8));
        assert_eq!(state.finance.accounts.all_ids, vec![2]);
        assert!(state.finance.accounts.iter().all(|account| account.user_id == 8));
    }

    #[tokio::test]
    async fn test_failure_from_previous_session_is_silent() {
        let store = Store::new();
        store.dispatch(AuthAction::LoginFulfilled(session()));
        let api = MockApi::default();
        let (old_tx, old_rx) = oneshot::channel::<Vec<Account>>();
        api.state.borrow_mut().account_gates.push_back(old_rx);
        let effects = FinanceEffects::new(api, store.clone());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let first = effects.clone();
                let older = tokio::task::spawn_local(async move { first.fetch_accounts(7).await });
                tokio::task::yield_now().await;

                store.dispatch(AuthAction::LogoutFulfilled);
                drop(old_tx);
                assert_eq!(older.await.unwrap().unwrap_err().kind(), ErrorKind::Network);
            })
            .await;

        let finance = store.select(|s| s.finance.clone());
        assert!(finance.error.is_none());
        assert!(!finance.loading);
        assert_eq!(snackbar(&store), None);
    }

    #[tokio::test]
    async fn test_initial_data_supersedes_pending_slice_fetch() {
        let store = Store::new();
        let api = MockApi::default();
        let (old_tx, old_rx) = oneshot::channel();
        api.state.borrow_mut().account_gates.push_back(old_rx);
        api.state.borrow_mut().snapshot = FinanceSnapshot {
            accounts: vec![Account::debit(2, "Fresh", 20.0, 7)],
            ..FinanceSnapshot::default()
        };
        let effects = FinanceEffects::new(api, store.clone());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let first = effects.clone();
                let older = tokio::task::spawn_local(async move { first.fetch_accounts(7).await });
                tokio::task::yield_now().await;

                effects.fetch_initial_data(7).await.unwrap();
                old_tx.send(vec![Account::debit(1, "Stale", 10.0, 7)]).unwrap();
                older.await.unwrap().unwrap();
            })
            .await;

        assert_eq!(store.select(|s| s.finance.accounts.all_ids.clone()), vec![2]);
    }

    #[tokio::test]
    async fn test_create_and_delete_account() {
        let store = Store::new();
        let api = MockApi::default();
        let effects = FinanceEffects::new(api.clone(), store.clone());

        let draft = Account::debit(0, "Savings", 500.0, 7);
        let created = effects.create_account(&draft).await.unwrap();
        assert!(store.select(|s| s.finance.accounts.contains(created.id)));
        assert_eq!(snackbar(&store), Some(("Account created".to_string(), Severity::Success)));

        store.dispatch(FinanceAction::Transactions(EntityOp::Add(Transaction {
            debit_card_id: Some(created.id),
            ..Transaction::new(1, TransactionKind::Expense, 20.0, "2024-01-05", 7)
        })));

        effects.delete_account(created.id).await.unwrap();
        let finance = store.select(|s| s.finance.clone());
        assert!(finance.accounts.is_empty());
        // Cascade removes the card's transactions
        assert!(finance.transactions.is_empty());
        assert_eq!(
            api.calls(),
            vec!["add_account".to_string(), format!("delete_account:{}", created.id)]
        );
    }

    #[tokio::test]
    async fn test_create_echoed_by_realtime_does_not_conflict() {
        let store = Store::new();
        let api = MockApi::default();
        let effects = FinanceEffects::new(api, store.clone());
        // The server push for id 101 lands before the create response
        store.dispatch(FinanceAction::Transactions(EntityOp::Upsert(Transaction::new(
            101,
            TransactionKind::Income,
            5.0,
            "2024-01-01",
            7,
        ))));

        let created = effects
            .create_transaction(&Transaction::new(0, TransactionKind::Income, 5.0, "2024-01-01", 7))
            .await
            .unwrap();

        assert_eq!(created.id, 101);
        let finance = store.select(|s| s.finance.clone());
        assert_eq!(finance.transactions.all_ids, vec![101]);
        assert!(finance.error.is_none());
    }

    #[tokio::test]
    async fn test_negative_amount_rejected_before_request() {
        let store = Store::new();
        let api = MockApi::default();
        let effects = FinanceEffects::new(api.clone(), store.clone());

        let draft = Transaction::new(0, TransactionKind::Expense, -5.0, "2024-01-01", 7);
        let err = effects.create_transaction(&draft).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(api.calls().is_empty());
        assert!(store.select(|s| s.finance.transactions.is_empty()));
    }

    #[tokio::test]
    async fn test_update_loan_merges_server_record() {
        let loan = Loan::new(2, "Car", 10000.0, 12.0, 12, 7);
        let store = store_with_finance(FinanceState {
            loans: Normalized::from_items(vec![loan.clone()]),
            ..FinanceState::default()
        });
        let api = MockApi::default();
        api.state.borrow_mut().loans = vec![loan];
        let effects = FinanceEffects::new(api, store.clone());

        let updated = effects
            .update_loan(&EntityPatch::new(2).set("name", "Truck"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Truck");
        let stored = store.select(|s| s.finance.loans.get(2).cloned()).unwrap();
        assert_eq!(stored.name, "Truck");
        assert_eq!(stored.term, 12);
    }

    #[tokio::test]
    async fn test_delete_already_removed_settles() {
        let store = Store::new();
        let api = MockApi::default();
        let effects = FinanceEffects::new(api, store.clone());

        assert_eq!(effects.delete_debt(4).await.unwrap(), 4);
        let finance = store.select(|s| s.finance.clone());
        assert!(!finance.loading);
        assert!(finance.error.is_none());
    }

    // ========================
    // Realtime middleware
    // ========================

    #[tokio::test]
    async fn test_login_opens_one_connection() {
        let (store, transport, _scheduler, sync) = realtime(5);

        store.dispatch(AuthAction::LoginFulfilled(session()));
        assert_eq!(transport.open_count(), 1);
        assert_eq!(transport.connection(0).token, "tok-7");
        assert_eq!(sync.status(), ConnectionStatus::Connecting);

        // A session re-check while open does not open a second socket
        store.dispatch(AuthAction::CheckAuthFulfilled(session()));
        assert_eq!(transport.open_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_resets_attempts_and_announces_presence() {
        let (store, transport, scheduler, sync) = realtime(5);
        store.dispatch(AuthAction::LoginFulfilled(session()));

        transport.fire(0, TransportEvent::ConnectError("refused".to_string()));
        assert_eq!(sync.attempts(), 1);
        assert!(scheduler.run_next());
        assert_eq!(transport.open_count(), 2);

        transport.fire(1, TransportEvent::Connect { id: Some("abc".to_string()) });

        assert_eq!(sync.status(), ConnectionStatus::Connected);
        assert_eq!(sync.attempts(), 0);
        let emitted = transport.connection(1).emitted.borrow().clone();
        assert_eq!(emitted, vec![(PRESENCE_EVENT.to_string(), json!({"user_id": 7}))]);
        let mirrored = store.select(|s| s.realtime.clone());
        assert_eq!(mirrored.status, ConnectionStatus::Connected);
        assert_eq!(mirrored.attempts, 0);
        assert_eq!(mirrored.connection_id, Some("conn-1".to_string()));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (store, transport, scheduler, sync) = realtime(3);
        store.dispatch(AuthAction::LoginFulfilled(session()));

        transport.fire(0, TransportEvent::ConnectError("refused".to_string()));
        assert_eq!(scheduler.next_delay(), Some(Duration::from_millis(2000)));
        assert!(scheduler.run_next());
        transport.fire(1, TransportEvent::ConnectError("refused".to_string()));
        assert!(scheduler.run_next());
        transport.fire(2, TransportEvent::ConnectError("refused".to_string()));

        assert_eq!(sync.status(), ConnectionStatus::Failed);
        assert_eq!(sync.attempts(), 3);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(transport.open_count(), 3);
        assert_eq!(store.select(|s| s.realtime.status), ConnectionStatus::Failed);
        assert_eq!(snackbar(&store).map(|(_, severity)| severity), Some(Severity::Error));

        // Late events from the dead handle change nothing
        transport.fire(2, TransportEvent::ConnectError("refused".to_string()));
        assert_eq!(sync.attempts(), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_login_after_failure_starts_over() {
        let (store, transport, _scheduler, sync) = realtime(1);
        store.dispatch(AuthAction::LoginFulfilled(session()));
        transport.fire(0, TransportEvent::ConnectError("refused".to_string()));
        assert_eq!(sync.status(), ConnectionStatus::Failed);

        store.dispatch(AuthAction::LoginFulfilled(session()));

        assert_eq!(transport.open_count(), 2);
        assert_eq!(sync.status(), ConnectionStatus::Connecting);
        assert_eq!(sync.attempts(), 0);
    }

    #[tokio::test]
    async fn test_server_disconnect_reconnects() {
        let (store, transport, scheduler, sync) = realtime(5);
        store.dispatch(AuthAction::LoginFulfilled(session()));
        transport.fire(0, TransportEvent::Connect { id: None });

        let reason = DisconnectReason::from_wire("io server disconnect");
        transport.fire(0, TransportEvent::Disconnect(reason));

        assert_eq!(sync.status(), ConnectionStatus::Disconnected);
        assert_eq!(scheduler.pending(), 1);
        assert!(scheduler.run_next());
        assert_eq!(transport.open_count(), 2);
        assert!(transport.connection(0).closed.get());
    }

    #[tokio::test]
    async fn test_other_disconnect_reasons_stay_down() {
        let (store, transport, scheduler, sync) = realtime(5);
        store.dispatch(AuthAction::LoginFulfilled(session()));
        transport.fire(0, TransportEvent::Connect { id: None });

        transport.fire(0, TransportEvent::Disconnect(DisconnectReason::PingTimeout));

        assert_eq!(sync.status(), ConnectionStatus::Disconnected);
        assert_eq!(scheduler.pending(), 0);
        assert!(!sync.is_open());
        assert_eq!(sync.attempts(), 0);
    }

    #[tokio::test]
    async fn test_logout_closes_and_resets() {
        let (store, transport, scheduler, sync) = realtime(5);
        store.dispatch(AuthAction::LoginFulfilled(session()));
        transport.fire(0, TransportEvent::ConnectError("refused".to_string()));
        assert!(scheduler.run_next());
        transport.fire(1, TransportEvent::ConnectError("refused".to_string()));
        assert_eq!(sync.attempts(), 2);

        store.dispatch(AuthAction::LogoutFulfilled);

        assert_eq!(sync.attempts(), 0);
        assert_eq!(sync.status(), ConnectionStatus::Disconnected);
        assert!(!sync.is_open());
        assert_eq!(transport.live_connections(), 0);

        // The retry timer from before logout finds no credentials
        assert!(scheduler.run_next());
        assert_eq!(transport.open_count(), 2);
    }

    #[tokio::test]
    async fn test_pending_timer_does_not_duplicate_connection() {
        let (store, transport, scheduler, _sync) = realtime(5);
        store.dispatch(AuthAction::LoginFulfilled(session()));
        transport.fire(0, TransportEvent::ConnectError("refused".to_string()));
        assert_eq!(scheduler.pending(), 1);

        // A fresh login opens before the timer fires
        store.dispatch(AuthAction::LoginFulfilled(session()));
        assert_eq!(transport.open_count(), 2);

        assert!(scheduler.run_next());
        assert_eq!(transport.open_count(), 2);
        assert_eq!(transport.live_connections(), 1);
    }

    #[tokio::test]
    async fn test_rapid_login_logout_login_leaves_one_socket() {
        let (store, transport, _scheduler, sync) = realtime(5);

        store.dispatch(AuthAction::LoginFulfilled(session()));
        store.dispatch(AuthAction::LogoutFulfilled);
        store.dispatch(AuthAction::LoginFulfilled(session()));

        assert_eq!(transport.open_count(), 2);
        assert_eq!(transport.live_connections(), 1);
        assert!(sync.is_open());

        // The first socket's late connect is ignored
        transport.fire(0, TransportEvent::Connect { id: None });
        assert_eq!(sync.status(), ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn test_pushed_transaction_lands_in_store() {
        let (store, transport, _scheduler, _sync) = realtime(5);
        store.dispatch(AuthAction::LoginFulfilled(session()));
        transport.fire(0, TransportEvent::Connect { id: None });

        transport.fire(
            0,
            TransportEvent::Message {
                event: "transaction_added".to_string(),
                payload: json!({
                    "id": 11, "debit_card_id": 1, "type": "expense",
                    "amount": 12.5, "date": "2024-03-01", "user_id": 7
                }),
            },
        );

        assert!(store.select(|s| s.finance.transactions.contains(11)));
        assert_eq!(
            snackbar(&store),
            Some(("New transaction received".to_string(), Severity::Info))
        );

        transport.fire(
            0,
            TransportEvent::Message {
                event: "transaction_deleted".to_string(),
                payload: json!({"id": 11, "user_id": 7}),
            },
        );
        assert!(store.select(|s| s.finance.transactions.is_empty()));
    }

    #[tokio::test]
    async fn test_push_for_other_user_is_ignored() {
        let (store, transport, _scheduler, _sync) = realtime(5);
        store.dispatch(AuthAction::LoginFulfilled(session()));
        transport.fire(0, TransportEvent::Connect { id: None });

        transport.fire(
            0,
            TransportEvent::Message {
                event: "tender_added".to_string(),
                payload: json!({"id": 3, "title": "Bridge", "user_id": 8}),
            },
        );

        assert!(store.select(|s| s.catalog.tenders.is_empty()));
        assert!(snackbar(&store).is_none());
    }

    #[tokio::test]
    async fn test_push_from_closed_connection_is_ignored() {
        let (store, transport, _scheduler, _sync) = realtime(5);
        store.dispatch(AuthAction::LoginFulfilled(session()));
        transport.fire(0, TransportEvent::Connect { id: None });
        store.dispatch(AuthAction::LogoutFulfilled);
        store.dispatch(AuthAction::LoginFulfilled(session()));

        transport.fire(
            0,
            TransportEvent::Message {
                event: "payment_added".to_string(),
                payload: json!({"id": 1, "user_id": 7}),
            },
        );

        assert!(store.select(|s| s.catalog.payments.is_empty()));
    }
}
