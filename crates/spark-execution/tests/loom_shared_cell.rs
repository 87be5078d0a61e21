#![cfg(any(loom, spark_loom))]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use loom::{model, thread};
use spark_execution::{Consumer, ExecutionError, SharedCallbackCell};

/// 以标准原子量统计信号的消费者；计数只在模型结束后读取。
#[derive(Clone, Default)]
struct Tally {
    values: Arc<AtomicUsize>,
    cancelled: Arc<AtomicUsize>,
    errors: Arc<Mutex<Vec<ExecutionError>>>,
}

impl Consumer<()> for Tally {
    type Error = ExecutionError;

    fn on_value(&mut self, (): ()) -> Result<(), ExecutionError> {
        self.values.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_error(&mut self, error: ExecutionError) {
        self.errors.lock().expect("锁未中毒").push(error);
    }

    fn on_cancelled(&mut self) {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn racing_invocations_deliver_once() {
    //
    // 教案级说明：两个线程同时调用同一个共享单元。
    // - **Why**：外部回调接口可能并发重复回调，闸门必须只放行一次；
    // - **How**：Loom 穷举两次 `try_invoke` 的全部交错；
    // - **What**：恰好一个线程返回 `true`，消费者恰好收到一次值信号、零次取消。
    model(|| {
        let tally = Tally::default();
        let cell = SharedCallbackCell::new(tally.clone());
        let twin = cell.clone();

        let racer = thread::spawn(move || twin.try_invoke());
        let local = cell.try_invoke();
        let remote = racer.join().expect("调用线程不应 panic");
        drop(cell);

        assert!(local ^ remote, "必须恰好一个调用胜出");
        assert_eq!(tally.values.load(Ordering::SeqCst), 1);
        assert_eq!(tally.cancelled.load(Ordering::SeqCst), 0);
    });
}

#[test]
fn invocation_racing_release_signals_once() {
    //
    // 教案级说明：一个线程调用，另一个线程释放自己的克隆。
    // - **Why**：调用与最后一个克隆析构竞争时，不得同时出现值信号与取消信号；
    // - **What**：调用方持有克隆直至调用结束，因此结局必然是值信号，且总信号数为一。
    model(|| {
        let tally = Tally::default();
        let cell = SharedCallbackCell::new(tally.clone());
        let releaser = cell.clone();

        let handle = thread::spawn(move || drop(releaser));
        assert!(cell.try_invoke());
        handle.join().expect("释放线程不应 panic");
        drop(cell);

        let total = tally.values.load(Ordering::SeqCst) + tally.cancelled.load(Ordering::SeqCst);
        assert_eq!(total, 1, "终止信号必须恰好一次");
        assert_eq!(tally.values.load(Ordering::SeqCst), 1);
    });
}

#[test]
fn releasing_every_clone_cancels_once() {
    model(|| {
        let tally = Tally::default();
        let cell = SharedCallbackCell::new(tally.clone());
        let twin = cell.clone();

        let handle = thread::spawn(move || drop(twin));
        drop(cell);
        handle.join().expect("释放线程不应 panic");

        assert_eq!(tally.cancelled.load(Ordering::SeqCst), 1);
        assert_eq!(tally.values.load(Ordering::SeqCst), 0);
        assert!(tally.errors.lock().expect("锁未中毒").is_empty());
    });
}
