//! 集成测试共享设施。
//!
//! - `ThreadExecutor`：每次 `post` / `defer` 都在新线程运行工作，用于验证跨线程完成；
//! - `ChannelConsumer`：把终止信号发送到 `futures` 单次通道，测试线程可阻塞等待结果；
//! - `Pipe` / `Stream`：最小的成员连接与自由连接生产者。

#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use futures::channel::oneshot;
use spark_execution::{
    ConnectFree, ConnectMember, Consumer, ExecutionError, Executor, Invocable, OperationHandle,
    Producer, Rejected,
    test_stubs::{CompletionLog, RecordingConsumer, Signal},
};

/// 在独立线程运行延后工作的执行器。
#[derive(Clone, Debug, Default)]
pub struct ThreadExecutor {
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

impl ThreadExecutor {
    pub fn outstanding_work(&self) -> usize {
        self.started
            .load(Ordering::Acquire)
            .saturating_sub(self.finished.load(Ordering::Acquire))
    }
}

impl Executor for ThreadExecutor {
    type Context = ();

    fn context(&self) -> &() {
        &()
    }

    fn on_work_started(&self) {
        self.started.fetch_add(1, Ordering::AcqRel);
    }

    fn on_work_finished(&self) {
        self.finished.fetch_add(1, Ordering::AcqRel);
    }

    fn dispatch<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        work.invoke();
        Ok(())
    }

    fn post<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        thread::spawn(move || work.invoke());
        Ok(())
    }

    fn defer<W: Invocable>(&self, work: W) -> Result<(), Rejected<W>> {
        self.post(work)
    }
}

/// 把唯一的终止信号发送到单次通道的消费者。
#[derive(Debug)]
pub struct ChannelConsumer {
    sender: Option<oneshot::Sender<Signal>>,
}

impl ChannelConsumer {
    pub fn new() -> (Self, oneshot::Receiver<Signal>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    fn send(&mut self, signal: Signal) {
        let sender = self.sender.take().expect("终止信号只能发送一次");
        sender.send(signal).expect("接收端应仍在等待");
    }
}

impl Consumer<()> for ChannelConsumer {
    type Error = ExecutionError;

    fn on_value(&mut self, (): ()) -> Result<(), ExecutionError> {
        self.send(Signal::Value);
        Ok(())
    }

    fn on_error(&mut self, _error: ExecutionError) {
        self.send(Signal::Error);
    }

    fn on_cancelled(&mut self) {
        self.send(Signal::Cancelled);
    }
}

/// 立即完成的操作句柄：`start` 时交付成功值。
pub struct Immediate<R: Consumer<()>> {
    consumer: R,
}

impl<R: Consumer<()>> Immediate<R> {
    pub fn new(consumer: R) -> Self {
        Self { consumer }
    }
}

impl<R: Consumer<()>> OperationHandle for Immediate<R> {
    fn start(mut self) {
        if let Err(error) = self.consumer.on_value(()) {
            self.consumer.on_error(error);
        }
    }
}

/// 自带成员连接的生产者。
#[derive(Clone, Copy, Debug, Default)]
pub struct Pipe;

impl Producer for Pipe {
    type Value = ();
    type Error = ExecutionError;
}

impl<R: Consumer<()>> ConnectMember<R> for Pipe {
    type Operation = Immediate<R>;
    const NOTHROW: bool = true;

    fn connect(self, consumer: R) -> Immediate<R> {
        Immediate::new(consumer)
    }
}

/// 没有成员连接的生产者，由消费者一侧提供自由连接。
#[derive(Clone, Copy, Debug, Default)]
pub struct Stream;

impl Producer for Stream {
    type Value = ();
    type Error = ExecutionError;
}

/// 为 `Stream` 提供自由连接的消费者。
#[derive(Debug)]
pub struct StreamSink {
    pub inner: RecordingConsumer,
}

impl Consumer<()> for StreamSink {
    type Error = ExecutionError;

    fn on_value(&mut self, value: ()) -> Result<(), ExecutionError> {
        self.inner.on_value(value)
    }

    fn on_error(&mut self, error: ExecutionError) {
        self.inner.on_error(error);
    }

    fn on_cancelled(&mut self) {
        self.inner.on_cancelled();
    }
}

impl ConnectFree<Stream> for StreamSink {
    type Operation = Immediate<StreamSink>;

    fn connect_free(_producer: Stream, consumer: Self) -> Immediate<StreamSink> {
        Immediate::new(consumer)
    }
}

impl ConnectFree<Pipe> for StreamSink {
    type Operation = Immediate<StreamSink>;

    fn connect_free(_producer: Pipe, consumer: Self) -> Immediate<StreamSink> {
        Immediate::new(consumer)
    }
}

pub fn stream_sink() -> (StreamSink, CompletionLog) {
    let (inner, log) = RecordingConsumer::recording();
    (StreamSink { inner }, log)
}
