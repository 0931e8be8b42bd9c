use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

pub trait Actor: Send + 'static {}

impl<T> Actor for T where T: Send + 'static {}

pub trait Message: Send + 'static {
    type Response: Send + 'static;
}

pub struct ActorContext<A: Actor> {
    stop_requested: bool,
    self_ref: Option<ActorRef<A>>,
    _marker: PhantomData<fn() -> A>,
}

impl<A: Actor> ActorContext<A> {
    fn new() -> Self {
        Self {
            stop_requested: false,
            self_ref: None,
            _marker: PhantomData,
        }
    }

    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub fn actor_ref(&self) -> ActorRef<A> {
        self.self_ref
            .as_ref()
            .expect("actor_ref is only available while handling a message")
            .clone()
    }

    /// Reference that does not keep the mailbox open.
    ///
    /// Background tasks owned by the actor hold this instead of an
    /// [`ActorRef`] so that dropping every external handle still stops the
    /// actor.
    pub fn weak_ref(&self) -> WeakActorRef<A> {
        self.actor_ref().downgrade()
    }

    fn enter_message(&mut self, self_ref: ActorRef<A>) {
        self.self_ref = Some(self_ref);
    }

    fn leave_message(&mut self) {
        self.self_ref = None;
    }
}

#[async_trait::async_trait]
pub trait Handler<M>: Actor
where
    M: Message,
    Self: Sized,
{
    async fn handle(&mut self, message: M, ctx: &mut ActorContext<Self>) -> M::Response;
}

trait Envelope<A: Actor>: Send + 'static {
    fn handle<'a>(
        self: Box<Self>,
        actor: &'a mut A,
        ctx: &'a mut ActorContext<A>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

struct CastEnvelope<M, A>
where
    M: Message<Response = ()>,
    A: Handler<M>,
{
    message: M,
    self_ref: ActorRef<A>,
    _marker: PhantomData<fn() -> A>,
}

impl<M, A> Envelope<A> for CastEnvelope<M, A>
where
    M: Message<Response = ()>,
    A: Handler<M>,
{
    fn handle<'a>(
        self: Box<Self>,
        actor: &'a mut A,
        ctx: &'a mut ActorContext<A>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let CastEnvelope {
                message, self_ref, ..
            } = *self;
            ctx.enter_message(self_ref);
            actor.handle(message, ctx).await;
            ctx.leave_message();
        })
    }
}

struct CallEnvelope<M, A>
where
    M: Message,
    A: Handler<M>,
{
    message: M,
    response_tx: oneshot::Sender<M::Response>,
    self_ref: ActorRef<A>,
    _marker: PhantomData<fn() -> A>,
}

impl<M, A> Envelope<A> for CallEnvelope<M, A>
where
    M: Message,
    A: Handler<M>,
{
    fn handle<'a>(
        self: Box<Self>,
        actor: &'a mut A,
        ctx: &'a mut ActorContext<A>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let CallEnvelope {
                message,
                response_tx,
                self_ref,
                ..
            } = *self;
            ctx.enter_message(self_ref);
            let response = actor.handle(message, ctx).await;
            ctx.leave_message();
            let _ = response_tx.send(response);
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastError {
    MailboxClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallError {
    MailboxClosed,
    Timeout,
    ActorStopped,
}

/// Strong mailbox handle; the actor runs while at least one exists.
pub struct ActorRef<A: Actor> {
    tx: mpsc::UnboundedSender<Box<dyn Envelope<A>>>,
    name: &'static str,
}

impl<A: Actor> Clone for ActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            name: self.name,
        }
    }
}

impl<A: Actor> ActorRef<A> {
    /// Name given at spawn time, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn downgrade(&self) -> WeakActorRef<A> {
        WeakActorRef {
            tx: self.tx.downgrade(),
            name: self.name,
        }
    }

    pub fn cast<M>(&self, message: M) -> Result<(), CastError>
    where
        M: Message<Response = ()>,
        A: Handler<M>,
    {
        let envelope: Box<dyn Envelope<A>> = Box::new(CastEnvelope::<M, A> {
            message,
            self_ref: self.clone(),
            _marker: PhantomData,
        });
        self.tx.send(envelope).map_err(|_| CastError::MailboxClosed)
    }

    pub async fn call<M>(&self, message: M, timeout: Duration) -> Result<M::Response, CallError>
    where
        M: Message,
        A: Handler<M>,
    {
        let (response_tx, response_rx) = oneshot::channel();
        let envelope: Box<dyn Envelope<A>> = Box::new(CallEnvelope::<M, A> {
            message,
            response_tx,
            self_ref: self.clone(),
            _marker: PhantomData,
        });
        self.tx
            .send(envelope)
            .map_err(|_| CallError::MailboxClosed)?;
        match tokio::time::timeout(timeout, response_rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => {
                debug!(actor = self.name, "actor dropped a call without replying");
                Err(CallError::ActorStopped)
            },
            Err(_) => {
                warn!(
                    actor = self.name,
                    timeout_ms = timeout.as_millis() as u64,
                    "actor call timed out"
                );
                Err(CallError::Timeout)
            },
        }
    }
}

/// Non-owning counterpart of [`ActorRef`].
pub struct WeakActorRef<A: Actor> {
    tx: mpsc::WeakUnboundedSender<Box<dyn Envelope<A>>>,
    name: &'static str,
}

impl<A: Actor> Clone for WeakActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            name: self.name,
        }
    }
}

impl<A: Actor> WeakActorRef<A> {
    /// Returns `None` once every strong reference is gone.
    pub fn upgrade(&self) -> Option<ActorRef<A>> {
        self.tx.upgrade().map(|tx| ActorRef {
            tx,
            name: self.name,
        })
    }

    pub fn cast<M>(&self, message: M) -> Result<(), CastError>
    where
        M: Message<Response = ()>,
        A: Handler<M>,
    {
        match self.upgrade() {
            Some(actor_ref) => actor_ref.cast(message),
            None => Err(CastError::MailboxClosed),
        }
    }
}

pub fn spawn_actor<A: Actor>(actor: A) -> (ActorRef<A>, JoinHandle<()>) {
    spawn_actor_named(actor, "mediactl-actor")
}

pub fn spawn_actor_named<A: Actor>(
    actor: A,
    name: &'static str,
) -> (ActorRef<A>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel::<Box<dyn Envelope<A>>>();
    let actor_ref = ActorRef { tx, name };
    let join = crate::spawn(run_actor_loop(actor, rx, name));
    (actor_ref, join)
}

async fn run_actor_loop<A: Actor>(
    mut actor: A,
    mut rx: mpsc::UnboundedReceiver<Box<dyn Envelope<A>>>,
    name: &'static str,
) {
    let mut ctx = ActorContext::<A>::new();
    while let Some(envelope) = rx.recv().await {
        let result = AssertUnwindSafe(envelope.handle(&mut actor, &mut ctx))
            .catch_unwind()
            .await;
        if result.is_err() {
            error!(actor = name, "actor handler panicked, stopping actor");
            break;
        }
        if ctx.is_stop_requested() {
            break;
        }
    }
    debug!(actor = name, "actor loop exited");
}
