//! The per-participant receive/dispatch loop and its lifecycle.
//!
//! A loop moves through `Idle -> Running -> Stopped`. It runs on its own task,
//! suspends only while waiting for the next inbound message, and stops on the
//! first STOP, end of stream, transport failure, dispatch failure or
//! interruption. Every exit path is logged with the participant's counters.

use core::pin::pin;
use futures::future::{select, Either, FutureExt as _};
use parley_rt::tasks::{self as rt, watch, CancellationToken};
use std::{
    fmt::Debug,
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex},
};

use crate::dispatcher::MessageDispatcher;
use crate::error::ConfigError;
use crate::participant::Participant;
use crate::transport::MessageReceiver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A STOP arrived, from the peer or self-delivered.
    StopReceived,
    /// The inbound stream ended.
    Closed,
    /// Receiving failed.
    TransportFailed(String),
    /// Handling a message failed, e.g. the reply could not be sent, or the
    /// loop task panicked.
    DispatchFailed(String),
    /// [`ParticipantLoop::interrupt`] was called.
    Interrupted,
}

impl StopReason {
    /// True for exits caused by a failure rather than by the protocol.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StopReason::TransportFailed(_) | StopReason::DispatchFailed(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped(StopReason),
}

impl LoopState {
    pub fn is_stopped(&self) -> bool {
        matches!(self, LoopState::Stopped(_))
    }
}

struct LoopInner {
    participant: Arc<Participant>,
    receiver: Mutex<Option<Box<dyn MessageReceiver>>>,
    state: watch::Sender<LoopState>,
    cancellation_token: CancellationToken,
}

/// Handle to a participant's loop. Clones share the same loop.
#[derive(Clone)]
pub struct ParticipantLoop {
    inner: Arc<LoopInner>,
}

impl Debug for ParticipantLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantLoop")
            .field("participant", &self.inner.participant.name())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ParticipantLoop {
    /// Loop reading from the participant's own mailbox. Fails if another loop
    /// already owns that mailbox.
    pub fn new(participant: Arc<Participant>) -> Result<Self, ConfigError> {
        let inbox = participant
            .take_inbox()
            .ok_or_else(|| ConfigError::MailboxAlreadyAttached(participant.name().to_string()))?;
        Ok(Self::with_receiver(participant, inbox))
    }

    /// Loop reading from an arbitrary receive capability.
    pub fn with_receiver(
        participant: Arc<Participant>,
        receiver: impl MessageReceiver + 'static,
    ) -> Self {
        let receiver: Box<dyn MessageReceiver> = Box::new(receiver);
        let (state, _) = watch::channel(LoopState::Idle);
        Self {
            inner: Arc::new(LoopInner {
                participant,
                receiver: Mutex::new(Some(receiver)),
                state,
                cancellation_token: CancellationToken::new(),
            }),
        }
    }

    pub fn state(&self) -> LoopState {
        self.inner.state.borrow().clone()
    }

    /// Spawns the loop task. Ignored unless the loop is still idle.
    pub fn start(&self) {
        let started = self.inner.state.send_if_modified(|state| {
            if *state == LoopState::Idle {
                *state = LoopState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            tracing::info!(
                participant = %self.inner.participant.name(),
                "Loop already started, start() ignored"
            );
            return;
        }

        let receiver = self
            .inner
            .receiver
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        let inner = self.inner.clone();

        // Ignore the JoinHandle; completion is observed through `join`.
        let _join_handle = rt::spawn(async move {
            let guard = CompletionGuard(inner.clone());
            let reason = match receiver {
                Some(receiver) => {
                    run_loop(&inner.participant, receiver, &inner.cancellation_token).await
                }
                None => StopReason::Closed,
            };
            let participant = &inner.participant;
            tracing::info!(
                participant = %participant.name(),
                sent = participant.sent_count(),
                received = participant.received_count(),
                ?reason,
                "Loop terminated"
            );
            inner.state.send_replace(LoopState::Stopped(reason));
            drop(guard);
        });
    }

    /// Asks the loop to stop. Observed the next time it waits for a message.
    pub fn interrupt(&self) {
        tracing::info!(participant = %self.inner.participant.name(), "Interrupt requested");
        self.inner.cancellation_token.cancel();
    }

    /// Waits until the loop has left `Running` and returns the state it ended
    /// in. Returns `Idle` right away for a loop that was never started.
    pub async fn join(&self) -> LoopState {
        let mut updates = self.inner.state.subscribe();
        let result = updates
            .wait_for(|state| *state != LoopState::Running)
            .await
            .map(|state| state.clone());
        match result {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }
}

// Marks the loop stopped if its task ends without reporting: a panic outside
// the dispatch guard, or the task being dropped on runtime shutdown.
struct CompletionGuard(Arc<LoopInner>);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let reason = if std::thread::panicking() {
            tracing::error!(participant = %self.0.participant.name(), "Loop task panicked");
            StopReason::DispatchFailed("loop task panicked".to_string())
        } else {
            StopReason::Interrupted
        };
        self.0.state.send_if_modified(|state| {
            if *state == LoopState::Running {
                *state = LoopState::Stopped(reason);
                true
            } else {
                false
            }
        });
    }
}

async fn run_loop(
    participant: &Arc<Participant>,
    mut receiver: Box<dyn MessageReceiver>,
    cancellation_token: &CancellationToken,
) -> StopReason {
    let dispatcher = MessageDispatcher::new(participant.clone());
    let name = participant.name();
    tracing::info!(participant = %name, role = ?participant.role(), "Loop started");

    loop {
        let next = {
            let cancelled = pin!(cancellation_token.cancelled());
            match select(cancelled, receiver.receive()).await {
                Either::Left(_) => None,
                Either::Right((result, _)) => Some(result),
            }
        };

        let Some(result) = next else {
            tracing::info!(participant = %name, "Interrupted - exiting");
            return StopReason::Interrupted;
        };

        match result {
            Ok(None) => {
                tracing::info!(participant = %name, "Inbound stream closed - exiting");
                return StopReason::Closed;
            }
            Ok(Some(message)) if message.is_stop() => {
                tracing::info!(participant = %name, sender = %message.sender(), "STOP received - exiting");
                if let Err(error) = participant.send_stop_message().await {
                    tracing::warn!(participant = %name, %error, "Could not acknowledge STOP");
                }
                return StopReason::StopReceived;
            }
            Ok(Some(message)) => {
                if participant.is_stopped() {
                    tracing::debug!(
                        participant = %name,
                        sender = %message.sender(),
                        "Already stopped, discarding message"
                    );
                    continue;
                }
                match AssertUnwindSafe(dispatcher.handle(Some(message)))
                    .catch_unwind()
                    .await
                {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        tracing::error!(participant = %name, %error, "Dispatch failed - exiting");
                        return StopReason::DispatchFailed(error.to_string());
                    }
                    Err(panic) => {
                        tracing::error!(participant = %name, "Panic in message handler: {panic:?}");
                        return StopReason::DispatchFailed("panic in message handler".to_string());
                    }
                }
            }
            Err(error) => {
                tracing::warn!(participant = %name, %error, "Receive failed - exiting");
                return StopReason::TransportFailed(error.to_string());
            }
        }
    }
}
