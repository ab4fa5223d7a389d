// src/mailbox.rs
//! Actor mailboxes (binary user payloads plus a priority system lane).

use bytes::Bytes;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::mpsc;

use crate::pid::ActorId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The actor's future ran to completion.
    Normal,
    Panic,
    /// The actor was dropped before completing, e.g. at runtime shutdown.
    Killed,
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitInfo {
    pub from: ActorId,
    pub reason: ExitReason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SystemMessage {
    Exit(ExitInfo),
    /// Heartbeat signal to verify actor responsiveness.
    Ping,
    Pong,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    User(Bytes),
    System(SystemMessage),
}

#[derive(Clone)]
enum UserSender {
    Unbounded(mpsc::UnboundedSender<Bytes>),
    Bounded(mpsc::Sender<Bytes>),
}

enum UserReceiver {
    Unbounded(mpsc::UnboundedReceiver<Bytes>),
    Bounded(mpsc::Receiver<Bytes>),
}

impl UserReceiver {
    async fn recv(&mut self) -> Option<Bytes> {
        match self {
            UserReceiver::Unbounded(rx) => rx.recv().await,
            UserReceiver::Bounded(rx) => rx.recv().await,
        }
    }

    fn try_recv(&mut self) -> Option<Bytes> {
        match self {
            UserReceiver::Unbounded(rx) => rx.try_recv().ok(),
            UserReceiver::Bounded(rx) => rx.try_recv().ok(),
        }
    }
}

/// Sending half, held inside an actor's control block.
#[derive(Clone)]
pub struct MailboxSender {
    tx_user: UserSender,
    tx_sys: mpsc::UnboundedSender<SystemMessage>,
    /// User messages accepted but not yet received.
    queued: Arc<AtomicUsize>,
}

/// Receiving half, owned by the running actor.
pub struct MailboxReceiver {
    rx_user: UserReceiver,
    rx_sys: mpsc::UnboundedReceiver<SystemMessage>,
    queued: Arc<AtomicUsize>,
}

fn assemble(tx_user: UserSender, rx_user: UserReceiver) -> (MailboxSender, MailboxReceiver) {
    let (tx_sys, rx_sys) = mpsc::unbounded_channel();
    let queued = Arc::new(AtomicUsize::new(0));
    (
        MailboxSender {
            tx_user,
            tx_sys,
            queued: queued.clone(),
        },
        MailboxReceiver {
            rx_user,
            rx_sys,
            queued,
        },
    )
}

/// Create an unbounded mailbox.
pub fn channel() -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    assemble(UserSender::Unbounded(tx), UserReceiver::Unbounded(rx))
}

/// Create a mailbox holding at most `capacity` user messages. When full,
/// `send` hands the new message back (drop-new policy).
pub fn bounded_channel(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    assemble(UserSender::Bounded(tx), UserReceiver::Bounded(rx))
}

impl MailboxSender {
    /// Enqueue `msg`; on failure (receiver gone, or bounded queue full) the
    /// message is returned to the caller.
    pub fn send(&self, msg: Message) -> Result<(), Message> {
        match msg {
            Message::User(payload) => {
                self.queued.fetch_add(1, Ordering::SeqCst);
                let res = match &self.tx_user {
                    UserSender::Unbounded(tx) => tx.send(payload).map_err(|e| e.0),
                    UserSender::Bounded(tx) => tx.try_send(payload).map_err(|e| match e {
                        mpsc::error::TrySendError::Full(b) => b,
                        mpsc::error::TrySendError::Closed(b) => b,
                    }),
                };
                res.map_err(|payload| {
                    self.queued.fetch_sub(1, Ordering::SeqCst);
                    Message::User(payload)
                })
            }
            Message::System(sys) => self
                .tx_sys
                .send(sys)
                .map_err(|e| Message::System(e.0)),
        }
    }

    /// Number of user messages currently queued.
    pub fn len(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once the receiving actor has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx_sys.is_closed()
    }
}

impl MailboxReceiver {
    /// Await the next message. Pending system messages always win over
    /// user payloads.
    pub async fn recv(&mut self) -> Option<Message> {
        if let Ok(sys) = self.rx_sys.try_recv() {
            return Some(Message::System(sys));
        }
        tokio::select! {
            biased;
            sys = self.rx_sys.recv() => sys.map(Message::System),
            user = self.rx_user.recv() => user.map(|b| {
                self.queued.fetch_sub(1, Ordering::SeqCst);
                Message::User(b)
            }),
        }
    }

    pub fn try_recv(&mut self) -> Option<Message> {
        if let Ok(sys) = self.rx_sys.try_recv() {
            return Some(Message::System(sys));
        }
        self.rx_user.try_recv().map(|b| {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            Message::User(b)
        })
    }
}
