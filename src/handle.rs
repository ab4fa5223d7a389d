// src/handle.rs
//! Shared actor handles.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::error::{IrisError, Result};
use crate::mailbox::{ExitReason, MailboxSender, Message};
use crate::pid::ActorId;

/// Control state shared by every holder of an actor's handle.
pub struct ActorControl {
    id: ActorId,
    mailbox: MailboxSender,
    exit: Mutex<Option<ExitReason>>,
}

impl ActorControl {
    pub fn id(&self) -> ActorId {
        self.id
    }
}

impl Drop for ActorControl {
    fn drop(&mut self) {
        tracing::trace!(actor = %self.id, "actor control block released");
    }
}

/// Reference-counted handle to an actor, or the empty handle.
///
/// Cloning a handle adds a holder; the control block is freed when the last
/// holder drops. After the actor terminates its handles stay valid and
/// report the exit reason.
#[derive(Clone, Default)]
pub struct ActorHandle {
    inner: Option<Arc<ActorControl>>,
}

impl ActorHandle {
    pub fn new(id: ActorId, mailbox: MailboxSender) -> Self {
        Self {
            inner: Some(Arc::new(ActorControl {
                id,
                mailbox,
                exit: Mutex::new(None),
            })),
        }
    }

    /// The empty handle, returned by lookups that find nothing.
    pub const fn invalid() -> Self {
        Self { inner: None }
    }

    /// False for the empty handle.
    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Id of the referenced actor; `None` for the empty handle.
    pub fn id(&self) -> Option<ActorId> {
        self.inner.as_ref().map(|c| c.id)
    }

    /// Number of live holders of the control block; 0 for the empty handle.
    pub fn strong_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Arc::strong_count)
    }

    pub fn control(&self) -> Option<&ActorControl> {
        self.inner.as_deref()
    }

    /// True until the actor has terminated. The empty handle is never alive.
    pub fn is_alive(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|c| c.exit.lock().is_none())
    }

    /// Why the actor terminated, once it has.
    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.inner.as_ref().and_then(|c| c.exit.lock().clone())
    }

    /// Record termination. Only the first reason sticks.
    pub(crate) fn mark_exited(&self, reason: ExitReason) {
        if let Some(control) = &self.inner {
            let mut exit = control.exit.lock();
            if exit.is_none() {
                *exit = Some(reason);
            }
        }
    }

    /// Deliver `msg` to the referenced actor's mailbox.
    pub fn send(&self, msg: Message) -> Result<()> {
        let control = self.inner.as_ref().ok_or(IrisError::InvalidHandle)?;
        control
            .mailbox
            .send(msg)
            .map_err(|_| IrisError::Undeliverable(control.id))
    }
}

impl PartialEq for ActorHandle {
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for ActorHandle {}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(c) => f
                .debug_struct("ActorHandle")
                .field("id", &c.id)
                .field("exit", &*c.exit.lock())
                .finish(),
            None => f.write_str("ActorHandle(invalid)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox;
    use bytes::Bytes;

    fn handle(id: u64) -> (ActorHandle, mailbox::MailboxReceiver) {
        let (tx, rx) = mailbox::channel();
        (ActorHandle::new(ActorId::new(id), tx), rx)
    }

    #[test]
    fn empty_handle() {
        let h = ActorHandle::default();
        assert!(!h.is_valid());
        assert_eq!(h, ActorHandle::invalid());
        assert_eq!(h.strong_count(), 0);
        assert_eq!(h.id(), None);
        assert!(!h.is_alive());
        assert!(matches!(
            h.send(Message::User(Bytes::new())),
            Err(IrisError::InvalidHandle)
        ));
    }

    #[test]
    fn clones_share_identity_and_count() {
        let (a, _rx) = handle(7);
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.strong_count(), 2);
        drop(b);
        assert_eq!(a.strong_count(), 1);

        let (other, _rx2) = handle(7);
        assert_ne!(a, other, "equality is identity, not id");
    }

    #[test]
    fn exit_reason_is_sticky() {
        let (h, _rx) = handle(1);
        assert!(h.is_alive());
        h.mark_exited(ExitReason::Panic);
        h.mark_exited(ExitReason::Normal);
        assert!(!h.is_alive());
        assert_eq!(h.exit_reason(), Some(ExitReason::Panic));
    }

    #[test]
    fn send_reaches_mailbox() {
        let (h, mut rx) = handle(3);
        h.send(Message::User(Bytes::from_static(b"hi"))).unwrap();
        assert_eq!(rx.try_recv(), Some(Message::User(Bytes::from_static(b"hi"))));
        drop(rx);
        assert!(matches!(
            h.send(Message::User(Bytes::new())),
            Err(IrisError::Undeliverable(id)) if id == ActorId::new(3)
        ));
    }
}
