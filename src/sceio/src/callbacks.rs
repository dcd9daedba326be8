//! Callback registrations and the notification queue.
//!
//! Nothing here runs guest code.  Notifications are queued while a call
//! executes and the thread manager drains the queue after the call has
//! returned, so a completion is always observed after the call that caused
//! it.

use std::collections::VecDeque;

use sysdefs::constants::MEMSTICK_MAX_CALLBACKS;

/// Which list a callback is registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Memory stick insert/eject (`mscmhc0:` / `ms0:`).
    Memstick,
    /// Memory stick FAT assignment (`fatms0:`).
    MemstickFat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// An async file operation finished on `id`.
    IoComplete {
        id: u32,
        callback_id: u32,
        callback_arg: u32,
        result: u64,
    },
    /// Deliver `state` to a memory stick callback.
    Device {
        kind: CallbackKind,
        callback_id: u32,
        state: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    AlreadyRegistered,
    TooMany,
    NotRegistered,
}

#[derive(Debug, Default)]
pub struct CallbackRegistry {
    memstick: Vec<u32>,
    memstick_fat: Vec<u32>,
}

impl CallbackRegistry {
    fn list(&mut self, kind: CallbackKind) -> &mut Vec<u32> {
        match kind {
            CallbackKind::Memstick => &mut self.memstick,
            CallbackKind::MemstickFat => &mut self.memstick_fat,
        }
    }

    pub fn register(&mut self, kind: CallbackKind, callback_id: u32) -> Result<(), RegisterError> {
        let list = self.list(kind);
        if list.contains(&callback_id) {
            return Err(RegisterError::AlreadyRegistered);
        }
        if list.len() >= MEMSTICK_MAX_CALLBACKS {
            return Err(RegisterError::TooMany);
        }
        list.push(callback_id);
        Ok(())
    }

    pub fn unregister(&mut self, kind: CallbackKind, callback_id: u32) -> Result<(), RegisterError> {
        let list = self.list(kind);
        let pos = list
            .iter()
            .position(|&id| id == callback_id)
            .ok_or(RegisterError::NotRegistered)?;
        list.remove(pos);
        Ok(())
    }

    pub fn registered(&self, kind: CallbackKind) -> &[u32] {
        match kind {
            CallbackKind::Memstick => &self.memstick,
            CallbackKind::MemstickFat => &self.memstick_fat,
        }
    }
}

/// FIFO of pending notifications.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    queue: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, n: Notification) {
        log::trace!("queue notification {:?}", n);
        self.queue.push_back(n);
    }

    /// Hand over everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
