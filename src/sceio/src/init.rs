use std::path::Path;

use kobjtables::HandleTable;
use metafs::{shared, DirectoryFileSystem, MetaFileSystem};
use sysdefs::constants::{DEV_FLASH0, DEV_FLASH1, DEV_MEMSTICK, DEV_MEMSTICK_FAT, DEV_MEMSTICK_FAT0};

use crate::callbacks::{CallbackRegistry, NotificationQueue};
use crate::config::IoConfig;
use crate::{IoSystem, MemstickState};

/// Make sure a backing directory exists.  Failure is not fatal: the device
/// is still mounted and every access to it will report not-found.
fn ensure_host_dir(dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        log::warn!("cannot create {}: {}", dir.display(), e);
    }
}

impl IoSystem {
    /// Bring up the I/O subsystem.
    ///
    /// This function will do following things:
    /// 1. Create the host directories named in `config` if they are missing.
    /// 2. Mount one memory stick backend under `ms0:`, `fatms0:` and `fatms:`.
    /// 3. Mount one flash backend under `flash0:` and `flash1:`.
    /// 4. Start with an empty kernel object table.
    ///
    /// Ids 1, 2 and 3 (stdout, stderr, stdin) are never in the table; the
    /// calls recognize them directly.
    pub fn start(config: IoConfig) -> IoSystem {
        log::info!("Starting up I/O...");

        ensure_host_dir(&config.memstick_dir);
        ensure_host_dir(&config.flash_dir);

        let mut vfs = MetaFileSystem::new();
        let memstick = shared(DirectoryFileSystem::new(&config.memstick_dir));
        let flash = shared(DirectoryFileSystem::new(&config.flash_dir));
        vfs.mount(DEV_MEMSTICK, memstick.clone());
        vfs.mount(DEV_MEMSTICK_FAT0, memstick.clone());
        vfs.mount(DEV_MEMSTICK_FAT, memstick);
        vfs.mount(DEV_FLASH0, flash.clone());
        vfs.mount(DEV_FLASH1, flash);

        IoSystem {
            objects: HandleTable::new(),
            vfs,
            config,
            memstick: MemstickState::default(),
            callbacks: CallbackRegistry::default(),
            notifications: NotificationQueue::default(),
            emu_debug_output: String::new(),
        }
    }

    /// Shut down the I/O subsystem.
    ///
    /// Every live kernel object is destroyed, which closes the files they
    /// hold.  Pending deferred actions are dropped without notification.
    pub fn shutdown(&mut self) {
        let live = self.objects.drain();
        if !live.is_empty() {
            log::info!("I/O shutdown: releasing {} open objects", live.len());
        }
        for (id, obj) in live {
            self.release_object(id, obj);
        }
        self.notifications.drain();
    }
}
