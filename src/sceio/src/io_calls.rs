//! The guest file I/O calls.
//!
//! Every `*_syscall` method takes its arguments already unmarshalled (paths
//! as `&str`, buffers as guest addresses) and returns exactly what the guest
//! sees in its result register.  Nothing here panics on guest input; bad
//! handles, bad paths and bad pointers all come back as result codes.

use metafs::{FileAccess, FileInfo, FileMove, FsError};
use sysdefs::constants::{
    syscall_error, SceError, PSP_O_APPEND, PSP_O_CREAT, PSP_O_RDONLY, PSP_O_TRUNC, PSP_O_WRONLY,
    PSP_SEEK_CUR, PSP_SEEK_END, SCE_ATTR_DIR, SCE_ATTR_FILE, SCE_FAILURE, SCE_STM_FDIR,
    SCE_STM_FREG, STDERR_ID, STDIN_ID, STDOUT_ID,
};
use sysdefs::data::{SceIoDirEnt, SceIoStat};
use typemap::datatype_conversion::sc_convert_bounded_str;
use typemap::guest_memory::GuestMemory;

use crate::callbacks::Notification;
use crate::kobjects::{DeferredAction, DirListing, FileNode, KernelObject};
use crate::IoSystem;

/// Guest code for a failed VFS operation.
pub fn fs_error_code(err: &FsError) -> u32 {
    match err {
        FsError::NotFound(_) => SceError::ErrnoFileNotFound.code(),
        FsError::NoSuchDevice(_) => SceError::KernelNodev.code(),
        FsError::AlreadyExists(_) => SceError::ErrnoFileExists.code(),
        FsError::CrossDevice => SceError::KernelXdev.code(),
        FsError::InvalidHandle(_) => SceError::KernelBadf.code(),
        FsError::Io(_) => SceError::ErrnoIo.code(),
    }
}

fn fs_failure(err: &FsError, syscall: &str) -> u32 {
    let code = fs_error_code(err);
    log::debug!("{} failed: {} ({:08x})", syscall, err, code);
    code
}

/// Translate guest open flags to VFS access bits.  `O_NBLOCK` and
/// `O_NOWAIT` have no effect on a synchronous backend.
pub fn access_from_flags(flags: u32) -> FileAccess {
    let mut access = FileAccess::empty();
    if flags & PSP_O_RDONLY != 0 {
        access |= FileAccess::READ;
    }
    if flags & PSP_O_WRONLY != 0 {
        access |= FileAccess::WRITE;
    }
    if flags & PSP_O_APPEND != 0 {
        access |= FileAccess::APPEND;
    }
    if flags & PSP_O_CREAT != 0 {
        access |= FileAccess::CREATE;
    }
    if flags & PSP_O_TRUNC != 0 {
        access |= FileAccess::TRUNCATE;
    }
    access
}

/// Guest seek origin.  Unknown values seek from the start.
fn file_move(whence: u32) -> FileMove {
    match whence {
        PSP_SEEK_CUR => FileMove::Current,
        PSP_SEEK_END => FileMove::End,
        _ => FileMove::Begin,
    }
}

/// Build the stat record for `info`.  Timestamps are left at the 0xFE fill.
pub fn stat_from_info(info: &FileInfo) -> SceIoStat {
    let mut stat = SceIoStat::filled();
    if info.is_directory() {
        stat.st_mode = SCE_STM_FDIR;
        stat.st_attr = SCE_ATTR_DIR;
    } else {
        stat.st_mode = SCE_STM_FREG;
        stat.st_attr = SCE_ATTR_FILE;
    }
    stat.st_size = info.size as i64;
    stat.st_private[0] = info.start_sector;
    stat
}

impl IoSystem {
    /// Queue the completion callback for `id`, if one is set.
    fn notify_completion(&mut self, id: u32) {
        if let Ok(node) = self.objects.get::<FileNode>(id) {
            if node.callback_id != 0 {
                let n = Notification::IoComplete {
                    id,
                    callback_id: node.callback_id,
                    callback_arg: node.callback_arg,
                    result: node.async_result,
                };
                self.notifications.push(n);
            }
        }
    }

    /// Record `result` as the outcome of an async call on `id`.
    fn finish_async(&mut self, id: u32, result: u64) {
        if let Ok(node) = self.objects.get_mut::<FileNode>(id) {
            node.async_result = result;
            node.pending_async = true;
        }
        self.notify_completion(id);
    }

    /// Open a file and wrap it in a new kernel object.
    ///
    /// ## Arguments:
    /// - path: device-qualified or current-directory-relative path
    /// - flags: guest `PSP_O_*` bits
    ///
    /// ## Returns:
    /// the new id, or `ERROR_ERRNO_FILE_NOT_FOUND` for any open failure
    pub fn open_syscall(&mut self, path: &str, flags: u32) -> u32 {
        let access = access_from_flags(flags);
        let handle = match self.vfs.open_file(path, access) {
            Ok(h) => h,
            Err(e) => {
                log::error!("sceIoOpen({}, {:08x}): {}", path, flags, e);
                return SceError::ErrnoFileNotFound.code();
            }
        };
        match self.objects.create(KernelObject::File(FileNode::new(path, handle))) {
            Ok(id) => {
                if let Ok(node) = self.objects.get_mut::<FileNode>(id) {
                    node.async_result = u64::from(id);
                }
                log::debug!("{:#x}=sceIoOpen({}, {:08x})", id, path, flags);
                id
            }
            Err(code) => {
                if let Err(e) = self.vfs.close_file(handle) {
                    log::error!("closing {} after failed open: {}", path, e);
                }
                log::error!("sceIoOpen({}): kernel object table full", path);
                code
            }
        }
    }

    /// Close a file; the VFS handle goes with the kernel object.
    pub fn close_syscall(&mut self, id: u32) -> u32 {
        log::debug!("sceIoClose({:#x})", id);
        match self.objects.destroy::<FileNode>(id) {
            Ok(obj) => {
                self.release_object(id, obj);
                0
            }
            Err(code) => code,
        }
    }

    /// Read up to `size` bytes into guest memory at `addr`.
    ///
    /// ## Returns:
    /// bytes read; 0 for stdin; -1 when `addr` is not mapped
    pub fn read_syscall(&mut self, mem: &mut dyn GuestMemory, id: u32, addr: u32, size: u32) -> u32 {
        if id == STDIN_ID {
            log::debug!("sceIoRead STDIN");
            return 0;
        }
        let node = match self.objects.get_mut::<FileNode>(id) {
            Ok(node) => node,
            Err(code) => return code,
        };
        if addr == 0 || !mem.is_valid_address(addr) {
            log::error!("sceIoRead({:#x}): reading into bad pointer {:08x}", id, addr);
            return SCE_FAILURE;
        }
        let want = match self.vfs.remaining_bytes(node.handle) {
            Ok(left) => left.min(u64::from(size)) as usize,
            Err(e) => return fs_failure(&e, "sceIoRead"),
        };
        let mut buf = vec![0u8; want];
        let n = match self.vfs.read_file(node.handle, &mut buf) {
            Ok(n) => n,
            Err(e) => return fs_failure(&e, "sceIoRead"),
        };
        if mem.write_bytes(addr, &buf[..n]).is_err() {
            return syscall_error(SceError::KernelIllegalAddr, "sceIoRead", "destination not mapped");
        }
        node.async_result = n as u64;
        log::debug!("{}=sceIoRead({:#x}, {:08x}, {})", n, id, addr, size);
        n as u32
    }

    /// Write `size` bytes from guest memory at `addr`.  Ids 1 and 2 go to
    /// the log.
    pub fn write_syscall(&mut self, mem: &dyn GuestMemory, id: u32, addr: u32, size: u32) -> u32 {
        if id == STDOUT_ID || id == STDERR_ID {
            let stream = if id == STDOUT_ID { "stdout" } else { "stderr" };
            match sc_convert_bounded_str(mem, addr, size as usize) {
                Ok(text) => log::info!("{}: {}", stream, text.trim_end_matches(['\0', '\n'])),
                Err(e) => log::warn!("{}: {}", stream, e),
            }
            return size;
        }
        let node = match self.objects.get_mut::<FileNode>(id) {
            Ok(node) => node,
            Err(code) => return code,
        };
        let data = match mem.read_bytes(addr, size as usize) {
            Ok(data) => data,
            Err(e) => {
                log::error!("sceIoWrite({:#x}): {}", id, e);
                return SCE_FAILURE;
            }
        };
        let n = match self.vfs.write_file(node.handle, &data) {
            Ok(n) => n,
            Err(e) => return fs_failure(&e, "sceIoWrite"),
        };
        node.async_result = n as u64;
        log::debug!("{}=sceIoWrite({:#x}, {:08x}, {})", n, id, addr, size);
        n as u32
    }

    /// Seek with a 64-bit offset.
    ///
    /// ## Returns:
    /// the new position, or the error code widened to 64 bits
    pub fn lseek_syscall(&mut self, id: u32, offset: i64, whence: u32) -> i64 {
        let node = match self.objects.get_mut::<FileNode>(id) {
            Ok(node) => node,
            Err(code) => return i64::from(code),
        };
        let pos = match self.vfs.seek_file(node.handle, offset, file_move(whence)) {
            Ok(pos) => pos,
            Err(e) => return i64::from(fs_failure(&e, "sceIoLseek")),
        };
        node.async_result = pos;
        log::debug!("{}=sceIoLseek({:#x}, {}, {})", pos, id, offset, whence);
        pos as i64
    }

    /// Seek with a 32-bit offset; the position is truncated to 32 bits.
    pub fn lseek32_syscall(&mut self, id: u32, offset: i32, whence: u32) -> u32 {
        self.lseek_syscall(id, i64::from(offset), whence) as u32
    }

    /// Write the 88-byte stat record for `path` at `addr`.
    pub fn getstat_syscall(&mut self, mem: &mut dyn GuestMemory, path: &str, addr: u32) -> u32 {
        let info = match self.vfs.get_file_info(path) {
            Ok(info) if info.exists => info,
            Ok(_) => return syscall_error(SceError::ErrnoFileNotFound, "sceIoGetstat", path),
            Err(e) => return fs_failure(&e, "sceIoGetstat"),
        };
        let stat = stat_from_info(&info);
        if mem.write_bytes(addr, &stat.to_bytes()).is_err() {
            return syscall_error(SceError::KernelIllegalAddr, "sceIoGetstat", "bad stat pointer");
        }
        log::debug!("sceIoGetstat({}, {:08x}) : sector = {:08x}", path, addr, info.start_sector);
        0
    }

    pub fn remove_syscall(&mut self, path: &str) -> u32 {
        log::debug!("sceIoRemove({})", path);
        match self.vfs.delete_file(path) {
            Ok(()) => 0,
            Err(e) => fs_failure(&e, "sceIoRemove"),
        }
    }

    /// `mode` is accepted and ignored; host permissions apply.
    pub fn mkdir_syscall(&mut self, path: &str, mode: u32) -> u32 {
        log::debug!("sceIoMkdir({}, {:o})", path, mode);
        match self.vfs.mkdir(path) {
            Ok(()) => 0,
            Err(e) => fs_failure(&e, "sceIoMkdir"),
        }
    }

    pub fn rmdir_syscall(&mut self, path: &str) -> u32 {
        log::debug!("sceIoRmdir({})", path);
        match self.vfs.rmdir(path) {
            Ok(()) => 0,
            Err(e) => fs_failure(&e, "sceIoRmdir"),
        }
    }

    pub fn rename_syscall(&mut self, from: &str, to: &str) -> u32 {
        log::debug!("sceIoRename({}, {})", from, to);
        match self.vfs.rename_file(from, to) {
            Ok(()) => 0,
            Err(e) => fs_failure(&e, "sceIoRename"),
        }
    }

    pub fn chdir_syscall(&mut self, dir: &str) -> u32 {
        log::debug!("sceIoChdir({})", dir);
        match self.vfs.chdir(dir) {
            Ok(()) => 0,
            Err(e) => fs_failure(&e, "sceIoChdir"),
        }
    }

    /// Snapshot the listing of `path` into a new directory object.
    pub fn dopen_syscall(&mut self, path: &str) -> u32 {
        let listing = match self.vfs.get_dir_listing(path) {
            Ok(listing) => listing,
            Err(e) => {
                log::debug!("sceIoDopen({}): {}", path, e);
                return SceError::ErrnoFileNotFound.code();
            }
        };
        let dir = DirListing {
            name: path.to_string(),
            listing,
            index: 0,
        };
        match self.objects.create(KernelObject::Directory(dir)) {
            Ok(id) => {
                log::debug!("{:#x}=sceIoDopen({})", id, path);
                id
            }
            Err(code) => code,
        }
    }

    /// Write the next entry of the snapshot at `addr`.
    ///
    /// ## Returns:
    /// 0 once the snapshot is exhausted (and on every later call), otherwise
    /// the number of entries left *after* this one plus one
    pub fn dread_syscall(&mut self, mem: &mut dyn GuestMemory, id: u32, addr: u32) -> u32 {
        let dir = match self.objects.get_mut::<DirListing>(id) {
            Ok(dir) => dir,
            Err(code) => return code,
        };
        let Some(info) = dir.listing.get(dir.index) else {
            log::debug!("sceIoDread({:#x}): no more entries", id);
            return 0;
        };
        let entry = SceIoDirEnt::new(stat_from_info(info), &info.name);
        if mem.write_bytes(addr, &entry.to_bytes()).is_err() {
            return syscall_error(SceError::KernelIllegalAddr, "sceIoDread", "bad dirent pointer");
        }
        log::debug!("sceIoDread({:#x}, {:08x}) {}", id, addr, info.name);
        dir.index += 1;
        (dir.listing.len() - dir.index + 1) as u32
    }

    pub fn dclose_syscall(&mut self, id: u32) -> u32 {
        log::debug!("sceIoDclose({:#x})", id);
        match self.objects.destroy::<DirListing>(id) {
            Ok(obj) => {
                self.release_object(id, obj);
                0
            }
            Err(code) => code,
        }
    }

    pub fn ioctl_syscall(&mut self, id: u32, cmd: u32, in_addr: u32, in_len: u32, out_addr: u32, out_len: u32) -> u32 {
        log::warn!(
            "UNIMPL sceIoIoctl({:#x}, {:08x}, {:08x}, {}, {:08x}, {})",
            id, cmd, in_addr, in_len, out_addr, out_len
        );
        0
    }

    pub fn assign_syscall(&mut self, alias: &str, physical: &str, filesystem: &str, mode: u32) -> u32 {
        log::warn!("UNIMPL sceIoAssign({}, {}, {}, {})", alias, physical, filesystem, mode);
        0
    }

    pub fn sync_syscall(&mut self) -> u32 {
        log::warn!("UNIMPL sceIoSync");
        0
    }

    pub fn change_async_priority_syscall(&mut self, id: u32, priority: u32) -> u32 {
        log::warn!("UNIMPL sceIoChangeAsyncPriority({:#x}, {})", id, priority);
        0
    }

    pub fn stdin_syscall(&self) -> u32 {
        STDIN_ID
    }

    pub fn stdout_syscall(&self) -> u32 {
        STDOUT_ID
    }

    pub fn stderr_syscall(&self) -> u32 {
        STDERR_ID
    }

    // Async entry points.  The work is done here and now; wait/poll only
    // report what was recorded.

    /// Open, recording the new id as the handle's pending result.
    pub fn open_async_syscall(&mut self, path: &str, flags: u32) -> u32 {
        let id = self.open_syscall(path, flags);
        if let Ok(node) = self.objects.get_mut::<FileNode>(id) {
            node.pending_async = true;
        }
        id
    }

    pub fn read_async_syscall(&mut self, mem: &mut dyn GuestMemory, id: u32, addr: u32, size: u32) -> u32 {
        if let Err(code) = self.objects.get::<FileNode>(id) {
            return code;
        }
        let result = self.read_syscall(mem, id, addr, size);
        self.finish_async(id, u64::from(result));
        0
    }

    pub fn write_async_syscall(&mut self, mem: &dyn GuestMemory, id: u32, addr: u32, size: u32) -> u32 {
        if let Err(code) = self.objects.get::<FileNode>(id) {
            return code;
        }
        let result = self.write_syscall(mem, id, addr, size);
        self.finish_async(id, u64::from(result));
        0
    }

    pub fn lseek_async_syscall(&mut self, id: u32, offset: i64, whence: u32) -> u32 {
        if let Err(code) = self.objects.get::<FileNode>(id) {
            return code;
        }
        let result = self.lseek_syscall(id, offset, whence);
        self.finish_async(id, result as u64);
        0
    }

    pub fn lseek32_async_syscall(&mut self, id: u32, offset: i32, whence: u32) -> u32 {
        if let Err(code) = self.objects.get::<FileNode>(id) {
            return code;
        }
        let result = self.lseek32_syscall(id, offset, whence);
        self.finish_async(id, u64::from(result));
        0
    }

    /// Mark `id` for closing.  The object stays alive until the next
    /// wait or poll on it.
    pub fn close_async_syscall(&mut self, id: u32) -> u32 {
        match self.objects.get_mut::<FileNode>(id) {
            Ok(node) => {
                log::debug!("sceIoCloseAsync({:#x})", id);
                node.deferred = Some(DeferredAction::Close);
                node.pending_async = true;
                0
            }
            Err(code) => code,
        }
    }

    /// Run the deferred action on `id`, if any, and return the value the
    /// wait should report.
    fn resolve_async(&mut self, id: u32) -> Result<u64, u32> {
        let node = self.objects.get_mut::<FileNode>(id)?;
        node.pending_async = false;
        match node.deferred.take() {
            None => Ok(node.async_result),
            Some(DeferredAction::Close) => {
                log::debug!("deferred close of {:#x}", id);
                node.async_result = 0;
                self.notify_completion(id);
                let obj = self.objects.destroy::<FileNode>(id)?;
                self.release_object(id, obj);
                Ok(0)
            }
        }
    }

    fn wait_common(&mut self, mem: &mut dyn GuestMemory, id: u32, addr: u32, syscall: &str) -> u32 {
        let result = match self.resolve_async(id) {
            Ok(result) => result,
            Err(code) => {
                log::debug!("{}({:#x}): not an open file", syscall, id);
                return code;
            }
        };
        if mem.write_u64(addr, result).is_err() {
            return syscall_error(SceError::KernelIllegalAddr, syscall, "bad result pointer");
        }
        log::debug!("{}({:#x}, {:08x}) = {}", syscall, id, addr, result);
        0
    }

    /// Complete any pending work on `id` and write its 64-bit result at
    /// `addr`.
    pub fn wait_async_syscall(&mut self, mem: &mut dyn GuestMemory, id: u32, addr: u32) -> u32 {
        self.wait_common(mem, id, addr, "sceIoWaitAsync")
    }

    /// As [`wait_async_syscall`](Self::wait_async_syscall); queued callbacks
    /// run when the thread manager next drains the notification queue.
    pub fn wait_async_cb_syscall(&mut self, mem: &mut dyn GuestMemory, id: u32, addr: u32) -> u32 {
        self.wait_common(mem, id, addr, "sceIoWaitAsyncCB")
    }

    pub fn poll_async_syscall(&mut self, mem: &mut dyn GuestMemory, id: u32, addr: u32) -> u32 {
        self.wait_common(mem, id, addr, "sceIoPollAsync")
    }

    /// Report the last result without running deferred work.
    pub fn get_async_stat_syscall(&mut self, mem: &mut dyn GuestMemory, id: u32, poll: u32, addr: u32) -> u32 {
        let result = match self.objects.get::<FileNode>(id) {
            Ok(node) => node.async_result,
            Err(code) => return code,
        };
        if mem.write_u64(addr, result).is_err() {
            return syscall_error(SceError::KernelIllegalAddr, "sceIoGetAsyncStat", "bad result pointer");
        }
        log::debug!("sceIoGetAsyncStat({:#x}, {}, {:08x}) = {}", id, poll, addr, result);
        0
    }

    /// Register the completion callback for `id`; `callback_id` 0 clears it.
    pub fn set_async_callback_syscall(&mut self, id: u32, callback_id: u32, callback_arg: u32) -> u32 {
        match self.objects.get_mut::<FileNode>(id) {
            Ok(node) => {
                node.callback_id = callback_id;
                node.callback_arg = callback_arg;
                0
            }
            Err(code) => code,
        }
    }
}
