//! Device control (`sceIoDevctl`).
//!
//! Devices here are names, not open files.  A request is routed by
//! `(device, command)` through [`DEVCTL_ROUTES`]; a row with no device list
//! matches any device and is tried only after the device-specific rows.
//! Anything unrouted answers `SCE_KERNEL_ERROR_UNSUP`, which guests treat as
//! an ordinary "not supported" reply.

use sysdefs::constants::{
    SceError, DEVCTL_FATMS_GET_FAT_STATE, DEVCTL_FATMS_REGISTER_CALLBACK,
    DEVCTL_FATMS_SET_FAT_STATE, DEVCTL_FATMS_UNREGISTER_CALLBACK, DEVCTL_MS_DRIVER_STATUS,
    DEVCTL_MS_GET_SIZE, DEVCTL_MS_IS_INSERTED, DEVCTL_MS_REGISTER_CALLBACK,
    DEVCTL_MS_UNREGISTER_CALLBACK, DEVCTL_UMD_GET_CURRENT_LBA, DEVCTL_UMD_GET_DISC_TYPE,
    DEVCTL_UMD_SEEK, DEV_EMULATOR, DEV_KEMULATOR, DEV_MEMSTICK, DEV_MEMSTICK_FAT0,
    DEV_MEMSTICK_HOST, EMULATOR_DEVCTL_GET_HAS_DISPLAY, EMULATOR_DEVCTL_IS_EMULATOR,
    EMULATOR_DEVCTL_SEND_OUTPUT, SCE_FAILURE, UMD_TYPE_GAME,
};
use sysdefs::data::DeviceSize;
use typemap::datatype_conversion::sc_convert_bounded_str;
use typemap::guest_memory::GuestMemory;

use crate::callbacks::{CallbackKind, Notification, RegisterError};
use crate::IoSystem;

/// One devctl call as the guest issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevctlRequest<'a> {
    pub device: &'a str,
    pub cmd: u32,
    pub arg_addr: u32,
    pub arg_len: u32,
    pub out_addr: u32,
    pub out_len: u32,
}

type DevctlHandler = fn(&mut IoSystem, &mut dyn GuestMemory, &DevctlRequest<'_>) -> u32;

pub struct DevctlRoute {
    /// `None` matches every device.
    pub devices: Option<&'static [&'static str]>,
    pub cmd: u32,
    pub handler: DevctlHandler,
}

const MEMSTICK_DEVICES: &[&str] = &[DEV_MEMSTICK_HOST, DEV_MEMSTICK];
const MEMSTICK_SIZE_DEVICES: &[&str] = &[DEV_MEMSTICK_HOST, DEV_MEMSTICK, DEV_MEMSTICK_FAT0];
const FAT_DEVICES: &[&str] = &[DEV_MEMSTICK_FAT0];
const EMULATOR_DEVICES: &[&str] = &[DEV_EMULATOR, DEV_KEMULATOR];

pub static DEVCTL_ROUTES: &[DevctlRoute] = &[
    // disc queries answer for any device name
    DevctlRoute { devices: None, cmd: DEVCTL_UMD_GET_DISC_TYPE, handler: umd_get_disc_type },
    DevctlRoute { devices: None, cmd: DEVCTL_UMD_GET_CURRENT_LBA, handler: umd_get_current_lba },
    DevctlRoute { devices: None, cmd: DEVCTL_UMD_SEEK, handler: umd_seek },
    DevctlRoute { devices: Some(MEMSTICK_DEVICES), cmd: DEVCTL_MS_REGISTER_CALLBACK, handler: ms_register_callback },
    DevctlRoute { devices: Some(MEMSTICK_DEVICES), cmd: DEVCTL_MS_UNREGISTER_CALLBACK, handler: ms_unregister_callback },
    DevctlRoute { devices: Some(MEMSTICK_DEVICES), cmd: DEVCTL_MS_IS_INSERTED, handler: ms_write_one },
    DevctlRoute { devices: Some(MEMSTICK_DEVICES), cmd: DEVCTL_MS_DRIVER_STATUS, handler: ms_write_one },
    DevctlRoute { devices: Some(MEMSTICK_SIZE_DEVICES), cmd: DEVCTL_MS_GET_SIZE, handler: ms_get_size },
    DevctlRoute { devices: Some(FAT_DEVICES), cmd: DEVCTL_FATMS_REGISTER_CALLBACK, handler: fat_register_callback },
    DevctlRoute { devices: Some(FAT_DEVICES), cmd: DEVCTL_FATMS_UNREGISTER_CALLBACK, handler: fat_unregister_callback },
    DevctlRoute { devices: Some(FAT_DEVICES), cmd: DEVCTL_FATMS_SET_FAT_STATE, handler: fat_set_state },
    DevctlRoute { devices: Some(FAT_DEVICES), cmd: DEVCTL_FATMS_GET_FAT_STATE, handler: fat_get_state },
    DevctlRoute { devices: Some(EMULATOR_DEVICES), cmd: EMULATOR_DEVCTL_GET_HAS_DISPLAY, handler: emu_has_display },
    DevctlRoute { devices: Some(EMULATOR_DEVICES), cmd: EMULATOR_DEVCTL_SEND_OUTPUT, handler: emu_send_output },
    DevctlRoute { devices: Some(EMULATOR_DEVICES), cmd: EMULATOR_DEVCTL_IS_EMULATOR, handler: emu_is_emulator },
];

/// Find the handler for `(device, cmd)`.
pub fn lookup_route(device: &str, cmd: u32) -> Option<&'static DevctlRoute> {
    DEVCTL_ROUTES
        .iter()
        .find(|r| r.cmd == cmd && r.devices.is_some_and(|devs| devs.contains(&device)))
        .or_else(|| DEVCTL_ROUTES.iter().find(|r| r.cmd == cmd && r.devices.is_none()))
}

impl IoSystem {
    /// Device control.
    ///
    /// ## Arguments:
    /// - device: device name including the trailing `:`
    /// - cmd: device-specific command number
    /// - arg_addr, arg_len: input block
    /// - out_addr, out_len: output block
    ///
    /// ## Returns:
    /// the handler's result, or `SCE_KERNEL_ERROR_UNSUP` if nothing is routed
    #[allow(clippy::too_many_arguments)]
    pub fn devctl_syscall(
        &mut self,
        mem: &mut dyn GuestMemory,
        device: &str,
        cmd: u32,
        arg_addr: u32,
        arg_len: u32,
        out_addr: u32,
        out_len: u32,
    ) -> u32 {
        let req = DevctlRequest { device, cmd, arg_addr, arg_len, out_addr, out_len };
        // the debug channel is chatty enough on its own
        if !EMULATOR_DEVICES.contains(&device) {
            log::debug!(
                "sceIoDevctl(\"{}\", {:08x}, {:08x}, {}, {:08x}, {})",
                device, cmd, arg_addr, arg_len, out_addr, out_len
            );
        }
        match lookup_route(device, cmd) {
            Some(route) => (route.handler)(self, mem, &req),
            None => {
                log::warn!("sceIoDevctl: unsupported command {:08x} on \"{}\"", cmd, device);
                SceError::KernelUnsup.code()
            }
        }
    }

    fn register_device_callback(&mut self, kind: CallbackKind, callback_id: u32) -> Result<(), RegisterError> {
        self.callbacks.register(kind, callback_id)?;
        let state = match kind {
            CallbackKind::Memstick => self.memstick.state,
            CallbackKind::MemstickFat => self.memstick.fat_state,
        };
        log::debug!("{:?} callback {} registered, notifying immediately", kind, callback_id);
        self.notifications.push(Notification::Device { kind, callback_id, state });
        Ok(())
    }
}

/// Read the callback id a register/unregister request points at.
fn callback_arg(mem: &dyn GuestMemory, req: &DevctlRequest<'_>) -> Option<u32> {
    if req.arg_len != 4 || !mem.is_valid_address(req.arg_addr) {
        return None;
    }
    mem.read_u32(req.arg_addr).ok()
}

fn write_out_u32(mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>, value: u32, fail: u32) -> u32 {
    if !mem.is_valid_address(req.out_addr) {
        return fail;
    }
    match mem.write_u32(req.out_addr, value) {
        Ok(()) => 0,
        Err(e) => {
            log::debug!("devctl {:08x}: {}", req.cmd, e);
            fail
        }
    }
}

fn umd_get_disc_type(_: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    write_out_u32(mem, req, UMD_TYPE_GAME, SCE_FAILURE)
}

fn umd_get_current_lba(_: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    write_out_u32(mem, req, 0, SCE_FAILURE)
}

fn umd_seek(_: &mut IoSystem, _: &mut dyn GuestMemory, _: &DevctlRequest<'_>) -> u32 {
    0
}

fn ms_register_callback(sys: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    let Some(cb) = callback_arg(mem, req) else {
        return SceError::KernelUnsup.code();
    };
    match sys.register_device_callback(CallbackKind::Memstick, cb) {
        Ok(()) => 0,
        Err(RegisterError::TooMany) => SceError::MemstickDevctlTooManyCallbacks.code(),
        Err(_) => SceError::MemstickDevctlBadParams.code(),
    }
}

fn ms_unregister_callback(sys: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    let Some(cb) = callback_arg(mem, req) else {
        return SceError::KernelUnsup.code();
    };
    match sys.callbacks.unregister(CallbackKind::Memstick, cb) {
        Ok(()) => {
            log::debug!("unregistered memstick callback {}", cb);
            0
        }
        Err(_) => SceError::MemstickDevctlBadParams.code(),
    }
}

/// Inserted / driver-ready queries.
fn ms_write_one(_: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    write_out_u32(mem, req, 1, SceError::MemstickDevctlBadParams.code())
}

/// The size block goes to the pointer stored at `arg`, not to `out`.
fn ms_get_size(_: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    let bad = SceError::MemstickDevctlBadParams.code();
    if !mem.is_valid_address(req.arg_addr) {
        return bad;
    }
    let Ok(pointer) = mem.read_u32(req.arg_addr) else {
        return bad;
    };
    match mem.write_bytes(pointer, &DeviceSize::memstick().to_bytes()) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("memstick size query: {}", e);
            bad
        }
    }
}

fn fat_register_callback(sys: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    match callback_arg(mem, req) {
        Some(cb) if sys.register_device_callback(CallbackKind::MemstickFat, cb).is_ok() => 0,
        _ => SCE_FAILURE,
    }
}

fn fat_unregister_callback(sys: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    match callback_arg(mem, req) {
        Some(cb) if sys.callbacks.unregister(CallbackKind::MemstickFat, cb).is_ok() => {
            log::debug!("unregistered memstick FAT callback {}", cb);
            0
        }
        _ => SCE_FAILURE,
    }
}

fn fat_set_state(sys: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    match callback_arg(mem, req) {
        Some(state) => {
            sys.memstick.fat_state = state;
            0
        }
        None => {
            log::error!("set FAT state: bad argument block");
            SCE_FAILURE
        }
    }
}

fn fat_get_state(sys: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    if req.out_len != 4 {
        log::error!("get FAT state: bad output block");
        return SCE_FAILURE;
    }
    write_out_u32(mem, req, sys.memstick.fat_state, SCE_FAILURE)
}

fn emu_has_display(_: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    if let Err(e) = mem.write_u32(req.out_addr, 0) {
        log::debug!("has-display query: {}", e);
    }
    0
}

fn emu_send_output(sys: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    let text = match sc_convert_bounded_str(&*mem, req.arg_addr, req.arg_len as usize) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("emulator debug output: {}", e);
            return 0;
        }
    };
    if sys.config.print_emu_log {
        log::info!("{}", text.trim_end_matches('\n'));
        sys.emu_debug_output.push_str(&text);
    } else {
        log::debug!("{}", text.trim_end_matches('\n'));
    }
    0
}

fn emu_is_emulator(_: &mut IoSystem, mem: &mut dyn GuestMemory, req: &DevctlRequest<'_>) -> u32 {
    if let Err(e) = mem.write_u32(req.out_addr, 1) {
        log::debug!("is-emulator query: {}", e);
    }
    0
}
