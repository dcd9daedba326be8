// Device control tests.

use crate::callbacks::{CallbackKind, Notification};
use crate::tests::*;
use crate::IoSystem;
use sysdefs::constants::{
    SceError, DEVCTL_FATMS_GET_FAT_STATE, DEVCTL_FATMS_REGISTER_CALLBACK,
    DEVCTL_FATMS_SET_FAT_STATE, DEVCTL_FATMS_UNREGISTER_CALLBACK, DEVCTL_MS_DRIVER_STATUS,
    DEVCTL_MS_GET_SIZE, DEVCTL_MS_IS_INSERTED, DEVCTL_MS_REGISTER_CALLBACK,
    DEVCTL_MS_UNREGISTER_CALLBACK, DEVCTL_UMD_GET_CURRENT_LBA, DEVCTL_UMD_GET_DISC_TYPE,
    DEVCTL_UMD_SEEK, EMULATOR_DEVCTL_GET_HAS_DISPLAY, EMULATOR_DEVCTL_IS_EMULATOR,
    EMULATOR_DEVCTL_SEND_OUTPUT, MEMSTICK_FAT_STATE_ASSIGNED, MEMSTICK_FAT_STATE_UNASSIGNED,
    MEMSTICK_MAX_CALLBACKS, MEMSTICK_STATE_DRIVER_READY, SCE_FAILURE, UMD_TYPE_GAME,
};
use sysdefs::data::DeviceSize;
use typemap::guest_memory::GuestMemory;

/// devctl with a single-word argument block at ARG.
fn devctl_word(sys: &mut IoSystem, mem: &mut FlatMemory, device: &str, cmd: u32, word: u32) -> u32 {
    mem.write_u32(ARG, word).unwrap();
    sys.devctl_syscall(mem, device, cmd, ARG, 4, 0, 0)
}

#[test]
fn test_unknown_pairs_are_unsupported() {
    let (_root, mut sys, mut mem) = test_setup();
    let unsup = SceError::KernelUnsup.code();
    assert_eq!(sys.devctl_syscall(&mut mem, "ms0:", 0x1234_5678, 0, 0, 0, 0), unsup);
    // a memstick command on a device that does not take it
    assert_eq!(devctl_word(&mut sys, &mut mem, "flash0:", DEVCTL_MS_REGISTER_CALLBACK, 1), unsup);
    assert_eq!(sys.devctl_syscall(&mut mem, "flash0:", DEVCTL_MS_GET_SIZE, ARG, 4, 0, 0), unsup);
    assert_eq!(sys.devctl_syscall(&mut mem, "nodev:", EMULATOR_DEVCTL_IS_EMULATOR, 0, 0, OUT, 4), unsup);
}

#[test]
fn test_disc_queries_answer_on_any_device() {
    let (_root, mut sys, mut mem) = test_setup();
    for device in ["umd0:", "ms0:", "whatever:"] {
        mem.write_u32(OUT, 0).unwrap();
        assert_eq!(sys.devctl_syscall(&mut mem, device, DEVCTL_UMD_GET_DISC_TYPE, 0, 0, OUT, 4), 0);
        assert_eq!(mem.read_u32(OUT).unwrap(), UMD_TYPE_GAME);
    }
    mem.write_u32(OUT, 0xFFFF).unwrap();
    assert_eq!(sys.devctl_syscall(&mut mem, "umd0:", DEVCTL_UMD_GET_CURRENT_LBA, 0, 0, OUT, 4), 0);
    assert_eq!(mem.read_u32(OUT).unwrap(), 0);
    assert_eq!(sys.devctl_syscall(&mut mem, "umd0:", DEVCTL_UMD_SEEK, 0, 0, 0, 0), 0);

    assert_eq!(
        sys.devctl_syscall(&mut mem, "umd0:", DEVCTL_UMD_GET_DISC_TYPE, 0, 0, UNMAPPED, 4),
        SCE_FAILURE
    );
}

#[test]
fn test_memstick_callback_registration() {
    let (_root, mut sys, mut mem) = test_setup();
    let bad = SceError::MemstickDevctlBadParams.code();

    assert_eq!(devctl_word(&mut sys, &mut mem, "mscmhc0:", DEVCTL_MS_REGISTER_CALLBACK, 5), 0);
    assert_eq!(
        sys.drain_notifications(),
        vec![Notification::Device {
            kind: CallbackKind::Memstick,
            callback_id: 5,
            state: MEMSTICK_STATE_DRIVER_READY,
        }]
    );
    // ms0: shares the list
    assert_eq!(devctl_word(&mut sys, &mut mem, "ms0:", DEVCTL_MS_REGISTER_CALLBACK, 5), bad);
    assert!(sys.drain_notifications().is_empty());

    assert_eq!(devctl_word(&mut sys, &mut mem, "ms0:", DEVCTL_MS_UNREGISTER_CALLBACK, 5), 0);
    assert_eq!(devctl_word(&mut sys, &mut mem, "ms0:", DEVCTL_MS_UNREGISTER_CALLBACK, 5), bad);
}

#[test]
fn test_memstick_callback_bad_argument_block() {
    let (_root, mut sys, mut mem) = test_setup();
    let unsup = SceError::KernelUnsup.code();
    mem.write_u32(ARG, 5).unwrap();
    assert_eq!(sys.devctl_syscall(&mut mem, "ms0:", DEVCTL_MS_REGISTER_CALLBACK, ARG, 2, 0, 0), unsup);
    assert_eq!(sys.devctl_syscall(&mut mem, "ms0:", DEVCTL_MS_REGISTER_CALLBACK, UNMAPPED, 4, 0, 0), unsup);
    assert!(sys.drain_notifications().is_empty());
}

#[test]
fn test_memstick_callback_limit() {
    let (_root, mut sys, mut mem) = test_setup();
    for cb in 1..=MEMSTICK_MAX_CALLBACKS as u32 {
        assert_eq!(devctl_word(&mut sys, &mut mem, "ms0:", DEVCTL_MS_REGISTER_CALLBACK, cb), 0);
    }
    assert_eq!(
        devctl_word(&mut sys, &mut mem, "ms0:", DEVCTL_MS_REGISTER_CALLBACK, 1000),
        SceError::MemstickDevctlTooManyCallbacks.code()
    );
}

#[test]
fn test_memstick_status_queries() {
    let (_root, mut sys, mut mem) = test_setup();
    for cmd in [DEVCTL_MS_IS_INSERTED, DEVCTL_MS_DRIVER_STATUS] {
        mem.write_u32(OUT, 0).unwrap();
        assert_eq!(sys.devctl_syscall(&mut mem, "mscmhc0:", cmd, 0, 0, OUT, 4), 0);
        assert_eq!(mem.read_u32(OUT).unwrap(), 1);
        assert_eq!(
            sys.devctl_syscall(&mut mem, "mscmhc0:", cmd, 0, 0, UNMAPPED, 4),
            SceError::MemstickDevctlBadParams.code()
        );
    }
}

#[test]
fn test_memstick_size_goes_through_pointer() {
    let (_root, mut sys, mut mem) = test_setup();
    for device in ["ms0:", "mscmhc0:", "fatms0:"] {
        mem.write_bytes(OUT, &[0u8; DeviceSize::SIZE]).unwrap();
        mem.write_u32(ARG, OUT).unwrap();
        assert_eq!(sys.devctl_syscall(&mut mem, device, DEVCTL_MS_GET_SIZE, ARG, 4, 0, 0), 0);
        let raw: [u8; DeviceSize::SIZE] = mem.read_bytes(OUT, DeviceSize::SIZE).unwrap().try_into().unwrap();
        let size = DeviceSize::from_bytes(&raw);
        assert_eq!(size, DeviceSize::memstick());
        assert_eq!(size.sector_size, 0x200);
        assert_eq!(size.total_clusters, 498_073);
        assert_eq!(size.free_clusters, 249_036);
    }
    assert_eq!(
        sys.devctl_syscall(&mut mem, "ms0:", DEVCTL_MS_GET_SIZE, UNMAPPED, 4, 0, 0),
        SceError::MemstickDevctlBadParams.code()
    );
}

#[test]
fn test_fat_state() {
    let (_root, mut sys, mut mem) = test_setup();
    mem.write_u32(OUT, 0xFF).unwrap();
    assert_eq!(sys.devctl_syscall(&mut mem, "fatms0:", DEVCTL_FATMS_GET_FAT_STATE, 0, 0, OUT, 4), 0);
    assert_eq!(mem.read_u32(OUT).unwrap(), MEMSTICK_FAT_STATE_ASSIGNED);

    assert_eq!(
        devctl_word(&mut sys, &mut mem, "fatms0:", DEVCTL_FATMS_SET_FAT_STATE, MEMSTICK_FAT_STATE_UNASSIGNED),
        0
    );
    assert_eq!(sys.memstick().fat_state, MEMSTICK_FAT_STATE_UNASSIGNED);
    assert_eq!(sys.devctl_syscall(&mut mem, "fatms0:", DEVCTL_FATMS_GET_FAT_STATE, 0, 0, OUT, 4), 0);
    assert_eq!(mem.read_u32(OUT).unwrap(), MEMSTICK_FAT_STATE_UNASSIGNED);

    // both blocks must be exactly one word
    assert_eq!(sys.devctl_syscall(&mut mem, "fatms0:", DEVCTL_FATMS_GET_FAT_STATE, 0, 0, OUT, 2), SCE_FAILURE);
    assert_eq!(sys.devctl_syscall(&mut mem, "fatms0:", DEVCTL_FATMS_SET_FAT_STATE, ARG, 8, 0, 0), SCE_FAILURE);
}

#[test]
fn test_fat_callbacks_report_fat_state() {
    let (_root, mut sys, mut mem) = test_setup();
    assert_eq!(devctl_word(&mut sys, &mut mem, "fatms0:", DEVCTL_FATMS_REGISTER_CALLBACK, 9), 0);
    assert_eq!(
        sys.drain_notifications(),
        vec![Notification::Device {
            kind: CallbackKind::MemstickFat,
            callback_id: 9,
            state: MEMSTICK_FAT_STATE_ASSIGNED,
        }]
    );
    assert_eq!(devctl_word(&mut sys, &mut mem, "fatms0:", DEVCTL_FATMS_REGISTER_CALLBACK, 9), SCE_FAILURE);
    assert_eq!(devctl_word(&mut sys, &mut mem, "fatms0:", DEVCTL_FATMS_UNREGISTER_CALLBACK, 9), 0);
    assert_eq!(devctl_word(&mut sys, &mut mem, "fatms0:", DEVCTL_FATMS_UNREGISTER_CALLBACK, 9), SCE_FAILURE);
}

#[test]
fn test_emulator_channel() {
    let (_root, mut sys, mut mem) = test_setup();
    for device in ["emulator:", "kemulator:"] {
        mem.write_u32(OUT, 0xAA).unwrap();
        assert_eq!(sys.devctl_syscall(&mut mem, device, EMULATOR_DEVCTL_GET_HAS_DISPLAY, 0, 0, OUT, 4), 0);
        assert_eq!(mem.read_u32(OUT).unwrap(), 0);
        assert_eq!(sys.devctl_syscall(&mut mem, device, EMULATOR_DEVCTL_IS_EMULATOR, 0, 0, OUT, 4), 0);
        assert_eq!(mem.read_u32(OUT).unwrap(), 1);
    }

    // output is only collected when asked for
    mem.write_bytes(ARG, b"hi\n").unwrap();
    assert_eq!(sys.devctl_syscall(&mut mem, "emulator:", EMULATOR_DEVCTL_SEND_OUTPUT, ARG, 3, 0, 0), 0);
    assert_eq!(sys.emu_debug_output(), "");
}

#[test]
fn test_emulator_output_collected() {
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(&root);
    config.print_emu_log = true;
    let mut sys = IoSystem::start(config);
    let mut mem = FlatMemory::default();

    mem.write_bytes(ARG, b"line one\nline two\n").unwrap();
    assert_eq!(sys.devctl_syscall(&mut mem, "emulator:", EMULATOR_DEVCTL_SEND_OUTPUT, ARG, 9, 0, 0), 0);
    assert_eq!(sys.devctl_syscall(&mut mem, "kemulator:", EMULATOR_DEVCTL_SEND_OUTPUT, ARG + 9, 9, 0, 0), 0);
    assert_eq!(sys.emu_debug_output(), "line one\nline two\n");
}

#[test]
fn test_emulator_channel_bad_addresses() {
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(&root);
    config.print_emu_log = true;
    let mut sys = IoSystem::start(config);
    let mut mem = FlatMemory::default();

    assert_eq!(sys.devctl_syscall(&mut mem, "emulator:", EMULATOR_DEVCTL_GET_HAS_DISPLAY, 0, 0, UNMAPPED, 4), 0);
    assert_eq!(sys.devctl_syscall(&mut mem, "emulator:", EMULATOR_DEVCTL_IS_EMULATOR, 0, 0, UNMAPPED, 4), 0);

    mem.write_bytes(ARG, b"text").unwrap();
    assert_eq!(
        sys.devctl_syscall(&mut mem, "emulator:", EMULATOR_DEVCTL_SEND_OUTPUT, ARG, 0xFFFF_FFF0, 0, 0),
        0
    );
    assert_eq!(sys.emu_debug_output(), "");
}
