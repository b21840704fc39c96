// Copyright 2024-2026 vision-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime lifecycle across the C ABI.

use std::ffi::{c_char, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use super::error::set_last_error;
use crate::{config, Runtime};

/// Opaque runtime handle.
pub struct VbRuntime {
    pub(crate) inner: Runtime,
}

impl VbRuntime {
    /// Hand an already built runtime to C callers.
    ///
    /// Release it with `vb_runtime_destroy`.
    pub fn into_raw(inner: Runtime) -> *mut VbRuntime {
        Box::into_raw(Box::new(VbRuntime { inner }))
    }
}

/// Create a runtime.
///
/// Configuration comes from the `VISION_BRIDGE_*` environment. A non-null
/// `assets_root` overrides the configured asset directory. Returns null on
/// failure; see `vb_last_error`.
///
/// # Safety
///
/// `assets_root` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn vb_runtime_create(assets_root: *const c_char) -> *mut VbRuntime {
    let root = if assets_root.is_null() {
        None
    } else {
        match CStr::from_ptr(assets_root).to_str() {
            Ok(s) => Some(PathBuf::from(s)),
            Err(_) => {
                set_last_error("invalid UTF-8 in assets_root");
                return std::ptr::null_mut();
            }
        }
    };

    let created = catch_unwind(AssertUnwindSafe(|| {
        let mut env = config::load()?;
        if let Some(root) = root {
            env.assets_root = root;
        }
        Ok::<_, config::ConfigError>(Runtime::new(env.runtime_config()))
    }));

    match created {
        Ok(Ok(inner)) => VbRuntime::into_raw(inner),
        Ok(Err(e)) => {
            set_last_error(format!("config: {}", e));
            std::ptr::null_mut()
        }
        Err(_) => {
            set_last_error("panic during runtime creation");
            std::ptr::null_mut()
        }
    }
}

/// Destroy a runtime and release every model it still holds.
///
/// # Safety
///
/// `runtime` must be null or a pointer returned by `vb_runtime_create` that
/// has not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn vb_runtime_destroy(runtime: *mut VbRuntime) {
    if !runtime.is_null() {
        drop(Box::from_raw(runtime));
    }
}
