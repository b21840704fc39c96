// Copyright 2024-2026 vision-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Thread-local last-error slot.

use std::cell::RefCell;
use std::ffi::{c_char, CString};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(message: impl Into<String>) {
    let message = message.into().replace('\0', " ");
    let cstring = CString::new(message).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(cstring));
}

/// Last error message on this thread, or null.
///
/// The pointer stays valid until the next call that sets or clears the error.
#[no_mangle]
pub extern "C" fn vb_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |s| s.as_ptr())
    })
}

/// Clear the last error on this thread.
#[no_mangle]
pub extern "C" fn vb_clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}
