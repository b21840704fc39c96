// Copyright 2024-2026 vision-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model operations across the C ABI.

use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use super::runtime::VbRuntime;
use crate::bridge::{self, Reply, DEFAULT_LOAD_ERROR, DEFAULT_RUN_ERROR};

/// Borrow a C string argument as UTF-8.
unsafe fn str_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("null pointer argument: {}", name));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| format!("invalid UTF-8 in {}", name))
}

fn into_c_reply<T: Serialize>(reply: Reply<T>) -> *mut c_char {
    // serde_json escapes NUL, so the JSON text never contains an interior NUL
    CString::new(reply.to_json())
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

fn guarded<T, F>(fallback: &str, f: F) -> *mut c_char
where
    T: Serialize,
    F: FnOnce() -> Reply<T>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(reply) => into_c_reply(reply),
        Err(_) => into_c_reply(Reply::<T>::err(fallback)),
    }
}

/// Load a model and its labels. Returns a JSON reply whose `result` is the
/// model id.
///
/// # Safety
///
/// `runtime` must come from `vb_runtime_create`; the paths must be null or
/// valid NUL-terminated strings. Free the reply with `vb_string_free`.
#[no_mangle]
pub unsafe extern "C" fn vb_load_model(
    runtime: *const VbRuntime,
    model_path: *const c_char,
    labels_path: *const c_char,
) -> *mut c_char {
    guarded(DEFAULT_LOAD_ERROR, || {
        if runtime.is_null() {
            return Reply::err("null pointer argument: runtime");
        }
        let rt = &(*runtime).inner;
        let model_path = match str_arg(model_path, "model_path") {
            Ok(s) => s,
            Err(e) => return Reply::err(e),
        };
        let labels_path = match str_arg(labels_path, "labels_path") {
            Ok(s) => s,
            Err(e) => return Reply::err(e),
        };
        bridge::load_model(rt, model_path, labels_path)
    })
}

/// Classify an image. Returns a JSON reply whose `result` is a list of
/// `{"label", "confidence"}` objects, best first.
///
/// # Safety
///
/// Same contract as `vb_load_model`.
#[no_mangle]
pub unsafe extern "C" fn vb_run_model_on_image(
    runtime: *const VbRuntime,
    model_id: *const c_char,
    image_path: *const c_char,
    num_results: i32,
    threshold: f32,
) -> *mut c_char {
    guarded(DEFAULT_RUN_ERROR, || {
        if runtime.is_null() {
            return Reply::err("null pointer argument: runtime");
        }
        let rt = &(*runtime).inner;
        let model_id = match str_arg(model_id, "model_id") {
            Ok(s) => s,
            Err(e) => return Reply::err(e),
        };
        let image_path = match str_arg(image_path, "image_path") {
            Ok(s) => s,
            Err(e) => return Reply::err(e),
        };
        bridge::run_model_on_image(rt, model_id, image_path, num_results, threshold)
    })
}

/// Release a model. Null or unknown ids are ignored.
///
/// # Safety
///
/// `runtime` must be null or come from `vb_runtime_create`; `model_id` must be
/// null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn vb_close(runtime: *const VbRuntime, model_id: *const c_char) {
    if runtime.is_null() {
        return;
    }
    let Ok(model_id) = str_arg(model_id, "model_id") else {
        return;
    };
    let rt = &(*runtime).inner;
    let _ = catch_unwind(AssertUnwindSafe(|| bridge::close(rt, model_id)));
}

/// Free a string returned by this library.
///
/// # Safety
///
/// `s` must be null or a pointer returned by a `vb_*` function that has not
/// been freed yet.
#[no_mangle]
pub unsafe extern "C" fn vb_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
