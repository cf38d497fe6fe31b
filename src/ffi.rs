//! FFI bindings for the Fitfin engine
//!
//! This module provides C-compatible functions for calling the engine from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `fitfin_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::bounds::{BoundsPolicy, MetricBounds};
use crate::error::ComputeError;
use crate::pipeline::{evaluate_json, Evaluator};
use crate::profile::{EvaluationConfig, Profile};
use crate::types::RawMetrics;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read a required string argument, recording an error if it is missing
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {} string pointer", name));
    }
    value
}

/// Hand a result back across the boundary: string on success, NULL plus last error otherwise
fn into_cstr(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn parse_policy(name: &str) -> Result<BoundsPolicy, ComputeError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "reject" => Ok(BoundsPolicy::Reject),
        "clamp" => Ok(BoundsPolicy::Clamp),
        other => Err(ComputeError::Config(format!("unknown bounds policy: {}", other))),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Evaluate a metrics JSON record under the reject policy and return report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `fitfin_free_string`.
/// - Returns NULL on error; call `fitfin_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitfin_evaluate(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    into_cstr(evaluate_json(&json_str))
}

/// Evaluate a metrics JSON record under the named policy (`"reject"` or `"clamp"`).
///
/// # Safety
/// - `json` and `policy` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `fitfin_free_string`.
/// - Returns NULL on error; call `fitfin_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitfin_evaluate_with_policy(
    json: *const c_char,
    policy: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };
    let Some(policy_str) = required_arg(policy, "policy") else {
        return ptr::null_mut();
    };

    into_cstr(parse_policy(&policy_str).and_then(|policy| {
        let evaluator = Evaluator::with_config(EvaluationConfig {
            policy,
            ..Default::default()
        });
        evaluator.evaluate_json(&json_str)
    }))
}

/// Validate a metrics JSON record.
///
/// Returns `{"valid":true,"violations":[]}` or the list of violations.
/// Malformed JSON is an error, not a validation result.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `fitfin_free_string`.
/// - Returns NULL on error; call `fitfin_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitfin_validate(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    into_cstr(validate_to_json(&json_str))
}

fn validate_to_json(json: &str) -> Result<String, ComputeError> {
    let metrics: RawMetrics = serde_json::from_str(json)?;
    let violations = match MetricBounds::validate(&metrics) {
        Ok(()) => Vec::new(),
        Err(e) => e.violations,
    };
    let report = serde_json::json!({
        "valid": violations.is_empty(),
        "violations": violations,
    });
    Ok(report.to_string())
}

/// Return the metrics of a named preset profile as JSON.
///
/// # Safety
/// - `name` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `fitfin_free_string`.
/// - Returns NULL on error; call `fitfin_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitfin_profile(name: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(name_str) = required_arg(name, "profile name") else {
        return ptr::null_mut();
    };

    into_cstr(
        Profile::from_name(&name_str)
            .and_then(|profile| Ok(serde_json::to_string(&profile.metrics())?)),
    )
}

// ============================================================================
// Configured Evaluator API
// ============================================================================

/// Opaque handle to an Evaluator
pub struct FitfinEvaluatorHandle {
    evaluator: Evaluator,
}

/// Create an Evaluator from config JSON, or with defaults when `config_json` is NULL.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Returns a pointer that must be freed with `fitfin_evaluator_free`.
/// - Returns NULL on error; call `fitfin_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitfin_evaluator_new(
    config_json: *const c_char,
) -> *mut FitfinEvaluatorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        EvaluationConfig::default()
    } else {
        let Some(json_str) = required_arg(config_json, "config") else {
            return ptr::null_mut();
        };
        match EvaluationConfig::from_json(&json_str) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(FitfinEvaluatorHandle {
        evaluator: Evaluator::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free an Evaluator.
///
/// # Safety
/// - `evaluator` must be a valid pointer returned by `fitfin_evaluator_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn fitfin_evaluator_free(evaluator: *mut FitfinEvaluatorHandle) {
    if !evaluator.is_null() {
        drop(Box::from_raw(evaluator));
    }
}

/// Evaluate metrics JSON with a configured Evaluator.
///
/// Passing NULL for `json` evaluates the configured profile.
///
/// # Safety
/// - `evaluator` must be a valid pointer returned by `fitfin_evaluator_new`.
/// - `json` must be NULL or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `fitfin_free_string`.
/// - Returns NULL on error; call `fitfin_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitfin_evaluator_evaluate(
    evaluator: *const FitfinEvaluatorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if evaluator.is_null() {
        set_last_error("Null evaluator pointer");
        return ptr::null_mut();
    }

    let handle = &*evaluator;

    if json.is_null() {
        return into_cstr(
            handle
                .evaluator
                .evaluate_profile()
                .and_then(|report| Ok(serde_json::to_string(&report)?)),
        );
    }

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    into_cstr(handle.evaluator.evaluate_json(&json_str))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Fitfin functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Fitfin function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn fitfin_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Fitfin function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn fitfin_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the engine version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn fitfin_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
