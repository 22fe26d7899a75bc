//! FFI bindings for Healthprint
//!
//! C-compatible entry points for calling the engine from other languages.
//! Strings are null-terminated; every returned string is heap allocated and
//! must be released with `hp_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::error::HealthprintError;
use crate::pipeline::AnalysisEngine;
use crate::rules::validate_batch;
use crate::types::ProfileInput;

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

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => {
            set_last_error("Output contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

/// Convert an engine result into an owned C string, recording failures
fn finish(result: Result<String, HealthprintError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Analyze a JSON profile and return the analysis result as JSON.
///
/// # Safety
/// - `profile_json` and `display_name` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `hp_free_string`.
/// - Returns NULL on error; call `hp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hp_generate_analysis(
    profile_json: *const c_char,
    display_name: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(profile) = cstr_to_string(profile_json) else {
        set_last_error("Invalid profile string pointer");
        return ptr::null_mut();
    };
    let Some(name) = cstr_to_string(display_name) else {
        set_last_error("Invalid display name string pointer");
        return ptr::null_mut();
    };

    finish(AnalysisEngine::new().analyze_json(&profile, &name))
}

/// Analyze a JSON profile with a JSON engine configuration.
///
/// # Safety
/// - `profile_json`, `display_name` and `config_json` must be valid
///   null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `hp_free_string`.
/// - Returns NULL on error; call `hp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hp_generate_analysis_with_config(
    profile_json: *const c_char,
    display_name: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(profile) = cstr_to_string(profile_json) else {
        set_last_error("Invalid profile string pointer");
        return ptr::null_mut();
    };
    let Some(name) = cstr_to_string(display_name) else {
        set_last_error("Invalid display name string pointer");
        return ptr::null_mut();
    };
    let Some(config) = cstr_to_string(config_json) else {
        set_last_error("Invalid config string pointer");
        return ptr::null_mut();
    };

    finish(
        EngineConfig::from_json(&config)
            .and_then(AnalysisEngine::with_config)
            .and_then(|engine| engine.analyze_json(&profile, &name)),
    )
}

/// Run the validation rule registry over a JSON array of profiles and return
/// the batch report as JSON.
///
/// # Safety
/// - `profiles_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `hp_free_string`.
/// - Returns NULL on error; call `hp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hp_validate_batch(profiles_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = cstr_to_string(profiles_json) else {
        set_last_error("Invalid profiles string pointer");
        return ptr::null_mut();
    };

    finish(
        serde_json::from_str::<Vec<ProfileInput>>(&json)
            .map_err(HealthprintError::from)
            .and_then(|profiles| {
                let report = validate_batch(&profiles, &AnalysisEngine::new());
                Ok(serde_json::to_string(&report)?)
            }),
    )
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Healthprint functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Healthprint function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn hp_free_string(ptr: *mut c_char) {
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
/// - The pointer is valid until the next Healthprint call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn hp_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the engine version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn hp_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile_json() -> CString {
        CString::new(
            r#"{
                "demographics": { "age": 38, "weightKg": 84.0, "heightCm": 170.0, "gender": "female" },
                "healthMetrics": { "hydration": 6, "sleep": 5, "exercise": 4, "nutrition": 6 },
                "lifestyle": { "stressLevel": "moderate", "urgencyLevel": "medium" },
                "medicalData": { "conditions": ["diabetes_type2"], "hasCriticalConditions": false }
            }"#,
        )
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        hp_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_generate_analysis() {
        let profile = sample_profile_json();
        let name = CString::new("Riley").unwrap();

        unsafe {
            let result = hp_generate_analysis(profile.as_ptr(), name.as_ptr());
            let json = take_string(result);
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["userProfile"]["displayName"], "Riley");
            assert_eq!(value["conditionAnalysis"]["hasDiabetes"], true);
            assert!(hp_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_invalid_profile_sets_error() {
        let profile = CString::new(r#"{"demographics": {}}"#).unwrap();
        let name = CString::new("Riley").unwrap();

        unsafe {
            let result = hp_generate_analysis(profile.as_ptr(), name.as_ptr());
            assert!(result.is_null());

            let error = hp_last_error();
            assert!(!error.is_null());
            let message = CStr::from_ptr(error).to_str().unwrap();
            assert!(message.contains("Invalid JSON"));
        }
    }

    #[test]
    fn test_ffi_null_pointer() {
        let name = CString::new("Riley").unwrap();
        unsafe {
            let result = hp_generate_analysis(ptr::null(), name.as_ptr());
            assert!(result.is_null());
            let message = CStr::from_ptr(hp_last_error()).to_str().unwrap();
            assert_eq!(message, "Invalid profile string pointer");
        }
    }

    #[test]
    fn test_ffi_with_config() {
        let profile = sample_profile_json();
        let name = CString::new("Riley").unwrap();
        let mut config = EngineConfig::default();
        config.steps.ceiling = 7_000;
        let config = CString::new(config.to_json().unwrap()).unwrap();

        unsafe {
            let result =
                hp_generate_analysis_with_config(profile.as_ptr(), name.as_ptr(), config.as_ptr());
            let value: serde_json::Value = serde_json::from_str(&take_string(result)).unwrap();
            assert!(
                value["personalizedTargets"]["steps"]["targetSteps"]
                    .as_u64()
                    .unwrap()
                    <= 7_000
            );
        }
    }

    #[test]
    fn test_ffi_rejects_invalid_config() {
        let profile = sample_profile_json();
        let name = CString::new("Riley").unwrap();
        let config = CString::new(r#"{"projection": {"weeks": 4}}"#).unwrap();

        unsafe {
            let result =
                hp_generate_analysis_with_config(profile.as_ptr(), name.as_ptr(), config.as_ptr());
            assert!(result.is_null());
            assert!(!hp_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_validate_batch() {
        let profiles = format!("[{}]", sample_profile_json().to_str().unwrap());
        let profiles = CString::new(profiles).unwrap();

        unsafe {
            let report = take_string(hp_validate_batch(profiles.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&report).unwrap();
            assert_eq!(value["totalProfiles"], 1);
            assert!(value["totalChecks"].as_u64().unwrap() > 0);
        }
    }

    #[test]
    fn test_interior_nul_output_sets_error() {
        clear_last_error();
        let result = string_to_cstr("{\"name\":\"a\0b\"}");
        assert!(result.is_null());

        unsafe {
            let error = hp_last_error();
            assert!(!error.is_null());
            let message = CStr::from_ptr(error).to_str().unwrap();
            assert_eq!(message, "Output contains an interior NUL byte");
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = CStr::from_ptr(hp_version()).to_str().unwrap();
            assert_eq!(version, env!("CARGO_PKG_VERSION"));
        }
    }
}
