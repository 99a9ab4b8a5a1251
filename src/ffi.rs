//! FFI (Foreign Function Interface) bindings for native action hosts.
//!
//! Hosts exchange JSON documents with the core: configuration, catalog and
//! event payloads go in as null-terminated UTF-8 strings, responses come back
//! the same way.
//!
//! # Memory Management
//!
//! - Rust allocates every returned string
//! - The calling code MUST pass it to `djvlaunch_free_string` to prevent leaks
//! - A null return means the request failed; the reason is logged

use crate::catalog::JsonCatalog;
use crate::config::ActionConfig;
use crate::event::ActionEvent;
use crate::operations::DjvViewAction;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

// ============================================================================
// Discovery
// ============================================================================

/// Discover installed viewers.
///
/// `config_json` may be null for the default configuration. With a null
/// `event_json` all discovered items are returned; otherwise the event's
/// selection decides, and JSON `null` is returned for selections the action
/// does not handle.
/// Caller MUST call djvlaunch_free_string() when done.
#[no_mangle]
pub extern "C" fn djvlaunch_discover(config_json: *const c_char, event_json: *const c_char) -> *mut c_char {
    let Some(config) = parse_config(config_json) else {
        return ptr::null_mut();
    };

    let action = match DjvViewAction::new(config) {
        Ok(action) => action,
        Err(e) => {
            tracing::error!("Error discovering applications: {}", e);
            return ptr::null_mut();
        }
    };

    if event_json.is_null() {
        return to_json(&serde_json::json!({ "items": action.items() }));
    }

    match parse::<ActionEvent>(event_json, "event") {
        Some(event) => to_json(&action.discover(&event)),
        None => ptr::null_mut(),
    }
}

// ============================================================================
// Launch
// ============================================================================

/// Handle a launch event against a JSON catalog.
///
/// Returns the picker form or the `{success, message}` result. Returns null
/// when the selection cannot be translated into catalog types.
/// Caller MUST call djvlaunch_free_string() when done.
#[no_mangle]
pub extern "C" fn djvlaunch_launch(
    config_json: *const c_char,
    catalog_json: *const c_char,
    event_json: *const c_char,
) -> *mut c_char {
    let Some(config) = parse_config(config_json) else {
        return ptr::null_mut();
    };
    let Some(catalog_str) = read_str(catalog_json, "catalog") else {
        return ptr::null_mut();
    };
    let catalog = match JsonCatalog::from_json(catalog_str) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Error parsing catalog: {}", e);
            return ptr::null_mut();
        }
    };
    let Some(event) = parse::<ActionEvent>(event_json, "event") else {
        return ptr::null_mut();
    };

    let action = match DjvViewAction::new(config) {
        Ok(action) => action,
        Err(e) => {
            tracing::error!("Error discovering applications: {}", e);
            return ptr::null_mut();
        }
    };

    match action.launch(&catalog, &event) {
        Ok(response) => to_json(&response),
        Err(e) => {
            tracing::error!("Error handling launch event: {}", e);
            ptr::null_mut()
        }
    }
}

// ============================================================================
// String Management
// ============================================================================

/// Free a string returned by FFI functions.
#[no_mangle]
pub extern "C" fn djvlaunch_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn read_str<'a>(s: *const c_char, what: &str) -> Option<&'a str> {
    if s.is_null() {
        tracing::error!("Missing {} JSON", what);
        return None;
    }
    match unsafe { CStr::from_ptr(s) }.to_str() {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!("Invalid UTF-8 in {} JSON: {}", what, e);
            None
        }
    }
}

fn parse<T: DeserializeOwned>(s: *const c_char, what: &str) -> Option<T> {
    let s = read_str(s, what)?;
    match serde_json::from_str(s) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!("Error parsing {} JSON: {}", what, e);
            None
        }
    }
}

fn parse_config(s: *const c_char) -> Option<ActionConfig> {
    if s.is_null() {
        return Some(ActionConfig::default());
    }
    parse(s, "config")
}

fn to_json<T: Serialize>(value: &T) -> *mut c_char {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Error serializing response: {}", e);
            return ptr::null_mut();
        }
    };
    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}
