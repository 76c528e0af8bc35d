//! WASM bindings for hiershamir
//!
//! JSON-in, JSON-out wrappers around the split/combine/check commands.

use wasm_bindgen::prelude::*;

use crate::commands;
use crate::hierarchy::HierarchyNode;
use crate::record::ShareRecord;

/// Initialize panic hook for better error messages in the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Use wee_alloc as the global allocator for smaller WASM binary size
#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

fn parse_hierarchy(hierarchy_json: &str) -> Result<HierarchyNode, JsValue> {
    serde_json::from_str(hierarchy_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid hierarchy JSON: {e}")))
}

/// Split secrets through a hierarchy
///
/// # Arguments
/// * `secrets_json` - JSON array of secret strings
/// * `hierarchy_json` - JSON hierarchy, e.g. `[2, 3, ["Nick", "Alice", "Bob"]]`
///
/// # Returns
/// JSON array of share records, one per participant
///
/// # Example (JavaScript)
/// ```javascript
/// const records = JSON.parse(wasm_split(
///     JSON.stringify(["hello"]),
///     JSON.stringify([2, 3, ["Nick", "Alice", "Bob"]])
/// ));
/// for (const record of records) {
///     console.log(`${record.participant}: ${record.shares[0]}`);
/// }
/// ```
#[wasm_bindgen]
pub fn wasm_split(secrets_json: &str, hierarchy_json: &str) -> Result<String, JsValue> {
    let secrets: Vec<String> = serde_json::from_str(secrets_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid secrets JSON: {e}")))?;
    let hierarchy = parse_hierarchy(hierarchy_json)?;

    let records = commands::split_secrets(&secrets, &hierarchy)
        .map_err(|e| JsValue::from_str(&format!("Split failed: {e:#}")))?;

    serde_json::to_string(&records)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {e}")))
}

/// Recover secrets from share records
///
/// # Arguments
/// * `records_json` - JSON array of share records, as produced by `wasm_split`
///
/// # Returns
/// JSON array of the recovered secrets, in split order
#[wasm_bindgen]
pub fn wasm_combine(records_json: &str) -> Result<String, JsValue> {
    let records: Vec<ShareRecord> = serde_json::from_str(records_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid records JSON: {e}")))?;

    let secrets = commands::combine_records(&records)
        .map_err(|e| JsValue::from_str(&format!("Combine failed: {e:#}")))?;

    serde_json::to_string(&secrets)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {e}")))
}

/// Check whether the named participants satisfy a hierarchy
///
/// # Arguments
/// * `hierarchy_json` - JSON hierarchy
/// * `participants_json` - JSON array of participant names
#[wasm_bindgen]
pub fn wasm_is_recoverable(hierarchy_json: &str, participants_json: &str) -> Result<bool, JsValue> {
    let hierarchy = parse_hierarchy(hierarchy_json)?;
    let participants: Vec<String> = serde_json::from_str(participants_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid participants JSON: {e}")))?;

    commands::check_participants(&hierarchy, &participants)
        .map_err(|e| JsValue::from_str(&format!("Check failed: {e:#}")))
}
