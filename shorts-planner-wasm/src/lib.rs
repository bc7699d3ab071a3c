//! WASM bindings for shorts-planner — the boundary the browser form calls.
//!
//! The page owns the form and the seed; everything here is a thin
//! JSON-in, JSON-or-text-out adapter over the library.

use wasm_bindgen::prelude::*;

use shorts_planner::{generate, script_text, PlanExport, PlanForm, PlanRequest};

// ---------------------------------------------------------------------------
// JSON helpers, testable off-wasm
// ---------------------------------------------------------------------------
fn request_from_form_json(form_json: &str) -> Result<PlanRequest, String> {
    let form: PlanForm =
        serde_json::from_str(form_json).map_err(|e| format!("Invalid form JSON: {}", e))?;
    form.normalize().map_err(|e| e.to_string())
}

fn export_json(form_json: &str) -> Result<String, String> {
    let request = request_from_form_json(form_json)?;
    let plan = generate(&request).map_err(|e| e.to_string())?;
    PlanExport::new(request, plan)
        .to_json()
        .map_err(|e| e.to_string())
}

fn export_text(form_json: &str) -> Result<String, String> {
    let request = request_from_form_json(form_json)?;
    let plan = generate(&request).map_err(|e| e.to_string())?;
    Ok(script_text(&plan))
}

fn weak_seed() -> u32 {
    let mut bytes = [0u8; 4];
    // A fixed seed is an acceptable fallback: only the first plan is affected.
    if getrandom::getrandom(&mut bytes).is_err() {
        return 1;
    }
    u32::from_le_bytes(bytes)
}

// ---------------------------------------------------------------------------
// Exported API
// ---------------------------------------------------------------------------

/// Generate a plan from form JSON; returns the `{ request, plan }` export.
#[wasm_bindgen]
pub fn generate_plan(form_json: &str) -> Result<String, JsValue> {
    export_json(form_json).map_err(|e| JsValue::from_str(&e))
}

/// Generate a plan from form JSON; returns the clipboard script text.
#[wasm_bindgen]
pub fn script_text_for(form_json: &str) -> Result<String, JsValue> {
    export_text(form_json).map_err(|e| JsValue::from_str(&e))
}

/// Seed for the next remix.
#[wasm_bindgen]
pub fn remix_seed(seed: i64) -> i64 {
    seed.wrapping_add(1)
}

/// Starting seed for a fresh page load.
#[wasm_bindgen]
pub fn initial_seed() -> u32 {
    weak_seed()
}
