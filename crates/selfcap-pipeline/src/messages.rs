//! User-facing status messages.
//!
//! Message text is an external concern. The session only resolves
//! `(locale, status)` to a string through the [`MessageCatalog`] seam and
//! forwards the result with each status event. The built-in catalog ships
//! English; hosts with real localization supply their own implementation or
//! load additional locales from JSON.

use std::collections::HashMap;
use thiserror::Error;

use selfcap_core::ValidationStatus;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to parse message catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolves a human-readable guidance line for a status.
pub trait MessageCatalog: Send {
    fn message(&self, locale: &str, status: ValidationStatus) -> String;
}

/// Catalog JSON shape: `{ "<locale>": { "<STATUS_KEY>": "text", ... }, ... }`.
type CatalogData = HashMap<String, HashMap<String, String>>;

const BUILTIN_JSON: &str = r#"{
    "en": {
        "INITIALIZING": "Starting up...",
        "NO_FACE_DETECTED": "No face detected. Look at the camera.",
        "FACE_DETECTED": "Face detected. Hold still.",
        "TOO_CLOSE": "Move a little farther from the camera.",
        "TOO_FAR": "Move a little closer to the camera.",
        "OFF_CENTER": "Center your face inside the oval.",
        "FACE_OBSTRUCTED": "Keep your face fully visible.",
        "HEAD_NOT_STRAIGHT": "Hold your head straight.",
        "MULTIPLE_FACES": "Only one face should be in view.",
        "POOR_ILLUMINATION": "Find a brighter spot.",
        "NOT_NEUTRAL_EXPRESSION": "Keep a neutral expression.",
        "DARK_GLASSES": "Please remove dark glasses.",
        "STAY_STILL": "Hold still.",
        "CAPTURING": "Capturing...",
        "SUCCESS": "Photo captured.",
        "ERROR": "Something went wrong. Please try again."
    }
}"#;

/// JSON-backed catalog with locale fallback to `"en"`.
pub struct JsonCatalog {
    locales: CatalogData,
}

impl JsonCatalog {
    /// Parse a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let locales: CatalogData = serde_json::from_str(json)?;
        Ok(Self { locales })
    }

    /// The built-in English catalog.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_JSON).expect("built-in message catalog is valid JSON")
    }
}

impl Default for JsonCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MessageCatalog for JsonCatalog {
    fn message(&self, locale: &str, status: ValidationStatus) -> String {
        let key = status.as_key();
        let table = self
            .locales
            .get(locale)
            .or_else(|| self.locales.get("en"));
        match table.and_then(|t| t.get(key)) {
            Some(text) => text.clone(),
            None => key.to_string(),
        }
    }
}
