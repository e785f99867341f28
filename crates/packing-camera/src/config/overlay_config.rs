use serde::{Deserialize, Serialize};

/// Order context burned into recordings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Order code; empty disables the overlay.
    #[serde(default)]
    pub order_code: String,

    /// Product name shown under the order code.
    #[serde(default)]
    pub product_name: String,
}
