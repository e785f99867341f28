use chrono::{DateTime, Local};

/// Order context drawn over each frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    /// Order code; the overlay is drawn only when this is non-empty.
    pub order_code: String,
    /// Product name shown on the second line.
    pub product_name: String,
}

impl OverlayState {
    /// Build from order code and product name.
    pub fn new(order_code: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            order_code: order_code.into(),
            product_name: product_name.into(),
        }
    }

    /// The three overlay lines for `now`, or `None` without an order code.
    pub fn lines(&self, now: DateTime<Local>) -> Option<[String; 3]> {
        if self.order_code.is_empty() {
            return None;
        }

        Some([
            format!("Order: {}", self.order_code),
            format!("Product: {}", self.product_name),
            format!("Time: {}", now.format("%Y-%m-%d %H:%M:%S")),
        ])
    }
}
