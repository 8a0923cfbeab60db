use std::env;

pub const DEFAULT_RELAY_ADDR: &str = "ws://127.0.0.1:8080";

/// Resolve relay endpoint: biến môi trường `RELAY_ADDR` (qua `.env` hoặc
/// shell) đè lên default; giá trị rỗng coi như chưa đặt.
pub fn relay_address() -> String {
    match env::var("RELAY_ADDR") {
        Ok(addr) if !addr.trim().is_empty() => addr,
        _ => {
            log::info!("RELAY_ADDR not set; using default {DEFAULT_RELAY_ADDR}");
            DEFAULT_RELAY_ADDR.to_string()
        }
    }
}
