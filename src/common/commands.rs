/// Lệnh UI gửi xuống tầng mạng.
#[derive(Debug, Clone)]
pub enum ConnectionCommand {
    /// Gửi một frame đã JSON-encode tới relay, nguyên văn.
    /// Bị drop trong im lặng nếu kết nối chưa/không còn mở.
    SendFrame(String),
    /// Đóng kết nối; tầng mạng kết thúc task sau lệnh này.
    Close,
}
