/// Sự kiện từ tầng mạng gửi lên UI.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// Handshake với relay thành công.
    Opened,
    /// Một text frame thô từ relay, chưa parse.
    Frame(String),
    /// Kết nối đã đóng: do relay, do lỗi transport, hoặc do mình chủ động.
    Closed,
}
