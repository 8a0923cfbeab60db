use serde::{Deserialize, Serialize};

/// Domain model đại diện một tin nhắn chat; cũng chính là shape của
/// JSON frame trao đổi với relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    #[serde(rename = "sentByClient")]
    pub sent_by_client: bool,
    /// `None` trên bản ghi lạc quan cục bộ; relay điền khi phát lại.
    #[serde(rename = "clientId", default)]
    pub client_id: Option<String>,
}

/// Vòng đời của kết nối tới relay. Một chiều, không quay lại `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}
