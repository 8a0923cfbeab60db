use serde_json::Value;
use tokio::sync::mpsc;

use crate::common::{ChatMessage, ConnectionCommand, ConnectionEvent, ConnectionState};

/// Trạng thái chat của một phiên: danh tính client và message feed.
///
/// Feed chỉ append, thứ tự hiển thị = thứ tự append. Mọi mutation chạy
/// trên UI thread: event từ mạng được drain vào đây, còn `send_message`
/// đẩy lệnh ngược xuống tầng mạng qua channel.
pub struct ChatSession {
    command_sender: mpsc::Sender<ConnectionCommand>,
    messages: Vec<ChatMessage>,
    client_id: Option<String>,
    connection: ConnectionState,
    torn_down: bool,
    arrival_pending: bool,
}

impl ChatSession {
    pub fn new(command_sender: mpsc::Sender<ConnectionCommand>) -> Self {
        Self {
            command_sender,
            messages: Vec::new(),
            client_id: None,
            connection: ConnectionState::Connecting,
            torn_down: false,
            arrival_pending: false,
        }
    }

    /// Sau `teardown` mọi event đến muộn đều bị bỏ qua, kể cả frame còn
    /// nằm sẵn trong channel.
    pub fn handle_event(&mut self, event: ConnectionEvent) {
        if self.torn_down {
            return;
        }
        match event {
            ConnectionEvent::Opened => self.connection = ConnectionState::Open,
            ConnectionEvent::Frame(raw) => self.handle_frame(&raw),
            ConnectionEvent::Closed => self.connection = ConnectionState::Closed,
        }
    }

    fn handle_frame(&mut self, raw: &str) {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Discarding malformed frame: {err}");
                return;
            }
        };

        // Frame đầu tiên mang clientId khác rỗng là tín hiệu gán danh tính,
        // kể cả frame chào không có nội dung tin nhắn. Các frame sau đó
        // không thay đổi danh tính nữa.
        if self.client_id.is_none() {
            if let Some(id) = value.get("clientId").and_then(Value::as_str) {
                if !id.is_empty() {
                    log::info!("Relay assigned client id {id}");
                    self.client_id = Some(id.to_string());
                }
            }
        }

        match serde_json::from_value::<ChatMessage>(value) {
            Ok(message) => self.push_message(message),
            Err(err) => log::debug!("Frame carries no chat message: {err}"),
        }
    }

    /// Gửi tin nhắn người dùng nhập. Bản ghi lạc quan luôn được append vào
    /// feed, kể cả khi transport đã đóng và việc gửi thất bại trong im lặng.
    pub fn send_message(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let outbound = ChatMessage {
            content: text.to_string(),
            sent_by_client: true,
            client_id: self.client_id.clone(),
        };
        match serde_json::to_string(&outbound) {
            Ok(frame) => {
                if let Err(err) = self
                    .command_sender
                    .try_send(ConnectionCommand::SendFrame(frame))
                {
                    log::debug!("Dropping outbound message; connection unavailable: {err}");
                }
            }
            Err(err) => log::warn!("Failed to serialize outbound message: {err}"),
        }

        self.push_message(ChatMessage {
            content: text.to_string(),
            sent_by_client: true,
            client_id: None,
        });
    }

    /// Đóng phiên. Idempotent: chỉ lệnh `Close` đầu tiên được gửi đi.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Err(err) = self.command_sender.try_send(ConnectionCommand::Close) {
            log::debug!("Connection already gone during teardown: {err}");
        }
    }

    fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.arrival_pending = true;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Cờ one-shot báo có tin mới, cho UI scroll xuống cuối.
    pub fn take_arrival(&mut self) -> bool {
        std::mem::take(&mut self.arrival_pending)
    }

    /// Tin đến từ client khác: `sentByClient` và mang clientId khác danh
    /// tính của mình. Mọi trường hợp còn lại (bản ghi lạc quan cục bộ,
    /// echo tin của chính mình, frame không danh tính) tính là tin đi.
    /// UI phải dựa vào phân loại này, không tự so sánh field.
    pub fn is_from_peer(&self, message: &ChatMessage) -> bool {
        message.sent_by_client
            && message.client_id.is_some()
            && message.client_id.as_deref() != self.client_id()
    }
}
