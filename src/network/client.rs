use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::common::{ConnectionCommand, ConnectionEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Chủ sở hữu duy nhất của kết nối WebSocket tới relay.
///
/// Mỗi phiên đúng một lần kết nối, không tự reconnect: vòng đời là
/// `Connecting -> Open -> Closed` và task kết thúc ở `Closed`.
pub struct RelayConnection {
    event_sender: mpsc::Sender<ConnectionEvent>,
    command_receiver: mpsc::Receiver<ConnectionCommand>,
    relay_addr: String,
}

impl RelayConnection {
    pub fn new(
        event_sender: mpsc::Sender<ConnectionEvent>,
        command_receiver: mpsc::Receiver<ConnectionCommand>,
        relay_addr: String,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            relay_addr,
        }
    }

    /// Event loop của kết nối: chuyển tiếp frame hai chiều cho tới khi
    /// một trong hai phía đóng. Mọi lỗi transport được nuốt tại đây và
    /// chỉ lộ ra ngoài dưới dạng event `Closed`.
    pub async fn run(mut self) {
        let Some(stream) = self.connect().await else {
            self.shutdown().await;
            return;
        };

        log::info!("WebSocket connection established");
        let _ = self.event_sender.send(ConnectionEvent::Opened).await;

        let (mut sink, mut source) = stream.split();

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(ConnectionCommand::SendFrame(frame)) => {
                            if let Err(err) = sink.send(Message::Text(frame.into())).await {
                                log::warn!("Failed to send frame to relay: {err}");
                                break;
                            }
                        }
                        Some(ConnectionCommand::Close) | None => {
                            if let Err(err) = sink.close().await {
                                log::debug!("Error while closing connection: {err}");
                            }
                            break;
                        }
                    }
                }
                message = source.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            let _ = self
                                .event_sender
                                .send(ConnectionEvent::Frame(text.to_string()))
                                .await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            log::info!("WebSocket connection closed by relay");
                            break;
                        }
                        // Ping/pong/binary: không nằm trong giao thức chat
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            log::warn!("WebSocket error: {err}");
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown().await;
    }

    /// Một lần bắt tay duy nhất. Trong lúc chờ, `SendFrame` bị drop vì
    /// transport chưa mở, còn `Close` hủy luôn việc kết nối.
    async fn connect(&mut self) -> Option<WsStream> {
        log::info!("Connecting to relay at {}", self.relay_addr);
        let connect = connect_async(self.relay_addr.clone());
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => {
                    match result {
                        Ok((stream, _response)) => return Some(stream),
                        Err(err) => {
                            log::error!("Failed to connect to relay: {err}");
                            return None;
                        }
                    }
                }
                command = self.command_receiver.recv() => {
                    match command {
                        Some(ConnectionCommand::SendFrame(_)) => {
                            log::debug!("Dropping outbound frame; connection not open");
                        }
                        Some(ConnectionCommand::Close) | None => return None,
                    }
                }
            }
        }
    }

    async fn shutdown(&self) {
        let _ = self.event_sender.send(ConnectionEvent::Closed).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn recv_event(receiver: &mut mpsc::Receiver<ConnectionEvent>) -> ConnectionEvent {
        timeout(TIMEOUT, receiver.recv())
            .await
            .expect("timed out waiting for connection event")
            .expect("event channel closed early")
    }

    /// Relay stand-in: nhận một client, gửi frame gán clientId, rồi echo
    /// mọi text frame cho tới khi client đóng.
    async fn spawn_echo_relay(assigned_id: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let greeting = json!({ "clientId": assigned_id }).to_string();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text(greeting.into())).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                match message {
                    Message::Text(text) => ws.send(Message::Text(text)).await.unwrap(),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn handshake_emits_opened_then_delivers_assignment_frame() {
        let relay_addr = spawn_echo_relay("A1").await;
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (_cmd_tx, cmd_rx) = mpsc::channel::<ConnectionCommand>(16);
        tokio::spawn(RelayConnection::new(event_tx, cmd_rx, relay_addr).run());

        assert!(matches!(
            recv_event(&mut event_rx).await,
            ConnectionEvent::Opened
        ));
        match recv_event(&mut event_rx).await {
            ConnectionEvent::Frame(raw) => {
                let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
                assert_eq!(value["clientId"], "A1");
            }
            other => panic!("expected assignment frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn frames_round_trip_verbatim() {
        let relay_addr = spawn_echo_relay("A1").await;
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        tokio::spawn(RelayConnection::new(event_tx, cmd_rx, relay_addr).run());

        recv_event(&mut event_rx).await; // Opened
        recv_event(&mut event_rx).await; // assignment frame

        let frame = json!({ "content": "hello", "sentByClient": true, "clientId": "A1" })
            .to_string();
        cmd_tx
            .send(ConnectionCommand::SendFrame(frame.clone()))
            .await
            .unwrap();

        match recv_event(&mut event_rx).await {
            ConnectionEvent::Frame(raw) => assert_eq!(raw, frame),
            other => panic!("expected echoed frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn close_command_yields_single_closed_event() {
        let relay_addr = spawn_echo_relay("A1").await;
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        tokio::spawn(RelayConnection::new(event_tx, cmd_rx, relay_addr).run());

        recv_event(&mut event_rx).await; // Opened
        recv_event(&mut event_rx).await; // assignment frame

        cmd_tx.send(ConnectionCommand::Close).await.unwrap();

        assert!(matches!(
            recv_event(&mut event_rx).await,
            ConnectionEvent::Closed
        ));
        // Task đã kết thúc: event sender bị drop, không còn event nào nữa.
        assert!(timeout(TIMEOUT, event_rx.recv()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn relay_initiated_close_emits_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let relay_addr = format!("ws://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.close(None).await.unwrap();
        });

        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (_cmd_tx, cmd_rx) = mpsc::channel::<ConnectionCommand>(16);
        tokio::spawn(RelayConnection::new(event_tx, cmd_rx, relay_addr).run());

        assert!(matches!(
            recv_event(&mut event_rx).await,
            ConnectionEvent::Opened
        ));
        assert!(matches!(
            recv_event(&mut event_rx).await,
            ConnectionEvent::Closed
        ));
    }

    #[tokio::test]
    async fn failed_connect_resolves_to_closed() {
        // Cấp một port rồi thả ngay để chắc chắn không ai lắng nghe.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let relay_addr = format!("ws://{}", listener.local_addr().unwrap());
        drop(listener);

        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (_cmd_tx, cmd_rx) = mpsc::channel::<ConnectionCommand>(16);
        tokio::spawn(RelayConnection::new(event_tx, cmd_rx, relay_addr).run());

        assert!(matches!(
            recv_event(&mut event_rx).await,
            ConnectionEvent::Closed
        ));
    }
}
