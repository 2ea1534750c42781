//! Run telemetry: one fire-and-forget broadcast per completed run.
//!
//! The emitter formats a [`TelemetryMessage`] from the run summary and hands
//! it to a [`Radio`]. There is no acknowledgment and no retry; a failed send
//! is logged and the run still counts as reported.

use std::net::UdpSocket;

use tokio::sync::broadcast;
use tracing::info;

use crate::analysis::RunSummary;
use crate::config::TelemetryConfig;
use crate::error::{log_telemetry_error, TelemetryError};

pub mod message;

pub use message::TelemetryMessage;

/// Short-range broadcast transport.
pub trait Radio {
    fn send(&mut self, payload: &str) -> Result<(), TelemetryError>;
}

impl<R: Radio + ?Sized> Radio for &mut R {
    fn send(&mut self, payload: &str) -> Result<(), TelemetryError> {
        (**self).send(payload)
    }
}

impl<R: Radio + ?Sized> Radio for Box<R> {
    fn send(&mut self, payload: &str) -> Result<(), TelemetryError> {
        (**self).send(payload)
    }
}

/// UDP broadcast on `base_port + group`.
pub struct UdpRadio {
    socket: UdpSocket,
    destination: String,
}

impl UdpRadio {
    pub fn open(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_broadcast(true)?;
        Ok(Self {
            socket,
            destination: format!("{}:{}", config.broadcast_addr, config.port()),
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl Radio for UdpRadio {
    fn send(&mut self, payload: &str) -> Result<(), TelemetryError> {
        self.socket
            .send_to(payload.as_bytes(), self.destination.as_str())?;
        Ok(())
    }
}

/// In-process broadcast for local consumers and tests.
///
/// Sending with no subscribers is not an error: nobody was listening.
pub struct ChannelRadio {
    tx: broadcast::Sender<String>,
}

impl ChannelRadio {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for ChannelRadio {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Radio for ChannelRadio {
    fn send(&mut self, payload: &str) -> Result<(), TelemetryError> {
        let _ = self.tx.send(payload.to_string());
        Ok(())
    }
}

/// Sends the summary of each run exactly once.
pub struct TelemetryEmitter<R> {
    radio: R,
    sent: u64,
    failed: u64,
}

impl<R: Radio> TelemetryEmitter<R> {
    pub fn new(radio: R) -> Self {
        Self {
            radio,
            sent: 0,
            failed: 0,
        }
    }

    /// Broadcast the run result; returns the message that was attempted.
    pub fn emit(&mut self, summary: &RunSummary) -> TelemetryMessage {
        let message = TelemetryMessage::from(summary);
        let payload = message.to_string();

        match self.radio.send(&payload) {
            Ok(()) => {
                self.sent += 1;
                info!(payload = %payload, "[Telemetry] Broadcast run result");
            }
            Err(err) => {
                self.failed += 1;
                log_telemetry_error(&err, "TelemetryEmitter::emit");
            }
        }
        message
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FitResult;
    use crate::calibration::CalibrationOffsets;

    fn summary() -> RunSummary {
        RunSummary {
            duration_secs: 5,
            sample_count: 500,
            mean_accel: 1.0,
            mean_velocity: 2.5,
            fit: FitResult {
                vmax: 5.0,
                tau: 0.0,
            },
            buffered_points: 50,
            calibration: CalibrationOffsets::zero(),
        }
    }

    struct BrokenRadio;

    impl Radio for BrokenRadio {
        fn send(&mut self, _payload: &str) -> Result<(), TelemetryError> {
            Err(TelemetryError::SendFailed {
                reason: "radio off".to_string(),
            })
        }
    }

    #[test]
    fn test_emit_sends_formatted_payload() {
        let radio = ChannelRadio::default();
        let mut rx = radio.subscribe();
        let mut emitter = TelemetryEmitter::new(radio);

        emitter.emit(&summary());

        assert_eq!(rx.try_recv().unwrap(), "a:1.000,v:2.500,vm:5.000,t:0.000");
        assert!(rx.try_recv().is_err());
        assert_eq!(emitter.sent(), 1);
    }

    #[test]
    fn test_send_without_listeners_is_ok() {
        let mut radio = ChannelRadio::default();
        assert!(radio.send("a:0,v:0,vm:0,t:0").is_ok());
    }

    #[test]
    fn test_failed_send_is_not_retried() {
        let mut emitter = TelemetryEmitter::new(BrokenRadio);
        let message = emitter.emit(&summary());
        assert_eq!(message.vmax, 5.0);
        assert_eq!(emitter.failed(), 1);
        assert_eq!(emitter.sent(), 0);
    }

    #[test]
    fn test_udp_radio_reaches_local_listener() {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = TelemetryConfig {
            group: 0,
            base_port: port,
            broadcast_addr: "127.0.0.1".to_string(),
        };

        let mut radio = UdpRadio::open(&config).unwrap();
        radio.send("a:1.000,v:2.000,vm:3.000,t:4.000").unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = listener.recv_from(&mut buf).unwrap();
        let message: TelemetryMessage = std::str::from_utf8(&buf[..len]).unwrap().parse().unwrap();
        assert_eq!(message.tau, 4.0);
    }
}
