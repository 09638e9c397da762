//! SMPP v3.4 peer library.
//!
//! The crate has two halves:
//!
//! * a schema-driven **PDU codec**: mandatory parameters selected by
//!   command id, optional TLV parameters, and the framing that carries
//!   them over a byte stream;
//! * a **session engine**: a full-duplex message pump with per-direction
//!   windows, rate pacing, request correlation, per-request timeouts and
//!   throttling-aware retries.
//!
//! Ancillary parsers cover delivery receipts, UDH/SAR segmentation
//! metadata, message splitting and validity-period conversion.
//!
//! # Example
//!
//! ```rust,no_run
//! use smppio::datatypes::{CommandId, ParamName};
//! use smppio::session::{DefaultSpeedController, PacingAlgorithm, Req, Session, SessionConfig};
//! use smppio::Pdu;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = tokio::net::TcpStream::connect("localhost:2775").await?;
//!
//!     let controller = Arc::new(DefaultSpeedController::new(PacingAlgorithm::Robust));
//!     let cfg = SessionConfig {
//!         out_rps_limit: 50,
//!         window_limit: 10,
//!         ..SessionConfig::default()
//!     };
//!     let (session, mut api) = Session::with_config(stream, cfg, controller);
//!
//!     let cancel = CancellationToken::new();
//!     tokio::spawn(session.run(cancel.clone()));
//!
//!     let mut bind = Pdu::new(CommandId::BindTransceiver);
//!     bind.set_main(ParamName::SystemId, "system_id")?;
//!     bind.set_main(ParamName::Password, "password")?;
//!     api.handle.send_request(Req::new(bind)).await?;
//!
//!     while let Some(resp) = api.responses.recv().await {
//!         println!("outcome for {}: {:?}", resp.req.pdu, resp.outcome.is_ok());
//!         break;
//!     }
//!
//!     cancel.cancel();
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod encoding;
pub mod pdu;
pub mod receipt;
pub mod segments;
pub mod session;
pub mod splitter;
pub mod validity;


pub use codec::CodecError;
pub use connection::{FrameError, PduReader, PduWriter};
pub use datatypes::{CommandId, CommandStatus, ParamName, Value};
pub use pdu::Pdu;
pub use receipt::{DeliveryReceipt, DeliveryState};
pub use segments::SegmentInfo;
pub use session::{
    DefaultSpeedController, Event, PacingAlgorithm, Req, Resp, Session, SessionApi,
    SessionConfig, SessionError, SessionHandle, Severity, SpeedController, SpeedError,
};
pub use splitter::{create_deliveries, create_submits};
