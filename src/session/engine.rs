// ABOUTME: Full-duplex SMPP session engine with windowing, pacing and retries
// ABOUTME: Runs five cooperative tasks over one framed stream until cancelled

use super::config::{LiveConfig, SessionConfig};
use super::error::SessionError;
use super::event::{Event, Severity};
use super::speed::{SpeedController, SpeedError};
use crate::codec::CodecError;
use crate::connection::{FrameError, PduReader, PduWriter};
use crate::datatypes::{CommandId, CommandStatus};
use crate::pdu::Pdu;
use bytes::Bytes;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const CHAN_BUF_SIZE: usize = 10_000;

/// An outbound request ticket. The session assigns the sequence number,
/// tracks the request until its terminal outcome and hands it back inside
/// the matching [`Resp`].
pub struct Req {
    pub pdu: Pdu,
    /// Opaque application context carried through to the outcome.
    pub ctx: Option<Box<dyn Any + Send + Sync>>,
    retries: u32,
    sent_at: Option<Instant>,
}

impl Req {
    pub fn new(pdu: Pdu) -> Req {
        Req {
            pdu,
            ctx: None,
            retries: 0,
            sent_at: None,
        }
    }

    pub fn with_ctx(pdu: Pdu, ctx: Box<dyn Any + Send + Sync>) -> Req {
        Req {
            pdu,
            ctx: Some(ctx),
            retries: 0,
            sent_at: None,
        }
    }

    /// Automatic re-sends performed so far because of throttling.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// When the most recent send hit the wire.
    pub fn sent_at(&self) -> Option<Instant> {
        self.sent_at
    }
}

impl fmt::Debug for Req {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Req")
            .field("pdu", &self.pdu)
            .field("retries", &self.retries)
            .field("sent_at", &self.sent_at)
            .field("has_ctx", &self.ctx.is_some())
            .finish()
    }
}

/// Terminal outcome of one outbound request. Every accepted request
/// produces exactly one `Resp`.
#[derive(Debug)]
pub struct Resp {
    pub req: Req,
    pub outcome: Result<Pdu, SessionError>,
    pub received_at: Instant,
}

struct InFlight {
    req: Req,
    timeout: JoinHandle<()>,
    _permit: OwnedSemaphorePermit,
}

/// State guarded by the session mutex. Never held across an await.
struct Tracked {
    in_flight: HashMap<u32, InFlight>,
    last_throttle: Option<Instant>,
}

struct Shared {
    cfg: Arc<LiveConfig>,
    speed: Arc<dyn SpeedController>,
    window: Arc<Semaphore>,
    tracked: Mutex<Tracked>,
    in_window: AtomicI32,
    out_window: AtomicI32,
    started: Instant,
    last_read_nanos: AtomicU64,
    last_write_nanos: AtomicU64,
    out_req_tx: mpsc::Sender<Req>,
    out_resp_tx: mpsc::Sender<Pdu>,
    retries_tx: mpsc::Sender<Req>,
    in_resp_tx: mpsc::Sender<Resp>,
    events_tx: mpsc::Sender<Event>,
}

impl Shared {
    fn emit(&self, event: Event) {
        // events are advisory; a full queue drops them rather than stall a pump
        let _ = self.events_tx.try_send(event);
    }

    fn log(&self, severity: Severity, message: impl FnOnce() -> String) {
        if severity < self.cfg.log_severity() {
            return;
        }
        let message = message();
        match severity {
            Severity::Debug => tracing::debug!(target: "smppio::session", "{message}"),
            Severity::Info => tracing::info!(target: "smppio::session", "{message}"),
            Severity::Warning => tracing::warn!(target: "smppio::session", "{message}"),
            Severity::Error => tracing::error!(target: "smppio::session", "{message}"),
        }
        self.emit(Event::Log { severity, message });
    }

    fn err_event(&self, error: SessionError) {
        self.emit(Event::Error(error));
    }

    fn in_window_add(&self, delta: i32) -> i32 {
        let value = self.in_window.fetch_add(delta, Ordering::SeqCst) + delta;
        self.emit(Event::InWindowChanged(value));
        value
    }

    fn out_window_add(&self, delta: i32) -> i32 {
        let value = self.out_window.fetch_add(delta, Ordering::SeqCst) + delta;
        self.emit(Event::OutWindowChanged(value));
        value
    }

    fn touch_read(&self) {
        self.last_read_nanos
            .store(self.started.elapsed().as_nanos() as u64, Ordering::Relaxed);
    }

    fn touch_write(&self) {
        self.last_write_nanos
            .store(self.started.elapsed().as_nanos() as u64, Ordering::Relaxed);
    }

    fn since_last_read(&self) -> Duration {
        self.started
            .elapsed()
            .saturating_sub(Duration::from_nanos(
                self.last_read_nanos.load(Ordering::Relaxed),
            ))
    }

    fn since_last_write(&self) -> Duration {
        self.started
            .elapsed()
            .saturating_sub(Duration::from_nanos(
                self.last_write_nanos.load(Ordering::Relaxed),
            ))
    }

    async fn push_resp(&self, resp: Resp) {
        // the application may have dropped its receiver during shutdown
        let _ = self.in_resp_tx.send(resp).await;
    }
}

/// Cloneable application handle: submit work and manage configuration.
#[derive(Clone)]
pub struct SessionHandle {
    out_req_tx: mpsc::Sender<Req>,
    out_resp_tx: mpsc::Sender<Pdu>,
    cfg: Arc<LiveConfig>,
    speed: Arc<dyn SpeedController>,
    window: Arc<Semaphore>,
}

impl SessionHandle {
    /// Queue a request for sending. Fails with `Closed` once the session
    /// has shut down.
    pub async fn send_request(&self, req: Req) -> Result<(), SessionError> {
        self.out_req_tx
            .send(req)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Queue a response for sending. The PDU must carry a response
    /// command id; responses bypass the window and the outbound pacer.
    pub async fn send_response(&self, pdu: Pdu) -> Result<(), SessionError> {
        if !pdu.id().is_response() {
            return Err(CodecError::NotAResponse(pdu.id()).into());
        }
        self.out_resp_tx
            .send(pdu)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Replace the whole configuration. Limits take effect on the next
    /// iteration of the relevant pump; a shrunk window drains naturally as
    /// in-flight requests resolve.
    pub fn set_config(&self, cfg: &SessionConfig) {
        let previous_window = self.cfg.store(cfg);
        self.speed.set_rps_limits(cfg.in_rps_limit, cfg.out_rps_limit);

        let window_limit = cfg.window_limit;
        if window_limit > previous_window {
            self.window
                .add_permits((window_limit - previous_window) as usize);
        } else if window_limit < previous_window {
            let window = Arc::clone(&self.window);
            let excess = previous_window - window_limit;
            tokio::spawn(async move {
                if let Ok(permits) = window.acquire_many_owned(excess).await {
                    permits.forget();
                }
            });
        }
    }

    pub fn get_config(&self) -> SessionConfig {
        self.cfg.snapshot()
    }
}

/// Application side of a session: the handle plus the inbound streams.
pub struct SessionApi {
    pub handle: SessionHandle,
    /// Inbound requests admitted by the window and the rate check.
    pub requests: mpsc::Receiver<Pdu>,
    /// Terminal outcomes of outbound requests.
    pub responses: mpsc::Receiver<Resp>,
    pub events: mpsc::Receiver<Event>,
}

/// A bidirectional SMPP session over one framed stream.
///
/// `run` drives five cooperative tasks: a once-per-second ticker
/// (silence timeout and keepalive), the speed-controller pacing loop, the
/// inbound reader, the outbound request pump and the outbound response
/// pump. All waits honor the cancel token.
pub struct Session<S> {
    stream: S,
    shared: Arc<Shared>,
    out_req_rx: mpsc::Receiver<Req>,
    out_resp_rx: mpsc::Receiver<Pdu>,
    retries_rx: mpsc::Receiver<Req>,
    in_req_tx: mpsc::Sender<Pdu>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(stream: S, speed: Arc<dyn SpeedController>) -> (Session<S>, SessionApi) {
        Session::with_config(stream, SessionConfig::default(), speed)
    }

    pub fn with_config(
        stream: S,
        cfg: SessionConfig,
        speed: Arc<dyn SpeedController>,
    ) -> (Session<S>, SessionApi) {
        speed.set_rps_limits(cfg.in_rps_limit, cfg.out_rps_limit);

        let (out_req_tx, out_req_rx) = mpsc::channel(1);
        let (out_resp_tx, out_resp_rx) = mpsc::channel(CHAN_BUF_SIZE);
        let (retries_tx, retries_rx) = mpsc::channel(CHAN_BUF_SIZE);
        let (in_req_tx, in_req_rx) = mpsc::channel(CHAN_BUF_SIZE);
        let (in_resp_tx, in_resp_rx) = mpsc::channel(CHAN_BUF_SIZE);
        let (events_tx, events_rx) = mpsc::channel(CHAN_BUF_SIZE);

        let cfg_live = Arc::new(LiveConfig::new(&cfg));
        let window = Arc::new(Semaphore::new(cfg.window_limit as usize));

        let shared = Arc::new(Shared {
            cfg: Arc::clone(&cfg_live),
            speed: Arc::clone(&speed),
            window: Arc::clone(&window),
            tracked: Mutex::new(Tracked {
                in_flight: HashMap::new(),
                last_throttle: None,
            }),
            in_window: AtomicI32::new(0),
            out_window: AtomicI32::new(0),
            started: Instant::now(),
            last_read_nanos: AtomicU64::new(0),
            last_write_nanos: AtomicU64::new(0),
            out_req_tx: out_req_tx.clone(),
            out_resp_tx: out_resp_tx.clone(),
            retries_tx,
            in_resp_tx,
            events_tx,
        });

        let session = Session {
            stream,
            shared,
            out_req_rx,
            out_resp_rx,
            retries_rx,
            in_req_tx,
        };
        let api = SessionApi {
            handle: SessionHandle {
                out_req_tx,
                out_resp_tx,
                cfg: cfg_live,
                speed,
                window,
            },
            requests: in_req_rx,
            responses: in_resp_rx,
            events: events_rx,
        };
        (session, api)
    }

    /// Run the session until the token is cancelled, the silence timeout
    /// closes the stream, or the peer disconnects. On exit every
    /// unresolved request receives a `Closed` outcome and the
    /// application-visible queues close.
    pub async fn run(self, cancel: CancellationToken) {
        let Session {
            stream,
            shared,
            out_req_rx,
            out_resp_rx,
            retries_rx,
            in_req_tx,
        } = self;

        let inner = cancel.child_token();
        let (read_half, write_half) = tokio::io::split(stream);
        let reader = PduReader::new(read_half);
        let writer = Arc::new(tokio::sync::Mutex::new(PduWriter::new(write_half)));

        let mut tasks = Vec::new();
        tasks.push(tokio::spawn(ticker(Arc::clone(&shared), inner.clone())));
        tasks.push(tokio::spawn(pacing(Arc::clone(&shared), inner.clone())));
        tasks.push(tokio::spawn(inbound_pump(
            Arc::clone(&shared),
            reader,
            in_req_tx,
            inner.clone(),
        )));
        tasks.push(tokio::spawn(outbound_request_pump(
            Arc::clone(&shared),
            Arc::clone(&writer),
            out_req_rx,
            retries_rx,
            inner.clone(),
        )));
        tasks.push(tokio::spawn(outbound_response_pump(
            Arc::clone(&shared),
            Arc::clone(&writer),
            out_resp_rx,
            inner.clone(),
        )));

        for task in tasks {
            let _ = task.await;
        }

        let _ = writer.lock().await.shutdown().await;

        let drained: Vec<InFlight> = {
            let mut tracked = shared.tracked.lock();
            tracked.in_flight.drain().map(|(_, entry)| entry).collect()
        };
        for entry in drained {
            entry.timeout.abort();
            shared
                .push_resp(Resp {
                    req: entry.req,
                    outcome: Err(SessionError::Closed),
                    received_at: Instant::now(),
                })
                .await;
        }

        shared.log(Severity::Debug, || "session completed".to_owned());
    }
}

/// Once per second: close the stream after prolonged inbound silence and
/// keep the link alive with enquire_link when writes go quiet.
async fn ticker(shared: Arc<Shared>, cancel: CancellationToken) {
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = cancel.cancelled() => break,
        }

        let silence_timeout = shared.cfg.silence_timeout();
        if shared.since_last_read() >= silence_timeout {
            shared.log(Severity::Warning, || {
                format!("silence timeout [{silence_timeout:?}] exceeded, closing stream")
            });
            cancel.cancel();
            break;
        }

        if shared.cfg.enquire_link_enabled()
            && shared.since_last_write() >= shared.cfg.enquire_link_interval()
        {
            // non-blocking: a congested request queue drops the keepalive
            let _ = shared
                .out_req_tx
                .try_send(Req::new(Pdu::new(CommandId::EnquireLink)));
        }
    }

    shared.log(Severity::Debug, || {
        "task handling scheduler completed".to_owned()
    });
}

async fn pacing(shared: Arc<Shared>, cancel: CancellationToken) {
    shared.speed.run(cancel).await;
    shared.log(Severity::Debug, || {
        "task handling speed controller completed".to_owned()
    });
}

/// Sole reader of the stream: decodes PDUs and routes them to the request
/// or response path.
async fn inbound_pump<S>(
    shared: Arc<Shared>,
    mut reader: PduReader<ReadHalf<S>>,
    in_req_tx: mpsc::Sender<Pdu>,
    cancel: CancellationToken,
) where
    S: AsyncRead + AsyncWrite,
{
    loop {
        let read = tokio::select! {
            read = reader.read_pdu() => read,
            _ = cancel.cancelled() => break,
        };

        match read {
            Ok(Some(pdu)) => {
                shared.touch_read();
                shared.log(Severity::Debug, || format!("received pdu: [{pdu}]"));
                shared.emit(Event::PduReceived {
                    id: pdu.id(),
                    status: pdu.status(),
                });

                if pdu.is_request() {
                    handle_request(&shared, pdu, &in_req_tx, &cancel).await;
                } else {
                    handle_response(&shared, pdu).await;
                }
            }
            Ok(None) => {
                shared.log(Severity::Debug, || "end of stream".to_owned());
                break;
            }
            Err(FrameError::Malformed(error)) => {
                // the offending frame is consumed; keep reading
                shared.log(Severity::Error, || {
                    format!("can't read pdu from socket: [{error}]")
                });
                shared.err_event(SessionError::Codec(error));
            }
            Err(FrameError::Reset) => {
                let error = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer");
                shared.log(Severity::Error, || {
                    format!("can't read pdu from socket: [{error}]")
                });
                shared.err_event(SessionError::Io(error));
                break;
            }
            Err(FrameError::Io(error)) => {
                shared.log(Severity::Error, || {
                    format!("can't read pdu from socket: [{error}]")
                });
                shared.err_event(SessionError::Io(error));
                break;
            }
        }
    }

    shared.log(Severity::Debug, || {
        "task handling incoming pdus completed".to_owned()
    });
}

/// Inbound request path: window check, rate check, keepalive shortcut,
/// then hand to the application.
async fn handle_request(
    shared: &Arc<Shared>,
    pdu: Pdu,
    in_req_tx: &mpsc::Sender<Pdu>,
    cancel: &CancellationToken,
) {
    let in_window = shared.in_window_add(1);
    if in_window > shared.cfg.window_limit() as i32 {
        queue_reply(shared, &pdu, CommandStatus::Throttled, cancel).await;
        return;
    }

    match shared.speed.inbound_admit() {
        Err(SpeedError::Throttled) => {
            queue_reply(shared, &pdu, CommandStatus::Throttled, cancel).await;
        }
        Err(error) => {
            shared.log(Severity::Error, || {
                format!("inbound admission returned error: [{error}]")
            });
            shared.err_event(SessionError::Speed(error.to_string()));
            queue_reply(shared, &pdu, CommandStatus::SystemError, cancel).await;
        }
        Ok(()) => {
            if pdu.id() == CommandId::EnquireLink {
                queue_reply(shared, &pdu, CommandStatus::Ok, cancel).await;
            } else {
                tokio::select! {
                    _ = in_req_tx.send(pdu) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }
    }
}

/// Build a response for an inbound request and queue it for writing. The
/// inbound-window decrement happens when the response pump dequeues it;
/// when no response can exist the slot is given back immediately so the
/// window cannot leak.
async fn queue_reply(
    shared: &Arc<Shared>,
    pdu: &Pdu,
    status: CommandStatus,
    cancel: &CancellationToken,
) {
    match pdu.create_response(status) {
        Ok(resp) => {
            tokio::select! {
                _ = shared.out_resp_tx.send(resp) => {}
                _ = cancel.cancelled() => {}
            }
        }
        Err(error) => {
            shared.log(Severity::Error, || {
                format!("can't create resp for pdu: [{pdu}]")
            });
            shared.err_event(error.into());
            shared.in_window_add(-1);
        }
    }
}

/// Inbound response path: correlate by sequence number, settle the
/// window, retry on throttling, surface the outcome.
async fn handle_response(shared: &Arc<Shared>, pdu: Pdu) {
    let now = Instant::now();
    let status = pdu.status();
    let seq = pdu.seq();

    let removed = {
        let mut tracked = shared.tracked.lock();
        if status == CommandStatus::Throttled {
            tracked.last_throttle = Some(now);
        }
        tracked.in_flight.remove(&seq)
    };

    let Some(entry) = removed else {
        shared.log(Severity::Warning, || {
            format!("received unexpected pdu: [{pdu}]")
        });
        return;
    };

    entry.timeout.abort();
    shared.out_window_add(-1);
    let InFlight { mut req, .. } = entry; // releases the window permit

    if status == CommandStatus::Throttled && req.retries < shared.cfg.throttle_retries_max() {
        req.retries += 1;
        match shared.retries_tx.try_send(req) {
            Ok(()) => {}
            Err(TrySendError::Full(req)) | Err(TrySendError::Closed(req)) => {
                shared.err_event(SessionError::RetryQueueFull);
                shared
                    .push_resp(Resp {
                        req,
                        outcome: Ok(pdu),
                        received_at: now,
                    })
                    .await;
            }
        }
    } else {
        shared
            .push_resp(Resp {
                req,
                outcome: Ok(pdu),
                received_at: now,
            })
            .await;
    }
}

/// Pulls retry-queued and fresh requests, acquires a window slot and
/// sends. Anything still queued at shutdown resolves `Closed`.
async fn outbound_request_pump<S>(
    shared: Arc<Shared>,
    writer: Arc<tokio::sync::Mutex<PduWriter<WriteHalf<S>>>>,
    mut out_req_rx: mpsc::Receiver<Req>,
    mut retries_rx: mpsc::Receiver<Req>,
    cancel: CancellationToken,
) where
    S: AsyncRead + AsyncWrite,
{
    let mut seq: u32 = 0;

    loop {
        let permit = tokio::select! {
            permit = Arc::clone(&shared.window).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
            _ = cancel.cancelled() => break,
        };

        let req = tokio::select! {
            biased;
            Some(req) = retries_rx.recv() => req,
            Some(req) = out_req_rx.recv() => req,
            _ = cancel.cancelled() => break,
        };

        send_outgoing(&shared, &writer, req, permit, &mut seq, &cancel).await;
    }

    while let Ok(req) = retries_rx.try_recv() {
        shared
            .push_resp(Resp {
                req,
                outcome: Err(SessionError::Closed),
                received_at: Instant::now(),
            })
            .await;
    }
    while let Ok(req) = out_req_rx.try_recv() {
        shared
            .push_resp(Resp {
                req,
                outcome: Err(SessionError::Closed),
                received_at: Instant::now(),
            })
            .await;
    }

    shared.log(Severity::Debug, || {
        "task handling outgoing requests completed".to_owned()
    });
}

/// Send one request: pace, assign the sequence, register for correlation
/// and timeout, write, then honor any post-throttle pause.
async fn send_outgoing<S>(
    shared: &Arc<Shared>,
    writer: &Arc<tokio::sync::Mutex<PduWriter<WriteHalf<S>>>>,
    mut req: Req,
    permit: OwnedSemaphorePermit,
    seq: &mut u32,
    cancel: &CancellationToken,
) where
    S: AsyncRead + AsyncWrite,
{
    match shared.speed.out(cancel).await {
        Ok(()) => {}
        Err(SpeedError::Cancelled) => {
            // shutting down; the request was never registered
            shared
                .push_resp(Resp {
                    req,
                    outcome: Err(SessionError::Closed),
                    received_at: Instant::now(),
                })
                .await;
            return;
        }
        Err(error) => {
            shared.log(Severity::Error, || {
                format!("outbound pacing returned error: [{error}]")
            });
            shared.err_event(SessionError::Speed(error.to_string()));
            shared
                .push_resp(Resp {
                    req,
                    outcome: Err(SessionError::Speed(error.to_string())),
                    received_at: Instant::now(),
                })
                .await;
            return;
        }
    }

    *seq = seq.wrapping_add(1);
    let assigned = *seq;
    req.pdu.set_seq(assigned);
    let wire: Bytes = req.pdu.serialize();
    let id = req.pdu.id();
    let status = req.pdu.status();

    let now = Instant::now();
    let throttle_pause = {
        let mut tracked = shared.tracked.lock();
        req.sent_at = Some(now);
        let timeout = spawn_timeout(Arc::clone(shared), assigned, shared.cfg.req_timeout());
        tracked.in_flight.insert(
            assigned,
            InFlight {
                req,
                timeout,
                _permit: permit,
            },
        );
        tracked
            .last_throttle
            .and_then(|last| shared.cfg.throttle_pause().checked_sub(now - last))
    };
    shared.out_window_add(1);

    let write_result = writer.lock().await.write_frame(&wire).await;
    match write_result {
        Err(error) => {
            let entry = {
                let mut tracked = shared.tracked.lock();
                tracked.in_flight.remove(&assigned)
            };
            shared.log(Severity::Error, || {
                format!("can't write pdu to socket: [{error}]")
            });
            // when the entry is gone the timeout already settled the request
            if let Some(entry) = entry {
                entry.timeout.abort();
                shared.out_window_add(-1);
                shared.err_event(SessionError::Io(io::Error::new(
                    error.kind(),
                    error.to_string(),
                )));
                shared
                    .push_resp(Resp {
                        req: entry.req,
                        outcome: Err(SessionError::Io(error)),
                        received_at: Instant::now(),
                    })
                    .await;
            }
        }
        Ok(()) => {
            shared.touch_write();
            shared.log(Severity::Debug, || format!("sent pdu seq [{assigned}]"));
            shared.emit(Event::PduSent { id, status });

            if let Some(pause) = throttle_pause {
                if !pause.is_zero() {
                    tokio::select! {
                        _ = tokio::time::sleep(pause) => {}
                        _ = cancel.cancelled() => {}
                    }
                }
            }
        }
    }
}

/// One-shot per-request timeout. Cancelled by abort when the response or
/// a write error settles the request first.
fn spawn_timeout(shared: Arc<Shared>, seq: u32, after: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;

        let entry = {
            let mut tracked = shared.tracked.lock();
            tracked.in_flight.remove(&seq)
        };

        match entry {
            Some(entry) => {
                shared.out_window_add(-1);
                shared.log(Severity::Warning, || {
                    format!("req timeout exceeded for pdu [{}]", entry.req.pdu)
                });
                shared
                    .push_resp(Resp {
                        req: entry.req,
                        outcome: Err(SessionError::Timeout),
                        received_at: Instant::now(),
                    })
                    .await;
            }
            None => {
                shared.log(Severity::Warning, || {
                    format!("req timeout exceeded for seq [{seq}], but req not found")
                });
            }
        }
    })
}

/// Writes responses as-is: no window gate, no pacing. Dequeuing a
/// response is the moment the matching inbound-window slot frees up.
async fn outbound_response_pump<S>(
    shared: Arc<Shared>,
    writer: Arc<tokio::sync::Mutex<PduWriter<WriteHalf<S>>>>,
    mut out_resp_rx: mpsc::Receiver<Pdu>,
    cancel: CancellationToken,
) where
    S: AsyncRead + AsyncWrite,
{
    loop {
        let pdu = tokio::select! {
            pdu = out_resp_rx.recv() => match pdu {
                Some(pdu) => pdu,
                None => break,
            },
            _ = cancel.cancelled() => break,
        };

        shared.in_window_add(-1);

        let write_result = writer.lock().await.write_pdu(&pdu).await;
        match write_result {
            Err(error) => {
                shared.log(Severity::Error, || {
                    format!("can't write pdu [{pdu}] to socket: [{error}]")
                });
                shared.err_event(SessionError::Io(error));
            }
            Ok(()) => {
                shared.touch_write();
                shared.log(Severity::Debug, || format!("sent pdu: [{pdu}]"));
                shared.emit(Event::PduSent {
                    id: pdu.id(),
                    status: pdu.status(),
                });
            }
        }
    }

    shared.log(Severity::Debug, || {
        "task handling outgoing responses completed".to_owned()
    });
}
