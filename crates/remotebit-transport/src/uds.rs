use std::io::{ErrorKind, Read, Write};
use std::net::Shutdown;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::{clip, Radio, RadioConfig, RxHandler, TxPower};

const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// Radio link over a Unix domain socket.
///
/// Stands in for the BLE service when running on a host. The peripheral
/// side ([`UdsRadio::listen`]) plays the micro:bit and accepts one peer at a
/// time; the central side ([`UdsRadio::connect`]) plays the phone or
/// controller.
///
/// Each radio write travels as one length byte followed by that many frame
/// bytes, so write boundaries survive the byte stream.
pub struct UdsRadio {
    role: Role,
    config: RadioConfig,
    link: Arc<Link>,
    socket_file: Option<SocketFile>,
}

#[derive(Debug, Clone)]
enum Role {
    Central(PathBuf),
    Peripheral(PathBuf),
}

struct Link {
    started: AtomicBool,
    shutdown: AtomicBool,
    connected: AtomicBool,
    stream: Mutex<Option<UnixStream>>,
    handler: Mutex<Option<RxHandler>>,
    power: Mutex<TxPower>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl UdsRadio {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;
    /// Maximum socket path length.
    /// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Central role: connect to a listening peripheral on `start_service`.
    pub fn connect(path: impl AsRef<Path>) -> Self {
        Self::with_role(Role::Central(path.as_ref().to_path_buf()), RadioConfig::default())
    }

    /// Peripheral role: bind `path` and wait for a peer on `start_service`.
    pub fn listen(path: impl AsRef<Path>) -> Self {
        Self::with_role(
            Role::Peripheral(path.as_ref().to_path_buf()),
            RadioConfig::default(),
        )
    }

    /// Override link configuration.
    pub fn with_config(mut self, config: RadioConfig) -> Self {
        self.config = config;
        self
    }

    fn with_role(role: Role, config: RadioConfig) -> Self {
        Self {
            role,
            config,
            link: Arc::new(Link {
                started: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
                connected: AtomicBool::new(false),
                stream: Mutex::new(None),
                handler: Mutex::new(None),
                power: Mutex::new(TxPower::default()),
            }),
            socket_file: None,
        }
    }

    /// The socket path this radio connects to or listens on.
    pub fn path(&self) -> &Path {
        match &self.role {
            Role::Central(path) | Role::Peripheral(path) => path,
        }
    }

    /// Last transmit power applied to the link.
    pub fn power(&self) -> TxPower {
        *lock(&self.link.power)
    }

    /// Link name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "unix-domain-socket"
    }

    fn start_central(&mut self, path: PathBuf) -> Result<()> {
        let stream = connect_with_retry(&path, self.config.connect_timeout)?;
        stream.set_write_timeout(self.config.write_timeout)?;
        let reader = stream.try_clone()?;
        debug!(?path, "connected to peripheral");

        *lock(&self.link.stream) = Some(stream);
        self.link.connected.store(true, Ordering::SeqCst);

        let link = self.link.clone();
        let max = self.config.max_frame_len;
        thread::Builder::new()
            .name("remotebit-rx".to_string())
            .spawn(move || {
                pump(reader, &link, max);
                link.connected.store(false, Ordering::SeqCst);
                lock(&link.stream).take();
                debug!("peripheral closed the link");
            })?;
        Ok(())
    }

    fn start_peripheral(&mut self, path: PathBuf) -> Result<()> {
        let (listener, socket_file) = bind_socket(&path, Self::DEFAULT_SOCKET_MODE)?;
        self.socket_file = Some(socket_file);

        let link = self.link.clone();
        let config = self.config.clone();
        thread::Builder::new()
            .name("remotebit-accept".to_string())
            .spawn(move || accept_loop(listener, &link, &config))?;
        Ok(())
    }
}

impl Radio for UdsRadio {
    fn start_service(&mut self) -> Result<()> {
        if self.link.started.swap(true, Ordering::SeqCst) {
            return Err(TransportError::AlreadyStarted);
        }

        let path = self.path().to_path_buf();
        let path_bytes = path.as_os_str().len();
        let result = if path_bytes >= Self::MAX_PATH_LEN {
            Err(TransportError::PathTooLong {
                path,
                len: path_bytes,
                max: Self::MAX_PATH_LEN,
            })
        } else {
            match self.role.clone() {
                Role::Central(path) => self.start_central(path),
                Role::Peripheral(path) => self.start_peripheral(path),
            }
        };

        if result.is_err() {
            self.link.started.store(false, Ordering::SeqCst);
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.link.connected.load(Ordering::SeqCst)
    }

    fn set_transmit_power(&mut self, power: TxPower) -> Result<()> {
        *lock(&self.link.power) = power;
        debug!(%power, "transmit power set");
        Ok(())
    }

    fn write_buffer(&mut self, frame: &[u8]) -> Result<()> {
        if !self.link.started.load(Ordering::SeqCst) {
            return Err(TransportError::NotStarted);
        }

        let mut stream = lock(&self.link.stream);
        let Some(writer) = stream.as_mut() else {
            trace!(len = frame.len(), "no peer connected; write dropped");
            return Ok(());
        };

        // The length prefix is a single byte.
        let frame = clip(frame, self.config.max_frame_len.min(usize::from(u8::MAX)));
        let mut record = Vec::with_capacity(frame.len() + 1);
        record.push(frame.len() as u8);
        record.extend_from_slice(frame);

        if let Err(err) = writer.write_all(&record).and_then(|()| writer.flush()) {
            self.link.connected.store(false, Ordering::SeqCst);
            stream.take();
            return Err(TransportError::Io(err));
        }
        Ok(())
    }

    fn on_frame(&mut self, handler: RxHandler) {
        *lock(&self.link.handler) = Some(handler);
    }
}

impl Drop for UdsRadio {
    fn drop(&mut self) {
        self.link.shutdown.store(true, Ordering::SeqCst);
        if let Some(stream) = lock(&self.link.stream).take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        // Wake the acceptor so it can observe the shutdown flag.
        if let (Role::Peripheral(path), Some(_)) = (&self.role, &self.socket_file) {
            let _ = UnixStream::connect(path);
        }
    }
}

fn connect_with_retry(path: &Path, timeout: Duration) -> Result<UnixStream> {
    let start = Instant::now();
    loop {
        match UnixStream::connect(path) {
            Ok(stream) => return Ok(stream),
            Err(err)
                if start.elapsed() < timeout
                    && matches!(
                        err.kind(),
                        ErrorKind::NotFound | ErrorKind::ConnectionRefused
                    ) =>
            {
                thread::sleep(CONNECT_RETRY_INTERVAL);
            }
            Err(err) => {
                return Err(TransportError::Connect {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

fn accept_loop(listener: UnixListener, link: &Link, config: &RadioConfig) {
    loop {
        let stream = match listener.accept() {
            Ok((stream, _addr)) => stream,
            Err(err) => {
                if link.shutdown.load(Ordering::SeqCst) {
                    return;
                }
                warn!(error = %err, "accept failed");
                thread::sleep(CONNECT_RETRY_INTERVAL);
                continue;
            }
        };
        if link.shutdown.load(Ordering::SeqCst) {
            return;
        }

        let reader = match stream
            .set_write_timeout(config.write_timeout)
            .and_then(|()| stream.try_clone())
        {
            Ok(reader) => reader,
            Err(err) => {
                warn!(error = %err, "failed to prepare peer stream");
                continue;
            }
        };

        info!("peer connected");
        *lock(&link.stream) = Some(stream);
        link.connected.store(true, Ordering::SeqCst);

        pump(reader, link, config.max_frame_len);

        link.connected.store(false, Ordering::SeqCst);
        lock(&link.stream).take();
        info!("peer disconnected");
    }
}

/// Read length-prefixed writes until EOF, handing each to the handler.
fn pump(mut reader: UnixStream, link: &Link, max_frame_len: usize) {
    let mut len = [0u8; 1];
    let mut buf = [0u8; u8::MAX as usize];
    loop {
        if let Err(err) = reader.read_exact(&mut len) {
            if err.kind() != ErrorKind::UnexpectedEof {
                debug!(error = %err, "link read failed");
            }
            return;
        }
        let len = usize::from(len[0]);
        if let Err(err) = reader.read_exact(&mut buf[..len]) {
            debug!(error = %err, "link closed mid-write");
            return;
        }
        if len == 0 {
            trace!("empty incoming write ignored");
            continue;
        }

        let mut handler = lock(&link.handler);
        match handler.as_mut() {
            Some(handler) => handler(clip(&buf[..len], max_frame_len)),
            None => trace!(len, "no frame handler; incoming write dropped"),
        }
    }
}

/// Socket path created by a peripheral, removed again on drop.
struct SocketFile {
    path: PathBuf,
    created_inode: (u64, u64),
}

/// Bind a hardened filesystem socket.
///
/// A stale socket at `path` is removed first; any other kind of file makes
/// the bind fail.
fn bind_socket(path: &Path, mode: u32) -> Result<(UnixListener, SocketFile)> {
    let path = path.to_path_buf();
    let bind_err = |source: std::io::Error| TransportError::Bind {
        path: path.clone(),
        source,
    };

    if path.exists() {
        let metadata = std::fs::symlink_metadata(&path).map_err(bind_err)?;
        if metadata.file_type().is_socket() {
            debug!(?path, "removing stale socket");
            std::fs::remove_file(&path).map_err(bind_err)?;
        } else {
            return Err(bind_err(std::io::Error::new(
                ErrorKind::AlreadyExists,
                "existing path is not a unix socket",
            )));
        }
    }

    let listener = UnixListener::bind(&path).map_err(bind_err)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).map_err(bind_err)?;
    let created = std::fs::symlink_metadata(&path).map_err(bind_err)?;

    info!(?path, "listening on unix domain socket");

    Ok((
        listener,
        SocketFile {
            created_inode: (created.dev(), created.ino()),
            path,
        },
    ))
}

impl Drop for SocketFile {
    fn drop(&mut self) {
        let (expected_dev, expected_ino) = self.created_inode;
        if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
            if metadata.file_type().is_socket()
                && metadata.dev() == expected_dev
                && metadata.ino() == expected_ino
            {
                debug!(path = ?self.path, "cleaning up socket file");
                let _ = std::fs::remove_file(&self.path);
            } else {
                debug!(
                    path = ?self.path,
                    "socket path identity changed; skipping cleanup"
                );
            }
        }
    }
}
