//! Shared utilities for integration testing.
//!
//! The proxy's upstream client is pointed at a raw-TCP mock through
//! `upstream.proxy`, so requests for `http://github.com/...` land on the mock
//! in absolute form and the test can see exactly what was forwarded.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use github_proxy::config::{ConfigStore, ProxyConfig};
use github_proxy::http::build_client;
use github_proxy::{HttpServer, RequestPipeline, Shutdown};

/// One request as the mock upstream received it.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What the mock answers with.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Hold the reply back for `delay` after the request is read.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A mock upstream (or forward proxy) that records what it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    /// Start a mock that answers every request with `reply`.
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let reply = Arc::new(reply);

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let reply = reply.clone();
                tokio::spawn(async move {
                    serve_one(socket, recorded, reply).await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn proxy_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_one<F>(socket: TcpStream, recorded: Arc<Mutex<Vec<Recorded>>>, reply: Arc<F>)
where
    F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
{
    let mut reader = BufReader::new(socket);
    let Some(request) = read_request(&mut reader).await else {
        return;
    };
    let answer = (*reply)(&request);
    recorded.lock().unwrap().push(request);
    tokio::time::sleep(answer.delay).await;

    let mut head = format!("HTTP/1.1 {} {}\r\n", answer.status, reason(answer.status));
    let declares_length = answer
        .headers
        .iter()
        .any(|(k, _)| k.eq_ignore_ascii_case("content-length"));
    for (name, value) in &answer.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    if !declares_length {
        head.push_str(&format!("Content-Length: {}\r\n", answer.body.len()));
    }
    head.push_str("Connection: close\r\n\r\n");

    let socket = reader.get_mut();
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(&answer.body).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

async fn read_request(reader: &mut BufReader<TcpStream>) -> Option<Recorded> {
    let mut request = Recorded::default();

    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    request.request_line = line.trim_end().to_string();
    if request.request_line.is_empty() {
        return None;
    }

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            request
                .headers
                .push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    if let Some(length) = request.header("content-length") {
        let length: usize = length.parse().ok()?;
        let mut body = vec![0; length];
        reader.read_exact(&mut body).await.ok()?;
        request.body = body;
    } else if request
        .header("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    {
        request.body = read_chunked(reader).await?;
    }

    Some(request)
}

async fn read_chunked(reader: &mut BufReader<TcpStream>) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).await.ok()?;
        let size_hex = size_line.trim_end().split(';').next()?;
        let size = usize::from_str_radix(size_hex.trim(), 16).ok()?;

        let mut chunk = vec![0; size + 2];
        reader.read_exact(&mut chunk).await.ok()?;
        if size == 0 {
            return Some(body);
        }
        chunk.truncate(size);
        body.extend_from_slice(&chunk);
    }
}

/// An upstream that streams an endless body and reports when its peer
/// closes the connection.
pub struct StreamingUpstream {
    pub addr: SocketAddr,
    closed: tokio::sync::mpsc::UnboundedReceiver<u64>,
}

impl StreamingUpstream {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (closed_tx, closed) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let closed_tx = closed_tx.clone();
                tokio::spawn(async move {
                    let mut reader = BufReader::new(socket);
                    if read_request(&mut reader).await.is_none() {
                        return;
                    }
                    let (mut rx, mut tx) = reader.into_inner().into_split();

                    let head = "HTTP/1.1 200 OK\r\nContent-Length: 1073741824\r\n\r\n";
                    if tx.write_all(head.as_bytes()).await.is_err() {
                        return;
                    }

                    let chunk = vec![b'x'; 16 * 1024];
                    let mut written = 0u64;
                    let mut scratch = [0u8; 64];
                    loop {
                        tokio::select! {
                            read = rx.read(&mut scratch) => {
                                if matches!(read, Ok(0) | Err(_)) {
                                    break;
                                }
                            }
                            sent = tx.write_all(&chunk) => {
                                if sent.is_err() {
                                    break;
                                }
                                written += chunk.len() as u64;
                                tokio::time::sleep(Duration::from_millis(2)).await;
                            }
                        }
                    }
                    let _ = closed_tx.send(written);
                });
            }
        });

        Self { addr, closed }
    }

    pub fn proxy_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Bytes written before the peer went away.
    pub async fn wait_closed(&mut self) -> Option<u64> {
        self.closed.recv().await
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        206 => "Partial Content",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// A running proxy bound to an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub store: Arc<ConfigStore>,
    shutdown: Shutdown,
}

impl TestProxy {
    /// Start the proxy with every upstream request routed through `mock`.
    pub async fn start(config: ProxyConfig, mock: &MockUpstream) -> Self {
        Self::start_via(config, mock.proxy_url()).await
    }

    /// Start the proxy with every upstream request routed through `upstream`.
    pub async fn start_via(mut config: ProxyConfig, upstream: String) -> Self {
        config.upstream.proxy = Some(upstream);

        let store = Arc::new(ConfigStore::from_config(&config));
        let client = build_client(&config.upstream).unwrap();
        let server = HttpServer::new(RequestPipeline::new(store.clone(), client));
        let shutdown = Shutdown::new();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server.run(listener, shutdown.subscribe()));

        Self {
            addr,
            store,
            shutdown,
        }
    }

    /// Proxy URL for an upstream target, e.g. `http://github.com/a/b/...`.
    pub fn url(&self, target: &str) -> String {
        format!("http://{}/{}", self.addr, target)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A client that talks to the proxy directly and never follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
