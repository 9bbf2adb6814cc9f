//! Test doubles: a scripted model client and a loopback HTTP responder.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener};
use std::rc::Rc;
use std::thread::JoinHandle;
use crate::{error::UpstreamError, llm::ModelClient, message::Message};

#[derive(Debug, Clone)]
pub struct Call {
    pub system_prompt: String,
    pub context: Vec<Message>,
    pub user_text: String,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Replies from a fixed script and records what it was asked.
pub struct ScriptedClient {
    replies: RefCell<VecDeque<Result<String, UpstreamError>>>,
    calls: CallLog,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, UpstreamError>>) -> (Self, CallLog) {
        let calls = CallLog::default();
        let client = Self { replies: RefCell::new(replies.into()), calls: Rc::clone(&calls) };
        (client, calls)
    }

    pub fn replying(texts: &[&str]) -> (Self, CallLog) {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }
}

impl ModelClient for ScriptedClient {
    fn generate(&self, system_prompt: &str, context: &[Message], user_text: &str) -> Result<String, UpstreamError> {
        self.calls.borrow_mut().push(Call {
            system_prompt: system_prompt.to_string(),
            context: context.to_vec(),
            user_text: user_text.to_string(),
        });
        self.replies.borrow_mut().pop_front().unwrap_or(Err(UpstreamError::EmptyReply))
    }
}

pub fn quota_exceeded() -> UpstreamError {
    UpstreamError::Status { status: 429, message: "quota exceeded".to_string() }
}

#[derive(Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Accepts exactly one connection on 127.0.0.1, records the request and
/// answers with a canned JSON response.
pub struct OneShotServer {
    addr: SocketAddr,
    handle: JoinHandle<RecordedRequest>,
}

impl OneShotServer {
    pub fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut BufReader::new(stream.try_clone().unwrap()));
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(status),
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn finish(self) -> RecordedRequest {
        self.handle.join().unwrap()
    }
}

/// A loopback address nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn read_request(reader: &mut impl BufRead) -> RecordedRequest {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).unwrap();
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).unwrap();

    RecordedRequest { method, path, headers, body: String::from_utf8_lossy(&body).into_owned() }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
