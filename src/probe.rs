// src/probe.rs
//! Query a tracking service through an ordered list of candidate routes.
//!
//! Candidates are tried in order and the first healthy answer wins; the rest
//! are never sent. A candidate fails on a transport error, a non-2xx status,
//! a body that is not a JSON object, or an object carrying an `error` member.

use std::fmt;
use std::time::Duration;

use serde_json::json;

use crate::cascade::{Cascade, Strategy};
use crate::error::{FetchError, ProbeFailure, TransportError};
use crate::payload::RawPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Method::Get => "GET", Method::Post => "POST" })
    }
}

/// A route to try. `path` may contain `{carrier}` and `{tracking}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCandidate {
    pub path: String,
    pub method: Method,
}

impl ProbeCandidate {
    pub fn get(path: &str) -> Self { Self { path: path.to_string(), method: Method::Get } }
    pub fn post(path: &str) -> Self { Self { path: path.to_string(), method: Method::Post } }

    /// Carrier-specific route first, then the generic ones, then the UPS route
    /// older servers only expose.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::post("/api/track-{carrier}"),
            Self::post("/api/track"),
            Self::get("/api/track"),
            Self::post("/api/track-ups"),
        ]
    }

    /// Parse `"POST /api/track"` / `"get /x"`. A bare path means POST.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let first = parts.next()?;
        let (method, path) = match first.to_ascii_uppercase().as_str() {
            "GET" => (Method::Get, parts.next()?),
            "POST" => (Method::Post, parts.next()?),
            _ => (Method::Post, first),
        };
        if parts.next().is_some() || !path.starts_with('/') {
            return None;
        }
        Some(Self { path: path.to_string(), method })
    }

    /// Parse a comma-separated list, skipping entries that do not parse.
    pub fn parse_list(text: &str) -> Vec<Self> {
        text.split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|s| {
                let c = Self::parse(s);
                if c.is_none() {
                    log::warn!("probe: ignoring malformed candidate '{}'", s.trim());
                }
                c
            })
            .collect()
    }

    pub fn resolve(&self, tracking_number: &str, carrier: &str) -> String {
        self.path
            .replace("{carrier}", carrier)
            .replace("{tracking}", tracking_number)
    }
}

impl fmt::Display for ProbeCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// One outgoing call, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub method: Method,
    pub path: String,
    pub tracking_number: String,
    pub carrier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Whatever actually carries a request to the service.
pub trait Transport: Send + Sync {
    fn send(&self, request: &ProbeRequest) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport against a base URL.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ProbeRequest) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let builder = match request.method {
            Method::Post => self.client.post(&url).json(&json!({
                "trackingNumber": request.tracking_number,
                "carrier": request.carrier,
            })),
            Method::Get => self.client.get(&url).query(&[
                ("trackingNumber", request.tracking_number.as_str()),
                ("carrier", request.carrier.as_str()),
            ]),
        };
        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(TransportResponse { status, body })
    }
}

struct Query<'q> {
    tracking_number: &'q str,
    carrier: &'q str,
}

/// One candidate bound to the transport it will be sent over.
struct CandidateAttempt<'a, T: ?Sized> {
    transport: &'a T,
    candidate: &'a ProbeCandidate,
    label: String,
}

impl<T: Transport + ?Sized> Strategy<Query<'_>, RawPayload> for CandidateAttempt<'_, T> {
    fn name(&self) -> &str { &self.label }

    fn attempt(&self, q: &Query<'_>) -> Option<RawPayload> {
        let request = ProbeRequest {
            method: self.candidate.method,
            path: self.candidate.resolve(q.tracking_number, q.carrier),
            tracking_number: q.tracking_number.to_string(),
            carrier: q.carrier.to_string(),
        };
        let resp = match self.transport.send(&request) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("probe: {} failed: {}", self.label, e);
                return None;
            }
        };
        if !(200..300).contains(&resp.status) {
            log::warn!("probe: {} answered HTTP {}", self.label, resp.status);
            return None;
        }
        let payload = match serde_json::from_str(&resp.body) {
            Ok(v @ serde_json::Value::Object(_)) => RawPayload(v),
            Ok(other) => {
                log::warn!("probe: {} returned JSON that is not an object: {}", self.label, other);
                return None;
            }
            Err(e) => {
                log::warn!("probe: {} returned non-JSON body: {}", self.label, e);
                return None;
            }
        };
        if let Some(msg) = payload.error_message() {
            log::warn!("probe: {} reported error: {}", self.label, msg);
            return None;
        }
        Some(payload)
    }
}

pub struct EndpointProbe<T> {
    transport: T,
}

impl<T: Transport> EndpointProbe<T> {
    pub fn new(transport: T) -> Self { Self { transport } }

    pub fn transport(&self) -> &T { &self.transport }

    pub fn probe(
        &self,
        tracking_number: &str,
        carrier: &str,
        candidates: &[ProbeCandidate],
    ) -> Result<RawPayload, ProbeFailure> {
        let cascade = candidates.iter().fold(Cascade::new(), |c, candidate| {
            c.then(CandidateAttempt {
                transport: &self.transport,
                candidate,
                label: candidate.to_string(),
            })
        });
        let query = Query { tracking_number, carrier };
        match cascade.run(&query) {
            Some(hit) => {
                log::info!("probe: {} answered for {}", hit.name, tracking_number);
                Ok(hit.output)
            }
            None => {
                log::error!("probe: all {} candidate(s) failed for {}", candidates.len(), tracking_number);
                Err(ProbeFailure::AllCandidatesExhausted { attempted: candidates.len() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers from a fixed script keyed by resolved path; records every call.
    struct Scripted {
        answers: Vec<(&'static str, Result<TransportResponse, &'static str>)>,
        calls: Mutex<Vec<String>>,
    }

    impl Transport for Scripted {
        fn send(&self, req: &ProbeRequest) -> Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push(format!("{} {}", req.method, req.path));
            match self.answers.iter().find(|(p, _)| *p == req.path) {
                Some((_, Ok(r))) => Ok(r.clone()),
                Some((_, Err(e))) => Err(TransportError::Other(e.to_string())),
                None => Ok(TransportResponse { status: 404, body: "not found".into() }),
            }
        }
    }

    fn ok(body: &str) -> Result<TransportResponse, &'static str> {
        Ok(TransportResponse { status: 200, body: body.to_string() })
    }

    #[test]
    fn first_healthy_candidate_wins_and_later_ones_are_not_sent() {
        let transport = Scripted {
            answers: vec![
                ("/api/track-fedex", Err("connection refused")),
                ("/api/track", ok(r#"{"error":"unsupported carrier"}"#)),
                ("/api/track-ups", ok(r#"{"status":"In Transit"}"#)),
            ],
            calls: Mutex::new(Vec::new()),
        };
        let probe = EndpointProbe::new(transport);
        let candidates = vec![
            ProbeCandidate::post("/api/track-{carrier}"),
            ProbeCandidate::post("/api/track"),
            ProbeCandidate::post("/api/track-ups"),
            ProbeCandidate::get("/api/never"),
        ];
        let payload = probe.probe("1Z", "fedex", &candidates).unwrap();
        assert_eq!(payload.0["status"], "In Transit");
        let calls = probe.transport().calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["POST /api/track-fedex", "POST /api/track", "POST /api/track-ups"]);
    }

    #[test]
    fn exhaustion_counts_attempts() {
        let transport = Scripted {
            answers: vec![("/a", ok("<html>not json</html>"))],
            calls: Mutex::new(Vec::new()),
        };
        let probe = EndpointProbe::new(transport);
        let err = probe
            .probe("1Z", "ups", &[ProbeCandidate::get("/a"), ProbeCandidate::get("/b")])
            .unwrap_err();
        assert_eq!(err, ProbeFailure::AllCandidatesExhausted { attempted: 2 });
    }

    #[test]
    fn bare_json_values_are_not_answers() {
        let transport = Scripted {
            answers: vec![
                ("/null", ok("null")),
                ("/number", ok("42")),
                ("/list", ok(r#"[{"status":"Delivered"}]"#)),
                ("/obj", ok(r#"{"status":"Delivered"}"#)),
            ],
            calls: Mutex::new(Vec::new()),
        };
        let service = EndpointProbe::new(transport);
        let candidates: Vec<_> = ["/null", "/number", "/list", "/obj"].into_iter().map(ProbeCandidate::get).collect();
        let payload = service.probe("1Z", "ups", &candidates).unwrap();
        assert_eq!(payload.0["status"], "Delivered");
        assert_eq!(service.transport().calls.lock().unwrap().len(), 4);

        let err = service.probe("1Z", "ups", &candidates[..3]).unwrap_err();
        assert_eq!(err, ProbeFailure::AllCandidatesExhausted { attempted: 3 });
    }

    #[test]
    fn parses_candidate_lists() {
        let list = ProbeCandidate::parse_list("POST /api/track-{carrier}, get /api/track, /x, BOGUS");
        assert_eq!(
            list,
            vec![
                ProbeCandidate::post("/api/track-{carrier}"),
                ProbeCandidate::get("/api/track"),
                ProbeCandidate::post("/x"),
            ]
        );
        assert_eq!(ProbeCandidate::post("/t/{carrier}/{tracking}").resolve("1Z", "ups"), "/t/ups/1Z");
    }
}
