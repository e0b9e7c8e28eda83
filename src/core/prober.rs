//! HTTP reachability probe.
//!
//! One GET per call. The status line decides: `200 OK` is reachable, every
//! other outcome (DNS, TLS, refused, timeout, non-200) collapses into
//! "unreachable". The cause is logged at debug level and otherwise dropped.

use std::io;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::constants;
use crate::state::{Domain, ProbeResult};

/// Something that can check whether a domain answers.
pub trait Prober {
    fn probe(&self, domain: &Domain) -> ProbeResult;
}

impl<P: Prober + ?Sized> Prober for &P {
    fn probe(&self, domain: &Domain) -> ProbeResult {
        (**self).probe(domain)
    }
}

/// Blocking HTTP(S) prober.
///
/// Proxy environment variables are ignored: the probe must take the host's
/// own route, which is exactly what the tunnel changes.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .user_agent(format!("{}/{}", constants::APP_NAME, constants::APP_VERSION))
            .build()?;
        Ok(Self { client })
    }

    /// Prober with the standard 5 second budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_default_timeout() -> Result<Self, reqwest::Error> {
        Self::new(Duration::from_secs(constants::PROBE_TIMEOUT_SECS))
    }

    fn fetch(&self, url: &str) -> Result<StatusCode, String> {
        let mut response = self.client.get(url).send().map_err(|e| e.to_string())?;
        let status = response.status();
        // Drained for connection release and latency only; the verdict is
        // already fixed by the status.
        if let Err(e) = io::copy(&mut response, &mut io::sink()) {
            crate::log_debug!("PROBE", "{url}: HTTP {status}, body not fully read: {e}");
        }
        Ok(status)
    }
}

impl Prober for HttpProber {
    fn probe(&self, domain: &Domain) -> ProbeResult {
        let url = domain.url();
        let start = Instant::now();
        let outcome = self.fetch(&url);
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(StatusCode::OK) => ProbeResult::reachable(latency_ms),
            Ok(status) => {
                crate::log_debug!("PROBE", "{url}: HTTP {status}");
                ProbeResult::unreachable(latency_ms)
            }
            Err(e) => {
                crate::log_debug!("PROBE", "{url}: {e}");
                ProbeResult::unreachable(latency_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves `response` to the first connection on a loopback port.
    fn serve_once(response: &'static str, delay: Duration) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            thread::sleep(delay);
            let _ = stream.write_all(response.as_bytes());
        });
        (url, handle)
    }

    fn prober(timeout: Duration) -> HttpProber {
        HttpProber::new(timeout).unwrap()
    }

    #[test]
    fn test_200_is_reachable() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
            Duration::ZERO,
        );

        let result = prober(Duration::from_secs(5)).probe(&Domain::parse(&url).unwrap());

        assert!(result.success);
        assert!(result.latency_ms < 5000);
        server.join().unwrap();
    }

    #[test]
    fn test_non_200_is_unreachable() {
        for response in [
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n",
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\ndown",
        ] {
            let (url, server) = serve_once(response, Duration::ZERO);
            let result = prober(Duration::from_secs(5)).probe(&Domain::parse(&url).unwrap());
            assert!(!result.success, "{response}");
            server.join().unwrap();
        }
    }

    #[test]
    fn test_connection_refused_is_unreachable() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let domain = Domain::parse(&format!("http://127.0.0.1:{port}")).unwrap();

        let result = prober(Duration::from_secs(5)).probe(&domain);

        assert!(!result.success);
    }

    #[test]
    fn test_timeout_is_unreachable_and_bounded() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Duration::from_millis(1500),
        );

        let result = prober(Duration::from_millis(200)).probe(&Domain::parse(&url).unwrap());

        assert!(!result.success);
        assert!(result.latency_ms >= 200, "latency {}", result.latency_ms);
        assert!(result.latency_ms < 1500, "latency {}", result.latency_ms);
        server.join().unwrap();
    }

    #[test]
    fn test_status_decides_even_if_body_breaks() {
        // Promises 100 bytes, sends 3, then closes.
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nabc",
            Duration::ZERO,
        );

        let result = prober(Duration::from_secs(5)).probe(&Domain::parse(&url).unwrap());

        assert!(result.success);
        server.join().unwrap();
    }

    #[test]
    fn test_slow_body_after_200_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nab");
            let _ = stream.flush();
            thread::sleep(Duration::from_millis(1500));
        });

        let result = prober(Duration::from_millis(700)).probe(&Domain::parse(&url).unwrap());

        assert!(result.success);
        assert!(result.latency_ms < 1500, "latency {}", result.latency_ms);
        server.join().unwrap();
    }

    #[test]
    fn test_proxy_variables_are_ignored() {
        // A proxy that refuses connections would make every request fail.
        for var in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
            std::env::set_var(var, "http://127.0.0.1:9");
        }
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
            Duration::ZERO,
        );

        let result = prober(Duration::from_secs(5)).probe(&Domain::parse(&url).unwrap());

        for var in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
            std::env::remove_var(var);
        }
        assert!(result.success);
        server.join().unwrap();
    }
}
