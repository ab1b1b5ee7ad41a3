//! Plain statsd line sender over UDP.
//!
//! One datagram per metric: `name:delta|c` for counts, `name:ms|ms` for
//! timings. The socket is non-blocking and every send is best-effort; a
//! failed send is logged at debug level and dropped.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use statsprism_core::MetricsClient;

#[derive(Debug)]
pub struct StatsdSink {
    socket: UdpSocket,
    agent_addr: SocketAddr,
}

impl StatsdSink {
    pub fn connect(host: &str, port: u16) -> io::Result<Self> {
        let agent_addr = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("cannot resolve {host}:{port}"))
        })?;
        let bind = if agent_addr.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, agent_addr })
    }

    pub fn agent_addr(&self) -> SocketAddr {
        self.agent_addr
    }

    fn send_line(&self, line: &str) {
        if let Err(e) = self.socket.send_to(line.as_bytes(), self.agent_addr) {
            tracing::debug!(error = %e, addr = %self.agent_addr, "statsd send failed");
        }
    }
}

pub(crate) fn count_line(name: &str, delta: i64) -> String {
    format!("{name}:{delta}|c")
}

pub(crate) fn timing_line(name: &str, duration: Duration) -> String {
    format!("{name}:{:.3}|ms", duration.as_secs_f64() * 1000.0)
}

impl MetricsClient for StatsdSink {
    fn send_count(&self, name: &str, delta: i64) {
        self.send_line(&count_line(name, delta));
    }

    fn send_timing(&self, name: &str, duration: Duration) {
        self.send_line(&timing_line(name, duration));
    }
}
