//! Redis-backed [`KeyValueStore`].
//!
//! The connection is opened on first use and kept across ticks. Any failed
//! command drops it, so the next write reconnects instead of reusing a dead
//! socket.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use redis::{Client, Commands, Connection, RedisError, RedisResult};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::sink::SinkError;
use crate::sink::kv::KeyValueStore;

/// Writes keys to a Redis server with connect, read and write timeouts.
pub struct RedisStore {
    config: StoreConfig,
    conn: Option<Connection>,
}

impl RedisStore {
    /// Creates the store without connecting.
    pub fn new(config: StoreConfig) -> Self {
        Self { config, conn: None }
    }

    fn url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.config.host, self.config.port, self.config.db
        )
    }

    /// Opens a connection, bounded by the configured timeout as a whole.
    ///
    /// The client handshake (`CLIENT SETINFO`, `SELECT`) runs before read
    /// timeouts can be set, so the dial and handshake run on a worker thread.
    /// A worker stuck on a silent peer is abandoned and exits once the peer
    /// closes.
    fn connect(&self) -> Result<Connection, SinkError> {
        let url = self.url();
        let timeout = self.config.timeout;
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("redis-connect".to_string())
            .spawn(move || {
                let result = open_connection(&url, timeout);
                // The receiver is gone if the caller already timed out.
                let _ = tx.send(result);
            })
            .map_err(|e| SinkError::Connection {
                address: self.config.address(),
                message: format!("cannot spawn connect thread: {}", e),
            })?;

        let conn = match rx.recv_timeout(timeout) {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(self.connection_error(&e)),
            Err(_) => {
                return Err(SinkError::Connection {
                    address: self.config.address(),
                    message: format!("no handshake reply within {:?}", timeout),
                });
            }
        };

        info!(
            address = %self.config.address(),
            db = self.config.db,
            "connected to redis"
        );
        Ok(conn)
    }

    fn connection(&mut self) -> Result<&mut Connection, SinkError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };
        Ok(self.conn.insert(conn))
    }

    fn connection_error(&self, e: &RedisError) -> SinkError {
        SinkError::Connection {
            address: self.config.address(),
            message: e.to_string(),
        }
    }

    fn classify(&self, key: &str, e: &RedisError) -> SinkError {
        if e.is_io_error()
            || e.is_timeout()
            || e.is_connection_dropped()
            || e.is_connection_refusal()
        {
            self.connection_error(e)
        } else {
            SinkError::Command {
                key: key.to_string(),
                message: e.to_string(),
            }
        }
    }
}

fn open_connection(url: &str, timeout: Duration) -> RedisResult<Connection> {
    let client = Client::open(url)?;
    let conn = client.get_connection_with_timeout(timeout)?;
    conn.set_read_timeout(Some(timeout))?;
    conn.set_write_timeout(Some(timeout))?;
    Ok(conn)
}

impl KeyValueStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        let conn = self.connection()?;
        let result: RedisResult<()> = conn.set(key, value);

        match result {
            Ok(()) => {
                debug!(key, value, "SET");
                Ok(())
            }
            Err(e) => {
                self.conn = None;
                warn!(key, error = %e, "redis write failed, dropping connection");
                Err(self.classify(key, &e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// What a fake server connection does once it has read a `SET`.
    #[derive(Clone, Copy)]
    enum OnSet {
        /// Reply `+OK` and keep serving.
        Reply,
        /// Reply `+OK`, then hang up.
        ReplyAndClose,
        /// Never reply.
        Stall,
    }

    /// Returns a local port with nothing listening on it.
    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    fn store_on(port: u16) -> RedisStore {
        RedisStore::new(StoreConfig {
            host: "127.0.0.1".to_string(),
            port,
            db: 0,
            timeout: Duration::from_secs(1),
        })
    }

    /// Reads one RESP array command, e.g. `*3\r\n$3\r\nSET\r\n...`.
    fn read_command(reader: &mut BufReader<TcpStream>) -> Option<Vec<String>> {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            line.clear();
            reader.read_line(&mut line).ok()?;
            let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
            let mut buf = vec![0; len + 2];
            reader.read_exact(&mut buf).ok()?;
            buf.truncate(len);
            args.push(String::from_utf8_lossy(&buf).into_owned());
        }
        Some(args)
    }

    /// Serves one connection per script entry. Handshake commands get `+OK`;
    /// keys of accepted `SET`s are recorded in order.
    fn fake_redis(script: Vec<OnSet>) -> (u16, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let keys = Arc::new(Mutex::new(Vec::new()));
        let recorded = keys.clone();

        thread::spawn(move || {
            for on_set in script {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(stream);
                while let Some(args) = read_command(&mut reader) {
                    let is_set = args.first().is_some_and(|c| c.eq_ignore_ascii_case("SET"));
                    if is_set && matches!(on_set, OnSet::Stall) {
                        // Hold the socket open without answering.
                        thread::sleep(Duration::from_secs(10));
                        break;
                    }
                    if reader.get_mut().write_all(b"+OK\r\n").is_err() {
                        break;
                    }
                    if is_set {
                        recorded.lock().unwrap().push(args[1].clone());
                        if matches!(on_set, OnSet::ReplyAndClose) {
                            break;
                        }
                    }
                }
            }
        });

        (port, keys)
    }

    #[test]
    fn test_new_does_not_connect() {
        let store = RedisStore::new(StoreConfig::default());
        assert!(store.conn.is_none());
        assert_eq!(store.url(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_unreachable_store_is_connection_error() {
        let mut store = store_on(closed_port());
        match store.set("host1.cpu.temperature", "42.5") {
            Err(SinkError::Connection { address, .. }) => {
                assert!(address.starts_with("127.0.0.1:"));
            }
            other => panic!("expected Connection error, got {:?}", other),
        }
        assert!(store.conn.is_none());
    }

    #[test]
    fn test_silent_store_times_out_during_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (release, held) = mpsc::channel::<()>();
        let server = thread::spawn(move || {
            let (_stream, _) = listener.accept().unwrap();
            // Accept, then say nothing until the test is done.
            let _ = held.recv_timeout(Duration::from_secs(30));
        });

        let mut store = store_on(port);
        let started = Instant::now();
        let result = store.set("host1.cpu.temperature", "42.5");
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(SinkError::Connection { .. })));
        assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
        assert!(store.conn.is_none());

        release.send(()).unwrap();
        server.join().unwrap();
    }

    #[test]
    fn test_set_reaches_server() {
        let (port, keys) = fake_redis(vec![OnSet::Reply]);
        let mut store = store_on(port);

        store.set("host1.cpu.temperature", "42.5").unwrap();
        store.set("host1.cpu.temperature.time", "1700000000").unwrap();

        assert!(store.conn.is_some());
        assert_eq!(
            *keys.lock().unwrap(),
            vec!["host1.cpu.temperature", "host1.cpu.temperature.time"]
        );
    }

    #[test]
    fn test_dropped_connection_is_reported_then_reopened() {
        let (port, keys) = fake_redis(vec![OnSet::ReplyAndClose, OnSet::Reply]);
        let mut store = store_on(port);

        store.set("first", "1").unwrap();

        // The server hung up after the first reply.
        let err = store.set("second", "2").unwrap_err();
        assert!(matches!(err, SinkError::Connection { .. }), "{:?}", err);
        assert!(store.conn.is_none());

        store.set("third", "3").unwrap();
        assert!(store.conn.is_some());
        assert_eq!(*keys.lock().unwrap(), vec!["first", "third"]);
    }

    #[test]
    fn test_unanswered_write_times_out() {
        let (port, keys) = fake_redis(vec![OnSet::Stall]);
        let mut store = store_on(port);

        let started = Instant::now();
        let err = store.set("host1.cpu.temperature", "42.5").unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, SinkError::Connection { .. }), "{:?}", err);
        assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
        assert!(store.conn.is_none());
        assert!(keys.lock().unwrap().is_empty());
    }
}
