//! Measurements ingestion
use log::{error, info, warn};
use std::{
    io::{self, BufRead},
    sync::mpsc::{self, Receiver, SyncSender},
    thread,
};

use crate::{
    engine::Engine,
    measurement::{DecodeError, Measurement},
    store::Store,
    Error,
};

/// Ingestion statistics
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Non empty records read from the transport
    pub received: usize,
    /// Measurements actually stored
    pub stored: usize,
    /// Records dropped because they did not decode
    pub undecodable: usize,
    /// Measurements dropped by validation
    pub rejected: usize,
    /// Measurements the store failed to append
    pub failed: usize,
}

/// Reads the transport to its end: one JSON record per line.
/// Lines are read as raw bytes, so a corrupted line is one undecodable
/// record and not a transport failure.
/// Returns (received, undecodable) counts.
fn read_transport<R: BufRead>(
    mut transport: R,
    tx: SyncSender<Measurement>,
) -> io::Result<(usize, usize)> {
    let (mut received, mut undecodable) = (0, 0);
    let mut buf = Vec::<u8>::with_capacity(256);
    loop {
        buf.clear();
        if transport.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let decoded = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => line.trim().parse::<Measurement>(),
            Err(e) => Err(DecodeError::from(e)),
        };
        received += 1;
        match decoded {
            Ok(m) => {
                if tx.send(m).is_err() {
                    warn!("storage worker is gone, stop reading");
                    break;
                }
            },
            Err(e) => {
                undecodable += 1;
                warn!(
                    "dropped record \"{}\": {}",
                    String::from_utf8_lossy(&buf).trim(),
                    e
                );
            },
        }
    }
    Ok((received, undecodable))
}

/// Stores everything the reader produces, in arrival order,
/// until the reader hangs up.
fn store_worker<S: Store>(
    engine: &Engine<S>,
    rx: Receiver<Measurement>,
    report: &mut IngestReport,
) {
    for m in rx {
        match engine.add(&m) {
            Ok(()) => report.stored += 1,
            Err(Error::Validation(e)) => {
                report.rejected += 1;
                warn!("{:?} ({}) - rejected: {}", m.timestamp, m.station, e);
            },
            Err(e) => {
                report.failed += 1;
                error!("{:?} ({}) - failed to store: {}", m.timestamp, m.station, e);
            },
        }
    }
}

/// Runs the ingestion loop over given transport, until end of stream.
/// The transport is read on its own thread and feeds a bounded queue
/// (see [Config](crate::prelude::Config)), drained by a single storage
/// worker, so measurements are stored in arrival order.
/// Undecodable and invalid records are logged and dropped. Failing to
/// connect the store is fatal, so is a transport read error.
/// Store errors on a single append do not stop the loop: they are logged
/// and reach the caller as [IngestReport::failed].
pub fn ingest<S: Store, R: BufRead + Send>(
    engine: &Engine<S>,
    transport: R,
) -> Result<IngestReport, Error> {
    engine.connect()?;

    let (tx, rx) = mpsc::sync_channel::<Measurement>(engine.config().queue_depth);

    let report = thread::scope(|scope| -> Result<IngestReport, Error> {
        let reader = thread::Builder::new()
            .name("ardf-transport".to_string())
            .spawn_scoped(scope, move || read_transport(transport, tx))?;

        let mut report = IngestReport::default();
        store_worker(engine, rx, &mut report);

        let (received, undecodable) = reader
            .join()
            .map_err(|_| Error::Io(io::Error::other("transport reader panicked")))??;

        report.received = received;
        report.undecodable = undecodable;
        Ok(report)
    })?;

    info!(
        "end of stream - {} received, {} stored, {} undecodable, {} rejected, {} failed",
        report.received, report.stored, report.undecodable, report.rejected, report.failed
    );
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::{ingest, IngestReport};
    use crate::{
        cfg::Config,
        engine::Engine,
        measurement::Measurement,
        store::{MemoryStore, Store, StoreError},
        Error,
    };
    use hifitime::Epoch;
    use std::io::{self, BufReader, Cursor, Read};

    #[test]
    fn unreachable_store() {
        let engine = Engine::new(Config::default(), MemoryStore::unreachable()).unwrap();
        let transport = Cursor::new(
            r#"{"timestamp":"2024-03-01T12:00:00Z", "station":"a", "longitude": 1, "latitude": 2, "bearing": 3}"#,
        );
        assert!(matches!(ingest(&engine, transport), Err(Error::Connection(_))));
        assert!(engine.store().is_empty().unwrap());
    }

    #[test]
    fn bad_records() {
        let content = [
            r#"{"timestamp":"2024-03-01T12:00:00Z", "station":"a", "longitude": 1, "latitude": 2, "bearing": 3}"#,
            "garbage",
            "",
            r#"{"timestamp":"2024-03-01T12:00:01Z", "station":"b", "longitude": 1, "latitude": 2, "bearing": 400}"#,
            r#"{"timestamp":"2024-03-01T12:00:02Z", "longitude": 1, "latitude": 2, "bearing": 10}"#,
            r#"{"timestamp":"2024-03-01T12:00:03Z", "station":"c", "longitude": 1, "latitude": 2, "bearing": 360}"#,
        ]
        .join("\n");

        let cfg = Config::default().with_queue_depth(1);
        let engine = Engine::new(cfg, MemoryStore::new()).unwrap();
        let report = ingest(&engine, Cursor::new(content)).unwrap();

        assert_eq!(
            report,
            IngestReport {
                received: 5,
                stored: 2,
                undecodable: 1,
                rejected: 2,
                failed: 0,
            }
        );

        let stations = engine
            .store()
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|m| m.station)
            .collect::<Vec<_>>();
        assert_eq!(stations, vec!["a", "c"]);
    }

    #[test]
    fn arrival_order() {
        let content = (0..200)
            .map(|i| {
                format!(
                    r#"{{"timestamp":"2024-03-01T12:00:00Z", "station":"s{:03}", "longitude": 1, "latitude": 2, "bearing": {}}}"#,
                    i,
                    i % 360
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let cfg = Config::default().with_queue_depth(4);
        let engine = Engine::new(cfg, MemoryStore::new()).unwrap();
        let report = ingest(&engine, Cursor::new(content)).unwrap();
        assert_eq!(report.stored, 200);

        let stored = engine.store().snapshot().unwrap();
        for (i, m) in stored.iter().enumerate() {
            assert_eq!(m.station, format!("s{:03}", i), "out of order");
        }
    }

    /// Transport failing after its first record
    struct BrokenTransport {
        first: Option<&'static [u8]>,
    }

    impl Read for BrokenTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.first.take() {
                Some(content) => {
                    buf[..content.len()].copy_from_slice(content);
                    Ok(content.len())
                },
                None => Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer gone")),
            }
        }
    }

    #[test]
    fn transport_failure() {
        let transport = BufReader::new(BrokenTransport {
            first: Some(
                b"{\"timestamp\":\"2024-03-01T12:00:00Z\", \"station\":\"a\", \"longitude\": 1, \"latitude\": 2, \"bearing\": 3}\n",
            ),
        });
        let engine = Engine::new(Config::default(), MemoryStore::new()).unwrap();
        assert!(matches!(ingest(&engine, transport), Err(Error::Io(_))));
        assert_eq!(
            engine.store().len().unwrap(),
            1,
            "records read before the failure are kept"
        );
    }

    #[test]
    fn corrupted_line() {
        let mut content = Vec::<u8>::new();
        content.extend_from_slice(
            br#"{"timestamp":"2024-03-01T12:00:00Z", "station":"a", "longitude": 1, "latitude": 2, "bearing": 3}"#,
        );
        content.extend_from_slice(b"\n\xff\xfe garbage\n");
        content.extend_from_slice(
            br#"{"timestamp":"2024-03-01T12:00:01Z", "station":"b", "longitude": 1, "latitude": 2, "bearing": 4}"#,
        );

        let engine = Engine::new(Config::default(), MemoryStore::new()).unwrap();
        let report = ingest(&engine, Cursor::new(content)).unwrap();
        assert_eq!(report.received, 3);
        assert_eq!(report.undecodable, 1);
        assert_eq!(report.stored, 2);

        let stations = engine
            .store()
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|m| m.station)
            .collect::<Vec<_>>();
        assert_eq!(stations, vec!["a", "b"]);
    }

    /// Store refusing every append
    struct FullStore;

    impl Store for FullStore {
        fn connect(&self) -> Result<(), StoreError> {
            Ok(())
        }
        fn connected(&self) -> bool {
            true
        }
        fn insert(&self, _: &Measurement) -> Result<usize, StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }
        fn select_since(&self, _: Epoch) -> Result<Vec<Measurement>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn store_failures_are_reported() {
        let content = [
            r#"{"timestamp":"2024-03-01T12:00:00Z", "station":"a", "longitude": 1, "latitude": 2, "bearing": 3}"#,
            r#"{"timestamp":"2024-03-01T12:00:01Z", "station":"b", "longitude": 1, "latitude": 2, "bearing": 4}"#,
        ]
        .join("\n");

        let engine = Engine::new(Config::default(), FullStore).unwrap();
        let report = ingest(&engine, Cursor::new(content)).unwrap();
        assert_eq!(
            report,
            IngestReport {
                received: 2,
                stored: 0,
                undecodable: 0,
                rejected: 0,
                failed: 2,
            }
        );
    }
}
