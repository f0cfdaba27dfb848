use bytes::Bytes;
use resumable_dl::{
    ErrorKind, EventCallback, LocalSink, ObjectId, ObjectLocation, RemoteObjectReader,
    ResumableTransfer, TransferError, TransferEvent, TransferOptions, TransferSession,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Serve,
    /// Serves after 9 seconds, just inside the default deadline.
    Slow,
    Hang,
    FailNetwork,
    Short,
}

/// In-memory object that records every request and follows a per-read script.
struct ScriptedReader {
    data: Vec<u8>,
    missing: bool,
    script: Mutex<VecDeque<Behavior>>,
    reads: Mutex<Vec<(u64, u64)>>,
    length_requests: AtomicUsize,
    /// Regular file created on the first read, to break the destination's directory.
    blocker: Option<PathBuf>,
}

impl ScriptedReader {
    fn new(data: Vec<u8>) -> Arc<Self> {
        Self::with_script(data, Vec::new())
    }

    fn with_script(data: Vec<u8>, script: Vec<Behavior>) -> Arc<Self> {
        Arc::new(Self {
            data,
            missing: false,
            script: Mutex::new(script.into()),
            reads: Mutex::new(Vec::new()),
            length_requests: AtomicUsize::new(0),
            blocker: None,
        })
    }

    fn blocking_dir(data: Vec<u8>, blocker: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            data,
            missing: false,
            script: Mutex::new(VecDeque::new()),
            reads: Mutex::new(Vec::new()),
            length_requests: AtomicUsize::new(0),
            blocker: Some(blocker),
        })
    }

    fn missing() -> Arc<Self> {
        Arc::new(Self {
            data: Vec::new(),
            missing: true,
            script: Mutex::new(VecDeque::new()),
            reads: Mutex::new(Vec::new()),
            length_requests: AtomicUsize::new(0),
            blocker: None,
        })
    }

    fn reads(&self) -> Vec<(u64, u64)> {
        self.reads.lock().unwrap().clone()
    }

    fn length_requests(&self) -> usize {
        self.length_requests.load(Ordering::SeqCst)
    }
}

impl RemoteObjectReader for ScriptedReader {
    async fn probe_length(&self, object: &ObjectId) -> Result<u64, TransferError> {
        self.length_requests.fetch_add(1, Ordering::SeqCst);
        if self.missing {
            return Err(TransferError::NotFound(object.to_string()));
        }
        Ok(self.data.len() as u64)
    }

    async fn read_range(
        &self,
        _location: &ObjectLocation,
        offset: u64,
        length: u64,
    ) -> Result<Bytes, TransferError> {
        self.reads.lock().unwrap().push((offset, length));
        if let Some(blocker) = &self.blocker {
            if !blocker.exists() {
                std::fs::write(blocker, b"not a directory").unwrap();
            }
        }
        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Behavior::Serve);

        let start = offset as usize;
        let end = start + length as usize;
        match behavior {
            Behavior::Serve => Ok(Bytes::copy_from_slice(&self.data[start..end])),
            Behavior::Slow => {
                tokio::time::sleep(Duration::from_secs(9)).await;
                Ok(Bytes::copy_from_slice(&self.data[start..end]))
            }
            Behavior::Short => Ok(Bytes::copy_from_slice(&self.data[start..end - 1])),
            Behavior::FailNetwork => Err(TransferError::network(
                "range read failed",
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            )),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn object() -> ObjectId {
    ObjectId {
        account: "myaccount".into(),
        container: "backups".into(),
        object_name: "disk.vhd".into(),
    }
}

fn collect_events() -> (EventCallback, Arc<Mutex<Vec<TransferEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: EventCallback = Arc::new(move |event: &TransferEvent| {
        sink.lock().unwrap().push(event.clone());
    });
    (callback, events)
}

fn session(
    reader: &Arc<ScriptedReader>,
    path: &Path,
    options: TransferOptions,
) -> (
    TransferSession<Arc<ScriptedReader>>,
    Arc<Mutex<Vec<TransferEvent>>>,
) {
    let (callback, events) = collect_events();
    let transfer = ResumableTransfer::new(
        Arc::clone(reader),
        object(),
        LocalSink::new(path),
        options,
    )
    .with_events(callback);
    (TransferSession::new(transfer), events)
}

fn options(chunk_size: u64) -> TransferOptions {
    TransferOptions {
        chunk_size,
        ..Default::default()
    }
}

fn progress(events: &[TransferEvent]) -> Vec<(u64, u64, u64)> {
    events
        .iter()
        .filter_map(|event| match event {
            TransferEvent::Progress(sample) => {
                Some((sample.percent_done, sample.bytes_done, sample.chunk_bytes))
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn three_chunks_with_clamped_tail() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blob.bin");
    let data = pattern(2_500_000);
    let reader = ScriptedReader::new(data.clone());

    let (mut session, events) = session(&reader, &path, options(1_000_000));
    let summary = session.run().await.unwrap();

    assert_eq!(
        reader.reads(),
        vec![
            (0, 1_000_000),
            (1_000_000, 1_000_000),
            (2_000_000, 500_000)
        ]
    );
    let events = events.lock().unwrap();
    assert_eq!(
        progress(&events),
        vec![
            (40, 1_000_000, 1_000_000),
            (80, 2_000_000, 1_000_000),
            (100, 2_500_000, 500_000)
        ]
    );
    assert!(matches!(
        events.last(),
        Some(TransferEvent::Completed {
            object_length: 2_500_000,
            bytes_transferred: 2_500_000
        })
    ));
    assert_eq!(summary.chunks, 3);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 2_500_000);
    assert_eq!(std::fs::read(&path).unwrap(), data);
}

#[tokio::test]
async fn zero_length_object_completes_without_reads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.bin");
    let reader = ScriptedReader::new(Vec::new());

    let (mut session, events) = session(&reader, &path, options(1_000_000));
    let summary = session.run().await.unwrap();

    assert!(reader.reads().is_empty());
    assert_eq!(summary.chunks, 0);
    assert_eq!(summary.bytes_transferred, 0);
    assert!(progress(&events.lock().unwrap()).is_empty());
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
}

#[tokio::test]
async fn partial_file_resumes_at_its_length() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.bin");
    let data = pattern(10_000);
    // Prefix deliberately differs from the remote bytes: it must be left untouched.
    std::fs::write(&path, vec![0xAA; 3_000]).unwrap();
    let reader = ScriptedReader::new(data.clone());

    let (mut session, events) = session(&reader, &path, options(4_096));
    let summary = session.run().await.unwrap();

    assert_eq!(reader.reads(), vec![(3_000, 4_096), (7_096, 2_904)]);
    assert_eq!(summary.initial_position, 3_000);
    assert_eq!(summary.bytes_transferred, 7_000);

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk.len(), 10_000);
    assert!(on_disk[..3_000].iter().all(|b| *b == 0xAA));
    assert_eq!(&on_disk[3_000..], &data[3_000..]);

    assert!(events
        .lock()
        .unwrap()
        .contains(&TransferEvent::Resuming {
            offset: 3_000,
            object_length: 10_000
        }));
}

#[tokio::test]
async fn fully_downloaded_file_is_done_without_reads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("done.bin");
    let data = pattern(5_000);
    std::fs::write(&path, &data).unwrap();
    let reader = ScriptedReader::new(data.clone());

    let (mut session, _events) = session(&reader, &path, options(1_000));
    let summary = session.run().await.unwrap();

    assert!(reader.reads().is_empty());
    assert_eq!(reader.length_requests(), 1);
    assert_eq!(summary.bytes_transferred, 0);
    assert_eq!(std::fs::read(&path).unwrap(), data);
}

#[tokio::test]
async fn chunk_sums_and_cursor_monotonicity_hold_for_many_shapes() {
    for len in [0usize, 1, 10, 999, 1_000, 1_001] {
        for chunk_size in [7u64, 64, 1_000, 5_000] {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("obj.bin");
            let data = pattern(len);
            let reader = ScriptedReader::new(data.clone());

            let (mut session, events) = session(&reader, &path, options(chunk_size));
            let summary = session.run().await.unwrap();

            let samples = progress(&events.lock().unwrap());
            let total: u64 = samples.iter().map(|(_, _, chunk)| chunk).sum();
            assert_eq!(total, len as u64, "len={len} chunk={chunk_size}");
            assert_eq!(summary.bytes_transferred, len as u64);

            let mut previous = 0;
            for (_, done, _) in &samples {
                assert!(*done > previous);
                assert!(*done <= len as u64);
                previous = *done;
            }

            for (i, (offset, length)) in reader.reads().into_iter().enumerate() {
                assert_eq!(offset, i as u64 * chunk_size);
                assert!(length <= chunk_size);
            }
            assert_eq!(std::fs::read(&path).unwrap(), data);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn timed_out_chunk_restarts_from_fresh_length_after_backoff() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("slow.bin");
    let data = pattern(3_000);
    let reader =
        ScriptedReader::with_script(data.clone(), vec![Behavior::Serve, Behavior::Hang]);

    let (mut session, events) = session(&reader, &path, options(1_000));
    let start = Instant::now();
    let summary = session.run().await.unwrap();

    // Watchdog (10s) plus backoff (10s).
    assert!(start.elapsed() >= Duration::from_secs(20));
    assert_eq!(reader.length_requests(), 2);
    assert_eq!(
        reader.reads(),
        vec![(0, 1_000), (1_000, 1_000), (1_000, 1_000), (2_000, 1_000)]
    );
    assert_eq!(summary.timeouts, 1);
    assert_eq!(summary.initial_position, 0);
    // Each byte written exactly once.
    assert_eq!(summary.bytes_transferred, 3_000);
    assert_eq!(std::fs::read(&path).unwrap(), data);

    let events = events.lock().unwrap();
    assert!(events.contains(&TransferEvent::TimedOut {
        attempt: 1,
        offset: 1_000,
        deadline_secs: 10
    }));
    assert!(events.contains(&TransferEvent::Resuming {
        offset: 1_000,
        object_length: 3_000
    }));
    assert!(events.contains(&TransferEvent::AttemptStarted { attempt: 2 }));
}

#[tokio::test(start_paused = true)]
async fn timeout_respects_max_attempts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stuck.bin");
    let reader = ScriptedReader::with_script(pattern(100), vec![Behavior::Hang]);

    let opts = TransferOptions {
        chunk_size: 10,
        max_attempts: Some(1),
        ..Default::default()
    };
    let (mut session, _events) = session(&reader, &path, opts);
    let err = session.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(reader.length_requests(), 1);
    assert!(!path.exists());
}

#[tokio::test]
async fn network_failure_without_retry_is_final() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fail.bin");
    let reader = ScriptedReader::with_script(pattern(2_000), vec![Behavior::FailNetwork]);

    let (mut session, events) = session(&reader, &path, options(1_000));
    let err = session.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(session.runs(), 1);
    assert_eq!(reader.length_requests(), 1);
    assert_eq!(reader.reads().len(), 1);
    assert!(!path.exists());
    assert_eq!(
        events.lock().unwrap().last(),
        Some(&TransferEvent::Failed {
            kind: ErrorKind::Network,
            cause: "connection reset".into()
        })
    );
}

#[tokio::test(start_paused = true)]
async fn retry_on_error_restarts_after_backoff() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("retry.bin");
    let data = pattern(2_000);
    let reader = ScriptedReader::with_script(
        data.clone(),
        vec![Behavior::Serve, Behavior::FailNetwork],
    );

    let opts = TransferOptions {
        chunk_size: 1_000,
        retry_on_error: true,
        ..Default::default()
    };
    let (mut session, events) = session(&reader, &path, opts);
    let start = Instant::now();
    session.run().await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(10));
    assert_eq!(session.runs(), 2);
    assert_eq!(reader.length_requests(), 2);
    assert_eq!(
        reader.reads(),
        vec![(0, 1_000), (1_000, 1_000), (1_000, 1_000)]
    );
    assert_eq!(std::fs::read(&path).unwrap(), data);
    assert!(events.lock().unwrap().iter().any(|event| matches!(
        event,
        TransferEvent::Retrying {
            backoff_secs: 10,
            ..
        }
    )));
}

#[tokio::test(start_paused = true)]
async fn retry_stops_at_max_attempts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flaky.bin");
    let reader = ScriptedReader::with_script(pattern(1_000), vec![Behavior::FailNetwork; 10]);

    let opts = TransferOptions {
        chunk_size: 100,
        retry_on_error: true,
        max_attempts: Some(3),
        ..Default::default()
    };
    let (mut session, _events) = session(&reader, &path, opts);
    let err = session.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(session.runs(), 3);
    assert_eq!(reader.length_requests(), 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_retry_backoff() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shutdown.bin");
    let reader = ScriptedReader::with_script(pattern(1_000), vec![Behavior::FailNetwork]);

    let shutdown = CancellationToken::new();
    let transfer = ResumableTransfer::new(
        Arc::clone(&reader),
        object(),
        LocalSink::new(&path),
        TransferOptions {
            chunk_size: 100,
            retry_on_error: true,
            ..Default::default()
        },
    )
    .with_shutdown(shutdown.clone());
    let mut session = TransferSession::new(transfer);

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let err = session.run().await.unwrap_err();

    assert!(matches!(err, TransferError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(reader.length_requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn inter_chunk_delay_applies_between_chunks_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("paced.bin");
    let reader = ScriptedReader::new(pattern(300));

    let opts = TransferOptions {
        chunk_size: 100,
        delay_between_chunks: Duration::from_secs(2),
        ..Default::default()
    };
    let (mut session, _events) = session(&reader, &path, opts);
    let start = Instant::now();
    session.run().await.unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(4));
    assert!(elapsed < Duration::from_secs(6));
}

#[tokio::test]
async fn missing_object_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.bin");
    let reader = ScriptedReader::missing();

    let (mut session, _events) = session(&reader, &path, options(1_000));
    let err = session.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(reader.reads().is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn local_file_longer_than_remote_is_not_retried() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("long.bin");
    std::fs::write(&path, vec![1u8; 500]).unwrap();
    let reader = ScriptedReader::new(pattern(100));

    let opts = TransferOptions {
        retry_on_error: true,
        ..Default::default()
    };
    let (mut session, _events) = session(&reader, &path, opts);
    let err = session.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(session.runs(), 1);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 500);
}

#[tokio::test]
async fn short_read_is_a_network_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.bin");
    let reader = ScriptedReader::with_script(pattern(1_000), vec![Behavior::Short]);

    let (mut session, _events) = session(&reader, &path, options(500));
    let err = session.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(!path.exists());
}

#[tokio::test]
async fn inspect_reports_resume_point_without_reading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inspect.bin");
    std::fs::write(&path, vec![0u8; 40]).unwrap();
    let reader = ScriptedReader::new(pattern(100));

    let transfer = ResumableTransfer::new(
        Arc::clone(&reader),
        object(),
        LocalSink::new(&path),
        options(10),
    );
    let point = transfer.inspect().await.unwrap();

    assert_eq!(point.object_length, 100);
    assert_eq!(point.start_position, 40);
    assert!(!point.is_complete());
    assert!(reader.reads().is_empty());
}

fn shutdown_session(
    reader: &Arc<ScriptedReader>,
    path: &Path,
    options: TransferOptions,
    cancel_after: Duration,
) -> TransferSession<Arc<ScriptedReader>> {
    let shutdown = CancellationToken::new();
    let transfer = ResumableTransfer::new(Arc::clone(reader), object(), LocalSink::new(path), options)
        .with_shutdown(shutdown.clone());

    tokio::spawn(async move {
        tokio::time::sleep(cancel_after).await;
        shutdown.cancel();
    });
    TransferSession::new(transfer)
}

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_hung_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hung.bin");
    let reader = ScriptedReader::with_script(pattern(1_000), vec![Behavior::Hang]);

    let mut session = shutdown_session(&reader, &path, options(100), Duration::from_secs(3));
    let start = Instant::now();
    let err = session.run().await.unwrap_err();

    assert!(matches!(err, TransferError::Cancelled));
    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(reader.reads(), vec![(0, 100)]);
    assert_eq!(reader.length_requests(), 1);
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_timeout_backoff() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backoff.bin");
    let reader = ScriptedReader::with_script(pattern(1_000), vec![Behavior::Hang]);

    // Watchdog fires at 10s, the backoff would end at 20s.
    let mut session = shutdown_session(&reader, &path, options(100), Duration::from_secs(13));
    let start = Instant::now();
    let err = session.run().await.unwrap_err();

    assert!(matches!(err, TransferError::Cancelled));
    assert!(start.elapsed() >= Duration::from_secs(13));
    assert!(start.elapsed() < Duration::from_secs(20));
    assert_eq!(reader.length_requests(), 1);
    assert_eq!(reader.reads().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_inter_chunk_delay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("delayed.bin");
    let reader = ScriptedReader::new(pattern(300));

    let opts = TransferOptions {
        chunk_size: 100,
        delay_between_chunks: Duration::from_secs(60),
        ..Default::default()
    };
    let mut session = shutdown_session(&reader, &path, opts, Duration::from_secs(5));
    let start = Instant::now();
    let err = session.run().await.unwrap_err();

    assert!(matches!(err, TransferError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(60));
    assert_eq!(reader.reads(), vec![(0, 100)]);
    // The written chunk stays as the resume point.
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 100);
}

#[tokio::test(start_paused = true)]
async fn reads_under_deadline_never_time_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("steady.bin");
    let data = pattern(300);
    let reader = ScriptedReader::with_script(data.clone(), vec![Behavior::Slow; 3]);

    let (mut session, events) = session(&reader, &path, options(100));
    let start = Instant::now();
    let summary = session.run().await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(27));
    assert_eq!(summary.timeouts, 0);
    assert_eq!(reader.length_requests(), 1);
    assert!(!events
        .lock()
        .unwrap()
        .iter()
        .any(|event| matches!(event, TransferEvent::TimedOut { .. })));
    assert_eq!(std::fs::read(&path).unwrap(), data);
}

#[tokio::test]
async fn write_failure_is_a_final_disk_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("nested");
    let path = blocker.join("blob.bin");
    let reader = ScriptedReader::blocking_dir(pattern(1_000), blocker);

    let (mut session, events) = session(&reader, &path, options(500));
    let err = session.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Disk);
    assert_eq!(session.runs(), 1);
    assert_eq!(reader.reads(), vec![(0, 500)]);
    assert!(matches!(
        events.lock().unwrap().last(),
        Some(TransferEvent::Failed {
            kind: ErrorKind::Disk,
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn disk_errors_are_retried_up_to_max_attempts() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("nested");
    let path = blocker.join("blob.bin");
    let reader = ScriptedReader::blocking_dir(pattern(1_000), blocker);

    let opts = TransferOptions {
        chunk_size: 500,
        retry_on_error: true,
        max_attempts: Some(3),
        ..Default::default()
    };
    let (mut session, events) = session(&reader, &path, opts);
    let start = Instant::now();
    let err = session.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Disk);
    assert_eq!(session.runs(), 3);
    assert_eq!(reader.length_requests(), 3);
    // Two backoffs between three runs.
    assert!(start.elapsed() >= Duration::from_secs(20));
    let retries = events
        .lock()
        .unwrap()
        .iter()
        .filter(|event| matches!(event, TransferEvent::Retrying { .. }))
        .count();
    assert_eq!(retries, 2);
}

#[tokio::test]
async fn complete_read_only_file_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("archived.bin");
    let data = pattern(2_000);
    std::fs::write(&path, &data).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_readonly(true);
    std::fs::set_permissions(&path, permissions).unwrap();

    let reader = ScriptedReader::new(data.clone());
    let (mut session, _events) = session(&reader, &path, options(1_000));
    let summary = session.run().await.unwrap();

    assert_eq!(summary.bytes_transferred, 0);
    assert!(reader.reads().is_empty());
    assert_eq!(std::fs::read(&path).unwrap(), data);
}
