use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use sigbus_dictionary::{DictionaryBuilder, IngestOutcome, SignalDictionary};
use sigbus_signal::{Clock, ManualClock, Mode, PayloadKind, SignalDescriptor, SignalIdentity};

const CHANNELS: u8 = 8;
const UPDATES: u32 = 500;

fn identity(channel: u8) -> SignalIdentity {
    SignalIdentity::new(50, channel)
}

fn datagram(channel: u8, ts: u32, raw: u32) -> Vec<u8> {
    let id = identity(channel);
    let mut out = vec![1, 0x81, id.category, id.subcategory];
    out.extend_from_slice(&ts.to_be_bytes());
    out.extend_from_slice(&raw.to_be_bytes());
    out
}

fn dictionary() -> Arc<SignalDictionary<ManualClock>> {
    let mut builder = DictionaryBuilder::new();
    for channel in 0..CHANNELS {
        builder
            .register(
                SignalDescriptor::new(identity(channel), 60_000),
                PayloadKind::Integer,
                Mode::Receive,
            )
            .unwrap();
    }
    Arc::new(builder.build_with_clock(ManualClock::new(0)))
}

#[test]
fn dictionary_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SignalDictionary<ManualClock>>();
}

#[test]
fn parallel_ingest_on_distinct_signals() {
    let dict = dictionary();

    let writers: Vec<_> = (0..CHANNELS)
        .map(|channel| {
            let dict = Arc::clone(&dict);
            thread::spawn(move || {
                for ts in 1..=UPDATES {
                    let outcome = dict.ingest_slice(&datagram(channel, ts, ts)).unwrap();
                    assert_eq!(outcome, IngestOutcome::Accepted);
                }
            })
        })
        .collect();

    for handle in writers {
        handle.join().unwrap();
    }

    for channel in 0..CHANNELS {
        assert_eq!(dict.integer(identity(channel)).unwrap(), UPDATES);
    }
}

#[test]
fn readers_never_observe_torn_updates() {
    let dict = dictionary();
    let channel = 0;

    let writer = {
        let dict = Arc::clone(&dict);
        thread::spawn(move || {
            for ts in 1..=UPDATES {
                // Payload mirrors the header timestamp.
                dict.ingest_slice(&datagram(channel, ts, ts)).unwrap();
            }
        })
    };

    let reader = {
        let dict = Arc::clone(&dict);
        thread::spawn(move || {
            let mut last = 0;
            for _ in 0..UPDATES {
                let record = dict.read(identity(channel)).unwrap();
                let ts = record.header().timestamp;
                assert_eq!(record.integer(), Some(ts));
                assert!(ts >= last);
                last = ts;
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
}

type Hook = Box<dyn FnOnce() + Send>;

/// Manual clock that runs a one-shot hook right after its next reading.
#[derive(Default)]
struct HookClock {
    now: AtomicU32,
    hook: Mutex<Option<Hook>>,
}

impl HookClock {
    fn set(&self, now_ms: u32) {
        self.now.store(now_ms, Ordering::Release);
    }

    fn arm(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }
}

impl Clock for HookClock {
    fn now_millis(&self) -> u32 {
        let now = self.now.load(Ordering::Acquire);
        let hook = self.hook.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        now
    }
}

/// Reads validity while a fresher update from the same source races in
/// between the reader's clock sample and its record access.
fn validity_during_racing_ingest(
    check: impl Fn(&SignalDictionary<Arc<HookClock>>) -> bool,
) -> bool {
    let altitude = identity(0);
    let clock = Arc::new(HookClock::default());
    let mut builder = DictionaryBuilder::new();
    builder
        .register(
            SignalDescriptor::new(altitude, 1000),
            PayloadKind::Scaled { resolution: 0.01 },
            Mode::Receive,
        )
        .unwrap();
    let dict = Arc::new(builder.build_with_clock(Arc::clone(&clock)));

    clock.set(100);
    assert_eq!(
        dict.ingest_slice(&datagram(0, 100, 12_345)).unwrap(),
        IngestOutcome::Accepted
    );
    clock.set(150);

    let (done_tx, done_rx) = mpsc::channel();
    {
        let dict = Arc::clone(&dict);
        let ticking = Arc::clone(&clock);
        clock.arm(move || {
            ticking.set(151);
            thread::spawn(move || {
                let outcome = dict.ingest_slice(&datagram(0, 200, 20_000));
                done_tx.send(outcome).unwrap();
            });
            thread::sleep(Duration::from_millis(50));
        });
    }

    let valid = check(&dict);

    let outcome = done_rx.recv().unwrap().unwrap();
    assert_eq!(outcome, IngestOutcome::Accepted);
    let refreshed = dict.scaled_if_valid(altitude).unwrap().unwrap();
    assert!((refreshed - 200.0).abs() < 0.01);
    valid
}

#[test]
fn is_valid_holds_across_racing_refresh() {
    assert!(validity_during_racing_ingest(|dict| {
        dict.is_valid(identity(0)).unwrap()
    }));
}

#[test]
fn scaled_if_valid_holds_across_racing_refresh() {
    assert!(validity_during_racing_ingest(|dict| {
        dict.scaled_if_valid(identity(0)).unwrap().is_some()
    }));
}
