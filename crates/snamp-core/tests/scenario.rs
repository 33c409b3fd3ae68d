//! End-to-end scenarios across threads and executors.

use std::sync::mpsc;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use snamp_core::impls::{ThreadExecutor, TokioExecutor};
use snamp_core::{Listener, WeakListenerList};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResourceEvent {
    AttributeChanged(&'static str),
    Removed,
}

struct Recorder {
    name: &'static str,
    journal: Arc<Mutex<Vec<(&'static str, ResourceEvent)>>>,
}

impl PartialEq for Recorder {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Listener<ResourceEvent> for Recorder {
    fn on_event(&self, event: &ResourceEvent) {
        self.journal.lock().unwrap().push((self.name, event.clone()));
    }
}

#[test]
fn register_fire_remove_fire() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let make = |name| {
        Arc::new(Recorder {
            name,
            journal: Arc::clone(&journal),
        })
    };
    let (a, b, c) = (make("A"), make("B"), make("C"));
    let list: WeakListenerList<Recorder, ResourceEvent> = WeakListenerList::new();
    list.add(&a);
    list.add(&b);
    list.add(&c);

    let event1 = ResourceEvent::AttributeChanged("uptime");
    list.fire(&event1);
    assert_eq!(
        *journal.lock().unwrap(),
        vec![("A", event1.clone()), ("B", event1.clone()), ("C", event1.clone())]
    );

    journal.lock().unwrap().clear();
    assert!(list.remove(&b));
    list.fire(&ResourceEvent::Removed);
    assert_eq!(
        *journal.lock().unwrap(),
        vec![("A", ResourceEvent::Removed), ("C", ResourceEvent::Removed)]
    );
}

#[test]
fn dropped_listeners_are_sanitized() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let list: WeakListenerList<Recorder, ResourceEvent> = WeakListenerList::new();
    let mut owners: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|name| {
            Arc::new(Recorder {
                name,
                journal: Arc::clone(&journal),
            })
        })
        .collect();
    list.add_all(&owners);

    owners.truncate(1);

    assert_eq!(list.len(), 4);
    assert_eq!(list.sanitize(), 1);
    assert_eq!(list.len(), 1);
}

#[test]
fn concurrent_adds_are_all_kept() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let list: Arc<WeakListenerList<usize, ()>> = Arc::new(WeakListenerList::new());
    let barrier = Arc::new(Barrier::new(THREADS));
    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let list = Arc::clone(&list);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let owned: Vec<_> = (0..PER_THREAD)
                    .map(|i| Arc::new(t * PER_THREAD + i))
                    .collect();
                barrier.wait();
                for listener in &owned {
                    list.add_with(listener, |_, _| {});
                }
                owned
            })
        })
        .collect();

    let owned: Vec<_> = workers.into_iter().flat_map(|w| w.join().unwrap()).collect();

    assert_eq!(list.len(), THREADS * PER_THREAD);
    let mut ids: Vec<_> = list.iter().map(|l| *l).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..THREADS * PER_THREAD).collect::<Vec<_>>());
    drop(owned);
}

#[test]
fn snapshot_is_stable_while_writers_run() {
    let list: Arc<WeakListenerList<usize, ()>> = Arc::new(WeakListenerList::new());
    let initial: Vec<_> = (0..10).map(Arc::new).collect();
    for listener in &initial {
        list.add_with(listener, |_, _| {});
    }

    let iter = list.iter();
    let writer = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            let extra: Vec<_> = (100..200).map(Arc::new).collect();
            for listener in &extra {
                list.add_with(listener, |_, _| {});
            }
            for n in 0..5 {
                list.remove(&n);
            }
            extra
        })
    };

    let seen: Vec<_> = iter.map(|l| *l).collect();
    let extra = writer.join().unwrap();

    assert_eq!(seen, (0..10).collect::<Vec<_>>());
    assert_eq!(list.len(), 105);
    drop(extra);
}

#[test]
fn thread_executor_reaches_every_listener() {
    let list: WeakListenerList<usize, ()> = WeakListenerList::new();
    let owned: Vec<_> = (0..6).map(Arc::new).collect();
    for listener in &owned {
        list.add_with(listener, |_, _| {});
    }
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);

    let submitted = list
        .parallel_for_each(
            move |id| {
                tx.lock().unwrap().send(*id).unwrap();
            },
            &ThreadExecutor::new("scenario"),
        )
        .unwrap();

    let mut got: Vec<_> = (0..submitted)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();
    got.sort_unstable();
    assert_eq!(got, vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tokio_fire_async_delivers_to_all() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let list: WeakListenerList<usize, String> = WeakListenerList::new();
    let owned: Vec<_> = (0..20).map(Arc::new).collect();
    for listener in &owned {
        let tx = tx.clone();
        list.add_with(listener, move |id, event| {
            let _ = tx.send((*id, event.clone()));
        });
    }

    let executor = TokioExecutor::current().unwrap();
    list.fire_async("reconfigured".to_string(), &executor).unwrap();

    let mut got = Vec::new();
    for _ in 0..20 {
        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        got.push(msg);
    }
    got.sort();
    assert!(got.iter().all(|(_, e)| e == "reconfigured"));
    let ids: Vec<_> = got.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, (0..20).collect::<Vec<_>>());
}
