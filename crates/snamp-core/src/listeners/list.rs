//! WeakListenerList - 弱参照リスナーの copy-on-write コレクション
//!
//! # 設計
//! - 現在の snapshot は `ArcSwap<Vec<ListenerHandle>>`。読み取りはロックなしで
//!   `Arc` を 1 つ取るだけ
//! - 変更（add / remove / sanitize / clear ...）は 1 本の `ReentrantMutex` で
//!   直列化し、新しい `Vec` を作って丸ごと差し替える
//! - 破棄済みのハンドルは次の変更操作でまとめて取り除く。読み取り・発火では
//!   読み飛ばすだけ
//!
//! # 使用例
//! ```ignore
//! let list: WeakListenerList<MyListener, MyEvent> = WeakListenerList::new();
//! let listener = Arc::new(MyListener::default());
//! list.add(&listener);
//! list.fire(&MyEvent::Changed);
//! ```
//!
//! # 注意
//! `remove_if` は最初に一致した 1 件だけを取り除きます（全件ではない）。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::ReentrantMutex;
use tracing::{debug, trace};

use crate::domain::config::ListenerListConfig;
use crate::domain::errors::ListenerError;
use crate::domain::listener::Listener;
use crate::listeners::handle::{Invoker, ListenerHandle, Referent};
use crate::listeners::snapshot::{Handles, Iter, Spliterator, dispatch_chunks};
use crate::observability::ListenerCounts;
use crate::ports::Executor;

/// Thread-safe, copy-on-write list of weakly referenced listeners.
///
/// `L` is the listener type (may be a trait object), `E` the event type.
pub struct WeakListenerList<L: ?Sized, E: ?Sized> {
    handles: ArcSwap<Vec<ListenerHandle<L, E>>>,
    write_lock: ReentrantMutex<()>,
    config: ListenerListConfig,
}

impl<L: ?Sized, E: ?Sized> WeakListenerList<L, E> {
    pub fn new() -> Self {
        Self::from_valid_config(ListenerListConfig::default())
    }

    pub fn with_config(config: ListenerListConfig) -> Result<Self, ListenerError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    pub(crate) fn from_valid_config(config: ListenerListConfig) -> Self {
        Self {
            handles: ArcSwap::from_pointee(Vec::new()),
            write_lock: ReentrantMutex::new(()),
            config,
        }
    }

    pub fn config(&self) -> &ListenerListConfig {
        &self.config
    }

    fn snapshot(&self) -> Handles<L, E> {
        self.handles.load_full()
    }

    /// Run one copy-on-write mutation under the write lock.
    ///
    /// `rebuild` receives the current snapshot and returns the next one. Any
    /// referent it upgrades goes into the second argument and is released
    /// only after the lock, so a listener's `Drop` may use this list.
    /// `rebuild` runs exactly once. If it re-enters and mutates the list, the
    /// handles that nested call appended are carried over into the result;
    /// anything else the nested call changed is superseded.
    fn mutate<R, F>(&self, rebuild: F) -> R
    where
        F: FnOnce(&[ListenerHandle<L, E>], &mut Vec<Arc<L>>) -> (Vec<ListenerHandle<L, E>>, R),
    {
        let mut released: Vec<Arc<L>> = Vec::new();
        let _guard = self.write_lock.lock();
        let current = self.snapshot();
        let (mut next, result) = rebuild(&current, &mut released);
        let latest = self.snapshot();
        if !Arc::ptr_eq(&current, &latest) {
            let appended = Self::appended_since(&current, &latest);
            trace!(
                appended = appended.len(),
                "listener list changed during rebuild, keeping nested additions"
            );
            next.extend(appended);
        }
        trace!(
            before = current.len(),
            after = next.len(),
            "publishing listener snapshot"
        );
        self.handles.store(Arc::new(next));
        result
    }

    /// Handles in `latest` that are not in `base`, counting duplicates.
    fn appended_since(
        base: &[ListenerHandle<L, E>],
        latest: &[ListenerHandle<L, E>],
    ) -> Vec<ListenerHandle<L, E>> {
        let mut seen: HashMap<&ListenerHandle<L, E>, usize> = HashMap::new();
        for handle in base {
            *seen.entry(handle).or_default() += 1;
        }
        latest
            .iter()
            .filter(|handle| match seen.get_mut(handle) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    false
                }
                _ => true,
            })
            .cloned()
            .collect()
    }

    fn live_handles(current: &[ListenerHandle<L, E>], extra: usize) -> Vec<ListenerHandle<L, E>> {
        let mut next = Vec::with_capacity(current.len() + extra);
        next.extend(current.iter().filter(|h| h.is_alive()).cloned());
        let dropped = current.len() - next.len();
        if dropped > 0 {
            debug!(dropped, survivors = next.len(), "compacted dead listener handles");
        }
        next
    }

    // ------------------------------------------------------------------
    // mutation
    // ------------------------------------------------------------------

    /// Register a prebuilt handle. Always returns `true`.
    pub fn add_handle(&self, handle: ListenerHandle<L, E>) -> bool {
        self.mutate(|current, _| {
            let mut next = Self::live_handles(current, 1);
            next.push(handle);
            (next, true)
        })
    }

    /// Register `listener` with a custom invocation strategy.
    pub fn add_with<F>(&self, listener: &Arc<L>, invoke: F) -> bool
    where
        F: Fn(&L, &E) + Send + Sync + 'static,
    {
        self.add_handle(ListenerHandle::with_fn(listener, invoke))
    }

    /// Register a batch, building each handle with `factory`.
    ///
    /// Returns `true` if at least one handle was appended.
    pub fn add_all_with<'a, I, F>(&self, listeners: I, mut factory: F) -> bool
    where
        L: 'a,
        I: IntoIterator<Item = &'a Arc<L>>,
        F: FnMut(&Arc<L>) -> ListenerHandle<L, E>,
    {
        let added: Vec<_> = listeners.into_iter().map(|l| factory(l)).collect();
        if added.is_empty() {
            return false;
        }
        self.mutate(|current, _| {
            let mut next = Self::live_handles(current, added.len());
            next.extend(added);
            (next, true)
        })
    }

    /// Remove the first listener equal to `listener`.
    ///
    /// Equality is `PartialEq`, not identity; see [`Self::remove_same`].
    pub fn remove(&self, listener: &L) -> bool
    where
        L: PartialEq,
    {
        self.remove_if(|l| l == listener)
    }

    /// Remove the first handle pointing at the same allocation as `listener`.
    ///
    /// Dead handles are dropped along the way, as in [`Self::remove_if`].
    pub fn remove_same(&self, listener: &Arc<L>) -> bool {
        self.mutate(|current, _| {
            let mut next = Vec::with_capacity(current.len());
            let mut removed = false;
            for handle in current.iter().filter(|h| h.is_alive()) {
                if !removed && handle.refers_to(listener) {
                    removed = true;
                } else {
                    next.push(handle.clone());
                }
            }
            (next, removed)
        })
    }

    /// Remove the FIRST live listener matching `predicate`, dropping every
    /// dead handle seen along the way.
    ///
    /// Only one listener is removed even when several match. Each listener
    /// of the snapshot is tested at most once, and listeners after the match
    /// are not tested. Returns whether a listener was removed.
    ///
    /// `predicate` may mutate this list. Listeners it adds are kept, while
    /// its other changes are replaced by this call's result.
    ///
    /// A panic in `predicate` propagates to the caller and leaves the list
    /// unchanged.
    pub fn remove_if<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&L) -> bool,
    {
        self.mutate(|current, released| {
            let mut next = Vec::with_capacity(current.len());
            let mut removed = false;
            for handle in current {
                let Referent::Alive(listener) = handle.get() else {
                    continue;
                };
                if !removed && predicate(&*listener) {
                    removed = true;
                } else {
                    next.push(handle.clone());
                }
                released.push(listener);
            }
            (next, removed)
        })
    }

    /// Keep only live listeners equal to one of `keep`.
    ///
    /// Returns whether any live listener was removed.
    pub fn retain_all(&self, keep: &[Arc<L>]) -> bool
    where
        L: PartialEq,
    {
        self.retain_live(|l| keep.iter().any(|k| **k == *l))
    }

    /// Remove every live listener equal to one of `items`.
    ///
    /// Returns whether any live listener was removed.
    pub fn remove_all(&self, items: &[Arc<L>]) -> bool
    where
        L: PartialEq,
    {
        self.retain_live(|l| !items.iter().any(|i| **i == *l))
    }

    fn retain_live(&self, mut keep: impl FnMut(&L) -> bool) -> bool {
        self.mutate(|current, released| {
            let mut next = Vec::with_capacity(current.len());
            let mut changed = false;
            for handle in current {
                let Referent::Alive(listener) = handle.get() else {
                    continue;
                };
                if keep(&*listener) {
                    next.push(handle.clone());
                } else {
                    changed = true;
                }
                released.push(listener);
            }
            (next, changed)
        })
    }

    /// Drop dead handles; returns the number of survivors.
    pub fn sanitize(&self) -> usize {
        self.mutate(|current, _| {
            let next = Self::live_handles(current, 0);
            let survivors = next.len();
            (next, survivors)
        })
    }

    /// Release every handle and publish an empty snapshot.
    pub fn clear(&self) {
        self.mutate(|_, _| (Vec::new(), ()));
    }

    // ------------------------------------------------------------------
    // queries (lock-free, one snapshot each)
    // ------------------------------------------------------------------

    /// Number of handles in the current snapshot, dead ones included until
    /// the next mutation compacts them.
    pub fn len(&self) -> usize {
        self.handles.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.load().is_empty()
    }

    pub fn counts(&self) -> ListenerCounts {
        let snapshot = self.snapshot();
        let live = snapshot.iter().filter(|h| h.is_alive()).count();
        ListenerCounts {
            total: snapshot.len(),
            live,
            dead: snapshot.len() - live,
        }
    }

    pub fn contains(&self, listener: &L) -> bool
    where
        L: PartialEq,
    {
        self.iter().any(|l| *l == *listener)
    }

    pub fn contains_all(&self, items: &[Arc<L>]) -> bool
    where
        L: PartialEq,
    {
        let live = self.to_vec();
        items.iter().all(|i| live.iter().any(|l| **l == **i))
    }

    /// Live listeners of the current snapshot, in order.
    pub fn to_vec(&self) -> Vec<Arc<L>> {
        self.iter().collect()
    }

    /// Append the live listeners to `out`; returns how many were appended.
    pub fn collect_into(&self, out: &mut Vec<Arc<L>>) -> usize {
        let before = out.len();
        out.extend(self.iter());
        out.len() - before
    }

    pub fn iter(&self) -> Iter<L, E> {
        Iter::new(self.snapshot())
    }

    /// One-shot async stream over the live listeners of the current snapshot.
    pub fn stream(&self) -> futures::stream::Iter<Iter<L, E>> {
        futures::stream::iter(self.iter())
    }

    /// Splittable view of the current snapshot for parallel traversal.
    pub fn parallel_stream(&self) -> Spliterator<L, E> {
        Spliterator::new(self.snapshot())
    }

    // ------------------------------------------------------------------
    // traversal and dispatch
    // ------------------------------------------------------------------

    /// Call `action` for every live listener in snapshot order.
    ///
    /// A panic in `action` aborts the traversal and reaches the caller.
    pub fn for_each(&self, mut action: impl FnMut(&Arc<L>)) {
        for listener in self.iter() {
            action(&listener);
        }
    }

    /// Like [`Self::for_each`], stopping at the first `Err`.
    pub fn try_for_each<X>(
        &self,
        mut action: impl FnMut(&Arc<L>) -> Result<(), X>,
    ) -> Result<(), X> {
        for listener in self.iter() {
            action(&listener)?;
        }
        Ok(())
    }

    /// Deliver `event` to every live listener in snapshot order.
    pub fn fire(&self, event: &E) {
        for handle in self.snapshot().iter() {
            handle.invoke(event);
        }
    }

    /// Build the event only when there is someone to deliver it to.
    pub fn fire_with<F>(&self, supplier: F)
    where
        E: Sized,
        F: FnOnce() -> E,
    {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return;
        }
        let event = supplier();
        for handle in snapshot.iter() {
            handle.invoke(&event);
        }
    }
}

impl<L, E> WeakListenerList<L, E>
where
    L: Listener<E> + ?Sized + 'static,
    E: ?Sized + 'static,
{
    /// Register `listener`, invoked through [`Listener::on_event`].
    /// Always returns `true`.
    pub fn add(&self, listener: &Arc<L>) -> bool {
        self.add_handle(ListenerHandle::from_listener(listener))
    }

    /// Register a batch of listeners; returns `true` if any was appended.
    pub fn add_all<'a, I>(&self, listeners: I) -> bool
    where
        I: IntoIterator<Item = &'a Arc<L>>,
    {
        let invoker: Invoker<L, E> = Arc::new(|l: &L, e: &E| l.on_event(e));
        self.add_all_with(listeners, |l| ListenerHandle::new(l, Arc::clone(&invoker)))
    }
}

impl<L, E> WeakListenerList<L, E>
where
    L: ?Sized + Send + Sync + 'static,
    E: ?Sized + 'static,
{
    /// Submit one executor job per live listener. No ordering or completion
    /// guarantee; panics stay inside the executor.
    ///
    /// Returns the number of submitted jobs. As with [`Self::fire_async`],
    /// a rejection stops submission without recalling accepted jobs.
    pub fn parallel_for_each<F>(
        &self,
        action: F,
        executor: &dyn Executor,
    ) -> Result<usize, ListenerError>
    where
        F: Fn(&L) + Send + Sync + 'static,
    {
        let action = Arc::new(action);
        let mut submitted = 0;
        for listener in self.iter() {
            let action = Arc::clone(&action);
            executor.execute(Box::new(move || action(&*listener)))?;
            submitted += 1;
        }
        Ok(submitted)
    }

    /// Deliver `event` through `executor`.
    ///
    /// Up to `inline_fanout_limit` handles get one job each; larger
    /// snapshots are split into chunks of at most `chunk_size` handles.
    /// Returns once every job is submitted.
    ///
    /// Submission stops at the first rejected job and its error is returned.
    /// Jobs accepted before the rejection are not recalled, so some
    /// listeners may still receive `event`.
    pub fn fire_async(&self, event: E, executor: &dyn Executor) -> Result<(), ListenerError>
    where
        E: Sized + Send + Sync,
    {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Ok(());
        }
        let event = Arc::new(event);
        if snapshot.len() <= self.config.inline_fanout_limit {
            for handle in snapshot.iter() {
                let handle = handle.clone();
                let event = Arc::clone(&event);
                executor.execute(Box::new(move || {
                    handle.invoke(&event);
                }))?;
            }
        } else {
            let jobs = dispatch_chunks(
                Spliterator::new(snapshot),
                executor,
                self.config.chunk_size,
                move |handle: &ListenerHandle<L, E>| {
                    handle.invoke(&event);
                },
            )?;
            trace!(jobs, "fired event in chunks");
        }
        Ok(())
    }
}

/// A list is itself a listener: `on_event` fires to every member.
impl<L, E> Listener<E> for WeakListenerList<L, E>
where
    L: ?Sized + Send + Sync,
    E: ?Sized,
{
    fn on_event(&self, event: &E) {
        self.fire(event);
    }
}

impl<L: ?Sized, E: ?Sized> Default for WeakListenerList<L, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized, E: ?Sized> fmt::Debug for WeakListenerList<L, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakListenerList")
            .field("counts", &self.counts())
            .field("config", &self.config)
            .finish()
    }
}
