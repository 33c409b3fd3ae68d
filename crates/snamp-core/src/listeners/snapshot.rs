//! Snapshot - ある時点のハンドル列に対する読み取り専用ビュー
//!
//! どの型も `Arc<Vec<ListenerHandle>>` を 1 つ掴むだけなので、取得後に
//! リストが変更されても影響を受けません（copy-on-write）。
//!
//! # 含まれる型
//! - **Iter**: 生きているリスナーを順に返すイテレータ（`rewind()` で先頭へ戻せる）
//! - **Spliterator**: 半分ずつ分割できる区間。並列ディスパッチの単位になる

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::domain::errors::ListenerError;
use crate::listeners::handle::{ListenerHandle, Referent};
use crate::ports::Executor;

pub(crate) type Handles<L, E> = Arc<Vec<ListenerHandle<L, E>>>;

/// Iterator over the live listeners of one snapshot.
///
/// Dead handles are skipped, never compacted. There is no way to remove
/// through the iterator.
pub struct Iter<L: ?Sized, E: ?Sized> {
    handles: Handles<L, E>,
    pos: usize,
}

impl<L: ?Sized, E: ?Sized> Iter<L, E> {
    pub(crate) fn new(handles: Handles<L, E>) -> Self {
        Self { handles, pos: 0 }
    }

    /// Restart from the first handle of the same snapshot.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }
}

impl<L: ?Sized, E: ?Sized> Iterator for Iter<L, E> {
    type Item = Arc<L>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.handles.get(self.pos) {
            self.pos += 1;
            if let Referent::Alive(listener) = handle.get() {
                return Some(listener);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.handles.len().saturating_sub(self.pos)))
    }
}

impl<L: ?Sized, E: ?Sized> FusedIterator for Iter<L, E> {}

impl<L: ?Sized, E: ?Sized> Clone for Iter<L, E> {
    fn clone(&self) -> Self {
        Self {
            handles: Arc::clone(&self.handles),
            pos: self.pos,
        }
    }
}

/// A splittable range over one snapshot.
///
/// `try_split` hands off the first half and keeps the second, so visiting
/// the produced pieces in order preserves snapshot order.
pub struct Spliterator<L: ?Sized, E: ?Sized> {
    handles: Handles<L, E>,
    start: usize,
    end: usize,
}

impl<L: ?Sized, E: ?Sized> Spliterator<L, E> {
    pub(crate) fn new(handles: Handles<L, E>) -> Self {
        let end = handles.len();
        Self {
            handles,
            start: 0,
            end,
        }
    }

    /// Handles remaining in this range, dead ones included.
    pub fn estimate_size(&self) -> usize {
        self.end - self.start
    }

    pub fn try_split(&mut self) -> Option<Self> {
        let len = self.estimate_size();
        if len < 2 {
            return None;
        }
        let mid = self.start + len / 2;
        let prefix = Self {
            handles: Arc::clone(&self.handles),
            start: self.start,
            end: mid,
        };
        self.start = mid;
        Some(prefix)
    }

    /// Split until every piece holds at most `chunk_size` handles.
    pub fn into_chunks(self, chunk_size: usize) -> Vec<Self> {
        let mut out = Vec::new();
        self.split_into(chunk_size, &mut out);
        out
    }

    fn split_into(mut self, chunk_size: usize, out: &mut Vec<Self>) {
        if self.estimate_size() <= chunk_size {
            out.push(self);
            return;
        }
        match self.try_split() {
            Some(prefix) => {
                prefix.split_into(chunk_size, out);
                self.split_into(chunk_size, out);
            }
            None => out.push(self),
        }
    }

    pub fn for_each_handle(self, mut visit: impl FnMut(&ListenerHandle<L, E>)) {
        for handle in &self.handles[self.start..self.end] {
            visit(handle);
        }
    }

    /// Live listeners in this range, in order.
    pub fn listeners(self) -> impl Iterator<Item = Arc<L>> {
        let Self {
            handles,
            start,
            end,
        } = self;
        (start..end).filter_map(move |i| handles[i].get().into_option())
    }
}

impl<L, E> Spliterator<L, E>
where
    L: ?Sized + Send + Sync + 'static,
    E: ?Sized + 'static,
{
    /// Run `action` for every live listener in this range, one executor job
    /// per chunk of at most `chunk_size` handles.
    ///
    /// Returns the number of submitted jobs.
    pub fn for_each_on<F>(
        self,
        executor: &dyn Executor,
        chunk_size: usize,
        action: F,
    ) -> Result<usize, ListenerError>
    where
        F: Fn(&L) + Send + Sync + 'static,
    {
        let action = Arc::new(action);
        dispatch_chunks(self, executor, chunk_size, move |handle| {
            if let Referent::Alive(listener) = handle.get() {
                action(&*listener);
            }
        })
    }
}

/// Submit one job per chunk; each job visits its handles in order.
pub(crate) fn dispatch_chunks<L, E, V>(
    split: Spliterator<L, E>,
    executor: &dyn Executor,
    chunk_size: usize,
    visit: V,
) -> Result<usize, ListenerError>
where
    L: ?Sized + Send + Sync + 'static,
    E: ?Sized + 'static,
    V: Fn(&ListenerHandle<L, E>) + Send + Sync + 'static,
{
    let visit = Arc::new(visit);
    let mut submitted = 0;
    for chunk in split.into_chunks(chunk_size) {
        if chunk.estimate_size() == 0 {
            continue;
        }
        let visit = Arc::clone(&visit);
        executor.execute(Box::new(move || chunk.for_each_handle(|h| visit(h))))?;
        submitted += 1;
    }
    Ok(submitted)
}
