//! ListenerHandle - 弱参照のリスナーと呼び出し戦略の組
//!
//! # 設計
//! - リスナー本体は `Weak<L>` で保持し、リストが寿命を延ばすことはない
//! - 呼び出し戦略 `Invoker<L, E>` は `Arc<dyn Fn>` で共有（snapshot のコピーが安い）
//! - 等価性とハッシュは参照先のアドレスで決まる。アドレスは生成時に
//!   キャッシュするので、参照先が破棄された後も同じ値を返す

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use crate::domain::listener::Listener;

/// Invocation strategy: how a listener receives an event.
pub type Invoker<L, E> = Arc<dyn Fn(&L, &E) + Send + Sync>;

/// The two states a weakly-held referent can be observed in.
pub enum Referent<L: ?Sized> {
    Alive(Arc<L>),
    Dead,
}

impl<L: ?Sized> Referent<L> {
    pub fn is_alive(&self) -> bool {
        matches!(self, Referent::Alive(_))
    }

    pub fn into_option(self) -> Option<Arc<L>> {
        match self {
            Referent::Alive(listener) => Some(listener),
            Referent::Dead => None,
        }
    }
}

/// A weakly-held listener paired with its invocation strategy.
pub struct ListenerHandle<L: ?Sized, E: ?Sized> {
    target: Weak<L>,
    invoker: Invoker<L, E>,
    addr: usize,
}

impl<L: ?Sized, E: ?Sized> ListenerHandle<L, E> {
    pub fn new(listener: &Arc<L>, invoker: Invoker<L, E>) -> Self {
        Self {
            target: Arc::downgrade(listener),
            invoker,
            addr: Arc::as_ptr(listener).cast::<()>() as usize,
        }
    }

    /// Wrap a plain closure as the invocation strategy.
    pub fn with_fn<F>(listener: &Arc<L>, invoke: F) -> Self
    where
        F: Fn(&L, &E) + Send + Sync + 'static,
    {
        Self::new(listener, Arc::new(invoke))
    }

    pub fn get(&self) -> Referent<L> {
        match self.target.upgrade() {
            Some(listener) => Referent::Alive(listener),
            None => Referent::Dead,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Deliver `event` to the referent.
    ///
    /// Returns `false` (and does nothing) when the referent is gone.
    pub fn invoke(&self, event: &E) -> bool {
        match self.target.upgrade() {
            Some(listener) => {
                (self.invoker)(&*listener, event);
                true
            }
            None => false,
        }
    }

    /// Whether this handle refers to the same allocation as `listener`.
    pub fn refers_to(&self, listener: &Arc<L>) -> bool {
        self.addr == Arc::as_ptr(listener).cast::<()>() as usize
    }
}

impl<L, E> ListenerHandle<L, E>
where
    L: Listener<E> + ?Sized + 'static,
    E: ?Sized + 'static,
{
    /// Handle that calls [`Listener::on_event`].
    pub fn from_listener(listener: &Arc<L>) -> Self {
        Self::with_fn(listener, |l: &L, e: &E| l.on_event(e))
    }
}

impl<L: ?Sized, E: ?Sized> Clone for ListenerHandle<L, E> {
    fn clone(&self) -> Self {
        Self {
            target: Weak::clone(&self.target),
            invoker: Arc::clone(&self.invoker),
            addr: self.addr,
        }
    }
}

impl<L: ?Sized, E: ?Sized> PartialEq for ListenerHandle<L, E> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<L: ?Sized, E: ?Sized> Eq for ListenerHandle<L, E> {}

impl<L: ?Sized, E: ?Sized> Hash for ListenerHandle<L, E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.addr);
    }
}

impl<L: ?Sized, E: ?Sized> fmt::Debug for ListenerHandle<L, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("addr", &format_args!("{:#x}", self.addr))
            .field("alive", &self.is_alive())
            .finish()
    }
}
