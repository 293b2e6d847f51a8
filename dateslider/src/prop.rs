//! Outbound hooks from the engine to its host.
//!
//! ## Usage
//!
//! Register a [`CallbackWith`] to hear about time changes and a
//! [`RenderSlotWith`] to repaint cells whose slot changed. Both are cheap to
//! clone and compare by identity, so a chain can tell whether the host
//! re-registered the same closure.

use std::{fmt, sync::Arc};

type Handler<T, R> = Arc<dyn Fn(T) -> R + Send + Sync>;

macro_rules! shared_hook {
    ($(#[$meta:meta])* $name:ident, $invoke:ident) => {
        $(#[$meta])*
        pub struct $name<T, R = ()> {
            handler: Handler<T, R>,
        }

        impl<T, R> $name<T, R> {
            /// Wraps `handler` in a shareable handle.
            pub fn new<F>(handler: F) -> Self
            where
                F: Fn(T) -> R + Send + Sync + 'static,
            {
                Self {
                    handler: Arc::new(handler),
                }
            }

            /// Runs the wrapped closure.
            pub fn $invoke(&self, value: T) -> R {
                (self.handler)(value)
            }
        }

        impl<T, R> Clone for $name<T, R> {
            fn clone(&self) -> Self {
                Self {
                    handler: Arc::clone(&self.handler),
                }
            }
        }

        impl<T, R> PartialEq for $name<T, R> {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.handler, &other.handler)
            }
        }

        impl<T, R> Eq for $name<T, R> {}

        impl<T, R> fmt::Debug for $name<T, R> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:p})"), Arc::as_ptr(&self.handler))
            }
        }
    };
}

shared_hook!(
    /// Listener for `Fn(T) -> R`. The chain keeps one for time changes.
    CallbackWith,
    call
);

shared_hook!(
    /// Per-cell render hook, invoked whenever the slot bound to a cell
    /// changes.
    RenderSlotWith,
    render
);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;

    #[test]
    fn callbacks_compare_by_identity() {
        let a: CallbackWith<i64> = CallbackWith::new(|_| {});
        let b: CallbackWith<i64> = CallbackWith::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn clones_run_the_same_closure() {
        let seen = Arc::new(AtomicI64::new(0));
        let sink = Arc::clone(&seen);
        let render: RenderSlotWith<i64> = RenderSlotWith::new(move |v| {
            sink.fetch_add(v, Ordering::SeqCst);
        });
        let copy = render.clone();
        assert_eq!(render, copy);
        render.render(40);
        copy.render(2);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }
}
