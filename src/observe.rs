use std::sync::{Arc, Mutex, PoisonError};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Change listeners shared by a component and its clones.
#[derive(Clone, Default)]
pub struct Observers {
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl Observers {
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Call every listener. Listeners run outside the lock so they may read state freely.
    pub fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn every_subscriber_is_notified() {
        let observers = Observers::default();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let count = count.clone();
            observers.subscribe(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        observers.clone().notify();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
