//! In-flight request counting behind a store's `loading` flag.

use tokio::sync::watch;

/// A view with a count of requests in flight.
pub(crate) trait InFlight {
    fn in_flight_mut(&mut self) -> &mut usize;
}

/// Holds the store busy until dropped.
///
/// Guards nest: the store stays loading until the last one goes away.
pub(crate) struct Busy<'a, V: InFlight> {
    state: &'a watch::Sender<V>,
}

impl<'a, V: InFlight> Busy<'a, V> {
    pub(crate) fn new(state: &'a watch::Sender<V>) -> Self {
        state.send_modify(|view| *view.in_flight_mut() += 1);
        Self { state }
    }
}

impl<V: InFlight> Drop for Busy<'_, V> {
    fn drop(&mut self) {
        self.state.send_modify(|view| {
            let count = view.in_flight_mut();
            *count = count.saturating_sub(1);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct View {
        in_flight: usize,
    }

    impl InFlight for View {
        fn in_flight_mut(&mut self) -> &mut usize {
            &mut self.in_flight
        }
    }

    #[test]
    fn test_nested_guards() {
        let (tx, rx) = watch::channel(View::default());
        {
            let _outer = Busy::new(&tx);
            {
                let _inner = Busy::new(&tx);
                assert_eq!(rx.borrow().in_flight, 2);
            }
            assert_eq!(rx.borrow().in_flight, 1);
        }
        assert_eq!(rx.borrow().in_flight, 0);
    }
}
