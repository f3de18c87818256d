//! The state-vector protocol shared by the solver and the population
//! containers.
//!
//! Every simulatable component exposes its continuous state as a run of
//! `f64` slots in a flat vector. Composites (a patch, a collection of
//! patches, a metacommunity) concatenate their children's runs in a
//! fixed traversal order. Packing ([`OdeSystem::ode_values`]),
//! unpacking ([`OdeSystem::ode_values_set`]) and rate emission
//! ([`OdeSystem::ode_rates`]) must all walk children in that same
//! order, otherwise a state variable silently pairs with the wrong
//! derivative.
//!
//! Cursors are slices: each method consumes exactly `ode_size()` slots
//! from the front of the slice it is handed and returns the remainder.
//! Running off the end of a cursor is a programming defect and panics.

/// A component contributing continuous state to the ODE system.
pub trait OdeSystem {
    /// Number of continuous state variables contributed.
    fn ode_size(&self) -> usize;

    /// Consume `ode_size()` values from the front of `values`, writing
    /// them into this component's state. Returns the unconsumed tail.
    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64];

    /// Copy the current state into the front of `out`. Returns the
    /// unwritten tail.
    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64];

    /// Copy the current instantaneous rates of change into the front of
    /// `out`, in the same order as [`ode_values`](Self::ode_values).
    /// Returns the unwritten tail.
    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64];

    /// Pack the full state into a freshly allocated vector.
    fn ode_state(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.ode_size()];
        let rest = self.ode_values(&mut out);
        assert!(rest.is_empty(), "ode_values left {} slots unwritten", rest.len());
        out
    }

    /// Pack the current rates into a freshly allocated vector.
    fn ode_rates_vec(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.ode_size()];
        let rest = self.ode_rates(&mut out);
        assert!(rest.is_empty(), "ode_rates left {} slots unwritten", rest.len());
        out
    }
}

/// A right-hand-side provider for the ODE solver.
///
/// The default [`derivs`](OdeTarget::derivs) unpacks `state` into the
/// target and then emits its rates, which is correct for any
/// time-autonomous composite.
pub trait OdeTarget: OdeSystem {
    /// Evaluate `rates = f(time, state)`.
    ///
    /// `state` and `rates` both have length `ode_size()`; a mismatch is
    /// a programming defect and panics.
    fn derivs(&mut self, _time: f64, state: &[f64], rates: &mut [f64]) {
        let rest = self.ode_values_set(state);
        assert!(rest.is_empty(), "derivs: {} state values unconsumed", rest.len());
        let rest = self.ode_rates(rates);
        assert!(rest.is_empty(), "derivs: {} rate slots unwritten", rest.len());
    }
}

/// Split `n` values off the front of a read cursor.
///
/// # Panics
///
/// Panics if the cursor holds fewer than `n` values.
pub fn split_state(cursor: &[f64], n: usize) -> (&[f64], &[f64]) {
    assert!(
        cursor.len() >= n,
        "state cursor underrun: need {n} values, {} remain",
        cursor.len()
    );
    cursor.split_at(n)
}

/// Split `n` slots off the front of a write cursor.
///
/// # Panics
///
/// Panics if the cursor holds fewer than `n` slots.
pub fn split_state_mut(cursor: &mut [f64], n: usize) -> (&mut [f64], &mut [f64]) {
    assert!(
        cursor.len() >= n,
        "state cursor underrun: need {n} slots, {} remain",
        cursor.len()
    );
    cursor.split_at_mut(n)
}

impl<T: OdeSystem + ?Sized> OdeSystem for Box<T> {
    fn ode_size(&self) -> usize {
        (**self).ode_size()
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        (**self).ode_values_set(values)
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        (**self).ode_values(out)
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        (**self).ode_rates(out)
    }
}

impl<T: OdeSystem> OdeSystem for [T] {
    fn ode_size(&self) -> usize {
        self.iter().map(OdeSystem::ode_size).sum()
    }

    fn ode_values_set<'a>(&mut self, mut values: &'a [f64]) -> &'a [f64] {
        for child in self.iter_mut() {
            values = child.ode_values_set(values);
        }
        values
    }

    fn ode_values<'a>(&self, mut out: &'a mut [f64]) -> &'a mut [f64] {
        for child in self.iter() {
            out = child.ode_values(out);
        }
        out
    }

    fn ode_rates<'a>(&self, mut out: &'a mut [f64]) -> &'a mut [f64] {
        for child in self.iter() {
            out = child.ode_rates(out);
        }
        out
    }
}

impl<T: OdeSystem> OdeSystem for Vec<T> {
    fn ode_size(&self) -> usize {
        self.as_slice().ode_size()
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        self.as_mut_slice().ode_values_set(values)
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        self.as_slice().ode_values(out)
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        self.as_slice().ode_rates(out)
    }
}

impl<T: OdeSystem> OdeTarget for Vec<T> {}
