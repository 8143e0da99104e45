//! Second-order initial value problems
//!
//! A problem has the form y'' = f(y, y', t). Its state vector is
//! `[y, y']` (so its order is 2) and it is advanced by increments produced
//! by an [`IvpSolver`]. After every committed step the problem's observers
//! run synchronously, in registration order.
//!
//! State slots are read with [`state_slot`], which turns an out-of-range
//! index into [`IvpError::OutOfRange`] instead of panicking. The pre-solve
//! consistency check relies on this to catch implementations whose `f` or
//! `increment` read past the state vector they expose.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use thiserror::Error;

use crate::simulation::integrator::IvpSolver;
use crate::simulation::vector::Vector3;

#[derive(Debug, Error)]
pub enum IvpError {
    #[error("inconsistent implementation: declared order {declared}, state vector has {implemented} components")]
    InconsistentImplementation { declared: usize, implemented: usize },

    #[error("state slot {index} out of range for a state vector of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("step size must be positive and finite, got {0}")]
    InvalidStepSize(f64),

    #[error("observer aborted the run")]
    Observer(#[source] anyhow::Error),
}

/// Read slot `index` of a state (or increment) vector
pub fn state_slot(y: &[Vector3], index: usize) -> Result<Vector3, IvpError> {
    y.get(index).copied().ok_or(IvpError::OutOfRange { index, len: y.len() })
}

/// Callback run after each committed step
pub type Observer<P> = Box<dyn FnMut(&P) -> anyhow::Result<()>>;

/// Ordered list of step observers owned by a problem
///
/// Observers registered through a [`Subscriber`] wait in a queue and join
/// the list at the next notification, so they can be added from inside a
/// running observer. Ones queued during step n run from step n + 1.
pub struct Observers<P: ?Sized> {
    list: Vec<Observer<P>>,
    pending: Rc<RefCell<Vec<Observer<P>>>>,
}

impl<P: ?Sized> Observers<P> {
    pub fn new() -> Self {
        Self {
            list: Vec::new(),
            pending: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn push(&mut self, observer: Observer<P>) {
        self.adopt_pending();
        self.list.push(observer);
    }

    /// Handle that can register observers while a run is in progress
    pub fn subscriber(&self) -> Subscriber<P> {
        Subscriber {
            pending: self.pending.clone(),
        }
    }

    /// Registered observers, including queued ones
    pub fn len(&self) -> usize {
        self.list.len() + self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every observer in order; the first failure stops the rest
    pub fn notify(&mut self, subject: &P) -> Result<(), IvpError> {
        self.adopt_pending();
        let notified = self
            .list
            .iter_mut()
            .try_for_each(|observer| observer(subject).map_err(IvpError::Observer));
        self.adopt_pending();
        notified
    }

    fn adopt_pending(&mut self) {
        let queued = std::mem::take(&mut *self.pending.borrow_mut());
        self.list.extend(queued);
    }
}

impl<P: ?Sized> Default for Observers<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared registration handle onto an [`Observers`] list
pub struct Subscriber<P: ?Sized> {
    pending: Rc<RefCell<Vec<Observer<P>>>>,
}

impl<P: ?Sized> Subscriber<P> {
    pub fn subscribe<F>(&self, observer: F)
    where
        F: FnMut(&P) -> anyhow::Result<()> + 'static,
    {
        self.pending.borrow_mut().push(Box::new(observer));
    }
}

impl<P: ?Sized> Clone for Subscriber<P> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
        }
    }
}

/// Second-order initial value problem
pub trait Ivp {
    /// Declared order (length of the state vector)
    fn order(&self) -> usize;

    /// y'' = f(y, y', t), with `y[0] = y` and `y[1] = y'`
    fn f(&self, y: &[Vector3], t: f64) -> Result<Vector3, IvpError>;

    /// State at the current mesh point
    fn y(&self) -> Vec<Vector3>;

    /// Time at the current mesh point
    fn t(&self) -> f64;

    /// Move to the next mesh point
    ///
    /// If `y()` returns y_i and `t()` returns t_i before the call, they
    /// must return y_i + dy and t_i + h afterwards.
    fn increment(&mut self, dy: &[Vector3], h: f64) -> Result<(), IvpError>;

    fn observers(&mut self) -> &mut Observers<Self>
    where
        Self: Sized;

    /// Current mesh point plus `h`
    fn t_after(&self, h: f64) -> f64 {
        self.t() + h
    }

    /// y'' at the current mesh point
    fn f_now(&self) -> Result<Vector3, IvpError> {
        self.f(&self.y(), self.t())
    }

    /// Register a step observer
    fn subscribe<F>(&mut self, observer: F)
    where
        Self: Sized + 'static,
        F: FnMut(&Self) -> anyhow::Result<()> + 'static,
    {
        self.observers().push(Box::new(observer));
    }

    /// Handle for registering observers from inside a running observer
    fn subscriber(&mut self) -> Subscriber<Self>
    where
        Self: Sized,
    {
        self.observers().subscriber()
    }

    /// Best-effort check that the declared order matches the implementation
    ///
    /// Evaluates `f` on a zero state and applies a zero increment with h = 0,
    /// then compares the state length with `order()`. Only out-of-range slot
    /// access and a length mismatch are detected; wrong arithmetic is not.
    fn check_consistency(&mut self) -> Result<(), IvpError> {
        let declared = self.order();
        let implemented = self.y().len();
        let zeros = vec![Vector3::ZERO; implemented];

        let checked = self
            .f(&zeros, self.t())
            .and_then(|_| self.increment(&zeros, 0.0));
        match checked {
            Err(IvpError::OutOfRange { .. }) => {
                return Err(IvpError::InconsistentImplementation { declared, implemented })
            }
            Err(e) => return Err(e),
            Ok(()) => {}
        }

        if declared != implemented {
            return Err(IvpError::InconsistentImplementation { declared, implemented });
        }
        Ok(())
    }

    /// One step: ask the solver for increments, apply them, notify observers
    fn step(&mut self, solver: &IvpSolver) -> Result<(), IvpError>
    where
        Self: Sized,
    {
        let dy = solver.dy(&*self)?;
        self.increment(&dy, solver.step_size())?;

        let mut observers = std::mem::take(self.observers());
        let notified = observers.notify(&*self);
        *self.observers() = observers;
        notified
    }

    /// Advance for `duration` with a fixed-step solver
    ///
    /// Runs until the elapsed time is no longer below `duration`, so the
    /// last step may overshoot. Returns the number of steps taken.
    fn solve(&mut self, solver: &IvpSolver, duration: f64) -> Result<usize, IvpError>
    where
        Self: Sized,
    {
        let h = solver.step_size();
        if !(h > 0.0 && h.is_finite()) {
            return Err(IvpError::InvalidStepSize(h));
        }
        self.check_consistency()?;

        debug!("solving with {} (h = {h}) for {duration}", solver.name());
        let t0 = self.t();
        let mut steps = 0;
        while self.t() - t0 < duration {
            self.step(solver)?;
            steps += 1;
        }
        trace!("{} steps, t = {}", steps, self.t());
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// y'' = y' + y with explicit state
    struct Stub {
        order: usize,
        y: Vec<Vector3>,
        t: f64,
        observers: Observers<Self>,
    }

    impl Stub {
        fn new() -> Self {
            Self {
                order: 2,
                y: vec![Vector3::ONES, Vector3::ONES],
                t: 0.0,
                observers: Observers::new(),
            }
        }
    }

    impl Ivp for Stub {
        fn order(&self) -> usize {
            self.order
        }

        fn f(&self, y: &[Vector3], _t: f64) -> Result<Vector3, IvpError> {
            Ok(state_slot(y, 0)? + state_slot(y, 1)?)
        }

        fn y(&self) -> Vec<Vector3> {
            self.y.clone()
        }

        fn t(&self) -> f64 {
            self.t
        }

        fn increment(&mut self, dy: &[Vector3], h: f64) -> Result<(), IvpError> {
            self.y[0] = self.y[0] + state_slot(dy, 0)?;
            self.y[1] = self.y[1] + state_slot(dy, 1)?;
            self.t += h;
            Ok(())
        }

        fn observers(&mut self) -> &mut Observers<Self> {
            &mut self.observers
        }
    }

    #[test]
    fn f_at_initial_state() {
        let ivp = Stub::new();
        assert_eq!(ivp.f_now().unwrap(), Vector3::ONES * 2.0);
        assert_eq!(ivp.order(), 2);
    }

    #[test]
    fn increment_moves_state_and_clock() {
        let mut ivp = Stub::new();
        ivp.increment(&[Vector3::I, Vector3::J], 0.5).unwrap();
        assert_eq!(ivp.y(), vec![Vector3::ONES + Vector3::I, Vector3::ONES + Vector3::J]);
        assert_eq!(ivp.t(), 0.5);
        assert_eq!(ivp.t_after(0.25), 0.75);
    }

    #[test]
    fn solve_takes_duration_over_h_steps() {
        let mut ivp = Stub::new();
        let solver = IvpSolver::euler(1.0);
        let calls = Rc::new(RefCell::new(0));
        let seen = calls.clone();
        ivp.subscribe(move |_: &Stub| {
            *seen.borrow_mut() += 1;
            Ok(())
        });

        let steps = ivp.solve(&solver, 10.0).unwrap();
        assert_eq!(steps, 10);
        assert_eq!(*calls.borrow(), 10);
        assert_abs_diff_eq!(ivp.t(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn last_step_may_overshoot() {
        let mut ivp = Stub::new();
        let steps = ivp.solve(&IvpSolver::euler(0.3), 1.0).unwrap();
        assert_eq!(steps, 4);
        assert_abs_diff_eq!(ivp.t(), 1.2, epsilon = 1e-12);
    }

    #[test]
    fn observers_run_in_registration_order_and_see_committed_state() {
        let mut ivp = Stub::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let log = log.clone();
            ivp.subscribe(move |p: &Stub| {
                log.borrow_mut().push((id, p.t()));
                Ok(())
            });
        }

        ivp.solve(&IvpSolver::euler(1.0), 2.0).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![(0, 1.0), (1, 1.0), (2, 1.0), (0, 2.0), (1, 2.0), (2, 2.0)]
        );
        assert_eq!(ivp.observers().len(), 3);
    }

    #[test]
    fn observer_added_mid_run_fires_from_the_next_step() {
        let mut ivp = Stub::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = ivp.subscriber();

        let first = log.clone();
        ivp.subscribe(move |p: &Stub| {
            first.borrow_mut().push(("first", p.t()));
            if p.t() == 1.0 {
                let second = first.clone();
                handle.subscribe(move |p: &Stub| {
                    second.borrow_mut().push(("second", p.t()));
                    Ok(())
                });
            }
            Ok(())
        });

        ivp.solve(&IvpSolver::euler(1.0), 3.0).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                ("first", 1.0),
                ("first", 2.0),
                ("second", 2.0),
                ("first", 3.0),
                ("second", 3.0),
            ]
        );
        assert_eq!(ivp.observers().len(), 2);
    }

    #[test]
    fn observer_queued_before_a_run_sees_the_first_step() {
        let mut ivp = Stub::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        ivp.subscriber().subscribe(move |p: &Stub| {
            log.borrow_mut().push(p.t());
            Ok(())
        });

        ivp.solve(&IvpSolver::euler(1.0), 2.0).unwrap();
        assert_eq!(*seen.borrow(), vec![1.0, 2.0]);
    }

    #[test]
    fn failing_observer_aborts_remaining_steps() {
        let mut ivp = Stub::new();
        ivp.subscribe(|p: &Stub| {
            if p.t() >= 3.0 {
                anyhow::bail!("stop at t = {}", p.t());
            }
            Ok(())
        });

        let err = ivp.solve(&IvpSolver::euler(1.0), 10.0).unwrap_err();
        assert!(matches!(err, IvpError::Observer(_)));
        // the third increment was committed before the observer failed
        assert_eq!(ivp.t(), 3.0);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let mut ivp = Stub::new();
        assert!(matches!(
            ivp.solve(&IvpSolver::euler(0.0), 1.0),
            Err(IvpError::InvalidStepSize(_))
        ));
        assert_eq!(ivp.t(), 0.0);
    }

    #[test]
    fn declared_order_larger_than_state_is_inconsistent() {
        let mut ivp = Stub::new();
        ivp.order = 3;
        let err = ivp.solve(&IvpSolver::euler(1.0), 10.0).unwrap_err();
        assert!(matches!(
            err,
            IvpError::InconsistentImplementation { declared: 3, implemented: 2 }
        ));
        assert_eq!(ivp.t(), 0.0);
    }

    #[test]
    fn state_longer_than_declared_order_is_inconsistent() {
        let mut ivp = Stub::new();
        ivp.y.push(Vector3::ZERO);
        let err = ivp.solve(&IvpSolver::rk4(1.0), 10.0).unwrap_err();
        assert!(matches!(
            err,
            IvpError::InconsistentImplementation { declared: 2, implemented: 3 }
        ));
        assert_eq!(ivp.t(), 0.0);
    }

    #[test]
    fn wrong_arithmetic_is_not_detected() {
        // the check only sees slot access and lengths; a sign error in f passes
        struct WrongSign(Stub);
        impl Ivp for WrongSign {
            fn order(&self) -> usize {
                self.0.order()
            }
            fn f(&self, y: &[Vector3], t: f64) -> Result<Vector3, IvpError> {
                Ok(-self.0.f(y, t)?)
            }
            fn y(&self) -> Vec<Vector3> {
                self.0.y()
            }
            fn t(&self) -> f64 {
                self.0.t()
            }
            fn increment(&mut self, dy: &[Vector3], h: f64) -> Result<(), IvpError> {
                self.0.increment(dy, h)
            }
            fn observers(&mut self) -> &mut Observers<Self> {
                unreachable!("no observers in this test")
            }
        }

        let mut ivp = WrongSign(Stub::new());
        assert!(ivp.check_consistency().is_ok());
    }

    /// f reads y[3] although the state only has two slots
    struct ReadsPastState {
        observers: Observers<Self>,
    }

    impl Ivp for ReadsPastState {
        fn order(&self) -> usize {
            2
        }

        fn f(&self, y: &[Vector3], _t: f64) -> Result<Vector3, IvpError> {
            state_slot(y, 3)
        }

        fn y(&self) -> Vec<Vector3> {
            vec![Vector3::ZERO; 2]
        }

        fn t(&self) -> f64 {
            0.0
        }

        fn increment(&mut self, _dy: &[Vector3], _h: f64) -> Result<(), IvpError> {
            Ok(())
        }

        fn observers(&mut self) -> &mut Observers<Self> {
            &mut self.observers
        }
    }

    #[test]
    fn out_of_range_access_is_inconsistent() {
        let mut ivp = ReadsPastState { observers: Observers::new() };
        let err = ivp.solve(&IvpSolver::euler(1.0), 10.0).unwrap_err();
        assert!(matches!(
            err,
            IvpError::InconsistentImplementation { declared: 2, implemented: 2 }
        ));
    }
}
