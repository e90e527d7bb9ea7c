use super::PostPropagationContext;
use super::PostPropagator;
use super::PRIORITY_CLASS_GENERAL;
use crate::basic_types::PropagationStatus;
use crate::engine::Assignments;
use crate::engine::Solver;

/// The post-propagators of a solver: the simple ones by ascending priority followed by the
/// general ones in insertion order.
#[derive(Debug, Default)]
pub struct PropagatorList {
    propagators: Vec<Box<dyn PostPropagator>>,
}

impl PropagatorList {
    pub fn add(&mut self, propagator: Box<dyn PostPropagator>) {
        let priority = propagator.priority();
        if priority >= PRIORITY_CLASS_GENERAL {
            self.propagators.push(propagator);
            return;
        }
        let position = self
            .propagators
            .iter()
            .position(|other| other.priority() > priority)
            .unwrap_or(self.propagators.len());
        self.propagators.insert(position, propagator);
    }

    /// Removes the first propagator of type `T`.
    pub fn remove<T: PostPropagator>(&mut self) -> Option<Box<T>> {
        let position = self
            .propagators
            .iter()
            .position(|propagator| propagator.is::<T>())?;
        self.propagators.remove(position).downcast::<T>().ok()
    }

    pub fn find<T: PostPropagator>(&self) -> Option<&T> {
        self.propagators
            .iter()
            .find_map(|propagator| propagator.downcast_ref::<T>())
    }

    pub fn find_mut<T: PostPropagator>(&mut self) -> Option<&mut T> {
        self.propagators
            .iter_mut()
            .find_map(|propagator| propagator.downcast_mut::<T>())
    }

    pub fn len(&self) -> usize {
        self.propagators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.propagators.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.propagators.iter().map(|propagator| propagator.name())
    }

    /// Moves every propagator of `other` into this list.
    pub(crate) fn append(&mut self, other: PropagatorList) {
        for propagator in other.propagators {
            self.add(propagator);
        }
    }

    /// Runs unit propagation and every propagator to a joint fixpoint.
    pub(crate) fn propagate(&mut self, solver: &mut Solver) -> PropagationStatus {
        propagate_all(solver, &mut self.propagators)
    }

    /// Asks every propagator, in order, whether the total assignment is a model.
    pub(crate) fn is_model(&mut self, solver: &mut Solver) -> bool {
        for index in 0..self.propagators.len() {
            let (preceding, rest) = self.propagators.split_at_mut(index);
            let mut context = PostPropagationContext { solver, preceding };
            if !rest[0].is_model(&mut context) {
                return false;
            }
        }
        true
    }

    /// Resets every propagator from position `index` onwards.
    pub fn reset_from(&mut self, index: usize) {
        let len = self.propagators.len();
        reset_all(&mut self.propagators[index.min(len)..]);
    }

    pub(crate) fn undo_level(&mut self, assignments: &Assignments) {
        for propagator in self.propagators.iter_mut() {
            propagator.undo_level(assignments);
        }
    }

    /// Copies of the propagators which can be copied.
    pub(crate) fn clone_for(&self) -> PropagatorList {
        PropagatorList {
            propagators: self
                .propagators
                .iter()
                .filter_map(|propagator| propagator.clone_for())
                .collect(),
        }
    }
}

fn reset_all(propagators: &mut [Box<dyn PostPropagator>]) {
    for propagator in propagators {
        propagator.reset();
    }
}

/// Unit propagation followed by the fixpoint of each propagator in turn. A propagator which
/// fails resets every propagator behind it; a failure of unit propagation resets all of them.
pub(crate) fn propagate_all(
    solver: &mut Solver,
    propagators: &mut [Box<dyn PostPropagator>],
) -> PropagationStatus {
    if let Err(conflict) = solver.propagate_units() {
        reset_all(propagators);
        return Err(conflict);
    }

    for index in 0..propagators.len() {
        let (preceding, rest) = propagators.split_at_mut(index);
        let (current, following) = rest.split_at_mut(1);
        let mut context = PostPropagationContext {
            solver: &mut *solver,
            preceding,
        };
        if let Err(conflict) = current[0].propagate_fixpoint(&mut context) {
            reset_all(following);
            return Err(conflict);
        }
    }
    Ok(())
}
