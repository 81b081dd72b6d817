//! Dispatch payloads.

use crate::error::Result;
use crate::reducer::Reducer;
use strata_tree::Tree;

/// What a single `dispatch` call applies.
#[derive(Clone, Debug, Default)]
pub enum Dispatch {
    /// Nothing. Dispatching it returns immediately.
    #[default]
    Skip,
    /// One reducer.
    One(Reducer),
    /// A transaction. Steps fold over one snapshot; `None` steps are skipped.
    Batch(Vec<Option<Reducer>>),
}

impl Dispatch {
    pub fn is_skip(&self) -> bool {
        matches!(self, Dispatch::Skip)
    }

    /// Number of reducers that would run.
    pub fn step_count(&self) -> usize {
        match self {
            Dispatch::Skip => 0,
            Dispatch::One(_) => 1,
            Dispatch::Batch(steps) => steps.iter().flatten().count(),
        }
    }

    /// Fold every step over `state`. `on_step` sees each reducer before it
    /// runs, with its position in the batch.
    pub(crate) fn fold<F>(&self, state: Tree, mut on_step: F) -> Result<Tree>
    where
        F: FnMut(usize, &Reducer),
    {
        match self {
            Dispatch::Skip => Ok(state),
            Dispatch::One(reducer) => {
                on_step(0, reducer);
                reducer.reduce(&state)
            }
            Dispatch::Batch(steps) => {
                steps
                    .iter()
                    .enumerate()
                    .try_fold(state, |acc, (index, step)| match step {
                        Some(reducer) => {
                            on_step(index, reducer);
                            reducer.reduce(&acc)
                        }
                        None => Ok(acc),
                    })
            }
        }
    }
}

impl From<Reducer> for Dispatch {
    fn from(reducer: Reducer) -> Self {
        Dispatch::One(reducer)
    }
}

impl From<Option<Reducer>> for Dispatch {
    fn from(reducer: Option<Reducer>) -> Self {
        reducer.map_or(Dispatch::Skip, Dispatch::One)
    }
}

impl From<Vec<Reducer>> for Dispatch {
    fn from(reducers: Vec<Reducer>) -> Self {
        Dispatch::Batch(reducers.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<Reducer>>> for Dispatch {
    fn from(steps: Vec<Option<Reducer>>) -> Self {
        Dispatch::Batch(steps)
    }
}
