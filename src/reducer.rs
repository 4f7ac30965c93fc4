/// Computes the next state from the previous state and an action.
///
/// A reducer must not mutate the previous state,
/// and must return a state equal to the previous state for actions it does not recognize.
pub trait Reducer<S, A>: 'static {
    fn reduce(&self, state: &S, action: &A) -> S;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&S, &A) -> S + 'static,
{
    fn reduce(&self, state: &S, action: &A) -> S {
        self(state, action)
    }
}
