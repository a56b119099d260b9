//! Small generic iteration helpers
//!
//! Stateless; the only side effects are those of the closures passed in.

/// Left-to-right reduction
pub fn fold<T, A, F>(seq: &[T], initial: A, mut step: F) -> A
where
    F: FnMut(A, &T) -> A,
{
    let mut acc = initial;
    for item in seq {
        acc = step(acc, item);
    }
    acc
}

/// Left-to-right traversal with a mutable accumulator
///
/// Returns `initial` itself; whatever changed inside it was done by `step`.
pub fn fold_in_place<T, A, F>(seq: &[T], mut initial: A, mut step: F) -> A
where
    F: FnMut(&mut A, &T),
{
    for item in seq {
        step(&mut initial, item);
    }
    initial
}

pub fn map<T, U, F>(seq: &[T], mut transform: F) -> Vec<U>
where
    F: FnMut(&T) -> U,
{
    fold_in_place(seq, Vec::with_capacity(seq.len()), |out, item| {
        out.push(transform(item))
    })
}

/// Call `action` once per item, in index order or reversed
pub fn for_each<T, F>(seq: &[T], mut action: F, reverse: bool)
where
    F: FnMut(&T),
{
    if reverse {
        for item in seq.iter().rev() {
            action(item);
        }
    } else {
        for item in seq {
            action(item);
        }
    }
}

/// Like [`for_each`], but `action` gets the sequence and the current index
/// and may modify the sequence.
///
/// In reverse mode removing the current item is safe (prune while
/// iterating); if more items vanish the index is clamped to the new end.
/// In forward mode the length is re-read on every step.
pub fn for_each_mut<T, F>(seq: &mut Vec<T>, mut action: F, reverse: bool)
where
    F: FnMut(&mut Vec<T>, usize),
{
    if reverse {
        let mut index = seq.len();
        loop {
            index = index.min(seq.len());
            if index == 0 {
                break;
            }
            index -= 1;
            action(seq, index);
        }
    } else {
        let mut index = 0;
        while index < seq.len() {
            action(seq, index);
            index += 1;
        }
    }
}

/// Call `action` exactly `n` times
pub fn times<F>(n: usize, mut action: F)
where
    F: FnMut(),
{
    for _ in 0..n {
        action();
    }
}
