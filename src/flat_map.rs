//! A lazy "flat map" with a pre-filter on the source elements.
//!
//! Each accepted source element is expanded into its own sequence only when
//! the consumer asks for the next item. A finished expansion is dropped before
//! the next source element is expanded, so whatever it holds (an open archive,
//! a directory walker) is released as soon as it is exhausted.

use std::iter::FusedIterator;

pub struct FlatMap<S, A, M, U>
where
    S: Iterator,
{
    source: S,
    accept: A,
    map: M,
    current: Option<U>,
}

impl<S, M, U> FlatMap<S, fn(&S::Item) -> bool, M, U>
where
    S: Iterator,
    M: FnMut(S::Item) -> U,
    U: Iterator,
{
    /// Expands every source element.
    pub fn new<I>(source: I, map: M) -> Self
    where
        I: IntoIterator<IntoIter = S>,
    {
        Self::with_accept(source, accept_all::<S::Item>, map)
    }
}

impl<S, A, M, U> FlatMap<S, A, M, U>
where
    S: Iterator,
    A: FnMut(&S::Item) -> bool,
    M: FnMut(S::Item) -> U,
    U: Iterator,
{
    /// Expands only the source elements for which `accept` returns true.
    /// Rejected elements are never passed to `map`.
    pub fn with_accept<I>(source: I, accept: A, map: M) -> Self
    where
        I: IntoIterator<IntoIter = S>,
    {
        Self {
            source: source.into_iter(),
            accept,
            map,
            current: None,
        }
    }
}

fn accept_all<T>(_: &T) -> bool {
    true
}

impl<S, A, M, U> Iterator for FlatMap<S, A, M, U>
where
    S: Iterator,
    A: FnMut(&S::Item) -> bool,
    M: FnMut(S::Item) -> U,
    U: Iterator,
{
    type Item = U::Item;

    fn next(&mut self) -> Option<U::Item> {
        loop {
            if let Some(current) = self.current.as_mut() {
                if let Some(item) = current.next() {
                    return Some(item);
                }
                self.current = None;
            }

            let accept = &mut self.accept;
            let element = self.source.find(|element| accept(element))?;
            self.current = Some((self.map)(element));
        }
    }
}

impl<S, A, M, U> FusedIterator for FlatMap<S, A, M, U>
where
    S: FusedIterator,
    A: FnMut(&S::Item) -> bool,
    M: FnMut(S::Item) -> U,
    U: Iterator,
{
}
