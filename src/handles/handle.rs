use std::{fmt, mem};

/// Policy describing one kind of native SQLite resource: how its raw value looks, which value marks
/// "no resource" and how a resource is released.
///
/// The crate uses exactly two kinds, [`super::ConnectionKind`] and [`super::StatementKind`].
///
/// # Safety
///
/// `close` must release the resource completely, so the same raw value is never valid again
/// afterwards. `INVALID` must never be a value produced by the native library for a live resource.
pub unsafe trait HandleKind {
    /// Raw value of the resource, usually a pointer into the native library.
    type Raw: Copy + PartialEq + fmt::Debug;

    /// Sentinel stored in an empty handle.
    const INVALID: Self::Raw;

    /// Releases the resource. Only ever called with values different from [`Self::INVALID`].
    ///
    /// # Safety
    ///
    /// `raw` must refer to a live resource of this kind, which is not used again afterwards.
    unsafe fn close(raw: Self::Raw);
}

/// Exclusive owner of a native resource of kind `K`.
///
/// A handle either holds a valid resource or the [`HandleKind::INVALID`] sentinel. It is not
/// `Clone`, ownership can only be transferred by moving the handle (or by taking it with
/// [`std::mem::take`], which leaves an empty handle behind). The resource is closed exactly once,
/// either when the handle is dropped, or when it is replaced using [`Handle::reset`]. Handing the
/// resource over to someone else without closing it is possible using [`Handle::detach`].
pub struct Handle<K: HandleKind> {
    raw: K::Raw,
}

impl<K: HandleKind> Handle<K> {
    /// Takes ownership of `raw` without validating it.
    ///
    /// # Safety
    ///
    /// `raw` must either be [`HandleKind::INVALID`] or a live resource of kind `K` which is owned
    /// by nobody else.
    pub unsafe fn new(raw: K::Raw) -> Self {
        Self { raw }
    }

    /// A handle which does not hold any resource.
    pub fn empty() -> Self {
        Self { raw: K::INVALID }
    }

    /// `true` if the handle holds a resource.
    pub fn is_valid(&self) -> bool {
        self.raw != K::INVALID
    }

    /// The raw value of the held resource. Ownership stays with the handle.
    pub fn get(&self) -> K::Raw {
        self.raw
    }

    /// Slot the native library can write a freshly produced resource into. Intended to be passed
    /// as out parameter, e.g. to `sqlite3_open_v2`.
    ///
    /// # Panics
    ///
    /// If the handle already holds a resource, since it would be leaked otherwise.
    pub fn prepare_for_assignment(&mut self) -> &mut K::Raw {
        assert!(
            !self.is_valid(),
            "Handle must be empty before a new resource is assigned to it."
        );
        &mut self.raw
    }

    /// Gives up ownership of the held resource without closing it. The handle is empty afterwards.
    pub fn detach(&mut self) -> K::Raw {
        mem::replace(&mut self.raw, K::INVALID)
    }

    /// Replaces the held resource with `raw`. The previous resource is closed, unless it is `raw`
    /// itself, in which case nothing happens.
    ///
    /// # Return
    ///
    /// `true` if the handle holds a resource afterwards.
    ///
    /// # Safety
    ///
    /// Same as [`Handle::new`].
    pub unsafe fn reset(&mut self, raw: K::Raw) -> bool {
        if self.raw != raw {
            let previous = mem::replace(&mut self.raw, raw);
            if previous != K::INVALID {
                K::close(previous);
            }
        }
        self.is_valid()
    }

    /// Closes the held resource, if any. The handle is empty afterwards.
    pub fn clear(&mut self) {
        // Safe, since the sentinel is never owned.
        unsafe {
            self.reset(K::INVALID);
        }
    }

    /// Exchanges the resources of two handles. Nothing is closed.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.raw, &mut other.raw)
    }
}

impl<K: HandleKind> Default for Handle<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: HandleKind> Drop for Handle<K> {
    fn drop(&mut self) {
        self.clear()
    }
}

impl<K: HandleKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: HandleKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.raw).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, mem};

    use super::{Handle, HandleKind};

    thread_local! {
        static CLOSED: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
    }

    /// Records every value it is asked to close.
    struct Spy;

    unsafe impl HandleKind for Spy {
        type Raw = u32;
        const INVALID: u32 = 0;

        unsafe fn close(raw: u32) {
            CLOSED.with(|closed| closed.borrow_mut().push(raw))
        }
    }

    fn closed() -> Vec<u32> {
        CLOSED.with(|closed| closed.borrow().clone())
    }

    fn spy(raw: u32) -> Handle<Spy> {
        unsafe { Handle::new(raw) }
    }

    #[test]
    fn empty_handle_is_invalid_and_closes_nothing() {
        let handle = Handle::<Spy>::default();
        assert!(!handle.is_valid());
        drop(handle);
        assert!(closed().is_empty());
    }

    #[test]
    fn drop_closes_exactly_once() {
        drop(spy(42));
        assert_eq!(vec![42], closed());
    }

    #[test]
    fn taking_a_handle_leaves_an_empty_one_behind() {
        let mut source = spy(1);
        let target = mem::take(&mut source);

        assert!(!source.is_valid());
        assert_eq!(1, target.get());

        drop(source);
        assert!(closed().is_empty());
        drop(target);
        assert_eq!(vec![1], closed());
    }

    #[test]
    fn detach_hands_over_without_closing() {
        let mut handle = spy(7);
        assert_eq!(7, handle.detach());
        assert!(!handle.is_valid());
        drop(handle);
        assert!(closed().is_empty());
    }

    #[test]
    fn reset_closes_previous_value() {
        let mut handle = spy(1);
        assert!(unsafe { handle.reset(2) });
        assert_eq!(vec![1], closed());
        handle.clear();
        assert_eq!(vec![1, 2], closed());
        drop(handle);
        assert_eq!(vec![1, 2], closed());
    }

    #[test]
    fn self_reset_is_a_no_op() {
        let mut handle = spy(3);
        let raw = handle.get();
        assert!(unsafe { handle.reset(raw) });
        assert!(closed().is_empty());
        assert_eq!(3, handle.get());
    }

    #[test]
    fn swap_exchanges_values_without_closing() {
        let mut left = spy(1);
        let mut right = Handle::empty();

        left.swap(&mut right);

        assert!(!left.is_valid());
        assert_eq!(1, right.get());
        assert!(closed().is_empty());
    }

    #[test]
    fn handles_compare_by_value() {
        let mut first = spy(5);
        let second = Handle::<Spy>::empty();
        assert_ne!(first, second);
        first.detach();
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "Handle must be empty")]
    fn assigning_into_occupied_handle_panics() {
        let mut handle = spy(9);
        let _ = handle.prepare_for_assignment();
    }

    #[test]
    fn assignment_slot_fills_empty_handle() {
        let mut handle = Handle::<Spy>::empty();
        *handle.prepare_for_assignment() = 11;
        assert!(handle.is_valid());
        drop(handle);
        assert_eq!(vec![11], closed());
    }
}
