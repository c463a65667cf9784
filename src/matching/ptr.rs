use std::fmt;

/// Address of a (sub-)object, or the value of a thrown pointer.
///
/// The matching engine never dereferences an `ObjectPtr` itself; adjustments are plain signed
/// address arithmetic. Only a [`crate::matching::VtableReader`] reads memory through it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectPtr(usize);

impl ObjectPtr {
    /// The null object
    pub const NULL: ObjectPtr = ObjectPtr(0);

    /// Creates an `ObjectPtr` from a raw address
    #[must_use]
    pub const fn new(addr: usize) -> Self {
        ObjectPtr(addr)
    }

    /// Creates an `ObjectPtr` from a raw pointer
    #[must_use]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        ObjectPtr(ptr as usize)
    }

    /// The raw address
    #[must_use]
    pub const fn addr(&self) -> usize {
        self.0
    }

    /// True for the null object
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// The address `offset` bytes away. The null object stays null.
    #[must_use]
    pub fn offset(self, offset: isize) -> Self {
        if self.is_null() {
            self
        } else {
            ObjectPtr(self.0.wrapping_add_signed(offset))
        }
    }

    /// The address as a raw pointer
    #[must_use]
    pub fn as_ptr<T>(&self) -> *const T {
        self.0 as *const T
    }
}

impl From<usize> for ObjectPtr {
    fn from(addr: usize) -> Self {
        ObjectPtr(addr)
    }
}

impl From<ObjectPtr> for usize {
    fn from(ptr: ObjectPtr) -> Self {
        ptr.0
    }
}

impl fmt::Debug for ObjectPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectPtr(0x{:x})", self.0)
    }
}

impl fmt::Display for ObjectPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}
