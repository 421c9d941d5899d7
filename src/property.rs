use std::{
    cell::{Ref, RefCell, RefMut},
    marker::PhantomData,
    ops::{Deref, DerefMut, Index, IndexMut},
    rc::{Rc, Weak},
};

use crate::{element::Handle, error::Error};

/// Registry of the properties defined on one kind of mesh element.
///
/// The container does not own the property buffers. It holds weak references
/// and grows every live buffer in lock step whenever elements are added to
/// the mesh, so that a property value exists for every element.
pub(crate) struct PropertyContainer<H>
where
    H: Handle,
{
    props: Vec<Box<dyn GenericProperty>>,
    length: usize,
    _phantom: PhantomData<H>,
}

impl<H> Default for PropertyContainer<H>
where
    H: Handle,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<H> PropertyContainer<H>
where
    H: Handle,
{
    pub fn new() -> Self {
        PropertyContainer {
            props: Vec::new(),
            length: 0,
            _phantom: PhantomData,
        }
    }

    fn push_property(&mut self, prop: Box<dyn GenericProperty>) {
        self.props.push(prop);
    }

    pub fn push_value(&mut self) -> Result<(), Error> {
        self.push_values(1)
    }

    /// Append `num` default values to every registered property.
    pub fn push_values(&mut self, num: usize) -> Result<(), Error> {
        for i in 0..self.props.len() {
            if let Err(e) = self.props[i].push_many(num) {
                // Shrink whatever already grew back to the old length.
                for prop in self.props.iter_mut().take(i) {
                    prop.resize(self.length)?;
                }
                return Err(e);
            }
        }
        self.length += num;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.length
    }
}

trait GenericProperty {
    fn push_many(&mut self, num: usize) -> Result<(), Error>;

    fn resize(&mut self, n: usize) -> Result<(), Error>;

    fn is_valid(&self) -> bool;
}

/// Buffer containing the property values.
///
/// A thin wrapper around `Vec<T>` that allows type safe indexing with the
/// handle type `H`. Deref to `&[T]` when a raw slice is needed.
pub struct PropBuf<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    buf: Vec<T>,
    _phantom: PhantomData<H>,
}

impl<H, T> Index<H> for PropBuf<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    type Output = T;

    fn index(&self, handle: H) -> &Self::Output {
        &self.buf[handle.index() as usize]
    }
}

impl<H, T> IndexMut<H> for PropBuf<H, T>
where
    H: Handle,
    T: Clone + Copy + 'static,
{
    fn index_mut(&mut self, h: H) -> &mut Self::Output {
        &mut self.buf[h.index() as usize]
    }
}

impl<H, T> Deref for PropBuf<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<H, T> DerefMut for PropBuf<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

/// A value of type `T` associated with every mesh element of handle type `H`.
///
/// Unlike a bare `Vec<T>`, a property stays synchronized with the mesh: when
/// elements are added, every property registered with the mesh grows to
/// match, with new elements taking the property's default value. Properties
/// use interior mutability with runtime borrow checking; failed borrows
/// surface as [`Error::BorrowedPropertyAccess`].
#[derive(Clone)]
pub struct Property<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    data: Rc<RefCell<PropBuf<H, T>>>,
    default: T,
}

impl<H, T> Property<H, T>
where
    H: Handle + 'static,
    T: Clone + Copy + 'static,
{
    pub(crate) fn new(container: &mut PropertyContainer<H>, default: T) -> Self {
        let prop = Property {
            data: Rc::new(RefCell::new(PropBuf {
                buf: vec![default; container.len()],
                _phantom: PhantomData,
            })),
            default,
        };
        container.push_property(prop.generic_ref());
        prop
    }

    fn generic_ref(&self) -> Box<dyn GenericProperty> {
        Box::new(WeakProperty::<H, T> {
            data: Rc::downgrade(&self.data),
            default: self.default,
        })
    }

    /// Try to borrow the property buffer with read-only access.
    pub fn try_borrow(&self) -> Result<Ref<'_, PropBuf<H, T>>, Error> {
        self.data
            .try_borrow()
            .map_err(|_| Error::BorrowedPropertyAccess)
    }

    /// Try to borrow the property buffer with mutable access.
    pub fn try_borrow_mut(&mut self) -> Result<RefMut<'_, PropBuf<H, T>>, Error> {
        self.data
            .try_borrow_mut()
            .map_err(|_| Error::BorrowedPropertyAccess)
    }

    /// Get a reference to the property value of the mesh element `h`.
    pub fn get(&self, h: H) -> Result<Ref<'_, T>, Error> {
        Ok(Ref::map(
            self.data
                .try_borrow()
                .map_err(|_| Error::BorrowedPropertyAccess)?,
            |v| &v.buf[h.index() as usize],
        ))
    }

    /// Get the cloned property value of the mesh element `h`.
    pub fn get_cloned(&self, h: H) -> Result<T, Error> {
        let buf = self.try_borrow()?;
        Ok(buf[h])
    }

    /// Get a mutable reference to the property value of the mesh element `h`.
    pub fn get_mut(&mut self, h: H) -> Result<RefMut<'_, T>, Error> {
        Ok(RefMut::map(
            self.data
                .try_borrow_mut()
                .map_err(|_| Error::BorrowedPropertyAccess)?,
            |v| &mut v.buf[h.index() as usize],
        ))
    }

    /// Set the property value of the mesh element `h`.
    pub fn set(&mut self, h: H, val: T) -> Result<(), Error> {
        (*self.get_mut(h)?) = val;
        Ok(())
    }
}

/// This is what lives inside the property container. It does not control the
/// lifetime of the property; it only grows the buffer when elements are added
/// to the mesh.
struct WeakProperty<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    data: Weak<RefCell<PropBuf<H, T>>>,
    default: T,
}

impl<H, T> GenericProperty for WeakProperty<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    fn push_many(&mut self, num: usize) -> Result<(), Error> {
        if let Some(prop) = self.data.upgrade() {
            let mut prop = prop
                .try_borrow_mut()
                .map_err(|_| Error::BorrowedPropertyAccess)?;
            let buf: &mut Vec<T> = &mut prop.buf;
            buf.resize(buf.len() + num, self.default);
        }
        Ok(())
    }

    fn resize(&mut self, n: usize) -> Result<(), Error> {
        if let Some(prop) = self.data.upgrade() {
            prop.try_borrow_mut()
                .map_err(|_| Error::BorrowedPropertyAccess)?
                .buf
                .resize(n, self.default);
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.data.upgrade().is_some()
    }
}

#[cfg(test)]
mod test {
    use super::PropertyContainer;
    use crate::element::VH;

    #[test]
    fn t_property_grows_with_container() {
        let mut container = PropertyContainer::<VH>::new();
        let prop = super::Property::<VH, u32>::new(&mut container, 42);
        container.push_values(3).expect("Cannot grow properties");
        let buf = prop.try_borrow().expect("Cannot borrow property");
        let buf: &[u32] = &buf;
        assert_eq!(&buf[..], &[42, 42, 42]);
    }

    #[test]
    fn t_property_set_get() {
        let mut container = PropertyContainer::<VH>::new();
        let mut prop = super::Property::<VH, u32>::new(&mut container, 0);
        container.push_values(2).expect("Cannot grow properties");
        prop.set(1.into(), 7).expect("Cannot set property");
        assert_eq!(prop.get_cloned(1.into()).expect("Cannot read property"), 7);
        assert_eq!(prop.get_cloned(0.into()).expect("Cannot read property"), 0);
    }

    #[test]
    fn t_dead_property_is_skipped() {
        let mut container = PropertyContainer::<VH>::new();
        {
            let _prop = super::Property::<VH, u16>::new(&mut container, 0);
        }
        // The buffer is gone; growing the container must not fail.
        container.push_values(4).expect("Cannot grow properties");
        assert_eq!(container.len(), 4);
    }
}
