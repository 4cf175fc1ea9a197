use std::{
    fmt,
    marker::PhantomData,
    ops::{Deref, Mul},
    sync::Arc,
};

use super::UniqueIdentifier;

/// Client I/O data wrapper
///
/// `U` is the data unique identifier (UID).
pub struct Data<U: UniqueIdentifier>(Arc<<U as UniqueIdentifier>::DataType>, PhantomData<U>);
impl<T, U: UniqueIdentifier<DataType = T>> Deref for Data<U> {
    type Target = T;
    /// Returns a reference to the data
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T, U: UniqueIdentifier<DataType = T>> Clone for Data<U> {
    /// Makes a clone of the inner `Arc` pointer, returning a new instance of `Data<U>` with the cloned [Arc] within
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0), PhantomData)
    }
}

impl<T, U: UniqueIdentifier<DataType = T>> Data<U> {
    /// Moves `data` into an `Arc` pointer and places into `Data<U>`
    pub fn new(data: T) -> Self {
        Data(Arc::new(data), PhantomData)
    }
    /// Consumes `Data<U>`, returning `Data<V>` with the wrapped value within
    #[inline]
    pub fn transmute<V: UniqueIdentifier<DataType = T>>(self) -> Data<V> {
        Data(self.0, PhantomData)
    }
    /// Returns a clone of the inner [Arc] pointer
    #[inline]
    pub fn as_arc(&self) -> Arc<T> {
        Arc::clone(&self.0)
    }
}

impl<T, U> From<Data<U>> for Vec<T>
where
    T: Clone,
    U: UniqueIdentifier<DataType = Vec<T>>,
{
    fn from(data: Data<U>) -> Self {
        Arc::try_unwrap(data.0).unwrap_or_else(|arc| (*arc).clone())
    }
}
impl<T, U: UniqueIdentifier<DataType = Vec<T>>> From<Vec<T>> for Data<U> {
    fn from(u: Vec<T>) -> Self {
        Data(Arc::new(u), PhantomData)
    }
}
impl<T, U> fmt::Debug for Data<U>
where
    T: fmt::Debug,
    U: UniqueIdentifier<DataType = T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Data").field(&self.0).finish()
    }
}

impl<T, U> PartialEq for Data<U>
where
    T: PartialEq,
    U: UniqueIdentifier<DataType = T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T, U> Mul<T> for Data<U>
where
    T: Copy + Mul<T, Output = T>,
    U: UniqueIdentifier<DataType = Vec<T>>,
{
    type Output = Data<U>;

    fn mul(self, rhs: T) -> Self::Output {
        Data::new(self.0.iter().map(|x| *x * rhs).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Percent {}
    impl UniqueIdentifier for Percent {
        type DataType = Vec<f64>;
    }
    enum Fraction {}
    impl UniqueIdentifier for Fraction {
        type DataType = Vec<f64>;
    }

    #[test]
    fn scale_and_transmute() {
        let percent: Data<Percent> = vec![50., -100., 0.].into();
        let fraction: Data<Fraction> = (percent * 1e-2).transmute();
        assert_eq!(*fraction, vec![0.5, -1., 0.]);
    }

    #[test]
    fn shared_clone() {
        let data = Data::<Percent>::new(vec![1., 2.]);
        let other = data.clone();
        assert_eq!(data, other);
        assert_eq!(Arc::strong_count(&data.as_arc()), 3);
        let v: Vec<f64> = other.into();
        assert_eq!(v, vec![1., 2.]);
    }
}
