//! Implement `ParameterCollection` trait for tuples consisting of elements implementing
//! `IntoParameter` trait.

use super::ParameterCollection;
use crate::{parameter::IntoParameter, Error, Statement};

macro_rules! impl_bind_parameters {
    ($offset:expr, $stmt:ident) => (
        Ok(())
    );
    ($offset:expr, $stmt:ident $head:ident $($tail:ident)*) => (
        {
            $stmt.bind($offset, $head)?;
            impl_bind_parameters!($offset+1, $stmt $($tail)*)
        }
    );
}

macro_rules! impl_parameters_for_tuple{
    ($($t:ident)*) => (
        #[allow(unused_parens)]
        #[allow(unused_variables)]
        #[allow(non_snake_case)]
        impl<'a, $($t:IntoParameter<'a>,)*> ParameterCollection<'a> for ($($t,)*)
        {
            fn bind_parameters_to(
                self,
                first: usize,
                stmt: &mut Statement<'_>,
            ) -> Result<(), Error> {
                let ($($t,)*) = self;
                impl_bind_parameters!(first, stmt $($t)*)
            }
        }
    );
}

// The unit type is used to signal no parameters.
impl_parameters_for_tuple! {}
impl_parameters_for_tuple! { A }
impl_parameters_for_tuple! { A B }
impl_parameters_for_tuple! { A B C }
impl_parameters_for_tuple! { A B C D }
impl_parameters_for_tuple! { A B C D E }
impl_parameters_for_tuple! { A B C D E F }
impl_parameters_for_tuple! { A B C D E F G }
impl_parameters_for_tuple! { A B C D E F G H }
impl_parameters_for_tuple! { A B C D E F G H I }
impl_parameters_for_tuple! { A B C D E F G H I J }
