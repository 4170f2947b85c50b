use num_traits::{Float, FromPrimitive, Signed};
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::AddAssign;

// A Float trait that captures the requirements we need for the various places
// we need floats. These requirements are imposed by ndarray, ndarray-stats and rayon.
//
// `Float` and `Signed` both define `abs`, so call sites use `Float::abs(x)`.
pub trait KFloat:
    Float
    + Debug
    + Display
    + Default
    + AddAssign
    + Sum
    + Signed
    + Copy
    + Sync
    + Send
    + FromPrimitive
    + 'static
{
}

impl KFloat for f32 {}
impl KFloat for f64 {}
