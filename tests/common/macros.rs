/// Asserts two floats agree to within `tol`.
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r): (f64, f64) = ($left, $right);
        assert!(
            (l - r).abs() <= $tol,
            "{} = {} is not within {} of {}",
            stringify!($left),
            l,
            $tol,
            r
        );
    };
}

/// Asserts the population of a simulation has the expected size.
#[macro_export]
macro_rules! assert_population {
    ($sim:expr, $count:expr) => {
        assert_eq!($sim.population().len(), $count, "Population count mismatch");
    };
}
