#[macro_export]
macro_rules! test_t {
  ( #[should_panic(expected = $panic_msg:literal)]
    $name:ident[T: $($impl:ty)|*]() $body:tt ) => {$(
      ::paste::paste! {
          #[test]
          #[should_panic(expected = $panic_msg)]
          fn [<$name _ $impl:snake>]() {
            type T=$impl;
            $body
          }
      }
  )+};
  ($name:ident[T: $($impl:ty)|*]() $body:tt ) => {$(
      ::paste::paste! {
          #[test]
          fn [<test_ $name _ $impl:snake>]() {
            type T=$impl;
            $body
          }
      }
  )+};
}

#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr) => {
        $crate::assert_f64_approx!($l, $r, f64::EPSILON)
    };
    ($l:expr, $r:expr, $tol:expr) => {
        assert!(
            ($l - $r).abs() < $tol,
            "assertion failed: {} !~ {} (tolerance {})",
            $l,
            $r,
            $tol
        )
    };
    ($l:expr, $r:expr, $tol:expr, $msg:expr) => {
        assert!(
            ($l - $r).abs() < $tol,
            "assertion failed: {} !~ {} (tolerance {}): {}",
            $l,
            $r,
            $tol,
            $msg
        )
    };
}
