/// Unwraps a `Option`, returning `None` from the enclosing function on
/// `None`. Used throughout the codec layer so parse functions read as a
/// straight-line sequence of fields instead of a staircase of `match`.
macro_rules! try_ret(
  ($e:expr) => (
    match $e {
      Some(x) => x,
      None => return None
    }
  )
);

/// When the `logging` feature is off, `log`'s macros aren't in scope at
/// all -- stub them out to no-ops so call sites elsewhere don't need a
/// `#[cfg(feature = "logging")]` on every log line.
#[cfg(not(feature = "logging"))]
macro_rules! trace    ( ($($arg:tt)*) => () );
#[cfg(not(feature = "logging"))]
macro_rules! debug    ( ($($arg:tt)*) => () );
#[cfg(not(feature = "logging"))]
macro_rules! info     ( ($($arg:tt)*) => () );
#[cfg(not(feature = "logging"))]
macro_rules! warn     ( ($($arg:tt)*) => () );
#[cfg(not(feature = "logging"))]
macro_rules! error    ( ($($arg:tt)*) => () );
