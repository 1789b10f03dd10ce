#![allow(unused_macros)]

/// Helper macro for reading locked items, mapping poisoning onto [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let data = read_lock!(my_arc_rwlock)?;
///  println!("{}", data.some_field);
/// ```
macro_rules! read_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.read().map_err(|_| crate::Error::LockError)
    };
}

/// Helper macro for writing to locked items, mapping poisoning onto [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let mut data = write_lock!(my_arc_rwlock)?;
///  data.some_field = 42;
/// ```
macro_rules! write_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.write().map_err(|_| crate::Error::LockError)
    };
}
