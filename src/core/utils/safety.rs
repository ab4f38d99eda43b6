//! Zero-cost bounds checking for the transform serialization hot path.
//!
//! In Debug mode: normal bounds-checked access (panics with useful errors)
//! In Release mode: unsafe unchecked access (zero overhead)
//!
//! The step handler writes 3 + 4 floats per body per frame into the transfer
//! buffers; the slots are guaranteed in range because the buffers are resized
//! to the registry length right before the write loop.
//!
//! Usage:
//! ```rust
//! use dynamo_physics::fast;
//!
//! let idx = 2;
//!
//! let arr = vec![1, 2, 3, 4, 5];
//! // Read: fast!(slice, [index])
//! let val = *fast!(arr, [idx]);
//! assert_eq!(val, 3);
//!
//! let mut buffer = vec![0.0f32; 5];
//! // Write: fast!(slice, [index] = value)
//! fast!(buffer, [idx] = 1.5);
//! assert_eq!(buffer[idx], 1.5);
//! ```

/// Zero-cost bounds checking macro
///
/// - Debug: Uses normal indexing with bounds checks
/// - Release: Uses get_unchecked/get_unchecked_mut
#[macro_export]
macro_rules! fast {
    // Read pattern: fast!(slice, [index])
    ($slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &$slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked($index) }
        }
    }};

    // Write pattern: fast!(slice, [index] = value)
    ($slice:expr, [$index:expr] = $val:expr) => {{
        #[cfg(debug_assertions)]
        {
            $slice[$index] = $val;
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { *$slice.get_unchecked_mut($index) = $val; }
        }
    }};
}
