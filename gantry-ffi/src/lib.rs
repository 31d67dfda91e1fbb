//! C-compatible boundary for the Gantry vector index.
//!
//! Every exported function is panic-safe: no Rust panic may unwind into a
//! C caller. Failures are reported through sentinel return values plus a
//! thread-local error message readable with [`gantry_last_error_message`].
//! Any successful call clears the current thread's error slot; the message
//! otherwise stays readable until the next call on that thread.
//!
//! Sentinels: NULL for [`gantry_open`], `u64::MAX` for [`gantry_add`],
//! `0` for [`gantry_search`], `-1` for [`gantry_flush`].

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::ptr;
use std::slice;

use gantry_core::{DistanceMetric, IndexOptions, VectorIndex};
use libc::{c_char, c_float, c_int, size_t};

/// Metric code for [`gantry_open_with_options`]: Euclidean distance.
pub const GANTRY_METRIC_EUCLIDEAN: c_int = 0;
/// Metric code for [`gantry_open_with_options`]: cosine distance.
pub const GANTRY_METRIC_COSINE: c_int = 1;
/// Metric code for [`gantry_open_with_options`]: negated dot product.
pub const GANTRY_METRIC_DOT_PRODUCT: c_int = 2;

/// Rust-internal state behind the opaque handle.
struct IndexState {
    inner: VectorIndex,
}

/// Opaque index handle as seen from C.
///
/// C code only ever holds pointers to this type; the real state lives in
/// [`IndexState`] and is never exposed across the boundary.
#[repr(C)]
pub struct GantryIndex {
    _private: [u8; 0],
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Record an error message in the current thread's slot.
///
/// Interior NUL bytes are escaped so error reporting itself can never
/// panic.
fn set_last_error(err: impl std::fmt::Display) {
    LAST_ERROR.with(|cell| {
        let safe_msg = err.to_string().replace('\0', "\\0");
        let c_str = CString::new(safe_msg).unwrap_or_default();
        *cell.borrow_mut() = Some(c_str);
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Panic barrier for the boundary.
///
/// Returns `None` if `f` panicked, after stashing the panic message in the
/// thread's error slot; callers then fall back to their sentinel value.
/// `AssertUnwindSafe` holds because the operation is abandoned on panic
/// rather than resumed.
fn ffi_guard<F, R>(f: F) -> Option<R>
where
    F: FnOnce() -> R,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => Some(result),
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                format!("panic: {s}")
            } else if let Some(s) = payload.downcast_ref::<String>() {
                format!("panic: {s}")
            } else {
                "panic: unknown payload".to_string()
            };
            set_last_error(msg);
            None
        }
    }
}

/// Open or create a vector index.
///
/// `path` must be a NUL-terminated UTF-8 string; lossy conversion is never
/// applied. `dimensions` must be greater than zero. Searches use Euclidean
/// distance; [`gantry_open_with_options`] selects another metric.
///
/// Returns a handle, or NULL on failure with the reason available from
/// [`gantry_last_error_message`]. The handle must be released with
/// [`gantry_free`].
///
/// # Safety
///
/// `path` must be NULL or a valid NUL-terminated C string that stays valid
/// for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn gantry_open(path: *const c_char, dimensions: u32) -> *mut GantryIndex {
    unsafe { gantry_open_with_options(path, dimensions, GANTRY_METRIC_EUCLIDEAN) }
}

/// Open or create a vector index with an explicit distance metric.
///
/// `metric` is one of [`GANTRY_METRIC_EUCLIDEAN`], [`GANTRY_METRIC_COSINE`],
/// or [`GANTRY_METRIC_DOT_PRODUCT`]; any other value fails the open.
/// Otherwise identical to [`gantry_open`].
///
/// # Safety
///
/// Same requirements as [`gantry_open`].
#[no_mangle]
pub unsafe extern "C" fn gantry_open_with_options(
    path: *const c_char,
    dimensions: u32,
    metric: c_int,
) -> *mut GantryIndex {
    ffi_guard(|| {
        if path.is_null() {
            set_last_error("path must not be NULL");
            return ptr::null_mut();
        }
        if dimensions == 0 {
            set_last_error("dimensions must be > 0");
            return ptr::null_mut();
        }

        let metric = match metric {
            GANTRY_METRIC_EUCLIDEAN => DistanceMetric::Euclidean,
            GANTRY_METRIC_COSINE => DistanceMetric::Cosine,
            GANTRY_METRIC_DOT_PRODUCT => DistanceMetric::DotProduct,
            other => {
                set_last_error(format!("unknown metric code: {other}"));
                return ptr::null_mut();
            }
        };

        // SAFETY: caller guarantees path is a valid C string.
        let c_path = unsafe { CStr::from_ptr(path) };
        let path_str = match c_path.to_str() {
            Ok(s) => s,
            Err(_) => {
                set_last_error("path must be valid UTF-8");
                return ptr::null_mut();
            }
        };

        let options = IndexOptions::new().metric(metric);
        match VectorIndex::open(path_str, dimensions as usize, options) {
            Ok(index) => {
                clear_last_error();
                let state = Box::new(IndexState { inner: index });
                Box::into_raw(state).cast::<GantryIndex>()
            }
            Err(err) => {
                set_last_error(err);
                ptr::null_mut()
            }
        }
    })
    .unwrap_or(ptr::null_mut())
}

/// Release an index handle.
///
/// NULL is a no-op. Unflushed vectors are lost; call [`gantry_flush`]
/// first if they should survive.
///
/// # Safety
///
/// `ptr` must be NULL or a pointer returned by [`gantry_open`] that has
/// not already been freed.
#[no_mangle]
pub unsafe extern "C" fn gantry_free(ptr: *mut GantryIndex) {
    if !ptr.is_null() {
        ffi_guard(|| {
            // SAFETY: caller guarantees ptr came from gantry_open.
            let _ = unsafe { Box::from_raw(ptr.cast::<IndexState>()) };
        });
    }
}

/// Append a vector and return its identifier.
///
/// Returns the new 0-based id, or `u64::MAX` on failure. Appends are not
/// durable until [`gantry_flush`].
///
/// # Safety
///
/// `ptr` must be a valid handle with no concurrent access; `vector` must
/// point to `len` readable f32 values.
#[no_mangle]
pub unsafe extern "C" fn gantry_add(
    ptr: *mut GantryIndex,
    vector: *const c_float,
    len: size_t,
) -> u64 {
    ffi_guard(|| {
        // SAFETY: caller guarantees ptr is valid with exclusive access.
        let state = unsafe { ptr.cast::<IndexState>().as_mut() };
        let index = match state {
            Some(s) => &mut s.inner,
            None => {
                set_last_error("index handle must not be NULL");
                return u64::MAX;
            }
        };

        if vector.is_null() {
            set_last_error("vector must not be NULL");
            return u64::MAX;
        }
        if len == 0 {
            set_last_error("vector length must be > 0");
            return u64::MAX;
        }

        // SAFETY: caller guarantees vector points to len f32 values.
        let slice = unsafe { slice::from_raw_parts(vector, len) };

        match index.add(slice) {
            Ok(id) => {
                clear_last_error();
                id.as_u64()
            }
            Err(err) => {
                set_last_error(err);
                u64::MAX
            }
        }
    })
    .unwrap_or(u64::MAX)
}

/// Find the `k` nearest vectors to `query`.
///
/// Writes up to `k` results into `out_ids` and `out_dists`, closest first,
/// and returns how many were written. Returns 0 on failure; an empty index
/// also yields 0 but leaves no error message, so check
/// [`gantry_last_error_message`] to tell the two apart.
///
/// # Safety
///
/// `ptr` must be a valid handle; `query` must point to `len` readable f32
/// values; `out_ids` and `out_dists` must each have room for `k` elements
/// and must not overlap.
#[no_mangle]
pub unsafe extern "C" fn gantry_search(
    ptr: *const GantryIndex,
    query: *const c_float,
    len: size_t,
    k: size_t,
    out_ids: *mut u64,
    out_dists: *mut c_float,
) -> size_t {
    ffi_guard(|| {
        // SAFETY: caller guarantees ptr is valid (shared access is fine).
        let state = unsafe { ptr.cast::<IndexState>().as_ref() };
        let index = match state {
            Some(s) => &s.inner,
            None => {
                set_last_error("index handle must not be NULL");
                return 0;
            }
        };

        if query.is_null() || out_ids.is_null() || out_dists.is_null() {
            set_last_error("query and output buffers must not be NULL");
            return 0;
        }
        if k == 0 {
            set_last_error("k must be > 0");
            return 0;
        }

        // SAFETY: caller guarantees query points to len f32 values.
        let query_slice = unsafe { slice::from_raw_parts(query, len) };

        match index.search(query_slice, k) {
            Ok(results) => {
                // SAFETY: caller guarantees room for k elements and
                // results.len() <= k.
                for (i, result) in results.iter().enumerate() {
                    unsafe {
                        *out_ids.add(i) = result.id.as_u64();
                        *out_dists.add(i) = result.distance;
                    }
                }
                clear_last_error();
                results.len()
            }
            Err(err) => {
                set_last_error(err);
                0
            }
        }
    })
    .unwrap_or(0)
}

/// Persist the index to disk.
///
/// Returns 0 on success, -1 on failure. A clean index flushes as a no-op.
///
/// # Safety
///
/// `ptr` must be a valid handle with no concurrent access.
#[no_mangle]
pub unsafe extern "C" fn gantry_flush(ptr: *mut GantryIndex) -> c_int {
    ffi_guard(|| {
        // SAFETY: caller guarantees ptr is valid with exclusive access.
        let state = unsafe { ptr.cast::<IndexState>().as_mut() };
        let index = match state {
            Some(s) => &mut s.inner,
            None => {
                set_last_error("index handle must not be NULL");
                return -1;
            }
        };

        match index.flush() {
            Ok(()) => {
                clear_last_error();
                0
            }
            Err(err) => {
                set_last_error(err);
                -1
            }
        }
    })
    .unwrap_or(-1)
}

/// Number of vectors in the index, or 0 for a NULL handle.
///
/// # Safety
///
/// `ptr` must be NULL or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn gantry_len(ptr: *const GantryIndex) -> u64 {
    ffi_guard(|| {
        let state = unsafe { ptr.cast::<IndexState>().as_ref() };
        match state {
            Some(s) => s.inner.len() as u64,
            None => 0,
        }
    })
    .unwrap_or(0)
}

/// 1 if the index is empty, 0 otherwise (including a NULL handle).
///
/// # Safety
///
/// `ptr` must be NULL or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn gantry_is_empty(ptr: *const GantryIndex) -> c_int {
    ffi_guard(|| {
        let state = unsafe { ptr.cast::<IndexState>().as_ref() };
        match state {
            Some(s) => c_int::from(s.inner.is_empty()),
            None => 0,
        }
    })
    .unwrap_or(0)
}

/// Dimensionality of the index, or 0 for a NULL handle.
///
/// # Safety
///
/// `ptr` must be NULL or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn gantry_dimensions(ptr: *const GantryIndex) -> u32 {
    ffi_guard(|| {
        let state = unsafe { ptr.cast::<IndexState>().as_ref() };
        match state {
            Some(s) => s.inner.dimensions() as u32,
            None => 0,
        }
    })
    .unwrap_or(0)
}

/// The current thread's error message, or NULL if the last call succeeded.
///
/// The pointer stays valid until the next boundary call on this thread.
/// Do not free it.
#[no_mangle]
pub extern "C" fn gantry_last_error_message() -> *const c_char {
    LAST_ERROR.with(|cell| cell.borrow().as_ref().map_or(ptr::null(), |s| s.as_ptr()))
}

/// Static library version string ("major.minor.patch"). Do not free it.
#[no_mangle]
pub extern "C" fn gantry_version() -> *const c_char {
    // concat! appends the NUL terminator C expects.
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr().cast::<c_char>()
}
