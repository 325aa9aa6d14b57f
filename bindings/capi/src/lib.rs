//! Thin C ABI façade over [`sparseflow_core::Csr`] for cross-language
//! callers (C5). Opaque handles only; status `0` on success, `-1` on any
//! failure with the diagnostic written to stderr. No thread-local error
//! channel, no retry.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use sparseflow_core::{Csr, Dense};

/// State owned by an opaque handle: the loaded matrix plus the buffer of
/// the most recent slice. Each `slice_csr` call on the same handle
/// invalidates (replaces) the previous slice buffer.
struct Handle {
    csr: Csr,
    last_slice: Option<Dense>,
}

fn run<F: FnOnce() -> anyhow::Result<()>>(f: F) -> c_int {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            eprintln!("{e:#}");
            -1
        }
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("unknown panic");
            eprintln!("sparseflow: internal panic: {msg}");
            -1
        }
    }
}

unsafe fn path_from_c(path: *const c_char) -> anyhow::Result<PathBuf> {
    anyhow::ensure!(!path.is_null(), "path pointer is null");
    let s = unsafe { CStr::from_ptr(path) }.to_str()?;
    Ok(PathBuf::from(s))
}

/// Loads a CSR matrix from `path`. On success, writes the handle and its
/// inferred/on-disk shape and returns `0`.
///
/// # Safety
/// `path` must be a valid, NUL-terminated C string. `handle_out`,
/// `nrows_out`, `ncols_out` must be valid, non-null, writable pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sparseflow_load_csr(
    path: *const c_char,
    handle_out: *mut *mut c_void,
    nrows_out: *mut u64,
    ncols_out: *mut u64,
) -> c_int {
    run(|| {
        let path = unsafe { path_from_c(path) }?;
        let csr = Csr::load(path)?;
        let nrows = csr.nrows() as u64;
        let ncols = csr.ncols() as u64;
        let handle = Box::new(Handle { csr, last_slice: None });

        unsafe {
            *handle_out = Box::into_raw(handle) as *mut c_void;
            *nrows_out = nrows;
            *ncols_out = ncols;
        }
        Ok(())
    })
}

/// Saves the matrix referenced by `handle` to `path`.
///
/// # Safety
/// `handle` must be a live handle returned by [`sparseflow_load_csr`].
/// `path` must be a valid, NUL-terminated C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sparseflow_save_csr(handle: *mut c_void, path: *const c_char) -> c_int {
    run(|| {
        anyhow::ensure!(!handle.is_null(), "csr handle is null");
        let handle = unsafe { &*(handle as *const Handle) };
        let path = unsafe { path_from_c(path) }?;
        handle.csr.save(path)?;
        Ok(())
    })
}

/// Slices `handle`'s matrix by the signed row indices in
/// `idxset[0..len]`, writing a pointer to the resulting contiguous
/// row-major `f32` buffer plus its shape. The buffer's lifetime is bound
/// to `handle` and is invalidated by the next `slice_csr` call on the
/// same handle.
///
/// # Safety
/// `handle` must be a live handle. `idxset` must point to `len` valid
/// `i64`s. `data_out`, `nrows_out`, `ncols_out` must be valid, non-null,
/// writable pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sparseflow_slice_csr(
    handle: *mut c_void,
    idxset: *const i64,
    len: u64,
    data_out: *mut *mut f32,
    nrows_out: *mut u64,
    ncols_out: *mut u64,
) -> c_int {
    run(|| {
        anyhow::ensure!(!handle.is_null(), "csr handle is null");
        let handle = unsafe { &mut *(handle as *mut Handle) };
        anyhow::ensure!(!idxset.is_null() || len == 0, "idxset pointer is null");

        let ixs: &[i64] = if len == 0 { &[] } else { unsafe { std::slice::from_raw_parts(idxset, len as usize) } };
        let dense = handle.csr.slice(ixs)?;

        let nrows = dense.nrows() as u64;
        let ncols = dense.ncols() as u64;
        handle.last_slice = Some(dense);

        let data_ptr = handle.last_slice.as_mut().unwrap().as_mut_slice().as_mut_ptr();
        unsafe {
            *data_out = data_ptr;
            *nrows_out = nrows;
            *ncols_out = ncols;
        }
        Ok(())
    })
}

/// Frees a handle returned by [`sparseflow_load_csr`]. Idempotent-safe
/// against a null handle (reported, not crashing).
///
/// # Safety
/// `handle` must either be null or a live handle returned by
/// [`sparseflow_load_csr`] that has not already been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sparseflow_free_csr(handle: *mut c_void) -> c_int {
    run(|| {
        if handle.is_null() {
            eprintln!("sparseflow: free_csr called with a null handle");
            return Ok(());
        }
        drop(unsafe { Box::from_raw(handle as *mut Handle) });
        Ok(())
    })
}
