// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading and writing FITS files. All of these report
//! where they were called from when something goes wrong.

mod error;

pub use error::{Caller, FitsError};

use std::{
    ffi::{CStr, CString},
    fmt::Display,
    path::Path,
    ptr,
};

use fitsio::{hdu::*, FitsFile};

fn fitsio_error(
    fits_fptr: &FitsFile,
    hdu_description: impl Display,
    e: fitsio::errors::Error,
    caller: Caller,
) -> FitsError {
    FitsError::Fitsio {
        fits_error: Box::new(e),
        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
        hdu_description: hdu_description.to_string().into_boxed_str(),
        caller,
    }
}

#[track_caller]
fn to_c_string(s: &str) -> Result<CString, FitsError> {
    CString::new(s).map_err(|_| FitsError::Nul {
        string: s.into(),
        caller: Caller::here(),
    })
}

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    let caller = Caller::here();
    FitsFile::open(file.as_ref()).map_err(|e| FitsError::Open {
        fits_error: Box::new(e),
        fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
        caller,
    })
}

/// Create a new fits file. The file must not already exist.
#[track_caller]
pub(crate) fn fits_create<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    let caller = Caller::here();
    FitsFile::create(file.as_ref())
        .open()
        .map_err(|e| FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            caller,
        })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    let caller = Caller::here();
    fits_fptr
        .hdu(hdu_description)
        .map_err(|e| fitsio_error(fits_fptr, hdu_description, e, caller))
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let caller = Caller::here();
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        // 202: keyword not found. 204: keyword has no value.
        Err(fitsio::errors::Error::Fits(fitsio::errors::FitsError {
            status: 202 | 204, ..
        })) => return Ok(None),
        Err(e) => return Err(fitsio_error(fits_fptr, hdu.number + 1, e, caller)),
    };

    match unparsed_value.trim().parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => Err(FitsError::Parse {
            key: keyword.into(),
            value: unparsed_value.into_boxed_str(),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_num: hdu.number + 1,
            caller,
        }),
    }
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword, pull out
/// the value of the keyword, parsing it into the desired type.
#[track_caller]
pub(crate) fn fits_get_required_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<T, FitsError> {
    let caller = Caller::here();
    fits_get_optional_key(fits_fptr, hdu, keyword)?.ok_or_else(|| FitsError::MissingKey {
        key: keyword.into(),
        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
        hdu_num: hdu.number + 1,
        caller,
    })
}

/// Get a column from a fits file's HDU.
#[track_caller]
pub(crate) fn fits_get_col<T: fitsio::tables::ReadsCol>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Vec<T>, FitsError> {
    let caller = Caller::here();
    hdu.read_col(fits_fptr, keyword)
        .map_err(|e| fitsio_error(fits_fptr, hdu.number + 1, e, caller))
}

/// Given a FITS file pointer, and a keyword to a long string keyword that may
/// or may not exist, pull out the long string of the keyword. This deals with
/// FITSs CONTINUE mechanism by calling a low level fits function. The current
/// HDU of the file pointer is used.
#[track_caller]
pub(crate) fn fits_get_optional_key_long_string(
    fits_fptr: &mut FitsFile,
    keyword: &str,
) -> Result<Option<String>, FitsError> {
    let caller = Caller::here();
    let keyword_ffi = to_c_string(keyword)?;
    let mut status = 0;
    let mut long_string_ptr = ptr::null_mut();
    unsafe {
        // ffgkls = fits_read_key_longstr
        fitsio_sys::ffgkls(
            fits_fptr.as_raw(),
            keyword_ffi.as_ptr(),
            &mut long_string_ptr,
            ptr::null_mut(),
            &mut status,
        );
    }
    match status {
        0 => {
            let long_string = unsafe {
                let s = CStr::from_ptr(long_string_ptr).to_string_lossy().into_owned();
                // fffree = fits_free_memory. The status isn't useful.
                fitsio_sys::fffree(long_string_ptr.cast(), &mut 0);
                s
            };
            Ok(Some(long_string))
        }
        202 | 204 => Ok(None),
        _ => Err(FitsError::LongString {
            key: keyword.into(),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            status,
            caller,
        }),
    }
}

/// Write a (potentially very long) string keyword into the current HDU of the
/// file pointer, using the FITS CONTINUE convention if needed.
#[track_caller]
pub(crate) fn fits_write_long_string(
    fits_fptr: &mut FitsFile,
    keyword: &str,
    value: &str,
    comment: Option<&str>,
) -> Result<(), FitsError> {
    let caller = Caller::here();
    let keyword_ffi = to_c_string(keyword)?;
    let value_ffi = to_c_string(value)?;
    let comment_ffi = comment.map(to_c_string).transpose()?;
    let mut status = 0;
    unsafe {
        // ffplsw = fits_write_key_longwarn
        fitsio_sys::ffplsw(fits_fptr.as_raw(), &mut status);
        // ffpkls = fits_write_key_longstr
        fitsio_sys::ffpkls(
            fits_fptr.as_raw(),
            keyword_ffi.as_ptr(),
            value_ffi.as_ptr(),
            comment_ffi.as_ref().map(|c| c.as_ptr()).unwrap_or(ptr::null()),
            &mut status,
        );
    }
    if status == 0 {
        Ok(())
    } else {
        Err(FitsError::LongString {
            key: keyword.into(),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            status,
            caller,
        })
    }
}

/// Get the shape of the image on the supplied FITS file pointer and HDU. The
/// shape is in C order (i.e. the last FITS axis comes first).
#[track_caller]
pub(crate) fn fits_get_image_shape<'a>(
    fits_fptr: &FitsFile,
    hdu: &'a FitsHdu,
) -> Result<&'a [usize], FitsError> {
    match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => Ok(shape),
        _ => Err(FitsError::NotImage {
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_num: hdu.number + 1,
            caller: Caller::here(),
        }),
    }
}

/// Given a FITS file pointer and a HDU, read the associated image.
#[track_caller]
pub(crate) fn fits_get_image<T: fitsio::images::ReadImage>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<T, FitsError> {
    let caller = Caller::here();
    fits_get_image_shape(fits_fptr, hdu)?;
    hdu.read_image(fits_fptr)
        .map_err(|e| fitsio_error(fits_fptr, hdu.number + 1, e, caller))
}
