//! Window start positions shared by batching and reconstruction.
//!
//! Both [`batch`](crate::batch::batch) and
//! [`reconstruct`](crate::overlap_add::reconstruct) walk the same cursor:
//! start at frame 0 and advance by `time_context - overlap` while
//! `start + time_context < total_frames`. Keeping that rule in one place is
//! what guarantees the two stages agree on how many windows exist and where
//! each one starts.

use convsep_spec::TailMode;

use crate::error::{DspError, DspResult};

/// Checks the window geometry shared by every cursor consumer.
pub(crate) fn check_geometry(time_context: usize, overlap: usize) -> DspResult<()> {
    if time_context == 0 {
        return Err(DspError::invalid_param(
            "time_context",
            "time_context must be at least 1",
        ));
    }
    if overlap >= time_context {
        return Err(DspError::invalid_param(
            "overlap",
            format!(
                "overlap ({}) must be smaller than time_context ({})",
                overlap, time_context
            ),
        ));
    }
    Ok(())
}

/// Start frame of every window carved out of `total_frames` frames.
///
/// With [`TailMode::Drop`] a window is emitted while
/// `start + time_context < total_frames`. With [`TailMode::Pad`] one more
/// window follows so that the last frame is carried too. Either mode yields
/// no windows when `total_frames <= time_context`.
///
/// # Example
/// ```
/// use convsep_dsp::cursor::window_starts;
/// use convsep_spec::TailMode;
///
/// let starts = window_starts(80, 30, 15, TailMode::Drop).unwrap();
/// assert_eq!(starts, vec![0, 15, 30, 45]);
///
/// let starts = window_starts(80, 30, 15, TailMode::Pad).unwrap();
/// assert_eq!(starts, vec![0, 15, 30, 45, 60]);
/// ```
pub fn window_starts(
    total_frames: usize,
    time_context: usize,
    overlap: usize,
    tail: TailMode,
) -> DspResult<Vec<usize>> {
    check_geometry(time_context, overlap)?;
    let stride = time_context - overlap;

    let mut starts = Vec::new();
    let mut start = 0;
    while start + time_context < total_frames {
        starts.push(start);
        start += stride;
    }

    if tail == TailMode::Pad && !starts.is_empty() {
        starts.push(start);
    }

    Ok(starts)
}

/// Number of windows [`window_starts`] yields, computed in closed form.
pub fn chunk_count(
    total_frames: usize,
    time_context: usize,
    overlap: usize,
    tail: TailMode,
) -> DspResult<usize> {
    check_geometry(time_context, overlap)?;
    if total_frames <= time_context {
        return Ok(0);
    }

    let stride = time_context - overlap;
    let count = (total_frames - time_context).div_ceil(stride);
    Ok(match tail {
        TailMode::Drop => count,
        TailMode::Pad => count + 1,
    })
}

/// Start frame of window `index` for a given geometry.
pub fn window_start(index: usize, time_context: usize, overlap: usize) -> usize {
    index * (time_context - overlap)
}

/// Length of the reconstruction buffer for `chunk_count` windows.
pub fn output_length(chunk_count: usize, time_context: usize, overlap: usize) -> usize {
    chunk_count * (time_context - overlap) + time_context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_mode_stops_before_last_frame() {
        // 45 + 30 = 75 < 76, 60 + 30 = 90 is not
        assert_eq!(
            window_starts(76, 30, 15, TailMode::Drop).unwrap(),
            vec![0, 15, 30, 45]
        );
        // Exactly 60 frames: the window at 30 would end on the boundary.
        assert_eq!(
            window_starts(60, 30, 15, TailMode::Drop).unwrap(),
            vec![0, 15]
        );
    }

    #[test]
    fn test_no_windows_when_too_short() {
        for total in [0, 1, 29, 30] {
            assert!(window_starts(total, 30, 15, TailMode::Drop)
                .unwrap()
                .is_empty());
            assert!(window_starts(total, 30, 15, TailMode::Pad)
                .unwrap()
                .is_empty());
            assert_eq!(chunk_count(total, 30, 15, TailMode::Pad).unwrap(), 0);
        }
    }

    #[test]
    fn test_single_window_boundary() {
        assert_eq!(window_starts(31, 30, 15, TailMode::Drop).unwrap(), vec![0]);
        assert_eq!(
            window_starts(31, 30, 15, TailMode::Pad).unwrap(),
            vec![0, 15]
        );
    }

    #[test]
    fn test_zero_overlap_tiles() {
        assert_eq!(
            window_starts(25, 5, 0, TailMode::Drop).unwrap(),
            vec![0, 5, 10, 15]
        );
    }

    #[test]
    fn test_closed_form_matches_walk() {
        for total in 0..120 {
            for time_context in 1..12 {
                for overlap in 0..time_context {
                    for tail in [TailMode::Drop, TailMode::Pad] {
                        let walked = window_starts(total, time_context, overlap, tail).unwrap();
                        let counted = chunk_count(total, time_context, overlap, tail).unwrap();
                        assert_eq!(
                            walked.len(),
                            counted,
                            "total {} tc {} ov {} {:?}",
                            total,
                            time_context,
                            overlap,
                            tail
                        );
                        for (i, &s) in walked.iter().enumerate() {
                            assert_eq!(s, window_start(i, time_context, overlap));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_pad_mode_covers_every_frame() {
        for total in 31..200 {
            let starts = window_starts(total, 30, 12, TailMode::Pad).unwrap();
            let last = *starts.last().unwrap();
            assert!(last + 30 >= total, "total {} last {}", total, last);
        }
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(window_starts(100, 0, 0, TailMode::Drop).is_err());
        assert!(window_starts(100, 10, 10, TailMode::Drop).is_err());
        assert!(chunk_count(100, 10, 11, TailMode::Pad).is_err());
    }

    #[test]
    fn test_output_length() {
        assert_eq!(output_length(4, 30, 15), 90);
        assert_eq!(output_length(0, 30, 15), 30);
    }
}
