use ndarray::{Array3, ArrayD, ArrayViewD, Axis, Ix3};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    error::{Result, TopographyError},
    types::Value,
};

// linearly map a number from one range to another
pub fn remap(s: Value, range_in: [Value; 2], range_out: [Value; 2]) -> Value {
    range_out[0] + (s - range_in[0]) * (range_out[1] - range_out[0]) / (range_in[1] - range_in[0])
}

// Linear interpolation
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: Value, end: Value, n: usize) -> Vec<Value> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Value;
            let mut v: Vec<Value> = (0..n).map(|i| start + i as Value * step).collect();
            v[n - 1] = end;
            v
        }
    }
}

/// Index of the value in `axis` closest to `target` (first one on ties).
pub fn nearest_index<'a>(axis: impl IntoIterator<Item = &'a Value>, target: Value) -> Option<usize> {
    axis.into_iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
}

/// Source coordinate sampled by output cell `out_idx`, pixel-center aligned and
/// clamped into the source so that nothing is extrapolated.
///
/// ```text
///  src = (out + 0.5) * in_len / out_len - 0.5
/// ```
#[inline]
fn source_coord(out_idx: usize, in_len: usize, out_len: usize) -> Value {
    let scale = in_len as Value / out_len as Value;
    ((out_idx as Value + 0.5) * scale - 0.5).clamp(0.0, (in_len - 1) as Value)
}

/// Returns the two bracketing source indices and the fractional weight between them.
#[inline]
fn bracket(coord: Value, in_len: usize) -> (usize, usize, Value) {
    let i0 = coord.floor() as usize;
    let i1 = (i0 + 1).min(in_len - 1);
    (i0, i1, coord - i0 as Value)
}

/// Bilinear resize of the first two axes of a 2D `(rows, cols)` or 3D
/// `(rows, cols, channels)` array.
///
/// Values are never clamped or renormalized, so the output stays inside the
/// range of the input. Resizing to the input shape returns the input values.
///
/// Returns [`TopographyError::Dimensionality`] for any other rank and
/// [`TopographyError::EmptyArray`] when either horizontal axis is empty.
pub fn resize(array: ArrayViewD<Value>, rows: usize, cols: usize) -> Result<ArrayD<Value>> {
    let ndim = array.ndim();
    let src = match ndim {
        2 => array.insert_axis(Axis(2)),
        3 => array,
        _ => return Err(TopographyError::Dimensionality { ndim }),
    }
    .into_dimensionality::<Ix3>()?;

    let (in_rows, in_cols, channels) = src.dim();
    if in_rows == 0 || in_cols == 0 {
        return Err(TopographyError::EmptyArray);
    }

    tracing::debug!(in_rows, in_cols, rows, cols, "resizing array");

    // Rows are independent, so each one is computed on its own Rayon task.
    let per_row: Vec<Vec<Value>> = (0..rows)
        .into_par_iter()
        .map(|r| {
            let (r0, r1, fr) = bracket(source_coord(r, in_rows, rows), in_rows);
            let mut local = Vec::with_capacity(cols * channels);
            for c in 0..cols {
                let (c0, c1, fc) = bracket(source_coord(c, in_cols, cols), in_cols);
                for ch in 0..channels {
                    let top = lerp(src[[r0, c0, ch]], src[[r0, c1, ch]], fc);
                    let bot = lerp(src[[r1, c0, ch]], src[[r1, c1, ch]], fc);
                    local.push(lerp(top, bot, fr));
                }
            }
            local
        })
        .collect();

    let data: Vec<Value> = per_row.into_iter().flatten().collect();
    let out = Array3::from_shape_vec((rows, cols, channels), data)?;

    Ok(if ndim == 2 {
        out.remove_axis(Axis(2)).into_dyn()
    } else {
        out.into_dyn()
    })
}
