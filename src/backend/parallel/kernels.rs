//! Row-parallel kernels
//!
//! Each kernel fills its output in row chunks of at least `min_rows` rows.
//! Reductions compute per-row partials in parallel and then combine them
//! sequentially in row order, so repeated runs are bit-identical regardless of
//! thread count.

use crate::backend::reference::kernels::non_positive_gram;
use crate::dtype::{Complex128, ComplexElement};
use crate::error::{Error, Result};
use num_traits::{Float, Zero};
use rand::Rng;
use rayon::prelude::*;
use std::f64::consts::TAU;

/// Fill a row-major `out` with `f(row_index, row)`, `min_rows` rows per task
fn fill_rows<T, F>(out: &mut [T], cols: usize, min_rows: usize, f: F)
where
    T: ComplexElement,
    F: Fn(usize, &mut [T]) + Sync,
{
    if cols == 0 || out.is_empty() {
        return;
    }
    let min_rows = min_rows.max(1);
    out.par_chunks_mut(cols * min_rows)
        .enumerate()
        .for_each(|(chunk, rows)| {
            for (offset, row) in rows.chunks_mut(cols).enumerate() {
                f(chunk * min_rows + offset, row);
            }
        });
}

/// Dense `(m × k) · (k × n)` product, i-k-j order per row
pub(crate) fn matmul<T: ComplexElement>(
    a: &[T],
    b: &[T],
    (m, k, n): (usize, usize, usize),
    min_rows: usize,
) -> Vec<T> {
    let mut out = vec![T::zero(); m * n];
    fill_rows(&mut out, n, min_rows, |i, row| {
        for p in 0..k {
            let aip = a[i * k + p];
            let b_row = &b[p * n..(p + 1) * n];
            for (o, &bpj) in row.iter_mut().zip(b_row) {
                *o += aip * bpj;
            }
        }
    });
    out
}

/// Conjugate transpose of a `rows × cols` matrix
pub(crate) fn conj_transpose<T: ComplexElement>(
    a: &[T],
    rows: usize,
    cols: usize,
    min_rows: usize,
) -> Vec<T> {
    let mut out = vec![T::zero(); rows * cols];
    fill_rows(&mut out, rows, min_rows, |j, row| {
        for (i, o) in row.iter_mut().enumerate() {
            *o = a[i * cols + j].conj();
        }
    });
    out
}

/// `Re(trace(a · b)) = Σ_i Σ_k Re(a_ik · b_ki)` without forming the product
pub(crate) fn product<T: ComplexElement>(a: &[T], b: &[T], n: usize, min_rows: usize) -> f64 {
    let partials: Vec<T::Real> = (0..n)
        .into_par_iter()
        .with_min_len(min_rows.max(1))
        .map(|i| {
            let mut acc = T::Real::zero();
            for k in 0..n {
                let x = a[i * n + k];
                let y = b[k * n + i];
                acc = acc + (x.re() * y.re() - x.im() * y.im());
            }
            acc
        })
        .collect();
    T::real_to_f64(partials.into_iter().fold(T::Real::zero(), |s, x| s + x))
}

/// Multiply every element by the reciprocal of the vector's Euclidean norm
pub(crate) fn normalize_vector<T: ComplexElement>(data: &[T], min_rows: usize) -> Result<Vec<T>> {
    let chunk = 64 * min_rows.max(1);
    let partials: Vec<T::Real> = data
        .par_chunks(chunk)
        .map(|c| c.iter().fold(T::Real::zero(), |s, z| s + z.norm_sqr()))
        .collect();
    let norm = partials
        .into_iter()
        .fold(T::Real::zero(), |s, x| s + x)
        .sqrt();
    if norm.is_zero() || !norm.is_finite() {
        return Err(Error::invalid_argument(
            "value",
            format!("cannot normalize, norm is {:e}", T::real_to_f64(norm)),
        ));
    }
    let inv = norm.recip();
    Ok(data.par_iter().map(|z| z.scale(inv)).collect())
}

/// `M_ij · Re((M · conj(M))_ij)^{-1/2}`, conjugating per element
///
/// The Gram-like product is formed row-parallel and every element is then
/// scaled by a reciprocal square root instead of divided.
pub(crate) fn normalize_matrix<T: ComplexElement>(
    m: &[T],
    n: usize,
    min_rows: usize,
) -> Result<Vec<T>> {
    let conj: Vec<T> = m.par_iter().map(|z| z.conj()).collect();
    let gram = matmul(m, &conj, (n, n, n), min_rows);
    let bad = gram.par_iter().position_first(|g| {
        let re = g.re();
        re <= T::Real::zero() || !re.is_finite()
    });
    if let Some(idx) = bad {
        return Err(non_positive_gram(idx, n, T::real_to_f64(gram[idx].re())));
    }
    Ok(m.par_iter()
        .zip(&gram)
        .map(|(z, g)| z.scale(g.re().sqrt().recip()))
        .collect())
}

/// `P[i][j] = v_i · conj(v_j)`
pub(crate) fn project<T: ComplexElement>(v: &[T], min_rows: usize) -> Vec<T> {
    let n = v.len();
    let mut out = vec![T::zero(); n * n];
    fill_rows(&mut out, n, min_rows, |i, row| {
        let vi = v[i];
        for (o, &vj) in row.iter_mut().zip(v) {
            *o = vi * vj.conj();
        }
    });
    out
}

/// Kronecker product, one output row per task
pub(crate) fn kronecker<T: ComplexElement>(
    a: &[T],
    (ra, ca): (usize, usize),
    b: &[T],
    (rb, cb): (usize, usize),
    min_rows: usize,
) -> Vec<T> {
    let cols = ca * cb;
    let mut out = vec![T::zero(); ra * rb * cols];
    fill_rows(&mut out, cols, min_rows, |r, row| {
        let (i1, i2) = (r / rb, r % rb);
        let b_row = &b[i2 * cb..(i2 + 1) * cb];
        for j1 in 0..ca {
            let x = a[i1 * ca + j1];
            for (o, &y) in row[j1 * cb..(j1 + 1) * cb].iter_mut().zip(b_row) {
                *o = x * y;
            }
        }
    });
    out
}

/// `u · rho · u†` for `n × n` operands
pub(crate) fn rotate<T: ComplexElement>(rho: &[T], u: &[T], n: usize, min_rows: usize) -> Vec<T> {
    let u_dagger = conj_transpose(u, n, n, min_rows);
    let tmp = matmul(rho, &u_dagger, (n, n, n), min_rows);
    matmul(u, &tmp, (n, n, n), min_rows)
}

/// Place `value` on the block diagonal of `I_lead ⊗ value ⊗ I_trail`
///
/// Row `r` decomposes as `(block, i, t)` with `r = (block * n + i) * trail + t`;
/// its non-zeros are `value[i][j]` at columns `(block * n + j) * trail + t`.
/// No arithmetic touches the values, so the result is an exact copy.
pub(crate) fn expand<T: ComplexElement>(
    value: &[T],
    n: usize,
    lead: usize,
    trail: usize,
    min_rows: usize,
) -> Vec<T> {
    let side = lead * n * trail;
    let mut out = vec![T::zero(); side * side];
    fill_rows(&mut out, side, min_rows, |r, row| {
        let t = r % trail;
        let rest = r / trail;
        let (block, i) = (rest / n, rest % n);
        for j in 0..n {
            row[(block * n + j) * trail + t] = value[i * n + j];
        }
    });
    out
}

/// One standard complex normal from two uniforms (polar Box-Muller)
fn complex_normal<T: ComplexElement, R: Rng>(rng: &mut R) -> T {
    let u: f64 = rng.random();
    let theta: f64 = TAU * rng.random::<f64>();
    // 1 - u lies in (0, 1], so the log stays finite
    let r = (-2.0 * (1.0 - u).ln()).sqrt();
    T::from_f64_parts(r * theta.cos(), r * theta.sin())
}

/// Unit vector from i.i.d. complex normals, drawn with polar sampling
fn haar_row<T: ComplexElement, R: Rng>(row: &mut [T], rng: &mut R) {
    loop {
        let mut sum = T::Real::zero();
        for z in row.iter_mut() {
            *z = complex_normal(rng);
            sum = sum + z.norm_sqr();
        }
        let norm = sum.sqrt();
        if !norm.is_zero() && norm.is_finite() {
            let inv = norm.recip();
            for z in row.iter_mut() {
                *z = z.scale(inv);
            }
            return;
        }
    }
}

/// Haar-random unit vector
pub(crate) fn haar_vector<T: ComplexElement>(depth: usize) -> Vec<T> {
    let mut out = vec![T::zero(); depth];
    haar_row(&mut out, &mut rand::rng());
    out
}

/// `count` independent Haar rows, drawn in parallel on per-thread RNGs
pub(crate) fn haar_rows<T: ComplexElement>(count: usize, depth: usize, min_rows: usize) -> Vec<T> {
    let mut out = vec![T::zero(); count * depth];
    fill_rows(&mut out, depth, min_rows, |_, row| {
        haar_row(row, &mut rand::rng());
    });
    out
}

/// `U_ij = δ_ij + (e^{iα} - 1) · v_i · conj(v_j)`
pub(crate) fn unitary_from_axis<T: ComplexElement>(v: &[T], alpha: f64, min_rows: usize) -> Vec<T> {
    let n = v.len();
    let rotation = Complex128::from_polar(1.0, alpha) - Complex128::ONE;
    let phase = T::from_f64_parts(rotation.re, rotation.im);
    let mut out = vec![T::zero(); n * n];
    fill_rows(&mut out, n, min_rows, |i, row| {
        let scaled = phase * v[i];
        for (j, o) in row.iter_mut().enumerate() {
            *o = scaled * v[j].conj();
            if i == j {
                *o += T::one();
            }
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex128;

    fn ramp(n: usize) -> Vec<Complex128> {
        (0..n)
            .map(|i| Complex128::new(i as f64 * 0.5 - 1.0, 1.0 / (i as f64 + 1.0)))
            .collect()
    }

    #[test]
    fn test_fill_rows_covers_every_row() {
        for min_rows in [1, 2, 3, 100] {
            let mut out = vec![Complex128::ZERO; 7 * 3];
            fill_rows(&mut out, 3, min_rows, |r, row| {
                for z in row.iter_mut() {
                    *z = Complex128::new(r as f64, 0.0);
                }
            });
            for (idx, z) in out.iter().enumerate() {
                assert_eq!(z.re, (idx / 3) as f64, "min_rows {min_rows}");
            }
        }
    }

    #[test]
    fn test_conj_transpose_rectangular() {
        let a = ramp(6);
        let t = conj_transpose(&a, 2, 3, 1);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(t[j * 2 + i], a[i * 3 + j].conj());
            }
        }
    }

    #[test]
    fn test_expand_matches_kronecker_definition() {
        let n = 2;
        let value = ramp(n * n);
        let (lead, trail) = (3, 2);
        let out = expand(&value, n, lead, trail, 2);
        let side = lead * n * trail;
        // I_3 ⊗ (value ⊗ I_2)
        let inner = kronecker(&value, (n, n), &identity(trail), (trail, trail), 1);
        let full = kronecker(&identity(lead), (lead, lead), &inner, (n * trail, n * trail), 1);
        assert_eq!(out.len(), side * side);
        assert_eq!(out, full);
    }

    fn identity(n: usize) -> Vec<Complex128> {
        let mut out = vec![Complex128::ZERO; n * n];
        for i in 0..n {
            out[i * n + i] = Complex128::ONE;
        }
        out
    }

    #[test]
    fn test_normalize_matrix_matches_reference_kernel() {
        let n = 6;
        let m: Vec<Complex128> = (0..n * n)
            .map(|i| Complex128::new(0.1 + (i % 7) as f64 * 0.13, 0.05 * (i % 5) as f64))
            .collect();
        let expected = crate::backend::reference::kernels::normalize_matrix(&m, n).unwrap();
        for min_rows in [1, 4] {
            let out = normalize_matrix(&m, n, min_rows).unwrap();
            for (a, b) in out.iter().zip(&expected) {
                assert!((*a - *b).magnitude() < 1e-14);
            }
        }

        let singular = vec![Complex128::ZERO; 4];
        assert!(matches!(
            normalize_matrix(&singular, 2, 1),
            Err(Error::InvalidArgument { arg: "value", .. })
        ));
    }

    #[test]
    fn test_haar_rows_are_unit() {
        let rows = haar_rows::<Complex128>(50, 5, 4);
        for row in rows.chunks(5) {
            let norm: f64 = row.iter().map(|z| z.magnitude_squared()).sum();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }
}
