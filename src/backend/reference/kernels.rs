//! Naive single-threaded kernels
//!
//! Every kernel is the plain definition, evaluated in a fixed order with
//! plain loops. These are the ground truth the parallel kernels are compared
//! against, so clarity wins over speed here.

use crate::dtype::{Complex128, ComplexElement};
use crate::error::{Error, Result};
use num_traits::{Float, Zero};
use rand::Rng;
use rand_distr::StandardNormal;

/// Dense `(m × k) · (k × n)` product
pub(crate) fn matmul<T: ComplexElement>(a: &[T], b: &[T], m: usize, k: usize, n: usize) -> Vec<T> {
    let mut out = vec![T::zero(); m * n];
    for i in 0..m {
        for j in 0..n {
            let mut acc = T::zero();
            for p in 0..k {
                acc += a[i * k + p] * b[p * n + j];
            }
            out[i * n + j] = acc;
        }
    }
    out
}

/// Conjugate transpose of a `rows × cols` matrix
pub(crate) fn conj_transpose<T: ComplexElement>(a: &[T], rows: usize, cols: usize) -> Vec<T> {
    let mut out = vec![T::zero(); rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            out[j * rows + i] = a[i * cols + j].conj();
        }
    }
    out
}

/// `Re(trace(a · b))`, forming the full product first
pub(crate) fn product<T: ComplexElement>(a: &[T], b: &[T], n: usize) -> f64 {
    let ab = matmul(a, b, n, n, n);
    let mut trace = T::Real::zero();
    for i in 0..n {
        trace = trace + ab[i * n + i].re();
    }
    T::real_to_f64(trace)
}

/// Divide every element by the Euclidean norm of the vector
pub(crate) fn normalize_vector<T: ComplexElement>(data: &[T]) -> Result<Vec<T>> {
    let mut sum = T::Real::zero();
    for z in data {
        sum = sum + z.norm_sqr();
    }
    let norm = sum.sqrt();
    if norm.is_zero() || !norm.is_finite() {
        return Err(Error::invalid_argument(
            "value",
            format!("cannot normalize, norm is {:e}", T::real_to_f64(norm)),
        ));
    }
    Ok(data
        .iter()
        .map(|z| T::new(z.re() / norm, z.im() / norm))
        .collect())
}

/// Element-wise matrix normalization of an `n × n` matrix
///
/// With `G = M · conj(M)`, where the conjugate is taken per element and not
/// transposed, every output element is `M_ij / sqrt(Re(G_ij))`. For a vector
/// the same product collapses to `Σ|v_k|²`, which is why the two cases share
/// one operation.
pub(crate) fn normalize_matrix<T: ComplexElement>(m: &[T], n: usize) -> Result<Vec<T>> {
    let conj: Vec<T> = m.iter().map(|z| z.conj()).collect();
    let gram = matmul(m, &conj, n, n, n);
    let mut out = Vec::with_capacity(m.len());
    for (idx, (z, g)) in m.iter().zip(&gram).enumerate() {
        let scale = g.re().sqrt();
        if scale.is_zero() || !scale.is_finite() {
            return Err(non_positive_gram(idx, n, T::real_to_f64(g.re())));
        }
        out.push(T::new(z.re() / scale, z.im() / scale));
    }
    Ok(out)
}

/// The error for a `Re(G_ij)` with no real positive square root
pub(crate) fn non_positive_gram(idx: usize, n: usize, value: f64) -> Error {
    Error::invalid_argument(
        "value",
        format!(
            "cannot normalize, Re((M·conj(M))[{}][{}]) is {value:e}",
            idx / n,
            idx % n
        ),
    )
}

/// `P[i][j] = v_i · conj(v_j)`
pub(crate) fn project<T: ComplexElement>(v: &[T]) -> Vec<T> {
    let n = v.len();
    let mut out = vec![T::zero(); n * n];
    for i in 0..n {
        for j in 0..n {
            out[i * n + j] = v[i] * v[j].conj();
        }
    }
    out
}

/// Kronecker product of an `ra × ca` and an `rb × cb` matrix
pub(crate) fn kronecker<T: ComplexElement>(
    a: &[T],
    (ra, ca): (usize, usize),
    b: &[T],
    (rb, cb): (usize, usize),
) -> Vec<T> {
    let cols = ca * cb;
    let mut out = vec![T::zero(); ra * rb * cols];
    for i1 in 0..ra {
        for j1 in 0..ca {
            let x = a[i1 * ca + j1];
            for i2 in 0..rb {
                for j2 in 0..cb {
                    out[(i1 * rb + i2) * cols + j1 * cb + j2] = x * b[i2 * cb + j2];
                }
            }
        }
    }
    out
}

/// `u · rho · u†` for `n × n` operands
pub(crate) fn rotate<T: ComplexElement>(rho: &[T], u: &[T], n: usize) -> Vec<T> {
    let u_dagger = conj_transpose(u, n, n);
    let tmp = matmul(rho, &u_dagger, n, n, n);
    matmul(u, &tmp, n, n, n)
}

/// Row-major identity of side `n`
pub(crate) fn identity<T: ComplexElement>(n: usize) -> Vec<T> {
    let mut out = vec![T::zero(); n * n];
    for i in 0..n {
        out[i * n + i] = T::one();
    }
    out
}

/// `I_lead ⊗ value ⊗ I_trail` via two explicit Kronecker products
pub(crate) fn expand<T: ComplexElement>(value: &[T], n: usize, lead: usize, trail: usize) -> Vec<T> {
    let left = kronecker(&identity::<T>(lead), (lead, lead), value, (n, n));
    let side = lead * n;
    kronecker(&left, (side, side), &identity::<T>(trail), (trail, trail))
}

/// Haar-random unit vector: i.i.d. standard complex normals, normalized
pub(crate) fn haar_vector<T: ComplexElement, R: Rng>(depth: usize, rng: &mut R) -> Vec<T> {
    loop {
        let raw: Vec<T> = (0..depth)
            .map(|_| {
                let re: f64 = rng.sample(StandardNormal);
                let im: f64 = rng.sample(StandardNormal);
                T::from_f64_parts(re, im)
            })
            .collect();
        // An all-zero draw has probability zero but cannot be normalized.
        if let Ok(unit) = normalize_vector(&raw) {
            return unit;
        }
    }
}

/// `I + (e^{iα} - 1) |v⟩⟨v|` for a unit vector `v`
pub(crate) fn unitary_from_axis<T: ComplexElement>(v: &[T], alpha: f64) -> Vec<T> {
    let n = v.len();
    let rotation = Complex128::from_polar(1.0, alpha) - Complex128::ONE;
    let phase = T::from_f64_parts(rotation.re, rotation.im);
    let projector = project(v);
    let mut out = identity::<T>(n);
    for (o, p) in out.iter_mut().zip(&projector) {
        *o += phase * *p;
    }
    out
}
