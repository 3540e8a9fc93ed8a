//! Low-discrepancy Hammersley point sets.
//!
//! For `count` points in `dimension` dimensions, point `i` is
//! `(i / count, Φ₂(i), Φ₃(i), Φ₅(i), ...)`, where `Φ_p` is the radical inverse
//! in the `p`-th prime base (Wong, Luk and Heng, "Sampling with Hammersley and
//! Halton points", 1997, equations 1 to 3).

/// Returns the first `count` prime numbers.
pub fn primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate = 2u64;
    while primes.len() < count {
        if primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0)
        {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Mirrors the base-`base` digits of `index` at the radix point.
pub fn radical_inverse(mut index: u64, base: u64) -> f64 {
    let inverse_base = 1.0 / base as f64;
    let mut factor = inverse_base;
    let mut result = 0.0;
    while index > 0 {
        result += (index % base) as f64 * factor;
        index /= base;
        factor *= inverse_base;
    }
    result
}

/// Generates `count` Hammersley points in `[0, 1)^dimension`.
pub fn hammersley_points(dimension: usize, count: usize) -> Vec<Vec<f64>> {
    if dimension == 0 {
        return vec![Vec::new(); count];
    }
    let bases = primes(dimension - 1);
    (0..count)
        .map(|i| {
            std::iter::once(i as f64 / count as f64)
                .chain(bases.iter().map(|&base| radical_inverse(i as u64, base)))
                .collect()
        })
        .collect()
}
