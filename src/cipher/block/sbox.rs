//! Derives the AES forward and inverse substitution boxes from
//! [field inversion](super::gf256::gf_inv) and a fixed affine transform.
//!
//! Rather than embedding the 256-entry S-box as a literal table (as most AES
//! implementations do, for speed), this builds it the way FIPS-197 Section
//! 5.1.1 defines it: take the multiplicative inverse of each byte in
//! $GF(2^8)$, then apply an affine transformation over $GF(2)$.

use {crate::cipher::block::gf256::gf_inv, docext::docext, std::sync::OnceLock};

/// The constant added by the affine transform, $\mathrm{63}_{16}$.
const AFFINE_CONST: u8 = 0x63;

/// Forward and inverse S-boxes, computed once and cached.
static SBOX: OnceLock<([u8; 256], [u8; 256])> = OnceLock::new();

/// Return `(forward, inverse)` S-boxes, building them on first use.
pub fn sbox() -> &'static ([u8; 256], [u8; 256]) {
    SBOX.get_or_init(build_sbox)
}

/// Build the forward and inverse S-boxes.
///
/// For each byte $x$, the forward entry is
///
/// $$
/// S(x) = \mathrm{affine}(\mathrm{gf\_inv}(x))
/// $$
///
/// The inverse table is filled by inverting the mapping: `inverse[S(x)] = x`
/// for every `x`. Because `S` is a bijection on bytes, every entry of
/// `inverse` is written exactly once.
#[docext]
fn build_sbox() -> ([u8; 256], [u8; 256]) {
    let mut forward = [0u8; 256];
    for (x, slot) in forward.iter_mut().enumerate() {
        *slot = affine(gf_inv(x as u8));
    }
    let mut inverse = [0u8; 256];
    for (x, &y) in forward.iter().enumerate() {
        inverse[y as usize] = x as u8;
    }
    (forward, inverse)
}

/// The affine transformation from FIPS-197 Section 5.1.1, applied to the
/// field inverse to produce an S-box entry.
///
/// Treating `x` as a column vector of 8 bits $x_0 \dots x_7$ (bit 0 least
/// significant), the transformed bit $i$ is
///
/// $$
/// y_i = x_i \oplus x_{(i+4) \bmod 8} \oplus x_{(i+5) \bmod 8} \oplus
/// x_{(i+6) \bmod 8} \oplus x_{(i+7) \bmod 8} \oplus c_i
/// $$
///
/// where $c = \mathrm{63}_{16}$.
#[docext]
fn affine(x: u8) -> u8 {
    let mut y = 0u8;
    for i in 0..8u32 {
        let b = bit_at(x, i)
            ^ bit_at(x, (i + 4) % 8)
            ^ bit_at(x, (i + 5) % 8)
            ^ bit_at(x, (i + 6) % 8)
            ^ bit_at(x, (i + 7) % 8)
            ^ bit_at(AFFINE_CONST, i);
        y |= b << i;
    }
    y
}

fn bit_at(v: u8, i: u32) -> u8 {
    (v >> i) & 1
}
