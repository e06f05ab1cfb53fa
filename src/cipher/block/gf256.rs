//! Arithmetic in $GF(2^8)$, the finite field AES is built on.
//!
//! A byte is viewed as a polynomial of degree at most 7 with coefficients in
//! $GF(2)$, e.g. $\mathrm{01010111}_2 \equiv x^6 + x^4 + x^2 + x + 1$. Addition
//! of two such polynomials is coefficient-wise addition modulo 2, which is
//! exactly a bitwise XOR. Multiplication is polynomial multiplication modulo
//! the AES reduction polynomial
//!
//! $$
//! m(x) = x^8 + x^4 + x^3 + x + 1 \equiv \mathrm{11B}_{16}
//! $$
//!
//! [`gf_mul`], [`gf_pow`], and [`gf_inv`] implement multiplication,
//! exponentiation, and inversion in this field. Everything else in the AES
//! engines — the [S-box](super::sbox), `MixColumns`, the key schedule's round
//! constants — is built from these three functions.

use docext::docext;

/// $m(x) = x^8 + x^4 + x^3 + x + 1$ with the $x^8$ term dropped, since it
/// doesn't fit in a byte and is implied by the overflow of a left shift.
const REDUCTION_POLY: u8 = 0x1B;

/// Multiply `a` and `b` as polynomials in $GF(2^8)$, reduced modulo
/// [`m(x)`](self).
///
/// Uses the shift-and-reduce ("Russian peasant") method: `b` is consumed one
/// bit at a time from the low end. If the current bit is set, `a` (scaled by
/// the current power of $x$) is added to the result. Before moving to the
/// next bit, `a` itself is multiplied by $x$ (a left shift by one), reducing
/// modulo $m(x)$ by XORing with [`REDUCTION_POLY`] whenever the shift would
/// overflow a byte.
#[docext]
pub fn gf_mul(a: u8, b: u8) -> u8 {
    let mut a = a;
    let mut b = b;
    let mut product = 0u8;
    for _ in 0..8 {
        if b & 1 != 0 {
            product ^= a;
        }
        let carry = a & 0x80;
        a <<= 1;
        if carry != 0 {
            a ^= REDUCTION_POLY;
        }
        b >>= 1;
    }
    product
}

/// Raise `a` to the power `exp` in $GF(2^8)$, via binary exponentiation
/// (square-and-multiply).
pub fn gf_pow(a: u8, exp: u32) -> u8 {
    let mut base = a;
    let mut exp = exp;
    let mut result = 1u8;
    while exp != 0 {
        if exp & 1 != 0 {
            result = gf_mul(result, base);
        }
        base = gf_mul(base, base);
        exp >>= 1;
    }
    result
}

/// Multiplicative inverse of `a` in $GF(2^8)$.
///
/// Every nonzero element of a finite field of order $q$ satisfies
/// $a^{q - 1} = 1$, so $a^{-1} = a^{q - 2}$. For $GF(2^8)$, $q - 2 = 254$. By
/// AES convention, the inverse of `0` (which has no true multiplicative
/// inverse) is defined as `0`.
#[docext]
pub fn gf_inv(a: u8) -> u8 {
    if a == 0 {
        0
    } else {
        gf_pow(a, 254)
    }
}
