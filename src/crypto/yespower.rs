//! yespower 0.5 memory-hard hash
//!
//! An scrypt derivative: PBKDF2-HMAC-SHA256 expands the input into a
//! `128 * r` byte block, a sequential memory-hard mix over `N` such blocks
//! scrambles it, and PBKDF2 folds it back to 32 bytes. The inner block
//! function is pwxform, a multiply/add/xor round over two 4 KiB S-boxes
//! that are filled with Salsa20/8 output at the start of every hash.
//!
//! Words inside the mixing loops are kept in Salsa20's SIMD lane order
//! (word `i` of a 64-byte block stored at `i * 5 % 16`). pwxform reads the
//! shuffled layout, so the order is part of the hash definition.

use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SALSA20_ROUNDS: usize = 8;

const PWX_SIMPLE: usize = 2;
const PWX_GATHER: usize = 4;
const PWX_ROUNDS: usize = 6;
const PWX_WORDS: usize = PWX_GATHER * PWX_SIMPLE * 2;

const SWIDTH: u32 = 8;
/// Words in one S-box (`2^Swidth` entries of `PWX_SIMPLE` 64-bit lanes)
const SBOX_WORDS: usize = (1 << SWIDTH) * PWX_SIMPLE * 2;
/// Byte-offset mask selecting an S-box entry
const SMASK: u32 = ((1 << SWIDTH) - 1) * (PWX_SIMPLE as u32) * 8;

const BLOCK_WORDS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YespowerError {
    #[error("N = {0} must be a power of two in 1024..=524288")]
    InvalidN(u32),
    #[error("r = {0} must be in 8..=32")]
    InvalidR(u32),
    #[error("hmac: {0}")]
    Hmac(String),
}

/// Work-memory factor `n` and block-size factor `r`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YespowerParams {
    pub n: u32,
    pub r: u32,
}

impl YespowerParams {
    pub fn validate(&self) -> Result<(), YespowerError> {
        if !(1024..=512 * 1024).contains(&self.n) || !self.n.is_power_of_two() {
            return Err(YespowerError::InvalidN(self.n));
        }
        if !(8..=32).contains(&self.r) {
            return Err(YespowerError::InvalidR(self.r));
        }
        Ok(())
    }
}

/// yespower 0.5 of `input`.
///
/// With `pers` set, the PBKDF2 output is additionally keyed over it:
/// `SHA256(HMAC-SHA256(out, pers))`.
pub fn yespower_hash(input: &[u8], params: &YespowerParams, pers: Option<&[u8]>) -> Result<[u8; 32], YespowerError> {
    params.validate()?;
    let r = params.r as usize;
    let n = params.n as usize;

    let digest = Sha256::digest(input);
    let mut expanded = vec![0u8; 128 * r];
    pbkdf2_hmac::<Sha256>(&digest, input, 1, &mut expanded);

    let mut key = [0u8; 32];
    key.copy_from_slice(&expanded[..32]);

    let mut b: Vec<u32> = expanded
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect();
    smix(&mut b, r, n);

    let mixed: Vec<u8> = b.iter().flat_map(|w| w.to_le_bytes()).collect();
    let mut out = [0u8; 32];
    pbkdf2_hmac::<Sha256>(&key, &mixed, 1, &mut out);

    if let Some(pers) = pers {
        let keyed = HmacSha256::new_from_slice(&out)
            .map_err(|e| YespowerError::Hmac(e.to_string()))?
            .chain_update(pers)
            .finalize()
            .into_bytes();
        out.copy_from_slice(&Sha256::digest(keyed));
    }
    Ok(out)
}

fn salsa20(b: &mut [u32]) {
    let mut x = [0u32; 16];
    for (i, word) in b.iter().enumerate().take(16) {
        x[i * 5 % 16] = *word;
    }

    for _ in (0..SALSA20_ROUNDS).step_by(2) {
        // columns
        quarter_round(&mut x, 0, 4, 8, 12);
        quarter_round(&mut x, 5, 9, 13, 1);
        quarter_round(&mut x, 10, 14, 2, 6);
        quarter_round(&mut x, 15, 3, 7, 11);
        // rows
        quarter_round(&mut x, 0, 1, 2, 3);
        quarter_round(&mut x, 5, 6, 7, 4);
        quarter_round(&mut x, 10, 11, 8, 9);
        quarter_round(&mut x, 15, 12, 13, 14);
    }

    for (i, word) in b.iter_mut().enumerate().take(16) {
        *word = word.wrapping_add(x[i * 5 % 16]);
    }
}

fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[b] ^= x[a].wrapping_add(x[d]).rotate_left(7);
    x[c] ^= x[b].wrapping_add(x[a]).rotate_left(9);
    x[d] ^= x[c].wrapping_add(x[b]).rotate_left(13);
    x[a] ^= x[d].wrapping_add(x[c]).rotate_left(18);
}

fn xor_into(dst: &mut [u32], src: &[u32]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

/// scrypt's BlockMix with r = 1, used to fill the S-boxes
fn blockmix_salsa(b: &mut [u32]) {
    let mut x = [0u32; BLOCK_WORDS];
    x.copy_from_slice(&b[BLOCK_WORDS..2 * BLOCK_WORDS]);
    for i in 0..2 {
        let block = &mut b[i * BLOCK_WORDS..(i + 1) * BLOCK_WORDS];
        xor_into(&mut x, block);
        salsa20(&mut x);
        block.copy_from_slice(&x);
    }
}

struct Pwxform {
    sbox: Vec<u32>,
}

impl Pwxform {
    fn transform(&self, x: &mut [u32]) {
        let (s0, s1) = self.sbox.split_at(SBOX_WORDS);
        for _ in 0..PWX_ROUNDS {
            for j in 0..PWX_GATHER {
                let lane = j * PWX_SIMPLE * 2;
                let p0 = (x[lane] & SMASK) as usize / 4;
                let p1 = (x[lane + 1] & SMASK) as usize / 4;
                for k in 0..PWX_SIMPLE {
                    let lo = lane + k * 2;
                    let a = u64::from(s0[p0 + k * 2]) | u64::from(s0[p0 + k * 2 + 1]) << 32;
                    let b = u64::from(s1[p1 + k * 2]) | u64::from(s1[p1 + k * 2 + 1]) << 32;
                    let v = (u64::from(x[lo + 1]) * u64::from(x[lo])).wrapping_add(a) ^ b;
                    x[lo] = v as u32;
                    x[lo + 1] = (v >> 32) as u32;
                }
            }
        }
    }

    fn blockmix(&self, b: &mut [u32], r: usize) {
        let r1 = 2 * r;
        let mut x = [0u32; PWX_WORDS];
        x.copy_from_slice(&b[(r1 - 1) * PWX_WORDS..r1 * PWX_WORDS]);
        for i in 0..r1 {
            let block = &mut b[i * PWX_WORDS..(i + 1) * PWX_WORDS];
            if r1 > 1 {
                xor_into(&mut x, block);
            }
            self.transform(&mut x);
            block.copy_from_slice(&x);
        }
        salsa20(&mut b[(r1 - 1) * BLOCK_WORDS..r1 * BLOCK_WORDS]);
    }
}

fn integerify(x: &[u32], r: usize) -> u32 {
    x[(2 * r - 1) * BLOCK_WORDS]
}

/// Map `x` into `0..i`, favouring recently written blocks
fn wrap(x: u32, i: u32) -> u32 {
    let n = 1u32 << (31 - i.leading_zeros());
    (x & (n - 1)) + (i - n)
}

fn to_lanes(b: &[u32], r: usize) -> Vec<u32> {
    let mut x = vec![0u32; 32 * r];
    for k in 0..2 * r {
        for i in 0..16 {
            x[k * 16 + i] = b[k * 16 + (i * 5 % 16)];
        }
    }
    x
}

fn from_lanes(x: &[u32], b: &mut [u32], r: usize) {
    for k in 0..2 * r {
        for i in 0..16 {
            b[k * 16 + (i * 5 % 16)] = x[k * 16 + i];
        }
    }
}

/// First SMix loop: fill `v` sequentially. Without a pwxform context the
/// block function is Salsa20/8 and `v` becomes the S-boxes.
fn smix1(b: &mut [u32], r: usize, n: usize, v: &mut [u32], pwx: Option<&Pwxform>) {
    let s = 32 * r;
    let mut x = to_lanes(b, r);
    for i in 0..n {
        v[i * s..(i + 1) * s].copy_from_slice(&x);
        if i > 1 {
            let j = wrap(integerify(&x, r), i as u32) as usize;
            xor_into(&mut x, &v[j * s..(j + 1) * s]);
        }
        match pwx {
            Some(pwx) => pwx.blockmix(&mut x, r),
            None => blockmix_salsa(&mut x),
        }
    }
    from_lanes(&x, b, r);
}

/// Second SMix loop: data-dependent reads, written back unless `nloop == 2`
fn smix2(b: &mut [u32], r: usize, n: usize, nloop: usize, v: &mut [u32], pwx: &Pwxform) {
    let s = 32 * r;
    let mut x = to_lanes(b, r);
    for _ in 0..nloop {
        let j = (integerify(&x, r) as usize) & (n - 1);
        let slot = &mut v[j * s..(j + 1) * s];
        xor_into(&mut x, slot);
        if nloop != 2 {
            slot.copy_from_slice(&x);
        }
        pwx.blockmix(&mut x, r);
    }
    from_lanes(&x, b, r);
}

fn smix(b: &mut [u32], r: usize, n: usize) {
    let third = (n + 2) / 3;
    let nloop_all = (third + 1) & !1;
    let nloop_rw = third & !1;

    let mut sbox = vec![0u32; 2 * SBOX_WORDS];
    let sbox_blocks = sbox.len() / 32;
    smix1(&mut b[..32], 1, sbox_blocks, &mut sbox, None);
    let pwx = Pwxform { sbox };

    let mut v = vec![0u32; 32 * r * n];
    smix1(b, r, n, &mut v, Some(&pwx));
    smix2(b, r, n, nloop_rw, &mut v, &pwx);
    smix2(b, r, n, nloop_all - nloop_rw, &mut v, &pwx);
}
