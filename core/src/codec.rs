//! Fixed-width posting tuple format shared by every posting block.
//!
//! A tuple is `TUPLE_SIZE` bytes: a big-endian `u32` document id followed by a
//! big-endian term frequency filling the remaining `TF_WIDTH` bytes.

use crate::index::Posting;

pub const TUPLE_SIZE: usize = 6;
pub const TF_WIDTH: usize = TUPLE_SIZE - 4;

pub fn encode_posting(p: &Posting) -> [u8; TUPLE_SIZE] {
    let mut out = [0u8; TUPLE_SIZE];
    out[..4].copy_from_slice(&p.doc_id.to_be_bytes());
    out[4..].copy_from_slice(&p.tf.to_be_bytes());
    out
}

pub fn encode_postings(postings: &[Posting]) -> Vec<u8> {
    let mut out = Vec::with_capacity(postings.len() * TUPLE_SIZE);
    for p in postings {
        out.extend_from_slice(&encode_posting(p));
    }
    out
}

pub fn decode_posting(tuple: &[u8; TUPLE_SIZE]) -> Posting {
    let doc_id = u32::from_be_bytes([tuple[0], tuple[1], tuple[2], tuple[3]]);
    let tf = u16::from_be_bytes([tuple[4], tuple[5]]);
    Posting { doc_id, tf }
}

/// Decode the first `df` tuples of `bytes`. Returns `None` when the buffer is short.
pub fn decode_postings(bytes: &[u8], df: usize) -> Option<Vec<Posting>> {
    let needed = df.checked_mul(TUPLE_SIZE)?;
    if bytes.len() < needed {
        return None;
    }
    let postings = bytes[..needed]
        .chunks_exact(TUPLE_SIZE)
        .map(|chunk| {
            let mut tuple = [0u8; TUPLE_SIZE];
            tuple.copy_from_slice(chunk);
            decode_posting(&tuple)
        })
        .collect();
    Some(postings)
}
