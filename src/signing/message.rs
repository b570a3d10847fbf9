//! SequenceChain legacy message layout.
//!
//! ```text
//! header          [required signatures, read-only signed, read-only unsigned]
//! account keys    compact-u16 count ‖ 32-byte keys
//! blockhash       32 bytes
//! instructions    compact-u16 count ‖ (program index ‖ compact-u16 accounts ‖ indices
//!                                      ‖ compact-u16 data length ‖ data)
//! ```

use crate::crypto::encoding::decode_base58_32;
use crate::error::SigningError;
use crate::transaction::SequenceTxBody;

/// Append `value` as a compact-u16: 7 bits per byte, low bits first, high bit
/// set on every byte but the last.
pub fn put_compact_u16(out: &mut Vec<u8>, value: usize) -> Result<(), SigningError> {
    let mut rem = u16::try_from(value).map_err(|_| {
        SigningError::EncodingFailure(format!("length {} does not fit compact-u16", value))
    })?;
    loop {
        let byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return Ok(());
        }
        out.push(byte | 0x80);
    }
}

fn key(field: &str, value: &str) -> Result<[u8; 32], SigningError> {
    decode_base58_32(value).ok_or_else(|| {
        SigningError::EncodingFailure(format!("{} '{}' is not a 32-byte Base58 key", field, value))
    })
}

/// Serialize the message that gets signed.
///
/// Accounts are ordered fee payer, recipient, token, program with duplicates
/// removed. Only the fee payer signs; the program is the only read-only
/// account.
pub fn compile(body: &SequenceTxBody) -> Result<Vec<u8>, SigningError> {
    let program = key("program_id", &body.program_id)?;
    let mut keys = vec![key("from", &body.from)?];
    for (field, value) in [("to", &body.to), ("token", &body.token)] {
        if let Some(value) = value {
            let k = key(field, value)?;
            if !keys.contains(&k) && k != program {
                keys.push(k);
            }
        }
    }
    let instruction_accounts: Vec<u8> = (0..keys.len() as u8).collect();
    let program_index = keys.len() as u8;
    keys.push(program);

    let blockhash = key("recent_blockhash", &body.recent_blockhash)?;

    let mut out = Vec::with_capacity(3 + 1 + keys.len() * 32 + 32 + 8 + body.data.len());
    out.extend_from_slice(&[1, 0, 1]);
    put_compact_u16(&mut out, keys.len())?;
    for k in &keys {
        out.extend_from_slice(k);
    }
    out.extend_from_slice(&blockhash);

    put_compact_u16(&mut out, 1)?;
    out.push(program_index);
    put_compact_u16(&mut out, instruction_accounts.len())?;
    out.extend_from_slice(&instruction_accounts);
    put_compact_u16(&mut out, body.data.len())?;
    out.extend_from_slice(&body.data);
    Ok(out)
}
