//! SequenceChain instruction data encoders.
//!
//! Layouts are an instruction id followed by little-endian arguments.
//! Strings are a `u32` length prefix plus UTF-8 bytes; options are a 0/1 tag
//! byte followed by the value when present.

use crate::error::ValidationError;
use crate::transaction::VoteChoice;

const SYSTEM_TRANSFER: u32 = 2;
const TOKEN_TRANSFER: u8 = 3;
const TOKEN_MINT_TO: u8 = 7;
const TOKEN_BURN: u8 = 8;
const GOVERNANCE_CREATE_PROPOSAL: u8 = 0;
const GOVERNANCE_CAST_VOTE: u8 = 1;

fn put_str(out: &mut Vec<u8>, value: &str) -> Result<(), ValidationError> {
    let len = u32::try_from(value.len())
        .map_err(|_| ValidationError::Invalid("string argument too long".to_string()))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

/// System program transfer: `u32 2 ‖ u64 lamports`.
pub fn system_transfer(lamports: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data
}

fn token_instruction(id: u8, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(9);
    data.push(id);
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

pub fn token_transfer(amount: u64) -> Vec<u8> {
    token_instruction(TOKEN_TRANSFER, amount)
}

pub fn token_mint_to(amount: u64) -> Vec<u8> {
    token_instruction(TOKEN_MINT_TO, amount)
}

pub fn token_burn(amount: u64) -> Vec<u8> {
    token_instruction(TOKEN_BURN, amount)
}

/// `0 ‖ str title ‖ str description ‖ i64 start ‖ i64 end`.
pub fn create_proposal(
    title: &str,
    description: &str,
    voting_start: u64,
    voting_end: u64,
) -> Result<Vec<u8>, ValidationError> {
    let to_i64 = |value: u64| {
        i64::try_from(value)
            .map_err(|_| ValidationError::Invalid(format!("timestamp {} out of range", value)))
    };

    let mut data = vec![GOVERNANCE_CREATE_PROPOSAL];
    put_str(&mut data, title)?;
    put_str(&mut data, description)?;
    data.extend_from_slice(&to_i64(voting_start)?.to_le_bytes());
    data.extend_from_slice(&to_i64(voting_end)?.to_le_bytes());
    Ok(data)
}

/// `1 ‖ u64 proposal id ‖ u8 choice ‖ option<str> reason`.
pub fn cast_vote(
    proposal_id: u64,
    choice: VoteChoice,
    reason: Option<&str>,
) -> Result<Vec<u8>, ValidationError> {
    let mut data = vec![GOVERNANCE_CAST_VOTE];
    data.extend_from_slice(&proposal_id.to_le_bytes());
    data.push(choice.code());
    match reason {
        Some(reason) => {
            data.push(1);
            put_str(&mut data, reason)?;
        }
        None => data.push(0),
    }
    Ok(data)
}
