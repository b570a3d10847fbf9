//! Contract ABI used by the AccountChain builder.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::transaction::VoteChoice;

sol! {
    /// Governance token (ERC-20 with admin mint/burn).
    interface IGovernanceToken {
        function transfer(address to, uint256 amount) external returns (bool);
        function mint(address to, uint256 amount) external;
        function burn(uint256 amount) external;
        function balanceOf(address account) external view returns (uint256);
    }

    /// Governor contract. Voting windows are expressed in block numbers.
    interface IGovernor {
        function propose(string title, string description, uint256 startBlock, uint256 endBlock) external returns (uint256);
        function vote(uint256 proposalId, uint8 support) external;
        function voteWithReason(uint256 proposalId, uint8 support, string reason) external;
    }
}

pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    IGovernanceToken::transferCall { to, amount }.abi_encode().into()
}

pub fn encode_mint(to: Address, amount: U256) -> Bytes {
    IGovernanceToken::mintCall { to, amount }.abi_encode().into()
}

pub fn encode_burn(amount: U256) -> Bytes {
    IGovernanceToken::burnCall { amount }.abi_encode().into()
}

pub fn encode_propose(title: &str, description: &str, start_block: u64, end_block: u64) -> Bytes {
    IGovernor::proposeCall {
        title: title.to_string(),
        description: description.to_string(),
        startBlock: U256::from(start_block),
        endBlock: U256::from(end_block),
    }
    .abi_encode()
    .into()
}

/// `voteWithReason` when a non-empty reason is given, `vote` otherwise.
pub fn encode_vote(proposal_id: u64, choice: VoteChoice, reason: Option<&str>) -> Bytes {
    let proposal = U256::from(proposal_id);
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => IGovernor::voteWithReasonCall {
            proposalId: proposal,
            support: choice.code(),
            reason: reason.to_string(),
        }
        .abi_encode()
        .into(),
        None => IGovernor::voteCall {
            proposalId: proposal,
            support: choice.code(),
        }
        .abi_encode()
        .into(),
    }
}
