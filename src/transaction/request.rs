//! Caller-facing transaction requests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blockchain::types::ChainId;
use crate::error::ValidationError;
use crate::transaction::amount::TokenAmount;

/// Kind of operation a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Transfer,
    Mint,
    Burn,
    ProposalCreate,
    Vote,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Transfer => "transfer",
            TransactionType::Mint => "mint",
            TransactionType::Burn => "burn",
            TransactionType::ProposalCreate => "proposal_create",
            TransactionType::Vote => "vote",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Transfer => "Transfer",
            TransactionType::Mint => "Mint",
            TransactionType::Burn => "Burn",
            TransactionType::ProposalCreate => "Proposal creation",
            TransactionType::Vote => "Vote",
        };
        f.write_str(label)
    }
}

/// Governance vote direction. The discriminant is the on-chain code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl VoteChoice {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VoteChoice::Against => "Against",
            VoteChoice::For => "For",
            VoteChoice::Abstain => "Abstain",
        };
        f.write_str(label)
    }
}

impl FromStr for VoteChoice {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "for" | "yes" => Ok(VoteChoice::For),
            "against" | "no" => Ok(VoteChoice::Against),
            "abstain" => Ok(VoteChoice::Abstain),
            other => Err(ValidationError::Invalid(format!(
                "unknown vote choice '{}'",
                other
            ))),
        }
    }
}

/// Optional memo and free-form annotations for a transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Proposal to create. Voting window bounds are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalPayload {
    pub title: String,
    pub description: String,
    pub voting_start: u64,
    pub voting_end: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePayload {
    pub proposal_id: u64,
    pub choice: VoteChoice,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Type-specific data attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    #[default]
    None,
    Transfer(TransferPayload),
    Proposal(ProposalPayload),
    Vote(VotePayload),
}

/// What the caller wants done. Builders take it by reference and never
/// mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub chain: ChainId,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub amount: Option<TokenAmount>,
    /// Token contract / mint; absent means the native currency.
    #[serde(default)]
    pub token: Option<String>,
    /// Explicit nonce override (AccountChain only).
    #[serde(default)]
    pub nonce: Option<u64>,
    /// Ask the node for a fee/gas estimate instead of the configured default.
    #[serde(default)]
    pub estimate_fee: bool,
    #[serde(default)]
    pub payload: Payload,
}

impl TransactionRequest {
    fn base(tx_type: TransactionType, chain: ChainId, from: impl Into<String>) -> Self {
        Self {
            tx_type,
            chain,
            from: from.into(),
            to: None,
            amount: None,
            token: None,
            nonce: None,
            estimate_fee: false,
            payload: Payload::None,
        }
    }

    pub fn transfer(
        chain: ChainId,
        from: impl Into<String>,
        to: impl Into<String>,
        amount: TokenAmount,
    ) -> Self {
        Self {
            to: Some(to.into()),
            amount: Some(amount),
            ..Self::base(TransactionType::Transfer, chain, from)
        }
    }

    pub fn mint(
        chain: ChainId,
        from: impl Into<String>,
        to: impl Into<String>,
        amount: TokenAmount,
    ) -> Self {
        Self {
            to: Some(to.into()),
            amount: Some(amount),
            ..Self::base(TransactionType::Mint, chain, from)
        }
    }

    pub fn burn(chain: ChainId, from: impl Into<String>, amount: TokenAmount) -> Self {
        Self {
            amount: Some(amount),
            ..Self::base(TransactionType::Burn, chain, from)
        }
    }

    pub fn proposal(chain: ChainId, from: impl Into<String>, proposal: ProposalPayload) -> Self {
        Self {
            payload: Payload::Proposal(proposal),
            ..Self::base(TransactionType::ProposalCreate, chain, from)
        }
    }

    pub fn vote(chain: ChainId, from: impl Into<String>, vote: VotePayload) -> Self {
        Self {
            payload: Payload::Vote(vote),
            ..Self::base(TransactionType::Vote, chain, from)
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_fee_estimate(mut self) -> Self {
        self.estimate_fee = true;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        let mut payload = match std::mem::take(&mut self.payload) {
            Payload::Transfer(payload) => payload,
            _ => TransferPayload::default(),
        };
        payload.memo = Some(memo.into());
        self.payload = Payload::Transfer(payload);
        self
    }

    /// Destination, required for transfers and mints.
    pub fn require_to(&self) -> Result<&str, ValidationError> {
        self.to.as_deref().ok_or(ValidationError::MissingField {
            tx_type: self.tx_type,
            field: "to",
        })
    }

    pub fn require_amount(&self) -> Result<&TokenAmount, ValidationError> {
        self.amount.as_ref().ok_or(ValidationError::MissingField {
            tx_type: self.tx_type,
            field: "amount",
        })
    }

    pub fn memo(&self) -> Option<&str> {
        match &self.payload {
            Payload::Transfer(payload) => payload.memo.as_deref(),
            _ => None,
        }
    }

    /// Proposal payload with a non-empty title and a forward voting window.
    pub fn require_proposal(&self) -> Result<&ProposalPayload, ValidationError> {
        let Payload::Proposal(proposal) = &self.payload else {
            return Err(ValidationError::PayloadMismatch(self.tx_type));
        };
        if proposal.title.trim().is_empty() {
            return Err(ValidationError::MissingField {
                tx_type: self.tx_type,
                field: "title",
            });
        }
        if proposal.voting_end <= proposal.voting_start {
            return Err(ValidationError::Invalid(format!(
                "voting window ends ({}) before it starts ({})",
                proposal.voting_end, proposal.voting_start
            )));
        }
        Ok(proposal)
    }

    pub fn require_vote(&self) -> Result<&VotePayload, ValidationError> {
        match &self.payload {
            Payload::Vote(vote) => Ok(vote),
            _ => Err(ValidationError::PayloadMismatch(self.tx_type)),
        }
    }

    /// One-line description used as the success detail.
    pub fn summary(&self) -> String {
        let amount = self.amount.as_ref().map(TokenAmount::as_str).unwrap_or("0");
        let to = self.to.as_deref().unwrap_or("-");
        let asset = match &self.token {
            Some(token) => format!("token {}", token),
            None => "native currency".to_string(),
        };
        match (&self.tx_type, &self.payload) {
            (TransactionType::Transfer, _) => {
                format!("Transfer of {} {} to {}", amount, asset, to)
            }
            (TransactionType::Mint, _) => format!("Mint of {} {} to {}", amount, asset, to),
            (TransactionType::Burn, _) => format!("Burn of {} {}", amount, asset),
            (TransactionType::ProposalCreate, Payload::Proposal(p)) => {
                format!("Create governance proposal: {}", p.title)
            }
            (TransactionType::Vote, Payload::Vote(v)) => {
                format!("Governance vote: {} on proposal {}", v.choice, v.proposal_id)
            }
            (tx_type, _) => tx_type.to_string(),
        }
    }
}
