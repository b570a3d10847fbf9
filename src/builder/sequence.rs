//! SequenceChain builder: one instruction per transaction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{ChainError, ChainId};
use crate::builder::{ensure_chain, instruction, TransactionBuilder};
use crate::config::SequenceChainConfig;
use crate::crypto::encoding::is_valid_sequence_address;
use crate::error::{EngineResult, ValidationError};
use crate::transaction::{SequenceTxBody, TransactionRequest, TransactionType, UnsignedTransactionBody};

/// Program, accounts and data of the single instruction.
struct Instruction {
    program_id: String,
    to: Option<String>,
    token: Option<String>,
    amount: u64,
    data: Vec<u8>,
}

pub struct SequenceTxBuilder {
    client: Arc<dyn ChainClient>,
    config: SequenceChainConfig,
}

impl SequenceTxBuilder {
    pub fn new(client: Arc<dyn ChainClient>, config: SequenceChainConfig) -> Self {
        Self { client, config }
    }

    fn address(&self, field: &'static str, value: &str) -> Result<String, ValidationError> {
        if is_valid_sequence_address(value) {
            Ok(value.to_string())
        } else {
            Err(ValidationError::InvalidAddress {
                chain: ChainId::SequenceChain,
                field,
                value: value.to_string(),
            })
        }
    }

    fn token_mint(&self, request: &TransactionRequest) -> Result<String, ValidationError> {
        match request.token.as_deref().or(self.config.token_mint.as_deref()) {
            Some(mint) => self.address("token", mint),
            None => Err(ValidationError::NotConfigured("token mint")),
        }
    }

    fn governance_program(&self) -> Result<String, ValidationError> {
        match self.config.governance_program.as_deref() {
            Some(program) => self.address("governance_program", program),
            None => Err(ValidationError::NotConfigured("governance program")),
        }
    }

    fn instruction(&self, request: &TransactionRequest) -> Result<Instruction, ValidationError> {
        let decimals = self.config.token_decimals;
        match request.tx_type {
            TransactionType::Transfer => {
                let to = self.address("to", request.require_to()?)?;
                let amount = request.require_amount()?;
                match request.token.as_deref() {
                    Some(mint) => {
                        let amount = amount.to_base_units_u64(decimals)?;
                        Ok(Instruction {
                            program_id: self.config.token_program.clone(),
                            to: Some(to),
                            token: Some(self.address("token", mint)?),
                            amount,
                            data: instruction::token_transfer(amount),
                        })
                    }
                    None => {
                        let lamports =
                            amount.to_base_units_u64(ChainId::SequenceChain.native_decimals())?;
                        Ok(Instruction {
                            program_id: self.config.system_program.clone(),
                            to: Some(to),
                            token: None,
                            amount: lamports,
                            data: instruction::system_transfer(lamports),
                        })
                    }
                }
            }
            TransactionType::Mint => {
                let to = self.address("to", request.require_to()?)?;
                let amount = request.require_amount()?.to_base_units_u64(decimals)?;
                Ok(Instruction {
                    program_id: self.config.token_program.clone(),
                    to: Some(to),
                    token: Some(self.token_mint(request)?),
                    amount,
                    data: instruction::token_mint_to(amount),
                })
            }
            TransactionType::Burn => {
                let amount = request.require_amount()?.to_base_units_u64(decimals)?;
                Ok(Instruction {
                    program_id: self.config.token_program.clone(),
                    to: None,
                    token: Some(self.token_mint(request)?),
                    amount,
                    data: instruction::token_burn(amount),
                })
            }
            TransactionType::ProposalCreate => {
                let proposal = request.require_proposal()?;
                Ok(Instruction {
                    program_id: self.governance_program()?,
                    to: None,
                    token: None,
                    amount: 0,
                    data: instruction::create_proposal(
                        &proposal.title,
                        &proposal.description,
                        proposal.voting_start,
                        proposal.voting_end,
                    )?,
                })
            }
            TransactionType::Vote => {
                let vote = request.require_vote()?;
                Ok(Instruction {
                    program_id: self.governance_program()?,
                    to: None,
                    token: None,
                    amount: 0,
                    data: instruction::cast_vote(vote.proposal_id, vote.choice, vote.reason.as_deref())?,
                })
            }
        }
    }
}

#[async_trait]
impl TransactionBuilder for SequenceTxBuilder {
    fn chain(&self) -> ChainId {
        ChainId::SequenceChain
    }

    async fn build(&self, request: &TransactionRequest) -> EngineResult<UnsignedTransactionBody> {
        ensure_chain(request, ChainId::SequenceChain)?;
        let from = self.address("from", &request.from)?;
        let ix = self.instruction(request)?;

        if request.nonce.is_some() {
            tracing::debug!(from = %from, "Ignoring explicit nonce, SequenceChain uses a recent blockhash");
        }

        let sequence = self.client.get_sequence_number(&from).await?;
        let recent_blockhash = sequence
            .as_blockhash()
            .ok_or_else(|| {
                ChainError::InvalidResponse("expected a recent blockhash from the SequenceChain".to_string())
            })?
            .to_string();

        let fee = if request.estimate_fee {
            self.client
                .estimate_fee(&from, ix.to.as_deref().unwrap_or(&ix.program_id), &ix.data)
                .await?
        } else {
            self.config.fee_lamports
        };

        tracing::debug!(
            tx_type = %request.tx_type,
            program = %ix.program_id,
            blockhash = %recent_blockhash,
            fee,
            "Built SequenceChain transaction"
        );

        Ok(UnsignedTransactionBody::Sequence(SequenceTxBody {
            recent_blockhash,
            fee,
            program_id: ix.program_id,
            from,
            to: ix.to,
            token: ix.token,
            amount: ix.amount,
            data: ix.data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockChainClient;
    use crate::error::EngineError;
    use crate::transaction::{ProposalPayload, VoteChoice, VotePayload};

    const PAYER: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";
    const RECIPIENT: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
    const MINT: &str = "So11111111111111111111111111111111111111112";
    const BLOCKHASH: &str = "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N";
    const GOVERNANCE: &str = "GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw";

    fn setup(mock: MockChainClient) -> (Arc<MockChainClient>, SequenceTxBuilder) {
        let mock = Arc::new(mock.with_blockhash(BLOCKHASH));
        let config = SequenceChainConfig {
            enabled: true,
            governance_program: Some(GOVERNANCE.to_string()),
            ..SequenceChainConfig::default()
        };
        let builder = SequenceTxBuilder::new(mock.clone(), config);
        (mock, builder)
    }

    fn sequence(body: UnsignedTransactionBody) -> SequenceTxBody {
        match body {
            UnsignedTransactionBody::Sequence(body) => body,
            other => panic!("expected sequence body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_native_transfer() {
        let (mock, builder) = setup(MockChainClient::new(ChainId::SequenceChain));
        let request =
            TransactionRequest::transfer(ChainId::SequenceChain, PAYER, RECIPIENT, "1.5".parse().unwrap());

        let body = sequence(builder.build(&request).await.unwrap());
        assert_eq!(body.recent_blockhash, BLOCKHASH);
        assert_eq!(body.program_id, "11111111111111111111111111111111");
        assert_eq!(body.amount, 1_500_000_000);
        assert_eq!(body.data, instruction::system_transfer(1_500_000_000));
        assert_eq!(body.fee, 5_000);
        assert_eq!(body.to.as_deref(), Some(RECIPIENT));
        assert_eq!(mock.call_count("get_sequence_number"), 1);
        assert_eq!(mock.call_count("estimate_fee"), 0);
    }

    #[tokio::test]
    async fn test_token_transfer_uses_token_program() {
        let (_, builder) = setup(MockChainClient::new(ChainId::SequenceChain));
        let request =
            TransactionRequest::transfer(ChainId::SequenceChain, PAYER, RECIPIENT, "2".parse().unwrap())
                .with_token(MINT);

        let body = sequence(builder.build(&request).await.unwrap());
        assert_eq!(body.program_id, "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
        assert_eq!(body.token.as_deref(), Some(MINT));
        assert_eq!(body.data, instruction::token_transfer(2_000_000_000));
    }

    #[tokio::test]
    async fn test_burn_needs_mint() {
        let (mock, builder) = setup(MockChainClient::new(ChainId::SequenceChain));
        let request = TransactionRequest::burn(ChainId::SequenceChain, PAYER, "1".parse().unwrap());

        assert!(matches!(
            builder.build(&request).await,
            Err(EngineError::Validation(ValidationError::NotConfigured("token mint")))
        ));
        assert_eq!(mock.total_calls(), 0);

        let body = sequence(builder.build(&request.with_token(MINT)).await.unwrap());
        assert_eq!(body.data, instruction::token_burn(1_000_000_000));
        assert!(body.to.is_none());
    }

    #[tokio::test]
    async fn test_invalid_recipient_before_network() {
        let (mock, builder) = setup(MockChainClient::new(ChainId::SequenceChain));
        let request = TransactionRequest::mint(
            ChainId::SequenceChain,
            PAYER,
            "0OIl-not-base58",
            "1".parse().unwrap(),
        )
        .with_token(MINT);

        let err = builder.build(&request).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InvalidAddress { field: "to", .. })
        ));
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_governance_instructions() {
        let (_, builder) = setup(MockChainClient::new(ChainId::SequenceChain));

        let proposal = TransactionRequest::proposal(
            ChainId::SequenceChain,
            PAYER,
            ProposalPayload {
                title: "Treasury".into(),
                description: "Fund grants".into(),
                voting_start: 1_700_000_000,
                voting_end: 1_700_086_400,
            },
        );
        let body = sequence(builder.build(&proposal).await.unwrap());
        assert_eq!(body.program_id, GOVERNANCE);
        assert_eq!(
            body.data,
            instruction::create_proposal("Treasury", "Fund grants", 1_700_000_000, 1_700_086_400)
                .unwrap()
        );

        let vote = TransactionRequest::vote(
            ChainId::SequenceChain,
            PAYER,
            VotePayload {
                proposal_id: 12,
                choice: VoteChoice::Abstain,
                reason: None,
            },
        );
        let body = sequence(builder.build(&vote).await.unwrap());
        assert_eq!(body.data, instruction::cast_vote(12, VoteChoice::Abstain, None).unwrap());
    }

    #[tokio::test]
    async fn test_fee_estimate_requested() {
        let (mock, builder) = setup(MockChainClient::new(ChainId::SequenceChain).with_fee(10_000));
        let request =
            TransactionRequest::transfer(ChainId::SequenceChain, PAYER, RECIPIENT, "1".parse().unwrap())
                .with_fee_estimate();

        let body = sequence(builder.build(&request).await.unwrap());
        assert_eq!(body.fee, 10_000);
        assert_eq!(mock.call_count("estimate_fee"), 1);
    }

    #[tokio::test]
    async fn test_blockhash_failure_propagates() {
        let mock = Arc::new(
            MockChainClient::new(ChainId::SequenceChain).with_sequence_error(ChainError::Timeout(10)),
        );
        let builder = SequenceTxBuilder::new(mock, SequenceChainConfig::default());
        let request =
            TransactionRequest::transfer(ChainId::SequenceChain, PAYER, RECIPIENT, "1".parse().unwrap());

        assert!(matches!(
            builder.build(&request).await,
            Err(EngineError::Chain(ChainError::Timeout(10)))
        ));
    }

    #[tokio::test]
    async fn test_excess_precision_rejected() {
        let (_, builder) = setup(MockChainClient::new(ChainId::SequenceChain));
        let request = TransactionRequest::transfer(
            ChainId::SequenceChain,
            PAYER,
            RECIPIENT,
            "0.0000000001".parse().unwrap(),
        );
        assert!(matches!(
            builder.build(&request).await,
            Err(EngineError::Validation(ValidationError::InvalidAmount { .. }))
        ));
    }
}
