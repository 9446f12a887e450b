//! Transport seam between the client facade and a cluster

use async_trait::async_trait;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Signature, Signer};

use crate::error::{ClientError, Result};

/// Submits instructions and reads account data
///
/// Implementations own retries, commitment and fee payment; the facade only
/// hands over a fully built instruction.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sign and submit a transaction carrying `instruction`
    ///
    /// `signers` are required in addition to whatever fee payer the transport uses.
    async fn send_instruction(
        &self,
        instruction: Instruction,
        signers: &[&(dyn Signer + Sync)],
    ) -> Result<Signature>;

    /// Raw data of an account, `None` when it does not exist
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;
}

pub(crate) fn transport_error(err: impl std::fmt::Display) -> crate::error::Error {
    ClientError::Transport {
        message: err.to_string(),
    }
    .into()
}

#[cfg(feature = "rpc")]
pub use rpc::RpcTransport;

#[cfg(feature = "rpc")]
mod rpc {
    use super::*;
    use solana_client::nonblocking::rpc_client::RpcClient;
    use solana_sdk::transaction::Transaction;
    use std::sync::Arc;

    /// [`Transport`] over the nonblocking JSON-RPC client
    pub struct RpcTransport {
        client: RpcClient,
        payer: Arc<dyn Signer + Send + Sync>,
    }

    impl RpcTransport {
        /// Connect to `url` with `payer` paying fees
        pub fn new(url: impl Into<String>, payer: Arc<dyn Signer + Send + Sync>) -> Self {
            Self::from_client(RpcClient::new(url.into()), payer)
        }

        /// Wrap an already configured client (commitment, timeouts, ...)
        pub fn from_client(client: RpcClient, payer: Arc<dyn Signer + Send + Sync>) -> Self {
            Self { client, payer }
        }

        /// The underlying RPC client
        pub fn client(&self) -> &RpcClient {
            &self.client
        }

        /// Fee payer address
        pub fn payer(&self) -> Pubkey {
            self.payer.pubkey()
        }
    }

    #[async_trait]
    impl Transport for RpcTransport {
        async fn send_instruction(
            &self,
            instruction: Instruction,
            signers: &[&(dyn Signer + Sync)],
        ) -> Result<Signature> {
            let blockhash = self
                .client
                .get_latest_blockhash()
                .await
                .map_err(transport_error)?;

            let transaction = {
                let payer = self.payer.pubkey();
                let mut all: Vec<&dyn Signer> = vec![self.payer.as_ref()];
                for signer in signers {
                    if signer.pubkey() != payer {
                        all.push(*signer);
                    }
                }
                let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer));
                transaction
                    .try_sign(&all, blockhash)
                    .map_err(transport_error)?;
                transaction
            };

            let signature = self
                .client
                .send_and_confirm_transaction(&transaction)
                .await
                .map_err(transport_error)?;
            tracing::debug!(%signature, "Transaction confirmed");
            Ok(signature)
        }

        async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
            let response = self
                .client
                .get_account_with_commitment(address, self.client.commitment())
                .await
                .map_err(transport_error)?;
            Ok(response.value.map(|account| account.data))
        }
    }
}
