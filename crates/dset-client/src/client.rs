//! The distributed-set client.

use dset_ledger::{LedgerProvider, PlutusScript, TxBuilder, Utxo, Wallet};
use dset_plutus::ToPlutusData;
use dset_primitives::TxHash;

use crate::blueprint::Blueprint;
use crate::config::SetConfig;
use crate::error::SetError;
use crate::factory::{
    build_continue_tx, build_genesis_tx, build_split_tx, ContinueConfig, GenesisConfig,
    SplitConfig,
};
use crate::handle::SetHandle;
use crate::node_id::NodeId;

/// Builds, signs and submits set transactions through a wallet and a
/// ledger provider.
///
/// Every operation is one request/response round against the provider.
/// A transaction that depends on an earlier one's outputs must wait until
/// those outputs are settled.
pub struct SetClient<W, P> {
    wallet: W,
    provider: P,
    validator: PlutusScript,
    config: SetConfig,
}

impl<W: Wallet, P: LedgerProvider> SetClient<W, P> {
    /// Create a client for the unparametrized `validator`.
    ///
    /// Fails with [`SetError::Config`] when the configuration is invalid,
    /// or when the configured network or the wallet's address network
    /// differs from the provider's.
    pub fn new(
        wallet: W,
        provider: P,
        validator: PlutusScript,
        config: SetConfig,
    ) -> Result<Self, SetError> {
        config.validate()?;
        let network = provider.network();
        if config.network != network {
            return Err(SetError::Config(format!(
                "configured network {:?} does not match provider network {:?}",
                config.network, network
            )));
        }
        let wallet_network = wallet.address().network;
        if wallet_network != network {
            return Err(SetError::Config(format!(
                "wallet network {:?} does not match provider network {:?}",
                wallet_network, network
            )));
        }
        Ok(Self {
            wallet,
            provider,
            validator,
            config,
        })
    }

    /// Create a client, taking the validator from a blueprint by the
    /// configured title.
    pub fn from_blueprint(
        wallet: W,
        provider: P,
        blueprint: &Blueprint,
        config: SetConfig,
    ) -> Result<Self, SetError> {
        let validator = blueprint.validator(&config.blueprint_validator_title)?;
        Self::new(wallet, provider, validator, config)
    }

    /// The wallet paying for and signing transactions.
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// The ledger provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The client configuration.
    pub fn config(&self) -> &SetConfig {
        &self.config
    }

    /// Create a set whose root carries the configured genesis values.
    pub async fn create(&self) -> Result<SetHandle, SetError> {
        let values = self.config.genesis_values()?;
        self.create_with_values(values).await
    }

    /// Create a set whose root carries `values`.
    ///
    /// The first wallet output seeds a one-shot policy and is spent by
    /// the genesis transaction. Fails with [`SetError::NoSpendableFunds`]
    /// when the wallet holds nothing.
    pub async fn create_with_values(&self, values: Vec<Vec<u8>>) -> Result<SetHandle, SetError> {
        let seed = self
            .provider
            .utxos_at(&self.wallet.address())
            .await?
            .into_iter()
            .next()
            .ok_or(SetError::NoSpendableFunds)?;

        let script = self
            .provider
            .apply_params(&self.validator, &[seed.out_ref.to_plutus_data()])?;
        let policy_id = script.policy_id();
        let script_address = script.address(self.provider.network());
        let id = NodeId::derive(&seed.out_ref);

        let builder = build_genesis_tx(&GenesisConfig {
            seed,
            script: script.clone(),
            script_address,
            values,
            valid_to: self.deadline(),
        })?;
        let genesis_tx = self.submit(builder).await?;

        tracing::info!(
            tx_hash = %genesis_tx,
            policy_id = %policy_id,
            unit = %id.unit(policy_id),
            "created set"
        );
        Ok(SetHandle {
            policy_id,
            script,
            script_address,
            genesis_tx,
            ids: vec![id],
        })
    }

    /// Respend the node `id` in place with its datum reset to an empty
    /// root.
    pub async fn continue_set(&self, handle: &SetHandle, id: &NodeId) -> Result<TxHash, SetError> {
        let node = self.locate(handle, id).await?;
        let builder = build_continue_tx(&ContinueConfig {
            node,
            id: *id,
            script: handle.script.clone(),
            script_address: handle.script_address,
            policy_id: handle.policy_id,
            valid_to: self.deadline(),
        })?;
        let tx_hash = self.submit(builder).await?;

        tracing::info!(tx_hash = %tx_hash, unit = %handle.unit(id), "continued node");
        Ok(tx_hash)
    }

    /// Split the node `id` in two, recording the new node in `handle`.
    pub async fn split(&self, handle: &mut SetHandle, id: &NodeId) -> Result<TxHash, SetError> {
        let node = self.locate(handle, id).await?;
        let (builder, new_id) = build_split_tx(&SplitConfig {
            node,
            id: *id,
            script: handle.script.clone(),
            script_address: handle.script_address,
            policy_id: handle.policy_id,
            valid_to: self.deadline(),
        })?;
        let tx_hash = self.submit(builder).await?;
        handle.ids.push(new_id);

        tracing::info!(
            tx_hash = %tx_hash,
            unit = %handle.unit(id),
            new_unit = %handle.unit(&new_id),
            "split node"
        );
        Ok(tx_hash)
    }

    fn deadline(&self) -> u64 {
        self.provider.now() + self.config.validity_window_ms
    }

    async fn locate(&self, handle: &SetHandle, id: &NodeId) -> Result<Utxo, SetError> {
        self.provider
            .utxo_by_unit(&handle.unit(id))
            .await
            .map_err(|e| SetError::from_lookup(id, e))
    }

    async fn submit(&self, builder: TxBuilder) -> Result<TxHash, SetError> {
        let tx = builder
            .complete(&self.wallet, &self.provider)
            .await?
            .sign(&self.wallet);
        self.provider.submit(tx).await.map_err(|e| {
            tracing::warn!(error = %e, "set transaction rejected");
            SetError::from_submission(e)
        })
    }
}
