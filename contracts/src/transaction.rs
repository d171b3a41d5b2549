//! The transaction as every validating party sees it.

use bnms_crypto::{hash_transaction, sign_message, verify_signature};
use bnms_types::{KeyPair, PublicKey, Signature, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::command::{Command, CommandData};
use crate::error::{EntityKind, ValidationError};
use crate::state::{ContractState, StateAndRef, TransactionState};

/// A signature over a transaction id by `by`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub by: PublicKey,
    pub signature: Signature,
}

/// A fully resolved transaction: consumed inputs, new outputs, read-only
/// references, commands and the signatures collected so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub inputs: Vec<StateAndRef>,
    pub outputs: Vec<TransactionState>,
    pub references: Vec<StateAndRef>,
    pub commands: Vec<Command>,
    #[serde(default)]
    pub signatures: Vec<TransactionSignature>,
}

/// Everything the id commits to. Signatures are excluded so that signing does
/// not change what is being signed.
#[derive(Serialize)]
struct SignedContents<'a> {
    inputs: &'a [StateAndRef],
    outputs: &'a [TransactionState],
    references: &'a [StateAndRef],
    commands: &'a [Command],
}

impl LedgerTransaction {
    /// Blake2b-256 of the bincode encoding of inputs, outputs, references and commands.
    pub fn id(&self) -> TxHash {
        let contents = SignedContents {
            inputs: &self.inputs,
            outputs: &self.outputs,
            references: &self.references,
            commands: &self.commands,
        };
        let bytes = bincode::serialize(&contents)
            .expect("ledger transaction contents are always serializable");
        hash_transaction(&bytes)
    }

    /// Add a signature by `keypair` over the current id.
    pub fn sign(&mut self, keypair: &KeyPair) {
        let id = self.id();
        self.signatures.retain(|s| s.by != keypair.public);
        self.signatures.push(TransactionSignature {
            by: keypair.public.clone(),
            signature: sign_message(id.as_bytes(), &keypair.private),
        });
    }

    /// Keys whose signature over the id actually verifies.
    ///
    /// Signatures that fail verification are ignored, so a forged or stale
    /// signature shows up as a missing signer.
    pub fn signers(&self) -> BTreeSet<PublicKey> {
        let id = self.id();
        self.signatures
            .iter()
            .filter(|s| verify_signature(id.as_bytes(), &s.signature, &s.by))
            .map(|s| s.by.clone())
            .collect()
    }

    pub fn inputs_of(&self, kind: EntityKind) -> impl Iterator<Item = &StateAndRef> {
        self.inputs.iter().filter(move |s| s.state.data.kind() == kind)
    }

    pub fn outputs_of(&self, kind: EntityKind) -> impl Iterator<Item = &TransactionState> {
        self.outputs.iter().filter(move |s| s.data.kind() == kind)
    }

    /// The single command of this entity kind, with its typed value.
    pub fn single_command<T>(
        &self,
        kind: EntityKind,
        select: impl Fn(&CommandData) -> Option<T>,
    ) -> Result<(&Command, T), ValidationError> {
        let mut matching = self
            .commands
            .iter()
            .filter_map(|c| select(&c.value).map(|v| (c, v)));
        let first = matching.next().ok_or(ValidationError::MissingCommand(kind))?;
        let extra = matching.count();
        if extra > 0 {
            return Err(ValidationError::MultipleCommands {
                entity: kind,
                count: extra + 1,
            });
        }
        Ok(first)
    }
}

/// Incrementally assembles a [`LedgerTransaction`].
#[derive(Default)]
pub struct TransactionBuilder {
    tx: LedgerTransaction,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, state: StateAndRef) -> Self {
        self.tx.inputs.push(state);
        self
    }

    pub fn output(mut self, state: TransactionState) -> Self {
        self.tx.outputs.push(state);
        self
    }

    pub fn output_state(self, data: ContractState) -> Self {
        let state = match data {
            ContractState::Group(g) => TransactionState::group(g),
            ContractState::Membership(m) => TransactionState::membership(m),
        };
        self.output(state)
    }

    pub fn reference(mut self, state: StateAndRef) -> Self {
        self.tx.references.push(state);
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.tx.commands.push(command);
        self
    }

    pub fn build(self) -> LedgerTransaction {
        self.tx
    }
}
