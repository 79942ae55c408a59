// Path: crates/services/src/executor/mod.rs

//! The per-call pull executor.
//!
//! Verifies one signed authorization and drives one transfer under it.
//! The executor enforces the per-call controls only: revocation,
//! caller-is-grantee, validity window, per-call ceiling, and signature
//! authenticity. Cumulative accounting belongs to the consent registry;
//! budget enforcement belongs to higher layers. Repeated pulls under one
//! authorization are legitimate until revocation, window expiry, or
//! allowance exhaustion.

use crate::consent::ConsentRegistry;
use crate::journal;
use siphon_api::account::AccountDirectory;
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_api::token::TokenLedger;
use siphon_crypto::domain::SigningDomain;
use siphon_crypto::typed::auth_hash;
use siphon_crypto::verify::verify_account_signature;
use siphon_types::consent::SignedAuthorization;
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount, AuthHash};


/// The signing-domain name bound into every executor instance.
const DOMAIN_NAME: &str = "siphon.pull-executor";
/// The signing-domain version bound into every executor instance.
const DOMAIN_VERSION: &str = "1";

/// The per-call pull executor component.
pub struct PullExecutor<L, A> {
    address: Address,
    domain: SigningDomain,
    registry: ConsentRegistry,
    ledger: L,
    accounts: A,
}

impl<L: TokenLedger, A: AccountDirectory> PullExecutor<L, A> {
    /// Builds an executor instance. The signing domain is precomputed
    /// from the host id and the instance address, so authorizations
    /// signed for this executor verify nowhere else.
    pub fn new(address: Address, host_id: u64, ledger: L, accounts: A) -> Self {
        Self {
            address,
            domain: SigningDomain::new(DOMAIN_NAME, DOMAIN_VERSION, host_id, address),
            registry: ConsentRegistry,
            ledger,
            accounts,
        }
    }

    /// The executor's component address. Grantors grant their token
    /// allowance to this address; the registry controller trusts it.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The executor's signing domain, as wallets must reproduce it.
    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    /// Verifies `signed` and executes one pull of `amount` under it.
    ///
    /// The transfer precedes the registry record, and the record happens
    /// iff the transfer succeeds; both commit or neither does.
    pub fn pull(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        signed: &SignedAuthorization,
        amount: Amount,
    ) -> Result<AuthHash, FlowError> {
        let auth = &signed.auth;
        let hash = auth_hash(auth);

        run_atomic(state, |state| {
            if self.registry.is_revoked(state, hash)? {
                return Err(FlowError::Revoked);
            }
            if ctx.caller != auth.grantee {
                return Err(FlowError::NotAuthorizedCaller);
            }
            if ctx.now < auth.valid_after {
                return Err(FlowError::TooSoon);
            }
            if ctx.now > auth.valid_before {
                return Err(FlowError::Expired);
            }
            if amount.is_zero() {
                return Err(FlowError::AmountZero);
            }
            if amount > auth.max_per_pull {
                return Err(FlowError::ExceedsPerCall);
            }

            let digest = self.domain.typed_digest(hash.0);
            verify_account_signature(&self.accounts, auth.grantor, digest, &signed.signature)?;

            let inner = ctx.reframe(self.address);
            self.ledger.transfer_from(
                state,
                &inner,
                auth.token,
                auth.grantor,
                auth.grantee,
                amount,
            )?;
            self.registry.record_pull(
                state,
                &inner,
                hash,
                auth.token,
                auth.grantor,
                auth.grantee,
                amount,
            )?;

            journal::emit(
                state,
                ctx,
                KernelEvent::PullExecutedDirect {
                    auth_hash: hash,
                    token: auth.token,
                    grantor: auth.grantor,
                    grantee: auth.grantee,
                    amount,
                },
            )?;
            log::info!(
                "executor: pulled {} under {} for 0x{}",
                amount,
                hash,
                hex::encode(auth.grantee),
            );
            Ok(hash)
        })
    }
}
