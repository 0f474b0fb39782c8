//! Account abstraction wallet SDK.
//!
//! Builds batches of user operations for a smart account, aggregates the
//! composite signature its policy requires, guards the prefund, deploys
//! contracts through the deployer or factory path and submits everything
//! through the entry point, decoding per-operation outcomes from the
//! receipt.

pub mod batch;
pub mod client;
pub mod deploy;
pub mod error;
pub mod gas;
pub mod signature;
pub mod submit;

pub use batch::{BatchBuilder, BatchInput, Call};
pub use client::WalletClient;
pub use deploy::{
    classify, extract_arg_types, is_ownable, needs_nomination, plan_deployment, DeploymentPlan,
    DeploymentStrategy,
};
pub use error::{ClientError, ClientResult};
pub use signature::{required_signers, SignatureAggregator};
pub use submit::Submitter;
