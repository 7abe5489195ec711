// Path: crates/jam-types/src/lib.rs

//! Core data structures shared across the accumulation engine's crates:
//! identifiers, the service account and privileges model, validator and
//! authorizer dimensions, work reports and operands, protocol parameters
//! and error types.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod account;
pub mod authorizer;
pub mod error;
pub mod history;
pub mod ids;
pub mod operand;
pub mod params;
pub mod privileges;
pub mod report;
pub mod validator;

pub use account::{PreimageKey, PreimageStatus, ServiceAccount};
pub use authorizer::AuthorizerQueue;
pub use error::{EngineError, ErrorCode, StateError};
pub use history::AccumulationHistory;
pub use ids::{encode_service_id_as_hash, Hash32, ServiceId, Slot, TimeInfo};
pub use operand::{AccumulationOperand, TransferOperand};
pub use params::ProtocolParams;
pub use privileges::Privileges;
pub use report::{ExecResult, PackageSpec, WorkContext, WorkReport, WorkResult};
pub use validator::{ValidatorKey, ValidatorKeys, VALIDATOR_RECORD_SIZE};
