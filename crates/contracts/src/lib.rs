//! Typed interfaces of the on-chain contracts the SDK talks to: the entry
//! point, the smart account, the two deployment contracts and the app
//! registry.

pub mod account;
pub mod app_registry;
pub mod entry_point;
mod error;
mod gen;

pub use account::Account;
pub use app_registry::AppRegistry;
pub use entry_point::{find_operation_revert, revert_reason_topic, EntryPoint};
pub use error::{decode_revert_string, ContractsError};
pub use gen::{
    account_api, app_registry_api, deployer_api, entry_point_api, factory_api, ownable_api,
    AccountAPI, AppRegistryAPI, DeployerAPI, EntryPointAPI, FactoryAPI, OwnableAPI,
    UserOperationEventFilter, UserOperationRevertReasonFilter,
};
