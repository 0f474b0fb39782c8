//! Shared constants

/// Chain ids of the publicly known networks
pub mod networks {
    /// Main network
    pub const MAINNET_CHAIN_ID: u64 = 7887;
    /// Upgrade test network
    pub const DEVNET_CHAIN_ID: u64 = 412_346;
}

/// Gas accounting
pub mod gas {
    /// Fixed post-processing gas charged by the entry point after execution
    pub const COST_OF_POST: u64 = 200_000;
    /// Default gas allocated for the main execution call
    pub const DEFAULT_CALL_GAS_LIMIT: u64 = 4_000_000;
    /// Default gas allocated for the verification step
    pub const DEFAULT_VERIFICATION_GAS_LIMIT: u64 = 210_000;
    /// Default pre-verification gas
    pub const DEFAULT_PRE_VERIFICATION_GAS: u64 = 21_000;
}

/// Fee market bids
pub mod fee {
    /// Default max fee per gas (1 gwei), used unless the caller overrides
    pub const DEFAULT_MAX_FEE_PER_GAS: u64 = 1_000_000_000;
    /// Default max priority fee per gas (1 gwei)
    pub const DEFAULT_MAX_PRIORITY_FEE_PER_GAS: u64 = 1_000_000_000;
}

/// Contract interface introspection
pub mod ownable {
    /// Constructor parameter names that count as an owner parameter
    pub const OWNER_PARAM_NAMES: [&str; 3] = ["owner", "_owner", "owner_"];
    /// Owner accessor every two-step ownable contract exposes
    pub const OWNER_FN: &str = "owner";
    /// Nomination function of the two-step ownership handoff
    pub const NOMINATE_FN: &str = "nominateOwner";
}
