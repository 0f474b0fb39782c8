use ethers::contract::abigen;

abigen!(
    EntryPointAPI,
    r#"[
        struct UserOperation {address sender;uint256 nonce;bytes initCode;bytes callData;uint256 callGasLimit;uint256 verificationGasLimit;uint256 preVerificationGas;uint256 maxFeePerGas;uint256 maxPriorityFeePerGas;bytes paymasterAndData;bytes signature;}
        function handleOps(UserOperation[] calldata ops, address payable beneficiary) external
        function getUserOpHash(UserOperation calldata userOp) external view returns (bytes32)
        function balanceOf(address account) external view returns (uint256)
        event UserOperationRevertReason(bytes32 indexed userOpHash,address indexed sender,uint256 nonce,bytes revertReason)
        event UserOperationEvent(bytes32 indexed userOpHash,address indexed sender,address indexed paymaster,uint256 nonce,bool success,uint256 actualGasCost,uint256 actualGasUsed)
    ]"#
);

abigen!(
    AccountAPI,
    r#"[
        function getNonce() view returns (uint256)
        function execute(address dest, uint256 value, bytes calldata func)
        function whitelistApp(address[] calldata apps, bool[] calldata flags)
        function whitelistAppAndSetKey(address app, address signer)
        function appWhitelist(address) view returns (bool)
        function appSigner(address) view returns (address)
        function setFunderWhitelist(address[] calldata newWhitelist, bool[] calldata flags)
        function isFunderWhitelisted(address) view returns (bool)
        function owners(uint256) view returns (address)
        function getOwnersCount() view returns (uint256)
        function signerPolicy() view returns (uint256)
    ]"#
);

abigen!(
    FactoryAPI,
    r#"[
        function deployContract(address contractOwner, uint256 amount, bytes memory bytecode, bytes32 salt) returns (address)
    ]"#
);

abigen!(
    DeployerAPI,
    r#"[
        function deploy(address owner, bytes calldata bytecode, bytes32 salt) public returns (address)
    ]"#
);

abigen!(
    AppRegistryAPI,
    r#"[
        struct AppMetadata {uint256 tokenId;bool dsaEnabled;uint256 rateLimitPeriod;uint256 rateLimitNumber;uint256 gasLimitPeriod;uint256 gasLimitCost;string name;address[] devEOAs;address[] appContracts;}
        function addAppContracts(address app, address[] calldata newContracts)
        function getAppMetadata(address target) view returns (AppMetadata memory)
    ]"#
);

abigen!(
    OwnableAPI,
    r#"[
        function owner() view returns (address)
        function nominateOwner(address nominee)
        function claimOwner()
    ]"#
);

impl From<calyx_primitives::UserOperation> for entry_point_api::UserOperation {
    fn from(value: calyx_primitives::UserOperation) -> Self {
        Self {
            sender: value.sender,
            nonce: value.nonce,
            init_code: value.init_code,
            call_data: value.call_data,
            call_gas_limit: value.call_gas_limit,
            verification_gas_limit: value.verification_gas_limit,
            pre_verification_gas: value.pre_verification_gas,
            max_fee_per_gas: value.max_fee_per_gas,
            max_priority_fee_per_gas: value.max_priority_fee_per_gas,
            paymaster_and_data: value.paymaster_and_data,
            signature: value.signature,
        }
    }
}
