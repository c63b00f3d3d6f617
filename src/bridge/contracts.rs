//! Contract bindings and L2 predeploy addresses.

use alloy::primitives::{address, Address};
use alloy::sol;

/// L2CrossDomainMessenger predeploy.
pub const L2_CROSS_DOMAIN_MESSENGER: Address = address!("4200000000000000000000000000000000000007");

/// L2StandardBridge predeploy.
pub const L2_STANDARD_BRIDGE: Address = address!("4200000000000000000000000000000000000010");

/// L2ToL1MessagePasser predeploy; its storage commits to every withdrawal.
pub const L2_TO_L1_MESSAGE_PASSER: Address = address!("4200000000000000000000000000000000000016");

/// GasPriceOracle predeploy.
pub const GAS_PRICE_ORACLE: Address = address!("420000000000000000000000000000000000000F");

/// Placeholder the L2 bridge uses as the "token" for ETH.
pub const L2_ETH_TOKEN: Address = address!("DeadDeAddeAddEAddeadDEaDDEAdDeaDDeAD0000");

sol! {
    #[derive(Debug)]
    struct WithdrawalTransaction {
        uint256 nonce;
        address sender;
        address target;
        uint256 value;
        uint256 gasLimit;
        bytes data;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct OutputRootProof {
        bytes32 version;
        bytes32 stateRoot;
        bytes32 messagePasserStorageRoot;
        bytes32 latestBlockhash;
    }

    #[derive(Debug)]
    struct OutputProposal {
        bytes32 outputRoot;
        uint128 timestamp;
        uint128 l2BlockNumber;
    }

    #[sol(rpc)]
    interface IL1StandardBridge {
        #[derive(Debug)]
        event ETHDepositInitiated(address indexed from, address indexed to, uint256 amount, bytes extraData);

        #[derive(Debug)]
        event ERC20DepositInitiated(
            address indexed l1Token,
            address indexed l2Token,
            address indexed from,
            address to,
            uint256 amount,
            bytes extraData
        );

        function depositETH(uint32 _minGasLimit, bytes calldata _extraData) external payable;
        function depositETHTo(address _to, uint32 _minGasLimit, bytes calldata _extraData) external payable;
        function depositERC20(
            address _l1Token,
            address _l2Token,
            uint256 _amount,
            uint32 _minGasLimit,
            bytes calldata _extraData
        ) external;
        function depositERC20To(
            address _l1Token,
            address _l2Token,
            address _to,
            uint256 _amount,
            uint32 _minGasLimit,
            bytes calldata _extraData
        ) external;
    }

    #[sol(rpc)]
    interface IL2StandardBridge {
        #[derive(Debug)]
        event WithdrawalInitiated(
            address indexed l1Token,
            address indexed l2Token,
            address indexed from,
            address to,
            uint256 amount,
            bytes extraData
        );

        function withdraw(address _l2Token, uint256 _amount, uint32 _minGasLimit, bytes calldata _extraData) external payable;
        function withdrawTo(
            address _l2Token,
            address _to,
            uint256 _amount,
            uint32 _minGasLimit,
            bytes calldata _extraData
        ) external payable;
    }

    /// Shared by the L1 and L2 messengers.
    #[sol(rpc)]
    interface ICrossDomainMessenger {
        #[derive(Debug)]
        event SentMessage(address indexed target, address sender, bytes message, uint256 messageNonce, uint256 gasLimit);

        #[derive(Debug)]
        event SentMessageExtension1(address indexed sender, uint256 value);

        #[derive(Debug)]
        event RelayedMessage(bytes32 indexed msgHash);

        #[derive(Debug)]
        event FailedRelayedMessage(bytes32 indexed msgHash);

        function successfulMessages(bytes32 msgHash) external view returns (bool);
        function failedMessages(bytes32 msgHash) external view returns (bool);
    }

    #[sol(rpc)]
    interface IL2ToL1MessagePasser {
        #[derive(Debug)]
        event MessagePassed(
            uint256 indexed nonce,
            address indexed sender,
            address indexed target,
            uint256 value,
            uint256 gasLimit,
            bytes data,
            bytes32 withdrawalHash
        );
    }

    #[sol(rpc)]
    interface IOptimismPortal {
        function provenWithdrawals(bytes32 withdrawalHash)
            external
            view
            returns (bytes32 outputRoot, uint128 timestamp, uint128 l2OutputIndex);

        function proveWithdrawalTransaction(
            WithdrawalTransaction memory _tx,
            uint256 _l2OutputIndex,
            OutputRootProof calldata _outputRootProof,
            bytes[] calldata _withdrawalProof
        ) external;

        function finalizeWithdrawalTransaction(WithdrawalTransaction memory _tx) external;
    }

    #[sol(rpc)]
    interface IL2OutputOracle {
        function latestBlockNumber() external view returns (uint256);
        function getL2OutputIndexAfter(uint256 _l2BlockNumber) external view returns (uint256);
        function getL2Output(uint256 _l2OutputIndex) external view returns (OutputProposal memory);
        function FINALIZATION_PERIOD_SECONDS() external view returns (uint256);
    }

    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        /// Only present on testnet demo tokens.
        function faucet() external;
    }

    #[sol(rpc)]
    interface IGasPriceOracle {
        function getL1Fee(bytes memory _data) external view returns (uint256);
        function getL1GasUsed(bytes memory _data) external view returns (uint256);
    }

    #[sol(rpc)]
    interface IGreeter {
        function setGreeting(string memory _greeting) external;
    }
}

/// `relayMessage` as encoded since the Bedrock upgrade (message version 1).
pub mod relay_v1 {
    alloy::sol! {
        function relayMessage(
            uint256 _nonce,
            address _sender,
            address _target,
            uint256 _value,
            uint256 _minGasLimit,
            bytes _message
        ) external payable;
    }
}

/// Pre-Bedrock `relayMessage` (message version 0).
pub mod relay_v0 {
    alloy::sol! {
        function relayMessage(address _target, address _sender, bytes _message, uint256 _messageNonce) external;
    }
}
