//! Built-in network presets.
//!
//! Chain ids, L1 contract deployments, RPC URL templates and explorer links
//! for the public OP Stack networks. `Custom` has no preset; everything must
//! come from the config file or the command line.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Networks known to the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// OP Mainnet on Ethereum mainnet.
    Mainnet,
    /// OP Goerli on Goerli.
    Goerli,
    /// OP Sepolia on Sepolia.
    #[default]
    Sepolia,
    /// Any other deployment (local devnet, custom rollup).
    Custom,
}

/// L1 deployment of the bridge contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L1Contracts {
    pub l1_cross_domain_messenger: Address,
    pub l1_standard_bridge: Address,
    pub optimism_portal: Address,
    pub l2_output_oracle: Address,
}

/// Static description of a public network.
#[derive(Debug, Clone, Copy)]
pub struct NetworkPreset {
    pub l1_chain_id: u64,
    pub l2_chain_id: u64,
    pub contracts: L1Contracts,
    alchemy_l1: &'static str,
    alchemy_l2: &'static str,
    infura_l1: &'static str,
    infura_l2: &'static str,
    l1_explorer: &'static str,
    l2_explorer: &'static str,
    /// Greeter demo contract used by the gas estimator.
    pub greeter: Option<Address>,
    /// Demo ERC-20 pair with a public faucet on L1.
    pub demo_token: Option<(Address, Address)>,
}

const MAINNET: NetworkPreset = NetworkPreset {
    l1_chain_id: 1,
    l2_chain_id: 10,
    contracts: L1Contracts {
        l1_cross_domain_messenger: address!("25ace71c97B33Cc4729CF772ae268934F7ab5fA1"),
        l1_standard_bridge: address!("99C9fc46f92E8a1c0deC1b1747d010903E884bE1"),
        optimism_portal: address!("bEb5Fc579115071764c7423A4f12eDde41f106Ed"),
        l2_output_oracle: address!("dfe97868233d1aa22e815a266982f2cf17685a27"),
    },
    alchemy_l1: "eth-mainnet",
    alchemy_l2: "opt-mainnet",
    infura_l1: "mainnet",
    infura_l2: "optimism-mainnet",
    l1_explorer: "https://etherscan.io",
    l2_explorer: "https://optimistic.etherscan.io",
    greeter: Some(address!("cf210488dad6da5fe54d260c45253afc3a9e708c")),
    demo_token: None,
};

const GOERLI: NetworkPreset = NetworkPreset {
    l1_chain_id: 5,
    l2_chain_id: 420,
    contracts: L1Contracts {
        l1_cross_domain_messenger: address!("5086d1eEF304eb5284A0f6720f79403b4e9bE294"),
        l1_standard_bridge: address!("636Af16bf2f682dD3109e60102b8E1A089FedAa8"),
        optimism_portal: address!("5b47E1A08Ea6d985D6649300584e6722Ec4B1383"),
        l2_output_oracle: address!("E6Dfba0953616Bacab0c9A8ecb3a9BBa77FC15c0"),
    },
    alchemy_l1: "eth-goerli",
    alchemy_l2: "opt-goerli",
    infura_l1: "goerli",
    infura_l2: "optimism-goerli",
    l1_explorer: "https://goerli.etherscan.io",
    l2_explorer: "https://goerli-optimism.etherscan.io",
    greeter: Some(address!("106941459a8768f5a92b770e280555faf817576f")),
    demo_token: Some((
        address!("32B3b2281717dA83463414af4E8CfB1970E56287"),
        address!("3e7eF8f50246f725885102E8238CBba33F276747"),
    )),
};

const SEPOLIA: NetworkPreset = NetworkPreset {
    l1_chain_id: 11_155_111,
    l2_chain_id: 11_155_420,
    contracts: L1Contracts {
        l1_cross_domain_messenger: address!("58Cc85b8D04EA49cC6DBd3CbFFd00B4B8D6cb3ef"),
        l1_standard_bridge: address!("FBb0621E0B23b5478B630BD55a5f21f67730B0F1"),
        optimism_portal: address!("16Fc5058F25648194471939df75CF27A2e143F4b"),
        l2_output_oracle: address!("90E9c4f8a994a250F6aEfd61CAFb4F2e895D458F"),
    },
    alchemy_l1: "eth-sepolia",
    alchemy_l2: "opt-sepolia",
    infura_l1: "sepolia",
    infura_l2: "optimism-sepolia",
    l1_explorer: "https://sepolia.etherscan.io",
    l2_explorer: "https://sepolia-optimism.etherscan.io",
    greeter: None,
    demo_token: None,
};

/// Which RPC provider an API key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcProvider {
    Alchemy,
    Infura,
}

impl Network {
    /// The preset for this network, if it has one.
    pub fn preset(&self) -> Option<&'static NetworkPreset> {
        match self {
            Network::Mainnet => Some(&MAINNET),
            Network::Goerli => Some(&GOERLI),
            Network::Sepolia => Some(&SEPOLIA),
            Network::Custom => None,
        }
    }

    /// Whether the L1 portal proves against dispute games instead of the
    /// L2OutputOracle, which `prove_message` does not support.
    pub fn uses_fault_proofs(&self) -> bool {
        matches!(self, Network::Mainnet | Network::Sepolia)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Goerli => "goerli",
            Network::Sepolia => "sepolia",
            Network::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl NetworkPreset {
    /// Build the L1 and L2 RPC URLs for an API key.
    pub fn rpc_urls(&self, provider: RpcProvider, key: &str) -> (String, String) {
        match provider {
            RpcProvider::Alchemy => (
                format!("https://{}.g.alchemy.com/v2/{}", self.alchemy_l1, key),
                format!("https://{}.g.alchemy.com/v2/{}", self.alchemy_l2, key),
            ),
            RpcProvider::Infura => (
                format!("https://{}.infura.io/v3/{}", self.infura_l1, key),
                format!("https://{}.infura.io/v3/{}", self.infura_l2, key),
            ),
        }
    }

    /// Explorer link for an L1 transaction.
    pub fn l1_tx_url(&self, hash: impl std::fmt::Display) -> String {
        format!("{}/tx/{}", self.l1_explorer, hash)
    }

    /// Explorer link for an L2 transaction.
    pub fn l2_tx_url(&self, hash: impl std::fmt::Display) -> String {
        format!("{}/tx/{}", self.l2_explorer, hash)
    }
}
