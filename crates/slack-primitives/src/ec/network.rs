//! Network parameter sets.
//!
//! A [`Network`] carries the version bytes that tag addresses, WIF keys and
//! BIP32 extended keys. Descriptors are plain values: they are copied into
//! key pairs and compared by value, and custom ones can be loaded from
//! configuration through `serde`.

use serde::{Deserialize, Serialize};

use crate::PrimitivesError;

/// BIP32 extended key version words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bip32Versions {
    /// Version of extended public keys.
    pub public: u32,
    /// Version of extended private keys.
    pub private: u32,
}

/// Version bytes of one network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Address version byte.
    pub pub_key_hash: u8,
    /// WIF version byte.
    pub wif: u8,
    /// BIP32 version words.
    pub bip32: Bip32Versions,
}

/// Slack mainnet.
pub const SLACK: Network = Network {
    pub_key_hash: 0x17,
    wif: 0xaa,
    bip32: Bip32Versions {
        public: 0x02bf_4968,
        private: 0x02bf_4530,
    },
};

/// Slack testnet.
pub const SLACK_TESTNET: Network = Network {
    pub_key_hash: 0x52,
    wif: 0xba,
    bip32: Bip32Versions {
        public: 0x0435_87cf,
        private: 0x0435_8394,
    },
};

/// Bitcoin mainnet (`xpub`/`xprv`).
pub const BITCOIN: Network = Network {
    pub_key_hash: 0x00,
    wif: 0x80,
    bip32: Bip32Versions {
        public: 0x0488_b21e,
        private: 0x0488_ade4,
    },
};

impl Network {
    /// Whether `version` is one of this network's BIP32 version words.
    pub fn has_bip32_version(&self, version: u32) -> bool {
        version == self.bip32.public || version == self.bip32.private
    }
}

/// The network, or candidate networks, a decoder may accept.
///
/// With `One`, a version mismatch is `InvalidNetworkVersion`. With `AnyOf`,
/// the first candidate in slice order that matches wins and no match is
/// `UnknownNetworkVersion`; there is no fallback to any other network.
#[derive(Clone, Copy, Debug)]
pub enum NetworkSelector<'a> {
    /// Exactly this network.
    One(&'a Network),
    /// The first matching network of an ordered list.
    AnyOf(&'a [Network]),
}

impl<'a> From<&'a Network> for NetworkSelector<'a> {
    fn from(network: &'a Network) -> Self {
        NetworkSelector::One(network)
    }
}

impl<'a> From<&'a [Network]> for NetworkSelector<'a> {
    fn from(networks: &'a [Network]) -> Self {
        NetworkSelector::AnyOf(networks)
    }
}

impl<'a, const N: usize> From<&'a [Network; N]> for NetworkSelector<'a> {
    fn from(networks: &'a [Network; N]) -> Self {
        NetworkSelector::AnyOf(networks)
    }
}

impl<'a> NetworkSelector<'a> {
    /// Pick the network whose WIF byte equals `version`.
    pub fn resolve_wif(&self, version: u8) -> Result<Network, PrimitivesError> {
        self.resolve(u32::from(version), |network| network.wif == version)
    }

    /// Pick the network that owns the BIP32 version word `version`.
    pub fn resolve_bip32(&self, version: u32) -> Result<Network, PrimitivesError> {
        self.resolve(version, |network| network.has_bip32_version(version))
    }

    fn resolve<F>(&self, version: u32, matches: F) -> Result<Network, PrimitivesError>
    where
        F: Fn(&Network) -> bool,
    {
        match self {
            NetworkSelector::One(network) if matches(*network) => Ok(**network),
            NetworkSelector::One(_) => Err(PrimitivesError::InvalidNetworkVersion(version)),
            NetworkSelector::AnyOf(networks) => networks
                .iter()
                .find(|&network| matches(network))
                .copied()
                .ok_or(PrimitivesError::UnknownNetworkVersion(version)),
        }
    }
}
