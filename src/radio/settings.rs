//! Point-to-point radio parameters and their device-legal domains
//!
//! Out-of-domain inputs are never rejected: each field falls back to the
//! default of its domain, as the module firmware would otherwise refuse the
//! whole configuration command.

use crate::config::radio_defaults;
use core::fmt::Write;
use heapless::String;

/// Room for `freq:sf:bw:cr:preamble:power` at their widest
pub const MAX_FRAGMENT_LEN: usize = 40;

/// Configuration fragment sent after the dialect's config prefix
pub type ConfigFragment = String<MAX_FRAGMENT_LEN>;

/// Channel bandwidth, encoded on the wire as an index
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    Khz125 = 0,
    Khz250 = 1,
    Khz500 = 2,
}

impl Bandwidth {
    /// Wire code of the bandwidth
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Bandwidth in kHz
    pub fn khz(self) -> u32 {
        match self {
            Bandwidth::Khz125 => 125,
            Bandwidth::Khz250 => 250,
            Bandwidth::Khz500 => 500,
        }
    }

    /// Try to map a bandwidth in kHz
    pub fn from_khz(khz: u32) -> Option<Self> {
        match khz {
            125 => Some(Self::Khz125),
            250 => Some(Self::Khz250),
            500 => Some(Self::Khz500),
            _ => None,
        }
    }
}

/// Radio parameters as supplied by the caller, unchecked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRadioConfig {
    /// Centre frequency in Hz
    pub frequency_hz: u32,
    /// Bandwidth in kHz
    pub bandwidth_khz: u32,
    pub spreading_factor: i32,
    pub coding_rate: i32,
    pub preamble_len: i32,
    pub tx_power_dbm: i32,
}

impl Default for RawRadioConfig {
    fn default() -> Self {
        Self {
            frequency_hz: radio_defaults::FREQUENCY_HZ,
            bandwidth_khz: radio_defaults::BANDWIDTH_KHZ,
            spreading_factor: radio_defaults::SPREADING_FACTOR.into(),
            coding_rate: radio_defaults::CODING_RATE.into(),
            preamble_len: radio_defaults::PREAMBLE_LEN.into(),
            tx_power_dbm: radio_defaults::TX_POWER_DBM.into(),
        }
    }
}

/// Validated radio parameters; every field lies within its device domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioConfig {
    pub frequency_hz: u32,
    pub bandwidth: Bandwidth,
    /// Spreading factor (7-12)
    pub spreading_factor: u8,
    /// Coding rate index (1-4 for 4/5 to 4/8)
    pub coding_rate: u8,
    /// Preamble length in symbols
    pub preamble_len: u16,
    /// Transmit power in dBm
    pub tx_power_dbm: u8,
}

impl RadioConfig {
    /// Render the colon-delimited fragment of the configuration command
    ///
    /// Field order is fixed by the module firmware:
    /// frequency, spreading factor, bandwidth code, coding rate, preamble, power.
    pub fn fragment(&self) -> ConfigFragment {
        let mut fragment = ConfigFragment::new();
        // Capacity covers every field at its widest
        let _ = write!(
            fragment,
            "{}:{}:{}:{}:{}:{}",
            self.frequency_hz,
            self.spreading_factor,
            self.bandwidth.code(),
            self.coding_rate,
            self.preamble_len,
            self.tx_power_dbm
        );
        fragment
    }

    /// The raw form of this configuration, for re-validation
    pub fn to_raw(&self) -> RawRadioConfig {
        RawRadioConfig {
            frequency_hz: self.frequency_hz,
            bandwidth_khz: self.bandwidth.khz(),
            spreading_factor: self.spreading_factor.into(),
            coding_rate: self.coding_rate.into(),
            preamble_len: self.preamble_len.into(),
            tx_power_dbm: self.tx_power_dbm.into(),
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        ConfigurationValidator::rak811().validate(&RawRadioConfig::default())
    }
}

/// Inclusive legal range of an integer parameter and its fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl Domain {
    /// `value` if it lies within the domain, the default otherwise
    pub fn clamp(&self, value: i32) -> i32 {
        if (self.min..=self.max).contains(&value) {
            value
        } else {
            self.default
        }
    }
}

/// Domain table for one firmware family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDomains {
    pub default_bandwidth: Bandwidth,
    pub spreading_factor: Domain,
    pub coding_rate: Domain,
    pub preamble_len: Domain,
    pub tx_power_dbm: Domain,
}

/// Legal parameter domains of the RAK811 in P2P mode
pub static RAK811_DOMAINS: ParamDomains = ParamDomains {
    default_bandwidth: Bandwidth::Khz125,
    spreading_factor: Domain { min: 7, max: 12, default: 7 },
    coding_rate: Domain { min: 1, max: 4, default: 1 },
    preamble_len: Domain { min: 5, max: 65_535, default: 5 },
    tx_power_dbm: Domain { min: 5, max: 14, default: 5 },
};

/// Normalises raw parameters against a domain table
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationValidator<'a> {
    domains: &'a ParamDomains,
}

impl<'a> ConfigurationValidator<'a> {
    /// Create a validator over the given domain table
    pub fn new(domains: &'a ParamDomains) -> Self {
        Self { domains }
    }

    /// Validate, replacing every out-of-domain field with its default
    pub fn validate(&self, raw: &RawRadioConfig) -> RadioConfig {
        let domains = self.domains;
        let bandwidth =
            Bandwidth::from_khz(raw.bandwidth_khz).unwrap_or(domains.default_bandwidth);

        // Domain bounds keep every clamped value inside its target type
        RadioConfig {
            frequency_hz: raw.frequency_hz,
            bandwidth,
            spreading_factor: domains.spreading_factor.clamp(raw.spreading_factor) as u8,
            coding_rate: domains.coding_rate.clamp(raw.coding_rate) as u8,
            preamble_len: domains.preamble_len.clamp(raw.preamble_len) as u16,
            tx_power_dbm: domains.tx_power_dbm.clamp(raw.tx_power_dbm) as u8,
        }
    }
}

impl ConfigurationValidator<'static> {
    /// Validator for the RAK811 P2P domains
    pub fn rak811() -> Self {
        Self::new(&RAK811_DOMAINS)
    }
}
