//! Runtime configuration, loaded from TOML
//!
//! ```toml
//! [network]
//! bind_addr = "0.0.0.0"
//! port = 5056
//! overflow = "drop_oldest"
//!
//! [spawn]
//! euler = [0.0, 180.0, 0.0]
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Every field is optional; missing ones take the defaults shown by
//! [`RuntimeConfig::default`].

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;
use tracing::warn;

use mimic_core::{MimicError, MimicResult, DEFAULT_FILTER_ALPHA};
use mimic_rig::MapperConfig;
use mimic_transport::{
    IngestConfig, OverflowPolicy, DEFAULT_POSE_PORT, DEFAULT_QUEUE_CAPACITY, MAX_DATAGRAM_SIZE,
    MIN_RECV_BUFFER,
};

use crate::Placement;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub spawn: SpawnConfig,
    #[serde(default)]
    pub mapper: MapperSection,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub queue_capacity: usize,
    pub overflow: OverflowPolicy,
    pub recv_buffer: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_POSE_PORT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::DropOldest,
            recv_buffer: MAX_DATAGRAM_SIZE,
        }
    }
}

/// Spawn root transform
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnConfig {
    pub position: [f32; 3],
    /// Degrees
    pub euler: [f32; 3],
    pub scale: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            euler: [0.0, 180.0, 0.0],
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperSection {
    pub filter_alpha: f32,
    pub chest_blend: f32,
    pub limb_blend: f32,
}

impl Default for MapperSection {
    fn default() -> Self {
        Self {
            filter_alpha: DEFAULT_FILTER_ALPHA,
            chest_blend: 0.75,
            limb_blend: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl RuntimeConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> MimicResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `path`, falling back to defaults if it is missing or invalid
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("using default config, could not load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> MimicResult<Self> {
        let config: RuntimeConfig =
            toml::from_str(content).map_err(|e| MimicError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> MimicResult<()> {
        let unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(MimicError::InvalidConfig(format!("{} must be within [0, 1], got {}", name, v)))
            }
        };
        unit("mapper.filter_alpha", self.mapper.filter_alpha)?;
        unit("mapper.chest_blend", self.mapper.chest_blend)?;
        unit("mapper.limb_blend", self.mapper.limb_blend)?;

        if !(self.spawn.scale.is_finite() && self.spawn.scale > 0.0) {
            return Err(MimicError::InvalidConfig(format!(
                "spawn.scale must be positive, got {}",
                self.spawn.scale
            )));
        }
        if self.network.queue_capacity == 0 {
            return Err(MimicError::InvalidConfig("network.queue_capacity must be at least 1".into()));
        }
        if !(MIN_RECV_BUFFER..=MAX_DATAGRAM_SIZE).contains(&self.network.recv_buffer) {
            return Err(MimicError::InvalidConfig(format!(
                "network.recv_buffer must be within [{}, {}], got {}",
                MIN_RECV_BUFFER, MAX_DATAGRAM_SIZE, self.network.recv_buffer
            )));
        }
        Ok(())
    }

    pub fn ingest(&self) -> IngestConfig {
        IngestConfig {
            bind_addr: self.network.bind_addr,
            port: self.network.port,
            queue_capacity: self.network.queue_capacity,
            overflow: self.network.overflow,
            recv_buffer: self.network.recv_buffer,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            position: Vec3::from_array(self.spawn.position),
            euler_degrees: Vec3::from_array(self.spawn.euler),
            scale: self.spawn.scale,
        }
    }

    pub fn mapper(&self) -> MapperConfig {
        MapperConfig {
            filter_alpha: self.mapper.filter_alpha,
            chest_blend: self.mapper.chest_blend,
            limb_blend: self.mapper.limb_blend,
        }
    }
}
