/*!
 * Rlimit Marshaling
 * Resource kinds and the bounded/unbounded limit representation
 */

use serde::{Deserialize, Serialize};

/// Portable vocabulary for `getrlimit`/`setrlimit` resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    CoreSize,
    CpuTime,
    DataSize,
    FileSize,
    OpenFiles,
    StackSize,
    AddressSpace,
}

impl ResourceKind {
    /// Platform constant, cast at the call site to the libc resource type
    pub(crate) fn raw(self) -> i32 {
        (match self {
            Self::CoreSize => libc::RLIMIT_CORE,
            Self::CpuTime => libc::RLIMIT_CPU,
            Self::DataSize => libc::RLIMIT_DATA,
            Self::FileSize => libc::RLIMIT_FSIZE,
            Self::OpenFiles => libc::RLIMIT_NOFILE,
            Self::StackSize => libc::RLIMIT_STACK,
            Self::AddressSpace => libc::RLIMIT_AS,
        }) as i32
    }
}

/// One bound of a resource limit: a concrete value or `RLIM_INFINITY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    Unbounded,
    Value(u64),
}

impl Limit {
    pub(crate) fn decode(raw: libc::rlim_t) -> Self {
        if raw == libc::RLIM_INFINITY {
            Self::Unbounded
        } else {
            Self::Value(raw as u64)
        }
    }

    pub(crate) fn encode(self) -> libc::rlim_t {
        match self {
            Self::Unbounded => libc::RLIM_INFINITY,
            Self::Value(v) => v as libc::rlim_t,
        }
    }
}

/// Soft and hard bound pair, the unit `getrlimit` reports and `setrlimit` takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlimitPair {
    pub soft: Limit,
    pub hard: Limit,
}

impl RlimitPair {
    pub(crate) fn decode(rl: &libc::rlimit) -> Self {
        Self {
            soft: Limit::decode(rl.rlim_cur),
            hard: Limit::decode(rl.rlim_max),
        }
    }

    pub(crate) fn encode(&self) -> libc::rlimit {
        libc::rlimit {
            rlim_cur: self.soft.encode(),
            rlim_max: self.hard.encode(),
        }
    }
}
